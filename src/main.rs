use std::process::ExitCode;

use lead_smoke::run::{run, Args};
use tracing_subscriber::EnvFilter;

fn init_tracing(log_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    // stdout is reserved for the status lines and response bodies
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(&args.log_level);

    match run(args) {
        Ok(report) => {
            tracing::info!(path = %report.object_path, "smoke test passed");
            ExitCode::SUCCESS
        }
        Err(err) => {
            if !err.is_reported() {
                eprintln!("{:#}", anyhow::Error::from(err));
            }
            ExitCode::FAILURE
        }
    }
}
