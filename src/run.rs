use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::{error, info};

use crate::client::{ApiResponse, SupabaseClient};
use crate::config::Config;
use crate::errors::{ClientError, SmokeError, Step};
use crate::lead::{
    LeadSubmission, ObjectPath, FALLBACK_FILENAME, KML_BUCKET, KML_CONTENT_TYPE, LEADS_TABLE,
    MAX_UPLOAD_BYTES, SAMPLE_FILENAME, SAMPLE_KML,
};

/// Upload a KML document and insert a lead row referencing it.
///
/// Credentials are read from SUPABASE_URL and SUPABASE_SERVICE_ROLE_KEY.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    /// Upload this file instead of the built-in sample document
    #[arg(short, long)]
    pub kml_file: Option<PathBuf>,

    /// The logging level. RUST_LOG takes precedence when set.
    #[arg(short, long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    pub fn parse() -> Self {
        Parser::parse()
    }
}

/// The document to upload and where it goes.
#[derive(Debug)]
pub struct Upload {
    pub path: ObjectPath,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn sample() -> Self {
        Upload {
            path: ObjectPath::new(SAMPLE_FILENAME),
            bytes: SAMPLE_KML.to_vec(),
        }
    }

    /// Rejects empty files and files over [`MAX_UPLOAD_BYTES`] before reading them.
    pub fn from_file(file: &Path) -> Result<Self, SmokeError> {
        let read_error = |source| SmokeError::ReadFile {
            path: file.to_path_buf(),
            source,
        };

        let size = std::fs::metadata(file).map_err(read_error)?.len();
        if size == 0 {
            return Err(SmokeError::EmptyFile {
                path: file.to_path_buf(),
            });
        }
        if size > MAX_UPLOAD_BYTES {
            return Err(SmokeError::FileTooLarge {
                path: file.to_path_buf(),
                size,
                limit: MAX_UPLOAD_BYTES,
            });
        }

        let bytes = std::fs::read(file).map_err(read_error)?;
        let name = file
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(FALLBACK_FILENAME);

        Ok(Upload {
            path: ObjectPath::new(name),
            bytes,
        })
    }
}

/// Outcome of a run where both calls succeeded.
#[derive(Debug)]
pub struct SmokeReport {
    pub object_path: String,
    pub upload: ApiResponse,
    pub insert: ApiResponse,
}

fn report<W: Write>(
    out: &mut W,
    step: Step,
    result: Result<ApiResponse, ClientError>,
) -> Result<ApiResponse, SmokeError> {
    match result {
        Ok(response) => {
            writeln!(out, "{} status: {}", step, response.status)?;
            writeln!(out, "{}", response.body)?;
            Ok(response)
        }
        Err(source) => {
            writeln!(out, "{} failed: {}", step, source)?;
            error!(%step, "request failed: {}", source);
            Err(SmokeError::Request { step, source })
        }
    }
}

/// Uploads `upload` and then inserts the smoke-test lead pointing at it.
///
/// The insert only runs after a successful upload. Console lines go to `out`.
pub fn run_smoke_test<W: Write>(
    config: &Config,
    upload: Upload,
    out: &mut W,
) -> Result<SmokeReport, SmokeError> {
    let client = SupabaseClient::new(config)?;
    let object_path = upload.path.to_string();

    info!(path = %object_path, size = upload.bytes.len(), "uploading KML");
    let uploaded = report(
        out,
        Step::StorageUpload,
        client.upload_object(KML_BUCKET, &object_path, KML_CONTENT_TYPE, upload.bytes),
    )?;

    let record = LeadSubmission::smoke_test(&upload.path);
    info!(lead_id = %upload.path.lead_id(), "inserting lead submission");
    let inserted = report(out, Step::Insert, client.insert_row(LEADS_TABLE, &record))?;

    Ok(SmokeReport {
        object_path,
        upload: uploaded,
        insert: inserted,
    })
}

/// Resolves configuration, then the upload, then talks to the backend.
///
/// Nothing goes over the network unless the first two steps succeed.
pub fn run_with<F, W>(args: &Args, lookup: F, out: &mut W) -> Result<SmokeReport, SmokeError>
where
    F: Fn(&str) -> Option<String>,
    W: Write,
{
    let config = Config::from_lookup(lookup)?;
    let upload = match args.kml_file {
        Some(ref file) => Upload::from_file(file)?,
        None => Upload::sample(),
    };

    run_smoke_test(&config, upload, out)
}

pub fn run(args: Args) -> Result<SmokeReport, SmokeError> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_with(&args, |name| std::env::var(name).ok(), &mut out)
}
