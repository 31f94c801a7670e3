pub mod client;
pub mod config;
pub mod errors;
pub mod lead;
pub mod run;
