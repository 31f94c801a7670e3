//! Resolution of the backend credentials from the process environment.

use std::fmt;

use crate::errors::SmokeError;

pub const URL_VAR: &str = "SUPABASE_URL";
pub const KEY_VAR: &str = "SUPABASE_SERVICE_ROLE_KEY";

pub struct Config {
    /// Root address of the project, without a trailing slash.
    pub base_url: String,
    /// Sent both as the bearer token and as the `apikey` header.
    pub service_role_key: String,
}

// Keep the key out of logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("service_role_key", &"<redacted>")
            .finish()
    }
}

impl Config {
    pub fn new(base_url: &str, service_role_key: &str) -> Result<Self, SmokeError> {
        let base_url = base_url.trim_end_matches('/');
        if base_url.is_empty() || service_role_key.is_empty() {
            return Err(SmokeError::MissingConfig);
        }

        Ok(Config {
            base_url: base_url.to_string(),
            service_role_key: service_role_key.to_string(),
        })
    }

    /// Absent and empty values are both treated as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SmokeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(URL_VAR).unwrap_or_default();
        let service_role_key = lookup(KEY_VAR).unwrap_or_default();
        Self::new(&base_url, &service_role_key)
    }
}
