use reqwest::blocking::Client;
use reqwest::blocking::ClientBuilder;
use reqwest::blocking::Response;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use tracing::debug;

use crate::config::Config;
use crate::errors::ClientError;

const APIKEY: HeaderName = HeaderName::from_static("apikey");
const PREFER: HeaderName = HeaderName::from_static("prefer");

/// Status and raw body of a successful call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

/// Decodes a body as UTF-8, dropping invalid byte sequences instead of
/// substituting U+FFFD.
pub fn decode_body(bytes: &[u8]) -> String {
    bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()
}

impl ApiResponse {
    fn from_response(res: Response) -> Result<Self, ClientError> {
        let status = res.status();
        let bytes = res.bytes()?;
        let body = decode_body(&bytes);

        if status.is_success() {
            Ok(ApiResponse {
                status: status.as_u16(),
                body,
            })
        } else {
            Err(ClientError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}

/// Blocking client for the storage and REST endpoints of a project.
///
/// Every request carries the service role key as a bearer token and as
/// the `apikey` header.
pub struct SupabaseClient {
    client: Client,
    base_url: String,
}

impl SupabaseClient {
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.service_role_key))?;
        bearer.set_sensitive(true);
        let mut apikey = HeaderValue::from_str(&config.service_role_key)?;
        apikey.set_sensitive(true);

        let mut headers = HeaderMap::with_capacity(2);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(APIKEY, apikey);

        let client = ClientBuilder::new()
            .default_headers(headers)
            .build()
            .map_err(ClientError::Build)?;

        Ok(SupabaseClient {
            client,
            base_url: config.base_url.clone(),
        })
    }

    pub fn storage_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, path)
    }

    pub fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    pub fn upload_object(
        &self,
        bucket: &str,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<ApiResponse, ClientError> {
        let url = self.storage_url(bucket, path);
        debug!(%url, size = bytes.len(), "uploading object");

        let res = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()?;

        ApiResponse::from_response(res)
    }

    /// Inserts one row and asks the server to echo the created representation.
    pub fn insert_row<T: Serialize>(
        &self,
        table: &str,
        record: &T,
    ) -> Result<ApiResponse, ClientError> {
        let url = self.table_url(table);
        let body = serde_json::to_vec(record)?;
        debug!(%url, size = body.len(), "inserting row");

        let res = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(PREFER, "return=representation")
            .body(body)
            .send()?;

        ApiResponse::from_response(res)
    }
}
