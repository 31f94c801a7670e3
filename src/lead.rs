//! The lead record sent to the `lead_submissions` table and the storage
//! location of the KML document it references.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const KML_BUCKET: &str = "kml-uploads";
pub const KML_CONTENT_TYPE: &str = "application/vnd.google-earth.kml+xml";
pub const LEADS_TABLE: &str = "lead_submissions";
pub const SAMPLE_FILENAME: &str = "teste.kml";
pub const FALLBACK_FILENAME: &str = "arquivo.kml";
/// Largest local file accepted for upload.
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

pub const SAMPLE_KML: &[u8] = b"<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<kml xmlns=\"http://www.opengis.net/kml/2.2\"><Placemark><name>Teste</name></Placemark></kml>";

/// Replaces anything outside `[a-zA-Z0-9._-]` with an underscore.
pub fn sanitize_filename(name: &str) -> String {
    if name.is_empty() {
        return FALLBACK_FILENAME.to_string();
    }
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Object key of the form `leads/<lead id>/<filename>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectPath {
    lead_id: Uuid,
    filename: String,
}

impl ObjectPath {
    /// Every call picks a fresh lead id so runs never collide.
    pub fn new(filename: &str) -> Self {
        ObjectPath {
            lead_id: Uuid::new_v4(),
            filename: sanitize_filename(filename),
        }
    }

    pub fn lead_id(&self) -> Uuid {
        self.lead_id
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "leads/{}/{}", self.lead_id, self.filename)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeadSubmission {
    pub nome: String,
    pub whatsapp: String,
    pub cidade: String,
    pub estado: String,
    pub prompt_text: String,
    pub kml_path: String,
    pub kml_filename: String,
    pub ip_address: String,
    pub user_agent: String,
}

impl LeadSubmission {
    /// The fixed record used by the smoke test, pointing at `path`.
    pub fn smoke_test(path: &ObjectPath) -> Self {
        LeadSubmission {
            nome: "Teste Local".to_string(),
            whatsapp: "11999999999".to_string(),
            cidade: "Sao Paulo".to_string(),
            estado: "SP".to_string(),
            prompt_text: "Teste de envio local".to_string(),
            kml_path: path.to_string(),
            kml_filename: path.filename().to_string(),
            ip_address: "127.0.0.1".to_string(),
            user_agent: "local-test".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_path_shape() {
        let path = ObjectPath::new(SAMPLE_FILENAME);
        let rendered = path.to_string();

        let parts: Vec<&str> = rendered.split('/').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "leads");
        assert_eq!(Uuid::parse_str(parts[1]).unwrap(), path.lead_id());
        assert_eq!(parts[2], "teste.kml");
    }

    #[test]
    fn test_object_paths_differ() {
        let first = ObjectPath::new(SAMPLE_FILENAME);
        let second = ObjectPath::new(SAMPLE_FILENAME);
        assert_ne!(first, second);
        assert_ne!(first.to_string(), second.to_string());
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("teste.kml"), "teste.kml");
        assert_eq!(sanitize_filename("my farm (v2).kml"), "my_farm__v2_.kml");
        assert_eq!(sanitize_filename("área-01.kml"), "_rea-01.kml");
        assert_eq!(sanitize_filename(""), FALLBACK_FILENAME);
    }

    #[test]
    fn test_smoke_test_record() {
        let path = ObjectPath::new(SAMPLE_FILENAME);
        let record = LeadSubmission::smoke_test(&path);
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["kml_path"], path.to_string());
        assert_eq!(value["kml_filename"], "teste.kml");
        assert_eq!(value["nome"], "Teste Local");
        assert_eq!(value["user_agent"], "local-test");
        assert_eq!(value.as_object().unwrap().len(), 9);
    }

    #[test]
    fn test_sample_kml() {
        let text = std::str::from_utf8(SAMPLE_KML).unwrap();
        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<kml"));
        assert!(text.ends_with("</kml>"));
    }
}
