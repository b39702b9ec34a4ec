use std::path::PathBuf;

/// Object storage for uploaded files: store the bytes, get back a public URL.
pub trait FileStore: Send + Sync {
    fn upload(&self, name_hint: &str, bytes: &[u8], content_type: Option<&str>) -> Result<String, String>;
}

/// Writes uploads to a local directory served under `url_prefix`.
pub struct LocalFileStore {
    dir: PathBuf,
    url_prefix: String,
}

impl LocalFileStore {
    pub fn new(dir: impl Into<PathBuf>, url_prefix: &str) -> Self {
        LocalFileStore {
            dir: dir.into(),
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        }
    }
}

impl FileStore for LocalFileStore {
    fn upload(&self, name_hint: &str, bytes: &[u8], content_type: Option<&str>) -> Result<String, String> {
        std::fs::create_dir_all(&self.dir).map_err(|e| format!("Cannot create upload directory: {}", e))?;
        let filename = format!(
            "{}_{}.{}",
            sanitize_prefix(name_hint),
            uuid::Uuid::new_v4().simple(),
            extension_for(content_type, name_hint)
        );
        std::fs::write(self.dir.join(&filename), bytes).map_err(|e| format!("Cannot store upload: {}", e))?;
        Ok(format!("{}/{}", self.url_prefix, filename))
    }
}

/// Content type first, then the original file name, then `bin`.
pub fn extension_for(content_type: Option<&str>, name_hint: &str) -> String {
    let from_type = content_type.and_then(|ct| match ct.split(';').next().unwrap_or("").trim() {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "image/svg+xml" => Some("svg"),
        "image/avif" => Some("avif"),
        _ => None,
    });
    if let Some(ext) = from_type {
        return ext.to_string();
    }
    name_hint
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| "bin".to_string())
}

fn sanitize_prefix(name_hint: &str) -> String {
    let stem = name_hint.rsplit_once('.').map(|(s, _)| s).unwrap_or(name_hint);
    let cleaned: String = stem
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .take(32)
        .collect();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_ascii_lowercase()
    }
}
