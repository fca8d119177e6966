use crate::domain::model::{DataKind, Metadata, NormalizedRecord};
use crate::domain::ports::Loader;
use crate::loaders::display_path;
use crate::utils::error::{GenAiError, Result};
use serde_json::json;
use std::path::Path;

/// Reads UTF-8 text files whole.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextLoader;

impl TextLoader {
    pub fn new() -> Self {
        Self
    }
}

impl Loader for TextLoader {
    fn kind(&self) -> DataKind {
        DataKind::Text
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["txt", "md", "json", "xml", "html"]
    }

    fn load(&self, path: &Path) -> Result<NormalizedRecord> {
        let source = display_path(path);
        tracing::debug!("Loading text file: {}", source);

        let bytes = std::fs::read(path).map_err(|e| GenAiError::IoError(e).logged())?;
        let file_size = bytes.len();

        let text = String::from_utf8(bytes).map_err(|e| {
            GenAiError::EncodingError {
                path: source.clone(),
                message: e.utf8_error().to_string(),
            }
            .logged()
        })?;

        let mut metadata = Metadata::new();
        metadata.insert("file_size".to_string(), json!(file_size));
        metadata.insert("line_count".to_string(), json!(text.lines().count()));
        metadata.insert("encoding".to_string(), json!("utf-8"));

        Ok(NormalizedRecord::text(text, metadata, source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::RecordContent;
    use tempfile::tempdir;

    #[test]
    fn test_supports_known_extensions() {
        let loader = TextLoader::new();
        assert!(loader.supports("txt"));
        assert!(loader.supports(".MD"));
        assert!(loader.supports(".html"));
        assert!(!loader.supports("csv"));
        assert!(!loader.supports("pdf"));
    }

    #[test]
    fn test_load_three_line_file() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("notes.txt");
        std::fs::write(&file_path, "first\nsecond\nthird\n").unwrap();

        let record = TextLoader::new().load(&file_path).unwrap();

        assert_eq!(record.kind(), DataKind::Text);
        assert_eq!(record.metadata()["line_count"], json!(3));
        assert_eq!(record.metadata()["file_size"], json!(19));
        assert_eq!(record.metadata()["encoding"], json!("utf-8"));
        assert!(matches!(record.content(), RecordContent::Text(t) if t.starts_with("first")));
    }

    #[test]
    fn test_file_size_counts_bytes() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("utf8.md");
        std::fs::write(&file_path, "héllo").unwrap();

        let record = TextLoader::new().load(&file_path).unwrap();
        assert_eq!(record.metadata()["file_size"], json!(6));
        assert_eq!(record.metadata()["line_count"], json!(1));
    }

    #[test]
    fn test_invalid_utf8_is_encoding_error() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("broken.txt");
        std::fs::write(&file_path, [0x66, 0x6f, 0xff, 0xfe]).unwrap();

        let err = TextLoader::new().load(&file_path).unwrap_err();
        assert!(matches!(err, GenAiError::EncodingError { .. }));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = TextLoader::new()
            .load(Path::new("/nonexistent/notes.txt"))
            .unwrap_err();
        assert!(matches!(err, GenAiError::IoError(_)));
    }
}
