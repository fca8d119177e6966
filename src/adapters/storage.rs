use crate::domain::model::ResultEnvelope;
use crate::domain::ports::ResultSink;
use crate::utils::error::{GenAiError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Writes each envelope as a pretty-printed JSON file under
/// `output_directory`.
#[derive(Debug, Clone)]
pub struct LocalResultSink {
    output_directory: PathBuf,
}

impl LocalResultSink {
    pub fn new(output_directory: impl Into<PathBuf>) -> Self {
        Self {
            output_directory: output_directory.into(),
        }
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    /// `results_YYYYMMDD_HHMMSS_mmm.json`, local time.
    pub fn file_name() -> String {
        format!(
            "results_{}.json",
            chrono::Local::now().format("%Y%m%d_%H%M%S_%3f")
        )
    }
}

impl ResultSink for LocalResultSink {
    async fn persist(&self, envelope: &ResultEnvelope) -> Result<String> {
        fs::create_dir_all(&self.output_directory).map_err(|e| GenAiError::IoError(e).logged())?;

        let full_path = self.output_directory.join(Self::file_name());
        let json = serde_json::to_string_pretty(envelope)?;
        fs::write(&full_path, json).map_err(|e| GenAiError::IoError(e).logged())?;

        let location = full_path.to_string_lossy().into_owned();
        tracing::debug!("📁 Results saved to: {}", location);
        Ok(location)
    }
}
