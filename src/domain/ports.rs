use crate::domain::model::{
    DataKind, GenerationOptions, GenerationResponse, NormalizedRecord, PromptRequest,
    ResultEnvelope,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Converts a file on disk into a [`NormalizedRecord`].
pub trait Loader: Send + Sync {
    /// Kind of record this loader produces.
    fn kind(&self) -> DataKind;

    fn name(&self) -> &'static str {
        self.kind().as_str()
    }

    /// Lowercase extensions without the leading dot.
    fn extensions(&self) -> &'static [&'static str];

    /// Accepts `png`, `.png` or `.PNG`.
    fn supports(&self, extension: &str) -> bool {
        let extension = normalize_extension(extension);
        self.extensions().contains(&extension.as_str())
    }

    fn load(&self, path: &Path) -> Result<NormalizedRecord>;

    /// Fails with a config error when format support this loader relies on
    /// was not compiled in.
    fn check_capabilities(&self) -> Result<()> {
        Ok(())
    }
}

pub fn normalize_extension(extension: &str) -> String {
    extension.trim_start_matches('.').to_lowercase()
}

#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn generate(&self, model: &str, request: &PromptRequest) -> Result<GenerationResponse>;
}

pub trait ResultSink: Send + Sync {
    /// Persist an envelope and return where it went.
    fn persist(
        &self,
        envelope: &ResultEnvelope,
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn model(&self) -> &str;
    fn generation_options(&self) -> GenerationOptions;

    /// Template for `(kind, prompt_type)`, falling back to the kind's
    /// `default` template when `prompt_type` is unknown.
    fn prompt_template(&self, kind: DataKind, prompt_type: &str) -> Result<&str>;

    fn save_results(&self) -> bool;
}
