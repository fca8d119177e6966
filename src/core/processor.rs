use crate::core::registry::LoaderRegistry;
use crate::core::request::build_request;
use crate::domain::model::{DataKind, ResultEnvelope};
use crate::domain::ports::{ConfigProvider, GenerationClient, ResultSink};
use crate::loaders::display_path;
use crate::utils::error::Result;
use serde::Serialize;
use serde_json::json;
use std::path::Path;

/// What `process` would do for a file, without reading it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessingPlan {
    pub source_path: String,
    pub loader: &'static str,
    pub kind: DataKind,
    pub prompt: String,
}

/// Runs one file through load → prompt → generate → (optional) save.
pub struct Processor<C: ConfigProvider, G: GenerationClient, S: ResultSink> {
    registry: LoaderRegistry,
    config: C,
    client: G,
    sink: S,
}

impl<C: ConfigProvider, G: GenerationClient, S: ResultSink> Processor<C, G, S> {
    pub fn new(registry: LoaderRegistry, config: C, client: G, sink: S) -> Self {
        Self {
            registry,
            config,
            client,
            sink,
        }
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    pub async fn process(
        &self,
        path: &Path,
        question: Option<&str>,
        prompt_type: &str,
    ) -> Result<ResultEnvelope> {
        tracing::info!("🚀 Processing {}", path.display());

        // Load
        let loader = self.registry.resolve(path)?;
        tracing::debug!("Using {} loader", loader.name());
        let record = loader.load(path)?;

        // Prompt
        let prompt = self.select_prompt(record.kind(), question, prompt_type)?;
        tracing::debug!("Prompt: {}", prompt);

        let kind = record.kind();
        let source_path = record.source_path().to_string();
        let mut metadata = record.metadata().clone();

        // Generate
        let request = build_request(record, &prompt, self.config.generation_options());
        tracing::info!("Calling model {}", self.config.model());
        let response = self.client.generate(self.config.model(), &request).await?;
        tracing::debug!("Received {} characters", response.text.len());

        metadata.insert("gemini_model".to_string(), json!(self.config.model()));
        metadata.insert(
            "processing_timestamp".to_string(),
            json!(chrono::Local::now().to_rfc3339()),
        );

        let envelope = ResultEnvelope {
            source_path,
            kind,
            prompt,
            response_text: response.text,
            metadata,
        };

        // Save
        if self.config.save_results() {
            let location = self.sink.persist(&envelope).await?;
            tracing::info!("📁 Results saved to: {}", location);
        }

        tracing::info!("✅ Processed {}", envelope.source_path);
        Ok(envelope)
    }

    /// A non-empty question wins over the configured template.
    pub fn select_prompt(
        &self,
        kind: DataKind,
        question: Option<&str>,
        prompt_type: &str,
    ) -> Result<String> {
        match question.map(str::trim).filter(|q| !q.is_empty()) {
            Some(question) => Ok(question.to_string()),
            None => self
                .config
                .prompt_template(kind, prompt_type)
                .map(str::to_string),
        }
    }

    /// Resolve loader and prompt only. The file is not opened.
    pub fn plan(
        &self,
        path: &Path,
        question: Option<&str>,
        prompt_type: &str,
    ) -> Result<ProcessingPlan> {
        let loader = self.registry.resolve(path)?;
        let prompt = self.select_prompt(loader.kind(), question, prompt_type)?;

        Ok(ProcessingPlan {
            source_path: display_path(path),
            loader: loader.name(),
            kind: loader.kind(),
            prompt,
        })
    }
}
