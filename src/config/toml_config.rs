use crate::domain::model::{DataKind, GenerationOptions};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{GenAiError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

pub const DEFAULT_PROMPT_TYPE: &str = "default";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub gemini: GeminiConfig,
    pub prompts: PromptsConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub project_id: String,
    pub location: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub access_token: Option<String>,
    pub endpoint: Option<String>,
}

/// Prompt templates per kind, keyed by prompt type. Every table needs a
/// `default` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptsConfig {
    pub image_analysis: HashMap<String, String>,
    pub text_processing: HashMap<String, String>,
    pub document_summary: HashMap<String, String>,
    pub spreadsheet_analysis: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub save_results: bool,
    #[serde(default = "default_output_directory")]
    pub output_directory: String,
}

fn default_output_directory() -> String {
    "./results".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            save_results: false,
            output_directory: default_output_directory(),
        }
    }
}

impl PromptsConfig {
    /// 依資料類型取得對應的提示詞表
    pub fn table(&self, kind: DataKind) -> (&'static str, &HashMap<String, String>) {
        match kind {
            DataKind::Image => ("prompts.image_analysis", &self.image_analysis),
            DataKind::Text => ("prompts.text_processing", &self.text_processing),
            DataKind::Document => ("prompts.document_summary", &self.document_summary),
            DataKind::Spreadsheet => ("prompts.spreadsheet_analysis", &self.spreadsheet_analysis),
        }
    }

    pub fn select(&self, kind: DataKind, prompt_type: &str) -> Result<&str> {
        let (section, templates) = self.table(kind);

        templates
            .get(prompt_type)
            .or_else(|| {
                tracing::debug!(
                    "Prompt type '{}' not found in {}, using default",
                    prompt_type,
                    section
                );
                templates.get(DEFAULT_PROMPT_TYPE)
            })
            .map(String::as_str)
            .ok_or_else(|| {
                GenAiError::MissingConfigError {
                    field: format!("{section}.{DEFAULT_PROMPT_TYPE}"),
                }
                .logged()
            })
    }
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(GenAiError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| GenAiError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${GOOGLE_CLOUD_PROJECT})，未設定的變數保留原字串
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::OnceLock;

        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| {
            Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("static pattern is valid")
        });

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("gemini.project_id", &self.gemini.project_id)?;
        validation::validate_resolved("gemini.project_id", &self.gemini.project_id)?;
        validation::validate_non_empty_string("gemini.location", &self.gemini.location)?;
        validation::validate_non_empty_string("gemini.model", &self.gemini.model)?;
        validation::validate_positive_number("gemini.max_tokens", self.gemini.max_tokens, 1)?;
        validation::validate_range("gemini.temperature", self.gemini.temperature, 0.0, 2.0)?;

        if let Some(token) = &self.gemini.access_token {
            validation::validate_resolved("gemini.access_token", token)?;
        }

        validation::validate_url("gemini.endpoint", &self.endpoint_base())?;
        validation::validate_path("output.output_directory", &self.output.output_directory)?;

        for kind in [
            DataKind::Image,
            DataKind::Text,
            DataKind::Document,
            DataKind::Spreadsheet,
        ] {
            let (section, templates) = self.prompts.table(kind);
            if !templates.contains_key(DEFAULT_PROMPT_TYPE) {
                return Err(GenAiError::MissingConfigError {
                    field: format!("{section}.{DEFAULT_PROMPT_TYPE}"),
                });
            }
        }

        Ok(())
    }

    /// Base URL for the generation endpoint; the regional Vertex AI host
    /// unless `gemini.endpoint` overrides it.
    pub fn endpoint_base(&self) -> String {
        match &self.gemini.endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!("https://{}-aiplatform.googleapis.com", self.gemini.location),
        }
    }
}

impl ConfigProvider for AppConfig {
    fn model(&self) -> &str {
        &self.gemini.model
    }

    fn generation_options(&self) -> GenerationOptions {
        GenerationOptions {
            max_tokens: self.gemini.max_tokens,
            temperature: self.gemini.temperature,
        }
    }

    fn prompt_template(&self, kind: DataKind, prompt_type: &str) -> Result<&str> {
        self.prompts.select(kind, prompt_type)
    }

    fn save_results(&self) -> bool {
        self.output.save_results
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
