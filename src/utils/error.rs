use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenAiError {
    #[error("No loader available for file type: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("Failed to decode image {path}: {message}")]
    DecodeError { path: String, message: String },

    #[error("Invalid UTF-8 in {path}: {message}")]
    EncodingError { path: String, message: String },

    #[error("Failed to extract document {path}: {message}")]
    ExtractionError { path: String, message: String },

    #[error("Failed to parse spreadsheet {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Generation request failed: {message}")]
    GenerationError { message: String },

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GenAiError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// 檔案格式不支援
    Format,
    /// 檔案內容無法載入
    Load,
    Config,
    Generation,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl GenAiError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            GenAiError::UnsupportedFormat { .. } => ErrorCategory::Format,
            GenAiError::DecodeError { .. }
            | GenAiError::EncodingError { .. }
            | GenAiError::ExtractionError { .. }
            | GenAiError::ParseError { .. } => ErrorCategory::Load,
            GenAiError::ConfigError { .. }
            | GenAiError::MissingConfigError { .. }
            | GenAiError::InvalidConfigValueError { .. } => ErrorCategory::Config,
            GenAiError::GenerationError { .. } | GenAiError::HttpError(_) => {
                ErrorCategory::Generation
            }
            GenAiError::IoError(_) | GenAiError::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Format | ErrorCategory::Load => ErrorSeverity::High,
            // 網路錯誤通常可以重跑
            ErrorCategory::Generation => ErrorSeverity::Medium,
            ErrorCategory::Config | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            GenAiError::UnsupportedFormat { .. } => {
                "Use one of the supported extensions: images, txt/md/json/xml/html, docx/pdf, csv/xlsx/xls"
            }
            GenAiError::DecodeError { .. } => "Check that the image file is not truncated or mislabeled",
            GenAiError::EncodingError { .. } => "Re-save the text file as UTF-8",
            GenAiError::ExtractionError { .. } => {
                "Make sure the document is not encrypted or corrupted"
            }
            GenAiError::ParseError { .. } => {
                "Check that every row has no more cells than the header row"
            }
            GenAiError::ConfigError { .. }
            | GenAiError::MissingConfigError { .. }
            | GenAiError::InvalidConfigValueError { .. } => {
                "Review the configuration file against the documented sections"
            }
            GenAiError::GenerationError { .. } | GenAiError::HttpError(_) => {
                "Verify network access, the access token and the model name, then retry"
            }
            GenAiError::IoError(_) => "Check that the path exists and is readable/writable",
            GenAiError::SerializationError(_) => "Report this as a bug",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Format => format!("Unsupported file: {}", self),
            ErrorCategory::Load => format!("Could not read file: {}", self),
            ErrorCategory::Config => format!("Configuration problem: {}", self),
            ErrorCategory::Generation => format!("Model request failed: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }

    /// Log the error where it originates and hand it back for propagation.
    pub fn logged(self) -> Self {
        tracing::error!("❌ {}", self);
        self
    }
}
