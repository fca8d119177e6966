pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod loaders;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliArgs;

pub use crate::adapters::{GeminiClient, LocalResultSink};
pub use crate::config::AppConfig;
pub use crate::core::{LoaderRegistry, ProcessingPlan, Processor};
pub use crate::domain::model::{DataKind, NormalizedRecord, ResultEnvelope};
pub use crate::utils::error::{GenAiError, Result};
