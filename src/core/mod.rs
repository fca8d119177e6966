pub mod processor;
pub mod registry;
pub mod request;

pub use crate::domain::model::{DataKind, NormalizedRecord, ResultEnvelope};
pub use crate::domain::ports::{ConfigProvider, GenerationClient, Loader, ResultSink};
pub use crate::utils::error::Result;
pub use processor::{ProcessingPlan, Processor};
pub use registry::LoaderRegistry;
