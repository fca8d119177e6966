// Adapters: concrete implementations of the domain ports (generation endpoint, result storage)

pub mod gemini;
pub mod storage;

pub use gemini::GeminiClient;
pub use storage::LocalResultSink;
