//! Loader registry: picks the loader for a file by its extension.

use crate::domain::ports::Loader;
use crate::loaders::{extension_of, DocumentLoader, ImageLoader, SpreadsheetLoader, TextLoader};
use crate::utils::error::{GenAiError, Result};
use std::path::Path;

/// Ordered set of loaders with pairwise disjoint extension sets.
pub struct LoaderRegistry {
    loaders: Vec<Box<dyn Loader>>,
}

impl LoaderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            loaders: Vec::new(),
        }
    }

    /// Image, text, document and spreadsheet loaders, in that order, after
    /// each has passed its capability check.
    pub fn with_default_loaders() -> Result<Self> {
        let mut registry = Self::new();
        registry.register(ImageLoader::new())?;
        registry.register(TextLoader::new())?;
        registry.register(DocumentLoader::new())?;
        registry.register(SpreadsheetLoader::new())?;
        registry.check_capabilities()?;

        tracing::debug!(
            "Loader registry ready: {}",
            registry.supported_extensions().join(", ")
        );
        Ok(registry)
    }

    /// Register a loader. Fails if it claims an extension another loader
    /// already owns.
    pub fn register<L: Loader + 'static>(&mut self, loader: L) -> Result<()> {
        for ext in loader.extensions() {
            if let Some(owner) = self.loaders.iter().find(|l| l.supports(ext)) {
                return Err(GenAiError::ConfigError {
                    message: format!(
                        "extension .{} is claimed by both '{}' and '{}' loaders",
                        ext,
                        owner.name(),
                        loader.name()
                    ),
                }
                .logged());
            }
        }

        self.loaders.push(Box::new(loader));
        Ok(())
    }

    pub fn check_capabilities(&self) -> Result<()> {
        for loader in &self.loaders {
            loader.check_capabilities().map_err(GenAiError::logged)?;
        }
        Ok(())
    }

    /// First registered loader whose extension set contains the path's
    /// extension (case-insensitive).
    pub fn resolve(&self, path: &Path) -> Result<&dyn Loader> {
        let extension = extension_of(path);

        self.loaders
            .iter()
            .find(|loader| !extension.is_empty() && loader.supports(&extension))
            .map(|loader| loader.as_ref())
            .ok_or_else(|| {
                GenAiError::UnsupportedFormat {
                    extension: format!(".{extension}"),
                }
                .logged()
            })
    }

    pub fn supported_extensions(&self) -> Vec<&'static str> {
        self.loaders
            .iter()
            .flat_map(|loader| loader.extensions().iter().copied())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.loaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }
}

impl Default for LoaderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
