//! Document loader for word-processor (`.docx`) and paged (`.pdf`) files.
//!
//! A PDF page whose text cannot be extracted does not void the document: its
//! text becomes `[page N: extraction failed: <reason>]` and the page is counted
//! in the `failed_pages` metadata entry.

use crate::domain::model::{DataKind, Metadata, NormalizedRecord};
use crate::domain::ports::Loader;
use crate::loaders::{display_path, extension_of};
use crate::utils::error::{GenAiError, Result};
use serde_json::json;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;

#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentLoader;

impl DocumentLoader {
    pub fn new() -> Self {
        Self
    }

    fn load_docx(&self, bytes: &[u8], source: &str) -> Result<NormalizedRecord> {
        let doc = docx_rs::read_docx(bytes).map_err(|e| {
            GenAiError::ExtractionError {
                path: source.to_string(),
                message: format!("Failed to parse DOCX: {e}"),
            }
            .logged()
        })?;

        let paragraphs: Vec<String> = doc
            .document
            .children
            .iter()
            .filter_map(|child| match child {
                docx_rs::DocumentChild::Paragraph(para) => Some(paragraph_text(para)),
                _ => None,
            })
            .collect();

        tracing::debug!("DOCX {}: {} paragraphs", source, paragraphs.len());

        let mut metadata = Metadata::new();
        metadata.insert("paragraph_count".to_string(), json!(paragraphs.len()));
        metadata.insert("file_size".to_string(), json!(bytes.len()));
        metadata.insert("format".to_string(), json!("docx"));

        Ok(NormalizedRecord::document(
            paragraphs.join("\n"),
            metadata,
            source,
        ))
    }

    fn load_pdf(&self, bytes: &[u8], source: &str) -> Result<NormalizedRecord> {
        let doc = lopdf::Document::load_mem(bytes).map_err(|e| {
            GenAiError::ExtractionError {
                path: source.to_string(),
                message: format!("Failed to parse PDF: {e}"),
            }
            .logged()
        })?;

        if doc.is_encrypted() {
            return Err(GenAiError::ExtractionError {
                path: source.to_string(),
                message: "PDF content is encrypted".to_string(),
            }
            .logged());
        }

        let pages = doc.get_pages();
        let (text, failed_pages) = render_pages(pages.keys().copied(), source, |page_number| {
            extract_page_text(&doc, page_number)
        });

        tracing::debug!(
            "PDF {}: {} pages ({} failed)",
            source,
            pages.len(),
            failed_pages
        );

        let mut metadata = Metadata::new();
        metadata.insert("page_count".to_string(), json!(pages.len()));
        metadata.insert("failed_pages".to_string(), json!(failed_pages));
        metadata.insert("file_size".to_string(), json!(bytes.len()));
        metadata.insert("format".to_string(), json!("pdf"));

        Ok(NormalizedRecord::document(text, metadata, source))
    }
}

impl Loader for DocumentLoader {
    fn kind(&self) -> DataKind {
        DataKind::Document
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["docx", "pdf"]
    }

    fn load(&self, path: &Path) -> Result<NormalizedRecord> {
        let source = display_path(path);
        tracing::debug!("Loading document: {}", source);

        let bytes = std::fs::read(path).map_err(|e| GenAiError::IoError(e).logged())?;

        match extension_of(path).as_str() {
            "docx" => self.load_docx(&bytes, &source),
            "pdf" => self.load_pdf(&bytes, &source),
            other => Err(GenAiError::UnsupportedFormat {
                extension: format!(".{other}"),
            }
            .logged()),
        }
    }
}

fn paragraph_text(para: &docx_rs::Paragraph) -> String {
    let mut output = String::new();
    for child in &para.children {
        match child {
            docx_rs::ParagraphChild::Run(run) => push_run_text(run, &mut output),
            docx_rs::ParagraphChild::Hyperlink(link) => {
                for inner in &link.children {
                    if let docx_rs::ParagraphChild::Run(run) = inner {
                        push_run_text(run, &mut output);
                    }
                }
            }
            _ => {}
        }
    }
    output
}

fn push_run_text(run: &docx_rs::Run, output: &mut String) {
    for run_child in &run.children {
        if let docx_rs::RunChild::Text(text) = run_child {
            output.push_str(&text.text);
        }
    }
}

/// Page header plus text for every page. A page that fails is replaced by
/// its marker line and counted.
fn render_pages<F>(
    page_numbers: impl IntoIterator<Item = u32>,
    source: &str,
    extract: F,
) -> (String, usize)
where
    F: Fn(u32) -> std::result::Result<String, String>,
{
    let mut lines = Vec::new();
    let mut failed_pages = 0usize;

    for page_number in page_numbers {
        lines.push(format!("--- Page {page_number} ---"));

        match extract(page_number) {
            Ok(text) => lines.push(text.trim_end_matches('\n').to_string()),
            Err(reason) => {
                tracing::warn!(
                    "⚠️ Page {} of {} could not be extracted: {}",
                    page_number,
                    source,
                    reason
                );
                failed_pages += 1;
                lines.push(format!(
                    "[page {page_number}: extraction failed: {reason}]"
                ));
            }
        }
    }

    (lines.join("\n"), failed_pages)
}

fn extract_page_text(doc: &lopdf::Document, page_number: u32) -> std::result::Result<String, String> {
    guard_extraction(|| doc.extract_text(&[page_number]).map_err(|e| e.to_string()))
}

/// The PDF text layer can panic on malformed fonts; that counts as a failed page.
fn guard_extraction<F>(extract: F) -> std::result::Result<String, String>
where
    F: FnOnce() -> std::result::Result<String, String>,
{
    match catch_unwind(AssertUnwindSafe(extract)) {
        Ok(result) => result,
        Err(panic) => Err(panic
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| panic.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "text extraction panicked".to_string())),
    }
}
