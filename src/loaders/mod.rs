//! Format loaders, one per [`DataKind`](crate::domain::model::DataKind).
//!
//! | Loader | Extensions |
//! |--------|------------|
//! | [`ImageLoader`] | `jpg`, `jpeg`, `png`, `gif`, `bmp`, `webp` |
//! | [`TextLoader`] | `txt`, `md`, `json`, `xml`, `html` |
//! | [`DocumentLoader`] | `docx`, `pdf` |
//! | [`SpreadsheetLoader`] | `xlsx`, `xls`, `csv` |

pub mod document;
pub mod image;
pub mod spreadsheet;
pub mod text;

pub use document::DocumentLoader;
pub use image::ImageLoader;
pub use spreadsheet::SpreadsheetLoader;
pub use text::TextLoader;

use crate::domain::ports::normalize_extension;
use std::path::Path;

pub(crate) fn display_path(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

pub(crate) fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(normalize_extension)
        .unwrap_or_default()
}
