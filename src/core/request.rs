//! Shapes a [`NormalizedRecord`] and a prompt into a [`PromptRequest`].

use crate::domain::model::{
    GenerationOptions, NormalizedRecord, Payload, PromptRequest, RecordContent, StructuredTable,
};
use std::path::Path;

/// Rows rendered when a spreadsheet is flattened to text.
pub const MAX_PREVIEW_ROWS: usize = 10;

pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

pub fn build_request(
    record: NormalizedRecord,
    prompt: &str,
    options: GenerationOptions,
) -> PromptRequest {
    let mime_type = mime_type_for(record.source_path());

    let payload = match record.into_content() {
        RecordContent::Bytes(data) => Payload::InlineBytes {
            data,
            mime_type: mime_type.to_string(),
        },
        RecordContent::Table(table) => Payload::Text(flatten_table(&table)),
        RecordContent::Text(text) => Payload::Text(text),
    };

    PromptRequest {
        payload,
        prompt: prompt.to_string(),
        options,
    }
}

/// MIME type from the file extension. Unknown extensions get
/// `application/octet-stream`.
pub fn mime_type_for(path: &str) -> &'static str {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(FALLBACK_MIME_TYPE, |ext| {
            match ext.to_lowercase().as_str() {
                "jpg" | "jpeg" => "image/jpeg",
                "png" => "image/png",
                "gif" => "image/gif",
                "bmp" => "image/bmp",
                "webp" => "image/webp",
                _ => FALLBACK_MIME_TYPE,
            }
        })
}

/// Render a table as readable text, keeping at most [`MAX_PREVIEW_ROWS`] rows.
pub fn flatten_table(table: &StructuredTable) -> String {
    let mut lines = vec![
        "Spreadsheet Data:".to_string(),
        format!("Columns: {}", table.columns().join(", ")),
        format!("Total Rows: {}", table.row_count()),
        "\nFirst 10 rows of data:".to_string(),
    ];

    for (i, row) in table.rows().iter().take(MAX_PREVIEW_ROWS).enumerate() {
        let cells: Vec<String> = table
            .columns()
            .iter()
            .map(|col| format!("{}: {}", col, row.get(col).map(String::as_str).unwrap_or("")))
            .collect();
        lines.push(format!("Row {}: {}", i + 1, cells.join(", ")));
    }

    if table.row_count() > MAX_PREVIEW_ROWS {
        lines.push(format!(
            "... and {} more rows",
            table.row_count() - MAX_PREVIEW_ROWS
        ));
    }

    lines.join("\n")
}
