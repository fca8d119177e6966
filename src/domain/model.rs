use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

/// Metadata attached to a loaded file. Values are JSON scalars.
pub type Metadata = BTreeMap<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    Image,
    Text,
    Document,
    Spreadsheet,
}

impl DataKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataKind::Image => "image",
            DataKind::Text => "text",
            DataKind::Document => "document",
            DataKind::Spreadsheet => "spreadsheet",
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecordContent {
    Bytes(Vec<u8>),
    Text(String),
    Table(StructuredTable),
}

/// Tabular content with a fixed column list.
///
/// Every row holds exactly the declared columns; cells that were missing or
/// empty in the source are stored as `""`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuredTable {
    columns: Vec<String>,
    rows: Vec<HashMap<String, String>>,
}

impl StructuredTable {
    /// Build a table from positional rows.
    ///
    /// Rows shorter than the header are padded with `""`. A row wider than the
    /// header is rejected with the offending (1-based) row number. Column
    /// names must be unique.
    pub fn from_rows(
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
    ) -> std::result::Result<Self, String> {
        let mut seen = HashSet::with_capacity(columns.len());
        if let Some(duplicate) = columns.iter().find(|column| !seen.insert(column.as_str())) {
            return Err(format!("duplicate column name '{duplicate}'"));
        }

        let mut mapped = Vec::with_capacity(rows.len());

        for (index, row) in rows.into_iter().enumerate() {
            if row.len() > columns.len() {
                return Err(format!(
                    "row {} has {} fields but the header has {}",
                    index + 1,
                    row.len(),
                    columns.len()
                ));
            }

            let mut cells = row.into_iter();
            let record = columns
                .iter()
                .map(|column| (column.clone(), cells.next().unwrap_or_default()))
                .collect();
            mapped.push(record);
        }

        Ok(Self {
            columns,
            rows: mapped,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[HashMap<String, String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Cell value by row index and column name.
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        self.rows.get(row)?.get(column).map(String::as_str)
    }
}

/// A loaded file in uniform shape.
///
/// Only the per-kind constructors create records, so the kind always matches
/// the content: images carry bytes, spreadsheets carry a table, text and
/// documents carry text.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    content: RecordContent,
    metadata: Metadata,
    kind: DataKind,
    source_path: String,
}

impl NormalizedRecord {
    pub fn image(bytes: Vec<u8>, metadata: Metadata, source_path: impl Into<String>) -> Self {
        Self::build(RecordContent::Bytes(bytes), metadata, DataKind::Image, source_path)
    }

    pub fn text(text: String, metadata: Metadata, source_path: impl Into<String>) -> Self {
        Self::build(RecordContent::Text(text), metadata, DataKind::Text, source_path)
    }

    pub fn document(text: String, metadata: Metadata, source_path: impl Into<String>) -> Self {
        Self::build(RecordContent::Text(text), metadata, DataKind::Document, source_path)
    }

    pub fn spreadsheet(
        table: StructuredTable,
        metadata: Metadata,
        source_path: impl Into<String>,
    ) -> Self {
        Self::build(
            RecordContent::Table(table),
            metadata,
            DataKind::Spreadsheet,
            source_path,
        )
    }

    fn build(
        content: RecordContent,
        metadata: Metadata,
        kind: DataKind,
        source_path: impl Into<String>,
    ) -> Self {
        Self {
            content,
            metadata,
            kind,
            source_path: source_path.into(),
        }
    }

    pub fn content(&self) -> &RecordContent {
        &self.content
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn kind(&self) -> DataKind {
        self.kind
    }

    pub fn source_path(&self) -> &str {
        &self.source_path
    }

    pub fn into_content(self) -> RecordContent {
        self.content
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    InlineBytes { data: Vec<u8>, mime_type: String },
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PromptRequest {
    pub payload: Payload,
    pub prompt: String,
    pub options: GenerationOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub text: String,
}

/// Outcome of processing one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    pub source_path: String,
    pub kind: DataKind,
    pub prompt: String,
    pub response_text: String,
    pub metadata: Metadata,
}
