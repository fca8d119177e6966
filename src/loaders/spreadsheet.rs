use crate::domain::model::{DataKind, Metadata, NormalizedRecord, StructuredTable};
use crate::domain::ports::Loader;
use crate::loaders::{display_path, extension_of};
use crate::utils::error::{GenAiError, Result};
use calamine::{open_workbook_auto, Reader};
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Loads CSV files and the first worksheet of Excel workbooks.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpreadsheetLoader;

impl SpreadsheetLoader {
    pub fn new() -> Self {
        Self
    }
}

impl Loader for SpreadsheetLoader {
    fn kind(&self) -> DataKind {
        DataKind::Spreadsheet
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["xlsx", "xls", "csv"]
    }

    fn load(&self, path: &Path) -> Result<NormalizedRecord> {
        let source = display_path(path);
        let extension = extension_of(path);
        tracing::debug!("Loading spreadsheet: {}", source);

        let file_size = std::fs::metadata(path)
            .map_err(|e| GenAiError::IoError(e).logged())?
            .len();

        let parsed = if extension == "csv" {
            read_csv(path)
        } else {
            read_workbook(path)
        };

        let table = parsed
            .and_then(|(header, rows)| StructuredTable::from_rows(normalize_header(header), rows))
            .map_err(|message| {
                GenAiError::ParseError {
                    path: source.clone(),
                    message,
                }
                .logged()
            })?;

        tracing::debug!(
            "Spreadsheet {}: {} rows x {} columns",
            source,
            table.row_count(),
            table.column_count()
        );

        let mut metadata = Metadata::new();
        metadata.insert("row_count".to_string(), json!(table.row_count()));
        metadata.insert("column_count".to_string(), json!(table.column_count()));
        metadata.insert("columns".to_string(), json!(table.columns().join(", ")));
        metadata.insert("file_size".to_string(), json!(file_size));
        metadata.insert("format".to_string(), json!(extension));

        Ok(NormalizedRecord::spreadsheet(table, metadata, source))
    }
}

type RawSheet = (Vec<String>, Vec<Vec<String>>);

fn read_csv(path: &Path) -> std::result::Result<RawSheet, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| format!("Failed to open CSV: {e}"))?;

    let header: Vec<String> = reader
        .headers()
        .map_err(|e| format!("Failed to read CSV header: {e}"))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| format!("Malformed CSV row: {e}"))?;
        rows.push(record.iter().map(|cell| cell.to_string()).collect());
    }

    Ok((header, rows))
}

fn read_workbook(path: &Path) -> std::result::Result<RawSheet, String> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| format!("Failed to open workbook: {e}"))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| "Workbook has no worksheets".to_string())?
        .map_err(|e| format!("Failed to read first worksheet: {e}"))?;

    let mut rows = range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect::<Vec<String>>());

    let header = rows.next().unwrap_or_default();
    Ok((header, rows.collect()))
}

/// Empty header cells become `Unnamed: i`; repeated names get the first free
/// `.1`, `.2`, ... suffix, skipping names already in use.
fn normalize_header(header: Vec<String>) -> Vec<String> {
    let mut next_suffix: HashMap<String, usize> = HashMap::new();
    let mut taken: HashSet<String> = HashSet::new();

    header
        .into_iter()
        .enumerate()
        .map(|(index, name)| {
            let name = name.trim().to_string();
            let base = if name.is_empty() {
                format!("Unnamed: {index}")
            } else {
                name
            };

            let mut column = base.clone();
            if taken.contains(&column) {
                let suffix = next_suffix.entry(base.clone()).or_insert(1);
                loop {
                    column = format!("{base}.{suffix}");
                    *suffix += 1;
                    if !taken.contains(&column) {
                        break;
                    }
                }
            }

            taken.insert(column.clone());
            column
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::RecordContent;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn write_csv(name: &str, content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join(name);
        std::fs::write(&file_path, content).unwrap();
        (temp_dir, file_path)
    }

    /// Minimal xlsx: one sheet, inline strings, B3 left empty.
    fn people_workbook() -> Vec<u8> {
        use std::io::Write;
        use zip::write::{FileOptions, ZipWriter};

        let parts = [
            (
                "[Content_Types].xml",
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
</Types>"#,
            ),
            (
                "_rels/.rels",
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#,
            ),
            (
                "xl/workbook.xml",
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets><sheet name="People" sheetId="1" r:id="rId1"/></sheets>
</workbook>"#,
            ),
            (
                "xl/_rels/workbook.xml.rels",
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
</Relationships>"#,
            ),
            (
                "xl/worksheets/sheet1.xml",
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<sheetData>
<row r="1"><c r="A1" t="inlineStr"><is><t>name</t></is></c><c r="B1" t="inlineStr"><is><t>age</t></is></c></row>
<row r="2"><c r="A2" t="inlineStr"><is><t>Ann</t></is></c><c r="B2"><v>30</v></c></row>
<row r="3"><c r="A3" t="inlineStr"><is><t>Bob</t></is></c></row>
</sheetData>
</worksheet>"#,
            ),
        ];

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, xml) in parts {
            zip.start_file::<_, ()>(name, FileOptions::default()).unwrap();
            zip.write_all(xml.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_supports_spreadsheet_extensions() {
        let loader = SpreadsheetLoader::new();
        assert!(loader.supports("csv"));
        assert!(loader.supports(".XLSX"));
        assert!(loader.supports("xls"));
        assert!(!loader.supports("tsv"));
    }

    #[test]
    fn test_load_two_row_csv() {
        let (_dir, file_path) = write_csv("people.csv", "name,age\nAnn,30\nBob,\n");

        let record = SpreadsheetLoader::new().load(&file_path).unwrap();

        assert_eq!(record.kind(), DataKind::Spreadsheet);
        assert_eq!(record.metadata()["row_count"], json!(2));
        assert_eq!(record.metadata()["column_count"], json!(2));
        assert_eq!(record.metadata()["columns"], json!("name, age"));
        assert_eq!(record.metadata()["format"], json!("csv"));

        match record.content() {
            RecordContent::Table(table) => {
                assert_eq!(table.columns(), &["name".to_string(), "age".to_string()]);
                assert_eq!(table.cell(0, "age"), Some("30"));
                assert_eq!(table.cell(1, "name"), Some("Bob"));
                assert_eq!(table.cell(1, "age"), Some(""));
            }
            other => panic!("Expected table content, got {other:?}"),
        }
    }

    #[test]
    fn test_short_rows_are_padded() {
        let (_dir, file_path) = write_csv("short.csv", "a,b,c\n1\n2,3\n");

        let record = SpreadsheetLoader::new().load(&file_path).unwrap();
        match record.content() {
            RecordContent::Table(table) => {
                assert_eq!(table.cell(0, "b"), Some(""));
                assert_eq!(table.cell(0, "c"), Some(""));
                assert_eq!(table.cell(1, "b"), Some("3"));
            }
            other => panic!("Expected table content, got {other:?}"),
        }
    }

    #[test]
    fn test_wide_row_is_parse_error() {
        let (_dir, file_path) = write_csv("ragged.csv", "a,b\n1,2\n3,4,5\n");

        let err = SpreadsheetLoader::new().load(&file_path).unwrap_err();
        assert!(matches!(err, GenAiError::ParseError { .. }));
    }

    #[test]
    fn test_unreadable_workbook_is_parse_error() {
        let (_dir, file_path) = write_csv("fake.xlsx", "this is not a workbook");

        let err = SpreadsheetLoader::new().load(&file_path).unwrap_err();
        assert!(matches!(err, GenAiError::ParseError { .. }));
    }

    #[test]
    fn test_generated_suffix_skips_existing_names() {
        let header = vec!["a".to_string(), "a".to_string(), "a.1".to_string()];
        assert_eq!(normalize_header(header), vec!["a", "a.1", "a.1.1"]);

        let header = vec!["a".to_string(), "a.1".to_string(), "a".to_string()];
        assert_eq!(normalize_header(header), vec!["a", "a.1", "a.2"]);
    }

    #[test]
    fn test_colliding_header_keeps_every_cell() {
        let (_dir, file_path) = write_csv("collide.csv", "a,a,a.1\n1,2,3\n");

        let record = SpreadsheetLoader::new().load(&file_path).unwrap();
        match record.content() {
            RecordContent::Table(table) => {
                assert_eq!(table.columns(), &["a", "a.1", "a.1.1"]);
                assert_eq!(table.rows()[0].len(), table.column_count());
                assert_eq!(table.cell(0, "a"), Some("1"));
                assert_eq!(table.cell(0, "a.1"), Some("2"));
                assert_eq!(table.cell(0, "a.1.1"), Some("3"));
            }
            other => panic!("Expected table content, got {other:?}"),
        }
    }

    #[test]
    fn test_load_first_worksheet_of_xlsx() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("people.xlsx");
        std::fs::write(&file_path, people_workbook()).unwrap();

        let record = SpreadsheetLoader::new().load(&file_path).unwrap();

        assert_eq!(record.metadata()["row_count"], json!(2));
        assert_eq!(record.metadata()["columns"], json!("name, age"));
        assert_eq!(record.metadata()["format"], json!("xlsx"));
        match record.content() {
            RecordContent::Table(table) => {
                assert_eq!(table.cell(0, "name"), Some("Ann"));
                assert_eq!(table.cell(0, "age"), Some("30"));
                assert_eq!(table.cell(1, "name"), Some("Bob"));
                assert_eq!(table.cell(1, "age"), Some(""));
            }
            other => panic!("Expected table content, got {other:?}"),
        }
    }

    #[test]
    fn test_normalize_header() {
        let header = vec![
            "id".to_string(),
            "".to_string(),
            "id".to_string(),
            "id".to_string(),
        ];
        assert_eq!(
            normalize_header(header),
            vec!["id", "Unnamed: 1", "id.1", "id.2"]
        );
    }
}
