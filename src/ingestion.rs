//! Turning an uploaded spreadsheet into a [`LedgerTable`].

use crate::dataset::{LedgerTable, Value};
use crate::error::{DashboardError, Result};
use crate::schema::Month;
use log::{debug, info};
use std::io::Read;
use std::path::Path;

/// Bytes handed over by the file uploader, with the name they were uploaded under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self { name, bytes })
    }

    pub fn format(&self) -> UploadFormat {
        UploadFormat::detect(&self.name, &self.bytes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFormat {
    Csv,
    Workbook,
}

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0];

impl UploadFormat {
    /// Picks the format from the file extension, sniffing the content when that is
    /// inconclusive.
    pub fn detect(name: &str, bytes: &[u8]) -> Self {
        let extension = Path::new(name)
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase());
        match extension.as_deref() {
            Some("csv") | Some("txt") => UploadFormat::Csv,
            Some("xlsx") | Some("xlsm") | Some("xlsb") | Some("xls") | Some("ods") => {
                UploadFormat::Workbook
            }
            _ if bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE_MAGIC) => {
                UploadFormat::Workbook
            }
            _ => UploadFormat::Csv,
        }
    }
}

/// Parses an upload into a ledger table. The first row holds the column names.
///
/// Any parse failure is reported as [`DashboardError::Load`]; a file with a header
/// but no data rows is [`DashboardError::EmptyDataset`].
pub fn load_ledger(upload: &Upload) -> Result<LedgerTable> {
    let format = upload.format();
    debug!("Loading '{}' as {:?}", upload.name, format);

    let table = match format {
        UploadFormat::Csv => parse_csv(upload.bytes.as_slice())?,
        UploadFormat::Workbook => parse_workbook(&upload.bytes)?,
    };

    if table.columns().is_empty() {
        return Err(DashboardError::Load(format!(
            "'{}' has no header row",
            upload.name
        )));
    }
    table.ensure_not_empty()?;

    info!(
        "Loaded ledger '{}': {} rows, {} columns",
        upload.name,
        table.len(),
        table.columns().len()
    );
    Ok(table)
}

/// Month columns hold amounts; every other column is a label and stays as text.
fn measure_mask(columns: &[String]) -> Vec<bool> {
    columns
        .iter()
        .map(|c| Month::from_column(c).is_some())
        .collect()
}

fn cell_from_text(raw: &str, is_measure: bool) -> Value {
    if is_measure {
        Value::parse(raw)
    } else {
        Value::text(raw)
    }
}

pub fn parse_csv<R: Read>(reader: R) -> Result<LedgerTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns: Vec<String> = rdr
        .headers()
        .map_err(|e| DashboardError::Load(format!("Invalid CSV header: {e}")))?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let measures = measure_mask(&columns);
    let is_measure = |i: usize| measures.get(i).copied().unwrap_or(false);
    let mut rows: Vec<Vec<Value>> = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(|e| DashboardError::Load(format!("Invalid CSV row: {e}")))?;
        rows.push(
            record
                .iter()
                .enumerate()
                .map(|(i, raw)| cell_from_text(raw, is_measure(i)))
                .collect(),
        );
    }

    Ok(LedgerTable::new(columns, rows))
}

#[cfg(feature = "xlsx")]
pub fn parse_workbook(bytes: &[u8]) -> Result<LedgerTable> {
    use calamine::{Data, Reader};
    use std::io::Cursor;

    let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| DashboardError::Load("Workbook has no worksheets".to_string()))??;

    let mut sheet_rows = range.rows();
    let columns: Vec<String> = match sheet_rows.next() {
        Some(header) => header.iter().map(|c| c.to_string().trim().to_string()).collect(),
        None => Vec::new(),
    };

    let measures = measure_mask(&columns);
    let is_measure = |i: usize| measures.get(i).copied().unwrap_or(false);
    let rows = sheet_rows
        .map(|row| {
            row.iter()
                .enumerate()
                .map(|(i, cell)| match cell {
                    Data::Int(n) => Value::Number(*n as f64),
                    Data::Float(f) => Value::Number(*f),
                    Data::String(s) => cell_from_text(s, is_measure(i)),
                    Data::Empty => Value::Empty,
                    other => Value::Text(other.to_string()),
                })
                .collect()
        })
        .collect();

    Ok(LedgerTable::new(columns, rows))
}

#[cfg(not(feature = "xlsx"))]
pub fn parse_workbook(_bytes: &[u8]) -> Result<LedgerTable> {
    Err(DashboardError::Load(
        "Workbook uploads need the `xlsx` feature".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEDGER_CSV: &str = "\
Year,Scenario,Account,business_unit,Jan,Feb,Mar,Apr,May,Jun,Jul,Aug,Sep,Oct,Nov,Dec
2023,Actuals,Sales,Software,100,200,0,0,0,0,0,0,0,0,0,0
2023,Budget,Sales,Software,90,210,0,0,0,0,0,0,0,0,0,0
2022,Actuals,Expense,Software,\"(50)\",0,0,0,0,0,0,0,0,0,0,0
";

    #[test]
    fn test_detect_format() {
        assert_eq!(UploadFormat::detect("ledger.csv", b"Year"), UploadFormat::Csv);
        assert_eq!(
            UploadFormat::detect("ledger.XLSX", b""),
            UploadFormat::Workbook
        );
        assert_eq!(
            UploadFormat::detect("upload", b"PK\x03\x04rest"),
            UploadFormat::Workbook
        );
        assert_eq!(UploadFormat::detect("upload", b"Year,"), UploadFormat::Csv);
    }

    #[test]
    fn test_load_csv_ledger() {
        let upload = Upload::new("ledger.csv", LEDGER_CSV.as_bytes().to_vec());
        let table = load_ledger(&upload).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.columns().len(), 16);
        assert!(table.validate_ledger_schema().is_ok());

        let expense = table.row(2).unwrap();
        assert_eq!(expense.get("Jan").unwrap(), &Value::Number(-50.0));
        assert!(expense.get("Year").unwrap().matches("2022"));
    }

    #[test]
    fn test_csv_dimension_labels_stay_text() {
        let csv = "\
Year,Scenario,Account,business_unit,Jan
2023,Actuals,Sales,01,\"1,000\"
2023,Actuals,Sales,1,(5)
";
        let table = parse_csv(csv.as_bytes()).unwrap();

        let first = table.row(0).unwrap();
        assert_eq!(first.get("business_unit").unwrap(), &Value::Text("01".to_string()));
        assert_eq!(first.get("Jan").unwrap(), &Value::Number(1000.0));
        assert_eq!(first.get("Year").unwrap().as_year(), Some(2023));

        let second = table.row(1).unwrap();
        assert_eq!(second.get("business_unit").unwrap(), &Value::Text("1".to_string()));
        assert_eq!(second.get("Jan").unwrap(), &Value::Number(-5.0));
    }

    #[test]
    fn test_header_only_csv_is_empty_dataset() {
        let upload = Upload::new("ledger.csv", b"Year,Scenario\n".to_vec());
        assert!(matches!(
            load_ledger(&upload),
            Err(DashboardError::EmptyDataset)
        ));
    }

    #[test]
    fn test_empty_upload_is_load_error() {
        let upload = Upload::new("ledger.csv", Vec::new());
        assert!(matches!(load_ledger(&upload), Err(DashboardError::Load(_))));
    }

    #[test]
    fn test_invalid_utf8_csv_is_load_error() {
        let upload = Upload::new("ledger.csv", vec![b'Y', 0xFF, 0xFE, b'\n', b'1']);
        assert!(matches!(load_ledger(&upload), Err(DashboardError::Load(_))));
    }

    #[cfg(feature = "xlsx")]
    #[test]
    fn test_garbage_workbook_is_load_error() {
        let upload = Upload::new("ledger.xlsx", b"definitely not a workbook".to_vec());
        let err = load_ledger(&upload).unwrap_err();
        assert!(matches!(err, DashboardError::Load(_)));
        assert!(err.is_fatal_for_session());
    }
}
