use crate::domain::model::Record;
use crate::utils::error::{ReportError, Result};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use serde_json::Value;
use std::collections::HashMap;
use std::io::Cursor;

pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xls", "ods", "csv"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Workbook,
    Csv,
}

impl SourceFormat {
    pub fn from_extension(extension: Option<&str>) -> Result<Self> {
        match extension {
            Some("xlsx") | Some("xlsm") | Some("xls") | Some("ods") => Ok(SourceFormat::Workbook),
            Some("csv") => Ok(SourceFormat::Csv),
            other => Err(ReportError::ConfigError {
                message: format!(
                    "Unsupported source format: {}. Supported: {}",
                    other.unwrap_or("<none>"),
                    SUPPORTED_EXTENSIONS.join(", ")
                ),
            }),
        }
    }
}

/// A decoded sheet: the header row plus the non-blank data rows.
#[derive(Debug, Clone, Default)]
pub struct DecodedTable {
    pub headers: Vec<String>,
    pub records: Vec<Record>,
}

impl DecodedTable {
    fn push_row<I>(&mut self, cells: I)
    where
        I: IntoIterator<Item = Value>,
    {
        let mut cells = cells.into_iter();
        let mut data = HashMap::with_capacity(self.headers.len());
        for header in &self.headers {
            // 短列補 Null，每筆紀錄都有完整欄位
            let value = cells.next().unwrap_or(Value::Null);
            if !header.is_empty() {
                data.insert(header.clone(), value);
            }
        }
        let record = Record { data };
        if !record.is_blank() {
            self.records.push(record);
        }
    }
}

pub fn decode(bytes: Vec<u8>, format: SourceFormat, sheet: Option<&str>) -> Result<DecodedTable> {
    match format {
        SourceFormat::Workbook => decode_workbook(bytes, sheet),
        SourceFormat::Csv => decode_csv(&bytes),
    }
}

/// Reads one worksheet (the named one, or the first) into records.
pub fn decode_workbook(bytes: Vec<u8>, sheet: Option<&str>) -> Result<DecodedTable> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let sheet_names = workbook.sheet_names();

    let sheet_name = match sheet {
        Some(name) => {
            if !sheet_names.iter().any(|s| s == name) {
                return Err(ReportError::ConfigValidationError {
                    field: "sheet".to_string(),
                    message: format!(
                        "Sheet '{}' not found. Available sheets: {}",
                        name,
                        sheet_names.join(", ")
                    ),
                });
            }
            name.to_string()
        }
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| ReportError::ProcessingError {
                message: "Workbook contains no worksheets".to_string(),
            })?,
    };

    tracing::debug!("Reading worksheet '{}'", sheet_name);
    let range = workbook.worksheet_range(&sheet_name)?;
    Ok(records_from_rows(range.rows()))
}

pub(crate) fn records_from_rows<'a, I>(mut rows: I) -> DecodedTable
where
    I: Iterator<Item = &'a [Data]>,
{
    let mut table = DecodedTable {
        headers: match rows.next() {
            Some(header) => header.iter().map(header_name).collect(),
            None => return DecodedTable::default(),
        },
        records: Vec::new(),
    };

    for row in rows {
        table.push_row(row.iter().map(cell_to_value));
    }
    table
}

fn header_name(cell: &Data) -> String {
    match cell_to_value(cell) {
        Value::String(s) => clean_header(&s),
        Value::Null => String::new(),
        other => clean_header(&other.to_string()),
    }
}

fn clean_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().to_string()
}

pub fn cell_to_value(cell: &Data) -> Value {
    match cell {
        Data::Empty | Data::Error(_) => Value::Null,
        Data::String(s) => Value::String(s.clone()),
        Data::Int(n) => Value::from(*n),
        Data::Float(f) => serde_json::Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Data::Bool(b) => Value::Bool(*b),
        // 時間長度不是日期，保留原始天數
        Data::DateTime(dt) if dt.is_duration() => serde_json::Number::from_f64(dt.as_f64())
            .map(Value::Number)
            .unwrap_or(Value::Null),
        // calamine 依活頁簿的 1900/1904 日期系統換算
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| Value::String(d.format("%Y-%m-%dT%H:%M:%S").to_string()))
            .unwrap_or(Value::Null),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::String(s.clone()),
    }
}

/// Converts a bare Excel serial (1900 system), as found in CSV exports, to a date-time.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let days = serial.trunc() as i64;
    let seconds = (serial.fract() * 86_400.0).round() as i64;
    let offset = TimeDelta::try_days(days)?.checked_add(&TimeDelta::try_seconds(seconds)?)?;
    epoch.checked_add_signed(offset)
}

pub fn decode_csv(bytes: &[u8]) -> Result<DecodedTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes);

    let mut table = DecodedTable {
        headers: reader.headers()?.iter().map(clean_header).collect(),
        records: Vec::new(),
    };

    for row in reader.records() {
        let row = row?;
        table.push_row(row.iter().map(|cell| {
            if cell.trim().is_empty() {
                Value::Null
            } else {
                Value::String(cell.to_string())
            }
        }));
    }

    Ok(table)
}
