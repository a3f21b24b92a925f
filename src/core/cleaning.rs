use crate::adapters::workbook::excel_serial_to_datetime;
use crate::domain::model::{DrugSchedule, Record, StockRequest};
use crate::utils::error::{ReportError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

pub const COL_DATE: &str = "Date";
pub const COL_REQUEST: &str = "Request Number";
pub const COL_DESTINATION: &str = "Destination Location";
pub const COL_ITEM: &str = "Inventory Item";
pub const COL_SCHEDULE: &str = "Controlled Drug Schedule";
pub const COL_USER: &str = "Submitting User";
pub const COL_QUANTITY: &str = "Quantity";
pub const COL_VALUE: &str = "Value";

pub const REQUIRED_COLUMNS: [&str; 8] = [
    COL_DATE,
    COL_REQUEST,
    COL_DESTINATION,
    COL_ITEM,
    COL_SCHEDULE,
    COL_USER,
    COL_QUANTITY,
    COL_VALUE,
];

pub const UNATTRIBUTED_USER: &str = "UNATTRIBUTED";
pub const UNSPECIFIED_DESTINATION: &str = "Unspecified";

fn catalogue_suffix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\s*[\{\(\[]\s*[A-Z0-9]{4,6}\s*[\}\)\]]\s*$")
            .expect("catalogue suffix pattern is valid")
    })
}

fn repeated_spaces_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"  +").expect("space pattern is valid"))
}

/// Strips a trailing catalogue code such as `(ABC123)` and collapses repeated spaces.
pub fn clean_item_name(raw: &str) -> String {
    let without_code = catalogue_suffix_re().replace(raw, "");
    repeated_spaces_re()
        .replace_all(without_code.trim(), " ")
        .into_owned()
}

fn value_as_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        }),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Numeric coercion: anything unparseable becomes `None`.
pub fn parse_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s
                .trim()
                .chars()
                .filter(|c| *c != ',' && *c != '£')
                .collect();
            cleaned.parse::<f64>().ok().filter(|f| f.is_finite())
        }
        _ => None,
    }
}

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%d/%m/%Y %H:%M",
];

pub fn parse_date(value: Option<&Value>) -> Option<NaiveDate> {
    match value? {
        Value::Number(n) => n
            .as_f64()
            .and_then(excel_serial_to_datetime)
            .map(|dt| dt.date()),
        Value::String(s) => parse_date_str(s.trim()),
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<NaiveDate> {
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            chrono::DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.date_naive())
        })
        .or_else(|| {
            s.parse::<f64>()
                .ok()
                .and_then(excel_serial_to_datetime)
                .map(|dt| dt.date())
        })
}

/// 檢查表頭是否包含所有必要欄位
pub fn check_columns<S: AsRef<str>>(headers: &[S]) -> Result<()> {
    match REQUIRED_COLUMNS
        .iter()
        .find(|column| !headers.iter().any(|h| h.as_ref() == **column))
    {
        Some(column) => Err(ReportError::MissingColumnError {
            column: column.to_string(),
        }),
        None => Ok(()),
    }
}

/// Turns raw rows into typed stock request lines.
pub fn clean_records(records: &[Record]) -> Result<Vec<StockRequest>> {
    if let Some(first) = records.first() {
        let columns: Vec<&str> = first.data.keys().map(String::as_str).collect();
        check_columns(&columns)?;
    }

    let mut lines = Vec::with_capacity(records.len());
    let mut coerced_values = 0usize;

    for (index, record) in records.iter().enumerate() {
        let row_number = index + 1;

        let date = parse_date(record.get(COL_DATE)).ok_or_else(|| ReportError::ProcessingError {
            message: format!(
                "row {}: invalid or missing {} value {:?}",
                row_number,
                COL_DATE,
                record.get(COL_DATE)
            ),
        })?;

        let value = match parse_number(record.get(COL_VALUE)) {
            Some(v) => v,
            None => {
                coerced_values += 1;
                0.0
            }
        };
        let quantity = parse_number(record.get(COL_QUANTITY));
        if quantity.is_none() {
            tracing::debug!("row {}: no numeric quantity", row_number);
        }

        let inventory_item = value_as_text(record.get(COL_ITEM)).unwrap_or_default();

        lines.push(StockRequest {
            date,
            request_number: value_as_text(record.get(COL_REQUEST)).unwrap_or_default(),
            destination: value_as_text(record.get(COL_DESTINATION))
                .unwrap_or_else(|| UNSPECIFIED_DESTINATION.to_string()),
            item_clean: clean_item_name(&inventory_item),
            inventory_item,
            drug_schedule: DrugSchedule::from_source(
                value_as_text(record.get(COL_SCHEDULE)).as_deref(),
            ),
            submitting_user: value_as_text(record.get(COL_USER))
                .unwrap_or_else(|| UNATTRIBUTED_USER.to_string()),
            quantity,
            value,
        });
    }

    if coerced_values > 0 {
        tracing::debug!("{} rows had a non-numeric value, treated as 0", coerced_values);
    }

    Ok(lines)
}
