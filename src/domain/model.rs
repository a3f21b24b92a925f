use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// One raw source row, keyed by trimmed header name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Record {
    pub data: HashMap<String, serde_json::Value>,
}

impl Record {
    pub fn get(&self, column: &str) -> Option<&serde_json::Value> {
        self.data.get(column).filter(|v| !v.is_null())
    }

    pub fn is_blank(&self) -> bool {
        self.data.values().all(|v| match v {
            serde_json::Value::Null => true,
            serde_json::Value::String(s) => s.trim().is_empty(),
            _ => false,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DrugSchedule {
    #[serde(rename = "Non-controlled")]
    NonControlled,
    Controlled,
    Unknown,
}

impl DrugSchedule {
    pub const ALL: [DrugSchedule; 3] = [
        DrugSchedule::NonControlled,
        DrugSchedule::Controlled,
        DrugSchedule::Unknown,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DrugSchedule::NonControlled => "Non-controlled",
            DrugSchedule::Controlled => "Controlled",
            DrugSchedule::Unknown => "Unknown",
        }
    }

    /// Parses a normalised label as used in filters (case-insensitive).
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|s| s.label().eq_ignore_ascii_case(label))
    }

    /// Maps the raw "Controlled Drug Schedule" column value.
    pub fn from_source(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("Non-controlled Drugs") => DrugSchedule::NonControlled,
            Some("Controlled Drugs") | Some("Controlled drugs") => DrugSchedule::Controlled,
            _ => DrugSchedule::Unknown,
        }
    }
}

impl fmt::Display for DrugSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum TimeFrame {
    Daily,
    Weekly,
    #[default]
    Monthly,
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimeFrame::Daily => "Daily",
            TimeFrame::Weekly => "Weekly",
            TimeFrame::Monthly => "Monthly",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for TimeFrame {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(TimeFrame::Daily),
            "weekly" => Ok(TimeFrame::Weekly),
            "monthly" => Ok(TimeFrame::Monthly),
            other => Err(format!(
                "unknown time frame '{}', expected daily, weekly or monthly",
                other
            )),
        }
    }
}

/// A cleaned stock request line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRequest {
    pub date: NaiveDate,
    pub request_number: String,
    pub destination: String,
    pub inventory_item: String,
    pub item_clean: String,
    pub drug_schedule: DrugSchedule,
    pub submitting_user: String,
    /// None when the export has no numeric quantity
    pub quantity: Option<f64>,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSelection {
    pub time_frame: TimeFrame,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub label: String,
}

impl PeriodSelection {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    pub unique_requests: usize,
    pub line_items: usize,
    pub total_value: f64,
    pub unique_wards: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WardCount {
    pub destination: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSummary {
    pub item: String,
    pub total_quantity: f64,
    pub total_value: f64,
    pub requests: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemValue {
    pub item: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleWardValue {
    pub schedule: DrugSchedule,
    pub destination: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleValue {
    pub schedule: DrugSchedule,
    pub value: f64,
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub user: String,
    pub requests: usize,
    pub line_items: usize,
    pub total_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedUser {
    pub rank: usize,
    #[serde(flatten)]
    pub summary: UserSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub requests: usize,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TrendHighlight {
    Day { date: NaiveDate },
    Range { start: NaiveDate, end: NaiveDate },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTrend {
    pub title: String,
    pub points: Vec<DailyPoint>,
    pub highlight: Option<TrendHighlight>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub total_rows: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedFilters {
    pub wards: Vec<String>,
    pub schedules: Vec<DrugSchedule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockReport {
    pub source_name: String,
    pub period: PeriodSelection,
    pub filters: AppliedFilters,
    pub top_n: usize,
    pub kpis: Kpis,
    pub ward_requests: Vec<WardCount>,
    pub ward_lines: Vec<WardCount>,
    pub items: Vec<ItemSummary>,
    pub item_values: Vec<ItemValue>,
    pub schedule_ward_values: Vec<ScheduleWardValue>,
    pub schedule_values: Vec<ScheduleValue>,
    pub users: Vec<UserSummary>,
    pub top_users: Vec<RankedUser>,
    pub daily_trend: Option<DailyTrend>,
    pub dataset: DatasetSummary,
}

/// A rendered output file, ready to be written by the load phase.
#[derive(Debug, Clone)]
pub struct OutputFile {
    pub name: String,
    pub contents: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct ReportBundle {
    pub report: StockReport,
    pub files: Vec<OutputFile>,
}
