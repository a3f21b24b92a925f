use crate::config::validate_report_settings;
use crate::core::ConfigProvider;
use crate::domain::model::TimeFrame;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::Parser;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SOURCE: &str = "Stock - Sept 24.xlsx";
pub const DEFAULT_OUTPUT_PATH: &str = ".tmp";
pub const DEFAULT_ARCHIVE_NAME: &str = "stock_report.zip";

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "stock-report")]
#[command(about = "Pharmacy stock request report: cleans a stock export and ranks wards, items and users")]
pub struct CliConfig {
    /// Stock export to read (.xlsx/.xls/.xlsm/.ods/.csv), local path or http(s) URL
    #[arg(long, default_value = DEFAULT_SOURCE)]
    pub source: String,

    /// Worksheet name (defaults to the first sheet)
    #[arg(long)]
    pub sheet: Option<String>,

    #[arg(long, value_enum, default_value_t = TimeFrame::Monthly)]
    pub time_frame: TimeFrame,

    /// Period to report on: YYYY-MM-DD (daily), YYYY-MM-DD or YYYY-Www (weekly), YYYY-MM (monthly).
    /// Defaults to the latest period in the data.
    #[arg(long)]
    pub period: Option<String>,

    /// Only include these wards / destinations
    #[arg(long = "ward", value_delimiter = ',')]
    pub wards: Vec<String>,

    #[arg(
        long = "schedule",
        value_delimiter = ',',
        default_value = "Non-controlled,Controlled,Unknown"
    )]
    pub schedules: Vec<String>,

    /// Rows shown in ranked tables (5-50, step 5)
    #[arg(long, default_value = "20")]
    pub top_n: usize,

    #[arg(long, default_value = DEFAULT_OUTPUT_PATH)]
    pub output_path: String,

    /// Output formats: json, csv, md
    #[arg(long, value_delimiter = ',', default_value = "json,csv,md")]
    pub formats: Vec<String>,

    /// Write loose files instead of a ZIP archive
    #[arg(long)]
    pub no_zip: bool,

    #[arg(long, default_value = DEFAULT_ARCHIVE_NAME)]
    pub archive_name: String,

    /// List the selectable periods for --time-frame and exit
    #[arg(long)]
    pub list_periods: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log process CPU and memory per phase")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE.to_string(),
            sheet: None,
            time_frame: TimeFrame::default(),
            period: None,
            wards: Vec::new(),
            schedules: vec![
                "Non-controlled".to_string(),
                "Controlled".to_string(),
                "Unknown".to_string(),
            ],
            top_n: 20,
            output_path: DEFAULT_OUTPUT_PATH.to_string(),
            formats: vec!["json".to_string(), "csv".to_string(), "md".to_string()],
            no_zip: false,
            archive_name: DEFAULT_ARCHIVE_NAME.to_string(),
            list_periods: false,
            verbose: false,
            monitor: false,
            log_json: false,
        }
    }
}

impl ConfigProvider for CliConfig {
    fn source(&self) -> &str {
        &self.source
    }

    fn sheet(&self) -> Option<&str> {
        self.sheet.as_deref()
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn time_frame(&self) -> TimeFrame {
        self.time_frame
    }

    fn period(&self) -> Option<&str> {
        self.period.as_deref()
    }

    fn wards(&self) -> &[String] {
        &self.wards
    }

    fn schedules(&self) -> &[String] {
        &self.schedules
    }

    fn top_n(&self) -> usize {
        self.top_n
    }

    fn output_formats(&self) -> &[String] {
        &self.formats
    }

    fn archive_name(&self) -> Option<&str> {
        (!self.no_zip).then_some(self.archive_name.as_str())
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_report_settings(self)
    }
}
