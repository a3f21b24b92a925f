use crate::config::validate_report_settings;
use crate::core::ConfigProvider;
use crate::domain::model::TimeFrame;
use crate::utils::error::{ReportError, Result};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub report: ReportSection,
    pub source: SourceConfig,
    #[serde(default)]
    pub filters: FiltersConfig,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSection {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// 本機路徑或 http(s) URL
    pub path: String,
    pub sheet: Option<String>,
}

fn default_schedules() -> Vec<String> {
    vec![
        "Non-controlled".to_string(),
        "Controlled".to_string(),
        "Unknown".to_string(),
    ]
}

fn default_top_n() -> usize {
    20
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiltersConfig {
    #[serde(default)]
    pub time_frame: TimeFrame,
    pub period: Option<String>,
    #[serde(default)]
    pub wards: Vec<String>,
    #[serde(default = "default_schedules")]
    pub schedules: Vec<String>,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self {
            time_frame: TimeFrame::default(),
            period: None,
            wards: Vec::new(),
            schedules: default_schedules(),
            top_n: default_top_n(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Vec<String>,
    pub compression: Option<CompressionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub filename: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    /// "compact" 或 "json"
    pub log_format: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ReportError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ReportError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${STOCK_EXPORT_URL})，未設定的保留原樣
    fn substitute_env_vars(content: &str) -> String {
        static RE: OnceLock<Regex> = OnceLock::new();
        let re = RE.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    /// 是否啟用監控
    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    /// 是否輸出 JSON 格式日誌
    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.log_format.as_deref())
            .map(|f| f.eq_ignore_ascii_case("json"))
            .unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn source(&self) -> &str {
        &self.source.path
    }

    fn sheet(&self) -> Option<&str> {
        self.source.sheet.as_deref()
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn time_frame(&self) -> TimeFrame {
        self.filters.time_frame
    }

    fn period(&self) -> Option<&str> {
        self.filters.period.as_deref()
    }

    fn wards(&self) -> &[String] {
        &self.filters.wards
    }

    fn schedules(&self) -> &[String] {
        &self.filters.schedules
    }

    fn top_n(&self) -> usize {
        self.filters.top_n
    }

    fn output_formats(&self) -> &[String] {
        &self.load.output_formats
    }

    fn archive_name(&self) -> Option<&str> {
        self.load
            .compression
            .as_ref()
            .filter(|c| c.enabled)
            .map(|c| c.filename.as_str())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        crate::utils::validation::validate_non_empty_string("report.name", &self.report.name)?;
        validate_report_settings(self)
    }
}
