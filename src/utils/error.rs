use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("HTTP {status} returned by {url}")]
    HttpStatusError { url: String, status: u16 },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Workbook error: {0}")]
    WorkbookError(#[from] calamine::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Required column '{column}' not found in source data")]
    MissingColumnError { column: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("{message}")]
    EmptySelection { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Source,
    Data,
    Output,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// 程序退出碼：警告 0、處理錯誤 1、可重試 2、系統錯誤 3
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Low => 0,
            ErrorSeverity::High => 1,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl ReportError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ReportError::ConfigError { .. }
            | ReportError::ConfigValidationError { .. }
            | ReportError::InvalidConfigValueError { .. }
            | ReportError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ReportError::HttpError(_) | ReportError::HttpStatusError { .. } => {
                ErrorCategory::Source
            }
            ReportError::CsvError(_)
            | ReportError::WorkbookError(_)
            | ReportError::MissingColumnError { .. }
            | ReportError::ProcessingError { .. }
            | ReportError::EmptySelection { .. } => ErrorCategory::Data,
            ReportError::ZipError(_) | ReportError::SerializationError(_) => {
                ErrorCategory::Output
            }
            ReportError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 篩選結果為空只是警告
            ReportError::EmptySelection { .. } => ErrorSeverity::Low,
            // 網路問題通常重試即可
            ReportError::HttpError(_) | ReportError::HttpStatusError { .. } => {
                ErrorSeverity::Medium
            }
            ReportError::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ReportError::EmptySelection { .. } => {
                "Widen the period, or remove ward / schedule filters"
            }
            ReportError::HttpError(_) | ReportError::HttpStatusError { .. } => {
                "Check the source URL and network connectivity, then retry"
            }
            ReportError::MissingColumnError { .. } => {
                "Make sure the export has the standard stock request columns in its header row"
            }
            ReportError::WorkbookError(_) | ReportError::CsvError(_) => {
                "Re-export the spreadsheet and make sure it is not open or corrupted"
            }
            ReportError::ProcessingError { .. } => {
                "Check the reported row in the source file for malformed values"
            }
            ReportError::ConfigError { .. }
            | ReportError::ConfigValidationError { .. }
            | ReportError::InvalidConfigValueError { .. }
            | ReportError::MissingConfigError { .. } => {
                "Review the command line options or configuration file"
            }
            ReportError::ZipError(_) | ReportError::SerializationError(_) => {
                "Check that the output directory is writable and has free space"
            }
            ReportError::IoError(_) => {
                "Check that the file exists and that you have permission to access it"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ReportError::EmptySelection { message } => message.clone(),
            ReportError::MissingColumnError { column } => {
                format!("The source data has no '{}' column", column)
            }
            ReportError::IoError(e) if e.kind() == std::io::ErrorKind::NotFound => {
                format!("Data file not found: {}", e)
            }
            ReportError::HttpStatusError { url, status } => {
                format!("Could not download {} (HTTP {})", url, status)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_follow_severity() {
        assert_eq!(ErrorSeverity::Low.exit_code(), 0);
        assert_eq!(ErrorSeverity::High.exit_code(), 1);
        assert_eq!(ErrorSeverity::Medium.exit_code(), 2);
        assert_eq!(ErrorSeverity::Critical.exit_code(), 3);
    }

    #[test]
    fn test_empty_selection_is_low_severity() {
        let err = ReportError::EmptySelection {
            message: "nothing".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Low);
        assert_eq!(err.category(), ErrorCategory::Data);
        assert_eq!(err.user_friendly_message(), "nothing");
    }

    #[test]
    fn test_http_errors_are_retryable() {
        let err = ReportError::HttpStatusError {
            url: "http://localhost/data.csv".to_string(),
            status: 503,
        };
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert_eq!(err.category(), ErrorCategory::Source);
        assert!(err.user_friendly_message().contains("503"));
    }

    #[test]
    fn test_missing_file_message() {
        let err = ReportError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Stock - Sept 24.xlsx",
        ));
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.user_friendly_message().starts_with("Data file not found"));
    }
}
