#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use toml_config::TomlConfig;

use crate::adapters::workbook::SUPPORTED_EXTENSIONS;
use crate::core::render::OUTPUT_FORMATS;
use crate::core::ConfigProvider;
use crate::domain::model::DrugSchedule;
use crate::utils::error::{ReportError, Result};
use crate::utils::validation::{
    validate_choices, validate_file_extensions, validate_non_empty_string, validate_path,
    validate_range, validate_source, validate_step,
};

pub const MIN_TOP_N: usize = 5;
pub const MAX_TOP_N: usize = 50;
pub const TOP_N_STEP: usize = 5;

/// 兩種配置來源共用的檢查
pub fn validate_report_settings<C: ConfigProvider + ?Sized>(config: &C) -> Result<()> {
    validate_source("source", config.source(), &SUPPORTED_EXTENSIONS)?;

    if let Some(sheet) = config.sheet() {
        validate_non_empty_string("sheet", sheet)?;
    }

    validate_path("output_path", config.output_path())?;

    validate_range("top_n", config.top_n(), MIN_TOP_N, MAX_TOP_N)?;
    validate_step("top_n", config.top_n(), TOP_N_STEP)?;

    if config.output_formats().is_empty() {
        return Err(ReportError::MissingConfigError {
            field: "output_formats".to_string(),
        });
    }
    validate_choices("output_formats", config.output_formats(), &OUTPUT_FORMATS)?;

    for ward in config.wards() {
        validate_non_empty_string("wards", ward)?;
    }

    for schedule in config.schedules() {
        if DrugSchedule::from_label(schedule).is_none() {
            return Err(ReportError::InvalidConfigValueError {
                field: "schedules".to_string(),
                value: schedule.clone(),
                reason: "Valid schedules: Non-controlled, Controlled, Unknown".to_string(),
            });
        }
    }

    if let Some(archive) = config.archive_name() {
        validate_path("archive_name", archive)?;
        validate_file_extensions("archive_name", &[archive.to_string()], &["zip"])?;
    }

    Ok(())
}
