pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use adapters::LocalStorage;
pub use core::{etl::EtlEngine, pipeline::StockReportPipeline};
pub use domain::model::{DrugSchedule, StockReport, TimeFrame};
pub use utils::error::{ReportError, Result};
