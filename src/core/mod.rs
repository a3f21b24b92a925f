pub mod aggregate;
pub mod cleaning;
pub mod etl;
pub mod filter;
pub mod period;
pub mod pipeline;
pub mod render;

pub use crate::domain::model::{Record, ReportBundle};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
