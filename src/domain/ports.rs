use crate::domain::model::{Record, ReportBundle, TimeFrame};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    /// Local path or http(s) URL of the stock export.
    fn source(&self) -> &str;
    fn sheet(&self) -> Option<&str>;
    fn output_path(&self) -> &str;
    fn time_frame(&self) -> TimeFrame;
    fn period(&self) -> Option<&str>;
    fn wards(&self) -> &[String];
    fn schedules(&self) -> &[String];
    fn top_n(&self) -> usize;
    fn output_formats(&self) -> &[String];
    /// `None` writes loose files instead of a ZIP archive.
    fn archive_name(&self) -> Option<&str>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<Record>>;
    async fn transform(&self, data: Vec<Record>) -> Result<ReportBundle>;
    async fn load(&self, result: ReportBundle) -> Result<String>;
}
