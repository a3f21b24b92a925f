use crate::adapters::source::{DataSource, SourceFetcher};
use crate::adapters::workbook::{self, SourceFormat};
use crate::core::aggregate::build_report;
use crate::core::cleaning::{check_columns, clean_records};
use crate::core::filter::ReportFilter;
use crate::core::period::{available_periods, select_period};
use crate::core::render::render_outputs;
use crate::core::{ConfigProvider, Pipeline, Record, ReportBundle, Storage};
use crate::domain::model::{DrugSchedule, PeriodSelection, StockRequest};
use crate::utils::error::{ReportError, Result};
use std::io::Write;
use zip::write::{SimpleFileOptions, ZipWriter};

pub struct StockReportPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    fetcher: SourceFetcher,
}

impl<S: Storage, C: ConfigProvider> StockReportPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self {
            storage,
            config,
            fetcher: SourceFetcher::new(),
        }
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    fn source(&self) -> Result<DataSource> {
        DataSource::parse(self.config.source())
    }

    fn schedules(&self) -> Result<Vec<DrugSchedule>> {
        self.config
            .schedules()
            .iter()
            .map(|label| {
                DrugSchedule::from_label(label).ok_or_else(|| {
                    ReportError::InvalidConfigValueError {
                        field: "schedules".to_string(),
                        value: label.clone(),
                        reason: "Valid schedules: Non-controlled, Controlled, Unknown"
                            .to_string(),
                    }
                })
            })
            .collect()
    }

    /// Extracts and cleans the source, then lists the selectable periods.
    pub async fn available_periods(&self) -> Result<Vec<PeriodSelection>> {
        let records = self.extract().await?;
        let lines = clean_records(&records)?;
        Ok(available_periods(
            lines.iter().map(|l| l.date),
            self.config.time_frame(),
        ))
    }

    fn build_filter(&self, lines: &[StockRequest]) -> Result<ReportFilter> {
        let dates: Vec<_> = lines.iter().map(|l| l.date).collect();
        let period = select_period(&dates, self.config.time_frame(), self.config.period())?;
        tracing::info!("🗓️ Selected period: {}", period.label);

        Ok(ReportFilter::new(period)
            .with_wards(self.config.wards().to_vec())
            .with_schedules(self.schedules()?))
    }

    fn build_archive(&self, bundle: &ReportBundle) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
        for file in &bundle.files {
            zip.start_file(file.name.as_str(), SimpleFileOptions::default())?;
            zip.write_all(&file.contents)?;
        }
        // 完成並取回底層 Vec<u8>
        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for StockReportPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<Record>> {
        let source = self.source()?;
        let format = SourceFormat::from_extension(source.extension().as_deref())?;

        let bytes = self.fetcher.fetch(&source).await?;
        tracing::debug!("Fetched {} bytes from {}", bytes.len(), source.display_name());

        let table = workbook::decode(bytes, format, self.config.sheet())?;
        check_columns(&table.headers)?;
        let records = table.records;
        if records.is_empty() {
            tracing::warn!("Source {} contains no data rows", source.display_name());
        }
        Ok(records)
    }

    async fn transform(&self, data: Vec<Record>) -> Result<ReportBundle> {
        let lines = clean_records(&data)?;
        tracing::debug!("Cleaned {} stock request lines", lines.len());

        let filter = self.build_filter(&lines)?;
        let selected = filter.apply(&lines)?;

        let source_name = self.source()?.display_name();
        let report = build_report(
            &source_name,
            &lines,
            &selected,
            &filter,
            self.config.top_n(),
        )?;

        let files = render_outputs(&report, self.config.output_formats())?;
        Ok(ReportBundle { report, files })
    }

    async fn load(&self, result: ReportBundle) -> Result<String> {
        let base = self.config.output_path().trim_end_matches('/');

        match self.config.archive_name() {
            Some(archive_name) => {
                tracing::debug!("Creating ZIP file with {} files", result.files.len());
                let zip_data = self.build_archive(&result)?;

                tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
                self.storage.write_file(archive_name, &zip_data).await?;
                Ok(format!("{}/{}", base, archive_name))
            }
            None => {
                for file in &result.files {
                    tracing::debug!("Writing {} ({} bytes)", file.name, file.contents.len());
                    self.storage.write_file(&file.name, &file.contents).await?;
                }
                Ok(base.to_string())
            }
        }
    }
}
