use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor_enabled: bool,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor_enabled,
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("🚀 Starting stock report run");
        // 每次執行重新計時
        let mut monitor = SystemMonitor::new(self.monitor_enabled);

        // Extract
        tracing::info!("📥 Extracting source data...");
        let raw_data = self.pipeline.extract().await?;
        tracing::info!("📥 Extracted {} rows", raw_data.len());
        monitor.end_phase("Extract");

        // Transform
        tracing::info!("🔄 Cleaning, filtering and aggregating...");
        let bundle = self.pipeline.transform(raw_data).await?;
        tracing::info!(
            "🔄 {} line items selected for {}, {} output files rendered",
            bundle.report.kpis.line_items,
            bundle.report.period.label,
            bundle.files.len()
        );
        monitor.end_phase("Transform");

        // Load
        tracing::info!("💾 Writing outputs...");
        let output_path = self.pipeline.load(bundle).await?;
        tracing::info!("💾 Output saved to: {}", output_path);
        monitor.end_phase("Load");

        monitor.log_summary();
        Ok(output_path)
    }
}
