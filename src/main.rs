use clap::Parser;
use stock_report::core::ConfigProvider;
use stock_report::utils::error::ReportError;
use stock_report::utils::{logger, validation::Validate};
use stock_report::{CliConfig, EtlEngine, LocalStorage, StockReportPipeline};

fn exit_for(e: &ReportError) {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ Stock report failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    let exit_code = e.severity().exit_code();
    if exit_code > 0 {
        std::process::exit(exit_code);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_logger(config.verbose, config.log_json);

    tracing::info!("Starting stock-report CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let list_periods = config.list_periods;
    let storage = LocalStorage::new(config.output_path.clone());
    let pipeline = StockReportPipeline::new(storage, config);

    if list_periods {
        match pipeline.available_periods().await {
            Ok(periods) => {
                println!("📅 {} periods:", pipeline.config().time_frame());
                for period in periods {
                    println!(
                        "  {}  ({} to {})",
                        period.label,
                        period.start.format("%Y-%m-%d"),
                        period.end.format("%Y-%m-%d")
                    );
                }
            }
            Err(e) => exit_for(&e),
        }
        return Ok(());
    }

    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            println!("✅ Stock report completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => exit_for(&e),
    }

    Ok(())
}
