use clap::Parser;
use stock_report::config::toml_config::TomlConfig;
use stock_report::core::ConfigProvider;
use stock_report::utils::error::ReportError;
use stock_report::utils::{logger, validation::Validate};
use stock_report::{EtlEngine, LocalStorage, StockReportPipeline, TimeFrame};

/// Runs a stock report described by a TOML file.
#[derive(Parser)]
#[command(name = "toml_report", version)]
struct Args {
    /// TOML report definition
    #[arg(short, long, default_value = "stock-report.toml")]
    config: String,

    #[arg(short, long)]
    verbose: bool,

    /// Force monitoring on or off regardless of [monitoring]
    #[arg(long)]
    monitor: Option<bool>,

    /// Replace [filters].time_frame (clears the configured period)
    #[arg(long, value_enum)]
    time_frame: Option<TimeFrame>,

    /// Replace [filters].period
    #[arg(long)]
    period: Option<String>,

    /// Print the resolved report definition and exit
    #[arg(long)]
    dry_run: bool,
}

impl Args {
    fn apply_overrides(&self, config: &mut TomlConfig) {
        if let Some(time_frame) = self.time_frame {
            config.filters.time_frame = time_frame;
            // 換了時間粒度，原本的期間格式不一定適用
            config.filters.period = None;
            tracing::info!("🔧 time_frame overridden: {}", time_frame);
        }
        if let Some(period) = &self.period {
            config.filters.period = Some(period.clone());
            tracing::info!("🔧 period overridden: {}", period);
        }
    }
}

fn fail(e: &ReportError) -> ! {
    tracing::error!("❌ {} (Category: {:?})", e, e.category());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
    std::process::exit(e.severity().exit_code())
}

fn list_or_all(values: &[String]) -> String {
    if values.is_empty() {
        "all".to_string()
    } else {
        values.join(", ")
    }
}

fn describe(config: &TomlConfig) {
    println!("📋 {}", config.report.name);
    if let Some(description) = &config.report.description {
        println!("   {}", description);
    }
    println!();
    println!("📡 Source:     {}", config.source());
    println!("   Sheet:      {}", config.sheet().unwrap_or("(first sheet)"));
    println!("🗓️ Period:     {} {}", config.time_frame(), config.period().unwrap_or("(latest)"));
    println!("🏥 Wards:      {}", list_or_all(config.wards()));
    println!("💊 Schedules:  {}", list_or_all(config.schedules()));
    println!("🏆 Top users:  {}", config.top_n());
    println!("💾 Output:     {} [{}]", config.output_path(), config.output_formats().join(", "));
    match config.archive_name() {
        Some(archive) => println!("   Archive:    {}", archive),
        None => println!("   Archive:    disabled (loose files)"),
    }
    println!();
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load '{}': {}", args.config, e);
            std::process::exit(1);
        }
    };

    logger::init_logger(args.verbose, config.json_logs());
    tracing::info!("📁 Report definition loaded from {}", args.config);

    args.apply_overrides(&mut config);

    if let Err(e) = config.validate() {
        // 配置錯誤一律以 1 結束
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    describe(&config);
    if args.dry_run {
        tracing::info!("🔍 Dry run, nothing extracted or written");
        return;
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    let storage = LocalStorage::new(config.output_path().to_string());
    let engine = EtlEngine::new_with_monitoring(StockReportPipeline::new(storage, config), monitor_enabled);

    match engine.run().await {
        Ok(output_path) => println!("✅ Report written to {}", output_path),
        Err(e) => fail(&e),
    }
}
