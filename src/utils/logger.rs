use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// RUST_LOG 優先，否則只開本 crate 的 info (verbose 時為 debug)
fn report_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            "stock_report=debug,info"
        } else {
            "stock_report=info"
        })
    })
}

/// 初始化日誌。`json` 為真時輸出 JSON 行，方便排程器收集
pub fn init_logger(verbose: bool, json: bool) {
    let (compact, json_layer) = if json {
        (None, Some(fmt::layer().with_target(false).json()))
    } else {
        (Some(fmt::layer().with_target(false).compact()), None)
    };

    // 重複初始化 (例如測試中) 時忽略
    let _ = tracing_subscriber::registry()
        .with(report_filter(verbose))
        .with(compact)
        .with(json_layer)
        .try_init();
}
