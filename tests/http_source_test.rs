use anyhow::Result;
use httpmock::prelude::*;
use stock_report::utils::error::ReportError;
use stock_report::{CliConfig, EtlEngine, LocalStorage, StockReportPipeline};
use tempfile::TempDir;

const STOCK_CSV: &str = "\
Date,Request Number,Destination Location,Inventory Item,Controlled Drug Schedule,Submitting User,Quantity,Value
02/09/2024,R1,ICU,Paracetamol 500mg (PAR500),Non-controlled Drugs,alice,2,2.50
03/09/2024,R2,Ward 5,Oxycodone 5mg (OXY5),Controlled drugs,bob,1,12.00
";

#[tokio::test]
async fn test_end_to_end_with_http_source() -> Result<()> {
    let output_dir = TempDir::new()?;
    let server = MockServer::start();

    let export_mock = server.mock(|when, then| {
        when.method(GET).path("/exports/stock.csv");
        then.status(200)
            .header("Content-Type", "text/csv")
            .body(STOCK_CSV);
    });

    let config = CliConfig {
        source: server.url("/exports/stock.csv"),
        output_path: output_dir.path().to_string_lossy().into_owned(),
        formats: vec!["json".to_string()],
        no_zip: true,
        ..CliConfig::default()
    };

    let storage = LocalStorage::new(config.output_path.clone());
    let engine = EtlEngine::new_with_monitoring(StockReportPipeline::new(storage, config), false);
    engine.run().await?;

    export_mock.assert();

    let summary: serde_json::Value =
        serde_json::from_slice(&std::fs::read(output_dir.path().join("summary.json"))?)?;
    assert_eq!(summary["source_name"], "stock.csv");
    assert_eq!(summary["kpis"]["line_items"], 2);
    assert_eq!(summary["kpis"]["total_value"], 14.5);

    Ok(())
}

#[tokio::test]
async fn test_http_error_status_is_reported() -> Result<()> {
    let output_dir = TempDir::new()?;
    let server = MockServer::start();

    let export_mock = server.mock(|when, then| {
        when.method(GET).path("/exports/missing.xlsx");
        then.status(503);
    });

    let config = CliConfig {
        source: server.url("/exports/missing.xlsx"),
        output_path: output_dir.path().to_string_lossy().into_owned(),
        ..CliConfig::default()
    };

    let storage = LocalStorage::new(config.output_path.clone());
    let result = EtlEngine::new(StockReportPipeline::new(storage, config)).run().await;

    export_mock.assert();
    assert!(matches!(
        result,
        Err(ReportError::HttpStatusError { status: 503, .. })
    ));

    Ok(())
}
