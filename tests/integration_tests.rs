use anyhow::Result;
use std::io::Read;
use std::path::Path;
use stock_report::utils::error::{ErrorSeverity, ReportError};
use stock_report::{CliConfig, EtlEngine, LocalStorage, StockReportPipeline, TimeFrame};
use tempfile::TempDir;

const STOCK_CSV: &str = "\
Date,Request Number,Destination Location,Inventory Item,Controlled Drug Schedule,Submitting User,Quantity,Value
2024-09-02,R1,ICU,Paracetamol 500mg (PAR500),Non-controlled Drugs,alice,2,2.50
2024-09-02,R1,ICU,Morphine 10mg/1ml (MOR10),Controlled Drugs,alice,1,\"£1,250.00\"
2024-09-03,R2,Ward 5,Paracetamol 500mg (PAR500),Non-controlled Drugs,bob,4,5.00
2024-09-10,R3,ICU,Ibuprofen 200mg,,,1,0.75
";

fn write_source(dir: &TempDir, contents: &str) -> Result<String> {
    let path = dir.path().join("stock.csv");
    std::fs::write(&path, contents)?;
    Ok(path.to_string_lossy().into_owned())
}

fn config_for(source: String, output_path: &Path) -> CliConfig {
    CliConfig {
        source,
        output_path: output_path.to_string_lossy().into_owned(),
        ..CliConfig::default()
    }
}

fn read_zip_entry(archive: &mut zip::ZipArchive<std::io::Cursor<Vec<u8>>>, name: &str) -> Result<String> {
    let mut entry = archive.by_name(name)?;
    let mut contents = String::new();
    entry.read_to_string(&mut contents)?;
    Ok(contents)
}

#[tokio::test]
async fn test_end_to_end_monthly_report_archive() -> Result<()> {
    let input_dir = TempDir::new()?;
    let output_dir = TempDir::new()?;
    let source = write_source(&input_dir, STOCK_CSV)?;

    let config = config_for(source, output_dir.path());
    let storage = LocalStorage::new(config.output_path.clone());
    let pipeline = StockReportPipeline::new(storage, config);
    let engine = EtlEngine::new_with_monitoring(pipeline, false);

    let output = engine.run().await?;
    assert!(output.ends_with("stock_report.zip"));

    let zip_path = output_dir.path().join("stock_report.zip");
    assert!(zip_path.exists());

    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(std::fs::read(&zip_path)?))?;
    let names: Vec<String> = archive.file_names().map(str::to_string).collect();
    for expected in [
        "summary.json",
        "report.md",
        "ward_requests.csv",
        "items.csv",
        "schedule_values.csv",
        "top_users.csv",
    ] {
        assert!(names.iter().any(|n| n == expected), "missing {}", expected);
    }
    // 月報不產生每日趨勢
    assert!(!names.iter().any(|n| n == "daily_trend.csv"));

    let summary: serde_json::Value = serde_json::from_str(&read_zip_entry(&mut archive, "summary.json")?)?;
    assert_eq!(summary["period"]["label"], "September 2024");
    assert_eq!(summary["kpis"]["unique_requests"], 3);
    assert_eq!(summary["kpis"]["line_items"], 4);
    assert_eq!(summary["kpis"]["unique_wards"], 2);
    assert_eq!(summary["kpis"]["total_value"], 1258.25);
    assert!(summary["daily_trend"].is_null());

    let items = read_zip_entry(&mut archive, "items.csv")?;
    assert!(items.contains("Paracetamol 500mg"));
    assert!(!items.contains("(PAR500)"));

    let users = read_zip_entry(&mut archive, "top_users.csv")?;
    assert!(users.contains("UNATTRIBUTED"));

    let markdown = read_zip_entry(&mut archive, "report.md")?;
    assert!(markdown.contains("September 2024"));

    Ok(())
}

#[tokio::test]
async fn test_weekly_report_with_loose_files() -> Result<()> {
    let input_dir = TempDir::new()?;
    let output_dir = TempDir::new()?;
    let source = write_source(&input_dir, STOCK_CSV)?;

    let mut config = config_for(source, output_dir.path());
    config.time_frame = TimeFrame::Weekly;
    config.period = Some("2024-W36".to_string());
    config.no_zip = true;

    let storage = LocalStorage::new(config.output_path.clone());
    let engine = EtlEngine::new(StockReportPipeline::new(storage, config));
    engine.run().await?;

    assert!(!output_dir.path().join("stock_report.zip").exists());

    let summary: serde_json::Value =
        serde_json::from_slice(&std::fs::read(output_dir.path().join("summary.json"))?)?;
    assert_eq!(summary["kpis"]["line_items"], 3);
    assert_eq!(summary["kpis"]["unique_requests"], 2);

    let trend = std::fs::read_to_string(output_dir.path().join("daily_trend.csv"))?;
    // 趨勢涵蓋整個資料集
    assert!(trend.contains("2024-09-10"));

    let markdown = std::fs::read_to_string(output_dir.path().join("report.md"))?;
    assert!(markdown.contains("Week 36"));

    Ok(())
}

#[tokio::test]
async fn test_ward_and_schedule_filters() -> Result<()> {
    let input_dir = TempDir::new()?;
    let output_dir = TempDir::new()?;
    let source = write_source(&input_dir, STOCK_CSV)?;

    let mut config = config_for(source, output_dir.path());
    config.wards = vec!["ICU".to_string()];
    config.schedules = vec!["Controlled".to_string()];
    config.formats = vec!["json".to_string()];
    config.no_zip = true;

    let storage = LocalStorage::new(config.output_path.clone());
    EtlEngine::new(StockReportPipeline::new(storage, config)).run().await?;

    let summary: serde_json::Value =
        serde_json::from_slice(&std::fs::read(output_dir.path().join("summary.json"))?)?;
    assert_eq!(summary["kpis"]["line_items"], 1);
    assert_eq!(summary["kpis"]["total_value"], 1250.0);
    assert!(!output_dir.path().join("report.md").exists());

    Ok(())
}

#[tokio::test]
async fn test_empty_selection_is_low_severity() -> Result<()> {
    let input_dir = TempDir::new()?;
    let output_dir = TempDir::new()?;
    let source = write_source(&input_dir, STOCK_CSV)?;

    let mut config = config_for(source, output_dir.path());
    config.wards = vec!["Theatres".to_string()];

    let storage = LocalStorage::new(config.output_path.clone());
    let result = EtlEngine::new(StockReportPipeline::new(storage, config)).run().await;

    let err = result.expect_err("no rows match the ward filter");
    assert!(matches!(err, ReportError::EmptySelection { .. }));
    assert_eq!(err.severity(), ErrorSeverity::Low);
    assert!(!output_dir.path().join("stock_report.zip").exists());

    Ok(())
}

#[tokio::test]
async fn test_missing_column_fails() -> Result<()> {
    let input_dir = TempDir::new()?;
    let output_dir = TempDir::new()?;
    let source = write_source(
        &input_dir,
        "Date,Request Number,Destination Location\n2024-09-02,R1,ICU\n",
    )?;

    let config = config_for(source, output_dir.path());
    let storage = LocalStorage::new(config.output_path.clone());
    let result = EtlEngine::new(StockReportPipeline::new(storage, config)).run().await;

    assert!(matches!(result, Err(ReportError::MissingColumnError { .. })));

    Ok(())
}

#[tokio::test]
async fn test_header_only_source_missing_columns() -> Result<()> {
    let input_dir = TempDir::new()?;
    let output_dir = TempDir::new()?;
    let source = write_source(&input_dir, "Date,Value\n")?;

    let config = config_for(source, output_dir.path());
    let storage = LocalStorage::new(config.output_path.clone());
    let result = EtlEngine::new(StockReportPipeline::new(storage, config)).run().await;

    assert!(matches!(
        result,
        Err(ReportError::MissingColumnError { ref column }) if column == "Request Number"
    ));

    Ok(())
}

#[tokio::test]
async fn test_short_first_row_is_accepted() -> Result<()> {
    let input_dir = TempDir::new()?;
    let output_dir = TempDir::new()?;
    // 第一筆少了最後的 Value 欄
    let source = write_source(
        &input_dir,
        "\
Date,Request Number,Destination Location,Inventory Item,Controlled Drug Schedule,Submitting User,Quantity,Value
2024-09-02,R1,ICU,Paracetamol 500mg (PAR500),Non-controlled Drugs,alice,2
2024-09-03,R2,Ward 5,Paracetamol 500mg (PAR500),Non-controlled Drugs,bob,4,5.00
",
    )?;

    let mut config = config_for(source, output_dir.path());
    config.formats = vec!["json".to_string()];
    config.no_zip = true;

    let storage = LocalStorage::new(config.output_path.clone());
    EtlEngine::new(StockReportPipeline::new(storage, config)).run().await?;

    let summary: serde_json::Value =
        serde_json::from_slice(&std::fs::read(output_dir.path().join("summary.json"))?)?;
    assert_eq!(summary["kpis"]["line_items"], 2);
    assert_eq!(summary["kpis"]["total_value"], 5.0);

    Ok(())
}

#[tokio::test]
async fn test_unknown_period_lists_available() -> Result<()> {
    let input_dir = TempDir::new()?;
    let output_dir = TempDir::new()?;
    let source = write_source(&input_dir, STOCK_CSV)?;

    let mut config = config_for(source, output_dir.path());
    config.period = Some("2024-10".to_string());

    let storage = LocalStorage::new(config.output_path.clone());
    let result = EtlEngine::new(StockReportPipeline::new(storage, config)).run().await;

    let message = result.expect_err("October has no data").to_string();
    assert!(message.contains("September 2024"));

    Ok(())
}

#[tokio::test]
async fn test_available_periods_from_source() -> Result<()> {
    let input_dir = TempDir::new()?;
    let output_dir = TempDir::new()?;
    let source = write_source(&input_dir, STOCK_CSV)?;

    let mut config = config_for(source, output_dir.path());
    config.time_frame = TimeFrame::Weekly;

    let pipeline = StockReportPipeline::new(LocalStorage::new(config.output_path.clone()), config);
    let periods = pipeline.available_periods().await?;

    let labels: Vec<&str> = periods.iter().map(|p| p.label.as_str()).collect();
    assert_eq!(labels.len(), 2);
    assert!(labels[0].starts_with("Week 36"));
    assert!(labels[1].starts_with("Week 37"));

    Ok(())
}
