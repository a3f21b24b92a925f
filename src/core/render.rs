use crate::domain::model::{OutputFile, StockReport, TrendHighlight};
use crate::utils::error::{ReportError, Result};
use crate::utils::format::{format_count, format_currency, format_decimal, format_quantity};
use std::fmt::Write as _;

pub const FORMAT_JSON: &str = "json";
pub const FORMAT_CSV: &str = "csv";
pub const FORMAT_MARKDOWN: &str = "md";
pub const OUTPUT_FORMATS: [&str; 3] = [FORMAT_JSON, FORMAT_CSV, FORMAT_MARKDOWN];

pub fn render_outputs(report: &StockReport, formats: &[String]) -> Result<Vec<OutputFile>> {
    let mut files = Vec::new();
    for format in formats {
        match format.as_str() {
            FORMAT_JSON => files.push(render_json(report)?),
            FORMAT_CSV => files.extend(render_csv_tables(report)?),
            FORMAT_MARKDOWN => files.push(OutputFile {
                name: "report.md".to_string(),
                contents: render_markdown(report).into_bytes(),
            }),
            other => {
                return Err(ReportError::InvalidConfigValueError {
                    field: "output_formats".to_string(),
                    value: other.to_string(),
                    reason: format!("Valid formats: {}", OUTPUT_FORMATS.join(", ")),
                })
            }
        }
    }
    Ok(files)
}

pub fn render_json(report: &StockReport) -> Result<OutputFile> {
    Ok(OutputFile {
        name: "summary.json".to_string(),
        contents: serde_json::to_vec_pretty(report)?,
    })
}

fn csv_file<I>(name: &str, header: &[&str], rows: I) -> Result<OutputFile>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(&row)?;
    }
    let contents = writer.into_inner().map_err(|e| ReportError::ProcessingError {
        message: format!("Failed to finish {}: {}", name, e),
    })?;
    Ok(OutputFile {
        name: name.to_string(),
        contents,
    })
}

fn money(value: f64) -> String {
    format!("{:.2}", value)
}

pub fn render_csv_tables(report: &StockReport) -> Result<Vec<OutputFile>> {
    let mut files = vec![
        csv_file(
            "ward_requests.csv",
            &["Ward / Destination", "Unique Requests"],
            report
                .ward_requests
                .iter()
                .map(|w| vec![w.destination.clone(), w.count.to_string()]),
        )?,
        csv_file(
            "ward_lines.csv",
            &["Ward / Destination", "Line Items"],
            report
                .ward_lines
                .iter()
                .map(|w| vec![w.destination.clone(), w.count.to_string()]),
        )?,
        csv_file(
            "items.csv",
            &["Item Name", "Total Qty", "Total Value (£)", "Requests"],
            report.items.iter().map(|i| {
                vec![
                    i.item.clone(),
                    i.total_quantity.to_string(),
                    money(i.total_value),
                    i.requests.to_string(),
                ]
            }),
        )?,
        csv_file(
            "item_values.csv",
            &["Inventory Item", "Total Value (£)"],
            report
                .item_values
                .iter()
                .map(|i| vec![i.item.clone(), money(i.value)]),
        )?,
        csv_file(
            "schedule_ward_values.csv",
            &["Drug Schedule", "Ward / Destination", "Value (£)"],
            report.schedule_ward_values.iter().map(|v| {
                vec![
                    v.schedule.label().to_string(),
                    v.destination.clone(),
                    money(v.value),
                ]
            }),
        )?,
        csv_file(
            "schedule_values.csv",
            &["Drug Schedule", "Value (£)", "Share (%)"],
            report.schedule_values.iter().map(|v| {
                vec![
                    v.schedule.label().to_string(),
                    money(v.value),
                    format!("{:.1}", v.share * 100.0),
                ]
            }),
        )?,
        csv_file(
            "top_users.csv",
            &["Rank", "Staff Member", "Requests", "Line Items", "Total Value (£)"],
            report.top_users.iter().map(|u| {
                vec![
                    u.rank.to_string(),
                    u.summary.user.clone(),
                    u.summary.requests.to_string(),
                    u.summary.line_items.to_string(),
                    money(u.summary.total_value),
                ]
            }),
        )?,
    ];

    if let Some(trend) = &report.daily_trend {
        files.push(csv_file(
            "daily_trend.csv",
            &["Date", "Unique Requests", "Value (£)"],
            trend.points.iter().map(|p| {
                vec![
                    p.date.format("%Y-%m-%d").to_string(),
                    p.requests.to_string(),
                    money(p.value),
                ]
            }),
        )?);
    }

    Ok(files)
}

fn markdown_table(out: &mut String, header: &[&str], rows: &[Vec<String>]) {
    let _ = writeln!(out, "| {} |", header.join(" | "));
    let _ = writeln!(
        out,
        "| {} |",
        header.iter().map(|_| "---").collect::<Vec<_>>().join(" | ")
    );
    for row in rows {
        let cells: Vec<String> = row.iter().map(|c| c.replace('|', "\\|")).collect();
        let _ = writeln!(out, "| {} |", cells.join(" | "));
    }
    out.push('\n');
}

/// Renders the report the way the dashboard lays it out, section by section.
pub fn render_markdown(report: &StockReport) -> String {
    let top_n = report.top_n;
    let mut out = String::new();

    let _ = writeln!(out, "# Pharmacy Stock Request Report\n");
    let _ = writeln!(
        out,
        "Showing: **{}**  •  Source: `{}`\n",
        report.period.label, report.source_name
    );

    let filters = &report.filters;
    if !filters.wards.is_empty() {
        let _ = writeln!(out, "Wards: {}\n", filters.wards.join(", "));
    }
    let _ = writeln!(
        out,
        "Drug schedules: {}\n",
        filters
            .schedules
            .iter()
            .map(|s| s.label())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let k = &report.kpis;
    markdown_table(
        &mut out,
        &["Unique Requests", "Line Items", "Total Value", "Unique Wards"],
        &[vec![
            format_count(k.unique_requests),
            format_count(k.line_items),
            format_currency(k.total_value),
            format_count(k.unique_wards),
        ]],
    );

    let _ = writeln!(out, "## 1. Requests per Ward\n");
    let _ = writeln!(out, "### Top {} Wards by Unique Requests\n", top_n);
    let rows: Vec<Vec<String>> = report
        .ward_requests
        .iter()
        .take(top_n)
        .map(|w| vec![w.destination.clone(), format_count(w.count)])
        .collect();
    markdown_table(&mut out, &["Ward / Destination", "Unique Requests"], &rows);

    let _ = writeln!(out, "### Top {} Wards by Line Items\n", top_n);
    let rows: Vec<Vec<String>> = report
        .ward_lines
        .iter()
        .take(top_n)
        .map(|w| vec![w.destination.clone(), format_count(w.count)])
        .collect();
    markdown_table(&mut out, &["Ward / Destination", "Line Items"], &rows);

    let _ = writeln!(out, "## 2. Inventory Item Breakdown\n");
    let _ = writeln!(out, "### Top {} Items by Total Quantity Requested\n", top_n);
    let rows: Vec<Vec<String>> = report
        .items
        .iter()
        .take(top_n)
        .map(|i| {
            vec![
                i.item.clone(),
                format_quantity(i.total_quantity),
                format_currency(i.total_value),
                format_count(i.requests),
            ]
        })
        .collect();
    markdown_table(
        &mut out,
        &["Inventory Item", "Total Quantity", "Total Value (£)", "Requests"],
        &rows,
    );

    let _ = writeln!(out, "## 3. Total Value per Stock Item (£)\n");
    let _ = writeln!(out, "### Top {} Items by Total £ Value\n", top_n);
    let rows: Vec<Vec<String>> = report
        .item_values
        .iter()
        .take(top_n)
        .map(|i| vec![i.item.clone(), format_currency(i.value)])
        .collect();
    markdown_table(&mut out, &["Inventory Item", "Total Value (£)"], &rows);

    let _ = writeln!(out, "### Value Distribution: Drug Schedule → Ward\n");
    let rows: Vec<Vec<String>> = report
        .schedule_ward_values
        .iter()
        .map(|v| {
            vec![
                v.schedule.label().to_string(),
                v.destination.clone(),
                format_currency(v.value),
            ]
        })
        .collect();
    markdown_table(&mut out, &["Drug Schedule", "Ward / Destination", "Value (£)"], &rows);

    let _ = writeln!(out, "### Controlled vs Non-controlled Value\n");
    let rows: Vec<Vec<String>> = report
        .schedule_values
        .iter()
        .map(|v| {
            vec![
                v.schedule.label().to_string(),
                format_currency(v.value),
                format!("{}%", format_decimal(v.share * 100.0, 1)),
            ]
        })
        .collect();
    markdown_table(&mut out, &["Drug Schedule", "Value (£)", "Share"], &rows);

    let _ = writeln!(out, "## 4. Top Submitting Users\n");
    let rows: Vec<Vec<String>> = report
        .top_users
        .iter()
        .map(|u| {
            vec![
                u.rank.to_string(),
                u.summary.user.clone(),
                format_count(u.summary.requests),
                format_count(u.summary.line_items),
                format_currency(u.summary.total_value),
            ]
        })
        .collect();
    markdown_table(
        &mut out,
        &["Rank", "Staff Member", "Requests", "Line Items", "Total Value (£)"],
        &rows,
    );

    if let Some(trend) = &report.daily_trend {
        let _ = writeln!(out, "## 5. Daily Request Volume (Full Period Context)\n");
        let _ = writeln!(out, "### {}\n", trend.title);
        let rows: Vec<Vec<String>> = trend
            .points
            .iter()
            .map(|p| {
                let selected = match &trend.highlight {
                    Some(TrendHighlight::Day { date }) => *date == p.date,
                    Some(TrendHighlight::Range { start, end }) => p.date >= *start && p.date <= *end,
                    None => false,
                };
                vec![
                    p.date.format("%Y-%m-%d").to_string(),
                    format_count(p.requests),
                    format_currency(p.value),
                    if selected { "◀".to_string() } else { String::new() },
                ]
            })
            .collect();
        markdown_table(&mut out, &["Date", "Unique Requests", "Value (£)", "Selected"], &rows);
    }

    let dataset = &report.dataset;
    let _ = writeln!(
        out,
        "---\n\nData loaded from `{}` · {} total rows · Date range: {} – {}",
        report.source_name,
        format_count(dataset.total_rows),
        dataset.first_date.format("%d %b %Y"),
        dataset.last_date.format("%d %b %Y")
    );

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::aggregate::build_report;
    use crate::core::filter::ReportFilter;
    use crate::core::period::{month_period, week_period};
    use crate::domain::model::{DrugSchedule, StockRequest};
    use chrono::NaiveDate;

    fn lines() -> Vec<StockRequest> {
        let mk = |day: u32, req: &str, ward: &str, item: &str, value: f64| StockRequest {
            date: NaiveDate::from_ymd_opt(2024, 9, day).unwrap(),
            request_number: req.to_string(),
            destination: ward.to_string(),
            inventory_item: item.to_string(),
            item_clean: item.to_string(),
            drug_schedule: DrugSchedule::NonControlled,
            submitting_user: "alice".to_string(),
            quantity: Some(3.0),
            value,
        };
        vec![
            mk(2, "R1", "Ward A", "Paracetamol", 1200.5),
            mk(3, "R2", "Ward B", "Gauze | sterile", 10.0),
        ]
    }

    fn report_for(period: crate::domain::model::PeriodSelection) -> StockReport {
        let all = lines();
        let filter = ReportFilter::new(period);
        let selected = filter.apply(&all).unwrap();
        build_report("stock.csv", &all, &selected, &filter, 5).unwrap()
    }

    #[test]
    fn test_markdown_sections() {
        let report = report_for(week_period(NaiveDate::from_ymd_opt(2024, 9, 2).unwrap()));
        let md = render_markdown(&report);

        assert!(md.contains("Showing: **Week 36  (Sep 02 – Sep 08)**"));
        assert!(md.contains("£1,210.50"));
        assert!(md.contains("## 4. Top Submitting Users"));
        assert!(md.contains("## 5. Daily Request Volume"));
        assert!(md.contains("Gauze \\| sterile"));
        assert!(md.contains("Date range: 02 Sep 2024 – 03 Sep 2024"));
    }

    #[test]
    fn test_monthly_report_has_no_trend_section() {
        let report = report_for(month_period(NaiveDate::from_ymd_opt(2024, 9, 1).unwrap()));
        let md = render_markdown(&report);
        assert!(!md.contains("## 5."));

        let files = render_csv_tables(&report).unwrap();
        assert!(files.iter().all(|f| f.name != "daily_trend.csv"));
        assert_eq!(files.len(), 7);
    }

    #[test]
    fn test_render_outputs_by_format() {
        let report = report_for(week_period(NaiveDate::from_ymd_opt(2024, 9, 2).unwrap()));

        let files = render_outputs(&report, &["json".to_string()]).unwrap();
        assert_eq!(files.len(), 1);
        let parsed: serde_json::Value = serde_json::from_slice(&files[0].contents).unwrap();
        assert_eq!(parsed["kpis"]["line_items"], 2);
        assert_eq!(parsed["period"]["time_frame"], "weekly");
        assert_eq!(parsed["filters"]["schedules"][0], "Non-controlled");

        let files = render_outputs(&report, &["csv".to_string(), "md".to_string()]).unwrap();
        assert_eq!(files.len(), 9);
        let wards = files.iter().find(|f| f.name == "ward_requests.csv").unwrap();
        let text = String::from_utf8(wards.contents.clone()).unwrap();
        assert!(text.starts_with("Ward / Destination,Unique Requests\n"));

        assert!(render_outputs(&report, &["pdf".to_string()]).is_err());
    }
}
