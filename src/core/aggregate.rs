use crate::core::filter::ReportFilter;
use crate::domain::model::{
    DailyPoint, DailyTrend, DatasetSummary, DrugSchedule, ItemSummary, ItemValue, Kpis,
    PeriodSelection, RankedUser, ScheduleValue, ScheduleWardValue, StockReport, StockRequest,
    TimeFrame, TrendHighlight, UserSummary, WardCount,
};
use crate::utils::error::{ReportError, Result};
use chrono::{Datelike, NaiveDate};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

fn desc_f64(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

pub fn kpis(lines: &[&StockRequest]) -> Kpis {
    let requests: HashSet<&str> = lines.iter().map(|l| l.request_number.as_str()).collect();
    let wards: HashSet<&str> = lines.iter().map(|l| l.destination.as_str()).collect();
    Kpis {
        unique_requests: requests.len(),
        line_items: lines.len(),
        total_value: lines.iter().map(|l| l.value).sum(),
        unique_wards: wards.len(),
    }
}

fn sorted_counts(counts: HashMap<&str, usize>) -> Vec<WardCount> {
    let mut rows: Vec<WardCount> = counts
        .into_iter()
        .map(|(destination, count)| WardCount {
            destination: destination.to_string(),
            count,
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.destination.cmp(&b.destination)));
    rows
}

/// Distinct requests per ward.
pub fn ward_requests(lines: &[&StockRequest]) -> Vec<WardCount> {
    let mut per_ward: HashMap<&str, HashSet<&str>> = HashMap::new();
    for line in lines {
        per_ward
            .entry(line.destination.as_str())
            .or_default()
            .insert(line.request_number.as_str());
    }
    sorted_counts(per_ward.into_iter().map(|(w, r)| (w, r.len())).collect())
}

/// Line items per ward.
pub fn ward_lines(lines: &[&StockRequest]) -> Vec<WardCount> {
    let mut per_ward: HashMap<&str, usize> = HashMap::new();
    for line in lines {
        *per_ward.entry(line.destination.as_str()).or_default() += 1;
    }
    sorted_counts(per_ward)
}

pub fn item_breakdown(lines: &[&StockRequest]) -> Vec<ItemSummary> {
    #[derive(Default)]
    struct Acc<'a> {
        quantity: f64,
        value: f64,
        requests: HashSet<&'a str>,
    }

    let mut per_item: HashMap<&str, Acc> = HashMap::new();
    for line in lines {
        let acc = per_item.entry(line.item_clean.as_str()).or_default();
        acc.quantity += line.quantity.unwrap_or(0.0);
        acc.value += line.value;
        acc.requests.insert(line.request_number.as_str());
    }

    let mut rows: Vec<ItemSummary> = per_item
        .into_iter()
        .map(|(item, acc)| ItemSummary {
            item: item.to_string(),
            total_quantity: acc.quantity,
            total_value: acc.value,
            requests: acc.requests.len(),
        })
        .collect();
    rows.sort_by(|a, b| {
        desc_f64(a.total_quantity, b.total_quantity).then_with(|| a.item.cmp(&b.item))
    });
    rows
}

pub fn item_values(items: &[ItemSummary]) -> Vec<ItemValue> {
    let mut rows: Vec<ItemValue> = items
        .iter()
        .map(|i| ItemValue {
            item: i.item.clone(),
            value: i.total_value,
        })
        .collect();
    rows.sort_by(|a, b| desc_f64(a.value, b.value).then_with(|| a.item.cmp(&b.item)));
    rows
}

/// Value split by schedule, then ward.
pub fn schedule_ward_values(lines: &[&StockRequest]) -> Vec<ScheduleWardValue> {
    let mut totals: HashMap<(DrugSchedule, &str), f64> = HashMap::new();
    for line in lines {
        *totals
            .entry((line.drug_schedule, line.destination.as_str()))
            .or_default() += line.value;
    }

    let mut rows: Vec<ScheduleWardValue> = totals
        .into_iter()
        .map(|((schedule, destination), value)| ScheduleWardValue {
            schedule,
            destination: destination.to_string(),
            value,
        })
        .collect();
    rows.sort_by(|a, b| {
        a.schedule
            .cmp(&b.schedule)
            .then_with(|| desc_f64(a.value, b.value))
            .then_with(|| a.destination.cmp(&b.destination))
    });
    rows
}

pub fn schedule_values(lines: &[&StockRequest]) -> Vec<ScheduleValue> {
    let mut totals: BTreeMap<DrugSchedule, f64> = BTreeMap::new();
    for line in lines {
        *totals.entry(line.drug_schedule).or_default() += line.value;
    }
    let grand_total: f64 = totals.values().sum();

    totals
        .into_iter()
        .map(|(schedule, value)| ScheduleValue {
            schedule,
            value,
            share: if grand_total != 0.0 {
                value / grand_total
            } else {
                0.0
            },
        })
        .collect()
}

pub fn user_summaries(lines: &[&StockRequest]) -> Vec<UserSummary> {
    #[derive(Default)]
    struct Acc<'a> {
        requests: HashSet<&'a str>,
        line_items: usize,
        value: f64,
    }

    let mut per_user: HashMap<&str, Acc> = HashMap::new();
    for line in lines {
        let acc = per_user.entry(line.submitting_user.as_str()).or_default();
        acc.requests.insert(line.request_number.as_str());
        // 只計算有數量的明細
        if line.quantity.is_some() {
            acc.line_items += 1;
        }
        acc.value += line.value;
    }

    let mut rows: Vec<UserSummary> = per_user
        .into_iter()
        .map(|(user, acc)| UserSummary {
            user: user.to_string(),
            requests: acc.requests.len(),
            line_items: acc.line_items,
            total_value: acc.value,
        })
        .collect();
    rows.sort_by(|a, b| b.requests.cmp(&a.requests).then_with(|| a.user.cmp(&b.user)));
    rows
}

pub fn rank_users(users: &[UserSummary], top_n: usize) -> Vec<RankedUser> {
    users
        .iter()
        .take(top_n)
        .enumerate()
        .map(|(i, summary)| RankedUser {
            rank: i + 1,
            summary: summary.clone(),
        })
        .collect()
}

/// Daily volume over the whole dataset; not shown for monthly reports.
pub fn daily_trend(all_lines: &[StockRequest], period: &PeriodSelection) -> Option<DailyTrend> {
    let highlight = match period.time_frame {
        TimeFrame::Monthly => return None,
        TimeFrame::Daily => TrendHighlight::Day { date: period.start },
        TimeFrame::Weekly => TrendHighlight::Range {
            start: period.start,
            end: period.end,
        },
    };

    let mut per_day: BTreeMap<NaiveDate, (HashSet<&str>, f64)> = BTreeMap::new();
    for line in all_lines {
        let entry = per_day.entry(line.date).or_default();
        entry.0.insert(line.request_number.as_str());
        entry.1 += line.value;
    }

    let title = match (per_day.keys().next(), per_day.keys().next_back()) {
        (Some(first), Some(last))
            if (first.year(), first.month()) == (last.year(), last.month()) =>
        {
            format!("Daily Unique Requests: {}", first.format("%B %Y"))
        }
        (Some(first), Some(last)) => format!(
            "Daily Unique Requests: {} to {}",
            first.format("%d %b %Y"),
            last.format("%d %b %Y")
        ),
        _ => "Daily Unique Requests".to_string(),
    };

    let points = per_day
        .into_iter()
        .map(|(date, (requests, value))| DailyPoint {
            date,
            requests: requests.len(),
            value,
        })
        .collect();

    Some(DailyTrend {
        title,
        points,
        highlight: Some(highlight),
    })
}

pub fn dataset_summary(all_lines: &[StockRequest]) -> Result<DatasetSummary> {
    let first = all_lines.iter().map(|l| l.date).min();
    let last = all_lines.iter().map(|l| l.date).max();
    match (first, last) {
        (Some(first_date), Some(last_date)) => Ok(DatasetSummary {
            total_rows: all_lines.len(),
            first_date,
            last_date,
        }),
        _ => Err(ReportError::ProcessingError {
            message: "Source contains no dated rows".to_string(),
        }),
    }
}

/// Builds every report table from the full dataset and the filtered selection.
pub fn build_report(
    source_name: &str,
    all_lines: &[StockRequest],
    selected: &[&StockRequest],
    filter: &ReportFilter,
    top_n: usize,
) -> Result<StockReport> {
    let items = item_breakdown(selected);
    let users = user_summaries(selected);

    Ok(StockReport {
        source_name: source_name.to_string(),
        period: filter.period.clone(),
        filters: filter.applied(),
        top_n,
        kpis: kpis(selected),
        ward_requests: ward_requests(selected),
        ward_lines: ward_lines(selected),
        item_values: item_values(&items),
        items,
        schedule_ward_values: schedule_ward_values(selected),
        schedule_values: schedule_values(selected),
        top_users: rank_users(&users, top_n),
        users,
        daily_trend: daily_trend(all_lines, &filter.period),
        dataset: dataset_summary(all_lines)?,
    })
}
