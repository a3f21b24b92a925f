//! Daily / weekly / monthly period selection.
//!
//! Weeks run Monday to Sunday and are labelled with their ISO week number.
//! Only weeks and months that contain at least one line can be selected; a
//! daily selection may be any date inside the dataset's range.

use crate::domain::model::{PeriodSelection, TimeFrame};
use crate::utils::error::{ReportError, Result};
use chrono::{Datelike, Days, NaiveDate, Weekday};
use std::collections::BTreeSet;

pub fn day_period(date: NaiveDate) -> PeriodSelection {
    PeriodSelection {
        time_frame: TimeFrame::Daily,
        start: date,
        end: date,
        label: date.format("%A %d %B %Y").to_string(),
    }
}

pub fn week_period(date: NaiveDate) -> PeriodSelection {
    let start = date - Days::new(u64::from(date.weekday().num_days_from_monday()));
    let end = start + Days::new(6);
    PeriodSelection {
        time_frame: TimeFrame::Weekly,
        start,
        end,
        label: format!(
            "Week {}  ({} – {})",
            start.iso_week().week(),
            start.format("%b %d"),
            end.format("%b %d")
        ),
    }
}

pub fn month_period(date: NaiveDate) -> PeriodSelection {
    let start = date.with_day(1).unwrap_or(date);
    let end = start
        .checked_add_months(chrono::Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(start);
    PeriodSelection {
        time_frame: TimeFrame::Monthly,
        start,
        end,
        label: start.format("%B %Y").to_string(),
    }
}

pub fn period_for(time_frame: TimeFrame, date: NaiveDate) -> PeriodSelection {
    match time_frame {
        TimeFrame::Daily => day_period(date),
        TimeFrame::Weekly => week_period(date),
        TimeFrame::Monthly => month_period(date),
    }
}

/// Distinct periods containing data, oldest first.
pub fn available_periods<I>(dates: I, time_frame: TimeFrame) -> Vec<PeriodSelection>
where
    I: IntoIterator<Item = NaiveDate>,
{
    let starts: BTreeSet<NaiveDate> = dates
        .into_iter()
        .map(|d| period_for(time_frame, d).start)
        .collect();
    starts
        .into_iter()
        .map(|start| period_for(time_frame, start))
        .collect()
}

fn parse_requested(time_frame: TimeFrame, requested: &str) -> Option<NaiveDate> {
    let requested = requested.trim();
    if let Ok(date) = NaiveDate::parse_from_str(requested, "%Y-%m-%d") {
        return Some(date);
    }
    match time_frame {
        TimeFrame::Daily => None,
        TimeFrame::Weekly => {
            // ISO 週格式：2024-W37
            let (year, week) = requested.split_once("-W").or_else(|| requested.split_once("-w"))?;
            NaiveDate::from_isoywd_opt(year.parse().ok()?, week.parse().ok()?, Weekday::Mon)
        }
        TimeFrame::Monthly => {
            let (year, month) = requested.split_once('-')?;
            NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
        }
    }
}

fn expected_format(time_frame: TimeFrame) -> &'static str {
    match time_frame {
        TimeFrame::Daily => "YYYY-MM-DD",
        TimeFrame::Weekly => "YYYY-MM-DD or YYYY-Www",
        TimeFrame::Monthly => "YYYY-MM or YYYY-MM-DD",
    }
}

/// Resolves the requested period, defaulting to the latest one.
pub fn select_period(
    dates: &[NaiveDate],
    time_frame: TimeFrame,
    requested: Option<&str>,
) -> Result<PeriodSelection> {
    let (Some(min_date), Some(max_date)) = (dates.iter().min(), dates.iter().max()) else {
        return Err(ReportError::ProcessingError {
            message: "Source contains no dated rows".to_string(),
        });
    };

    let Some(requested) = requested.filter(|r| !r.trim().is_empty()) else {
        return Ok(period_for(time_frame, *max_date));
    };

    let date = parse_requested(time_frame, requested).ok_or_else(|| {
        ReportError::InvalidConfigValueError {
            field: "period".to_string(),
            value: requested.to_string(),
            reason: format!(
                "Expected {} for a {} report",
                expected_format(time_frame),
                time_frame.to_string().to_lowercase()
            ),
        }
    })?;

    if time_frame == TimeFrame::Daily {
        if date < *min_date || date > *max_date {
            return Err(ReportError::InvalidConfigValueError {
                field: "period".to_string(),
                value: requested.to_string(),
                reason: format!(
                    "Date must be between {} and {}",
                    min_date.format("%Y-%m-%d"),
                    max_date.format("%Y-%m-%d")
                ),
            });
        }
        return Ok(day_period(date));
    }

    let wanted = period_for(time_frame, date);
    let available = available_periods(dates.iter().copied(), time_frame);
    if available.iter().any(|p| p.start == wanted.start) {
        Ok(wanted)
    } else {
        Err(ReportError::InvalidConfigValueError {
            field: "period".to_string(),
            value: requested.to_string(),
            reason: format!(
                "No data for {}. Available: {}",
                wanted.label,
                available
                    .iter()
                    .map(|p| p.label.as_str())
                    .collect::<Vec<_>>()
                    .join("; ")
            ),
        })
    }
}
