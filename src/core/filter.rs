use crate::domain::model::{AppliedFilters, DrugSchedule, PeriodSelection, StockRequest};
use crate::utils::error::{ReportError, Result};

pub const EMPTY_SELECTION_MESSAGE: &str =
    "No data matches the selected filters. Adjust the filter options.";

#[derive(Debug, Clone)]
pub struct ReportFilter {
    pub period: PeriodSelection,
    /// Empty means every ward.
    pub wards: Vec<String>,
    /// Empty means every schedule.
    pub schedules: Vec<DrugSchedule>,
}

impl ReportFilter {
    pub fn new(period: PeriodSelection) -> Self {
        Self {
            period,
            wards: Vec::new(),
            schedules: DrugSchedule::ALL.to_vec(),
        }
    }

    pub fn with_wards(mut self, wards: Vec<String>) -> Self {
        self.wards = wards;
        self
    }

    pub fn with_schedules(mut self, schedules: Vec<DrugSchedule>) -> Self {
        self.schedules = schedules;
        self
    }

    pub fn matches(&self, line: &StockRequest) -> bool {
        self.period.contains(line.date)
            && (self.wards.is_empty() || self.wards.iter().any(|w| *w == line.destination))
            && (self.schedules.is_empty() || self.schedules.contains(&line.drug_schedule))
    }

    /// Keeps matching lines; an empty result is an [`ReportError::EmptySelection`].
    pub fn apply<'a>(&self, lines: &'a [StockRequest]) -> Result<Vec<&'a StockRequest>> {
        let selected: Vec<&StockRequest> = lines.iter().filter(|l| self.matches(l)).collect();
        tracing::debug!(
            "Filter kept {} of {} lines for {}",
            selected.len(),
            lines.len(),
            self.period.label
        );

        if selected.is_empty() {
            return Err(ReportError::EmptySelection {
                message: EMPTY_SELECTION_MESSAGE.to_string(),
            });
        }
        Ok(selected)
    }

    pub fn applied(&self) -> AppliedFilters {
        AppliedFilters {
            wards: self.wards.clone(),
            schedules: self.schedules.clone(),
        }
    }
}
