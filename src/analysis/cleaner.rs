//! Record cleaning and filtering.
//!
//! Cleaning removes rows whose salary cannot take part in statistics.
//! Filtering narrows the cleaned rows to the population being compared.

use crate::config::{CleaningConfig, Config, FilterConfig};
use crate::models::{DropCounts, SalaryRecord, SalaryType};
use tracing::{debug, info};

/// Cleaning options.
#[derive(Debug, Clone, Copy)]
pub struct CleanOptions {
    /// Zero salaries mean "not reported".
    pub treat_zero_as_missing: bool,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            treat_zero_as_missing: true,
        }
    }
}

impl From<&CleaningConfig> for CleanOptions {
    fn from(config: &CleaningConfig) -> Self {
        Self {
            treat_zero_as_missing: config.treat_zero_as_missing,
        }
    }
}

/// Retained records and why the rest were dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanOutcome {
    pub records: Vec<SalaryRecord>,
    pub dropped: DropCounts,
}

/// Drop records with a missing, non-finite, negative, or (optionally) zero
/// salary. Running it twice yields the same records.
pub fn clean(records: &[SalaryRecord], options: &CleanOptions) -> CleanOutcome {
    let mut dropped = DropCounts::default();
    let mut kept = Vec::with_capacity(records.len());

    for record in records {
        match record.salary {
            None => dropped.missing += 1,
            Some(s) if !s.is_finite() => dropped.non_finite += 1,
            Some(s) if s < 0.0 => dropped.negative += 1,
            Some(s) if s == 0.0 && options.treat_zero_as_missing => dropped.zero += 1,
            Some(_) => {
                kept.push(record.clone());
                continue;
            }
        }
        debug!("Dropping row {} (salary {:?})", record.row, record.salary);
    }

    info!(
        "Cleaning dropped {} of {} records (missing: {}, non-finite: {}, negative: {}, zero: {})",
        dropped.total(),
        records.len(),
        dropped.missing,
        dropped.non_finite,
        dropped.negative,
        dropped.zero
    );

    CleanOutcome {
        records: kept,
        dropped,
    }
}

/// Restriction on which records are analysed. Empty lists match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    pub salary_types: Vec<SalaryType>,
    pub locations: Vec<String>,
    pub statuses: Vec<String>,
    /// Salaries at or below this value are left out.
    pub exclude_at_or_below: Option<f64>,
}

impl From<&FilterConfig> for RecordFilter {
    fn from(config: &FilterConfig) -> Self {
        Self {
            salary_types: config
                .salary_types
                .iter()
                .map(|t| SalaryType::from(t.as_str()))
                .collect(),
            locations: config.locations.clone(),
            statuses: config.statuses.clone(),
            exclude_at_or_below: None,
        }
    }
}

impl From<&Config> for RecordFilter {
    fn from(config: &Config) -> Self {
        let mut record_filter = Self::from(&config.filter);
        if config.cleaning.exclude_low_salaries {
            record_filter.exclude_at_or_below = Some(config.cleaning.low_salary_threshold);
        }
        record_filter
    }
}

impl RecordFilter {
    /// Whether the filter restricts anything.
    pub fn is_empty(&self) -> bool {
        self.salary_types.is_empty()
            && self.locations.is_empty()
            && self.statuses.is_empty()
            && self.exclude_at_or_below.is_none()
    }

    /// Check if a record passes.
    ///
    /// A record without a salary type passes the salary type restriction,
    /// since an untyped survey carries no hourly rows to exclude.
    pub fn matches(&self, record: &SalaryRecord) -> bool {
        if !self.salary_types.is_empty() {
            if let Some(ref salary_type) = record.salary_type {
                if !self.salary_types.contains(salary_type) {
                    return false;
                }
            }
        }

        if let Some(limit) = self.exclude_at_or_below {
            if record.valid_salary().is_some_and(|s| s <= limit) {
                return false;
            }
        }

        if !self.locations.is_empty() && !contains_ignore_case(&self.locations, &record.location) {
            return false;
        }

        if !self.statuses.is_empty() && !contains_ignore_case(&self.statuses, &record.status) {
            return false;
        }

        true
    }
}

fn contains_ignore_case(allowed: &[String], value: &Option<String>) -> bool {
    match value {
        Some(v) => allowed.iter().any(|a| a.eq_ignore_ascii_case(v)),
        None => false,
    }
}

/// Keep the records that pass the filter.
pub fn filter(records: Vec<SalaryRecord>, record_filter: &RecordFilter) -> Vec<SalaryRecord> {
    if record_filter.is_empty() {
        return records;
    }

    let before = records.len();
    let kept: Vec<SalaryRecord> = records
        .into_iter()
        .filter(|r| record_filter.matches(r))
        .collect();

    info!("Filter kept {} of {} records", kept.len(), before);
    kept
}
