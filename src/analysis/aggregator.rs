//! Grouping and summary statistics.
//!
//! This module groups cleaned records by a categorical key and computes
//! count, min, max, and mean per group.

use crate::models::{SalaryRecord, Summary};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Stock grouping keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    Level,
    Title,
    Location,
    Status,
    SalaryType,
    PerformanceRating,
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl GroupKey {
    /// Human-readable column name.
    pub fn name(&self) -> &'static str {
        match self {
            GroupKey::Level => "level",
            GroupKey::Title => "title",
            GroupKey::Location => "location",
            GroupKey::Status => "status",
            GroupKey::SalaryType => "salary type",
            GroupKey::PerformanceRating => "performance rating",
        }
    }

    /// Extract this key from a record. `None` when the record lacks it.
    pub fn key(&self, record: &SalaryRecord) -> Option<String> {
        match self {
            GroupKey::Level => Some(record.level.clone()),
            GroupKey::Title => record.title.clone(),
            GroupKey::Location => record.location.clone(),
            GroupKey::Status => record.status.clone(),
            GroupKey::SalaryType => record.salary_type.as_ref().map(|t| t.to_string()),
            GroupKey::PerformanceRating => record.performance_rating.clone(),
        }
    }

    /// Keys that make sense as frequency tables.
    pub fn categorical() -> [GroupKey; 5] {
        [
            GroupKey::Status,
            GroupKey::Title,
            GroupKey::SalaryType,
            GroupKey::Location,
            GroupKey::PerformanceRating,
        ]
    }
}

/// Summarize salaries per key.
///
/// Records for which `key_fn` returns `None`, or whose salary is not
/// usable, are skipped. Groups left with no salaries are omitted.
pub fn group_summary<F>(records: &[SalaryRecord], key_fn: F) -> BTreeMap<String, Summary>
where
    F: Fn(&SalaryRecord) -> Option<String>,
{
    let mut grouped: BTreeMap<String, Vec<f64>> = BTreeMap::new();

    for record in records {
        let (Some(key), Some(salary)) = (key_fn(record), record.valid_salary()) else {
            continue;
        };
        grouped.entry(key).or_default().push(salary);
    }

    grouped
        .into_iter()
        .filter_map(|(key, salaries)| Summary::from_salaries(&salaries).map(|s| (key, s)))
        .collect()
}

/// Summarize salaries per stock key.
pub fn group_by_key(records: &[SalaryRecord], key: GroupKey) -> BTreeMap<String, Summary> {
    group_summary(records, |r| key.key(r))
}

/// Groups ordered by mean salary, highest first.
pub fn rank_by_mean(groups: &BTreeMap<String, Summary>) -> Vec<(&String, &Summary)> {
    let mut ranked: Vec<_> = groups.iter().collect();
    ranked.sort_by(|a, b| b.1.mean.total_cmp(&a.1.mean).then_with(|| a.0.cmp(b.0)));
    ranked
}
