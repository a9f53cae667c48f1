//! Data models for the salary analysis.
//!
//! This module contains the core data structures used throughout
//! the application for representing survey records, market benchmarks,
//! group statistics, and the final report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// How a respondent reported their pay.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SalaryType {
    /// Annual salary
    Year,
    /// Hourly rate
    Hour,
    /// Anything else the survey allowed
    Other(String),
}

impl fmt::Display for SalaryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SalaryType::Year => write!(f, "year"),
            SalaryType::Hour => write!(f, "hour"),
            SalaryType::Other(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for SalaryType {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "year" | "yearly" | "annual" | "annually" => SalaryType::Year,
            "hour" | "hourly" => SalaryType::Hour,
            other => SalaryType::Other(other.to_string()),
        }
    }
}

/// One survey response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryRecord {
    /// 1-based data row in the source file (header excluded).
    pub row: usize,
    /// Seniority bucket used as the default grouping key.
    pub level: String,
    /// Reported pay. `None` when missing or unparseable.
    pub salary: Option<f64>,
    /// Job title as reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Employment status (e.g. "Full Time Employee").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_type: Option<SalaryType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance_rating: Option<String>,
    /// Reported raise, in percent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_increase: Option<f64>,
}

impl SalaryRecord {
    /// Creates a record with only a level and a salary set.
    #[allow(dead_code)] // Builder utility for tests
    pub fn new(row: usize, level: impl Into<String>, salary: Option<f64>) -> Self {
        Self {
            row,
            level: level.into(),
            salary,
            title: None,
            location: None,
            status: None,
            salary_type: None,
            performance_rating: None,
            percent_increase: None,
        }
    }

    /// Returns the salary if it is usable in statistics.
    pub fn valid_salary(&self) -> Option<f64> {
        self.salary.filter(|s| s.is_finite() && *s >= 0.0)
    }
}

/// Externally reported market salary range for one level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketBenchmark {
    pub level: String,
    pub low: f64,
    pub high: f64,
}

/// Benchmarks keyed by level.
pub type BenchmarkTable = BTreeMap<String, MarketBenchmark>;

/// Summary statistics over one group's salaries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl Summary {
    /// Computes the summary of a set of salaries.
    ///
    /// Returns `None` for an empty input so callers never see placeholder
    /// statistics.
    pub fn from_salaries(salaries: &[f64]) -> Option<Self> {
        if salaries.is_empty() {
            return None;
        }

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for &s in salaries {
            min = min.min(s);
            max = max.max(s);
            sum += s;
        }

        Some(Self {
            count: salaries.len(),
            min,
            max,
            mean: sum / salaries.len() as f64,
        })
    }
}

/// Relative gap between company bounds and market bounds, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentDifference {
    pub low_diff_pct: f64,
    pub high_diff_pct: f64,
}

/// A group matched against its benchmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelComparison {
    pub level: String,
    pub summary: Summary,
    pub benchmark: MarketBenchmark,
    pub difference: PercentDifference,
}

/// Result of comparing every group with the benchmark table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    /// Groups that had a benchmark.
    pub matched: Vec<LevelComparison>,
    /// Groups with no benchmark available.
    pub unmatched: Vec<String>,
}

/// Why records were removed during cleaning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropCounts {
    pub missing: usize,
    pub non_finite: usize,
    pub negative: usize,
    pub zero: usize,
}

impl DropCounts {
    pub fn total(&self) -> usize {
        self.missing + self.non_finite + self.negative + self.zero
    }
}

/// Descriptive statistics over all cleaned salaries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Describe {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; `None` with fewer than two values.
    pub std: Option<f64>,
    pub min: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub max: f64,
}

/// Respondents holding the extreme salaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extremes {
    pub highest: Vec<SalaryRecord>,
    pub lowest: Vec<SalaryRecord>,
}

/// How many respondents sit above and at-or-below the mean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AverageSplit {
    pub mean: f64,
    pub above: usize,
    pub at_or_below: usize,
}

/// Respondents whose salary is suspiciously low.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LowSalarySlice {
    pub threshold: f64,
    pub records: Vec<SalaryRecord>,
    /// Of those, how many were typed as annual salaries.
    pub typed_year: usize,
    pub typed_other: usize,
}

/// Frequency table for one categorical column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueCounts {
    pub column: String,
    pub counts: Vec<(String, usize)>,
}

/// Shape of the loaded dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetOverview {
    pub rows: usize,
    pub columns: Vec<String>,
    pub rows_with_salary: usize,
    pub rows_unparseable: usize,
    /// Rows skipped at load time for a blank level cell.
    pub rows_missing_level: usize,
    pub rows_dropped: usize,
    pub rows_filtered: usize,
    pub rows_analyzed: usize,
}

/// Metadata about the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Path of the survey data file.
    pub data_source: String,
    /// Path of the benchmark file, if one was used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benchmark_source: Option<String>,
    /// Date and time of the analysis.
    pub analysis_date: DateTime<Utc>,
    /// Grouping key used for the group table.
    pub group_by: String,
    /// Duration of the analysis in seconds.
    pub duration_seconds: f64,
}

/// The complete analysis report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub overview: DatasetOverview,
    pub dropped: DropCounts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_stats: Option<Describe>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extremes: Option<Extremes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_split: Option<AverageSplit>,
    pub low_salary: LowSalarySlice,
    pub value_counts: Vec<ValueCounts>,
    /// Summary per group key.
    pub groups: BTreeMap<String, Summary>,
    pub comparison: Comparison,
    pub conclusions: Vec<String>,
}
