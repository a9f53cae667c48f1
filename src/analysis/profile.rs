//! Descriptive profiling of the survey.
//!
//! Whole-dataset statistics: shape, salary distribution, extremes, and
//! frequency tables of the categorical columns.

use super::aggregator::GroupKey;
use super::cleaner::CleanOutcome;
use crate::loader::LoadOutcome;
use crate::models::{
    AverageSplit, DatasetOverview, Describe, Extremes, LowSalarySlice, SalaryRecord, SalaryType,
    ValueCounts,
};
use std::collections::HashMap;

/// Shape of the dataset at each pipeline stage.
pub fn overview(loaded: &LoadOutcome, cleaned: &CleanOutcome, analyzed: usize) -> DatasetOverview {
    DatasetOverview {
        rows: loaded.records.len(),
        columns: loaded.columns.clone(),
        rows_with_salary: loaded.records.iter().filter(|r| r.salary.is_some()).count(),
        rows_unparseable: loaded.unparseable,
        rows_missing_level: loaded.missing_level,
        rows_dropped: cleaned.dropped.total(),
        rows_filtered: cleaned.records.len().saturating_sub(analyzed),
        rows_analyzed: analyzed,
    }
}

fn sorted_salaries(records: &[SalaryRecord]) -> Vec<f64> {
    let mut salaries: Vec<f64> = records.iter().filter_map(|r| r.valid_salary()).collect();
    salaries.sort_by(|a, b| a.total_cmp(b));
    salaries
}

/// Percentile of sorted data with linear interpolation between ranks.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let pos = (sorted.len() - 1) as f64 * q;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (pos - lower as f64)
}

/// Count, mean, sample standard deviation, quartiles, and extrema.
pub fn describe(records: &[SalaryRecord]) -> Option<Describe> {
    let salaries = sorted_salaries(records);
    if salaries.is_empty() {
        return None;
    }

    let n = salaries.len() as f64;
    let mean = salaries.iter().sum::<f64>() / n;
    let std = (salaries.len() > 1).then(|| {
        let ss: f64 = salaries.iter().map(|s| (s - mean).powi(2)).sum();
        (ss / (n - 1.0)).sqrt()
    });

    Some(Describe {
        count: salaries.len(),
        mean,
        std,
        min: salaries[0],
        p25: percentile(&salaries, 0.25),
        median: percentile(&salaries, 0.5),
        p75: percentile(&salaries, 0.75),
        max: salaries[salaries.len() - 1],
    })
}

/// Records holding the highest and lowest salary. Ties are all kept.
pub fn extremes(records: &[SalaryRecord]) -> Option<Extremes> {
    let salaries = sorted_salaries(records);
    let (&min, &max) = (salaries.first()?, salaries.last()?);

    let holding = |target: f64| -> Vec<SalaryRecord> {
        records
            .iter()
            .filter(|r| r.valid_salary() == Some(target))
            .cloned()
            .collect()
    };

    Some(Extremes {
        highest: holding(max),
        lowest: holding(min),
    })
}

/// Counts above the mean and at or below it.
pub fn average_split(records: &[SalaryRecord]) -> Option<AverageSplit> {
    let salaries = sorted_salaries(records);
    if salaries.is_empty() {
        return None;
    }

    let mean = salaries.iter().sum::<f64>() / salaries.len() as f64;
    let above = salaries.iter().filter(|&&s| s > mean).count();

    Some(AverageSplit {
        mean,
        above,
        at_or_below: salaries.len() - above,
    })
}

/// Records paid at or below `threshold`, usually hourly rates.
pub fn low_salary_slice(records: &[SalaryRecord], threshold: f64) -> LowSalarySlice {
    let slice: Vec<SalaryRecord> = records
        .iter()
        .filter(|r| r.valid_salary().is_some_and(|s| s <= threshold))
        .cloned()
        .collect();

    let typed_year = slice
        .iter()
        .filter(|r| r.salary_type == Some(SalaryType::Year))
        .count();

    LowSalarySlice {
        threshold,
        typed_other: slice.len() - typed_year,
        typed_year,
        records: slice,
    }
}

/// Warns when salaries from the low slice still feed the analyzed statistics.
pub fn low_salary_note(slice: &LowSalarySlice, analyzed: &[SalaryRecord]) -> Option<String> {
    let remaining = analyzed
        .iter()
        .filter(|r| r.valid_salary().is_some_and(|s| s <= slice.threshold))
        .count();

    (remaining > 0).then(|| {
        format!(
            "{} analyzed salaries are at or below {} and still count toward the group statistics; \
             set `exclude_low_salaries` or pass --exclude-low to leave them out.",
            remaining, slice.threshold
        )
    })
}

/// Frequency of each value of a categorical column, most common first.
pub fn value_counts(records: &[SalaryRecord], key: GroupKey) -> ValueCounts {
    let mut counts: HashMap<String, usize> = HashMap::new();

    for record in records {
        if let Some(value) = key.key(record) {
            *counts.entry(value).or_default() += 1;
        }
    }

    let mut counts: Vec<(String, usize)> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    ValueCounts {
        column: key.name().to_string(),
        counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DropCounts;

    fn record(row: usize, salary: f64) -> SalaryRecord {
        SalaryRecord::new(row, "mid", Some(salary))
    }

    #[test]
    fn test_describe() {
        let records: Vec<SalaryRecord> = [1.0, 2.0, 3.0, 4.0]
            .iter()
            .enumerate()
            .map(|(i, &s)| record(i, s))
            .collect();

        let stats = describe(&records).unwrap();
        assert_eq!(stats.count, 4);
        assert_eq!(stats.mean, 2.5);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 4.0);
        assert_eq!(stats.p25, 1.75);
        assert_eq!(stats.median, 2.5);
        assert_eq!(stats.p75, 3.25);
        // sample variance of 1..4 is 5/3
        assert!((stats.std.unwrap() - (5.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_describe_single_and_empty() {
        let stats = describe(&[record(1, 50000.0)]).unwrap();
        assert_eq!(stats.std, None);
        assert_eq!(stats.median, 50000.0);

        assert!(describe(&[]).is_none());
    }

    #[test]
    fn test_extremes_keep_ties() {
        let records = vec![
            record(1, 90000.0),
            record(2, 200000.0),
            record(3, 40000.0),
            record(4, 200000.0),
        ];

        let found = extremes(&records).unwrap();
        let high_rows: Vec<usize> = found.highest.iter().map(|r| r.row).collect();
        assert_eq!(high_rows, vec![2, 4]);
        assert_eq!(found.lowest.len(), 1);
        assert_eq!(found.lowest[0].row, 3);
    }

    #[test]
    fn test_average_split() {
        let records = vec![record(1, 10.0), record(2, 20.0), record(3, 30.0)];
        let split = average_split(&records).unwrap();

        assert_eq!(split.mean, 20.0);
        assert_eq!(split.above, 1);
        assert_eq!(split.at_or_below, 2);
    }

    #[test]
    fn test_low_salary_slice() {
        let mut hourly = record(1, 25.0);
        hourly.salary_type = Some(SalaryType::Hour);
        let mut mistyped = record(2, 90.0);
        mistyped.salary_type = Some(SalaryType::Year);
        let normal = record(3, 95000.0);

        let slice = low_salary_slice(&[hourly, mistyped, normal], 1000.0);
        assert_eq!(slice.records.len(), 2);
        assert_eq!(slice.typed_year, 1);
        assert_eq!(slice.typed_other, 1);
    }

    #[test]
    fn test_low_salary_note() {
        let records = vec![record(1, 22.0), record(2, 85000.0)];
        let slice = low_salary_slice(&records, 1000.0);

        let note = low_salary_note(&slice, &records).unwrap();
        assert!(note.starts_with("1 analyzed salaries"));

        let without_low = vec![record(2, 85000.0)];
        assert!(low_salary_note(&slice, &without_low).is_none());
    }

    #[test]
    fn test_value_counts_order() {
        let statuses = ["Full Time", "Contractor", "Full Time", "Intern", "Contractor", "Full Time"];
        let records: Vec<SalaryRecord> = statuses
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let mut r = record(i, 1.0);
                r.status = Some(s.to_string());
                r
            })
            .collect();

        let counts = value_counts(&records, GroupKey::Status);
        assert_eq!(counts.column, "status");
        assert_eq!(
            counts.counts,
            vec![
                ("Full Time".to_string(), 3),
                ("Contractor".to_string(), 2),
                ("Intern".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_overview() {
        let loaded = LoadOutcome {
            records: vec![
                record(1, 1.0),
                SalaryRecord::new(2, "mid", None),
                record(3, 2.0),
            ],
            columns: vec!["level".to_string(), "current_salary".to_string()],
            unparseable: 1,
            missing_level: 2,
        };
        let cleaned = CleanOutcome {
            records: vec![record(1, 1.0), record(3, 2.0)],
            dropped: DropCounts {
                missing: 1,
                ..DropCounts::default()
            },
        };

        let shape = overview(&loaded, &cleaned, 1);
        assert_eq!(shape.rows, 3);
        assert_eq!(shape.rows_with_salary, 2);
        assert_eq!(shape.rows_unparseable, 1);
        assert_eq!(shape.rows_missing_level, 2);
        assert_eq!(shape.rows_dropped, 1);
        assert_eq!(shape.rows_filtered, 1);
        assert_eq!(shape.rows_analyzed, 1);
    }
}
