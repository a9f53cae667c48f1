//! Comparison of company salary ranges against market benchmarks.

use crate::error::{AnalysisError, AnalysisResult};
use crate::models::{
    BenchmarkTable, Comparison, LevelComparison, MarketBenchmark, PercentDifference, Summary,
};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Percent gap between the company's observed bounds and the market bounds.
///
/// `low_diff_pct` compares the company minimum with the market low and
/// `high_diff_pct` the company maximum with the market high. No rounding is
/// applied.
pub fn percent_difference(
    level: &str,
    summary: &Summary,
    benchmark: Option<&MarketBenchmark>,
) -> AnalysisResult<PercentDifference> {
    let benchmark = benchmark.ok_or_else(|| AnalysisError::MissingBenchmark {
        level: level.to_string(),
    })?;

    let low = usable_bound(level, "low", benchmark.low)?;
    let high = usable_bound(level, "high", benchmark.high)?;

    Ok(PercentDifference {
        low_diff_pct: (summary.min - low) / low * 100.0,
        high_diff_pct: (summary.max - high) / high * 100.0,
    })
}

fn usable_bound(level: &str, name: &str, value: f64) -> AnalysisResult<f64> {
    if !value.is_finite() {
        return Err(AnalysisError::InvalidBenchmark {
            level: level.to_string(),
            reason: format!("{} bound is not a finite number", name),
        });
    }
    if value <= 0.0 {
        return Err(AnalysisError::InvalidBenchmark {
            level: level.to_string(),
            reason: format!("{} bound {} is not positive", name, value),
        });
    }
    Ok(value)
}

/// Compare every group with its benchmark.
///
/// Groups with no benchmark are listed as unmatched. A degenerate benchmark
/// aborts the comparison.
pub fn compare(
    groups: &BTreeMap<String, Summary>,
    benchmarks: &BenchmarkTable,
) -> AnalysisResult<Comparison> {
    let mut comparison = Comparison::default();

    for (level, summary) in groups {
        let Some(benchmark) = benchmarks.get(level) else {
            info!("No benchmark available for '{}'", level);
            comparison.unmatched.push(level.clone());
            continue;
        };

        let difference = percent_difference(level, summary, Some(benchmark))?;
        debug!(
            "{}: low {:+.2}%, high {:+.2}%",
            level, difference.low_diff_pct, difference.high_diff_pct
        );

        comparison.matched.push(LevelComparison {
            level: level.clone(),
            summary: *summary,
            benchmark: benchmark.clone(),
            difference,
        });
    }

    Ok(comparison)
}

/// Plain-language findings for each matched level.
pub fn conclusions(comparison: &Comparison, decimals: usize) -> Vec<String> {
    let mut lines: Vec<String> = comparison
        .matched
        .iter()
        .map(|c| {
            format!(
                "{}: company minimum is {} the market low, company maximum is {} the market high.",
                c.level,
                describe_gap(c.difference.low_diff_pct, decimals),
                describe_gap(c.difference.high_diff_pct, decimals),
            )
        })
        .collect();

    if let Some(best) = comparison
        .matched
        .iter()
        .max_by(|a, b| a.difference.low_diff_pct.total_cmp(&b.difference.low_diff_pct))
    {
        if best.difference.low_diff_pct > 0.0 {
            lines.push(format!(
                "The company minimum sits furthest above market at the '{}' level.",
                best.level
            ));
        } else {
            lines.push(format!(
                "No level's company minimum is above the market low. The '{}' level comes closest.",
                best.level
            ));
        }
    }

    if !comparison.unmatched.is_empty() {
        lines.push(format!(
            "No benchmark available for: {}.",
            comparison.unmatched.join(", ")
        ));
    }

    lines
}

fn describe_gap(pct: f64, decimals: usize) -> String {
    if pct > 0.0 {
        format!("{:.*}% above", decimals, pct)
    } else if pct < 0.0 {
        format!("{:.*}% below", decimals, pct.abs())
    } else {
        "level with".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn benchmark(level: &str, low: f64, high: f64) -> MarketBenchmark {
        MarketBenchmark {
            level: level.to_string(),
            low,
            high,
        }
    }

    fn summary(min: f64, max: f64) -> Summary {
        Summary {
            count: 2,
            min,
            max,
            mean: (min + max) / 2.0,
        }
    }

    #[test]
    fn test_entry_scenario() {
        let diff = percent_difference(
            "entry",
            &summary(80000.0, 100000.0),
            Some(&benchmark("entry", 60000.0, 90000.0)),
        )
        .unwrap();

        assert!((diff.low_diff_pct - 33.333333).abs() < 1e-4);
        assert!((diff.high_diff_pct - 11.111111).abs() < 1e-4);
        assert_eq!(format!("{:.2}", diff.low_diff_pct), "33.33");
        assert_eq!(format!("{:.2}", diff.high_diff_pct), "11.11");
    }

    #[test]
    fn test_low_equal_to_min_is_zero() {
        let diff = percent_difference(
            "mid",
            &summary(85000.0, 120000.0),
            Some(&benchmark("mid", 85000.0, 125000.0)),
        )
        .unwrap();

        assert_eq!(diff.low_diff_pct, 0.0);
        assert!(diff.high_diff_pct < 0.0);
    }

    #[test]
    fn test_missing_benchmark() {
        let err = percent_difference("intern", &summary(1.0, 2.0), None).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingBenchmark { ref level } if level == "intern"));
    }

    #[test]
    fn test_zero_bound_is_invalid() {
        let err = percent_difference(
            "entry",
            &summary(1.0, 2.0),
            Some(&benchmark("entry", 0.0, 90000.0)),
        )
        .unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidBenchmark { .. }));

        let err = percent_difference(
            "entry",
            &summary(1.0, 2.0),
            Some(&benchmark("entry", 60000.0, 0.0)),
        )
        .unwrap_err();
        assert!(err.to_string().contains("high bound 0 is not positive"));
    }

    #[test]
    fn test_negative_bound_is_invalid() {
        let err = percent_difference(
            "entry",
            &summary(80000.0, 100000.0),
            Some(&benchmark("entry", -60000.0, 90000.0)),
        )
        .unwrap_err();

        match err {
            AnalysisError::InvalidBenchmark { level, reason } => {
                assert_eq!(level, "entry");
                assert!(reason.contains("low bound -60000 is not positive"));
            }
            other => panic!("expected InvalidBenchmark, got {:?}", other),
        }
    }

    #[test]
    fn test_compare_separates_unmatched() {
        let groups: BTreeMap<String, Summary> = [
            ("entry".to_string(), summary(80000.0, 100000.0)),
            ("intern".to_string(), summary(30000.0, 40000.0)),
        ]
        .into_iter()
        .collect();
        let benchmarks: BenchmarkTable = [("entry".to_string(), benchmark("entry", 60000.0, 90000.0))]
            .into_iter()
            .collect();

        let comparison = compare(&groups, &benchmarks).unwrap();

        assert_eq!(comparison.matched.len(), 1);
        assert_eq!(comparison.matched[0].level, "entry");
        assert_eq!(comparison.unmatched, vec!["intern".to_string()]);
        assert!(comparison.matched.iter().all(|m| m.level != "intern"));
    }

    #[test]
    fn test_compare_aborts_on_invalid_benchmark() {
        let groups: BTreeMap<String, Summary> =
            [("entry".to_string(), summary(80000.0, 100000.0))].into_iter().collect();
        let benchmarks: BenchmarkTable = [("entry".to_string(), benchmark("entry", 0.0, 0.0))]
            .into_iter()
            .collect();

        assert!(compare(&groups, &benchmarks).is_err());
    }

    #[test]
    fn test_conclusions() {
        let comparison = Comparison {
            matched: vec![LevelComparison {
                level: "entry".to_string(),
                summary: summary(80000.0, 100000.0),
                benchmark: benchmark("entry", 60000.0, 90000.0),
                difference: PercentDifference {
                    low_diff_pct: 33.3333,
                    high_diff_pct: -5.0,
                },
            }],
            unmatched: vec!["intern".to_string()],
        };

        let lines = conclusions(&comparison, 2);
        assert!(lines[0].contains("33.33% above the market low"));
        assert!(lines[0].contains("5.00% below the market high"));
        assert!(lines.iter().any(|l| l.contains("'entry'")));
        assert!(lines.last().unwrap().contains("intern"));
    }

    #[test]
    fn test_conclusions_when_every_level_is_below_market() {
        let level = |name: &str, low_diff_pct: f64| LevelComparison {
            level: name.to_string(),
            summary: summary(50000.0, 80000.0),
            benchmark: benchmark(name, 60000.0, 90000.0),
            difference: PercentDifference {
                low_diff_pct,
                high_diff_pct: -10.0,
            },
        };
        let comparison = Comparison {
            matched: vec![level("entry", -16.67), level("mid", -4.0)],
            unmatched: vec![],
        };

        let lines = conclusions(&comparison, 2);
        assert!(lines.iter().all(|l| !l.contains("furthest above")));
        assert!(lines
            .iter()
            .any(|l| l.contains("No level's company minimum is above") && l.contains("'mid'")));
    }
}
