//! Report generation.
//!
//! This module renders the analysis results as a Markdown document, a JSON
//! document, or a plain-text summary.

use super::chart::bar_chart;
use crate::analysis::rank_by_mean;
use crate::config::ReportConfig;
use crate::models::{
    Comparison, DatasetOverview, Describe, DropCounts, Report, ReportMetadata, SalaryRecord,
    Summary, ValueCounts,
};
use anyhow::Result;
use std::collections::BTreeMap;

/// Presentation settings.
#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    pub chart_width: usize,
    pub top_values: usize,
    pub decimals: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self::from(&ReportConfig::default())
    }
}

impl From<&ReportConfig> for ReportOptions {
    fn from(config: &ReportConfig) -> Self {
        Self {
            chart_width: config.chart_width,
            top_values: config.top_values,
            decimals: config.decimals,
        }
    }
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report, options: &ReportOptions) -> String {
    let mut output = String::new();

    output.push_str("# Salary Benchmark Report\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_table_of_contents(report));
    output.push_str(&generate_overview_section(&report.overview, &report.dropped));
    output.push_str(&generate_distribution_section(report, options));
    output.push_str(&generate_value_counts_section(&report.value_counts, options));
    output.push_str(&generate_groups_section(
        &report.metadata.group_by,
        &report.groups,
        options,
    ));
    output.push_str(&generate_comparison_section(&report.comparison, options));
    output.push_str(&generate_conclusions_section(&report.conclusions));
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Data Source:** `{}`\n", metadata.data_source));
    if let Some(ref benchmarks) = metadata.benchmark_source {
        section.push_str(&format!("- **Benchmarks:** `{}`\n", benchmarks));
    } else {
        section.push_str("- **Benchmarks:** configuration\n");
    }
    section.push_str(&format!(
        "- **Analysis Date:** {}\n",
        metadata.analysis_date.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Grouped By:** {}\n", metadata.group_by));
    section.push_str(&format!(
        "- **Analysis Duration:** {:.3}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the table of contents.
fn generate_table_of_contents(report: &Report) -> String {
    let mut toc = String::new();

    toc.push_str("## Table of Contents\n\n");
    toc.push_str("- [Metadata](#metadata)\n");
    toc.push_str("- [Dataset Overview](#dataset-overview)\n");
    toc.push_str("- [Salary Distribution](#salary-distribution)\n");
    if !report.value_counts.is_empty() {
        toc.push_str("- [Categorical Breakdown](#categorical-breakdown)\n");
    }
    toc.push_str("- [Salaries by Group](#salaries-by-group)\n");
    toc.push_str("- [Market Comparison](#market-comparison)\n");
    if !report.conclusions.is_empty() {
        toc.push_str("- [Conclusions](#conclusions)\n");
    }
    toc.push('\n');

    toc
}

/// Generate the dataset overview section.
fn generate_overview_section(overview: &DatasetOverview, dropped: &DropCounts) -> String {
    let mut section = String::new();

    section.push_str("## Dataset Overview\n\n");
    section.push_str(&format!(
        "- **Rows:** {} ({} columns)\n",
        overview.rows,
        overview.columns.len()
    ));
    section.push_str(&format!(
        "- **Columns:** {}\n",
        overview
            .columns
            .iter()
            .map(|c| format!("`{}`", c))
            .collect::<Vec<_>>()
            .join(", ")
    ));
    section.push_str(&format!(
        "- **Rows With Salary:** {}\n",
        overview.rows_with_salary
    ));
    if overview.rows_unparseable > 0 {
        section.push_str(&format!(
            "- **Unparseable Salaries:** {}\n",
            overview.rows_unparseable
        ));
    }
    if overview.rows_missing_level > 0 {
        section.push_str(&format!(
            "- **Skipped Without Level:** {}\n",
            overview.rows_missing_level
        ));
    }
    section.push_str(&format!(
        "- **Rows Analyzed:** {}\n\n",
        overview.rows_analyzed
    ));

    section.push_str("### Excluded Rows\n\n");
    section.push_str("| Missing | Non-finite | Negative | Zero | Filtered Out | **Total** |\n");
    section.push_str("|:---:|:---:|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} | {} | {} | **{}** |\n\n",
        dropped.missing,
        dropped.non_finite,
        dropped.negative,
        dropped.zero,
        overview.rows_filtered,
        dropped.total() + overview.rows_filtered
    ));

    section
}

/// Generate the salary distribution section.
fn generate_distribution_section(report: &Report, options: &ReportOptions) -> String {
    let mut section = String::new();
    let d = options.decimals;

    section.push_str("## Salary Distribution\n\n");

    let Some(ref stats) = report.salary_stats else {
        section.push_str("No valid salaries remained after cleaning.\n\n");
        return section;
    };

    section.push_str(&generate_describe_table(stats, d));

    if let Some(ref split) = report.average_split {
        section.push_str(&format!(
            "**{}** respondents earn above the average of {}, **{}** at or below it.\n\n",
            split.above,
            format_money(split.mean, d),
            split.at_or_below
        ));
    }

    if let Some(ref extremes) = report.extremes {
        section.push_str("### Highest Salary\n\n");
        section.push_str(&generate_record_table(&extremes.highest, d));
        section.push_str("### Lowest Salary\n\n");
        section.push_str(&generate_record_table(&extremes.lowest, d));
    }

    let low = &report.low_salary;
    if !low.records.is_empty() {
        section.push_str(&format!(
            "### Salaries At or Below {}\n\n",
            format_money(low.threshold, 0)
        ));
        section.push_str(&format!(
            "{} respondents report {} or less ({} typed as yearly, {} otherwise). \
             These are most likely hourly rates.\n\n",
            low.records.len(),
            format_money(low.threshold, 0),
            low.typed_year,
            low.typed_other
        ));
        section.push_str(&generate_record_table(&low.records, d));
    }

    section
}

fn generate_describe_table(stats: &Describe, decimals: usize) -> String {
    let mut table = String::new();

    table.push_str("| Statistic | Value |\n");
    table.push_str("|:---|---:|\n");
    table.push_str(&format!("| Count | {} |\n", stats.count));
    table.push_str(&format!("| Mean | {} |\n", format_money(stats.mean, decimals)));
    let std = stats
        .std
        .map(|s| format_money(s, decimals))
        .unwrap_or_else(|| "n/a".to_string());
    table.push_str(&format!("| Std | {} |\n", std));
    table.push_str(&format!("| Min | {} |\n", format_money(stats.min, decimals)));
    table.push_str(&format!("| 25% | {} |\n", format_money(stats.p25, decimals)));
    table.push_str(&format!("| 50% | {} |\n", format_money(stats.median, decimals)));
    table.push_str(&format!("| 75% | {} |\n", format_money(stats.p75, decimals)));
    table.push_str(&format!("| Max | {} |\n\n", format_money(stats.max, decimals)));

    table
}

fn generate_record_table(records: &[SalaryRecord], decimals: usize) -> String {
    let mut table = String::new();
    let dash = || "-".to_string();

    table.push_str("| Row | Title | Level | Salary | Type | Location |\n");
    table.push_str("|:---:|:---|:---|---:|:---|:---|\n");
    for record in records {
        table.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} |\n",
            record.row,
            record.title.clone().unwrap_or_else(dash),
            record.level,
            record
                .salary
                .map(|s| format_money(s, decimals))
                .unwrap_or_else(dash),
            record
                .salary_type
                .as_ref()
                .map(|t| t.to_string())
                .unwrap_or_else(dash),
            record.location.clone().unwrap_or_else(dash),
        ));
    }
    table.push('\n');

    table
}

/// Generate the frequency tables.
fn generate_value_counts_section(value_counts: &[ValueCounts], options: &ReportOptions) -> String {
    if value_counts.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Categorical Breakdown\n\n");

    for counts in value_counts.iter().filter(|c| !c.counts.is_empty()) {
        section.push_str(&format!("### By {}\n\n", capitalize(&counts.column)));
        section.push_str("| Value | Count |\n");
        section.push_str("|:---|:---:|\n");

        for (value, count) in counts.counts.iter().take(options.top_values) {
            section.push_str(&format!("| {} | {} |\n", value, count));
        }
        let hidden = counts.counts.len().saturating_sub(options.top_values);
        if hidden > 0 {
            section.push_str(&format!("| *{} more* | |\n", hidden));
        }
        section.push('\n');
    }

    section
}

/// Generate the per-group summary table and mean chart.
fn generate_groups_section(
    group_by: &str,
    groups: &BTreeMap<String, Summary>,
    options: &ReportOptions,
) -> String {
    let mut section = String::new();
    let d = options.decimals;

    section.push_str("## Salaries by Group\n\n");

    if groups.is_empty() {
        section.push_str("No group had a valid salary.\n\n");
        return section;
    }

    section.push_str(&format!(
        "| {} | Count | Min | Mean | Max |\n",
        capitalize(group_by)
    ));
    section.push_str("|:---|:---:|---:|---:|---:|\n");
    for (key, summary) in groups {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            key,
            summary.count,
            format_money(summary.min, d),
            format_money(summary.mean, d),
            format_money(summary.max, d)
        ));
    }
    section.push('\n');

    let bars: Vec<(String, f64)> = rank_by_mean(groups)
        .into_iter()
        .map(|(key, summary)| (key.clone(), summary.mean))
        .collect();
    section.push_str("### Mean Salary\n\n```text\n");
    section.push_str(&bar_chart(&bars, options.chart_width, 0, ""));
    section.push_str("```\n\n");

    section
}

/// Generate the market comparison section.
fn generate_comparison_section(comparison: &Comparison, options: &ReportOptions) -> String {
    let mut section = String::new();
    let d = options.decimals;

    section.push_str("## Market Comparison\n\n");

    if comparison.matched.is_empty() {
        section.push_str("No group could be matched with a market benchmark.\n\n");
    } else {
        section.push_str(
            "| Level | Company Min | Market Low | Low Diff | Company Max | Market High | High Diff |\n",
        );
        section.push_str("|:---|---:|---:|---:|---:|---:|---:|\n");
        for c in &comparison.matched {
            section.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} | {} |\n",
                c.level,
                format_money(c.summary.min, d),
                format_money(c.benchmark.low, d),
                format_pct(c.difference.low_diff_pct, d),
                format_money(c.summary.max, d),
                format_money(c.benchmark.high, d),
                format_pct(c.difference.high_diff_pct, d),
            ));
        }
        section.push('\n');

        section.push_str("### Percent Difference\n\n```text\n");
        section.push_str(&bar_chart(&difference_bars(comparison), options.chart_width, d, "%"));
        section.push_str("```\n\n");
    }

    if !comparison.unmatched.is_empty() {
        section.push_str("### Unmatched\n\n");
        for level in &comparison.unmatched {
            section.push_str(&format!("- {}: no benchmark available\n", level));
        }
        section.push('\n');
    }

    section
}

fn difference_bars(comparison: &Comparison) -> Vec<(String, f64)> {
    comparison
        .matched
        .iter()
        .flat_map(|c| {
            [
                (format!("{} low", c.level), c.difference.low_diff_pct),
                (format!("{} high", c.level), c.difference.high_diff_pct),
            ]
        })
        .collect()
}

/// Generate the conclusions section.
fn generate_conclusions_section(conclusions: &[String]) -> String {
    if conclusions.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Conclusions\n\n");
    for (i, line) in conclusions.iter().enumerate() {
        section.push_str(&format!("{}. {}\n", i + 1, line));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str(&format!(
        "*Report generated by salarybench v{}*\n",
        env!("CARGO_PKG_VERSION")
    ));

    footer
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Generate a plain-text report for the terminal.
pub fn generate_text_report(report: &Report, options: &ReportOptions) -> String {
    let mut output = String::new();
    let d = options.decimals;

    output.push_str("SALARY BENCHMARK REPORT\n");
    output.push_str(&format!(
        "{} rows loaded, {} analyzed, grouped by {}\n\n",
        report.overview.rows, report.overview.rows_analyzed, report.metadata.group_by
    ));

    if let Some(ref stats) = report.salary_stats {
        output.push_str(&format!(
            "Salary: count {}, mean {}, median {}, min {}, max {}\n\n",
            stats.count,
            format_money(stats.mean, d),
            format_money(stats.median, d),
            format_money(stats.min, d),
            format_money(stats.max, d)
        ));
    }

    for (key, summary) in &report.groups {
        output.push_str(&format!(
            "{:<16} n={:<4} min {:>14} mean {:>14} max {:>14}\n",
            key,
            summary.count,
            format_money(summary.min, d),
            format_money(summary.mean, d),
            format_money(summary.max, d)
        ));
    }
    output.push('\n');

    if !report.comparison.matched.is_empty() {
        output.push_str("Percent difference vs. market:\n");
        output.push_str(&bar_chart(
            &difference_bars(&report.comparison),
            options.chart_width,
            d,
            "%",
        ));
        output.push('\n');
    }

    for line in &report.conclusions {
        output.push_str(&format!("* {}\n", line));
    }

    output
}

/// Format a monetary amount with thousands separators, e.g. `$85,000.00`.
pub fn format_money(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::new();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    match frac_part {
        Some(f) => format!("{}${}.{}", sign, grouped, f),
        None => format!("{}${}", sign, grouped),
    }
}

/// Format a signed percentage, e.g. `+33.33%`.
pub fn format_pct(value: f64, decimals: usize) -> String {
    format!("{:+.*}%", decimals, value)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
