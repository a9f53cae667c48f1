//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.salarybench.toml` files.

use crate::models::{BenchmarkTable, MarketBenchmark};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".salarybench.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Input settings.
    #[serde(default)]
    pub input: InputConfig,

    /// Column names in the survey file.
    #[serde(default)]
    pub columns: ColumnConfig,

    /// Cleaning settings.
    #[serde(default)]
    pub cleaning: CleaningConfig,

    /// Record filter settings.
    #[serde(default)]
    pub filter: FilterConfig,

    /// Rules deriving a level from a job title.
    #[serde(default)]
    pub levels: LevelConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,

    /// Literal market ranges keyed by level.
    #[serde(default = "default_benchmarks")]
    pub benchmarks: BTreeMap<String, BenchmarkRange>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: InputConfig::default(),
            columns: ColumnConfig::default(),
            cleaning: CleaningConfig::default(),
            filter: FilterConfig::default(),
            levels: LevelConfig::default(),
            report: ReportConfig::default(),
            benchmarks: default_benchmarks(),
        }
    }
}

/// What to do with a salary cell that is not a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParsePolicy {
    /// Load the cell as missing and count it; cleaning removes the row.
    #[default]
    Drop,
    /// Abort the load.
    Fail,
}

/// Input settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Survey CSV path.
    #[serde(default = "default_data")]
    pub data: String,

    /// Optional benchmark CSV path (`level,low,high`).
    #[serde(default)]
    pub benchmarks: Option<String>,

    /// Handling of non-numeric salary cells.
    #[serde(default)]
    pub parse_policy: ParsePolicy,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            data: default_data(),
            benchmarks: None,
            parse_policy: ParsePolicy::default(),
        }
    }
}

fn default_data() -> String {
    "data/blizzard_salary.csv".to_string()
}

/// Column names in the survey CSV.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnConfig {
    #[serde(default = "default_salary_column")]
    pub salary: String,

    /// Explicit level column. When absent from the file the level is
    /// derived from the title.
    #[serde(default = "default_level_column")]
    pub level: String,

    #[serde(default = "default_title_column")]
    pub title: String,

    #[serde(default = "default_salary_type_column")]
    pub salary_type: String,

    #[serde(default = "default_location_column")]
    pub location: String,

    #[serde(default = "default_status_column")]
    pub status: String,

    #[serde(default = "default_performance_column")]
    pub performance_rating: String,

    #[serde(default = "default_increase_column")]
    pub percent_increase: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            salary: default_salary_column(),
            level: default_level_column(),
            title: default_title_column(),
            salary_type: default_salary_type_column(),
            location: default_location_column(),
            status: default_status_column(),
            performance_rating: default_performance_column(),
            percent_increase: default_increase_column(),
        }
    }
}

fn default_salary_column() -> String {
    "current_salary".to_string()
}

fn default_level_column() -> String {
    "level".to_string()
}

fn default_title_column() -> String {
    "current_title".to_string()
}

fn default_salary_type_column() -> String {
    "salary_type".to_string()
}

fn default_location_column() -> String {
    "location".to_string()
}

fn default_status_column() -> String {
    "status".to_string()
}

fn default_performance_column() -> String {
    "performance_rating".to_string()
}

fn default_increase_column() -> String {
    "percent_incr".to_string()
}

/// Cleaning settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningConfig {
    /// Zero salaries mean "not reported" and are dropped.
    #[serde(default = "default_true")]
    pub treat_zero_as_missing: bool,

    /// Salaries at or below this value are listed as suspicious.
    #[serde(default = "default_low_salary_threshold")]
    pub low_salary_threshold: f64,

    /// Leave salaries at or below the threshold out of the statistics.
    #[serde(default)]
    pub exclude_low_salaries: bool,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            treat_zero_as_missing: true,
            low_salary_threshold: default_low_salary_threshold(),
            exclude_low_salaries: false,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_low_salary_threshold() -> f64 {
    1000.0
}

/// Record filter settings. Empty lists disable that filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default = "default_salary_types")]
    pub salary_types: Vec<String>,

    #[serde(default)]
    pub locations: Vec<String>,

    #[serde(default)]
    pub statuses: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            salary_types: default_salary_types(),
            locations: Vec::new(),
            statuses: Vec::new(),
        }
    }
}

fn default_salary_types() -> Vec<String> {
    vec!["year".to_string()]
}

/// One keyword rule. The first rule with a matching keyword wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelRule {
    pub level: String,
    pub keywords: Vec<String>,
}

/// Level derivation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelConfig {
    /// Level for titles no rule matches.
    #[serde(default = "default_level")]
    pub default_level: String,

    #[serde(default = "default_level_rules")]
    pub rules: Vec<LevelRule>,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            default_level: default_level(),
            rules: default_level_rules(),
        }
    }
}

fn default_level() -> String {
    "mid".to_string()
}

fn default_level_rules() -> Vec<LevelRule> {
    let rule = |level: &str, keywords: &[&str]| LevelRule {
        level: level.to_string(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
    };

    vec![
        rule("principal", &["principal", "staff", "lead", "director", "head"]),
        rule("senior", &["senior", "sr", "iii"]),
        rule("entry", &["associate", "junior", "jr", "intern", "entry", "i"]),
    ]
}

impl LevelConfig {
    /// Maps a job title to a level.
    ///
    /// Keywords match whole words of the lowercased title; a keyword
    /// containing a space matches as a substring.
    pub fn derive_level(&self, title: &str) -> String {
        let lowered = title.to_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();

        for rule in &self.rules {
            let hit = rule.keywords.iter().any(|keyword| {
                let keyword = keyword.to_lowercase();
                if keyword.contains(' ') {
                    lowered.contains(&keyword)
                } else {
                    words.iter().any(|w| *w == keyword)
                }
            });
            if hit {
                return rule.level.clone();
            }
        }

        self.default_level.clone()
    }
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Output file path. Defaults to `salary_report.<ext>` for the chosen format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    /// Width of the text bar charts, in characters.
    #[serde(default = "default_chart_width")]
    pub chart_width: usize,

    /// Rows shown per value-count table.
    #[serde(default = "default_top_values")]
    pub top_values: usize,

    /// Decimals for monetary and percentage figures.
    #[serde(default = "default_decimals")]
    pub decimals: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output: None,
            chart_width: default_chart_width(),
            top_values: default_top_values(),
            decimals: default_decimals(),
        }
    }
}

fn default_chart_width() -> usize {
    40
}

fn default_top_values() -> usize {
    10
}

fn default_decimals() -> usize {
    2
}

impl ReportConfig {
    /// Where to write the report, given the format's file extension.
    pub fn output_path(&self, extension: &str) -> String {
        self.output
            .clone()
            .unwrap_or_else(|| format!("salary_report.{}", extension))
    }
}

/// Literal market range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRange {
    pub low: f64,
    pub high: f64,
}

fn default_benchmarks() -> BTreeMap<String, BenchmarkRange> {
    [
        ("entry", 60000.0, 90000.0),
        ("mid", 85000.0, 125000.0),
        ("senior", 115000.0, 165000.0),
        ("principal", 150000.0, 220000.0),
    ]
    .into_iter()
    .map(|(level, low, high)| (level.to_string(), BenchmarkRange { low, high }))
    .collect()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref data) = args.data {
            self.input.data = data.display().to_string();
        }
        if let Some(ref benchmarks) = args.benchmarks {
            self.input.benchmarks = Some(benchmarks.display().to_string());
        }
        if let Some(ref output) = args.output {
            self.report.output = Some(output.display().to_string());
        }

        if args.strict {
            self.input.parse_policy = ParsePolicy::Fail;
        }
        if args.keep_zero {
            self.cleaning.treat_zero_as_missing = false;
        }
        if args.exclude_low {
            self.cleaning.exclude_low_salaries = true;
        }

        // "all" disables the salary type filter
        if let Some(ref types) = args.salary_type {
            if types.iter().any(|t| t.eq_ignore_ascii_case("all")) {
                self.filter.salary_types.clear();
            } else {
                self.filter.salary_types = types.clone();
            }
        }
    }

    /// Benchmarks declared in the config file.
    pub fn benchmark_table(&self) -> BenchmarkTable {
        self.benchmarks
            .iter()
            .map(|(level, range)| {
                (
                    level.clone(),
                    MarketBenchmark {
                        level: level.clone(),
                        low: range.low,
                        high: range.high,
                    },
                )
            })
            .collect()
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
