//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::analysis::GroupKey;
use clap::Parser;
use std::path::PathBuf;

/// SalaryBench - salary survey analysis against market benchmarks
///
/// Loads a salary survey CSV, drops unusable rows, summarizes pay per
/// group, and compares each level's range with market benchmarks.
///
/// Examples:
///   salarybench --data data/blizzard_salary.csv
///   salarybench --data survey.csv --benchmarks market.csv --format json
///   salarybench --group-by location --salary-type all
///   salarybench --dry-run
///   salarybench --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Survey CSV file to analyze
    ///
    /// Defaults to the `[input] data` config value (data/blizzard_salary.csv).
    #[arg(short, long, value_name = "FILE", env = "SALARYBENCH_DATA")]
    pub data: Option<PathBuf>,

    /// Market benchmark CSV with `level,low,high` columns
    ///
    /// Replaces the `[benchmarks]` table of the config file.
    #[arg(short, long, value_name = "FILE")]
    pub benchmarks: Option<PathBuf>,

    /// Column to group salaries by
    #[arg(short, long, default_value = "level", value_name = "KEY")]
    pub group_by: GroupBy,

    /// Output file path for the report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json, text)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Path to configuration file
    ///
    /// If not given, looks for .salarybench.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Salary types to analyze (comma-separated, or "all")
    ///
    /// Example: --salary-type year,hour
    #[arg(long, value_name = "TYPES", value_delimiter = ',')]
    pub salary_type: Option<Vec<String>>,

    /// Abort when a salary cell is not a number
    ///
    /// By default such rows are counted and dropped.
    #[arg(long)]
    pub strict: bool,

    /// Keep zero salaries instead of treating them as not reported
    #[arg(long)]
    pub keep_zero: bool,

    /// Leave salaries at or below the low-salary threshold out of the statistics
    #[arg(long)]
    pub exclude_low: bool,

    /// Load and clean the data, print counts, and exit without a report
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .salarybench.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
    /// Plain text
    Text,
}

impl OutputFormat {
    /// File extension for reports in this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Json => "json",
            OutputFormat::Text => "txt",
        }
    }
}

/// Grouping key for --group-by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum GroupBy {
    #[default]
    Level,
    Title,
    Location,
    Status,
    SalaryType,
    PerformanceRating,
}

impl From<GroupBy> for GroupKey {
    fn from(value: GroupBy) -> Self {
        match value {
            GroupBy::Level => GroupKey::Level,
            GroupBy::Title => GroupKey::Title,
            GroupBy::Location => GroupKey::Location,
            GroupBy::Status => GroupKey::Status,
            GroupBy::SalaryType => GroupKey::SalaryType,
            GroupBy::PerformanceRating => GroupKey::PerformanceRating,
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref data) = self.data {
            if !data.exists() {
                return Err(format!("Data file does not exist: {}", data.display()));
            }
            if !data.is_file() {
                return Err(format!("Data path is not a file: {}", data.display()));
            }
        }

        if let Some(ref benchmarks) = self.benchmarks {
            if !benchmarks.is_file() {
                return Err(format!(
                    "Benchmark file does not exist: {}",
                    benchmarks.display()
                ));
            }
        }

        if let Some(ref types) = self.salary_type {
            if types.iter().any(|t| t.trim().is_empty()) {
                return Err("Salary types must not be empty".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            data: None,
            benchmarks: None,
            group_by: GroupBy::Level,
            output: None,
            format: OutputFormat::Markdown,
            config: None,
            salary_type: None,
            strict: false,
            keep_zero: false,
            exclude_low: false,
            dry_run: false,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_flags() {
        let args = Args::try_parse_from([
            "salarybench",
            "--group-by",
            "performance-rating",
            "--format",
            "json",
            "--salary-type",
            "year,hour",
            "--strict",
        ])
        .unwrap();

        assert_eq!(args.group_by, GroupBy::PerformanceRating);
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(
            args.salary_type,
            Some(vec!["year".to_string(), "hour".to_string()])
        );
        assert!(args.strict);
        assert_eq!(GroupKey::from(args.group_by), GroupKey::PerformanceRating);
    }

    #[test]
    fn test_output_extension() {
        assert_eq!(OutputFormat::Markdown.extension(), "md");
        assert_eq!(OutputFormat::Json.extension(), "json");
        assert_eq!(OutputFormat::Text.extension(), "txt");
    }

    #[test]
    fn test_validation_missing_data_file() {
        let mut args = make_args();
        args.data = Some(PathBuf::from("/nonexistent/survey.csv"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_skipped_for_init_config() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        args.init_config = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
