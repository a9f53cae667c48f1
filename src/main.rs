//! SalaryBench - salary survey analysis against market benchmarks
//!
//! A CLI tool that loads anonymous salary survey responses, summarizes
//! pay per job level, and compares each level's range with external
//! market benchmarks.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Error (unreadable input, missing column, invalid benchmark, etc.)

mod analysis;
mod cli;
mod config;
mod error;
mod loader;
mod models;
mod report;

use analysis::{CleanOptions, CleanOutcome, GroupKey, RecordFilter};
use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::{Config, DEFAULT_CONFIG_FILE};
use loader::{LoadOptions, LoadOutcome};
use models::{Report, ReportMetadata, SalaryRecord};
use report::ReportOptions;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("SalaryBench v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run_analysis(args) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Analysis failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .salarybench.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to customize columns, level rules, filters, and benchmarks.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete analysis. Returns the exit code.
fn run_analysis(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    // Step 1: Load the survey
    let data_path = PathBuf::from(&config.input.data);
    println!("📥 Loading survey: {}", data_path.display());
    let loaded = loader::load_records(&data_path, LoadOptions::from(&config))
        .with_context(|| format!("Failed to load {}", data_path.display()))?;

    // Step 2: Clean and filter
    let cleaned = analysis::clean(&loaded.records, &CleanOptions::from(&config.cleaning));
    let analyzed = analysis::filter(cleaned.records.clone(), &RecordFilter::from(&config));

    if args.dry_run {
        return handle_dry_run(&loaded, &cleaned, &analyzed);
    }

    // Step 3: Benchmarks
    let benchmarks = loader::resolve_benchmarks(&config).with_context(|| {
        format!(
            "Failed to load benchmarks from {}",
            config.input.benchmarks.as_deref().unwrap_or("config")
        )
    })?;
    info!("Using {} benchmarks", benchmarks.len());

    // Step 4: Group, summarize, and compare
    println!("🔬 Summarizing {} records...", analyzed.len());

    let group_key = GroupKey::from(args.group_by);
    let groups = analysis::group_by_key(&analyzed, group_key);
    let level_groups = if group_key == GroupKey::Level {
        groups.clone()
    } else {
        analysis::group_by_key(&analyzed, GroupKey::Level)
    };

    let comparison = analysis::compare(&level_groups, &benchmarks)
        .context("Failed to compare with market benchmarks")?;

    // Step 5: Build the report
    println!("📝 Generating report...");

    let report_options = ReportOptions::from(&config.report);
    let value_counts = GroupKey::categorical()
        .into_iter()
        .map(|key| analysis::value_counts(&loaded.records, key))
        .filter(|counts| !counts.counts.is_empty())
        .collect();

    let low_salary =
        analysis::low_salary_slice(&cleaned.records, config.cleaning.low_salary_threshold);
    let mut conclusions = analysis::conclusions(&comparison, report_options.decimals);
    conclusions.extend(analysis::low_salary_note(&low_salary, &analyzed));

    let report = Report {
        metadata: ReportMetadata {
            data_source: data_path.display().to_string(),
            benchmark_source: config.input.benchmarks.clone(),
            analysis_date: Utc::now(),
            group_by: group_key.name().to_string(),
            duration_seconds: start_time.elapsed().as_secs_f64(),
        },
        overview: analysis::overview(&loaded, &cleaned, analyzed.len()),
        dropped: cleaned.dropped,
        salary_stats: analysis::describe(&analyzed),
        extremes: analysis::extremes(&analyzed),
        average_split: analysis::average_split(&analyzed),
        low_salary,
        value_counts,
        groups,
        conclusions,
        comparison,
    };

    // Step 6: Render and save the report
    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report, &report_options),
        OutputFormat::Text => report::generate_text_report(&report, &report_options),
    };

    let output_path = PathBuf::from(config.report.output_path(args.format.extension()));
    std::fs::write(&output_path, &output)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    print_summary(&report, &report_options);
    println!(
        "\n✅ Analysis complete! Report saved to: {}",
        output_path.display()
    );

    Ok(0)
}

/// Print the comparison results to stdout.
fn print_summary(report: &Report, options: &ReportOptions) {
    let d = options.decimals;

    println!("\n📊 Analysis Summary:");
    println!(
        "   Rows: {} loaded | {} dropped | {} analyzed",
        report.overview.rows, report.overview.rows_dropped, report.overview.rows_analyzed
    );

    for c in &report.comparison.matched {
        println!(
            "   - {}: n={} | low {} | high {}",
            c.level,
            c.summary.count,
            report::format_pct(c.difference.low_diff_pct, d),
            report::format_pct(c.difference.high_diff_pct, d)
        );
    }
    for level in &report.comparison.unmatched {
        println!("   - {}: no benchmark available", level);
    }
    println!("   Duration: {:.3}s", report.metadata.duration_seconds);
}

/// Handle --dry-run: print load and cleaning counts, write nothing.
fn handle_dry_run(
    loaded: &LoadOutcome,
    cleaned: &CleanOutcome,
    analyzed: &[SalaryRecord],
) -> Result<i32> {
    println!("\n🔍 Dry run: no report will be written\n");
    println!("   Columns: {}", loaded.columns.join(", "));
    println!("   Rows loaded: {}", loaded.records.len());
    println!("   Unparseable salaries: {}", loaded.unparseable);
    println!("   Skipped without level: {}", loaded.missing_level);
    println!(
        "   Dropped while cleaning: {} (missing {}, non-finite {}, negative {}, zero {})",
        cleaned.dropped.total(),
        cleaned.dropped.missing,
        cleaned.dropped.non_finite,
        cleaned.dropped.negative,
        cleaned.dropped.zero
    );
    println!("   Rows after filter: {}", analyzed.len());

    println!("\n✅ Dry run complete.");
    Ok(0)
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
