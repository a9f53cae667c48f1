//! CSV loading for survey records and market benchmarks.
//!
//! This module reads the survey file into [`SalaryRecord`]s, resolving
//! column names from configuration and deriving levels from job titles
//! when the file carries no explicit level column.

use crate::config::{ColumnConfig, Config, LevelConfig, ParsePolicy};
use crate::error::{AnalysisError, AnalysisResult};
use crate::models::{BenchmarkTable, MarketBenchmark, SalaryRecord, SalaryType};
use csv::StringRecord;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// Cell values that mean "no value".
const MISSING_MARKERS: &[&str] = &["", "na", "n/a", "nan", "null", "none", "-"];

/// Settings the loader needs from the configuration.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub columns: ColumnConfig,
    pub levels: LevelConfig,
    pub parse_policy: ParsePolicy,
}

impl From<&Config> for LoadOptions {
    fn from(config: &Config) -> Self {
        Self {
            columns: config.columns.clone(),
            levels: config.levels.clone(),
            parse_policy: config.input.parse_policy,
        }
    }
}

/// Records read from one source.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    /// Parsed records in input order.
    pub records: Vec<SalaryRecord>,
    /// Header names as found in the file.
    pub columns: Vec<String>,
    /// Rows whose salary text could not be parsed and loaded as missing.
    pub unparseable: usize,
    /// Rows skipped because their level cell was blank.
    pub missing_level: usize,
}

/// Column positions resolved against a header row.
struct ColumnIndex {
    salary: usize,
    level: Option<usize>,
    title: Option<usize>,
    salary_type: Option<usize>,
    location: Option<usize>,
    status: Option<usize>,
    performance_rating: Option<usize>,
    percent_increase: Option<usize>,
}

impl ColumnIndex {
    fn resolve(headers: &[String], columns: &ColumnConfig, source: &str) -> AnalysisResult<Self> {
        let find = |name: &str| headers.iter().position(|h| h == name);

        let salary =
            find(&columns.salary).ok_or_else(|| AnalysisError::missing_column(source, &columns.salary))?;

        let level = find(&columns.level);
        let title = find(&columns.title);
        if level.is_none() && title.is_none() {
            return Err(AnalysisError::MalformedInput {
                source_name: source.to_string(),
                message: format!(
                    "needs a '{}' column or a '{}' column to derive levels from",
                    columns.level, columns.title
                ),
            });
        }

        Ok(Self {
            salary,
            level,
            title,
            salary_type: find(&columns.salary_type),
            location: find(&columns.location),
            status: find(&columns.status),
            performance_rating: find(&columns.performance_rating),
            percent_increase: find(&columns.percent_increase),
        })
    }
}

/// Loads survey records.
pub struct RecordLoader {
    options: LoadOptions,
}

impl RecordLoader {
    /// Create a new loader.
    pub fn new(options: LoadOptions) -> Self {
        Self { options }
    }

    /// Load records from a CSV file.
    pub fn load_path(&self, path: &Path) -> AnalysisResult<LoadOutcome> {
        info!("Loading survey data from {}", path.display());
        let file = File::open(path)?;
        self.load_reader(file, &path.display().to_string())
    }

    /// Load records from any CSV reader. `source` names the input in errors.
    pub fn load_reader<R: Read>(&self, reader: R, source: &str) -> AnalysisResult<LoadOutcome> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|h| h.to_string())
            .collect();
        debug!("Columns: {:?}", headers);

        // Schema problems abort before any row is read
        let index = ColumnIndex::resolve(&headers, &self.options.columns, source)?;
        if index.level.is_none() {
            debug!(
                "No '{}' column; deriving levels from '{}'",
                self.options.columns.level, self.options.columns.title
            );
        }

        let mut records = Vec::new();
        let mut unparseable = 0;
        let mut missing_level = 0;

        for (i, result) in csv_reader.records().enumerate() {
            let row = i + 1;
            let raw = result?;

            // A blank level cell must not fall into the default level
            if index.level.is_some() && owned_cell(&raw, index.level).is_none() {
                match self.options.parse_policy {
                    ParsePolicy::Fail => {
                        return Err(AnalysisError::Parse {
                            row,
                            column: self.options.columns.level.clone(),
                            value: cell(&raw, index.level).unwrap_or("").to_string(),
                        });
                    }
                    ParsePolicy::Drop => {
                        warn!("Row {}: no level, skipping", row);
                        missing_level += 1;
                        continue;
                    }
                }
            }

            let salary = match parse_number(cell(&raw, Some(index.salary)).unwrap_or("")) {
                Ok(value) => value,
                Err(text) => match self.options.parse_policy {
                    ParsePolicy::Fail => {
                        return Err(AnalysisError::Parse {
                            row,
                            column: self.options.columns.salary.clone(),
                            value: text,
                        });
                    }
                    ParsePolicy::Drop => {
                        warn!(
                            "Row {}: salary '{}' is not a number, treating as missing",
                            row, text
                        );
                        unparseable += 1;
                        None
                    }
                },
            };

            records.push(self.build_record(row, &raw, &index, salary));
        }

        info!(
            "Loaded {} records ({} with unparseable salary, {} skipped without level)",
            records.len(),
            unparseable,
            missing_level
        );

        Ok(LoadOutcome {
            records,
            columns: headers,
            unparseable,
            missing_level,
        })
    }

    fn build_record(
        &self,
        row: usize,
        raw: &StringRecord,
        index: &ColumnIndex,
        salary: Option<f64>,
    ) -> SalaryRecord {
        let title = owned_cell(raw, index.title);
        let level = owned_cell(raw, index.level).unwrap_or_else(|| match title {
            Some(ref t) => self.options.levels.derive_level(t),
            None => self.options.levels.default_level.clone(),
        });

        let percent_increase = match parse_number(cell(raw, index.percent_increase).unwrap_or("")) {
            Ok(value) => value,
            Err(text) => {
                debug!("Row {}: ignoring percent increase '{}'", row, text);
                None
            }
        };

        SalaryRecord {
            row,
            level,
            salary,
            title,
            location: owned_cell(raw, index.location),
            status: owned_cell(raw, index.status),
            salary_type: cell(raw, index.salary_type)
                .filter(|s| !s.is_empty())
                .map(SalaryType::from),
            performance_rating: owned_cell(raw, index.performance_rating),
            percent_increase,
        }
    }
}

/// Load survey records from a file.
pub fn load_records(path: &Path, options: LoadOptions) -> AnalysisResult<LoadOutcome> {
    RecordLoader::new(options).load_path(path)
}

/// Load a `level,low,high` benchmark table from a file.
pub fn load_benchmarks(path: &Path) -> AnalysisResult<BenchmarkTable> {
    info!("Loading benchmarks from {}", path.display());
    let file = File::open(path)?;
    load_benchmarks_reader(file, &path.display().to_string())
}

/// Load a benchmark table from any CSV reader.
pub fn load_benchmarks_reader<R: Read>(reader: R, source: &str) -> AnalysisResult<BenchmarkTable> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|h| h.to_lowercase())
        .collect();
    let find = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| AnalysisError::missing_column(source, name))
    };
    let (level_idx, low_idx, high_idx) = (find("level")?, find("low")?, find("high")?);

    let mut table = BenchmarkTable::new();

    for (i, result) in csv_reader.records().enumerate() {
        let row = i + 1;
        let raw = result?;

        let level = match owned_cell(&raw, Some(level_idx)) {
            Some(level) => level,
            None => {
                warn!("Benchmark row {} has no level, skipping", row);
                continue;
            }
        };
        let low = required_number(&raw, low_idx, row, "low")?;
        let high = required_number(&raw, high_idx, row, "high")?;
        for (name, value) in [("low", low), ("high", high)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(AnalysisError::InvalidBenchmark {
                    level: level.clone(),
                    reason: format!("{} bound {} is not positive", name, value),
                });
            }
        }

        if low > high {
            warn!(
                "Benchmark for '{}' has low {} above high {}",
                level, low, high
            );
        }
        if table.contains_key(&level) {
            warn!("Duplicate benchmark for '{}', keeping row {}", level, row);
        }

        table.insert(level.clone(), MarketBenchmark { level, low, high });
    }

    debug!("Loaded {} benchmarks", table.len());
    Ok(table)
}

/// Benchmarks for a run.
///
/// A configured benchmark file is the only source when present; the
/// `[benchmarks]` table of the config is used otherwise.
pub fn resolve_benchmarks(config: &Config) -> AnalysisResult<BenchmarkTable> {
    match config.input.benchmarks {
        Some(ref path) => load_benchmarks(Path::new(path)),
        None => Ok(config.benchmark_table()),
    }
}

fn required_number(raw: &StringRecord, idx: usize, row: usize, column: &str) -> AnalysisResult<f64> {
    let text = cell(raw, Some(idx)).unwrap_or("");
    match parse_number(text) {
        Ok(Some(value)) => Ok(value),
        Ok(None) | Err(_) => Err(AnalysisError::Parse {
            row,
            column: column.to_string(),
            value: text.to_string(),
        }),
    }
}

fn cell(raw: &StringRecord, idx: Option<usize>) -> Option<&str> {
    idx.and_then(|i| raw.get(i))
}

fn owned_cell(raw: &StringRecord, idx: Option<usize>) -> Option<String> {
    cell(raw, idx)
        .filter(|s| !is_missing_marker(s))
        .map(String::from)
}

fn is_missing_marker(s: &str) -> bool {
    let lowered = s.trim().to_lowercase();
    MISSING_MARKERS.contains(&lowered.as_str())
}

/// Parses a numeric cell.
///
/// Returns `Ok(None)` for missing markers and `Err` with the cell text
/// when the cell holds something other than a number. Currency symbols and
/// thousands separators are ignored.
pub fn parse_number(text: &str) -> Result<Option<f64>, String> {
    if is_missing_marker(text) {
        return Ok(None);
    }

    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '%') && !c.is_whitespace())
        .collect();

    cleaned
        .parse::<f64>()
        .map(Some)
        .map_err(|_| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
status,current_title,current_salary,salary_type,location,performance_rating,percent_incr
Full Time Employee,Senior Software Engineer,\"$150,000\",year,Irvine,High,3.5
Full Time Employee,Software Engineer,110000,year,Austin,Developing,
Contractor,Associate QA Tester,22,hour,Irvine,,0
Full Time Employee,Principal Artist,,year,Irvine,Top,5
";

    fn loader(policy: ParsePolicy) -> RecordLoader {
        RecordLoader::new(LoadOptions {
            parse_policy: policy,
            ..LoadOptions::default()
        })
    }

    #[test]
    fn test_load_sample() {
        let outcome = loader(ParsePolicy::Drop)
            .load_reader(SAMPLE.as_bytes(), "sample")
            .unwrap();

        assert_eq!(outcome.records.len(), 4);
        assert_eq!(outcome.unparseable, 0);
        assert_eq!(outcome.columns.len(), 7);

        let first = &outcome.records[0];
        assert_eq!(first.row, 1);
        assert_eq!(first.level, "senior");
        assert_eq!(first.salary, Some(150000.0));
        assert_eq!(first.salary_type, Some(SalaryType::Year));
        assert_eq!(first.location.as_deref(), Some("Irvine"));
        assert_eq!(first.percent_increase, Some(3.5));

        assert_eq!(outcome.records[1].level, "mid");
        assert_eq!(outcome.records[1].percent_increase, None);
        assert_eq!(outcome.records[2].level, "entry");
        assert_eq!(outcome.records[2].salary_type, Some(SalaryType::Hour));
        assert_eq!(outcome.records[2].performance_rating, None);
        assert_eq!(outcome.records[3].level, "principal");
        assert_eq!(outcome.records[3].salary, None);
    }

    #[test]
    fn test_explicit_level_column_wins() {
        let data = "level,current_salary\nentry,80000\nentry,100000\n";
        let outcome = loader(ParsePolicy::Drop)
            .load_reader(data.as_bytes(), "levels")
            .unwrap();

        assert_eq!(outcome.records.len(), 2);
        assert!(outcome.records.iter().all(|r| r.level == "entry"));
        assert!(outcome.records.iter().all(|r| r.title.is_none()));
    }

    #[test]
    fn test_missing_salary_column_is_malformed() {
        let data = "level,pay\nentry,80000\n";
        let err = loader(ParsePolicy::Drop)
            .load_reader(data.as_bytes(), "bad.csv")
            .unwrap_err();

        match err {
            AnalysisError::MalformedInput { message, .. } => {
                assert!(message.contains("current_salary"));
            }
            other => panic!("expected MalformedInput, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_level_and_title_is_malformed() {
        let data = "current_salary\n80000\n";
        let err = loader(ParsePolicy::Drop)
            .load_reader(data.as_bytes(), "bad.csv")
            .unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedInput { .. }));
    }

    #[test]
    fn test_unparseable_salary_dropped_and_counted() {
        let data = "level,current_salary\nentry,80000\nentry,lots\nmid,90000\n";
        let outcome = loader(ParsePolicy::Drop)
            .load_reader(data.as_bytes(), "sample")
            .unwrap();

        assert_eq!(outcome.records.len(), 3);
        assert_eq!(outcome.unparseable, 1);
        assert_eq!(outcome.records[1].salary, None);
    }

    #[test]
    fn test_unparseable_salary_fails_in_strict_mode() {
        let data = "level,current_salary\nentry,80000\nentry,lots\n";
        let err = loader(ParsePolicy::Fail)
            .load_reader(data.as_bytes(), "sample")
            .unwrap_err();

        match err {
            AnalysisError::Parse { row, column, value } => {
                assert_eq!(row, 2);
                assert_eq!(column, "current_salary");
                assert_eq!(value, "lots");
            }
            other => panic!("expected Parse, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("80000"), Ok(Some(80000.0)));
        assert_eq!(parse_number(" $1,250.50 "), Ok(Some(1250.5)));
        assert_eq!(parse_number("-5000"), Ok(Some(-5000.0)));
        assert_eq!(parse_number(""), Ok(None));
        assert_eq!(parse_number("NaN"), Ok(None));
        assert_eq!(parse_number("N/A"), Ok(None));
        assert_eq!(parse_number("abc"), Err("abc".to_string()));
    }

    #[test]
    fn test_load_benchmarks() {
        let data = "Level,Low,High\nentry,60000,90000\nsenior,\"120,000\",170000\n";
        let table = load_benchmarks_reader(data.as_bytes(), "bench").unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table["entry"].low, 60000.0);
        assert_eq!(table["senior"].low, 120000.0);
        assert_eq!(table["senior"].high, 170000.0);
    }

    #[test]
    fn test_blank_level_cell_is_skipped() {
        let data = "level,current_salary\nentry,80000\n,500000\nNA,400000\n";
        let outcome = loader(ParsePolicy::Drop)
            .load_reader(data.as_bytes(), "levels")
            .unwrap();

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.missing_level, 2);
        assert!(outcome.records.iter().all(|r| r.level != "mid"));
        assert!(outcome.records.iter().all(|r| r.salary != Some(500000.0)));
    }

    #[test]
    fn test_blank_level_cell_fails_in_strict_mode() {
        let data = "level,current_salary\nentry,80000\n,500000\n";
        let err = loader(ParsePolicy::Fail)
            .load_reader(data.as_bytes(), "levels")
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Parse { row: 2, ref column, .. } if column == "level"));
    }

    #[test]
    fn test_load_benchmarks_negative_bound() {
        let data = "level,low,high\nentry,-60000,90000\n";
        let err = load_benchmarks_reader(data.as_bytes(), "bench").unwrap_err();
        match err {
            AnalysisError::InvalidBenchmark { level, reason } => {
                assert_eq!(level, "entry");
                assert!(reason.contains("not positive"));
            }
            other => panic!("expected InvalidBenchmark, got {:?}", other),
        }
    }

    #[test]
    fn test_benchmark_file_replaces_config_table() {
        let mut config = Config::default();
        config.input.benchmarks = Some(
            Path::new(env!("CARGO_MANIFEST_DIR"))
                .join("fixtures/benchmarks.csv")
                .display()
                .to_string(),
        );

        let table = resolve_benchmarks(&config).unwrap();
        let levels: Vec<&str> = table.keys().map(String::as_str).collect();
        assert_eq!(levels, vec!["entry", "mid", "senior"]);
        assert!(!table.contains_key("principal"));
    }

    #[test]
    fn test_config_table_without_benchmark_file() {
        let table = resolve_benchmarks(&Config::default()).unwrap();
        assert!(table.contains_key("principal"));
    }

    #[test]
    fn test_load_benchmarks_missing_column() {
        let data = "level,low\nentry,60000\n";
        let err = load_benchmarks_reader(data.as_bytes(), "bench").unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedInput { .. }));
    }

    #[test]
    fn test_load_benchmarks_non_numeric_bound() {
        let data = "level,low,high\nentry,sixty,90000\n";
        let err = load_benchmarks_reader(data.as_bytes(), "bench").unwrap_err();
        assert!(matches!(err, AnalysisError::Parse { row: 1, .. }));
    }

    #[test]
    fn test_load_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let outcome = load_records(file.path(), LoadOptions::default()).unwrap();
        assert_eq!(outcome.records.len(), 4);
    }

    #[test]
    fn test_load_fixture() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/blizzard_salary_sample.csv");
        let outcome = load_records(&path, LoadOptions::default()).unwrap();

        assert!(!outcome.records.is_empty());
        assert!(outcome.columns.contains(&"current_salary".to_string()));
    }
}
