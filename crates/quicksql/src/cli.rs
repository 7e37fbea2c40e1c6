//! CLI command definitions and output formatting.

use std::convert::Infallible;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::Value;

use quicksql::bench::{BenchReport, DEFAULT_BENCH_COUNT};
use quicksql::{Config, PingReport};

/// Log filter applied when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "quicksql=info";

/// JSON key-value store on SQLite.
#[derive(Debug, Parser)]
#[command(name = "quicksql")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the SQLite database file [default: $QUICKSQL_PATH or Database.db]
    #[arg(long, short)]
    pub path: Option<PathBuf>,

    /// Read from the database file instead of an in-memory mirror.
    #[arg(long)]
    pub no_memory: bool,

    /// Output format.
    #[arg(long, default_value = "pretty")]
    pub format: OutputFormat,

    /// Suppress non-essential output.
    #[arg(long)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Environment configuration with the command-line overrides applied.
    pub fn config(&self) -> Config {
        let mut config = Config::from_env();
        if let Some(path) = &self.path {
            config.sqlite_path = path.clone();
        }
        if self.no_memory {
            config.hold_data_in_memory = false;
        }
        config
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON output.
    Json,
    /// Human-readable output.
    #[default]
    Pretty,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the value stored under a key.
    Get { key: String },
    /// Store a value. Anything that isn't valid JSON is stored as a string.
    Set {
        key: String,
        #[arg(value_parser = parse_json_arg, allow_hyphen_values = true)]
        value: Value,
    },
    /// Delete a key.
    Delete { key: String },
    /// Add to a number; a missing key counts as 0.
    Add {
        key: String,
        #[arg(value_parser = parse_json_arg, allow_hyphen_values = true)]
        delta: Value,
    },
    /// Subtract from an existing number.
    Sub {
        key: String,
        #[arg(value_parser = parse_json_arg, allow_hyphen_values = true)]
        delta: Value,
    },
    /// Multiply an existing number.
    Mul {
        key: String,
        #[arg(value_parser = parse_json_arg, allow_hyphen_values = true)]
        delta: Value,
    },
    /// Divide a number; a missing key counts as 1.
    Div {
        key: String,
        #[arg(value_parser = parse_json_arg, allow_hyphen_values = true)]
        delta: Value,
    },
    /// Measure write, read and delete latency.
    Ping,
    /// Delete every key.
    Clear,
    /// Time every operation over many keys.
    Bench {
        /// Number of keys per phase.
        #[arg(long, short, default_value_t = DEFAULT_BENCH_COUNT)]
        count: usize,
    },
}

/// Parses an argument as JSON, falling back to a JSON string.
fn parse_json_arg(arg: &str) -> Result<Value, Infallible> {
    Ok(serde_json::from_str(arg).unwrap_or_else(|_| Value::String(arg.to_string())))
}

/// Format a value for output.
pub fn format_output<T: Serialize>(value: &T, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string(value).unwrap_or_default(),
        OutputFormat::Pretty => serde_json::to_string_pretty(value).unwrap_or_default(),
    }
}

/// Format a ping report as aligned lines.
pub fn format_ping(report: &PingReport) -> String {
    format!(
        "write  {:>10.3} ms\nread   {:>10.3} ms\ndelete {:>10.3} ms",
        report.write_ms, report.read_ms, report.delete_ms
    )
}

/// Format a benchmark report as one aligned line per phase.
pub fn format_bench(report: &BenchReport) -> String {
    let mut lines = vec![format!("{} keys per phase", report.count)];
    lines.extend(
        report
            .phases
            .iter()
            .map(|p| format!("{:<7}{:>12.3} ms", p.phase, p.elapsed_ms)),
    );
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use quicksql::bench::PhaseTiming;
    use serde_json::json;

    #[test]
    fn test_default_log_filter_parses() {
        assert!(DEFAULT_LOG_FILTER
            .parse::<tracing_subscriber::EnvFilter>()
            .is_ok());
    }

    #[test]
    fn test_parse_json_arg() {
        assert_eq!(parse_json_arg("5").unwrap(), json!(5));
        assert_eq!(parse_json_arg("-2.5").unwrap(), json!(-2.5));
        assert_eq!(parse_json_arg("{\"a\":[1]}").unwrap(), json!({ "a": [1] }));
        assert_eq!(parse_json_arg("\"quoted\"").unwrap(), json!("quoted"));
        assert_eq!(parse_json_arg("plain text").unwrap(), json!("plain text"));
    }

    #[test]
    fn test_negative_delta_is_not_a_flag() {
        let cli = Cli::try_parse_from(["quicksql", "sub", "counter", "-3"]).unwrap();

        match cli.command {
            Commands::Sub { key, delta } => {
                assert_eq!(key, "counter");
                assert_eq!(delta, json!(-3));
            }
            other => panic!("Expected sub command, got {other:?}"),
        }
    }

    #[test]
    fn test_overrides_apply_to_config() {
        let cli =
            Cli::try_parse_from(["quicksql", "--path", "other.db", "--no-memory", "ping"]).unwrap();

        let config = cli.config();

        assert_eq!(config.sqlite_path, PathBuf::from("other.db"));
        assert!(!config.hold_data_in_memory);
    }

    #[test]
    fn test_bench_default_count() {
        let cli = Cli::try_parse_from(["quicksql", "--format", "json", "bench"]).unwrap();

        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(cli.command, Commands::Bench { count } if count == DEFAULT_BENCH_COUNT));
    }

    #[test]
    fn test_format_output_json_is_compact() {
        let value: Option<serde_json::Value> = None;
        assert_eq!(format_output(&value, OutputFormat::Json), "null");
        assert_eq!(format_output(&json!([1, 2]), OutputFormat::Json), "[1,2]");
    }

    #[test]
    fn test_format_bench() {
        let report = BenchReport {
            count: 2,
            phases: vec![PhaseTiming {
                phase: "set",
                elapsed_ms: 1.25,
            }],
        };

        assert_eq!(
            format_bench(&report),
            "2 keys per phase\nset           1.250 ms"
        );
    }
}
