//! Purpose: `proc1` CLI entry point.
//! Role: Binary crate root; parses flags, sets up logging and tracing, runs the pipeline.
//! Invariants: stdout carries exactly one JSON line on success and nothing on failure.
//! Invariants: Errors raised before logging starts are printed to stderr directly.
//! Invariants: Errors raised after logging starts were already logged by the failing stage.
//! Invariants: Process exit code is derived from `to_exit_code`.
use std::error::Error as StdError;
use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::{Parser, ValueHint, error::ErrorKind as ClapErrorKind};
use serde::Serialize;
use serde_json::json;

use proc1::config::AppConfig;
use proc1::core::error::{Error, ErrorKind, to_exit_code};
use proc1::logging::{self, LogSink};
use proc1::pipeline::run_pipeline;
use proc1::trace::{NoopTracer, SpanTracer, Tracer, TracerGuard};

#[derive(Parser)]
#[command(
    name = "proc1",
    version,
    about = "Sum the integers of a JSON request read from stdin",
    long_about = None,
    after_help = r#"EXAMPLES
  $ echo '{"name":"test","params":[1,2,3]}' | proc1
  {"name":"test","sum":6,"version":"1.0.0"}

  $ echo '{"name":"test","params":[1,2,3]}' | proc1 --log-file proc1.log --trace

Logs are JSON lines on stderr (and in --log-file). RUST_LOG overrides the default `debug` filter."#
)]
struct Cli {
    #[arg(
        long,
        value_name = "PATH",
        help = "Also append logs to this file (created 0640 if absent)",
        value_hint = ValueHint::FilePath
    )]
    log_file: Option<String>,
    #[arg(long, help = "Emit a span per pipeline stage into the logs")]
    trace: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Reported {
    Logged,
    Pending,
}

fn main() {
    let exit_code = match run() {
        Ok(code) => code,
        Err((err, reported)) => {
            if reported == Reported::Pending {
                emit_error(&err);
            }
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<i32, (Error, Reported)> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        Reported::Pending,
                    )
                })?;
                return Ok(0);
            }
            _ => {
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(clap_error_summary(&err))
                        .with_hint("Try `proc1 --help`."),
                    Reported::Pending,
                ));
            }
        },
    };

    let config = AppConfig::default()
        .with_log_file(cli.log_file.map(PathBuf::from))
        .with_trace(cli.trace);

    let sink =
        LogSink::open(config.log_file.as_deref()).map_err(|err| (err, Reported::Pending))?;
    logging::init(&config, &sink).map_err(|err| (err, Reported::Pending))?;

    tracing::info!(
        version = config.version,
        service = config.service,
        env = config.env,
        trace = config.trace,
        log_file = ?sink.file_path(),
        "application started"
    );

    let tracer: Box<dyn Tracer> = if config.trace {
        Box::new(SpanTracer::start(&config))
    } else {
        Box::new(NoopTracer)
    };
    let _guard = TracerGuard::new(tracer.as_ref());

    run_pipeline(io::stdin().lock(), io::stdout().lock(), tracer.as_ref(), &config)
        .map(|_| 0)
        .map_err(|err| (err, Reported::Logged))
}

/// Stderr shape for failures raised before the log sink exists.
#[derive(Debug, Serialize)]
struct ErrorReport {
    kind: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    causes: Vec<String>,
}

impl ErrorReport {
    fn from_error(err: &Error) -> Self {
        let mut causes = Vec::new();
        let mut cur = err.source();
        while let Some(source) = cur {
            causes.push(source.to_string());
            cur = source.source();
        }
        Self {
            kind: format!("{:?}", err.kind()),
            message: err.message().unwrap_or("failed").to_string(),
            hint: err.hint().map(str::to_string),
            path: err.path().map(|path| path.display().to_string()),
            causes,
        }
    }

    fn to_text(&self) -> String {
        let mut text = format!("error: {}", self.message);
        for cause in &self.causes {
            text.push_str(&format!("\ncaused by: {cause}"));
        }
        if let Some(hint) = &self.hint {
            text.push_str(&format!("\nhint: {hint}"));
        }
        text
    }
}

fn emit_error(err: &Error) {
    let report = ErrorReport::from_error(err);
    if io::stderr().is_terminal() {
        eprintln!("{}", report.to_text());
        return;
    }
    match serde_json::to_string(&json!({ "error": report })) {
        Ok(line) => eprintln!("{line}"),
        Err(_) => eprintln!("{}", report.to_text()),
    }
}

/// First non-empty line of clap's rendering, without its `error:` prefix.
fn clap_error_summary(err: &clap::Error) -> String {
    err.to_string()
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| line.strip_prefix("error:").unwrap_or(line).trim().to_string())
        .unwrap_or_else(|| "invalid arguments".to_string())
}

#[cfg(test)]
mod tests {
    use super::{Cli, ErrorReport, clap_error_summary};
    use clap::Parser;
    use proc1::core::error::{Error, ErrorKind};
    use std::io;

    #[test]
    fn parses_log_file_and_trace() {
        let cli = Cli::try_parse_from(["proc1", "--log-file", "out.log", "--trace"]).expect("parse");
        assert_eq!(cli.log_file.as_deref(), Some("out.log"));
        assert!(cli.trace);

        let cli = Cli::try_parse_from(["proc1", "--log-file", ""]).expect("parse");
        assert_eq!(cli.log_file.as_deref(), Some(""));

        let cli = Cli::try_parse_from(["proc1"]).expect("parse");
        assert_eq!(cli.log_file, None);
        assert!(!cli.trace);
    }

    #[test]
    fn rejects_unknown_flags() {
        assert!(Cli::try_parse_from(["proc1", "--bogus"]).is_err());
    }

    #[test]
    fn error_report_lists_causes() {
        let err = Error::new(ErrorKind::Config)
            .with_message("failed to open log file")
            .with_path("/missing/proc1.log")
            .with_source(io::Error::new(io::ErrorKind::NotFound, "no such file"));

        let report = ErrorReport::from_error(&err);
        let value = serde_json::to_value(&report).expect("encode");
        assert_eq!(value["kind"], "Config");
        assert_eq!(value["message"], "failed to open log file");
        assert_eq!(value["path"], "/missing/proc1.log");
        assert_eq!(value["causes"][0], "no such file");
        assert!(value.get("hint").is_none());

        let text = report.to_text();
        assert!(text.starts_with("error: failed to open log file"));
        assert!(text.contains("caused by: no such file"));
    }

    #[test]
    fn clap_summary_drops_error_prefix() {
        let err = Cli::try_parse_from(["proc1", "--bogus"])
            .err()
            .expect("usage error");
        let summary = clap_error_summary(&err);
        assert!(!summary.starts_with("error:"));
        assert!(summary.contains("--bogus"));
    }
}
