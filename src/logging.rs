//! Purpose: Configure the structured log sink for one run.
//! Exports: `LogSink`, `build_subscriber`, `init`.
//! Role: Opens the optional log file and installs the global JSON `tracing` subscriber.
//! Invariants: Every record goes to stderr; when a file is configured it also goes to the file.
//! Invariants: The log file is opened append-only, created 0640 when absent.
//! Invariants: A log file that cannot be opened is a `Config` error, raised before any other work.
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use time::format_description::well_known::Rfc3339;
use tracing::Subscriber;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriter, MakeWriterExt};

use crate::config::AppConfig;
use crate::core::error::{Error, ErrorKind};

/// Log destinations: stderr, plus an optional append-only file.
#[derive(Debug, Default)]
pub struct LogSink {
    file: Option<(PathBuf, Arc<File>)>,
}

impl LogSink {
    pub fn stderr_only() -> Self {
        Self::default()
    }

    pub fn open(path: Option<&Path>) -> Result<Self, Error> {
        let Some(path) = path else {
            return Ok(Self::stderr_only());
        };
        let file = open_append(path).map_err(|err| {
            Error::new(ErrorKind::Config)
                .with_message("failed to open log file")
                .with_path(path)
                .with_hint("Check that the directory exists and is writable, or omit --log-file.")
                .with_source(err)
        })?;
        Ok(Self {
            file: Some((path.to_path_buf(), Arc::new(file))),
        })
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file.as_ref().map(|(path, _)| path.as_path())
    }

    pub fn make_writer(&self) -> BoxMakeWriter {
        self.make_writer_with(io::stderr)
    }

    /// Fan out every record to `primary` and, if open, the log file.
    pub fn make_writer_with<M>(&self, primary: M) -> BoxMakeWriter
    where
        M: for<'a> MakeWriter<'a> + Send + Sync + 'static,
    {
        match &self.file {
            Some((_, file)) => BoxMakeWriter::new(primary.and(Arc::clone(file))),
            None => BoxMakeWriter::new(primary),
        }
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.append(true).create(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o640);
    }
    options.open(path)
}

pub fn build_subscriber<M>(filter: EnvFilter, writer: M) -> impl Subscriber + Send + Sync + 'static
where
    M: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_timer(UtcTime::new(Rfc3339))
        .with_current_span(true)
        .with_span_list(false)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(writer)
        .finish()
}

/// Install the global subscriber; `RUST_LOG` wins over `config.log_filter` when valid.
pub fn init(config: &AppConfig, sink: &LogSink) -> Result<(), Error> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing::subscriber::set_global_default(build_subscriber(filter, sink.make_writer())).map_err(
        |err| {
            Error::new(ErrorKind::Internal)
                .with_message("failed to install log subscriber")
                .with_source(err)
        },
    )
}
