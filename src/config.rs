//! Purpose: Hold the immutable run configuration assembled at startup.
//! Exports: `AppConfig`, `SERVICE_NAME`, `DEPLOY_ENV`, `VERSION`, `DEFAULT_LOG_FILTER`.
//! Role: Injected into logging, tracing, and the pipeline; replaces process globals.
//! Invariants: `version` is identical for every invocation of a given build.
//! Invariants: An empty log file path means "stderr only".
use std::path::PathBuf;

pub const SERVICE_NAME: &str = "proc1";
pub const DEPLOY_ENV: &str = "production";
pub const VERSION: &str = "1.0.0";

/// Used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_LOG_FILTER: &str = "debug";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub service: &'static str,
    pub env: &'static str,
    pub version: &'static str,
    pub log_file: Option<PathBuf>,
    pub trace: bool,
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service: SERVICE_NAME,
            env: DEPLOY_ENV,
            version: VERSION,
            log_file: None,
            trace: false,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl AppConfig {
    pub fn with_log_file(mut self, path: Option<PathBuf>) -> Self {
        self.log_file = path.filter(|path| !path.as_os_str().is_empty());
        self
    }

    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, VERSION};
    use std::path::PathBuf;

    #[test]
    fn empty_log_file_means_none() {
        let config = AppConfig::default().with_log_file(Some(PathBuf::new()));
        assert_eq!(config.log_file, None);

        let config = AppConfig::default().with_log_file(Some(PathBuf::from("proc1.log")));
        assert_eq!(config.log_file, Some(PathBuf::from("proc1.log")));
    }

    #[test]
    fn defaults_use_fixed_identity() {
        let config = AppConfig::default();
        assert_eq!(config.service, "proc1");
        assert_eq!(config.env, "production");
        assert_eq!(config.version, VERSION);
        assert_eq!(config.log_filter, "debug");
        assert!(!config.trace);
    }
}
