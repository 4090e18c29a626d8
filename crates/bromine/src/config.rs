//! Session configuration.
//!
//! ```yaml
//! browser: firefox
//! headless: true
//! implicit_wait_secs: 2
//! remote_address: http://grid:4444/wd/hub
//! log_level: debug
//! wait_timeout_ms: 10000
//! ```
//!
//! Every field is optional; missing fields take their defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::logging::LogLevel;
use crate::result::{BromineError, BromineResult};

/// Default timeout for [`Wait`](crate::wait::Wait) (5 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 5_000;

/// Default polling interval for [`Wait`](crate::wait::Wait) (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Browser family a session drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserType {
    /// Google Chrome / Chromium
    #[default]
    Chrome,
    /// Mozilla Firefox
    Firefox,
    /// Microsoft Edge
    Edge,
    /// Apple Safari
    Safari,
}

impl BrowserType {
    /// Lowercase browser name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Chrome => "chrome",
            Self::Firefox => "firefox",
            Self::Edge => "edge",
            Self::Safari => "safari",
        }
    }
}

impl std::fmt::Display for BrowserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Browser and driver options for a [`Session`](crate::session::Session).
///
/// The session itself applies the implicit wait and the wait defaults, and
/// `log_level` feeds [`logging::init`](crate::logging::init). Launch options
/// (browser, headless, remote address, driver path and window) are carried
/// for the [`BrowserDriver`](crate::BrowserDriver) implementation that
/// starts the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Browser to drive
    pub browser: BrowserType,
    /// Run without a visible window (read by driver implementations)
    pub headless: bool,
    /// Driver-side implicit wait in seconds (0 = disabled)
    pub implicit_wait_secs: u64,
    /// Remote driver endpoint (None = local driver); read by driver
    /// implementations when connecting
    pub remote_address: Option<String>,
    /// Use the driver binary found on `PATH` instead of a bundled one
    /// (read by driver implementations)
    pub use_default_driver_path: bool,
    /// Hide the driver's console window (read by driver implementations)
    pub hide_driver_window: bool,
    /// Minimum log level for [`logging::init`](crate::logging::init)
    pub log_level: LogLevel,
    /// Default wait timeout in milliseconds
    pub wait_timeout_ms: u64,
    /// Default wait polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            browser: BrowserType::default(),
            headless: false,
            implicit_wait_secs: 0,
            remote_address: None,
            use_default_driver_path: false,
            hide_driver_window: true,
            log_level: LogLevel::default(),
            wait_timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl SessionConfig {
    /// Set the browser
    #[must_use]
    pub const fn with_browser(mut self, browser: BrowserType) -> Self {
        self.browser = browser;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set the implicit wait in seconds
    #[must_use]
    pub const fn with_implicit_wait_secs(mut self, secs: u64) -> Self {
        self.implicit_wait_secs = secs;
        self
    }

    /// Drive a remote browser at `address`
    #[must_use]
    pub fn with_remote_address(mut self, address: impl Into<String>) -> Self {
        self.remote_address = Some(address.into());
        self
    }

    /// Set the log level
    #[must_use]
    pub const fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    /// Set the default wait timeout and polling interval
    #[must_use]
    pub const fn with_wait(mut self, timeout_ms: u64, poll_interval_ms: u64) -> Self {
        self.wait_timeout_ms = timeout_ms;
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Implicit wait, if enabled
    #[must_use]
    pub const fn implicit_wait(&self) -> Option<Duration> {
        if self.implicit_wait_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.implicit_wait_secs))
        }
    }

    /// Check option consistency
    ///
    /// # Errors
    /// Returns [`BromineError::Config`] for a zero polling interval or an
    /// empty remote address.
    pub fn validate(&self) -> BromineResult<()> {
        if self.poll_interval_ms == 0 {
            return Err(BromineError::Config {
                message: "poll_interval_ms must be greater than 0".to_string(),
            });
        }
        if let Some(address) = &self.remote_address {
            if address.trim().is_empty() {
                return Err(BromineError::Config {
                    message: "remote_address must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Parse and validate YAML
    ///
    /// # Errors
    /// Returns error if the YAML is invalid or validation fails.
    pub fn from_yaml_str(yaml: &str) -> BromineResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate JSON
    ///
    /// # Errors
    /// Returns error if the JSON is invalid or validation fails.
    pub fn from_json_str(json: &str) -> BromineResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file; `.json` files are JSON, anything else YAML
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> BromineResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod defaults_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let config = SessionConfig::default();
            assert_eq!(config.browser, BrowserType::Chrome);
            assert!(!config.headless);
            assert!(config.hide_driver_window);
            assert_eq!(config.implicit_wait(), None);
            assert_eq!(config.wait_timeout_ms, 5_000);
            assert_eq!(config.poll_interval_ms, 100);
            assert!(config.validate().is_ok());
        }

        #[test]
        fn test_builders() {
            let config = SessionConfig::default()
                .with_browser(BrowserType::Edge)
                .with_headless(true)
                .with_implicit_wait_secs(3)
                .with_remote_address("http://grid:4444")
                .with_log_level(LogLevel::Debug)
                .with_wait(250, 10);
            assert_eq!(config.browser.to_string(), "edge");
            assert!(config.headless);
            assert_eq!(config.implicit_wait(), Some(Duration::from_secs(3)));
            assert_eq!(config.remote_address.as_deref(), Some("http://grid:4444"));
            assert_eq!(config.wait_timeout_ms, 250);
        }
    }

    mod parse_tests {
        use super::*;

        #[test]
        fn test_partial_yaml_keeps_defaults() {
            let config = SessionConfig::from_yaml_str("browser: firefox\nheadless: true\n").unwrap();
            assert_eq!(config.browser, BrowserType::Firefox);
            assert!(config.headless);
            assert_eq!(config.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
            assert_eq!(config.log_level, LogLevel::Info);
        }

        #[test]
        fn test_json() {
            let config =
                SessionConfig::from_json_str(r#"{"browser":"safari","log_level":"warn"}"#).unwrap();
            assert_eq!(config.browser, BrowserType::Safari);
            assert_eq!(config.log_level, LogLevel::Warn);
        }

        #[test]
        fn test_unknown_browser_rejected() {
            let err = SessionConfig::from_yaml_str("browser: lynx").unwrap_err();
            assert!(matches!(err, BromineError::Yaml(_)));
        }

        #[test]
        fn test_validation_errors() {
            let err = SessionConfig::from_yaml_str("poll_interval_ms: 0").unwrap_err();
            assert!(matches!(err, BromineError::Config { .. }));
            let err = SessionConfig::from_json_str(r#"{"remote_address":"  "}"#).unwrap_err();
            assert!(err.to_string().contains("remote_address"));
        }
    }

    mod file_tests {
        use super::*;
        use std::io::Write;

        #[test]
        fn test_from_yaml_file() {
            let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
            writeln!(file, "implicit_wait_secs: 2").unwrap();
            let config = SessionConfig::from_path(file.path()).unwrap();
            assert_eq!(config.implicit_wait_secs, 2);
        }

        #[test]
        fn test_from_json_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("session.json");
            std::fs::write(&path, r#"{"headless": true}"#).unwrap();
            let config = SessionConfig::from_path(&path).unwrap();
            assert!(config.headless);
        }

        #[test]
        fn test_missing_file() {
            let dir = tempfile::tempdir().unwrap();
            let err = SessionConfig::from_path(dir.path().join("absent.yaml")).unwrap_err();
            assert!(matches!(err, BromineError::Io(_)));
        }
    }
}
