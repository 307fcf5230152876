//! TOML configuration loading and the sample-config generator.
//!
//! Configuration is loaded explicitly via [`Settings::load`], never as an
//! import-time side effect, and validated before use. A missing file is a
//! typed error that names the remedy instead of an interactive prompt.
//!
//! [`Settings::write_sample`] re-emits an existing configuration file with
//! every leaf value blanked, preserving the table and key structure, so a
//! config schema can be shared without sharing its values.

// ============================================================================
// Imports
// ============================================================================

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use toml::Value;
use tracing::debug;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// File-name prefix used for generated sample configs.
const SAMPLE_PREFIX: &str = "sample-";

// ============================================================================
// Settings
// ============================================================================

/// Root of the TOML configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Browser session settings.
    pub browser: BrowserSettings,
}

/// The `[browser]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// Run the browser without a GUI.
    pub headless: bool,

    /// Profile name the session persists under; absent selects `"default"`.
    pub profile: Option<String>,

    /// Maximum time in seconds to wait for the initial page to open.
    pub page_load_timeout_seconds: u64,

    /// Browser binary path; absent triggers `PATH` discovery.
    pub binary: Option<PathBuf>,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: false,
            profile: None,
            page_load_timeout_seconds: 10,
            binary: None,
        }
    }
}

// ============================================================================
// Settings - Loading
// ============================================================================

impl Settings {
    /// Loads and validates settings from a TOML file.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the file is missing, unparsable, or fails
    ///   validation
    /// - [`Error::Io`] on other read failures
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                Error::config(format!(
                    "Configuration file {} is missing. \
                     Generate a starting point with the `sample-config` command, \
                     then fill in the values.",
                    path.display()
                ))
            } else {
                Error::Io(e)
            }
        })?;

        let settings: Self = toml::from_str(&content).map_err(|e| {
            Error::config(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        settings.validate()?;
        debug!(path = %path.display(), "Configuration loaded");
        Ok(settings)
    }

    /// Validates the settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] on invalid values.
    pub fn validate(&self) -> Result<()> {
        if self.browser.page_load_timeout_seconds == 0 {
            return Err(Error::config(
                "browser.page_load_timeout_seconds must be at least 1",
            ));
        }
        Ok(())
    }
}

impl BrowserSettings {
    /// Returns the page-load timeout as a [`Duration`].
    #[inline]
    #[must_use]
    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout_seconds)
    }
}

// ============================================================================
// Settings - Sample Generator
// ============================================================================

impl Settings {
    /// Emits a structure-preserving, value-blanked copy of a config file.
    ///
    /// Strings become `""`, integers `0`, floats `0.0`, booleans `false`;
    /// arrays and tables are recursed element-wise. When `dst` is absent the
    /// sample lands next to `src` with a `sample-` file-name prefix.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if `src` cannot be parsed as TOML
    /// - [`Error::Io`] on read/write failures
    pub fn write_sample(src: &Path, dst: Option<&Path>) -> Result<PathBuf> {
        let content = fs::read_to_string(src)?;
        let mut value: Value = toml::from_str(&content)
            .map_err(|e| Error::config(format!("Failed to parse {}: {}", src.display(), e)))?;

        blank_value(&mut value);

        let dst = match dst {
            Some(dst) => dst.to_path_buf(),
            None => sample_path(src),
        };

        let rendered = toml::to_string_pretty(&value)
            .map_err(|e| Error::config(format!("Failed to render sample config: {e}")))?;
        fs::write(&dst, rendered)?;

        debug!(src = %src.display(), dst = %dst.display(), "Sample config written");
        Ok(dst)
    }
}

/// Replaces every leaf value with an empty value of the same TOML type.
fn blank_value(value: &mut Value) {
    match value {
        Value::String(s) => s.clear(),
        Value::Integer(i) => *i = 0,
        Value::Float(f) => *f = 0.0,
        Value::Boolean(b) => *b = false,
        // Datetimes have no natural empty form; keep them as schema hints.
        Value::Datetime(_) => {}
        Value::Array(items) => items.iter_mut().for_each(blank_value),
        Value::Table(table) => table.iter_mut().for_each(|(_, v)| blank_value(v)),
    }
}

/// Derives the default sample path next to the source file.
fn sample_path(src: &Path) -> PathBuf {
    let file_name = src
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());

    src.with_file_name(format!("{SAMPLE_PREFIX}{file_name}"))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(!settings.browser.headless);
        assert_eq!(settings.browser.profile, None);
        assert_eq!(settings.browser.page_load_timeout_seconds, 10);
        assert_eq!(settings.browser.binary, None);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_load_full_file() {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let path = tmp.path().join("config.toml");
        fs::write(
            &path,
            r#"
            [browser]
            headless = true
            profile = "alice"
            page_load_timeout_seconds = 30
            binary = "/usr/bin/chromium"
            "#,
        )
        .expect("write config");

        let settings = Settings::load(&path).expect("load");
        assert!(settings.browser.headless);
        assert_eq!(settings.browser.profile.as_deref(), Some("alice"));
        assert_eq!(settings.browser.page_load_timeout(), Duration::from_secs(30));
        assert_eq!(
            settings.browser.binary,
            Some(PathBuf::from("/usr/bin/chromium"))
        );
    }

    #[test]
    fn test_load_partial_file_uses_defaults() {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[browser]\nheadless = true\n").expect("write config");

        let settings = Settings::load(&path).expect("load");
        assert!(settings.browser.headless);
        assert_eq!(settings.browser.page_load_timeout_seconds, 10);
    }

    #[test]
    fn test_load_missing_file_names_remedy() {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let err = Settings::load(&tmp.path().join("config.toml")).expect_err("missing");

        assert!(matches!(err, Error::Config { .. }));
        assert!(err.to_string().contains("sample-config"));
    }

    #[test]
    fn test_load_rejects_zero_timeout() {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[browser]\npage_load_timeout_seconds = 0\n").expect("write config");

        let err = Settings::load(&path).expect_err("invalid");
        assert!(err.to_string().contains("page_load_timeout_seconds"));
    }

    #[test]
    fn test_load_rejects_malformed_toml() {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[browser\nheadless = yes").expect("write config");

        assert!(Settings::load(&path).is_err());
    }

    #[test]
    fn test_sample_blanks_leaves_keeps_structure() {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let src = tmp.path().join("config.toml");
        fs::write(
            &src,
            r#"
            [browser]
            headless = true
            profile = "alice"
            page_load_timeout_seconds = 30

            [browser.extra]
            ratio = 1.5
            tags = ["a", "b"]
            "#,
        )
        .expect("write config");

        let dst = Settings::write_sample(&src, None).expect("generate");
        assert_eq!(dst, tmp.path().join("sample-config.toml"));

        let sample: Value =
            toml::from_str(&fs::read_to_string(&dst).expect("read")).expect("parse");
        let browser = sample.get("browser").expect("browser table");

        assert_eq!(browser.get("headless"), Some(&Value::Boolean(false)));
        assert_eq!(
            browser.get("profile"),
            Some(&Value::String(String::new()))
        );
        assert_eq!(
            browser.get("page_load_timeout_seconds"),
            Some(&Value::Integer(0))
        );

        let extra = browser.get("extra").expect("nested table survives");
        assert_eq!(extra.get("ratio"), Some(&Value::Float(0.0)));
        assert_eq!(
            extra.get("tags"),
            Some(&Value::Array(vec![
                Value::String(String::new()),
                Value::String(String::new()),
            ]))
        );
    }

    #[test]
    fn test_sample_explicit_destination() {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let src = tmp.path().join("config.toml");
        let out = tmp.path().join("schema.toml");
        fs::write(&src, "[browser]\nheadless = true\n").expect("write config");

        let dst = Settings::write_sample(&src, Some(&out)).expect("generate");
        assert_eq!(dst, out);
        assert!(out.is_file());
    }
}
