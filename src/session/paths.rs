//! Session path derivation and profile-name sanitization.
//!
//! A session is identified by a profile name. Two absolute paths are derived
//! from it:
//!
//! - `<sessions root>/<name>`: persistent browser state, reused across runs
//! - `<screenshots root>/<name>-screenshots`: per-session screenshot output
//!
//! Derivation is a pure function of the roots and the name; the screenshot
//! directory is created idempotently, the profile directory is left to the
//! browser itself.

// ============================================================================
// Imports
// ============================================================================

use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default root directory for persistent profiles.
pub const DEFAULT_SESSIONS_ROOT: &str = "sessions";

/// Default root directory for screenshot output.
pub const DEFAULT_SCREENSHOTS_ROOT: &str = "screenshots";

/// Profile name used when none is supplied.
pub const DEFAULT_PROFILE_NAME: &str = "default";

/// Suffix appended to the profile name for the screenshot directory.
const SCREENSHOT_DIR_SUFFIX: &str = "-screenshots";

// ============================================================================
// SessionPaths
// ============================================================================

/// The two derived filesystem locations of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPaths {
    /// Sanitized profile name the paths were derived from.
    profile_name: String,

    /// Absolute path to the persistent profile directory.
    profile_dir: PathBuf,

    /// Absolute path to the screenshot directory.
    screenshot_dir: PathBuf,
}

// ============================================================================
// SessionPaths - Derivation
// ============================================================================

impl SessionPaths {
    /// Derives session paths from the given roots and profile name.
    ///
    /// Pure: no filesystem access. The same inputs always produce the same
    /// paths. Relative roots are resolved against the current directory.
    ///
    /// # Arguments
    ///
    /// * `sessions_root` - Base directory for profile directories
    /// * `screenshots_root` - Base directory for screenshot directories
    /// * `profile_name` - Profile name; `None` or empty selects `"default"`
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidProfileName`] if the name fails sanitization
    /// - [`Error::Profile`] if a relative root cannot be made absolute
    pub fn derive(
        sessions_root: &Path,
        screenshots_root: &Path,
        profile_name: Option<&str>,
    ) -> Result<Self> {
        let name = sanitize_profile_name(profile_name)?;

        let profile_dir = absolute(&sessions_root.join(&name))?;
        let screenshot_dir =
            absolute(&screenshots_root.join(format!("{name}{SCREENSHOT_DIR_SUFFIX}")))?;

        Ok(Self {
            profile_name: name,
            profile_dir,
            screenshot_dir,
        })
    }

    /// Creates the screenshot directory (and parents) if absent.
    ///
    /// Idempotent: repeated calls with the same profile name neither fail
    /// nor erase existing contents.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Profile`] if the directory cannot be created.
    pub fn ensure_screenshot_dir(&self) -> Result<()> {
        if self.screenshot_dir.exists() {
            debug!(path = %self.screenshot_dir.display(), "Using existing screenshot directory");
            return Ok(());
        }

        fs::create_dir_all(&self.screenshot_dir).map_err(|e| {
            Error::profile(format!(
                "Failed to create screenshot directory at {}: {}",
                self.screenshot_dir.display(),
                e
            ))
        })?;

        debug!(path = %self.screenshot_dir.display(), "Created screenshot directory");
        Ok(())
    }
}

// ============================================================================
// SessionPaths - Accessors
// ============================================================================

impl SessionPaths {
    /// Returns the sanitized profile name.
    #[inline]
    #[must_use]
    pub fn profile_name(&self) -> &str {
        &self.profile_name
    }

    /// Returns the absolute persistent profile directory.
    #[inline]
    #[must_use]
    pub fn profile_dir(&self) -> &Path {
        &self.profile_dir
    }

    /// Returns the absolute screenshot directory.
    #[inline]
    #[must_use]
    pub fn screenshot_dir(&self) -> &Path {
        &self.screenshot_dir
    }
}

// ============================================================================
// Sanitization
// ============================================================================

/// Sanitizes a profile name for use as a single path component.
///
/// `None` or an empty/whitespace name selects [`DEFAULT_PROFILE_NAME`].
/// Names containing path separators, `..` components, or that form an
/// absolute path are rejected rather than escaped; escaping would silently
/// alias two names onto one profile directory.
///
/// # Errors
///
/// Returns [`Error::InvalidProfileName`] on rejection.
pub fn sanitize_profile_name(name: Option<&str>) -> Result<String> {
    let name = match name.map(str::trim) {
        None | Some("") => return Ok(DEFAULT_PROFILE_NAME.to_string()),
        Some(name) => name,
    };

    if name.contains('/') || name.contains('\\') || name.contains('\0') {
        return Err(Error::invalid_profile_name(name));
    }

    // A valid name is exactly one normal path component.
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if name != ".." && name != "." => {
            Ok(name.to_string())
        }
        _ => Err(Error::invalid_profile_name(name)),
    }
}

/// Resolves a path to an absolute path without touching the filesystem.
fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).map_err(|e| {
        Error::profile(format!(
            "Failed to resolve absolute path for {}: {}",
            path.display(),
            e
        ))
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    #[test]
    fn test_default_name_when_absent() {
        assert_eq!(sanitize_profile_name(None).expect("valid"), "default");
        assert_eq!(sanitize_profile_name(Some("")).expect("valid"), "default");
        assert_eq!(sanitize_profile_name(Some("  ")).expect("valid"), "default");
    }

    #[test]
    fn test_plain_names_pass() {
        assert_eq!(sanitize_profile_name(Some("alice")).expect("valid"), "alice");
        assert_eq!(
            sanitize_profile_name(Some("bot_account-2")).expect("valid"),
            "bot_account-2"
        );
    }

    #[test]
    fn test_traversal_names_rejected() {
        for bad in ["..", "../x", "a/b", "a\\b", "/etc", ".", "x/..", "a\0b"] {
            let err = sanitize_profile_name(Some(bad)).expect_err("should reject");
            assert!(matches!(err, Error::InvalidProfileName { .. }), "{bad}");
        }
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let sessions = Path::new("sessions");
        let screenshots = Path::new("screenshots");

        let a = SessionPaths::derive(sessions, screenshots, Some("alice")).expect("derive");
        let b = SessionPaths::derive(sessions, screenshots, Some("alice")).expect("derive");

        assert_eq!(a, b);
        assert!(a.profile_dir().is_absolute());
        assert!(a.screenshot_dir().is_absolute());
        assert!(a.profile_dir().ends_with("sessions/alice"));
        assert!(a.screenshot_dir().ends_with("screenshots/alice-screenshots"));
    }

    #[test]
    fn test_ensure_screenshot_dir_idempotent() {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let paths = SessionPaths::derive(
            &tmp.path().join("sessions"),
            &tmp.path().join("screenshots"),
            Some("alice"),
        )
        .expect("derive");

        paths.ensure_screenshot_dir().expect("first create");
        assert!(paths.screenshot_dir().is_dir());

        // Existing contents survive a repeated create.
        let marker = paths.screenshot_dir().join("keep.png");
        std::fs::write(&marker, b"png").expect("write marker");

        paths.ensure_screenshot_dir().expect("second create");
        assert!(marker.exists());
    }

    proptest! {
        #[test]
        fn prop_same_name_same_paths(name in "[A-Za-z0-9_-]{1,32}") {
            let sessions = Path::new("sessions");
            let screenshots = Path::new("screenshots");

            let a = SessionPaths::derive(sessions, screenshots, Some(&name)).expect("derive");
            let b = SessionPaths::derive(sessions, screenshots, Some(&name)).expect("derive");

            prop_assert_eq!(a.profile_dir(), b.profile_dir());
            prop_assert_eq!(a.screenshot_dir(), b.screenshot_dir());
        }

        #[test]
        fn prop_separators_always_rejected(
            prefix in "[A-Za-z0-9]{0,8}",
            sep in prop::sample::select(vec!['/', '\\']),
            suffix in "[A-Za-z0-9]{0,8}",
        ) {
            let name = format!("{prefix}{sep}{suffix}");
            prop_assert!(sanitize_profile_name(Some(&name)).is_err());
        }
    }
}
