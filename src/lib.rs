//! chromium-session - Persistent, stateful browser sessions.
//!
//! This library launches and supervises a single persistent automated
//! browsing session: it opens a Chromium-family browser with a durable
//! user-data profile, keeps exactly one page active, captures screenshots
//! into a session-scoped directory, and tears the browser down safely on
//! success or failure.
//!
//! # Architecture
//!
//! The session core never talks to a browser directly; it drives an
//! [`Engine`] implementation:
//!
//! - **[`Session`]**: owns the lifecycle: launch, settle, tab
//!   normalization, screenshots, teardown
//! - **[`ChromiumEngine`]**: spawns the browser process and drives it over
//!   its DevTools WebSocket endpoint
//!
//! Key design principles:
//!
//! - Profiles are durable: the same profile name always resolves to the
//!   same directory, and the directory is never deleted by this crate
//! - The launch sequence is strictly ordered; the tab count is normalized
//!   only after a settle delay
//! - `start()` never panics or errors out of an unattended run; the tagged
//!   `try_start()` form exists for callers that branch on outcome
//!
//! # Quick Start
//!
//! ```no_run
//! use chromium_session::{ChromiumEngine, Result, Session};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // Find a browser binary on PATH
//!     let engine = ChromiumEngine::discover()?;
//!
//!     // One persistent session per profile name
//!     let mut session = Session::builder(engine)
//!         .profile("alice")
//!         .headless()
//!         .build()?;
//!
//!     // Launch; failures are logged and swallowed
//!     session.start().await;
//!
//!     session.wait(1, 5).await;
//!     session.screenshot("landing").await?;
//!
//!     session.close().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`session`] | Session lifecycle: [`Session`], [`SessionBuilder`] |
//! | [`engine`] | Engine seam and the Chromium implementation |
//! | [`config`] | TOML settings and the sample-config generator |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`cdp`] | DevTools protocol plumbing (internal) |

// ============================================================================
// Modules
// ============================================================================

/// DevTools protocol plumbing.
///
/// Internal module defining the command framing and WebSocket connection.
pub mod cdp;

/// TOML configuration loading and the sample-config generator.
pub mod config;

/// Automation engine seam and implementations.
///
/// The session drives a browser exclusively through the [`Engine`],
/// [`Browser`] and [`Page`] traits.
pub mod engine;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Session lifecycle management.
///
/// Use [`Session::builder()`] to create a configured session.
pub mod session;

// ============================================================================
// Re-exports
// ============================================================================

// Session types
pub use session::{Session, SessionBuilder, SessionOptions, SessionPaths};

// Engine types
pub use engine::{Browser, ChromiumEngine, Engine, LaunchSpec, Page};

// Configuration types
pub use config::{BrowserSettings, Settings};

// Error types
pub use error::{Error, Result};
