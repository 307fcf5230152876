//! Chromium engine: process spawn + DevTools protocol.
//!
//! Launches a Chromium-family browser bound to a persistent user-data
//! directory and drives it over its DevTools WebSocket endpoint. The
//! endpoint is announced on the browser's stderr
//! (`DevTools listening on ws://...`), so the port can stay
//! kernel-assigned (`--remote-debugging-port=0`) and no HTTP probing is
//! needed.
//!
//! Automation-detection countermeasures are fixed launch arguments, not
//! configuration.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as Base64Standard;
use parking_lot::Mutex;
use regex::Regex;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStderr, Command};
use tokio::time::timeout;
use tracing::{debug, info, trace};

use crate::cdp::{CdpConnection, CdpRequest};
use crate::error::{Error, Result};

use super::{Browser, Engine, LaunchSpec, Page};

// ============================================================================
// Constants
// ============================================================================

/// Binaries probed by [`ChromiumEngine::discover`], in preference order.
const BROWSER_CANDIDATES: &[&str] = &[
    "chromium",
    "chromium-browser",
    "google-chrome",
    "google-chrome-stable",
    "chrome",
];

/// Fixed launch arguments applied to every browser instance.
/// Not configurable.
const STEALTH_ARGS: &[&str] = &[
    "--disable-blink-features=AutomationControlled",
    "--no-first-run",
    "--no-default-browser-check",
];

/// Maximum time to wait for the DevTools endpoint announcement.
const DEFAULT_LAUNCH_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// ProcessGuard
// ============================================================================

/// Guards the browser process and ensures it is killed when dropped.
struct ProcessGuard {
    /// The child process handle.
    child: Option<Child>,
    /// Process ID for logging.
    pid: u32,
}

impl ProcessGuard {
    /// Creates a new process guard.
    fn new(child: Child) -> Self {
        let pid = child.id().unwrap_or(0);
        debug!(pid, "Process guard created");
        Self {
            child: Some(child),
            pid,
        }
    }

    /// Takes the child out of the guard, disarming the drop kill.
    fn take_child(&mut self) -> Option<Child> {
        self.child.take()
    }

    /// Kills the process and waits for it to exit.
    async fn kill(&mut self) -> Result<()> {
        if let Some(child) = self.take_child() {
            kill_child(child, self.pid).await?;
        }
        Ok(())
    }
}

/// Kills a child process and reaps it.
async fn kill_child(mut child: Child, pid: u32) -> Result<()> {
    debug!(pid, "Killing browser process");
    if let Err(e) = child.kill().await {
        debug!(pid, error = %e, "Failed to kill process");
    }
    if let Err(e) = child.wait().await {
        debug!(pid, error = %e, "Failed to wait for process");
    }
    info!(pid, "Process terminated");
    Ok(())
}

impl Drop for ProcessGuard {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take()
            && let Err(e) = child.start_kill()
        {
            debug!(pid = self.pid, error = %e, "Failed to send kill signal in Drop");
        }
    }
}

// ============================================================================
// ChromiumEngine
// ============================================================================

/// Engine that spawns real Chromium-family browser processes.
#[derive(Clone)]
pub struct ChromiumEngine {
    /// Path to the browser binary.
    binary: PathBuf,
    /// Maximum time to wait for the DevTools endpoint.
    launch_timeout: Duration,
}

impl fmt::Debug for ChromiumEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChromiumEngine")
            .field("binary", &self.binary)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// ChromiumEngine - Constructors
// ============================================================================

impl ChromiumEngine {
    /// Creates an engine for the given browser binary.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BrowserNotFound`] if the binary does not exist.
    pub fn new(binary: impl Into<PathBuf>) -> Result<Self> {
        let binary = binary.into();

        if !binary.exists() {
            return Err(Error::browser_not_found(&binary));
        }

        Ok(Self {
            binary,
            launch_timeout: DEFAULT_LAUNCH_TIMEOUT,
        })
    }

    /// Discovers a browser binary on `PATH`.
    ///
    /// Probes the usual Chromium-family binary names in preference order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if no candidate is found.
    pub fn discover() -> Result<Self> {
        for candidate in BROWSER_CANDIDATES {
            if let Ok(path) = which::which(candidate) {
                debug!(binary = %path.display(), "Discovered browser binary");
                return Ok(Self {
                    binary: path,
                    launch_timeout: DEFAULT_LAUNCH_TIMEOUT,
                });
            }
        }

        Err(Error::config(format!(
            "No browser binary found on PATH (tried: {}). \
             Set `browser.binary` in the configuration to point at one.",
            BROWSER_CANDIDATES.join(", ")
        )))
    }

    /// Overrides the launch timeout.
    #[inline]
    #[must_use]
    pub fn with_launch_timeout(mut self, timeout: Duration) -> Self {
        self.launch_timeout = timeout;
        self
    }

    /// Returns the browser binary path.
    #[inline]
    #[must_use]
    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

// ============================================================================
// ChromiumEngine - Launch
// ============================================================================

impl ChromiumEngine {
    /// Builds the command-line arguments for a launch.
    fn launch_args(spec: &LaunchSpec) -> Vec<String> {
        let mut args = Vec::with_capacity(STEALTH_ARGS.len() + 3);

        args.push(format!("--user-data-dir={}", spec.profile_dir.display()));
        args.push("--remote-debugging-port=0".to_string());
        args.extend(STEALTH_ARGS.iter().map(ToString::to_string));

        if spec.headless {
            args.push("--headless=new".to_string());
        }

        args
    }

    /// Spawns the browser process with stderr captured.
    fn spawn_process(&self, spec: &LaunchSpec) -> Result<Child> {
        let mut cmd = Command::new(&self.binary);
        cmd.args(Self::launch_args(spec));

        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        cmd.spawn().map_err(Error::process_launch_failed)
    }
}

#[async_trait]
impl Engine for ChromiumEngine {
    type Browser = ChromiumBrowser;

    async fn launch(&self, spec: &LaunchSpec) -> Result<Self::Browser> {
        // Materialize the user-data directory before spawn; permission
        // problems surface here as a profile error.
        std::fs::create_dir_all(&spec.profile_dir).map_err(|e| {
            Error::profile(format!(
                "Failed to create profile directory at {}: {}",
                spec.profile_dir.display(),
                e
            ))
        })?;

        let mut child = self.spawn_process(spec)?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| Error::protocol("Browser stderr was not captured"))?;

        // Guard before any await: an early return must still reap the child.
        let mut guard = ProcessGuard::new(child);
        info!(pid = guard.pid, binary = %self.binary.display(), "Browser process spawned");

        let ws_url = match timeout(self.launch_timeout, scrape_devtools_url(stderr)).await {
            Ok(Ok(url)) => url,
            Ok(Err(e)) => {
                guard.kill().await?;
                return Err(e);
            }
            Err(_) => {
                guard.kill().await?;
                return Err(Error::timeout(
                    "discover DevTools endpoint",
                    self.launch_timeout.as_millis() as u64,
                ));
            }
        };

        debug!(url = %ws_url, "DevTools endpoint announced");

        let connection = match CdpConnection::connect(&ws_url).await {
            Ok(connection) => connection,
            Err(e) => {
                guard.kill().await?;
                return Err(e);
            }
        };

        Ok(ChromiumBrowser {
            connection,
            process: Mutex::new(guard),
        })
    }
}

// ============================================================================
// ChromiumBrowser
// ============================================================================

/// A live Chromium browser instance.
///
/// Owns the browser process and its DevTools connection. The process is
/// killed when the handle is dropped.
pub struct ChromiumBrowser {
    /// DevTools connection.
    connection: CdpConnection,
    /// Protected process handle.
    process: Mutex<ProcessGuard>,
}

impl fmt::Debug for ChromiumBrowser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChromiumBrowser")
            .field("pid", &self.process.lock().pid)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Browser for ChromiumBrowser {
    type Page = ChromiumPage;

    async fn new_page(&self) -> Result<Self::Page> {
        let result = self
            .connection
            .send(CdpRequest::create_target("about:blank"))
            .await?
            .into_result()?;

        let target_id = result
            .get("targetId")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::protocol("createTarget response missing targetId"))?;

        debug!(target_id, "Page created");
        Ok(ChromiumPage::new(self.connection.clone(), target_id))
    }

    async fn pages(&self) -> Result<Vec<Self::Page>> {
        let result = self
            .connection
            .send(CdpRequest::get_targets())
            .await?
            .into_result()?;

        let infos = result
            .get("targetInfos")
            .and_then(|v| v.as_array())
            .ok_or_else(|| Error::protocol("getTargets response missing targetInfos"))?;

        let pages = infos
            .iter()
            .filter(|info| info.get("type").and_then(|v| v.as_str()) == Some("page"))
            .filter_map(|info| info.get("targetId").and_then(|v| v.as_str()))
            .map(|target_id| ChromiumPage::new(self.connection.clone(), target_id))
            .collect();

        Ok(pages)
    }

    async fn close(&self) -> Result<()> {
        debug!("Closing browser");

        // Graceful shutdown first; the kill below is authoritative either way.
        if let Err(e) = self.connection.send(CdpRequest::close_browser()).await {
            debug!(error = %e, "Browser.close command failed");
        }
        self.connection.shutdown();

        // Take the child out of the lock before awaiting on it.
        let (child, pid) = {
            let mut guard = self.process.lock();
            let pid = guard.pid;
            (guard.take_child(), pid)
        };
        if let Some(child) = child {
            kill_child(child, pid).await?;
        }

        info!("Browser closed");
        Ok(())
    }
}

// ============================================================================
// ChromiumPage
// ============================================================================

/// A handle to a Chromium page (target).
pub struct ChromiumPage {
    /// DevTools connection.
    connection: CdpConnection,
    /// Target identifier of this page.
    target_id: String,
    /// Session id, attached lazily on first session-scoped command.
    session_id: Mutex<Option<String>>,
}

impl fmt::Debug for ChromiumPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChromiumPage")
            .field("target_id", &self.target_id)
            .finish_non_exhaustive()
    }
}

impl ChromiumPage {
    /// Creates a page handle for a target.
    fn new(connection: CdpConnection, target_id: impl Into<String>) -> Self {
        Self {
            connection,
            target_id: target_id.into(),
            session_id: Mutex::new(None),
        }
    }

    /// Returns the target identifier.
    #[inline]
    #[must_use]
    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    /// Attaches to the target once and caches the session id.
    async fn ensure_session(&self) -> Result<String> {
        if let Some(id) = self.session_id.lock().clone() {
            return Ok(id);
        }

        let response = self
            .connection
            .send(CdpRequest::attach_to_target(&self.target_id))
            .await?;
        let session_id = response.get_string("sessionId");

        if session_id.is_empty() {
            return Err(Error::protocol("attachToTarget response missing sessionId"));
        }

        debug!(target_id = %self.target_id, session_id = %session_id, "Attached to target");
        *self.session_id.lock() = Some(session_id.clone());
        Ok(session_id)
    }
}

#[async_trait]
impl Page for ChromiumPage {
    async fn capture_png(&self) -> Result<Vec<u8>> {
        let session_id = self.ensure_session().await?;

        let result = self
            .connection
            .send(CdpRequest::capture_screenshot(&session_id))
            .await?
            .into_result()?;

        let data = result
            .get("data")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::protocol("Screenshot response missing data field"))?;

        Base64Standard
            .decode(data)
            .map_err(|e| Error::protocol(format!("Invalid screenshot payload: {e}")))
    }

    async fn close(&self) -> Result<()> {
        self.connection
            .send(CdpRequest::close_target(&self.target_id))
            .await?
            .into_result()?;

        debug!(target_id = %self.target_id, "Page closed");
        Ok(())
    }
}

// ============================================================================
// Private Helpers
// ============================================================================

/// Reads browser stderr until the DevTools endpoint is announced.
async fn scrape_devtools_url(stderr: ChildStderr) -> Result<String> {
    let pattern = Regex::new(r"DevTools listening on (ws://\S+)")
        .map_err(|e| Error::protocol(format!("Invalid endpoint pattern: {e}")))?;

    let mut lines = BufReader::new(stderr).lines();
    while let Some(line) = lines.next_line().await? {
        trace!(line = %line, "Browser stderr");

        if let Some(captures) = pattern.captures(&line)
            && let Some(url) = captures.get(1)
        {
            return Ok(url.as_str().to_string());
        }
    }

    Err(Error::connection(
        "Browser exited before announcing its DevTools endpoint",
    ))
}

// ============================================================================
// Tests
// ============================================================================
