//! Chrome driver.
//!
//! Launches Chrome with a persistent profile (or reuses an instance already
//! listening on the debug port) and drives the active page over CDP. The
//! browser is NOT started at construction - it connects lazily on first use.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::{Child, Command};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use voxweb_protocols::browser::{BrowserControl, ScrollAmount, ScrollDirection};
use voxweb_protocols::error::BrowserError;

use crate::cdp::CdpConnection;
use crate::scripts;

/// Driver configuration.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Chrome remote debugging port.
    pub debug_port: u16,
    /// Run Chrome headless.
    pub headless: bool,
    /// Viewport width.
    pub viewport_width: u32,
    /// Viewport height.
    pub viewport_height: u32,
    /// Profile directory for persistent login state.
    /// Default: ~/.voxweb/browser-profile
    pub profile_dir: Option<PathBuf>,
    /// Time to let a page settle after a mutating action.
    pub settle: Duration,
    /// Explicit Chrome binary, overriding auto-detection.
    pub chrome_binary: Option<PathBuf>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            debug_port: 9222,
            headless: false,
            viewport_width: 1280,
            viewport_height: 720,
            profile_dir: None,
            settle: Duration::from_secs(2),
            chrome_binary: None,
        }
    }
}

impl DriverConfig {
    /// The CDP endpoint URL.
    pub fn endpoint(&self) -> String {
        format!("http://localhost:{}", self.debug_port)
    }

    /// Profile directory, defaulting under the voxweb home.
    pub fn resolve_profile_dir(&self) -> PathBuf {
        self.profile_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".voxweb")
                .join("browser-profile")
        })
    }
}

/// Chrome browser driver.
pub struct ChromeDriver {
    config: DriverConfig,
    conn: RwLock<Option<Arc<CdpConnection>>>,
    /// Chrome process handle (if we launched it).
    chrome: Mutex<Option<Child>>,
    current_url: RwLock<Option<String>>,
    auto_cookies: AtomicBool,
}

impl ChromeDriver {
    pub fn new(config: DriverConfig) -> Self {
        Self {
            config,
            conn: RwLock::new(None),
            chrome: Mutex::new(None),
            current_url: RwLock::new(None),
            auto_cookies: AtomicBool::new(false),
        }
    }

    /// Find a Chrome executable.
    pub fn find_chrome() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        let paths = [
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
        ];

        #[cfg(target_os = "linux")]
        let paths = [
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
        ];

        #[cfg(target_os = "windows")]
        let paths = [
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
        ];

        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        let paths: [&str; 0] = [];

        paths
            .iter()
            .map(PathBuf::from)
            .find(|p| p.exists())
    }

    /// Check if Chrome is already listening on the debug port.
    async fn is_chrome_running(&self) -> bool {
        reqwest::get(format!("{}/json/version", self.config.endpoint()))
            .await
            .is_ok()
    }

    async fn launch_chrome(&self) -> Result<(), BrowserError> {
        let binary = self
            .config
            .chrome_binary
            .clone()
            .or_else(Self::find_chrome)
            .ok_or(BrowserError::ChromeNotFound)?;

        let profile_dir = self.config.resolve_profile_dir();
        if let Err(e) = std::fs::create_dir_all(&profile_dir) {
            return Err(BrowserError::LaunchFailed(format!(
                "profile dir {}: {}",
                profile_dir.display(),
                e
            )));
        }

        let mut command = Command::new(&binary);
        command
            .arg(format!("--remote-debugging-port={}", self.config.debug_port))
            .arg(format!("--user-data-dir={}", profile_dir.display()))
            .arg(format!(
                "--window-size={},{}",
                self.config.viewport_width, self.config.viewport_height
            ))
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-notifications")
            .arg("--disable-infobars")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        if self.config.headless {
            command.arg("--headless=new");
        }

        info!(binary = %binary.display(), port = self.config.debug_port, "Launching Chrome");
        let child = command
            .spawn()
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;
        *self.chrome.lock().await = Some(child);

        // Wait for the debug endpoint to come up
        for _ in 0..50 {
            if self.is_chrome_running().await {
                return Ok(());
            }
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
        Err(BrowserError::LaunchFailed(
            "debug endpoint did not come up".to_string(),
        ))
    }

    /// Get or establish the CDP connection.
    pub(crate) async fn connection(&self) -> Result<Arc<CdpConnection>, BrowserError> {
        if let Some(conn) = self.conn.read().await.as_ref() {
            return Ok(conn.clone());
        }

        let mut slot = self.conn.write().await;
        if let Some(conn) = slot.as_ref() {
            return Ok(conn.clone());
        }

        if !self.is_chrome_running().await {
            self.launch_chrome().await?;
        }
        let conn = Arc::new(CdpConnection::connect(&self.config.endpoint()).await?);
        *slot = Some(conn.clone());
        Ok(conn)
    }

    /// Read the page's actual location and remember it.
    async fn sync_location(&self, conn: &CdpConnection) -> Result<String, BrowserError> {
        let value = conn.evaluate("window.location.href").await?;
        let href = value
            .as_str()
            .ok_or_else(|| BrowserError::ActionFailed("location unavailable".to_string()))?
            .to_string();
        *self.current_url.write().await = Some(href.clone());
        Ok(href)
    }

    /// Run the cookie script when auto-accept mode is on.
    async fn apply_auto_cookies(&self, conn: &CdpConnection) {
        if !self.auto_cookies.load(Ordering::SeqCst) {
            return;
        }
        match conn.evaluate(scripts::COOKIE_SCRIPT).await {
            Ok(value) if value.as_bool() == Some(true) => {
                debug!("Cookies accepted automatically");
            }
            Ok(_) => {}
            Err(e) => debug!(error = %e, "Auto cookie pass failed"),
        }
    }

    /// Wait for the page, refresh the tracked location, run auto-cookies.
    async fn after_page_change(&self, conn: &CdpConnection) {
        tokio::time::sleep(self.config.settle).await;
        if let Err(e) = self.sync_location(conn).await {
            warn!(error = %e, "Failed to read page location");
        }
        self.apply_auto_cookies(conn).await;
    }
}

/// Resolve a spoken target into a URL.
///
/// Bare hosts get a scheme; anything that does not look like a host becomes
/// a web search.
fn normalize_target(target: &str) -> String {
    let target = target.trim();
    if target.starts_with("http://") || target.starts_with("https://") {
        target.to_string()
    } else if target.contains('.') && !target.contains(' ') {
        format!("https://{}", target)
    } else {
        format!("https://www.google.com/search?q={}", target.replace(' ', "+"))
    }
}

/// Displayable domain of a URL, falling back to the raw string.
fn domain_of(location: &str) -> String {
    url::Url::parse(location)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| location.to_string())
}

#[async_trait]
impl BrowserControl for ChromeDriver {
    async fn navigate(&self, target: &str) -> Result<String, BrowserError> {
        if target.trim().is_empty() {
            return Err(BrowserError::EmptyTarget);
        }

        let url = normalize_target(target);
        let conn = self.connection().await?;
        conn.navigate(&url).await?;
        tokio::time::sleep(self.config.settle).await;

        let location = self.sync_location(&conn).await?;
        self.apply_auto_cookies(&conn).await;

        Ok(format!("Navigated to {}", domain_of(&location)))
    }

    async fn click(&self, element_text: &str) -> Result<String, BrowserError> {
        let conn = self.connection().await?;
        let value = conn.evaluate(&scripts::click_script(element_text)).await?;

        match value.as_str() {
            Some(label) if !label.is_empty() => {
                let label = label.to_string();
                self.after_page_change(&conn).await;
                Ok(format!("Clicked: {}", label))
            }
            _ => Err(BrowserError::ElementNotFound),
        }
    }

    async fn scroll(
        &self,
        direction: ScrollDirection,
        amount: ScrollAmount,
    ) -> Result<String, BrowserError> {
        let conn = self.connection().await?;
        conn.evaluate(scripts::scroll_script(direction, amount)).await?;
        Ok(scripts::scroll_message(direction, amount).to_string())
    }

    async fn back(&self) -> Result<String, BrowserError> {
        let conn = self.connection().await?;
        conn.evaluate("history.back()").await?;
        self.after_page_change(&conn).await;
        Ok("Navigated back".to_string())
    }

    async fn forward(&self) -> Result<String, BrowserError> {
        let conn = self.connection().await?;
        conn.evaluate("history.forward()").await?;
        self.after_page_change(&conn).await;
        Ok("Navigated forward".to_string())
    }

    async fn refresh(&self) -> Result<String, BrowserError> {
        let conn = self.connection().await?;
        conn.evaluate("location.reload()").await?;
        self.after_page_change(&conn).await;
        Ok("Page refreshed".to_string())
    }

    async fn accept_cookies(&self) -> Result<String, BrowserError> {
        let conn = self.connection().await?;
        let value = conn.evaluate(scripts::COOKIE_SCRIPT).await?;
        if value.as_bool() == Some(true) {
            Ok("Cookies accepted".to_string())
        } else {
            Err(BrowserError::NoCookieBanner)
        }
    }

    async fn current_location(&self) -> Option<String> {
        self.current_url.read().await.clone()
    }

    async fn set_auto_cookies(&self, enabled: bool) {
        self.auto_cookies.store(enabled, Ordering::SeqCst);
        info!(enabled, "Auto-accept cookies");
    }

    async fn auto_cookies(&self) -> bool {
        self.auto_cookies.load(Ordering::SeqCst)
    }

    async fn close(&self) {
        self.conn.write().await.take();
        if let Some(mut child) = self.chrome.lock().await.take() {
            if let Err(e) = child.kill().await {
                warn!(error = %e, "Failed to kill Chrome");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_bare_host() {
        assert_eq!(normalize_target("example.com"), "https://example.com");
        assert_eq!(normalize_target("  sub.example.org  "), "https://sub.example.org");
    }

    #[test]
    fn test_normalize_keeps_explicit_scheme() {
        assert_eq!(normalize_target("http://example.com"), "http://example.com");
        assert_eq!(normalize_target("https://example.com/a"), "https://example.com/a");
    }

    #[test]
    fn test_normalize_free_text_becomes_search() {
        assert_eq!(
            normalize_target("rust async book"),
            "https://www.google.com/search?q=rust+async+book"
        );
    }

    #[test]
    fn test_domain_of() {
        assert_eq!(domain_of("https://www.example.com/path?q=1"), "www.example.com");
        assert_eq!(domain_of("not a url"), "not a url");
    }

    #[test]
    fn test_config_defaults() {
        let config = DriverConfig::default();
        assert_eq!(config.debug_port, 9222);
        assert_eq!(config.endpoint(), "http://localhost:9222");
        assert!(config.resolve_profile_dir().ends_with("browser-profile"));
    }

    #[tokio::test]
    async fn test_driver_starts_without_location() {
        let driver = ChromeDriver::new(DriverConfig::default());
        assert!(driver.current_location().await.is_none());
        assert!(!driver.auto_cookies().await);

        driver.set_auto_cookies(true).await;
        assert!(driver.auto_cookies().await);
    }
}
