pub mod error;

pub use error::{ChromeError, Result};

use std::time::Duration;

use tracing::{debug, warn};

/// Hard cap on a single navigation, matching the per-page timeout used by
/// every browser-rendered extractor.
pub const NAV_TIMEOUT: Duration = Duration::from_secs(30);

/// Virtual-time budget granted to the page after load so client-side
/// rendering can settle. This is a heuristic with no completion signal;
/// slow-rendering pages may still be caught mid-render.
pub const SETTLE_BUDGET_MS: u64 = 3_000;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Renders pages with a one-shot headless Chromium process per call.
///
/// Each render gets its own throwaway profile directory and its own child
/// process, so no browser state survives a call. The profile dir and the
/// process are released on every exit path, success or failure.
#[derive(Debug, Clone)]
pub struct ChromeClient {
    chrome_bin: String,
}

impl ChromeClient {
    pub fn new(chrome_bin: &str) -> Self {
        Self {
            chrome_bin: chrome_bin.to_string(),
        }
    }

    pub fn from_env() -> Self {
        let chrome_bin = std::env::var("CHROME_BIN").unwrap_or_else(|_| "chromium".to_string());
        Self::new(&chrome_bin)
    }

    /// Navigate to `url` and return the fully-rendered DOM as HTML.
    ///
    /// The whole navigation is capped at [`NAV_TIMEOUT`]; the page then gets
    /// [`SETTLE_BUDGET_MS`] of virtual time before the DOM is dumped. There
    /// is no retry: a failed render surfaces as an error and the caller
    /// decides what to do with it.
    pub async fn render(&self, url: &str) -> Result<String> {
        let parsed = url::Url::parse(url).map_err(|e| ChromeError::InvalidUrl(e.to_string()))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ChromeError::UnsupportedScheme(parsed.scheme().to_string()));
        }

        // Dropped on every exit path below, taking the profile with it.
        let profile = tempfile::tempdir().map_err(|e| ChromeError::Launch(e.to_string()))?;

        debug!(url, "Rendering page");

        let result = tokio::time::timeout(
            NAV_TIMEOUT,
            tokio::process::Command::new(&self.chrome_bin)
                .args([
                    "--headless",
                    "--no-sandbox",
                    "--disable-gpu",
                    "--disable-dev-shm-usage",
                    &format!("--user-data-dir={}", profile.path().display()),
                    &format!("--user-agent={USER_AGENT}"),
                    &format!("--virtual-time-budget={SETTLE_BUDGET_MS}"),
                    "--dump-dom",
                    url,
                ])
                .output(),
        )
        .await;

        match result {
            Ok(Ok(output)) => {
                if !output.status.success() {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    warn!(url, stderr = %stderr, "Chrome exited with error");
                    return Err(ChromeError::Render(
                        stderr.lines().last().unwrap_or("unknown").to_string(),
                    ));
                }
                Ok(String::from_utf8_lossy(&output.stdout).into_owned())
            }
            Ok(Err(e)) => Err(ChromeError::Launch(e.to_string())),
            Err(_) => Err(ChromeError::Timeout(NAV_TIMEOUT.as_secs())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_malformed_url_without_spawning() {
        let client = ChromeClient::new("/nonexistent/chromium");
        let err = client.render("not a url").await.unwrap_err();
        assert!(matches!(err, ChromeError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn rejects_non_http_scheme() {
        let client = ChromeClient::new("/nonexistent/chromium");
        let err = client.render("ftp://files.example.com/a").await.unwrap_err();
        assert!(matches!(err, ChromeError::UnsupportedScheme(s) if s == "ftp"));
    }
}
