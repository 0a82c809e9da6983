use anyhow::{Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfigBuilder, HeadlessMode};
use chromiumoxide::fetcher::{BrowserFetcher, BrowserFetcherOptions};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tokio::task::{self, JoinHandle};
use tracing::{debug, error, info, trace, warn};

use crate::session_pool::SessionPoolConfig;

/// Startup flags for every automation context
///
/// Sandboxing and GPU are off; the rest keep Chrome's memory footprint flat
/// over a crawl that lasts hours.
const LAUNCH_ARGS: &[&str] = &[
    "--no-sandbox",
    "--disable-setuid-sandbox",
    "--disable-dev-shm-usage",
    "--disable-accelerated-2d-canvas",
    "--no-first-run",
    "--no-zygote",
    "--disable-gpu",
    "--memory-pressure-off",
];

/// Find a Chrome/Chromium executable on this machine
///
/// `CHROMIUM_PATH` wins, then well-known install paths, then `which`.
pub async fn find_browser_executable() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os("CHROMIUM_PATH").map(PathBuf::from) {
        if path.exists() {
            info!("CHROMIUM_PATH override: {}", path.display());
            return Ok(path);
        }
        warn!("Ignoring CHROMIUM_PATH, {} does not exist", path.display());
    }

    if let Some(path) = install_candidates().into_iter().find(|p| p.exists()) {
        info!("Using installed browser {}", path.display());
        return Ok(path);
    }

    if let Some(path) = lookup_on_path() {
        info!("Using browser from PATH: {}", path.display());
        return Ok(path);
    }

    warn!("No local Chrome/Chromium; a managed build will be downloaded");
    Err(anyhow::anyhow!("Chrome/Chromium executable not found"))
}

/// Platform install locations, `~` expanded against the home directory
fn install_candidates() -> Vec<PathBuf> {
    let raw: &[&str] = if cfg!(target_os = "windows") {
        &[
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files\Chromium\Application\chrome.exe",
        ]
    } else if cfg!(target_os = "macos") {
        &[
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "~/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/opt/homebrew/bin/chromium",
        ]
    } else {
        &[
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
            "/usr/local/bin/chromium",
        ]
    };

    raw.iter()
        .filter_map(|candidate| match candidate.strip_prefix("~/") {
            Some(rest) => dirs::home_dir().map(|home| home.join(rest)),
            None => Some(PathBuf::from(candidate)),
        })
        .collect()
}

/// First browser binary `which` resolves; always `None` on Windows
fn lookup_on_path() -> Option<PathBuf> {
    if cfg!(target_os = "windows") {
        return None;
    }
    ["chromium", "chromium-browser", "google-chrome", "chrome"]
        .into_iter()
        .find_map(|cmd| {
            let output = Command::new("which").arg(cmd).output().ok()?;
            if !output.status.success() {
                return None;
            }
            let found = String::from_utf8_lossy(&output.stdout).trim().to_string();
            (!found.is_empty()).then(|| PathBuf::from(found))
        })
}

/// Where managed Chromium builds are unpacked
fn managed_browser_dir() -> PathBuf {
    let root = dirs::cache_dir().unwrap_or_else(|| {
        let tmp = std::env::temp_dir();
        warn!("No user cache directory, keeping managed Chromium under {}", tmp.display());
        tmp
    });
    root.join("fitmap_crawler").join("chromium")
}

/// Download a managed Chromium into the user cache directory
pub async fn download_managed_browser() -> Result<PathBuf> {
    let dir = managed_browser_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    info!("Fetching managed Chromium into {}", dir.display());
    let options = BrowserFetcherOptions::builder()
        .with_path(&dir)
        .build()
        .context("Invalid browser fetcher options")?;
    let installed = BrowserFetcher::new(options)
        .fetch()
        .await
        .context("Managed Chromium download failed")?;

    info!("Managed Chromium ready at {}", installed.folder_path.display());
    Ok(installed.executable_path)
}

/// Events Chrome emits that chromiumoxide has no type for
fn is_undecodable_event(message: &str) -> bool {
    message.contains("data did not match any variant of untagged enum Message")
        || message.contains("Failed to deserialize WS response")
}

/// Launch one automation context with the crawl's fixed startup options
///
/// Returns the browser and its CDP handler task. The caller owns both and
/// must abort the handler once the browser is closed.
pub async fn launch_browser(
    config: &SessionPoolConfig,
    user_data_dir: &Path,
) -> Result<(Browser, JoinHandle<()>)> {
    let chrome_path = match find_browser_executable().await {
        Ok(path) => path,
        Err(_) => download_managed_browser().await?,
    };

    let mut builder = BrowserConfigBuilder::default()
        .request_timeout(Duration::from_secs(config.navigation_timeout_secs))
        .window_size(config.viewport_width, config.viewport_height)
        .user_data_dir(user_data_dir)
        .chrome_executable(chrome_path);

    builder = if config.headless {
        builder.headless_mode(HeadlessMode::default())
    } else {
        builder.with_head()
    };

    builder = builder.arg(format!("--user-agent={}", config.user_agent));
    for arg in LAUNCH_ARGS {
        builder = builder.arg(*arg);
    }

    let browser_config = builder
        .build()
        .map_err(|e| anyhow::anyhow!("Invalid browser config: {e}"))?;

    info!(
        "Starting Chrome ({}, profile {})",
        if config.headless { "headless" } else { "headed" },
        user_data_dir.display()
    );
    let (browser, mut handler) = Browser::launch(browser_config)
        .await
        .context("Chrome did not start")?;

    let handler_task = task::spawn(async move {
        while let Some(event) = handler.next().await {
            let Err(e) = event else { continue };
            let message = e.to_string();
            if is_undecodable_event(&message) {
                trace!("Skipping CDP event chromiumoxide cannot decode: {message}");
            } else {
                error!("CDP handler error: {e:?}");
            }
        }
        debug!("CDP handler stream ended");
    });

    Ok((browser, handler_task))
}
