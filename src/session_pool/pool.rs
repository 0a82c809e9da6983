//! Lazily launched, health-checked automation context
//!
//! The pool holds at most one browser. The first `acquire_context` launches
//! it; later calls reuse it as long as it answers a `version()` probe, and a
//! browser that stops answering is torn down and replaced. `close_context`
//! is the only way the browser goes away during a run.

use anyhow::{Context, Result, anyhow};
use chromiumoxide::browser::Browser;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::page::ChromePage;
use super::{SessionPoolConfig, SessionProvider, SessionStats};
use crate::browser_profile::{create_unique_profile, remove_profile_dir};
use crate::browser_setup::launch_browser;

/// A launched browser, its CDP handler task and its profile directory
pub struct AutomationContext {
    generation: u64,
    browser: Browser,
    handler: JoinHandle<()>,
    profile_dir: Option<PathBuf>,
    launched_at: Instant,
}

impl AutomationContext {
    /// Close the browser, wait for the process, then remove the profile
    async fn shutdown(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("Failed to close browser cleanly: {e}");
        }
        if let Err(e) = self.browser.wait().await {
            warn!("Failed to wait for browser exit: {e}");
        }
        self.handler.abort();
        if let Some(dir) = self.profile_dir.take() {
            remove_profile_dir(&dir);
        }
        info!(
            "Automation context #{} closed after {:.1}s",
            self.generation,
            self.launched_at.elapsed().as_secs_f64()
        );
    }
}

impl Drop for AutomationContext {
    fn drop(&mut self) {
        self.handler.abort();
        if let Some(dir) = self.profile_dir.take() {
            remove_profile_dir(&dir);
        }
    }
}

/// Owner of the shared automation context for one crawl
pub struct SessionPool {
    config: SessionPoolConfig,
    context: Mutex<Option<AutomationContext>>,
    launches: AtomicU64,
}

impl SessionPool {
    /// No browser is launched until the first `acquire_context` or `new_page`
    #[must_use]
    pub fn new(config: SessionPoolConfig) -> Self {
        Self {
            config,
            context: Mutex::new(None),
            launches: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn config(&self) -> &SessionPoolConfig {
        &self.config
    }

    /// The shared context, launched on first call and relaunched if unhealthy
    pub async fn acquire_context(&self) -> Result<MappedMutexGuard<'_, AutomationContext>> {
        let mut guard = self.context.lock().await;

        let failed_probe = match guard.as_ref() {
            Some(context) => context.browser.version().await.err(),
            None => None,
        };
        if let Some(e) = failed_probe {
            warn!("Browser health check failed: {e}. Relaunching automation context");
            if let Some(stale) = guard.take() {
                stale.shutdown().await;
            }
        }

        if guard.is_none() {
            *guard = Some(self.launch().await?);
        }

        MutexGuard::try_map(guard, Option::as_mut)
            .map_err(|_| anyhow!("Automation context missing after launch"))
    }

    async fn launch(&self) -> Result<AutomationContext> {
        let profile = create_unique_profile()?;
        let (browser, handler) = launch_browser(&self.config, profile.path())
            .await
            .context("Failed to launch automation context")?;
        let generation = self.launches.fetch_add(1, Ordering::Relaxed) + 1;
        info!("Automation context #{generation} launched");
        Ok(AutomationContext {
            generation,
            browser,
            handler,
            profile_dir: Some(profile.into_path()),
            launched_at: Instant::now(),
        })
    }

    /// Contexts launched over the pool's lifetime
    #[must_use]
    pub fn launches(&self) -> u64 {
        self.launches.load(Ordering::Relaxed)
    }
}

impl SessionProvider for SessionPool {
    type Page = ChromePage;

    async fn new_page(&self) -> Result<ChromePage> {
        let page = {
            let context = self.acquire_context().await?;
            context
                .browser
                .new_page("about:blank")
                .await
                .context("Failed to open page on automation context")?
        };

        match ChromePage::configure(page.clone(), &self.config).await {
            Ok(handle) => Ok(handle),
            Err(e) => {
                if let Err(close_err) = page.close().await {
                    debug!("Closing unconfigured page failed: {close_err}");
                }
                Err(e)
            }
        }
    }

    async fn close_context(&self) {
        let mut guard = self.context.lock().await;
        match guard.take() {
            Some(context) => context.shutdown().await,
            None => debug!("close_context: no automation context to close"),
        }
    }

    async fn stats(&self) -> SessionStats {
        let launches = self.launches();
        let guard = self.context.lock().await;
        let Some(context) = guard.as_ref() else {
            return SessionStats {
                launches,
                ..SessionStats::default()
            };
        };
        let pages = match context.browser.pages().await {
            Ok(pages) => pages.len(),
            Err(e) => {
                debug!("Page count unavailable: {e}");
                0
            }
        };
        SessionStats {
            pages,
            contexts: 1,
            launches,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fresh_pool_reports_zeros_and_closes_cleanly() {
        let pool = SessionPool::new(SessionPoolConfig::default());
        assert_eq!(pool.stats().await, SessionStats::default());
        pool.close_context().await;
        pool.close_context().await;
        assert_eq!(pool.launches(), 0);
    }
}
