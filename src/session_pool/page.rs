//! Page handles on the shared automation context
//!
//! A fresh page gets a fixed viewport, user agent and `Accept-Language`, and
//! optionally a `Fetch` interceptor that fails image, stylesheet and font
//! requests at the network layer.

use anyhow::{Context, Result};
use chromiumoxide::Page;
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::fetch::{
    ContinueRequestParams, EnableParams, EventRequestPaused, FailRequestParams, RequestPattern,
    RequestStage,
};
use chromiumoxide::cdp::browser_protocol::network::{
    ErrorReason, ResourceType, SetUserAgentOverrideParams,
};
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use super::{PageHandle, SessionPoolConfig};
use crate::crawl_engine::crawl_types::RawContent;
use crate::crawl_engine::page_timeout::with_page_timeout;

/// Resource types that never need to load for listing extraction
const BLOCKED_RESOURCES: [ResourceType; 3] =
    [ResourceType::Image, ResourceType::Stylesheet, ResourceType::Font];

/// A configured page plus its request interceptor task
pub struct ChromePage {
    page: Page,
    interceptor: Option<JoinHandle<()>>,
    timeout: Duration,
}

impl ChromePage {
    /// Apply the pool's page options to a blank page
    ///
    /// On error the page is left open; the caller decides whether to close it.
    pub(crate) async fn configure(page: Page, config: &SessionPoolConfig) -> Result<Self> {
        page.execute(
            SetDeviceMetricsOverrideParams::builder()
                .width(config.viewport_width)
                .height(config.viewport_height)
                .device_scale_factor(1.0)
                .mobile(false)
                .build()
                .map_err(anyhow::Error::msg)?,
        )
        .await
        .context("Failed to set viewport")?;

        page.execute(SetUserAgentOverrideParams {
            user_agent: config.user_agent.clone(),
            accept_language: Some(config.accept_language.clone()),
            platform: None,
            user_agent_metadata: None,
        })
        .await
        .context("Failed to set user agent and Accept-Language")?;

        let interceptor = if config.block_resources {
            Some(spawn_resource_blocker(&page).await?)
        } else {
            None
        };

        Ok(Self {
            page,
            interceptor,
            timeout: Duration::from_secs(config.navigation_timeout_secs),
        })
    }
}

/// Pause requests for blocked resource types and fail them as client-blocked
async fn spawn_resource_blocker(page: &Page) -> Result<JoinHandle<()>> {
    // Listen before enabling so no paused request is missed
    let mut paused = page
        .event_listener::<EventRequestPaused>()
        .await
        .context("Failed to subscribe to paused requests")?;

    let patterns: Vec<RequestPattern> = BLOCKED_RESOURCES
        .iter()
        .map(|resource| {
            RequestPattern::builder()
                .url_pattern("*")
                .resource_type(resource.clone())
                .request_stage(RequestStage::Request)
                .build()
        })
        .collect();

    page.execute(EnableParams::builder().patterns(patterns).build())
        .await
        .context("Failed to enable request interception")?;

    let page = page.clone();
    Ok(tokio::spawn(async move {
        while let Some(event) = paused.next().await {
            let request_id = event.request_id.clone();
            let outcome = if BLOCKED_RESOURCES.contains(&event.resource_type) {
                page.execute(FailRequestParams::new(
                    request_id,
                    ErrorReason::BlockedByClient,
                ))
                .await
                .map(|_| ())
            } else {
                page.execute(ContinueRequestParams::new(request_id))
                    .await
                    .map(|_| ())
            };
            if let Err(e) = outcome {
                // Requests of a page being torn down cannot be resolved
                trace!("Paused request not resolved: {e}");
            }
        }
        trace!("Request interceptor finished");
    }))
}

impl PageHandle for ChromePage {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        with_page_timeout(
            async {
                self.page
                    .goto(url)
                    .await
                    .with_context(|| format!("Navigation to {url} failed"))?;
                Ok(())
            },
            self.timeout,
            "navigate",
        )
        .await
    }

    async fn content(&mut self) -> Result<RawContent> {
        with_page_timeout(
            async { self.page.content().await.context("Failed to capture page content") },
            self.timeout,
            "content",
        )
        .await
    }

    async fn close(mut self) {
        if let Some(interceptor) = self.interceptor.take() {
            interceptor.abort();
        }
        if let Err(e) = self.page.clone().close().await {
            debug!("Page close failed (context may already be gone): {e}");
        }
    }
}

impl Drop for ChromePage {
    fn drop(&mut self) {
        if let Some(interceptor) = self.interceptor.take() {
            interceptor.abort();
        }
    }
}
