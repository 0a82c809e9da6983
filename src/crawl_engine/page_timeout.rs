//! Deadline wrapper for page operations
//!
//! Every navigation and content capture runs under a fixed deadline so a
//! stalled page surfaces as an ordinary failure instead of hanging the crawl.

use anyhow::{Result, anyhow};
use std::future::Future;
use std::time::Duration;

/// Run `operation` under `deadline`, naming it in the timeout error
///
/// A zero deadline disables the wrapper.
pub async fn with_page_timeout<F, T>(
    operation: F,
    deadline: Duration,
    operation_name: &str,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    if deadline.is_zero() {
        return operation.await;
    }
    tokio::time::timeout(deadline, operation)
        .await
        .unwrap_or_else(|_| {
            Err(anyhow!(
                "{operation_name} timed out after {}s",
                deadline.as_secs_f32()
            ))
        })
}
