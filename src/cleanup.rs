//! Periodic removal of expired sessions and staging entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::session::SessionManager;
use crate::staging::StagingStore;

/// Deletes expired session rows and staging entries once.
///
/// Returns the number of staging entries removed.
pub async fn sweep_expired(
    sessions: &SessionManager,
    staging: &dyn StagingStore,
) -> Result<u64, StoreError> {
    sessions.delete_expired().await?;
    let removed = staging.delete_expired().await?;
    debug!(staging_entries = removed, "expired entries swept");
    Ok(removed)
}

/// Runs [`sweep_expired`] every `interval` until the returned task is aborted.
pub fn spawn_cleanup_task(
    sessions: SessionManager,
    staging: Arc<dyn StagingStore>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if let Err(err) = sweep_expired(&sessions, staging.as_ref()).await {
                warn!(error = %err, "cleanup sweep failed");
            }
        }
    })
}
