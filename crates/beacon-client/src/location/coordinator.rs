use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use beacon_core::Coordinate;
use futures::future::{BoxFuture, FutureExt, Shared};

use super::{AuthorizationStatus, LocationError, LocationProvider};

type Resolution = Shared<BoxFuture<'static, Option<Coordinate>>>;
type Slot = Arc<Mutex<Option<PendingRequest>>>;

struct PendingRequest {
    id: u64,
    resolution: Resolution,
}

/// Single-flight location fetcher.
///
/// At most one acquisition runs at a time. A caller arriving while one is in
/// flight joins it, so every caller receives exactly one result and the
/// provider is asked for exactly one fix. The acquisition runs on its own
/// task and releases the slot when it ends, whether or not anyone is still
/// waiting for it.
///
/// Only the fix itself is bounded by `fix_timeout`; the permission prompt
/// waits for the user.
pub struct LocationCoordinator {
    provider: Arc<dyn LocationProvider>,
    fix_timeout: Duration,
    pending: Slot,
    next_id: AtomicU64,
}

impl LocationCoordinator {
    #[must_use]
    pub fn new(provider: Arc<dyn LocationProvider>, fix_timeout: Duration) -> Self {
        Self {
            provider,
            fix_timeout,
            pending: Arc::new(Mutex::new(None)),
            next_id: AtomicU64::new(0),
        }
    }

    /// Resolves to the current coordinate, or `None` when location is
    /// unavailable for any reason (denied, restricted, timed out, failed).
    ///
    /// Must be called from within a tokio runtime.
    pub async fn request_location(&self) -> Option<Coordinate> {
        let resolution = {
            let mut slot = lock(&self.pending);
            if let Some(pending) = slot.as_ref() {
                tracing::debug!(request_id = pending.id, "joining in-flight location request");
                pending.resolution.clone()
            } else {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                let resolution = self.spawn_acquisition(id);
                *slot = Some(PendingRequest {
                    id,
                    resolution: resolution.clone(),
                });
                resolution
            }
        };

        resolution.await
    }

    /// `true` while an acquisition is outstanding (including while the OS
    /// permission prompt is on screen).
    #[must_use]
    pub fn is_pending(&self) -> bool {
        lock(&self.pending).is_some()
    }

    fn spawn_acquisition(&self, id: u64) -> Resolution {
        let provider = Arc::clone(&self.provider);
        let fix_timeout = self.fix_timeout;
        let release = ReleaseOnExit {
            pending: Arc::clone(&self.pending),
            id,
        };
        let task = tokio::spawn(async move {
            let _release = release;
            acquire(provider, fix_timeout).await
        });
        task.map(|joined| match joined {
            Ok(coordinate) => coordinate,
            Err(e) => {
                tracing::warn!(error = %e, "location task failed; continuing without location");
                None
            }
        })
        .boxed()
        .shared()
    }
}

/// Clears the slot entry for `id` when the acquisition task ends, including
/// by panic or abort.
struct ReleaseOnExit {
    pending: Slot,
    id: u64,
}

impl Drop for ReleaseOnExit {
    fn drop(&mut self) {
        let mut slot = lock(&self.pending);
        if slot.as_ref().is_some_and(|pending| pending.id == self.id) {
            *slot = None;
        }
    }
}

fn lock(pending: &Mutex<Option<PendingRequest>>) -> MutexGuard<'_, Option<PendingRequest>> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn acquire(provider: Arc<dyn LocationProvider>, fix_timeout: Duration) -> Option<Coordinate> {
    match try_acquire(provider.as_ref(), fix_timeout).await {
        Ok(coordinate) => {
            tracing::debug!(
                latitude = coordinate.latitude,
                longitude = coordinate.longitude,
                "location resolved"
            );
            Some(coordinate)
        }
        Err(err @ (LocationError::PermissionDenied | LocationError::Restricted)) => {
            tracing::debug!(reason = %err, "continuing without location");
            None
        }
        Err(err) => {
            tracing::warn!(error = %err, "location request failed; continuing without location");
            None
        }
    }
}

async fn try_acquire(
    provider: &dyn LocationProvider,
    fix_timeout: Duration,
) -> Result<Coordinate, LocationError> {
    let mut status = provider.authorization_status().await;
    if status == AuthorizationStatus::NotDetermined {
        tracing::debug!("requesting location authorization");
        status = provider.request_authorization().await;
    }

    match status {
        AuthorizationStatus::Granted => {
            match tokio::time::timeout(fix_timeout, provider.current_fix()).await {
                Ok(fix) => fix,
                Err(_) => Err(LocationError::Timeout(fix_timeout)),
            }
        }
        AuthorizationStatus::Restricted => Err(LocationError::Restricted),
        AuthorizationStatus::Denied | AuthorizationStatus::NotDetermined => {
            Err(LocationError::PermissionDenied)
        }
    }
}
