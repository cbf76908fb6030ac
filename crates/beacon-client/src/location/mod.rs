//! Permission-gated current-location acquisition.
//!
//! The platform side (permission prompt, GPS fix) sits behind
//! [`LocationProvider`]. [`LocationCoordinator`] layers the single-flight and
//! timeout policy on top and never reports an error: every failure degrades
//! to "no coordinate".

mod coordinator;
mod providers;

use async_trait::async_trait;
use beacon_core::Coordinate;
use thiserror::Error;

pub use coordinator::LocationCoordinator;
pub use providers::{DeniedLocationProvider, FixedLocationProvider};

/// Platform permission state for location access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationStatus {
    NotDetermined,
    Granted,
    Denied,
    Restricted,
}

/// Why a location request produced no coordinate. Logged, never returned.
#[derive(Debug, Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("location access restricted")]
    Restricted,

    #[error("no location fix within {0:?}")]
    Timeout(std::time::Duration),

    #[error("location unavailable: {0}")]
    Unavailable(String),
}

/// Platform location services.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn authorization_status(&self) -> AuthorizationStatus;

    /// Shows the OS permission prompt and resolves once the user answers.
    /// May suspend for an unbounded time.
    async fn request_authorization(&self) -> AuthorizationStatus;

    /// Requests a single fix. Only called once authorization is granted.
    async fn current_fix(&self) -> Result<Coordinate, LocationError>;
}
