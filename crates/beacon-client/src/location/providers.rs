use async_trait::async_trait;
use beacon_core::Coordinate;

use super::{AuthorizationStatus, LocationError, LocationProvider};

/// Always granted; reports the same fix every time.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocationProvider {
    coordinate: Coordinate,
}

impl FixedLocationProvider {
    #[must_use]
    pub fn new(coordinate: Coordinate) -> Self {
        Self { coordinate }
    }
}

#[async_trait]
impl LocationProvider for FixedLocationProvider {
    async fn authorization_status(&self) -> AuthorizationStatus {
        AuthorizationStatus::Granted
    }

    async fn request_authorization(&self) -> AuthorizationStatus {
        AuthorizationStatus::Granted
    }

    async fn current_fix(&self) -> Result<Coordinate, LocationError> {
        Ok(self.coordinate)
    }
}

/// Always denied. Stands in for devices without location services.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeniedLocationProvider;

#[async_trait]
impl LocationProvider for DeniedLocationProvider {
    async fn authorization_status(&self) -> AuthorizationStatus {
        AuthorizationStatus::Denied
    }

    async fn request_authorization(&self) -> AuthorizationStatus {
        AuthorizationStatus::Denied
    }

    async fn current_fix(&self) -> Result<Coordinate, LocationError> {
        Err(LocationError::PermissionDenied)
    }
}
