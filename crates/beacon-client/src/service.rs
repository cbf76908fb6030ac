//! One object wiring the pipelines together.
//!
//! Callers construct a single [`BeaconService`] and share it; nothing here is
//! global. The platform seams ([`LocationProvider`], [`ImageSource`]) are
//! injected so tests and headless front ends can swap them.

use std::sync::Arc;
use std::time::Duration;

use beacon_core::{AppConfig, Coordinate, MatchResult, UploadMetadata, UploadOutcome};

use crate::client::{BeaconClient, ImageSource};
use crate::error::ClientError;
use crate::image_loader::{LoadOutcome, ResultImageLoader, ResultRow};
use crate::location::{LocationCoordinator, LocationProvider};
use crate::search::SearchPipeline;
use crate::upload::UploadPipeline;

pub struct BeaconService {
    location: Arc<LocationCoordinator>,
    upload: UploadPipeline,
    search: SearchPipeline,
    images: ResultImageLoader,
}

impl BeaconService {
    /// Builds the service from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the HTTP client cannot be constructed.
    pub fn new(
        config: &AppConfig,
        location_provider: Arc<dyn LocationProvider>,
    ) -> Result<Self, ClientError> {
        let client = BeaconClient::new(config)?;
        Ok(Self::with_client(
            client,
            location_provider,
            config.location_timeout(),
            &config.default_location_label,
        ))
    }

    /// Builds the service around an existing client. Images are fetched
    /// through the same client.
    #[must_use]
    pub fn with_client(
        client: BeaconClient,
        location_provider: Arc<dyn LocationProvider>,
        location_timeout: Duration,
        default_location_label: &str,
    ) -> Self {
        let image_source: Arc<dyn ImageSource> = Arc::new(client.clone());
        Self::with_image_source(
            client,
            location_provider,
            image_source,
            location_timeout,
            default_location_label,
        )
    }

    #[must_use]
    pub fn with_image_source(
        client: BeaconClient,
        location_provider: Arc<dyn LocationProvider>,
        image_source: Arc<dyn ImageSource>,
        location_timeout: Duration,
        default_location_label: &str,
    ) -> Self {
        let location = Arc::new(LocationCoordinator::new(location_provider, location_timeout));
        let images = ResultImageLoader::new(image_source, client.base_url().clone());
        Self {
            upload: UploadPipeline::new(
                client.clone(),
                Arc::clone(&location),
                default_location_label,
            ),
            search: SearchPipeline::new(client),
            location,
            images,
        }
    }

    pub async fn request_location(&self) -> Option<Coordinate> {
        self.location.request_location().await
    }

    /// See [`UploadPipeline::submit`].
    ///
    /// # Errors
    ///
    /// Propagates the pipeline's [`ClientError`].
    pub async fn upload(
        &self,
        image: Vec<u8>,
        metadata: &UploadMetadata,
    ) -> Result<UploadOutcome, ClientError> {
        self.upload.submit(image, metadata).await
    }

    /// See [`SearchPipeline::search`].
    ///
    /// # Errors
    ///
    /// Propagates the pipeline's [`ClientError`].
    pub async fn search(
        &self,
        description: &str,
        location: Option<&str>,
    ) -> Result<Vec<MatchResult>, ClientError> {
        self.search.search(description, location).await
    }

    /// See [`ResultImageLoader::load`].
    pub async fn fetch_image(&self, row: &ResultRow, item: &MatchResult) -> LoadOutcome {
        self.images.load(row, item).await
    }

    #[must_use]
    pub fn image_loader(&self) -> &ResultImageLoader {
        &self.images
    }
}
