//! Found-item submission (`POST /upload`).
//!
//! 1. Await the location coordinator (absence never blocks submission).
//! 2. Build the form parts: `file`, then `latitude`/`longitude` when a
//!    coordinate is known, then `lostLocation`.
//! 3. Encode with a fresh boundary.
//! 4. POST with `Content-Type: multipart/form-data; boundary=...`.
//! 5. Decode the JSON verdict.
//!
//! Nothing here retries: re-sending a report would duplicate it server-side.

use std::sync::Arc;

use beacon_core::{Coordinate, UploadMetadata, UploadOutcome};

use crate::client::BeaconClient;
use crate::error::ClientError;
use crate::location::LocationCoordinator;
use crate::multipart::{self, MultipartPart};

const UPLOAD_PATH: &str = "upload";
const IMAGE_FIELD: &str = "file";
const IMAGE_FILENAME: &str = "upload.jpg";
const IMAGE_CONTENT_TYPE: &str = "image/jpeg";
const LATITUDE_FIELD: &str = "latitude";
const LONGITUDE_FIELD: &str = "longitude";
const LOCATION_FIELD: &str = "lostLocation";

pub struct UploadPipeline {
    client: BeaconClient,
    location: Arc<LocationCoordinator>,
    default_label: String,
}

impl UploadPipeline {
    /// `default_label` replaces blank location labels.
    #[must_use]
    pub fn new(
        client: BeaconClient,
        location: Arc<LocationCoordinator>,
        default_label: impl Into<String>,
    ) -> Self {
        Self {
            client,
            location,
            default_label: default_label.into(),
        }
    }

    /// Submits a found item.
    ///
    /// A fresh location fix takes precedence over `metadata.coordinate`,
    /// which is only used when the coordinator resolves to nothing.
    ///
    /// A 2xx response whose body says `"success": false` is returned as an
    /// `Ok` outcome; the server made that decision, not the transport.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Validation`] if `image` is empty (checked first).
    /// - [`ClientError::Encoding`] if the body cannot be framed.
    /// - [`ClientError::Http`] on network failure.
    /// - [`ClientError::UnexpectedStatus`] on a non-2xx status.
    /// - [`ClientError::MalformedResponse`] if the body is not an upload verdict.
    pub async fn submit(
        &self,
        image: Vec<u8>,
        metadata: &UploadMetadata,
    ) -> Result<UploadOutcome, ClientError> {
        if image.is_empty() {
            return Err(ClientError::Validation("no image selected".to_owned()));
        }

        let coordinate = self
            .location
            .request_location()
            .await
            .or(metadata.coordinate);

        let label = effective_label(&metadata.location_label, &self.default_label);
        let image_len = image.len();
        let parts = upload_parts(image, label, coordinate);
        let body = multipart::encode_with_fresh_boundary(&parts)?;

        let url = self.client.endpoint(UPLOAD_PATH)?;
        let text = self.client.post_multipart(url, body).await?;
        let outcome: UploadOutcome =
            serde_json::from_str(&text).map_err(|e| ClientError::MalformedResponse {
                context: "upload response".to_owned(),
                source: e,
            })?;

        tracing::info!(
            success = outcome.success,
            item_id = outcome.item_id.as_deref().unwrap_or("-"),
            location = label,
            has_coordinate = coordinate.is_some(),
            image_len,
            "upload completed"
        );
        Ok(outcome)
    }
}

fn effective_label<'a>(label: &'a str, default_label: &'a str) -> &'a str {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        default_label
    } else {
        trimmed
    }
}

pub(crate) fn upload_parts(
    image: Vec<u8>,
    label: &str,
    coordinate: Option<Coordinate>,
) -> Vec<MultipartPart> {
    let mut parts = Vec::with_capacity(4);
    parts.push(MultipartPart::file(
        IMAGE_FIELD,
        IMAGE_FILENAME,
        IMAGE_CONTENT_TYPE,
        image,
    ));
    if let Some(c) = coordinate {
        parts.push(MultipartPart::text(LATITUDE_FIELD, c.latitude.to_string()));
        parts.push(MultipartPart::text(LONGITUDE_FIELD, c.longitude.to_string()));
    }
    parts.push(MultipartPart::text(LOCATION_FIELD, label));
    parts
}
