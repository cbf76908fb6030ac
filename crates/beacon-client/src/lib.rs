//! Asynchronous orchestration for the Beacon lost-and-found client.
//!
//! Submits found items as multipart uploads tagged with the device location,
//! runs lost-item searches, and loads result images into recycled rows
//! without ever painting a stale image.

pub mod client;
pub mod error;
pub mod image_loader;
pub mod location;
pub mod multipart;
pub mod results;
pub mod search;
pub mod service;
pub mod types;
pub mod upload;

pub use client::{resolve_image_url, BeaconClient, ImageSource};
pub use error::{ClientError, FailureKind};
pub use image_loader::{
    ImageError, LoadOutcome, LoadedImage, ResultImageLoader, ResultRow, RowDisplay, RowSnapshot,
    RowToken,
};
pub use location::{
    AuthorizationStatus, DeniedLocationProvider, FixedLocationProvider, LocationCoordinator,
    LocationError, LocationProvider,
};
pub use multipart::{Boundary, MultipartBody, MultipartPart};
pub use results::ResultList;
pub use search::SearchPipeline;
pub use service::BeaconService;
pub use types::SearchRequest;
pub use upload::UploadPipeline;
