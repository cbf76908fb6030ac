//! Per-row asynchronous image loading for the results list.
//!
//! Rows are recycled: the same [`ResultRow`] may be re-bound to another match
//! while an earlier fetch is still in flight. Every fetch captures a fresh
//! [`RowToken`] when it starts and may only touch the row if that token is
//! still the row's active one when it finishes. A fetch whose row has moved
//! on is also dropped as soon as the re-bind happens, which closes its
//! request.

use std::io::Cursor;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use beacon_core::MatchResult;
use image::{ImageFormat, ImageReader};
use reqwest::Url;
use thiserror::Error;
use tokio::sync::watch;

use crate::client::{resolve_image_url, ImageSource};
use crate::error::ClientError;

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Identifies one fetch attempt on one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowToken(u64);

impl RowToken {
    fn next() -> Self {
        Self(NEXT_TOKEN.fetch_add(1, Ordering::Relaxed))
    }
}

/// A fetched image whose header decoded successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedImage {
    pub bytes: Arc<[u8]>,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

/// What a row's image slot currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowDisplay {
    Empty,
    /// Spinner visible, previous image cleared.
    Loading,
    Image(LoadedImage),
    /// Terminal failure state: "no image available".
    Placeholder,
}

impl RowDisplay {
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, RowDisplay::Loading)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSnapshot {
    pub token: Option<RowToken>,
    pub item_id: Option<String>,
    pub display: RowDisplay,
}

/// One recyclable list row.
///
/// All state changes go through a `watch` channel, so the token comparison
/// and the display write happen under one lock and UI code can observe the
/// row with [`ResultRow::subscribe`].
#[derive(Debug)]
pub struct ResultRow {
    state: watch::Sender<RowSnapshot>,
}

impl Default for ResultRow {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultRow {
    #[must_use]
    pub fn new() -> Self {
        let (state, _) = watch::channel(RowSnapshot {
            token: None,
            item_id: None,
            display: RowDisplay::Empty,
        });
        Self { state }
    }

    #[must_use]
    pub fn snapshot(&self) -> RowSnapshot {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn display(&self) -> RowDisplay {
        self.state.borrow().display.clone()
    }

    #[must_use]
    pub fn active_token(&self) -> Option<RowToken> {
        self.state.borrow().token
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<RowSnapshot> {
        self.state.subscribe()
    }

    /// Binds the row to `item_id` and starts a fetch: issues a new token,
    /// clears the old image and shows the spinner. Any fetch started earlier
    /// becomes stale.
    pub fn begin(&self, item_id: &str) -> RowToken {
        let token = RowToken::next();
        self.state.send_modify(|row| {
            row.token = Some(token);
            row.item_id = Some(item_id.to_owned());
            row.display = RowDisplay::Loading;
        });
        token
    }

    /// Unbinds the row. Any in-flight fetch becomes stale.
    pub fn clear(&self) {
        self.state.send_modify(|row| {
            row.token = None;
            row.item_id = None;
            row.display = RowDisplay::Empty;
        });
    }

    /// Applies `display` only if `token` is still active. Returns whether it
    /// was applied.
    pub fn complete(&self, token: RowToken, display: RowDisplay) -> bool {
        self.state.send_if_modified(|row| {
            if row.token == Some(token) {
                row.display = display;
                true
            } else {
                false
            }
        })
    }

    /// Resolves once `token` is no longer the active token.
    async fn superseded(&self, token: RowToken) {
        let mut rx = self.state.subscribe();
        if rx.wait_for(|row| row.token != Some(token)).await.is_err() {
            // Unreachable while `self` is borrowed: the sender lives in `self`.
            std::future::pending::<()>().await;
        }
    }
}

/// How a [`ResultImageLoader::load`] call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    Placeholder,
    /// The row was re-bound before this fetch finished; nothing was applied.
    Superseded,
}

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("image fetch failed: {0}")]
    Fetch(#[from] ClientError),

    #[error("image decode failed: {0}")]
    Decode(#[from] image::ImageError),

    #[error("unrecognized image format")]
    UnrecognizedFormat,
}

/// Fetches and attaches images to result rows.
#[derive(Clone)]
pub struct ResultImageLoader {
    source: Arc<dyn ImageSource>,
    base_url: Url,
}

impl ResultImageLoader {
    /// `base_url` resolves relative `image_url`s.
    #[must_use]
    pub fn new(source: Arc<dyn ImageSource>, base_url: Url) -> Self {
        Self { source, base_url }
    }

    /// Binds `row` to `item` and loads its image.
    ///
    /// Failures (bad URL, network, non-2xx, undecodable bytes) end in
    /// [`RowDisplay::Placeholder`], never in a stuck spinner. If the row is
    /// re-bound mid-flight, the fetch is dropped and the row is left to the
    /// newer binding.
    pub async fn load(&self, row: &ResultRow, item: &MatchResult) -> LoadOutcome {
        let token = row.begin(&item.item_id);

        let display = tokio::select! {
            result = self.fetch(&item.image_url) => match result {
                Ok(image) => RowDisplay::Image(image),
                Err(e) => {
                    tracing::warn!(
                        item_id = %item.item_id,
                        url = %item.image_url,
                        error = %e,
                        "image load failed; showing placeholder"
                    );
                    RowDisplay::Placeholder
                }
            },
            () = row.superseded(token) => {
                tracing::debug!(item_id = %item.item_id, "row re-bound; dropping image fetch");
                return LoadOutcome::Superseded;
            }
        };

        let outcome = match display {
            RowDisplay::Image(_) => LoadOutcome::Loaded,
            _ => LoadOutcome::Placeholder,
        };
        if row.complete(token, display) {
            outcome
        } else {
            tracing::debug!(item_id = %item.item_id, "stale image result discarded");
            LoadOutcome::Superseded
        }
    }

    /// Resolves, downloads and header-decodes one image without binding it
    /// to a row.
    ///
    /// # Errors
    ///
    /// - [`ImageError::Fetch`] for an unusable URL, network failure or non-2xx.
    /// - [`ImageError::Decode`] or [`ImageError::UnrecognizedFormat`] for
    ///   bytes that are not an image.
    pub async fn fetch(&self, raw_url: &str) -> Result<LoadedImage, ImageError> {
        let url = resolve_image_url(&self.base_url, raw_url)?;
        let bytes = self.source.fetch_image(&url).await?;
        decode_header(bytes)
    }
}

/// Identifies the format and reads the dimensions without decoding pixels.
fn decode_header(bytes: Vec<u8>) -> Result<LoadedImage, ImageError> {
    let reader = ImageReader::new(Cursor::new(bytes.as_slice()))
        .with_guessed_format()
        .map_err(image::ImageError::IoError)?;
    let format = reader.format().ok_or(ImageError::UnrecognizedFormat)?;
    let (width, height) = reader.into_dimensions()?;
    Ok(LoadedImage {
        bytes: Arc::from(bytes),
        format,
        width,
        height,
    })
}

#[cfg(test)]
#[path = "image_loader_test.rs"]
mod tests;
