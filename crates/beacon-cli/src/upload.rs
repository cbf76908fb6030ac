//! `beacon upload`: report a found item.

use std::path::Path;

use anyhow::Context;
use beacon_client::BeaconService;
use beacon_core::UploadMetadata;

/// Reads the photo and submits it with the optional location label.
///
/// A server verdict of `"success": false` is printed and turned into an
/// error so the process exits non-zero.
///
/// # Errors
///
/// Returns an error if the file cannot be read, the upload fails, or the
/// server rejects the report.
pub(crate) async fn run_upload(
    service: &BeaconService,
    image: &Path,
    location: Option<&str>,
) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(image)
        .await
        .with_context(|| format!("failed to read image {}", image.display()))?;

    let metadata = UploadMetadata::new(location.unwrap_or_default());
    let outcome = service.upload(bytes, &metadata).await?;

    let message = outcome.message.as_deref().unwrap_or("");
    if !outcome.success {
        anyhow::bail!("upload rejected by server: {message}");
    }

    match outcome.item_id.as_deref() {
        Some(item_id) => println!("uploaded item {item_id}"),
        None => println!("uploaded"),
    }
    if !message.is_empty() {
        println!("{message}");
    }
    Ok(())
}
