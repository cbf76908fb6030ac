//! `beacon fetch-image`: download and inspect one image.

use beacon_client::BeaconService;

/// # Errors
///
/// Returns an error if the URL is unusable, the download fails, or the
/// bytes are not a recognisable image.
pub(crate) async fn run_fetch_image(service: &BeaconService, url: &str) -> anyhow::Result<()> {
    let image = service.image_loader().fetch(url).await?;
    println!(
        "{:?} {}x{} ({} bytes)",
        image.format,
        image.width,
        image.height,
        image.bytes.len()
    );
    Ok(())
}
