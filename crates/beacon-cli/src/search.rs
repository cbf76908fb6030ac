//! `beacon search`: look up a lost item.

use beacon_client::{BeaconService, LoadOutcome, ResultList, RowDisplay};
use beacon_core::MatchResult;

/// Runs the search and prints one line per match, best first.
///
/// With `image_rows` set, match images are then loaded a page at a time
/// through that many recycled rows.
///
/// # Errors
///
/// Returns an error if the search request fails.
pub(crate) async fn run_search(
    service: &BeaconService,
    description: &str,
    location: Option<&str>,
    image_rows: Option<usize>,
) -> anyhow::Result<()> {
    let matches = service.search(description, location).await?;

    if matches.is_empty() {
        println!("no matches found for \"{}\"", description.trim());
        return Ok(());
    }

    let header = format!(
        "{:<10}{:<6}{:<10}{:<22}{:<28}IMAGE",
        "ITEM", "CONF", "", "REPORTED", "LOCATION"
    );
    println!("{header}");
    for item in &matches {
        println!("{}", format_match(item));
    }

    if let Some(rows) = image_rows {
        println!();
        show_images(service, matches, rows).await;
    }
    Ok(())
}

fn format_match(item: &MatchResult) -> String {
    let reported = item.reported_at().map_or_else(
        || item.timestamp.clone(),
        |t| t.format("%Y-%m-%d %H:%M UTC").to_string(),
    );
    let location = match item.coordinate {
        Some(c) => format!("{} ({:.4}, {:.4})", item.location, c.latitude, c.longitude),
        None => item.location.clone(),
    };
    format!(
        "{:<10}{:<6.2}{:<10}{:<22}{:<28}{}",
        item.item_id,
        item.confidence,
        item.confidence_label(),
        reported,
        location,
        item.image_url
    )
}

async fn show_images(service: &BeaconService, matches: Vec<MatchResult>, rows: usize) {
    let list = ResultList::new(matches, rows);
    for page in 0..list.page_count() {
        let outcomes = list.show_page(service.image_loader(), page).await;
        for (row, outcome) in list.rows().iter().zip(outcomes) {
            let snapshot = row.snapshot();
            let item_id = snapshot.item_id.as_deref().unwrap_or("-");
            match (outcome, snapshot.display) {
                (LoadOutcome::Loaded, RowDisplay::Image(img)) => println!(
                    "{item_id:<10}{:?} {}x{} ({} bytes)",
                    img.format,
                    img.width,
                    img.height,
                    img.bytes.len()
                ),
                _ => println!("{item_id:<10}no image available"),
            }
        }
    }
}
