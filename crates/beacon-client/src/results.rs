//! A search result set rendered through a fixed pool of recycled rows.

use beacon_core::MatchResult;
use futures::future::join_all;

use crate::image_loader::{LoadOutcome, ResultImageLoader, ResultRow};

/// Owns the matches from one search and the rows that display them.
///
/// Only `row_count` rows exist; scrolling to another page re-binds the same
/// rows to different matches, which is exactly the case the row tokens in
/// [`ResultRow`] guard against.
pub struct ResultList {
    matches: Vec<MatchResult>,
    rows: Vec<ResultRow>,
}

impl ResultList {
    /// A `row_count` of zero is raised to one.
    #[must_use]
    pub fn new(matches: Vec<MatchResult>, row_count: usize) -> Self {
        let rows = (0..row_count.max(1)).map(|_| ResultRow::new()).collect();
        Self { matches, rows }
    }

    #[must_use]
    pub fn matches(&self) -> &[MatchResult] {
        &self.matches
    }

    #[must_use]
    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.matches.len().div_ceil(self.rows.len())
    }

    /// The match index currently intended for `row` on `page`, if any.
    #[must_use]
    pub fn match_index(&self, page: usize, row: usize) -> Option<usize> {
        let index = page.checked_mul(self.rows.len())?.checked_add(row)?;
        (row < self.rows.len() && index < self.matches.len()).then_some(index)
    }

    /// Binds every row to the matches of `page` and loads their images
    /// concurrently. Rows past the end of the result set are cleared.
    ///
    /// Returns one outcome per bound row, in row order.
    pub async fn show_page(&self, loader: &ResultImageLoader, page: usize) -> Vec<LoadOutcome> {
        let loads = self.rows.iter().enumerate().filter_map(|(row_index, row)| {
            if let Some(index) = self.match_index(page, row_index) {
                Some(loader.load(row, &self.matches[index]))
            } else {
                row.clear();
                None
            }
        });
        join_all(loads).await
    }
}
