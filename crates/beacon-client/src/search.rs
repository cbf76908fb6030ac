//! Lost-item search (`POST /match`).

use beacon_core::MatchResult;

use crate::client::BeaconClient;
use crate::error::ClientError;
use crate::types::{MatchEnvelope, MatchRecord, SearchRequest};

const MATCH_PATH: &str = "match";

impl SearchRequest {
    /// Trims both fields and rejects an empty description. A blank location
    /// becomes `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] when the description is empty
    /// after trimming.
    pub fn new(description: &str, location: Option<&str>) -> Result<Self, ClientError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(ClientError::Validation(
                "please describe your lost item".to_owned(),
            ));
        }
        let location = location
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_owned);
        Ok(Self {
            description: description.to_owned(),
            location,
        })
    }
}

/// Submits lost-item queries and decodes the ranked match list.
#[derive(Debug, Clone)]
pub struct SearchPipeline {
    client: BeaconClient,
}

impl SearchPipeline {
    #[must_use]
    pub fn new(client: BeaconClient) -> Self {
        Self { client }
    }

    /// Returns matches in the order the service ranked them.
    ///
    /// Validation happens before any I/O: an empty description fails on the
    /// first poll without a request being sent.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Validation`] for an empty description.
    /// - [`ClientError::Http`] on network failure.
    /// - [`ClientError::UnexpectedStatus`] on a non-2xx status.
    /// - [`ClientError::MalformedResponse`] if the body is not a `matches`
    ///   envelope. Individual bad records are dropped, not reported.
    pub async fn search(
        &self,
        description: &str,
        location: Option<&str>,
    ) -> Result<Vec<MatchResult>, ClientError> {
        let request = SearchRequest::new(description, location)?;
        let url = self.client.endpoint(MATCH_PATH)?;
        let body = self.client.post_json(url, &request).await?;
        let matches = parse_matches(&body)?;
        tracing::info!(
            description = %request.description,
            location = request.location.as_deref().unwrap_or("-"),
            count = matches.len(),
            "search completed"
        );
        Ok(matches)
    }
}

/// Decodes a `/match` body, dropping records that fail validation.
pub(crate) fn parse_matches(body: &str) -> Result<Vec<MatchResult>, ClientError> {
    let envelope: MatchEnvelope =
        serde_json::from_str(body).map_err(|e| ClientError::MalformedResponse {
            context: "match response".to_owned(),
            source: e,
        })?;

    let total = envelope.matches.len();
    let matches: Vec<MatchResult> = envelope
        .matches
        .into_iter()
        .enumerate()
        .filter_map(|(index, raw)| {
            let record = match serde_json::from_value::<MatchRecord>(raw) {
                Ok(record) => record,
                Err(e) => {
                    tracing::debug!(index, error = %e, "dropping undecodable match record");
                    return None;
                }
            };
            match record.into_match() {
                Ok(m) => Some(m),
                Err(reason) => {
                    tracing::debug!(index, reason = %reason, "dropping invalid match record");
                    None
                }
            }
        })
        .collect();

    if matches.len() != total {
        tracing::debug!(
            kept = matches.len(),
            dropped = total - matches.len(),
            "some match records were dropped"
        );
    }
    Ok(matches)
}
