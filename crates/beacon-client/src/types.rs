//! Wire shapes for the `/match` endpoint.

use beacon_core::{Coordinate, MatchResult};
use serde::{Deserialize, Serialize};

/// Body of `POST /match`. An absent location is sent as `"location": null`;
/// the key is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub description: String,
    pub location: Option<String>,
}

/// `{"matches": [...]}`. Elements are kept as raw values so one malformed
/// record cannot fail the whole envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct MatchEnvelope {
    pub matches: Vec<serde_json::Value>,
}

/// Item ids arrive as strings from the matcher but as integers from older
/// deployments.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ItemId {
    Text(String),
    Number(serde_json::Number),
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemId::Text(s) => f.write_str(s),
            ItemId::Number(n) => write!(f, "{n}"),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct MatchRecord {
    pub image_url: String,
    pub confidence: f64,
    pub location: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    pub timestamp: String,
    pub item_id: ItemId,
}

impl MatchRecord {
    /// Validates the record and converts it into the domain type.
    pub(crate) fn into_match(self) -> Result<MatchResult, String> {
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(format!("confidence {} outside [0, 1]", self.confidence));
        }
        let item_id = self.item_id.to_string();
        if item_id.is_empty() {
            return Err("empty item_id".to_owned());
        }

        let coordinate = match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => {
                let coordinate = Coordinate::new(lat, lon);
                if coordinate.is_none() {
                    tracing::debug!(item_id = %item_id, lat, lon, "ignoring out-of-range match coordinate");
                }
                coordinate
            }
            _ => None,
        };

        Ok(MatchResult {
            image_url: self.image_url,
            confidence: self.confidence,
            location: self.location,
            coordinate,
            timestamp: self.timestamp,
            item_id,
        })
    }
}
