use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A WGS-84 position. Construct through [`Coordinate::new`], which rejects
/// out-of-range and non-finite values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        valid.then_some(Self {
            latitude,
            longitude,
        })
    }
}

/// Caller-supplied description of where a found item was picked up.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadMetadata {
    /// Building name or free text. Blank labels are replaced by the
    /// configured default when the upload body is built.
    pub location_label: String,
    pub coordinate: Option<Coordinate>,
}

impl UploadMetadata {
    #[must_use]
    pub fn new(location_label: impl Into<String>) -> Self {
        Self {
            location_label: location_label.into(),
            coordinate: None,
        }
    }

    #[must_use]
    pub fn with_coordinate(mut self, coordinate: Coordinate) -> Self {
        self.coordinate = Some(coordinate);
        self
    }
}

/// Server verdict for a found-item upload (`POST /upload`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadOutcome {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    /// Accepts a string or an integer id; stored as text.
    #[serde(default, deserialize_with = "optional_item_id")]
    pub item_id: Option<String>,
}

fn optional_item_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Unsigned(u64),
        Signed(i64),
    }

    Ok(Option::<RawId>::deserialize(deserializer)?.map(|raw| match raw {
        RawId::Text(s) => s,
        RawId::Unsigned(n) => n.to_string(),
        RawId::Signed(n) => n.to_string(),
    }))
}

/// One ranked candidate returned by `POST /match`.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub image_url: String,
    /// Always within `[0, 1]`.
    pub confidence: f64,
    pub location: String,
    pub coordinate: Option<Coordinate>,
    /// ISO-8601, kept verbatim from the server.
    pub timestamp: String,
    pub item_id: String,
}

impl MatchResult {
    /// Parses [`MatchResult::timestamp`].
    ///
    /// Accepts RFC 3339 with an offset, and naive `YYYY-MM-DDTHH:MM:SS[.f]`
    /// which is read as UTC. Returns `None` for anything else.
    #[must_use]
    pub fn reported_at(&self) -> Option<DateTime<Utc>> {
        if let Ok(ts) = DateTime::parse_from_rfc3339(&self.timestamp) {
            return Some(ts.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&self.timestamp, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }

    #[must_use]
    pub fn confidence_label(&self) -> &'static str {
        if self.confidence >= 0.8 {
            "Excellent Match"
        } else if self.confidence >= 0.6 {
            "Good Match"
        } else {
            "Possible Match"
        }
    }
}
