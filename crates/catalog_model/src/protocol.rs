//! Wire payloads of the primary catalog provider and the secondary ratings provider.
//!
//! Every field the providers may omit is optional so that decoding only fails on
//! genuinely malformed bodies.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagedResults<T> {
    #[serde(default)]
    pub page: u32,
    pub results: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
}

/// One entry of a discovery, search or trending page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawEntry {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backdrop_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_average: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_air_date: Option<String>,
}

impl RawEntry {
    pub fn is_person(&self) -> bool {
        self.media_type.as_deref() == Some("person")
    }

    pub fn has_poster(&self) -> bool {
        self.poster_path
            .as_deref()
            .is_some_and(|path| !path.trim().is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawGenre {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawDetails {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    #[serde(default)]
    pub genres: Vec<RawGenre>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub episode_run_time: Vec<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_average: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_air_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoEntry {
    pub key: String,
    pub site: String,
    #[serde(rename = "type")]
    pub video_type: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoList {
    #[serde(default)]
    pub results: Vec<VideoEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExternalIds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imdb_id: Option<String>,
}

impl ExternalIds {
    /// The cross-reference id, when it is present and non-blank.
    pub fn cross_ref_id(&self) -> Option<&str> {
        self.imdb_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecondaryRating {
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Value")]
    pub value: String,
}

/// Title lookup response of the secondary provider. A miss is reported in-band
/// with `Response: "False"` and an `Error` message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecondaryTitle {
    #[serde(rename = "Response", default)]
    pub response: Option<String>,
    #[serde(rename = "Ratings", default)]
    pub ratings: Vec<SecondaryRating>,
    #[serde(rename = "Error", default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SecondaryTitle {
    pub fn is_success(&self) -> bool {
        !matches!(self.response.as_deref(), Some(flag) if flag.eq_ignore_ascii_case("false"))
    }
}
