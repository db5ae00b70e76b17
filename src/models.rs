use jiff::Timestamp;
use serde::{Deserialize, Serialize, Serializer, ser::SerializeStruct};

use crate::entities::favorite_movie;

/// One entry of an OMDb search, field names as the provider sends them.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(rename = "Title", default)]
    pub title: String,
    #[serde(rename = "Year", default)]
    pub year: String,
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    #[serde(rename = "Type", default)]
    pub kind: String,
    #[serde(rename = "Poster", default)]
    pub poster: String,
}

impl SearchResult {
    pub fn new(title: &str, year: &str, imdb_id: &str, kind: &str, poster: &str) -> Self {
        Self {
            title: title.to_string(),
            year: year.to_string(),
            imdb_id: imdb_id.to_string(),
            kind: kind.to_string(),
            poster: poster.to_string(),
        }
    }
}

/// A page of search results. Serializes to the OMDb envelope so the browser
/// sees the same shape whether the page came from upstream or the fallback.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SearchPage {
    pub results: Vec<SearchResult>,
    pub total: u32,
}

impl Serialize for SearchPage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("SearchPage", 3)?;
        s.serialize_field("Search", &self.results)?;
        s.serialize_field("totalResults", &self.total.to_string())?;
        s.serialize_field("Response", "True")?;
        s.end()
    }
}

/// Title lookup result: the summary fields plus whatever else OMDb returned
/// (plot, ratings, runtime, ...), passed through untouched.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MovieDetails {
    #[serde(flatten)]
    pub summary: SearchResult,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct FavoriteRequest {
    #[serde(default)]
    pub imdb_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub year: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub poster: String,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NewFavorite {
    pub imdb_id: String,
    pub title: String,
    pub year: String,
    pub kind: String,
    pub poster: String,
}

impl From<FavoriteRequest> for NewFavorite {
    fn from(req: FavoriteRequest) -> Self {
        Self {
            imdb_id: req.imdb_id.trim().to_string(),
            title: req.title,
            year: req.year,
            kind: req.kind,
            poster: req.poster,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct FavoriteMovie {
    pub id: i32,
    pub imdb_id: String,
    pub title: String,
    pub year: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub poster: String,
    pub created_at: Timestamp,
}

impl From<favorite_movie::Model> for FavoriteMovie {
    fn from(row: favorite_movie::Model) -> Self {
        Self {
            id: row.id,
            imdb_id: row.imdb_id,
            title: row.title,
            year: row.year,
            kind: row.kind,
            poster: row.poster,
            created_at: Timestamp::from_millisecond(row.created_at)
                .unwrap_or(Timestamp::UNIX_EPOCH),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FavoriteAdded {
    pub message: &'static str,
    pub id: i32,
}

#[derive(Debug, Serialize)]
pub struct FavoriteRemoved {
    pub message: &'static str,
    pub deleted: u64,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub timestamp: Timestamp,
}

#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    pub database: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub message: &'static str,
    pub version: &'static str,
    pub environment: String,
}
