//! External lookup capability
//!
//! This service integrates the pluggable place/movie search providers,
//! including HTTP client setup, response parsing, timeout bounding and
//! error handling. Provider responses are normalized into `Candidate`s at
//! this boundary.

use std::time::Duration;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::LookupConfig;
use crate::models::{Candidate, CandidateExtra, PollKind};
use crate::utils::errors::{LookupError, LookupResult, PlanBuddyError, Result};

/// Pluggable search capability consumed by the command interpreter
#[async_trait]
pub trait LookupProvider: Send + Sync {
    /// Free-text place search, e.g. "cafe connaught place"
    async fn search_places(&self, query: &str) -> LookupResult<Vec<Candidate>>;

    /// Movie discovery filtered by the caller's genre preferences
    async fn search_movies_by_genres(&self, genres: &[String]) -> LookupResult<Vec<Candidate>>;
}

/// Place search response structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaceSearchResponse {
    pub results: Vec<PlaceResult>,
}

/// A single place result
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaceResult {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub rating: Option<f64>,
    pub image: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Movie discovery response structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MovieSearchResponse {
    pub results: Vec<MovieResult>,
}

/// A single movie result
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MovieResult {
    pub id: String,
    pub title: String,
    pub overview: Option<String>,
    pub poster: Option<String>,
    pub rating: Option<f64>,
    pub release_date: Option<String>,
    pub genres: Option<Vec<String>>,
}

impl From<PlaceResult> for Candidate {
    fn from(place: PlaceResult) -> Self {
        let description = place
            .description
            .or(place.address)
            .unwrap_or_default();

        Candidate {
            id: place.id,
            title: place.name,
            description,
            image: place.image,
            rating: place.rating,
            extra: CandidateExtra {
                release_date: None,
                genres: None,
                latitude: place.latitude,
                longitude: place.longitude,
                source: PollKind::Place,
            },
        }
    }
}

impl From<MovieResult> for Candidate {
    fn from(movie: MovieResult) -> Self {
        Candidate {
            id: movie.id,
            title: movie.title,
            description: movie.overview.unwrap_or_default(),
            image: movie.poster,
            rating: movie.rating,
            extra: CandidateExtra {
                release_date: movie.release_date,
                genres: movie.genres,
                latitude: None,
                longitude: None,
                source: PollKind::Movie,
            },
        }
    }
}

/// HTTP-backed lookup provider
#[derive(Debug, Clone)]
pub struct HttpLookupProvider {
    client: Client,
    config: LookupConfig,
}

impl HttpLookupProvider {
    /// Create a new provider with a timeout-bounded HTTP client
    pub fn new(config: LookupConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("PlanBuddy/1.0")
            .build()
            .map_err(PlanBuddyError::Http)?;

        Ok(Self { client, config })
    }

    fn map_error(e: reqwest::Error) -> LookupError {
        if e.is_timeout() {
            LookupError::Timeout
        } else if e.is_connect() {
            LookupError::ServiceUnavailable
        } else {
            LookupError::RequestFailed(e.to_string())
        }
    }

    async fn fetch_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> LookupResult<T> {
        debug!(url = %url, "Making lookup request");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(Self::map_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(LookupError::RequestFailed(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| LookupError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl LookupProvider for HttpLookupProvider {
    async fn search_places(&self, query: &str) -> LookupResult<Vec<Candidate>> {
        let url = format!(
            "{}/search?q={}",
            self.config.place_api_url,
            urlencoding::encode(query)
        );

        let response: PlaceSearchResponse = self.fetch_json(&url).await?;
        Ok(response.results.into_iter().map(Candidate::from).collect())
    }

    async fn search_movies_by_genres(&self, genres: &[String]) -> LookupResult<Vec<Candidate>> {
        let url = format!(
            "{}/discover?genres={}",
            self.config.movie_api_url,
            urlencoding::encode(&genres.join(","))
        );

        let response: MovieSearchResponse = self.fetch_json(&url).await?;
        Ok(response.results.into_iter().map(Candidate::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_response_deserialization() {
        let json = r#"{"results": [{"id": "p1", "name": "Cafe A", "address": "Block A", "rating": 4.2, "latitude": 28.63, "longitude": 77.22}]}"#;
        let response: PlaceSearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.results.len(), 1);

        let candidate = Candidate::from(response.results[0].clone());
        assert_eq!(candidate.title, "Cafe A");
        assert_eq!(candidate.description, "Block A");
        assert_eq!(candidate.extra.source, PollKind::Place);
        assert_eq!(candidate.extra.latitude, Some(28.63));
    }

    #[test]
    fn test_movie_response_deserialization() {
        let json = r#"{"results": [{"id": "m7", "title": "Heat", "overview": "Crime drama", "rating": 8.3, "release_date": "1995-12-15", "genres": ["crime", "thriller"]}]}"#;
        let response: MovieSearchResponse = serde_json::from_str(json).unwrap();

        let candidate = Candidate::from(response.results[0].clone());
        assert_eq!(candidate.title, "Heat");
        assert_eq!(candidate.extra.source, PollKind::Movie);
        assert_eq!(candidate.extra.release_date.as_deref(), Some("1995-12-15"));
    }

    #[test]
    fn test_place_description_falls_back_to_address() {
        let place = PlaceResult {
            id: "p1".to_string(),
            name: "Cafe A".to_string(),
            description: None,
            address: Some("Block A".to_string()),
            rating: None,
            image: None,
            latitude: None,
            longitude: None,
        };
        assert_eq!(Candidate::from(place).description, "Block A");
    }
}
