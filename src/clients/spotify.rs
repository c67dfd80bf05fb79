use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use serde::Deserialize;

use crate::clients::{
    entities::{AccessToken, Artist, SeedArtists, Track},
    errors::{ClientError, Result},
};

/// Spotify Web API root
pub const DEFAULT_API_BASE_URL: &str = "https://api.spotify.com/v1";
/// Spotify token endpoint
pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/api/token";
/// Per-call timeout unless configured otherwise
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Endpoints and limits for talking to Spotify. Fixed once the server starts.
#[derive(Debug, Clone)]
pub struct SpotifyConfig {
    /// Root for `search` and `recommendations`
    pub api_base_url: String,
    /// Client-credentials token endpoint
    pub auth_url: String,
    /// Applied to every outbound call
    pub timeout: Duration,
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        SpotifyConfig {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl SpotifyConfig {
    /// HTTP client with the per-call timeout applied.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| ClientError::ConfigurationError(e.to_string()))
    }
}

/// The two catalog lookups the recommender needs.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Artists matching `name`, best match first.
    async fn search_artists(&self, token: &AccessToken, name: &str) -> Result<Vec<Artist>>;

    /// Tracks recommended for the given seeds, in upstream order.
    async fn get_recommendations(
        &self,
        token: &AccessToken,
        seeds: &SeedArtists,
    ) -> Result<Vec<Track>>;
}

#[derive(Deserialize, Debug)]
struct ArtistPage {
    #[serde(default)]
    items: Option<Vec<Artist>>,
}

#[derive(Deserialize, Debug)]
struct SearchResponse {
    #[serde(default)]
    artists: Option<ArtistPage>,
}

#[derive(Deserialize, Debug)]
struct RecommendationsResponse {
    #[serde(default)]
    tracks: Option<Vec<Track>>,
}

/// [`CatalogApi`] over the Spotify Web API
pub struct SpotifyClient {
    http: reqwest::Client,
    api_base_url: String,
}

impl SpotifyClient {
    /// Client rooted at `api_base_url`.
    pub fn new(http: reqwest::Client, api_base_url: impl Into<String>) -> Self {
        let api_base_url = api_base_url.into().trim_end_matches('/').to_string();
        SpotifyClient { http, api_base_url }
    }

    /// Client using the base URL and timeout from `config`.
    pub fn from_config(config: &SpotifyConfig) -> Result<Self> {
        Ok(Self::new(config.http_client()?, config.api_base_url.clone()))
    }

    /// Client against the public Spotify API with the default timeout.
    pub fn try_default() -> Result<Self> {
        Self::from_config(&SpotifyConfig::default())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.api_base_url)
    }
}

#[async_trait]
impl CatalogApi for SpotifyClient {
    async fn search_artists(&self, token: &AccessToken, name: &str) -> Result<Vec<Artist>> {
        let query = format!("artist:{name}");
        let response: SearchResponse = self
            .http
            .get(self.endpoint("search"))
            .bearer_auth(token.as_str())
            .query(&[("q", query.as_str()), ("type", "artist")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let artists = response
            .artists
            .and_then(|page| page.items)
            .unwrap_or_default();
        debug!("Search for {name:?} returned {} artists", artists.len());
        Ok(artists)
    }

    async fn get_recommendations(
        &self,
        token: &AccessToken,
        seeds: &SeedArtists,
    ) -> Result<Vec<Track>> {
        let seed_artists = seeds.to_query_value();
        let response: RecommendationsResponse = self
            .http
            .get(self.endpoint("recommendations"))
            .bearer_auth(token.as_str())
            .query(&[("seed_artists", seed_artists.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let tracks = response.tracks.unwrap_or_default();
        debug!(
            "Recommendations for seeds {seed_artists} returned {} tracks",
            tracks.len()
        );
        Ok(tracks)
    }
}
