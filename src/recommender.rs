use std::sync::Arc;

use log::{debug, error, info};
use serde::Deserialize;
use thiserror::Error;

use crate::clients::{
    CatalogApi, ClientCredentialsProvider, CredentialProvider, SpotifyClient,
    entities::{AccessToken, ArtistId, SeedArtists, Track},
    errors::Result as ClientResult,
};

/// Why a recommendation request did not produce tracks.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RecommendationError {
    /// Input was missing or blank
    #[error("Bad request: {0}")]
    Validation(String),

    /// Token acquisition failed
    #[error("Could not obtain an access token")]
    UpstreamAuth,

    /// The search call itself failed
    #[error("Search for artist '{artist}' failed")]
    UpstreamSearch {
        /// Name whose search failed
        artist: String,
    },

    /// The search succeeded but matched nothing
    #[error("No artist found for '{artist}'")]
    NotFound {
        /// Name that matched nothing
        artist: String,
    },

    /// The recommendation call itself failed
    #[error("Recommendation lookup failed")]
    UpstreamRecommendation,

    /// The recommendation call succeeded with zero tracks
    #[error("Recommendation lookup returned no tracks")]
    NoRecommendations,
}

/// Result alias for recommendation requests
pub type Result<T> = std::result::Result<T, RecommendationError>;

/// Inbound body of `POST /recommendations`. Fields are optional so that a
/// missing artist is a validation failure rather than a parse failure.
#[derive(Deserialize, Debug, Default, Clone)]
pub struct RecommendationRequest {
    /// First seed artist
    #[serde(default)]
    pub artist1: Option<String>,
    /// Second seed artist
    #[serde(default)]
    pub artist2: Option<String>,
    /// Third seed artist
    #[serde(default)]
    pub artist3: Option<String>,
}

impl RecommendationRequest {
    /// Request with all three names set.
    pub fn new(artist1: &str, artist2: &str, artist3: &str) -> Self {
        RecommendationRequest {
            artist1: Some(artist1.to_string()),
            artist2: Some(artist2.to_string()),
            artist3: Some(artist3.to_string()),
        }
    }

    /// The three names in order, or a validation error if any is missing or blank.
    pub fn artists(&self) -> Result<[&str; 3]> {
        fn pick(value: &Option<String>) -> Option<&str> {
            value
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
        }
        match (pick(&self.artist1), pick(&self.artist2), pick(&self.artist3)) {
            (Some(a1), Some(a2), Some(a3)) => Ok([a1, a2, a3]),
            _ => Err(RecommendationError::Validation(
                "must pass 3 artists".to_string(),
            )),
        }
    }
}

/// Collaborators for the Recommender
pub struct Config {
    /// Token source
    pub credentials: Arc<dyn CredentialProvider>,
    /// Search and recommendation lookups
    pub catalog: Arc<dyn CatalogApi>,
}

/// Builder for [`Config`]
pub struct ConfigBuilder {
    credentials: Option<Arc<dyn CredentialProvider>>,
    catalog: Option<Arc<dyn CatalogApi>>,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    /// Empty builder; unset collaborators get defaults in [`ConfigBuilder::build`].
    pub fn new() -> Self {
        Self {
            credentials: None,
            catalog: None,
        }
    }

    /// Use this token source.
    #[must_use]
    pub fn credentials(mut self, credentials: Arc<dyn CredentialProvider>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Use this catalog client.
    #[must_use]
    pub fn catalog(mut self, catalog: Arc<dyn CatalogApi>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Anything not supplied falls back to the public Spotify API configured
    /// from `SPOTIFY_CLIENT_ID` / `SPOTIFY_CLIENT_SECRET`.
    pub fn build(self) -> ClientResult<Config> {
        let credentials = match self.credentials {
            Some(c) => c,
            None => Arc::new(ClientCredentialsProvider::try_default()?),
        };
        let catalog = match self.catalog {
            Some(c) => c,
            None => Arc::new(SpotifyClient::try_default()?),
        };
        Ok(Config {
            credentials,
            catalog,
        })
    }
}

/// Turns three artist names into a list of recommended tracks.
pub struct Recommender {
    config: Config,
}

impl Recommender {
    /// Recommender over the given collaborators.
    pub fn new(config: Config) -> Self {
        Recommender { config }
    }

    /// Validate, acquire a token, resolve each artist in order, then ask for
    /// recommendations seeded by all three. Stops at the first failure.
    pub async fn recommend(&self, request: &RecommendationRequest) -> Result<Vec<Track>> {
        let artists = request.artists()?;
        self.run(artists).await
    }

    /// Same as [`Recommender::recommend`] for three plain names.
    pub async fn get_recommendations(
        &self,
        artist1: &str,
        artist2: &str,
        artist3: &str,
    ) -> Result<Vec<Track>> {
        self.recommend(&RecommendationRequest::new(artist1, artist2, artist3))
            .await
    }

    async fn run(&self, [artist1, artist2, artist3]: [&str; 3]) -> Result<Vec<Track>> {
        info!("Fetching recommendations for {artist1:?}, {artist2:?}, {artist3:?}");
        let token = self.config.credentials.acquire_token().await.map_err(|e| {
            error!("{e}");
            RecommendationError::UpstreamAuth
        })?;

        let seeds = SeedArtists([
            self.resolve_artist(&token, artist1).await?,
            self.resolve_artist(&token, artist2).await?,
            self.resolve_artist(&token, artist3).await?,
        ]);
        debug!("Resolved seed artists: {}", seeds.to_query_value());

        let tracks = self
            .config
            .catalog
            .get_recommendations(&token, &seeds)
            .await
            .map_err(|e| {
                error!("{e}");
                RecommendationError::UpstreamRecommendation
            })?;

        if tracks.is_empty() {
            info!("No recommendations for seeds {}", seeds.to_query_value());
            return Err(RecommendationError::NoRecommendations);
        }
        info!("Returning {} recommended tracks", tracks.len());
        Ok(tracks)
    }

    // First search hit wins
    async fn resolve_artist(&self, token: &AccessToken, name: &str) -> Result<ArtistId> {
        let artists = self
            .config
            .catalog
            .search_artists(token, name)
            .await
            .map_err(|e| {
                error!("{e}");
                RecommendationError::UpstreamSearch {
                    artist: name.to_string(),
                }
            })?;

        match artists.into_iter().next() {
            Some(artist) => {
                debug!("Resolved {name:?} to artist {}", artist.id);
                Ok(artist.id)
            }
            None => {
                info!("No artist found for {name:?}");
                Err(RecommendationError::NotFound {
                    artist: name.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::clients::{
        entities::Artist,
        errors::{ClientError, CredentialError},
    };

    /// Outbound calls seen by the fakes, in order.
    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Token,
        Search(String),
        Recommend(String),
    }

    type CallLog = Arc<Mutex<Vec<Call>>>;

    struct FakeCredentials {
        calls: CallLog,
        fail: bool,
    }

    #[async_trait]
    impl CredentialProvider for FakeCredentials {
        async fn acquire_token(&self) -> std::result::Result<AccessToken, CredentialError> {
            self.calls.lock().unwrap().push(Call::Token);
            if self.fail {
                Err(CredentialError::MissingCredentials)
            } else {
                Ok(AccessToken::new("token"))
            }
        }
    }

    #[derive(Default)]
    struct FakeCatalog {
        calls: CallLog,
        unknown: Vec<String>,
        broken_search: Vec<String>,
        broken_recommendations: bool,
        tracks: Vec<Track>,
    }

    #[async_trait]
    impl CatalogApi for FakeCatalog {
        async fn search_artists(
            &self,
            token: &AccessToken,
            name: &str,
        ) -> ClientResult<Vec<Artist>> {
            assert_eq!(token.as_str(), "token");
            self.calls.lock().unwrap().push(Call::Search(name.to_string()));
            if self.broken_search.iter().any(|n| n == name) {
                return Err(ClientError::UnexpectedResponse("boom".into()));
            }
            if self.unknown.iter().any(|n| n == name) {
                return Ok(vec![]);
            }
            Ok(vec![
                Artist {
                    id: ArtistId::new(format!("id-{name}")),
                    name: name.to_string(),
                },
                Artist {
                    id: ArtistId::new(format!("id-{name}-tribute")),
                    name: format!("{name} Tribute Band"),
                },
            ])
        }

        async fn get_recommendations(
            &self,
            _token: &AccessToken,
            seeds: &SeedArtists,
        ) -> ClientResult<Vec<Track>> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Recommend(seeds.to_query_value()));
            if self.broken_recommendations {
                return Err(ClientError::UnexpectedResponse("boom".into()));
            }
            Ok(self.tracks.clone())
        }
    }

    fn two_tracks() -> Vec<Track> {
        vec![
            Track(json!({"id": "trackA", "name": "Track A", "popularity": 70})),
            Track(json!({"id": "trackB", "name": "Track B", "artists": [{"name": "Adele"}]})),
        ]
    }

    fn recommender(catalog: FakeCatalog, token_fails: bool) -> (Recommender, CallLog) {
        let calls = catalog.calls.clone();
        let config = ConfigBuilder::new()
            .credentials(Arc::new(FakeCredentials {
                calls: calls.clone(),
                fail: token_fails,
            }))
            .catalog(Arc::new(catalog))
            .build()
            .unwrap();
        (Recommender::new(config), calls)
    }

    fn calls(log: &CallLog) -> Vec<Call> {
        log.lock().unwrap().clone()
    }

    #[tokio::test]
    async fn resolves_in_order_and_passes_tracks_through() {
        let (recommender, log) = recommender(
            FakeCatalog {
                tracks: two_tracks(),
                ..Default::default()
            },
            false,
        );

        let tracks = recommender
            .get_recommendations("Queen", "Drake", "Adele")
            .await
            .unwrap();

        assert_eq!(tracks, two_tracks());
        assert_eq!(
            calls(&log),
            vec![
                Call::Token,
                Call::Search("Queen".into()),
                Call::Search("Drake".into()),
                Call::Search("Adele".into()),
                Call::Recommend("id-Queen,id-Drake,id-Adele".into()),
            ]
        );
    }

    #[tokio::test]
    async fn missing_artist_is_rejected_before_any_call() {
        let (recommender, log) = recommender(FakeCatalog::default(), false);

        for request in [
            RecommendationRequest::default(),
            RecommendationRequest {
                artist3: None,
                ..RecommendationRequest::new("Queen", "Drake", "")
            },
            RecommendationRequest::new("Queen", "", "Adele"),
            RecommendationRequest::new("   ", "Drake", "Adele"),
        ] {
            let err = recommender.recommend(&request).await.unwrap_err();
            assert!(matches!(err, RecommendationError::Validation(_)));
        }
        assert!(calls(&log).is_empty());
    }

    #[tokio::test]
    async fn unknown_second_artist_stops_before_third_search() {
        let (recommender, log) = recommender(
            FakeCatalog {
                unknown: vec!["Nobody".into()],
                tracks: two_tracks(),
                ..Default::default()
            },
            false,
        );

        let err = recommender
            .get_recommendations("Queen", "Nobody", "Adele")
            .await
            .unwrap_err();

        assert_eq!(
            err,
            RecommendationError::NotFound {
                artist: "Nobody".into()
            }
        );
        assert_eq!(
            calls(&log),
            vec![
                Call::Token,
                Call::Search("Queen".into()),
                Call::Search("Nobody".into()),
            ]
        );
    }

    #[tokio::test]
    async fn token_failure_skips_catalog() {
        let (recommender, log) = recommender(FakeCatalog::default(), true);

        let err = recommender
            .get_recommendations("Queen", "Drake", "Adele")
            .await
            .unwrap_err();

        assert_eq!(err, RecommendationError::UpstreamAuth);
        assert_eq!(calls(&log), vec![Call::Token]);
    }

    #[tokio::test]
    async fn search_failure_names_the_artist() {
        let (recommender, log) = recommender(
            FakeCatalog {
                broken_search: vec!["Drake".into()],
                ..Default::default()
            },
            false,
        );

        let err = recommender
            .get_recommendations("Queen", "Drake", "Adele")
            .await
            .unwrap_err();

        assert_eq!(
            err,
            RecommendationError::UpstreamSearch {
                artist: "Drake".into()
            }
        );
        assert!(!calls(&log).contains(&Call::Search("Adele".into())));
    }

    #[tokio::test]
    async fn empty_recommendations_differ_from_failed_ones() {
        let (empty, _) = recommender(FakeCatalog::default(), false);
        let err = empty
            .get_recommendations("Queen", "Drake", "Adele")
            .await
            .unwrap_err();
        assert_eq!(err, RecommendationError::NoRecommendations);

        let (broken, _) = recommender(
            FakeCatalog {
                broken_recommendations: true,
                ..Default::default()
            },
            false,
        );
        let err = broken
            .get_recommendations("Queen", "Drake", "Adele")
            .await
            .unwrap_err();
        assert_eq!(err, RecommendationError::UpstreamRecommendation);
    }

    #[test]
    fn request_trims_names() {
        let request = RecommendationRequest::new(" Queen ", "Drake", "Adele");
        assert_eq!(request.artists().unwrap(), ["Queen", "Drake", "Adele"]);
    }

    #[test]
    fn builder_fills_in_default_clients() {
        let catalog_only = ConfigBuilder::new()
            .catalog(Arc::new(FakeCatalog::default()))
            .build();
        assert!(catalog_only.is_ok());

        let calls = CallLog::default();
        let credentials_only = ConfigBuilder::new()
            .credentials(Arc::new(FakeCredentials { calls, fail: false }))
            .build();
        assert!(credentials_only.is_ok());

        assert!(ConfigBuilder::default().build().is_ok());
    }

    #[tokio::test]
    async fn default_credentials_still_validate_first() {
        let catalog = FakeCatalog::default();
        let log = catalog.calls.clone();
        let recommender = Recommender::new(
            ConfigBuilder::new()
                .catalog(Arc::new(catalog))
                .build()
                .unwrap(),
        );

        let err = recommender
            .get_recommendations("Queen", "", "Adele")
            .await
            .unwrap_err();
        assert!(matches!(err, RecommendationError::Validation(_)));
        assert!(calls(&log).is_empty());
    }
}
