use std::fmt;

use serde::{Deserialize, Serialize};

/// Bearer token handed out by the identity endpoint. Lives for one request.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a raw token string.
    pub fn new(value: impl Into<String>) -> Self {
        AccessToken(value.into())
    }

    /// Raw value for the `Authorization` header.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Never print the secret itself
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Spotify artist identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtistId(String);

impl ArtistId {
    /// Wrap a raw id.
    pub fn new(value: impl Into<String>) -> Self {
        ArtistId(value.into())
    }

    /// Raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One artist search hit
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Artist {
    /// Catalog id
    pub id: ArtistId,
    /// Display name
    #[serde(default)]
    pub name: String,
}

/// A recommended song. Kept as raw JSON and handed back to callers untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Track(pub serde_json::Value);

/// The three seed artists, in the order the caller named them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedArtists(pub [ArtistId; 3]);

impl SeedArtists {
    /// Comma-joined ids for the `seed_artists` query parameter.
    pub fn to_query_value(&self) -> String {
        self.0
            .iter()
            .map(ArtistId::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}
