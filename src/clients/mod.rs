/// Client-credentials token acquisition
pub mod auth;
/// Data entities for artists, tracks and tokens
pub mod entities;
/// Error types and result aliases
pub mod errors;
/// Spotify catalog API client
pub mod spotify;

pub use auth::{ClientCredentialsProvider, CredentialProvider};
pub use spotify::{CatalogApi, SpotifyClient, SpotifyConfig};
