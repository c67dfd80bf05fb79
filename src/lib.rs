//! Songseed - song recommendations seeded by three artists
//!
//! This library resolves three artist names against the Spotify catalog and
//! asks Spotify for tracks recommended from those seeds, exposed over HTTP.

/// Client modules for interacting with the Spotify Web API
pub mod clients;
/// Artist resolution and recommendation lookup
pub mod recommender;
/// HTTP routes and error translation
pub mod server;
