use thiserror::Error;

/// Failure of a single outbound call to the catalog API.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Connection, timeout, status or decoding failure
    #[error("Spotify request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Well-formed answer missing something we need
    #[error("Spotify API unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Client could not be set up
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

/// Failure to obtain a bearer token.
#[derive(Error, Debug)]
pub enum CredentialError {
    /// Client id or secret not configured
    #[error("Missing Spotify client credentials. Set SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET")]
    MissingCredentials,

    /// The call to the token endpoint failed
    #[error("Token request failed: {0}")]
    TokenRequest(#[from] ClientError),
}

impl From<reqwest::Error> for CredentialError {
    fn from(err: reqwest::Error) -> Self {
        CredentialError::TokenRequest(ClientError::Transport(err))
    }
}

/// Result alias for catalog calls
pub type Result<T, E = ClientError> = std::result::Result<T, E>;
