use async_trait::async_trait;
use log::debug;
use rspotify::Credentials;
use serde::Deserialize;

use crate::clients::{
    entities::AccessToken,
    errors::{ClientError, CredentialError},
    spotify::SpotifyConfig,
};

/// Source of bearer tokens for the catalog API.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// A fresh bearer token.
    async fn acquire_token(&self) -> Result<AccessToken, CredentialError>;
}

#[derive(Deserialize, Debug)]
struct TokenResponse {
    access_token: Option<String>,
    token_type: Option<String>,
    expires_in: Option<u64>,
}

/// Spotify client-credentials flow. Every call goes to the token endpoint;
/// nothing is cached between requests.
pub struct ClientCredentialsProvider {
    http: reqwest::Client,
    auth_url: String,
    credentials: Option<Credentials>,
}

impl ClientCredentialsProvider {
    /// Provider posting to `auth_url` with the given client.
    pub fn new(
        http: reqwest::Client,
        auth_url: impl Into<String>,
        credentials: Option<Credentials>,
    ) -> Self {
        ClientCredentialsProvider {
            http,
            auth_url: auth_url.into(),
            credentials,
        }
    }

    /// Provider using the token URL and timeout from `config`.
    pub fn from_config(
        config: &SpotifyConfig,
        credentials: Option<Credentials>,
    ) -> Result<Self, ClientError> {
        Ok(Self::new(
            config.http_client()?,
            config.auth_url.clone(),
            credentials,
        ))
    }

    /// Provider from `SPOTIFY_CLIENT_ID` / `SPOTIFY_CLIENT_SECRET` and default endpoints.
    pub fn try_default() -> Result<Self, ClientError> {
        let credentials = credentials_from_parts(
            std::env::var("SPOTIFY_CLIENT_ID").ok(),
            std::env::var("SPOTIFY_CLIENT_SECRET").ok(),
        );
        Self::from_config(&SpotifyConfig::default(), credentials)
    }
}

/// Combine an optional client id and secret. Blank values count as absent.
pub fn credentials_from_parts(id: Option<String>, secret: Option<String>) -> Option<Credentials> {
    let id = id.filter(|v| !v.trim().is_empty())?;
    let secret = secret.filter(|v| !v.trim().is_empty())?;
    Some(Credentials::new(&id, &secret))
}

#[async_trait]
impl CredentialProvider for ClientCredentialsProvider {
    async fn acquire_token(&self) -> Result<AccessToken, CredentialError> {
        let creds = self
            .credentials
            .as_ref()
            .ok_or(CredentialError::MissingCredentials)?;
        let secret = creds
            .secret
            .as_deref()
            .ok_or(CredentialError::MissingCredentials)?;

        debug!("Requesting Spotify access token from {}", self.auth_url);
        let response: TokenResponse = self
            .http
            .post(&self.auth_url)
            .basic_auth(&creds.id, Some(secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let token = response
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                ClientError::UnexpectedResponse("token response has no access_token".into())
            })?;
        debug!(
            "Obtained {} token, expires in {:?}s",
            response.token_type.as_deref().unwrap_or("bearer"),
            response.expires_in
        );
        Ok(AccessToken::new(token))
    }
}
