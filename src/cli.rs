use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::Parser;
use log::{error, info};
use songseed::{
    clients::{
        ClientCredentialsProvider, SpotifyClient, SpotifyConfig,
        auth::credentials_from_parts,
        errors::{ClientError, Result},
        spotify::{DEFAULT_API_BASE_URL, DEFAULT_AUTH_URL},
    },
    recommender::{ConfigBuilder, Recommender},
    server::{self, AppState},
};
use tokio::net::TcpListener;

#[derive(Parser, Debug)]
#[command(name = "songseed")]
#[command(version, about = "Song recommendations seeded by three artists", long_about = None)]
pub struct Cli {
    /// Address to listen on
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Directory holding the front-end index.html
    #[arg(long, env = "PUBLIC_DIR", default_value = "public")]
    public_dir: PathBuf,

    #[arg(long, env = "SPOTIFY_CLIENT_ID", hide_env_values = true)]
    client_id: Option<String>,

    #[arg(long, env = "SPOTIFY_CLIENT_SECRET", hide_env_values = true)]
    client_secret: Option<String>,

    #[arg(long, env = "SPOTIFY_API_BASE_URL", default_value = DEFAULT_API_BASE_URL)]
    api_base_url: String,

    #[arg(long, env = "SPOTIFY_AUTH_URL", default_value = DEFAULT_AUTH_URL)]
    auth_url: String,

    /// Timeout for each call to Spotify, in seconds
    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value_t = 10)]
    timeout_secs: u64,

    /// Refuse to start when client credentials are missing
    #[arg(long, env = "REQUIRE_CREDENTIALS")]
    require_credentials: bool,
}

impl Cli {
    fn spotify_config(&self) -> SpotifyConfig {
        SpotifyConfig {
            api_base_url: self.api_base_url.clone(),
            auth_url: self.auth_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    fn build_recommender(&self) -> Result<Recommender> {
        let credentials =
            credentials_from_parts(self.client_id.clone(), self.client_secret.clone());
        if credentials.is_none() {
            if self.require_credentials {
                return Err(ClientError::ConfigurationError(
                    "Missing SPOTIFY_CLIENT_ID or SPOTIFY_CLIENT_SECRET".into(),
                ));
            }
            // Keep serving; token requests will fail until credentials are set
            error!("Missing one or more critical Spotify environment variables. Check .env file");
        }

        let spotify_config = self.spotify_config();
        let config = ConfigBuilder::new()
            .credentials(Arc::new(ClientCredentialsProvider::from_config(
                &spotify_config,
                credentials,
            )?))
            .catalog(Arc::new(SpotifyClient::from_config(&spotify_config)?))
            .build()?;
        Ok(Recommender::new(config))
    }
}

pub async fn run() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    info!("Building recommender ...");
    let recommender = cli.build_recommender()?;
    let state = AppState::new(recommender, cli.public_dir.clone());

    let listener = TcpListener::bind((cli.host.as_str(), cli.port)).await?;
    info!("Listening at {}", listener.local_addr()?);
    server::serve(listener, state).await?;
    Ok(())
}
