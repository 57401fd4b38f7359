use async_trait::async_trait;
use log::{debug, error, warn};
use rspotify::Credentials;
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

use crate::clients::errors::{Error, Result};

pub const DEFAULT_ACCOUNTS_URL: &str = "https://accounts.spotify.com";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
const SEARCH_LIMIT: &str = "5";

/// Bearer token for the catalog API together with the instant it stops being valid
#[derive(Debug, Clone)]
pub struct Credential {
    pub access_token: String,
    pub expires_at: Instant,
}

impl Credential {
    pub fn new(access_token: String, expires_in: Duration) -> Self {
        Credential {
            access_token,
            expires_at: Instant::now() + expires_in,
        }
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

#[derive(Deserialize, Debug)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

/// Anything able to mint a fresh catalog credential
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn fetch_token(&self) -> Result<Credential>;
}

/// OAuth2 client-credentials grant against the Spotify accounts service
pub struct ClientCredentialsFlow {
    http: reqwest::Client,
    credentials: Credentials,
    accounts_url: String,
}

impl ClientCredentialsFlow {
    pub fn new(http: reqwest::Client, credentials: Credentials, accounts_url: String) -> Self {
        ClientCredentialsFlow {
            http,
            credentials,
            accounts_url,
        }
    }
}

#[async_trait]
impl TokenSource for ClientCredentialsFlow {
    async fn fetch_token(&self) -> Result<Credential> {
        let secret = self.credentials.secret.as_deref().ok_or_else(|| {
            Error::ConfigurationError(
                "Spotify client secret is required for the client-credentials grant".into(),
            )
        })?;

        let response = self
            .http
            .post(format!("{}/api/token", self.accounts_url))
            .basic_auth(&self.credentials.id, Some(secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::AuthRefreshError(format!("{status}: {body}")));
        }

        let token: TokenResponse = response.json().await?;
        Ok(Credential::new(
            token.access_token,
            Duration::from_secs(token.expires_in),
        ))
    }
}

// Process-wide holder of the catalog credential. A refresh only happens when the
// token is missing or expired, and the lock is held while refreshing so that
// concurrent callers wait for a single round trip.
pub struct CredentialCache {
    source: Box<dyn TokenSource>,
    current: Mutex<Option<Credential>>,
}

impl CredentialCache {
    pub fn new(source: Box<dyn TokenSource>) -> Self {
        CredentialCache {
            source,
            current: Mutex::new(None),
        }
    }

    /// Returns the current bearer token, refreshing it first when absent or expired.
    ///
    /// A failed refresh keeps whatever was cached before, so the caller may get a
    /// stale token or nothing at all and the dependent request fails upstream.
    pub async fn get_token(&self) -> Option<String> {
        let mut current = self.current.lock().await;
        let valid = current.as_ref().is_some_and(|c| !c.is_expired());
        if !valid {
            self.refresh_locked(&mut current).await;
        }
        current.as_ref().map(|c| c.access_token.clone())
    }

    /// Unconditionally asks the token source for a new credential.
    pub async fn refresh(&self) -> bool {
        let mut current = self.current.lock().await;
        self.refresh_locked(&mut current).await
    }

    async fn refresh_locked(&self, slot: &mut Option<Credential>) -> bool {
        match self.source.fetch_token().await {
            Ok(credential) => {
                debug!(
                    "Refreshed Spotify token, valid for {:?}",
                    credential.expires_at.saturating_duration_since(Instant::now())
                );
                *slot = Some(credential);
                true
            }
            Err(e) => {
                error!("Failed to get Spotify token: {e}");
                false
            }
        }
    }
}

/// Track search as seen by the HTTP facade
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Raw catalog payload, passed through to clients untouched
    async fn search_tracks(&self, query: &str) -> Result<serde_json::Value>;
}

pub struct SpotifyClient {
    http: reqwest::Client,
    api_url: String,
    pub credentials: CredentialCache,
}

impl SpotifyClient {
    pub fn new(http: reqwest::Client, api_url: String, credentials: CredentialCache) -> Self {
        SpotifyClient {
            http,
            api_url,
            credentials,
        }
    }

    /// Client configured through `env`, which maps variable names to values.
    ///
    /// Without client credentials every token refresh fails, so searches go out
    /// unauthenticated and fail upstream instead of keeping the process from starting.
    pub fn from_env_with(http: reqwest::Client, env: impl Fn(&str) -> Option<String>) -> Self {
        let accounts_url =
            env("SPOTIFY_ACCOUNTS_URL").unwrap_or_else(|| DEFAULT_ACCOUNTS_URL.to_string());
        let api_url = env("SPOTIFY_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let source: Box<dyn TokenSource> = match credentials_from(&env) {
            Some(credentials) => Box::new(ClientCredentialsFlow::new(
                http.clone(),
                credentials,
                accounts_url,
            )),
            None => {
                warn!("{MISSING_CREDENTIALS}, catalog searches will fail");
                Box::new(MissingCredentials)
            }
        };
        Self::new(http, api_url, CredentialCache::new(source))
    }

    // Create a SpotifyClient from environment variables or raise a configuration error
    pub fn try_default(http: reqwest::Client) -> Result<Self> {
        let env = |name: &str| std::env::var(name).ok();
        if credentials_from(env).is_none() {
            return Err(Error::ConfigurationError(MISSING_CREDENTIALS.into()));
        }
        Ok(Self::from_env_with(http, env))
    }
}

const MISSING_CREDENTIALS: &str =
    "Missing Spotify credentials. Set SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET";

/// Client id and secret from `SPOTIFY_CLIENT_ID` / `SPOTIFY_CLIENT_SECRET`, or
/// rspotify's own `RSPOTIFY_CLIENT_ID` / `RSPOTIFY_CLIENT_SECRET`
pub fn credentials_from(env: impl Fn(&str) -> Option<String>) -> Option<Credentials> {
    [
        ("SPOTIFY_CLIENT_ID", "SPOTIFY_CLIENT_SECRET"),
        ("RSPOTIFY_CLIENT_ID", "RSPOTIFY_CLIENT_SECRET"),
    ]
    .into_iter()
    .find_map(|(id, secret)| Some(Credentials::new(&env(id)?, &env(secret)?)))
}

// Token source used when no client credentials are configured
struct MissingCredentials;

#[async_trait]
impl TokenSource for MissingCredentials {
    async fn fetch_token(&self) -> Result<Credential> {
        Err(Error::AuthRefreshError(
            "no Spotify client credentials configured".into(),
        ))
    }
}

#[async_trait]
impl Catalog for SpotifyClient {
    async fn search_tracks(&self, query: &str) -> Result<serde_json::Value> {
        let token = self.credentials.get_token().await;

        let mut request = self.http.get(format!("{}/search", self.api_url)).query(&[
            ("q", query),
            ("type", "track"),
            ("limit", SEARCH_LIMIT),
        ]);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::UnexpectedStatus {
                service: "spotify",
                status,
            });
        }
        debug!("Spotify search for {query:?} answered {status}");
        Ok(response.json().await?)
    }
}
