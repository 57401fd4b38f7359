use std::sync::Arc;

use log::{info, warn};

use crate::clients::{
    Catalog, ClassifierClient, GeniusClient, Grader, LyricsOvhClient, LyricsResolver,
    SpotifyClient,
    errors::Result,
};

/// The upstream collaborators the HTTP facade delegates to
#[derive(Clone)]
pub struct Config {
    pub catalog: Arc<dyn Catalog>,
    pub lyrics: Arc<LyricsResolver>,
    pub grader: Arc<dyn Grader>,
}

/// Builds a [`Config`], falling back to environment-configured clients for
/// anything not set explicitly.
#[derive(Default)]
pub struct ConfigBuilder {
    http: Option<reqwest::Client>,
    catalog: Option<Arc<dyn Catalog>>,
    lyrics: Option<LyricsResolver>,
    grader: Option<Arc<dyn Grader>>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn http(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    #[must_use]
    pub fn catalog(mut self, catalog: Arc<dyn Catalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    #[must_use]
    pub fn lyrics(mut self, lyrics: LyricsResolver) -> Self {
        self.lyrics = Some(lyrics);
        self
    }

    #[must_use]
    pub fn grader(mut self, grader: Arc<dyn Grader>) -> Self {
        self.grader = Some(grader);
        self
    }

    pub async fn build(self) -> Result<Config> {
        Ok(self.build_from(|name| std::env::var(name).ok()).await)
    }

    // Missing credentials degrade the affected client instead of failing startup
    async fn build_from(self, env: impl Fn(&str) -> Option<String>) -> Config {
        let http = self.http.unwrap_or_default();

        let catalog = match self.catalog {
            Some(c) => c,
            None => {
                let spotify = SpotifyClient::from_env_with(http.clone(), &env);
                // Warm the token up front; a failure here only means the first search refreshes again
                if spotify.credentials.refresh().await {
                    info!("Obtained Spotify access token");
                } else {
                    warn!("Starting without a Spotify access token");
                }
                Arc::new(spotify)
            }
        };
        let lyrics = match self.lyrics {
            Some(l) => l,
            None => resolver_with(&http, env("GENIUS_TOKEN")),
        };
        info!("Lyrics sources: {}", lyrics.source_names().join(", "));
        let grader = match self.grader {
            Some(g) => g,
            None => Arc::new(ClassifierClient::try_default(http)),
        };

        Config {
            catalog,
            lyrics: Arc::new(lyrics),
            grader,
        }
    }
}

/// Genius first, lyrics.ovh as the fallback
pub fn default_resolver(http: &reqwest::Client) -> LyricsResolver {
    resolver_with(http, std::env::var("GENIUS_TOKEN").ok())
}

/// The default chain for an explicit Genius token. Without one only lyrics.ovh is asked.
pub fn resolver_with(http: &reqwest::Client, genius_token: Option<String>) -> LyricsResolver {
    let mut resolver = LyricsResolver::default();
    match genius_token {
        Some(token) => {
            let genius = GeniusClient::with_token(http.clone(), token);
            resolver = resolver.with_source(Arc::new(genius));
        }
        None => warn!("GENIUS_TOKEN is not set, skipping Genius lyrics"),
    }
    resolver.with_source(Arc::new(LyricsOvhClient::try_default(http.clone())))
}
