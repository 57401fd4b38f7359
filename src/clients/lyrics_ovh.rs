use async_trait::async_trait;
use log::debug;
use serde::Deserialize;

use crate::clients::{
    errors::{Error, Result},
    lyrics::LyricsSource,
};

pub const DEFAULT_API_URL: &str = "https://api.lyrics.ovh";

#[derive(Deserialize, Debug)]
struct LyricsResponse {
    lyrics: Option<String>,
}

/// Structured fallback source, a plain REST lookup by artist and title
pub struct LyricsOvhClient {
    http: reqwest::Client,
    api_url: String,
}

impl LyricsOvhClient {
    pub fn new(http: reqwest::Client, api_url: String) -> Self {
        LyricsOvhClient { http, api_url }
    }

    pub fn try_default(http: reqwest::Client) -> Self {
        let api_url =
            std::env::var("LYRICS_OVH_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self::new(http, api_url)
    }

    fn lookup_url(&self, artist: &str, title: &str) -> String {
        format!(
            "{}/v1/{}/{}",
            self.api_url,
            urlencoding::encode(artist),
            urlencoding::encode(title)
        )
    }
}

#[async_trait]
impl LyricsSource for LyricsOvhClient {
    fn name(&self) -> &'static str {
        "lyrics.ovh"
    }

    async fn fetch(&self, artist: &str, title: &str) -> Result<Option<String>> {
        let response = self.http.get(self.lookup_url(artist, title)).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            debug!("lyrics.ovh has no entry for {artist} - {title}");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(Error::UnexpectedStatus {
                service: "lyrics.ovh",
                status,
            });
        }

        let body: LyricsResponse = response.json().await?;
        Ok(body.lyrics.filter(|l| !l.trim().is_empty()))
    }
}
