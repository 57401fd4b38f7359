use async_trait::async_trait;
use log::debug;
use scraper::{Html, Node, Selector};
use serde::Deserialize;

use crate::clients::{
    errors::{Error, Result},
    lyrics::LyricsSource,
};

pub const DEFAULT_API_URL: &str = "https://api.genius.com";
const LYRICS_CONTAINER: &str = r#"div[data-lyrics-container="true"]"#;

#[derive(Deserialize, Debug)]
struct SongResult {
    url: String,
}

#[derive(Deserialize, Debug)]
struct Hit {
    result: SongResult,
}

#[derive(Deserialize, Debug)]
struct Hits {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Deserialize, Debug)]
struct SearchResponse {
    response: Hits,
}

/// Scrape-based lyrics source: Genius API search followed by an HTML page fetch.
pub struct GeniusClient {
    http: reqwest::Client,
    api_url: String,
    token: String,
}

impl GeniusClient {
    pub fn new(http: reqwest::Client, api_url: String, token: String) -> Self {
        GeniusClient {
            http,
            api_url,
            token,
        }
    }

    /// Client for the configured API base (`GENIUS_API_URL`) with an explicit token
    pub fn with_token(http: reqwest::Client, token: String) -> Self {
        let api_url =
            std::env::var("GENIUS_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self::new(http, api_url, token)
    }

    // URL of the first search hit, if any
    async fn search(&self, artist: &str, title: &str) -> Result<Option<String>> {
        let query = format!("{artist} {title}");
        let response = self
            .http
            .get(format!("{}/search", self.api_url))
            .query(&[("q", query.as_str())])
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::UnexpectedStatus {
                service: "genius",
                status,
            });
        }
        let body: SearchResponse = response.json().await?;
        Ok(body.response.hits.into_iter().next().map(|h| h.result.url))
    }

    async fn fetch_page(&self, url: &str) -> Result<String> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::UnexpectedStatus {
                service: "genius",
                status,
            });
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl LyricsSource for GeniusClient {
    fn name(&self) -> &'static str {
        "genius"
    }

    async fn fetch(&self, artist: &str, title: &str) -> Result<Option<String>> {
        let Some(url) = self.search(artist, title).await? else {
            debug!("Genius search returned no hits for {artist} - {title}");
            return Ok(None);
        };
        debug!("Fetching Genius lyrics page {url}");
        let html = self.fetch_page(&url).await?;
        extract_lyrics(&html)
    }
}

/// Pulls the lyrics text out of a Genius song page.
///
/// Every lyrics container contributes its text followed by a newline, `<br>`
/// tags become line breaks, and the whole result is trimmed. A page without any
/// container, or with only whitespace in it, yields `None`.
pub fn extract_lyrics(html: &str) -> Result<Option<String>> {
    let selector = Selector::parse(LYRICS_CONTAINER)
        .map_err(|e| Error::ParseError(format!("Invalid CSS selector {LYRICS_CONTAINER}: {e:?}")))?;
    let document = Html::parse_document(html);

    let mut lyrics = String::new();
    for container in document.select(&selector) {
        for node in container.descendants() {
            match node.value() {
                Node::Text(text) => lyrics.push_str(text),
                Node::Element(element) if element.name() == "br" => lyrics.push('\n'),
                _ => {}
            }
        }
        lyrics.push('\n');
    }

    let lyrics = lyrics.trim();
    Ok((!lyrics.is_empty()).then(|| lyrics.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use axum::{
        Json, Router,
        extract::{Query, State},
        http::{HeaderMap, StatusCode},
        response::Html,
        routing::get,
    };
    use serde_json::{Value, json};

    use crate::clients::test_server;

    #[test]
    fn extracts_text_from_lyrics_containers() {
        let html = r#"
            <html><body>
              <div class="Header">Queen - Bohemian Rhapsody</div>
              <div data-lyrics-container="true">Is this the real life?<br>Is this just fantasy?</div>
              <div data-lyrics-container="true"><a href="/annotation"><span>Caught in a landslide</span></a><br/>No escape from reality</div>
            </body></html>
        "#;

        let lyrics = extract_lyrics(html).unwrap().unwrap();
        assert_eq!(
            lyrics,
            "Is this the real life?\nIs this just fantasy?\nCaught in a landslide\nNo escape from reality"
        );
    }

    #[test]
    fn page_without_container_has_no_lyrics() {
        let html = "<html><body><div class=\"lyrics\">Not here</div></body></html>";
        assert_eq!(extract_lyrics(html).unwrap(), None);
    }

    #[test]
    fn blank_container_has_no_lyrics() {
        let html = r#"<div data-lyrics-container="true">   <br>  </div>"#;
        assert_eq!(extract_lyrics(html).unwrap(), None);
    }

    #[test]
    fn containers_marked_false_are_ignored() {
        let html = r#"<div data-lyrics-container="false">Ad copy</div><div data-lyrics-container="true">Open your eyes</div>"#;
        assert_eq!(extract_lyrics(html).unwrap().as_deref(), Some("Open your eyes"));
    }

    #[test]
    fn search_payload_takes_first_hit() {
        let body: SearchResponse = serde_json::from_value(serde_json::json!({
            "meta": {"status": 200},
            "response": {"hits": [
                {"type": "song", "result": {"url": "https://genius.com/Queen-bohemian-rhapsody-lyrics"}},
                {"type": "song", "result": {"url": "https://genius.com/Panic-at-the-disco-bohemian-rhapsody-lyrics"}}
            ]}
        }))
        .unwrap();
        let first = body.response.hits.into_iter().next().map(|h| h.result.url);
        assert_eq!(
            first.as_deref(),
            Some("https://genius.com/Queen-bohemian-rhapsody-lyrics")
        );
    }

    const SONG_PAGE: &str = r#"
        <html><body>
          <div data-lyrics-container="true">Is this the real life?<br>Is this just fantasy?</div>
        </body></html>
    "#;

    async fn search_hits(
        State(base): State<String>,
        headers: HeaderMap,
        Query(params): Query<HashMap<String, String>>,
    ) -> (StatusCode, Json<Value>) {
        let authorized = headers
            .get("authorization")
            .is_some_and(|v| v.as_bytes() == b"Bearer genius-token");
        if !authorized {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({"meta": {"status": 401}})),
            );
        }
        let hits = if params.get("q").map(String::as_str) == Some("Queen Bohemian Rhapsody") {
            json!([{"type": "song", "result": {"url": format!("{base}/Queen-bohemian-rhapsody-lyrics")}}])
        } else {
            json!([])
        };
        (
            StatusCode::OK,
            Json(json!({"meta": {"status": 200}, "response": {"hits": hits}})),
        )
    }

    async fn genius_stub() -> String {
        test_server::spawn(|base| {
            Router::new()
                .route("/search", get(search_hits))
                .route(
                    "/Queen-bohemian-rhapsody-lyrics",
                    get(|| async { Html(SONG_PAGE) }),
                )
                .with_state(base)
        })
        .await
    }

    #[tokio::test]
    async fn fetch_follows_first_hit_to_the_song_page() {
        let base = genius_stub().await;
        let client = GeniusClient::new(reqwest::Client::new(), base, "genius-token".into());

        let lyrics = client.fetch("Queen", "Bohemian Rhapsody").await.unwrap();
        assert_eq!(
            lyrics.as_deref(),
            Some("Is this the real life?\nIs this just fantasy?")
        );
    }

    #[tokio::test]
    async fn fetch_without_hits_finds_nothing() {
        let base = genius_stub().await;
        let client = GeniusClient::new(reqwest::Client::new(), base, "genius-token".into());

        assert_eq!(client.fetch("Nobody", "Nothing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn rejected_token_is_an_upstream_error() {
        let base = genius_stub().await;
        let client = GeniusClient::new(reqwest::Client::new(), base, "expired".into());

        match client.fetch("Queen", "Bohemian Rhapsody").await {
            Err(Error::UnexpectedStatus { service, status }) => {
                assert_eq!(service, "genius");
                assert_eq!(status, StatusCode::UNAUTHORIZED);
            }
            other => panic!("expected a 401 from the search, got {other:?}"),
        }
    }
}
