//! Search-as-you-type session over the HTTP facade.
//!
//! The session walks idle → typing → results → selected → graded. Input is
//! debounced, selecting a result replaces the input with the track name without
//! searching again, and clearing the input resets everything downstream.
//! Requests are not cancelled when newer input arrives; whichever response
//! lands last is what the session shows.

use async_trait::async_trait;
use log::{debug, warn};
use serde_json::json;
use tokio::time::{Duration, Instant};

use crate::clients::{
    entities::{GradeResponse, SearchResponse, Track},
    errors::{Error, Result},
};

/// Quiet period after the last keystroke before a search goes out
pub const DEBOUNCE: Duration = Duration::from_millis(400);
/// Shorter input clears the result list instead of searching
pub const MIN_QUERY_CHARS: usize = 3;
pub const GRADE_FAILED: &str = "Failed to grade lyrics.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Typing,
    Results,
    Selected,
    Graded,
}

/// The three facade endpoints, as seen by a session
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<Track>>;
    async fn lyrics(&self, artist: &str, title: &str) -> Result<Option<String>>;
    async fn grade(&self, lyrics: &str) -> Result<Vec<String>>;
}

/// HTTP client for a running facade
pub struct FacadeClient {
    http: reqwest::Client,
    base_url: String,
}

impl FacadeClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        FacadeClient {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn check(service: &'static str, response: &reqwest::Response) -> Result<()> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Error::UnexpectedStatus { service, status })
        }
    }
}

#[async_trait]
impl SearchBackend for FacadeClient {
    async fn search(&self, query: &str) -> Result<Vec<Track>> {
        let response = self
            .http
            .get(format!("{}/search", self.base_url))
            .query(&[("q", query)])
            .send()
            .await?;
        Self::check("search", &response)?;
        let body: SearchResponse = response.json().await?;
        Ok(body.tracks.items)
    }

    async fn lyrics(&self, artist: &str, title: &str) -> Result<Option<String>> {
        let response = self
            .http
            .get(format!("{}/lyrics", self.base_url))
            .query(&[("artist", artist), ("title", title)])
            .send()
            .await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Self::check("lyrics", &response)?;
        let body: serde_json::Value = response.json().await?;
        Ok(body["lyrics"].as_str().map(str::to_string))
    }

    async fn grade(&self, lyrics: &str) -> Result<Vec<String>> {
        let response = self
            .http
            .post(format!("{}/grade", self.base_url))
            .json(&json!({ "lyrics": lyrics }))
            .send()
            .await?;
        Self::check("grade", &response)?;
        let body: GradeResponse = response.json().await?;
        Ok(body.results)
    }
}

pub struct SearchSession<B> {
    backend: B,
    input: String,
    deadline: Option<Instant>,
    // None while nothing is displayed, Some(empty) shows "No results"
    results: Option<Vec<Track>>,
    selected: Option<Track>,
    lyrics: Option<String>,
    grades: Option<Vec<String>>,
}

impl<B: SearchBackend> SearchSession<B> {
    pub fn new(backend: B) -> Self {
        SearchSession {
            backend,
            input: String::new(),
            deadline: None,
            results: None,
            selected: None,
            lyrics: None,
            grades: None,
        }
    }

    pub fn phase(&self) -> Phase {
        if self.deadline.is_some() {
            Phase::Typing
        } else if self.grades.is_some() {
            Phase::Graded
        } else if self.selected.is_some() {
            Phase::Selected
        } else if self.results.is_some() {
            Phase::Results
        } else {
            Phase::Idle
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn results(&self) -> Option<&[Track]> {
        self.results.as_deref()
    }

    pub fn selected(&self) -> Option<&Track> {
        self.selected.as_ref()
    }

    pub fn lyrics(&self) -> Option<&str> {
        self.lyrics.as_deref()
    }

    pub fn grades(&self) -> Option<&[String]> {
        self.grades.as_deref()
    }

    /// Records a new input value and restarts the quiet period.
    ///
    /// Setting the value it already has is a no-op, which is what keeps a
    /// selection (that writes the track name into the input) from searching.
    pub fn set_input(&mut self, value: impl Into<String>) {
        let value = value.into();
        if value == self.input {
            return;
        }
        if value.is_empty() {
            self.clear();
            return;
        }
        self.input = value;
        self.deadline = Some(Instant::now() + DEBOUNCE);
    }

    /// Runs the pending search if its quiet period is over. Returns whether a
    /// request went out.
    pub async fn poll(&mut self) -> bool {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {}
            _ => return false,
        }
        self.deadline = None;

        if self.input.chars().count() < MIN_QUERY_CHARS {
            self.results = None;
            return false;
        }

        debug!("Searching for {:?}", self.input);
        match self.backend.search(&self.input).await {
            Ok(tracks) => {
                // A fresh result list replaces whatever was picked before
                self.selected = None;
                self.lyrics = None;
                self.grades = None;
                self.results = Some(tracks);
            }
            Err(e) => warn!("Error fetching song: {e}"),
        }
        true
    }

    /// Waits out the quiet period, then polls.
    pub async fn settle(&mut self) -> bool {
        if let Some(deadline) = self.deadline {
            tokio::time::sleep_until(deadline).await;
        }
        self.poll().await
    }

    /// Picks a result by position and fetches its lyrics.
    pub async fn select(&mut self, index: usize) -> Result<&Track> {
        let track = self
            .results
            .as_ref()
            .and_then(|r| r.get(index))
            .cloned()
            .ok_or_else(|| {
                Error::ValidationError(format!(
                    "No result at position {}",
                    index.saturating_add(1)
                ))
            })?;

        self.deadline = None;
        self.results = None;
        self.grades = None;
        self.input.clone_from(&track.name);

        let artist = track.primary_artist().unwrap_or_default();
        self.lyrics = match self.backend.lyrics(artist, &track.name).await {
            Ok(lyrics) => lyrics,
            Err(e) => {
                warn!("Error fetching lyrics: {e}");
                None
            }
        };

        Ok(self.selected.insert(track))
    }

    /// Grades the current lyrics. Without lyrics there is nothing to grade.
    pub async fn grade(&mut self) -> Option<&[String]> {
        let lyrics = self.lyrics.as_deref()?;
        let grades = match self.backend.grade(lyrics).await {
            Ok(grades) => grades,
            Err(e) => {
                warn!("Error grading lyrics: {e}");
                vec![GRADE_FAILED.to_string()]
            }
        };
        self.grades = Some(grades);
        self.grades.as_deref()
    }

    pub fn clear(&mut self) {
        self.input.clear();
        self.deadline = None;
        self.results = None;
        self.selected = None;
        self.lyrics = None;
        self.grades = None;
    }
}
