use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};

use crate::clients::errors::Result;

/// A provider that can look lyrics up by artist and title.
///
/// `Ok(None)` means the provider answered but had nothing; an error means the
/// lookup itself failed. The resolver treats both the same way.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LyricsSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch(&self, artist: &str, title: &str) -> Result<Option<String>>;
}

/// Ordered chain of lyrics sources, tried one after another until one of them
/// yields non-empty text.
#[derive(Clone, Default)]
pub struct LyricsResolver {
    sources: Vec<Arc<dyn LyricsSource>>,
}

impl LyricsResolver {
    pub fn new(sources: Vec<Arc<dyn LyricsSource>>) -> Self {
        LyricsResolver { sources }
    }

    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn LyricsSource>) -> Self {
        self.sources.push(source);
        self
    }

    /// Source names in lookup order
    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    pub async fn resolve(&self, artist: &str, title: &str) -> Option<String> {
        for source in &self.sources {
            match source.fetch(artist, title).await {
                Ok(Some(lyrics)) if !lyrics.trim().is_empty() => {
                    info!("Found lyrics for {artist} - {title} on {}", source.name());
                    return Some(lyrics);
                }
                Ok(_) => debug!("{} has no lyrics for {artist} - {title}", source.name()),
                Err(e) => warn!(
                    "Error getting lyrics from {} for {artist} - {title}: {e}",
                    source.name()
                ),
            }
        }
        None
    }
}
