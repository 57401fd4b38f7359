/// Hosted lyrics classifier
pub mod classifier;
/// Data entities for tracks, albums and artists
pub mod entities;
/// Error types and result aliases
pub mod errors;
/// Genius search + page scraping
pub mod genius;
/// Lyrics source trait and fallback resolver
pub mod lyrics;
/// lyrics.ovh REST client
pub mod lyrics_ovh;
/// Spotify catalog search and token cache
pub mod spotify;

pub use classifier::{ClassifierClient, Grader};
pub use genius::GeniusClient;
pub use lyrics::{LyricsResolver, LyricsSource};
pub use lyrics_ovh::LyricsOvhClient;
pub use spotify::{Catalog, CredentialCache, SpotifyClient};

#[cfg(test)]
pub(crate) mod test_server;
