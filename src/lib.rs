//! Lyricgrade - search a song, fetch its lyrics and grade them
//!
//! This library provides the upstream clients (Spotify catalog search, Genius
//! and lyrics.ovh lyrics, the hosted classifier), the HTTP facade in front of
//! them and a search session that drives the facade.

/// HTTP facade: routes, handlers and error mapping
pub mod api;
/// Wiring of the upstream clients
pub mod app;
/// Client modules for interacting with external services
pub mod clients;
/// Debounced search session over the facade
pub mod session;
