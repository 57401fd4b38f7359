use serde::{Deserialize, Serialize};

use crate::clients::errors::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub height: Option<u32>,
    pub width: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub images: Vec<Image>,
}

/// A catalog track as returned by the Spotify search endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub album: Album,
    pub artists: Vec<Artist>,
    pub preview_url: Option<String>,
}

impl Track {
    /// Artist used for lyrics lookups. Spotify lists the primary artist first.
    pub fn primary_artist(&self) -> Option<&str> {
        self.artists.first().map(|a| a.name.as_str())
    }

    pub fn artist_names(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackPage {
    #[serde(default)]
    pub items: Vec<Track>,
}

/// Shape of `GET /search` bodies, both from Spotify and from the facade
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub tracks: TrackPage,
}

impl SearchResponse {
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

/// Classifier output, an ordered list of labels
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GradeResponse {
    #[serde(default)]
    pub results: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_spotify_search_payload() {
        let payload = serde_json::json!({
            "tracks": {
                "href": "https://api.spotify.com/v1/search?q=bohemian",
                "items": [{
                    "id": "4u7EnebtmKWzUH433cf5Qv",
                    "name": "Bohemian Rhapsody",
                    "popularity": 84,
                    "preview_url": null,
                    "album": {
                        "id": "6X9k3hSsvQck2OfKYdBbXr",
                        "name": "A Night At The Opera",
                        "images": [
                            {"url": "https://i.scdn.co/640", "height": 640, "width": 640},
                            {"url": "https://i.scdn.co/300", "height": 300, "width": 300},
                            {"url": "https://i.scdn.co/64", "height": 64, "width": 64}
                        ]
                    },
                    "artists": [{"id": "1dfeR4HaWDbWqFHLkxsg1d", "name": "Queen"}]
                }]
            }
        });

        let response = SearchResponse::from_value(payload).unwrap();
        let track = &response.tracks.items[0];
        assert_eq!(track.name, "Bohemian Rhapsody");
        assert_eq!(track.primary_artist(), Some("Queen"));
        assert_eq!(track.album.images.len(), 3);
        assert!(track.preview_url.is_none());
    }

    #[test]
    fn artist_names_are_comma_joined() {
        let track = Track {
            id: "1".into(),
            name: "Under Pressure".into(),
            album: Album {
                id: "a".into(),
                name: "Hot Space".into(),
                images: vec![],
            },
            artists: vec![
                Artist {
                    id: "q".into(),
                    name: "Queen".into(),
                },
                Artist {
                    id: "b".into(),
                    name: "David Bowie".into(),
                },
            ],
            preview_url: None,
        };
        assert_eq!(track.artist_names(), "Queen, David Bowie");
    }
}
