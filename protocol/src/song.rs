use serde::Deserialize;
use serde::Serialize;
use url::Url;

/// Which catalogue field the backend should search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    Artists,
    Albums,
    #[default]
    Songs,
}

/// Track metadata as returned by the search provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub title: String,
    pub artist: String,
    pub album: String,
    /// Identifying url of the track. Also the source of the thumbnail cache key.
    pub url: Url,
    /// Cover art location, when the provider reports one.
    #[serde(default)]
    pub art_url: Option<Url>,
}

impl Song {
    pub fn new(
        title: impl Into<String>,
        artist: impl Into<String>,
        album: impl Into<String>,
        url: Url,
    ) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            album: album.into(),
            url,
            art_url: None,
        }
    }

    pub fn with_art_url(mut self, art_url: Url) -> Self {
        self.art_url = Some(art_url);
        self
    }

    /// Where an image loader should fetch artwork from: the cover url if
    /// known, otherwise the track url itself.
    pub fn art_source(&self) -> &Url {
        self.art_url.as_ref().unwrap_or(&self.url)
    }
}

/// One search hit. `cache_key` is filled in once the result has been
/// processed and stays fixed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub metadata: Song,
    #[serde(default)]
    pub cache_key: Option<String>,
}

impl SearchResult {
    pub fn new(metadata: Song) -> Self {
        Self {
            metadata,
            cache_key: None,
        }
    }

    /// Text used for client-side token matching.
    pub fn match_text(&self) -> String {
        format!(
            "{} {} {}",
            self.metadata.title, self.metadata.artist, self.metadata.album
        )
    }
}

impl From<Song> for SearchResult {
    fn from(song: Song) -> Self {
        Self::new(song)
    }
}

/// Name and stable id of a search provider. The id doubles as the thumbnail
/// cache namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub name: String,
    pub id: String,
}

impl ProviderInfo {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }
}

/// Songs and urls of a set of results, ready to hand to a playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackSelection {
    pub songs: Vec<Song>,
    pub urls: Vec<Url>,
}

impl TrackSelection {
    /// Returns `None` for an empty selection.
    pub fn from_results(results: &[SearchResult]) -> Option<Self> {
        if results.is_empty() {
            return None;
        }
        let songs: Vec<Song> = results.iter().map(|r| r.metadata.clone()).collect();
        let urls = songs.iter().map(|s| s.url.clone()).collect();
        Some(Self { songs, urls })
    }
}
