use std::num::NonZeroUsize;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use songsearch_utils_image::ScaleOptions;

use crate::error::Result;
use crate::error::SearchServiceError;

pub const DEFAULT_DEBOUNCE_MS: u64 = 200;
pub const DEFAULT_MAX_RESULTS_PER_EMISSION: usize = 1000;
pub const DEFAULT_THUMBNAIL_SIZE: u32 = songsearch_utils_image::DEFAULT_THUMBNAIL_SIZE;
pub const DEFAULT_THUMBNAIL_CACHE_CAPACITY: usize = 512;

/// Configuration for the search service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Quiet period before a scheduled search reaches the backend
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Results kept from a single backend reply
    #[serde(default = "default_max_results_per_emission")]
    pub max_results_per_emission: usize,

    /// Edge length of the square thumbnails
    #[serde(default = "default_thumbnail_size")]
    pub thumbnail_size: u32,

    /// Number of thumbnails kept in memory
    #[serde(default = "default_thumbnail_cache_capacity")]
    pub thumbnail_cache_capacity: usize,

    #[serde(default = "default_true")]
    pub scale_thumbnails: bool,

    #[serde(default = "default_true")]
    pub pad_thumbnails: bool,

    /// Drop results that do not contain every query token
    #[serde(default)]
    pub client_side_filter: bool,
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

fn default_max_results_per_emission() -> usize {
    DEFAULT_MAX_RESULTS_PER_EMISSION
}

fn default_thumbnail_size() -> u32 {
    DEFAULT_THUMBNAIL_SIZE
}

fn default_thumbnail_cache_capacity() -> usize {
    DEFAULT_THUMBNAIL_CACHE_CAPACITY
}

fn default_true() -> bool {
    true
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            max_results_per_emission: default_max_results_per_emission(),
            thumbnail_size: default_thumbnail_size(),
            thumbnail_cache_capacity: default_thumbnail_cache_capacity(),
            scale_thumbnails: true,
            pad_thumbnails: true,
            client_side_filter: false,
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.debounce_ms == 0 {
            return Err(SearchServiceError::InvalidConfig(
                "debounce_ms must be > 0".to_string(),
            ));
        }
        if self.max_results_per_emission == 0 {
            return Err(SearchServiceError::InvalidConfig(
                "max_results_per_emission must be > 0".to_string(),
            ));
        }
        if self.thumbnail_size == 0 {
            return Err(SearchServiceError::InvalidConfig(
                "thumbnail_size must be > 0".to_string(),
            ));
        }
        if self.thumbnail_cache_capacity == 0 {
            return Err(SearchServiceError::InvalidConfig(
                "thumbnail_cache_capacity must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn cache_capacity(&self) -> Result<NonZeroUsize> {
        NonZeroUsize::new(self.thumbnail_cache_capacity).ok_or_else(|| {
            SearchServiceError::InvalidConfig("thumbnail_cache_capacity must be > 0".to_string())
        })
    }

    pub fn scale_options(&self) -> ScaleOptions {
        ScaleOptions {
            desired_size: self.thumbnail_size,
            scale: self.scale_thumbnails,
            pad: self.pad_thumbnails,
        }
    }
}
