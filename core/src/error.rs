use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchServiceError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Search service is no longer running")]
    ServiceClosed,
}

pub type Result<T> = std::result::Result<T, SearchServiceError>;
