use thiserror::Error;

/// Operation-level extraction failures. Field-level failures never reach
/// this type: they are absorbed into per-field defaults by the extractors.
///
/// The `Display` text of each variant is the exact `error` string callers
/// see on the wire.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("{platform} scraping failed: {message}")]
    Post { platform: String, message: String },

    #[error("{platform} profile scraping failed: {message}")]
    Profile { platform: String, message: String },

    #[error("Invalid {platform} data structure")]
    InvalidStructure { platform: String },

    #[error("Profile scraping not supported for generic URLs")]
    UnsupportedProfile,

    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),
}

impl ScrapeError {
    pub fn post(platform: impl std::fmt::Display, message: impl std::fmt::Display) -> Self {
        ScrapeError::Post {
            platform: platform.to_string(),
            message: message.to_string(),
        }
    }

    pub fn profile(platform: impl std::fmt::Display, message: impl std::fmt::Display) -> Self {
        ScrapeError::Profile {
            platform: platform.to_string(),
            message: message.to_string(),
        }
    }

    pub fn invalid_structure(platform: impl std::fmt::Display) -> Self {
        ScrapeError::InvalidStructure {
            platform: platform.to_string(),
        }
    }
}
