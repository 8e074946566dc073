use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChromeError>;

#[derive(Debug, Error)]
pub enum ChromeError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Only http/https URLs are allowed, got: {0}")]
    UnsupportedScheme(String),

    #[error("Failed to launch Chrome: {0}")]
    Launch(String),

    #[error("Chrome exited with an error: {0}")]
    Render(String),

    #[error("Navigation timed out after {0}s")]
    Timeout(u64),
}
