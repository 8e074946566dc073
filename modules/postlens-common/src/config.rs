use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Web server
    pub host: String,
    pub port: u16,

    // Scraping
    pub chrome_bin: String,
}

impl Config {
    /// Load configuration from environment variables. Every variable has a
    /// default; a malformed port panics with a clear message.
    pub fn from_env() -> Self {
        Self {
            host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("API_PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .expect("API_PORT must be a number"),
            chrome_bin: env::var("CHROME_BIN").unwrap_or_else(|_| "chromium".to_string()),
        }
    }
}
