pub mod browser;
pub mod dispatcher;
mod dom;
pub mod extractor;
pub mod field;
pub mod generic;
pub mod reddit;
pub mod rules;

pub use browser::BrowserExtractor;
pub use dispatcher::{Dispatcher, Operation, ScrapeOutput};
pub use extractor::PostScraper;
pub use generic::GenericExtractor;
pub use reddit::RedditExtractor;

/// Fixed user-agent presented by every HTTP-fetching extractor.
pub(crate) const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
