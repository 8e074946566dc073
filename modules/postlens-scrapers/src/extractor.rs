use async_trait::async_trait;

use postlens_common::{PostRecord, ProfileRecord, ScrapeError};

/// Capability interface implemented by every platform extractor.
///
/// Extractors are stateless and best-effort: a call either produces a fully
/// assembled record (with per-field defaults filled in where the page gave
/// nothing) or a single operation-level error. Nothing is retried.
#[async_trait]
pub trait PostScraper: Send + Sync {
    async fn scrape_post(&self, url: &str) -> Result<PostRecord, ScrapeError>;
    async fn scrape_profile(&self, url: &str) -> Result<ProfileRecord, ScrapeError>;
    fn name(&self) -> &str;
}
