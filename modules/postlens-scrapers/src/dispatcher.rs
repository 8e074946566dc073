//! Routes a scrape request to the extractor registered for its platform.
//! Holds no state beyond the extractors themselves and never retries.

use serde::Serialize;

use chrome_client::ChromeClient;
use postlens_common::{Platform, PostRecord, ProfileRecord, ScrapeError};

use crate::browser::BrowserExtractor;
use crate::extractor::PostScraper;
use crate::generic::GenericExtractor;
use crate::reddit::RedditExtractor;
use crate::rules;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Post,
    Profile,
}

/// Result of a dispatched operation, serialized as the record itself.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ScrapeOutput {
    Post(PostRecord),
    Profile(ProfileRecord),
}

pub struct Dispatcher {
    instagram: BrowserExtractor,
    twitter: BrowserExtractor,
    linkedin: BrowserExtractor,
    reddit: RedditExtractor,
    generic: GenericExtractor,
}

impl Dispatcher {
    pub fn new(chrome: ChromeClient) -> Self {
        Self {
            instagram: BrowserExtractor::new(chrome.clone(), &rules::INSTAGRAM),
            twitter: BrowserExtractor::new(chrome.clone(), &rules::TWITTER),
            linkedin: BrowserExtractor::new(chrome, &rules::LINKEDIN),
            reddit: RedditExtractor::new(),
            generic: GenericExtractor::new(),
        }
    }

    pub fn extractor(&self, platform: Platform) -> &dyn PostScraper {
        match platform {
            Platform::Instagram => &self.instagram,
            Platform::Twitter => &self.twitter,
            Platform::LinkedIn => &self.linkedin,
            Platform::Reddit => &self.reddit,
        }
    }

    /// Extractor for a URL with no explicit platform: the detected platform's
    /// extractor, or the generic fallback for anything unrecognized.
    pub fn extractor_for_url(&self, url: &str) -> &dyn PostScraper {
        match Platform::detect(url) {
            Some(platform) => self.extractor(platform),
            None => &self.generic,
        }
    }

    /// Route `operation` for an explicitly named platform. An unknown
    /// platform identifier fails here, before any extractor runs.
    pub async fn dispatch(
        &self,
        platform: &str,
        operation: Operation,
        url: &str,
    ) -> Result<ScrapeOutput, ScrapeError> {
        let platform: Platform = platform.parse()?;
        self.run(self.extractor(platform), operation, url).await
    }

    /// Route `operation` by URL detection (generic fallback included).
    pub async fn dispatch_detected(
        &self,
        operation: Operation,
        url: &str,
    ) -> Result<ScrapeOutput, ScrapeError> {
        self.run(self.extractor_for_url(url), operation, url).await
    }

    async fn run(
        &self,
        scraper: &dyn PostScraper,
        operation: Operation,
        url: &str,
    ) -> Result<ScrapeOutput, ScrapeError> {
        match operation {
            Operation::Post => Ok(ScrapeOutput::Post(scraper.scrape_post(url).await?)),
            Operation::Profile => Ok(ScrapeOutput::Profile(scraper.scrape_profile(url).await?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(ChromeClient::new("/nonexistent/chromium"))
    }

    #[tokio::test]
    async fn unknown_platform_is_rejected_before_any_extractor_runs() {
        let err = dispatcher()
            .dispatch("myspace", Operation::Post, "https://myspace.com/someone")
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::UnsupportedPlatform(_)));
        assert_eq!(err.to_string(), "Unsupported platform: myspace");
    }

    #[test]
    fn platform_names_resolve_to_their_extractors() {
        let d = dispatcher();
        assert_eq!(d.extractor(Platform::Instagram).name(), "instagram");
        assert_eq!(d.extractor(Platform::Twitter).name(), "twitter");
        assert_eq!(d.extractor(Platform::LinkedIn).name(), "linkedin");
        assert_eq!(d.extractor(Platform::Reddit).name(), "reddit");
    }

    #[test]
    fn unrecognized_urls_fall_back_to_generic() {
        let d = dispatcher();
        assert_eq!(
            d.extractor_for_url("https://news.example.com/story").name(),
            "generic"
        );
        assert_eq!(
            d.extractor_for_url("https://www.instagram.com/p/abc/").name(),
            "instagram"
        );
    }

    #[tokio::test]
    async fn malformed_url_yields_error_only_record() {
        let err = dispatcher()
            .dispatch("instagram", Operation::Post, "not a url")
            .await
            .unwrap_err();
        let json = serde_json::json!({ "error": err.to_string() });
        assert!(json["error"]
            .as_str()
            .unwrap()
            .starts_with("Instagram scraping failed:"));
        assert_eq!(json.as_object().unwrap().len(), 1);
    }
}
