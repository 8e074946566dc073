use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ScrapeError;

/// The platforms with a dedicated extractor. URLs that match none of these
/// fall through to the generic extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Instagram,
    Twitter,
    LinkedIn,
    Reddit,
}

impl Platform {
    /// Lowercase identifier used in request payloads and logging.
    pub fn key(&self) -> &'static str {
        match self {
            Platform::Instagram => "instagram",
            Platform::Twitter => "twitter",
            Platform::LinkedIn => "linkedin",
            Platform::Reddit => "reddit",
        }
    }

    /// Detect the platform from a URL by host pattern. Returns `None` for
    /// URLs that belong to no supported platform.
    pub fn detect(url: &str) -> Option<Platform> {
        let url = url.to_lowercase();
        if url.contains("instagram.com") || url.contains("instagr.am") {
            Some(Platform::Instagram)
        } else if url.contains("twitter.com") || url.contains("x.com") {
            Some(Platform::Twitter)
        } else if url.contains("linkedin.com") {
            Some(Platform::LinkedIn)
        } else if url.contains("reddit.com") {
            Some(Platform::Reddit)
        } else {
            None
        }
    }
}

impl FromStr for Platform {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "instagram" => Ok(Platform::Instagram),
            "twitter" => Ok(Platform::Twitter),
            "linkedin" => Ok(Platform::LinkedIn),
            "reddit" => Ok(Platform::Reddit),
            _ => Err(ScrapeError::UnsupportedPlatform(s.to_string())),
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Instagram => write!(f, "Instagram"),
            Platform::Twitter => write!(f, "Twitter"),
            Platform::LinkedIn => write!(f, "LinkedIn"),
            Platform::Reddit => write!(f, "Reddit"),
        }
    }
}

/// One normalized post, tweet, or forum entry.
///
/// The `Option` fields are forum-only extras and stay off the wire for the
/// other platforms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostRecord {
    pub url: String,
    pub post_text: String,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subreddit: Option<String>,
    pub comments: Vec<CommentRecord>,
    pub likes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upvotes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub downvotes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upvote_ratio: Option<f64>,
    pub shares: u64,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub awards: Option<u64>,
    pub post_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRecord {
    pub user: String,
    pub text: String,
    pub likes: u64,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replies_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub awards: Option<u64>,
}

/// A scraped profile page: counts plus up to 10 of the profile's posts.
/// Only posts whose sub-fetch succeeded are included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub username: String,
    pub followers: u64,
    pub following: u64,
    pub posts_count: u64,
    pub posts: Vec<PostRecord>,
}

/// Current time as an ISO-8601 string, the shared fallback for every
/// unresolved timestamp field.
pub fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_parse_is_case_insensitive() {
        assert_eq!("Instagram".parse::<Platform>().unwrap(), Platform::Instagram);
        assert_eq!("REDDIT".parse::<Platform>().unwrap(), Platform::Reddit);
        assert_eq!("linkedin".parse::<Platform>().unwrap(), Platform::LinkedIn);
    }

    #[test]
    fn unknown_platform_is_rejected_with_message() {
        let err = "myspace".parse::<Platform>().unwrap_err();
        assert_eq!(err.to_string(), "Unsupported platform: myspace");
    }

    #[test]
    fn detect_maps_known_hosts() {
        assert_eq!(
            Platform::detect("https://www.instagram.com/p/abc/"),
            Some(Platform::Instagram)
        );
        assert_eq!(
            Platform::detect("https://X.com/user/status/1"),
            Some(Platform::Twitter)
        );
        assert_eq!(
            Platform::detect("https://www.reddit.com/r/rust/comments/1/"),
            Some(Platform::Reddit)
        );
        assert_eq!(Platform::detect("https://example.com/blog/post"), None);
    }

    #[test]
    fn forum_extras_stay_off_the_wire_for_other_platforms() {
        let record = PostRecord {
            url: "https://twitter.com/a/status/1".into(),
            post_text: "hello".into(),
            author: "a".into(),
            subreddit: None,
            comments: vec![],
            likes: 3,
            upvotes: None,
            downvotes: None,
            upvote_ratio: None,
            shares: 1,
            timestamp: "2024-01-01T00:00:00+00:00".into(),
            awards: None,
            post_type: "tweet".into(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("subreddit").is_none());
        assert!(json.get("upvote_ratio").is_none());
        assert_eq!(json["post_type"], "tweet");
    }
}
