//! Forum extractor backed by the public listing JSON endpoints. No browser:
//! one timed GET per post, one per profile listing.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{info, warn};

use postlens_common::records::now_iso;
use postlens_common::{CommentRecord, Platform, PostRecord, ProfileRecord, ScrapeError};

use crate::extractor::PostScraper;
use crate::USER_AGENT;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Profile posts fetched from a listing, sequentially and without retry.
const MAX_PROFILE_POSTS: usize = 10;

pub struct RedditExtractor {
    client: reqwest::Client,
}

impl RedditExtractor {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .expect("Failed to build HTTP client");

        Self { client }
    }

    /// Fetch each candidate post sequentially, dropping the ones that fail.
    async fn collect_posts(&self, urls: &[String]) -> Vec<PostRecord> {
        let mut posts = Vec::new();
        for url in urls {
            match self.scrape_post(url).await {
                Ok(post) => posts.push(post),
                Err(e) => warn!(url = %url, error = %e, "Skipping failed profile post"),
            }
        }
        posts
    }

    async fn get_json(&self, url: &str) -> Result<Value, String> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = resp.status();
        if !status.is_success() {
            return Err(format!("request returned status {status}"));
        }

        resp.json().await.map_err(|e| e.to_string())
    }
}

impl Default for RedditExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PostScraper for RedditExtractor {
    async fn scrape_post(&self, url: &str) -> Result<PostRecord, ScrapeError> {
        info!(url, platform = self.name(), "Scraping post");

        let endpoint = json_endpoint(url);
        let value = self
            .get_json(&endpoint)
            .await
            .map_err(|m| ScrapeError::post(Platform::Reddit, m))?;

        post_from_listing(url, &value)
            .ok_or_else(|| ScrapeError::invalid_structure(Platform::Reddit))
    }

    async fn scrape_profile(&self, url: &str) -> Result<ProfileRecord, ScrapeError> {
        info!(url, platform = self.name(), "Scraping profile");

        let endpoint = json_endpoint(url);
        let value = self
            .get_json(&endpoint)
            .await
            .map_err(|m| ScrapeError::profile(Platform::Reddit, m))?;

        // The profile reports the listing size; `posts` holds only the
        // sub-fetches that succeeded.
        let posts_count = listing_size(&value);
        let posts = self.collect_posts(&profile_post_urls(&value)).await;

        Ok(ProfileRecord {
            username: username_from_url(url),
            followers: 0,
            following: 0,
            posts_count,
            posts,
        })
    }

    fn name(&self) -> &str {
        Platform::Reddit.key()
    }
}

fn json_endpoint(url: &str) -> String {
    if url.ends_with(".json") {
        url.to_string()
    } else {
        format!("{url}.json")
    }
}

fn username_from_url(url: &str) -> String {
    match url.rsplit('/').next() {
        Some(segment) if !segment.is_empty() => segment.to_string(),
        _ => "unknown".to_string(),
    }
}

/// Build a post record from the two-element `[post, comments]` listing.
/// Returns `None` on any shape mismatch.
fn post_from_listing(url: &str, value: &Value) -> Option<PostRecord> {
    let listing = value.as_array()?;
    let post = listing.first()?.pointer("/data/children/0/data")?;
    post.as_object()?;

    let comments = listing
        .get(1)
        .and_then(|l| l.pointer("/data/children"))
        .and_then(Value::as_array)
        .map(|children| flatten_comments(children))
        .unwrap_or_default();

    let ups = u64_field(post, "ups");
    let downs = u64_field(post, "downs");

    Some(PostRecord {
        url: url.to_string(),
        post_text: format!(
            "{}\n{}",
            str_field(post, "title", ""),
            str_field(post, "selftext", "")
        ),
        author: str_field(post, "author", "unknown"),
        subreddit: Some(str_field(post, "subreddit", "unknown")),
        comments,
        likes: ups.saturating_sub(downs),
        upvotes: Some(ups),
        downvotes: Some(downs),
        upvote_ratio: Some(post.get("upvote_ratio").and_then(Value::as_f64).unwrap_or(0.0)),
        shares: 0,
        timestamp: epoch_to_iso(post.get("created_utc").and_then(Value::as_f64).unwrap_or(0.0)),
        awards: Some(u64_field(post, "total_awards_received")),
        post_type: str_field(post, "post_hint", "text"),
    })
}

/// Depth-first flattening of a comment tree into one ordered sequence,
/// parent before its replies, sibling order preserved at every level.
fn flatten_comments(children: &[Value]) -> Vec<CommentRecord> {
    let mut out = Vec::new();
    walk_comments(children, &mut out);
    out
}

fn walk_comments(children: &[Value], out: &mut Vec<CommentRecord>) {
    for item in children {
        // Only t1 things are comments; "more" stubs and anything else are skipped.
        if item.get("kind").and_then(Value::as_str) != Some("t1") {
            continue;
        }
        let Some(data) = item.get("data") else {
            continue;
        };

        let ups = u64_field(data, "ups");
        let downs = u64_field(data, "downs");

        out.push(CommentRecord {
            user: str_field(data, "author", "unknown"),
            text: str_field(data, "body", ""),
            likes: ups.saturating_sub(downs),
            timestamp: epoch_to_iso(data.get("created_utc").and_then(Value::as_f64).unwrap_or(0.0)),
            replies_count: Some(0),
            awards: Some(u64_field(data, "total_awards_received")),
        });

        // An empty replies field is the empty string, not an object; the
        // pointer lookup covers both.
        if let Some(replies) = data.pointer("/replies/data/children").and_then(Value::as_array) {
            walk_comments(replies, out);
        }
    }
}

/// Number of entries in a profile listing, independent of how many
/// sub-fetches later succeed.
fn listing_size(value: &Value) -> u64 {
    value
        .pointer("/data/children")
        .and_then(Value::as_array)
        .map(|c| c.len() as u64)
        .unwrap_or(0)
}

/// Canonical URLs of the first [`MAX_PROFILE_POSTS`] listing entries.
fn profile_post_urls(value: &Value) -> Vec<String> {
    value
        .pointer("/data/children")
        .and_then(Value::as_array)
        .map(|children| {
            children
                .iter()
                .take(MAX_PROFILE_POSTS)
                .map(|item| {
                    let permalink = item
                        .pointer("/data/permalink")
                        .and_then(Value::as_str)
                        .unwrap_or("");
                    format!("https://www.reddit.com{permalink}")
                })
                .collect()
        })
        .unwrap_or_default()
}

fn str_field(value: &Value, key: &str, default: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or(default)
        .to_string()
}

fn u64_field(value: &Value, key: &str) -> u64 {
    value.get(key).and_then(Value::as_u64).unwrap_or(0)
}

fn epoch_to_iso(secs: f64) -> String {
    DateTime::<Utc>::from_timestamp(secs as i64, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(now_iso)
}
