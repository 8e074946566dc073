//! Best-effort extractor for URLs that match no supported platform: one
//! timed GET, then heuristic HTML mining. Posts only; there is no notion of
//! a generic profile page.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use scraper::{Html, Selector};
use tracing::info;

use postlens_common::records::now_iso;
use postlens_common::{CommentRecord, PostRecord, ProfileRecord, ScrapeError};

use crate::dom::element_text;
use crate::extractor::PostScraper;
use crate::field::Extracted;
use crate::USER_AGENT;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Paragraphs shorter than this are navigation chrome, not body text.
const MIN_PARAGRAPH_LEN: usize = 20;
const MAX_PARAGRAPHS: usize = 10;

/// Comment cap, applied after both the class and id strategies have been
/// merged.
const MAX_COMMENTS: usize = 50;

pub struct GenericExtractor {
    client: reqwest::Client,
}

impl GenericExtractor {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .expect("Failed to build HTTP client");

        Self { client }
    }
}

impl Default for GenericExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PostScraper for GenericExtractor {
    async fn scrape_post(&self, url: &str) -> Result<PostRecord, ScrapeError> {
        info!(url, platform = self.name(), "Scraping post");

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ScrapeError::post("Generic", e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ScrapeError::post(
                "Generic",
                format!("request returned status {status}"),
            ));
        }

        let html = resp
            .text()
            .await
            .map_err(|e| ScrapeError::post("Generic", e))?;

        Ok(post_from_html(url, &html))
    }

    async fn scrape_profile(&self, _url: &str) -> Result<ProfileRecord, ScrapeError> {
        Err(ScrapeError::UnsupportedProfile)
    }

    fn name(&self) -> &str {
        "generic"
    }
}

fn post_from_html(url: &str, html: &str) -> PostRecord {
    let doc = Html::parse_document(html);

    let title = extract_title(&doc);
    let content = extract_content(&doc);

    PostRecord {
        url: url.to_string(),
        post_text: format!("{title}\n{content}"),
        author: extract_author(&doc).into_value(),
        subreddit: None,
        comments: extract_comments(&doc),
        likes: 0,
        upvotes: None,
        downvotes: None,
        upvote_ratio: None,
        shares: 0,
        timestamp: extract_timestamp(&doc).into_value(),
        awards: None,
        post_type: "article".to_string(),
    }
}

fn extract_title(doc: &Html) -> String {
    for raw in ["h1", "title"] {
        let Ok(selector) = Selector::parse(raw) else {
            continue;
        };
        if let Some(el) = doc.select(&selector).next() {
            let text = element_text(el);
            if !text.is_empty() {
                return text;
            }
        }
    }
    String::new()
}

fn extract_content(doc: &Html) -> String {
    let Ok(selector) = Selector::parse("p") else {
        return String::new();
    };

    doc.select(&selector)
        .map(element_text)
        .filter(|text| text.len() > MIN_PARAGRAPH_LEN)
        .take(MAX_PARAGRAPHS)
        .collect::<Vec<_>>()
        .join("\n")
}

fn extract_author(doc: &Html) -> Extracted<String> {
    if let Ok(selector) = Selector::parse(r#"meta[name="author"]"#) {
        let from_meta = doc
            .select(&selector)
            .find_map(|el| el.value().attr("content"))
            .map(str::trim)
            .filter(|c| !c.is_empty());
        if let Some(author) = from_meta {
            return Extracted::Found(author.to_string());
        }
    }

    if let Ok(selector) = Selector::parse("*") {
        for el in doc.select(&selector) {
            let value = el.value();
            let author_like = value
                .attr("class")
                .map(|c| c.to_lowercase().contains("author"))
                .unwrap_or(false)
                || value.attr("rel") == Some("author");
            if !author_like {
                continue;
            }
            let text = element_text(el);
            if !text.is_empty() {
                return Extracted::Found(text);
            }
        }
    }

    Extracted::Defaulted("Unknown".to_string())
}

/// Elements whose class or id mentions "comment", with text long enough to
/// be a comment and short enough not to be the whole thread container.
fn extract_comments(doc: &Html) -> Vec<CommentRecord> {
    let Ok(selector) = Selector::parse("*") else {
        return Vec::new();
    };

    let mut comments = Vec::new();
    for el in doc.select(&selector) {
        let value = el.value();
        let comment_like = value
            .attr("class")
            .map(|c| c.to_lowercase().contains("comment"))
            .unwrap_or(false)
            || value
                .attr("id")
                .map(|i| i.to_lowercase().contains("comment"))
                .unwrap_or(false);
        if !comment_like {
            continue;
        }

        let text = element_text(el);
        if text.len() > 10 && text.len() < 1000 {
            comments.push(CommentRecord {
                user: "Anonymous".to_string(),
                text,
                likes: 0,
                timestamp: now_iso(),
                replies_count: None,
                awards: None,
            });
        }
    }

    comments.truncate(MAX_COMMENTS);
    comments
}

fn extract_timestamp(doc: &Html) -> Extracted<String> {
    let from_time_tag = Selector::parse("time").ok().and_then(|selector| {
        doc.select(&selector)
            .find_map(|el| el.value().attr("datetime"))
            .map(str::to_string)
    });
    if let Some(ts) = from_time_tag {
        return Extracted::Found(ts);
    }

    let body_text: String = doc.root_element().text().collect::<Vec<_>>().join(" ");
    for (pattern, format) in [(r"\d{4}-\d{2}-\d{2}", "%Y-%m-%d"), (r"\d{2}/\d{2}/\d{4}", "%m/%d/%Y")]
    {
        let Ok(re) = Regex::new(pattern) else {
            continue;
        };
        let Some(m) = re.find(&body_text) else {
            continue;
        };
        if let Ok(date) = NaiveDate::parse_from_str(m.as_str(), format) {
            return Extracted::Found(
                date.and_time(NaiveTime::MIN)
                    .format("%Y-%m-%dT%H:%M:%S")
                    .to_string(),
            );
        }
    }

    Extracted::Defaulted(now_iso())
}
