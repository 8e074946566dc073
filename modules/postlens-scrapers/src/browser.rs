//! Shared extraction engine for the browser-rendered platforms.
//!
//! One engine, three rule tables: the page is rendered by `chrome-client`,
//! then every field runs its selector cascade over the static DOM. Each
//! field absorbs its own failures into a default so a half-broken page
//! still yields a complete record; only navigation-level failures surface
//! as errors.

use std::collections::HashSet;

use async_trait::async_trait;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::{info, warn};

use chrome_client::ChromeClient;
use postlens_common::records::now_iso;
use postlens_common::{parse_count, CommentRecord, PostRecord, ProfileRecord, ScrapeError};

use crate::dom::{element_text, first_text_line};
use crate::extractor::PostScraper;
use crate::field::Extracted;
use crate::rules::{CommentsRule, CountRule, PlatformRules, PostsCountRule, ProfileRules, TextRule};

/// Candidate post links collected from a profile page, after dedup.
const MAX_POST_LINKS: usize = 20;

/// Profile posts actually fetched, sequentially and without retry.
const MAX_PROFILE_POSTS: usize = 10;

pub struct BrowserExtractor {
    chrome: ChromeClient,
    rules: &'static PlatformRules,
}

/// Owned profile-page fields, parsed before any sub-fetch starts so the
/// DOM never outlives the profile page render.
struct ProfileHeader {
    username: String,
    followers: u64,
    following: u64,
    posts_count: u64,
    links: Vec<String>,
}

impl BrowserExtractor {
    pub fn new(chrome: ChromeClient, rules: &'static PlatformRules) -> Self {
        Self { chrome, rules }
    }

    fn post_from_html(&self, url: &str, html: &str) -> PostRecord {
        let doc = Html::parse_document(html);

        let post_text = extract_text(&doc, &self.rules.post_text, "").into_value();
        let author = extract_text(&doc, &self.rules.author, "unknown").into_value();
        let likes = extract_count(&doc, &self.rules.likes).into_value();
        let shares = self
            .rules
            .shares
            .as_ref()
            .map(|rule| extract_count(&doc, rule).into_value())
            .unwrap_or(0);
        let timestamp = extract_timestamp(&doc).into_value();
        let comments = extract_comments(&doc, &self.rules.comments);

        PostRecord {
            url: url.to_string(),
            post_text,
            author,
            subreddit: None,
            comments,
            likes,
            upvotes: None,
            downvotes: None,
            upvote_ratio: None,
            shares,
            timestamp,
            awards: None,
            post_type: (self.rules.post_type)(url).to_string(),
        }
    }

    fn profile_header(&self, html: &str) -> ProfileHeader {
        let doc = Html::parse_document(html);
        let profile = &self.rules.profile;

        let username = extract_text(&doc, &profile.username, "unknown").into_value();
        let followers = extract_follow_count(&doc, profile.followers).into_value();
        let following = extract_follow_count(&doc, profile.following).into_value();
        let links = extract_post_links(&doc, profile);

        let posts_count = match &profile.posts_count {
            PostsCountRule::HeaderScan { selectors, keyword } => {
                header_scan(&doc, selectors, keyword).unwrap_or(0)
            }
            PostsCountRule::DiscoveredLinks => links.len() as u64,
        };

        ProfileHeader {
            username,
            followers,
            following,
            posts_count,
            links,
        }
    }
}

#[async_trait]
impl PostScraper for BrowserExtractor {
    async fn scrape_post(&self, url: &str) -> Result<PostRecord, ScrapeError> {
        info!(url, platform = self.name(), "Scraping post");

        let html = self
            .chrome
            .render(url)
            .await
            .map_err(|e| ScrapeError::post(self.rules.platform, e))?;

        Ok(self.post_from_html(url, &html))
    }

    async fn scrape_profile(&self, url: &str) -> Result<ProfileRecord, ScrapeError> {
        info!(url, platform = self.name(), "Scraping profile");

        let html = self
            .chrome
            .render(url)
            .await
            .map_err(|e| ScrapeError::profile(self.rules.platform, e))?;
        let header = self.profile_header(&html);

        let mut posts = Vec::new();
        for link in header.links.iter().take(MAX_PROFILE_POSTS) {
            match self.scrape_post(link).await {
                Ok(post) => posts.push(post),
                Err(e) => warn!(url = %link, error = %e, "Skipping failed profile post"),
            }
        }

        Ok(ProfileRecord {
            username: header.username,
            followers: header.followers,
            following: header.following,
            posts_count: header.posts_count,
            posts,
        })
    }

    fn name(&self) -> &str {
        self.rules.platform.key()
    }
}

// --- Field extraction ---
//
// Every helper runs a selector cascade and returns Extracted so the
// defaulted case stays visible until record assembly. A selector that
// fails to parse is treated as a non-match.

fn extract_text(doc: &Html, rule: &TextRule, default: &str) -> Extracted<String> {
    for raw in rule.selectors {
        let Ok(selector) = Selector::parse(raw) else {
            continue;
        };
        for el in doc.select(&selector) {
            let text = if rule.first_line {
                first_text_line(el)
            } else {
                element_text(el)
            };
            if text.len() > rule.min_len {
                return Extracted::Found(text);
            }
        }
    }
    Extracted::Defaulted(default.to_string())
}

fn extract_count(doc: &Html, rule: &CountRule) -> Extracted<u64> {
    let Ok(re) = Regex::new(rule.pattern) else {
        return Extracted::Defaulted(0);
    };

    for raw in rule.selectors {
        let Ok(selector) = Selector::parse(raw) else {
            continue;
        };
        for el in doc.select(&selector) {
            let haystack = match rule.attr {
                Some(attr) => match el.value().attr(attr) {
                    Some(v) => v.to_string(),
                    None => continue,
                },
                None => element_text(el),
            };
            if let Some(caps) = re.captures(&haystack) {
                return Extracted::Found(parse_count(&caps[1]));
            }
        }
    }
    Extracted::Defaulted(0)
}

fn extract_timestamp(doc: &Html) -> Extracted<String> {
    let found = Selector::parse("time").ok().and_then(|selector| {
        doc.select(&selector)
            .find_map(|el| el.value().attr("datetime"))
            .map(str::to_string)
    });
    Extracted::from_option(found, now_iso())
}

fn extract_comments(doc: &Html, rule: &CommentsRule) -> Vec<CommentRecord> {
    let mut comments = Vec::new();

    match rule {
        CommentsRule::LeadingHandle { container, cap } => {
            let Ok(selector) = Selector::parse(container) else {
                return comments;
            };
            let handle_re = Regex::new(r"(?s)^(\S+)\s+(.+)").expect("valid handle regex");

            for el in doc.select(&selector).take(*cap) {
                let text = element_text(el);
                if text.len() <= 2 {
                    continue;
                }
                let split = handle_re
                    .captures(&text)
                    .map(|caps| (caps[1].to_string(), caps[2].trim().to_string()));
                let (user, body) = match split {
                    Some(pair) => pair,
                    None => ("unknown".to_string(), text),
                };
                comments.push(CommentRecord {
                    user,
                    text: body,
                    likes: 0,
                    timestamp: now_iso(),
                    replies_count: None,
                    awards: None,
                });
            }
        }
        CommentsRule::Scoped {
            container,
            user,
            text,
            user_first_line,
            cap,
        } => {
            let (Some(container_sel), Some(user_sel), Some(text_sel)) = (
                Selector::parse(container).ok(),
                Selector::parse(user).ok(),
                Selector::parse(text).ok(),
            ) else {
                return comments;
            };

            for el in doc.select(&container_sel).take(*cap) {
                let Some(user_el) = el.select(&user_sel).next() else {
                    continue;
                };
                let Some(text_el) = el.select(&text_sel).next() else {
                    continue;
                };
                let user = if *user_first_line {
                    first_text_line(user_el)
                } else {
                    element_text(user_el)
                };
                comments.push(CommentRecord {
                    user,
                    text: element_text(text_el),
                    likes: 0,
                    timestamp: now_iso(),
                    replies_count: None,
                    awards: None,
                });
            }
        }
    }

    comments
}

fn extract_follow_count(doc: &Html, selectors: &[&str]) -> Extracted<u64> {
    for raw in selectors {
        let Ok(selector) = Selector::parse(raw) else {
            continue;
        };
        for el in doc.select(&selector) {
            let text = element_text(el);
            if !text.is_empty() {
                return Extracted::Found(parse_count(&text));
            }
        }
    }
    Extracted::Defaulted(0)
}

fn header_scan(doc: &Html, selectors: &[&str], keyword: &str) -> Option<u64> {
    let number_re = Regex::new(r"([\d,]+)").expect("valid number regex");

    for raw in selectors {
        let Ok(selector) = Selector::parse(raw) else {
            continue;
        };
        for el in doc.select(&selector) {
            let text = element_text(el);
            if !text.to_lowercase().contains(keyword) {
                continue;
            }
            if let Some(caps) = number_re.captures(&text) {
                return Some(parse_count(&caps[1]));
            }
        }
    }
    None
}

/// Candidate post links: anchors matching the platform's path pattern,
/// relative hrefs absolutized, deduplicated in insertion order, capped.
fn extract_post_links(doc: &Html, rules: &ProfileRules) -> Vec<String> {
    let Ok(selector) = Selector::parse(rules.link_selector) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for el in doc.select(&selector) {
        let Some(href) = el.value().attr("href") else {
            continue;
        };
        if !href.contains(rules.link_pattern) {
            continue;
        }
        let full = if href.starts_with("http") {
            href.to_string()
        } else {
            format!("{}{}", rules.link_base, href)
        };
        if seen.insert(full.clone()) {
            links.push(full);
            if links.len() >= MAX_POST_LINKS {
                break;
            }
        }
    }

    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{INSTAGRAM, LINKEDIN, TWITTER};

    fn extractor(rules: &'static PlatformRules) -> BrowserExtractor {
        BrowserExtractor::new(ChromeClient::new("chromium"), rules)
    }

    const INSTAGRAM_POST: &str = r#"
        <html><body>
            <header><a>natgeo</a></header>
            <article>
                <h1>Sunset over the canyon, shot on a stormy evening.</h1>
                <section><button><span>1,234 likes</span></button></section>
                <time datetime="2024-03-01T12:00:00Z">March 1</time>
                <ul>
                    <li>alice Stunning colors!</li>
                    <li>bob Where is this?</li>
                    <li>x</li>
                </ul>
            </article>
        </body></html>
    "#;

    #[test]
    fn instagram_post_fields() {
        let record = extractor(&INSTAGRAM)
            .post_from_html("https://www.instagram.com/p/abc123/", INSTAGRAM_POST);

        assert_eq!(
            record.post_text,
            "Sunset over the canyon, shot on a stormy evening."
        );
        assert_eq!(record.author, "natgeo");
        assert_eq!(record.likes, 1234);
        assert_eq!(record.shares, 0);
        assert_eq!(record.timestamp, "2024-03-01T12:00:00Z");
        assert_eq!(record.post_type, "post");
        assert!(record.subreddit.is_none());

        // The two-character item is dropped; handles split off the text.
        assert_eq!(record.comments.len(), 2);
        assert_eq!(record.comments[0].user, "alice");
        assert_eq!(record.comments[0].text, "Stunning colors!");
        assert_eq!(record.comments[1].user, "bob");
    }

    #[test]
    fn instagram_reel_classified_by_url() {
        let record =
            extractor(&INSTAGRAM).post_from_html("https://www.instagram.com/reel/xyz/", "<html></html>");
        assert_eq!(record.post_type, "reel");
    }

    const TWEET: &str = r#"
        <html><body>
            <article>
                <div data-testid="User-Name"><span>Jane Doe</span><span>@jane</span></div>
                <div data-testid="tweetText">Shipping the new release today.</div>
                <button data-testid="like" aria-label="5,210 Likes. Like"></button>
                <button data-testid="retweet" aria-label="321 reposts. Repost"></button>
                <time datetime="2024-06-05T08:30:00.000Z">Jun 5</time>
            </article>
            <article>
                <div data-testid="User-Name"><span>Sam</span><span>@sam</span></div>
                <div data-testid="tweetText">Congrats on the launch!</div>
            </article>
        </body></html>
    "#;

    #[test]
    fn twitter_post_fields() {
        let record =
            extractor(&TWITTER).post_from_html("https://twitter.com/jane/status/1", TWEET);

        assert_eq!(record.post_text, "Shipping the new release today.");
        assert_eq!(record.author, "Jane Doe");
        assert_eq!(record.likes, 5210);
        assert_eq!(record.shares, 321);
        assert_eq!(record.post_type, "tweet");

        // Every article with both user and text counts, the tweet included.
        assert_eq!(record.comments.len(), 2);
        assert_eq!(record.comments[1].user, "Sam");
        assert_eq!(record.comments[1].text, "Congrats on the launch!");
    }

    const LINKEDIN_POST: &str = r#"
        <html><body>
            <div class="feed-shared-actor__name">Acme Corp</div>
            <div class="feed-shared-text">We are hiring across the platform team.</div>
            <span class="social-details-social-counts__reactions-count">87</span>
            <div class="comments-comment-item">
                <span class="comments-comment-item__commenter-name">Priya N.</span>
                <div class="comments-comment-item-content-body">Great news, sharing!</div>
            </div>
        </body></html>
    "#;

    #[test]
    fn linkedin_post_fields() {
        let record = extractor(&LINKEDIN)
            .post_from_html("https://www.linkedin.com/posts/acme_hiring", LINKEDIN_POST);

        assert_eq!(record.post_text, "We are hiring across the platform team.");
        assert_eq!(record.author, "Acme Corp");
        assert_eq!(record.likes, 87);
        assert_eq!(record.post_type, "post");
        assert_eq!(record.comments.len(), 1);
        assert_eq!(record.comments[0].user, "Priya N.");
    }

    #[test]
    fn empty_page_yields_defaults_not_errors() {
        let record = extractor(&TWITTER)
            .post_from_html("https://twitter.com/a/status/2", "<html><body></body></html>");

        assert_eq!(record.post_text, "");
        assert_eq!(record.author, "unknown");
        assert_eq!(record.likes, 0);
        assert_eq!(record.shares, 0);
        assert!(record.comments.is_empty());
        assert!(!record.timestamp.is_empty());
    }

    #[test]
    fn defaulted_fields_are_visible_before_assembly() {
        let doc = Html::parse_document("<html><body></body></html>");
        assert!(extract_count(&doc, &TWITTER.likes).is_defaulted());
        assert!(extract_timestamp(&doc).is_defaulted());
        assert!(extract_text(&doc, &TWITTER.post_text, "").is_defaulted());

        let doc = Html::parse_document(TWEET);
        assert!(!extract_count(&doc, &TWITTER.likes).is_defaulted());
    }

    #[test]
    fn instagram_profile_header() {
        let mut links = String::new();
        for i in 0..30 {
            // Each link twice: dedup must collapse them.
            links.push_str(&format!(r#"<a href="/p/post{i}/">x</a><a href="/p/post{i}/">x</a>"#));
        }
        let html = format!(
            r#"
            <html><body>
                <header>
                    <h2>natgeo</h2>
                    <li>842 posts</li>
                    <a href="/natgeo/followers/"><span>10.5K</span></a>
                    <a href="/natgeo/following/"><span>312</span></a>
                </header>
                <article>{links}</article>
            </body></html>
            "#
        );

        let header = extractor(&INSTAGRAM).profile_header(&html);
        assert_eq!(header.username, "natgeo");
        assert_eq!(header.followers, 10_500);
        assert_eq!(header.following, 312);
        assert_eq!(header.posts_count, 842);
        assert_eq!(header.links.len(), MAX_POST_LINKS);
        assert_eq!(header.links[0], "https://www.instagram.com/p/post0/");
    }

    #[test]
    fn twitter_profile_counts_discovered_links() {
        let html = r#"
            <html><body>
                <div data-testid="UserName">Jane Doe</div>
                <a href="/jane/followers"><span>2.1M</span></a>
                <a href="/jane/following"><span>450</span></a>
                <a href="/jane/status/1">t1</a>
                <a href="/jane/status/2">t2</a>
                <a href="https://twitter.com/jane/status/3">t3</a>
            </body></html>
        "#;

        let header = extractor(&TWITTER).profile_header(html);
        assert_eq!(header.username, "Jane Doe");
        assert_eq!(header.followers, 2_100_000);
        assert_eq!(header.posts_count, 3);
        assert_eq!(header.links[0], "https://twitter.com/jane/status/1");
        assert_eq!(header.links[2], "https://twitter.com/jane/status/3");
    }

    #[test]
    fn linkedin_profile_has_no_following_count() {
        let html = r#"
            <html><body>
                <h1>Dana Smith</h1>
                <ul class="pv-top-card--list-bullet"><li>500+ connections</li></ul>
            </body></html>
        "#;

        let header = extractor(&LINKEDIN).profile_header(html);
        assert_eq!(header.username, "Dana Smith");
        assert_eq!(header.followers, 500);
        assert_eq!(header.following, 0);
    }
}
