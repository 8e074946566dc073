//! Per-platform extraction rules for the browser-rendered platforms.
//!
//! The engine in [`crate::browser`] is shared; everything platform-specific
//! lives here as data: selector cascades per field, count-extraction rules,
//! comment shapes, profile rules, and the post-type classifier. Selectors
//! track each platform's markup as observed and will drift with it; the
//! cascade tries them in order and takes the first non-empty match.

use postlens_common::Platform;

/// Selector cascade for a text field.
pub struct TextRule {
    pub selectors: &'static [&'static str],
    /// Accept only text strictly longer than this many characters.
    pub min_len: usize,
    /// Keep only the first rendered line of the match.
    pub first_line: bool,
}

/// Selector cascade for an engagement count.
pub struct CountRule {
    pub selectors: &'static [&'static str],
    /// Read this attribute instead of the element text.
    pub attr: Option<&'static str>,
    /// Regex whose first capture group is the number.
    pub pattern: &'static str,
}

/// How comments are laid out on a post page.
pub enum CommentsRule {
    /// Flat list items where the leading token is the commenter handle.
    LeadingHandle {
        container: &'static str,
        cap: usize,
    },
    /// Dedicated user/text selectors scoped inside each container element.
    Scoped {
        container: &'static str,
        user: &'static str,
        text: &'static str,
        user_first_line: bool,
        cap: usize,
    },
}

/// Where a profile's post total comes from.
pub enum PostsCountRule {
    /// Scan header elements for text containing `keyword` and parse its number.
    HeaderScan {
        selectors: &'static [&'static str],
        keyword: &'static str,
    },
    /// Report the number of discovered post links.
    DiscoveredLinks,
}

pub struct ProfileRules {
    pub username: TextRule,
    pub followers: &'static [&'static str],
    /// Empty cascade means the platform exposes no following count.
    pub following: &'static [&'static str],
    pub posts_count: PostsCountRule,
    /// Anchor selector for candidate post links.
    pub link_selector: &'static str,
    /// Path fragment a candidate href must contain.
    pub link_pattern: &'static str,
    /// Base prepended to relative hrefs.
    pub link_base: &'static str,
}

pub struct PlatformRules {
    pub platform: Platform,
    pub post_text: TextRule,
    pub author: TextRule,
    pub likes: CountRule,
    pub shares: Option<CountRule>,
    pub comments: CommentsRule,
    pub profile: ProfileRules,
    pub post_type: fn(&str) -> &'static str,
}

fn instagram_post_type(url: &str) -> &'static str {
    if url.contains("/reel/") {
        "reel"
    } else if url.contains("/p/") {
        "post"
    } else if url.contains("/tv/") {
        "video"
    } else {
        "post"
    }
}

fn twitter_post_type(_url: &str) -> &'static str {
    "tweet"
}

fn linkedin_post_type(_url: &str) -> &'static str {
    "post"
}

pub static INSTAGRAM: PlatformRules = PlatformRules {
    platform: Platform::Instagram,
    post_text: TextRule {
        selectors: &["h1", "article span", r#"[class*="Caption"]"#],
        // Skip stray UI strings; captions are longer than this.
        min_len: 10,
        first_line: false,
    },
    author: TextRule {
        selectors: &["header a", r#"[class*="Username"]"#],
        min_len: 0,
        first_line: false,
    },
    likes: CountRule {
        selectors: &["section button span", r#"[class*="like"]"#, "section a"],
        attr: None,
        pattern: r"(?i)([\d,]+)\s*like",
    },
    shares: None,
    comments: CommentsRule::LeadingHandle {
        container: "ul li",
        cap: 50,
    },
    profile: ProfileRules {
        username: TextRule {
            selectors: &["header h2", "header h1"],
            min_len: 0,
            first_line: false,
        },
        followers: &[r#"a[href*="followers"] span"#],
        following: &[r#"a[href*="following"] span"#],
        posts_count: PostsCountRule::HeaderScan {
            selectors: &["header span", "header li"],
            keyword: "post",
        },
        link_selector: "article a",
        link_pattern: "/p/",
        link_base: "https://www.instagram.com",
    },
    post_type: instagram_post_type,
};

pub static TWITTER: PlatformRules = PlatformRules {
    platform: Platform::Twitter,
    post_text: TextRule {
        selectors: &[r#"[data-testid="tweetText"]"#, "article div[lang]"],
        min_len: 0,
        first_line: false,
    },
    author: TextRule {
        selectors: &[r#"[data-testid="User-Name"]"#],
        min_len: 0,
        first_line: true,
    },
    likes: CountRule {
        selectors: &[r#"[data-testid="like"]"#, r#"[aria-label*="like"]"#],
        attr: Some("aria-label"),
        pattern: r"([\d,]+)",
    },
    shares: Some(CountRule {
        selectors: &[r#"[data-testid="retweet"]"#, r#"[aria-label*="retweet"]"#],
        attr: Some("aria-label"),
        pattern: r"([\d,]+)",
    }),
    comments: CommentsRule::Scoped {
        container: "article",
        user: r#"[data-testid="User-Name"]"#,
        text: r#"[data-testid="tweetText"]"#,
        user_first_line: true,
        cap: 30,
    },
    profile: ProfileRules {
        username: TextRule {
            selectors: &[r#"[data-testid="UserName"]"#],
            min_len: 0,
            first_line: false,
        },
        followers: &[r#"a[href*="/followers"] span"#],
        following: &[r#"a[href*="/following"] span"#],
        posts_count: PostsCountRule::DiscoveredLinks,
        link_selector: r#"a[href*="/status/"]"#,
        link_pattern: "/status/",
        link_base: "https://twitter.com",
    },
    post_type: twitter_post_type,
};

pub static LINKEDIN: PlatformRules = PlatformRules {
    platform: Platform::LinkedIn,
    post_text: TextRule {
        selectors: &[
            ".feed-shared-text",
            r#"[class*="feed-shared-update-v2__description"]"#,
        ],
        min_len: 0,
        first_line: false,
    },
    author: TextRule {
        selectors: &[".feed-shared-actor__name"],
        min_len: 0,
        first_line: false,
    },
    likes: CountRule {
        selectors: &[
            ".social-details-social-counts__reactions-count",
            r#"[aria-label*="reaction"]"#,
        ],
        attr: None,
        pattern: r"([\d,]+)",
    },
    shares: None,
    comments: CommentsRule::Scoped {
        container: ".comments-comment-item",
        user: ".comments-comment-item__commenter-name",
        text: ".comments-comment-item-content-body",
        user_first_line: false,
        cap: 30,
    },
    profile: ProfileRules {
        username: TextRule {
            selectors: &["h1"],
            min_len: 0,
            first_line: false,
        },
        // Connections stand in for followers; no following count exists.
        followers: &[".pv-top-card--list-bullet li"],
        following: &[],
        posts_count: PostsCountRule::DiscoveredLinks,
        link_selector: r#"a[href*="/posts/"]"#,
        link_pattern: "/posts/",
        link_base: "https://www.linkedin.com",
    },
    post_type: linkedin_post_type,
};
