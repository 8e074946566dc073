pub mod config;
pub mod count;
pub mod error;
pub mod records;

pub use config::Config;
pub use count::parse_count;
pub use error::ScrapeError;
pub use records::{CommentRecord, Platform, PostRecord, ProfileRecord};
