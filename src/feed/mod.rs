//! Feed module
//!
//! The two endpoints served by relnotes:
//! - changelog: one section of a Markdown changelog rendered to HTML
//! - news: news entries filtered by date and build number, as JSON

pub mod changelog;
mod error;
pub mod news;
mod path;

use std::path::PathBuf;

use crate::config::FeedsConfig;

pub use changelog::{get_changelog, ChangelogParams};
pub use error::FeedError;
use error::Result;
pub use news::{error_body, get_news, NewsParams, NewsReply};

/// Path of the backing file for a request. `requested` is ignored when file
/// overrides are disabled.
fn backing_file(feeds: &FeedsConfig, requested: Option<&str>, default: &str) -> Result<PathBuf> {
    let requested = requested.filter(|_| feeds.allow_file_override);
    path::resolve(&feeds.root_dir, requested, default)
}
