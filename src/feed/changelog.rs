//! Changelog section extraction
//!
//! A changelog is Markdown text whose sections start with `## [<version>]`.
//! Sections are located by plain substring search (the marker may appear
//! anywhere, not only at the start of a line) and the selected slice is
//! rendered to HTML.

use std::ops::Range;

use pulldown_cmark::{html, Options, Parser};
use tokio::fs;

use super::error::{FeedError, Result};
use crate::config::FeedsConfig;
use crate::http::QueryParams;

/// Prefix shared by every section header
const SECTION_PREFIX: &str = "## [";

/// `lastKnownVersion` value meaning "stop at the following section"
pub const NEXT_SECTION: &str = "next";

/// Parameters of a changelog request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangelogParams {
    /// Section to start from; empty means the first section
    pub version: String,
    /// Section to stop before; empty means end of document
    pub last_known_version: String,
    /// Requested backing file (`fileURL`)
    pub file: Option<String>,
}

impl ChangelogParams {
    pub fn from_query(query: &QueryParams) -> Self {
        Self {
            version: query.get_or_empty("version"),
            last_known_version: query.get_or_empty("lastKnownVersion"),
            file: query.get("fileURL").map(ToString::to_string),
        }
    }
}

fn section_marker(version: &str) -> String {
    format!("{SECTION_PREFIX}{version}]")
}

/// Byte range of the requested section within `content`.
///
/// A start marker that cannot be found falls back to the start of the
/// document; a missing end marker extends the range to the end of it.
pub fn section_bounds(content: &str, version: &str, last_known_version: &str) -> Range<usize> {
    let start = if version.is_empty() {
        content.find(SECTION_PREFIX)
    } else {
        content.find(&section_marker(version))
    }
    .unwrap_or(0);

    if last_known_version.is_empty() {
        return start..content.len();
    }

    // The end marker is searched from the character after `start` so that the
    // start header itself never matches.
    let search_from = start + content[start..].chars().next().map_or(0, char::len_utf8);
    let rest = &content[search_from..];
    let end = if last_known_version == NEXT_SECTION {
        rest.find(SECTION_PREFIX)
    } else {
        rest.find(&section_marker(last_known_version))
    };

    start..end.map_or(content.len(), |offset| search_from + offset)
}

/// Slice of `content` covered by [`section_bounds`]
pub fn extract_section<'a>(content: &'a str, version: &str, last_known_version: &str) -> &'a str {
    &content[section_bounds(content, version, last_known_version)]
}

/// Render Markdown to an HTML fragment
pub fn render_markdown(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);

    let parser = Parser::new_ext(markdown, options);
    let mut html_output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut html_output, parser);
    html_output
}

/// Read the changelog file and render the requested section
pub async fn get_changelog(params: &ChangelogParams, feeds: &FeedsConfig) -> Result<String> {
    let path = super::backing_file(feeds, params.file.as_deref(), &feeds.changelog_file)?;
    let bytes = fs::read(&path).await.map_err(|e| FeedError::io(&path, e))?;
    let content = String::from_utf8_lossy(&bytes);

    let section = extract_section(&content, &params.version, &params.last_known_version);
    Ok(render_markdown(section))
}
