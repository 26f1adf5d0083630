//! News feed filtering
//!
//! The feed is a JSON array of entries. A client sends the time it last
//! checked and its build number; every entry published after that time whose
//! build range covers the client is rendered to HTML and returned inside a
//! small JSON object together with the server time.
//!
//! Dates and versions are compared as plain strings, so `"9" > "10"`.

use serde::Deserialize;
use tokio::fs;

use super::error::{FeedError, Result};
use crate::config::FeedsConfig;
use crate::http::QueryParams;

pub const MISSING_LAST_CHECK_TIME: &str = "No lastCheckTime specified";
pub const MISSING_BUILD_NUMBER: &str = "No buildNumber specified";

/// One feed entry. Absent or `null` fields read as empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewsEntry {
    #[serde(default, deserialize_with = "text")]
    pub title: String,
    #[serde(default, deserialize_with = "text")]
    pub content: String,
    #[serde(default, deserialize_with = "text")]
    pub date: String,
    #[serde(default, deserialize_with = "text")]
    pub start_version: String,
    #[serde(default, deserialize_with = "text")]
    pub end_version: String,
}

/// Feed values may be written as JSON numbers; they compare as their text
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Null,
    Bool(bool),
    Text(String),
    Number(serde_json::Number),
}

fn text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Scalar::deserialize(deserializer)? {
        Scalar::Null | Scalar::Bool(false) => String::new(),
        Scalar::Bool(true) => "1".to_string(),
        Scalar::Text(s) => s,
        Scalar::Number(n) => n.to_string(),
    })
}

impl NewsEntry {
    /// Published after the client's last check
    pub fn is_newer_than(&self, last_check_time: &str) -> bool {
        self.date.as_str() > last_check_time
    }

    /// `build_number` lies within `[start_version, end_version]`
    pub fn targets_build(&self, build_number: &str) -> bool {
        build_number >= self.start_version.as_str() && build_number <= self.end_version.as_str()
    }
}

/// Parameters of a news request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewsParams {
    /// `getTime` flag: answer with the server time only
    pub get_time: bool,
    pub last_check_time: Option<String>,
    pub build_number: Option<String>,
    /// Requested backing file (`fileURL`)
    pub file: Option<String>,
}

impl NewsParams {
    pub fn from_query(query: &QueryParams) -> Self {
        Self {
            get_time: query.contains("getTime"),
            last_check_time: query.get("lastCheckTime").map(ToString::to_string),
            build_number: query.get("buildNumber").map(ToString::to_string),
            file: query.get("fileURL").map(ToString::to_string),
        }
    }
}

/// Outcome of a news request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewsReply {
    /// Bare server time (`getTime`)
    ServerTime(i64),
    /// A mandatory parameter was absent
    MissingParameter(&'static str),
    /// Rendered entries
    News { html: String, server_timestamp: i64 },
}

impl NewsReply {
    pub fn body(&self) -> String {
        match self {
            Self::ServerTime(now) => now.to_string(),
            Self::MissingParameter(message) => error_body(message),
            Self::News {
                html,
                server_timestamp,
            } => news_body(html, *server_timestamp),
        }
    }

    /// Everything but the server time is sent as JSON
    pub const fn is_json(&self) -> bool {
        !matches!(self, Self::ServerTime(_))
    }
}

/// Parse the feed array. Entries that are not objects of scalar fields are
/// skipped; only a malformed document or a non-array top level is an error.
pub fn parse_feed(json: &[u8]) -> serde_json::Result<Vec<NewsEntry>> {
    let values: Vec<serde_json::Value> = serde_json::from_slice(json)?;
    Ok(values
        .into_iter()
        .filter_map(|value| serde_json::from_value(value).ok())
        .collect())
}

/// Entries to show, in feed order
pub fn filter_entries<'a>(
    entries: &'a [NewsEntry],
    last_check_time: &'a str,
    build_number: &'a str,
) -> impl Iterator<Item = &'a NewsEntry> + 'a {
    entries
        .iter()
        .filter(move |e| e.is_newer_than(last_check_time))
        .filter(move |e| e.targets_build(build_number))
}

/// Append one entry: centered title, content paragraph, line break.
/// Title and content are inserted verbatim.
pub fn append_entry(buffer: &mut String, entry: &NewsEntry) {
    buffer.push_str("<div align='center'><h2>");
    buffer.push_str(&entry.title);
    buffer.push_str("</h2></div>");
    buffer.push_str("<p>");
    buffer.push_str(&entry.content);
    buffer.push_str("</p>");
    buffer.push_str("<br>");
}

pub fn render_entries(entries: &[NewsEntry], last_check_time: &str, build_number: &str) -> String {
    let mut buffer = String::new();
    for entry in filter_entries(entries, last_check_time, build_number) {
        append_entry(&mut buffer, entry);
    }
    buffer
}

/// Backslash-escape double quotes. Nothing else is escaped.
pub fn escape_quotes(html: &str) -> String {
    html.replace('"', "\\\"")
}

/// `{"news":"...","serverTimestamp":N}`
pub fn news_body(html: &str, server_timestamp: i64) -> String {
    format!(
        "{{\"news\":\"{}\",\"serverTimestamp\":{server_timestamp}}}",
        escape_quotes(html)
    )
}

/// `{"error":"..."}`
pub fn error_body(message: &str) -> String {
    serde_json::json!({ "error": message }).to_string()
}

/// Validate the request, read the feed and render matching entries.
///
/// `now` is the server time in Unix seconds. The feed file is only read
/// once both mandatory parameters are present.
pub async fn get_news(params: &NewsParams, feeds: &FeedsConfig, now: i64) -> Result<NewsReply> {
    if params.get_time {
        return Ok(NewsReply::ServerTime(now));
    }
    let Some(last_check_time) = params.last_check_time.as_deref() else {
        return Ok(NewsReply::MissingParameter(MISSING_LAST_CHECK_TIME));
    };
    let Some(build_number) = params.build_number.as_deref() else {
        return Ok(NewsReply::MissingParameter(MISSING_BUILD_NUMBER));
    };

    let path = super::backing_file(feeds, params.file.as_deref(), &feeds.news_file)?;
    let json = fs::read(&path).await.map_err(|e| FeedError::io(&path, e))?;
    let entries = parse_feed(&json).map_err(|e| FeedError::parse(&path, e))?;

    Ok(NewsReply::News {
        html: render_entries(&entries, last_check_time, build_number),
        server_timestamp: now,
    })
}
