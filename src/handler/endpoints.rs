//! Endpoint handlers
//!
//! Build parameter structs from the query, call into the feed module and
//! turn the outcome into a response.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

use crate::config::AppState;
use crate::feed::{self, ChangelogParams, FeedError, NewsParams, NewsReply};
use crate::handler::router::RequestContext;
use crate::http;
use crate::logger;

/// Changelog endpoint: HTML fragment, or a plain text error
pub async fn serve_changelog(ctx: &RequestContext<'_>, state: &AppState) -> Response<Full<Bytes>> {
    let params = ChangelogParams::from_query(&ctx.query);
    logger::log_debug(&format!(
        "[Changelog] version='{}' lastKnownVersion='{}' file={:?}",
        params.version, params.last_known_version, params.file
    ));

    match feed::get_changelog(&params, &state.config.feeds).await {
        Ok(html) => http::build_html_response(html, ctx.is_head),
        Err(e) => {
            log_feed_error(ctx.path, &e);
            http::build_text_response(e.status_code(), e.public_message().to_string(), ctx.is_head)
        }
    }
}

/// News endpoint: JSON payload, bare timestamp for `getTime`, or a JSON error
pub async fn serve_news(ctx: &RequestContext<'_>, state: &AppState) -> Response<Full<Bytes>> {
    let params = NewsParams::from_query(&ctx.query);
    let now = chrono::Utc::now().timestamp();

    match feed::get_news(&params, &state.config.feeds, now).await {
        Ok(reply) => {
            if let NewsReply::MissingParameter(message) = &reply {
                logger::log_debug(&format!("[News] Rejected request: {message}"));
            }
            if reply.is_json() {
                http::build_json_response(200, reply.body(), ctx.is_head)
            } else {
                http::build_text_response(200, reply.body(), ctx.is_head)
            }
        }
        Err(e) => {
            log_feed_error(ctx.path, &e);
            http::build_json_response(
                e.status_code(),
                feed::error_body(e.public_message()),
                ctx.is_head,
            )
        }
    }
}

fn log_feed_error(path: &str, error: &FeedError) {
    logger::log_warning(&format!("[{path}] {error}"));
}
