//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for method validation,
//! route matching, dispatching and access logging.

use crate::config::AppState;
use crate::handler::endpoints;
use crate::http::{self, QueryParams};
use crate::logger::{self, AccessLogEntry, AccessLogFormat};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub method: &'a Method,
    pub path: &'a str,
    pub query: QueryParams,
    pub is_head: bool,
}

impl<'a> RequestContext<'a> {
    pub fn new(method: &'a Method, path: &'a str, raw_query: Option<&str>) -> Self {
        Self {
            method,
            path,
            query: QueryParams::parse(raw_query),
            is_head: *method == Method::HEAD,
        }
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let ctx = RequestContext::new(req.method(), req.uri().path(), req.uri().query());

    let mut response = route_request(&ctx, &state).await;
    http::apply_common_headers(&mut response, &state.config.http);

    if state.config.logging.access_log {
        log_access(&req, &response, peer_addr, started, &state);
    }

    Ok(response)
}

/// Route request based on method, path and configuration
pub async fn route_request(ctx: &RequestContext<'_>, state: &AppState) -> Response<Full<Bytes>> {
    // 1. Check HTTP method
    match *ctx.method {
        Method::GET | Method::HEAD => {}
        Method::OPTIONS => return http::build_options_response(state.config.http.enable_cors),
        _ => {
            logger::log_warning(&format!("Method not allowed: {}", ctx.method));
            return http::build_405_response();
        }
    }

    let routes = &state.config.routes;

    // 2. Health check endpoints
    if routes.health.enabled
        && (ctx.path == routes.health.liveness_path || ctx.path == routes.health.readiness_path)
    {
        return http::build_health_response("ok", ctx.is_head);
    }

    // 3. Feed endpoints
    if routes.changelog_paths.iter().any(|p| p == ctx.path) {
        return endpoints::serve_changelog(ctx, state).await;
    }
    if routes.news_paths.iter().any(|p| p == ctx.path) {
        return endpoints::serve_news(ctx, state).await;
    }

    http::build_404_response()
}

fn log_access<B>(
    req: &Request<B>,
    response: &Response<Full<Bytes>>,
    peer_addr: SocketAddr,
    started: Instant,
    state: &AppState,
) {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = format!("{:?}", req.version())
        .trim_start_matches("HTTP/")
        .to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = sent_body_bytes(req.method(), response);
    entry.referer = header("referer");
    entry.user_agent = header("user-agent");
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    let format = AccessLogFormat::from_name(&state.config.logging.access_log_format)
        .unwrap_or(AccessLogFormat::Combined);
    logger::log_access(&entry, format);
}

/// Body bytes actually written; HEAD responses advertise a length but send none
fn sent_body_bytes(method: &Method, response: &Response<Full<Bytes>>) -> usize {
    if *method == Method::HEAD {
        return 0;
    }
    response
        .headers()
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use http_body_util::BodyExt;
    use tempfile::TempDir;

    const CHANGELOG: &str = "# Changelog\n\n## [2.0]\n- Two\n\n## [1.5]\n- One five\n\n## [1.0]\n- One\n";
    const NEWS: &str = r#"[
        {"title":"Hello","content":"World","date":"2024-02-01","start_version":"1.0","end_version":"2.0"}
    ]"#;

    fn test_state() -> (TempDir, AppState) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("CHANGELOG.md"), CHANGELOG).unwrap();
        std::fs::write(dir.path().join("news.json"), NEWS).unwrap();

        let mut config = Config::from_defaults().unwrap();
        config.feeds.root_dir = dir.path().to_path_buf();
        (dir, AppState::new(config))
    }

    async fn get(state: &AppState, method: &Method, path: &str, query: Option<&str>) -> (u16, String) {
        let ctx = RequestContext::new(method, path, query);
        let response = route_request(&ctx, state).await;
        let status = response.status().as_u16();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_changelog_route() {
        let (_dir, state) = test_state();
        let (status, body) = get(
            &state,
            &Method::GET,
            "/changelog.php",
            Some("version=1.5&lastKnownVersion=1.0"),
        )
        .await;
        assert_eq!(status, 200);
        assert!(body.contains("One five"));
        assert!(!body.contains("<li>One</li>"));
        assert!(!body.contains("Two"));
    }

    #[tokio::test]
    async fn test_changelog_next_section() {
        let (_dir, state) = test_state();
        let (_, body) = get(
            &state,
            &Method::GET,
            "/changelog",
            Some("version=2.0&lastKnownVersion=next"),
        )
        .await;
        assert!(body.contains("<li>Two</li>"));
        assert!(!body.contains("One five"));
    }

    #[tokio::test]
    async fn test_changelog_missing_file() {
        let (_dir, state) = test_state();
        let (status, body) = get(&state, &Method::GET, "/changelog", Some("fileURL=missing.md")).await;
        assert_eq!(status, 404);
        assert_eq!(body, "File not found");
    }

    #[tokio::test]
    async fn test_changelog_traversal_forbidden() {
        let (_dir, state) = test_state();
        let (status, _) = get(
            &state,
            &Method::GET,
            "/changelog",
            Some("fileURL=..%2F..%2Fetc%2Fpasswd"),
        )
        .await;
        assert_eq!(status, 403);
    }

    #[tokio::test]
    async fn test_news_route() {
        let (_dir, state) = test_state();
        let (status, body) = get(
            &state,
            &Method::GET,
            "/news.php",
            Some("lastCheckTime=2024-01-01&buildNumber=1.5"),
        )
        .await;
        assert_eq!(status, 200);
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["news"], "<div align='center'><h2>Hello</h2></div><p>World</p><br>");
        assert!(value["serverTimestamp"].is_i64());
    }

    #[tokio::test]
    async fn test_news_missing_parameter() {
        let (_dir, state) = test_state();
        let (status, body) = get(&state, &Method::GET, "/news", Some("buildNumber=1.5")).await;
        assert_eq!(status, 200);
        assert_eq!(body, r#"{"error":"No lastCheckTime specified"}"#);
    }

    #[tokio::test]
    async fn test_news_get_time() {
        let (_dir, state) = test_state();
        let (status, body) = get(&state, &Method::GET, "/news", Some("getTime&fileURL=..")).await;
        assert_eq!(status, 200);
        assert!(body.parse::<i64>().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_news_broken_feed() {
        let (dir, state) = test_state();
        std::fs::write(dir.path().join("broken.json"), "[{").unwrap();
        let (status, body) = get(
            &state,
            &Method::GET,
            "/news",
            Some("lastCheckTime=0&buildNumber=1&fileURL=broken.json"),
        )
        .await;
        assert_eq!(status, 500);
        assert_eq!(body, r#"{"error":"Invalid news file"}"#);
    }

    #[tokio::test]
    async fn test_head_has_no_body() {
        let (_dir, state) = test_state();
        let (status, body) = get(&state, &Method::HEAD, "/changelog", None).await;
        assert_eq!(status, 200);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_methods_and_unknown_paths() {
        let (_dir, state) = test_state();
        assert_eq!(get(&state, &Method::POST, "/news", None).await.0, 405);
        assert_eq!(get(&state, &Method::OPTIONS, "/news", None).await.0, 204);
        assert_eq!(get(&state, &Method::GET, "/nope", None).await.0, 404);
        assert_eq!(get(&state, &Method::GET, "/healthz", None).await, (200, "ok".to_string()));
    }

    #[tokio::test]
    async fn test_handle_request_adds_server_header() {
        let (_dir, state) = test_state();
        let req = Request::builder().uri("/readyz").body(()).unwrap();
        let peer: SocketAddr = "127.0.0.1:50000".parse().unwrap();
        let response = handle_request(req, Arc::new(state), peer).await.unwrap();
        assert_eq!(response.status(), 200);
        assert!(response
            .headers()
            .get("server")
            .and_then(|v| v.to_str().ok())
            .unwrap()
            .starts_with("relnotes/"));
    }

    #[tokio::test]
    async fn test_head_logs_no_body_bytes() {
        let (_dir, state) = test_state();

        let ctx = RequestContext::new(&Method::GET, "/changelog", None);
        let response = route_request(&ctx, &state).await;
        let sent = sent_body_bytes(&Method::GET, &response);
        assert!(sent > 0);

        let ctx = RequestContext::new(&Method::HEAD, "/changelog", None);
        let response = route_request(&ctx, &state).await;
        assert_eq!(
            response.headers().get("content-length").and_then(|v| v.to_str().ok()),
            Some(sent.to_string().as_str())
        );
        assert_eq!(sent_body_bytes(&Method::HEAD, &response), 0);
    }
}
