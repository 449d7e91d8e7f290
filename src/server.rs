use anyhow::Context;
use axum::{
    extract::Request,
    http::{uri::PathAndQuery, StatusCode, Uri},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};
use std::net::SocketAddr;
use std::path::{Component, Path, PathBuf};
use tower::util::{MapRequest, MapRequestLayer};
use tower::Layer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use url::Url;

pub const DEFAULT_PORT: u16 = 3000;

/// The site router wrapped in the path decoder, so decoding happens before routing.
pub type SiteService = MapRequest<Router, fn(Request) -> Request>;

/// Percent-decode a request path once and re-encode it into a valid URI path.
/// Returns `None` when the path has nothing to decode or does not decode to UTF-8.
fn decode_path(path: &str) -> Option<String> {
    if !path.contains('%') {
        return None;
    }
    let decoded = urlencoding::decode(path).ok()?;
    let mut url = Url::parse("http://localhost/").ok()?;
    url.set_path(&decoded);
    Some(url.path().to_string())
}

fn rewrite_uri(uri: &Uri) -> Option<Uri> {
    let mut rebuilt = decode_path(uri.path())?;
    if let Some(query) = uri.query() {
        rebuilt.push('?');
        rebuilt.push_str(query);
    }
    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(rebuilt.parse::<PathAndQuery>().ok()?);
    Uri::from_parts(parts).ok()
}

fn decode_request_path(mut req: Request) -> Request {
    if let Some(uri) = rewrite_uri(req.uri()) {
        *req.uri_mut() = uri;
    }
    req
}

/// Dotfiles (`.env` holds the classifier token) and parent segments.
fn is_hidden_path(path: &str) -> bool {
    let decoded = urlencoding::decode(path)
        .map(|p| p.into_owned())
        .unwrap_or_else(|_| path.to_string());
    Path::new(&decoded).components().any(|component| match component {
        Component::ParentDir => true,
        Component::Normal(name) => name.to_string_lossy().starts_with('.'),
        _ => false,
    })
}

async fn reject_hidden(req: Request, next: Next) -> Response {
    if is_hidden_path(req.uri().path()) {
        warn!("[SERVER] Refused hidden path {}", req.uri().path());
        return StatusCode::NOT_FOUND.into_response();
    }
    next.run(req).await
}

pub fn create_router(root: &Path) -> Router {
    Router::new()
        .route_service("/", ServeFile::new(root.join("index.html")))
        .fallback_service(ServeDir::new(root))
        .layer(middleware::from_fn(reject_hidden))
        .layer(TraceLayer::new_for_http())
}

pub fn create_app(root: &Path) -> SiteService {
    let decode: fn(Request) -> Request = decode_request_path;
    MapRequestLayer::new(decode).layer(create_router(root))
}

pub async fn start_server(port: u16, root: PathBuf) -> anyhow::Result<()> {
    if !root.join("index.html").is_file() {
        warn!("[SERVER] No index.html in {:?}; '/' will answer 404", root);
    }
    let app = create_app(&root);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("could not bind {}", addr))?;
    info!("[SERVER] Serving {:?} on http://localhost:{}", root, port);

    axum::serve(listener, axum::ServiceExt::<Request>::into_make_service(app))
        .await
        .context("server stopped unexpectedly")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_path() {
        assert_eq!(decode_path("/index.html"), None);
        assert_eq!(decode_path("/a%20b.mp4").as_deref(), Some("/a%20b.mp4"));
        assert_eq!(decode_path("/%2541.txt").as_deref(), Some("/%41.txt"));
        assert_eq!(
            decode_path("/%E8%A7%86%E9%A2%91/x.mp4").as_deref(),
            Some("/%E8%A7%86%E9%A2%91/x.mp4")
        );
        // Not UTF-8 once decoded: left alone.
        assert_eq!(decode_path("/%FF.mp4"), None);
    }

    #[test]
    fn test_rewrite_keeps_query() {
        let uri: Uri = "/%2541.txt?t=1".parse().unwrap();
        let rewritten = rewrite_uri(&uri).unwrap();
        assert_eq!(rewritten.path(), "/%41.txt");
        assert_eq!(rewritten.query(), Some("t=1"));
    }

    #[test]
    fn test_hidden_paths() {
        assert!(is_hidden_path("/.env"));
        assert!(is_hidden_path("/%2Eenv"));
        assert!(is_hidden_path("/assets/.git/config"));
        assert!(is_hidden_path("/../secret.txt"));
        assert!(!is_hidden_path("/"));
        assert!(!is_hidden_path("/videos/clip.mp4"));
        assert!(!is_hidden_path("/a.b/c.mp4"));
    }
}
