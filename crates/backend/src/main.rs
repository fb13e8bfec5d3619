mod assets;
mod config;
mod graphql;
mod hub;

use std::path::Path;
use std::sync::Arc;

use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::extract::Path as UrlPath;
use axum::http::{HeaderValue, StatusCode};
use axum::{extract::State, response::Html, routing::get, routing::post, Router};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use config::Config;
use graphql::Schema;
use hub::FeedHub;

async fn graphql_handler(State(schema): State<Schema>, req: GraphQLRequest) -> GraphQLResponse {
    schema.execute(req.into_inner()).await.into()
}

async fn graphiql() -> Html<String> {
    Html(
        async_graphql::http::GraphiQLSource::build()
            .endpoint("/graphql")
            .finish(),
    )
}

/// Gateway-facing publish endpoint: the raw body is the position batch.
async fn publish_handler(
    State(hub): State<Arc<FeedHub>>,
    UrlPath(topic): UrlPath<String>,
    body: String,
) -> (StatusCode, String) {
    if config::normalize_topic(&topic) != hub.topic() {
        tracing::warn!(topic = %topic, "publish to unknown topic");
        return (StatusCode::NOT_FOUND, format!("Unknown topic: {}", topic));
    }
    match hub.publish(&body) {
        Ok(message) => (StatusCode::ACCEPTED, message.id.to_string()),
        Err(e) => (StatusCode::BAD_REQUEST, e),
    }
}

/// Build a cache-controlled static file router.
///
/// Separated so tests can exercise the caching layer with arbitrary directories.
fn cached_static_router(dir: &Path, cache_header: &'static str) -> Router {
    let layer = SetResponseHeaderLayer::overriding(
        axum::http::header::CACHE_CONTROL,
        HeaderValue::from_static(cache_header),
    );
    Router::new()
        .fallback_service(ServeDir::new(dir))
        .layer(layer)
}

const CACHE_1DAY: &str = "public, max-age=86400, must-revalidate";
const CACHE_IMMUTABLE: &str = "public, max-age=31536000, immutable";

fn feed_router(hub: Arc<FeedHub>) -> Router {
    Router::new()
        .route("/publish/{topic}", post(publish_handler))
        .with_state(hub)
}

/// Build the full application router.
fn build_app(schema: Schema, hub: Arc<FeedHub>, assets_dir: &Path) -> Router {
    let static_files = Router::new()
        .nest("/static", cached_static_router(assets_dir, CACHE_1DAY))
        .nest(
            "/dist",
            cached_static_router(Path::new("dist"), CACHE_IMMUTABLE),
        )
        .nest(
            "/assets",
            cached_static_router(Path::new("dist/assets"), CACHE_IMMUTABLE),
        );

    Router::new()
        .route("/graphql", get(graphiql).post(graphql_handler))
        .route("/", get(serve_index))
        .with_state(schema)
        .merge(feed_router(hub))
        .merge(static_files)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    let loaded_assets = match assets::Assets::load(&config.assets_dir) {
        Ok(assets) => Arc::new(assets),
        Err(e) => {
            tracing::error!(error = %e, "failed to load assets");
            std::process::exit(1);
        }
    };

    let hub = FeedHub::new(config.feed_topic.clone());
    let schema = graphql::build_schema(loaded_assets, hub.clone());
    let app = build_app(schema, hub, &config.assets_dir);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!(port = config.port, topic = %config.feed_topic, "Server running at http://localhost:{}", config.port);
    tracing::info!("GraphiQL playground at http://localhost:{}/graphql", config.port);
    tracing::info!("Publish position batches to http://localhost:{}/publish/{}", config.port, config.feed_topic);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

async fn serve_index() -> Html<String> {
    // Try to serve the built frontend, fall back to a simple message
    match std::fs::read_to_string("dist/index.html") {
        Ok(html) => Html(html),
        Err(_) => Html(
            r#"<!DOCTYPE html>
<html>
<head><title>Paddock Monitor</title></head>
<body>
<h1>Paddock Monitor</h1>
<p>Frontend not built yet. Visit <a href="/graphql">GraphiQL</a> to explore the API.</p>
</body>
</html>"#
                .to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    /// Build a test app that serves files from the given temp directories.
    fn test_app(assets_dir: &Path, dist_dir: &Path) -> Router {
        Router::new()
            .nest("/static", cached_static_router(assets_dir, CACHE_1DAY))
            .nest("/dist", cached_static_router(dist_dir, CACHE_IMMUTABLE))
    }

    /// Create a temp dir with a test file and return the dir path.
    fn temp_dir_with_file(file_name: &str, content: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(file_name), content).unwrap();
        dir
    }

    fn publish_request(topic: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/publish/{}", topic))
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_static_assets_have_1day_cache() {
        let assets_dir = temp_dir_with_file("paddocks.json", "[]");
        let dist_dir = temp_dir_with_file("index.html", "<html></html>");

        let app = test_app(assets_dir.path(), dist_dir.path());

        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/static/paddocks.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("cache-control").unwrap(),
            "public, max-age=86400, must-revalidate"
        );
    }

    #[tokio::test]
    async fn test_dist_bundles_have_immutable_cache() {
        let assets_dir = temp_dir_with_file("paddocks.json", "[]");
        let dist_dir = temp_dir_with_file("app-abc123.js", "bundle()");

        let app = test_app(assets_dir.path(), dist_dir.path());

        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/dist/app-abc123.js")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("cache-control").unwrap(),
            "public, max-age=31536000, immutable"
        );
    }

    #[tokio::test]
    async fn test_missing_static_file_returns_404() {
        let assets_dir = temp_dir_with_file("paddocks.json", "[]");
        let dist_dir = temp_dir_with_file("index.html", "<html></html>");

        let app = test_app(assets_dir.path(), dist_dir.path());

        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/static/nonexistent.txt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_publish_accepts_valid_batch() {
        let hub = FeedHub::new("NoraPublish");
        let resp = feed_router(hub.clone())
            .oneshot(publish_request("NoraPublish", r#"{"A":[1,1,0]}"#))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::ACCEPTED);
        assert_eq!(hub.latest_batch().len(), 1);
    }

    #[tokio::test]
    async fn test_publish_rejects_invalid_json() {
        let hub = FeedHub::new("NoraPublish");
        let resp = feed_router(hub.clone())
            .oneshot(publish_request("NoraPublish", "{not json"))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(hub.latest().is_none());
    }

    #[tokio::test]
    async fn test_publish_rejects_non_object_body() {
        let hub = FeedHub::new("NoraPublish");
        let resp = feed_router(hub.clone())
            .oneshot(publish_request("NoraPublish", "[1,2,3]"))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(hub.latest().is_none());
        assert_eq!(hub.stats().rejected, 1);
        assert_eq!(hub.stats().received, 0);
    }

    #[tokio::test]
    async fn test_publish_unknown_topic_is_404() {
        let hub = FeedHub::new("NoraPublish");
        let resp = feed_router(hub.clone())
            .oneshot(publish_request("modelPublish", r#"{"A":[1,1,0]}"#))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(hub.latest().is_none());
    }

    #[tokio::test]
    async fn test_graphql_route_serves_feed_status() {
        let dir = temp_dir_with_file("paddocks.json", "[]");
        let hub = FeedHub::new("NoraPublish");
        let assets = Arc::new(assets::Assets::load(dir.path()).unwrap());
        let app = build_app(graphql::build_schema(assets, hub.clone()), hub, dir.path());

        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/graphql")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"query":"{ feedStatus { topic } }"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
    }
}
