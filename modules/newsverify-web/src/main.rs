use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{Form, State},
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use newsverify_common::{Config, VerificationFailure, VerificationOutcome};
use newsverify_pipeline::Verifier;

mod templates;
use templates::*;

// --- App State ---

struct AppState {
    verifier: Verifier,
    config: Config,
}

#[derive(Deserialize)]
struct VerifyRequest {
    #[serde(default)]
    article_url: String,
}

// --- Main ---

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("newsverify=info".parse()?))
        .init();

    let config = Config::from_env()?;

    let state = Arc::new(AppState {
        verifier: Verifier::from_config(&config)?,
        config,
    });

    let addr = format!("{}:{}", state.config.web_host, state.config.web_port);
    info!("News verification web server starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}

fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/verify", post(verify_page))
        .route("/api/verify", post(api_verify))
        .route("/health", get(health))
        .with_state(state)
        // Reports are per-request; never cache them
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::PRAGMA,
            HeaderValue::from_static("no-cache"),
        ))
        // Method + path only; submitted URLs stay out of request spans
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}

// --- Handlers ---

async fn index_page() -> impl IntoResponse {
    Html(render_index(None, ""))
}

async fn health() -> &'static str {
    "ok"
}

async fn verify_page(
    State(state): State<Arc<AppState>>,
    Form(req): Form<VerifyRequest>,
) -> Response {
    let url = req.article_url.trim();
    if url.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Html(render_index(Some(INVALID_URL_MESSAGE), "")),
        )
            .into_response();
    }

    match state.verifier.verify_article(url).await {
        VerificationOutcome::Report(report) => {
            Html(render_report(&report, &state.config)).into_response()
        }
        VerificationOutcome::Failed(failure) => {
            warn!(error = %failure.error, "Verification returned an error");
            (StatusCode::BAD_GATEWAY, Html(render_failure(&failure, url))).into_response()
        }
    }
}

async fn api_verify(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VerifyRequest>,
) -> Response {
    let url = req.article_url.trim();
    if url.is_empty() {
        let failure = VerificationFailure {
            error: INVALID_URL_MESSAGE.to_string(),
            details: None,
        };
        return (StatusCode::BAD_REQUEST, Json(failure)).into_response();
    }

    let outcome = state.verifier.verify_article(url).await;
    let status = if outcome.is_report() {
        StatusCode::OK
    } else {
        StatusCode::BAD_GATEWAY
    };
    (status, Json(outcome)).into_response()
}
