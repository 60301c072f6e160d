use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use clap::Parser;
use futures::{Stream, StreamExt};
use newscast::{
    openai::OpenAIClient, tracing::init_tracing_subscriber, types::PipelineRun, AvatarRenderer,
    Config, DidClient, NewsScraper, NewscastProcessor,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

#[derive(Parser)]
#[command(name = "newscast-server", about = "HTTP service for news avatar videos")]
struct Cli {
    /// Address to listen on
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8000")]
    bind: String,

    #[command(flatten)]
    config: Config,
}

type Processor = NewscastProcessor<NewsScraper, OpenAIClient, DidClient>;

struct AppState {
    processor: Arc<Processor>,
    config: Config,
}

#[derive(Serialize)]
struct GenerateResponse {
    status: &'static str,
    #[serde(flatten)]
    run: PipelineRun,
}

#[derive(Debug, Deserialize)]
struct GenerateParams {
    article_count: Option<usize>,
}

async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Automated News Video Generator",
        "endpoints": {
            "GET /health": "Service health",
            "POST /generate-news-video": "Generate a news video and wait for the result",
            "GET /generate-news-video/stream": "Generate a news video with server-sent progress",
            "GET /test-components": "Show configured providers",
            "GET /videos/{talk_id}": "Render job status",
            "DELETE /videos/{talk_id}": "Delete a rendered video"
        }
    }))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": Utc::now(),
    }))
}

async fn generate_news_video(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GenerateParams>,
) -> impl IntoResponse {
    let article_count = state.config.article_count_for(params.article_count);
    tracing::info!(article_count, "Starting news video generation");

    match state.processor.run(article_count).await {
        Ok(run) => Json(GenerateResponse {
            status: "success",
            run,
        })
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, stage = %e.stage, "News video generation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "detail": e.to_string(),
                    "stage": e.stage,
                })),
            )
                .into_response()
        }
    }
}

async fn generate_news_video_stream(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GenerateParams>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let article_count = state.config.article_count_for(params.article_count);
    tracing::info!(article_count, "Starting progressive news video generation");

    let events = state
        .processor
        .clone()
        .run_with_progress(article_count)
        .map(|event| Event::default().json_data(event));

    Sse::new(events).keep_alive(KeepAlive::default())
}

async fn test_components(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let config = &state.config;

    Json(serde_json::json!({
        "news_sources": {
            "configured": !state.processor.article_source().sources().is_empty(),
            "sources": state.processor.article_source().sources(),
        },
        "openai": {
            "configured": !config.openai_key.trim().is_empty(),
            "model": state.processor.summarizer().model(),
        },
        "d_id": {
            "configured": !config.did_key.trim().is_empty(),
            "base_url": config.did_base_url,
            "presenter_id": config.presenter_id,
            "voice_id": config.voice_id,
        },
        "script_style": config.script_style.as_str(),
    }))
}

async fn video_status(
    State(state): State<Arc<AppState>>,
    Path(talk_id): Path<String>,
) -> impl IntoResponse {
    match state.processor.renderer().poll(&talk_id).await {
        Ok(job) => Json(job).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, %talk_id, "Failed to fetch video status");
            (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({ "detail": e.to_string() })),
            )
                .into_response()
        }
    }
}

async fn delete_video(
    State(state): State<Arc<AppState>>,
    Path(talk_id): Path<String>,
) -> impl IntoResponse {
    let deleted = state.processor.renderer().delete(&talk_id).await;
    Json(serde_json::json!({ "deleted": deleted }))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = ?e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let _guard = sentry::init((
        std::env::var("SENTRY_DSN").unwrap_or_default(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: Some("production".into()),
            ..Default::default()
        },
    ));

    let cli = Cli::parse();
    init_tracing_subscriber()?;

    let config = cli.config.validate()?;
    let state = Arc::new(AppState {
        processor: Arc::new(Processor::from_config(&config)?),
        config,
    });

    let app = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/generate-news-video", post(generate_news_video))
        .route("/generate-news-video/stream", get(generate_news_video_stream))
        .route("/test-components", get(test_components))
        .route("/videos/{talk_id}", get(video_status).delete(delete_video))
        .with_state(state)
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&cli.bind)
        .await
        .with_context(|| format!("Failed to bind {}", cli.bind))?;
    tracing::info!(addr = %cli.bind, "newscast server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
