use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use clap::Parser;
use hybridrec::{
    init_tracing, Artifacts, Config, EngineHandle, RecommendationEngine, RecommendationResponse,
    UserId,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "hybridrec-server", about = "Hybrid two-stage recommendation server")]
struct Args {
    /// Path to a configuration file.
    #[arg(long)]
    config: Option<String>,

    /// Override the model artifacts directory.
    #[arg(long)]
    models_dir: Option<PathBuf>,
}

#[derive(Clone)]
struct AppState {
    handle: EngineHandle,
    config: Arc<Config>,
}

#[derive(Debug, Deserialize)]
struct RecommendQuery {
    k: Option<usize>,
    enrich: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct PopularQuery {
    k: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    message: String,
}

impl<T> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: "Success".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct HealthStatus {
    status: &'static str,
    ready: bool,
}

async fn health_check(State(state): State<AppState>) -> Json<ApiResponse<HealthStatus>> {
    Json(ApiResponse::success(HealthStatus {
        status: "healthy",
        ready: state.handle.is_ready(),
    }))
}

fn clamp_k(requested: Option<usize>, config: &Config) -> usize {
    requested
        .unwrap_or(config.engine.default_k)
        .clamp(1, config.engine.max_k)
}

async fn get_recommendations(
    State(state): State<AppState>,
    Path(user_id): Path<u64>,
    Query(params): Query<RecommendQuery>,
) -> Result<Json<ApiResponse<RecommendationResponse>>, StatusCode> {
    let engine = state
        .handle
        .get()
        .ok_or(StatusCode::SERVICE_UNAVAILABLE)?;
    let k = clamp_k(params.k, &state.config);
    let enrich = params.enrich.unwrap_or(false);

    match engine.recommend(UserId(user_id), k, enrich) {
        Ok(recommendations) => Ok(Json(ApiResponse::success(RecommendationResponse::new(
            UserId(user_id),
            enrich,
            recommendations,
        )))),
        Err(e) => {
            error!("failed to get recommendations for user {user_id}: {e}");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

async fn get_popular(
    State(state): State<AppState>,
    Query(params): Query<PopularQuery>,
) -> Result<Json<ApiResponse<Vec<hybridrec::Recommendation>>>, StatusCode> {
    let engine = state
        .handle
        .get()
        .ok_or(StatusCode::SERVICE_UNAVAILABLE)?;
    let k = clamp_k(params.k, &state.config);

    // Discovery endpoint, enriched by default.
    Ok(Json(ApiResponse::success(engine.popular(k, true))))
}

fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/recommend/:user_id", get(get_recommendations))
        .route("/popular", get(get_popular))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();
    let mut config = match args.config.as_deref() {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(dir) = args.models_dir {
        config.artifacts.dir = dir;
    }

    let state = AppState {
        handle: EngineHandle::new(),
        config: Arc::new(config.clone()),
    };

    // One-time blocking load; the engine is published atomically only after
    // the whole bundle loaded. Requests served before that get 503.
    let handle = state.handle.clone();
    let load_config = config.clone();
    tokio::task::spawn_blocking(move || {
        match Artifacts::load(&load_config.artifacts.dir) {
            Ok(artifacts) => {
                let engine = RecommendationEngine::new(artifacts, &load_config.engine);
                if handle.publish(engine) {
                    info!("recommendation engine ready");
                }
            }
            Err(e) => {
                error!("failed to load model artifacts: {e:#}");
                std::process::exit(1);
            }
        }
    });

    let app = create_router(state);
    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("server listening on {addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
