//! smartcity REST server.
//!
//! **Questions:**
//! - `POST /ask` — answer a natural-language question
//! - `GET  /suggestions` — example questions
//! - `GET  /templates` — query template catalog
//!
//! **Entities:**
//! - `POST   /entities` — create an instance
//! - `GET    /entities/{class}` — list instances of a class
//! - `DELETE /entities/{id}` — delete an instance (same route, by method)
//! - `POST   /links` — link two instances
//! - `GET    /stats` — instance counts per class
//! - `GET    /search?q=…` — search instances by label
//!
//! **Health:**
//! - `GET  /health` — triple store and model server status
//!
//! Build and run: `cargo run --features server --bin smartcity-server`

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use miette::IntoDiagnostic;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;

use smartcity_nlq::catalog::{SUGGESTED_QUESTIONS, TEMPLATES};
use smartcity_nlq::config::AppConfig;
use smartcity_nlq::entities::{EntityError, EntityService, NewEntity, NewLink};
use smartcity_nlq::llm::{OllamaClient, ProbeReport};
use smartcity_nlq::pipeline::{AskError, AskResponse, QueryPipeline, SchemaMode};
use smartcity_nlq::store::{FusekiStore, TripleStore};

// ── Server state ──────────────────────────────────────────────────────────

struct ServerState {
    store: Arc<dyn TripleStore>,
    pipeline: QueryPipeline,
    entities: EntityService,
    llm: Option<OllamaClient>,
}

impl ServerState {
    fn new(config: &AppConfig) -> Self {
        let store: Arc<dyn TripleStore> = Arc::new(FusekiStore::new(config.fuseki()));
        let mut pipeline = QueryPipeline::new(Arc::clone(&store));
        let llm = if config.llm.enabled {
            pipeline = pipeline.with_generator(Arc::new(OllamaClient::new(config.ollama())));
            Some(OllamaClient::new(config.ollama()))
        } else {
            None
        };
        if config.llm.discover_schema {
            pipeline = pipeline.with_schema(SchemaMode::Discover);
        }
        Self {
            entities: EntityService::new(Arc::clone(&store)),
            store,
            pipeline,
            llm,
        }
    }
}

type SharedState = Arc<ServerState>;

// ── Request / response types ──────────────────────────────────────────────

#[derive(Deserialize)]
struct AskRequest {
    #[serde(default)]
    question: String,
}

#[derive(Serialize)]
struct AskErrorResponse {
    error: String,
    question: String,
    sparql_query: Option<String>,
}

#[derive(Serialize)]
struct StoreHealth {
    available: bool,
    endpoint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    store: StoreHealth,
    llm: Option<ProbeReport>,
}

#[derive(Serialize)]
struct TemplateInfo {
    key: &'static str,
    requires_entity: bool,
}

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
}

/// JSON error body with a status code.
struct ApiError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<EntityError> for ApiError {
    fn from(err: EntityError) -> Self {
        let status = match &err {
            EntityError::NotFound { .. } => StatusCode::NOT_FOUND,
            EntityError::Store(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::BAD_REQUEST,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        tracing::error!(error = %err, "blocking task failed");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "internal error".into(),
        }
    }
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn ask(
    State(state): State<SharedState>,
    Json(req): Json<AskRequest>,
) -> Result<Json<AskResponse>, (StatusCode, Json<AskErrorResponse>)> {
    let question = req.question.clone();
    let result = tokio::task::spawn_blocking(move || state.pipeline.ask(&req.question)).await;

    match result {
        Ok(Ok(answer)) => Ok(Json(answer)),
        Ok(Err(err)) => {
            let status = match &err {
                AskError::EmptyQuestion => StatusCode::BAD_REQUEST,
                AskError::Execution { .. } => StatusCode::BAD_GATEWAY,
            };
            Err((
                status,
                Json(AskErrorResponse {
                    error: err.to_string(),
                    question,
                    sparql_query: err.query().map(str::to_string),
                }),
            ))
        }
        Err(join) => {
            tracing::error!(error = %join, "ask task failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(AskErrorResponse {
                    error: "internal error".into(),
                    question,
                    sparql_query: None,
                }),
            ))
        }
    }
}

async fn health(State(state): State<SharedState>) -> Result<Json<HealthResponse>, ApiError> {
    let report = tokio::task::spawn_blocking(move || {
        let store = match state.store.ping() {
            Ok(()) => StoreHealth {
                available: true,
                endpoint: state.store.endpoint(),
                error: None,
            },
            Err(e) => StoreHealth {
                available: false,
                endpoint: state.store.endpoint(),
                error: Some(e.to_string()),
            },
        };
        let llm = state.llm.as_ref().map(OllamaClient::probe);
        let healthy = store.available && llm.as_ref().is_none_or(|p| p.available);
        HealthResponse {
            status: if healthy { "ok" } else { "degraded" },
            version: env!("CARGO_PKG_VERSION"),
            store,
            llm,
        }
    })
    .await?;
    Ok(Json(report))
}

async fn suggestions() -> Json<serde_json::Value> {
    Json(json!({ "questions": SUGGESTED_QUESTIONS }))
}

async fn templates() -> Json<Vec<TemplateInfo>> {
    Json(
        TEMPLATES
            .iter()
            .map(|t| TemplateInfo {
                key: t.key,
                requires_entity: t.requires_entity(),
            })
            .collect(),
    )
}

async fn create_entity(
    State(state): State<SharedState>,
    Json(entity): Json<NewEntity>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let (id, class) = tokio::task::spawn_blocking(move || {
        state
            .entities
            .create(&entity)
            .map(|class| (entity.id.clone(), class))
    })
    .await??;
    Ok((StatusCode::CREATED, Json(json!({ "id": id, "class": class }))))
}

async fn list_entities(
    State(state): State<SharedState>,
    Path(class): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let records = tokio::task::spawn_blocking(move || state.entities.list(&class)).await??;
    Ok(Json(json!({ "count": records.len(), "results": records })))
}

async fn delete_entity(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let deleted = id.clone();
    tokio::task::spawn_blocking(move || state.entities.delete(&id)).await??;
    Ok(Json(json!({ "deleted": deleted })))
}

async fn create_link(
    State(state): State<SharedState>,
    Json(link): Json<NewLink>,
) -> Result<(StatusCode, Json<NewLink>), ApiError> {
    let link = tokio::task::spawn_blocking(move || state.entities.link(&link).map(|()| link)).await??;
    Ok((StatusCode::CREATED, Json(link)))
}

async fn stats(State(state): State<SharedState>) -> Result<Json<serde_json::Value>, ApiError> {
    let counts = tokio::task::spawn_blocking(move || state.entities.class_counts()).await??;
    Ok(Json(json!({ "stats": counts })))
}

async fn search(
    State(state): State<SharedState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let hits = tokio::task::spawn_blocking(move || state.entities.search(&params.q)).await??;
    Ok(Json(json!({ "count": hits.len(), "results": hits })))
}

// ── Main ──────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,ureq=warn")),
        )
        .init();

    let config = AppConfig::load(None)?;
    let addr = config.listen_addr();
    let state = Arc::new(ServerState::new(&config));

    tracing::info!(
        store = %state.store.endpoint(),
        llm = config.llm.enabled,
        model = %config.llm.model,
        "smartcity server initialized"
    );

    let app = Router::new()
        // Health.
        .route("/health", get(health))
        // Questions.
        .route("/ask", post(ask))
        .route("/suggestions", get(suggestions))
        .route("/templates", get(templates))
        // Entities.
        .route("/entities", post(create_entity))
        .route("/entities/{name}", get(list_entities).delete(delete_entity))
        .route("/links", post(create_link))
        .route("/stats", get(stats))
        .route("/search", get(search))
        .layer(CorsLayer::permissive())
        .with_state(state);

    tracing::info!("smartcity server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await.into_diagnostic()?;
    axum::serve(listener, app).await.into_diagnostic()?;
    Ok(())
}
