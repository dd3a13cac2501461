//! HTTP server with one REST endpoint per capability.
//!
//! Each non-chat endpoint deserializes its request, runs the capability
//! through the shared executor, stores the result for the requesting user,
//! and returns it under the capability's response field. The chatbot
//! endpoint instead aggregates the user's stored context into the chat
//! prompt and writes nothing back.

use anyhow::Result;
use axum::{
    extract::State,
    http::{header, HeaderValue, Method},
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

use crate::{
    agent,
    capability::Capability,
    context::{ContextStore, InMemoryContextStore},
    engine,
    error::Error,
    executor::{TaskExecutor, TaskInputs},
    settings::{ServerConfig, Settings},
};

/// Application state shared across HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub executor: Arc<TaskExecutor>,
    pub store: Arc<dyn ContextStore>,
    pub settings: Settings,
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    engine: String,
}

/// Trip-scoped request shared by seven capabilities.
///
/// Field names follow the frontend's camelCase payload; `user_id` stays
/// snake_case and only routes context, it is never rendered into a prompt.
#[derive(Debug, Clone, Deserialize)]
pub struct TripRequest {
    pub location: String,
    #[serde(rename = "startDate")]
    pub start_date: DateTime<Utc>,
    #[serde(rename = "endDate")]
    pub end_date: DateTime<Utc>,
    pub budget: f64,
    #[serde(rename = "travelStyle")]
    pub travel_style: String,
    #[serde(rename = "ecoFriendly")]
    pub eco_friendly: bool,
    #[serde(rename = "dynamicReplanning")]
    pub dynamic_replanning: bool,
    pub user_id: String,
}

impl TripRequest {
    /// Template inputs, keyed exactly like the trip placeholders. Dates go
    /// out in RFC 3339 so prompts stay readable and stable.
    fn to_inputs(&self) -> TaskInputs {
        let mut inputs = TaskInputs::new();
        inputs.set("location", self.location.clone());
        inputs.set("startDate", self.start_date.to_rfc3339());
        inputs.set("endDate", self.end_date.to_rfc3339());
        inputs.set("budget", self.budget);
        inputs.set("travelStyle", self.travel_style.clone());
        inputs.set("ecoFriendly", self.eco_friendly);
        inputs.set("dynamicReplanning", self.dynamic_replanning);
        inputs
    }
}

/// Single place lookup request.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceRequest {
    pub place_name: String,
    pub location: String,
    pub date: DateTime<Utc>,
    pub user_id: String,
}

impl PlaceRequest {
    fn to_inputs(&self) -> TaskInputs {
        let mut inputs = TaskInputs::new();
        inputs.set("place_name", self.place_name.clone());
        inputs.set("location", self.location.clone());
        inputs.set("date", self.date.to_rfc3339());
        inputs
    }
}

/// Chatbot request.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub user_id: String,
    pub message: String,
}

/// Create the HTTP router with all capability endpoints.
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.settings.server);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route(Capability::Plan.route(), post(generate_plan))
        .route(Capability::Budget.route(), post(compute_budget))
        .route(Capability::OptimizeBudget.route(), post(optimize_budget))
        .route(Capability::Replan.route(), post(replan_trip))
        .route(Capability::PlaceDetails.route(), post(place_details))
        .route(Capability::CityGuide.route(), post(city_guide))
        .route(Capability::EcoSuggestions.route(), post(eco_suggestions))
        .route(Capability::Hotels.route(), post(generate_hotels))
        .route(Capability::Chat.route(), post(chatbot))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    if !config.enable_cors {
        return CorsLayer::new();
    }

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    if config.cors_origins.iter().any(|origin| origin == "*") {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        layer.allow_origin(origins)
    }
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "TourMuse backend running" }))
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        engine: state.settings.engine.provider.clone(),
    })
}

async fn generate_plan(
    State(state): State<AppState>,
    Json(payload): Json<TripRequest>,
) -> Result<Json<Value>, Error> {
    run_trip(&state, Capability::Plan, &payload).await
}

async fn compute_budget(
    State(state): State<AppState>,
    Json(payload): Json<TripRequest>,
) -> Result<Json<Value>, Error> {
    run_trip(&state, Capability::Budget, &payload).await
}

async fn optimize_budget(
    State(state): State<AppState>,
    Json(payload): Json<TripRequest>,
) -> Result<Json<Value>, Error> {
    run_trip(&state, Capability::OptimizeBudget, &payload).await
}

async fn replan_trip(
    State(state): State<AppState>,
    Json(payload): Json<TripRequest>,
) -> Result<Json<Value>, Error> {
    run_trip(&state, Capability::Replan, &payload).await
}

async fn city_guide(
    State(state): State<AppState>,
    Json(payload): Json<TripRequest>,
) -> Result<Json<Value>, Error> {
    run_trip(&state, Capability::CityGuide, &payload).await
}

async fn eco_suggestions(
    State(state): State<AppState>,
    Json(payload): Json<TripRequest>,
) -> Result<Json<Value>, Error> {
    run_trip(&state, Capability::EcoSuggestions, &payload).await
}

async fn generate_hotels(
    State(state): State<AppState>,
    Json(payload): Json<TripRequest>,
) -> Result<Json<Value>, Error> {
    run_trip(&state, Capability::Hotels, &payload).await
}

async fn place_details(
    State(state): State<AppState>,
    Json(payload): Json<PlaceRequest>,
) -> Result<Json<Value>, Error> {
    let user_id = validated_user_id(&payload.user_id)?;
    dispatch(&state, Capability::PlaceDetails, user_id, payload.to_inputs()).await
}

/// Answer a user question from the stored trip context.
#[instrument(skip(state, payload))]
async fn chatbot(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<Value>, Error> {
    let user_id = validated_user_id(&payload.user_id)?;
    let context = state.store.resolve_context(user_id);

    let mut inputs = TaskInputs::new();
    inputs.set("user_message", payload.message.clone());
    for (key, value) in context {
        inputs.set(key, value);
    }

    let descriptor = agent::descriptor(Capability::Chat);
    let output = state.executor.execute(descriptor, &inputs).await?;

    // Chat answers are conversation, not trip state; nothing is written back.
    let mut body = Map::new();
    body.insert(Capability::Chat.response_field().to_string(), output.0);
    Ok(Json(Value::Object(body)))
}

async fn run_trip(
    state: &AppState,
    capability: Capability,
    payload: &TripRequest,
) -> Result<Json<Value>, Error> {
    let user_id = validated_user_id(&payload.user_id)?;
    dispatch(state, capability, user_id, payload.to_inputs()).await
}

/// Run a capability and store its result for the user. The store is only
/// touched after the executor succeeds.
#[instrument(skip(state, inputs))]
async fn dispatch(
    state: &AppState,
    capability: Capability,
    user_id: &str,
    inputs: TaskInputs,
) -> Result<Json<Value>, Error> {
    let descriptor = agent::descriptor(capability);
    let output = state.executor.execute(descriptor, &inputs).await?;

    let mut body = Map::new();
    body.insert(capability.response_field().to_string(), output.0.clone());
    state.store.put(user_id, capability, output);

    Ok(Json(Value::Object(body)))
}

fn validated_user_id(user_id: &str) -> Result<&str, Error> {
    if user_id.trim().is_empty() {
        return Err(Error::Validation("user_id must be a non-empty string".into()));
    }
    Ok(user_id)
}

/// Start the HTTP server and wait for a shutdown signal.
pub async fn serve(settings: &Settings, addr_override: Option<SocketAddr>) -> Result<()> {
    let engine = engine::create_engine(&settings.engine)?;
    let store: Arc<dyn ContextStore> =
        Arc::new(InMemoryContextStore::from_config(&settings.context));

    let state = AppState {
        executor: Arc::new(TaskExecutor::new(engine)),
        store,
        settings: settings.clone(),
    };

    let app = create_router(state);

    let addr = match addr_override {
        Some(addr) => addr.to_string(),
        None => format!("{}:{}", settings.server.host, settings.server.port),
    };
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown())
        .await?;

    info!("HTTP server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C).
async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).unwrap();
        let mut sigint = signal(SignalKind::interrupt()).unwrap();

        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down gracefully");
            }
            _ = sigint.recv() => {
                info!("Received SIGINT (Ctrl+C), shutting down gracefully");
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
        }
    }
}
