use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use stackdraw_core::Graph;
use stackdraw_suggest::Pipeline;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

impl AppState {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

pub fn create_router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/api/graph-schema", get(graph_schema))
        .route("/api/generate-graph", post(generate_graph))
        .route("/api/explain-graph", post(explain_graph))
        .route("/api/generate-llm-prompt", post(generate_llm_prompt))
        .route("/api/generate-repo-script", post(generate_repo_script))
        .with_state(state)
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .map(|o| o.trim())
        .filter(|o| !o.is_empty())
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("ignoring invalid CORS origin {:?}", o);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    description: Option<String>,
    existing_graph: Option<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExplainRequest {
    graph_data: Option<Value>,
    original_prompt: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BuildRequest {
    graph_data: Option<Value>,
    user_context: Option<String>,
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(JsonRejection::MissingJsonContentType(_)) | Err(JsonRejection::JsonSyntaxError(_)) => {
            Err(ApiError::BadRequest("Request must be JSON".to_string()))
        }
        Err(other) => Err(ApiError::BadRequest(other.body_text())),
    }
}

fn required_text(value: Option<String>, field: &str) -> ApiResult<String> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(ApiError::BadRequest(format!("Missing '{field}' in request body"))),
    }
}

fn required_graph(value: Option<Value>) -> ApiResult<Graph> {
    match value {
        Some(value) if !value.is_null() => Ok(Pipeline::graph_from_value(&value)?),
        _ => Err(ApiError::BadRequest(
            "Invalid or missing 'graphData' in request body".to_string(),
        )),
    }
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "stackdraw backend is running",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn graph_schema() -> Json<schemars::Schema> {
    Json(schemars::schema_for!(Graph))
}

async fn generate_graph(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> ApiResult<Json<Graph>> {
    let request = json_body(payload)?;
    let description = required_text(request.description, "description")?;
    let existing = match request.existing_graph {
        Some(value) if !value.is_null() => Some(Pipeline::graph_from_value(&value)?),
        _ => None,
    };

    let tagged = state
        .pipeline
        .generate_graph(&description, existing.as_ref())
        .await?;
    if tagged.is_mocked() {
        info!("returning fallback graph for {:?}", description);
    }
    Ok(Json(tagged.strip_marker()))
}

async fn explain_graph(
    State(state): State<AppState>,
    payload: Result<Json<ExplainRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let request = json_body(payload)?;
    let graph = required_graph(request.graph_data)?;
    let original_prompt = required_text(request.original_prompt, "originalPrompt")?;

    let explanation = state.pipeline.explain(&graph, &original_prompt).await?;
    Ok(Json(json!({ "explanation": explanation })))
}

async fn generate_llm_prompt(
    State(state): State<AppState>,
    payload: Result<Json<BuildRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let request = json_body(payload)?;
    let graph = required_graph(request.graph_data)?;

    let prompt = state
        .pipeline
        .build_agent_prompt(&graph, request.user_context.as_deref());
    Ok(Json(json!({ "prompt": prompt })))
}

async fn generate_repo_script(
    State(state): State<AppState>,
    payload: Result<Json<BuildRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let request = json_body(payload)?;
    let graph = required_graph(request.graph_data)?;

    let script = state
        .pipeline
        .build_repo_script(&graph, request.user_context.as_deref())
        .await?;
    Ok(Json(json!({ "script": script })))
}
