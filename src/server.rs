//! HTTP surface for the plant tracker.
//!
//! ## Endpoints
//!
//! - `GET /` - welcome page
//! - `GET /plants` - human-readable listing
//! - `POST /plants` - start tracking a plant
//! - `GET /api/plants` - the raw plant document
//! - `POST /update-plant` - record watering/fertilizing dates
//! - `GET /due-plants` - watering check, emails the owner
//! - `GET /due-fertilizing` - fertilizing check, emails the owner

use crate::config::ServerConfig;
use crate::error::{PlantCareError, Result};
use crate::logic::listing::escape_html;
use crate::models::{parse_date, CareKind, PlantRecord, PlantUpdate};
use crate::service::PlantCareService;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Plant update bodies are tiny; anything bigger is a mistake.
const MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Clone)]
struct AppState {
    service: Arc<PlantCareService>,
}

#[derive(Debug, Deserialize)]
struct DueParams {
    /// Evaluate as of this `YYYY-MM-DD` instead of the local date.
    date: Option<String>,
}

pub fn router(service: Arc<PlantCareService>) -> Router {
    Router::new()
        .route("/", get(handle_home))
        .route("/plants", get(handle_plants_page).post(handle_create_plant))
        .route("/api/plants", get(handle_plants_json))
        .route("/update-plant", post(handle_update_plant))
        .route("/due-plants", get(handle_due_water))
        .route("/due-fertilizing", get(handle_due_fertilizer))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { service })
}

/// Plant tracker HTTP server running on a background task.
pub struct PlantServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl PlantServer {
    /// Binds to `{config.host}:{config.port}` (port `0` picks a free port)
    /// and begins serving in a background tokio task.
    pub async fn start(service: Arc<PlantCareService>, config: &ServerConfig) -> Result<Self> {
        let app = router(service);

        let bind_addr = format!("{}:{}", config.host, config.port);
        let listener = TcpListener::bind(&bind_addr).await.map_err(|e| {
            PlantCareError::Config(format!("Cannot bind {}: {}", bind_addr, e))
        })?;
        let addr = listener.local_addr()?;

        info!("Plant server listening on http://{addr}");

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("Plant server error: {e}");
            }
        });

        Ok(Self { addr, handle })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn shutdown(&self) {
        self.handle.abort();
    }
}

impl Drop for PlantServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl IntoResponse for PlantCareError {
    fn into_response(self) -> Response {
        let status = match &self {
            PlantCareError::InvalidData(_) => StatusCode::BAD_REQUEST,
            PlantCareError::NotFound(_) => StatusCode::NOT_FOUND,
            PlantCareError::AlreadyExists(_) => StatusCode::CONFLICT,
            PlantCareError::Config(_)
            | PlantCareError::Io(_)
            | PlantCareError::Json(_)
            | PlantCareError::Notify(_)
            | PlantCareError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

async fn handle_home() -> Html<&'static str> {
    Html("<p>Welcome to my plant app</p>")
}

/// `GET /plants`
async fn handle_plants_page(State(state): State<AppState>) -> Result<Html<String>> {
    let listing = state.service.listing(Local::now().date_naive()).await?;
    Ok(Html(format!("<pre>{}</pre>", escape_html(&listing))))
}

/// `GET /api/plants`
async fn handle_plants_json(State(state): State<AppState>) -> Result<Response> {
    let registry = state.service.list().await?;
    Ok(Json(registry).into_response())
}

/// `POST /plants`
async fn handle_create_plant(State(state): State<AppState>, body: Bytes) -> Result<Response> {
    let request = parse_update(&body)?;
    let name = request.name.clone().unwrap_or_default();
    let record = request.into_record();

    let record = state.service.create(&name, record).await?;
    Ok((StatusCode::CREATED, Json(single_plant(name.trim(), &record))).into_response())
}

/// `POST /update-plant`
async fn handle_update_plant(State(state): State<AppState>, body: Bytes) -> Result<Response> {
    let update = parse_update(&body)?;
    tracing::debug!(?update, "Received plant update");

    let (name, record) = state.service.update(update).await?;
    Ok(Json(single_plant(&name, &record)).into_response())
}

/// `GET /due-plants`
async fn handle_due_water(
    State(state): State<AppState>,
    Query(params): Query<DueParams>,
) -> Result<Response> {
    due_check(&state, CareKind::Water, params).await
}

/// `GET /due-fertilizing`
async fn handle_due_fertilizer(
    State(state): State<AppState>,
    Query(params): Query<DueParams>,
) -> Result<Response> {
    due_check(&state, CareKind::Fertilize, params).await
}

async fn due_check(state: &AppState, kind: CareKind, params: DueParams) -> Result<Response> {
    let today = resolve_today(params.date.as_deref())?;
    let report = state.service.check(kind, today).await?;
    Ok(Json(report.to_json()).into_response())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Bodies are JSON whatever the `Content-Type` says.
fn parse_update(body: &[u8]) -> Result<PlantUpdate> {
    serde_json::from_slice(body)
        .map_err(|e| PlantCareError::InvalidData(format!("Request body is not valid JSON: {}", e)))
}

fn resolve_today(date: Option<&str>) -> Result<NaiveDate> {
    match date {
        Some(raw) => parse_date(raw).ok_or_else(|| {
            PlantCareError::InvalidData(format!("Invalid date '{}', expected YYYY-MM-DD", raw))
        }),
        None => Ok(Local::now().date_naive()),
    }
}

fn single_plant(name: &str, record: &PlantRecord) -> serde_json::Value {
    let mut body = serde_json::Map::new();
    body.insert(
        name.to_string(),
        serde_json::to_value(record).unwrap_or_default(),
    );
    serde_json::Value::Object(body)
}
