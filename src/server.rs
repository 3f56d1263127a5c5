//! HTTP server exposing the parser to the dashboard front end.
//!
//! Routes:
//! - `GET  /health`
//! - `POST /api/parse` - motion (and optional prediction) log to aligned series
//! - `POST /api/validate` - upload-side column check
//! - `POST /api/summary` - summary statistics of a motion log
//! - `GET  /download-template` - template CSV for contributors
//! - `POST /live-demo-prediction` - placeholder scores for live samples
//!
//! Endpoints that take a log accept `?variant=` and `?alignment=` to override
//! the configured schema variant and alignment policy.

use crate::config::Config;
use crate::core::{NormalizedSeries, ParseError, SensorLogParser};
use crate::predict::{predict_batch, LivePrediction, LiveSample};
use crate::schema::{AlignmentPolicy, SchemaVariant};
use crate::summary::{summarize, LogSummary};
use crate::validation::{validate_columns, validate_file_name, ValidationReport};
use axum::{
    extract::{Query, State},
    http::{header, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind to (0 for random)
    pub port: u16,
    /// Parser configuration used when a request does not override it
    pub config: Config,
}

impl ServerConfig {
    pub fn new(port: u16, config: Config) -> Self {
        Self { port, config }
    }
}

/// Shared server state
pub struct ServerState {
    config: Config,
}

impl ServerState {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            config: config.config.clone(),
        }
    }

    /// Parser for a request, with query overrides applied.
    fn parser(&self, query: &LogQuery) -> Result<SensorLogParser, ApiError> {
        let mut config = self.config.clone();
        if let Some(ref name) = query.variant {
            config.variant = name
                .parse::<SchemaVariant>()
                .map_err(|e| bad_request("UNKNOWN_VARIANT", e))?;
            // A requested variant brings its own policy and classes.
            config.missing_value_policy = None;
            config.prediction_classes = None;
        }
        if let Some(ref name) = query.alignment {
            config.alignment = name
                .parse::<AlignmentPolicy>()
                .map_err(|e| bad_request("UNKNOWN_ALIGNMENT", e))?;
        }
        Ok(config.parser())
    }
}

/// Query overrides accepted by log endpoints
#[derive(Debug, Default, Deserialize)]
pub struct LogQuery {
    pub variant: Option<String>,
    pub alignment: Option<String>,
}

/// Request body carrying log text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseRequest {
    pub motion: String,
    #[serde(default)]
    pub predictions: Option<String>,
}

/// Request body for upload validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateRequest {
    #[serde(default)]
    pub file_name: Option<String>,
    pub content: String,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(code: &str, error: impl ToString) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: error.to_string(),
            code: code.to_string(),
        }),
    )
}

fn parse_error(e: ParseError) -> ApiError {
    let code = match &e {
        ParseError::EmptyInput => "EMPTY_INPUT",
        ParseError::MissingColumns { .. } => "MISSING_COLUMNS",
        ParseError::NoPredictionSchema => "NO_PREDICTION_SCHEMA",
        ParseError::RowCountMismatch { .. } => "ROW_COUNT_MISMATCH",
    };
    tracing::debug!("Rejected log: {}", e);
    bad_request(code, e)
}

/// GET /health
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// POST /api/parse
async fn parse(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<LogQuery>,
    Json(request): Json<ParseRequest>,
) -> Result<Json<NormalizedSeries>, ApiError> {
    let parser = state.parser(&query)?;
    let series = match request.predictions {
        Some(ref predictions) => parser.parse_with_predictions(&request.motion, predictions),
        None => parser.parse(&request.motion),
    }
    .map_err(parse_error)?;

    tracing::info!(rows = series.len(), "Parsed log");
    Ok(Json(series))
}

/// POST /api/validate
async fn validate(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<LogQuery>,
    Json(request): Json<ValidateRequest>,
) -> Result<Json<ValidationReport>, ApiError> {
    if let Some(ref name) = request.file_name {
        if let Err(e) = validate_file_name(name) {
            return Ok(Json(ValidationReport {
                is_valid: false,
                error: Some(e.to_string()),
                missing_columns: Vec::new(),
            }));
        }
    }
    let parser = state.parser(&query)?;
    Ok(Json(validate_columns(
        &request.content,
        &parser.options().schema,
    )))
}

/// POST /api/summary
async fn summary(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<LogQuery>,
    Json(request): Json<ParseRequest>,
) -> Result<Json<LogSummary>, ApiError> {
    let series = state
        .parser(&query)?
        .parse(&request.motion)
        .map_err(parse_error)?;
    Ok(Json(summarize(&series)))
}

/// GET /download-template
async fn download_template(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<LogQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let variant = match query.variant {
        Some(ref name) => name
            .parse::<SchemaVariant>()
            .map_err(|e| bad_request("UNKNOWN_VARIANT", e))?,
        None => state.config.variant,
    };
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"template.csv\"",
            ),
        ],
        variant.template_csv(),
    ))
}

/// POST /live-demo-prediction
///
/// Responds with an object keyed by the index of each submitted sample.
async fn live_demo_prediction(
    Json(samples): Json<Vec<LiveSample>>,
) -> Json<BTreeMap<usize, LivePrediction>> {
    Json(predict_batch(&samples).into_iter().enumerate().collect())
}

/// Build the router with all routes and CORS.
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/parse", post(parse))
        .route("/api/validate", post(validate))
        .route("/api/summary", post(summary))
        .route("/download-template", get(download_template))
        .route("/live-demo-prediction", post(live_demo_prediction))
        .layer(
            CorsLayer::new()
                .allow_origin([
                    HeaderValue::from_static("http://localhost"),
                    HeaderValue::from_static("http://127.0.0.1"),
                ])
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Run the HTTP server
pub async fn run(
    config: ServerConfig,
) -> anyhow::Result<(SocketAddr, tokio::sync::oneshot::Sender<()>)> {
    let state = Arc::new(ServerState::new(&config));
    let app = router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    tracing::info!("Sensor log server listening on http://{}", actual_addr);

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                tracing::info!("Server shutdown signal received");
            })
            .await
        {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok((actual_addr, shutdown_tx))
}
