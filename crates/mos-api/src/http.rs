use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::sync::{Arc, Mutex};

use mos_core::analysis::{sweep_point_count, AnalysisPlan};
use mos_core::engine::Engine;
use mos_core::result_store::{ResultStore, RunId, RunResult};
use mos_core::CoreError;
use mos_devices::mosfet::{
    build_device_params, evaluate, parse_model_card, DeviceParams, RecordingSink,
};

use crate::schema::{
    DeviceInput, ErrorBody, ErrorResponse, EvaluateRequest, EvaluateResponse, SweepRequest,
    SweepResponse,
};

/// Largest sweep a single request may ask for.
pub const API_MAX_SWEEP_POINTS: usize = 10_000;

/// Runs kept for `GET /v1/runs/{id}`; older runs are evicted.
pub const API_MAX_STORED_RUNS: usize = 64;

pub struct HttpServerConfig {
    pub bind_addr: String,
}

#[derive(Clone)]
pub struct ApiState {
    store: Arc<Mutex<ResultStore>>,
}

impl ApiState {
    pub fn new() -> Self {
        Self::with_capacity(API_MAX_STORED_RUNS)
    }

    pub fn with_capacity(max_runs: usize) -> Self {
        Self {
            store: Arc::new(Mutex::new(ResultStore::bounded(max_runs))),
        }
    }
}

impl Default for ApiState {
    fn default() -> Self {
        Self::new()
    }
}

/// Error returned by request handling, rendered as an [`ErrorResponse`].
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    pub details: Option<Vec<String>>,
}

impl ApiError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            details: None,
        }
    }

    fn store_unavailable() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "STORE_ERROR",
            "result store is unavailable",
        )
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::RunNotFound(_) => {
                ApiError::new(StatusCode::NOT_FOUND, "RUN_NOT_FOUND", "run_id not found")
            }
            other => ApiError::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code.to_string(),
                message: self.message,
                details: self.details,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

pub async fn run(config: HttpServerConfig) -> Result<(), String> {
    let app = build_router(ApiState::new());
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .map_err(|err| format!("bind {} failed: {}", config.bind_addr, err))?;
    tracing::info!(addr = %config.bind_addr, "http api listening");
    axum::serve(listener, app)
        .await
        .map_err(|err| format!("server error: {}", err))
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/v1/evaluate", post(evaluate_route))
        .route("/v1/sweep", post(sweep_route))
        .route("/v1/runs/{id}", get(get_run_route))
        .with_state(state)
}

async fn evaluate_route(Json(payload): Json<EvaluateRequest>) -> impl IntoResponse {
    match handle_evaluate(payload) {
        Ok(body) => Json(body).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn sweep_route(
    State(state): State<ApiState>,
    Json(payload): Json<SweepRequest>,
) -> impl IntoResponse {
    let outcome = tokio::task::spawn_blocking(move || handle_sweep(&state, payload))
        .await
        .unwrap_or_else(|err| {
            Err(ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                format!("sweep task failed: {}", err),
            ))
        });
    match outcome {
        Ok(body) => Json(body).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn get_run_route(State(state): State<ApiState>, Path(id): Path<usize>) -> impl IntoResponse {
    match handle_get_run(&state, id) {
        Ok(run) => Json(run).into_response(),
        Err(err) => err.into_response(),
    }
}

/// Evaluate one bias point; advisories are returned in the body.
pub fn handle_evaluate(payload: EvaluateRequest) -> Result<EvaluateResponse, ApiError> {
    let device = select_device(payload.input)?;
    let sink = RecordingSink::new();
    let result = evaluate(&device, &payload.terminals, &sink)
        .map_err(|err| ApiError::from(CoreError::from(err)))?;
    let diagnostics = sink.take();
    tracing::debug!(
        region = %result.region,
        current = result.current,
        advisories = diagnostics.len(),
        "evaluate request"
    );
    Ok(EvaluateResponse {
        region: result.region,
        current: result.is_finite().then_some(result.current),
        finite: result.is_finite(),
        diagnostics,
    })
}

/// Run a sweep and keep it in the store.
///
/// Sweeps above [`API_MAX_SWEEP_POINTS`] are rejected before any point is
/// evaluated. Advisories come back with the run.
pub fn handle_sweep(state: &ApiState, payload: SweepRequest) -> Result<SweepResponse, ApiError> {
    let count = sweep_point_count(payload.start, payload.stop, payload.step)?;
    if count > API_MAX_SWEEP_POINTS {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "SWEEP_TOO_LARGE",
            format!(
                "sweep has {} points, limit is {}",
                count, API_MAX_SWEEP_POINTS
            ),
        ));
    }

    let device = select_device(payload.input)?;
    let plan = AnalysisPlan::sweep(
        payload.terminals,
        payload.terminal,
        payload.start,
        payload.stop,
        payload.step,
    );
    let sink = Arc::new(RecordingSink::new());
    let engine = Engine::with_sink(device, sink.clone());
    let run = engine.run(&plan)?;

    let mut store = state
        .store
        .lock()
        .map_err(|_| ApiError::store_unavailable())?;
    let run_id = store.add_run(run);
    Ok(SweepResponse {
        run: store.get(run_id)?.clone(),
        diagnostics: sink.take(),
    })
}

pub fn handle_get_run(state: &ApiState, id: usize) -> Result<RunResult, ApiError> {
    let store = state
        .store
        .lock()
        .map_err(|_| ApiError::store_unavailable())?;
    Ok(store.get(RunId(id))?.clone())
}

fn select_device(input: DeviceInput) -> Result<DeviceParams, ApiError> {
    if let Some(device) = input.device {
        return Ok(device);
    }
    if let Some(card) = input.card {
        let parsed = parse_model_card(&card).map_err(|err| {
            ApiError::new(StatusCode::BAD_REQUEST, "CARD_ERROR", err.to_string())
        })?;
        let mode = parsed.mode.unwrap_or_default();
        return build_device_params(&parsed.params, mode).map_err(|err| {
            ApiError::new(StatusCode::BAD_REQUEST, "CARD_ERROR", err.to_string())
        });
    }
    Err(ApiError::new(
        StatusCode::BAD_REQUEST,
        "INVALID_REQUEST",
        "missing device or card",
    ))
}
