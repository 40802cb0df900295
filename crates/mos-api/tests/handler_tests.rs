use approx::assert_abs_diff_eq;
use axum::http::StatusCode;
use mos_api::http::{
    build_router, handle_evaluate, handle_get_run, handle_sweep, ApiState, API_MAX_SWEEP_POINTS,
};
use mos_api::schema::{EvaluateRequest, SweepRequest};
use mos_core::result_store::RunStatus;
use mos_devices::mosfet::OperatingRegion;
use serde_json::json;

fn evaluate_request(value: serde_json::Value) -> EvaluateRequest {
    serde_json::from_value(value).unwrap()
}

#[test]
fn router_builds() {
    let _router = build_router(ApiState::new());
}

#[test]
fn evaluate_with_structured_device() {
    let req = evaluate_request(json!({
        "device": {
            "mode": "nmos",
            "model": "short_channel",
            "body": { "gamma": 0.3, "phi": 0.4, "vt": 0.3 },
            "process": { "cox": 1.0, "mobility": 200.0, "w": 3.0, "l": 1.0 },
            "output": { "lambda": 0.0 },
            "velocity": { "combined": 0.6 }
        },
        "terminals": { "vg": 1.0, "vs": 0.0, "vd": 0.24806, "vb": 0.0 }
    }));
    let resp = handle_evaluate(req).unwrap();
    assert_eq!(resp.region, OperatingRegion::Triode);
    assert!(resp.finite);
    assert_abs_diff_eq!(resp.current.unwrap(), 60.65024002075324, epsilon = 1e-9);
    assert!(resp.diagnostics.is_empty());
}

#[test]
fn evaluate_with_model_card_reports_advisories() {
    let req = evaluate_request(json!({
        "card": ".model n1 nmos vt=0.3 eclc=0.6 lambda=-0.1",
        "terminals": { "vg": 1.0, "vs": 0.0, "vd": 0.5, "vb": 0.0 }
    }));
    let resp = handle_evaluate(req).unwrap();
    assert_eq!(resp.region, OperatingRegion::Saturated);
    assert_eq!(resp.diagnostics.len(), 1);
    assert_eq!(resp.diagnostics[0].parameter, "lambda");
}

#[test]
fn evaluate_without_device_is_bad_request() {
    let req = evaluate_request(json!({
        "terminals": { "vg": 1.0, "vs": 0.0, "vd": 0.5, "vb": 0.0 }
    }));
    let err = handle_evaluate(req).unwrap_err();
    assert_eq!(err.status, StatusCode::BAD_REQUEST);
    assert_eq!(err.code, "INVALID_REQUEST");
}

#[test]
fn evaluate_with_bad_card_is_card_error() {
    let req = evaluate_request(json!({
        "card": "vt=abc",
        "terminals": { "vg": 1.0, "vs": 0.0, "vd": 0.5, "vb": 0.0 }
    }));
    let err = handle_evaluate(req).unwrap_err();
    assert_eq!(err.code, "CARD_ERROR");
}

#[test]
fn evaluate_short_channel_without_velocity_is_bad_request() {
    let req = evaluate_request(json!({
        "device": {
            "mode": "pmos",
            "model": "short_channel",
            "body": { "gamma": 0.3, "phi": 0.4, "vt": -0.3 },
            "process": { "cox": 1.0, "mobility": 100.0, "w": 3.0, "l": 1.0 }
        },
        "terminals": { "vg": 0.0, "vs": 1.8, "vd": 2.0, "vb": 1.8 }
    }));
    let err = handle_evaluate(req).unwrap_err();
    assert_eq!(err.status, StatusCode::BAD_REQUEST);
}

#[test]
fn sweep_is_stored_and_retrievable() {
    let state = ApiState::new();
    let req: SweepRequest = serde_json::from_value(json!({
        "card": "vt=0.3 eclc=0.6",
        "terminals": { "vg": 1.0, "vs": 0.0, "vd": 0.0, "vb": 0.0 },
        "terminal": "drain",
        "start": 0.0,
        "stop": 1.0,
        "step": 0.25
    }))
    .unwrap();
    let resp = handle_sweep(&state, req).unwrap();
    let run = resp.run;
    assert_eq!(run.id.0, 0);
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.points.len(), 5);
    // vd = 0 at the first point is a non-positive drain bias
    assert_eq!(resp.diagnostics.len(), 1);
    assert_eq!(resp.diagnostics[0].parameter, "vds");

    let fetched = handle_get_run(&state, 0).unwrap();
    assert_eq!(fetched.points, run.points);

    let missing = handle_get_run(&state, 9).unwrap_err();
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.code, "RUN_NOT_FOUND");
}

#[test]
fn invalid_sweep_is_bad_request() {
    let state = ApiState::new();
    let req: SweepRequest = serde_json::from_value(json!({
        "card": "vt=0.3",
        "terminals": { "vg": 1.0, "vs": 0.0, "vd": 0.0, "vb": 0.0 },
        "terminal": "gate",
        "start": 0.0,
        "stop": 1.0,
        "step": 0.0
    }))
    .unwrap();
    let err = handle_sweep(&state, req).unwrap_err();
    assert_eq!(err.status, StatusCode::BAD_REQUEST);
    assert!(err.message.contains("step"));
}

fn drain_sweep(step: f64) -> SweepRequest {
    serde_json::from_value(json!({
        "card": "vt=0.3 eclc=0.6",
        "terminals": { "vg": 1.0, "vs": 0.0, "vd": 0.0, "vb": 0.0 },
        "terminal": "drain",
        "start": 0.0,
        "stop": 1.0,
        "step": step
    }))
    .unwrap()
}

#[test]
fn oversized_sweep_is_rejected_before_running() {
    let state = ApiState::new();
    let err = handle_sweep(&state, drain_sweep(2e-6)).unwrap_err();
    assert_eq!(err.status, StatusCode::BAD_REQUEST);
    assert_eq!(err.code, "SWEEP_TOO_LARGE");
    assert!(handle_get_run(&state, 0).is_err());

    let step = 1.0 / (API_MAX_SWEEP_POINTS - 1) as f64;
    let resp = handle_sweep(&state, drain_sweep(step)).unwrap();
    assert_eq!(resp.run.points.len(), API_MAX_SWEEP_POINTS);
}

#[test]
fn stored_runs_are_bounded() {
    let state = ApiState::with_capacity(2);
    for _ in 0..3 {
        handle_sweep(&state, drain_sweep(0.5)).unwrap();
    }
    let evicted = handle_get_run(&state, 0).unwrap_err();
    assert_eq!(evicted.code, "RUN_NOT_FOUND");
    assert_eq!(handle_get_run(&state, 1).unwrap().id.0, 1);
    assert_eq!(handle_get_run(&state, 2).unwrap().points.len(), 3);
}
