use crate::config::Config;
use crate::eligibility;
use crate::errors::AppError;
use crate::models::{ActiveTest, LoanApplication, StartTestRequest};
use crate::postback::PostbackClient;
use crate::registry::TestRegistry;
use crate::sequencer::TestSequencer;
use crate::storage::SubmissionStore;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: SqlitePool,
    /// Application configuration.
    pub config: Config,
    /// Outbound postback client, shared by handlers and workers.
    pub postback: PostbackClient,
    /// Registry of in-flight test runs.
    pub registry: TestRegistry,
}

/// The API routes, without middleware. `main` layers rate limiting,
/// body limits and tracing on top; tests drive these routes directly.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/check-eligibility", post(check_eligibility))
        .route("/api/start-test", post(start_test))
        .route("/api/cancel-test/:test_id", post(cancel_test))
        .route("/api/tests", get(list_tests))
        .route("/api/test-results/:offer_id", get(test_results))
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "loan-postback-api",
            "version": "0.1.0"
        })),
    )
}

/// POST /api/check-eligibility
///
/// Validates and evaluates a loan application, persists the submission
/// with its decision, then synchronously fires the one-shot snapshot
/// fan-out before answering. The fan-out is best effort and never fails
/// the request.
pub async fn check_eligibility(
    State(state): State<Arc<AppState>>,
    Json(application): Json<LoanApplication>,
) -> Result<Json<Value>, AppError> {
    tracing::info!(
        "POST /check-eligibility - loan_type: {}, state: {}",
        application.loan_type,
        application.state
    );

    let decision = eligibility::evaluate(&application)?;

    let store = SubmissionStore::new(state.db.clone());
    let submission_id = store.insert_submission(&application, &decision).await?;

    // Observed behavior kept as-is: every write re-reads the whole table
    // and re-sends it to the tracking endpoints (see DESIGN.md).
    match store.fetch_all_submissions().await {
        Ok(submissions) => match serde_json::to_value(&submissions) {
            Ok(snapshot) => {
                state
                    .postback
                    .fan_out_snapshot(
                        &state.config.postback_base_urls,
                        state.config.snapshot_target_url.as_deref(),
                        &snapshot,
                    )
                    .await;
            }
            Err(e) => tracing::error!("Failed to serialize submissions snapshot: {}", e),
        },
        Err(e) => tracing::error!("Failed to read submissions for snapshot fan-out: {}", e),
    }

    Ok(Json(json!({
        "submission_id": submission_id,
        "eligibility": decision.status.to_string(),
        "reasons": decision.reasons,
        "dti": decision.dti,
        "loan_type": application.loan_type,
        "loan_amount": application.loan_amount,
    })))
}

/// POST /api/start-test
///
/// Registers a new test run and spawns its background sequencer. The
/// registry entry and the test_runs row are both in place before the
/// worker starts, so every attempt references an existing run.
pub async fn start_test(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StartTestRequest>,
) -> Result<Json<Value>, AppError> {
    let offer_id = request
        .offer_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Offer ID is required".to_string()))?;

    let test_id = Uuid::new_v4().to_string();
    tracing::info!("Starting test {} for offer {}", test_id, offer_id);

    state
        .registry
        .insert(
            test_id.clone(),
            ActiveTest {
                offer_id: offer_id.clone(),
                started_at: Utc::now(),
            },
        )
        .await;

    let store = SubmissionStore::new(state.db.clone());
    if let Err(e) = store.insert_test_run(&test_id, &offer_id).await {
        // Roll the registry entry back so a failed start leaves no ghost
        state.registry.remove(&test_id).await;
        return Err(e);
    }

    let sequencer = TestSequencer::new(
        store,
        state.registry.clone(),
        state.postback.clone(),
        state.config.postback_base_urls.clone(),
        state.config.test_iterations,
        Duration::from_secs(state.config.iteration_delay_secs),
    );
    sequencer.spawn(test_id.clone(), offer_id.clone());

    Ok(Json(json!({
        "message": "Test started successfully",
        "test_id": test_id,
        "offer_id": offer_id,
        "expected_duration_minutes": state.config.expected_duration_minutes(),
    })))
}

/// POST /api/cancel-test/:test_id
///
/// Removing the registry entry is the cancellation: the worker notices
/// at its next iteration boundary. An iteration already in progress
/// still completes and is still recorded.
pub async fn cancel_test(
    State(state): State<Arc<AppState>>,
    Path(test_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    if state.registry.remove(&test_id).await {
        tracing::info!("Test {} cancelled", test_id);
        Ok(Json(json!({
            "message": format!("Test {} cancelled successfully", test_id)
        })))
    } else {
        Err(AppError::NotFound("Test not found".to_string()))
    }
}

/// GET /api/tests
///
/// Snapshot of the currently active test runs.
pub async fn list_tests(State(state): State<Arc<AppState>>) -> Json<Value> {
    let snapshot = state.registry.snapshot().await;
    Json(json!(snapshot))
}

/// GET /api/test-results/:offer_id
///
/// All persisted postback attempts for an offer, ordered by run then
/// sequence number. Reads are idempotent: repeated calls with no
/// intervening writes return identical ordered results.
pub async fn test_results(
    State(state): State<Arc<AppState>>,
    Path(offer_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let store = SubmissionStore::new(state.db.clone());
    let rows = store.results_for_offer(&offer_id).await?;

    let results: Vec<Value> = rows
        .iter()
        .map(|row| {
            json!({
                "id": row.id,
                "test_id": row.test_id,
                "response_number": row.response_number,
                "data": serde_json::from_str::<Value>(&row.response_data)
                    .unwrap_or(Value::Null),
                "postback_url": row.postback_url,
                "postback_status": row.postback_status,
                "timestamp": row.created_at,
            })
        })
        .collect();

    Ok(Json(json!(results)))
}
