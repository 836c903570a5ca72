//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the solver or to
//! the session's generation job tracker.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::dto::{
    CancelGenerationResponse, HealthResponse, JobStatusResponse, SolveRequest,
    StartGenerationRequest,
};
use super::error::AppError;
use super::state::AppState;
use crate::models::{validate_shift_templates, Schedule};
use crate::scheduler::{GreedySolver, SolveResult};
use crate::services::{GenerationInput, GenerationStatus, JobId, RequestContext};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
pub async fn health_check() -> HandlerResult<HealthResponse> {
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
    }))
}

// =============================================================================
// Solver
// =============================================================================

/// POST /v1/solve
///
/// Run the solver synchronously and return the shift map with any shortfalls.
pub async fn solve(
    State(state): State<AppState>,
    Json(request): Json<SolveRequest>,
) -> HandlerResult<SolveResult> {
    validate_shift_templates(&request.shifts)?;
    let policy = request
        .fill_policy
        .unwrap_or(state.config.solver.fill_policy);

    let result = tokio::task::spawn_blocking(move || {
        GreedySolver::new(policy).solve(&request.shifts, &request.students)
    })
    .await
    .map_err(|e| AppError::Internal(format!("Task join error: {}", e)))?;

    Ok(Json(result))
}

// =============================================================================
// Generation Jobs
// =============================================================================

/// POST /v1/sessions/{session_id}/generations
///
/// Start generating a schedule for the session. Any job the session was still
/// tracking is cancelled.
pub async fn start_generation(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(body): Json<StartGenerationRequest>,
) -> Result<(StatusCode, Json<JobStatusResponse>), AppError> {
    validate_shift_templates(&body.shifts)?;

    let input = GenerationInput {
        request: body.request,
        context: RequestContext { actor: body.actor },
        shifts: body.shifts,
        students: body.students,
    };
    input.selected_students()?;

    let tracker = state.tracker(&session_id);
    let job_id = tracker.start(input);
    let job = tracker.require_job(job_id)?;

    Ok((StatusCode::ACCEPTED, Json(job.into())))
}

/// GET /v1/sessions/{session_id}/generations/{job_id}
pub async fn get_generation(
    State(state): State<AppState>,
    Path((session_id, job_id)): Path<(String, JobId)>,
) -> HandlerResult<JobStatusResponse> {
    let tracker = state
        .existing_tracker(&session_id)
        .ok_or_else(|| AppError::NotFound(format!("Session {} not found", session_id)))?;
    let job = tracker.require_job(job_id)?;
    Ok(Json(job.into()))
}

/// GET /v1/sessions/{session_id}/generations/{job_id}/schedule
///
/// The generated schedule, available once the job has completed.
pub async fn get_generated_schedule(
    State(state): State<AppState>,
    Path((session_id, job_id)): Path<(String, JobId)>,
) -> HandlerResult<Schedule> {
    let tracker = state
        .existing_tracker(&session_id)
        .ok_or_else(|| AppError::NotFound(format!("Session {} not found", session_id)))?;
    let job = tracker.require_job(job_id)?;
    if job.status != GenerationStatus::Completed {
        return Err(AppError::NotFound(format!(
            "Job {} has no schedule (status: {})",
            job_id, job.status
        )));
    }
    let schedule = tracker
        .schedule(job_id)
        .ok_or_else(|| AppError::NotFound(format!("Schedule for job {} not found", job_id)))?;
    Ok(Json(schedule))
}

/// DELETE /v1/sessions/{session_id}/generations
///
/// Close the session and dispose of its tracked job.
pub async fn cancel_generation(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> HandlerResult<CancelGenerationResponse> {
    let cancelled_job_id = state.end_session(&session_id);
    Ok(Json(CancelGenerationResponse { cancelled_job_id }))
}
