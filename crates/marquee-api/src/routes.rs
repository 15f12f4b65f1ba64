//! API routes for Marquee endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::jobs::INSERT_MOVIE;
use crate::middleware::ActorId;
use crate::state::AppState;
use marquee_catalog::{Movie, NewMovie};
use marquee_queue::JobStatus;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

/// Basic health check handler
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    })
}

/// Movie fields accepted at the enqueue edge.
///
/// Everything is optional here on purpose: the edge checks shape only, and
/// deep validation is deferred to the apply routine. Unknown fields are
/// dropped rather than stored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateMovieRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub genre: Vec<String>,
    pub rating: Option<f32>,
    pub duration: Option<u32>,
    pub release_date: Option<NaiveDate>,
    pub language: Option<String>,
    pub cast: Vec<String>,
    pub director: Option<String>,
}

/// Acknowledgment for a queued creation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnqueueResponse {
    pub success: bool,
    pub message: String,
    pub job_id: Uuid,
}

/// Queue a movie insert and return immediately with the job id.
///
/// The materialized record is written later by the worker; callers poll
/// `GET /api/jobs/{id}` for the outcome.
pub async fn create_movie(
    State(state): State<AppState>,
    actor: ActorId,
    Json(req): Json<CreateMovieRequest>,
) -> ApiResult<(StatusCode, Json<EnqueueResponse>)> {
    let payload = NewMovie {
        name: req.name,
        description: req.description,
        genre: req.genre,
        rating: req.rating,
        duration: req.duration,
        release_date: req.release_date,
        language: req.language,
        cast: req.cast,
        director: req.director,
        created_by: Some(actor.0),
    };

    let job_id = state
        .jobs()
        .enqueue(INSERT_MOVIE, serde_json::to_value(&payload)?)
        .await?;

    tracing::info!(job_id = %job_id, "movie creation queued");

    Ok((
        StatusCode::ACCEPTED,
        Json(EnqueueResponse {
            success: true,
            message: "movie creation queued".to_string(),
            job_id,
        }),
    ))
}

/// Read-only job projection for status lookups and audit tooling.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResponse {
    pub id: Uuid,
    pub job_type: String,
    pub status: JobStatus,
    pub attempts: u32,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<JobResponse>> {
    let job = state.jobs().get(id).await?;

    Ok(Json(JobResponse {
        id: job.id,
        job_type: job.job_type,
        status: job.status,
        attempts: job.attempts,
        created_at: job.created_at,
        processed_at: job.processed_at,
        last_error: job.last_error,
    }))
}

pub async fn list_movies(State(state): State<AppState>) -> ApiResult<Json<Vec<Movie>>> {
    Ok(Json(state.catalog().list().await?))
}

pub async fn get_movie(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Movie>> {
    Ok(Json(state.catalog().get(id).await?))
}

/// Build the API router
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/admin/movies", post(create_movie))
        .route("/api/jobs/{id}", get(get_job))
        .route("/api/movies", get(list_movies))
        .route("/api/movies/{id}", get(get_movie))
        .with_state(state)
}
