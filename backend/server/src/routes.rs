use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
};
use records::{
    Status,
    payloads::{
        Acknowledged, ListQuery, ListResponse, LoginRequest, LoginResponse, StatsResponse,
        SubmitRequest, SubmitResponse, TrackResponse, UpdateStatusRequest,
    },
};
use tracing::info;

use crate::{
    error::{AppError, LifecycleError},
    lifecycle::NewComplaint,
    state::State as AppState,
};

fn payload<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(payload)| payload)
        .map_err(|_| AppError::MalformedPayload)
}

fn ref_id(path: Result<Path<String>, PathRejection>) -> Result<String, AppError> {
    path.map(|Path(ref_id)| ref_id)
        .map_err(|_| AppError::MalformedPayload)
}

pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let credentials = payload(body)?;

    state
        .gate
        .check(&credentials.username, &credentials.password)?;

    info!("Moderator {} logged in", credentials.username);
    Ok(Json(LoginResponse {
        success: true,
        message: "Authorized".to_string(),
    }))
}

pub async fn submit_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SubmitRequest>, JsonRejection>,
) -> Result<Json<SubmitResponse>, AppError> {
    let complaint = NewComplaint::try_from(payload(body)?)?;
    let ref_id = state.complaints.submit(complaint).await?;

    Ok(Json(SubmitResponse {
        success: true,
        ref_id,
    }))
}

pub async fn track_handler(
    State(state): State<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<TrackResponse>, AppError> {
    let tracking = state.complaints.track(&ref_id(path)?).await?;

    Ok(Json(TrackResponse {
        success: true,
        ref_id: tracking.ref_id,
        status: tracking.status,
        timeline: tracking.timeline,
    }))
}

pub async fn stats_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatsResponse>, AppError> {
    let stats = state.complaints.stats().await?;

    Ok(Json(StatsResponse {
        success: true,
        roads_fixed: stats.resolved,
        success_rate: stats.success_rate,
    }))
}

pub async fn all_complaints_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<ListResponse>, AppError> {
    let Query(query) = query.map_err(|_| AppError::MalformedPayload)?;

    let status = query
        .status
        .filter(|status| !status.trim().is_empty())
        .map(|status| status.parse::<Status>())
        .transpose()
        .map_err(LifecycleError::from)?;

    let complaints = state.complaints.list_all(status).await?;

    Ok(Json(ListResponse {
        success: true,
        complaints,
    }))
}

pub async fn update_status_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<Acknowledged>, AppError> {
    let request = payload(body)?;
    let new_status: Status = request.new_status.parse().map_err(LifecycleError::from)?;

    state
        .complaints
        .update_status(&request.ref_id, new_status)
        .await?;

    Ok(Json(Acknowledged::ok()))
}

pub async fn delete_handler(
    State(state): State<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Acknowledged>, AppError> {
    state.complaints.delete(&ref_id(path)?).await?;

    Ok(Json(Acknowledged::ok()))
}
