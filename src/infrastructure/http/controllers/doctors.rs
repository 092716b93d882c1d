use crate::{
    application::services::policy,
    domain::entities::{DoctorFilter, DoctorRequest, DoctorResponse},
    infrastructure::http::{
        extract::{Json, Path, Query},
        middleware::{ApiResult, AppState, AuthenticatedUser},
    },
    shared::pagination::{Paged, PaginationParams},
};
use axum::{extract::State, http::StatusCode};

pub async fn list_doctors(
    State(state): State<AppState>,
    axum::Extension(_auth_user): axum::Extension<AuthenticatedUser>,
    Query(filter): Query<DoctorFilter>,
    Query(params): Query<PaginationParams>,
) -> ApiResult<Json<Paged<DoctorResponse>>> {
    let doctors = state.doctor_service.list(filter, params.into()).await?;
    Ok(Json(doctors))
}

pub async fn create_doctor(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Json(request): Json<DoctorRequest>,
) -> ApiResult<(StatusCode, Json<DoctorResponse>)> {
    auth_user.require(policy::ADMIN)?;
    let doctor = state.doctor_service.create(request).await?;
    Ok((StatusCode::CREATED, Json(doctor)))
}

pub async fn get_doctor(
    State(state): State<AppState>,
    axum::Extension(_auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<DoctorResponse>> {
    let doctor = state.doctor_service.get(&id).await?;
    Ok(Json(doctor))
}

pub async fn get_doctor_by_license(
    State(state): State<AppState>,
    axum::Extension(_auth_user): axum::Extension<AuthenticatedUser>,
    Path(license_number): Path<String>,
) -> ApiResult<Json<DoctorResponse>> {
    let doctor = state
        .doctor_service
        .find_by_license_number(&license_number)
        .await?;
    Ok(Json(doctor))
}

pub async fn update_doctor(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(request): Json<DoctorRequest>,
) -> ApiResult<Json<DoctorResponse>> {
    auth_user.require(policy::ADMIN)?;
    let doctor = state.doctor_service.update(&id, request).await?;
    Ok(Json(doctor))
}

pub async fn delete_doctor(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    auth_user.require(policy::ADMIN)?;
    state.doctor_service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
