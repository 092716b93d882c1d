use crate::{
    application::services::policy,
    domain::entities::{ClinicalHistoryResponse, PatientFilter, PatientRequest, PatientResponse},
    infrastructure::http::{
        extract::{Json, Path, Query},
        middleware::{ApiResult, AppState, AuthenticatedUser},
    },
    shared::pagination::{Paged, PaginationParams},
};
use axum::{extract::State, http::StatusCode};

pub async fn list_patients(
    State(state): State<AppState>,
    axum::Extension(_auth_user): axum::Extension<AuthenticatedUser>,
    Query(filter): Query<PatientFilter>,
    Query(params): Query<PaginationParams>,
) -> ApiResult<Json<Paged<PatientResponse>>> {
    let patients = state.patient_service.list(filter, params.into()).await?;
    Ok(Json(patients))
}

pub async fn create_patient(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Json(request): Json<PatientRequest>,
) -> ApiResult<(StatusCode, Json<PatientResponse>)> {
    auth_user.require(policy::CLINICAL_INTAKE)?;
    let patient = state.patient_service.create(request).await?;
    Ok((StatusCode::CREATED, Json(patient)))
}

pub async fn get_patient(
    State(state): State<AppState>,
    axum::Extension(_auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<PatientResponse>> {
    let patient = state.patient_service.get(&id).await?;
    Ok(Json(patient))
}

pub async fn get_patient_by_identification(
    State(state): State<AppState>,
    axum::Extension(_auth_user): axum::Extension<AuthenticatedUser>,
    Path(number): Path<String>,
) -> ApiResult<Json<PatientResponse>> {
    let patient = state
        .patient_service
        .find_by_identification_number(&number)
        .await?;
    Ok(Json(patient))
}

pub async fn update_patient(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(request): Json<PatientRequest>,
) -> ApiResult<Json<PatientResponse>> {
    auth_user.require(policy::CLINICAL_INTAKE)?;
    let patient = state.patient_service.update(&id, request).await?;
    Ok(Json(patient))
}

pub async fn delete_patient(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    auth_user.require(policy::CLINICAL_INTAKE)?;
    state.patient_service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_patient_history(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<ClinicalHistoryResponse>> {
    auth_user.require(policy::CLINICAL_INTAKE)?;
    let history = state.patient_service.history(&id).await?;
    Ok(Json(history))
}
