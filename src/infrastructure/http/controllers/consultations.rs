use crate::{
    application::services::policy,
    domain::entities::{ConsultationDetails, ConsultationFilter, CreateConsultationRequest},
    infrastructure::http::{
        extract::{Json, Path, Query},
        middleware::{ApiResult, AppState, AuthenticatedUser},
    },
    shared::pagination::{Paged, PaginationParams},
};
use axum::{extract::State, http::StatusCode};

pub async fn list_consultations(
    State(state): State<AppState>,
    axum::Extension(_auth_user): axum::Extension<AuthenticatedUser>,
    Query(filter): Query<ConsultationFilter>,
    Query(params): Query<PaginationParams>,
) -> ApiResult<Json<Paged<ConsultationDetails>>> {
    let consultations = state
        .consultation_service
        .list(filter, params.into())
        .await?;
    Ok(Json(consultations))
}

pub async fn create_consultation(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Json(request): Json<CreateConsultationRequest>,
) -> ApiResult<(StatusCode, Json<ConsultationDetails>)> {
    auth_user.require(policy::CONSULTATIONS)?;
    let consultation = state.consultation_service.create(request).await?;
    tracing::info!(
        "Consultation {} recorded by {}",
        consultation.id,
        auth_user.user.username
    );
    Ok((StatusCode::CREATED, Json(consultation)))
}

pub async fn get_consultation(
    State(state): State<AppState>,
    axum::Extension(_auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<ConsultationDetails>> {
    let consultation = state.consultation_service.get(&id).await?;
    Ok(Json(consultation))
}

pub async fn delete_consultation(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    auth_user.require(policy::CONSULTATIONS)?;
    state.consultation_service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
