use crate::{
    application::services::policy,
    domain::entities::{ClinicalRecordFilter, CreateDerivationRequest, DerivationDetails},
    infrastructure::http::{
        extract::{Json, Path, Query},
        middleware::{ApiResult, AppState, AuthenticatedUser},
    },
    shared::pagination::{Paged, PaginationParams},
};
use axum::{extract::State, http::StatusCode};

pub async fn list_derivations(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Query(filter): Query<ClinicalRecordFilter>,
    Query(params): Query<PaginationParams>,
) -> ApiResult<Json<Paged<DerivationDetails>>> {
    auth_user.require(policy::CLINICAL_INTAKE)?;
    let derivations = state.derivation_service.list(filter, params.into()).await?;
    Ok(Json(derivations))
}

pub async fn create_derivation(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Json(request): Json<CreateDerivationRequest>,
) -> ApiResult<(StatusCode, Json<DerivationDetails>)> {
    auth_user.require(policy::CLINICAL_INTAKE)?;
    let derivation = state.derivation_service.create(request).await?;
    Ok((StatusCode::CREATED, Json(derivation)))
}

pub async fn get_derivation(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<DerivationDetails>> {
    auth_user.require(policy::CLINICAL_INTAKE)?;
    let derivation = state.derivation_service.get(&id).await?;
    Ok(Json(derivation))
}

pub async fn delete_derivation(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    auth_user.require(policy::CLINICAL_INTAKE)?;
    state.derivation_service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
