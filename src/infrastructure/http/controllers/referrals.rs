use crate::{
    application::services::policy,
    domain::entities::{ClinicalRecordFilter, CreateReferralRequest, ReferralDetails},
    infrastructure::http::{
        extract::{Json, Path, Query},
        middleware::{ApiResult, AppState, AuthenticatedUser},
    },
    shared::pagination::{Paged, PaginationParams},
};
use axum::{extract::State, http::StatusCode};

pub async fn list_referrals(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Query(filter): Query<ClinicalRecordFilter>,
    Query(params): Query<PaginationParams>,
) -> ApiResult<Json<Paged<ReferralDetails>>> {
    auth_user.require(policy::CLINICAL_INTAKE)?;
    let referrals = state.referral_service.list(filter, params.into()).await?;
    Ok(Json(referrals))
}

pub async fn create_referral(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Json(request): Json<CreateReferralRequest>,
) -> ApiResult<(StatusCode, Json<ReferralDetails>)> {
    auth_user.require(policy::CLINICAL_INTAKE)?;
    let referral = state.referral_service.create(request).await?;
    Ok((StatusCode::CREATED, Json(referral)))
}

pub async fn get_referral(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<ReferralDetails>> {
    auth_user.require(policy::CLINICAL_INTAKE)?;
    let referral = state.referral_service.get(&id).await?;
    Ok(Json(referral))
}

pub async fn delete_referral(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    auth_user.require(policy::CLINICAL_INTAKE)?;
    state.referral_service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
