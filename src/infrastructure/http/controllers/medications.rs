use crate::{
    application::services::policy,
    domain::entities::{
        AdjustStockRequest, ExpiringQuery, MedicationFilter, MedicationRequest,
        MedicationResponse, StockDepartment,
    },
    infrastructure::http::{
        extract::{Json, Path, Query},
        middleware::{ApiResult, AppState, AuthenticatedUser},
    },
    shared::pagination::{Paged, PaginationParams},
};
use axum::{extract::State, http::StatusCode};

pub async fn list_medications(
    State(state): State<AppState>,
    axum::Extension(_auth_user): axum::Extension<AuthenticatedUser>,
    Query(filter): Query<MedicationFilter>,
    Query(params): Query<PaginationParams>,
) -> ApiResult<Json<Paged<MedicationResponse>>> {
    let medications = state.medication_service.list(filter, params.into()).await?;
    Ok(Json(medications))
}

pub async fn create_medication(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Json(request): Json<MedicationRequest>,
) -> ApiResult<(StatusCode, Json<MedicationResponse>)> {
    auth_user.require(policy::PHARMACY)?;
    let medication = state.medication_service.create(request).await?;
    Ok((StatusCode::CREATED, Json(medication)))
}

pub async fn get_medication(
    State(state): State<AppState>,
    axum::Extension(_auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<MedicationResponse>> {
    let medication = state.medication_service.get(&id).await?;
    Ok(Json(medication))
}

pub async fn update_medication(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(request): Json<MedicationRequest>,
) -> ApiResult<Json<MedicationResponse>> {
    auth_user.require(policy::PHARMACY)?;
    let medication = state.medication_service.update(&id, request).await?;
    Ok(Json(medication))
}

pub async fn delete_medication(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    auth_user.require(policy::PHARMACY)?;
    state.medication_service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_expiring_medications(
    State(state): State<AppState>,
    axum::Extension(_auth_user): axum::Extension<AuthenticatedUser>,
    Query(query): Query<ExpiringQuery>,
) -> ApiResult<Json<Vec<MedicationResponse>>> {
    let medications = state
        .medication_service
        .list_expiring_before(&query.before)
        .await?;
    Ok(Json(medications))
}

pub async fn list_low_stock_medications(
    State(state): State<AppState>,
    axum::Extension(_auth_user): axum::Extension<AuthenticatedUser>,
) -> ApiResult<Json<Vec<MedicationResponse>>> {
    let medications = state.medication_service.list_below_minimum().await?;
    Ok(Json(medications))
}

// Stock rows

pub async fn get_stock(
    State(state): State<AppState>,
    axum::Extension(_auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<StockDepartment>> {
    let stock = state.medication_service.get_stock(&id).await?;
    Ok(Json(stock))
}

pub async fn adjust_stock(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(request): Json<AdjustStockRequest>,
) -> ApiResult<Json<StockDepartment>> {
    auth_user.require(policy::PHARMACY)?;
    let stock = state.medication_service.adjust_stock(&id, request).await?;
    Ok(Json(stock))
}

pub async fn delete_stock(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    auth_user.require(policy::PHARMACY)?;
    state.medication_service.delete_stock(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
