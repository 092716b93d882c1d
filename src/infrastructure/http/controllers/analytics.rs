use crate::{
    application::services::policy,
    domain::entities::{
        ConsumptionQuery, DashboardSummary, DoctorSuccessRate, MedicationConsumption,
        MonthlyAveragesQuery, MonthlyAveragesReport, SuccessRateQuery,
    },
    infrastructure::http::{
        extract::{Json, Query},
        middleware::{ApiResult, AppState, AuthenticatedUser},
    },
};
use axum::extract::State;

pub async fn doctor_success_rate(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Query(query): Query<SuccessRateQuery>,
) -> ApiResult<Json<Vec<DoctorSuccessRate>>> {
    auth_user.require(policy::ANALYTICS)?;
    let rates = state.analytics_service.doctor_success_rates(query).await?;
    Ok(Json(rates))
}

pub async fn monthly_averages(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Query(query): Query<MonthlyAveragesQuery>,
) -> ApiResult<Json<MonthlyAveragesReport>> {
    auth_user.require(policy::ANALYTICS)?;
    let report = state.analytics_service.monthly_averages(query).await?;
    Ok(Json(report))
}

pub async fn medication_consumption(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Query(query): Query<ConsumptionQuery>,
) -> ApiResult<Json<Vec<MedicationConsumption>>> {
    auth_user.require(policy::ANALYTICS)?;
    let consumption = state.analytics_service.medication_consumption(query).await?;
    Ok(Json(consumption))
}

pub async fn summary(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
) -> ApiResult<Json<DashboardSummary>> {
    auth_user.require(policy::ANALYTICS)?;
    let summary = state.analytics_service.summary().await?;
    Ok(Json(summary))
}
