use crate::{
    domain::entities::{ChangePasswordRequest, LoginRequest, LoginResponse, UserResponse},
    infrastructure::http::{
        extract::Json,
        middleware::{ApiResult, AppState, AuthenticatedUser},
    },
};
use axum::{extract::State, http::StatusCode};

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let response = state.identity_service.login(request).await?;
    Ok(Json(response))
}

pub async fn me(
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
) -> ApiResult<Json<UserResponse>> {
    let AuthenticatedUser { user, roles } = auth_user;
    Ok(Json(user.into_response(&roles)))
}

pub async fn change_password(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Json(request): Json<ChangePasswordRequest>,
) -> ApiResult<StatusCode> {
    state
        .identity_service
        .change_password(&auth_user.user.id, request)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
