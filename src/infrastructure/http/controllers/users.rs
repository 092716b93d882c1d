use crate::{
    application::services::policy,
    domain::entities::{
        AssignRoleRequest, CreateUserRequest, CreateUserResponse, Role, UpdateUserRequest,
        UserResponse,
    },
    infrastructure::http::{
        extract::{Json, Path, Query},
        middleware::{ApiResult, AppState, AuthenticatedUser},
    },
    shared::pagination::{Paged, PaginationParams},
};
use axum::{extract::State, http::StatusCode};

pub async fn list_users(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Query(params): Query<PaginationParams>,
) -> ApiResult<Json<Paged<UserResponse>>> {
    auth_user.require(policy::ADMIN)?;
    let users = state.identity_service.list_users(params.into()).await?;
    Ok(Json(users))
}

pub async fn create_user(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Json(request): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<CreateUserResponse>)> {
    auth_user.require(policy::ADMIN)?;
    let response = state.identity_service.register(request).await?;
    tracing::info!(
        "User {} registered by {}",
        response.user.username,
        auth_user.user.username
    );
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn get_user(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<UserResponse>> {
    // Anyone may read their own account
    if auth_user.user.id != id {
        auth_user.require(policy::ADMIN)?;
    }
    let user = state.identity_service.get_user(&id).await?;
    Ok(Json(user))
}

pub async fn update_user(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    auth_user.require(policy::ADMIN)?;
    let user = state.identity_service.update_user(&id, request).await?;
    Ok(Json(user))
}

pub async fn delete_user(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    auth_user.require(policy::ADMIN)?;
    state
        .identity_service
        .delete_user(&id, &auth_user.user.id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn assign_role(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(request): Json<AssignRoleRequest>,
) -> ApiResult<Json<UserResponse>> {
    auth_user.require(policy::ADMIN)?;
    let user = state.identity_service.assign_role(&id, &request.role).await?;
    Ok(Json(user))
}

pub async fn remove_role(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path((id, role)): Path<(String, String)>,
) -> ApiResult<Json<UserResponse>> {
    auth_user.require(policy::ADMIN)?;
    let user = state.identity_service.remove_role(&id, &role).await?;
    Ok(Json(user))
}

pub async fn list_roles(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
) -> ApiResult<Json<Vec<Role>>> {
    auth_user.require(policy::ADMIN)?;
    let roles = state.identity_service.list_roles().await?;
    Ok(Json(roles))
}
