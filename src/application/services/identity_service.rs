use std::sync::Arc;

use crate::application::services::jwt_service::JwtTokenService;
use crate::application::services::password::{hash_password, verify_password};
use crate::domain::entities::{
    validate_password_complexity, ChangePasswordRequest, CreateUserRequest, CreateUserResponse,
    Doctor, LoginRequest, LoginResponse, Role, RoleName, UpdateUserRequest, User, UserResponse,
};
use crate::domain::errors::DomainError;
use crate::domain::ports::{CrudRepository, UserRepository};
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::infrastructure::observability::metrics;
use crate::shared::pagination::{PageRequest, Paged};
use crate::shared::timestamps::now_rfc3339;
use crate::shared::utils::email_validator::validate_and_normalize_email;
use crate::shared::{generate_initial_password, LoginRateLimiter};

/// Users, roles, credentials and token issuance.
#[derive(Clone)]
pub struct IdentityService {
    user_repo: Arc<dyn UserRepository>,
    doctor_repo: Arc<dyn CrudRepository<Doctor>>,
    tokens: JwtTokenService,
    rate_limiter: LoginRateLimiter,
}

impl IdentityService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        doctor_repo: Arc<dyn CrudRepository<Doctor>>,
        tokens: JwtTokenService,
        rate_limiter: LoginRateLimiter,
    ) -> Self {
        Self {
            user_repo,
            doctor_repo,
            tokens,
            rate_limiter,
        }
    }

    pub async fn register(&self, request: CreateUserRequest) -> ApiResult<CreateUserResponse> {
        request.validate()?;
        let email = validate_and_normalize_email(&request.email)?;

        if self.user_repo.find_by_username(&request.username).await?.is_some() {
            return Err(ApiError::Conflict("Username already taken".to_string()));
        }
        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(ApiError::Conflict("Email already registered".to_string()));
        }
        if let Some(doctor_id) = &request.doctor_id {
            self.ensure_doctor_exists(doctor_id).await?;
        }

        let (password, initial_password) = match request.password {
            Some(password) => (password, None),
            None => {
                let generated = generate_initial_password();
                (generated.clone(), Some(generated))
            }
        };

        let user = User::new(
            request.username,
            email,
            request.full_name,
            hash_password(&password)?,
            request.doctor_id,
        );
        self.user_repo.insert(&user).await?;

        for name in &request.roles {
            let role = self.resolve_role(name).await?;
            self.user_repo.assign_role(&user.id, &role.id).await?;
        }

        tracing::info!("Registered user {} ({})", user.username, user.id);

        let roles = self.user_repo.get_user_roles(&user.id).await?;
        Ok(CreateUserResponse {
            user: user.into_response(&roles),
            initial_password,
        })
    }

    pub async fn get_user(&self, id: &str) -> ApiResult<UserResponse> {
        let user = self.find_user(id).await?;
        let roles = self.user_repo.get_user_roles(&user.id).await?;
        Ok(user.into_response(&roles))
    }

    pub async fn list_users(&self, page: PageRequest) -> ApiResult<Paged<UserResponse>> {
        let users = self.user_repo.list(page).await?;
        let total = self.user_repo.count().await?;

        let mut items = Vec::with_capacity(users.len());
        for user in users {
            let roles = self.user_repo.get_user_roles(&user.id).await?;
            items.push(user.into_response(&roles));
        }
        Ok(Paged::new(items, page, total))
    }

    pub async fn update_user(
        &self,
        id: &str,
        request: UpdateUserRequest,
    ) -> ApiResult<UserResponse> {
        request.validate()?;
        let mut user = self.find_user(id).await?;

        if let Some(full_name) = request.full_name {
            user.full_name = full_name.trim().to_string();
        }
        if let Some(is_active) = request.is_active {
            if !is_active && user.is_active {
                self.ensure_not_last_admin(&user.id).await?;
            }
            user.is_active = is_active;
        }
        if let Some(doctor_id) = request.doctor_id {
            if let Some(doctor_id) = &doctor_id {
                self.ensure_doctor_exists(doctor_id).await?;
            }
            user.doctor_id = doctor_id;
        }
        user.updated_at = now_rfc3339();

        self.user_repo.update(&user).await?;
        let roles = self.user_repo.get_user_roles(&user.id).await?;
        Ok(user.into_response(&roles))
    }

    pub async fn delete_user(&self, id: &str, acting_user_id: &str) -> ApiResult<()> {
        if id == acting_user_id {
            return Err(ApiError::Conflict("You cannot delete your own account".to_string()));
        }
        let user = self.find_user(id).await?;
        self.ensure_not_last_admin(&user.id).await?;

        self.user_repo.delete(&user.id).await?;
        tracing::info!("Deleted user {} ({})", user.username, user.id);
        Ok(())
    }

    pub async fn assign_role(&self, user_id: &str, role_name: &str) -> ApiResult<UserResponse> {
        let user = self.find_user(user_id).await?;
        let role = self.resolve_role(role_name).await?;
        self.user_repo.assign_role(&user.id, &role.id).await?;

        let roles = self.user_repo.get_user_roles(&user.id).await?;
        Ok(user.into_response(&roles))
    }

    pub async fn remove_role(&self, user_id: &str, role_name: &str) -> ApiResult<UserResponse> {
        let user = self.find_user(user_id).await?;
        let role = self.resolve_role(role_name).await?;

        if role.name == RoleName::Admin.as_str() {
            self.ensure_not_last_admin(&user.id).await?;
        }
        if !self.user_repo.remove_role(&user.id, &role.id).await? {
            return Err(ApiError::NotFound(format!(
                "User {} does not have role {}",
                user.username, role.name
            )));
        }

        let roles = self.user_repo.get_user_roles(&user.id).await?;
        Ok(user.into_response(&roles))
    }

    pub async fn list_roles(&self) -> ApiResult<Vec<Role>> {
        self.user_repo.list_roles().await
    }

    pub async fn change_password(
        &self,
        user_id: &str,
        request: ChangePasswordRequest,
    ) -> ApiResult<()> {
        let user = self.find_user(user_id).await?;

        if !verify_password(&request.current_password, &user.password_hash)? {
            return Err(
                DomainError::invalid("current_password", "Current password is incorrect").into(),
            );
        }
        validate_password_complexity("new_password", &request.new_password)?;
        if request.new_password == request.current_password {
            return Err(DomainError::invalid(
                "new_password",
                "New password must differ from the current one",
            )
            .into());
        }

        let hash = hash_password(&request.new_password)?;
        self.user_repo.update_password(&user.id, &hash).await
    }

    /// Authenticates by username or email.
    pub async fn login(&self, request: LoginRequest) -> ApiResult<LoginResponse> {
        let login = request.login.trim().to_lowercase();

        if let Err(wait) = self.rate_limiter.check(&login).await {
            metrics::record_login("throttled");
            tracing::warn!("Login throttled for {}", login);
            return Err(ApiError::TooManyRequests(format!(
                "Too many login attempts. Try again in {} seconds",
                wait.as_secs().max(1)
            )));
        }

        let user = if login.contains('@') {
            self.user_repo.find_by_email(&login).await?
        } else {
            self.user_repo.find_by_username(&login).await?
        };

        let user = match user {
            Some(user) if user.is_active => user,
            _ => {
                metrics::record_login("failure");
                return Err(ApiError::Unauthorized);
            }
        };

        if !verify_password(&request.password, &user.password_hash)? {
            metrics::record_login("failure");
            tracing::info!("Failed login for {}", login);
            return Err(ApiError::Unauthorized);
        }

        self.rate_limiter.reset(&login).await;
        metrics::record_login("success");

        let roles = self.user_repo.get_user_roles(&user.id).await?;
        let token = self.tokens.issue(&user, &roles)?;
        Ok(LoginResponse {
            access_token: token.token,
            token_type: token.token_type,
            expires_at: token.expires_at,
            user: user.into_response(&roles),
        })
    }

    /// Resolves a bearer token into the active user it was issued to.
    pub async fn authenticate(&self, token: &str) -> ApiResult<(User, Vec<Role>)> {
        let claims = self.tokens.validate(token)?;

        let user = self
            .user_repo
            .find_by_id(&claims.sub)
            .await?
            .filter(|u| u.is_active)
            .ok_or(ApiError::Unauthorized)?;

        let roles = self.user_repo.get_user_roles(&user.id).await?;
        Ok((user, roles))
    }

    /// Creates the bootstrap admin, or restores its Admin role if it already exists.
    pub async fn ensure_admin(&self, username: &str, email: &str, password: &str) -> ApiResult<()> {
        let admin_role = self.resolve_role(RoleName::Admin.as_str()).await?;

        if let Some(existing) = self.user_repo.find_by_username(username).await? {
            self.user_repo.assign_role(&existing.id, &admin_role.id).await?;
            tracing::debug!("Admin user {} already present", existing.username);
            return Ok(());
        }

        let email = validate_and_normalize_email(email)?;
        validate_password_complexity("ADMIN_PASSWORD", password)?;

        let user = User::new(
            username.to_string(),
            email,
            "Administrator".to_string(),
            hash_password(password)?,
            None,
        );
        self.user_repo.insert(&user).await?;
        self.user_repo.assign_role(&user.id, &admin_role.id).await?;

        tracing::info!("Created admin user {}", user.username);
        Ok(())
    }

    async fn find_user(&self, id: &str) -> ApiResult<User> {
        self.user_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("User {} not found", id)))
    }

    async fn resolve_role(&self, name: &str) -> ApiResult<Role> {
        let role_name: RoleName = name
            .parse()
            .map_err(|e: String| ApiError::from(DomainError::invalid("role", e)))?;

        self.user_repo
            .find_role_by_name(role_name.as_str())
            .await?
            .ok_or_else(|| ApiError::Internal(format!("Role {} is not seeded", role_name)))
    }

    async fn ensure_doctor_exists(&self, doctor_id: &str) -> ApiResult<()> {
        if self.doctor_repo.exists(doctor_id).await? {
            Ok(())
        } else {
            let message = format!("Doctor {} does not exist", doctor_id);
            Err(DomainError::invalid("doctor_id", message).into())
        }
    }

    async fn ensure_not_last_admin(&self, user_id: &str) -> ApiResult<()> {
        let roles = self.user_repo.get_user_roles(user_id).await?;
        if !roles.iter().any(|r| r.name == RoleName::Admin.as_str()) {
            return Ok(());
        }
        if self
            .user_repo
            .count_active_users_with_role(RoleName::Admin.as_str())
            .await?
            <= 1
        {
            return Err(ApiError::Conflict(
                "The last active administrator cannot be removed".to_string(),
            ));
        }
        Ok(())
    }
}
