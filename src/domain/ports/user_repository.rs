use crate::domain::entities::{Role, User};
use crate::domain::ports::repository::CrudRepository;
use crate::infrastructure::http::middleware::error::ApiResult;
use async_trait::async_trait;

#[async_trait]
pub trait UserRepository: CrudRepository<User> {
    async fn find_by_username(&self, username: &str) -> ApiResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> ApiResult<Option<User>>;
    async fn update_password(&self, user_id: &str, password_hash: &str) -> ApiResult<()>;

    // Roles
    async fn list_roles(&self) -> ApiResult<Vec<Role>>;
    async fn find_role_by_name(&self, name: &str) -> ApiResult<Option<Role>>;
    async fn get_user_roles(&self, user_id: &str) -> ApiResult<Vec<Role>>;
    async fn assign_role(&self, user_id: &str, role_id: &str) -> ApiResult<()>;
    async fn remove_role(&self, user_id: &str, role_id: &str) -> ApiResult<bool>;
    async fn count_active_users_with_role(&self, role_name: &str) -> ApiResult<i64>;
}
