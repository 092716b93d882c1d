use crate::domain::entities::{Role, User};
use crate::domain::ports::user_repository::UserRepository;
use crate::infrastructure::http::middleware::error::ApiResult;
use crate::infrastructure::persistence::crud::{flag, optional_text, AnyQuery, Table};
use crate::infrastructure::persistence::Database;
use crate::shared::timestamps::now_rfc3339;
use async_trait::async_trait;
use sqlx::any::AnyRow;
use sqlx::Row;

impl Table for User {
    const TABLE: &'static str = "users";
    const COLUMNS: &'static [&'static str] = &[
        "username",
        "email",
        "full_name",
        "password_hash",
        "is_active",
        "doctor_id",
        "created_at",
        "updated_at",
        "id",
    ];
    const ORDER_BY: &'static str = "username";
    const NAME: &'static str = "User";

    fn id(&self) -> &str {
        &self.id
    }

    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(User {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            email: row.try_get("email")?,
            full_name: row.try_get("full_name")?,
            password_hash: row.try_get("password_hash")?,
            is_active: flag(row, "is_active")?,
            doctor_id: optional_text(row, "doctor_id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn bind_columns<'q>(&'q self, query: AnyQuery<'q>) -> AnyQuery<'q> {
        query
            .bind(&self.username)
            .bind(&self.email)
            .bind(&self.full_name)
            .bind(&self.password_hash)
            .bind(i64::from(self.is_active))
            .bind(self.doctor_id.as_deref())
            .bind(&self.created_at)
            .bind(&self.updated_at)
            .bind(&self.id)
    }
}

const USER_SELECT: &str = "SELECT id, username, email, full_name, password_hash, is_active,
            doctor_id, created_at, updated_at
     FROM users";

fn role_from_row(row: &AnyRow) -> Result<Role, sqlx::Error> {
    Ok(Role {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: optional_text(row, "description")?,
    })
}

#[async_trait]
impl UserRepository for Database {
    async fn find_by_username(&self, username: &str) -> ApiResult<Option<User>> {
        let sql = format!("{} WHERE username = ?", USER_SELECT);
        let row = sqlx::query(&sql)
            .bind(username.trim().to_lowercase())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| User::from_row(&row)).transpose()?)
    }

    async fn find_by_email(&self, email: &str) -> ApiResult<Option<User>> {
        let sql = format!("{} WHERE email = ?", USER_SELECT);
        let row = sqlx::query(&sql)
            .bind(email.trim().to_lowercase())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| User::from_row(&row)).transpose()?)
    }

    async fn update_password(&self, user_id: &str, password_hash: &str) -> ApiResult<()> {
        sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
            .bind(password_hash)
            .bind(now_rfc3339())
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn list_roles(&self) -> ApiResult<Vec<Role>> {
        let rows = sqlx::query("SELECT id, name, description FROM roles ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(role_from_row).collect::<Result<_, _>>()?)
    }

    async fn find_role_by_name(&self, name: &str) -> ApiResult<Option<Role>> {
        let row =
            sqlx::query("SELECT id, name, description FROM roles WHERE name = ? COLLATE NOCASE")
                .bind(name.trim())
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|row| role_from_row(&row)).transpose()?)
    }

    async fn get_user_roles(&self, user_id: &str) -> ApiResult<Vec<Role>> {
        let rows = sqlx::query(
            "SELECT r.id, r.name, r.description
             FROM roles r
             INNER JOIN user_roles ur ON ur.role_id = r.id
             WHERE ur.user_id = ?
             ORDER BY r.name",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(role_from_row).collect::<Result<_, _>>()?)
    }

    async fn assign_role(&self, user_id: &str, role_id: &str) -> ApiResult<()> {
        sqlx::query(
            "INSERT INTO user_roles (user_id, role_id, created_at)
             VALUES (?, ?, ?)
             ON CONFLICT(user_id, role_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(role_id)
        .bind(now_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove_role(&self, user_id: &str, role_id: &str) -> ApiResult<bool> {
        let result = sqlx::query("DELETE FROM user_roles WHERE user_id = ? AND role_id = ?")
            .bind(user_id)
            .bind(role_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_active_users_with_role(&self, role_name: &str) -> ApiResult<i64> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS total
             FROM users u
             INNER JOIN user_roles ur ON ur.user_id = u.id
             INNER JOIN roles r ON r.id = ur.role_id
             WHERE r.name = ? AND u.is_active = 1",
        )
        .bind(role_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get("total")?)
    }
}
