use crate::domain::{models::user::User, ports::UserRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::error;

const USER_COLUMNS: &str = "user_id, manager_id, full_name, mob_num, pan_num, created_at, updated_at, is_active";

pub struct PostgresUserRepo {
    pool: PgPool,
}

impl PostgresUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepo {
    async fn create(&self, user: &User) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users ({USER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {USER_COLUMNS}"
        ))
            .bind(&user.user_id)
            .bind(&user.manager_id)
            .bind(&user.full_name)
            .bind(&user.mob_num)
            .bind(&user.pan_num)
            .bind(user.created_at)
            .bind(user.updated_at)
            .bind(user.is_active)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, user_id: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_id = $1 AND is_active = TRUE"
        ))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_mob(&self, mob_num: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE mob_num = $1 AND is_active = TRUE"
        ))
            .bind(mob_num)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_manager(&self, manager_id: &str) -> Result<Vec<User>, AppError> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE manager_id = $1 AND is_active = TRUE ORDER BY created_at ASC, user_id ASC"
        ))
            .bind(manager_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_all(&self) -> Result<Vec<User>, AppError> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC, user_id ASC"
        ))
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, user: &User) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET full_name = $1, mob_num = $2, pan_num = $3, manager_id = $4, updated_at = $5
             WHERE user_id = $6 AND is_active = TRUE
             RETURNING {USER_COLUMNS}"
        ))
            .bind(&user.full_name)
            .bind(&user.mob_num)
            .bind(&user.pan_num)
            .bind(&user.manager_id)
            .bind(user.updated_at)
            .bind(&user.user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.user_id)))
    }

    async fn fork(&self, previous_id: &str, successor: &User) -> Result<User, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let result = sqlx::query("UPDATE users SET is_active = FALSE WHERE user_id = $1 AND is_active = TRUE")
            .bind(previous_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User {} not found", previous_id)));
        }

        let created = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users ({USER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {USER_COLUMNS}"
        ))
            .bind(&successor.user_id)
            .bind(&successor.manager_id)
            .bind(&successor.full_name)
            .bind(&successor.mob_num)
            .bind(&successor.pan_num)
            .bind(successor.created_at)
            .bind(successor.updated_at)
            .bind(successor.is_active)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                error!("Postgres User Fork Failed: {:?}", e);
                AppError::Database(e)
            })?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn delete_by_id(&self, user_id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Postgres User Deletion Failed: {:?}", e);
                AppError::Database(e)
            })?;
        Ok(())
    }

    async fn delete_by_mob(&self, mob_num: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM users WHERE mob_num = $1")
            .bind(mob_num)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Postgres User Deletion Failed: {:?}", e);
                AppError::Database(e)
            })?;
        Ok(())
    }
}
