use crate::domain::{models::manager::Manager, ports::ManagerRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresManagerRepo {
    pool: PgPool,
}

impl PostgresManagerRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ManagerRepository for PostgresManagerRepo {
    async fn find_by_id(&self, manager_id: &str) -> Result<Option<Manager>, AppError> {
        sqlx::query_as::<_, Manager>(
            "SELECT manager_id, full_name, email, is_active, created_at FROM managers WHERE manager_id = $1 AND is_active = TRUE",
        )
            .bind(manager_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
