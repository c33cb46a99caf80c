use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Read-only here; managers are maintained outside this service.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Manager {
    pub manager_id: String,
    pub full_name: String,
    pub email: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
