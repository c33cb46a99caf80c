use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::fmt;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
pub struct User {
    pub user_id: String,
    pub manager_id: Option<String>,
    pub full_name: String,
    pub mob_num: String,
    pub pan_num: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

/// The mutable fields of a user record, named as they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserField {
    FullName,
    MobNum,
    PanNum,
    ManagerId,
}

impl UserField {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserField::FullName => "full_name",
            UserField::MobNum => "mob_num",
            UserField::PanNum => "pan_num",
            UserField::ManagerId => "manager_id",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "full_name" => Some(UserField::FullName),
            "mob_num" => Some(UserField::MobNum),
            "pan_num" => Some(UserField::PanNum),
            "manager_id" => Some(UserField::ManagerId),
            _ => None,
        }
    }
}

impl fmt::Display for UserField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Already-validated field values for a brand new record.
pub struct NewUserParams {
    pub full_name: String,
    pub mob_num: String,
    pub pan_num: String,
    pub manager_id: Option<String>,
}

impl User {
    pub fn new(params: NewUserParams) -> Self {
        Self {
            user_id: Uuid::new_v4().to_string(),
            manager_id: params.manager_id,
            full_name: params.full_name,
            mob_num: params.mob_num,
            pan_num: params.pan_num,
            created_at: Utc::now(),
            updated_at: None,
            is_active: true,
        }
    }

    /// Successor record for a manager change. Keeps the personal fields and the
    /// original `created_at` so the lineage still dates back to the first record.
    pub fn successor(&self, manager_id: String) -> Self {
        Self {
            user_id: Uuid::new_v4().to_string(),
            manager_id: Some(manager_id),
            full_name: self.full_name.clone(),
            mob_num: self.mob_num.clone(),
            pan_num: self.pan_num.clone(),
            created_at: self.created_at,
            updated_at: Some(Utc::now()),
            is_active: true,
        }
    }
}
