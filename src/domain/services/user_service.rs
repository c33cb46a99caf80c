use std::sync::Arc;
use crate::domain::{
    models::user::{NewUserParams, User, UserField},
    ports::{ManagerRepository, UserRepository},
    services::validation::{
        canonical_manager_id, validate_and_format_phone, validate_and_format_tax_id,
        validate_full_name, validate_manager_ref, DUPLICATE_MOBILE_MESSAGE,
    },
};
use crate::error::AppError;
use tracing::{error, info, warn};

/// Raw create payload. Mandatory fields are optional here so that a missing
/// key fails validation for that field instead of failing deserialization.
#[derive(Debug, Default, Clone)]
pub struct CreateUserInput {
    pub full_name: Option<String>,
    pub mob_num: Option<String>,
    pub pan_num: Option<String>,
    pub manager_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserLookup {
    All,
    ById(String),
    ByMob(String),
    ByManager(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteKey {
    ById(String),
    ByMob(String),
}

pub struct UserService {
    users: Arc<dyn UserRepository>,
    managers: Arc<dyn ManagerRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, managers: Arc<dyn ManagerRepository>) -> Self {
        Self { users, managers }
    }

    /// Validates name, phone, PAN and (if given) manager in that order, then
    /// inserts. The first failing field is reported and nothing is written.
    pub async fn create_user(&self, input: CreateUserInput) -> Result<User, AppError> {
        let full_name = validate_full_name(input.full_name.as_deref().unwrap_or_default())
            .inspect_err(|e| warn!(field = %e.field, "create rejected"))?;
        let mob_num = validate_and_format_phone(input.mob_num.as_deref().unwrap_or_default())
            .inspect_err(|e| warn!(field = %e.field, "create rejected"))?;
        let pan_num = validate_and_format_tax_id(input.pan_num.as_deref().unwrap_or_default())
            .inspect_err(|e| warn!(field = %e.field, "create rejected"))?;
        let manager_id = match input.manager_id {
            Some(raw) => Some(validate_manager_ref(self.managers.as_ref(), &raw).await?),
            None => None,
        };

        let user = User::new(NewUserParams { full_name, mob_num, pan_num, manager_id });
        let created = self.users.create(&user).await.map_err(|e| {
            if e.is_unique_violation() {
                warn!(field = %UserField::MobNum, "create rejected: mobile number in use");
                return AppError::Conflict(DUPLICATE_MOBILE_MESSAGE.to_string());
            }
            error!("Failed to create user {}: {:?}", user.user_id, e);
            e
        })?;

        info!("User created with ID {}", created.user_id);
        Ok(created)
    }

    pub async fn get_users(&self, lookup: UserLookup) -> Result<Vec<User>, AppError> {
        match lookup {
            UserLookup::All => self.users.list_all().await,
            UserLookup::ById(user_id) => Ok(self.users.find_by_id(&user_id).await?.into_iter().collect()),
            UserLookup::ByMob(mob_num) => {
                let mob_num = normalize_mob(&mob_num);
                Ok(self.users.find_by_mob(&mob_num).await?.into_iter().collect())
            }
            UserLookup::ByManager(manager_id) => {
                let manager_id = canonical_manager_id(&manager_id).unwrap_or(manager_id);
                self.users.list_by_manager(&manager_id).await
            }
        }
    }

    /// Hard-deletes by id or phone after confirming an active user carries the key.
    pub async fn delete_user(&self, key: DeleteKey) -> Result<(), AppError> {
        match key {
            DeleteKey::ById(user_id) => {
                if self.users.find_by_id(&user_id).await?.is_none() {
                    return Err(AppError::NotFound("User with provided user_id not found.".into()));
                }
                self.users.delete_by_id(&user_id).await?;
                info!("Deleted user {}", user_id);
            }
            DeleteKey::ByMob(raw) => {
                let mob_num = normalize_mob(&raw);
                if self.users.find_by_mob(&mob_num).await?.is_none() {
                    return Err(AppError::NotFound("User with provided mobile number not found.".into()));
                }
                self.users.delete_by_mob(&mob_num).await?;
                info!("Deleted user(s) with mobile number ending {}", mask_tail(&mob_num));
            }
        }
        Ok(())
    }
}

/// Canonical digits when the key parses as a phone number, the raw key otherwise.
fn normalize_mob(raw: &str) -> String {
    validate_and_format_phone(raw).unwrap_or_else(|_| raw.to_string())
}

fn mask_tail(mob_num: &str) -> &str {
    let start = mob_num.len().saturating_sub(4);
    mob_num.get(start..).unwrap_or_default()
}
