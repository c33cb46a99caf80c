use std::sync::Arc;
use chrono::Utc;
use serde::Serialize;
use tracing::{error, info, info_span, warn, Instrument};
use crate::domain::{
    models::user::{User, UserField},
    ports::{ManagerRepository, UserRepository},
    services::validation::{
        canonical_manager_id, validate_and_format_phone, validate_and_format_tax_id,
        validate_full_name, validate_manager_ref, DUPLICATE_MOBILE_MESSAGE,
    },
};
use crate::error::{AppError, ValidationError};

/// A field in an update request. `Absent` means "leave as is" and is never
/// confused with an explicit value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Patch<T> {
    #[default]
    Absent,
    Present(T),
}

impl<T> Patch<T> {
    pub fn is_present(&self) -> bool {
        matches!(self, Patch::Present(_))
    }

    pub fn as_ref(&self) -> Patch<&T> {
        match self {
            Patch::Absent => Patch::Absent,
            Patch::Present(v) => Patch::Present(v),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub full_name: Patch<String>,
    pub mob_num: Patch<String>,
    pub pan_num: Patch<String>,
    pub manager_id: Patch<String>,
}

impl UserPatch {
    pub fn set(&mut self, field: UserField, value: String) {
        let slot = match field {
            UserField::FullName => &mut self.full_name,
            UserField::MobNum => &mut self.mob_num,
            UserField::PanNum => &mut self.pan_num,
            UserField::ManagerId => &mut self.manager_id,
        };
        *slot = Patch::Present(value);
    }

    /// Present fields in validation order.
    pub fn present_fields(&self) -> Vec<UserField> {
        [
            (UserField::FullName, self.full_name.is_present()),
            (UserField::MobNum, self.mob_num.is_present()),
            (UserField::PanNum, self.pan_num.is_present()),
            (UserField::ManagerId, self.manager_id.is_present()),
        ]
        .into_iter()
        .filter_map(|(field, present)| present.then_some(field))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.present_fields().is_empty()
    }

    fn personal_fields(&self) -> Vec<UserField> {
        self.present_fields()
            .into_iter()
            .filter(|f| *f != UserField::ManagerId)
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct UpdateRequest {
    pub user_ids: Vec<String>,
    pub patch: UserPatch,
}

/// What happened to one requested id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UpdateOutcome {
    UpdatedInPlace {
        user_id: String,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        ignored_fields: Vec<UserField>,
    },
    /// The old record was deactivated and `new_user_id` now carries the lineage.
    Forked {
        user_id: String,
        new_user_id: String,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        ignored_fields: Vec<UserField>,
    },
    NoOp {
        user_id: String,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        ignored_fields: Vec<UserField>,
    },
    NotFound {
        user_id: String,
    },
    ValidationError {
        user_id: String,
        field: UserField,
        message: String,
    },
    /// The write collided with another active user, e.g. on the mobile number.
    Conflict {
        user_id: String,
        field: UserField,
        message: String,
    },
    StoreError {
        user_id: String,
        message: String,
    },
}

impl UpdateOutcome {
    pub fn user_id(&self) -> &str {
        match self {
            UpdateOutcome::UpdatedInPlace { user_id, .. }
            | UpdateOutcome::Forked { user_id, .. }
            | UpdateOutcome::NoOp { user_id, .. }
            | UpdateOutcome::NotFound { user_id }
            | UpdateOutcome::ValidationError { user_id, .. }
            | UpdateOutcome::Conflict { user_id, .. }
            | UpdateOutcome::StoreError { user_id, .. } => user_id,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(
            self,
            UpdateOutcome::UpdatedInPlace { .. } | UpdateOutcome::Forked { .. } | UpdateOutcome::NoOp { .. }
        )
    }

    fn rejected(user_id: &str, err: ValidationError) -> Self {
        UpdateOutcome::ValidationError {
            user_id: user_id.to_string(),
            field: err.field,
            message: err.message,
        }
    }
}

/// One outcome per requested id, in request order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateReport {
    pub outcomes: Vec<UpdateOutcome>,
}

impl UpdateReport {
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(UpdateOutcome::is_success)
    }
}

pub struct ReassignmentEngine {
    users: Arc<dyn UserRepository>,
    managers: Arc<dyn ManagerRepository>,
}

impl ReassignmentEngine {
    pub fn new(users: Arc<dyn UserRepository>, managers: Arc<dyn ManagerRepository>) -> Self {
        Self { users, managers }
    }

    /// Applies `request.patch` to every listed user independently.
    ///
    /// Request-shape problems (no ids, nothing to change, non-manager fields in
    /// a bulk request) fail the whole call before any record is read. Past that
    /// point every id gets its own outcome and a failing id never stops the rest.
    pub async fn update_users(&self, request: UpdateRequest) -> Result<UpdateReport, AppError> {
        if request.user_ids.is_empty() {
            return Err(AppError::Usage("user_ids must not be empty.".into()));
        }
        if request.patch.is_empty() {
            return Err(AppError::Usage("update_data must contain at least one field.".into()));
        }
        if request.user_ids.len() > 1 {
            if let Some(extra) = request.patch.personal_fields().first() {
                warn!(field = %extra, ids = request.user_ids.len(), "bulk update rejected");
                return Err(AppError::Usage(format!("Bulk update only supports manager_id. Extra key: {}", extra)));
            }
        }

        let mut outcomes = Vec::with_capacity(request.user_ids.len());
        for user_id in &request.user_ids {
            let span = info_span!("update_user", user_id = %user_id);
            let outcome = match self.update_one(user_id, &request.patch).instrument(span).await {
                Ok(outcome) => outcome,
                Err(e) if e.is_unique_violation() => {
                    warn!("Update of user {} collides with another active user", user_id);
                    UpdateOutcome::Conflict {
                        user_id: user_id.clone(),
                        field: UserField::MobNum,
                        message: DUPLICATE_MOBILE_MESSAGE.to_string(),
                    }
                }
                Err(e) => {
                    error!("Store failure while updating user {}: {:?}", user_id, e);
                    UpdateOutcome::StoreError {
                        user_id: user_id.clone(),
                        message: "Failed to update user.".to_string(),
                    }
                }
            };
            outcomes.push(outcome);
        }

        Ok(UpdateReport { outcomes })
    }

    /// Returns `Err` only for store failures; lookup and validation failures
    /// become outcomes.
    async fn update_one(&self, user_id: &str, patch: &UserPatch) -> Result<UpdateOutcome, AppError> {
        let Some(existing) = self.users.find_by_id(user_id).await? else {
            warn!("User {} not found", user_id);
            return Ok(UpdateOutcome::NotFound { user_id: user_id.to_string() });
        };

        let edited = match apply_personal_fields(&existing, patch) {
            Ok(edited) => edited,
            Err(e) => {
                warn!(field = %e.field, "update rejected");
                return Ok(UpdateOutcome::rejected(user_id, e));
            }
        };

        match patch.manager_id.as_ref() {
            Patch::Absent => {
                let mut edited = edited;
                edited.updated_at = Some(Utc::now());
                if !self.write_in_place(&edited).await? {
                    return Ok(UpdateOutcome::NotFound { user_id: user_id.to_string() });
                }
                info!("Updated user {} in place", user_id);
                Ok(UpdateOutcome::UpdatedInPlace { user_id: user_id.to_string(), ignored_fields: Vec::new() })
            }
            Patch::Present(raw) => self.reassign(existing, raw, patch.personal_fields()).await,
        }
    }

    /// Manager changes are exclusive: validated personal edits that arrived in
    /// the same request are dropped and reported back as `ignored_fields`.
    async fn reassign(
        &self,
        existing: User,
        raw_manager_id: &str,
        ignored_fields: Vec<UserField>,
    ) -> Result<UpdateOutcome, AppError> {
        let user_id = existing.user_id.clone();
        let manager_id = match validate_manager_ref(self.managers.as_ref(), raw_manager_id).await {
            Ok(id) => id,
            Err(AppError::Validation(e)) => {
                warn!(field = %e.field, "update rejected");
                return Ok(UpdateOutcome::rejected(&user_id, e));
            }
            Err(e) => return Err(e),
        };

        if !ignored_fields.is_empty() {
            warn!(?ignored_fields, "manager change ignores other fields in the same request");
        }

        let current = existing
            .manager_id
            .as_deref()
            .map(|id| canonical_manager_id(id).unwrap_or_else(|| id.to_string()));

        match current {
            None => {
                let mut assigned = existing;
                assigned.manager_id = Some(manager_id);
                assigned.updated_at = Some(Utc::now());
                if !self.write_in_place(&assigned).await? {
                    return Ok(UpdateOutcome::NotFound { user_id });
                }
                info!("Assigned first manager to user {}", user_id);
                Ok(UpdateOutcome::UpdatedInPlace { user_id, ignored_fields })
            }
            Some(current) if current == manager_id => {
                info!("User {} already reports to manager {}", user_id, manager_id);
                Ok(UpdateOutcome::NoOp { user_id, ignored_fields })
            }
            Some(_) => {
                let successor = existing.successor(manager_id);
                match self.users.fork(&user_id, &successor).await {
                    Ok(created) => {
                        info!("Forked user {} into {}", user_id, created.user_id);
                        Ok(UpdateOutcome::Forked { user_id, new_user_id: created.user_id, ignored_fields })
                    }
                    Err(AppError::NotFound(_)) => {
                        warn!("User {} was deactivated before it could be forked", user_id);
                        Ok(UpdateOutcome::NotFound { user_id })
                    }
                    Err(e) => Err(e),
                }
            }
        }
    }

    /// `Ok(false)` when the record stopped being active after it was read.
    async fn write_in_place(&self, user: &User) -> Result<bool, AppError> {
        match self.users.update(user).await {
            Ok(_) => Ok(true),
            Err(AppError::NotFound(_)) => {
                warn!("User {} was deactivated before it could be updated", user.user_id);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}

/// Validates the present personal fields in name, phone, PAN order and returns
/// the record with them applied. Absent fields keep the existing values.
fn apply_personal_fields(existing: &User, patch: &UserPatch) -> Result<User, ValidationError> {
    let mut edited = existing.clone();
    if let Patch::Present(name) = &patch.full_name {
        edited.full_name = validate_full_name(name)?;
    }
    if let Patch::Present(mob) = &patch.mob_num {
        edited.mob_num = validate_and_format_phone(mob)?;
    }
    if let Patch::Present(pan) = &patch.pan_num {
        edited.pan_num = validate_and_format_tax_id(pan)?;
    }
    Ok(edited)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::user::NewUserParams;

    fn existing() -> User {
        User::new(NewUserParams {
            full_name: "Asha Rao".to_string(),
            mob_num: "9876543210".to_string(),
            pan_num: "ABCDE1234F".to_string(),
            manager_id: None,
        })
    }

    #[test]
    fn test_present_fields_in_validation_order() {
        let mut patch = UserPatch::default();
        assert!(patch.is_empty());

        patch.set(UserField::ManagerId, "m".into());
        patch.set(UserField::PanNum, "p".into());
        patch.set(UserField::FullName, "n".into());
        assert_eq!(
            patch.present_fields(),
            vec![UserField::FullName, UserField::PanNum, UserField::ManagerId]
        );
        assert_eq!(patch.personal_fields(), vec![UserField::FullName, UserField::PanNum]);
    }

    #[test]
    fn test_apply_personal_fields_keeps_absent_values() {
        let user = existing();
        let mut patch = UserPatch::default();
        patch.set(UserField::MobNum, "+91 91234-56789".into());

        let edited = apply_personal_fields(&user, &patch).unwrap();
        assert_eq!(edited.mob_num, "9123456789");
        assert_eq!(edited.full_name, user.full_name);
        assert_eq!(edited.pan_num, user.pan_num);
        assert_eq!(edited.user_id, user.user_id);
    }

    #[test]
    fn test_apply_personal_fields_reports_first_failure() {
        let mut patch = UserPatch::default();
        patch.set(UserField::FullName, " ".into());
        patch.set(UserField::PanNum, "bad".into());

        let err = apply_personal_fields(&existing(), &patch).unwrap_err();
        assert_eq!(err.field, UserField::FullName);
    }

    #[test]
    fn test_outcome_serialization() {
        let forked = UpdateOutcome::Forked {
            user_id: "a".into(),
            new_user_id: "b".into(),
            ignored_fields: vec![UserField::FullName],
        };
        let json = serde_json::to_value(&forked).unwrap();
        assert_eq!(json["status"], "forked");
        assert_eq!(json["new_user_id"], "b");
        assert_eq!(json["ignored_fields"][0], "full_name");

        let noop = serde_json::to_value(UpdateOutcome::NoOp { user_id: "a".into(), ignored_fields: vec![] }).unwrap();
        assert_eq!(noop["status"], "no_op");
        assert!(noop.get("ignored_fields").is_none());

        let report = UpdateReport {
            outcomes: vec![forked, UpdateOutcome::NotFound { user_id: "c".into() }],
        };
        assert!(!report.all_succeeded());
        assert_eq!(report.outcomes[1].user_id(), "c");
    }
}
