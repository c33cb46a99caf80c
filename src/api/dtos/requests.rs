use serde::Deserialize;
use serde_json::{Map, Value};
use crate::domain::models::user::UserField;
use crate::domain::services::{
    reassignment::{UpdateRequest, UserPatch},
    user_service::{CreateUserInput, DeleteKey, UserLookup},
};
use crate::error::AppError;

#[derive(Deserialize, Default)]
pub struct CreateUserRequest {
    pub full_name: Option<String>,
    pub mob_num: Option<String>,
    pub pan_num: Option<String>,
    pub manager_id: Option<String>,
}

impl From<CreateUserRequest> for CreateUserInput {
    fn from(req: CreateUserRequest) -> Self {
        Self {
            full_name: req.full_name,
            mob_num: req.mob_num,
            pan_num: req.pan_num,
            manager_id: req.manager_id,
        }
    }
}

#[derive(Deserialize, Default)]
pub struct GetUsersRequest {
    pub user_id: Option<String>,
    pub mob_num: Option<String>,
    pub manager_id: Option<String>,
}

impl TryFrom<GetUsersRequest> for UserLookup {
    type Error = AppError;

    fn try_from(req: GetUsersRequest) -> Result<Self, Self::Error> {
        match (req.user_id, req.mob_num, req.manager_id) {
            (None, None, None) => Ok(UserLookup::All),
            (Some(id), None, None) => Ok(UserLookup::ById(id)),
            (None, Some(mob), None) => Ok(UserLookup::ByMob(mob)),
            (None, None, Some(manager)) => Ok(UserLookup::ByManager(manager)),
            _ => Err(AppError::Usage("Provide at most one of user_id, mob_num or manager_id.".into())),
        }
    }
}

#[derive(Deserialize, Default)]
pub struct DeleteUserRequest {
    pub user_id: Option<String>,
    pub mob_num: Option<String>,
}

impl TryFrom<DeleteUserRequest> for DeleteKey {
    type Error = AppError;

    fn try_from(req: DeleteUserRequest) -> Result<Self, Self::Error> {
        match (req.user_id, req.mob_num) {
            (Some(id), None) => Ok(DeleteKey::ById(id)),
            (None, Some(mob)) => Ok(DeleteKey::ByMob(mob)),
            (None, None) => Err(AppError::Usage("Missing key: Provide either user_id or mob_num.".into())),
            (Some(_), Some(_)) => Err(AppError::Usage("Provide either user_id or mob_num, not both.".into())),
        }
    }
}

#[derive(Deserialize, Default)]
pub struct UpdateUserRequest {
    pub user_ids: Option<Vec<String>>,
    pub update_data: Option<Map<String, Value>>,
}

impl TryFrom<UpdateUserRequest> for UpdateRequest {
    type Error = AppError;

    fn try_from(req: UpdateUserRequest) -> Result<Self, Self::Error> {
        let (Some(user_ids), Some(update_data)) = (req.user_ids, req.update_data) else {
            return Err(AppError::Usage("Missing keys: user_ids and update_data are required.".into()));
        };

        let mut patch = UserPatch::default();
        for (key, value) in update_data {
            let field = UserField::from_key(&key)
                .ok_or_else(|| AppError::Usage(format!("Unknown update field: {}", key)))?;
            let Value::String(value) = value else {
                return Err(AppError::Usage(format!("update_data.{} must be a string.", key)));
            };
            patch.set(field, value);
        }

        Ok(UpdateRequest { user_ids, patch })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::services::reassignment::Patch;
    use serde_json::json;

    fn update_request(body: Value) -> Result<UpdateRequest, AppError> {
        let req: UpdateUserRequest = serde_json::from_value(body).unwrap();
        UpdateRequest::try_from(req)
    }

    #[test]
    fn test_lookup_keys_are_exclusive() {
        let req: GetUsersRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(UserLookup::try_from(req).unwrap(), UserLookup::All);

        let req: GetUsersRequest = serde_json::from_value(json!({"mob_num": "9876543210"})).unwrap();
        assert_eq!(UserLookup::try_from(req).unwrap(), UserLookup::ByMob("9876543210".into()));

        let req: GetUsersRequest = serde_json::from_value(json!({"user_id": "a", "manager_id": "b"})).unwrap();
        assert!(matches!(UserLookup::try_from(req), Err(AppError::Usage(_))));
    }

    #[test]
    fn test_delete_requires_exactly_one_key() {
        let req: DeleteUserRequest = serde_json::from_value(json!({"user_id": "a"})).unwrap();
        assert_eq!(DeleteKey::try_from(req).unwrap(), DeleteKey::ById("a".into()));

        for body in [json!({}), json!({"user_id": "a", "mob_num": "9876543210"})] {
            let req: DeleteUserRequest = serde_json::from_value(body).unwrap();
            assert!(matches!(DeleteKey::try_from(req), Err(AppError::Usage(_))));
        }
    }

    #[test]
    fn test_update_patch_tracks_presence() {
        let req = update_request(json!({
            "user_ids": ["a"],
            "update_data": {"full_name": "", "manager_id": "m"}
        }))
        .unwrap();

        assert_eq!(req.patch.full_name, Patch::Present(String::new()));
        assert_eq!(req.patch.mob_num, Patch::Absent);
        assert_eq!(req.patch.manager_id, Patch::Present("m".into()));
    }

    #[test]
    fn test_update_shape_errors() {
        let bad = [
            json!({"user_ids": ["a"]}),
            json!({"update_data": {"full_name": "x"}}),
            json!({"user_ids": ["a"], "update_data": {"email": "x"}}),
            json!({"user_ids": ["a"], "update_data": {"manager_id": null}}),
            json!({"user_ids": ["a"], "update_data": {"mob_num": 9876543210u64}}),
        ];
        for body in bad {
            assert!(matches!(update_request(body.clone()), Err(AppError::Usage(_))), "body {}", body);
        }
    }
}
