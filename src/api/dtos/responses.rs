use serde::Serialize;
use crate::domain::models::user::User;
use crate::domain::services::reassignment::UpdateOutcome;

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize)]
pub struct UserCreatedResponse {
    pub message: String,
    pub user_id: String,
}

#[derive(Serialize)]
pub struct UsersResponse {
    pub users: Vec<User>,
}

#[derive(Serialize)]
pub struct UpdateUsersResponse {
    pub message: String,
    pub results: Vec<UpdateOutcome>,
}
