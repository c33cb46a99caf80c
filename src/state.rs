use std::sync::Arc;
use crate::domain::ports::{ManagerRepository, UserRepository};
use crate::domain::services::{reassignment::ReassignmentEngine, user_service::UserService};

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub reassignment_engine: Arc<ReassignmentEngine>,
}

impl AppState {
    pub fn new(user_repo: Arc<dyn UserRepository>, manager_repo: Arc<dyn ManagerRepository>) -> Self {
        let user_service = Arc::new(UserService::new(user_repo.clone(), manager_repo.clone()));
        let reassignment_engine = Arc::new(ReassignmentEngine::new(user_repo, manager_repo));

        Self {
            user_service,
            reassignment_engine,
        }
    }
}
