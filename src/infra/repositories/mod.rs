pub mod sqlite_manager_repo;
pub mod sqlite_user_repo;

pub mod postgres_manager_repo;
pub mod postgres_user_repo;
