pub mod reassignment;
pub mod user_service;
pub mod validation;
