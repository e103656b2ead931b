pub mod announcement_usecase;
pub mod conference_usecase;
pub mod profile_usecase;
pub mod query_usecase;
pub mod registration_usecase;
pub mod retry;
