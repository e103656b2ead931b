pub mod conference_repository;
pub mod profile_repository;
pub mod registration_repository;
