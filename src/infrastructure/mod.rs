pub mod conference_repository;
pub mod entity;
pub mod in_memory_announcement_cache;
pub mod in_memory_directory;
pub mod jwt_identity_resolver;
pub mod profile_repository;
pub mod queued_email_notifier;
pub mod registration_repository;
pub mod schema;
