pub mod announcement_service;
pub mod identity_service;
pub mod notification_service;
