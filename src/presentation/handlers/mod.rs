pub mod announcement_handler;
pub mod conference_handler;
pub mod profile_handler;
pub mod registration_handler;
