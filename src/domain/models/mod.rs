pub mod conference;
pub mod identity;
pub mod profile;
pub mod query;
pub mod versioned;
