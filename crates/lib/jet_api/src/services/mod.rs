//! Business logic between handlers and repositories.

pub mod auth;
pub mod users;
