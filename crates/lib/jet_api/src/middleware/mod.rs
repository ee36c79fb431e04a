//! Request pipeline middleware.

pub mod auth;
pub mod recover;
pub mod request_log;
