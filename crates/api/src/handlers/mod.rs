//! API handlers module

pub mod auth;
pub mod dashboard;
pub mod health;
pub mod newspapers;
pub mod redactors;
pub mod topics;
