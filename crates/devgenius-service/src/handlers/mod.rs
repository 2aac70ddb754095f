//! API handlers.

pub mod ai;
pub mod auth;
pub mod credits;
pub mod health;
pub mod payments;
pub mod plans;
pub mod ratings;
pub mod users;
