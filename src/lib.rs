#![forbid(unsafe_code)]

//! Dinner rotation service: cook assignment, Slack reaction tracking and
//! eaten/cooked ratio reporting.

pub mod calendar;
pub mod chat;
pub mod config;
pub mod errors;
pub mod http;
pub mod models;
pub mod persistence;
pub mod rotation;
pub mod slack;

pub use config::GlobalConfig;
pub use errors::{AppError, Result};
