//! Domain model module declarations.

pub mod date;
pub mod event;
pub mod meal;
pub mod member;
