//! Persistence layer: store contracts and their `SQLite` implementations.
//!
//! The rotation engines only see [`MealStore`] and [`MemberStore`]; the
//! `SQLite`-backed [`meal_repo::MealRepo`] and [`member_repo::MemberRepo`]
//! are wired in by the server binary.

pub mod db;
pub mod meal_repo;
pub mod member_repo;
pub mod schema;

use std::future::Future;
use std::pin::Pin;

use crate::models::date::Date;
use crate::models::meal::{Meal, MealUpdate, NewMeal};
use crate::models::member::{Member, MemberUpdate, NewMember};
use crate::Result;

/// Re-export the database pool type for convenience.
pub use sqlx::SqlitePool;

/// Boxed future returned by store methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Storage contract for meals, keyed naturally by date.
pub trait MealStore: Send + Sync {
    /// Fetch a meal by identifier.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if no meal has this ID.
    fn find_by_id(&self, id: i64) -> StoreFuture<'_, Meal>;

    /// Fetch the meal scheduled on `date`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if nobody cooks on that date.
    fn find_by_date(&self, date: Date) -> StoreFuture<'_, Meal>;

    /// Fetch the meal whose announcement message has ID `message_id`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if no meal was announced with that message.
    fn find_by_slack_message_id<'a>(&'a self, message_id: &'a str) -> StoreFuture<'a, Meal>;

    /// Insert a meal with no description and no announcement.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the insert fails, including when a meal
    /// already exists for the date.
    fn create<'a>(&'a self, meal: &'a NewMeal) -> StoreFuture<'a, Meal>;

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the meal does not exist.
    fn update<'a>(&'a self, id: i64, update: &'a MealUpdate) -> StoreFuture<'a, ()>;

    /// Record the announcement message ID. Succeeds only once per meal.
    ///
    /// # Errors
    ///
    /// Returns `AppError::AlreadyPosted` if the meal already has a message
    /// ID, or `AppError::NotFound` if the meal does not exist.
    fn set_slack_message_id<'a>(&'a self, id: i64, message_id: &'a str) -> StoreFuture<'a, ()>;

    /// List meals dated within `from..=to`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    fn list_between(&self, from: Date, to: Date) -> StoreFuture<'_, Vec<Meal>>;

    /// Permanently delete a meal.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the meal does not exist.
    fn delete(&self, id: i64) -> StoreFuture<'_, ()>;
}

/// Storage contract for rotation members, keyed naturally by Slack ID.
pub trait MemberStore: Send + Sync {
    /// Fetch a member by identifier.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if no member has this ID.
    fn find_by_id(&self, id: i64) -> StoreFuture<'_, Member>;

    /// Fetch a member by Slack user ID.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the user has never been seen.
    fn find_by_slack_uid<'a>(&'a self, slack_uid: &'a str) -> StoreFuture<'a, Member>;

    /// List all members in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    fn list(&self) -> StoreFuture<'_, Vec<Member>>;

    /// Insert a member with zero counters.
    ///
    /// Idempotent on the Slack ID: if the member already exists the stored
    /// record is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the insert fails.
    fn create<'a>(&'a self, member: &'a NewMember) -> StoreFuture<'a, Member>;

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidInput` for negative counters, or
    /// `AppError::NotFound` if the member does not exist.
    fn update<'a>(&'a self, id: i64, update: &'a MemberUpdate) -> StoreFuture<'a, ()>;

    /// Atomically add `delta` to meals eaten, clamping at zero.
    ///
    /// Returns the new value.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the member does not exist.
    fn adjust_meals_eaten(&self, id: i64, delta: i64) -> StoreFuture<'_, i64>;

    /// Atomically add `delta` to meals cooked, clamping at zero.
    ///
    /// Returns the new value.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the member does not exist.
    fn adjust_meals_cooked(&self, id: i64, delta: i64) -> StoreFuture<'_, i64>;

    /// Permanently delete a member.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the member does not exist.
    fn delete(&self, id: i64) -> StoreFuture<'_, ()>;
}
