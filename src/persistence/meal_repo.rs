//! Meal repository for `SQLite` persistence.

use std::sync::Arc;

use crate::models::date::Date;
use crate::models::meal::{Meal, MealUpdate, NewMeal};
use crate::{AppError, Result};

use super::db::Database;
use super::{MealStore, StoreFuture};

const SELECT_COLUMNS: &str =
    "SELECT id, cook_slack_uid, year, month, day, description, slack_message_id FROM meal";

/// Repository for meal records.
#[derive(Clone)]
pub struct MealRepo {
    db: Arc<Database>,
}

/// Internal row struct for `SQLite` deserialization.
#[derive(sqlx::FromRow)]
struct MealRow {
    id: i64,
    cook_slack_uid: String,
    year: i64,
    month: i64,
    day: i64,
    description: Option<String>,
    slack_message_id: Option<String>,
}

impl MealRow {
    fn into_meal(self) -> Result<Meal> {
        let year = i32::try_from(self.year)
            .map_err(|e| AppError::Db(format!("invalid year {}: {e}", self.year)))?;
        let month = u32::try_from(self.month)
            .map_err(|e| AppError::Db(format!("invalid month {}: {e}", self.month)))?;
        let day = u32::try_from(self.day)
            .map_err(|e| AppError::Db(format!("invalid day {}: {e}", self.day)))?;
        let date = Date::new(year, month, day)
            .map_err(|e| AppError::Db(format!("invalid stored date for meal {}: {e}", self.id)))?;

        Ok(Meal {
            id: self.id,
            cook_slack_uid: self.cook_slack_uid,
            date,
            description: self.description.filter(|d| !d.is_empty()),
            slack_message_id: self.slack_message_id.filter(|ts| !ts.is_empty()),
        })
    }
}

/// Sortable integer key `yyyymmdd` used for range queries.
fn date_key(date: Date) -> i64 {
    i64::from(date.year) * 10_000 + i64::from(date.month) * 100 + i64::from(date.day)
}

impl MealRepo {
    /// Create a new repository instance.
    #[must_use]
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    async fn fetch_by_id(&self, id: i64) -> Result<Meal> {
        let row: Option<MealRow> = sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(self.db.as_ref())
            .await?;
        row.ok_or_else(|| AppError::NotFound(format!("meal {id}")))?
            .into_meal()
    }

    async fn fetch_by_date(&self, date: Date) -> Result<Meal> {
        let row: Option<MealRow> = sqlx::query_as(&format!(
            "{SELECT_COLUMNS} WHERE year = ?1 AND month = ?2 AND day = ?3"
        ))
        .bind(date.year)
        .bind(date.month)
        .bind(date.day)
        .fetch_optional(self.db.as_ref())
        .await?;
        row.ok_or_else(|| AppError::NotFound(format!("meal on {date}")))?
            .into_meal()
    }

    async fn fetch_by_slack_message_id(&self, message_id: &str) -> Result<Meal> {
        let row: Option<MealRow> =
            sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE slack_message_id = ?1"))
                .bind(message_id)
                .fetch_optional(self.db.as_ref())
                .await?;
        row.ok_or_else(|| AppError::NotFound(format!("meal for message {message_id}")))?
            .into_meal()
    }

    async fn insert(&self, meal: &NewMeal) -> Result<Meal> {
        let row: MealRow = sqlx::query_as(
            "INSERT INTO meal (cook_slack_uid, year, month, day)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, cook_slack_uid, year, month, day, description, slack_message_id",
        )
        .bind(&meal.cook_slack_uid)
        .bind(meal.date.year)
        .bind(meal.date.month)
        .bind(meal.date.day)
        .fetch_one(self.db.as_ref())
        .await?;
        row.into_meal()
    }

    async fn apply_update(&self, id: i64, update: &MealUpdate) -> Result<()> {
        let mut tx = self.db.begin().await?;

        let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM meal WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(AppError::NotFound(format!("meal {id}")));
        }
        if update.is_empty() {
            return Ok(());
        }

        if let Some(ref cook) = update.cook_slack_uid {
            sqlx::query("UPDATE meal SET cook_slack_uid = ?2 WHERE id = ?1")
                .bind(id)
                .bind(cook)
                .execute(&mut *tx)
                .await?;
        }

        if let Some(ref description) = update.description {
            sqlx::query("UPDATE meal SET description = ?2 WHERE id = ?1")
                .bind(id)
                .bind(description)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn write_slack_message_id(&self, id: i64, message_id: &str) -> Result<()> {
        if message_id.trim().is_empty() {
            return Err(AppError::InvalidInput("slack message id must not be empty".into()));
        }

        let result = sqlx::query(
            "UPDATE meal SET slack_message_id = ?2
             WHERE id = ?1 AND slack_message_id IS NULL",
        )
        .bind(id)
        .bind(message_id)
        .execute(self.db.as_ref())
        .await?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        // Nothing changed: either the meal is missing or it was announced already.
        let meal = self.fetch_by_id(id).await?;
        Err(AppError::AlreadyPosted(format!(
            "meal on {} already announced as {}",
            meal.date,
            meal.slack_message_id.unwrap_or_default()
        )))
    }

    async fn fetch_between(&self, from: Date, to: Date) -> Result<Vec<Meal>> {
        let rows: Vec<MealRow> = sqlx::query_as(&format!(
            "{SELECT_COLUMNS}
             WHERE (year * 10000 + month * 100 + day) BETWEEN ?1 AND ?2
             ORDER BY year ASC, month ASC, day ASC"
        ))
        .bind(date_key(from))
        .bind(date_key(to))
        .fetch_all(self.db.as_ref())
        .await?;

        rows.into_iter().map(MealRow::into_meal).collect()
    }

    async fn remove(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM meal WHERE id = ?1")
            .bind(id)
            .execute(self.db.as_ref())
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("meal {id}")));
        }
        Ok(())
    }
}

impl MealStore for MealRepo {
    fn find_by_id(&self, id: i64) -> StoreFuture<'_, Meal> {
        Box::pin(self.fetch_by_id(id))
    }

    fn find_by_date(&self, date: Date) -> StoreFuture<'_, Meal> {
        Box::pin(self.fetch_by_date(date))
    }

    fn find_by_slack_message_id<'a>(&'a self, message_id: &'a str) -> StoreFuture<'a, Meal> {
        Box::pin(self.fetch_by_slack_message_id(message_id))
    }

    fn create<'a>(&'a self, meal: &'a NewMeal) -> StoreFuture<'a, Meal> {
        Box::pin(self.insert(meal))
    }

    fn update<'a>(&'a self, id: i64, update: &'a MealUpdate) -> StoreFuture<'a, ()> {
        Box::pin(self.apply_update(id, update))
    }

    fn set_slack_message_id<'a>(&'a self, id: i64, message_id: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(self.write_slack_message_id(id, message_id))
    }

    fn list_between(&self, from: Date, to: Date) -> StoreFuture<'_, Vec<Meal>> {
        Box::pin(self.fetch_between(from, to))
    }

    fn delete(&self, id: i64) -> StoreFuture<'_, ()> {
        Box::pin(self.remove(id))
    }
}
