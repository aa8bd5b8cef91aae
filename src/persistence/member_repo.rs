//! Member repository for `SQLite` persistence.
//!
//! Counter changes are single `UPDATE ... RETURNING` statements so that
//! concurrent reactions from the same member cannot lose updates.

use std::sync::Arc;

use crate::models::member::{Member, MemberUpdate, NewMember};
use crate::{AppError, Result};

use super::db::Database;
use super::{MemberStore, StoreFuture};

const SELECT_COLUMNS: &str =
    "SELECT id, slack_uid, full_name, meals_eaten, meals_cooked, leader FROM member";

/// Repository for member records.
#[derive(Clone)]
pub struct MemberRepo {
    db: Arc<Database>,
}

/// Internal row struct for `SQLite` deserialization.
#[derive(sqlx::FromRow)]
struct MemberRow {
    id: i64,
    slack_uid: String,
    full_name: String,
    meals_eaten: i64,
    meals_cooked: i64,
    leader: i64,
}

impl From<MemberRow> for Member {
    fn from(row: MemberRow) -> Self {
        Self {
            id: row.id,
            slack_uid: row.slack_uid,
            full_name: row.full_name,
            meals_eaten: row.meals_eaten,
            meals_cooked: row.meals_cooked,
            leader: row.leader != 0,
        }
    }
}

#[derive(Clone, Copy)]
enum Counter {
    Eaten,
    Cooked,
}

impl Counter {
    fn column(self) -> &'static str {
        match self {
            Self::Eaten => "meals_eaten",
            Self::Cooked => "meals_cooked",
        }
    }
}

fn ensure_non_negative(field: &str, value: Option<i64>) -> Result<()> {
    match value {
        Some(v) if v < 0 => Err(AppError::InvalidInput(format!(
            "{field} must not be negative, got {v}"
        ))),
        _ => Ok(()),
    }
}

impl MemberRepo {
    /// Create a new repository instance.
    #[must_use]
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    async fn fetch_by_id(&self, id: i64) -> Result<Member> {
        let row: Option<MemberRow> = sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(self.db.as_ref())
            .await?;
        row.map(Member::from)
            .ok_or_else(|| AppError::NotFound(format!("member {id}")))
    }

    async fn fetch_by_slack_uid(&self, slack_uid: &str) -> Result<Member> {
        let row: Option<MemberRow> =
            sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE slack_uid = ?1"))
                .bind(slack_uid)
                .fetch_optional(self.db.as_ref())
                .await?;
        row.map(Member::from)
            .ok_or_else(|| AppError::NotFound(format!("member {slack_uid}")))
    }

    async fn fetch_all(&self) -> Result<Vec<Member>> {
        let rows: Vec<MemberRow> = sqlx::query_as(&format!("{SELECT_COLUMNS} ORDER BY id ASC"))
            .fetch_all(self.db.as_ref())
            .await?;
        Ok(rows.into_iter().map(Member::from).collect())
    }

    async fn insert(&self, member: &NewMember) -> Result<Member> {
        if member.slack_uid.trim().is_empty() {
            return Err(AppError::InvalidInput("slack uid must not be empty".into()));
        }

        sqlx::query(
            "INSERT INTO member (slack_uid, full_name, leader)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(slack_uid) DO NOTHING",
        )
        .bind(&member.slack_uid)
        .bind(&member.full_name)
        .bind(i64::from(member.leader))
        .execute(self.db.as_ref())
        .await?;

        self.fetch_by_slack_uid(&member.slack_uid).await
    }

    async fn apply_update(&self, id: i64, update: &MemberUpdate) -> Result<()> {
        ensure_non_negative("meals_eaten", update.meals_eaten)?;
        ensure_non_negative("meals_cooked", update.meals_cooked)?;

        let mut tx = self.db.begin().await?;

        let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM member WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(AppError::NotFound(format!("member {id}")));
        }

        if let Some(ref full_name) = update.full_name {
            sqlx::query("UPDATE member SET full_name = ?2 WHERE id = ?1")
                .bind(id)
                .bind(full_name)
                .execute(&mut *tx)
                .await?;
        }
        if let Some(leader) = update.leader {
            sqlx::query("UPDATE member SET leader = ?2 WHERE id = ?1")
                .bind(id)
                .bind(i64::from(leader))
                .execute(&mut *tx)
                .await?;
        }
        if let Some(meals_cooked) = update.meals_cooked {
            sqlx::query("UPDATE member SET meals_cooked = ?2 WHERE id = ?1")
                .bind(id)
                .bind(meals_cooked)
                .execute(&mut *tx)
                .await?;
        }
        if let Some(meals_eaten) = update.meals_eaten {
            sqlx::query("UPDATE member SET meals_eaten = ?2 WHERE id = ?1")
                .bind(id)
                .bind(meals_eaten)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn adjust(&self, id: i64, counter: Counter, delta: i64) -> Result<i64> {
        let column = counter.column();
        // `column` is one of two compile-time literals, never caller input.
        let query = format!(
            "UPDATE member SET {column} = MAX({column} + ?2, 0)
             WHERE id = ?1
             RETURNING {column}"
        );
        let value: Option<(i64,)> = sqlx::query_as(&query)
            .bind(id)
            .bind(delta)
            .fetch_optional(self.db.as_ref())
            .await?;
        value
            .map(|(v,)| v)
            .ok_or_else(|| AppError::NotFound(format!("member {id}")))
    }

    async fn remove(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM member WHERE id = ?1")
            .bind(id)
            .execute(self.db.as_ref())
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("member {id}")));
        }
        Ok(())
    }
}

impl MemberStore for MemberRepo {
    fn find_by_id(&self, id: i64) -> StoreFuture<'_, Member> {
        Box::pin(self.fetch_by_id(id))
    }

    fn find_by_slack_uid<'a>(&'a self, slack_uid: &'a str) -> StoreFuture<'a, Member> {
        Box::pin(self.fetch_by_slack_uid(slack_uid))
    }

    fn list(&self) -> StoreFuture<'_, Vec<Member>> {
        Box::pin(self.fetch_all())
    }

    fn create<'a>(&'a self, member: &'a NewMember) -> StoreFuture<'a, Member> {
        Box::pin(self.insert(member))
    }

    fn update<'a>(&'a self, id: i64, update: &'a MemberUpdate) -> StoreFuture<'a, ()> {
        Box::pin(self.apply_update(id, update))
    }

    fn adjust_meals_eaten(&self, id: i64, delta: i64) -> StoreFuture<'_, i64> {
        Box::pin(self.adjust(id, Counter::Eaten, delta))
    }

    fn adjust_meals_cooked(&self, id: i64, delta: i64) -> StoreFuture<'_, i64> {
        Box::pin(self.adjust(id, Counter::Cooked, delta))
    }

    fn delete(&self, id: i64) -> StoreFuture<'_, ()> {
        Box::pin(self.remove(id))
    }
}
