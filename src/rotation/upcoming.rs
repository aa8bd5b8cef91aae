//! Upcoming cooks over the next few days.

use std::collections::HashMap;

use chrono::{Days, NaiveDate};
use serde::Serialize;
use tracing::debug;

use crate::models::date::Date;
use crate::models::meal::Meal;
use crate::persistence::{MealStore, MemberStore};
use crate::{AppError, Result};

/// Longest schedule a single request may ask for.
pub const MAX_UPCOMING_DAYS: u32 = 366;

/// One day of the upcoming schedule.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UpcomingMeal {
    /// The day.
    pub date: Date,
    /// Meal scheduled on that day, if any.
    pub meal: Option<Meal>,
    /// Full name of the cook when they are a known member.
    pub cook_name: Option<String>,
}

/// List the schedule for `days` consecutive days starting at `today`.
///
/// # Errors
///
/// Returns `AppError::InvalidInput` if `days` is zero, exceeds
/// [`MAX_UPCOMING_DAYS`] or overflows the calendar, and `AppError::Db` on
/// store failure.
pub async fn upcoming_cooks(
    meals: &dyn MealStore,
    members: &dyn MemberStore,
    today: NaiveDate,
    days: u32,
) -> Result<Vec<UpcomingMeal>> {
    if days == 0 {
        return Err(AppError::InvalidInput("days must be at least 1".into()));
    }
    if days > MAX_UPCOMING_DAYS {
        return Err(AppError::InvalidInput(format!(
            "days must be at most {MAX_UPCOMING_DAYS}, got {days}"
        )));
    }
    let last = today
        .checked_add_days(Days::new(u64::from(days - 1)))
        .ok_or_else(|| AppError::InvalidInput(format!("{days} days from {today} is out of range")))?;

    let scheduled: HashMap<Date, Meal> = meals
        .list_between(Date::from(today), Date::from(last))
        .await?
        .into_iter()
        .map(|meal| (meal.date, meal))
        .collect();
    let names: HashMap<String, String> = members
        .list()
        .await?
        .into_iter()
        .map(|member| (member.slack_uid, member.full_name))
        .collect();
    debug!(%today, days, scheduled = scheduled.len(), "building upcoming cooks");

    let schedule = today
        .iter_days()
        .take(days as usize)
        .map(|day| {
            let date = Date::from(day);
            let meal = scheduled.get(&date).cloned();
            let cook_name = meal
                .as_ref()
                .and_then(|meal| names.get(&meal.cook_slack_uid).cloned());
            UpcomingMeal {
                date,
                meal,
                cook_name,
            }
        })
        .collect();
    Ok(schedule)
}
