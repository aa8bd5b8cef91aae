//! Meal model: one scheduled cooking occasion per calendar date.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::date::Date;

/// A meal in the dinner rotation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Meal {
    /// Store-assigned identifier.
    pub id: i64,
    /// Slack user ID of the assigned cook.
    pub cook_slack_uid: String,
    /// Day the meal takes place.
    pub date: Date,
    /// Free-text description of the dish.
    pub description: Option<String>,
    /// Timestamp of the "eating tomorrow" announcement message.
    pub slack_message_id: Option<String>,
}

impl Meal {
    /// Whether reactions on this meal's announcement stop counting.
    ///
    /// See [`crate::calendar::is_expired`].
    #[must_use]
    pub fn is_expired(&self, now: NaiveDateTime) -> bool {
        crate::calendar::is_expired(self.date, now)
    }

    /// Whether the announcement for this meal has been posted.
    #[must_use]
    pub fn is_announced(&self) -> bool {
        self.slack_message_id
            .as_deref()
            .is_some_and(|ts| !ts.is_empty())
    }
}

/// Fields required to insert a meal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMeal {
    /// Slack user ID of the assigned cook.
    pub cook_slack_uid: String,
    /// Day the meal takes place.
    pub date: Date,
}

/// Partial update applied by `MealStore::update`.
///
/// The announcement message ID is deliberately absent; it is written once
/// through `MealStore::set_slack_message_id`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MealUpdate {
    /// New cook.
    pub cook_slack_uid: Option<String>,
    /// New description.
    pub description: Option<String>,
}

impl MealUpdate {
    /// Update that only reassigns the cook.
    #[must_use]
    pub fn cook(cook_slack_uid: impl Into<String>) -> Self {
        Self {
            cook_slack_uid: Some(cook_slack_uid.into()),
            description: None,
        }
    }

    /// Whether the update carries no field.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cook_slack_uid.is_none() && self.description.is_none()
    }
}
