//! Channel announcements: the daily "eating tomorrow" poll and the weekly
//! ratio update.

use chrono::NaiveDate;
use tracing::{info, info_span, warn, Instrument};

use crate::calendar;
use crate::chat::ChatPlatform;
use crate::models::meal::Meal;
use crate::persistence::{MealStore, MemberStore};
use crate::rotation::report::{build_weekly_report, notification_entries};
use crate::slack::blocks;
use crate::{AppError, Result};

/// Post the announcement for tomorrow's meal and record its message ID.
///
/// # Errors
///
/// - `AppError::NotFound` if no meal is scheduled tomorrow.
/// - `AppError::AlreadyPosted` if the meal was already announced.
/// - `AppError::Slack` if posting fails.
/// - `AppError::Db` on store failure.
pub async fn post_eating_tomorrow(
    meals: &dyn MealStore,
    chat: &dyn ChatPlatform,
    channel: &str,
    today: NaiveDate,
) -> Result<Meal> {
    let date = calendar::tomorrow(today);
    let span = info_span!("eating_tomorrow", %date, channel);
    async move {
        let meal = meals.find_by_date(date).await?;
        if meal.is_announced() {
            return Err(AppError::AlreadyPosted(format!(
                "meal {} on {date} was already announced",
                meal.id
            )));
        }

        let ts = chat
            .post_message(channel, blocks::eating_tomorrow_message())
            .await?;
        if let Err(err) = meals.set_slack_message_id(meal.id, &ts).await {
            warn!(meal_id = meal.id, %ts, %err, "announcement posted but message id not recorded");
            return Err(err);
        }

        info!(meal_id = meal.id, %ts, "eating tomorrow announced");
        meals.find_by_id(meal.id).await
    }
    .instrument(span)
    .await
}

/// Post the weekly ratio report and return how many members it lists.
///
/// # Errors
///
/// Returns `AppError::Db` if members cannot be listed or `AppError::Slack`
/// if posting fails.
pub async fn post_weekly_update(
    members: &dyn MemberStore,
    chat: &dyn ChatPlatform,
    channel: &str,
    limit: usize,
) -> Result<usize> {
    let span = info_span!("weekly_update", channel, limit);
    async move {
        let entries = build_weekly_report(members).await?;
        let shown = notification_entries(&entries, limit).len();
        chat.post_message(channel, blocks::weekly_update_message(&entries, limit))
            .await?;
        info!(shown, total = entries.len(), "weekly update posted");
        Ok(shown)
    }
    .instrument(span)
    .await
}
