//! Reaction reconciliation: turn `+1` reactions on an announcement into
//! meals-eaten counter changes.
//!
//! Each event walks the same steps: filter the emoji, resolve the meal
//! from the message, check expiry, resolve (or register) the member, then
//! adjust the counter atomically. Irrelevant events are reported as
//! [`ReactionOutcome::Ignored`]; only real failures become errors.

use std::fmt::{Display, Formatter};

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, info, info_span, Instrument};

use crate::chat::ChatPlatform;
use crate::models::event::ReactionEvent;
use crate::models::member::{Member, NewMember};
use crate::persistence::{MealStore, MemberStore};
use crate::AppError;

/// Whether the reaction was added or removed.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReactionChange {
    /// Reaction added: count one more meal eaten.
    Added,
    /// Reaction removed: count one fewer, never below zero.
    Removed,
}

impl ReactionChange {
    fn delta(self) -> i64 {
        match self {
            Self::Added => 1,
            Self::Removed => -1,
        }
    }
}

/// Why an event was ignored.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    /// The emoji was not `+1`.
    NotThumbsUp,
    /// The message is not a meal announcement.
    UnknownMessage,
    /// The meal's date has passed.
    Expired,
}

/// Successful result of reconciling one event.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ReactionOutcome {
    /// The member's counter changed.
    Applied {
        /// Reacting member.
        slack_uid: String,
        /// Meal the reaction counted towards.
        meal_id: i64,
        /// Counter value after the change.
        meals_eaten: i64,
    },
    /// Nothing to do.
    Ignored {
        /// Why the event was skipped.
        reason: IgnoreReason,
    },
}

impl ReactionOutcome {
    fn ignored(reason: IgnoreReason) -> Self {
        Self::Ignored { reason }
    }
}

/// Step of the reconciliation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionStep {
    /// Looking up the meal by message ID.
    ResolveMeal,
    /// Looking up the member by platform ID.
    FindMember,
    /// Fetching the profile of an unknown member.
    FetchProfile,
    /// Registering the unknown member.
    CreateMember,
    /// Persisting the counter change.
    AdjustCounter,
}

impl Display for ReactionStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::ResolveMeal => "resolve meal",
            Self::FindMember => "find member",
            Self::FetchProfile => "fetch profile",
            Self::CreateMember => "create member",
            Self::AdjustCounter => "adjust counter",
        };
        f.write_str(name)
    }
}

/// A reconciliation failure and the step it happened in.
#[derive(Debug)]
pub struct ReactionError {
    /// Failing step.
    pub step: ReactionStep,
    /// Underlying error.
    pub source: AppError,
}

impl Display for ReactionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.step, self.source)
    }
}

impl std::error::Error for ReactionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

trait StepContext<T> {
    fn at(self, step: ReactionStep) -> std::result::Result<T, ReactionError>;
}

impl<T> StepContext<T> for crate::Result<T> {
    fn at(self, step: ReactionStep) -> std::result::Result<T, ReactionError> {
        self.map_err(|source| ReactionError { step, source })
    }
}

/// Result type of the reconciler.
pub type ReactionResult = std::result::Result<ReactionOutcome, ReactionError>;

/// Stateless reconciler over the meal and member stores.
pub struct ReactionReconciler<'a> {
    meals: &'a dyn MealStore,
    members: &'a dyn MemberStore,
    chat: Option<&'a dyn ChatPlatform>,
}

impl<'a> ReactionReconciler<'a> {
    /// Build a reconciler.
    ///
    /// Without a chat platform, unknown members are registered under their
    /// platform ID instead of their real name.
    #[must_use]
    pub fn new(
        meals: &'a dyn MealStore,
        members: &'a dyn MemberStore,
        chat: Option<&'a dyn ChatPlatform>,
    ) -> Self {
        Self {
            meals,
            members,
            chat,
        }
    }

    /// Handle a `reaction_added` event.
    ///
    /// # Errors
    ///
    /// Returns a [`ReactionError`] naming the failing step on store or
    /// platform failure.
    pub async fn on_reaction_added(&self, event: &ReactionEvent, now: NaiveDateTime) -> ReactionResult {
        self.reconcile(event, ReactionChange::Added, now).await
    }

    /// Handle a `reaction_removed` event.
    ///
    /// # Errors
    ///
    /// Returns a [`ReactionError`] naming the failing step on store or
    /// platform failure.
    pub async fn on_reaction_removed(
        &self,
        event: &ReactionEvent,
        now: NaiveDateTime,
    ) -> ReactionResult {
        self.reconcile(event, ReactionChange::Removed, now).await
    }

    /// Apply one reaction change.
    ///
    /// # Errors
    ///
    /// Returns a [`ReactionError`] naming the failing step on store or
    /// platform failure.
    pub async fn reconcile(
        &self,
        event: &ReactionEvent,
        change: ReactionChange,
        now: NaiveDateTime,
    ) -> ReactionResult {
        let span = info_span!(
            "reaction",
            ?change,
            user = %event.user,
            message_id = %event.message_id
        );
        self.apply(event, change, now).instrument(span).await
    }

    async fn apply(
        &self,
        event: &ReactionEvent,
        change: ReactionChange,
        now: NaiveDateTime,
    ) -> ReactionResult {
        if !event.is_thumbs_up() {
            debug!(reaction = %event.reaction, "ignoring non thumbs-up reaction");
            return Ok(ReactionOutcome::ignored(IgnoreReason::NotThumbsUp));
        }

        let meal = match self.meals.find_by_slack_message_id(&event.message_id).await {
            Ok(meal) => meal,
            Err(err) if err.is_not_found() => {
                debug!("reaction is not on a meal announcement");
                return Ok(ReactionOutcome::ignored(IgnoreReason::UnknownMessage));
            }
            Err(err) => return Err(err).at(ReactionStep::ResolveMeal),
        };

        if meal.is_expired(now) {
            info!(meal_id = meal.id, date = %meal.date, "ignoring reaction on expired meal");
            return Ok(ReactionOutcome::ignored(IgnoreReason::Expired));
        }

        let member = self.resolve_member(&event.user).await?;
        let meals_eaten = self
            .members
            .adjust_meals_eaten(member.id, change.delta())
            .await
            .at(ReactionStep::AdjustCounter)?;

        info!(meal_id = meal.id, meals_eaten, "meals eaten updated");
        Ok(ReactionOutcome::Applied {
            slack_uid: member.slack_uid,
            meal_id: meal.id,
            meals_eaten,
        })
    }

    async fn resolve_member(&self, slack_uid: &str) -> std::result::Result<Member, ReactionError> {
        match self.members.find_by_slack_uid(slack_uid).await {
            Ok(member) => return Ok(member),
            Err(err) if err.is_not_found() => {}
            Err(err) => return Err(err).at(ReactionStep::FindMember),
        }

        let full_name = match self.chat {
            Some(chat) => {
                chat.user_profile(slack_uid)
                    .await
                    .at(ReactionStep::FetchProfile)?
                    .full_name
            }
            None => slack_uid.to_owned(),
        };

        let member = self
            .members
            .create(&NewMember::new(slack_uid, full_name))
            .await
            .at(ReactionStep::CreateMember)?;
        info!(member_id = member.id, full_name = %member.full_name, "registered new member");
        Ok(member)
    }
}
