//! Cook assignment: create or update one meal per requested date.
//!
//! Items are processed in order and in isolation. A failing item is
//! recorded in the report and the batch carries on with the next one.
//! Two items for the same date resolve as last-write-wins. A cook seen for
//! the first time is registered as a member before their meal is written.

use std::collections::HashSet;

use serde::{Deserialize, Serialize, Serializer};
use tracing::{info, info_span, warn, Instrument};

use crate::chat::ChatPlatform;
use crate::models::date::Date;
use crate::models::meal::{MealUpdate, NewMeal};
use crate::models::member::{Member, NewMember};
use crate::persistence::{MealStore, MemberStore};
use crate::{AppError, Result};

/// Request to have `cook_slack_uid` cook on `date`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CookAssignment {
    /// Day to cook.
    pub date: Date,
    /// Slack user ID of the cook.
    pub cook_slack_uid: String,
}

impl CookAssignment {
    /// Build an assignment.
    #[must_use]
    pub fn new(date: Date, cook_slack_uid: impl Into<String>) -> Self {
        Self {
            date,
            cook_slack_uid: cook_slack_uid.into(),
        }
    }
}

fn error_string<S: Serializer>(err: &AppError, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(err)
}

/// Result of one assignment item.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AssignmentOutcome {
    /// No meal existed; one was created.
    Created {
        /// Position in the request.
        index: usize,
        /// Meal date.
        date: Date,
        /// New meal ID.
        meal_id: i64,
    },
    /// A meal existed; its cook was replaced.
    Updated {
        /// Position in the request.
        index: usize,
        /// Meal date.
        date: Date,
        /// Existing meal ID.
        meal_id: i64,
    },
    /// The item could not be applied.
    Failed {
        /// Position in the request.
        index: usize,
        /// Meal date.
        date: Date,
        /// What went wrong.
        #[serde(serialize_with = "error_string")]
        error: AppError,
    },
}

impl AssignmentOutcome {
    /// Whether this item failed.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Aggregated per-item results of a batch.
#[derive(Debug, Default, Serialize)]
pub struct AssignmentReport {
    /// One outcome per request item, in request order.
    pub outcomes: Vec<AssignmentOutcome>,
}

impl AssignmentReport {
    /// The batch was empty; nothing was done.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Items that failed.
    pub fn failures(&self) -> impl Iterator<Item = &AssignmentOutcome> {
        self.outcomes.iter().filter(|o| o.is_failure())
    }

    /// Whether at least one item failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    /// Number of meals created.
    #[must_use]
    pub fn created(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, AssignmentOutcome::Created { .. }))
            .count()
    }

    /// Number of meals whose cook was updated.
    #[must_use]
    pub fn updated(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, AssignmentOutcome::Updated { .. }))
            .count()
    }
}

/// Stores and chat platform the assignment engine works against.
#[derive(Clone, Copy)]
pub struct Rota<'a> {
    /// Meal persistence.
    pub meals: &'a dyn MealStore,
    /// Member persistence; unknown cooks are registered here.
    pub members: &'a dyn MemberStore,
    /// Profile source for new cooks. Without it the Slack ID doubles as name.
    pub chat: Option<&'a dyn ChatPlatform>,
}

/// Assign cooks to dates, creating or updating the meal of each date.
///
/// Never fails as a whole: per-item errors are reported in the returned
/// [`AssignmentReport`].
pub async fn assign_cooks(rota: Rota<'_>, assignments: &[CookAssignment]) -> AssignmentReport {
    let span = info_span!("assign_cooks", items = assignments.len());
    assign_batch(rota, assignments).instrument(span).await
}

async fn assign_batch(rota: Rota<'_>, assignments: &[CookAssignment]) -> AssignmentReport {
    let mut report = AssignmentReport::default();
    if assignments.is_empty() {
        info!("no cook assignments requested");
        return report;
    }

    let mut seen = HashSet::with_capacity(assignments.len());
    for (index, assignment) in assignments.iter().enumerate() {
        if !seen.insert(assignment.date) {
            warn!(index, date = %assignment.date, "date assigned twice in one batch; later cook wins");
        }

        let outcome = match assign_one(rota, index, assignment).await {
            Ok(outcome) => outcome,
            Err(error) => {
                warn!(index, date = %assignment.date, %error, "cook assignment failed");
                AssignmentOutcome::Failed {
                    index,
                    date: assignment.date,
                    error,
                }
            }
        };
        report.outcomes.push(outcome);
    }

    info!(
        created = report.created(),
        updated = report.updated(),
        failed = report.failures().count(),
        "cook assignments processed"
    );
    report
}

async fn register_cook(rota: Rota<'_>, cook: &str) -> Result<Member> {
    match rota.members.find_by_slack_uid(cook).await {
        Ok(member) => return Ok(member),
        Err(err) if err.is_not_found() => {}
        Err(err) => return Err(err),
    }

    let full_name = match rota.chat {
        Some(chat) => chat.user_profile(cook).await?.full_name,
        None => cook.to_owned(),
    };
    let member = rota.members.create(&NewMember::new(cook, full_name)).await?;
    info!(member_id = member.id, full_name = %member.full_name, "registered new cook");
    Ok(member)
}

async fn assign_one(
    rota: Rota<'_>,
    index: usize,
    assignment: &CookAssignment,
) -> Result<AssignmentOutcome> {
    let cook = assignment.cook_slack_uid.trim();
    if cook.is_empty() {
        return Err(AppError::InvalidInput("cook slack uid must not be empty".into()));
    }
    register_cook(rota, cook).await?;

    let meals = rota.meals;
    match meals.find_by_date(assignment.date).await {
        Ok(existing) => {
            meals.update(existing.id, &MealUpdate::cook(cook)).await?;
            info!(index, date = %assignment.date, meal_id = existing.id, cook, "cook reassigned");
            Ok(AssignmentOutcome::Updated {
                index,
                date: assignment.date,
                meal_id: existing.id,
            })
        }
        Err(err) if err.is_not_found() => {
            let new_meal = NewMeal {
                cook_slack_uid: cook.to_owned(),
                date: assignment.date,
            };
            let created = meals.create(&new_meal).await?;
            info!(index, date = %assignment.date, meal_id = created.id, cook, "meal created");
            Ok(AssignmentOutcome::Created {
                index,
                date: assignment.date,
                meal_id: created.id,
            })
        }
        Err(err) => Err(err),
    }
}
