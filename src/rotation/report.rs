//! Eaten/cooked ratio ranking for the weekly update.

use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

use serde::{Serialize, Serializer};

use crate::models::member::Member;
use crate::persistence::MemberStore;
use crate::Result;

/// Number of members listed in the weekly notification.
pub const REPORT_LIMIT: usize = 11;

/// A member's meals-eaten to meals-cooked ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ratio {
    /// Eaten at least once, never cooked.
    Infinite,
    /// Eaten divided by cooked.
    Finite(f64),
    /// Neither cooked nor eaten.
    Idle,
}

impl Ratio {
    /// Compute the ratio from raw counters.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Counters stay far below 2^52.
    pub fn from_counts(meals_eaten: i64, meals_cooked: i64) -> Self {
        if meals_cooked > 0 {
            Self::Finite(meals_eaten as f64 / meals_cooked as f64)
        } else if meals_eaten > 0 {
            Self::Infinite
        } else {
            Self::Idle
        }
    }

    /// Human-readable status shown in the report.
    #[must_use]
    pub fn status(&self) -> String {
        match self {
            Self::Infinite => "Infinity! You've eaten but never cooked".into(),
            Self::Finite(value) => format!("{value:.3}"),
            Self::Idle => "Neither cooked nor eaten".into(),
        }
    }

    fn bucket(&self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Finite(_) => 1,
            Self::Infinite => 2,
        }
    }

    /// Total order: `Idle` < any `Finite` < `Infinite`.
    #[must_use]
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Finite(a), Self::Finite(b)) => a.total_cmp(b),
            _ => self.bucket().cmp(&other.bucket()),
        }
    }
}

impl Display for Ratio {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.status())
    }
}

impl Serialize for Ratio {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.status())
    }
}

/// One ranked line of the weekly report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    /// The ranked member.
    pub member: Member,
    /// The member's ratio.
    pub ratio: Ratio,
}

/// Rank members from worst (high eaten, low cooked) to best.
///
/// Members with equal ratios keep their input order.
#[must_use]
pub fn rank_members(members: Vec<Member>) -> Vec<ReportEntry> {
    let mut entries: Vec<ReportEntry> = members
        .into_iter()
        .map(|member| ReportEntry {
            ratio: Ratio::from_counts(member.meals_eaten, member.meals_cooked),
            member,
        })
        .collect();
    entries.sort_by(|a, b| b.ratio.rank_cmp(&a.ratio));
    entries
}

/// Read every member from the store and rank them.
///
/// # Errors
///
/// Returns `AppError::Db` if the member listing fails.
pub async fn build_weekly_report(members: &dyn MemberStore) -> Result<Vec<ReportEntry>> {
    let all = members.list().await?;
    Ok(rank_members(all))
}

/// The slice of a ranked report that goes into the notification.
#[must_use]
pub fn notification_entries(entries: &[ReportEntry], limit: usize) -> &[ReportEntry] {
    &entries[..entries.len().min(limit)]
}
