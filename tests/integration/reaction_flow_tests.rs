//! Integration tests for reaction reconciliation.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use dinner_rotation::models::date::Date;
use dinner_rotation::models::event::ReactionEvent;
use dinner_rotation::models::meal::NewMeal;
use dinner_rotation::models::member::NewMember;
use dinner_rotation::persistence::meal_repo::MealRepo;
use dinner_rotation::persistence::{MealStore, MemberStore};
use dinner_rotation::rotation::reaction::{
    IgnoreReason, ReactionOutcome, ReactionReconciler, ReactionStep,
};

use super::test_helpers::{repos, FakeChat};

const MESSAGE_TS: &str = "1715000000.000100";

fn evening(day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, day)
        .expect("valid date")
        .and_time(NaiveTime::from_hms_opt(18, 0, 0).expect("valid time"))
}

fn event(user: &str, reaction: &str) -> ReactionEvent {
    ReactionEvent {
        reaction: reaction.into(),
        message_id: MESSAGE_TS.into(),
        user: user.into(),
        channel: "C_DEV".into(),
    }
}

async fn announced_meal(meals: &MealRepo, day: u32) -> i64 {
    let meal = meals
        .create(&NewMeal {
            cook_slack_uid: "U_COOK".into(),
            date: Date::new(2024, 5, day).expect("valid date"),
        })
        .await
        .expect("create meal");
    meals
        .set_slack_message_id(meal.id, MESSAGE_TS)
        .await
        .expect("announce");
    meal.id
}

#[tokio::test]
async fn thumbs_up_increments_existing_member() {
    let (meals, members) = repos().await;
    let meal_id = announced_meal(&meals, 8).await;
    members.create(&NewMember::new("U1", "Ada")).await.unwrap();
    let reconciler = ReactionReconciler::new(&meals, &members, None);

    let outcome = reconciler
        .on_reaction_added(&event("U1", "+1"), evening(7))
        .await
        .expect("reconciles");

    assert_eq!(
        outcome,
        ReactionOutcome::Applied {
            slack_uid: "U1".into(),
            meal_id,
            meals_eaten: 1,
        }
    );
}

#[tokio::test]
async fn removal_decrements_and_clamps_at_zero() {
    let (meals, members) = repos().await;
    announced_meal(&meals, 8).await;
    let member = members.create(&NewMember::new("U1", "Ada")).await.unwrap();
    let reconciler = ReactionReconciler::new(&meals, &members, None);
    let now = evening(7);

    reconciler.on_reaction_added(&event("U1", "+1"), now).await.unwrap();
    reconciler.on_reaction_removed(&event("U1", "+1"), now).await.unwrap();
    let outcome = reconciler
        .on_reaction_removed(&event("U1", "+1"), now)
        .await
        .unwrap();

    assert!(matches!(outcome, ReactionOutcome::Applied { meals_eaten: 0, .. }));
    assert_eq!(members.find_by_id(member.id).await.unwrap().meals_eaten, 0);
}

#[tokio::test]
async fn other_emoji_is_ignored() {
    let (meals, members) = repos().await;
    announced_meal(&meals, 8).await;
    let reconciler = ReactionReconciler::new(&meals, &members, None);

    let outcome = reconciler
        .on_reaction_added(&event("U1", "heart"), evening(7))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        ReactionOutcome::Ignored {
            reason: IgnoreReason::NotThumbsUp
        }
    );
    assert!(members.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_message_is_ignored() {
    let (meals, members) = repos().await;
    let reconciler = ReactionReconciler::new(&meals, &members, None);

    let outcome = reconciler
        .on_reaction_added(&event("U1", "+1"), evening(7))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        ReactionOutcome::Ignored {
            reason: IgnoreReason::UnknownMessage
        }
    );
}

#[tokio::test]
async fn expired_meal_is_ignored() {
    let (meals, members) = repos().await;
    announced_meal(&meals, 8).await;
    let member = members.create(&NewMember::new("U1", "Ada")).await.unwrap();
    let reconciler = ReactionReconciler::new(&meals, &members, None);

    let outcome = reconciler
        .on_reaction_added(&event("U1", "+1"), evening(10))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        ReactionOutcome::Ignored {
            reason: IgnoreReason::Expired
        }
    );
    assert_eq!(members.find_by_id(member.id).await.unwrap().meals_eaten, 0);
}

#[tokio::test]
async fn reaction_the_day_after_still_counts() {
    let (meals, members) = repos().await;
    announced_meal(&meals, 8).await;
    let reconciler = ReactionReconciler::new(&meals, &members, None);

    let outcome = reconciler
        .on_reaction_added(&event("U1", "+1"), evening(8))
        .await
        .unwrap();
    assert!(matches!(outcome, ReactionOutcome::Applied { .. }));
}

#[tokio::test]
async fn unknown_member_is_registered_from_profile() {
    let (meals, members) = repos().await;
    announced_meal(&meals, 8).await;
    let chat = FakeChat::new().with_profile("U_NEW", "Grace Hopper");
    let reconciler = ReactionReconciler::new(&meals, &members, Some(&chat));

    let outcome = reconciler
        .on_reaction_added(&event("U_NEW", "+1"), evening(7))
        .await
        .unwrap();

    assert!(matches!(outcome, ReactionOutcome::Applied { meals_eaten: 1, .. }));
    let member = members.find_by_slack_uid("U_NEW").await.unwrap();
    assert_eq!(member.full_name, "Grace Hopper");
    assert_eq!((member.meals_eaten, member.meals_cooked), (1, 0));
}

#[tokio::test]
async fn profile_failure_names_the_step() {
    let (meals, members) = repos().await;
    announced_meal(&meals, 8).await;
    let chat = FakeChat::new().failing_profiles();
    let reconciler = ReactionReconciler::new(&meals, &members, Some(&chat));

    let err = reconciler
        .on_reaction_added(&event("U_NEW", "+1"), evening(7))
        .await
        .unwrap_err();

    assert_eq!(err.step, ReactionStep::FetchProfile);
    assert!(err.to_string().starts_with("fetch profile: slack:"), "{err}");
    assert!(members.find_by_slack_uid("U_NEW").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn first_removal_from_unknown_member_registers_at_zero() {
    let (meals, members) = repos().await;
    announced_meal(&meals, 8).await;
    let reconciler = ReactionReconciler::new(&meals, &members, None);

    let outcome = reconciler
        .on_reaction_removed(&event("U_NEW", "+1"), evening(7))
        .await
        .unwrap();

    assert!(matches!(outcome, ReactionOutcome::Applied { meals_eaten: 0, .. }));
    let member = members.find_by_slack_uid("U_NEW").await.unwrap();
    assert_eq!(member.full_name, "U_NEW");
}
