//! Integration tests for the cook assignment flow.

use chrono::{NaiveDate, Weekday};
use dinner_rotation::calendar::resolve_date;
use dinner_rotation::models::date::Date;
use dinner_rotation::models::meal::MealUpdate;
use dinner_rotation::models::member::NewMember;
use dinner_rotation::chat::ChatPlatform;
use dinner_rotation::persistence::{MealStore, MemberStore};
use dinner_rotation::rotation::assignment::{assign_cooks, AssignmentOutcome, CookAssignment, Rota};
use dinner_rotation::AppError;

use super::test_helpers::{repos, FailingMealStore, FakeChat};

fn tuesday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 7).expect("valid date")
}

fn rota<'a>(meals: &'a dyn MealStore, members: &'a dyn MemberStore) -> Rota<'a> {
    Rota {
        meals,
        members,
        chat: None,
    }
}

fn date(month: u32, day: u32) -> Date {
    Date::new(2024, month, day).expect("valid date")
}

#[tokio::test]
async fn weekday_assignments_on_a_tuesday() {
    let (meals, members) = repos().await;
    let today = tuesday();
    let batch = [
        CookAssignment::new(resolve_date(today, Weekday::Mon), "U1"),
        CookAssignment::new(resolve_date(today, Weekday::Wed), "U2"),
    ];

    let report = assign_cooks(rota(&meals, &members), &batch).await;
    assert_eq!(report.created(), 2);
    assert!(!report.has_failures());

    let monday = meals.find_by_date(date(5, 13)).await.expect("monday meal");
    assert_eq!(monday.cook_slack_uid, "U1");
    let wednesday = meals.find_by_date(date(5, 8)).await.expect("wednesday meal");
    assert_eq!(wednesday.cook_slack_uid, "U2");
    assert!(wednesday.description.is_none());
    assert!(wednesday.slack_message_id.is_none());
}

#[tokio::test]
async fn existing_meal_only_changes_cook() {
    let (meals, members) = repos().await;
    assign_cooks(rota(&meals, &members), &[CookAssignment::new(date(5, 8), "U1")]).await;
    let meal = meals.find_by_date(date(5, 8)).await.unwrap();
    meals
        .update(
            meal.id,
            &MealUpdate {
                cook_slack_uid: None,
                description: Some("curry".into()),
            },
        )
        .await
        .unwrap();
    meals.set_slack_message_id(meal.id, "1.5").await.unwrap();

    let report = assign_cooks(rota(&meals, &members), &[CookAssignment::new(date(5, 8), "U2")]).await;
    assert_eq!(report.updated(), 1);
    assert!(matches!(
        report.outcomes[0],
        AssignmentOutcome::Updated { meal_id, .. } if meal_id == meal.id
    ));

    let stored = meals.find_by_id(meal.id).await.unwrap();
    assert_eq!(stored.cook_slack_uid, "U2");
    assert_eq!(stored.description.as_deref(), Some("curry"));
    assert_eq!(stored.slack_message_id.as_deref(), Some("1.5"));
}

#[tokio::test]
async fn empty_batch_is_a_noop() {
    let (meals, members) = repos().await;
    let report = assign_cooks(rota(&meals, &members), &[]).await;
    assert!(report.is_noop());
    assert!(meals
        .list_between(date(1, 1), date(12, 31))
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn duplicate_dates_resolve_to_last_cook() {
    let (meals, members) = repos().await;
    let batch = [
        CookAssignment::new(date(5, 8), "U1"),
        CookAssignment::new(date(5, 8), "U2"),
    ];

    let report = assign_cooks(rota(&meals, &members), &batch).await;
    assert!(matches!(report.outcomes[0], AssignmentOutcome::Created { .. }));
    assert!(matches!(report.outcomes[1], AssignmentOutcome::Updated { .. }));
    assert_eq!(meals.find_by_date(date(5, 8)).await.unwrap().cook_slack_uid, "U2");
}

#[tokio::test]
async fn blank_cook_fails_only_that_item() {
    let (meals, members) = repos().await;
    let batch = [
        CookAssignment::new(date(5, 8), "  "),
        CookAssignment::new(date(5, 9), "U2"),
    ];

    let report = assign_cooks(rota(&meals, &members), &batch).await;
    assert!(matches!(
        &report.outcomes[0],
        AssignmentOutcome::Failed { index: 0, error: AppError::InvalidInput(_), .. }
    ));
    assert_eq!(report.created(), 1);
    assert!(meals.find_by_date(date(5, 8)).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn store_failure_is_isolated_per_item() {
    let (inner, members) = repos().await;
    let store = FailingMealStore {
        inner,
        failing_dates: vec![date(5, 9)],
    };
    let batch = [
        CookAssignment::new(date(5, 8), "U1"),
        CookAssignment::new(date(5, 9), "U2"),
        CookAssignment::new(date(5, 10), "U3"),
    ];

    let report = assign_cooks(rota(&store, &members), &batch).await;
    assert_eq!(report.created(), 2);
    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert!(matches!(
        failures[0],
        AssignmentOutcome::Failed { index: 1, error: AppError::Db(_), .. }
    ));
    assert_eq!(store.find_by_date(date(5, 10)).await.unwrap().cook_slack_uid, "U3");
}

#[tokio::test]
async fn report_serializes_per_item_status() {
    let (meals, members) = repos().await;
    let report = assign_cooks(
        rota(&meals, &members),
        &[
            CookAssignment::new(date(5, 8), "U1"),
            CookAssignment::new(date(5, 9), ""),
        ],
    )
    .await;

    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["outcomes"][0]["status"], "created");
    assert_eq!(value["outcomes"][1]["status"], "failed");
    assert!(value["outcomes"][1]["error"]
        .as_str()
        .unwrap()
        .starts_with("invalid input"));
}

#[tokio::test]
async fn first_assignment_registers_the_cook() {
    let (meals, members) = repos().await;
    let report = assign_cooks(rota(&meals, &members), &[CookAssignment::new(date(5, 8), "U1")]).await;
    assert_eq!(report.created(), 1);

    let member = members.find_by_slack_uid("U1").await.expect("cook registered");
    assert_eq!(member.full_name, "U1");
    assert_eq!(member.meals_eaten, 0);
    assert_eq!(member.meals_cooked, 0);
    assert!(!member.leader);
}

#[tokio::test]
async fn known_cook_is_not_re_registered() {
    let (meals, members) = repos().await;
    let existing = members.create(&NewMember::new("U1", "Ada")).await.unwrap();
    members.adjust_meals_eaten(existing.id, 3).await.unwrap();

    let batch = [
        CookAssignment::new(date(5, 8), "U1"),
        CookAssignment::new(date(5, 9), "U1"),
    ];
    assign_cooks(rota(&meals, &members), &batch).await;

    let all = members.list().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].full_name, "Ada");
    assert_eq!(all[0].meals_eaten, 3);
}

#[tokio::test]
async fn new_cook_takes_name_from_chat_profile() {
    let (meals, members) = repos().await;
    let chat = FakeChat::new().with_profile("U1", "Ada Lovelace");
    let with_chat = Rota {
        meals: &meals,
        members: &members,
        chat: Some(&chat as &dyn ChatPlatform),
    };

    assign_cooks(with_chat, &[CookAssignment::new(date(5, 8), "U1")]).await;
    let member = members.find_by_slack_uid("U1").await.unwrap();
    assert_eq!(member.full_name, "Ada Lovelace");
}

#[tokio::test]
async fn profile_failure_fails_the_item_before_the_meal_is_written() {
    let (meals, members) = repos().await;
    let chat = FakeChat::new().failing_profiles();
    let with_chat = Rota {
        meals: &meals,
        members: &members,
        chat: Some(&chat as &dyn ChatPlatform),
    };

    let report = assign_cooks(with_chat, &[CookAssignment::new(date(5, 8), "U1")]).await;
    assert!(matches!(
        &report.outcomes[0],
        AssignmentOutcome::Failed { index: 0, error: AppError::Slack(_), .. }
    ));
    assert!(meals.find_by_date(date(5, 8)).await.unwrap_err().is_not_found());
    assert!(members.find_by_slack_uid("U1").await.unwrap_err().is_not_found());
}
