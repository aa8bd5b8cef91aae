//! Route handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use super::extract::{ApiJson, ApiPath, ApiQuery};
use super::{ApiError, AppState};
use crate::chat::ChatPlatform;
use crate::models::event::PushEvent;
use crate::models::meal::Meal;
use crate::models::member::{Member, MemberUpdate};
use crate::rotation::announce;
use crate::rotation::assignment::{self, AssignmentReport, CookAssignment, Rota};
use crate::rotation::reaction::ReactionReconciler;
use crate::rotation::report::{build_weekly_report, ReportEntry};
use crate::rotation::upcoming::{self, UpcomingMeal};
use crate::slack::events::{self, EventAck};

type ApiResult<T> = std::result::Result<T, ApiError>;

const DEFAULT_UPCOMING_DAYS: u32 = 7;

fn chat(state: &AppState) -> ApiResult<&dyn ChatPlatform> {
    state.chat.as_deref().ok_or_else(ApiError::chat_unavailable)
}

/// `GET /ping`
pub async fn ping() -> &'static str {
    "pong"
}

/// `POST /event`: Slack Events API callback. Always acknowledged.
pub async fn event(State(state): State<Arc<AppState>>, body: String) -> Response {
    let push: PushEvent = match serde_json::from_str(&body) {
        Ok(push) => push,
        Err(err) => {
            warn!(%err, "undecodable slack event payload");
            return StatusCode::OK.into_response();
        }
    };

    let reconciler = ReactionReconciler::new(
        state.meals.as_ref(),
        state.members.as_ref(),
        state.chat.as_deref(),
    );
    match events::dispatch(&reconciler, push, Local::now().naive_local()).await {
        EventAck::Challenge(challenge) => (StatusCode::OK, challenge).into_response(),
        EventAck::Ok => StatusCode::OK.into_response(),
    }
}

/// Body of `PUT /cmd/assign-cooks`.
#[derive(Debug, Deserialize, Serialize)]
pub struct AssignCooksRequest {
    /// Ordered `(date, cook)` pairs.
    pub cooks: Vec<CookAssignment>,
}

/// `PUT /cmd/assign-cooks`
pub async fn assign_cooks(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<AssignCooksRequest>,
) -> Json<AssignmentReport> {
    let rota = Rota {
        meals: state.meals.as_ref(),
        members: state.members.as_ref(),
        chat: state.chat.as_deref(),
    };
    Json(assignment::assign_cooks(rota, &request.cooks).await)
}

/// `POST /cmd/eating-tomorrow`
pub async fn eating_tomorrow(State(state): State<Arc<AppState>>) -> ApiResult<Json<Meal>> {
    let chat = chat(&state)?;
    let meal = announce::post_eating_tomorrow(
        state.meals.as_ref(),
        chat,
        state.config.slack.channel_id(),
        Local::now().date_naive(),
    )
    .await?;
    Ok(Json(meal))
}

/// `POST /cmd/weekly-update`
pub async fn weekly_update(State(state): State<Arc<AppState>>) -> ApiResult<Json<serde_json::Value>> {
    let chat = chat(&state)?;
    let posted = announce::post_weekly_update(
        state.members.as_ref(),
        chat,
        state.config.slack.channel_id(),
        state.config.report_limit,
    )
    .await?;
    Ok(Json(json!({ "posted": posted })))
}

/// `GET /cmd/weekly-report`
pub async fn weekly_report(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<ReportEntry>>> {
    Ok(Json(build_weekly_report(state.members.as_ref()).await?))
}

/// `GET /cmd/members`
pub async fn list_members(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Member>>> {
    Ok(Json(state.members.list().await?))
}

/// `PATCH /cmd/members/{slack_uid}`
pub async fn update_member(
    State(state): State<Arc<AppState>>,
    ApiPath(slack_uid): ApiPath<String>,
    ApiJson(update): ApiJson<MemberUpdate>,
) -> ApiResult<Json<Member>> {
    let member = state.members.find_by_slack_uid(&slack_uid).await?;
    state.members.update(member.id, &update).await?;
    info!(%slack_uid, member_id = member.id, "member updated");
    Ok(Json(state.members.find_by_id(member.id).await?))
}

/// `POST /cmd/members/{slack_uid}/cooked`
pub async fn record_cooked(
    State(state): State<Arc<AppState>>,
    ApiPath(slack_uid): ApiPath<String>,
) -> ApiResult<Json<Member>> {
    let member = state.members.find_by_slack_uid(&slack_uid).await?;
    let meals_cooked = state.members.adjust_meals_cooked(member.id, 1).await?;
    info!(%slack_uid, meals_cooked, "meal cooked recorded");
    Ok(Json(Member {
        meals_cooked,
        ..member
    }))
}

/// Query of `GET /cmd/upcoming-cooks`.
#[derive(Debug, Deserialize)]
pub struct UpcomingQuery {
    /// Number of days to list, starting today.
    pub days: Option<u32>,
}

/// `GET /cmd/upcoming-cooks?days=N`
pub async fn upcoming_cooks(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<UpcomingQuery>,
) -> ApiResult<Json<Vec<UpcomingMeal>>> {
    let schedule = upcoming::upcoming_cooks(
        state.meals.as_ref(),
        state.members.as_ref(),
        Local::now().date_naive(),
        query.days.unwrap_or(DEFAULT_UPCOMING_DAYS),
    )
    .await?;
    Ok(Json(schedule))
}

/// `DELETE /cmd/meals/{id}`
pub async fn delete_meal(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    state.meals.delete(id).await?;
    info!(meal_id = id, "meal deleted");
    Ok(StatusCode::NO_CONTENT)
}
