//! `/api/vs` routes: weeks, daily scores and participant points.

use axum::extract::State;
use chrono::Utc;

use super::AppState;
use super::auth::Actor;
use super::error::{ApiJson, ApiPath, ApiQuery, ApiResult, Created, Data};
use crate::ops::vs::{
    self, DayScores, ParticipantPoints, VsQuery, VsWeekDetail, VsWeekFields, VsWeekSummary,
};
use crate::permissions::Permission;
use crate::types::{MemberId, VsDay, VsParticipant, VsWeek, VsWeekId};

pub async fn list(
    State(app): State<AppState>,
    actor: Actor,
    ApiQuery(query): ApiQuery<VsQuery>,
) -> ApiResult<Data<Vec<VsWeekSummary>>> {
    app.authorize(&actor, Permission::VsView).await?;
    Ok(Data(app.read(|t| vs::list(t, &query)).await))
}

pub async fn show(
    State(app): State<AppState>,
    actor: Actor,
    ApiPath(id): ApiPath<VsWeekId>,
) -> ApiResult<Data<VsWeekDetail>> {
    app.authorize(&actor, Permission::VsView).await?;
    Ok(Data(app.read(|t| vs::detail(t, id)).await?))
}

pub async fn create(
    State(app): State<AppState>,
    actor: Actor,
    ApiJson(fields): ApiJson<VsWeekFields>,
) -> ApiResult<Created<VsWeek>> {
    app.authorize(&actor, Permission::VsEdit).await?;
    Ok(Created(
        app.transact(|t| vs::create(t, fields, Utc::now())).await?,
    ))
}

pub async fn update(
    State(app): State<AppState>,
    actor: Actor,
    ApiPath(id): ApiPath<VsWeekId>,
    ApiJson(fields): ApiJson<VsWeekFields>,
) -> ApiResult<Data<VsWeek>> {
    app.authorize(&actor, Permission::VsEdit).await?;
    Ok(Data(
        app.transact(|t| vs::update(t, id, fields, Utc::now())).await?,
    ))
}

/// Deletes a week with its days and participant points.
pub async fn delete(
    State(app): State<AppState>,
    actor: Actor,
    ApiPath(id): ApiPath<VsWeekId>,
) -> ApiResult<Data<VsWeek>> {
    app.authorize(&actor, Permission::VsEdit).await?;
    Ok(Data(app.transact(|t| vs::delete(t, id)).await?))
}

pub async fn set_day(
    State(app): State<AppState>,
    actor: Actor,
    ApiPath((id, day)): ApiPath<(VsWeekId, u8)>,
    ApiJson(scores): ApiJson<DayScores>,
) -> ApiResult<Data<VsDay>> {
    app.authorize(&actor, Permission::VsEdit).await?;
    Ok(Data(
        app.transact(|t| vs::set_day(t, id, day, scores, Utc::now()))
            .await?,
    ))
}

pub async fn set_participant(
    State(app): State<AppState>,
    actor: Actor,
    ApiPath((id, member_id)): ApiPath<(VsWeekId, MemberId)>,
    ApiJson(points): ApiJson<ParticipantPoints>,
) -> ApiResult<Data<VsParticipant>> {
    app.authorize(&actor, Permission::VsEdit).await?;
    Ok(Data(
        app.transact(|t| vs::set_participant(t, id, member_id, points, Utc::now()))
            .await?,
    ))
}
