//! `/api/events` routes.

use axum::extract::State;
use chrono::Utc;

use super::AppState;
use super::auth::Actor;
use super::error::{ApiJson, ApiPath, ApiQuery, ApiResult, Created, Data};
use crate::ops::events::{self, EventFields, EventQuery};
use crate::permissions::Permission;
use crate::types::{AllianceEvent, EventId};

pub async fn list(
    State(app): State<AppState>,
    actor: Actor,
    ApiQuery(query): ApiQuery<EventQuery>,
) -> ApiResult<Data<Vec<AllianceEvent>>> {
    app.authorize(&actor, Permission::EventsView).await?;
    Ok(Data(app.read(|t| events::list(t, &query)).await))
}

pub async fn show(
    State(app): State<AppState>,
    actor: Actor,
    ApiPath(id): ApiPath<EventId>,
) -> ApiResult<Data<AllianceEvent>> {
    app.authorize(&actor, Permission::EventsView).await?;
    Ok(Data(app.read(|t| events::get(t, id).cloned()).await?))
}

pub async fn create(
    State(app): State<AppState>,
    actor: Actor,
    ApiJson(fields): ApiJson<EventFields>,
) -> ApiResult<Created<AllianceEvent>> {
    app.authorize(&actor, Permission::EventsEdit).await?;
    let event = app.transact(|t| events::create(t, fields, Utc::now())).await?;
    Ok(Created(event))
}

pub async fn update(
    State(app): State<AppState>,
    actor: Actor,
    ApiPath(id): ApiPath<EventId>,
    ApiJson(fields): ApiJson<EventFields>,
) -> ApiResult<Data<AllianceEvent>> {
    app.authorize(&actor, Permission::EventsEdit).await?;
    let event = app
        .transact(|t| events::update(t, id, fields, Utc::now()))
        .await?;
    Ok(Data(event))
}

pub async fn delete(
    State(app): State<AppState>,
    actor: Actor,
    ApiPath(id): ApiPath<EventId>,
) -> ApiResult<Data<AllianceEvent>> {
    app.authorize(&actor, Permission::EventsEdit).await?;
    Ok(Data(app.transact(|t| events::delete(t, id)).await?))
}
