//! `/api/desert-storm` routes.

use axum::extract::State;
use chrono::Utc;

use super::AppState;
use super::auth::Actor;
use super::error::{ApiJson, ApiPath, ApiResult, Created, Data};
use crate::ops::desert_storm::{self, DesertStormFields, DesertStormView, RosterUpdate};
use crate::permissions::Permission;
use crate::types::{DesertStorm, DesertStormId};

pub async fn list(
    State(app): State<AppState>,
    actor: Actor,
) -> ApiResult<Data<Vec<DesertStormView>>> {
    app.authorize(&actor, Permission::DesertStormView).await?;
    Ok(Data(app.read(desert_storm::list).await))
}

pub async fn show(
    State(app): State<AppState>,
    actor: Actor,
    ApiPath(id): ApiPath<DesertStormId>,
) -> ApiResult<Data<DesertStormView>> {
    app.authorize(&actor, Permission::DesertStormView).await?;
    let battle = app.read(|t| desert_storm::get(t, id).cloned()).await?;
    Ok(Data(DesertStormView::new(battle)))
}

pub async fn create(
    State(app): State<AppState>,
    actor: Actor,
    ApiJson(fields): ApiJson<DesertStormFields>,
) -> ApiResult<Created<DesertStormView>> {
    app.authorize(&actor, Permission::DesertStormEdit).await?;
    let battle = app
        .transact(|t| desert_storm::create(t, fields, Utc::now()))
        .await?;
    Ok(Created(DesertStormView::new(battle)))
}

pub async fn update(
    State(app): State<AppState>,
    actor: Actor,
    ApiPath(id): ApiPath<DesertStormId>,
    ApiJson(fields): ApiJson<DesertStormFields>,
) -> ApiResult<Data<DesertStormView>> {
    app.authorize(&actor, Permission::DesertStormEdit).await?;
    let battle = app
        .transact(|t| desert_storm::update(t, id, fields, Utc::now()))
        .await?;
    Ok(Data(DesertStormView::new(battle)))
}

pub async fn delete(
    State(app): State<AppState>,
    actor: Actor,
    ApiPath(id): ApiPath<DesertStormId>,
) -> ApiResult<Data<DesertStorm>> {
    app.authorize(&actor, Permission::DesertStormEdit).await?;
    Ok(Data(app.transact(|t| desert_storm::delete(t, id)).await?))
}

/// Replaces the whole roster of a battle.
pub async fn set_roster(
    State(app): State<AppState>,
    actor: Actor,
    ApiPath(id): ApiPath<DesertStormId>,
    ApiJson(update): ApiJson<RosterUpdate>,
) -> ApiResult<Data<DesertStormView>> {
    app.authorize(&actor, Permission::DesertStormEdit).await?;
    let battle = app
        .transact(|t| desert_storm::set_roster(t, id, update.roster, Utc::now()))
        .await?;
    Ok(Data(DesertStormView::new(battle)))
}
