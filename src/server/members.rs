//! `/api/members` routes.

use axum::extract::State;
use chrono::Utc;

use super::AppState;
use super::auth::Actor;
use super::error::{ApiJson, ApiPath, ApiQuery, ApiResult, Created, Data};
use crate::ops::members::{self, MemberFields, MemberQuery, MemberRemoval};
use crate::permissions::Permission;
use crate::types::{Member, MemberId};

pub async fn list(
    State(app): State<AppState>,
    actor: Actor,
    ApiQuery(query): ApiQuery<MemberQuery>,
) -> ApiResult<Data<Vec<Member>>> {
    app.authorize(&actor, Permission::MembersView).await?;
    Ok(Data(app.read(|t| members::list(t, &query)).await))
}

pub async fn show(
    State(app): State<AppState>,
    actor: Actor,
    ApiPath(id): ApiPath<MemberId>,
) -> ApiResult<Data<Member>> {
    app.authorize(&actor, Permission::MembersView).await?;
    let member = app.read(|t| members::get(t, id).cloned()).await?;
    Ok(Data(member))
}

pub async fn create(
    State(app): State<AppState>,
    actor: Actor,
    ApiJson(fields): ApiJson<MemberFields>,
) -> ApiResult<Created<Member>> {
    app.authorize(&actor, Permission::MembersEdit).await?;
    let member = app
        .transact(|t| members::create(t, fields, Utc::now()))
        .await?;
    Ok(Created(member))
}

pub async fn update(
    State(app): State<AppState>,
    actor: Actor,
    ApiPath(id): ApiPath<MemberId>,
    ApiJson(fields): ApiJson<MemberFields>,
) -> ApiResult<Data<Member>> {
    app.authorize(&actor, Permission::MembersEdit).await?;
    let member = app
        .transact(|t| members::update(t, id, fields, Utc::now()))
        .await?;
    Ok(Data(member))
}

/// Deletes a member along with their passenger, VS and roster entries.
pub async fn delete(
    State(app): State<AppState>,
    actor: Actor,
    ApiPath(id): ApiPath<MemberId>,
) -> ApiResult<Data<MemberRemoval>> {
    app.authorize(&actor, Permission::MembersDelete).await?;
    let removal = app.transact(|t| members::delete(t, id, &actor.name)).await?;
    Ok(Data(removal))
}
