//! `/api/reference` routes for the role, specialty, tag and event-type
//! catalogs.

use axum::extract::State;

use super::AppState;
use super::auth::Actor;
use super::error::{ApiJson, ApiPath, ApiQuery, ApiResult, Created, Data};
use crate::ops::reference::{self, ReferenceFields, ReferenceQuery, ReorderRequest};
use crate::permissions::Permission;
use crate::types::{ReferenceId, ReferenceItem};

pub async fn list(
    State(app): State<AppState>,
    actor: Actor,
    ApiQuery(query): ApiQuery<ReferenceQuery>,
) -> ApiResult<Data<Vec<ReferenceItem>>> {
    app.authorize(&actor, Permission::ReferenceView).await?;
    Ok(Data(app.read(|t| reference::list(t, &query)).await))
}

pub async fn create(
    State(app): State<AppState>,
    actor: Actor,
    ApiJson(fields): ApiJson<ReferenceFields>,
) -> ApiResult<Created<ReferenceItem>> {
    app.authorize(&actor, Permission::ReferenceEdit).await?;
    Ok(Created(app.transact(|t| reference::create(t, fields)).await?))
}

pub async fn update(
    State(app): State<AppState>,
    actor: Actor,
    ApiPath(id): ApiPath<ReferenceId>,
    ApiJson(fields): ApiJson<ReferenceFields>,
) -> ApiResult<Data<ReferenceItem>> {
    app.authorize(&actor, Permission::ReferenceEdit).await?;
    Ok(Data(
        app.transact(|t| reference::update(t, id, fields)).await?,
    ))
}

pub async fn delete(
    State(app): State<AppState>,
    actor: Actor,
    ApiPath(id): ApiPath<ReferenceId>,
) -> ApiResult<Data<ReferenceItem>> {
    app.authorize(&actor, Permission::ReferenceEdit).await?;
    Ok(Data(app.transact(|t| reference::delete(t, id)).await?))
}

/// Rewrites the order of one category in a single transaction.
pub async fn reorder(
    State(app): State<AppState>,
    actor: Actor,
    ApiJson(request): ApiJson<ReorderRequest>,
) -> ApiResult<Data<Vec<ReferenceItem>>> {
    app.authorize(&actor, Permission::ReferenceEdit).await?;
    Ok(Data(
        app.transact(|t| reference::reorder(t, request.category, &request.ids))
            .await?,
    ))
}
