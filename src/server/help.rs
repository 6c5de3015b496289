//! `/api/help` routes. Unpublished articles are only visible to editors.

use axum::extract::State;
use chrono::Utc;

use super::AppState;
use super::auth::Actor;
use super::error::{ApiJson, ApiPath, ApiQuery, ApiResult, Created, Data};
use crate::ops::help::{self, HelpFields, HelpQuery};
use crate::permissions::Permission;
use crate::types::HelpArticle;

pub async fn list(
    State(app): State<AppState>,
    actor: Actor,
    ApiQuery(query): ApiQuery<HelpQuery>,
) -> ApiResult<Data<Vec<HelpArticle>>> {
    app.authorize(&actor, Permission::HelpView).await?;
    let drafts = app.allows(&actor, Permission::HelpEdit).await;
    Ok(Data(app.read(|t| help::list(t, &query, drafts)).await))
}

pub async fn show(
    State(app): State<AppState>,
    actor: Actor,
    ApiPath(slug): ApiPath<String>,
) -> ApiResult<Data<HelpArticle>> {
    app.authorize(&actor, Permission::HelpView).await?;
    let drafts = app.allows(&actor, Permission::HelpEdit).await;
    Ok(Data(
        app.read(|t| help::get(t, &slug, drafts).cloned()).await?,
    ))
}

pub async fn create(
    State(app): State<AppState>,
    actor: Actor,
    ApiJson(fields): ApiJson<HelpFields>,
) -> ApiResult<Created<HelpArticle>> {
    app.authorize(&actor, Permission::HelpEdit).await?;
    Ok(Created(
        app.transact(|t| help::create(t, fields, Utc::now())).await?,
    ))
}

pub async fn update(
    State(app): State<AppState>,
    actor: Actor,
    ApiPath(slug): ApiPath<String>,
    ApiJson(fields): ApiJson<HelpFields>,
) -> ApiResult<Data<HelpArticle>> {
    app.authorize(&actor, Permission::HelpEdit).await?;
    Ok(Data(
        app.transact(|t| help::update(t, &slug, fields, Utc::now()))
            .await?,
    ))
}

pub async fn delete(
    State(app): State<AppState>,
    actor: Actor,
    ApiPath(slug): ApiPath<String>,
) -> ApiResult<Data<HelpArticle>> {
    app.authorize(&actor, Permission::HelpEdit).await?;
    Ok(Data(app.transact(|t| help::delete(t, &slug)).await?))
}
