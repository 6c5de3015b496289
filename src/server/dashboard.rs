//! `GET /api/dashboard`.

use axum::extract::State;
use chrono::Utc;

use super::AppState;
use super::auth::Actor;
use super::error::{ApiResult, Data};
use crate::ops::dashboard::{self, Dashboard};
use crate::permissions::Permission;

pub async fn show(State(app): State<AppState>, actor: Actor) -> ApiResult<Data<Dashboard>> {
    app.authorize(&actor, Permission::DashboardView).await?;
    let now = Utc::now();
    Ok(Data(app.read(|t| dashboard::build(t, now)).await))
}
