//! `/api/trains-v2` routes.
//!
//! Besides the per-train endpoints, `POST /api/trains-v2` runs the daily
//! maintenance bundle on demand, the same jobs the scheduler runs at night.

use axum::extract::State;
use chrono::Utc;
use tracing::info;

use super::AppState;
use super::auth::Actor;
use super::error::{ApiJson, ApiPath, ApiQuery, ApiResult, Created, Data};
use crate::ops::trains::{
    self, HistoryQuery, HistoryView, JoinRequest, TrainAction, TrainDetail, TrainQuery, TrainView,
};
use crate::permissions::Permission;
use crate::scheduler::{self, MaintenanceReport};
use crate::types::{MemberId, TrainInstanceId, TrainPassenger};

pub async fn list(
    State(app): State<AppState>,
    actor: Actor,
    ApiQuery(query): ApiQuery<TrainQuery>,
) -> ApiResult<Data<Vec<TrainView>>> {
    app.authorize(&actor, Permission::TrainsView).await?;
    Ok(Data(app.read(|t| trains::list(t, &query)).await))
}

pub async fn run_maintenance(
    State(app): State<AppState>,
    actor: Actor,
) -> ApiResult<Data<MaintenanceReport>> {
    app.authorize(&actor, Permission::TrainsManage).await?;
    let days_ahead = app.lookahead_days();
    let report = app
        .store()
        .write()
        .await
        .mutate(|t| scheduler::run_daily_maintenance(t, days_ahead, Utc::now()))?;
    info!(actor = %actor.name, ?report, "Maintenance triggered by hand");
    Ok(Data(report))
}

pub async fn show(
    State(app): State<AppState>,
    actor: Actor,
    ApiPath(id): ApiPath<TrainInstanceId>,
) -> ApiResult<Data<TrainDetail>> {
    app.authorize(&actor, Permission::TrainsView).await?;
    Ok(Data(app.read(|t| trains::detail(t, id)).await?))
}

pub async fn patch(
    State(app): State<AppState>,
    actor: Actor,
    ApiPath(id): ApiPath<TrainInstanceId>,
    ApiJson(action): ApiJson<TrainAction>,
) -> ApiResult<Data<TrainView>> {
    app.authorize(&actor, Permission::TrainsManage).await?;
    let view = app
        .transact(|t| {
            let train = trains::apply_action(t, id, action, &actor.name, Utc::now())?;
            Ok(trains::view(t, &train))
        })
        .await?;
    Ok(Data(view))
}

pub async fn join(
    State(app): State<AppState>,
    actor: Actor,
    ApiPath(id): ApiPath<TrainInstanceId>,
    ApiJson(request): ApiJson<JoinRequest>,
) -> ApiResult<Created<TrainPassenger>> {
    app.authorize(&actor, Permission::TrainsJoin).await?;
    let passenger = app
        .transact(|t| trains::join(t, id, request.member_id, &actor.name, Utc::now()))
        .await?;
    Ok(Created(passenger))
}

pub async fn leave(
    State(app): State<AppState>,
    actor: Actor,
    ApiPath((id, member_id)): ApiPath<(TrainInstanceId, MemberId)>,
) -> ApiResult<Data<TrainView>> {
    app.authorize(&actor, Permission::TrainsJoin).await?;
    let view = app
        .transact(|t| {
            trains::leave(t, id, member_id, &actor.name)?;
            let train = trains::get(t, id)?.clone();
            Ok(trains::view(t, &train))
        })
        .await?;
    Ok(Data(view))
}

pub async fn history(
    State(app): State<AppState>,
    actor: Actor,
    ApiQuery(query): ApiQuery<HistoryQuery>,
) -> ApiResult<Data<Vec<HistoryView>>> {
    app.authorize(&actor, Permission::TrainsManage).await?;
    let records = app.store().read().await.audit_records()?;
    Ok(Data(trains::history(&records, &query)))
}
