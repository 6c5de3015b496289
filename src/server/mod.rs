//! HTTP API for the alliance hub.
//!
//! Every `/api` route identifies the caller from the `x-actor` and
//! `x-actor-role` headers, checks the role against the stored permission
//! table, and answers `{"data": ...}` or `{"error": "..."}`.
//!
//! # Endpoints
//!
//! - `GET /health` - liveness
//! - `GET /api/dashboard` - overview
//! - `/api/members`, `/api/events`, `/api/vs`, `/api/desert-storm`,
//!   `/api/help`, `/api/reference` - CRUD
//! - `/api/trains-v2` - daily trains, passengers, history and on-demand
//!   maintenance
//! - `/api/admin/permissions`, `/api/admin/import`, `/api/admin/export`

use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing::debug;

pub mod admin;
pub mod auth;
pub mod dashboard;
pub mod desert_storm;
pub mod error;
pub mod events;
pub mod health;
pub mod help;
pub mod members;
pub mod reference;
pub mod trains;
pub mod vs;

pub use auth::Actor;
pub use error::{ApiError, ApiResult};
pub use health::health_handler;

use crate::ops::OpResult;
use crate::permissions::Permission;
use crate::store::{SharedStore, Tables};

/// Shared application state, handed to every handler through `State`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: SharedStore,

    /// Days ahead the on-demand maintenance generates trains for.
    lookahead_days: u32,
}

impl AppState {
    pub fn new(store: SharedStore, lookahead_days: u32) -> Self {
        AppState {
            inner: Arc::new(AppStateInner {
                store,
                lookahead_days,
            }),
        }
    }

    pub fn store(&self) -> &SharedStore {
        &self.inner.store
    }

    pub fn lookahead_days(&self) -> u32 {
        self.inner.lookahead_days
    }

    /// Returns true if the actor's role holds `permission`.
    pub async fn allows(&self, actor: &Actor, permission: Permission) -> bool {
        self.store()
            .read()
            .await
            .tables()
            .permissions
            .allows(actor.role, permission)
    }

    /// Fails with 403 unless the actor's role holds `permission`.
    pub async fn authorize(&self, actor: &Actor, permission: Permission) -> ApiResult<()> {
        if self.allows(actor, permission).await {
            Ok(())
        } else {
            debug!(actor = %actor.name, role = %actor.role, %permission, "Permission denied");
            Err(ApiError::Forbidden(permission))
        }
    }

    /// Runs a read under the shared lock.
    pub async fn read<T>(&self, f: impl FnOnce(&Tables) -> T) -> T {
        f(self.store().read().await.tables())
    }

    /// Runs a domain operation as one store transaction.
    pub async fn transact<T>(&self, f: impl FnOnce(&mut Tables) -> OpResult<T>) -> ApiResult<T> {
        Ok(self.store().write().await.apply(f)?)
    }
}

/// Builds the axum Router with all endpoints.
pub fn build_router(app_state: AppState) -> axum::Router {
    use axum::routing::{delete, get, post, put};

    axum::Router::new()
        .route("/health", get(health_handler))
        .route("/api/dashboard", get(dashboard::show))
        .route("/api/members", get(members::list).post(members::create))
        .route(
            "/api/members/{id}",
            get(members::show)
                .put(members::update)
                .delete(members::delete),
        )
        .route("/api/events", get(events::list).post(events::create))
        .route(
            "/api/events/{id}",
            get(events::show).put(events::update).delete(events::delete),
        )
        .route(
            "/api/trains-v2",
            get(trains::list).post(trains::run_maintenance),
        )
        .route("/api/trains-v2/history", get(trains::history))
        .route(
            "/api/trains-v2/{id}",
            get(trains::show).patch(trains::patch),
        )
        .route("/api/trains-v2/{id}/passengers", post(trains::join))
        .route(
            "/api/trains-v2/{id}/passengers/{member_id}",
            delete(trains::leave),
        )
        .route("/api/vs", get(vs::list).post(vs::create))
        .route(
            "/api/vs/{id}",
            get(vs::show).put(vs::update).delete(vs::delete),
        )
        .route("/api/vs/{id}/days/{day}", put(vs::set_day))
        .route(
            "/api/vs/{id}/participants/{member_id}",
            put(vs::set_participant),
        )
        .route(
            "/api/desert-storm",
            get(desert_storm::list).post(desert_storm::create),
        )
        .route(
            "/api/desert-storm/{id}",
            get(desert_storm::show)
                .put(desert_storm::update)
                .delete(desert_storm::delete),
        )
        .route("/api/desert-storm/{id}/roster", put(desert_storm::set_roster))
        .route("/api/help", get(help::list).post(help::create))
        .route(
            "/api/help/{slug}",
            get(help::show).put(help::update).delete(help::delete),
        )
        .route("/api/reference", get(reference::list).post(reference::create))
        .route("/api/reference/reorder", post(reference::reorder))
        .route(
            "/api/reference/{id}",
            put(reference::update).delete(reference::delete),
        )
        .route(
            "/api/admin/permissions",
            get(admin::permissions).put(admin::update_permissions),
        )
        .route(
            "/api/admin/import",
            get(admin::import_history).post(admin::run_import),
        )
        .route("/api/admin/export", get(admin::export))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
