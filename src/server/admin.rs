//! `/api/admin` routes: the permission table, bulk import and export.

use std::collections::{BTreeMap, BTreeSet};

use axum::extract::{Multipart, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info};

use super::AppState;
use super::auth::Actor;
use super::error::{ApiError, ApiJson, ApiQuery, ApiResult, Data};
use crate::import::{self, ImportReport, ImportRequest};
use crate::permissions::{Permission, Role};
use crate::store::AuditPayload;
use crate::types::{DataKind, FileFormat, ImportLog};

type Grants = BTreeMap<Role, BTreeSet<Permission>>;

pub async fn permissions(State(app): State<AppState>, actor: Actor) -> ApiResult<Data<Grants>> {
    app.authorize(&actor, Permission::PermissionsEdit).await?;
    Ok(Data(app.read(|t| t.permissions.effective()).await))
}

/// Replaces the grants of the roles present in the body.
pub async fn update_permissions(
    State(app): State<AppState>,
    actor: Actor,
    ApiJson(changes): ApiJson<Grants>,
) -> ApiResult<Data<Grants>> {
    app.authorize(&actor, Permission::PermissionsEdit).await?;
    let grants = app
        .store()
        .write()
        .await
        .mutate(|t| {
            t.permissions.update(changes);
            t.audit(AuditPayload::PermissionsUpdated {
                actor: actor.name.clone(),
            });
            t.permissions.effective()
        })?;
    info!(actor = %actor.name, "Permissions updated");
    Ok(Data(grants))
}

pub async fn import_history(
    State(app): State<AppState>,
    actor: Actor,
) -> ApiResult<Data<Vec<ImportLog>>> {
    app.authorize(&actor, Permission::ImportRun).await?;
    Ok(Data(app.read(import::history).await))
}

/// Accepts a multipart form with `type`, `file` and an optional `format`.
///
/// Without `format` the file extension decides. A file that cannot be read
/// at all is a 400; rejected rows are listed in the report instead.
pub async fn run_import(
    State(app): State<AppState>,
    actor: Actor,
    mut multipart: Multipart,
) -> ApiResult<Data<ImportReport>> {
    app.authorize(&actor, Permission::ImportRun).await?;

    let mut kind = None;
    let mut format = None;
    let mut file = None;
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("type") => kind = Some(parse_field::<DataKind>(&field.text().await?)?),
            Some("format") => format = Some(parse_field::<FileFormat>(&field.text().await?)?),
            Some("file") => {
                let file_name = field.file_name().map(str::to_string);
                file = Some((file_name, field.bytes().await?));
            }
            other => debug!(field = ?other, "Ignoring unknown form field"),
        }
    }

    let kind = kind.ok_or_else(|| ApiError::bad_request("missing form field: type"))?;
    let (file_name, bytes) = file.ok_or_else(|| ApiError::bad_request("missing form field: file"))?;
    let format = format
        .or_else(|| file_name.as_deref().and_then(FileFormat::from_file_name))
        .ok_or_else(|| ApiError::bad_request("cannot tell the file format; pass format=csv|json"))?;

    let rows = import::parse_rows(format, &bytes)?;
    let request = ImportRequest {
        kind,
        format,
        file_name,
        actor: actor.name,
    };
    let report = app
        .store()
        .write()
        .await
        .mutate(|t| import::apply_rows(t, &request, rows, Utc::now()))?;
    Ok(Data(report))
}

fn parse_field<T: std::str::FromStr<Err = String>>(text: &str) -> ApiResult<T> {
    text.parse().map_err(ApiError::BadRequest)
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    #[serde(rename = "type")]
    kind: DataKind,
    format: Option<FileFormat>,
}

/// Streams a download with a `Content-Disposition: attachment` header.
pub async fn export(
    State(app): State<AppState>,
    actor: Actor,
    ApiQuery(query): ApiQuery<ExportQuery>,
) -> ApiResult<Response> {
    app.authorize(&actor, Permission::ExportRun).await?;
    let format = query.format.unwrap_or(FileFormat::Csv);

    let mut store = app.store().write().await;
    let file = import::export(store.tables(), query.kind, format, Utc::now())?;
    store.record(AuditPayload::Export {
        kind: query.kind,
        format,
        actor: actor.name.clone(),
        rows: file.rows,
    })?;
    drop(store);

    info!(actor = %actor.name, kind = %query.kind, rows = file.rows, "Export served");
    let disposition = format!("attachment; filename=\"{}\"", file.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.body,
    )
        .into_response())
}
