//! Reference catalog: the keys, labels and colors behind every selector.

use std::collections::HashSet;

use serde::Deserialize;

use super::{OpError, OpResult, required};
use crate::store::Tables;
use crate::types::reference::is_valid_color;
use crate::types::{ReferenceCategory, ReferenceId, ReferenceItem};

const DEFAULT_COLOR: &str = "#6b7280";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceFields {
    pub category: Option<ReferenceCategory>,
    pub key: Option<String>,
    pub label: Option<String>,
    pub color: Option<String>,
    pub sort_order: Option<i32>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceQuery {
    pub category: Option<ReferenceCategory>,
    #[serde(default)]
    pub include_inactive: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    pub category: ReferenceCategory,
    pub ids: Vec<ReferenceId>,
}

/// Lists items by category, then sort order.
pub fn list(tables: &Tables, query: &ReferenceQuery) -> Vec<ReferenceItem> {
    let mut items: Vec<ReferenceItem> = tables
        .reference
        .values()
        .filter(|i| query.category.is_none_or(|c| i.category == c))
        .filter(|i| query.include_inactive || i.active)
        .cloned()
        .collect();
    items.sort_by_key(|i| (i.category, i.sort_order, i.id));
    items
}

pub fn create(tables: &mut Tables, fields: ReferenceFields) -> OpResult<ReferenceItem> {
    let category = fields
        .category
        .ok_or_else(|| OpError::validation("category is required"))?;
    let key = required(fields.key, "key")?;
    ensure_key_free(tables, category, &key, None)?;
    let label = match fields.label {
        Some(label) => required(Some(label), "label")?,
        None => key.clone(),
    };
    let color = checked_color(fields.color)?.unwrap_or_else(|| DEFAULT_COLOR.to_string());
    let sort_order = match fields.sort_order {
        Some(n) => n,
        None => tables
            .reference
            .values()
            .filter(|i| i.category == category)
            .map(|i| i.sort_order + 1)
            .max()
            .unwrap_or(0),
    };

    let item = tables.reference.insert_with(|id| ReferenceItem {
        id,
        category,
        key,
        label,
        color,
        sort_order,
        active: fields.active.unwrap_or(true),
    });
    Ok(item.clone())
}

pub fn update(
    tables: &mut Tables,
    id: ReferenceId,
    fields: ReferenceFields,
) -> OpResult<ReferenceItem> {
    let existing = tables
        .reference
        .get(id)
        .ok_or_else(|| OpError::not_found("reference item", id))?;
    let category = fields.category.unwrap_or(existing.category);
    let key = match fields.key {
        Some(k) => required(Some(k), "key")?,
        None => existing.key.clone(),
    };
    ensure_key_free(tables, category, &key, Some(id))?;
    let color = checked_color(fields.color)?;

    let item = tables
        .reference
        .get_mut(id)
        .ok_or_else(|| OpError::not_found("reference item", id))?;
    item.category = category;
    item.key = key;
    if fields.label.is_some() {
        item.label = required(fields.label, "label")?;
    }
    if let Some(color) = color {
        item.color = color;
    }
    if let Some(sort_order) = fields.sort_order {
        item.sort_order = sort_order;
    }
    if let Some(active) = fields.active {
        item.active = active;
    }
    Ok(item.clone())
}

pub fn delete(tables: &mut Tables, id: ReferenceId) -> OpResult<ReferenceItem> {
    tables
        .reference
        .remove(id)
        .ok_or_else(|| OpError::not_found("reference item", id))
}

/// Rewrites the sort order of a whole category.
///
/// `ids` must list every item of the category exactly once; otherwise
/// nothing changes.
pub fn reorder(
    tables: &mut Tables,
    category: ReferenceCategory,
    ids: &[ReferenceId],
) -> OpResult<Vec<ReferenceItem>> {
    let members: HashSet<ReferenceId> = tables
        .reference
        .values()
        .filter(|i| i.category == category)
        .map(|i| i.id)
        .collect();
    let given: HashSet<ReferenceId> = ids.iter().copied().collect();

    if given.len() != ids.len() {
        return Err(OpError::validation("reorder lists an item more than once"));
    }
    if given != members {
        return Err(OpError::validation(format!(
            "reorder must list all {} items of category {category} exactly once",
            members.len()
        )));
    }

    for (position, id) in ids.iter().enumerate() {
        if let Some(item) = tables.reference.get_mut(*id) {
            item.sort_order = position as i32;
        }
    }
    Ok(list(
        tables,
        &ReferenceQuery {
            category: Some(category),
            include_inactive: true,
        },
    ))
}

fn checked_color(color: Option<String>) -> OpResult<Option<String>> {
    match color.map(|c| c.trim().to_string()) {
        Some(c) if !is_valid_color(&c) => Err(OpError::validation(format!(
            "invalid color {c:?}: expected #RRGGBB"
        ))),
        other => Ok(other),
    }
}

fn ensure_key_free(
    tables: &Tables,
    category: ReferenceCategory,
    key: &str,
    except: Option<ReferenceId>,
) -> OpResult<()> {
    match tables
        .reference
        .find(|i| i.category == category && i.key == key)
    {
        Some(other) if Some(other.id) != except => Err(OpError::conflict(format!(
            "{category} key {key:?} already exists"
        ))),
        _ => Ok(()),
    }
}
