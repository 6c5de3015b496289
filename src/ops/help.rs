//! Help article operations.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{OpError, OpResult, clean, clean_tags, required};
use crate::store::Tables;
use crate::types::HelpArticle;
use crate::types::help::is_valid_slug;

const DEFAULT_CATEGORY: &str = "general";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelpFields {
    pub slug: Option<String>,
    pub title: Option<String>,
    pub category: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub published: Option<bool>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelpQuery {
    pub category: Option<String>,
    pub q: Option<String>,
}

/// Lists articles grouped by category, then by sort order.
///
/// Drafts are only included when `include_drafts` is set.
pub fn list(tables: &Tables, query: &HelpQuery, include_drafts: bool) -> Vec<HelpArticle> {
    let mut articles: Vec<HelpArticle> = tables
        .help_articles
        .values()
        .filter(|a| include_drafts || a.published)
        .filter(|a| {
            query
                .category
                .as_deref()
                .is_none_or(|c| a.category.eq_ignore_ascii_case(c))
        })
        .filter(|a| query.q.as_deref().is_none_or(|q| a.matches(q)))
        .cloned()
        .collect();
    articles.sort_by(|a, b| {
        (&a.category, a.sort_order, &a.title).cmp(&(&b.category, b.sort_order, &b.title))
    });
    articles
}

pub fn get<'a>(tables: &'a Tables, slug: &str, include_drafts: bool) -> OpResult<&'a HelpArticle> {
    tables
        .help_articles
        .find(|a| a.slug == slug && (include_drafts || a.published))
        .ok_or_else(|| OpError::not_found("help article", slug))
}

pub fn create(
    tables: &mut Tables,
    fields: HelpFields,
    now: DateTime<Utc>,
) -> OpResult<HelpArticle> {
    let slug = required(fields.slug, "slug")?;
    check_slug(tables, &slug, None)?;
    let title = required(fields.title, "title")?;

    let article = tables.help_articles.insert_with(|id| HelpArticle {
        id,
        slug,
        title,
        category: clean(fields.category).unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        content: fields.content.unwrap_or_default(),
        tags: clean_tags(fields.tags.unwrap_or_default()),
        published: fields.published.unwrap_or(false),
        sort_order: fields.sort_order.unwrap_or(0),
        created_at: now,
        updated_at: now,
    });
    Ok(article.clone())
}

pub fn update(
    tables: &mut Tables,
    slug: &str,
    fields: HelpFields,
    now: DateTime<Utc>,
) -> OpResult<HelpArticle> {
    let id = get(tables, slug, true)?.id;
    let new_slug = match fields.slug {
        Some(s) => {
            let s = required(Some(s), "slug")?;
            check_slug(tables, &s, Some(slug))?;
            Some(s)
        }
        None => None,
    };

    let article = tables
        .help_articles
        .get_mut(id)
        .ok_or_else(|| OpError::not_found("help article", slug))?;
    if let Some(s) = new_slug {
        article.slug = s;
    }
    if fields.title.is_some() {
        article.title = required(fields.title, "title")?;
    }
    if fields.category.is_some() {
        article.category =
            clean(fields.category).unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
    }
    if let Some(content) = fields.content {
        article.content = content;
    }
    if let Some(tags) = fields.tags {
        article.tags = clean_tags(tags);
    }
    if let Some(published) = fields.published {
        article.published = published;
    }
    if let Some(sort_order) = fields.sort_order {
        article.sort_order = sort_order;
    }
    article.updated_at = now;
    Ok(article.clone())
}

pub fn delete(tables: &mut Tables, slug: &str) -> OpResult<HelpArticle> {
    let id = get(tables, slug, true)?.id;
    tables
        .help_articles
        .remove(id)
        .ok_or_else(|| OpError::not_found("help article", slug))
}

fn check_slug(tables: &Tables, slug: &str, current: Option<&str>) -> OpResult<()> {
    if !is_valid_slug(slug) {
        return Err(OpError::validation(format!(
            "invalid slug {slug:?}: use lowercase letters, digits and dashes"
        )));
    }
    if current != Some(slug) && tables.help_articles.find(|a| a.slug == slug).is_some() {
        return Err(OpError::conflict(format!("slug {slug:?} is already used")));
    }
    Ok(())
}
