//! Help and documentation articles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::HelpArticleId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelpArticle {
    pub id: HelpArticleId,

    /// URL key, `[a-z0-9-]+`, unique.
    pub slug: String,

    pub title: String,
    pub category: String,

    /// Markdown body.
    pub content: String,

    pub tags: Vec<String>,
    pub published: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HelpArticle {
    /// Case-insensitive match against title, content and tags.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&needle)
            || self.content.to_lowercase().contains(&needle)
            || self.tags.iter().any(|t| t.to_lowercase().contains(&needle))
    }
}

/// Returns true if `slug` is non-empty lowercase ASCII letters, digits and dashes.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_rules() {
        assert!(is_valid_slug("getting-started"));
        assert!(is_valid_slug("vs-2"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("Getting Started"));
        assert!(!is_valid_slug("../etc"));
    }
}
