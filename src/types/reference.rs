//! Reference catalog entries (specialties, ranks, event types, tags).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ids::ReferenceId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReferenceCategory {
    Specialty,
    Role,
    EventType,
    Tag,
}

impl ReferenceCategory {
    pub const ALL: [ReferenceCategory; 4] = [
        ReferenceCategory::Specialty,
        ReferenceCategory::Role,
        ReferenceCategory::EventType,
        ReferenceCategory::Tag,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceCategory::Specialty => "specialty",
            ReferenceCategory::Role => "role",
            ReferenceCategory::EventType => "eventType",
            ReferenceCategory::Tag => "tag",
        }
    }
}

impl fmt::Display for ReferenceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReferenceCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown reference category: {s}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceItem {
    pub id: ReferenceId,
    pub category: ReferenceCategory,

    /// Stable key stored on other rows; unique within a category.
    pub key: String,

    pub label: String,

    /// `#RRGGBB`.
    pub color: String,

    pub sort_order: i32,
    pub active: bool,
}

/// Returns true for `#RRGGBB` hex colors.
pub fn is_valid_color(color: &str) -> bool {
    color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_round_trips_through_str() {
        for c in ReferenceCategory::ALL {
            assert_eq!(c.as_str().parse::<ReferenceCategory>().unwrap(), c);
            assert_eq!(
                serde_json::to_string(&c).unwrap(),
                format!("\"{}\"", c.as_str())
            );
        }
        assert!("colour".parse::<ReferenceCategory>().is_err());
    }

    #[test]
    fn color_validation() {
        assert!(is_valid_color("#1a2B3c"));
        assert!(!is_valid_color("1a2b3c"));
        assert!(!is_valid_color("#12345"));
        assert!(!is_valid_color("#12345g"));
    }
}
