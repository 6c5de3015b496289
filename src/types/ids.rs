//! Newtype wrappers for row identifiers.
//!
//! Every table hands out its own identifier type so that a `MemberId` can
//! never be passed where a `TrainInstanceId` is expected. All of them are
//! plain `u64` on the wire.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(n: u64) -> Self {
                $name(n)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map($name)
            }
        }
    };
}

row_id!(
    /// An alliance member.
    MemberId
);
row_id!(
    /// A scheduled alliance event.
    EventId
);
row_id!(
    /// One day's train.
    TrainInstanceId
);
row_id!(
    /// A VS (versus-war) week.
    VsWeekId
);
row_id!(
    /// A Desert Storm battle.
    DesertStormId
);
row_id!(
    /// A help article.
    HelpArticleId
);
row_id!(
    /// A reference catalog entry.
    ReferenceId
);
row_id!(
    /// A persisted import run.
    ImportLogId
);

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn serializes_as_bare_number(n: u64) {
            let id = MemberId(n);
            let json = serde_json::to_string(&id).unwrap();
            prop_assert_eq!(&json, &n.to_string());
            let parsed: MemberId = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(id, parsed);
        }

        #[test]
        fn parses_from_path_segment(n: u64) {
            let parsed: TrainInstanceId = n.to_string().parse().unwrap();
            prop_assert_eq!(parsed, TrainInstanceId(n));
        }
    }

    #[test]
    fn rejects_non_numeric() {
        assert!("abc".parse::<EventId>().is_err());
        assert!("".parse::<EventId>().is_err());
    }

    #[test]
    fn converts_to_and_from_u64() {
        let id = VsWeekId::from(7u64);
        assert_eq!(u64::from(id), 7);
        assert_eq!(id.to_string(), "7");
    }
}
