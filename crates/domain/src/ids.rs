use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim())
                    .map(Self)
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", s, e)))
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$name> for Uuid {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

// Open sheet tabs
define_id!(TabId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_id_round_trips_through_display() {
        let id = TabId::new();
        let parsed: TabId = id.to_string().parse().expect("valid uuid");
        assert_eq!(parsed, id);
    }

    #[test]
    fn tab_id_rejects_garbage() {
        let err = "tab-1".parse::<TabId>().unwrap_err();
        assert!(matches!(err, DomainError::InvalidId(_)));
    }

    #[test]
    fn tab_id_serializes_as_plain_string() {
        let uuid = Uuid::nil();
        let json = serde_json::to_string(&TabId::from_uuid(uuid)).expect("serialize");
        assert_eq!(json, format!("\"{}\"", uuid));
    }
}
