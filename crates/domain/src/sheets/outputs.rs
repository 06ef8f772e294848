use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::digimon::{DerivedKey, MiscKey, StatKey};
use super::tamer::AttributeKey;
use crate::error::DomainError;

/// Identifies one displayed total. `Display` gives the key display targets
/// are bound to, e.g. `stat:ACC` or `combat:woundTotal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OutputKey {
    Stat(StatKey),
    Derived(DerivedKey),
    Misc(MiscKey),
    WoundTotal,
    BatteryTotal,
    StatDp,
    SpentDp,
    TotalDp,
    Attribute(AttributeKey),
    CombatWoundTotal,
    CombatInspireTotal,
}

impl fmt::Display for OutputKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputKey::Stat(key) => write!(f, "stat:{}", key),
            OutputKey::Derived(key) => write!(f, "derived:{}", key),
            OutputKey::Misc(key) => write!(f, "misc:{}", key),
            OutputKey::WoundTotal => f.write_str("woundTotal"),
            OutputKey::BatteryTotal => f.write_str("batteryTotal"),
            OutputKey::StatDp => f.write_str("statDP"),
            OutputKey::SpentDp => f.write_str("spentDP"),
            OutputKey::TotalDp => f.write_str("totalDP"),
            OutputKey::Attribute(key) => write!(f, "attr:{}", key),
            OutputKey::CombatWoundTotal => f.write_str("combat:woundTotal"),
            OutputKey::CombatInspireTotal => f.write_str("combat:inspireTotal"),
        }
    }
}

impl FromStr for OutputKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = match s {
            "woundTotal" => OutputKey::WoundTotal,
            "batteryTotal" => OutputKey::BatteryTotal,
            "statDP" => OutputKey::StatDp,
            "spentDP" => OutputKey::SpentDp,
            "totalDP" => OutputKey::TotalDp,
            "combat:woundTotal" => OutputKey::CombatWoundTotal,
            "combat:inspireTotal" => OutputKey::CombatInspireTotal,
            _ => match s.split_once(':') {
                Some(("stat", name)) => OutputKey::Stat(name.parse()?),
                Some(("derived", name)) => OutputKey::Derived(name.parse()?),
                Some(("misc", name)) => OutputKey::Misc(name.parse()?),
                Some(("attr", name)) => OutputKey::Attribute(name.parse()?),
                _ => return Err(DomainError::parse(format!("Unknown output key: {}", s))),
            },
        };
        Ok(key)
    }
}

/// Flat map of every derived output of one compute pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComputedValues {
    values: BTreeMap<OutputKey, i32>,
}

impl ComputedValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: OutputKey, value: i32) {
        self.values.insert(key, value);
    }

    pub fn get(&self, key: OutputKey) -> Option<i32> {
        self.values.get(&key).copied()
    }

    /// Looks up a value by its display key, e.g. `"derived:BIT"`.
    pub fn get_by_name(&self, name: &str) -> Option<i32> {
        name.parse().ok().and_then(|key| self.get(key))
    }

    pub fn iter(&self) -> impl Iterator<Item = (OutputKey, i32)> + '_ {
        self.values.iter().map(|(key, value)| (*key, *value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for ComputedValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (key, value) in &self.values {
            map.serialize_entry(&key.to_string(), value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_keys_match_binding_names() {
        assert_eq!(OutputKey::Stat(StatKey::Acc).to_string(), "stat:ACC");
        assert_eq!(OutputKey::Derived(DerivedKey::Bit).to_string(), "derived:BIT");
        assert_eq!(OutputKey::Misc(MiscKey::MaxRange).to_string(), "misc:MaxRange");
        assert_eq!(OutputKey::Attribute(AttributeKey::Agi).to_string(), "attr:AGI");
        assert_eq!(OutputKey::StatDp.to_string(), "statDP");
        assert_eq!(
            OutputKey::CombatInspireTotal.to_string(),
            "combat:inspireTotal"
        );
    }

    #[test]
    fn keys_parse_back() {
        for name in ["stat:HP", "derived:CPU", "misc:Resist", "attr:WIL", "totalDP"] {
            let key: OutputKey = name.parse().unwrap();
            assert_eq!(key.to_string(), name);
        }
        assert!("stat:XYZ".parse::<OutputKey>().is_err());
        assert!("health".parse::<OutputKey>().is_err());
    }

    #[test]
    fn serializes_with_string_keys() {
        let mut values = ComputedValues::new();
        values.insert(OutputKey::Stat(StatKey::Acc), 2);
        values.insert(OutputKey::WoundTotal, 5);
        let json = serde_json::to_value(&values).unwrap();
        assert_eq!(json["stat:ACC"], 2);
        assert_eq!(json["woundTotal"], 5);
        assert_eq!(values.get_by_name("woundTotal"), Some(5));
    }
}
