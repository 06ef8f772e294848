//! Tamer sheet data.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::DomainError;
use crate::sheets::FormulaRevision;
use crate::types::lenient::{lenient, text};
use crate::types::NumberField;

// =============================================================================
// Keys
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AttributeKey {
    #[serde(rename = "AGI")]
    Agi,
    #[serde(rename = "BOD")]
    Bod,
    #[serde(rename = "CHA")]
    Cha,
    #[serde(rename = "INT")]
    Int,
    #[serde(rename = "WIL")]
    Wil,
}

impl AttributeKey {
    pub const ALL: [AttributeKey; 5] = [
        AttributeKey::Agi,
        AttributeKey::Bod,
        AttributeKey::Cha,
        AttributeKey::Int,
        AttributeKey::Wil,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeKey::Agi => "AGI",
            AttributeKey::Bod => "BOD",
            AttributeKey::Cha => "CHA",
            AttributeKey::Int => "INT",
            AttributeKey::Wil => "WIL",
        }
    }

    /// Skills every Tamer has under this attribute. The suffix names the
    /// attribute the skill pairs with.
    pub fn default_skills(&self) -> &'static [&'static str] {
        match self {
            AttributeKey::Agi => &["Evade_WIL", "Precision_INT", "Stealth_BOD"],
            AttributeKey::Bod => &["Athletics_AGI", "Endurance_WIL", "Feats_of_Strength_CHA"],
            AttributeKey::Cha => &["Manipulate_BOD", "Perform_AGI", "Persuasion_INT"],
            AttributeKey::Int => &["Decipher_Intent_CHA", "Survival_WIL", "Knowledge"],
            AttributeKey::Wil => &["Bravery_BOD", "Fortitude_INT", "Awareness_AGI"],
        }
    }
}

impl fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttributeKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AttributeKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| DomainError::parse(format!("Unknown attribute: {}", s)))
    }
}

/// Counters on the milestone tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MilestoneKey {
    Qualities,
    Acc,
    Dod,
    Dam,
    Arm,
    Hp,
}

impl MilestoneKey {
    pub const ALL: [MilestoneKey; 6] = [
        MilestoneKey::Qualities,
        MilestoneKey::Acc,
        MilestoneKey::Dod,
        MilestoneKey::Dam,
        MilestoneKey::Arm,
        MilestoneKey::Hp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MilestoneKey::Qualities => "Qualities",
            MilestoneKey::Acc => "ACC",
            MilestoneKey::Dod => "DOD",
            MilestoneKey::Dam => "DAM",
            MilestoneKey::Arm => "ARM",
            MilestoneKey::Hp => "HP",
        }
    }
}

impl fmt::Display for MilestoneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MilestoneKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MilestoneKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| DomainError::parse(format!("Unknown milestone: {}", s)))
    }
}

// =============================================================================
// Labels
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TamerSize {
    Small,
    #[default]
    #[serde(other)]
    Medium,
}

impl FromStr for TamerSize {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Small" => Ok(TamerSize::Small),
            "Medium" => Ok(TamerSize::Medium),
            _ => Err(DomainError::parse(format!("Unknown Tamer size: {}", s))),
        }
    }
}

/// Which skill a Tamer rolls for movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Speed {
    #[default]
    Agility,
    Athletics,
}

impl FromStr for Speed {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Agility" => Ok(Speed::Agility),
            "Athletics" => Ok(Speed::Athletics),
            _ => Err(DomainError::parse(format!("Unknown speed: {}", s))),
        }
    }
}

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TamerMeta {
    #[serde(deserialize_with = "text")]
    pub name: String,
    #[serde(deserialize_with = "lenient")]
    pub size: TamerSize,
    pub age: NumberField,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TamerCombat {
    pub wounds: NumberField,
    pub current_wounds: NumberField,
    pub inspiration: NumberField,
    pub milestones: NumberField,
    #[serde(deserialize_with = "lenient")]
    pub speed: Speed,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeAllocation {
    pub dp: NumberField,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Attributes {
    #[serde(rename = "AGI", deserialize_with = "lenient")]
    pub agi: AttributeAllocation,
    #[serde(rename = "BOD", deserialize_with = "lenient")]
    pub bod: AttributeAllocation,
    #[serde(rename = "CHA", deserialize_with = "lenient")]
    pub cha: AttributeAllocation,
    #[serde(rename = "INT", deserialize_with = "lenient")]
    pub int: AttributeAllocation,
    #[serde(rename = "WIL", deserialize_with = "lenient")]
    pub wil: AttributeAllocation,
}

impl Attributes {
    pub fn get(&self, key: AttributeKey) -> &AttributeAllocation {
        match key {
            AttributeKey::Agi => &self.agi,
            AttributeKey::Bod => &self.bod,
            AttributeKey::Cha => &self.cha,
            AttributeKey::Int => &self.int,
            AttributeKey::Wil => &self.wil,
        }
    }

    pub fn get_mut(&mut self, key: AttributeKey) -> &mut AttributeAllocation {
        match key {
            AttributeKey::Agi => &mut self.agi,
            AttributeKey::Bod => &mut self.bod,
            AttributeKey::Cha => &mut self.cha,
            AttributeKey::Int => &mut self.int,
            AttributeKey::Wil => &mut self.wil,
        }
    }
}

/// Skill ranks grouped by governing attribute. Custom skill names are kept
/// alongside the defaults.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Skills(BTreeMap<AttributeKey, BTreeMap<String, NumberField>>);

impl Default for Skills {
    fn default() -> Self {
        let mut skills = Skills(BTreeMap::new());
        skills.fill_defaults();
        skills
    }
}

impl Skills {
    /// A missing skill reads as 0.
    pub fn get(&self, attribute: AttributeKey, name: &str) -> NumberField {
        self.0
            .get(&attribute)
            .and_then(|group| group.get(name))
            .copied()
            .unwrap_or(NumberField::ZERO)
    }

    pub fn set(&mut self, attribute: AttributeKey, name: &str, value: NumberField) {
        self.0
            .entry(attribute)
            .or_default()
            .insert(name.to_string(), value);
    }

    pub fn group(
        &self,
        attribute: AttributeKey,
    ) -> impl Iterator<Item = (&str, NumberField)> + '_ {
        self.0
            .get(&attribute)
            .into_iter()
            .flat_map(|group| group.iter().map(|(name, rank)| (name.as_str(), *rank)))
    }

    fn fill_defaults(&mut self) {
        for attribute in AttributeKey::ALL {
            let group = self.0.entry(attribute).or_default();
            for name in attribute.default_skills() {
                group.entry((*name).to_string()).or_insert(NumberField::ZERO);
            }
        }
    }
}

impl<'de> Deserialize<'de> for Skills {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut skills = BTreeMap::new();
        if let Value::Object(groups) = Value::deserialize(deserializer)? {
            for (attribute, group) in groups {
                let (Ok(attribute), Value::Object(ranks)) = (attribute.parse::<AttributeKey>(), group)
                else {
                    continue;
                };
                let ranks = ranks
                    .iter()
                    .map(|(name, rank)| (name.clone(), NumberField::from_json(rank)))
                    .collect();
                skills.insert(attribute, ranks);
            }
        }
        Ok(Skills(skills))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Aspect {
    #[serde(deserialize_with = "text")]
    pub name: String,
    #[serde(deserialize_with = "text")]
    pub desc: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Aspects {
    #[serde(deserialize_with = "lenient")]
    pub major: Aspect,
    #[serde(deserialize_with = "lenient")]
    pub minor: Aspect,
}

pub const TORMENT_BOXES: usize = 10;

/// Number of states a torment box cycles through.
const TORMENT_STATES: u8 = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Torments {
    #[serde(deserialize_with = "torment_marks")]
    pub marks: Vec<u8>,
    #[serde(deserialize_with = "text")]
    pub desc: String,
}

impl Default for Torments {
    fn default() -> Self {
        Self {
            marks: vec![0; TORMENT_BOXES],
            desc: String::new(),
        }
    }
}

impl Torments {
    fn normalize(&mut self) {
        self.marks.resize(TORMENT_BOXES, 0);
        for mark in &mut self.marks {
            *mark = (*mark).min(TORMENT_STATES - 1);
        }
    }

    /// Advances one box 0 → 1 → 2 → 0 and returns its new mark.
    pub fn cycle(&mut self, index: usize) -> Result<u8, DomainError> {
        self.normalize();
        let mark = self
            .marks
            .get_mut(index)
            .ok_or_else(|| DomainError::not_found("Torment box", index.to_string()))?;
        *mark = (*mark + 1) % TORMENT_STATES;
        Ok(*mark)
    }
}

fn torment_marks<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    let marks = match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .iter()
            .map(|item| {
                NumberField::from_json(item).value().clamp(0, i32::from(TORMENT_STATES - 1)) as u8
            })
            .collect(),
        _ => vec![0; TORMENT_BOXES],
    };
    Ok(marks)
}

pub const MILESTONE_MAX: i32 = 99;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Milestones {
    #[serde(rename = "Qualities")]
    pub qualities: NumberField,
    #[serde(rename = "ACC")]
    pub acc: NumberField,
    #[serde(rename = "DOD")]
    pub dod: NumberField,
    #[serde(rename = "DAM")]
    pub dam: NumberField,
    #[serde(rename = "ARM")]
    pub arm: NumberField,
    #[serde(rename = "HP")]
    pub hp: NumberField,
}

impl Milestones {
    pub fn get(&self, key: MilestoneKey) -> NumberField {
        match key {
            MilestoneKey::Qualities => self.qualities,
            MilestoneKey::Acc => self.acc,
            MilestoneKey::Dod => self.dod,
            MilestoneKey::Dam => self.dam,
            MilestoneKey::Arm => self.arm,
            MilestoneKey::Hp => self.hp,
        }
    }

    pub fn get_mut(&mut self, key: MilestoneKey) -> &mut NumberField {
        match key {
            MilestoneKey::Qualities => &mut self.qualities,
            MilestoneKey::Acc => &mut self.acc,
            MilestoneKey::Dod => &mut self.dod,
            MilestoneKey::Dam => &mut self.dam,
            MilestoneKey::Arm => &mut self.arm,
            MilestoneKey::Hp => &mut self.hp,
        }
    }
}

/// Unlocked order ids as last computed, e.g. `["INT-5"]`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecialOrderCache {
    #[serde(deserialize_with = "lenient")]
    pub available: Vec<String>,
}

// =============================================================================
// Sheet
// =============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TamerSheet {
    #[serde(deserialize_with = "lenient")]
    pub meta: TamerMeta,
    #[serde(deserialize_with = "lenient")]
    pub combat: TamerCombat,
    #[serde(deserialize_with = "lenient")]
    pub attributes: Attributes,
    pub skills: Skills,
    #[serde(deserialize_with = "lenient")]
    pub aspects: Aspects,
    #[serde(deserialize_with = "lenient")]
    pub torments: Torments,
    #[serde(deserialize_with = "text")]
    pub talents: String,
    #[serde(deserialize_with = "lenient")]
    pub milestones: Milestones,
    #[serde(deserialize_with = "lenient")]
    pub special_orders: SpecialOrderCache,
    #[serde(deserialize_with = "lenient")]
    pub formula_revision: FormulaRevision,
}

impl TamerSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pads the torment track and restores default skills. Idempotent.
    pub fn normalize(&mut self) {
        self.torments.normalize();
        self.skills.fill_defaults();
    }

    pub fn cycle_torment(&mut self, index: usize) -> Result<u8, DomainError> {
        self.torments.cycle(index)
    }
}
