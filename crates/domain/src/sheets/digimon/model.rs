//! Digimon sheet data.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::DomainError;
use crate::sheets::FormulaRevision;
use crate::types::lenient::{lenient, text};
use crate::types::NumberField;

// =============================================================================
// Keys
// =============================================================================

/// Primary stats bought with DP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatKey {
    #[serde(rename = "ACC")]
    Acc,
    #[serde(rename = "DOD")]
    Dod,
    #[serde(rename = "DAM")]
    Dam,
    #[serde(rename = "ARM")]
    Arm,
    #[serde(rename = "HP")]
    Hp,
}

impl StatKey {
    pub const ALL: [StatKey; 5] = [
        StatKey::Acc,
        StatKey::Dod,
        StatKey::Dam,
        StatKey::Arm,
        StatKey::Hp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StatKey::Acc => "ACC",
            StatKey::Dod => "DOD",
            StatKey::Dam => "DAM",
            StatKey::Arm => "ARM",
            StatKey::Hp => "HP",
        }
    }
}

impl fmt::Display for StatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StatKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| DomainError::parse(format!("Unknown stat: {}", s)))
    }
}

/// Secondary stats, each fed by one primary stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DerivedKey {
    #[serde(rename = "BIT")]
    Bit,
    #[serde(rename = "RAM")]
    Ram,
    #[serde(rename = "DOS")]
    Dos,
    #[serde(rename = "CPU")]
    Cpu,
}

impl DerivedKey {
    pub const ALL: [DerivedKey; 4] = [
        DerivedKey::Bit,
        DerivedKey::Ram,
        DerivedKey::Dos,
        DerivedKey::Cpu,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DerivedKey::Bit => "BIT",
            DerivedKey::Ram => "RAM",
            DerivedKey::Dos => "DOS",
            DerivedKey::Cpu => "CPU",
        }
    }

    /// The primary stat whose DP feeds this derived stat.
    pub fn base_stat(&self) -> StatKey {
        match self {
            DerivedKey::Bit => StatKey::Acc,
            DerivedKey::Ram => StatKey::Dod,
            DerivedKey::Dos => StatKey::Dam,
            DerivedKey::Cpu => StatKey::Arm,
        }
    }
}

impl fmt::Display for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DerivedKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DerivedKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| DomainError::parse(format!("Unknown derived stat: {}", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MiscKey {
    Movement,
    Range,
    MaxRange,
    Initiative,
    Clash,
    Resist,
}

impl MiscKey {
    pub const ALL: [MiscKey; 6] = [
        MiscKey::Movement,
        MiscKey::Range,
        MiscKey::MaxRange,
        MiscKey::Initiative,
        MiscKey::Clash,
        MiscKey::Resist,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MiscKey::Movement => "Movement",
            MiscKey::Range => "Range",
            MiscKey::MaxRange => "MaxRange",
            MiscKey::Initiative => "Initiative",
            MiscKey::Clash => "Clash",
            MiscKey::Resist => "Resist",
        }
    }
}

impl fmt::Display for MiscKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MiscKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MiscKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| DomainError::parse(format!("Unknown misc stat: {}", s)))
    }
}

// =============================================================================
// Labels
// =============================================================================

/// Evolutionary tier. Anything unrecognized, including a missing stage,
/// reads as `Unknown` and counts as stage 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Stage {
    #[default]
    Child,
    Adult,
    Perfect,
    Ultimate,
    Unknown,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Child, Stage::Adult, Stage::Perfect, Stage::Ultimate];

    pub fn value(&self) -> i32 {
        match self {
            Stage::Child => 2,
            Stage::Adult => 3,
            Stage::Perfect => 4,
            Stage::Ultimate => 5,
            Stage::Unknown => 1,
        }
    }

    /// Exact, case-sensitive label lookup.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Child" => Stage::Child,
            "Adult" => Stage::Adult,
            "Perfect" => Stage::Perfect,
            "Ultimate" => Stage::Ultimate,
            _ => Stage::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Child => "Child",
            Stage::Adult => "Adult",
            Stage::Perfect => "Perfect",
            Stage::Ultimate => "Ultimate",
            Stage::Unknown => "Unknown",
        }
    }

    fn missing() -> Self {
        Stage::Unknown
    }
}

impl<'de> Deserialize<'de> for Stage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(label) => Stage::from_label(&label),
            _ => Stage::Unknown,
        })
    }
}

/// Size category. Parsed case-insensitively; unrecognized text is kept.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Size {
    Small,
    #[default]
    Medium,
    Large,
    Huge,
    Gigantic,
    Colossal,
    Other(String),
}

impl Size {
    pub fn from_label(label: &str) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "small" => Size::Small,
            "medium" => Size::Medium,
            "large" => Size::Large,
            "huge" => Size::Huge,
            "gigantic" => Size::Gigantic,
            "colossal" => Size::Colossal,
            _ => Size::Other(label.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Size::Small => "Small",
            Size::Medium => "Medium",
            Size::Large => "Large",
            Size::Huge => "Huge",
            Size::Gigantic => "Gigantic",
            Size::Colossal => "Colossal",
            Size::Other(label) => label,
        }
    }

    /// Derived-stat offsets granted by this size.
    pub fn bonus(&self) -> SizeBonus {
        match self {
            Size::Small | Size::Medium => SizeBonus {
                bit: 1,
                ram: 1,
                dos: 0,
                cpu: 0,
            },
            Size::Large => SizeBonus {
                bit: 1,
                ram: 0,
                dos: 0,
                cpu: 1,
            },
            Size::Huge | Size::Gigantic | Size::Colossal | Size::Other(_) => SizeBonus {
                bit: 0,
                ram: 0,
                dos: 1,
                cpu: 1,
            },
        }
    }
}

impl Serialize for Size {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Size {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(label) => Size::from_label(&label),
            other => Size::Other(other.to_string()),
        })
    }
}

/// Per-derived-stat offsets from size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SizeBonus {
    pub bit: i32,
    pub ram: i32,
    pub dos: i32,
    pub cpu: i32,
}

impl SizeBonus {
    pub fn get(&self, key: DerivedKey) -> i32 {
        match key {
            DerivedKey::Bit => self.bit,
            DerivedKey::Ram => self.ram,
            DerivedKey::Dos => self.dos,
            DerivedKey::Cpu => self.cpu,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Attribute {
    #[default]
    Vaccine,
    Data,
    Virus,
    #[serde(other)]
    Unknown,
}

impl FromStr for Attribute {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Vaccine" => Ok(Attribute::Vaccine),
            "Data" => Ok(Attribute::Data),
            "Virus" => Ok(Attribute::Virus),
            _ => Err(DomainError::parse(format!("Unknown attribute: {}", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AttackRange {
    #[default]
    Melee,
    Ranged,
}

impl FromStr for AttackRange {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Melee" => Ok(AttackRange::Melee),
            "Ranged" => Ok(AttackRange::Ranged),
            _ => Err(DomainError::parse(format!("Unknown attack range: {}", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AttackKind {
    #[default]
    Damage,
    Support,
}

impl FromStr for AttackKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Damage" => Ok(AttackKind::Damage),
            "Support" => Ok(AttackKind::Support),
            _ => Err(DomainError::parse(format!("Unknown attack type: {}", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum QualityType {
    #[default]
    Static,
    Attack,
    Trigger,
}

impl QualityType {
    pub const ALL: [QualityType; 3] = [QualityType::Attack, QualityType::Static, QualityType::Trigger];

    pub fn as_str(&self) -> &'static str {
        match self {
            QualityType::Static => "Static",
            QualityType::Attack => "Attack",
            QualityType::Trigger => "Trigger",
        }
    }
}

impl FromStr for QualityType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QualityType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| DomainError::parse(format!("Unknown quality type: {}", s)))
    }
}

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DigimonMeta {
    #[serde(deserialize_with = "text")]
    pub name: String,
    #[serde(deserialize_with = "text")]
    pub digimon: String,
    #[serde(rename = "type", deserialize_with = "text")]
    pub kind: String,
    #[serde(deserialize_with = "lenient")]
    pub attribute: Attribute,
    #[serde(default = "Stage::missing")]
    pub stage: Stage,
    pub size: Size,
}

impl Default for DigimonMeta {
    fn default() -> Self {
        Self {
            name: String::new(),
            digimon: String::new(),
            kind: String::new(),
            attribute: Attribute::Vaccine,
            stage: Stage::Child,
            size: Size::Medium,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DigimonCombat {
    pub wound_boxes: NumberField,
    pub temp_wounds: NumberField,
    pub battery_manual: NumberField,
    pub current_wounds: NumberField,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StatAllocation {
    pub dp: NumberField,
    pub bonus: NumberField,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BonusOnly {
    pub bonus: NumberField,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    #[serde(rename = "ACC", deserialize_with = "lenient")]
    pub acc: StatAllocation,
    #[serde(rename = "DOD", deserialize_with = "lenient")]
    pub dod: StatAllocation,
    #[serde(rename = "DAM", deserialize_with = "lenient")]
    pub dam: StatAllocation,
    #[serde(rename = "ARM", deserialize_with = "lenient")]
    pub arm: StatAllocation,
    #[serde(rename = "HP", deserialize_with = "lenient")]
    pub hp: StatAllocation,
}

impl Stats {
    pub fn get(&self, key: StatKey) -> &StatAllocation {
        match key {
            StatKey::Acc => &self.acc,
            StatKey::Dod => &self.dod,
            StatKey::Dam => &self.dam,
            StatKey::Arm => &self.arm,
            StatKey::Hp => &self.hp,
        }
    }

    pub fn get_mut(&mut self, key: StatKey) -> &mut StatAllocation {
        match key {
            StatKey::Acc => &mut self.acc,
            StatKey::Dod => &mut self.dod,
            StatKey::Dam => &mut self.dam,
            StatKey::Arm => &mut self.arm,
            StatKey::Hp => &mut self.hp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DerivedBonuses {
    #[serde(rename = "BIT", deserialize_with = "lenient")]
    pub bit: BonusOnly,
    #[serde(rename = "RAM", deserialize_with = "lenient")]
    pub ram: BonusOnly,
    #[serde(rename = "DOS", deserialize_with = "lenient")]
    pub dos: BonusOnly,
    #[serde(rename = "CPU", deserialize_with = "lenient")]
    pub cpu: BonusOnly,
}

impl DerivedBonuses {
    pub fn get(&self, key: DerivedKey) -> &BonusOnly {
        match key {
            DerivedKey::Bit => &self.bit,
            DerivedKey::Ram => &self.ram,
            DerivedKey::Dos => &self.dos,
            DerivedKey::Cpu => &self.cpu,
        }
    }

    pub fn get_mut(&mut self, key: DerivedKey) -> &mut BonusOnly {
        match key {
            DerivedKey::Bit => &mut self.bit,
            DerivedKey::Ram => &mut self.ram,
            DerivedKey::Dos => &mut self.dos,
            DerivedKey::Cpu => &mut self.cpu,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct MiscBonuses {
    #[serde(deserialize_with = "lenient")]
    pub movement: BonusOnly,
    #[serde(deserialize_with = "lenient")]
    pub range: BonusOnly,
    #[serde(deserialize_with = "lenient")]
    pub max_range: BonusOnly,
    #[serde(deserialize_with = "lenient")]
    pub initiative: BonusOnly,
    #[serde(deserialize_with = "lenient")]
    pub clash: BonusOnly,
    #[serde(deserialize_with = "lenient")]
    pub resist: BonusOnly,
}

impl MiscBonuses {
    pub fn get(&self, key: MiscKey) -> &BonusOnly {
        match key {
            MiscKey::Movement => &self.movement,
            MiscKey::Range => &self.range,
            MiscKey::MaxRange => &self.max_range,
            MiscKey::Initiative => &self.initiative,
            MiscKey::Clash => &self.clash,
            MiscKey::Resist => &self.resist,
        }
    }

    pub fn get_mut(&mut self, key: MiscKey) -> &mut BonusOnly {
        match key {
            MiscKey::Movement => &mut self.movement,
            MiscKey::Range => &mut self.range,
            MiscKey::MaxRange => &mut self.max_range,
            MiscKey::Initiative => &mut self.initiative,
            MiscKey::Clash => &mut self.clash,
            MiscKey::Resist => &mut self.resist,
        }
    }
}

pub const ATTACK_TAG_SLOTS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attack {
    #[serde(deserialize_with = "text")]
    pub name: String,
    #[serde(deserialize_with = "lenient")]
    pub range: AttackRange,
    #[serde(rename = "type", deserialize_with = "lenient")]
    pub kind: AttackKind,
    pub acc: NumberField,
    pub dmg: NumberField,
    #[serde(deserialize_with = "attack_tags")]
    pub tags: Vec<String>,
}

impl Default for Attack {
    fn default() -> Self {
        Self {
            name: String::new(),
            range: AttackRange::Melee,
            kind: AttackKind::Damage,
            acc: NumberField::ZERO,
            dmg: NumberField::ZERO,
            tags: vec![String::new(); ATTACK_TAG_SLOTS],
        }
    }
}

impl Attack {
    fn normalize(&mut self) {
        self.tags.resize(ATTACK_TAG_SLOTS, String::new());
    }
}

fn attack_tags<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let tags = match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(tag) => tag,
                Value::Null => String::new(),
                other => other.to_string(),
            })
            .collect(),
        _ => Vec::new(),
    };
    Ok(tags)
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DpPool {
    pub bonus: NumberField,
    /// Flat quality spend from sheets that predate the quality list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<NumberField>,
}

/// A costed ability on the sheet.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityEntry {
    #[serde(deserialize_with = "text")]
    pub name: String,
    #[serde(rename = "type", deserialize_with = "lenient")]
    pub kind: QualityType,
    #[serde(rename = "dpCost")]
    pub dp_cost: NumberField,
    #[serde(deserialize_with = "text")]
    pub description: String,
}

impl QualityEntry {
    pub fn new(
        name: impl Into<String>,
        kind: QualityType,
        dp_cost: i32,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            dp_cost: NumberField::Value(dp_cost),
            description: description.into(),
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("Quality name cannot be empty"));
        }
        if self.dp_cost.value() < 0 {
            return Err(DomainError::validation(format!(
                "Quality '{}' has a negative DP cost",
                self.name
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityBook {
    #[serde(deserialize_with = "lenient")]
    pub list: Vec<QualityEntry>,
    #[serde(deserialize_with = "text")]
    pub notes: String,
}

/// Name given to the entry that carries a legacy sheet's flat quality spend.
pub const LEGACY_QUALITY_NAME: &str = "Legacy Qualities";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Qualities {
    Structured(QualityBook),
    /// Free text from sheets that predate the quality list.
    Legacy(String),
}

impl Default for Qualities {
    fn default() -> Self {
        Qualities::Structured(QualityBook::default())
    }
}

impl Qualities {
    pub fn entries(&self) -> &[QualityEntry] {
        match self {
            Qualities::Structured(book) => &book.list,
            Qualities::Legacy(_) => &[],
        }
    }
}

// =============================================================================
// Sheet
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DigimonSheet {
    #[serde(deserialize_with = "lenient")]
    pub meta: DigimonMeta,
    #[serde(deserialize_with = "lenient")]
    pub combat: DigimonCombat,
    #[serde(deserialize_with = "lenient")]
    pub stats: Stats,
    #[serde(deserialize_with = "lenient")]
    pub derived: DerivedBonuses,
    #[serde(deserialize_with = "lenient")]
    pub misc: MiscBonuses,
    #[serde(deserialize_with = "lenient")]
    pub attacks: Vec<Attack>,
    #[serde(deserialize_with = "lenient")]
    pub dp: DpPool,
    #[serde(deserialize_with = "lenient")]
    pub qualities: Qualities,
    #[serde(deserialize_with = "lenient")]
    pub formula_revision: FormulaRevision,
}

impl Default for DigimonSheet {
    fn default() -> Self {
        Self {
            meta: DigimonMeta::default(),
            combat: DigimonCombat::default(),
            stats: Stats::default(),
            derived: DerivedBonuses::default(),
            misc: MiscBonuses::default(),
            attacks: vec![Attack::default()],
            dp: DpPool::default(),
            qualities: Qualities::default(),
            formula_revision: FormulaRevision::Current,
        }
    }
}

impl DigimonSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores attack and quality invariants. Idempotent.
    pub fn normalize(&mut self) {
        if self.attacks.is_empty() {
            self.attacks.push(Attack::default());
        }
        self.attacks.iter_mut().for_each(Attack::normalize);
        self.migrate_qualities();
    }

    /// Rewrites legacy free-text qualities into the structured list.
    ///
    /// A positive legacy DP spend becomes a single entry carrying the old text
    /// so `spentDP` is unchanged; otherwise the text moves to the notes.
    pub fn migrate_qualities(&mut self) {
        let Qualities::Legacy(legacy_text) = &self.qualities else {
            return;
        };
        let legacy_dp = self.dp.quality.map(NumberField::value).unwrap_or(0);
        let book = if legacy_dp > 0 {
            QualityBook {
                list: vec![QualityEntry::new(
                    LEGACY_QUALITY_NAME,
                    QualityType::Static,
                    legacy_dp,
                    legacy_text.clone(),
                )],
                notes: String::new(),
            }
        } else {
            QualityBook {
                list: Vec::new(),
                notes: legacy_text.clone(),
            }
        };
        self.qualities = Qualities::Structured(book);
        self.dp.quality = None;
    }

    pub fn is_legacy_shape(&self) -> bool {
        matches!(self.qualities, Qualities::Legacy(_))
    }

    /// Appends a blank attack and returns its index.
    pub fn add_attack(&mut self) -> usize {
        self.attacks.push(Attack::default());
        self.attacks.len() - 1
    }

    /// Removes an attack. The signature move at index 0 stays.
    pub fn remove_attack(&mut self, index: usize) -> Result<Attack, DomainError> {
        if index == 0 {
            return Err(DomainError::constraint("The signature move cannot be removed"));
        }
        if index >= self.attacks.len() {
            return Err(DomainError::not_found("Attack", index.to_string()));
        }
        Ok(self.attacks.remove(index))
    }

    /// Adds a validated quality and returns its index in the list.
    pub fn add_quality(&mut self, entry: QualityEntry) -> Result<usize, DomainError> {
        entry.validate()?;
        self.migrate_qualities();
        match &mut self.qualities {
            Qualities::Structured(book) => {
                book.list.push(entry);
                Ok(book.list.len() - 1)
            }
            Qualities::Legacy(_) => Err(DomainError::invalid_state_transition(
                "Qualities were not migrated",
            )),
        }
    }

    pub fn remove_quality(&mut self, index: usize) -> Result<QualityEntry, DomainError> {
        match &mut self.qualities {
            Qualities::Structured(book) if index < book.list.len() => Ok(book.list.remove(index)),
            _ => Err(DomainError::not_found("Quality", index.to_string())),
        }
    }
}
