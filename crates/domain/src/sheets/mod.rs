//! Sheet archetypes and their formula engines.
//!
//! Each archetype pairs a plain serializable model with a stateless engine that
//! derives every displayed total from it. Engines implement the traits in
//! this module so the recompute cycle can drive either archetype.
//!
//! # Archetypes
//!
//! - Digimon (`digimon`)
//! - Tamer (`tamer`)

pub mod digimon;
mod health;
mod outputs;
pub mod tamer;

pub use health::{HealthBand, HealthBar};
pub use outputs::{ComputedValues, OutputKey};

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::DomainError;
use crate::types::FieldValue;

/// Which archetype a sheet document holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SheetKind {
    Digimon,
    Tamer,
}

impl SheetKind {
    pub const ALL: [SheetKind; 2] = [SheetKind::Digimon, SheetKind::Tamer];

    pub fn as_str(&self) -> &'static str {
        match self {
            SheetKind::Digimon => "digimon",
            SheetKind::Tamer => "tamer",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SheetKind::Digimon => "Digimon",
            SheetKind::Tamer => "Tamer",
        }
    }
}

impl fmt::Display for SheetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SheetKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "digimon" => Ok(SheetKind::Digimon),
            "tamer" => Ok(SheetKind::Tamer),
            other => Err(DomainError::parse(format!(
                "Unsupported sheet type: {}",
                other
            ))),
        }
    }
}

/// Selects between the formula sets that older saves were computed with.
///
/// `Current` is the canonical set. `Legacy` keeps the battery and Tamer wound
/// rules of the first release of the sheet so old saves display what their
/// owners remember.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormulaRevision {
    #[default]
    Current,
    Legacy,
}

impl<'de> Deserialize<'de> for FormulaRevision {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(label) if label == "legacy" => FormulaRevision::Legacy,
            _ => FormulaRevision::Current,
        })
    }
}

/// How raw input for a field is interpreted before it is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text, stored verbatim.
    Text,
    /// Integer leaf; blank input stays blank.
    Number,
    /// One label out of a fixed set.
    Choice,
}

/// A settable leaf of a sheet, addressable by its dotted path.
pub trait SheetField:
    FromStr<Err = DomainError> + fmt::Display + Clone + fmt::Debug + PartialEq + Send + Sync
{
    fn kind(&self) -> FieldKind;

    /// Coerces raw input the way this field expects it.
    fn coerce(&self, raw: &str) -> FieldValue {
        match self.kind() {
            FieldKind::Text => FieldValue::text(raw),
            FieldKind::Number | FieldKind::Choice => FieldValue::coerce(raw),
        }
    }
}

/// Plain sheet data: defaults, normalization, and typed field writes.
pub trait SheetModel:
    Clone + fmt::Debug + Default + PartialEq + Serialize + DeserializeOwned + Send + Sync
{
    type Field: SheetField;

    /// Restores every structural invariant formulas rely on. Idempotent.
    fn normalize(&mut self);

    /// Writes one coerced value into the model.
    fn set_field(&mut self, field: &Self::Field, value: &FieldValue) -> Result<(), DomainError>;

    fn formula_revision(&self) -> FormulaRevision;
}

/// Stateless formulas for one archetype.
pub trait FormulaEngine: Send + Sync {
    type Sheet: SheetModel;

    fn kind(&self) -> SheetKind;

    /// Recomputes every derived output from scratch.
    fn compute_all(&self, sheet: &Self::Sheet) -> ComputedValues;

    /// Current wounds against the sheet's wound total.
    fn health_bar(&self, sheet: &Self::Sheet) -> HealthBar;

    /// Rewrites informational caches the sheet stores for its host, such as
    /// unlocked special orders. Formulas never read them.
    fn refresh_caches(&self, _sheet: &mut Self::Sheet) {}
}
