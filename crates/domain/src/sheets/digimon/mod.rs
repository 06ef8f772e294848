//! Digimon sheets: partner creature stats, attacks, and qualities.

mod engine;
mod field;
mod model;

pub use engine::DigimonEngine;
pub use field::{AttackPart, DigimonField};
pub use model::{
    Attack, AttackKind, AttackRange, Attribute, BonusOnly, DerivedBonuses, DerivedKey,
    DigimonCombat, DigimonMeta, DigimonSheet, DpPool, MiscBonuses, MiscKey, Qualities,
    QualityBook, QualityEntry, QualityType, Size, SizeBonus, Stage, StatAllocation, StatKey,
    Stats, ATTACK_TAG_SLOTS, LEGACY_QUALITY_NAME,
};

use crate::error::DomainError;
use crate::sheets::{FormulaRevision, SheetModel};
use crate::types::FieldValue;

impl SheetModel for DigimonSheet {
    type Field = DigimonField;

    fn normalize(&mut self) {
        DigimonSheet::normalize(self)
    }

    fn set_field(&mut self, field: &DigimonField, value: &FieldValue) -> Result<(), DomainError> {
        self.set(field, value)
    }

    fn formula_revision(&self) -> FormulaRevision {
        self.formula_revision
    }
}
