//! Tamer sheets: the human partner's attributes, skills, and torments.

mod engine;
mod field;
mod model;

pub use engine::TamerEngine;
pub use field::{AspectSlot, TamerField};
pub use model::{
    Aspect, Aspects, AttributeAllocation, AttributeKey, Attributes, MilestoneKey, Milestones,
    Skills, Speed, SpecialOrderCache, TamerCombat, TamerMeta, TamerSheet, TamerSize, Torments,
    MILESTONE_MAX, TORMENT_BOXES,
};

use crate::error::DomainError;
use crate::sheets::{FormulaRevision, SheetModel};
use crate::types::FieldValue;

impl SheetModel for TamerSheet {
    type Field = TamerField;

    fn normalize(&mut self) {
        TamerSheet::normalize(self)
    }

    fn set_field(&mut self, field: &TamerField, value: &FieldValue) -> Result<(), DomainError> {
        self.set(field, value)
    }

    fn formula_revision(&self) -> FormulaRevision {
        self.formula_revision
    }
}
