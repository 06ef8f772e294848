//! Tamer formula engine.

use super::model::{AttributeKey, TamerSheet};
use crate::sheets::{
    ComputedValues, FormulaEngine, FormulaRevision, HealthBar, OutputKey, SheetKind,
};
use crate::special_orders::{self, SpecialOrder};

/// Wound boxes every Tamer has before Endurance.
const BASE_WOUNDS: i32 = 3;

/// Inspiration on top of the Willpower total.
const INSPIRATION_BONUS: i32 = 2;

/// Skill that adds wound boxes.
const ENDURANCE_SKILL: &str = "Endurance_WIL";

#[derive(Debug, Clone, Copy, Default)]
pub struct TamerEngine;

impl TamerEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn attribute_total(&self, sheet: &TamerSheet, key: AttributeKey) -> i32 {
        1 + sheet.attributes.get(key).dp.value()
    }

    pub fn attribute_levels(&self, sheet: &TamerSheet) -> Vec<(AttributeKey, i32)> {
        AttributeKey::ALL
            .into_iter()
            .map(|key| (key, self.attribute_total(sheet, key)))
            .collect()
    }

    pub fn wound_total(&self, sheet: &TamerSheet) -> i32 {
        match sheet.formula_revision {
            FormulaRevision::Current => {
                BASE_WOUNDS + sheet.skills.get(AttributeKey::Bod, ENDURANCE_SKILL).value()
            }
            FormulaRevision::Legacy => self.attribute_total(sheet, AttributeKey::Bod),
        }
    }

    pub fn inspiration_total(&self, sheet: &TamerSheet) -> i32 {
        self.attribute_total(sheet, AttributeKey::Wil) + INSPIRATION_BONUS
    }

    pub fn available_special_orders(&self, sheet: &TamerSheet) -> Vec<&'static SpecialOrder> {
        special_orders::available_orders(&self.attribute_levels(sheet))
    }
}

impl FormulaEngine for TamerEngine {
    type Sheet = TamerSheet;

    fn kind(&self) -> SheetKind {
        SheetKind::Tamer
    }

    fn compute_all(&self, sheet: &TamerSheet) -> ComputedValues {
        let mut values = ComputedValues::new();
        for key in AttributeKey::ALL {
            values.insert(OutputKey::Attribute(key), self.attribute_total(sheet, key));
        }
        values.insert(OutputKey::CombatWoundTotal, self.wound_total(sheet));
        values.insert(OutputKey::CombatInspireTotal, self.inspiration_total(sheet));
        values
    }

    fn health_bar(&self, sheet: &TamerSheet) -> HealthBar {
        HealthBar::new(sheet.combat.current_wounds.value(), self.wound_total(sheet))
    }

    fn refresh_caches(&self, sheet: &mut TamerSheet) {
        sheet.special_orders.available = self
            .available_special_orders(sheet)
            .iter()
            .map(|order| order.id())
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheets::HealthBand;
    use crate::types::{NumberField, LEAF_LIMIT};

    fn create_test_sheet(dp: &[(AttributeKey, i32)]) -> TamerSheet {
        let mut sheet = TamerSheet::new();
        for (key, value) in dp {
            sheet.attributes.get_mut(*key).dp = NumberField::Value(*value);
        }
        sheet
    }

    #[test]
    fn attribute_total_is_one_plus_dp() {
        let engine = TamerEngine::new();
        let sheet = create_test_sheet(&[(AttributeKey::Cha, 4)]);
        assert_eq!(engine.attribute_total(&sheet, AttributeKey::Cha), 5);
        assert_eq!(engine.attribute_total(&sheet, AttributeKey::Agi), 1);
    }

    #[test]
    fn wound_total_follows_revision() {
        let engine = TamerEngine::new();
        let mut sheet = create_test_sheet(&[(AttributeKey::Bod, 3)]);
        sheet
            .skills
            .set(AttributeKey::Bod, ENDURANCE_SKILL, NumberField::Value(2));
        // 3 + Endurance 2
        assert_eq!(engine.wound_total(&sheet), 5);
        sheet.formula_revision = FormulaRevision::Legacy;
        // 1 + BOD dp 3
        assert_eq!(engine.wound_total(&sheet), 4);
    }

    #[test]
    fn inspiration_is_willpower_plus_two() {
        let engine = TamerEngine::new();
        let sheet = create_test_sheet(&[(AttributeKey::Wil, 2)]);
        assert_eq!(engine.inspiration_total(&sheet), 5);
    }

    #[test]
    fn int_six_unlocks_exactly_two_orders() {
        let engine = TamerEngine::new();
        let sheet = create_test_sheet(&[(AttributeKey::Int, 5)]);
        let ids: Vec<String> = engine
            .available_special_orders(&sheet)
            .iter()
            .map(|order| order.id())
            .collect();
        assert_eq!(ids, vec!["INT-5", "INT-6"]);
    }

    #[test]
    fn fresh_sheet_has_no_orders() {
        let engine = TamerEngine::new();
        assert!(engine.available_special_orders(&TamerSheet::new()).is_empty());
    }

    #[test]
    fn compute_all_outputs() {
        let engine = TamerEngine::new();
        let sheet = create_test_sheet(&[(AttributeKey::Agi, 2), (AttributeKey::Wil, 1)]);
        let values = engine.compute_all(&sheet);
        assert_eq!(values.get_by_name("attr:AGI"), Some(3));
        assert_eq!(values.get_by_name("attr:BOD"), Some(1));
        assert_eq!(values.get_by_name("combat:woundTotal"), Some(3));
        assert_eq!(values.get_by_name("combat:inspireTotal"), Some(4));
        assert_eq!(values.len(), 7);
    }

    #[test]
    fn refresh_caches_records_unlocked_orders() {
        let engine = TamerEngine::new();
        let mut sheet = create_test_sheet(&[(AttributeKey::Agi, 6), (AttributeKey::Wil, 4)]);
        engine.refresh_caches(&mut sheet);
        assert_eq!(
            sheet.special_orders.available,
            vec!["AGI-5", "AGI-6", "AGI-7", "WIL-5"]
        );
    }

    #[test]
    fn health_bar_bands() {
        let engine = TamerEngine::new();
        let mut sheet = TamerSheet::new();
        sheet.combat.current_wounds = NumberField::Value(3);
        let bar = engine.health_bar(&sheet);
        assert_eq!(bar.max, 3);
        assert_eq!(bar.percent, 100.0);
        assert_eq!(bar.band, HealthBand::Danger);

        sheet.combat.current_wounds = NumberField::Value(1);
        assert_eq!(engine.health_bar(&sheet).band, HealthBand::Warning);
    }

    #[test]
    fn extreme_leaves_still_compute() {
        let engine = TamerEngine::new();
        let mut sheet: TamerSheet = serde_json::from_value(serde_json::json!({
            "attributes": {
                "WIL": {"dp": "99999999999"},
                "BOD": {"dp": -1e15}
            },
            "skills": {"BOD": {"Endurance_WIL": 1e20}}
        }))
        .unwrap();

        let values = engine.compute_all(&sheet);
        assert_eq!(
            values.get(OutputKey::Attribute(AttributeKey::Wil)),
            Some(1 + LEAF_LIMIT)
        );
        assert_eq!(values.get(OutputKey::CombatWoundTotal), Some(3 + LEAF_LIMIT));
        assert_eq!(values.get(OutputKey::CombatInspireTotal), Some(3 + LEAF_LIMIT));

        sheet.formula_revision = FormulaRevision::Legacy;
        assert_eq!(engine.wound_total(&sheet), 1 - LEAF_LIMIT);
        assert_eq!(engine.health_bar(&sheet).percent, 0.0);

        engine.refresh_caches(&mut sheet);
        assert_eq!(sheet.special_orders.available, vec!["WIL-5", "WIL-6", "WIL-7"]);
    }
}
