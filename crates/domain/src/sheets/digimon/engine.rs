//! Digimon formula engine.
//!
//! Every total is a pure function of the sheet's base fields. Nothing here
//! reads a previously computed value.

use super::model::{DerivedKey, DigimonSheet, MiscKey, Qualities, SizeBonus, StatKey};
use crate::sheets::{
    ComputedValues, FormulaEngine, FormulaRevision, HealthBar, OutputKey, SheetKind,
};

/// Added to a base stat's stage and DP before dividing by three.
const DERIVED_BASE_OFFSET: i32 = 3;

/// DP granted per stage above the first.
const DP_PER_STAGE: i32 = 10;

/// Digimon formula engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct DigimonEngine;

impl DigimonEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn stage_value(&self, sheet: &DigimonSheet) -> i32 {
        sheet.meta.stage.value()
    }

    pub fn size_bonus(&self, sheet: &DigimonSheet) -> SizeBonus {
        sheet.meta.size.bonus()
    }

    pub fn stat_total(&self, sheet: &DigimonSheet, key: StatKey) -> i32 {
        let stat = sheet.stats.get(key);
        self.stage_value(sheet) + stat.dp.value() + stat.bonus.value()
    }

    /// Derived stats scale with the base stat's DP only. The base stat's own
    /// bonus never feeds into them.
    pub fn derived_total(&self, sheet: &DigimonSheet, key: DerivedKey) -> i32 {
        let base_dp = sheet.stats.get(key.base_stat()).dp.value();
        let base_without_bonus = self.stage_value(sheet) + base_dp + DERIVED_BASE_OFFSET;
        base_without_bonus.div_euclid(3)
            + sheet.derived.get(key).bonus.value()
            + self.size_bonus(sheet).get(key)
    }

    /// HP bonus is counted once, HP DP twice.
    pub fn wound_total(&self, sheet: &DigimonSheet) -> i32 {
        (self.stage_value(sheet) - 1) + self.stat_total(sheet, StatKey::Hp) * 2
            - sheet.stats.hp.bonus.value()
    }

    pub fn battery_total(&self, sheet: &DigimonSheet) -> i32 {
        match sheet.formula_revision {
            FormulaRevision::Current => self.stage_value(sheet),
            FormulaRevision::Legacy => self.stage_value(sheet) + 1,
        }
    }

    pub fn stat_dp_sum(&self, sheet: &DigimonSheet) -> i32 {
        StatKey::ALL
            .iter()
            .map(|key| sheet.stats.get(*key).dp.value())
            .sum()
    }

    pub fn quality_dp_sum(&self, sheet: &DigimonSheet) -> i32 {
        sheet
            .qualities
            .entries()
            .iter()
            .map(|entry| entry.dp_cost.value())
            .fold(0, i32::saturating_add)
    }

    /// Sheets still holding free-text qualities spend their flat legacy DP.
    pub fn spent_dp(&self, sheet: &DigimonSheet) -> i32 {
        let quality_spend = match &sheet.qualities {
            Qualities::Structured(_) => self.quality_dp_sum(sheet),
            Qualities::Legacy(_) => sheet.dp.quality.map(|dp| dp.value()).unwrap_or(0),
        };
        quality_spend.saturating_add(self.stat_dp_sum(sheet))
    }

    pub fn total_allocated_dp(&self, sheet: &DigimonSheet) -> i32 {
        (self.stage_value(sheet) - 1) * DP_PER_STAGE + sheet.dp.bonus.value()
    }

    pub fn misc_total(&self, sheet: &DigimonSheet, key: MiscKey) -> i32 {
        let stage = self.stage_value(sheet);
        let base = match key {
            MiscKey::Movement => stage + 1,
            MiscKey::Range => self.derived_total(sheet, DerivedKey::Bit) + 3,
            MiscKey::MaxRange => self.derived_total(sheet, DerivedKey::Bit) + 3 + (stage - 1),
            MiscKey::Initiative => self.derived_total(sheet, DerivedKey::Ram),
            MiscKey::Clash => {
                self.derived_total(sheet, DerivedKey::Ram)
                    + self.derived_total(sheet, DerivedKey::Cpu)
            }
            MiscKey::Resist => self.derived_total(sheet, DerivedKey::Dos).div_euclid(2),
        };
        base + sheet.misc.get(key).bonus.value()
    }
}

impl FormulaEngine for DigimonEngine {
    type Sheet = DigimonSheet;

    fn kind(&self) -> SheetKind {
        SheetKind::Digimon
    }

    fn compute_all(&self, sheet: &DigimonSheet) -> ComputedValues {
        let mut values = ComputedValues::new();
        for key in StatKey::ALL {
            values.insert(OutputKey::Stat(key), self.stat_total(sheet, key));
        }
        for key in DerivedKey::ALL {
            values.insert(OutputKey::Derived(key), self.derived_total(sheet, key));
        }
        for key in MiscKey::ALL {
            values.insert(OutputKey::Misc(key), self.misc_total(sheet, key));
        }
        values.insert(OutputKey::WoundTotal, self.wound_total(sheet));
        values.insert(OutputKey::BatteryTotal, self.battery_total(sheet));
        values.insert(OutputKey::StatDp, self.stat_dp_sum(sheet));
        values.insert(OutputKey::SpentDp, self.spent_dp(sheet));
        values.insert(OutputKey::TotalDp, self.total_allocated_dp(sheet));
        values
    }

    fn health_bar(&self, sheet: &DigimonSheet) -> HealthBar {
        HealthBar::new(sheet.combat.current_wounds.value(), self.wound_total(sheet))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheets::digimon::model::{QualityBook, QualityEntry, QualityType, Size, Stage};
    use crate::types::{NumberField, LEAF_LIMIT};

    fn create_test_sheet(stage: Stage) -> DigimonSheet {
        let mut sheet = DigimonSheet::new();
        sheet.meta.stage = stage;
        sheet
    }

    #[test]
    fn stage_values() {
        let engine = DigimonEngine::new();
        assert_eq!(engine.stage_value(&create_test_sheet(Stage::Child)), 2);
        assert_eq!(engine.stage_value(&create_test_sheet(Stage::Adult)), 3);
        assert_eq!(engine.stage_value(&create_test_sheet(Stage::Perfect)), 4);
        assert_eq!(engine.stage_value(&create_test_sheet(Stage::Ultimate)), 5);
        assert_eq!(engine.stage_value(&create_test_sheet(Stage::Unknown)), 1);
    }

    #[test]
    fn stat_total_is_stage_plus_dp_plus_bonus() {
        let engine = DigimonEngine::new();
        for stage in Stage::ALL {
            for dp in 0..4 {
                for bonus in -2..3 {
                    let mut sheet = create_test_sheet(stage);
                    sheet.stats.acc.dp = NumberField::Value(dp);
                    sheet.stats.acc.bonus = NumberField::Value(bonus);
                    assert_eq!(
                        engine.stat_total(&sheet, StatKey::Acc),
                        stage.value() + dp + bonus
                    );
                }
            }
        }
    }

    #[test]
    fn blank_leaves_read_as_zero() {
        let engine = DigimonEngine::new();
        let mut sheet = create_test_sheet(Stage::Adult);
        sheet.stats.dam.dp = NumberField::Blank;
        sheet.stats.dam.bonus = NumberField::Blank;
        assert_eq!(engine.stat_total(&sheet, StatKey::Dam), 3);
    }

    #[test]
    fn size_only_changes_shift_derived_by_size_offsets() {
        let engine = DigimonEngine::new();
        let sizes = [
            Size::Small,
            Size::Medium,
            Size::Large,
            Size::Huge,
            Size::Gigantic,
            Size::Colossal,
            Size::Other("Tiny".to_string()),
        ];
        let mut baseline = create_test_sheet(Stage::Perfect);
        baseline.stats.acc.dp = NumberField::Value(2);
        baseline.stats.arm.dp = NumberField::Value(5);

        for from in &sizes {
            for to in &sizes {
                let mut a = baseline.clone();
                a.meta.size = from.clone();
                let mut b = baseline.clone();
                b.meta.size = to.clone();
                for key in DerivedKey::ALL {
                    let delta = engine.derived_total(&b, key) - engine.derived_total(&a, key);
                    assert_eq!(delta, to.bonus().get(key) - from.bonus().get(key));
                }
            }
        }
    }

    #[test]
    fn derived_total_ignores_base_stat_bonus() {
        let engine = DigimonEngine::new();
        let mut sheet = create_test_sheet(Stage::Adult);
        sheet.stats.dod.dp = NumberField::Value(3);
        let before = engine.derived_total(&sheet, DerivedKey::Ram);
        sheet.stats.dod.bonus = NumberField::Value(9);
        assert_eq!(engine.derived_total(&sheet, DerivedKey::Ram), before);
        // floor((3 + 3 + 3) / 3) + 0 + Medium RAM 1 = 4
        assert_eq!(before, 4);
    }

    #[test]
    fn derived_total_adds_own_bonus() {
        let engine = DigimonEngine::new();
        let mut sheet = create_test_sheet(Stage::Child);
        sheet.derived.cpu.bonus = NumberField::Value(2);
        // floor((2 + 0 + 3) / 3) + 2 + Medium CPU 0 = 3
        assert_eq!(engine.derived_total(&sheet, DerivedKey::Cpu), 3);
    }

    #[test]
    fn wound_total_example() {
        let engine = DigimonEngine::new();
        let mut sheet = create_test_sheet(Stage::Adult);
        sheet.stats.hp.dp = NumberField::Value(4);
        sheet.stats.hp.bonus = NumberField::Value(1);
        // statTotal(HP) = 3 + 4 + 1 = 8
        assert_eq!(engine.stat_total(&sheet, StatKey::Hp), 8);
        // (3 - 1) + 8 * 2 - 1 = 17
        assert_eq!(engine.wound_total(&sheet), 17);
    }

    #[test]
    fn battery_total_follows_revision() {
        let engine = DigimonEngine::new();
        let mut sheet = create_test_sheet(Stage::Perfect);
        assert_eq!(engine.battery_total(&sheet), 4);
        sheet.formula_revision = FormulaRevision::Legacy;
        assert_eq!(engine.battery_total(&sheet), 5);
    }

    #[test]
    fn spent_dp_adds_quality_costs() {
        let engine = DigimonEngine::new();
        let mut sheet = create_test_sheet(Stage::Adult);
        sheet.stats.acc.dp = NumberField::Value(2);
        sheet.stats.hp.dp = NumberField::Value(3);
        sheet
            .add_quality(QualityEntry::new("Flight", QualityType::Static, 2, ""))
            .unwrap();
        assert_eq!(engine.stat_dp_sum(&sheet), 5);
        assert_eq!(engine.spent_dp(&sheet), 7);

        sheet
            .add_quality(QualityEntry::new("Counterattack", QualityType::Trigger, 5, ""))
            .unwrap();
        assert_eq!(engine.spent_dp(&sheet), 12);
        assert_eq!(engine.stat_dp_sum(&sheet), 5);
    }

    #[test]
    fn legacy_sheets_spend_flat_quality_dp() {
        let engine = DigimonEngine::new();
        let mut sheet = create_test_sheet(Stage::Child);
        sheet.qualities = Qualities::Legacy("Flight".to_string());
        sheet.dp.quality = Some(NumberField::Value(6));
        sheet.stats.dod.dp = NumberField::Value(1);
        assert_eq!(engine.quality_dp_sum(&sheet), 0);
        assert_eq!(engine.spent_dp(&sheet), 7);

        // Migration keeps the spend.
        sheet.normalize();
        assert_eq!(engine.spent_dp(&sheet), 7);
    }

    #[test]
    fn misc_totals() {
        let engine = DigimonEngine::new();
        let mut sheet = create_test_sheet(Stage::Adult);
        sheet.meta.size = Size::Large;
        sheet.stats.acc.dp = NumberField::Value(3);
        sheet.stats.dod.dp = NumberField::Value(0);
        sheet.stats.dam.dp = NumberField::Value(6);
        sheet.stats.arm.dp = NumberField::Value(1);
        sheet.misc.resist.bonus = NumberField::Value(1);

        // BIT = floor(9/3) + 1 = 4, RAM = floor(6/3) + 0 = 2
        // DOS = floor(12/3) + 0 = 4, CPU = floor(7/3) + 1 = 3
        assert_eq!(engine.derived_total(&sheet, DerivedKey::Bit), 4);
        assert_eq!(engine.derived_total(&sheet, DerivedKey::Ram), 2);
        assert_eq!(engine.derived_total(&sheet, DerivedKey::Dos), 4);
        assert_eq!(engine.derived_total(&sheet, DerivedKey::Cpu), 3);

        assert_eq!(engine.misc_total(&sheet, MiscKey::Movement), 4);
        assert_eq!(engine.misc_total(&sheet, MiscKey::Range), 7);
        assert_eq!(engine.misc_total(&sheet, MiscKey::MaxRange), 9);
        assert_eq!(engine.misc_total(&sheet, MiscKey::Initiative), 2);
        assert_eq!(engine.misc_total(&sheet, MiscKey::Clash), 5);
        // floor(4 / 2) + 1
        assert_eq!(engine.misc_total(&sheet, MiscKey::Resist), 3);
    }

    #[test]
    fn fresh_sheet_outputs() {
        let engine = DigimonEngine::new();
        let values = engine.compute_all(&DigimonSheet::new());
        assert_eq!(values.get(OutputKey::Stat(StatKey::Acc)), Some(2));
        // floor((2 + 0 + 3) / 3) + 0 + Medium BIT 1 = 2
        assert_eq!(values.get(OutputKey::Derived(DerivedKey::Bit)), Some(2));
        // (2 - 1) * 10 + 0
        assert_eq!(values.get(OutputKey::TotalDp), Some(10));
        assert_eq!(values.get(OutputKey::StatDp), Some(0));
        assert_eq!(values.get(OutputKey::SpentDp), Some(0));
        assert_eq!(values.get(OutputKey::BatteryTotal), Some(2));
        // (2 - 1) + 2 * 2 - 0
        assert_eq!(values.get(OutputKey::WoundTotal), Some(5));
        assert_eq!(values.len(), 5 + 4 + 6 + 5);
    }

    #[test]
    fn health_bar_uses_wound_total() {
        let engine = DigimonEngine::new();
        let mut sheet = DigimonSheet::new();
        sheet.combat.current_wounds = NumberField::Value(4);
        let bar = engine.health_bar(&sheet);
        assert_eq!(bar.max, 5);
        assert_eq!(bar.percent, 80.0);
    }

    #[test]
    fn extreme_leaves_still_compute() {
        let engine = DigimonEngine::new();
        let mut sheet: DigimonSheet = serde_json::from_value(serde_json::json!({
            "meta": {"stage": "Ultimate"},
            "stats": {
                "ACC": {"dp": 1e12, "bonus": i32::MIN},
                "HP": {"dp": "99999999999", "bonus": i32::MAX}
            },
            "derived": {"BIT": {"bonus": -1e300}},
            "dp": {"bonus": i64::MAX}
        }))
        .unwrap();
        sheet.qualities = Qualities::Structured(QualityBook {
            list: vec![QualityEntry::new("Huge", QualityType::Static, i32::MAX, "d"); 5000],
            notes: String::new(),
        });

        let values = engine.compute_all(&sheet);
        assert_eq!(values.get(OutputKey::Stat(StatKey::Acc)), Some(5));
        assert_eq!(
            values.get(OutputKey::Stat(StatKey::Hp)),
            Some(5 + 2 * LEAF_LIMIT)
        );
        // (5 - 1) + HP total twice, minus the HP bonus once
        assert_eq!(values.get(OutputKey::WoundTotal), Some(4 + 10 + 3 * LEAF_LIMIT));
        assert_eq!(values.get(OutputKey::SpentDp), Some(i32::MAX));
        assert_eq!(values.get(OutputKey::TotalDp), Some(40 + LEAF_LIMIT));
        assert!(values.get(OutputKey::Derived(DerivedKey::Bit)).is_some());
        assert!(engine.health_bar(&sheet).max > 0);
    }
}
