//! Settable Digimon sheet fields.

use std::fmt;
use std::str::FromStr;

use super::model::{
    Attack, Attribute, DerivedKey, DigimonSheet, MiscKey, Qualities, Size, Stage, StatKey,
    ATTACK_TAG_SLOTS,
};
use crate::error::DomainError;
use crate::sheets::{FieldKind, FormulaRevision, SheetField};
use crate::types::FieldValue;

/// One part of an attack row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttackPart {
    Name,
    Range,
    Kind,
    Acc,
    Dmg,
    Tag(usize),
}

/// Every leaf of a Digimon sheet that input can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigimonField {
    Name,
    Digimon,
    Type,
    Attribute,
    Stage,
    Size,
    WoundBoxes,
    TempWounds,
    BatteryManual,
    CurrentWounds,
    StatDp(StatKey),
    StatBonus(StatKey),
    DerivedBonus(DerivedKey),
    MiscBonus(MiscKey),
    DpBonus,
    LegacyQualityDp,
    QualityNotes,
    Attack(usize, AttackPart),
    FormulaRevision,
}

impl SheetField for DigimonField {
    fn kind(&self) -> FieldKind {
        match self {
            DigimonField::Name
            | DigimonField::Digimon
            | DigimonField::Type
            | DigimonField::QualityNotes
            | DigimonField::Attack(_, AttackPart::Name)
            | DigimonField::Attack(_, AttackPart::Tag(_)) => FieldKind::Text,
            DigimonField::Attribute
            | DigimonField::Stage
            | DigimonField::Size
            | DigimonField::FormulaRevision
            | DigimonField::Attack(_, AttackPart::Range)
            | DigimonField::Attack(_, AttackPart::Kind) => FieldKind::Choice,
            _ => FieldKind::Number,
        }
    }
}

impl fmt::Display for DigimonField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DigimonField::Name => f.write_str("meta.name"),
            DigimonField::Digimon => f.write_str("meta.digimon"),
            DigimonField::Type => f.write_str("meta.type"),
            DigimonField::Attribute => f.write_str("meta.attribute"),
            DigimonField::Stage => f.write_str("meta.stage"),
            DigimonField::Size => f.write_str("meta.size"),
            DigimonField::WoundBoxes => f.write_str("combat.woundBoxes"),
            DigimonField::TempWounds => f.write_str("combat.tempWounds"),
            DigimonField::BatteryManual => f.write_str("combat.batteryManual"),
            DigimonField::CurrentWounds => f.write_str("combat.currentWounds"),
            DigimonField::StatDp(key) => write!(f, "stats.{}.dp", key),
            DigimonField::StatBonus(key) => write!(f, "stats.{}.bonus", key),
            DigimonField::DerivedBonus(key) => write!(f, "derived.{}.bonus", key),
            DigimonField::MiscBonus(key) => write!(f, "misc.{}.bonus", key),
            DigimonField::DpBonus => f.write_str("dp.bonus"),
            DigimonField::LegacyQualityDp => f.write_str("dp.quality"),
            DigimonField::QualityNotes => f.write_str("qualities.notes"),
            DigimonField::Attack(index, part) => match part {
                AttackPart::Name => write!(f, "attacks.{}.name", index),
                AttackPart::Range => write!(f, "attacks.{}.range", index),
                AttackPart::Kind => write!(f, "attacks.{}.type", index),
                AttackPart::Acc => write!(f, "attacks.{}.acc", index),
                AttackPart::Dmg => write!(f, "attacks.{}.dmg", index),
                AttackPart::Tag(slot) => write!(f, "attacks.{}.tags.{}", index, slot),
            },
            DigimonField::FormulaRevision => f.write_str("formulaRevision"),
        }
    }
}

impl FromStr for DigimonField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || DomainError::parse(format!("Unknown Digimon field path: {}", s));
        let parts: Vec<&str> = s.split('.').collect();
        let field = match parts.as_slice() {
            ["meta", "name"] => DigimonField::Name,
            ["meta", "digimon"] => DigimonField::Digimon,
            ["meta", "type"] => DigimonField::Type,
            ["meta", "attribute"] => DigimonField::Attribute,
            ["meta", "stage"] => DigimonField::Stage,
            ["meta", "size"] => DigimonField::Size,
            ["combat", "woundBoxes"] => DigimonField::WoundBoxes,
            ["combat", "tempWounds"] => DigimonField::TempWounds,
            ["combat", "batteryManual"] => DigimonField::BatteryManual,
            ["combat", "currentWounds"] => DigimonField::CurrentWounds,
            ["stats", key, "dp"] => DigimonField::StatDp(key.parse().map_err(|_| unknown())?),
            ["stats", key, "bonus"] => {
                DigimonField::StatBonus(key.parse().map_err(|_| unknown())?)
            }
            ["derived", key, "bonus"] => {
                DigimonField::DerivedBonus(key.parse().map_err(|_| unknown())?)
            }
            ["misc", key, "bonus"] => DigimonField::MiscBonus(key.parse().map_err(|_| unknown())?),
            ["dp", "bonus"] => DigimonField::DpBonus,
            ["dp", "quality"] => DigimonField::LegacyQualityDp,
            ["qualities", "notes"] => DigimonField::QualityNotes,
            ["formulaRevision"] => DigimonField::FormulaRevision,
            ["attacks", index, rest @ ..] => {
                let index: usize = index.parse().map_err(|_| unknown())?;
                let part = match rest {
                    ["name"] => AttackPart::Name,
                    ["range"] => AttackPart::Range,
                    ["type"] => AttackPart::Kind,
                    ["acc"] => AttackPart::Acc,
                    ["dmg"] => AttackPart::Dmg,
                    ["tags", slot] => {
                        let slot: usize = slot.parse().map_err(|_| unknown())?;
                        if slot >= ATTACK_TAG_SLOTS {
                            return Err(unknown());
                        }
                        AttackPart::Tag(slot)
                    }
                    _ => return Err(unknown()),
                };
                DigimonField::Attack(index, part)
            }
            _ => return Err(unknown()),
        };
        Ok(field)
    }
}

impl DigimonSheet {
    /// Writes one coerced value. Unknown labels fall back instead of failing.
    pub fn set(&mut self, field: &DigimonField, value: &FieldValue) -> Result<(), DomainError> {
        match field {
            DigimonField::Name => self.meta.name = value.to_text(),
            DigimonField::Digimon => self.meta.digimon = value.to_text(),
            DigimonField::Type => self.meta.kind = value.to_text(),
            DigimonField::Attribute => {
                self.meta.attribute = value.to_text().parse().unwrap_or(Attribute::Unknown)
            }
            DigimonField::Stage => self.meta.stage = Stage::from_label(&value.to_text()),
            DigimonField::Size => self.meta.size = Size::from_label(&value.to_text()),
            DigimonField::WoundBoxes => {
                self.combat.wound_boxes = value.to_number_field().non_negative()
            }
            DigimonField::TempWounds => {
                self.combat.temp_wounds = value.to_number_field().non_negative()
            }
            DigimonField::BatteryManual => {
                self.combat.battery_manual = value.to_number_field().non_negative()
            }
            DigimonField::CurrentWounds => {
                self.combat.current_wounds = value.to_number_field().non_negative()
            }
            DigimonField::StatDp(key) => {
                self.stats.get_mut(*key).dp = value.to_number_field().non_negative()
            }
            DigimonField::StatBonus(key) => {
                self.stats.get_mut(*key).bonus = value.to_number_field()
            }
            DigimonField::DerivedBonus(key) => {
                self.derived.get_mut(*key).bonus = value.to_number_field()
            }
            DigimonField::MiscBonus(key) => self.misc.get_mut(*key).bonus = value.to_number_field(),
            DigimonField::DpBonus => self.dp.bonus = value.to_number_field(),
            DigimonField::LegacyQualityDp => {
                self.dp.quality = Some(value.to_number_field().non_negative())
            }
            DigimonField::QualityNotes => match &mut self.qualities {
                Qualities::Structured(book) => book.notes = value.to_text(),
                Qualities::Legacy(text) => *text = value.to_text(),
            },
            DigimonField::FormulaRevision => {
                self.formula_revision = if value.to_text() == "legacy" {
                    FormulaRevision::Legacy
                } else {
                    FormulaRevision::Current
                }
            }
            DigimonField::Attack(index, part) => {
                let attack = self
                    .attacks
                    .get_mut(*index)
                    .ok_or_else(|| DomainError::not_found("Attack", index.to_string()))?;
                set_attack_part(attack, *part, value)?;
            }
        }
        Ok(())
    }
}

fn set_attack_part(
    attack: &mut Attack,
    part: AttackPart,
    value: &FieldValue,
) -> Result<(), DomainError> {
    match part {
        AttackPart::Name => attack.name = value.to_text(),
        AttackPart::Range => attack.range = value.to_text().parse().unwrap_or_default(),
        AttackPart::Kind => attack.kind = value.to_text().parse().unwrap_or_default(),
        AttackPart::Acc => attack.acc = value.to_number_field(),
        AttackPart::Dmg => attack.dmg = value.to_number_field(),
        AttackPart::Tag(slot) => {
            if slot >= ATTACK_TAG_SLOTS {
                return Err(DomainError::not_found("Attack tag", slot.to_string()));
            }
            attack.tags.resize(ATTACK_TAG_SLOTS, String::new());
            attack.tags[slot] = value.to_text();
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheets::digimon::model::{AttackKind, AttackRange};
    use crate::types::NumberField;

    #[test]
    fn paths_round_trip() {
        for path in [
            "meta.name",
            "meta.stage",
            "combat.currentWounds",
            "stats.ACC.dp",
            "stats.HP.bonus",
            "derived.CPU.bonus",
            "misc.MaxRange.bonus",
            "dp.bonus",
            "qualities.notes",
            "attacks.0.type",
            "attacks.2.tags.1",
            "formulaRevision",
        ] {
            let field: DigimonField = path.parse().unwrap();
            assert_eq!(field.to_string(), path);
        }
    }

    #[test]
    fn invalid_paths_are_parse_errors() {
        for path in [
            "stats.XYZ.dp",
            "stats.ACC",
            "attacks.x.name",
            "attacks.0.tags.3",
            "meta",
            "",
        ] {
            let err = path.parse::<DigimonField>().unwrap_err();
            assert!(matches!(err, DomainError::Parse(_)), "{}", path);
        }
    }

    #[test]
    fn field_kinds() {
        assert_eq!(DigimonField::Name.kind(), FieldKind::Text);
        assert_eq!(DigimonField::Stage.kind(), FieldKind::Choice);
        assert_eq!(DigimonField::StatDp(StatKey::Acc).kind(), FieldKind::Number);
        assert_eq!(
            DigimonField::Attack(0, AttackPart::Tag(1)).kind(),
            FieldKind::Text
        );
    }

    #[test]
    fn set_numeric_fields() {
        let mut sheet = DigimonSheet::new();
        sheet
            .set(&DigimonField::StatDp(StatKey::Dod), &FieldValue::coerce("3"))
            .unwrap();
        sheet
            .set(&DigimonField::StatBonus(StatKey::Dod), &FieldValue::coerce("-2"))
            .unwrap();
        sheet
            .set(&DigimonField::CurrentWounds, &FieldValue::coerce("-5"))
            .unwrap();
        assert_eq!(sheet.stats.dod.dp, NumberField::Value(3));
        assert_eq!(sheet.stats.dod.bonus, NumberField::Value(-2));
        assert_eq!(sheet.combat.current_wounds, NumberField::Value(0));

        sheet
            .set(&DigimonField::StatDp(StatKey::Dod), &FieldValue::coerce(""))
            .unwrap();
        assert_eq!(sheet.stats.dod.dp, NumberField::Blank);
    }

    #[test]
    fn set_labels_fall_back() {
        let mut sheet = DigimonSheet::new();
        sheet
            .set(&DigimonField::Stage, &FieldValue::coerce("Mega"))
            .unwrap();
        assert_eq!(sheet.meta.stage, Stage::Unknown);
        sheet
            .set(&DigimonField::Size, &FieldValue::coerce("huge"))
            .unwrap();
        assert_eq!(sheet.meta.size, Size::Huge);
        sheet
            .set(&DigimonField::Attribute, &FieldValue::coerce("Free"))
            .unwrap();
        assert_eq!(sheet.meta.attribute, Attribute::Unknown);
    }

    #[test]
    fn set_attack_parts() {
        let mut sheet = DigimonSheet::new();
        sheet
            .set(
                &DigimonField::Attack(0, AttackPart::Name),
                &FieldValue::text("Pepper Breath"),
            )
            .unwrap();
        sheet
            .set(
                &DigimonField::Attack(0, AttackPart::Range),
                &FieldValue::coerce("Ranged"),
            )
            .unwrap();
        sheet
            .set(
                &DigimonField::Attack(0, AttackPart::Kind),
                &FieldValue::coerce("Support"),
            )
            .unwrap();
        sheet
            .set(
                &DigimonField::Attack(0, AttackPart::Tag(2)),
                &FieldValue::text("Fire"),
            )
            .unwrap();
        let attack = &sheet.attacks[0];
        assert_eq!(attack.name, "Pepper Breath");
        assert_eq!(attack.range, AttackRange::Ranged);
        assert_eq!(attack.kind, AttackKind::Support);
        assert_eq!(attack.tags[2], "Fire");

        let err = sheet
            .set(
                &DigimonField::Attack(4, AttackPart::Acc),
                &FieldValue::coerce("1"),
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[test]
    fn notes_follow_quality_shape() {
        let mut sheet = DigimonSheet::new();
        sheet
            .set(&DigimonField::QualityNotes, &FieldValue::text("Flies"))
            .unwrap();
        match &sheet.qualities {
            Qualities::Structured(book) => assert_eq!(book.notes, "Flies"),
            Qualities::Legacy(_) => panic!("expected structured qualities"),
        }
    }
}
