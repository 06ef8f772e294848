//! Settable Tamer sheet fields.

use std::fmt;
use std::str::FromStr;

use super::model::{AttributeKey, MilestoneKey, TamerSheet, MILESTONE_MAX, TORMENT_BOXES};
use crate::error::DomainError;
use crate::sheets::{FieldKind, FormulaRevision, SheetField};
use crate::types::FieldValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AspectSlot {
    Major,
    Minor,
}

impl AspectSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectSlot::Major => "major",
            AspectSlot::Minor => "minor",
        }
    }
}

/// Every leaf of a Tamer sheet that input can be bound to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TamerField {
    Name,
    Size,
    Age,
    Wounds,
    CurrentWounds,
    Inspiration,
    MilestoneTotal,
    Speed,
    AttributeDp(AttributeKey),
    Skill(AttributeKey, String),
    AspectName(AspectSlot),
    AspectDesc(AspectSlot),
    TormentMark(usize),
    TormentDesc,
    Talents,
    Milestone(MilestoneKey),
    FormulaRevision,
}

impl SheetField for TamerField {
    fn kind(&self) -> FieldKind {
        match self {
            TamerField::Name
            | TamerField::AspectName(_)
            | TamerField::AspectDesc(_)
            | TamerField::TormentDesc
            | TamerField::Talents => FieldKind::Text,
            TamerField::Size | TamerField::Speed | TamerField::FormulaRevision => {
                FieldKind::Choice
            }
            _ => FieldKind::Number,
        }
    }
}

impl fmt::Display for TamerField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TamerField::Name => f.write_str("meta.name"),
            TamerField::Size => f.write_str("meta.size"),
            TamerField::Age => f.write_str("meta.age"),
            TamerField::Wounds => f.write_str("combat.wounds"),
            TamerField::CurrentWounds => f.write_str("combat.currentWounds"),
            TamerField::Inspiration => f.write_str("combat.inspiration"),
            TamerField::MilestoneTotal => f.write_str("combat.milestones"),
            TamerField::Speed => f.write_str("combat.speed"),
            TamerField::AttributeDp(key) => write!(f, "attributes.{}.dp", key),
            TamerField::Skill(key, name) => write!(f, "skills.{}.{}", key, name),
            TamerField::AspectName(slot) => write!(f, "aspects.{}.name", slot.as_str()),
            TamerField::AspectDesc(slot) => write!(f, "aspects.{}.desc", slot.as_str()),
            TamerField::TormentMark(index) => write!(f, "torments.marks.{}", index),
            TamerField::TormentDesc => f.write_str("torments.desc"),
            TamerField::Talents => f.write_str("talents"),
            TamerField::Milestone(key) => write!(f, "milestones.{}", key),
            TamerField::FormulaRevision => f.write_str("formulaRevision"),
        }
    }
}

impl FromStr for TamerField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || DomainError::parse(format!("Unknown Tamer field path: {}", s));
        let parts: Vec<&str> = s.split('.').collect();
        let aspect = |slot: &str| match slot {
            "major" => Ok(AspectSlot::Major),
            "minor" => Ok(AspectSlot::Minor),
            _ => Err(unknown()),
        };
        let field = match parts.as_slice() {
            ["meta", "name"] => TamerField::Name,
            ["meta", "size"] => TamerField::Size,
            ["meta", "age"] => TamerField::Age,
            ["combat", "wounds"] => TamerField::Wounds,
            ["combat", "currentWounds"] => TamerField::CurrentWounds,
            ["combat", "inspiration"] => TamerField::Inspiration,
            ["combat", "milestones"] => TamerField::MilestoneTotal,
            ["combat", "speed"] => TamerField::Speed,
            ["attributes", key, "dp"] => {
                TamerField::AttributeDp(key.parse().map_err(|_| unknown())?)
            }
            ["skills", key, name] if !name.trim().is_empty() => {
                TamerField::Skill(key.parse().map_err(|_| unknown())?, (*name).to_string())
            }
            ["aspects", slot, "name"] => TamerField::AspectName(aspect(slot)?),
            ["aspects", slot, "desc"] => TamerField::AspectDesc(aspect(slot)?),
            ["torments", "marks", index] => {
                let index: usize = index.parse().map_err(|_| unknown())?;
                if index >= TORMENT_BOXES {
                    return Err(unknown());
                }
                TamerField::TormentMark(index)
            }
            ["torments", "desc"] => TamerField::TormentDesc,
            ["talents"] => TamerField::Talents,
            ["milestones", key] => TamerField::Milestone(key.parse().map_err(|_| unknown())?),
            ["formulaRevision"] => TamerField::FormulaRevision,
            _ => return Err(unknown()),
        };
        Ok(field)
    }
}

impl TamerSheet {
    /// Writes one coerced value. Unknown labels fall back instead of failing.
    pub fn set(&mut self, field: &TamerField, value: &FieldValue) -> Result<(), DomainError> {
        match field {
            TamerField::Name => self.meta.name = value.to_text(),
            TamerField::Size => self.meta.size = value.to_text().parse().unwrap_or_default(),
            TamerField::Age => self.meta.age = value.to_number_field().non_negative(),
            TamerField::Wounds => self.combat.wounds = value.to_number_field(),
            TamerField::CurrentWounds => {
                self.combat.current_wounds = value.to_number_field().non_negative()
            }
            TamerField::Inspiration => self.combat.inspiration = value.to_number_field(),
            TamerField::MilestoneTotal => self.combat.milestones = value.to_number_field(),
            TamerField::Speed => self.combat.speed = value.to_text().parse().unwrap_or_default(),
            TamerField::AttributeDp(key) => {
                self.attributes.get_mut(*key).dp = value.to_number_field()
            }
            TamerField::Skill(key, name) => self.skills.set(*key, name, value.to_number_field()),
            TamerField::AspectName(slot) => self.aspect_mut(*slot).name = value.to_text(),
            TamerField::AspectDesc(slot) => self.aspect_mut(*slot).desc = value.to_text(),
            TamerField::TormentMark(index) => {
                self.torments.marks.resize(TORMENT_BOXES, 0);
                let mark = self
                    .torments
                    .marks
                    .get_mut(*index)
                    .ok_or_else(|| DomainError::not_found("Torment box", index.to_string()))?;
                *mark = value.to_number_field().value().clamp(0, 2) as u8;
            }
            TamerField::TormentDesc => self.torments.desc = value.to_text(),
            TamerField::Talents => self.talents = value.to_text(),
            TamerField::Milestone(key) => {
                *self.milestones.get_mut(*key) = value.to_number_field().clamped(0, MILESTONE_MAX)
            }
            TamerField::FormulaRevision => {
                self.formula_revision = if value.to_text() == "legacy" {
                    FormulaRevision::Legacy
                } else {
                    FormulaRevision::Current
                }
            }
        }
        Ok(())
    }

    fn aspect_mut(&mut self, slot: AspectSlot) -> &mut super::model::Aspect {
        match slot {
            AspectSlot::Major => &mut self.aspects.major,
            AspectSlot::Minor => &mut self.aspects.minor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheets::tamer::model::{Speed, TamerSize};
    use crate::types::NumberField;

    #[test]
    fn paths_round_trip() {
        for path in [
            "meta.name",
            "meta.age",
            "combat.currentWounds",
            "combat.speed",
            "attributes.WIL.dp",
            "skills.BOD.Endurance_WIL",
            "skills.INT.Knowledge",
            "aspects.major.desc",
            "aspects.minor.name",
            "torments.marks.9",
            "torments.desc",
            "talents",
            "milestones.Qualities",
            "milestones.HP",
            "formulaRevision",
        ] {
            let field: TamerField = path.parse().unwrap();
            assert_eq!(field.to_string(), path);
        }
    }

    #[test]
    fn invalid_paths_are_parse_errors() {
        for path in [
            "attributes.LUK.dp",
            "skills.BOD",
            "skills.BOD. ",
            "aspects.middle.name",
            "torments.marks.10",
            "milestones.SPD",
            "stats.ACC.dp",
        ] {
            let err = path.parse::<TamerField>().unwrap_err();
            assert!(matches!(err, DomainError::Parse(_)), "{}", path);
        }
    }

    #[test]
    fn milestones_clamp_to_tracker_range() {
        let mut sheet = TamerSheet::new();
        let field = TamerField::Milestone(MilestoneKey::Acc);
        sheet.set(&field, &FieldValue::coerce("150")).unwrap();
        assert_eq!(sheet.milestones.acc, NumberField::Value(99));
        sheet.set(&field, &FieldValue::coerce("-3")).unwrap();
        assert_eq!(sheet.milestones.acc, NumberField::Value(0));
        sheet.set(&field, &FieldValue::coerce("")).unwrap();
        assert_eq!(sheet.milestones.acc, NumberField::Blank);
    }

    #[test]
    fn counters_do_not_go_negative() {
        let mut sheet = TamerSheet::new();
        sheet
            .set(&TamerField::Age, &FieldValue::coerce("-4"))
            .unwrap();
        sheet
            .set(&TamerField::CurrentWounds, &FieldValue::coerce("-1"))
            .unwrap();
        assert_eq!(sheet.meta.age, NumberField::Value(0));
        assert_eq!(sheet.combat.current_wounds, NumberField::Value(0));
    }

    #[test]
    fn set_skill_and_text_fields() {
        let mut sheet = TamerSheet::new();
        let field: TamerField = "skills.BOD.Endurance_WIL".parse().unwrap();
        sheet.set(&field, &FieldValue::coerce("4")).unwrap();
        assert_eq!(
            sheet.skills.get(AttributeKey::Bod, "Endurance_WIL"),
            NumberField::Value(4)
        );

        sheet
            .set(
                &TamerField::AspectDesc(AspectSlot::Major),
                &FieldValue::text("Never gives up"),
            )
            .unwrap();
        sheet
            .set(&TamerField::Talents, &FieldValue::text("42"))
            .unwrap();
        assert_eq!(sheet.aspects.major.desc, "Never gives up");
        assert_eq!(sheet.talents, "42");
    }

    #[test]
    fn set_choices_fall_back() {
        let mut sheet = TamerSheet::new();
        sheet
            .set(&TamerField::Speed, &FieldValue::coerce("Athletics"))
            .unwrap();
        sheet
            .set(&TamerField::Size, &FieldValue::coerce("Gigantic"))
            .unwrap();
        assert_eq!(sheet.combat.speed, Speed::Athletics);
        assert_eq!(sheet.meta.size, TamerSize::Medium);
    }

    #[test]
    fn set_torment_mark_clamps() {
        let mut sheet = TamerSheet::new();
        sheet
            .set(&TamerField::TormentMark(3), &FieldValue::coerce("5"))
            .unwrap();
        assert_eq!(sheet.torments.marks[3], 2);
    }
}
