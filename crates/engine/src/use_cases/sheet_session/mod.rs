//! Sheet session use cases.
//!
//! A session owns one open sheet and keeps its displayed totals consistent
//! with it. Every change runs the same cycle: mutate the model, recompute
//! every output from scratch, and publish the new snapshot. Outputs are
//! never patched incrementally and never written back into the model.

mod error;

pub use error::SessionError;

use serde_json::{Map, Value};

use digisheet_domain::{
    ComputedValues, DigimonEngine, DomainError, FieldValue, FormulaEngine, HealthBar,
    QualityEntry, SheetField, SheetModel, TamerEngine, TamerField,
};

/// The typed field of an engine's sheet.
pub type FieldOf<E> = <<E as FormulaEngine>::Sheet as SheetModel>::Field;

// =============================================================================
// Types
// =============================================================================

/// Where a session is in its edit cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Recomputing,
}

/// One field write and the value it was coerced to.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange<F> {
    pub field: F,
    pub value: FieldValue,
}

/// Result of one change to a sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct EditOutcome<F> {
    /// Field writes in the order they were applied. Empty for structural
    /// changes such as adding an attack.
    pub changes: Vec<FieldChange<F>>,
    /// Every derived output after the change.
    pub outputs: ComputedValues,
    pub health: HealthBar,
}

// =============================================================================
// Session
// =============================================================================

/// One open sheet, its engine, and the last published outputs.
#[derive(Debug, Clone)]
pub struct SheetSession<E: FormulaEngine> {
    engine: E,
    model: E::Sheet,
    outputs: ComputedValues,
    health: HealthBar,
    state: SessionState,
}

impl<E: FormulaEngine> SheetSession<E> {
    /// Normalizes the model and publishes its first outputs.
    pub fn new(engine: E, mut model: E::Sheet) -> Self {
        model.normalize();
        engine.refresh_caches(&mut model);
        let outputs = engine.compute_all(&model);
        let health = engine.health_bar(&model);
        Self {
            engine,
            model,
            outputs,
            health,
            state: SessionState::Idle,
        }
    }

    /// Builds a session from a document's raw `data` object.
    pub fn from_data(engine: E, data: &Map<String, Value>) -> Result<Self, SessionError> {
        let model: E::Sheet = serde_json::from_value(Value::Object(data.clone()))?;
        Ok(Self::new(engine, model))
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn model(&self) -> &E::Sheet {
        &self.model
    }

    pub fn outputs(&self) -> &ComputedValues {
        &self.outputs
    }

    pub fn health(&self) -> HealthBar {
        self.health
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The model as a document `data` object.
    pub fn to_data(&self) -> Result<Map<String, Value>, SessionError> {
        match serde_json::to_value(&self.model)? {
            Value::Object(data) => Ok(data),
            _ => Err(SessionError::NotAnObject),
        }
    }

    /// Applies raw input typed into the field at `path`.
    ///
    /// The path is parsed before anything is touched, so an unknown path
    /// leaves the sheet and its outputs as they were.
    pub fn apply_edit(
        &mut self,
        path: &str,
        raw: &str,
    ) -> Result<EditOutcome<FieldOf<E>>, SessionError> {
        let field: FieldOf<E> = path.parse()?;
        let value = field.coerce(raw);
        self.apply(field, value)
    }

    /// Writes an already coerced value.
    pub fn apply(
        &mut self,
        field: FieldOf<E>,
        value: FieldValue,
    ) -> Result<EditOutcome<FieldOf<E>>, SessionError> {
        self.model.set_field(&field, &value)?;
        self.recompute()?;

        tracing::debug!(field = %field, kind = %self.engine.kind(), "Applied sheet edit");

        Ok(self.outcome(vec![FieldChange { field, value }]))
    }

    /// Applies several edits and recomputes once.
    ///
    /// Validates all paths first, then writes into a draft so a failing
    /// write leaves the sheet unchanged.
    pub fn apply_edits(
        &mut self,
        edits: &[(&str, &str)],
    ) -> Result<EditOutcome<FieldOf<E>>, SessionError> {
        let mut changes = Vec::with_capacity(edits.len());
        for (path, raw) in edits {
            let field: FieldOf<E> = path.parse()?;
            let value = field.coerce(raw);
            changes.push(FieldChange { field, value });
        }

        let mut draft = self.model.clone();
        for change in &changes {
            draft.set_field(&change.field, &change.value)?;
        }
        self.model = draft;
        self.recompute()?;

        tracing::debug!(
            fields_updated = changes.len(),
            kind = %self.engine.kind(),
            "Applied sheet edits"
        );

        Ok(self.outcome(changes))
    }

    /// Swaps in a whole new model, as when a document is loaded into an
    /// open tab.
    pub fn replace_model(
        &mut self,
        mut model: E::Sheet,
    ) -> Result<EditOutcome<FieldOf<E>>, SessionError> {
        model.normalize();
        self.model = model;
        self.recompute()?;
        Ok(self.outcome(Vec::new()))
    }

    fn outcome(&self, changes: Vec<FieldChange<FieldOf<E>>>) -> EditOutcome<FieldOf<E>> {
        EditOutcome {
            changes,
            outputs: self.outputs.clone(),
            health: self.health,
        }
    }

    /// Recomputes every output and overwrites the published snapshot.
    fn recompute(&mut self) -> Result<(), SessionError> {
        self.transition(SessionState::Recomputing)?;
        self.engine.refresh_caches(&mut self.model);
        self.outputs = self.engine.compute_all(&self.model);
        self.health = self.engine.health_bar(&self.model);
        self.transition(SessionState::Idle)?;

        tracing::debug!(
            kind = %self.engine.kind(),
            outputs = self.outputs.len(),
            health = %self.health.label(),
            "Recomputed sheet"
        );
        Ok(())
    }

    fn transition(&mut self, to: SessionState) -> Result<(), DomainError> {
        if self.state == to {
            return Err(DomainError::invalid_state_transition(format!(
                "Sheet session is already {:?}",
                to
            )));
        }
        self.state = to;
        Ok(())
    }

    /// Mutates the model through `change`, then recomputes.
    fn structural<T>(
        &mut self,
        change: impl FnOnce(&mut E::Sheet) -> Result<T, DomainError>,
    ) -> Result<(T, EditOutcome<FieldOf<E>>), SessionError> {
        let result = change(&mut self.model)?;
        self.recompute()?;
        Ok((result, self.outcome(Vec::new())))
    }
}

// =============================================================================
// Digimon
// =============================================================================

pub type DigimonSession = SheetSession<DigimonEngine>;

impl SheetSession<DigimonEngine> {
    /// Appends a blank attack. Returns its index.
    pub fn add_attack(
        &mut self,
    ) -> Result<(usize, EditOutcome<FieldOf<DigimonEngine>>), SessionError> {
        self.structural(|sheet| Ok(sheet.add_attack()))
    }

    /// Removes an attack. The signature move at index 0 is refused.
    pub fn remove_attack(
        &mut self,
        index: usize,
    ) -> Result<EditOutcome<FieldOf<DigimonEngine>>, SessionError> {
        let (_, outcome) = self.structural(|sheet| sheet.remove_attack(index))?;
        Ok(outcome)
    }

    /// Adds a validated quality. Returns its index in the list.
    pub fn add_quality(
        &mut self,
        entry: QualityEntry,
    ) -> Result<(usize, EditOutcome<FieldOf<DigimonEngine>>), SessionError> {
        let name = entry.name.clone();
        let added = self.structural(|sheet| sheet.add_quality(entry))?;
        tracing::debug!(quality = %name, index = added.0, "Added quality");
        Ok(added)
    }

    pub fn remove_quality(
        &mut self,
        index: usize,
    ) -> Result<EditOutcome<FieldOf<DigimonEngine>>, SessionError> {
        let (_, outcome) = self.structural(|sheet| sheet.remove_quality(index))?;
        Ok(outcome)
    }
}

// =============================================================================
// Tamer
// =============================================================================

pub type TamerSession = SheetSession<TamerEngine>;

impl SheetSession<TamerEngine> {
    /// Advances one torment box through empty, marked, and crossed out.
    pub fn cycle_torment(
        &mut self,
        index: usize,
    ) -> Result<EditOutcome<TamerField>, SessionError> {
        let (mark, mut outcome) = self.structural(|sheet| sheet.cycle_torment(index))?;
        outcome.changes.push(FieldChange {
            field: TamerField::TormentMark(index),
            value: FieldValue::Number(f64::from(mark)),
        });
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use digisheet_domain::sheets::digimon::StatKey;
    use digisheet_domain::{
        AttributeKey, DigimonField, DigimonSheet, HealthBand, QualityType, Stage, TamerSheet,
        LEAF_LIMIT,
    };
    use serde_json::json;

    fn digimon_session() -> DigimonSession {
        SheetSession::new(DigimonEngine::new(), DigimonSheet::new())
    }

    fn tamer_session() -> TamerSession {
        SheetSession::new(TamerEngine::new(), TamerSheet::new())
    }

    #[test]
    fn fresh_digimon_publishes_outputs() {
        let session = digimon_session();
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.outputs().get_by_name("stat:ACC"), Some(2));
        assert_eq!(session.outputs().get_by_name("derived:BIT"), Some(2));
        assert_eq!(session.outputs().get_by_name("totalDP"), Some(10));
        assert_eq!(session.health().band, HealthBand::Good);
    }

    #[test]
    fn edit_recomputes_dependents() {
        let mut session = digimon_session();
        let outcome = session.apply_edit("stats.ACC.dp", "4").unwrap();

        assert_eq!(outcome.changes.len(), 1);
        assert_eq!(outcome.changes[0].field, DigimonField::StatDp(StatKey::Acc));
        assert_eq!(outcome.changes[0].value, FieldValue::Number(4.0));
        assert_eq!(outcome.outputs.get_by_name("stat:ACC"), Some(6));
        // (2 + 4 + 3) / 3
        assert_eq!(outcome.outputs.get_by_name("derived:BIT"), Some(4));
        assert_eq!(outcome.outputs.get_by_name("statDP"), Some(4));
        assert_eq!(session.outputs(), &outcome.outputs);
    }

    #[test]
    fn blank_input_keeps_blank_leaf() {
        let mut session = digimon_session();
        session.apply_edit("stats.DOD.dp", "3").unwrap();
        let outcome = session.apply_edit("stats.DOD.dp", "  ").unwrap();

        assert_eq!(outcome.changes[0].value, FieldValue::Empty);
        assert_eq!(outcome.outputs.get_by_name("stat:DOD"), Some(2));
        let data = session.to_data().unwrap();
        assert_eq!(data["stats"]["DOD"]["dp"], json!(""));
    }

    #[test]
    fn unknown_path_changes_nothing() {
        let mut session = digimon_session();
        let before = session.model().clone();
        let err = session.apply_edit("stats.XYZ.dp", "3").unwrap_err();

        assert!(matches!(err, SessionError::Domain(DomainError::Parse(_))));
        assert_eq!(session.model(), &before);
    }

    #[test]
    fn batch_edits_are_all_or_nothing() {
        let mut session = digimon_session();
        let err = session
            .apply_edits(&[("stats.ACC.dp", "2"), ("attacks.4.name", "Pepper Breath")])
            .unwrap_err();
        assert!(matches!(err, SessionError::Domain(_)));
        assert_eq!(session.outputs().get_by_name("stat:ACC"), Some(2));

        let outcome = session
            .apply_edits(&[("meta.stage", "Adult"), ("stats.HP.dp", "4"), ("stats.HP.bonus", "1")])
            .unwrap();
        assert_eq!(outcome.changes.len(), 3);
        assert_eq!(outcome.outputs.get_by_name("stat:HP"), Some(8));
        // (3 - 1) + 8 * 2 - 1
        assert_eq!(outcome.outputs.get_by_name("woundTotal"), Some(17));
    }

    #[test]
    fn same_edits_give_same_outputs() {
        let edits = [("meta.stage", "Perfect"), ("meta.size", "large"), ("stats.ARM.dp", "5")];
        let mut first = digimon_session();
        let mut second = digimon_session();
        assert_eq!(
            first.apply_edits(&edits).unwrap().outputs,
            second.apply_edits(&edits).unwrap().outputs
        );
    }

    #[test]
    fn quality_cost_moves_spent_dp() {
        let mut session = digimon_session();
        let before = session.outputs().get_by_name("spentDP").unwrap();

        let (index, outcome) = session
            .add_quality(QualityEntry::new("Armor Plating", QualityType::Static, 5, ""))
            .unwrap();
        assert_eq!(index, 0);
        assert_eq!(outcome.outputs.get_by_name("spentDP"), Some(before + 5));

        let outcome = session.remove_quality(0).unwrap();
        assert_eq!(outcome.outputs.get_by_name("spentDP"), Some(before));
    }

    #[test]
    fn invalid_quality_is_refused() {
        let mut session = digimon_session();
        let err = session
            .add_quality(QualityEntry::new("  ", QualityType::Static, 1, ""))
            .unwrap_err();
        assert!(matches!(err, SessionError::Domain(DomainError::Validation(_))));
    }

    #[test]
    fn signature_attack_stays() {
        let mut session = digimon_session();
        let (index, _) = session.add_attack().unwrap();
        assert_eq!(index, 1);
        session.remove_attack(1).unwrap();

        let err = session.remove_attack(0).unwrap_err();
        assert!(matches!(err, SessionError::Domain(DomainError::Constraint(_))));
        assert_eq!(session.model().attacks.len(), 1);
    }

    #[test]
    fn replace_model_normalizes_and_recomputes() {
        let mut session = digimon_session();
        let mut model = DigimonSheet::new();
        model.meta.stage = Stage::Ultimate;
        model.attacks.clear();

        let outcome = session.replace_model(model).unwrap();
        assert!(outcome.changes.is_empty());
        assert_eq!(outcome.outputs.get_by_name("batteryTotal"), Some(5));
        assert_eq!(session.model().attacks.len(), 1);
    }

    #[test]
    fn from_data_reads_lenient_documents() {
        let data = json!({
            "meta": { "stage": "Adult", "size": "huge" },
            "stats": { "ACC": { "dp": "abc", "bonus": 2 } },
            "qualities": "Old notes"
        });
        let session =
            SheetSession::from_data(DigimonEngine::new(), data.as_object().unwrap()).unwrap();
        assert_eq!(session.outputs().get_by_name("stat:ACC"), Some(5));
        assert_eq!(session.outputs().get_by_name("derived:DOS"), Some(3));
    }

    #[test]
    fn torment_cycles_back_to_empty() {
        let mut session = tamer_session();
        let marks: Vec<FieldValue> = (0..3)
            .map(|_| session.cycle_torment(4).unwrap().changes[0].value.clone())
            .collect();
        assert_eq!(
            marks,
            vec![
                FieldValue::Number(1.0),
                FieldValue::Number(2.0),
                FieldValue::Number(0.0)
            ]
        );
        assert!(session.model().torments.marks.iter().all(|mark| *mark == 0));

        let err = session.cycle_torment(10).unwrap_err();
        assert!(matches!(err, SessionError::Domain(DomainError::NotFound { .. })));
    }

    #[test]
    fn tamer_edit_refreshes_special_orders() {
        let mut session = tamer_session();
        assert!(session.model().special_orders.available.is_empty());

        let outcome = session.apply_edit("attributes.INT.dp", "5").unwrap();
        assert_eq!(outcome.outputs.get_by_name("attr:INT"), Some(6));
        assert_eq!(session.model().special_orders.available, vec!["INT-5", "INT-6"]);

        session.apply_edit("attributes.INT.dp", "1").unwrap();
        assert!(session.model().special_orders.available.is_empty());
        assert_eq!(
            session.engine().attribute_total(session.model(), AttributeKey::Int),
            2
        );
    }

    #[test]
    fn tamer_wounds_follow_endurance() {
        let mut session = tamer_session();
        let outcome = session
            .apply_edits(&[("skills.BOD.Endurance_WIL", "2"), ("combat.currentWounds", "4")])
            .unwrap();
        assert_eq!(outcome.outputs.get_by_name("combat:woundTotal"), Some(5));
        assert_eq!(outcome.health.current, 4);
        assert_eq!(outcome.health.band, HealthBand::Danger);
    }

    #[test]
    fn boundary_numbers_still_produce_outputs() {
        let data = json!({
            "meta": { "stage": "Adult" },
            "stats": {
                "ACC": { "dp": i32::MAX, "bonus": i32::MIN },
                "DOD": { "dp": 1e300, "bonus": "-99999999999999" }
            },
            "combat": { "currentWounds": i64::MAX },
            "dp": { "bonus": -1e18 }
        });
        let session =
            SheetSession::from_data(DigimonEngine::new(), data.as_object().unwrap()).unwrap();
        assert_eq!(session.outputs().get_by_name("stat:ACC"), Some(3));
        assert_eq!(session.outputs().get_by_name("stat:DOD"), Some(3));
        assert_eq!(session.outputs().get_by_name("totalDP"), Some(20 - LEAF_LIMIT));
        assert!(session.outputs().get_by_name("woundTotal").is_some());
        assert_eq!(session.health().band, HealthBand::Danger);

        let data = json!({
            "attributes": { "AGI": { "dp": i32::MIN }, "CHA": { "dp": "1e40" } },
            "skills": { "BOD": { "Endurance_WIL": i32::MAX } }
        });
        let session =
            SheetSession::from_data(TamerEngine::new(), data.as_object().unwrap()).unwrap();
        assert_eq!(session.outputs().get_by_name("attr:AGI"), Some(1 - LEAF_LIMIT));
        assert_eq!(session.outputs().get_by_name("attr:CHA"), Some(1 + LEAF_LIMIT));
        assert_eq!(
            session.outputs().get_by_name("combat:woundTotal"),
            Some(3 + LEAF_LIMIT)
        );
        assert_eq!(session.model().special_orders.available, vec!["CHA-5", "CHA-6", "CHA-7"]);
    }
}
