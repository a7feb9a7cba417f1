//! Tabular action-value store.
//!
//! Rows are keyed by a discretized state key and hold one value per attack
//! action, kept in the order the actions were first inserted. That order is
//! the tie-break order for greedy selection.

use arena_env::{ArenaError, AttackAction, EnvironmentState};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Builds the discretized key for a state.
///
/// Only vulnerabilities, detection, security level and network activity take
/// part; `breach` and `logs_analyzed` do not.
pub fn state_key(state: &EnvironmentState) -> String {
    format!(
        "{}_{}_{}_{}",
        state.vulnerabilities, state.detection, state.security_level, state.network_activity
    )
}

/// Values for every action in one state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionValues {
    entries: Vec<(AttackAction, f64)>,
}

impl ActionValues {
    /// Creates a row with every action at zero.
    pub fn zeroed(actions: &[AttackAction]) -> Self {
        Self {
            entries: actions.iter().map(|&action| (action, 0.0)).collect(),
        }
    }

    /// Returns the value of an action, if the row has it.
    pub fn get(&self, action: AttackAction) -> Option<f64> {
        self.entries
            .iter()
            .find(|(a, _)| *a == action)
            .map(|&(_, value)| value)
    }

    /// Returns the value of an action, or zero when the row lacks it.
    pub fn value_or_zero(&self, action: AttackAction) -> f64 {
        self.get(action).unwrap_or(0.0)
    }

    /// Sets the value of an action, appending it if absent.
    pub fn set(&mut self, action: AttackAction, value: f64) {
        match self.entries.iter_mut().find(|(a, _)| *a == action) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((action, value)),
        }
    }

    /// Highest value in the row, zero for an empty row.
    pub fn max_value(&self) -> f64 {
        self.entries
            .iter()
            .map(|&(_, value)| value)
            .reduce(f64::max)
            .unwrap_or(0.0)
    }

    /// Best action in the row. Ties go to the earliest entry.
    pub fn argmax(&self) -> Option<AttackAction> {
        let mut best: Option<(AttackAction, f64)> = None;
        for &(action, value) in &self.entries {
            match best {
                Some((_, best_value)) if value <= best_value => {}
                _ => best = Some((action, value)),
            }
        }
        best.map(|(action, _)| action)
    }

    /// Best action among `candidates`, reading missing entries as zero.
    ///
    /// Ties go to the earliest candidate.
    pub fn argmax_among(&self, candidates: &[AttackAction]) -> Option<AttackAction> {
        let mut best: Option<(AttackAction, f64)> = None;
        for &action in candidates {
            let value = self.value_or_zero(action);
            match best {
                Some((_, best_value)) if value <= best_value => {}
                _ => best = Some((action, value)),
            }
        }
        best.map(|(action, _)| action)
    }

    /// Iterates `(action, value)` pairs in row order.
    pub fn iter(&self) -> impl Iterator<Item = (AttackAction, f64)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// State key → action values. Grows as new states appear and is never pruned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueTable {
    rows: BTreeMap<String, ActionValues>,
}

impl ValueTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of states learned.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns true if the state key has a row.
    pub fn contains(&self, key: &str) -> bool {
        self.rows.contains_key(key)
    }

    /// Returns the row for a state key.
    pub fn row(&self, key: &str) -> Option<&ActionValues> {
        self.rows.get(key)
    }

    /// Returns the row for a state key, creating a zeroed one if missing.
    pub fn ensure_row(&mut self, key: &str, actions: &[AttackAction]) -> &mut ActionValues {
        self.rows
            .entry(key.to_string())
            .or_insert_with(|| ActionValues::zeroed(actions))
    }

    /// Value lookup that never fails: unknown keys and actions read as zero.
    pub fn value(&self, key: &str, action: AttackAction) -> f64 {
        self.rows
            .get(key)
            .map(|row| row.value_or_zero(action))
            .unwrap_or(0.0)
    }

    /// Iterates state keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.rows.keys().map(String::as_str)
    }

    /// Serializes the table to JSON.
    pub fn to_json(&self) -> Result<String, ArenaError> {
        serde_json::to_string(self).map_err(ArenaError::serialization)
    }

    /// Restores a table from JSON produced by [`ValueTable::to_json`].
    pub fn from_json(json: &str) -> Result<Self, ArenaError> {
        serde_json::from_str(json).map_err(ArenaError::serialization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_key_ignores_flags() {
        let mut state = EnvironmentState::fresh(3, 4);
        state.detection = 2;
        state.network_activity = 1;
        assert_eq!(state_key(&state), "3_2_4_1");

        let mut flagged = state;
        flagged.breach = true;
        flagged.logs_analyzed = true;
        assert_eq!(state_key(&flagged), state_key(&state));
    }

    #[test]
    fn test_zeroed_row_covers_actions_in_order() {
        let row = ActionValues::zeroed(&AttackAction::ALL);
        let actions: Vec<_> = row.iter().map(|(a, _)| a).collect();
        assert_eq!(actions, AttackAction::ALL.to_vec());
        assert!(row.iter().all(|(_, v)| v == 0.0));
    }

    #[test]
    fn test_argmax_prefers_first_on_ties() {
        let mut row = ActionValues::zeroed(&AttackAction::ALL);
        assert_eq!(row.argmax(), Some(AttackAction::Scan));

        row.set(AttackAction::BruteForce, 2.0);
        row.set(AttackAction::SocialEngineering, 2.0);
        assert_eq!(row.argmax(), Some(AttackAction::BruteForce));
        assert_eq!(row.max_value(), 2.0);
    }

    #[test]
    fn test_argmax_among_reads_missing_as_zero() {
        let mut row = ActionValues::zeroed(&[AttackAction::Scan]);
        row.set(AttackAction::Scan, -1.0);

        let pick = row.argmax_among(&AttackAction::LOW_RISK);
        assert_eq!(pick, Some(AttackAction::SocialEngineering));
        assert_eq!(row.argmax_among(&[]), None);
    }

    #[test]
    fn test_max_value_of_negative_row() {
        let mut row = ActionValues::zeroed(&[AttackAction::Scan, AttackAction::Exploit]);
        row.set(AttackAction::Scan, -3.0);
        row.set(AttackAction::Exploit, -1.5);
        assert_eq!(row.max_value(), -1.5);
        assert_eq!(ActionValues::default().max_value(), 0.0);
    }

    #[test]
    fn test_table_lookups_never_fail() {
        let mut table = ValueTable::new();
        assert_eq!(table.value("9_9_9_9", AttackAction::Exploit), 0.0);

        table.ensure_row("1_0_3_0", &[AttackAction::Scan]).set(AttackAction::Scan, 4.0);
        assert_eq!(table.value("1_0_3_0", AttackAction::Scan), 4.0);
        assert_eq!(table.value("1_0_3_0", AttackAction::Exploit), 0.0);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_ensure_row_keeps_existing_values() {
        let mut table = ValueTable::new();
        table.ensure_row("k", &AttackAction::ALL).set(AttackAction::Exploit, 1.0);
        table.ensure_row("k", &AttackAction::ALL);
        assert_eq!(table.value("k", AttackAction::Exploit), 1.0);
    }

    #[test]
    fn test_json_snapshot_restores_rows_and_order() {
        let mut table = ValueTable::new();
        let actions = [AttackAction::SocialEngineering, AttackAction::Scan];
        table.ensure_row("3_0_3_0", &actions).set(AttackAction::Scan, 0.25);
        table.ensure_row("2_1_4_2", &AttackAction::ALL).set(AttackAction::BruteForce, -0.5);

        let restored = ValueTable::from_json(&table.to_json().unwrap()).unwrap();

        assert_eq!(restored, table);
        let order: Vec<_> = restored.row("3_0_3_0").unwrap().iter().map(|(a, _)| a).collect();
        assert_eq!(order, actions.to_vec());
    }

    #[test]
    fn test_malformed_snapshot_is_error() {
        assert!(matches!(
            ValueTable::from_json("{\"k\": [[\"hack\", 1.0]]}"),
            Err(ArenaError::SerializationError(_))
        ));
    }

    #[test]
    fn test_json_snapshot_preserves_exact_bits() {
        use rand::{Rng, SeedableRng};

        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(2024);
        let mut table = ValueTable::new();
        let mut expected = Vec::new();
        for i in 0..2000 {
            let key = format!("{}_{}_{}_{}", i % 6, i % 5, i, i % 4);
            let row = table.ensure_row(&key, &AttackAction::ALL);
            for action in AttackAction::ALL {
                let value = rng.gen::<f64>() * 40.0 - 20.0;
                row.set(action, value);
                expected.push((key.clone(), action, value));
            }
        }
        table
            .ensure_row("edge", &[AttackAction::Scan])
            .set(AttackAction::Scan, 14.991243137435703);
        expected.push(("edge".to_string(), AttackAction::Scan, 14.991243137435703));

        let restored = ValueTable::from_json(&table.to_json().unwrap()).unwrap();
        for (key, action, value) in expected {
            assert_eq!(restored.value(&key, action).to_bits(), value.to_bits(), "{} {}", key, action);
        }
    }
}
