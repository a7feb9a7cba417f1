//! Red team learning agent.
//!
//! Tabular Q-learning with three twists on plain epsilon-greedy:
//! - a strategy mode recomputed from the state before every choice
//! - strategy-biased exploration and exploitation
//! - a small shaping bonus for strategy-coherent actions
//!
//! Every agent owns its table, histories and RNG. Nothing is global, so
//! independent agents can be trained side by side.

use crate::history::BoundedHistory;
use crate::strategy::Strategy;
use crate::value_table::{state_key, ValueTable};

use arena_env::{ArenaError, AttackAction, EnvironmentState};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Learning hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Step size of the temporal-difference update (alpha)
    pub learning_rate: f64,

    /// Weight of the best next-state value (gamma)
    pub discount: f64,

    /// Exploration rate at construction
    pub initial_epsilon: f64,

    /// Floor for exploration rate
    pub min_epsilon: f64,

    /// Multiplicative decay applied after every update
    pub epsilon_decay: f64,

    /// Probability of restricting a greedy pick to the strategy's actions
    pub strategy_bias: f64,

    /// Shaping bonus for strategy-coherent actions
    pub coherence_bonus: f64,

    /// Capacity of the action and reward histories
    pub history_capacity: usize,

    /// Number of recent rewards averaged in stats
    pub stats_window: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            discount: 0.9,
            initial_epsilon: 0.3,
            min_epsilon: 0.05,
            epsilon_decay: 0.995,
            strategy_bias: 0.7,
            coherence_bonus: 0.5,
            history_capacity: 100,
            stats_window: 10,
        }
    }
}

impl AgentConfig {
    /// Checks that every rate is a usable probability or factor.
    pub fn validate(&self) -> Result<(), ArenaError> {
        let unit = |value: f64| (0.0..=1.0).contains(&value);

        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(ArenaError::invalid_config("learning_rate must be in (0, 1]"));
        }
        if !unit(self.discount) {
            return Err(ArenaError::invalid_config("discount must be in [0, 1]"));
        }
        if !unit(self.min_epsilon) || !unit(self.initial_epsilon) || self.min_epsilon > self.initial_epsilon {
            return Err(ArenaError::invalid_config(
                "epsilon bounds must satisfy 0 <= min_epsilon <= initial_epsilon <= 1",
            ));
        }
        if !(self.epsilon_decay > 0.0 && self.epsilon_decay <= 1.0) {
            return Err(ArenaError::invalid_config("epsilon_decay must be in (0, 1]"));
        }
        if !unit(self.strategy_bias) {
            return Err(ArenaError::invalid_config("strategy_bias must be in [0, 1]"));
        }
        Ok(())
    }
}

/// Learning progress summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentStats {
    /// Distinct states in the value table
    pub states_learned: usize,

    /// Current exploration rate
    pub epsilon: f64,

    /// Strategy chosen at the last decision
    pub current_strategy: Strategy,

    /// Mean raw reward over the recent window (0 when nothing learned yet)
    pub avg_recent_reward: f64,

    /// Learning updates applied
    pub updates: u64,
}

/// The attacker.
pub struct RedTeamAgent<R: Rng = ChaCha8Rng> {
    config: AgentConfig,

    /// Actions this agent may pick, in tie-break order
    actions: Vec<AttackAction>,

    table: ValueTable,
    epsilon: f64,
    strategy: Strategy,

    action_history: BoundedHistory<AttackAction>,

    /// Raw rewards, before shaping
    reward_history: BoundedHistory<f64>,

    updates: u64,
    rng: R,
}

impl RedTeamAgent<ChaCha8Rng> {
    /// Creates a seeded agent over every attack action with default config.
    pub fn new(seed: u64) -> Self {
        Self::build(ChaCha8Rng::seed_from_u64(seed), AgentConfig::default(), AttackAction::ALL.to_vec())
    }

    /// Creates a seeded agent with explicit config and action set.
    pub fn with_config(
        seed: u64,
        config: AgentConfig,
        actions: Vec<AttackAction>,
    ) -> Result<Self, ArenaError> {
        Self::with_rng(ChaCha8Rng::seed_from_u64(seed), config, actions)
    }
}

impl<R: Rng> RedTeamAgent<R> {
    /// Creates an agent drawing from the given RNG.
    ///
    /// Fails if the action set is empty or the config is out of range.
    pub fn with_rng(rng: R, config: AgentConfig, actions: Vec<AttackAction>) -> Result<Self, ArenaError> {
        if actions.is_empty() {
            return Err(ArenaError::EmptyActionSet);
        }
        config.validate()?;
        Ok(Self::build(rng, config, actions))
    }

    fn build(rng: R, config: AgentConfig, mut actions: Vec<AttackAction>) -> Self {
        let mut seen = Vec::with_capacity(actions.len());
        actions.retain(|action| {
            let fresh = !seen.contains(action);
            seen.push(*action);
            fresh
        });

        Self {
            epsilon: config.initial_epsilon,
            action_history: BoundedHistory::new(config.history_capacity),
            reward_history: BoundedHistory::new(config.history_capacity),
            config,
            actions,
            table: ValueTable::new(),
            strategy: Strategy::default(),
            updates: 0,
            rng,
        }
    }

    /// Replaces the value table, e.g. with a restored snapshot.
    pub fn with_table(mut self, table: ValueTable) -> Self {
        self.table = table;
        self
    }

    /// Picks the attacker's next move.
    pub fn choose_action(&mut self, state: &EnvironmentState) -> AttackAction {
        self.strategy = Strategy::adapt(state);
        let key = state_key(state);

        // Explore on the epsilon roll, or when the state has never been seen
        let roll: f64 = self.rng.gen();
        let row = self.table.row(&key).filter(|_| roll >= self.epsilon).cloned();
        let Some(row) = row else {
            return self.explore(state);
        };

        let preferred: Vec<AttackAction> = self
            .strategy
            .preferred_actions()
            .iter()
            .copied()
            .filter(|action| self.actions.contains(action))
            .collect();

        if !preferred.is_empty() && self.rng.gen::<f64>() < self.config.strategy_bias {
            if let Some(action) = row.argmax_among(&preferred) {
                return action;
            }
        }

        // Imported rows may carry actions this agent is not allowed to play
        row.argmax_among(&self.actions).unwrap_or_else(|| self.explore(state))
    }

    /// Strategy-guided exploration.
    fn explore(&mut self, state: &EnvironmentState) -> AttackAction {
        match self.strategy {
            Strategy::Stealth if state.detection > 2 => {
                let quiet: Vec<AttackAction> = AttackAction::LOW_RISK
                    .iter()
                    .copied()
                    .filter(|action| self.actions.contains(action))
                    .collect();
                if !quiet.is_empty() {
                    return quiet[self.rng.gen_range(0..quiet.len())];
                }
            }
            Strategy::Aggressive if state.vulnerabilities > 0 => {
                if self.actions.contains(&AttackAction::Exploit) {
                    return AttackAction::Exploit;
                }
            }
            _ => {}
        }

        self.actions[self.rng.gen_range(0..self.actions.len())]
    }

    /// Shaping bonus for `action` in `state` under the current strategy.
    pub fn strategy_bonus(&self, action: AttackAction, state: &EnvironmentState) -> f64 {
        if self.strategy.is_coherent(action, state) {
            self.config.coherence_bonus
        } else {
            0.0
        }
    }

    /// Applies one temporal-difference update.
    ///
    /// `reward` is the raw step reward; the shaping bonus is added here and
    /// only the raw value is kept in the history.
    pub fn learn(
        &mut self,
        state: &EnvironmentState,
        action: AttackAction,
        reward: f64,
        next_state: &EnvironmentState,
    ) {
        let key = state_key(state);
        let next_key = state_key(next_state);

        self.table.ensure_row(&key, &self.actions);
        let best_next = self.table.ensure_row(&next_key, &self.actions).max_value();

        let shaped = reward + self.strategy_bonus(action, state);

        let row = self.table.ensure_row(&key, &self.actions);
        let current = row.value_or_zero(action);
        let updated = current + self.config.learning_rate * (shaped + self.config.discount * best_next - current);
        row.set(action, updated);

        self.action_history.push(action);
        self.reward_history.push(reward);
        self.updates += 1;

        self.epsilon = (self.epsilon * self.config.epsilon_decay).max(self.config.min_epsilon);
    }

    /// Returns the learning progress summary.
    pub fn stats(&self) -> AgentStats {
        let window = self.config.stats_window;
        let recent: Vec<f64> = self.reward_history.recent(window).copied().collect();
        let avg_recent_reward = if recent.is_empty() {
            0.0
        } else {
            recent.iter().sum::<f64>() / recent.len() as f64
        };

        AgentStats {
            states_learned: self.table.len(),
            epsilon: self.epsilon,
            current_strategy: self.strategy,
            avg_recent_reward,
            updates: self.updates,
        }
    }

    /// How often each available action appears in the history.
    pub fn action_usage(&self) -> Vec<(AttackAction, usize)> {
        self.actions
            .iter()
            .map(|&action| {
                let count = self.action_history.iter().filter(|&&a| a == action).count();
                (action, count)
            })
            .collect()
    }

    /// Serializes the value table to JSON.
    pub fn export_table(&self) -> Result<String, ArenaError> {
        self.table.to_json()
    }

    /// Replaces the value table from a JSON snapshot.
    pub fn import_table(&mut self, json: &str) -> Result<(), ArenaError> {
        self.table = ValueTable::from_json(json)?;
        Ok(())
    }

    pub fn value_table(&self) -> &ValueTable {
        &self.table
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn actions(&self) -> &[AttackAction] {
        &self.actions
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Recent actions, oldest first.
    pub fn recent_actions(&self) -> impl Iterator<Item = AttackAction> + '_ {
        self.action_history.iter().copied()
    }

    /// Recent raw rewards, oldest first.
    pub fn recent_rewards(&self) -> impl Iterator<Item = f64> + '_ {
        self.reward_history.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn state(vulnerabilities: u32, detection: u32) -> EnvironmentState {
        EnvironmentState {
            vulnerabilities,
            detection,
            ..EnvironmentState::default()
        }
    }

    fn greedy_config() -> AgentConfig {
        AgentConfig {
            initial_epsilon: 0.0,
            min_epsilon: 0.0,
            ..AgentConfig::default()
        }
    }

    #[test]
    fn test_imported_row_cannot_force_unavailable_action() {
        let config = AgentConfig {
            strategy_bias: 0.0,
            ..greedy_config()
        };
        let quiet = vec![AttackAction::Scan, AttackAction::SocialEngineering];
        let mut agent = RedTeamAgent::with_config(3, config, quiet.clone()).unwrap();

        let s = state(2, 2);
        let mut table = ValueTable::new();
        let row = table.ensure_row(&state_key(&s), &AttackAction::ALL);
        row.set(AttackAction::Exploit, 9.0);
        row.set(AttackAction::SocialEngineering, 1.0);
        agent.import_table(&table.to_json().unwrap()).unwrap();

        for _ in 0..20 {
            assert_eq!(agent.choose_action(&s), AttackAction::SocialEngineering);
        }
    }

    #[test]
    fn test_learn_initializes_unseen_rows() {
        let mut agent = RedTeamAgent::new(1);
        let s = state(2, 2);
        let next = state(1, 3);

        agent.learn(&s, AttackAction::Scan, 1.0, &next);

        let table = agent.value_table();
        assert_eq!(table.len(), 2);
        for key in [state_key(&s), state_key(&next)] {
            let row = table.row(&key).unwrap();
            assert_eq!(row.len(), AttackAction::ALL.len());
        }
        assert!(table.row(&state_key(&next)).unwrap().iter().all(|(_, v)| v == 0.0));

        let row = table.row(&state_key(&s)).unwrap();
        assert_relative_eq!(row.value_or_zero(AttackAction::Scan), 0.1, epsilon = 1e-9);
        assert_eq!(row.value_or_zero(AttackAction::Exploit), 0.0);
    }

    #[test]
    fn test_update_uses_best_next_value() {
        let mut agent = RedTeamAgent::new(1);
        let s = state(2, 2);
        let next = state(1, 2);

        agent.learn(&next, AttackAction::Scan, 10.0, &state(0, 0));
        agent.learn(&s, AttackAction::Exploit, 0.0, &next);

        // 0.1 * (0 + 0.9 * 1.0 - 0)
        assert_relative_eq!(agent.value_table().value(&state_key(&s), AttackAction::Exploit), 0.09, epsilon = 1e-9);
    }

    #[test]
    fn test_coherent_action_gets_shaping_bonus() {
        let mut agent = RedTeamAgent::new(3);
        let s = state(3, 0);
        assert_eq!(agent.choose_action(&s), AttackAction::Exploit);
        assert_eq!(agent.strategy(), Strategy::Aggressive);

        agent.learn(&s, AttackAction::Exploit, 5.0, &state(2, 0));

        assert_relative_eq!(agent.value_table().value(&state_key(&s), AttackAction::Exploit), 0.55, epsilon = 1e-9);
        assert_eq!(agent.recent_rewards().collect::<Vec<_>>(), vec![5.0]);
        assert_relative_eq!(agent.stats().avg_recent_reward, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_epsilon_decays_to_floor() {
        let mut agent = RedTeamAgent::new(4);
        let s = state(2, 2);
        let mut last = agent.epsilon();
        assert_relative_eq!(last, 0.3, epsilon = 1e-9);

        for _ in 0..2000 {
            agent.learn(&s, AttackAction::Scan, 0.0, &s);
            let epsilon = agent.epsilon();
            assert!(epsilon <= last);
            assert!(epsilon >= 0.05);
            last = epsilon;
        }
        assert_eq!(last, 0.05);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut agent = RedTeamAgent::new(4);
        let s = state(2, 2);
        for i in 0..150 {
            agent.learn(&s, AttackAction::Scan, i as f64, &s);
        }
        assert_eq!(agent.recent_rewards().count(), 100);
        assert_eq!(agent.recent_rewards().next(), Some(50.0));
        assert_eq!(agent.recent_actions().count(), 100);

        // mean of 140..=149
        assert_relative_eq!(agent.stats().avg_recent_reward, 144.5, epsilon = 1e-9);
        assert_eq!(agent.stats().updates, 150);
    }

    #[test]
    fn test_stats_before_learning() {
        let agent = RedTeamAgent::new(0);
        let stats = agent.stats();
        assert_eq!(stats.states_learned, 0);
        assert_eq!(stats.avg_recent_reward, 0.0);
        assert_eq!(stats.current_strategy, Strategy::Adaptive);
    }

    #[test]
    fn test_unseen_aggressive_state_exploits() {
        let mut agent = RedTeamAgent::new(10);
        for _ in 0..20 {
            assert_eq!(agent.choose_action(&state(3, 1)), AttackAction::Exploit);
        }
    }

    #[test]
    fn test_unseen_stealth_state_stays_quiet() {
        let mut agent = RedTeamAgent::new(10);
        for _ in 0..50 {
            let action = agent.choose_action(&state(1, 4));
            assert!(action.is_low_risk());
            assert_eq!(agent.strategy(), Strategy::Stealth);
        }
    }

    #[test]
    fn test_greedy_pick_follows_table() {
        let mut agent = RedTeamAgent::with_config(2, greedy_config(), AttackAction::ALL.to_vec()).unwrap();
        let s = state(2, 2);
        agent.learn(&s, AttackAction::BruteForce, 10.0, &state(1, 1));

        for _ in 0..20 {
            assert_eq!(agent.choose_action(&s), AttackAction::BruteForce);
        }
    }

    #[test]
    fn test_aggressive_bias_prefers_high_impact() {
        let mut agent = RedTeamAgent::with_config(6, greedy_config(), AttackAction::ALL.to_vec()).unwrap();
        let s = state(3, 0);
        agent.learn(&s, AttackAction::Scan, 50.0, &state(3, 1));
        agent.learn(&s, AttackAction::Exploit, 10.0, &state(3, 1));

        let trials = 2000;
        let exploits = (0..trials)
            .filter(|_| agent.choose_action(&s) == AttackAction::Exploit)
            .count();

        let rate = exploits as f64 / trials as f64;
        assert!(rate > 0.64 && rate < 0.76, "rate = {}", rate);
    }

    #[test]
    fn test_restricted_action_set() {
        let mut agent = RedTeamAgent::with_config(1, AgentConfig::default(), vec![AttackAction::Scan]).unwrap();
        for detection in 0..=5 {
            for vulnerabilities in 0..=3 {
                assert_eq!(agent.choose_action(&state(vulnerabilities, detection)), AttackAction::Scan);
            }
        }
    }

    #[test]
    fn test_duplicate_actions_are_collapsed() {
        let agent = RedTeamAgent::with_config(
            1,
            AgentConfig::default(),
            vec![AttackAction::Scan, AttackAction::Exploit, AttackAction::Scan],
        )
        .unwrap();
        assert_eq!(agent.actions(), &[AttackAction::Scan, AttackAction::Exploit]);
    }

    #[test]
    fn test_learning_outside_action_set_degrades_quietly() {
        let mut agent = RedTeamAgent::with_config(1, AgentConfig::default(), vec![AttackAction::Scan]).unwrap();
        let s = state(2, 2);

        agent.learn(&s, AttackAction::Exploit, 1.0, &s);

        let row = agent.value_table().row(&state_key(&s)).unwrap();
        assert_eq!(row.get(AttackAction::Scan), Some(0.0));
        assert_relative_eq!(row.value_or_zero(AttackAction::Exploit), 0.1, epsilon = 1e-9);
    }

    #[test]
    fn test_empty_action_set_is_rejected() {
        let result = RedTeamAgent::with_config(1, AgentConfig::default(), Vec::new());
        assert!(matches!(result, Err(ArenaError::EmptyActionSet)));
    }

    #[test]
    fn test_bad_config_is_rejected() {
        let config = AgentConfig {
            initial_epsilon: 0.01,
            min_epsilon: 0.05,
            ..AgentConfig::default()
        };
        let result = RedTeamAgent::with_config(1, config, AttackAction::ALL.to_vec());
        assert!(matches!(result, Err(ArenaError::InvalidConfig(_))));
    }

    #[test]
    fn test_agents_are_independent() {
        let mut a = RedTeamAgent::new(1);
        let b = RedTeamAgent::new(1);
        a.learn(&state(2, 2), AttackAction::Scan, 1.0, &state(2, 3));

        assert_eq!(a.stats().states_learned, 2);
        assert_eq!(b.stats().states_learned, 0);
        assert!(b.epsilon() > a.epsilon());
    }

    #[test]
    fn test_restored_table_reproduces_choices() {
        let mut trainer = RedTeamAgent::new(77);
        let mut env = crate::environment::NetworkEnvironment::new(77);
        let defenses = ["patch", "monitor", "block", "strengthen", "analyze"];
        for round in 0..40 {
            let mut s = env.reset();
            for step in 0..12 {
                if s.breach || s.detection > 4 {
                    break;
                }
                let action = trainer.choose_action(&s);
                let (next, reward) = env.step(action.name(), defenses[(round + step) % defenses.len()]);
                trainer.learn(&s, action, reward as f64, &next);
                s = next;
            }
        }

        let json = trainer.export_table().unwrap();
        let mut original = RedTeamAgent::new(5).with_table(trainer.value_table().clone());
        let mut restored = RedTeamAgent::new(5);
        restored.import_table(&json).unwrap();
        assert_eq!(restored.value_table(), original.value_table());

        for vulnerabilities in 0..=4 {
            for detection in 0..=5 {
                for network_activity in 0..=3 {
                    let s = EnvironmentState {
                        vulnerabilities,
                        detection,
                        network_activity,
                        security_level: 3 + detection,
                        ..EnvironmentState::default()
                    };
                    assert_eq!(original.choose_action(&s), restored.choose_action(&s));
                }
            }
        }
    }
}
