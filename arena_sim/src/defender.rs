//! Blue team collaborators.
//!
//! The environment treats the defender's move as an opaque input. This module
//! supplies the policies that produce it:
//! - [`HeuristicDefender`]: fixed priority rules ([`recommend_action`])
//! - [`AutoDefender`]: difficulty-weighted mix of optimal, proactive and reactive play
//! - [`RandomDefender`]: uniform over the five defenses
//! - [`PromptDefender`]: a human at a terminal

use arena_core::BoundedHistory;
use arena_env::{DefenseAction, EnvironmentState};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};
use tracing::warn;

/// Source of blue team moves.
pub trait DefenderPolicy: Send {
    /// Picks the defense for the current state.
    fn choose(&mut self, state: &EnvironmentState) -> DefenseAction;

    /// Returns the name of this policy.
    fn name(&self) -> &str;
}

/// Scripted recommendation using fixed priority rules.
///
/// Highest priority first:
/// 1. many vulnerabilities (> 2) → patch
/// 2. heavy traffic (> 2) → monitor
/// 3. any traffic with logs unread → analyze
/// 4. low detection (< 2) on a soft system (security < 4) → strengthen
/// 5. high detection (> 3) → block
///
/// With no rule firing: patch while anything is left to patch, else monitor.
pub fn recommend_action(state: &EnvironmentState) -> DefenseAction {
    if state.vulnerabilities > 2 {
        DefenseAction::Patch
    } else if state.network_activity > 2 {
        DefenseAction::Monitor
    } else if state.network_activity > 0 && !state.logs_analyzed {
        DefenseAction::Analyze
    } else if state.detection < 2 && state.security_level < 4 {
        DefenseAction::Strengthen
    } else if state.detection > 3 {
        DefenseAction::Block
    } else if state.vulnerabilities > 0 {
        DefenseAction::Patch
    } else {
        DefenseAction::Monitor
    }
}

/// Always plays the recommendation.
#[derive(Debug, Default)]
pub struct HeuristicDefender;

impl DefenderPolicy for HeuristicDefender {
    fn choose(&mut self, state: &EnvironmentState) -> DefenseAction {
        recommend_action(state)
    }

    fn name(&self) -> &str {
        "heuristic"
    }
}

/// Skill level of an [`AutoDefender`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Decision weights for this level.
    pub fn weights(&self) -> DecisionWeights {
        match self {
            Difficulty::Easy => DecisionWeights { proactive: 0.2, optimal: 0.1 },
            Difficulty::Medium => DecisionWeights { proactive: 0.3, optimal: 0.3 },
            Difficulty::Hard => DecisionWeights { proactive: 0.4, optimal: 0.6 },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

/// Probabilities steering an [`AutoDefender`]. Whatever is left over is reactive play.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionWeights {
    /// Chance of playing a proactive move once the optimal roll missed
    pub proactive: f64,

    /// Chance of playing the recommendation
    pub optimal: f64,
}

/// Automated defender with a difficulty-dependent mix of play styles.
pub struct AutoDefender<R: Rng = ChaCha8Rng> {
    difficulty: Difficulty,
    weights: DecisionWeights,
    rng: R,
}

impl AutoDefender<ChaCha8Rng> {
    /// Creates a seeded automated defender.
    pub fn new(difficulty: Difficulty, seed: u64) -> Self {
        Self::with_rng(difficulty, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> AutoDefender<R> {
    pub fn with_rng(difficulty: Difficulty, rng: R) -> Self {
        Self {
            difficulty,
            weights: difficulty.weights(),
            rng,
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Hardening while things are calm, monitoring otherwise.
    pub fn proactive_action(state: &EnvironmentState) -> DefenseAction {
        if state.detection < 2 && state.network_activity < 2 {
            if state.security_level < 5 {
                return DefenseAction::Strengthen;
            } else if !state.logs_analyzed {
                return DefenseAction::Analyze;
            }
        }
        DefenseAction::Monitor
    }

    /// Responds to the most visible threat, or flails when there is none.
    pub fn reactive_action(&mut self, state: &EnvironmentState) -> DefenseAction {
        if state.vulnerabilities > 1 {
            DefenseAction::Patch
        } else if state.network_activity > 1 {
            DefenseAction::Monitor
        } else {
            random_defense(&mut self.rng)
        }
    }
}

impl<R: Rng + Send> DefenderPolicy for AutoDefender<R> {
    fn choose(&mut self, state: &EnvironmentState) -> DefenseAction {
        if self.rng.gen::<f64>() < self.weights.optimal {
            recommend_action(state)
        } else if self.rng.gen::<f64>() < self.weights.proactive {
            Self::proactive_action(state)
        } else {
            self.reactive_action(state)
        }
    }

    fn name(&self) -> &str {
        self.difficulty.name()
    }
}

/// Uniformly random defender.
pub struct RandomDefender<R: Rng = ChaCha8Rng> {
    rng: R,
}

impl RandomDefender<ChaCha8Rng> {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng + Send> DefenderPolicy for RandomDefender<R> {
    fn choose(&mut self, _state: &EnvironmentState) -> DefenseAction {
        random_defense(&mut self.rng)
    }

    fn name(&self) -> &str {
        "random"
    }
}

fn random_defense<R: Rng>(rng: &mut R) -> DefenseAction {
    DefenseAction::ALL[rng.gen_range(0..DefenseAction::ALL.len())]
}

/// Human defender reading choices from a line-oriented input.
///
/// Accepts a menu number (1-5) or an action name and re-prompts on anything
/// else. When input runs out it falls back to the recommendation so the round
/// loop keeps going.
pub struct PromptDefender<I, O> {
    input: I,
    output: O,
    exhausted: bool,
}

impl<I: BufRead, O: Write> PromptDefender<I, O> {
    pub fn new(input: I, output: O) -> Self {
        Self {
            input,
            output,
            exhausted: false,
        }
    }

    fn render_menu(&mut self, state: &EnvironmentState) -> std::io::Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "System: {}", state)?;
        writeln!(self.output, "Blue Team Actions:")?;
        for (i, action) in DefenseAction::ALL.iter().enumerate() {
            writeln!(self.output, "{}. {} - {}", i + 1, action.name(), action.description())?;
        }
        self.output.flush()
    }

    /// Prompts until a valid choice arrives. `Ok(None)` means input ended.
    fn read_choice(&mut self) -> std::io::Result<Option<DefenseAction>> {
        loop {
            write!(self.output, "Choose your action (1-{}): ", DefenseAction::ALL.len())?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }

            let choice = line.trim();
            if let Ok(index) = choice.parse::<usize>() {
                if (1..=DefenseAction::ALL.len()).contains(&index) {
                    return Ok(Some(DefenseAction::ALL[index - 1]));
                }
            } else if let Ok(action) = choice.parse::<DefenseAction>() {
                return Ok(Some(action));
            }

            writeln!(self.output, "Invalid choice. Please select 1-{}.", DefenseAction::ALL.len())?;
        }
    }

    /// Consumes the defender, returning its output sink.
    pub fn into_output(self) -> O {
        self.output
    }
}

impl<I: BufRead + Send, O: Write + Send> DefenderPolicy for PromptDefender<I, O> {
    fn choose(&mut self, state: &EnvironmentState) -> DefenseAction {
        if !self.exhausted {
            let choice = self.render_menu(state).and_then(|_| self.read_choice());
            match choice {
                Ok(Some(action)) => return action,
                Ok(None) => warn!("Defender input closed; switching to recommended actions"),
                Err(e) => warn!("Defender prompt failed ({}); switching to recommended actions", e),
            }
            self.exhausted = true;
        }
        recommend_action(state)
    }

    fn name(&self) -> &str {
        "interactive"
    }
}

/// Per-defender performance record.
#[derive(Debug, Clone)]
pub struct DefenderLedger {
    history: BoundedHistory<DefenseAction>,
    actions_taken: u64,
    rounds_played: u64,
    rounds_won: u64,
}

/// Summary of a defender's match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefenderSummary {
    pub total_actions: u64,
    pub rounds_played: u64,
    pub rounds_won: u64,

    /// Percentage of rounds won
    pub win_rate: f64,

    /// Last ten actions, oldest first
    pub recent_actions: Vec<DefenseAction>,
}

impl DefenderLedger {
    pub fn new() -> Self {
        Self {
            history: BoundedHistory::new(50),
            actions_taken: 0,
            rounds_played: 0,
            rounds_won: 0,
        }
    }

    pub fn record_action(&mut self, action: DefenseAction) {
        self.history.push(action);
        self.actions_taken += 1;
    }

    pub fn record_round(&mut self, won: bool) {
        self.rounds_played += 1;
        if won {
            self.rounds_won += 1;
        }
    }

    pub fn summary(&self) -> DefenderSummary {
        let win_rate = if self.rounds_played == 0 {
            0.0
        } else {
            self.rounds_won as f64 / self.rounds_played as f64 * 100.0
        };

        DefenderSummary {
            total_actions: self.actions_taken,
            rounds_played: self.rounds_played,
            rounds_won: self.rounds_won,
            win_rate,
            recent_actions: self.history.recent(10).copied().collect(),
        }
    }
}

impl Default for DefenderLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn state(vulnerabilities: u32, detection: u32, security_level: u32, network_activity: u32) -> EnvironmentState {
        EnvironmentState {
            vulnerabilities,
            detection,
            security_level,
            network_activity,
            breach: false,
            logs_analyzed: false,
        }
    }

    #[test]
    fn test_recommendation_priorities() {
        assert_eq!(recommend_action(&state(3, 5, 3, 5)), DefenseAction::Patch);
        assert_eq!(recommend_action(&state(2, 0, 3, 3)), DefenseAction::Monitor);
        assert_eq!(recommend_action(&state(2, 0, 3, 1)), DefenseAction::Analyze);
        assert_eq!(recommend_action(&state(2, 1, 3, 0)), DefenseAction::Strengthen);
        assert_eq!(recommend_action(&state(2, 4, 6, 0)), DefenseAction::Block);
        assert_eq!(recommend_action(&state(1, 2, 6, 0)), DefenseAction::Patch);
        assert_eq!(recommend_action(&state(0, 2, 6, 0)), DefenseAction::Monitor);
    }

    #[test]
    fn test_recommendation_skips_analyzed_logs() {
        let mut s = state(0, 2, 6, 1);
        s.logs_analyzed = true;
        assert_eq!(recommend_action(&s), DefenseAction::Monitor);
    }

    #[test]
    fn test_proactive_rules() {
        type Auto = AutoDefender<ChaCha8Rng>;
        assert_eq!(Auto::proactive_action(&state(1, 0, 3, 0)), DefenseAction::Strengthen);
        assert_eq!(Auto::proactive_action(&state(1, 0, 5, 0)), DefenseAction::Analyze);
        assert_eq!(Auto::proactive_action(&state(1, 3, 3, 0)), DefenseAction::Monitor);

        let mut analyzed = state(1, 0, 5, 0);
        analyzed.logs_analyzed = true;
        assert_eq!(Auto::proactive_action(&analyzed), DefenseAction::Monitor);
    }

    #[test]
    fn test_reactive_rules() {
        let mut defender = AutoDefender::new(Difficulty::Easy, 1);
        assert_eq!(defender.reactive_action(&state(2, 0, 3, 5)), DefenseAction::Patch);
        assert_eq!(defender.reactive_action(&state(1, 0, 3, 2)), DefenseAction::Monitor);
    }

    #[test]
    fn test_auto_defender_is_seeded() {
        let states = [state(3, 0, 3, 0), state(1, 2, 4, 1), state(0, 4, 7, 3), state(1, 1, 5, 0)];
        let play = |seed| {
            let mut defender = AutoDefender::new(Difficulty::Medium, seed);
            (0..100).map(|i| defender.choose(&states[i % states.len()])).collect::<Vec<_>>()
        };
        assert_eq!(play(9), play(9));
    }

    #[test]
    fn test_hard_defender_plays_optimal_more_often() {
        // Here the recommendation and proactive play disagree
        let s = state(1, 0, 3, 1);
        assert_eq!(recommend_action(&s), DefenseAction::Analyze);

        let optimal_rate = |difficulty| {
            let mut defender = AutoDefender::new(difficulty, 17);
            let trials = 3000;
            let hits = (0..trials)
                .filter(|_| defender.choose(&s) == DefenseAction::Analyze)
                .count();
            hits as f64 / trials as f64
        };

        assert!(optimal_rate(Difficulty::Hard) > optimal_rate(Difficulty::Easy));
    }

    #[test]
    fn test_random_defender_covers_all_actions() {
        let mut defender = RandomDefender::new(3);
        let s = EnvironmentState::default();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(defender.choose(&s));
        }
        assert_eq!(seen.len(), DefenseAction::ALL.len());
    }

    #[test]
    fn test_prompt_defender_reprompts_on_invalid_input() {
        let input = Cursor::new("9\nhack\n3\nanalyze\n");
        let mut defender = PromptDefender::new(input, Vec::new());
        let s = EnvironmentState::default();

        assert_eq!(defender.choose(&s), DefenseAction::Block);
        assert_eq!(defender.choose(&s), DefenseAction::Analyze);

        let output = String::from_utf8(defender.into_output()).unwrap();
        assert_eq!(output.matches("Invalid choice").count(), 2);
        assert!(output.contains("1. patch - Fix vulnerabilities in the system"));
    }

    #[test]
    fn test_prompt_defender_falls_back_when_input_ends() {
        let mut defender = PromptDefender::new(Cursor::new(""), Vec::new());
        let s = state(3, 0, 3, 0);
        assert_eq!(defender.choose(&s), DefenseAction::Patch);
        assert_eq!(defender.choose(&state(0, 2, 6, 0)), DefenseAction::Monitor);
    }

    /// Sink that rejects every write.
    struct ClosedOutput;

    impl Write for ClosedOutput {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn test_prompt_defender_stops_reading_when_output_fails() {
        let mut defender = PromptDefender::new(Cursor::new("3\n3\n"), ClosedOutput);
        let s = state(3, 0, 3, 0);

        assert_eq!(defender.choose(&s), DefenseAction::Patch);
        assert_eq!(defender.choose(&state(0, 2, 6, 0)), DefenseAction::Monitor);
        assert_eq!(defender.input.position(), 0);
    }

    #[test]
    fn test_ledger_summary() {
        let mut ledger = DefenderLedger::new();
        for i in 0..60 {
            ledger.record_action(DefenseAction::ALL[i % 5]);
        }
        ledger.record_round(true);
        ledger.record_round(false);
        ledger.record_round(true);
        ledger.record_round(true);

        let summary = ledger.summary();
        assert_eq!(summary.total_actions, 60);
        assert_eq!(summary.rounds_won, 3);
        assert_eq!(summary.win_rate, 75.0);
        assert_eq!(summary.recent_actions.len(), 10);
        assert_eq!(summary.recent_actions.last(), Some(&DefenseAction::Analyze));
    }
}
