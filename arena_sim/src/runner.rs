//! Match runner - drives an [`Arena`] through its rounds with pacing.
//!
//! Delays go through an [`ArenaContext`], so the same loop runs in real time
//! on [`arena_env::TokioContext`] or instantly on the virtual-clock
//! [`crate::SimContext`].

use crate::defender::DefenderSummary;
use crate::world::{Arena, RoundOutcome, RoundResult, StepRecord};

use arena_core::AgentStats;
use arena_env::{ArenaContext, EnvironmentState};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Delays between steps and between rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub step_delay: Duration,
    pub round_delay: Duration,
}

impl Pacing {
    /// Pacing for a speed multiplier: `max(0.1, 1/speed)` seconds per step and
    /// `max(0.5, 2/speed)` seconds between rounds.
    ///
    /// Delays too long for a `Duration` saturate at `Duration::MAX`.
    pub fn from_speed(speed: f64) -> Self {
        Self {
            step_delay: secs_saturating((1.0 / speed).max(0.1)),
            round_delay: secs_saturating((2.0 / speed).max(0.5)),
        }
    }

    /// No delays at all.
    pub fn none() -> Self {
        Self {
            step_delay: Duration::ZERO,
            round_delay: Duration::ZERO,
        }
    }
}

fn secs_saturating(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

/// Callbacks fired by the round loop.
///
/// Every presentation mode is one implementation of this trait.
pub trait RoundObserver {
    fn on_round_start(&mut self, _round: u32, _state: &EnvironmentState) {}

    fn on_step(&mut self, _record: &StepRecord) {}

    fn on_round_end(&mut self, _result: &RoundResult, _stats: &AgentStats) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default)]
pub struct NullObserver;

impl RoundObserver for NullObserver {}

impl<A: RoundObserver, B: RoundObserver> RoundObserver for (A, B) {
    fn on_round_start(&mut self, round: u32, state: &EnvironmentState) {
        self.0.on_round_start(round, state);
        self.1.on_round_start(round, state);
    }

    fn on_step(&mut self, record: &StepRecord) {
        self.0.on_step(record);
        self.1.on_step(record);
    }

    fn on_round_end(&mut self, result: &RoundResult, stats: &AgentStats) {
        self.0.on_round_end(result, stats);
        self.1.on_round_end(result, stats);
    }
}

impl<T: RoundObserver + ?Sized> RoundObserver for &mut T {
    fn on_round_start(&mut self, round: u32, state: &EnvironmentState) {
        (**self).on_round_start(round, state);
    }

    fn on_step(&mut self, record: &StepRecord) {
        (**self).on_step(record);
    }

    fn on_round_end(&mut self, result: &RoundResult, stats: &AgentStats) {
        (**self).on_round_end(result, stats);
    }
}

/// Console presentation through `tracing`.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl RoundObserver for TracingObserver {
    fn on_round_start(&mut self, round: u32, state: &EnvironmentState) {
        info!("━━━ Round {} ━━━", round);
        info!("  Initial state: {}", state);
    }

    fn on_step(&mut self, record: &StepRecord) {
        debug!(
            "  Step {}: blue={} red={} strategy={} reward={} | {}",
            record.step, record.defense, record.attack, record.strategy, record.reward, record.after
        );
    }

    fn on_round_end(&mut self, result: &RoundResult, stats: &AgentStats) {
        match result.outcome {
            RoundOutcome::RedBreach => info!("  Red team breached the system after {} steps", result.steps),
            RoundOutcome::BlueDetection => {
                info!("  Blue team detected and stopped the attack after {} steps", result.steps)
            }
            RoundOutcome::Halted => warn!("  Round {} halted after {} steps without a winner", result.round, result.steps),
        }
        info!(
            "  Agent: states={} epsilon={:.2}% strategy={} avg_reward={:.2}",
            stats.states_learned,
            stats.epsilon * 100.0,
            stats.current_strategy,
            stats.avg_recent_reward
        );
    }
}

/// Final results of a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    pub seed: u64,
    pub defender: String,
    pub rounds: u32,
    pub red_wins: u32,
    pub blue_wins: u32,
    pub halted: u32,

    /// Percentages of rounds played
    pub red_win_rate: f64,
    pub blue_win_rate: f64,

    pub average_steps: f64,

    /// Mean round duration on the context clock, in seconds
    pub average_round_secs: f64,

    /// Whole match on the context clock, in seconds
    pub total_secs: f64,

    /// "red", "blue" or "tie"
    pub winner: String,

    pub agent: AgentStats,
    pub defender_stats: DefenderSummary,
}

/// Runs a match.
pub struct MatchRunner {
    arena: Arena,
    pacing: Pacing,
}

impl MatchRunner {
    /// Creates a runner paced by the arena's configured speed.
    pub fn new(arena: Arena) -> Self {
        let pacing = Pacing::from_speed(arena.config().speed);
        Self { arena, pacing }
    }

    /// Sets the pacing.
    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn pacing(&self) -> Pacing {
        self.pacing
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Plays every remaining round and returns the report.
    pub async fn run<C, O>(&mut self, ctx: &C, mut observer: O) -> MatchReport
    where
        C: ArenaContext + ?Sized,
        O: RoundObserver,
    {
        let seed = self.arena.config().seed;
        info!(
            "Starting match: {} rounds vs {} defender (seed={})",
            self.arena.config().rounds,
            self.arena.defender_name(),
            seed
        );

        let match_start = ctx.now();
        let mut round_time = Duration::ZERO;

        while !self.arena.is_finished() {
            let round_start = ctx.now();
            let state = self.arena.begin_round();
            observer.on_round_start(self.arena.round(), &state);

            let outcome = loop {
                if let Some(outcome) = self.arena.round_outcome() {
                    break outcome;
                }
                let record = self.arena.play_step();
                observer.on_step(&record);
                ctx.sleep(self.pacing.step_delay).await;
            };

            let result = self.arena.finish_round(outcome);
            round_time = round_time.saturating_add(ctx.now().saturating_sub(round_start));
            observer.on_round_end(&result, &self.arena.agent().stats());

            if !self.arena.is_finished() {
                ctx.sleep(self.pacing.round_delay).await;
            }
        }

        let total = ctx.now().saturating_sub(match_start);
        let report = self.report(round_time, total);

        info!(
            "Match complete: red {} ({:.1}%) | blue {} ({:.1}%) | halted {} | winner: {}",
            report.red_wins, report.red_win_rate, report.blue_wins, report.blue_win_rate, report.halted, report.winner
        );

        report
    }

    fn report(&self, round_time: Duration, total: Duration) -> MatchReport {
        let board = self.arena.scoreboard();
        let average_round_secs = if board.rounds == 0 {
            0.0
        } else {
            round_time.as_secs_f64() / board.rounds as f64
        };

        MatchReport {
            seed: self.arena.config().seed,
            defender: self.arena.defender_name().to_string(),
            rounds: board.rounds,
            red_wins: board.red_wins,
            blue_wins: board.blue_wins,
            halted: board.halted,
            red_win_rate: board.red_win_rate(),
            blue_win_rate: board.blue_win_rate(),
            average_steps: board.average_steps(),
            average_round_secs,
            total_secs: total.as_secs_f64(),
            winner: board.leader().to_string(),
            agent: self.arena.agent().stats(),
            defender_stats: self.arena.defender_summary(),
        }
    }
}
