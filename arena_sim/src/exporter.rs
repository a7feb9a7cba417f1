//! JSON match export.
//!
//! Records one frame per step for offline viewing. The file is write-only;
//! nothing in the arena reads it back.

use crate::runner::{MatchReport, RoundObserver};
use crate::world::{RoundOutcome, RoundResult, StepRecord};

use arena_core::{AgentStats, Strategy};
use arena_env::{ArenaError, AttackAction, DefenseAction, EnvironmentState};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// A single step of match data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepFrame {
    pub round: u32,
    pub step: u32,
    pub defense: DefenseAction,
    pub attack: AttackAction,
    pub strategy: Strategy,
    pub reward: i32,

    /// State after the step
    pub state: EnvironmentState,
}

impl From<&StepRecord> for StepFrame {
    fn from(record: &StepRecord) -> Self {
        Self {
            round: record.round,
            step: record.step,
            defense: record.defense,
            attack: record.attack,
            strategy: record.strategy,
            reward: record.reward,
            state: record.after,
        }
    }
}

/// Round summary with the attacker's learning stats at its end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundSummary {
    pub round: u32,
    pub outcome: RoundOutcome,
    pub steps: u32,
    pub total_reward: i64,
    pub initial_state: EnvironmentState,
    pub final_state: EnvironmentState,
    pub agent: AgentStats,
}

/// Complete match export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchExport {
    /// Defender profile name
    pub defender: String,

    /// Seed used
    pub seed: u64,

    /// All step frames
    pub frames: Vec<StepFrame>,

    /// One entry per finished round
    pub rounds: Vec<RoundSummary>,

    /// Final results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<MatchReport>,
}

impl MatchExport {
    /// Creates a new export container.
    pub fn new(defender: &str, seed: u64) -> Self {
        Self {
            defender: defender.to_string(),
            seed,
            frames: Vec::new(),
            rounds: Vec::new(),
            report: None,
        }
    }

    /// Adds a frame.
    pub fn add_frame(&mut self, frame: StepFrame) {
        self.frames.push(frame);
    }

    /// Finalizes the export.
    pub fn finalize(&mut self, report: MatchReport) {
        self.report = Some(report);
    }

    pub fn to_json(&self) -> Result<String, ArenaError> {
        serde_json::to_string_pretty(self).map_err(ArenaError::serialization)
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<(), ArenaError> {
        let json = self.to_json()?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

/// Observer that fills a [`MatchExport`] as the match plays.
#[derive(Debug)]
pub struct MatchRecorder {
    export: MatchExport,
    initial_state: EnvironmentState,
}

impl MatchRecorder {
    pub fn new(defender: &str, seed: u64) -> Self {
        Self {
            export: MatchExport::new(defender, seed),
            initial_state: EnvironmentState::default(),
        }
    }

    pub fn export(&self) -> &MatchExport {
        &self.export
    }

    /// Finalizes with the match report and returns the export.
    pub fn finish(mut self, report: MatchReport) -> MatchExport {
        self.export.finalize(report);
        self.export
    }
}

impl RoundObserver for MatchRecorder {
    fn on_round_start(&mut self, _round: u32, state: &EnvironmentState) {
        self.initial_state = *state;
    }

    fn on_step(&mut self, record: &StepRecord) {
        self.export.add_frame(StepFrame::from(record));
    }

    fn on_round_end(&mut self, result: &RoundResult, stats: &AgentStats) {
        self.export.rounds.push(RoundSummary {
            round: result.round,
            outcome: result.outcome,
            steps: result.steps,
            total_reward: result.total_reward,
            initial_state: self.initial_state,
            final_state: result.final_state,
            agent: stats.clone(),
        });
    }
}
