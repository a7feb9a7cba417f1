//! Arena - the match container.
//!
//! Owns the environment, the attacker, the defender and the scoreboard and
//! drives the round loop one step at a time. Pacing lives in the runner, so
//! everything here is synchronous and deterministic for a given seed.

use crate::defender::{DefenderLedger, DefenderPolicy, DefenderSummary};
use crate::profiles::DefenderProfile;

use arena_core::{AgentConfig, NetworkEnvironment, RedTeamAgent, Strategy};
use arena_env::{ArenaError, AttackAction, DefenseAction, EnvironmentState};
use serde::{Deserialize, Serialize};

/// Configuration for a match.
#[derive(Debug, Clone)]
pub struct ArenaConfig {
    /// Master seed for determinism
    pub seed: u64,

    /// Rounds to play
    pub rounds: u32,

    /// The defender wins once detection exceeds this
    pub detection_threshold: u32,

    /// Steps after which a round is called off
    pub max_steps_per_round: u32,

    /// Which defender plays blue
    pub profile: DefenderProfile,

    /// Game speed multiplier used for pacing
    pub speed: f64,

    /// Attacker hyperparameters
    pub agent: AgentConfig,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            rounds: 10,
            detection_threshold: 4,
            max_steps_per_round: 200,
            profile: DefenderProfile::default(),
            speed: 1.0,
            agent: AgentConfig::default(),
        }
    }
}

impl ArenaConfig {
    pub fn validate(&self) -> Result<(), ArenaError> {
        if self.rounds == 0 {
            return Err(ArenaError::invalid_config("rounds must be at least 1"));
        }
        if !(self.speed.is_finite() && self.speed > 0.0) {
            return Err(ArenaError::invalid_config("speed must be a positive number"));
        }
        // Detection is capped at 5, so a threshold of 5 or more could never trigger
        if self.detection_threshold >= arena_core::environment::MAX_DETECTION {
            return Err(ArenaError::invalid_config(format!(
                "detection_threshold must be below {}",
                arena_core::environment::MAX_DETECTION
            )));
        }
        if self.max_steps_per_round == 0 {
            return Err(ArenaError::invalid_config("max_steps_per_round must be at least 1"));
        }
        self.agent.validate()
    }

    /// Seed for the environment.
    pub fn environment_seed(&self) -> u64 {
        self.seed
    }

    /// Seed for the attacker.
    pub fn agent_seed(&self) -> u64 {
        self.seed.wrapping_mul(0x9e3779b97f4a7c15)
    }

    /// Seed for the defender.
    pub fn defender_seed(&self) -> u64 {
        self.seed.wrapping_mul(0x517cc1b727220a95)
    }
}

/// How a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundOutcome {
    /// The attacker breached the system
    RedBreach,

    /// Detection crossed the threshold
    BlueDetection,

    /// Step cap reached with neither side winning
    Halted,
}

impl RoundOutcome {
    pub fn winner(&self) -> &'static str {
        match self {
            RoundOutcome::RedBreach => "red",
            RoundOutcome::BlueDetection => "blue",
            RoundOutcome::Halted => "none",
        }
    }
}

/// One resolved step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub round: u32,

    /// 1-based within the round
    pub step: u32,

    pub defense: DefenseAction,
    pub attack: AttackAction,

    /// Attacker strategy at decision time
    pub strategy: Strategy,

    pub reward: i32,
    pub before: EnvironmentState,
    pub after: EnvironmentState,
}

/// One finished round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    pub round: u32,
    pub outcome: RoundOutcome,
    pub steps: u32,

    /// Sum of raw attacker rewards over the round
    pub total_reward: i64,

    pub final_state: EnvironmentState,
}

/// Running tally of the match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scoreboard {
    pub rounds: u32,
    pub red_wins: u32,
    pub blue_wins: u32,
    pub halted: u32,
    pub total_steps: u64,
}

impl Scoreboard {
    pub fn record(&mut self, result: &RoundResult) {
        self.rounds += 1;
        self.total_steps += result.steps as u64;
        match result.outcome {
            RoundOutcome::RedBreach => self.red_wins += 1,
            RoundOutcome::BlueDetection => self.blue_wins += 1,
            RoundOutcome::Halted => self.halted += 1,
        }
    }

    /// Percentage of rounds won by red.
    pub fn red_win_rate(&self) -> f64 {
        percentage(self.red_wins, self.rounds)
    }

    /// Percentage of rounds won by blue.
    pub fn blue_win_rate(&self) -> f64 {
        percentage(self.blue_wins, self.rounds)
    }

    pub fn average_steps(&self) -> f64 {
        if self.rounds == 0 {
            0.0
        } else {
            self.total_steps as f64 / self.rounds as f64
        }
    }

    /// Overall winner so far: "red", "blue" or "tie".
    pub fn leader(&self) -> &'static str {
        if self.red_wins > self.blue_wins {
            "red"
        } else if self.blue_wins > self.red_wins {
            "blue"
        } else {
            "tie"
        }
    }
}

fn percentage(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// The Arena - container for a whole match.
pub struct Arena {
    config: ArenaConfig,
    environment: NetworkEnvironment,
    agent: RedTeamAgent,
    defender: Box<dyn DefenderPolicy>,
    ledger: DefenderLedger,
    scoreboard: Scoreboard,

    /// Current round number (1-based, 0 before the first round)
    round: u32,

    state: EnvironmentState,
    steps: u32,
    round_reward: i64,
}

impl Arena {
    /// Creates an arena with the defender named by the config's profile.
    pub fn new(config: ArenaConfig) -> Result<Self, ArenaError> {
        let defender = config.profile.build(config.defender_seed());
        Self::with_defender(config, defender)
    }

    /// Creates an arena around an explicit defender.
    pub fn with_defender(config: ArenaConfig, defender: Box<dyn DefenderPolicy>) -> Result<Self, ArenaError> {
        config.validate()?;

        let environment = NetworkEnvironment::new(config.environment_seed());
        let agent = RedTeamAgent::with_config(config.agent_seed(), config.agent.clone(), AttackAction::ALL.to_vec())?;
        let state = *environment.state();

        Ok(Self {
            config,
            environment,
            agent,
            defender,
            ledger: DefenderLedger::new(),
            scoreboard: Scoreboard::default(),
            round: 0,
            state,
            steps: 0,
            round_reward: 0,
        })
    }

    /// Resets the environment for the next round and returns its opening state.
    pub fn begin_round(&mut self) -> EnvironmentState {
        self.round += 1;
        self.steps = 0;
        self.round_reward = 0;
        self.state = self.environment.reset();
        self.state
    }

    /// Plays one step: defender picks, attacker picks, environment resolves,
    /// attacker learns.
    pub fn play_step(&mut self) -> StepRecord {
        let before = self.state;

        let defense = self.defender.choose(&before);
        let attack = self.agent.choose_action(&before);
        let strategy = self.agent.strategy();

        let (after, reward) = self.environment.step_actions(Some(attack), Some(defense));
        self.agent.learn(&before, attack, reward as f64, &after);

        self.ledger.record_action(defense);
        self.state = after;
        self.steps += 1;
        self.round_reward += reward as i64;

        StepRecord {
            round: self.round,
            step: self.steps,
            defense,
            attack,
            strategy,
            reward,
            before,
            after,
        }
    }

    /// Returns the outcome if the current round is over.
    pub fn round_outcome(&self) -> Option<RoundOutcome> {
        if self.state.breach {
            Some(RoundOutcome::RedBreach)
        } else if self.state.detection > self.config.detection_threshold {
            Some(RoundOutcome::BlueDetection)
        } else if self.steps >= self.config.max_steps_per_round {
            Some(RoundOutcome::Halted)
        } else {
            None
        }
    }

    /// Closes the current round and records it on the scoreboard.
    pub fn finish_round(&mut self, outcome: RoundOutcome) -> RoundResult {
        let result = RoundResult {
            round: self.round,
            outcome,
            steps: self.steps,
            total_reward: self.round_reward,
            final_state: self.state,
        };

        self.scoreboard.record(&result);
        self.ledger.record_round(outcome == RoundOutcome::BlueDetection);
        result
    }

    /// Plays a full round without pacing.
    pub fn play_round(&mut self) -> (RoundResult, Vec<StepRecord>) {
        self.begin_round();
        let mut steps = Vec::new();

        loop {
            if let Some(outcome) = self.round_outcome() {
                return (self.finish_round(outcome), steps);
            }
            steps.push(self.play_step());
        }
    }

    /// Returns true once every configured round has been played.
    pub fn is_finished(&self) -> bool {
        self.scoreboard.rounds >= self.config.rounds
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    pub fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    pub fn agent(&self) -> &RedTeamAgent {
        &self.agent
    }

    pub fn state(&self) -> &EnvironmentState {
        &self.state
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn defender_name(&self) -> &str {
        self.defender.name()
    }

    pub fn defender_summary(&self) -> DefenderSummary {
        self.ledger.summary()
    }
}
