//! Network Environment - the system under attack.
//!
//! A step resolves in a fixed order:
//! 1. Defender effect (deterministic apart from the `strengthen` reveal roll)
//! 2. Attacker effect, which yields this step's detection risk
//! 3. One detection-risk roll, then penalties, stealth bonus, clamp and decay
//!
//! All randomness comes from a single RNG owned by the environment, so a
//! seeded environment replays identically for the same action sequence.

use arena_env::{AttackAction, DefenseAction, EnvironmentState};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Vulnerabilities every round starts with before difficulty escalation.
pub const BASE_VULNERABILITIES: u32 = 3;

/// Security level every round starts with.
pub const BASE_SECURITY_LEVEL: u32 = 3;

/// Detection cap.
pub const MAX_DETECTION: u32 = 5;

/// Success chance of a brute-force attempt at the given security level.
///
/// `max(0.1, 0.5 - security_level * 0.1)`
pub fn brute_force_success_chance(security_level: u32) -> f64 {
    (0.5 - security_level as f64 * 0.1).max(0.1)
}

/// Roll threshold an exploit must exceed to succeed.
pub fn exploit_threshold(security_level: u32) -> f64 {
    security_level as f64 * 0.1
}

/// The environment - owns the round state and its random source.
pub struct NetworkEnvironment<R: Rng = ChaCha8Rng> {
    /// Current round state
    state: EnvironmentState,

    /// Vulnerability ceiling for the current round
    max_vulnerabilities: u32,

    /// Detection ceiling
    max_detection: u32,

    /// Rounds started so far
    round: u64,

    /// RNG for every roll in reset and step
    rng: R,
}

impl NetworkEnvironment<ChaCha8Rng> {
    /// Creates a seeded environment.
    pub fn new(seed: u64) -> Self {
        Self::with_rng(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> NetworkEnvironment<R> {
    /// Creates an environment drawing from the given RNG.
    pub fn with_rng(rng: R) -> Self {
        Self {
            state: EnvironmentState::fresh(BASE_VULNERABILITIES, BASE_SECURITY_LEVEL),
            max_vulnerabilities: BASE_VULNERABILITIES,
            max_detection: MAX_DETECTION,
            round: 0,
            rng,
        }
    }

    /// Starts a new round and returns its opening state.
    ///
    /// Past round 20 there is a 30% chance of a fourth vulnerability; when that
    /// roll misses and the round is past 50, a 20% chance of a fifth.
    pub fn reset(&mut self) -> EnvironmentState {
        self.round += 1;

        let mut max_vulnerabilities = BASE_VULNERABILITIES;
        if self.round > 20 && self.rng.gen::<f64>() < 0.3 {
            max_vulnerabilities = 4;
        } else if self.round > 50 && self.rng.gen::<f64>() < 0.2 {
            max_vulnerabilities = 5;
        }

        self.max_vulnerabilities = max_vulnerabilities;
        self.state = EnvironmentState::fresh(max_vulnerabilities, BASE_SECURITY_LEVEL);
        self.state
    }

    /// Advances the round by one step using action names.
    ///
    /// Names that do not parse contribute nothing; the step still runs its
    /// post-processing.
    pub fn step(&mut self, attacker_action: &str, defender_action: &str) -> (EnvironmentState, i32) {
        let attack = attacker_action.parse::<AttackAction>().ok();
        if attack.is_none() {
            debug!(action = attacker_action, "ignoring unrecognized attacker action");
        }

        let defense = defender_action.parse::<DefenseAction>().ok();
        if defense.is_none() {
            debug!(action = defender_action, "ignoring unrecognized defender action");
        }

        self.step_actions(attack, defense)
    }

    /// Advances the round by one step. `None` on either side is a no-op move.
    ///
    /// Returns the updated state and the attacker's reward for this step only.
    pub fn step_actions(
        &mut self,
        attack: Option<AttackAction>,
        defense: Option<DefenseAction>,
    ) -> (EnvironmentState, i32) {
        let mut reward = 0;

        if let Some(defense) = defense {
            self.apply_defense(defense, &mut reward);
        }

        let detection_risk = match attack {
            Some(attack) => self.apply_attack(attack, &mut reward),
            None => 0,
        };

        // Risk realization: one roll per step, proportional to this step's risk
        if self.rng.gen::<f64>() < detection_risk as f64 * 0.3 {
            self.state.detection += detection_risk;
        }

        if self.state.detection > 2 {
            reward -= (self.state.detection as i32 - 2) * 2;
        }

        if self.state.detection == 0 && self.state.network_activity > 0 {
            reward += 1;
        }

        self.state.detection = self.state.detection.min(self.max_detection);
        self.state.network_activity = self.state.network_activity.saturating_sub(1);

        (self.state, reward)
    }

    fn apply_defense(&mut self, defense: DefenseAction, reward: &mut i32) {
        let state = &mut self.state;

        match defense {
            DefenseAction::Patch => {
                if state.vulnerabilities > 0 {
                    state.vulnerabilities -= 1;
                    state.security_level += 1;
                }
            }
            DefenseAction::Monitor => {
                state.detection += 2;
                if state.network_activity > 0 {
                    state.detection += 1;
                }
            }
            DefenseAction::Block => {
                // Collateral damage to legitimate traffic
                *reward -= 2;
                state.detection += 1;
                if state.network_activity > 2 {
                    state.network_activity -= 1;
                }
            }
            DefenseAction::Strengthen => {
                state.security_level += 2;
                if self.rng.gen::<f64>() < 0.4 && state.vulnerabilities < self.max_vulnerabilities {
                    state.vulnerabilities += 1;
                }
            }
            DefenseAction::Analyze => {
                state.logs_analyzed = true;
                if state.network_activity > 0 {
                    state.detection += 3;
                }
            }
        }
    }

    /// Applies the attacker effect and returns the detection risk it carries.
    fn apply_attack(&mut self, attack: AttackAction, reward: &mut i32) -> u32 {
        let state = &mut self.state;

        match attack {
            AttackAction::Scan => {
                *reward += 1;
                state.network_activity += 1;
                if state.logs_analyzed { 3 } else { 1 }
            }
            AttackAction::Exploit => {
                if state.vulnerabilities == 0 {
                    return 0;
                }

                state.vulnerabilities -= 1;
                state.network_activity += 2;
                *reward += 5;

                let roll: f64 = self.rng.gen();
                if roll > exploit_threshold(state.security_level) {
                    if state.vulnerabilities == 0 {
                        state.breach = true;
                        *reward += 15;
                    }
                    2
                } else {
                    *reward -= 2;
                    3
                }
            }
            AttackAction::BruteForce => {
                state.network_activity += 3;
                if self.rng.gen::<f64>() < brute_force_success_chance(state.security_level) {
                    state.breach = true;
                    *reward += 12;
                    3
                } else {
                    *reward -= 3;
                    5
                }
            }
            AttackAction::SocialEngineering => {
                state.network_activity += 1;
                if self.rng.gen::<f64>() < 0.35 {
                    state.breach = true;
                    *reward += 10;
                    if self.rng.gen::<f64>() < 0.3 && state.vulnerabilities < self.max_vulnerabilities {
                        state.vulnerabilities += 1;
                    }
                }
                1
            }
        }
    }

    /// Returns the current round state.
    pub fn state(&self) -> &EnvironmentState {
        &self.state
    }

    /// Returns a mutable reference to the round state.
    ///
    /// Drivers use this to stage specific situations (e.g. a hardened system).
    pub fn state_mut(&mut self) -> &mut EnvironmentState {
        &mut self.state
    }

    /// Returns the vulnerability ceiling of the current round.
    pub fn max_vulnerabilities(&self) -> u32 {
        self.max_vulnerabilities
    }

    /// Returns the detection cap.
    pub fn max_detection(&self) -> u32 {
        self.max_detection
    }

    /// Returns the number of rounds started.
    pub fn round(&self) -> u64 {
        self.round
    }
}
