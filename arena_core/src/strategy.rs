//! Attacker meta-strategy.

use arena_env::{AttackAction, EnvironmentState};
use serde::{Deserialize, Serialize};

/// Run-time mode that biases the attacker's choices.
///
/// Recomputed from the observed state before every decision; it carries no
/// intent between steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Detection is high: keep quiet
    Stealth,

    /// Plenty of vulnerabilities and little suspicion: push hard
    Aggressive,

    /// Everything else
    #[default]
    Adaptive,
}

impl Strategy {
    /// Picks the strategy for a state.
    pub fn adapt(state: &EnvironmentState) -> Self {
        if state.detection > 3 {
            Strategy::Stealth
        } else if state.vulnerabilities > 2 && state.detection < 2 {
            Strategy::Aggressive
        } else {
            Strategy::Adaptive
        }
    }

    /// Actions this strategy leans toward. Empty for adaptive.
    pub fn preferred_actions(&self) -> &'static [AttackAction] {
        match self {
            Strategy::Stealth => &AttackAction::LOW_RISK,
            Strategy::Aggressive => &AttackAction::HIGH_IMPACT,
            Strategy::Adaptive => &[],
        }
    }

    /// Returns true if taking `action` in `state` fits this strategy.
    ///
    /// Coherent choices earn the shaping bonus during learning.
    pub fn is_coherent(&self, action: AttackAction, state: &EnvironmentState) -> bool {
        match self {
            Strategy::Stealth => action.is_low_risk() && state.detection > 2,
            Strategy::Aggressive => action.is_high_impact() && state.vulnerabilities > 0,
            Strategy::Adaptive => false,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Stealth => "stealth",
            Strategy::Aggressive => "aggressive",
            Strategy::Adaptive => "adaptive",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
