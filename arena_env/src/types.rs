//! Common types shared by the environment, the attacker and the defenders.

use crate::error::ArenaError;
use serde::{Deserialize, Serialize};

/// Snapshot of the system under attack.
///
/// One record lives per round: created by `reset`, mutated by `step`, dropped
/// when the round ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnvironmentState {
    /// Exploitable weaknesses remaining (never above the round's maximum)
    pub vulnerabilities: u32,

    /// Accumulated suspicion of attacker activity (capped at 5)
    pub detection: u32,

    /// Defensive strength, grows without bound
    pub security_level: u32,

    /// Recent suspicious traffic, decays by one every step
    pub network_activity: u32,

    /// Attacker achieved full compromise
    pub breach: bool,

    /// Defender inspected logs this round
    pub logs_analyzed: bool,
}

impl EnvironmentState {
    /// Creates the opening state of a round.
    pub fn fresh(vulnerabilities: u32, security_level: u32) -> Self {
        Self {
            vulnerabilities,
            detection: 0,
            security_level,
            network_activity: 0,
            breach: false,
            logs_analyzed: false,
        }
    }
}

impl Default for EnvironmentState {
    fn default() -> Self {
        Self::fresh(3, 3)
    }
}

impl std::fmt::Display for EnvironmentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "vulns={} detection={} security={} activity={} breach={} logs={}",
            self.vulnerabilities,
            self.detection,
            self.security_level,
            self.network_activity,
            self.breach,
            self.logs_analyzed,
        )
    }
}

/// Red team moves.
///
/// Declaration order is the default action-set order, which is also the
/// tie-break order for greedy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackAction {
    /// Probe the network; cheap and quiet
    Scan,

    /// Burn one vulnerability for a shot at full compromise
    Exploit,

    /// Noisy credential attack that ignores vulnerabilities
    BruteForce,

    /// Target people instead of machines
    SocialEngineering,
}

impl AttackAction {
    /// Every attack, in declaration order.
    pub const ALL: [AttackAction; 4] = [
        AttackAction::Scan,
        AttackAction::Exploit,
        AttackAction::BruteForce,
        AttackAction::SocialEngineering,
    ];

    /// Actions favored while trying to stay hidden.
    pub const LOW_RISK: [AttackAction; 2] = [AttackAction::Scan, AttackAction::SocialEngineering];

    /// Actions favored while pressing an advantage.
    pub const HIGH_IMPACT: [AttackAction; 2] = [AttackAction::Exploit, AttackAction::BruteForce];

    /// Returns the canonical action name.
    pub fn name(&self) -> &'static str {
        match self {
            AttackAction::Scan => "scan",
            AttackAction::Exploit => "exploit",
            AttackAction::BruteForce => "brute_force",
            AttackAction::SocialEngineering => "social_engineering",
        }
    }

    /// Returns a short description of the action.
    pub fn description(&self) -> &'static str {
        match self {
            AttackAction::Scan => "Map the network looking for weak spots",
            AttackAction::Exploit => "Use a known vulnerability to push toward compromise",
            AttackAction::BruteForce => "Hammer credentials until something gives",
            AttackAction::SocialEngineering => "Trick staff into opening the door",
        }
    }

    /// Returns true for scan and social engineering.
    pub fn is_low_risk(&self) -> bool {
        Self::LOW_RISK.contains(self)
    }

    /// Returns true for exploit and brute force.
    pub fn is_high_impact(&self) -> bool {
        Self::HIGH_IMPACT.contains(self)
    }
}

impl std::fmt::Display for AttackAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for AttackAction {
    type Err = ArenaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "scan" => Ok(AttackAction::Scan),
            "exploit" => Ok(AttackAction::Exploit),
            "brute_force" | "bruteforce" => Ok(AttackAction::BruteForce),
            "social_engineering" | "socialengineering" => Ok(AttackAction::SocialEngineering),
            _ => Err(ArenaError::UnknownAttack(s.to_string())),
        }
    }
}

/// Blue team moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefenseAction {
    Patch,
    Monitor,
    Block,
    Strengthen,
    Analyze,
}

impl DefenseAction {
    /// Every defense, in menu order.
    pub const ALL: [DefenseAction; 5] = [
        DefenseAction::Patch,
        DefenseAction::Monitor,
        DefenseAction::Block,
        DefenseAction::Strengthen,
        DefenseAction::Analyze,
    ];

    /// Returns the canonical action name.
    pub fn name(&self) -> &'static str {
        match self {
            DefenseAction::Patch => "patch",
            DefenseAction::Monitor => "monitor",
            DefenseAction::Block => "block",
            DefenseAction::Strengthen => "strengthen",
            DefenseAction::Analyze => "analyze",
        }
    }

    /// Returns a short description of the action.
    pub fn description(&self) -> &'static str {
        match self {
            DefenseAction::Patch => "Fix vulnerabilities in the system",
            DefenseAction::Monitor => "Increase network monitoring and detection capabilities",
            DefenseAction::Block => "Block suspicious network traffic (may affect legitimate users)",
            DefenseAction::Strengthen => "Strengthen overall security posture",
            DefenseAction::Analyze => "Analyze system logs for attack patterns",
        }
    }
}

impl std::fmt::Display for DefenseAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for DefenseAction {
    type Err = ArenaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "patch" => Ok(DefenseAction::Patch),
            "monitor" => Ok(DefenseAction::Monitor),
            "block" => Ok(DefenseAction::Block),
            "strengthen" => Ok(DefenseAction::Strengthen),
            "analyze" | "analyse" => Ok(DefenseAction::Analyze),
            _ => Err(ArenaError::UnknownDefense(s.to_string())),
        }
    }
}
