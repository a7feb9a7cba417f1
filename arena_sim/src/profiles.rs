//! Named defender configurations selectable from the CLI.

use crate::defender::{
    AutoDefender, DefenderPolicy, Difficulty, HeuristicDefender, PromptDefender, RandomDefender,
};
use arena_env::ArenaError;
use serde::{Deserialize, Serialize};
use std::io::BufReader;

/// Defender profile identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefenderProfile {
    /// Always plays the scripted recommendation
    #[default]
    Heuristic,

    /// Mostly reactive, rarely optimal
    Easy,

    /// Balanced mix
    Medium,

    /// Mostly optimal, often proactive
    Hard,

    /// Uniformly random moves
    Random,

    /// A human answering prompts on stdin
    Interactive,
}

impl DefenderProfile {
    /// Returns a list of all profiles.
    pub fn all() -> Vec<DefenderProfile> {
        vec![
            DefenderProfile::Heuristic,
            DefenderProfile::Easy,
            DefenderProfile::Medium,
            DefenderProfile::Hard,
            DefenderProfile::Random,
            DefenderProfile::Interactive,
        ]
    }

    /// Returns the profile name.
    pub fn name(&self) -> &'static str {
        match self {
            DefenderProfile::Heuristic => "heuristic",
            DefenderProfile::Easy => "easy",
            DefenderProfile::Medium => "medium",
            DefenderProfile::Hard => "hard",
            DefenderProfile::Random => "random",
            DefenderProfile::Interactive => "interactive",
        }
    }

    /// Returns a description of the profile.
    pub fn description(&self) -> &'static str {
        match self {
            DefenderProfile::Heuristic => "Fixed priority rules: patch, monitor, analyze, strengthen, block",
            DefenderProfile::Easy => "Automated defender, 10% optimal and mostly reactive",
            DefenderProfile::Medium => "Automated defender, 30% optimal with some proactive hardening",
            DefenderProfile::Hard => "Automated defender, 60% optimal and frequently proactive",
            DefenderProfile::Random => "Uniformly random defensive moves",
            DefenderProfile::Interactive => "Human defender choosing from a menu on stdin",
        }
    }

    /// Returns true if the profile waits on a human.
    pub fn is_interactive(&self) -> bool {
        matches!(self, DefenderProfile::Interactive)
    }

    /// Builds the defender policy for this profile.
    pub fn build(&self, seed: u64) -> Box<dyn DefenderPolicy> {
        match self {
            DefenderProfile::Heuristic => Box::new(HeuristicDefender),
            DefenderProfile::Easy => Box::new(AutoDefender::new(Difficulty::Easy, seed)),
            DefenderProfile::Medium => Box::new(AutoDefender::new(Difficulty::Medium, seed)),
            DefenderProfile::Hard => Box::new(AutoDefender::new(Difficulty::Hard, seed)),
            DefenderProfile::Random => Box::new(RandomDefender::new(seed)),
            DefenderProfile::Interactive => Box::new(PromptDefender::new(
                BufReader::new(std::io::stdin()),
                std::io::stdout(),
            )),
        }
    }
}

impl std::fmt::Display for DefenderProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for DefenderProfile {
    type Err = ArenaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "heuristic" | "scripted" => Ok(DefenderProfile::Heuristic),
            "easy" => Ok(DefenderProfile::Easy),
            "medium" => Ok(DefenderProfile::Medium),
            "hard" => Ok(DefenderProfile::Hard),
            "random" => Ok(DefenderProfile::Random),
            "interactive" | "human" => Ok(DefenderProfile::Interactive),
            _ => Err(ArenaError::UnknownProfile(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_names_parse_back() {
        for profile in DefenderProfile::all() {
            assert_eq!(profile.name().parse::<DefenderProfile>().unwrap(), profile);
            assert_eq!(profile.to_string(), profile.name());
        }
        assert_eq!("HARD".parse::<DefenderProfile>().unwrap(), DefenderProfile::Hard);
        assert_eq!("human".parse::<DefenderProfile>().unwrap(), DefenderProfile::Interactive);
    }

    #[test]
    fn test_unknown_profile() {
        let err = "nightmare".parse::<DefenderProfile>().unwrap_err();
        assert!(matches!(err, ArenaError::UnknownProfile(ref name) if name == "nightmare"));
    }

    #[test]
    fn test_build_names_match() {
        for profile in DefenderProfile::all().into_iter().filter(|p| !p.is_interactive()) {
            assert_eq!(profile.build(7).name(), profile.name());
        }
    }
}
