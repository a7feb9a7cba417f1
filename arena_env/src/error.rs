//! Error types for the cyber arena.

use thiserror::Error;

/// Errors that can occur outside the game contract.
///
/// `reset`, `step`, `choose_action` and `learn` never fail. These variants
/// cover parsing, construction, snapshots and export I/O.
#[derive(Debug, Error)]
pub enum ArenaError {
    /// Attacker action name is not part of the attack set
    #[error("Unknown attacker action: {0}")]
    UnknownAttack(String),

    /// Defender action name is not part of the defense set
    #[error("Unknown defender action: {0}")]
    UnknownDefense(String),

    /// Defender profile name is not recognized
    #[error("Unknown defender profile: {0}")]
    UnknownProfile(String),

    /// Learning agent was given no actions to choose from
    #[error("Agent needs at least one available action")]
    EmptyActionSet,

    /// Value table or export (de)serialization failed
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Harness configuration is unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// File I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ArenaError {
    /// Creates a serialization error.
    pub fn serialization(msg: impl std::fmt::Display) -> Self {
        Self::SerializationError(msg.to_string())
    }

    /// Creates a configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
