//! Error types for simulation commands, configuration and collaborators

use thiserror::Error;

/// Errors raised by the simulation core
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    /// No alive launch site with ammo can reach the requested point
    #[error("no launch site with ammo can reach ({x:.0}, {y:.0})")]
    NoLaunchSite { x: f32, y: f32 },
    /// Fire targets must be above the ground line
    #[error("target ({x:.0}, {y:.0}) is below the ground line")]
    BelowGround { x: f32, y: f32 },
    /// Bomb inventory is empty
    #[error("no bomb charges left")]
    NoBombs,
    #[error("no area denial charges left")]
    NoAreaDenial,
    /// Command issued while the run is not accepting input
    #[error("command rejected while {0}")]
    NotAccepting(&'static str),
    /// The authored wave table has no usable waves
    #[error("wave table contains no waves")]
    EmptyWaveTable,
    /// Wave setup failed; the run cannot continue
    #[error("failed to initialise wave {wave}: {reason}")]
    WaveInit { wave: u32, reason: String },
    /// Malformed configuration document
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<serde_json::Error> for SimError {
    fn from(err: serde_json::Error) -> Self {
        SimError::Config(err.to_string())
    }
}

/// Errors reported by persistence collaborators
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("summary rejected: {0}")]
    Rejected(String),
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("storage unavailable: {0}")]
    Io(#[from] std::io::Error),
}
