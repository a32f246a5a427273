//! Errors that can occur while setting up or running a simulation.

/// Simulation harness error type.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// A collaborator failed to initialize before loop entry. Fatal:
    /// surfaced to the caller, never retried automatically.
    #[error("initialization failed: {0}")]
    Init(&'static str),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for SimError {
    fn from(e: toml::de::Error) -> Self {
        SimError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SimError>;
