//! Navigation loop states.

/// State of the navigation loop.
///
/// Initial state is [`Idle`](NavState::Idle). There is no terminal
/// state: a valid target command re-enters `Navigating` from any
/// state, including `Stopped` and `Arrived`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavState {
    /// No target has ever been set.
    #[default]
    Idle,
    /// Actively steering toward the set target.
    Navigating,
    /// The last target was reached; motors stopped.
    Arrived,
    /// A STOP command halted navigation; motors stopped.
    Stopped,
}

impl NavState {
    /// State name for logging and telemetry.
    pub fn name(&self) -> &'static str {
        match self {
            NavState::Idle => "Idle",
            NavState::Navigating => "Navigating",
            NavState::Arrived => "Arrived",
            NavState::Stopped => "Stopped",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_idle() {
        assert_eq!(NavState::default(), NavState::Idle);
    }

    #[test]
    fn names_for_telemetry() {
        assert_eq!(NavState::Navigating.name(), "Navigating");
        assert_eq!(NavState::Stopped.name(), "Stopped");
    }
}
