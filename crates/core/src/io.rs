//! Collaborator traits at the edge of the core.
//!
//! The navigation loop never touches a bus, a socket, or a serial
//! port; it talks to these four seams. Any conforming implementation
//! is substitutable, including the in-memory doubles used by the
//! simulation harness and the tests.

use crate::command::CommandPoll;
use crate::types::{MotorCommand, SensorSnapshot, StatusEvent, StatusReport};

/// Source of per-tick sensor snapshots.
///
/// Reads are synchronous and expected to complete within the tick
/// budget; a failed magnetometer read surfaces as
/// `heading_deg: None`, a failed or stale position fix as
/// `fix_valid: false`. The provider degrades, it never blocks.
pub trait SensorProvider {
    /// Produce the snapshot for this tick.
    fn snapshot(&mut self, now_us: u64) -> SensorSnapshot;
}

/// Non-blocking-with-timeout operator command channel.
pub trait CommandChannel {
    /// Wait up to `timeout_us` for one command line.
    ///
    /// Returns [`CommandPoll::None`] when nothing arrived; a missing
    /// command must never stall the tick.
    fn poll(&mut self, timeout_us: u64) -> CommandPoll;
}

/// Differential drive actuator.
pub trait MotorActuator {
    /// Apply a motor command.
    ///
    /// Speed validation is the core's responsibility; implementations
    /// accept any in-bounds pair without further checks.
    fn apply(&mut self, command: MotorCommand);
}

/// Consumer of periodic reports and one-shot events.
pub trait StatusSink {
    /// Periodic structured status, roughly once per second.
    fn report(&mut self, report: &StatusReport);

    /// One-shot lifecycle event.
    fn event(&mut self, event: StatusEvent);
}
