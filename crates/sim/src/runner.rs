//! Fixed-cadence blocking runner.
//!
//! Drives the navigation loop at its configured tick period against
//! wall-clock time. One thread, no executor: the only suspension
//! points are the command poll inside the tick (bounded by the
//! configured timeout) and the inter-tick sleep here.

use std::thread;
use std::time::Duration;

use tracing::{debug, info};

use terrapin_core::clock::Clock;
use terrapin_core::io::{CommandChannel, MotorActuator, SensorProvider, StatusSink};
use terrapin_core::nav::{NavState, NavigationLoop};

/// What a run ended with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    /// Ticks executed.
    pub ticks: u64,
    /// Loop state at exit.
    pub final_state: NavState,
}

/// Run the loop until arrival, stop, or `max_ticks` (0 = unbounded).
///
/// Exits as soon as the loop settles in `Arrived` or `Stopped`;
/// interactive platforms that want to resume after arrival own their
/// own loop instead.
pub fn run(
    nav: &mut NavigationLoop,
    sensors: &mut dyn SensorProvider,
    commands: &mut dyn CommandChannel,
    actuator: &mut dyn MotorActuator,
    status: &mut dyn StatusSink,
    clock: &impl Clock,
    max_ticks: u64,
) -> RunOutcome {
    let tick_us = nav.config().tick_interval_ms * 1000;
    let mut next_deadline_us = clock.now_us() + tick_us;
    let mut ticks = 0u64;
    let mut prev_state = nav.state();

    info!(state = prev_state.name(), tick_ms = tick_us / 1000, "run start");

    loop {
        nav.tick(sensors, commands, actuator, status, clock.now_us());
        ticks += 1;

        let state = nav.state();
        if state != prev_state {
            debug!(from = prev_state.name(), to = state.name(), tick = ticks, "state change");
            prev_state = state;
        }

        if matches!(state, NavState::Arrived | NavState::Stopped) {
            break;
        }
        if max_ticks != 0 && ticks >= max_ticks {
            break;
        }

        let remaining = next_deadline_us.saturating_sub(clock.now_us());
        if remaining > 0 {
            thread::sleep(Duration::from_micros(remaining));
        }
        next_deadline_us += tick_us;
    }

    let outcome = RunOutcome {
        ticks,
        final_state: nav.state(),
    };
    info!(ticks = outcome.ticks, state = outcome.final_state.name(), "run end");
    outcome
}
