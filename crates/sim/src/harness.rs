//! In-memory collaborator doubles for tests and scripted runs.

use std::collections::VecDeque;

use tracing::{info, warn};

use terrapin_core::command::{parse_line, CommandPoll};
use terrapin_core::io::{CommandChannel, MotorActuator, StatusSink};
use terrapin_core::types::{MotorCommand, StatusEvent, StatusReport};

/// Command channel fed from a pre-written script of lines.
///
/// Each line is released at a given poll index, standing in for an
/// operator typing over the serial link at a given moment. Poll
/// timeouts are irrelevant here; the double never blocks.
pub struct ScriptedCommands {
    /// Remaining script, front first, sorted by release index.
    script: VecDeque<(u64, String)>,
    polls: u64,
}

impl ScriptedCommands {
    /// Empty script: every poll returns `None`.
    pub fn empty() -> Self {
        Self {
            script: VecDeque::new(),
            polls: 0,
        }
    }

    /// Build from `(poll_index, line)` pairs; order of the input does
    /// not matter.
    pub fn from_script<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (u64, S)>,
        S: Into<String>,
    {
        let mut script: Vec<(u64, String)> =
            entries.into_iter().map(|(at, s)| (at, s.into())).collect();
        script.sort_by_key(|(at, _)| *at);
        Self {
            script: script.into(),
            polls: 0,
        }
    }

    /// Queue a line for the next poll.
    pub fn push_now(&mut self, line: &str) {
        self.script.push_back((self.polls, line.to_string()));
    }
}

impl CommandChannel for ScriptedCommands {
    fn poll(&mut self, _timeout_us: u64) -> CommandPoll {
        let index = self.polls;
        self.polls += 1;

        let due = matches!(self.script.front(), Some((at, _)) if *at <= index);
        let Some((_, line)) = (if due { self.script.pop_front() } else { None }) else {
            return CommandPoll::None;
        };

        match parse_line(&line) {
            Ok(command) => CommandPoll::Command(command),
            Err(err) => {
                warn!(line = %line, ?err, "rejected command line");
                CommandPoll::Invalid
            }
        }
    }
}

/// Actuator double that records every applied command.
#[derive(Debug, Default)]
pub struct RecordingActuator {
    applied: Vec<MotorCommand>,
}

impl RecordingActuator {
    pub fn new() -> Self {
        Self::default()
    }

    /// All commands applied so far, in order.
    pub fn applied(&self) -> &[MotorCommand] {
        &self.applied
    }

    /// Most recent command, if any.
    pub fn latest(&self) -> Option<&MotorCommand> {
        self.applied.last()
    }
}

impl MotorActuator for RecordingActuator {
    fn apply(&mut self, command: MotorCommand) {
        self.applied.push(command);
    }
}

/// Status sink that records reports and events, and mirrors them to
/// the tracing log.
#[derive(Debug, Default)]
pub struct RecordingSink {
    reports: Vec<StatusReport>,
    events: Vec<StatusEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> &[StatusReport] {
        &self.reports
    }

    pub fn events(&self) -> &[StatusEvent] {
        &self.events
    }

    /// Count of a given event, ignoring payloads.
    pub fn count_event(&self, probe: fn(&StatusEvent) -> bool) -> usize {
        self.events.iter().filter(|e| probe(e)).count()
    }
}

impl StatusSink for RecordingSink {
    fn report(&mut self, report: &StatusReport) {
        info!(
            heading = ?report.heading_deg,
            bearing = ?report.bearing_deg,
            distance = ?report.distance_m,
            fix = report.fix_valid,
            "status"
        );
        self.reports.push(*report);
    }

    fn event(&mut self, event: StatusEvent) {
        info!(?event, "nav event");
        self.events.push(event);
    }
}
