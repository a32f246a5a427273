//! Shared data model for the navigation subsystem.
//!
//! Sensor snapshots flow in, motor commands and status traffic flow
//! out. Tuning constants live in [`NavConfig`], whose defaults match
//! the reference rover.

use crate::geo::GeoCoordinate;

/// One per-tick reading from the sensor collaborator.
///
/// Read-only to the core. `heading_deg` is the raw magnetometer
/// heading for this tick, or `None` when the read failed; the loop
/// then holds its previous filtered heading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSnapshot {
    /// Raw instantaneous heading sample in degrees, if available.
    pub heading_deg: Option<f64>,
    /// Current position estimate.
    pub position: GeoCoordinate,
    /// True when the positioning solution is trustworthy.
    pub fix_valid: bool,
    /// Number of satellites behind the fix.
    pub satellites: u8,
    /// Acquisition timestamp, microseconds.
    pub timestamp_us: u64,
}

/// Wheel rotation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
    /// No drive; the wheel coasts.
    Stop,
}

/// Drive command for a single wheel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WheelDrive {
    pub direction: Direction,
    /// PWM duty value. Within `[min_speed, max_speed]` for
    /// Forward/Reverse, zero for Stop.
    pub speed: u8,
}

/// Differential motor command for both wheels.
///
/// Emitted once per tick and consumed immediately by the actuator
/// collaborator; the loop keeps only the last emitted value so a tick
/// without a fix can hold it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorCommand {
    pub left: WheelDrive,
    pub right: WheelDrive,
}

impl MotorCommand {
    /// Both wheels stopped.
    pub fn stop() -> Self {
        let halt = WheelDrive {
            direction: Direction::Stop,
            speed: 0,
        };
        Self {
            left: halt,
            right: halt,
        }
    }

    /// Both wheels forward at the given duty values.
    pub fn forward(left_speed: u8, right_speed: u8) -> Self {
        Self {
            left: WheelDrive {
                direction: Direction::Forward,
                speed: left_speed,
            },
            right: WheelDrive {
                direction: Direction::Forward,
                speed: right_speed,
            },
        }
    }

    /// True if neither wheel is driven.
    pub fn is_stop(&self) -> bool {
        self.left.direction == Direction::Stop && self.right.direction == Direction::Stop
    }
}

/// Periodic structured report for the status sink, emitted roughly
/// once per second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusReport {
    /// Current filtered heading in degrees, if any sample was seen.
    pub heading_deg: Option<f64>,
    /// Bearing to the target, when a target is set and the fix is valid.
    pub bearing_deg: Option<f64>,
    /// Distance to the target, when a target is set and the fix is valid.
    pub distance_m: Option<f64>,
    /// Positioning validity this tick.
    pub fix_valid: bool,
}

/// One-shot events for the status sink.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatusEvent {
    /// A new navigation target was accepted.
    TargetSet(GeoCoordinate),
    /// A command line was malformed or out of range.
    TargetInvalid,
    /// The rover arrived within the acceptance threshold.
    TargetReached,
    /// Navigation was halted by a STOP command.
    NavigationStopped,
}

/// Navigation and control tuning.
///
/// Defaults reproduce the reference rover: 50 ms tick, heading PID
/// (2.0, 0.1, 0.2) bounded to +/-50, wheel-speed PID (3.0, 0.2, 0.1),
/// base duties 180/190 within [30, 255], 2 m arrival radius.
#[derive(Debug, Clone)]
pub struct NavConfig {
    /// Heading PID proportional gain.
    pub heading_kp: f64,
    /// Heading PID integral gain.
    pub heading_ki: f64,
    /// Heading PID derivative gain.
    pub heading_kd: f64,
    /// Symmetric heading correction bound (output in +/- this value).
    pub heading_output_limit: f64,
    /// Wheel-speed PID proportional gain.
    pub wheel_kp: f64,
    /// Wheel-speed PID integral gain.
    pub wheel_ki: f64,
    /// Wheel-speed PID derivative gain.
    pub wheel_kd: f64,
    /// Left wheel base duty.
    pub base_speed_left: f64,
    /// Right wheel base duty.
    pub base_speed_right: f64,
    /// Minimum drive duty.
    pub min_speed: f64,
    /// Maximum drive duty.
    pub max_speed: f64,
    /// Arrival radius in meters (strict).
    pub arrival_threshold_m: f64,
    /// Heading filter gain.
    pub heading_alpha: f64,
    /// Control tick period in milliseconds.
    pub tick_interval_ms: u64,
    /// Command-channel poll timeout in microseconds.
    pub command_timeout_us: u64,
    /// Ticks between periodic status reports.
    pub status_divider: u32,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            heading_kp: 2.0,
            heading_ki: 0.1,
            heading_kd: 0.2,
            heading_output_limit: 50.0,
            wheel_kp: 3.0,
            wheel_ki: 0.2,
            wheel_kd: 0.1,
            base_speed_left: 180.0,
            base_speed_right: 190.0,
            min_speed: 30.0,
            max_speed: 255.0,
            arrival_threshold_m: 2.0,
            heading_alpha: crate::heading::DEFAULT_ALPHA,
            tick_interval_ms: 50,
            command_timeout_us: 10_000,
            status_divider: 20,
        }
    }
}
