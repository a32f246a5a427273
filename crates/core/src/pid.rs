//! PID controller with output saturation and anti-windup.
//!
//! One controller instance per controlled quantity: the rover runs one
//! for heading and one per wheel for speed. The controller is generic
//! over what it regulates; the only angle-aware piece is the free
//! [`heading_error`] helper, which callers use to fold a compass error
//! onto the shorter arc before display or diagnostics.

use crate::geo::wrap_180;

/// Operating a controller that has not been through [`PidController::init`].
///
/// The offending call mutates nothing; the caller decides whether to
/// stop, log, or re-init.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PidError {
    /// `init` has not been called yet.
    NotInitialized,
}

/// Proportional-integral-derivative controller.
///
/// Lifecycle: constructed uninitialized, then [`init`](Self::init)
/// supplies gains, output bounds, and the timestamp baseline. Every
/// other operation on an uninitialized controller is a checked no-op.
///
/// The derivative acts on the measured input rather than the error so
/// a setpoint step does not produce a derivative kick.
#[derive(Debug, Clone)]
pub struct PidController {
    kp: f64,
    ki: f64,
    kd: f64,
    setpoint: f64,
    last_input: f64,
    integral_sum: f64,
    output_min: f64,
    output_max: f64,
    last_update_us: u64,
    last_output: f64,
    initialized: bool,
}

impl PidController {
    /// Create an uninitialized controller.
    pub fn new() -> Self {
        Self {
            kp: 0.0,
            ki: 0.0,
            kd: 0.0,
            setpoint: 0.0,
            last_input: 0.0,
            integral_sum: 0.0,
            output_min: 0.0,
            output_max: 0.0,
            last_update_us: 0,
            last_output: 0.0,
            initialized: false,
        }
    }

    /// Configure gains and output bounds, zero the integral and input
    /// memory, and baseline the timestamp.
    pub fn init(&mut self, kp: f64, ki: f64, kd: f64, output_min: f64, output_max: f64, now_us: u64) {
        self.kp = kp;
        self.ki = ki;
        self.kd = kd;
        self.setpoint = 0.0;
        self.last_input = 0.0;
        self.integral_sum = 0.0;
        self.output_min = output_min;
        self.output_max = output_max;
        self.last_update_us = now_us;
        self.last_output = 0.0;
        self.initialized = true;
    }

    /// Store a new target value.
    ///
    /// Does not reset integral or derivative memory; callers that
    /// change targets materially should follow with [`reset`](Self::reset).
    pub fn set_setpoint(&mut self, setpoint: f64) -> Result<(), PidError> {
        self.check_initialized()?;
        self.setpoint = setpoint;
        Ok(())
    }

    /// Current target value.
    pub fn setpoint(&self) -> f64 {
        self.setpoint
    }

    /// Accumulated integral sum (diagnostics and tests).
    pub fn integral_sum(&self) -> f64 {
        self.integral_sum
    }

    /// Run one control update and return the bounded output.
    ///
    /// A non-positive time step (duplicate or out-of-order call)
    /// returns the previous output without mutating any state; this is
    /// expected under rapid polling and is not an error.
    pub fn compute(&mut self, input: f64, now_us: u64) -> Result<f64, PidError> {
        self.check_initialized()?;

        if now_us <= self.last_update_us {
            return Ok(self.last_output);
        }
        let dt = (now_us - self.last_update_us) as f64 / 1_000_000.0;

        let error = self.setpoint - input;
        let proportional = self.kp * error;

        self.integral_sum += error * dt;
        let integral = self.ki * self.integral_sum;

        let derivative = self.kd * (input - self.last_input) / dt;

        let mut output = proportional + integral - derivative;

        // Saturate, and on saturation clamp the integral sum to the
        // value that would have produced exactly the limit, so the
        // output comes off the bound as soon as the error reverses.
        if output > self.output_max {
            output = self.output_max;
            if self.ki != 0.0 {
                let integral_max = (self.output_max - proportional + derivative) / self.ki;
                if self.integral_sum > integral_max {
                    self.integral_sum = integral_max;
                }
            }
        } else if output < self.output_min {
            output = self.output_min;
            if self.ki != 0.0 {
                let integral_min = (self.output_min - proportional + derivative) / self.ki;
                if self.integral_sum < integral_min {
                    self.integral_sum = integral_min;
                }
            }
        }

        self.last_input = input;
        self.last_update_us = now_us;
        self.last_output = output;

        Ok(output)
    }

    /// Zero the integral and input memory and rebase the timestamp.
    ///
    /// Gains and output bounds are unchanged.
    pub fn reset(&mut self, now_us: u64) -> Result<(), PidError> {
        self.check_initialized()?;
        self.integral_sum = 0.0;
        self.last_input = 0.0;
        self.last_update_us = now_us;
        self.last_output = 0.0;
        Ok(())
    }

    /// Replace the gains and reset.
    ///
    /// A gain change over live integral memory would step the output
    /// discontinuously, so the reset is implicit.
    pub fn tune(&mut self, kp: f64, ki: f64, kd: f64, now_us: u64) -> Result<(), PidError> {
        self.check_initialized()?;
        self.kp = kp;
        self.ki = ki;
        self.kd = kd;
        self.reset(now_us)
    }

    /// Replace the output bounds.
    ///
    /// The stored integral sum is re-clamped immediately so the
    /// integral term stays representable within the new bounds even
    /// before the next `compute`.
    pub fn set_output_limits(&mut self, output_min: f64, output_max: f64) -> Result<(), PidError> {
        self.check_initialized()?;
        self.output_min = output_min;
        self.output_max = output_max;

        if self.ki != 0.0 {
            let integral_max = self.output_max / self.ki;
            let integral_min = self.output_min / self.ki;
            if self.integral_sum > integral_max {
                self.integral_sum = integral_max;
            } else if self.integral_sum < integral_min {
                self.integral_sum = integral_min;
            }
        }
        Ok(())
    }

    fn check_initialized(&self) -> Result<(), PidError> {
        if self.initialized {
            Ok(())
        } else {
            Err(PidError::NotInitialized)
        }
    }
}

impl Default for PidController {
    fn default() -> Self {
        Self::new()
    }
}

/// Shortest signed angular error between two headings, in [-180, +180]
/// degrees.
///
/// `heading_error(10.0, 350.0)` is `20.0`: the short way across north,
/// not -340.
pub fn heading_error(setpoint_deg: f64, input_deg: f64) -> f64 {
    wrap_180(setpoint_deg - input_deg)
}
