//! Simulated world: differential drive kinematics plus sensor synthesis.
//!
//! Integrates the last applied motor command into a planar pose and
//! serves position/heading back through the core's collaborator
//! traits, with seeded noise so runs are reproducible. One
//! [`SimWorld`] is split into a sensor port and a motor port because
//! the navigation loop borrows its collaborators independently.

use std::cell::RefCell;
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use terrapin_core::geo::GeoCoordinate;
use terrapin_core::io::{MotorActuator, SensorProvider};
use terrapin_core::types::{Direction, MotorCommand, SensorSnapshot, WheelDrive};

/// Meters per degree of latitude.
const M_PER_DEG_LAT: f64 = 111_320.0;

/// Physical and noise parameters of the simulated rover.
#[derive(Debug, Clone)]
pub struct WorldConfig {
    /// Distance between wheels in meters.
    pub wheel_base_m: f64,
    /// Wheel speed at full duty (255), m/s.
    pub max_wheel_speed_mps: f64,
    /// Reference latitude for position synthesis, degrees.
    pub origin_lat_deg: f64,
    /// Reference longitude for position synthesis, degrees.
    pub origin_lon_deg: f64,
    /// Uniform GPS position noise bound, meters.
    pub gps_noise_m: f64,
    /// Uniform compass noise bound, degrees.
    pub compass_noise_deg: f64,
    /// Satellite count reported while the fix is valid.
    pub satellites: u8,
    /// RNG seed. Fixed seed = reproducible run.
    pub seed: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            wheel_base_m: 0.15,
            max_wheel_speed_mps: 1.0,
            origin_lat_deg: 19.504407,
            origin_lon_deg: -99.146935,
            gps_noise_m: 0.3,
            compass_noise_deg: 1.5,
            satellites: 8,
            seed: 0,
        }
    }
}

/// Pose and drive state shared by the two ports.
#[derive(Debug)]
struct WorldState {
    config: WorldConfig,
    /// East offset from origin, meters.
    x_m: f64,
    /// North offset from origin, meters.
    y_m: f64,
    /// Compass heading, degrees [0, 360).
    heading_deg: f64,
    command: MotorCommand,
    last_step_us: Option<u64>,
    fix_valid: bool,
    compass_available: bool,
    rng: StdRng,
}

impl WorldState {
    fn wheel_speed_mps(&self, wheel: &WheelDrive) -> f64 {
        let magnitude = wheel.speed as f64 / 255.0 * self.config.max_wheel_speed_mps;
        match wheel.direction {
            Direction::Forward => magnitude,
            Direction::Reverse => -magnitude,
            Direction::Stop => 0.0,
        }
    }

    /// Advance the pose to `now_us` under the current command.
    ///
    /// The rotation sign matches the controller's differential
    /// convention: extra duty on the right wheel increases the compass
    /// heading.
    fn step_to(&mut self, now_us: u64) {
        let dt = match self.last_step_us {
            None => {
                self.last_step_us = Some(now_us);
                return;
            }
            Some(last) => {
                let dt = now_us.saturating_sub(last) as f64 / 1_000_000.0;
                self.last_step_us = Some(now_us);
                dt
            }
        };
        if dt <= 0.0 {
            return;
        }

        let v_left = self.wheel_speed_mps(&self.command.left);
        let v_right = self.wheel_speed_mps(&self.command.right);

        let velocity = (v_left + v_right) / 2.0;
        let omega_rad = (v_right - v_left) / self.config.wheel_base_m;

        self.heading_deg =
            terrapin_core::geo::wrap_360(self.heading_deg + omega_rad.to_degrees() * dt);

        let heading_rad = self.heading_deg.to_radians();
        self.x_m += velocity * heading_rad.sin() * dt;
        self.y_m += velocity * heading_rad.cos() * dt;
    }

    fn position(&mut self) -> GeoCoordinate {
        let noise = self.config.gps_noise_m;
        let (nx, ny) = if noise > 0.0 {
            (
                self.rng.gen_range(-noise..=noise),
                self.rng.gen_range(-noise..=noise),
            )
        } else {
            (0.0, 0.0)
        };

        let lat = self.config.origin_lat_deg + (self.y_m + ny) / M_PER_DEG_LAT;
        let m_per_deg_lon = M_PER_DEG_LAT * self.config.origin_lat_deg.to_radians().cos();
        let lon = self.config.origin_lon_deg + (self.x_m + nx) / m_per_deg_lon;

        // Origin plus a few hundred meters of drive stays far inside
        // the valid ranges; fall back to the origin if it ever does not.
        GeoCoordinate::new(lat, lon).unwrap_or_else(|_| {
            GeoCoordinate::new(self.config.origin_lat_deg, self.config.origin_lon_deg)
                .expect("origin coordinate validated at construction")
        })
    }

    fn compass_sample(&mut self) -> f64 {
        let noise = self.config.compass_noise_deg;
        let n = if noise > 0.0 {
            self.rng.gen_range(-noise..=noise)
        } else {
            0.0
        };
        terrapin_core::geo::wrap_360(self.heading_deg + n)
    }
}

/// The simulated rover and its surroundings.
pub struct SimWorld {
    state: Rc<RefCell<WorldState>>,
}

impl SimWorld {
    /// Create a world at the configured origin, heading north,
    /// motors stopped.
    ///
    /// Fails if the configured origin is not a valid coordinate.
    pub fn new(config: WorldConfig) -> Result<Self, crate::SimError> {
        GeoCoordinate::new(config.origin_lat_deg, config.origin_lon_deg)
            .map_err(|_| crate::SimError::Init("world origin out of coordinate range"))?;
        let rng = StdRng::seed_from_u64(config.seed);
        let state = WorldState {
            config,
            x_m: 0.0,
            y_m: 0.0,
            heading_deg: 0.0,
            command: MotorCommand::stop(),
            last_step_us: None,
            fix_valid: true,
            compass_available: true,
            rng,
        };
        Ok(Self {
            state: Rc::new(RefCell::new(state)),
        })
    }

    /// Sensor-side port for the navigation loop.
    pub fn sensors(&self) -> WorldSensors {
        WorldSensors {
            state: Rc::clone(&self.state),
        }
    }

    /// Actuator-side port for the navigation loop.
    pub fn motors(&self) -> WorldMotors {
        WorldMotors {
            state: Rc::clone(&self.state),
        }
    }

    /// Inject a positioning outage (or recovery).
    pub fn set_fix_valid(&self, valid: bool) {
        self.state.borrow_mut().fix_valid = valid;
    }

    /// Inject a magnetometer outage (or recovery).
    pub fn set_compass_available(&self, available: bool) {
        self.state.borrow_mut().compass_available = available;
    }

    /// True ground-truth pose `(x_east_m, y_north_m, heading_deg)`.
    pub fn pose(&self) -> (f64, f64, f64) {
        let s = self.state.borrow();
        (s.x_m, s.y_m, s.heading_deg)
    }

    /// Straight-line ground-truth distance to a point given as offsets
    /// from the origin in meters.
    pub fn distance_to_local(&self, x_m: f64, y_m: f64) -> f64 {
        let s = self.state.borrow();
        let dx = x_m - s.x_m;
        let dy = y_m - s.y_m;
        (dx * dx + dy * dy).sqrt()
    }

    /// Convert a local east/north offset in meters to a coordinate,
    /// for building scripted target commands.
    pub fn local_to_coordinate(&self, x_m: f64, y_m: f64) -> GeoCoordinate {
        let s = self.state.borrow();
        let lat = s.config.origin_lat_deg + y_m / M_PER_DEG_LAT;
        let m_per_deg_lon = M_PER_DEG_LAT * s.config.origin_lat_deg.to_radians().cos();
        let lon = s.config.origin_lon_deg + x_m / m_per_deg_lon;
        GeoCoordinate::new(lat, lon).expect("local offset outside coordinate range")
    }
}

/// [`SensorProvider`] view of the world.
pub struct WorldSensors {
    state: Rc<RefCell<WorldState>>,
}

impl SensorProvider for WorldSensors {
    fn snapshot(&mut self, now_us: u64) -> SensorSnapshot {
        let mut s = self.state.borrow_mut();
        s.step_to(now_us);

        let heading_deg = if s.compass_available {
            Some(s.compass_sample())
        } else {
            None
        };
        let position = s.position();
        let fix_valid = s.fix_valid;
        let satellites = if fix_valid { s.config.satellites } else { 0 };

        SensorSnapshot {
            heading_deg,
            position,
            fix_valid,
            satellites,
            timestamp_us: now_us,
        }
    }
}

/// [`MotorActuator`] view of the world.
pub struct WorldMotors {
    state: Rc<RefCell<WorldState>>,
}

impl MotorActuator for WorldMotors {
    fn apply(&mut self, command: MotorCommand) {
        self.state.borrow_mut().command = command;
    }
}
