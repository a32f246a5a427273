//! Simulation configuration loading.
//!
//! A TOML file selects world physics, controller tuning, and the run
//! script. Every field is optional; defaults reproduce the reference
//! rover in a quiet world.

use std::path::Path;

use serde::Deserialize;
use terrapin_core::types::NavConfig;

use crate::error::Result;
use crate::world::WorldConfig;

/// Top-level simulation configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SimConfig {
    #[serde(default)]
    pub world: WorldSection,
    #[serde(default)]
    pub nav: NavSection,
    #[serde(default)]
    pub run: RunSection,
}

/// World physics and sensor noise.
#[derive(Debug, Clone, Deserialize)]
pub struct WorldSection {
    /// Distance between wheels in meters (default: 0.15)
    #[serde(default = "default_wheel_base")]
    pub wheel_base_m: f64,

    /// Wheel speed at full duty in m/s (default: 1.0)
    #[serde(default = "default_max_wheel_speed")]
    pub max_wheel_speed_mps: f64,

    /// Reference latitude in degrees (default: 19.504407)
    #[serde(default = "default_origin_lat")]
    pub origin_lat_deg: f64,

    /// Reference longitude in degrees (default: -99.146935)
    #[serde(default = "default_origin_lon")]
    pub origin_lon_deg: f64,

    /// GPS noise bound in meters (default: 0.3)
    #[serde(default = "default_gps_noise")]
    pub gps_noise_m: f64,

    /// Compass noise bound in degrees (default: 1.5)
    #[serde(default = "default_compass_noise")]
    pub compass_noise_deg: f64,

    /// Reported satellite count (default: 8)
    #[serde(default = "default_satellites")]
    pub satellites: u8,

    /// RNG seed (default: 0, deterministic)
    #[serde(default)]
    pub seed: u64,
}

/// Controller tuning overrides.
#[derive(Debug, Clone, Deserialize)]
pub struct NavSection {
    /// Heading PID gains (default: 2.0, 0.1, 0.2)
    #[serde(default = "default_heading_gains")]
    pub heading_gains: [f64; 3],

    /// Heading correction bound (default: 50.0)
    #[serde(default = "default_heading_limit")]
    pub heading_output_limit: f64,

    /// Base wheel duties, left then right (default: 180, 190)
    #[serde(default = "default_base_speeds")]
    pub base_speeds: [f64; 2],

    /// Arrival radius in meters (default: 2.0)
    #[serde(default = "default_arrival")]
    pub arrival_threshold_m: f64,

    /// Heading filter gain (default: 0.6)
    #[serde(default = "default_alpha")]
    pub heading_alpha: f64,

    /// Tick period in milliseconds (default: 50)
    #[serde(default = "default_tick_ms")]
    pub tick_interval_ms: u64,
}

/// What a run executes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunSection {
    /// Stop after this many ticks; 0 = run until arrival or stop.
    #[serde(default)]
    pub max_ticks: u64,

    /// Command lines injected at given ticks.
    #[serde(default)]
    pub commands: Vec<ScriptedLine>,
}

/// One scripted command-channel line.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptedLine {
    /// Tick index at which the line becomes available to poll.
    pub at_tick: u64,
    /// Raw line, exactly as a serial channel would frame it.
    pub line: String,
}

fn default_wheel_base() -> f64 {
    0.15
}
fn default_max_wheel_speed() -> f64 {
    1.0
}
fn default_origin_lat() -> f64 {
    19.504407
}
fn default_origin_lon() -> f64 {
    -99.146935
}
fn default_gps_noise() -> f64 {
    0.3
}
fn default_compass_noise() -> f64 {
    1.5
}
fn default_satellites() -> u8 {
    8
}
fn default_heading_gains() -> [f64; 3] {
    [2.0, 0.1, 0.2]
}
fn default_heading_limit() -> f64 {
    50.0
}
fn default_base_speeds() -> [f64; 2] {
    [180.0, 190.0]
}
fn default_arrival() -> f64 {
    2.0
}
fn default_alpha() -> f64 {
    0.6
}
fn default_tick_ms() -> u64 {
    50
}

impl Default for WorldSection {
    fn default() -> Self {
        Self {
            wheel_base_m: default_wheel_base(),
            max_wheel_speed_mps: default_max_wheel_speed(),
            origin_lat_deg: default_origin_lat(),
            origin_lon_deg: default_origin_lon(),
            gps_noise_m: default_gps_noise(),
            compass_noise_deg: default_compass_noise(),
            satellites: default_satellites(),
            seed: 0,
        }
    }
}

impl Default for NavSection {
    fn default() -> Self {
        Self {
            heading_gains: default_heading_gains(),
            heading_output_limit: default_heading_limit(),
            base_speeds: default_base_speeds(),
            arrival_threshold_m: default_arrival(),
            heading_alpha: default_alpha(),
            tick_interval_ms: default_tick_ms(),
        }
    }
}

impl SimConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// World parameters for [`crate::world::SimWorld`].
    pub fn world_config(&self) -> WorldConfig {
        WorldConfig {
            wheel_base_m: self.world.wheel_base_m,
            max_wheel_speed_mps: self.world.max_wheel_speed_mps,
            origin_lat_deg: self.world.origin_lat_deg,
            origin_lon_deg: self.world.origin_lon_deg,
            gps_noise_m: self.world.gps_noise_m,
            compass_noise_deg: self.world.compass_noise_deg,
            satellites: self.world.satellites,
            seed: self.world.seed,
        }
    }

    /// Controller tuning for the navigation loop.
    pub fn nav_config(&self) -> NavConfig {
        let [kp, ki, kd] = self.nav.heading_gains;
        let [base_left, base_right] = self.nav.base_speeds;
        NavConfig {
            heading_kp: kp,
            heading_ki: ki,
            heading_kd: kd,
            heading_output_limit: self.nav.heading_output_limit,
            base_speed_left: base_left,
            base_speed_right: base_right,
            arrival_threshold_m: self.nav.arrival_threshold_m,
            heading_alpha: self.nav.heading_alpha,
            tick_interval_ms: self.nav.tick_interval_ms,
            ..NavConfig::default()
        }
    }
}
