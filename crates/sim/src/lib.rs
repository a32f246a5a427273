//! terrapin-sim - Host-side simulation harness for the Terrapin stack.
//!
//! Provides in-memory implementations of the four collaborator traits
//! from `terrapin-core` plus a wall-clock runner, so the whole
//! navigation loop can be exercised without hardware:
//!
//! - [`world::SimWorld`]: differential drive kinematics with noisy
//!   sensor synthesis (the sensor provider and motor actuator in one)
//! - [`harness`]: scripted commands and recording doubles
//! - [`runner`]: fixed-cadence blocking loop
//! - [`config`]: TOML-backed configuration

pub mod clock;
pub mod config;
pub mod error;
pub mod harness;
pub mod runner;
pub mod world;

pub use clock::SystemClock;
pub use config::SimConfig;
pub use error::SimError;
pub use harness::{RecordingActuator, RecordingSink, ScriptedCommands};
pub use world::{SimWorld, WorldConfig};
