//! terrapin-core - Pure no_std navigation and motion control logic
//!
//! This crate contains the platform-agnostic algorithms of the Terrapin
//! rover: heading filtering, great-circle geodesy, a reusable PID
//! controller, and the navigation state machine. It can be tested on
//! host without any hardware or simulator dependencies.
//!
//! # Design Principles
//!
//! - **Zero cfg**: No `#[cfg(feature = ...)]` directives allowed
//! - **Pure no_std**: No std library dependencies
//! - **Single owner**: All mutable control state is owned by the
//!   [`nav::NavigationLoop`] instance; platform services (sensors,
//!   command channel, actuator, status sink, clock) are injected
//!   through traits
//!
//! # Modules
//!
//! - [`clock`]: Time source abstraction and a manual test clock
//! - [`geo`]: Coordinates, haversine distance, initial bearing
//! - [`heading`]: Low-pass heading filter with 0/360 wraparound
//! - [`pid`]: PID controller with saturation and anti-windup
//! - [`command`]: Text command wire syntax (`STOP`, `<lat>,<lng>`)
//! - [`types`]: Sensor snapshots, motor commands, status reports
//! - [`io`]: Collaborator traits implemented by platforms/harnesses
//! - [`nav`]: The tick-driven navigation state machine

#![no_std]

pub mod clock;
pub mod command;
pub mod geo;
pub mod heading;
pub mod io;
pub mod nav;
pub mod pid;
pub mod types;
