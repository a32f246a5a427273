//! Navigation state machine.
//!
//! A tick-driven loop that ties sensor snapshots and operator commands
//! to differential motor commands:
//!
//! ```text
//! ┌──────────────┐   snapshot    ┌──────────────────────────────┐
//! │ SensorProvider├──────────────▶                               │
//! └──────────────┘               │                               │
//! ┌──────────────┐   CommandPoll │        NavigationLoop         │
//! │CommandChannel ├──────────────▶  HeadingEstimator             │
//! └──────────────┘               │  geo distance / bearing       │
//! ┌──────────────┐  MotorCommand │  heading PidController        │
//! │ MotorActuator ◀──────────────┤                               │
//! └──────────────┘               │                               │
//! ┌──────────────┐ report/event  │                               │
//! │  StatusSink   ◀──────────────┤                               │
//! └──────────────┘               └───────────────────────────────┘
//! ```
//!
//! The loop owns every piece of mutable control state; collaborators
//! are injected per tick as `&mut dyn` trait objects.

mod controller;
mod state;

pub use controller::NavigationLoop;
pub use state::NavState;
