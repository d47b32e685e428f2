//! The control loop and its fan curve.

pub mod controller;
pub mod curve;
pub mod status;

pub use controller::{FanController, TickReport};
pub use curve::ControlConstants;
pub use status::{StatusReporter, StatusSnapshot};
