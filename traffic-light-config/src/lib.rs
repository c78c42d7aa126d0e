//! Configuration management for the traffic light simulator.
//!
//! Provides environment detection, configuration loading from YAML files and environment
//! variables, and the shared configuration types of the simulator.

mod environment;
mod load;
pub mod shared;

pub use environment::*;
pub use load::*;
