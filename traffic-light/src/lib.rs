//! A traffic light that alternates between red and green on a randomized interval.
//!
//! The [`light::TrafficLight`] runs a background worker that toggles its phase and publishes
//! every change through a single-slot [`concurrency::channel::NotificationChannel`]. Any number
//! of threads can block on [`light::TrafficLight::wait_for_green`] until the light turns green.

pub mod concurrency;
pub mod error;
pub mod light;
mod macros;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod timer;
pub mod types;
pub mod workers;
