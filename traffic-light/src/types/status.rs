use std::fmt;

/// Lifecycle of a traffic light's phase cycle worker.
///
/// Transitions only move forward: `Idle` -> `Running` -> `Stopped`. A light that failed to spawn
/// its worker goes straight from `Idle` to `Stopped`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LightStatus {
    /// The light was created but [`crate::light::TrafficLight::simulate`] was not called yet.
    Idle,
    /// The phase cycle worker is toggling the light.
    Running,
    /// The phase cycle worker exited and the light will not change phase anymore.
    Stopped,
}

impl fmt::Display for LightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LightStatus::Idle => write!(f, "idle"),
            LightStatus::Running => write!(f, "running"),
            LightStatus::Stopped => write!(f, "stopped"),
        }
    }
}
