//! Macros for traffic light error handling.
//!
//! Provides convenience macros for creating and returning [`crate::error::LightError`] instances
//! with reduced boilerplate.

/// Creates a [`crate::error::LightError`] from error kind and description.
///
/// Accepts an optional third argument used as dynamic detail, converted with `to_string`.
#[macro_export]
macro_rules! light_error {
    ($kind:expr, $desc:expr) => {
        $crate::error::LightError::from(($kind, $desc))
    };
    ($kind:expr, $desc:expr, $detail:expr) => {
        $crate::error::LightError::from(($kind, $desc, $detail.to_string()))
    };
}

/// Creates and returns a [`crate::error::LightError`] from the current function.
#[macro_export]
macro_rules! bail {
    ($kind:expr, $desc:expr) => {
        return Err($crate::light_error!($kind, $desc))
    };
    ($kind:expr, $desc:expr, $detail:expr) => {
        return Err($crate::light_error!($kind, $desc, $detail))
    };
}
