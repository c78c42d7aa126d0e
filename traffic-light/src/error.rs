use std::error;
use std::fmt;

/// Convenient result type for traffic light operations using [`LightError`] as the error type.
pub type LightResult<T> = Result<T, LightError>;

/// Main error type for traffic light operations.
///
/// [`LightError`] carries an [`ErrorKind`] for programmatic handling, a static description and,
/// optionally, a dynamic detail string with the context of the failure.
#[derive(Debug, Clone)]
pub struct LightError {
    repr: ErrorRepr,
}

/// Internal representation of error data.
#[derive(Debug, Clone)]
enum ErrorRepr {
    /// Error with kind and static description
    WithDescription(ErrorKind, &'static str),
    /// Error with kind, static description, and dynamic detail
    WithDescriptionAndDetail(ErrorKind, &'static str, String),
}

/// Specific categories of errors that can occur while driving a traffic light.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    // Lifecycle Errors
    AlreadyRunning,
    AlreadyStopped,

    // Worker Errors
    WorkerSpawnFailed,
    CycleWorkerPanic,
}

impl LightError {
    /// Returns the [`ErrorKind`] of this error.
    pub fn kind(&self) -> ErrorKind {
        match self.repr {
            ErrorRepr::WithDescription(kind, _)
            | ErrorRepr::WithDescriptionAndDetail(kind, _, _) => kind,
        }
    }

    /// Returns the detailed error information if available.
    pub fn detail(&self) -> Option<&str> {
        match self.repr {
            ErrorRepr::WithDescriptionAndDetail(_, _, ref detail) => Some(detail.as_str()),
            ErrorRepr::WithDescription(_, _) => None,
        }
    }
}

impl PartialEq for LightError {
    fn eq(&self, other: &LightError) -> bool {
        self.kind() == other.kind()
    }
}

impl fmt::Display for LightError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self.repr {
            ErrorRepr::WithDescription(kind, desc) => {
                fmt::Debug::fmt(&kind, f)?;
                f.write_str(": ")?;
                desc.fmt(f)?;

                Ok(())
            }
            ErrorRepr::WithDescriptionAndDetail(kind, desc, ref detail) => {
                fmt::Debug::fmt(&kind, f)?;
                f.write_str(": ")?;
                desc.fmt(f)?;
                f.write_str(" -> ")?;
                detail.fmt(f)?;

                Ok(())
            }
        }
    }
}

impl error::Error for LightError {}

/// Creates a [`LightError`] from an error kind and static description.
impl From<(ErrorKind, &'static str)> for LightError {
    fn from((kind, desc): (ErrorKind, &'static str)) -> LightError {
        LightError {
            repr: ErrorRepr::WithDescription(kind, desc),
        }
    }
}

/// Creates a [`LightError`] from an error kind, static description, and dynamic detail.
impl From<(ErrorKind, &'static str, String)> for LightError {
    fn from((kind, desc, detail): (ErrorKind, &'static str, String)) -> LightError {
        LightError {
            repr: ErrorRepr::WithDescriptionAndDetail(kind, desc, detail),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{bail, light_error};

    fn always_running() -> LightResult<()> {
        bail!(ErrorKind::AlreadyRunning, "The traffic light is already running");
    }

    #[test]
    fn test_display_without_detail() {
        let err = always_running().unwrap_err();

        assert_eq!(err.kind(), ErrorKind::AlreadyRunning);
        assert_eq!(err.detail(), None);
        assert_eq!(
            err.to_string(),
            "AlreadyRunning: The traffic light is already running"
        );
    }

    #[test]
    fn test_display_with_detail() {
        let err = light_error!(
            ErrorKind::CycleWorkerPanic,
            "The phase cycle worker panicked",
            "boom"
        );

        assert_eq!(err.detail(), Some("boom"));
        assert_eq!(
            err.to_string(),
            "CycleWorkerPanic: The phase cycle worker panicked -> boom"
        );
    }

    #[test]
    fn test_equality_compares_kinds() {
        let a = light_error!(ErrorKind::AlreadyStopped, "stopped");
        let b = light_error!(ErrorKind::AlreadyStopped, "stopped", "with detail");
        let c = light_error!(ErrorKind::AlreadyRunning, "running");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
