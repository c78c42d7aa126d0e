use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// The color currently shown by a traffic light.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Phase {
    Red = 0,
    Green = 1,
}

impl Phase {
    /// Returns the phase that follows this one.
    ///
    /// The light only ever alternates, so this is simply the other color.
    pub fn toggled(self) -> Phase {
        match self {
            Phase::Red => Phase::Green,
            Phase::Green => Phase::Red,
        }
    }

    pub fn is_green(self) -> bool {
        matches!(self, Phase::Green)
    }

    fn from_u8(value: u8) -> Phase {
        match value {
            0 => Phase::Red,
            _ => Phase::Green,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Red => write!(f, "red"),
            Phase::Green => write!(f, "green"),
        }
    }
}

/// A [`Phase`] that can be shared between threads without a lock.
///
/// The phase cycle worker is the only writer, while any number of threads may read it.
#[derive(Debug)]
pub struct AtomicPhase(AtomicU8);

impl AtomicPhase {
    pub fn new(phase: Phase) -> Self {
        Self(AtomicU8::new(phase as u8))
    }

    pub fn load(&self) -> Phase {
        Phase::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Flips the phase and returns the phase that was shown before the flip.
    pub fn toggle(&self) -> Phase {
        // `1` is the bit that distinguishes red from green.
        Phase::from_u8(self.0.fetch_xor(1, Ordering::AcqRel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Phase::Red.to_string(), "red");
        assert_eq!(Phase::Green.to_string(), "green");
    }

    #[test]
    fn test_toggled_alternates() {
        assert_eq!(Phase::Green.toggled(), Phase::Red);
        assert_eq!(Phase::Red.toggled(), Phase::Green);
        assert_eq!(Phase::Green.toggled().toggled(), Phase::Green);
    }

    #[test]
    fn test_atomic_toggle_strictly_alternates_from_green() {
        let phase = AtomicPhase::new(Phase::Green);

        for n in 1..=10 {
            let previous = phase.toggle();
            let current = phase.load();

            assert_ne!(previous, current);
            if n % 2 == 1 {
                assert_eq!(current, Phase::Red, "toggle {n} should be red");
            } else {
                assert_eq!(current, Phase::Green, "toggle {n} should be green");
            }
        }
    }
}
