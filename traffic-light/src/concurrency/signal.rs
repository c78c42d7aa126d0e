use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// A one-shot flag that threads can block on.
///
/// Once raised the flag stays raised, and every thread waiting on it is woken up.
#[derive(Debug, Default)]
struct Signal {
    raised: Mutex<bool>,
    condition: Condvar,
}

/// Sending half of a signal, raising it wakes every [`SignalRx`].
#[derive(Debug, Clone)]
pub struct SignalTx(Arc<Signal>);

/// Receiving half of a signal.
#[derive(Debug, Clone)]
pub struct SignalRx(Arc<Signal>);

impl SignalTx {
    /// Raises the signal. Raising an already raised signal has no effect.
    pub fn send(&self) {
        let mut raised = self.0.raised.lock().unwrap_or_else(PoisonError::into_inner);
        *raised = true;
        self.0.condition.notify_all();
    }

    pub fn subscribe(&self) -> SignalRx {
        SignalRx(self.0.clone())
    }
}

impl SignalRx {
    pub fn is_raised(&self) -> bool {
        *self.0.raised.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Blocks for at most `timeout`, returning `true` as soon as the signal is raised.
    ///
    /// Returns `false` if the whole timeout elapsed without the signal being raised.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut raised = self.0.raised.lock().unwrap_or_else(PoisonError::into_inner);

        // Spurious wake-ups are possible, so we keep waiting until the deadline is reached.
        while !*raised {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }

            raised = self
                .0
                .condition
                .wait_timeout(raised, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }

        true
    }
}

/// Creates a new pair of [`SignalTx`] and [`SignalRx`].
pub fn create_signal() -> (SignalTx, SignalRx) {
    let signal = Arc::new(Signal::default());
    (SignalTx(signal.clone()), SignalRx(signal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_wait_timeout_elapses_without_signal() {
        let (_tx, rx) = create_signal();

        let started = Instant::now();
        assert!(!rx.wait_timeout(Duration::from_millis(30)));
        assert!(started.elapsed() >= Duration::from_millis(30));
        assert!(!rx.is_raised());
    }

    #[test]
    fn test_wait_timeout_wakes_up_on_signal() {
        let (tx, rx) = create_signal();

        let sender = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            tx.send();
        });

        let started = Instant::now();
        assert!(rx.wait_timeout(Duration::from_secs(10)));
        assert!(started.elapsed() < Duration::from_secs(10));

        sender.join().unwrap();
    }

    #[test]
    fn test_raised_signal_returns_immediately() {
        let (tx, rx) = create_signal();
        tx.send();
        tx.send();

        assert!(rx.is_raised());
        assert!(rx.wait_timeout(Duration::from_secs(10)));
        assert!(tx.subscribe().is_raised());
    }
}
