use std::time::Duration;

use crate::concurrency::signal::{SignalRx, SignalTx, create_signal};

/// Handle used to request the shutdown of a traffic light.
///
/// It can be cloned freely, every clone raises the same signal.
#[derive(Debug, Clone)]
pub struct ShutdownTx(SignalTx);

impl ShutdownTx {
    pub fn wrap(tx: SignalTx) -> Self {
        Self(tx)
    }

    /// Requests shutdown. Calling it more than once is harmless.
    pub fn shutdown(&self) {
        self.0.send()
    }

    pub fn subscribe(&self) -> ShutdownRx {
        ShutdownRx(self.0.subscribe())
    }
}

/// Receiving side of a shutdown request.
#[derive(Debug, Clone)]
pub struct ShutdownRx(SignalRx);

impl ShutdownRx {
    pub fn is_shutdown(&self) -> bool {
        self.0.is_raised()
    }

    /// Suspends the calling thread for `timeout`, unless shutdown is requested first.
    ///
    /// Returns [`ShutdownResult::Shutdown`] as soon as shutdown is requested, including when it
    /// was requested before this call.
    pub fn wait_timeout(&self, timeout: Duration) -> ShutdownResult<(), ()> {
        if self.0.wait_timeout(timeout) {
            ShutdownResult::Shutdown(())
        } else {
            ShutdownResult::Ok(())
        }
    }
}

pub enum ShutdownResult<T, I> {
    Ok(T),
    Shutdown(I),
}

impl<T, I> ShutdownResult<T, I> {
    pub fn should_shutdown(&self) -> bool {
        matches!(self, ShutdownResult::Shutdown(_))
    }
}

pub fn create_shutdown_channel() -> (ShutdownTx, ShutdownRx) {
    let (tx, rx) = create_signal();
    (ShutdownTx::wrap(tx), ShutdownRx(rx))
}
