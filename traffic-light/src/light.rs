//! The traffic light and its lifecycle.
//!
//! A [`TrafficLight`] starts green and, once [`TrafficLight::simulate`] is called, alternates
//! between red and green on a background worker. Every toggle is published through a
//! last-write-wins [`NotificationChannel`], on which waiters block until the light turns green.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::bail;
use crate::concurrency::channel::NotificationChannel;
use crate::concurrency::shutdown::{ShutdownTx, create_shutdown_channel};
use crate::error::{ErrorKind, LightResult};
use crate::timer::{PhaseTimer, RandomPhaseTimer};
use crate::types::{AtomicPhase, LightStatus, Phase};
use crate::workers::cycle::{CycleWorker, CycleWorkerHandle};

/// Phase shown by a light before its first toggle.
const INITIAL_PHASE: Phase = Phase::Green;

/// State shared between a [`TrafficLight`] and its phase cycle worker.
#[derive(Debug)]
pub(crate) struct LightInner {
    pub(crate) phase: AtomicPhase,
    pub(crate) channel: NotificationChannel<Phase>,
    pub(crate) status: Mutex<LightStatus>,
}

/// A traffic light alternating between red and green.
///
/// The light is meant to be shared, usually behind an [`Arc`], between the owner that starts it
/// and any number of threads waiting for green. The timer `T` decides how long each phase lasts
/// and defaults to [`RandomPhaseTimer`].
pub struct TrafficLight<T = RandomPhaseTimer> {
    inner: Arc<LightInner>,
    timer: Mutex<Option<T>>,
    shutdown_tx: ShutdownTx,
}

impl TrafficLight<RandomPhaseTimer> {
    /// Creates a light whose phases last a random duration seeded from the operating system.
    pub fn new() -> Self {
        Self::with_timer(RandomPhaseTimer::new())
    }
}

impl Default for TrafficLight<RandomPhaseTimer> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TrafficLight<T>
where
    T: PhaseTimer + Send + 'static,
{
    /// Creates a light whose phase durations are produced by `timer`.
    pub fn with_timer(timer: T) -> Self {
        let inner = LightInner {
            phase: AtomicPhase::new(INITIAL_PHASE),
            channel: NotificationChannel::new(),
            status: Mutex::new(LightStatus::Idle),
        };

        // The receiving side is subscribed by the worker when the light starts.
        let (shutdown_tx, _) = create_shutdown_channel();

        Self {
            inner: Arc::new(inner),
            timer: Mutex::new(Some(timer)),
            shutdown_tx,
        }
    }

    /// Starts toggling the light on a background worker and returns immediately.
    ///
    /// A light can only be started once: calling this while the worker runs fails with
    /// [`ErrorKind::AlreadyRunning`] and calling it after the worker stopped fails with
    /// [`ErrorKind::AlreadyStopped`]. If the worker thread can't be spawned the error is returned
    /// and the light is left stopped.
    pub fn simulate(&self) -> LightResult<CycleWorkerHandle> {
        let timer = {
            let mut status = self.lock_status();
            match *status {
                LightStatus::Idle => {}
                LightStatus::Running => {
                    warn!("traffic light simulation requested while already running");
                    bail!(
                        ErrorKind::AlreadyRunning,
                        "The traffic light is already running"
                    );
                }
                LightStatus::Stopped => {
                    bail!(
                        ErrorKind::AlreadyStopped,
                        "The traffic light was stopped and can't be restarted"
                    );
                }
            }

            let Some(timer) = self
                .timer
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take()
            else {
                bail!(
                    ErrorKind::AlreadyStopped,
                    "The traffic light has no phase timer left to run with"
                );
            };

            *status = LightStatus::Running;
            timer
        };

        info!(phase = %self.current_phase(), "starting traffic light simulation");

        let worker = CycleWorker::new(self.inner.clone(), timer, self.shutdown_tx.clone());
        match worker.start() {
            Ok(handle) => Ok(handle),
            Err(err) => {
                *self.lock_status() = LightStatus::Stopped;
                Err(err)
            }
        }
    }

    /// Returns the phase currently shown, without blocking.
    pub fn current_phase(&self) -> Phase {
        self.inner.phase.load()
    }

    pub fn status(&self) -> LightStatus {
        *self.lock_status()
    }

    /// Returns a handle that stops the light when triggered.
    pub fn shutdown_tx(&self) -> ShutdownTx {
        self.shutdown_tx.clone()
    }

    /// Blocks the calling thread until the light turns green.
    ///
    /// The caller is released by the next green notification it consumes. A green notification
    /// that no other waiter consumed yet stays in the channel, so a caller arriving while that
    /// green is still pending returns immediately. Otherwise it waits for the next red-to-green
    /// transition, skipping any red it consumes along the way. An idle light has published
    /// nothing, so waiting on it blocks until it starts and turns green.
    ///
    /// There is no timeout, and after the light stopped this never returns. Use
    /// [`TrafficLight::wait_for_green_timeout`] when the caller needs to notice a shutdown.
    pub fn wait_for_green(&self) {
        loop {
            let phase = self.inner.channel.receive();
            if phase.is_green() {
                debug!("light turned green, releasing waiter");
                return;
            }
        }
    }

    /// Like [`TrafficLight::wait_for_green`], but gives up after `timeout`.
    ///
    /// Returns `true` if the light turned green in time.
    pub fn wait_for_green_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.inner.channel.receive_timeout(remaining) {
                Some(phase) if phase.is_green() => {
                    debug!("light turned green, releasing waiter");
                    return true;
                }
                Some(_) => continue,
                None => return false,
            }
        }
    }

    /// Consumes the next published phase, waiting at most `timeout` for one.
    ///
    /// Competes with waiters for the same notifications.
    pub fn next_phase_timeout(&self, timeout: Duration) -> Option<Phase> {
        self.inner.channel.receive_timeout(timeout)
    }

    fn lock_status(&self) -> MutexGuard<'_, LightStatus> {
        self.inner
            .status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> fmt::Debug for TrafficLight<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrafficLight")
            .field("phase", &self.inner.phase.load())
            .field("status", &self.inner.status)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::timer::FixedPhaseTimer;

    #[test]
    fn test_new_light_is_idle_and_green() {
        let light = TrafficLight::new();

        assert_eq!(light.current_phase(), Phase::Green);
        assert_eq!(light.status(), LightStatus::Idle);
    }

    #[test]
    fn test_wait_for_green_timeout_on_idle_light() {
        let light = TrafficLight::with_timer(FixedPhaseTimer::new(Duration::from_millis(10)));

        assert!(!light.wait_for_green_timeout(Duration::from_millis(30)));
    }

    #[test]
    fn test_simulate_then_shutdown_marks_light_stopped() {
        let light = TrafficLight::with_timer(FixedPhaseTimer::new(Duration::from_secs(60)));

        let handle = light.simulate().unwrap();
        assert_eq!(light.status(), LightStatus::Running);

        handle.shutdown_and_wait().unwrap();
        assert_eq!(light.status(), LightStatus::Stopped);
        assert_eq!(light.current_phase(), Phase::Green);
    }
}
