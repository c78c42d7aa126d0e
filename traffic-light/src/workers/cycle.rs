use std::any::Any;
use std::sync::{Arc, PoisonError};
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info};

use crate::concurrency::shutdown::{ShutdownRx, ShutdownTx};
use crate::error::{ErrorKind, LightResult};
use crate::light::LightInner;
use crate::light_error;
use crate::timer::PhaseTimer;
use crate::types::LightStatus;

/// Name given to the OS thread running the phase cycle worker.
const CYCLE_WORKER_THREAD_NAME: &str = "traffic-light-cycle";

/// Handle to a running phase cycle worker.
///
/// Dropping the handle detaches the worker: it keeps toggling the light until a shutdown is
/// requested through any [`ShutdownTx`] of the light.
#[derive(Debug)]
pub struct CycleWorkerHandle {
    handle: Option<JoinHandle<()>>,
    shutdown_tx: ShutdownTx,
}

impl CycleWorkerHandle {
    /// Requests the worker to stop. The worker exits without toggling the light again.
    pub fn shutdown(&self) {
        self.shutdown_tx.shutdown();
    }

    pub fn shutdown_tx(&self) -> ShutdownTx {
        self.shutdown_tx.clone()
    }

    /// Returns `true` once the worker thread has exited.
    pub fn is_finished(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| handle.is_finished())
            .unwrap_or(true)
    }

    /// Blocks until the worker exits.
    ///
    /// The worker only exits after a shutdown request, so calling this without requesting one
    /// blocks for the rest of the process lifetime. A panic inside the worker is returned as
    /// [`ErrorKind::CycleWorkerPanic`].
    pub fn wait(mut self) -> LightResult<()> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };

        handle.join().map_err(|payload| {
            light_error!(
                ErrorKind::CycleWorkerPanic,
                "The phase cycle worker panicked",
                panic_message(payload.as_ref())
            )
        })
    }

    /// Requests the worker to stop and waits for it to exit.
    pub fn shutdown_and_wait(self) -> LightResult<()> {
        self.shutdown();
        self.wait()
    }
}

/// Worker that toggles the phase of a light every time its timer elapses.
pub(crate) struct CycleWorker<T> {
    inner: Arc<LightInner>,
    timer: T,
    shutdown_tx: ShutdownTx,
    shutdown_rx: ShutdownRx,
}

impl<T> CycleWorker<T>
where
    T: PhaseTimer + Send + 'static,
{
    pub(crate) fn new(inner: Arc<LightInner>, timer: T, shutdown_tx: ShutdownTx) -> Self {
        let shutdown_rx = shutdown_tx.subscribe();

        Self {
            inner,
            timer,
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Spawns the worker on its own OS thread and returns a handle to it.
    pub(crate) fn start(self) -> LightResult<CycleWorkerHandle> {
        let shutdown_tx = self.shutdown_tx.clone();

        let handle = thread::Builder::new()
            .name(CYCLE_WORKER_THREAD_NAME.to_owned())
            .spawn(move || self.run())
            .map_err(|err| {
                light_error!(
                    ErrorKind::WorkerSpawnFailed,
                    "Failed to spawn the phase cycle worker thread",
                    err
                )
            })?;

        debug!("phase cycle worker thread spawned");

        Ok(CycleWorkerHandle {
            handle: Some(handle),
            shutdown_tx,
        })
    }

    fn run(mut self) {
        let _stopped = MarkStoppedOnExit(self.inner.clone());

        info!(
            phase = %self.inner.phase.load(),
            "phase cycle worker started"
        );

        let mut cycle: u64 = 0;
        loop {
            let cycle_duration = self.timer.next_cycle();
            debug!(
                cycle,
                cycle_ms = cycle_duration.as_millis() as u64,
                "waiting for the next toggle"
            );

            if self
                .shutdown_rx
                .wait_timeout(cycle_duration)
                .should_shutdown()
            {
                info!(cycle, "shutting down phase cycle worker");
                return;
            }

            // The phase is stored before it is published, so whoever receives it sees the same
            // value through `TrafficLight::current_phase`.
            let previous = self.inner.phase.toggle();
            let next = previous.toggled();
            cycle += 1;

            info!(
                %previous,
                %next,
                cycle,
                cycle_ms = cycle_duration.as_millis() as u64,
                "a traffic light toggled from {previous} to {next}"
            );

            self.inner.channel.send(next);
        }
    }
}

/// Marks the light as stopped when dropped, covering both a clean exit and a panic.
struct MarkStoppedOnExit(Arc<LightInner>);

impl Drop for MarkStoppedOnExit {
    fn drop(&mut self) {
        if thread::panicking() {
            error!("phase cycle worker panicked, the light stops toggling");
        }

        let mut status = self
            .0
            .status
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *status = LightStatus::Stopped;
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message_from_payloads() {
        let static_payload: Box<dyn Any + Send> = Box::new("static message");
        let owned_payload: Box<dyn Any + Send> = Box::new(String::from("owned message"));
        let other_payload: Box<dyn Any + Send> = Box::new(5u32);

        assert_eq!(panic_message(static_payload.as_ref()), "static message");
        assert_eq!(panic_message(owned_payload.as_ref()), "owned message");
        assert_eq!(panic_message(other_payload.as_ref()), "unknown panic payload");
    }
}
