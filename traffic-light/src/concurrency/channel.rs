use std::fmt;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// A single-slot hand-off point between one producer and any number of consumers.
///
/// The channel keeps only the latest value: [`NotificationChannel::send`] overwrites a value that
/// was not received yet, so a slow or absent consumer never causes values to pile up. Consumers
/// only care about the most recent state, not about the history they missed.
pub struct NotificationChannel<T> {
    slot: Mutex<Option<T>>,
    condition: Condvar,
}

impl<T> NotificationChannel<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
            condition: Condvar::new(),
        }
    }

    /// Stores `value`, discarding any value that was not received yet, and wakes up one blocked
    /// consumer.
    pub fn send(&self, value: T) {
        let mut slot = self.lock();
        *slot = Some(value);
        drop(slot);

        self.condition.notify_one();
    }

    /// Blocks until a value is available, then takes it out of the channel.
    ///
    /// There is no timeout: if nothing is ever sent, this call never returns.
    pub fn receive(&self) -> T {
        let mut slot = self.lock();
        loop {
            if let Some(value) = slot.take() {
                return value;
            }

            slot = self
                .condition
                .wait(slot)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Like [`NotificationChannel::receive`], but gives up once `timeout` elapsed.
    pub fn receive_timeout(&self, timeout: Duration) -> Option<T> {
        let deadline = Instant::now() + timeout;
        let mut slot = self.lock();
        loop {
            if let Some(value) = slot.take() {
                return Some(value);
            }

            let now = Instant::now();
            if now >= deadline {
                return None;
            }

            slot = self
                .condition
                .wait_timeout(slot, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    /// Takes the pending value, if any, without blocking.
    pub fn try_receive(&self) -> Option<T> {
        self.lock().take()
    }

    // The slot holds a plain value which is never left half-written, so a panic of another
    // holder does not invalidate it.
    fn lock(&self) -> MutexGuard<'_, Option<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Default for NotificationChannel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for NotificationChannel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationChannel")
            .field("pending", &self.lock().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_receive_returns_last_sent_value_once() {
        let channel = NotificationChannel::new();
        for value in 1..=5 {
            channel.send(value);
        }

        assert_eq!(channel.receive(), 5);
        assert_eq!(channel.try_receive(), None);
    }

    #[test]
    fn test_receive_blocks_until_value_is_sent() {
        let channel = Arc::new(NotificationChannel::new());

        let producer = {
            let channel = channel.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(50));
                channel.send("green");
            })
        };

        let started = Instant::now();
        assert_eq!(channel.receive(), "green");
        assert!(started.elapsed() >= Duration::from_millis(40));

        producer.join().unwrap();
    }

    #[test]
    fn test_receive_timeout_without_value() {
        let channel: NotificationChannel<u8> = NotificationChannel::new();

        let started = Instant::now();
        assert_eq!(channel.receive_timeout(Duration::from_millis(30)), None);
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_receive_timeout_with_late_value() {
        let channel = Arc::new(NotificationChannel::new());

        let producer = {
            let channel = channel.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                channel.send(42);
            })
        };

        assert_eq!(channel.receive_timeout(Duration::from_secs(10)), Some(42));

        producer.join().unwrap();
    }

    #[test]
    fn test_every_consumer_is_eventually_served() {
        let channel = Arc::new(NotificationChannel::new());

        let consumers: Vec<_> = (0..2)
            .map(|_| {
                let channel = channel.clone();
                thread::spawn(move || channel.receive())
            })
            .collect();

        // Keep sending until both consumers took a value, mirroring a producer that publishes on
        // every state change.
        while !consumers.iter().all(|consumer| consumer.is_finished()) {
            channel.send(1);
            thread::sleep(Duration::from_millis(5));
        }

        for consumer in consumers {
            assert_eq!(consumer.join().unwrap(), 1);
        }
    }
}
