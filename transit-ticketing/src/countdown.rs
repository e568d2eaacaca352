use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

/// Outcome of one countdown tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Remaining(u64),
    /// Reported exactly once, on the tick that reaches zero
    Expired,
    /// Already expired, nothing left to count
    Idle,
}

/// Seconds left on a payment or selection screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    remaining: u64,
    expired: bool,
}

impl Countdown {
    pub fn new(seconds: u64) -> Self {
        Self { remaining: seconds, expired: false }
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }

    /// Advance by one second
    pub fn tick(&mut self) -> Tick {
        if self.expired {
            return Tick::Idle;
        }
        if self.remaining <= 1 {
            self.remaining = 0;
            self.expired = true;
            return Tick::Expired;
        }
        self.remaining -= 1;
        Tick::Remaining(self.remaining)
    }

    pub fn format_mm_ss(&self) -> String {
        format_mm_ss(self.remaining)
    }
}

pub fn format_mm_ss(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// A countdown driven once per second on the tokio runtime.
///
/// Dropping the handle stops the countdown; `on_expire` then never runs.
pub struct CountdownHandle {
    task: JoinHandle<()>,
    remaining: watch::Receiver<u64>,
}

impl CountdownHandle {
    pub fn spawn<F>(seconds: u64, on_expire: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let (tx, rx) = watch::channel(seconds);
        let task = tokio::spawn(async move {
            let mut countdown = Countdown::new(seconds);
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            // First tick completes immediately
            interval.tick().await;

            loop {
                interval.tick().await;
                match countdown.tick() {
                    Tick::Remaining(left) => {
                        let _ = tx.send(left);
                    }
                    _ => break,
                }
            }

            let _ = tx.send(0);
            debug!("Countdown of {}s expired", seconds);
            on_expire.await;
        });

        Self { task, remaining: rx }
    }

    pub fn remaining(&self) -> u64 {
        *self.remaining.borrow()
    }

    pub fn display(&self) -> String {
        format_mm_ss(self.remaining())
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

}

impl Drop for CountdownHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
