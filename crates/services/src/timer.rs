use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

//
// ─── COUNTDOWN ─────────────────────────────────────────────────────────────────
//

/// Outcome of a single 1 Hz tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Seconds left after this tick.
    Remaining(u32),
    /// The counter reached zero on this tick.
    Expired,
}

/// Pure countdown state, driven by an external 1 Hz tick source.
///
/// Once the counter reaches zero the countdown is spent: every further
/// `tick` returns `None`, so a second expiry cannot be produced.
#[derive(Debug, Clone)]
pub struct Countdown {
    remaining: u32,
    expired: bool,
}

impl Countdown {
    #[must_use]
    pub fn new(initial_seconds: u32) -> Self {
        Self {
            remaining: initial_seconds,
            expired: false,
        }
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expired
    }

    /// Advance the countdown by one second.
    pub fn tick(&mut self) -> Option<Tick> {
        if self.expired {
            return None;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.expired = true;
            Some(Tick::Expired)
        } else {
            Some(Tick::Remaining(self.remaining))
        }
    }
}

//
// ─── COUNTDOWN TIMER ───────────────────────────────────────────────────────────
//

/// Handle to a running countdown task.
///
/// `stop` is idempotent and callable at any time: section change, early
/// submit, or abandonment. Dropping the handle also stops the task, so a
/// replaced timer can never keep ticking in the background.
#[derive(Debug)]
pub struct TimerHandle {
    stopped: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl TimerHandle {
    /// Stop the countdown. Safe to call repeatedly.
    pub fn stop(&self) {
        if !self.stopped.swap(true, Ordering::SeqCst) {
            self.task.abort();
        }
    }

    /// True once the task has ended, whether by expiry or by `stop`.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Recurring 1 Hz countdown for one exam section.
pub struct CountdownTimer;

impl CountdownTimer {
    /// Spawn a countdown task ticking once per second.
    ///
    /// `on_tick` receives the new remaining value after every tick,
    /// including the final `0`. `on_expire` runs exactly once when the
    /// counter reaches zero; it is `FnOnce` and the task ends right after,
    /// so an expired timer cannot fire again.
    pub fn start<T, E>(initial_seconds: u32, mut on_tick: T, on_expire: E) -> TimerHandle
    where
        T: FnMut(u32) + Send + 'static,
        E: FnOnce() + Send + 'static,
    {
        let stopped = Arc::new(AtomicBool::new(false));
        let mut countdown = Countdown::new(initial_seconds);

        let task = tokio::spawn(async move {
            let mut ticks = interval(Duration::from_secs(1));
            ticks.set_missed_tick_behavior(MissedTickBehavior::Burst);
            // The first interval tick completes immediately; skip it so the
            // countdown decrements once per elapsed second.
            ticks.tick().await;

            loop {
                ticks.tick().await;
                match countdown.tick() {
                    Some(Tick::Remaining(remaining)) => on_tick(remaining),
                    Some(Tick::Expired) => {
                        on_tick(0);
                        on_expire();
                        break;
                    }
                    None => break,
                }
            }
        });

        TimerHandle { stopped, task }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicU32;

    #[test]
    fn countdown_decrements_by_one_per_tick() {
        let mut countdown = Countdown::new(3);
        assert_eq!(countdown.tick(), Some(Tick::Remaining(2)));
        assert_eq!(countdown.tick(), Some(Tick::Remaining(1)));
        assert_eq!(countdown.tick(), Some(Tick::Expired));
        assert_eq!(countdown.remaining(), 0);
    }

    #[test]
    fn countdown_expires_exactly_once_and_never_goes_negative() {
        let mut countdown = Countdown::new(1);
        assert_eq!(countdown.tick(), Some(Tick::Expired));
        assert!(countdown.is_expired());
        assert_eq!(countdown.tick(), None);
        assert_eq!(countdown.tick(), None);
        assert_eq!(countdown.remaining(), 0);
    }

    #[test]
    fn zero_initialized_countdown_expires_on_first_tick() {
        let mut countdown = Countdown::new(0);
        assert_eq!(countdown.tick(), Some(Tick::Expired));
        assert_eq!(countdown.tick(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn timer_ticks_down_and_expires_once() {
        let ticks = Arc::new(Mutex::new(Vec::new()));
        let expiries = Arc::new(AtomicU32::new(0));

        let handle = CountdownTimer::start(
            3,
            {
                let ticks = Arc::clone(&ticks);
                move |remaining| ticks.lock().unwrap().push(remaining)
            },
            {
                let expiries = Arc::clone(&expiries);
                move || {
                    expiries.fetch_add(1, Ordering::SeqCst);
                }
            },
        );

        tokio::time::sleep(Duration::from_secs(10)).await;

        assert!(handle.is_finished());
        assert_eq!(*ticks.lock().unwrap(), vec![2, 1, 0]);
        assert_eq!(expiries.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stopped_timer_never_expires() {
        let expiries = Arc::new(AtomicU32::new(0));

        let handle = CountdownTimer::start(5, |_| {}, {
            let expiries = Arc::clone(&expiries);
            move || {
                expiries.fetch_add(1, Ordering::SeqCst);
            }
        });

        handle.stop();
        handle.stop();

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(handle.is_finished());
        assert_eq!(expiries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_stops_the_task() {
        let ticks = Arc::new(AtomicU32::new(0));

        let handle = CountdownTimer::start(
            1000,
            {
                let ticks = Arc::clone(&ticks);
                move |_| {
                    ticks.fetch_add(1, Ordering::SeqCst);
                }
            },
            || {},
        );
        drop(handle);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 0);
    }
}
