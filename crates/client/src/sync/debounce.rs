//! Debounce primitive.
//!
//! [`DebounceState`] is the clock-free state machine; [`Debouncer`] drives it
//! with a tokio task and publishes settled values on a watch channel.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Raw/settled pair with the pending settle deadline.
///
/// `settled` only ever takes the value `raw` held for a full quiet period.
#[derive(Debug, Clone)]
pub struct DebounceState<T> {
    raw: T,
    settled: T,
    quiet: Duration,
    deadline: Option<Instant>,
}

impl<T: Clone + PartialEq> DebounceState<T> {
    /// Starts settled on `initial`, with no pending timer.
    pub fn new(initial: T, quiet: Duration) -> Self {
        Self { raw: initial.clone(), settled: initial, quiet, deadline: None }
    }

    /// Record a new raw value observed at `now`, restarting the quiet period.
    pub fn push(&mut self, value: T, now: Instant) {
        if value == self.raw {
            return;
        }
        self.raw = value;
        self.deadline = Some(now + self.quiet);
    }

    /// Settle if the quiet period has elapsed by `now`.
    ///
    /// Returns the new settled value when it changed.
    pub fn poll(&mut self, now: Instant) -> Option<&T> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                if self.settled == self.raw {
                    return None;
                }
                self.settled = self.raw.clone();
                Some(&self.settled)
            }
            _ => None,
        }
    }

    /// Cancel any pending settle.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn raw(&self) -> &T {
        &self.raw
    }

    pub fn settled(&self) -> &T {
        &self.settled
    }
}

/// Async debouncer. Dropping it cancels any pending settle.
#[derive(Debug)]
pub struct Debouncer<T> {
    raw: watch::Sender<T>,
    settled: watch::Receiver<T>,
    task: JoinHandle<()>,
}

impl<T> Debouncer<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Must be called from within a tokio runtime.
    pub fn new(initial: T, quiet: Duration) -> Self {
        let (raw_tx, raw_rx) = watch::channel(initial.clone());
        let (settled_tx, settled_rx) = watch::channel(initial.clone());
        let task = tokio::spawn(settle_loop(DebounceState::new(initial, quiet), raw_rx, settled_tx));
        Self { raw: raw_tx, settled: settled_rx, task }
    }

    /// Feed a raw value.
    pub fn push(&self, value: T) {
        self.raw.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }

    pub fn settled(&self) -> T {
        self.settled.borrow().clone()
    }

    /// Receiver that observes every settled value.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.settled.clone()
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn settle_loop<T>(mut state: DebounceState<T>, mut raw: watch::Receiver<T>, settled: watch::Sender<T>)
where
    T: Clone + PartialEq,
{
    loop {
        let deadline = state.deadline();
        tokio::select! {
            changed = raw.changed() => {
                if changed.is_err() {
                    return;
                }
                let value = raw.borrow_and_update().clone();
                state.push(value, Instant::now());
            }
            _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                if let Some(value) = state.poll(Instant::now()) {
                    settled.send_replace(value.clone());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    const QUIET: Duration = Duration::from_millis(300);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_initial_value_is_settled() {
        let state = DebounceState::new("a", QUIET);
        assert_eq!(*state.settled(), "a");
        assert!(!state.is_pending());
    }

    #[tokio::test]
    async fn test_state_restarts_on_each_change() {
        let t0 = Instant::now();
        let mut state = DebounceState::new("", QUIET);

        state.push("a", t0);
        state.push("b", t0 + ms(100));
        assert_eq!(state.deadline(), Some(t0 + ms(400)));
        state.push("c", t0 + ms(250));

        assert!(state.poll(t0 + ms(549)).is_none());
        assert_eq!(*state.settled(), "");
        assert_eq!(state.poll(t0 + ms(550)), Some(&"c"));
        assert!(!state.is_pending());
    }

    #[tokio::test]
    async fn test_state_same_value_does_not_restart() {
        let t0 = Instant::now();
        let mut state = DebounceState::new("", QUIET);

        state.push("a", t0);
        state.push("a", t0 + ms(200));
        assert_eq!(state.deadline(), Some(t0 + QUIET));
    }

    #[tokio::test]
    async fn test_state_revert_before_settle_emits_nothing() {
        let t0 = Instant::now();
        let mut state = DebounceState::new("x", QUIET);

        state.push("xy", t0);
        state.push("x", t0 + ms(50));
        assert!(state.poll(t0 + ms(400)).is_none());
        assert_eq!(*state.settled(), "x");
    }

    #[tokio::test]
    async fn test_state_cancel() {
        let t0 = Instant::now();
        let mut state = DebounceState::new("", QUIET);
        state.push("a", t0);
        state.cancel();
        assert!(state.poll(t0 + ms(1000)).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_debouncer_settles_on_last_value() {
        let debouncer = Debouncer::new(String::new(), QUIET);
        let mut settled = debouncer.subscribe();
        let start = Instant::now();

        debouncer.push("a".to_string());
        sleep(ms(100)).await;
        debouncer.push("b".to_string());
        sleep(ms(150)).await;
        debouncer.push("c".to_string());

        sleep(ms(299)).await;
        assert!(!settled.has_changed().unwrap());
        assert_eq!(debouncer.settled(), "");

        settled.changed().await.unwrap();
        let elapsed = start.elapsed();
        assert_eq!(*settled.borrow_and_update(), "c");
        assert!(elapsed >= ms(550) && elapsed < ms(560), "settled at {elapsed:?}");

        sleep(ms(1000)).await;
        assert!(!settled.has_changed().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_debouncer_drop_cancels_pending() {
        let debouncer = Debouncer::new(String::new(), QUIET);
        let mut settled = debouncer.subscribe();

        debouncer.push("late".to_string());
        sleep(ms(10)).await;
        drop(debouncer);
        sleep(ms(1000)).await;

        assert_eq!(*settled.borrow(), "");
        assert!(settled.changed().await.is_err());
    }
}
