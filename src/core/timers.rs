//! Interval timers for autoplay.
//!
//! The host environment owns the clock; controllers only hold an
//! [`IntervalHandle`]. Dropping the handle clears the interval, so a
//! controller that stores `Option<IntervalHandle>` can never leak a
//! superseded timer: assigning a new handle drops the old one first.
//!
//! [`IntervalTimers`] is the in-process host. It is driven either by
//! `advance(dt)` (deterministic, used by tests) or by `poll(now)` from an
//! update loop that feeds it `Instant` deltas.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use log::{trace, warn};

/// Smallest accepted period. A zero period would fire forever in one advance.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Opaque identity of a scheduled interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl std::fmt::Display for TimerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// Host-side interval scheduling.
pub trait TimerHost: Send + Sync {
    fn set_interval(&self, period: Duration) -> TimerId;
    fn clear_interval(&self, id: TimerId);
}

/// Live interval. Clears itself on drop.
pub struct IntervalHandle {
    id: TimerId,
    host: Arc<dyn TimerHost>,
}

impl IntervalHandle {
    pub fn start(host: &Arc<dyn TimerHost>, period: Duration) -> Self {
        let id = host.set_interval(period);
        Self { id, host: Arc::clone(host) }
    }

    pub fn id(&self) -> TimerId {
        self.id
    }
}

impl Drop for IntervalHandle {
    fn drop(&mut self) {
        self.host.clear_interval(self.id);
    }
}

impl std::fmt::Debug for IntervalHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntervalHandle").field("id", &self.id).finish()
    }
}

#[derive(Debug, Clone, Copy)]
struct Interval {
    period: Duration,
    next_due: Duration,
}

#[derive(Debug, Default)]
struct TimerTable {
    next_id: u64,
    /// Host clock, relative to creation
    elapsed: Duration,
    last_poll: Option<Instant>,
    live: IndexMap<TimerId, Interval>,
    started: u64,
    cleared: u64,
}

/// In-process timer host.
#[derive(Debug, Default)]
pub struct IntervalTimers {
    table: Mutex<TimerTable>,
}

impl IntervalTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the host clock forward and return every interval firing in
    /// `(now, now + dt]`, in chronological order.
    pub fn advance(&self, dt: Duration) -> Vec<TimerId> {
        let mut table = self.table.lock().unwrap_or_else(|e| e.into_inner());
        table.elapsed += dt;
        let now = table.elapsed;

        let mut fired: Vec<(Duration, TimerId)> = Vec::new();
        for (id, interval) in table.live.iter_mut() {
            while interval.next_due <= now {
                fired.push((interval.next_due, *id));
                interval.next_due += interval.period;
            }
        }
        // Stable: same due time keeps registration order
        fired.sort_by_key(|(due, _)| *due);

        if !fired.is_empty() {
            trace!("IntervalTimers: {} tick(s) at {:?}", fired.len(), now);
        }
        fired.into_iter().map(|(_, id)| id).collect()
    }

    /// Advance by the wall-clock time since the previous poll.
    ///
    /// The first poll only anchors the clock.
    pub fn poll(&self, now: Instant) -> Vec<TimerId> {
        let dt = {
            let mut table = self.table.lock().unwrap_or_else(|e| e.into_inner());
            let dt = table
                .last_poll
                .map(|last| now.saturating_duration_since(last))
                .unwrap_or(Duration::ZERO);
            table.last_poll = Some(now);
            dt
        };
        self.advance(dt)
    }

    /// Number of intervals currently scheduled.
    pub fn live_count(&self) -> usize {
        self.table.lock().unwrap_or_else(|e| e.into_inner()).live.len()
    }

    pub fn is_live(&self, id: TimerId) -> bool {
        self.table.lock().unwrap_or_else(|e| e.into_inner()).live.contains_key(&id)
    }

    /// Total intervals ever scheduled.
    pub fn started(&self) -> u64 {
        self.table.lock().unwrap_or_else(|e| e.into_inner()).started
    }

    /// Total intervals cleared.
    pub fn cleared(&self) -> u64 {
        self.table.lock().unwrap_or_else(|e| e.into_inner()).cleared
    }
}

impl TimerHost for IntervalTimers {
    fn set_interval(&self, period: Duration) -> TimerId {
        let period = if period < MIN_PERIOD {
            warn!("Interval period {:?} too small, using {:?}", period, MIN_PERIOD);
            MIN_PERIOD
        } else {
            period
        };

        let mut table = self.table.lock().unwrap_or_else(|e| e.into_inner());
        let id = TimerId(table.next_id);
        table.next_id += 1;
        let next_due = table.elapsed + period;
        table.live.insert(id, Interval { period, next_due });
        table.started += 1;
        trace!("IntervalTimers: set {} every {:?}", id, period);
        id
    }

    fn clear_interval(&self, id: TimerId) {
        let mut table = self.table.lock().unwrap_or_else(|e| e.into_inner());
        if table.live.shift_remove(&id).is_some() {
            table.cleared += 1;
            trace!("IntervalTimers: cleared {}", id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host() -> (Arc<IntervalTimers>, Arc<dyn TimerHost>) {
        let timers = Arc::new(IntervalTimers::new());
        let dyn_host: Arc<dyn TimerHost> = timers.clone();
        (timers, dyn_host)
    }

    #[test]
    fn test_interval_fires_each_period() {
        let (timers, host) = host();
        let handle = IntervalHandle::start(&host, Duration::from_millis(100));

        assert!(timers.advance(Duration::from_millis(99)).is_empty());
        assert_eq!(timers.advance(Duration::from_millis(1)), vec![handle.id()]);
        // Large jump fires every missed period
        assert_eq!(timers.advance(Duration::from_millis(300)).len(), 3);
    }

    #[test]
    fn test_drop_clears() {
        let (timers, host) = host();
        let handle = IntervalHandle::start(&host, Duration::from_millis(10));
        let id = handle.id();
        assert!(timers.is_live(id));

        drop(handle);
        assert!(!timers.is_live(id));
        assert_eq!(timers.live_count(), 0);
        assert!(timers.advance(Duration::from_millis(100)).is_empty());
        assert_eq!(timers.started(), 1);
        assert_eq!(timers.cleared(), 1);
    }

    #[test]
    fn test_replacing_handle_keeps_single_live() {
        let (timers, host) = host();
        let mut slot: Option<IntervalHandle> = None;
        for _ in 0..5 {
            slot = Some(IntervalHandle::start(&host, Duration::from_millis(50)));
            assert_eq!(timers.live_count(), 1);
        }
        assert_eq!(timers.started(), 5);
        assert_eq!(timers.cleared(), 4);
        assert_eq!(timers.advance(Duration::from_millis(50)).len(), 1);
        drop(slot);
    }

    #[test]
    fn test_chronological_order_across_timers() {
        let (timers, host) = host();
        let slow = IntervalHandle::start(&host, Duration::from_millis(30));
        let fast = IntervalHandle::start(&host, Duration::from_millis(20));

        let fired = timers.advance(Duration::from_millis(60));
        // fast@20, slow@30, fast@40, slow@60, fast@60
        assert_eq!(fired, vec![fast.id(), slow.id(), fast.id(), slow.id(), fast.id()]);
    }

    #[test]
    fn test_zero_period_is_bounded() {
        let (timers, host) = host();
        let _handle = IntervalHandle::start(&host, Duration::ZERO);
        assert_eq!(timers.advance(Duration::from_millis(3)).len(), 3);
    }

    #[test]
    fn test_poll_anchors_then_advances() {
        let (timers, host) = host();
        let _handle = IntervalHandle::start(&host, Duration::from_millis(10));
        let t0 = Instant::now();

        assert!(timers.poll(t0).is_empty());
        assert_eq!(timers.poll(t0 + Duration::from_millis(25)).len(), 2);
    }
}
