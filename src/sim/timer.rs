//! Cooperative tick timers
//!
//! Timers never run on their own thread. They count down when their owner
//! polls them on a tick boundary, so a timer can only fire while the
//! component holding it is alive.

/// What a timer is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimerKind {
    /// Shield window ends
    ShieldExpiry,
    /// Weapon may fire again (repeating for automatic weapons)
    WeaponCooldown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Timer {
    kind: TimerKind,
    remaining: u32,
    /// Re-arm period for repeating timers
    period: Option<u32>,
}

/// Timers owned by a single component
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimerSet {
    timers: Vec<Timer>,
}

impl TimerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a one-shot timer, replacing any timer of the same kind
    pub fn schedule_once(&mut self, kind: TimerKind, ticks: u32) {
        self.cancel(kind);
        self.timers.push(Timer {
            kind,
            remaining: ticks.max(1),
            period: None,
        });
    }

    /// Schedule a repeating timer, replacing any timer of the same kind
    pub fn schedule_repeating(&mut self, kind: TimerKind, period: u32) {
        let period = period.max(1);
        self.cancel(kind);
        self.timers.push(Timer {
            kind,
            remaining: period,
            period: Some(period),
        });
    }

    /// Cancel the timer of `kind`; returns whether one was scheduled
    pub fn cancel(&mut self, kind: TimerKind) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.kind != kind);
        self.timers.len() != before
    }

    /// Cancel every timer, returning how many were scheduled
    pub fn cancel_all(&mut self) -> usize {
        let count = self.timers.len();
        self.timers.clear();
        count
    }

    pub fn is_scheduled(&self, kind: TimerKind) -> bool {
        self.timers.iter().any(|t| t.kind == kind)
    }

    /// Ticks left before `kind` fires
    pub fn remaining(&self, kind: TimerKind) -> Option<u32> {
        self.timers.iter().find(|t| t.kind == kind).map(|t| t.remaining)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Advance one tick and return the kinds that fired.
    ///
    /// One-shot timers are removed when they fire; repeating timers re-arm.
    pub fn advance(&mut self) -> Vec<TimerKind> {
        let mut fired = Vec::new();
        for timer in &mut self.timers {
            timer.remaining = timer.remaining.saturating_sub(1);
            if timer.remaining == 0 {
                fired.push(timer.kind);
                if let Some(period) = timer.period {
                    timer.remaining = period;
                }
            }
        }
        self.timers.retain(|t| t.remaining > 0);
        fired
    }
}
