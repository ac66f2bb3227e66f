//! Duplicate-trigger suppression for card create/delete.
//!
//! Two independent checks, both applied on every trigger:
//! - a single-flight flag shared by all families, held for the duration of
//!   the operation by an [`InFlight`] permit;
//! - a per-family debounce window measured from the last *accepted* trigger.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use serde::Serialize;

/// Source of monotonic time for debouncing.
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        ManualClock {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        ManualClock::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// Handler families debounce independently of each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerFamily {
    Add,
    Delete,
}

/// Why a trigger was ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum Rejected {
    #[error("another board operation is already in progress")]
    InProgress,
    #[error("repeated trigger within the debounce window")]
    Debounced,
}

#[derive(Debug)]
pub struct MutationGuard {
    debounce: Duration,
    in_progress: Cell<bool>,
    last_add: Cell<Option<Instant>>,
    last_delete: Cell<Option<Instant>>,
}

/// Proof that the guard accepted a trigger. The single-flight flag stays
/// set until this is dropped.
#[must_use = "the operation is only guarded while the permit is alive"]
#[derive(Debug)]
pub struct InFlight<'a> {
    guard: &'a MutationGuard,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.guard.in_progress.set(false);
    }
}

/// Default debounce window between accepted triggers of one family.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

impl Default for MutationGuard {
    fn default() -> Self {
        MutationGuard::new(DEFAULT_DEBOUNCE)
    }
}

impl MutationGuard {
    pub fn new(debounce: Duration) -> Self {
        MutationGuard {
            debounce,
            in_progress: Cell::new(false),
            last_add: Cell::new(None),
            last_delete: Cell::new(None),
        }
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    pub fn is_busy(&self) -> bool {
        self.in_progress.get()
    }

    /// Try to accept a trigger of `family` arriving at `now`.
    pub fn try_enter(&self, family: TriggerFamily, now: Instant) -> Result<InFlight<'_>, Rejected> {
        if self.in_progress.get() {
            return Err(Rejected::InProgress);
        }
        let last = self.last_accepted(family);
        if let Some(prev) = last.get()
            && now.saturating_duration_since(prev) < self.debounce
        {
            return Err(Rejected::Debounced);
        }
        last.set(Some(now));
        self.in_progress.set(true);
        Ok(InFlight { guard: self })
    }

    fn last_accepted(&self, family: TriggerFamily) -> &Cell<Option<Instant>> {
        match family {
            TriggerFamily::Add => &self.last_add,
            TriggerFamily::Delete => &self.last_delete,
        }
    }
}
