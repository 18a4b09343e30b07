// src/engine/debounce.rs

//! Per-unit suppression of split-phase artifact writes.
//!
//! When a monitor cannot report renames atomically, an in-progress artifact
//! (`foo.bea#`) is all we may ever hear about. The gate remembers it and asks
//! for a timer; if a definitive event for the same unit arrives first, the
//! pending entry is cancelled and the timer's firing becomes a no-op.
//!
//! The gate only keeps state. Actual timers live in the session shell and
//! report back through the session's own message stream, carrying the token
//! they were scheduled with.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::types::UnitName;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebounceEntry {
    pub unit: UnitName,
    pub scheduled_at: Instant,
    pub token: u64,
}

/// Returned when a deferred reload is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledReload {
    pub token: u64,
    pub delay: Duration,
    /// A previous entry for the same unit was replaced.
    pub replaced: bool,
}

#[derive(Debug)]
pub struct DebounceGate {
    delay: Duration,
    pending: HashMap<UnitName, DebounceEntry>,
    next_token: u64,
}

impl DebounceGate {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: HashMap::new(),
            next_token: 1,
        }
    }

    pub fn pending(&self, unit: &str) -> Option<&DebounceEntry> {
        self.pending.get(unit)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Record a deferred reload for `unit`, replacing any pending one.
    pub fn on_deferred_candidate(&mut self, unit: &str) -> ScheduledReload {
        let token = self.next_token;
        self.next_token += 1;

        let entry = DebounceEntry {
            unit: unit.to_string(),
            scheduled_at: Instant::now(),
            token,
        };
        let replaced = self.pending.insert(unit.to_string(), entry).is_some();
        debug!(unit, token, replaced, "deferred reload scheduled");

        ScheduledReload {
            token,
            delay: self.delay,
            replaced,
        }
    }

    /// A definitive event for `unit` arrived; drop its pending reload.
    ///
    /// Returns `true` if something was cancelled.
    pub fn on_definitive_event(&mut self, unit: &str) -> bool {
        let cancelled = self.pending.remove(unit).is_some();
        if cancelled {
            debug!(unit, "pending deferred reload cancelled by definitive event");
        }
        cancelled
    }

    /// A timer scheduled with `token` fired.
    ///
    /// Returns `true` (and consumes the entry) only if that timer is still
    /// the current one for `unit`.
    pub fn fire(&mut self, unit: &str, token: u64) -> bool {
        match self.pending.get(unit) {
            Some(entry) if entry.token == token => {
                let waited = entry.scheduled_at.elapsed();
                self.pending.remove(unit);
                debug!(unit, token, ?waited, "deferred reload due");
                true
            }
            _ => {
                debug!(unit, token, "stale deferred reload timer ignored");
                false
            }
        }
    }

    /// Units with a pending reload, sorted by name.
    pub fn pending_units(&self) -> Vec<UnitName> {
        let mut units: Vec<UnitName> = self.pending.keys().cloned().collect();
        units.sort();
        units
    }

    /// Forget everything, e.g. on shutdown.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
