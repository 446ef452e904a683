//! Detection diagnostics.
//!
//! Counters are plain atomics updated by the controller task and read from
//! any handle. Relaxed ordering: the numbers are for monitoring, not for
//! synchronisation.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters shared between the controller and its handles.
#[derive(Debug, Default)]
pub struct DetectionCounters {
    notifications: AtomicU64,
    passes: AtomicU64,
    busy_drops: AtomicU64,
    duplicates: AtomicU64,
    surface_unavailable: AtomicU64,
    no_match: AtomicU64,
    matches: AtomicU64,
    confirmed: AtomicU64,
    cancelled: AtomicU64,
    applied: AtomicU64,
    rate_limited: AtomicU64,
    action_errors: AtomicU64,
}

macro_rules! counter_incr {
    ($($name:ident => $field:ident),* $(,)?) => {
        $(
            pub(crate) fn $name(&self) {
                self.$field.fetch_add(1, Ordering::Relaxed);
            }
        )*
    };
}

impl DetectionCounters {
    counter_incr! {
        record_notification => notifications,
        record_pass => passes,
        record_busy_drop => busy_drops,
        record_duplicate => duplicates,
        record_surface_unavailable => surface_unavailable,
        record_no_match => no_match,
        record_match => matches,
        record_confirmed => confirmed,
        record_cancelled => cancelled,
        record_applied => applied,
        record_rate_limited => rate_limited,
        record_action_error => action_errors,
    }

    /// Point-in-time copy of all counters.
    pub fn snapshot(&self) -> DetectionStats {
        DetectionStats {
            notifications: self.notifications.load(Ordering::Relaxed),
            passes: self.passes.load(Ordering::Relaxed),
            busy_drops: self.busy_drops.load(Ordering::Relaxed),
            duplicates: self.duplicates.load(Ordering::Relaxed),
            surface_unavailable: self.surface_unavailable.load(Ordering::Relaxed),
            no_match: self.no_match.load(Ordering::Relaxed),
            matches: self.matches.load(Ordering::Relaxed),
            confirmed: self.confirmed.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
            applied: self.applied.load(Ordering::Relaxed),
            rate_limited: self.rate_limited.load(Ordering::Relaxed),
            action_errors: self.action_errors.load(Ordering::Relaxed),
        }
    }
}

/// Detection statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DetectionStats {
    /// Change notifications received
    pub notifications: u64,
    /// Processing passes started (timer fired while idle)
    pub passes: u64,
    /// Timer firings dropped because a pass was still running
    pub busy_drops: u64,
    /// Passes that saw the previously handled question again
    pub duplicates: u64,
    /// Passes where no question was rendered
    pub surface_unavailable: u64,
    pub no_match: u64,
    pub matches: u64,
    pub confirmed: u64,
    pub cancelled: u64,
    pub applied: u64,
    /// Confirmed answers suppressed by the minimum answer interval
    pub rate_limited: u64,
    /// Confirmation or apply failures reported by the action sink
    pub action_errors: u64,
}

impl DetectionStats {
    /// Fraction of passes that found a knowledge-base entry (0.0 to 1.0).
    pub fn match_rate(&self) -> f64 {
        let decided = self.matches + self.no_match;
        if decided == 0 {
            0.0
        } else {
            self.matches as f64 / decided as f64
        }
    }
}
