//! Live question detection.
//!
//! [`DetectionController`] is the synchronous state machine (debounce
//! generations, duplicate suppression, the processing guard and the answer
//! rate limit). [`spawn_detection`] runs one on a tokio task and returns a
//! [`DetectionHandle`] that feeds it change notifications.

pub mod controller;
pub mod service;
pub mod stats;

pub use controller::{
    ActionOutcome, DetectionController, DetectionPhase, DetectionState, PassOutcome,
    PendingMatch, ProcessingGuard, TimerTicket,
};
pub use service::{spawn_detection, DetectionHandle, DetectionService};
pub use stats::{DetectionCounters, DetectionStats};
