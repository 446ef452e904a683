//! Detection state machine.
//!
//! ```text
//!            notify                    timer fires
//!   Idle ───────────► Scheduled ─────────────────────► Processing
//!    ▲                 │    ▲                               │
//!    │                 └────┘ notify (reset timer)          │
//!    └──────────────────────────────────────────────────────┘
//!        surface unavailable / duplicate / no match / action done
//! ```
//!
//! The controller is timer-agnostic: [`DetectionController::notify`] hands out
//! a [`TimerTicket`] carrying a generation number, and the driver calls
//! [`DetectionController::fire`] with that ticket when its timer elapses. Each
//! notification bumps the generation, so only the latest ticket is honoured;
//! that is the cancel-and-reschedule debounce.
//!
//! A pass holds a [`ProcessingGuard`] for as long as it runs, including the
//! asynchronous confirmation step of a match. Timer firings that arrive while
//! the guard is held are dropped.

use crate::config::AssistConfig;
use crate::detection::stats::DetectionCounters;
use crate::error::AssistError;
use crate::matcher::find_match;
use crate::rate_limit::RateLimiter;
use crate::surface::{ActionSink, Decision, MatchRequest, QuestionSource};
use kb_types::KnowledgeBase;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Coarse controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionPhase {
    Idle,
    Scheduled,
    Processing,
}

/// A scheduled debounce firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerTicket {
    generation: u64,
    /// When the driver should call [`DetectionController::fire`].
    pub deadline: Instant,
}

/// Holds the processing flag; released on drop, on every exit path.
#[derive(Debug)]
pub struct ProcessingGuard {
    flag: Arc<AtomicBool>,
}

impl ProcessingGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                flag: Arc::clone(flag),
            })
    }
}

impl Drop for ProcessingGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// A match waiting for the confirmation step. Keeps the pass open until it is
/// resolved or dropped.
#[derive(Debug)]
pub struct PendingMatch {
    request: MatchRequest,
    _guard: ProcessingGuard,
}

impl PendingMatch {
    pub fn request(&self) -> &MatchRequest {
        &self.request
    }
}

/// Result of a timer firing.
#[derive(Debug)]
pub enum PassOutcome {
    /// Observation is stopped.
    Inactive,
    /// The ticket was superseded or cancelled.
    Stale,
    /// A previous pass still holds the processing flag.
    Busy,
    /// No question rendered yet.
    SurfaceUnavailable,
    /// Same question as the last handled one.
    Duplicate,
    NoMatch,
    Matched(PendingMatch),
}

/// Result of resolving a pending match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Applied,
    RateLimited,
    Cancelled,
    /// The confirmation step or the apply call failed.
    Failed,
    /// Observation stopped before the operator decided.
    Discarded,
}

/// Mutable detection state owned by one controller.
#[derive(Debug)]
pub struct DetectionState {
    last_question_text: String,
    limiter: RateLimiter,
    processing: Arc<AtomicBool>,
}

impl DetectionState {
    fn new(min_answer_interval: Duration) -> Self {
        Self {
            last_question_text: String::new(),
            limiter: RateLimiter::new(min_answer_interval),
            processing: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn last_question_text(&self) -> &str {
        &self.last_question_text
    }

    pub fn last_answer_at(&self) -> Option<Instant> {
        self.limiter.last_answer_at()
    }

    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::Acquire)
    }
}

/// Debounced, deduplicating, re-entrancy-guarded question detector.
pub struct DetectionController<Q> {
    source: Q,
    knowledge: Arc<KnowledgeBase>,
    state: DetectionState,
    counters: Arc<DetectionCounters>,
    debounce: Duration,
    resume_delay: Duration,
    active: bool,
    generation: u64,
    pending_timer: Option<TimerTicket>,
    suspended_until: Option<Instant>,
}

impl<Q: QuestionSource> DetectionController<Q> {
    /// Create an inactive controller; call [`start`](Self::start) to observe.
    pub fn new(config: &AssistConfig, knowledge: Arc<KnowledgeBase>, source: Q) -> Self {
        Self {
            source,
            knowledge,
            state: DetectionState::new(config.min_answer_interval()),
            counters: Arc::new(DetectionCounters::default()),
            debounce: config.debounce(),
            resume_delay: config.resume_delay(),
            active: false,
            generation: 0,
            pending_timer: None,
            suspended_until: None,
        }
    }

    pub fn counters(&self) -> Arc<DetectionCounters> {
        Arc::clone(&self.counters)
    }

    pub fn state(&self) -> &DetectionState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn phase(&self) -> DetectionPhase {
        if self.state.is_processing() {
            DetectionPhase::Processing
        } else if self.pending_timer.is_some() {
            DetectionPhase::Scheduled
        } else {
            DetectionPhase::Idle
        }
    }

    /// Begin observing. Clears the last seen question and any pending timer.
    pub fn start(&mut self) {
        self.reset();
        self.active = true;
        info!(entries = self.knowledge.len(), "Question observation started");
    }

    /// Stop observing. Clears the last seen question and any pending timer.
    pub fn stop(&mut self) {
        self.reset();
        self.active = false;
        info!("Question observation stopped");
    }

    /// Swap in a freshly compiled knowledge base.
    pub fn replace_knowledge(&mut self, knowledge: Arc<KnowledgeBase>) {
        info!(entries = knowledge.len(), "Knowledge base replaced");
        self.knowledge = knowledge;
    }

    /// Record a change notification and (re)schedule the debounce timer.
    ///
    /// Returns the ticket the driver must fire at `ticket.deadline`, or `None`
    /// when the notification is ignored (inactive or in the post-action
    /// hold-off). Any previously issued ticket becomes stale.
    pub fn notify(&mut self, now: Instant) -> Option<TimerTicket> {
        self.counters.record_notification();

        if !self.active {
            return None;
        }
        if let Some(until) = self.suspended_until {
            if now < until {
                return None;
            }
            self.suspended_until = None;
        }

        self.generation += 1;
        let ticket = TimerTicket {
            generation: self.generation,
            deadline: now + self.debounce,
        };
        self.pending_timer = Some(ticket);
        Some(ticket)
    }

    /// Run a processing pass for a fired timer.
    pub fn fire(&mut self, ticket: TimerTicket) -> PassOutcome {
        if !self.active {
            return PassOutcome::Inactive;
        }
        if self.pending_timer != Some(ticket) {
            return PassOutcome::Stale;
        }
        self.pending_timer = None;

        let Some(guard) = ProcessingGuard::acquire(&self.state.processing) else {
            self.counters.record_busy_drop();
            debug!("Timer fired during an active pass, dropped");
            return PassOutcome::Busy;
        };
        self.counters.record_pass();

        let live_text = match self.source.current_question_text() {
            Some(text) if !text.trim().is_empty() => text.trim().to_string(),
            _ => {
                self.counters.record_surface_unavailable();
                debug!("No question rendered");
                return PassOutcome::SurfaceUnavailable;
            }
        };

        if live_text == self.state.last_question_text {
            self.counters.record_duplicate();
            debug!("Question unchanged since last pass");
            return PassOutcome::Duplicate;
        }
        self.state.last_question_text.clone_from(&live_text);

        let Some(hit) = find_match(&live_text, &self.knowledge) else {
            self.counters.record_no_match();
            debug!(question = %live_text, "No knowledge base entry");
            return PassOutcome::NoMatch;
        };

        self.counters.record_match();
        debug!(question = %live_text, answer = %hit.answer, "Matched question");

        PassOutcome::Matched(PendingMatch {
            request: MatchRequest {
                live_text: live_text.clone(),
                matched_question: hit.question.to_string(),
                answer: hit.answer.clone(),
            },
            _guard: guard,
        })
    }

    /// Finish a pass with the operator's decision.
    ///
    /// A confirmed answer is applied only if the rate limiter allows it. The
    /// pass is closed afterwards whatever happened, any timer scheduled during
    /// the confirmation is cancelled, and notifications are ignored for the
    /// resume delay.
    pub fn resolve(
        &mut self,
        pending: PendingMatch,
        decision: Result<Decision, AssistError>,
        sink: &dyn ActionSink,
        now: Instant,
    ) -> ActionOutcome {
        let PendingMatch {
            request,
            _guard: guard,
        } = pending;

        let outcome = match decision {
            Ok(_) if !self.active => ActionOutcome::Discarded,
            Ok(Decision::Confirm) => {
                self.counters.record_confirmed();
                if !self.state.limiter.try_consume(now) {
                    self.counters.record_rate_limited();
                    debug!(
                        answer = %request.answer,
                        min_interval_ms = self.state.limiter.min_interval().as_millis() as u64,
                        "Answer suppressed by rate limit"
                    );
                    ActionOutcome::RateLimited
                } else {
                    match sink.apply_answer(&request.answer) {
                        Ok(()) => {
                            self.counters.record_applied();
                            info!(answer = %request.answer, "Answer applied");
                            ActionOutcome::Applied
                        }
                        Err(e) => {
                            self.counters.record_action_error();
                            warn!(error = %e, answer = %request.answer, "Failed to apply answer");
                            ActionOutcome::Failed
                        }
                    }
                }
            }
            Ok(Decision::Cancel) => {
                self.counters.record_cancelled();
                debug!(question = %request.matched_question, "Match cancelled by operator");
                ActionOutcome::Cancelled
            }
            Err(e) => {
                self.counters.record_action_error();
                warn!(error = %e, "Confirmation step failed");
                ActionOutcome::Failed
            }
        };

        drop(guard);
        self.cancel_timer();
        if self.active && !self.resume_delay.is_zero() {
            self.suspended_until = Some(now + self.resume_delay);
        }

        outcome
    }

    fn cancel_timer(&mut self) {
        self.pending_timer = None;
        self.generation += 1;
    }

    fn reset(&mut self) {
        self.cancel_timer();
        self.state.last_question_text.clear();
        self.suspended_until = None;
    }
}
