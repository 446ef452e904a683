//! Detection Task
//!
//! Background task that owns a [`DetectionController`], receives change
//! notifications and lifecycle commands over a channel, drives the debounce
//! timer, and awaits the confirmation step without blocking the loop.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use kb_types::KnowledgeBase;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};

use super::controller::{DetectionController, PassOutcome, PendingMatch, TimerTicket};
use super::stats::{DetectionCounters, DetectionStats};
use crate::config::AssistConfig;
use crate::error::{AssistError, Result};
use crate::surface::{ActionSink, Decision, QuestionSource};

type DecisionFuture = Pin<Box<dyn Future<Output = Result<Decision>> + Send>>;

enum Command {
    Changed,
    Start,
    Stop,
    Replace(Arc<KnowledgeBase>),
    Shutdown,
}

/// A match whose confirmation is still outstanding.
struct InFlight {
    pending: PendingMatch,
    decision: DecisionFuture,
}

/// Cloneable handle to a running detection task.
#[derive(Clone)]
pub struct DetectionHandle {
    tx: mpsc::UnboundedSender<Command>,
    counters: Arc<DetectionCounters>,
    start_delay: Duration,
}

impl DetectionHandle {
    fn send(&self, command: Command) -> Result<()> {
        self.tx
            .send(command)
            .map_err(|_| AssistError::DetectionStopped)
    }

    /// Report that the observed surface changed.
    pub fn notify(&self) -> Result<()> {
        self.send(Command::Changed)
    }

    pub fn start(&self) -> Result<()> {
        self.send(Command::Start)
    }

    pub fn stop(&self) -> Result<()> {
        self.send(Command::Stop)
    }

    /// Start observing after the configured start delay, giving the operator
    /// time to dismiss whatever prompted the start.
    pub fn start_deferred(&self) -> JoinHandle<()> {
        let tx = self.tx.clone();
        let delay = self.start_delay;
        tokio::spawn(async move {
            sleep(delay).await;
            if tx.send(Command::Start).is_err() {
                tracing::debug!("Detection task gone before deferred start");
            }
        })
    }

    pub fn replace_knowledge(&self, knowledge: Arc<KnowledgeBase>) -> Result<()> {
        self.send(Command::Replace(knowledge))
    }

    /// Ask the task to exit. Outstanding confirmations are abandoned.
    pub fn shutdown(&self) -> Result<()> {
        self.send(Command::Shutdown)
    }

    pub fn stats(&self) -> DetectionStats {
        self.counters.snapshot()
    }

    pub fn is_running(&self) -> bool {
        !self.tx.is_closed()
    }
}

/// Detection loop state. Build with [`DetectionService::new`] and drive with
/// [`DetectionService::run`], or use [`spawn_detection`].
pub struct DetectionService<Q> {
    controller: DetectionController<Q>,
    sink: Arc<dyn ActionSink>,
    rx: mpsc::UnboundedReceiver<Command>,
}

impl<Q: QuestionSource + 'static> DetectionService<Q> {
    pub fn new(
        config: &AssistConfig,
        knowledge: Arc<KnowledgeBase>,
        source: Q,
        sink: Arc<dyn ActionSink>,
    ) -> (Self, DetectionHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let controller = DetectionController::new(config, knowledge, source);
        let handle = DetectionHandle {
            tx,
            counters: controller.counters(),
            start_delay: config.start_delay(),
        };
        (
            Self {
                controller,
                sink,
                rx,
            },
            handle,
        )
    }

    /// Run until shutdown is requested or every handle is dropped.
    pub async fn run(mut self) {
        let timer = sleep(Duration::ZERO);
        tokio::pin!(timer);
        let mut armed: Option<TimerTicket> = None;
        let mut in_flight: Option<InFlight> = None;

        loop {
            tokio::select! {
                command = self.rx.recv() => {
                    match command {
                        Some(Command::Changed) => {
                            if let Some(ticket) = self.controller.notify(Instant::now()) {
                                timer.as_mut().reset(ticket.deadline);
                                armed = Some(ticket);
                            }
                        }
                        Some(Command::Start) => {
                            self.controller.start();
                            armed = None;
                        }
                        Some(Command::Stop) => {
                            self.controller.stop();
                            armed = None;
                        }
                        Some(Command::Replace(knowledge)) => {
                            self.controller.replace_knowledge(knowledge);
                        }
                        Some(Command::Shutdown) | None => {
                            tracing::info!(
                                active = self.controller.is_active(),
                                pending_confirmation = in_flight.is_some(),
                                "Detection task shutting down"
                            );
                            break;
                        }
                    }
                }
                // Debounce timer
                _ = &mut timer, if armed.is_some() => {
                    let Some(ticket) = armed.take() else { continue };
                    if let PassOutcome::Matched(pending) = self.controller.fire(ticket) {
                        in_flight = Some(self.begin_confirmation(pending));
                    }
                }
                decision = next_decision(&mut in_flight) => {
                    if let Some(InFlight { pending, .. }) = in_flight.take() {
                        self.controller
                            .resolve(pending, decision, self.sink.as_ref(), Instant::now());
                        // resolve cancels whatever was scheduled meanwhile
                        armed = None;
                    }
                }
            }
        }
    }

    fn begin_confirmation(&self, pending: PendingMatch) -> InFlight {
        let sink = Arc::clone(&self.sink);
        let request = pending.request().clone();
        InFlight {
            pending,
            decision: Box::pin(async move { sink.present_match(&request).await }),
        }
    }
}

async fn next_decision(in_flight: &mut Option<InFlight>) -> Result<Decision> {
    match in_flight {
        Some(flight) => flight.decision.as_mut().await,
        None => std::future::pending().await,
    }
}

/// Spawn the detection task.
///
/// The task starts inactive; call [`DetectionHandle::start`] or
/// [`DetectionHandle::start_deferred`] to begin observing.
pub fn spawn_detection<Q>(
    config: &AssistConfig,
    knowledge: Arc<KnowledgeBase>,
    source: Q,
    sink: Arc<dyn ActionSink>,
) -> (DetectionHandle, JoinHandle<()>)
where
    Q: QuestionSource + 'static,
{
    tracing::info!(
        entries = knowledge.len(),
        debounce_ms = config.debounce_ms,
        min_answer_interval_ms = config.min_answer_interval_ms,
        "Spawning detection task"
    );
    let (service, handle) = DetectionService::new(config, knowledge, source, sink);
    let task = tokio::spawn(service.run());
    (handle, task)
}
