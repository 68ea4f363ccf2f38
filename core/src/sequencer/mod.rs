//! Playback of action queues.
//!
//! The board is already final by the time a queue gets here, so nothing in this module touches
//! game state. [`Sequencer::poll`] is a step function meant to be called once per frame.

use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};
use core::time::Duration;
use futures_channel::oneshot;
use futures_util::future::{FutureExt, LocalBoxFuture};
use futures_util::task::noop_waker_ref;
use std::collections::VecDeque;
use web_time::Instant;

use crate::*;

mod clock;

pub use clock::*;

/// Visual effect still in flight.
pub type Task = LocalBoxFuture<'static, ()>;

/// What an [`ActionSink`] reports for an action it was asked to play.
pub enum Playback {
    Done,
    /// Completes when the effect has finished; counts as outstanding until then.
    Pending(Task),
}

impl Playback {
    pub fn pending(future: impl Future<Output = ()> + 'static) -> Self {
        Self::Pending(future.boxed_local())
    }
}

/// Presentation side of playback. `Wait` and `Barrier` are handled by the sequencer and never
/// reach the sink.
pub trait ActionSink {
    fn play(&mut self, action: &Action) -> Playback;
}

impl<K: ActionSink + ?Sized> ActionSink for &mut K {
    fn play(&mut self, action: &Action) -> Playback {
        (**self).play(action)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueueId(u64);

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SequencerConfig {
    /// Barriers stop waiting after this long; `None` waits for every outstanding task.
    pub barrier_timeout: Option<Duration>,
}

impl From<&Timing> for SequencerConfig {
    fn from(timing: &Timing) -> Self {
        Self {
            barrier_timeout: timing.barrier_timeout(),
        }
    }
}

/// Valid transitions:
/// - Pending -> Playing
/// - Playing -> Done
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum QueueState {
    #[default]
    Pending,
    Playing,
    Done,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum QueueEvent {
    Start,
    Drained,
}

impl QueueState {
    const fn on(self, event: QueueEvent) -> Option<QueueState> {
        match (self, event) {
            (QueueState::Pending, QueueEvent::Start) => Some(QueueState::Playing),
            (QueueState::Playing, QueueEvent::Drained) => Some(QueueState::Done),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum QueueOutcome {
    Finished,
    /// Dropped by [`Sequencer::stop_all`] before it finished.
    Cancelled,
}

/// Handle to an enqueued action queue. Can be polled or awaited.
#[derive(Debug)]
pub struct QueueTicket {
    id: QueueId,
    done: oneshot::Receiver<()>,
    outcome: Option<QueueOutcome>,
}

impl QueueTicket {
    pub fn id(&self) -> QueueId {
        self.id
    }

    /// `None` while the queue is still waiting or playing.
    pub fn try_outcome(&mut self) -> Option<QueueOutcome> {
        if self.outcome.is_none() {
            self.outcome = match self.done.try_recv() {
                Ok(Some(())) => Some(QueueOutcome::Finished),
                Ok(None) => None,
                Err(oneshot::Canceled) => Some(QueueOutcome::Cancelled),
            };
        }
        self.outcome
    }
}

impl Future for QueueTicket {
    type Output = QueueOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if let Some(outcome) = self.outcome {
            return Poll::Ready(outcome);
        }
        let outcome = match futures_util::ready!(self.done.poll_unpin(cx)) {
            Ok(()) => QueueOutcome::Finished,
            Err(oneshot::Canceled) => QueueOutcome::Cancelled,
        };
        self.outcome = Some(outcome);
        Poll::Ready(outcome)
    }
}

enum Phase {
    Ready,
    /// Entry delay or `Wait`; `then` starts once the sleep is over. A delay too long to
    /// represent has no `until` and never ends.
    Sleep {
        until: Option<Instant>,
        then: Option<Action>,
    },
    Barrier {
        deadline: Option<Instant>,
    },
}

struct Player {
    id: QueueId,
    entries: VecDeque<ActionEntry>,
    state: QueueState,
    phase: Phase,
    /// Outstanding tasks of the current epoch.
    tasks: Vec<Task>,
    done: Option<oneshot::Sender<()>>,
}

impl Player {
    fn new(id: QueueId, queue: ActionQueue) -> (Self, QueueTicket) {
        let (tx, rx) = oneshot::channel();
        let player = Self {
            id,
            entries: queue.into_iter().collect(),
            state: QueueState::Pending,
            phase: Phase::Ready,
            tasks: Vec::new(),
            done: Some(tx),
        };
        let ticket = QueueTicket {
            id,
            done: rx,
            outcome: None,
        };
        (player, ticket)
    }

    /// Runs as far as `now` allows. Returns whether the queue is done.
    fn advance<K: ActionSink>(
        &mut self,
        sink: &mut K,
        now: Instant,
        config: &SequencerConfig,
    ) -> bool {
        if self.state == QueueState::Pending {
            self.transition(QueueEvent::Start);
        }
        self.reap();

        loop {
            match self.phase {
                Phase::Sleep { until, then } => {
                    if !until.is_some_and(|until| now >= until) {
                        return false;
                    }
                    self.phase = Phase::Ready;
                    if let Some(action) = then {
                        self.start(action, sink, now, config);
                    }
                }
                Phase::Barrier { deadline } => {
                    self.reap();
                    if !self.tasks.is_empty() {
                        if !deadline.is_some_and(|deadline| now >= deadline) {
                            return false;
                        }
                        log::warn!(
                            "Barrier in queue {:?} timed out with {} tasks outstanding",
                            self.id,
                            self.tasks.len()
                        );
                        self.tasks.clear();
                    }
                    self.phase = Phase::Ready;
                }
                Phase::Ready => {
                    let Some(entry) = self.entries.pop_front() else {
                        break;
                    };
                    if entry.delay.is_zero() {
                        self.start(entry.action, sink, now, config);
                    } else {
                        self.phase = Phase::Sleep {
                            until: now.checked_add(entry.delay),
                            then: Some(entry.action),
                        };
                    }
                }
            }
        }

        self.reap();
        if !self.tasks.is_empty() {
            return false;
        }
        self.transition(QueueEvent::Drained);
        true
    }

    fn start<K: ActionSink>(
        &mut self,
        action: Action,
        sink: &mut K,
        now: Instant,
        config: &SequencerConfig,
    ) {
        log::trace!("Queue {:?} starts {:?}", self.id, action);
        match action {
            Action::Wait(duration) => {
                self.phase = Phase::Sleep {
                    until: now.checked_add(duration),
                    then: None,
                };
            }
            Action::Barrier => {
                self.phase = Phase::Barrier {
                    deadline: config
                        .barrier_timeout
                        .and_then(|timeout| now.checked_add(timeout)),
                };
            }
            _ => {
                if let Playback::Pending(task) = sink.play(&action) {
                    self.tasks.push(task);
                }
            }
        }
    }

    fn reap(&mut self) {
        let mut cx = Context::from_waker(noop_waker_ref());
        self.tasks.retain_mut(|task| task.poll_unpin(&mut cx).is_pending());
    }

    fn transition(&mut self, event: QueueEvent) {
        let Some(next) = self.state.on(event) else {
            log::trace!("Queue {:?} ignores {:?} in {:?}", self.id, event, self.state);
            return;
        };
        let prev = core::mem::replace(&mut self.state, next);

        match (prev, next) {
            (QueueState::Pending, QueueState::Playing) => {
                log::debug!("Queue {:?} playing {} actions", self.id, self.entries.len());
            }
            (QueueState::Playing, QueueState::Done) => {
                log::debug!("Queue {:?} done", self.id);
                if let Some(done) = self.done.take() {
                    // Ticket may have been dropped already.
                    let _ = done.send(());
                }
            }
            _ => {}
        }
    }
}

/// Plays action queues against an [`ActionSink`], one ordered queue at a time.
pub struct Sequencer<K: ActionSink, C: Clock> {
    sink: K,
    clock: C,
    config: SequencerConfig,
    active: Option<Player>,
    waiting: VecDeque<Player>,
    immediate: Vec<Player>,
    next_id: u64,
}

impl<K: ActionSink, C: Clock> Sequencer<K, C> {
    pub fn new(sink: K, clock: C, config: SequencerConfig) -> Self {
        Self {
            sink,
            clock,
            config,
            active: None,
            waiting: VecDeque::new(),
            immediate: Vec::new(),
            next_id: 0,
        }
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Plays `queue` after every queue enqueued before it.
    pub fn enqueue(&mut self, queue: ActionQueue) -> QueueTicket {
        let (player, ticket) = Player::new(self.next_id(), queue);
        self.waiting.push_back(player);
        ticket
    }

    /// Plays `queue` right away, alongside whatever is already playing.
    pub fn enqueue_immediate(&mut self, queue: ActionQueue) -> QueueTicket {
        let (player, ticket) = Player::new(self.next_id(), queue);
        self.immediate.push(player);
        ticket
    }

    pub fn is_busy(&self) -> bool {
        self.active.is_some() || !self.waiting.is_empty() || !self.immediate.is_empty()
    }

    /// Ordered queues not finished yet, including the one playing.
    pub fn pending_queues(&self) -> usize {
        self.waiting.len() + usize::from(self.active.is_some())
    }

    /// Advances playback to the current clock time. Returns the queues that finished.
    pub fn poll(&mut self) -> Vec<QueueId> {
        let now = self.clock.now();
        let mut finished = Vec::new();

        self.immediate.retain_mut(|player| {
            let done = player.advance(&mut self.sink, now, &self.config);
            if done {
                finished.push(player.id);
            }
            !done
        });

        loop {
            if self.active.is_none() {
                self.active = self.waiting.pop_front();
            }
            let Some(player) = self.active.as_mut() else {
                break;
            };
            if !player.advance(&mut self.sink, now, &self.config) {
                break;
            }
            finished.push(player.id);
            self.active = None;
        }

        finished
    }

    /// Abandons every queue and outstanding task. Tickets report [`QueueOutcome::Cancelled`].
    pub fn stop_all(&mut self) {
        let dropped = self.pending_queues() + self.immediate.len();
        if dropped > 0 {
            log::debug!("Stopping {} queues", dropped);
        }
        self.active = None;
        self.waiting.clear();
        self.immediate.clear();
    }

    fn next_id(&mut self) -> QueueId {
        let id = QueueId(self.next_id);
        self.next_id += 1;
        id
    }
}
