use web_time::Instant;

use crate::*;

/// Drives a [`Session`] and plays what it produces through a [`Sequencer`].
///
/// Swaps are only accepted once every queued effect has been played, so the resolver never
/// runs ahead of the presentation.
pub struct Level<S: GemSource, K: ActionSink, C: Clock> {
    session: Session<S>,
    sequencer: Sequencer<K, C>,
    last_update: Option<Instant>,
}

impl<S: GemSource, K: ActionSink, C: Clock> Level<S, K, C> {
    pub fn new(session: Session<S>, sequencer: Sequencer<K, C>) -> Self {
        Self {
            session,
            sequencer,
            last_update: None,
        }
    }

    pub fn session(&self) -> &Session<S> {
        &self.session
    }

    pub fn sequencer(&self) -> &Sequencer<K, C> {
        &self.sequencer
    }

    pub fn is_busy(&self) -> bool {
        self.sequencer.is_busy()
    }

    /// Starts a fresh board, dropping whatever was still playing.
    pub fn initialize(&mut self, kinds: &[GemKind]) -> Result<QueueTicket> {
        let actions = self.session.initialize_board(kinds)?;
        self.sequencer.stop_all();
        self.last_update = Some(self.sequencer.clock().now());
        Ok(self.sequencer.enqueue(actions))
    }

    /// Replaces the board in place. Refused while effects are still playing.
    pub fn regenerate(&mut self, kinds: &[GemKind]) -> Result<QueueTicket> {
        if self.is_busy() {
            return Err(GameError::PlaybackInProgress);
        }
        let actions = self.session.regenerate_board(kinds)?;
        Ok(self.sequencer.enqueue(actions))
    }

    /// Plays a swap and resolves its cascade. `Ok(None)` means the swap made no match.
    pub fn swap(&mut self, a: Coord2, b: Coord2) -> Result<Option<QueueTicket>> {
        if self.is_busy() {
            return Err(GameError::PlaybackInProgress);
        }
        let swapped = self.session.try_swap(a, b)?;
        if swapped.is_empty() {
            return Ok(None);
        }
        self.sequencer.enqueue(swapped);
        let cascade = self.session.resolve_cascade()?;
        Ok(Some(self.sequencer.enqueue(cascade)))
    }

    pub fn hint(&self) -> Option<MatchSwap> {
        self.session.detect_hint_swap()
    }

    /// Abandons playback. The board keeps its current state.
    pub fn stop(&mut self) {
        self.sequencer.stop_all();
    }

    /// Advances the timer and playback to the current clock time.
    pub fn update(&mut self) -> Vec<QueueId> {
        let now = self.sequencer.clock().now();
        if let Some(last) = self.last_update.replace(now) {
            self.session.tick(now.saturating_duration_since(last));
        }
        self.sequencer.poll()
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        self.session.drain_events()
    }
}
