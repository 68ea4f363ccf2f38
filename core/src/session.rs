use core::mem;
use core::time::Duration;
use serde::{Deserialize, Serialize};

use crate::*;

/// Cascade steps resolved for one swap before giving up on reaching a stable board.
pub const MAX_CASCADE_STEPS: u32 = 100;

/// Valid transitions:
/// - Uninitialized -> Idle
/// - Idle -> SwapPending
/// - SwapPending -> Idle
/// - Idle -> Expired
/// - any -> Idle (new board)
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// No board yet
    #[default]
    Uninitialized,
    /// Waiting for a swap
    Idle,
    /// A swap was accepted and its cascade has not been resolved yet
    SwapPending,
    /// Timer ran out, no new moves are accepted
    Expired,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Trigger {
    BoardReady,
    SwapAccepted,
    CascadeResolved,
    TimeUp,
}

impl SessionState {
    const fn on(self, trigger: Trigger) -> Option<SessionState> {
        use SessionState::*;
        use Trigger::*;
        match (self, trigger) {
            (_, BoardReady) => Some(Idle),
            (Idle, SwapAccepted) => Some(SwapPending),
            (SwapPending | Idle, CascadeResolved) => Some(Idle),
            (Idle, TimeUp) => Some(Expired),
            _ => None,
        }
    }

    pub const fn accepts_swaps(self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// Value changes the presentation may want to reflect.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    ScoreChanged { score: u64, delta: u64 },
    /// Whole seconds left, rounded up.
    TimerChanged { seconds_left: u32 },
    TimeUp,
    /// A cascade step beyond the first one was reached.
    ComboReached { depth: u32 },
    BoardRegenerated,
}

/// Diagnostic view of a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub grid: Grid,
    pub score: u64,
    pub time_left_secs: f32,
    pub state: SessionState,
}

/// A single level in play: board, score and timer.
#[derive(Debug)]
pub struct Session<S: GemSource> {
    rules: Rules,
    source: S,
    grid: Grid,
    kinds: Vec<GemKind>,
    score: u64,
    time_left: Duration,
    state: SessionState,
    events: Vec<SessionEvent>,
}

impl<S: GemSource> Session<S> {
    pub fn new(rules: Rules, source: S) -> Result<Self> {
        rules.validate()?;
        let grid = Grid::new(rules.size);
        let kinds = rules.kinds();
        Ok(Self {
            rules,
            source,
            grid,
            kinds,
            score: 0,
            time_left: Duration::ZERO,
            state: Default::default(),
            events: Vec::new(),
        })
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn kinds(&self) -> &[GemKind] {
        &self.kinds
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn time_left(&self) -> Duration {
        self.time_left
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_timed(&self) -> bool {
        !self.rules.time_limit().is_zero()
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            grid: self.grid.clone(),
            score: self.score,
            time_left_secs: self.time_left.as_secs_f32(),
            state: self.state,
        }
    }

    /// Takes the notifications accumulated since the last call.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        mem::take(&mut self.events)
    }

    /// Starts the level: fresh board, zero score, full timer.
    pub fn initialize_board(&mut self, kinds: &[GemKind]) -> Result<ActionQueue> {
        validate_kinds(kinds)?;
        self.kinds = kinds.to_vec();

        let mut grid = Grid::new(self.rules.size);
        let actions = self.generate_into(&mut grid)?;
        self.grid = grid;

        self.score = 0;
        self.time_left = self.rules.time_limit();
        self.events.push(SessionEvent::ScoreChanged { score: 0, delta: 0 });
        if self.is_timed() {
            self.events.push(SessionEvent::TimerChanged {
                seconds_left: display_secs(self.time_left),
            });
        }
        self.transition(Trigger::BoardReady);

        log::info!(
            "Board {:?} initialized with {} kinds",
            self.grid.size(),
            self.kinds.len()
        );
        Ok(self.stagger_creates(actions))
    }

    /// Replaces every gem in place, keeping score and timer. Changed cells are reported as
    /// `Transform` actions.
    pub fn regenerate_board(&mut self, kinds: &[GemKind]) -> Result<ActionQueue> {
        if matches!(self.state, SessionState::Uninitialized) {
            return Err(GameError::NotInitialized);
        }
        validate_kinds(kinds)?;
        self.kinds = kinds.to_vec();
        self.regenerate()
    }

    /// Swaps two adjacent gems if that creates a match.
    ///
    /// A swap without a match is not an error: the board stays as it was and the returned queue
    /// is empty. An accepted swap must be followed by [`Session::resolve_cascade`].
    pub fn try_swap(&mut self, a: Coord2, b: Coord2) -> Result<ActionQueue> {
        self.check_accepts_swaps()?;
        let a = self.grid.validate_coords(a)?;
        let b = self.grid.validate_coords(b)?;
        if !are_adjacent(a, b) {
            return Err(GameError::NotAdjacent);
        }

        let outcome = Resolver::new(&mut self.grid, &mut self.source).try_swap(a, b);
        if outcome.is_accepted() {
            self.transition(Trigger::SwapAccepted);
        }
        Ok(outcome.into_actions())
    }

    /// Clears, drops and refills until no pairs are left, then makes sure the board still has
    /// a playable swap.
    pub fn resolve_cascade(&mut self) -> Result<ActionQueue> {
        match self.state {
            SessionState::Uninitialized => return Err(GameError::NotInitialized),
            SessionState::Expired => return Err(GameError::TimeUp),
            SessionState::Idle | SessionState::SwapPending => {}
        }

        let mut actions = ActionQueue::new();
        let mut depth = 0;
        let mut regenerated = false;
        loop {
            let pairs = detect(&self.grid);
            if pairs.is_empty() {
                if depth == 0 || regenerated || self.has_any_playable_swap() {
                    break;
                }
                log::info!("No playable swap left after cascade, regenerating board");
                actions.push(Action::Barrier);
                actions.append(self.regenerate()?);
                regenerated = true;
                continue;
            }
            if depth >= MAX_CASCADE_STEPS {
                log::warn!(
                    "Cascade still has {} pairs after {} steps, leaving them",
                    pairs.len(),
                    depth
                );
                break;
            }

            if depth > 0 {
                actions.push(Action::Barrier);
                let pause = self.rules.timing.combo_pause();
                if !pause.is_zero() {
                    actions.push(Action::Wait(pause));
                }
                self.events.push(SessionEvent::ComboReached { depth });
            }

            let multiplier = score::combo_multiplier(self.rules.combo_factor, depth);
            let params = self.rules.clear_params(multiplier);
            let repair_passes = self.rules.repair_passes;
            let mut resolver = Resolver::new(&mut self.grid, &mut self.source)
                .with_repair_passes(repair_passes);

            let clears = resolver.clear_pairs(&pairs, params);
            let delta = clears.total_score();
            actions.append(clears);
            actions.push(Action::Barrier);
            actions.append(resolver.move_gems());
            actions.push(Action::Barrier);
            let creates = resolver.fill_gems(&self.kinds, false)?;
            actions.append(self.stagger_creates(creates));

            self.add_score(delta);
            log::debug!(
                "Cascade step {}: {} pairs, x{:.2}, +{}",
                depth,
                pairs.len(),
                multiplier,
                delta
            );
            depth += 1;
        }

        self.transition(Trigger::CascadeResolved);
        Ok(actions)
    }

    pub fn detect_hint_swap(&self) -> Option<MatchSwap> {
        detect_swap(&self.grid)
    }

    pub fn has_any_playable_swap(&self) -> bool {
        self.detect_hint_swap().is_some()
    }

    /// Counts the timer down by `elapsed`.
    pub fn tick(&mut self, elapsed: Duration) {
        if !self.is_timed()
            || self.time_left.is_zero()
            || !matches!(self.state, SessionState::Idle | SessionState::SwapPending)
        {
            return;
        }

        let before = display_secs(self.time_left);
        self.time_left = self.time_left.saturating_sub(elapsed);
        let after = display_secs(self.time_left);
        if before != after {
            self.events.push(SessionEvent::TimerChanged {
                seconds_left: after,
            });
        }
        if self.time_left.is_zero() {
            self.transition(Trigger::TimeUp);
        }
    }

    fn check_accepts_swaps(&self) -> Result<()> {
        match self.state {
            SessionState::Uninitialized => Err(GameError::NotInitialized),
            SessionState::Idle => Ok(()),
            SessionState::SwapPending => Err(GameError::ResolutionPending),
            SessionState::Expired => Err(GameError::TimeUp),
        }
    }

    fn add_score(&mut self, delta: u64) {
        if delta == 0 {
            return;
        }
        self.score = self.score.saturating_add(delta);
        self.events.push(SessionEvent::ScoreChanged {
            score: self.score,
            delta,
        });
    }

    fn regenerate(&mut self) -> Result<ActionQueue> {
        let mut grid = Grid::new(self.grid.size());
        self.generate_into(&mut grid)?;

        let actions: ActionQueue = grid
            .coords()
            .filter(|&coords| grid[coords] != self.grid[coords])
            .map(|coords| Action::Transform {
                coords,
                kind: grid[coords],
                score: 0,
            })
            .collect();
        self.grid = grid;
        self.events.push(SessionEvent::BoardRegenerated);
        log::debug!("Board regenerated, {} cells changed", actions.len());
        Ok(actions)
    }

    /// Fills `grid` from scratch, retrying until it is free of pairs and has a playable swap.
    fn generate_into(&mut self, grid: &mut Grid) -> Result<ActionQueue> {
        let attempts = self.rules.regenerate_attempts.max(1);
        let mut actions = ActionQueue::new();
        for attempt in 1..=attempts {
            grid.clear();
            actions = Resolver::new(grid, &mut self.source)
                .with_repair_passes(self.rules.repair_passes)
                .fill_gems(&self.kinds, true)?;
            if !has_pairs(grid) && detect_swap(grid).is_some() {
                return Ok(actions);
            }
            log::debug!("Generated board {} has no playable swap", attempt);
        }
        log::warn!(
            "No board with a playable swap after {} attempts, keeping the last one",
            attempts
        );
        Ok(actions)
    }

    fn stagger_creates(&self, mut actions: ActionQueue) -> ActionQueue {
        let stagger = self.rules.timing.spawn_stagger();
        if stagger.is_zero() {
            return actions;
        }
        for entry in actions.entries_mut().iter_mut().skip(1) {
            if matches!(entry.action, Action::Create { .. }) {
                entry.delay = stagger;
            }
        }
        actions
    }

    fn transition(&mut self, trigger: Trigger) {
        let Some(next) = self.state.on(trigger) else {
            log::trace!("Session ignores {:?} in {:?}", trigger, self.state);
            return;
        };
        let prev = mem::replace(&mut self.state, next);
        log::debug!("Session {:?} -> {:?}", prev, next);

        match (prev, next) {
            (SessionState::SwapPending, SessionState::Idle)
                if self.is_timed() && self.time_left.is_zero() =>
            {
                self.transition(Trigger::TimeUp);
            }
            (_, SessionState::Expired) => {
                self.events.push(SessionEvent::TimeUp);
                log::info!("Time up, final score {}", self.score);
            }
            _ => {}
        }
    }
}

fn display_secs(duration: Duration) -> u32 {
    let secs = duration.as_secs() + u64::from(duration.subsec_nanos() > 0);
    secs.try_into().unwrap_or(u32::MAX)
}
