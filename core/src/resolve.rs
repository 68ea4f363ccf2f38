use hashbrown::HashMap;
use hashbrown::HashSet;
use smallvec::SmallVec;

use crate::types::apply_delta;
use crate::*;

/// Default number of extra passes spent removing accidental matches from an initial fill.
pub const DEFAULT_REPAIR_PASSES: u8 = 10;

/// Scoring inputs for [`Resolver::clear_pairs`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ClearParams {
    pub base_score: u32,
    /// Combo multiplier of the current cascade step.
    pub score_multiplier: f32,
    pub per_extra_gem_multiplier: f32,
    pub wild_bonus_multiplier: f32,
}

impl Default for ClearParams {
    fn default() -> Self {
        Self {
            base_score: 10,
            score_multiplier: 1.0,
            per_extra_gem_multiplier: 0.5,
            wild_bonus_multiplier: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SwapOutcome {
    /// No match resulted; the board is unchanged.
    Rejected,
    /// The swap stays; carries `[Swap(a, b)]`.
    Accepted(ActionQueue),
}

impl SwapOutcome {
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    pub fn into_actions(self) -> ActionQueue {
        match self {
            Self::Rejected => ActionQueue::new(),
            Self::Accepted(actions) => actions,
        }
    }
}

#[derive(Copy, Clone, Debug, Default)]
struct ClearTally {
    clears: u32,
    score: f32,
    /// Cell held a wild gem, which clearing uses up.
    was_wild: bool,
}

/// Applies swaps, clears, gravity and refills to a borrowed board.
///
/// Every operation commits its change to the board before returning; the returned actions only
/// describe it.
#[derive(Debug)]
pub struct Resolver<'a, S: GemSource> {
    grid: &'a mut Grid,
    source: &'a mut S,
    repair_passes: u8,
}

impl<'a, S: GemSource> Resolver<'a, S> {
    pub fn new(grid: &'a mut Grid, source: &'a mut S) -> Self {
        Self {
            grid,
            source,
            repair_passes: DEFAULT_REPAIR_PASSES,
        }
    }

    pub fn with_repair_passes(mut self, repair_passes: u8) -> Self {
        self.repair_passes = repair_passes;
        self
    }

    pub fn grid(&self) -> &Grid {
        self.grid
    }

    /// Exchanges two adjacent cells, keeping the swap only if it produces a pair.
    pub fn try_swap(&mut self, a: Coord2, b: Coord2) -> SwapOutcome {
        debug_assert!(are_adjacent(a, b), "swap {a:?} <-> {b:?} is not adjacent");

        self.grid.swap(a, b);
        if has_pairs(self.grid) {
            log::debug!("Swap {:?} <-> {:?} accepted", a, b);
            SwapOutcome::Accepted(ActionQueue::from(vec![Action::Swap { a, b }]))
        } else {
            self.grid.swap(a, b);
            log::debug!("Swap {:?} <-> {:?} rejected", a, b);
            SwapOutcome::Rejected
        }
    }

    /// Clears every cell of `pairs` once and promotes shared cells to wild.
    ///
    /// A cell's score is the sum of [`score::cell_contribution`] over the pairs containing it,
    /// plus the wild bonus if it held a wild gem. Cells in two or more pairs, and the middle of
    /// any pair of five or more, come back as wild gems after a barrier, unless they already
    /// held one.
    pub fn clear_pairs(&mut self, pairs: &[MatchPair], params: ClearParams) -> ActionQueue {
        let mut order: Vec<Coord2> = Vec::new();
        let mut tally: HashMap<Coord2, ClearTally> = HashMap::new();

        for pair in pairs {
            let contribution =
                score::cell_contribution(pair.len(), params.per_extra_gem_multiplier);
            for &coords in &pair.coords {
                let entry = tally.entry(coords).or_insert_with(|| {
                    order.push(coords);
                    ClearTally::default()
                });
                entry.clears += 1;
                entry.score += contribution;
            }
            if pair.len() >= 5 {
                if let Some(entry) = tally.get_mut(&pair.middle()) {
                    entry.clears += 1;
                }
            }
        }

        let mut actions = ActionQueue::new();
        for &coords in &order {
            let Some(entry) = tally.get_mut(&coords) else {
                continue;
            };
            let mut accumulated = entry.score;
            if self.grid[coords].is_wild() {
                entry.was_wild = true;
                accumulated += params.wild_bonus_multiplier.max(0.0);
            }
            self.grid[coords] = GemKind::Empty;
            let score = score::clear_score(params.base_score, accumulated, params.score_multiplier);
            actions.push(Action::Clear { coords, score });
        }

        let mut promoted = 0;
        for &coords in &order {
            let entry = &tally[&coords];
            if entry.clears <= 1 || entry.was_wild {
                continue;
            }
            if promoted == 0 {
                actions.push(Action::Barrier);
            }
            self.grid[coords] = GemKind::Wild;
            actions.push(Action::Create {
                coords,
                kind: GemKind::Wild,
            });
            promoted += 1;
        }

        log::debug!(
            "Cleared {} cells from {} pairs, {} promoted to wild",
            order.len(),
            pairs.len(),
            promoted
        );
        actions
    }

    /// Lets gems fall into the empty cells below them, column by column.
    pub fn move_gems(&mut self) -> ActionQueue {
        let (width, height) = self.grid.size();
        let mut actions = ActionQueue::new();

        for x in 0..width {
            // (original row, kind) of whatever currently rests at each row
            let mut column: Vec<Option<(Coord, GemKind)>> = (0..height)
                .map(|y| {
                    let kind = self.grid[(x, y)];
                    (!kind.is_empty()).then_some((y, kind))
                })
                .collect();

            for _ in 0..height.saturating_sub(1) {
                let mut moved = 0;
                for y in (0..column.len().saturating_sub(1)).rev() {
                    if column[y + 1].is_none() && column[y].is_some() {
                        column[y + 1] = column[y].take();
                        moved += 1;
                    }
                }
                if moved == 0 {
                    break;
                }
            }

            for y in (0..height).rev() {
                let to = (x, y);
                match column[usize::from(y)] {
                    Some((origin, kind)) => {
                        self.grid[to] = kind;
                        if origin != y {
                            actions.push(Action::Move {
                                from: (x, origin),
                                to,
                            });
                        }
                    }
                    None => self.grid[to] = GemKind::Empty,
                }
            }
        }

        log::debug!("Moved {} gems", actions.len());
        actions
    }

    /// Fills every empty cell with a kind from `kinds`, avoiding obvious new matches.
    ///
    /// Cells are visited in two checkerboard passes so that most cells see decided neighbors
    /// on both sides. With `initial` set, leftover pairs get their middle cell regenerated for
    /// a bounded number of passes.
    pub fn fill_gems(&mut self, kinds: &[GemKind], initial: bool) -> Result<ActionQueue> {
        validate_kinds(kinds)?;
        let (width, height) = self.grid.size();

        let mut filled = Vec::new();
        for parity in 0..2 {
            for y in 0..height {
                let start = (y + parity) % 2;
                for x in (start..width).step_by(2) {
                    let coords = (x, y);
                    if self.grid[coords].is_empty() {
                        self.grid[coords] = self.generate(kinds, coords);
                        filled.push(coords);
                    }
                }
            }
        }

        if initial {
            self.repair(kinds, &filled);
        }

        log::debug!("Filled {} cells", filled.len());
        Ok(filled
            .into_iter()
            .map(|coords| Action::Create {
                coords,
                kind: self.grid[coords],
            })
            .collect())
    }

    fn repair(&mut self, kinds: &[GemKind], filled: &[Coord2]) {
        let filled: HashSet<Coord2> = filled.iter().copied().collect();

        for pass in 0..self.repair_passes {
            let pairs = detect(self.grid);
            if pairs.is_empty() {
                return;
            }
            log::trace!("Repair pass {}: {} pairs left", pass, pairs.len());

            let middles: Vec<Coord2> = pairs
                .iter()
                .map(MatchPair::middle)
                .filter(|coords| filled.contains(coords))
                .collect();
            for &coords in &middles {
                self.grid[coords] = GemKind::Empty;
            }
            for &coords in &middles {
                if self.grid[coords].is_empty() {
                    self.grid[coords] = self.generate(kinds, coords);
                }
            }
        }

        let left = detect(self.grid).len();
        if left > 0 {
            log::warn!(
                "Initial fill still has {} pairs after {} repair passes",
                left,
                self.repair_passes
            );
        }
    }

    /// Picks a kind for `coords` that does not complete a run with its placed neighbors.
    fn generate(&mut self, kinds: &[GemKind], coords: Coord2) -> GemKind {
        let size = self.grid.size();
        let neighbor = |delta| {
            apply_delta(coords, delta, size)
                .map(|pos| self.grid[pos])
                .unwrap_or_default()
        };
        let opposing = [
            (neighbor((-1, 0)), neighbor((1, 0))),
            (neighbor((0, -1)), neighbor((0, 1))),
        ];

        let mut excluded: SmallVec<[GemKind; 2]> = SmallVec::new();
        let mut exclude_all = false;
        for (a, b) in opposing {
            match a.extend(b) {
                Some(GemKind::Wild) => exclude_all = true,
                Some(kind) => excluded.push(kind),
                None => {}
            }
        }

        let candidates: SmallVec<[GemKind; 8]> = if exclude_all {
            SmallVec::new()
        } else {
            kinds
                .iter()
                .copied()
                .filter(|kind| !excluded.contains(kind))
                .collect()
        };

        if candidates.is_empty() {
            log::trace!("No safe kind at {:?}, picking from all kinds", coords);
            self.source.pick(kinds)
        } else {
            self.source.pick(&candidates)
        }
    }
}
