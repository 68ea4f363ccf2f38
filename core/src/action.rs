use core::time::Duration;
use serde::{Deserialize, Serialize};

use crate::*;

/// One board-visible effect, produced by the resolver and played by the sequencer.
///
/// The board has already reached the state an action describes by the time the action is
/// queued; actions only tell the presentation how to catch up.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Action {
    Wait(Duration),
    Clear { coords: Coord2, score: u32 },
    Swap { a: Coord2, b: Coord2 },
    Move { from: Coord2, to: Coord2 },
    Create { coords: Coord2, kind: GemKind },
    Transform { coords: Coord2, kind: GemKind, score: u32 },
    /// Wait for every effect started before this point to finish.
    Barrier,
}

impl Action {
    pub const fn score(&self) -> u32 {
        match *self {
            Action::Clear { score, .. } | Action::Transform { score, .. } => score,
            _ => 0,
        }
    }

    pub const fn is_barrier(&self) -> bool {
        matches!(self, Action::Barrier)
    }
}

/// An action together with the delay to wait before it starts.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionEntry {
    pub action: Action,
    pub delay: Duration,
}

impl From<Action> for ActionEntry {
    fn from(action: Action) -> Self {
        Self {
            action,
            delay: Duration::ZERO,
        }
    }
}

/// Ordered list of actions handed from the resolver to the sequencer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionQueue {
    entries: Vec<ActionEntry>,
}

impl ActionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, action: Action) {
        self.entries.push(action.into());
    }

    pub fn push_delayed(&mut self, action: Action, delay: Duration) {
        self.entries.push(ActionEntry { action, delay });
    }

    pub fn append(&mut self, other: ActionQueue) {
        self.entries.extend(other.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionEntry> {
        self.entries.iter()
    }

    pub fn actions(&self) -> impl Iterator<Item = Action> + '_ {
        self.entries.iter().map(|entry| entry.action)
    }

    /// Sum of the points carried by clear and transform actions.
    pub fn total_score(&self) -> u64 {
        self.actions().map(|action| u64::from(action.score())).sum()
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [ActionEntry] {
        &mut self.entries
    }
}

impl From<Vec<Action>> for ActionQueue {
    fn from(actions: Vec<Action>) -> Self {
        Self {
            entries: actions.into_iter().map(ActionEntry::from).collect(),
        }
    }
}

impl FromIterator<Action> for ActionQueue {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(ActionEntry::from).collect(),
        }
    }
}

impl IntoIterator for ActionQueue {
    type Item = ActionEntry;
    type IntoIter = std::vec::IntoIter<ActionEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_score_counts_clears_and_transforms() {
        let queue = ActionQueue::from(vec![
            Action::Clear {
                coords: (0, 0),
                score: 10,
            },
            Action::Barrier,
            Action::Transform {
                coords: (1, 0),
                kind: GemKind::Wild,
                score: 5,
            },
            Action::Move {
                from: (0, 0),
                to: (0, 1),
            },
        ]);

        assert_eq!(queue.total_score(), 15);
        assert_eq!(queue.len(), 4);
    }

    #[test]
    fn delayed_entries_keep_their_delay() {
        let mut queue = ActionQueue::new();
        queue.push(Action::Barrier);
        queue.push_delayed(Action::Wait(Duration::ZERO), Duration::from_millis(50));

        let delays: Vec<_> = queue.iter().map(|entry| entry.delay).collect();
        assert_eq!(delays, vec![Duration::ZERO, Duration::from_millis(50)]);
    }
}
