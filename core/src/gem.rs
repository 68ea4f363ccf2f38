use core::fmt;
use serde::{Deserialize, Serialize};

/// Contents of a single board cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GemKind {
    #[default]
    Empty,
    Ordinary(u8),
    /// Matches any non-empty kind.
    Wild,
}

impl GemKind {
    /// Kind an all-wild run resolves to.
    pub const CANONICAL: GemKind = GemKind::Ordinary(0);

    /// The first `count` ordinary kinds.
    pub fn ordinary_kinds(count: u8) -> impl Iterator<Item = GemKind> {
        (0..count).map(GemKind::Ordinary)
    }

    pub const fn is_empty(self) -> bool {
        matches!(self, Self::Empty)
    }

    pub const fn is_wild(self) -> bool {
        matches!(self, Self::Wild)
    }

    pub const fn is_ordinary(self) -> bool {
        matches!(self, Self::Ordinary(_))
    }

    /// Symmetric match rule: wild matches anything non-empty, ordinary kinds match when equal,
    /// empty matches nothing.
    pub const fn matches(self, other: GemKind) -> bool {
        use GemKind::*;
        match (self, other) {
            (Empty, _) | (_, Empty) => false,
            (Wild, _) | (_, Wild) => true,
            (Ordinary(a), Ordinary(b)) => a == b,
        }
    }

    /// Kind of a run extended by `next`, or `None` when `next` breaks the run.
    ///
    /// `self` is the running resolved kind; a run that is wild so far takes the kind of the
    /// first ordinary cell that joins it.
    pub const fn extend(self, next: GemKind) -> Option<GemKind> {
        if !self.matches(next) {
            return None;
        }
        Some(match (self, next) {
            (GemKind::Wild, other) => other,
            (current, _) => current,
        })
    }

    /// Kind the cells resolve to if they can all form one run.
    pub fn resolve_run(cells: &[GemKind]) -> Option<GemKind> {
        let mut resolved = GemKind::Wild;
        for &cell in cells {
            resolved = resolved.extend(cell)?;
        }
        Some(resolved.or_canonical())
    }

    /// Replaces `Wild` with the canonical ordinary kind.
    pub const fn or_canonical(self) -> GemKind {
        match self {
            GemKind::Wild => Self::CANONICAL,
            other => other,
        }
    }

    pub const fn to_char(self) -> char {
        match self {
            GemKind::Empty => '.',
            GemKind::Wild => '*',
            GemKind::Ordinary(n) if n < 26 => (b'A' + n) as char,
            GemKind::Ordinary(_) => '?',
        }
    }

    pub const fn from_char(c: char) -> Option<GemKind> {
        match c {
            '.' => Some(GemKind::Empty),
            '*' => Some(GemKind::Wild),
            'A'..='Z' => Some(GemKind::Ordinary(c as u8 - b'A')),
            _ => None,
        }
    }
}

impl fmt::Display for GemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use GemKind::*;

    #[test]
    fn match_rule_is_symmetric() {
        let kinds = [Empty, Ordinary(0), Ordinary(1), Wild];
        for a in kinds {
            for b in kinds {
                assert_eq!(a.matches(b), b.matches(a), "{a:?} vs {b:?}");
            }
        }
    }

    #[test]
    fn wild_never_matches_empty() {
        assert!(!Wild.matches(Empty));
        assert!(Wild.matches(Wild));
        assert!(Wild.matches(Ordinary(3)));
        assert!(!Empty.matches(Empty));
    }

    #[test]
    fn run_resolution_picks_first_ordinary() {
        assert_eq!(GemKind::resolve_run(&[Wild, Ordinary(2), Wild]), Some(Ordinary(2)));
        assert_eq!(GemKind::resolve_run(&[Ordinary(1), Wild, Ordinary(2)]), None);
        assert_eq!(GemKind::resolve_run(&[Wild, Wild, Wild]), Some(GemKind::CANONICAL));
        assert_eq!(GemKind::resolve_run(&[Wild, Empty]), None);
    }

    #[test]
    fn char_conversion() {
        assert_eq!(GemKind::from_char('C'), Some(Ordinary(2)));
        assert_eq!(Ordinary(2).to_char(), 'C');
        assert_eq!(GemKind::from_char('x'), None);
    }
}
