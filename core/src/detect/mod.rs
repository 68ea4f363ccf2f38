//! Match detection.
//!
//! Two stateless detectors scan the board along their axis: [`HorizontalDetector`] walks rows
//! and [`VerticalDetector`] walks columns. Pairs found by different detectors are never merged;
//! an L or T shape shows up as one pair per axis sharing a coordinate.

use core::ops::Range;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

pub use scan::*;
pub use swap::*;

mod scan;
mod swap;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    /// Unit step along the axis.
    pub const fn along(self) -> (isize, isize) {
        match self {
            Self::Horizontal => (1, 0),
            Self::Vertical => (0, 1),
        }
    }

    /// Unit step across the axis.
    pub const fn across(self) -> (isize, isize) {
        match self {
            Self::Horizontal => (0, 1),
            Self::Vertical => (1, 0),
        }
    }

    /// Lines of the rectangle `xs × ys` along this axis, each as its ordered coordinates.
    pub(crate) fn lines(
        self,
        xs: Range<Coord>,
        ys: Range<Coord>,
    ) -> impl Iterator<Item = Vec<Coord2>> {
        let (outer, inner) = match self {
            Self::Horizontal => (ys, xs),
            Self::Vertical => (xs, ys),
        };
        outer.map(move |line| {
            inner
                .clone()
                .map(|cell| match self {
                    Self::Horizontal => (cell, line),
                    Self::Vertical => (line, cell),
                })
                .collect()
        })
    }
}

/// Coordinates of a matched run; runs rarely exceed the width of a default board.
pub type RunCoords = SmallVec<[Coord2; 8]>;

/// A run of three or more mutually matching cells along one axis.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPair {
    pub orientation: Orientation,
    /// Kind the run matches as, never `Wild`.
    pub kind: GemKind,
    pub coords: RunCoords,
}

impl MatchPair {
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Middle coordinate, the one promoted for runs of five or more.
    pub fn middle(&self) -> Coord2 {
        self.coords[self.coords.len() / 2]
    }

    pub fn contains(&self, coords: Coord2) -> bool {
        self.coords.contains(&coords)
    }
}

/// A single swap that would create a match. Only used for hints and no-move detection.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSwap {
    pub a: Coord2,
    pub b: Coord2,
    pub kind: GemKind,
}

pub trait PairDetector {
    fn orientation(&self) -> Orientation;

    /// Pairs anywhere on the board.
    fn detect(&self, grid: &Grid) -> Vec<MatchPair> {
        let (xs, ys) = grid.bounds();
        self.detect_range(grid, xs, ys, false)
    }

    /// Pairs inside the rectangle `xs × ys`; runs are clipped to the rectangle.
    fn detect_range(
        &self,
        grid: &Grid,
        xs: Range<Coord>,
        ys: Range<Coord>,
        stop_on_first: bool,
    ) -> Vec<MatchPair> {
        let mut pairs = Vec::new();
        for line in self.orientation().lines(xs, ys) {
            scan_line(grid, self.orientation(), &line, &mut pairs, stop_on_first);
            if stop_on_first && !pairs.is_empty() {
                break;
            }
        }
        pairs
    }

    /// One swap creating a run along this detector's axis.
    fn detect_swap(&self, grid: &Grid) -> Option<MatchSwap> {
        find_swap(grid, self.orientation())
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct HorizontalDetector;

impl PairDetector for HorizontalDetector {
    fn orientation(&self) -> Orientation {
        Orientation::Horizontal
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct VerticalDetector;

impl PairDetector for VerticalDetector {
    fn orientation(&self) -> Orientation {
        Orientation::Vertical
    }
}

/// Pairs of both orientations, horizontal first.
pub fn detect(grid: &Grid) -> Vec<MatchPair> {
    let (xs, ys) = grid.bounds();
    detect_range(grid, xs, ys, false)
}

pub fn detect_range(
    grid: &Grid,
    xs: Range<Coord>,
    ys: Range<Coord>,
    stop_on_first: bool,
) -> Vec<MatchPair> {
    let mut pairs = HorizontalDetector.detect_range(grid, xs.clone(), ys.clone(), stop_on_first);
    if stop_on_first && !pairs.is_empty() {
        return pairs;
    }
    pairs.extend(VerticalDetector.detect_range(grid, xs, ys, stop_on_first));
    pairs
}

pub fn has_pairs(grid: &Grid) -> bool {
    let (xs, ys) = grid.bounds();
    !detect_range(grid, xs, ys, true).is_empty()
}

/// A swap creating a match in either orientation; `None` once both scans come up empty.
pub fn detect_swap(grid: &Grid) -> Option<MatchSwap> {
    HorizontalDetector
        .detect_swap(grid)
        .or_else(|| VerticalDetector.detect_swap(grid))
}
