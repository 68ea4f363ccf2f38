use core::fmt;
use core::ops::{Index, IndexMut, Range};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Fixed-size board of gem cells indexed by `(x, y)`.
///
/// Indexing outside the board panics: callers are expected to validate coordinates at their
/// own boundary (see [`Grid::validate_coords`]).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    cells: Array2<GemKind>,
}

impl Grid {
    pub const DEFAULT_SIZE: Coord2 = (8, 8);

    /// Empty board of the given size.
    pub fn new(size: Coord2) -> Self {
        Self {
            cells: Array2::default(size.to_nd_index()),
        }
    }

    /// Parses a board from one string per row, top row first.
    ///
    /// `.` is empty, `*` is wild and `A`..`Z` are ordinary kinds 0..25. Whitespace is ignored
    /// so rows can be written as `"A A B"`.
    pub fn from_rows(rows: &[&str]) -> Result<Self> {
        let parsed: Vec<Vec<GemKind>> = rows
            .iter()
            .map(|row| {
                row.chars()
                    .filter(|c| !c.is_whitespace())
                    .map(|c| GemKind::from_char(c).ok_or(GameError::InvalidCell(c)))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<_>>()?;

        let height = parsed.len();
        let width = parsed.first().map_or(0, Vec::len);
        if width == 0
            || width > Coord::MAX.into()
            || height > Coord::MAX.into()
            || parsed.iter().any(|row| row.len() != width)
        {
            return Err(GameError::InvalidBoardShape);
        }

        let mut grid = Self::new((width as Coord, height as Coord));
        for (y, row) in parsed.into_iter().enumerate() {
            for (x, kind) in row.into_iter().enumerate() {
                grid[(x as Coord, y as Coord)] = kind;
            }
        }
        Ok(grid)
    }

    pub fn size(&self) -> Coord2 {
        let (w, h) = self.cells.dim();
        (w as Coord, h as Coord)
    }

    pub fn width(&self) -> Coord {
        self.size().0
    }

    pub fn height(&self) -> Coord {
        self.size().1
    }

    /// Full-board coordinate ranges `(xs, ys)`.
    pub fn bounds(&self) -> (Range<Coord>, Range<Coord>) {
        let (w, h) = self.size();
        (0..w, 0..h)
    }

    pub fn contains(&self, coords: Coord2) -> bool {
        let (w, h) = self.size();
        coords.0 < w && coords.1 < h
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if self.contains(coords) {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn get(&self, coords: Coord2) -> Option<GemKind> {
        self.contains(coords).then(|| self[coords])
    }

    pub fn swap(&mut self, a: Coord2, b: Coord2) {
        self.check(a);
        self.check(b);
        self.cells.swap(a.to_nd_index(), b.to_nd_index());
    }

    /// All coordinates, row by row.
    pub fn coords(&self) -> impl Iterator<Item = Coord2> + use<> {
        let (w, h) = self.size();
        (0..h).flat_map(move |y| (0..w).map(move |x| (x, y)))
    }

    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|kind| kind.is_empty()).count()
    }

    pub fn is_full(&self) -> bool {
        self.empty_count() == 0
    }

    pub fn clear(&mut self) {
        self.cells.fill(GemKind::Empty);
    }

    /// Non-empty kinds of column `x`, top to bottom.
    pub fn column_kinds(&self, x: Coord) -> Vec<GemKind> {
        (0..self.height())
            .map(|y| self[(x, y)])
            .filter(|kind| !kind.is_empty())
            .collect()
    }

    fn check(&self, coords: Coord2) {
        assert!(
            self.contains(coords),
            "coordinates {:?} out of bounds for board of size {:?}",
            coords,
            self.size()
        );
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SIZE)
    }
}

impl Index<Coord2> for Grid {
    type Output = GemKind;

    fn index(&self, coords: Coord2) -> &Self::Output {
        self.check(coords);
        &self.cells[coords.to_nd_index()]
    }
}

impl IndexMut<Coord2> for Grid {
    fn index_mut(&mut self, coords: Coord2) -> &mut Self::Output {
        self.check(coords);
        &mut self.cells[coords.to_nd_index()]
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (w, h) = self.size();
        for y in 0..h {
            for x in 0..w {
                write!(f, "{}", self[(x, y)])?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows_top_first() {
        let grid = Grid::from_rows(&["AB*", ".CA"]).unwrap();

        assert_eq!(grid.size(), (3, 2));
        assert_eq!(grid[(0, 0)], GemKind::Ordinary(0));
        assert_eq!(grid[(2, 0)], GemKind::Wild);
        assert_eq!(grid[(0, 1)], GemKind::Empty);
        assert_eq!(grid[(1, 1)], GemKind::Ordinary(2));
        assert_eq!(grid.to_string(), "AB*\n.CA\n");
    }

    #[test]
    fn rejects_ragged_rows_and_unknown_cells() {
        assert_eq!(
            Grid::from_rows(&["AB", "A"]),
            Err(GameError::InvalidBoardShape)
        );
        assert_eq!(Grid::from_rows(&["A#"]), Err(GameError::InvalidCell('#')));
        assert_eq!(Grid::from_rows(&[]), Err(GameError::InvalidBoardShape));
    }

    #[test]
    fn swap_exchanges_cells() {
        let mut grid = Grid::from_rows(&["AB"]).unwrap();
        grid.swap((0, 0), (1, 0));
        assert_eq!(grid.to_string(), "BA\n");
    }

    #[test]
    fn checked_access() {
        let grid = Grid::default();
        assert_eq!(grid.size(), (8, 8));
        assert_eq!(grid.get((7, 7)), Some(GemKind::Empty));
        assert_eq!(grid.get((8, 0)), None);
        assert_eq!(grid.validate_coords((0, 8)), Err(GameError::InvalidCoords));
        assert_eq!(grid.empty_count(), 64);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn out_of_bounds_index_panics() {
        let grid = Grid::default();
        let _ = grid[(8, 0)];
    }
}
