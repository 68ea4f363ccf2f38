use super::*;

/// Running state of the run being walked along a line.
#[derive(Copy, Clone, Debug)]
struct Run {
    start: usize,
    len: usize,
    kind: GemKind,
    /// Consecutive wilds at the end of the run; they may also start the next run.
    trailing_wilds: usize,
}

impl Run {
    fn seed(index: usize, kind: GemKind) -> Self {
        Self {
            start: index,
            len: 1,
            kind,
            trailing_wilds: usize::from(kind.is_wild()),
        }
    }
}

/// Walks one line and appends every run of three or more to `out`.
///
/// Returns `true` when it stopped early because `stop_on_first` was set and a pair was found.
pub(crate) fn scan_line(
    grid: &Grid,
    orientation: Orientation,
    line: &[Coord2],
    out: &mut Vec<MatchPair>,
    stop_on_first: bool,
) -> bool {
    let Some(&first) = line.first() else {
        return false;
    };
    let mut run = Run::seed(0, grid[first]);

    for (index, &coords) in line.iter().enumerate().skip(1) {
        let cell = grid[coords];
        match run.kind.extend(cell) {
            Some(kind) => {
                run.kind = kind;
                run.len += 1;
                run.trailing_wilds = if cell.is_wild() {
                    run.trailing_wilds + 1
                } else {
                    0
                };
            }
            None => {
                if flush(orientation, line, &run, out) && stop_on_first {
                    return true;
                }
                run = if cell.is_empty() || run.trailing_wilds == 0 {
                    Run::seed(index, cell)
                } else {
                    // wilds between two different kinds belong to both runs
                    Run {
                        start: index - run.trailing_wilds,
                        len: run.trailing_wilds + 1,
                        kind: cell,
                        trailing_wilds: usize::from(cell.is_wild()),
                    }
                };
            }
        }
    }

    flush(orientation, line, &run, out) && stop_on_first
}

fn flush(orientation: Orientation, line: &[Coord2], run: &Run, out: &mut Vec<MatchPair>) -> bool {
    if run.len < 3 || run.kind.is_empty() {
        return false;
    }
    let pair = MatchPair {
        orientation,
        kind: run.kind.or_canonical(),
        coords: line[run.start..run.start + run.len].iter().copied().collect(),
    };
    log::trace!(
        "{:?} pair of {} x{} at {:?}",
        pair.orientation,
        pair.kind,
        pair.len(),
        pair.coords.first()
    );
    out.push(pair);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use GemKind::*;

    fn row_pairs(row: &str) -> Vec<MatchPair> {
        let grid = Grid::from_rows(&[row]).unwrap();
        HorizontalDetector.detect(&grid)
    }

    fn xs(pair: &MatchPair) -> Vec<Coord> {
        pair.coords.iter().map(|&(x, _)| x).collect()
    }

    #[test]
    fn trailing_run_is_flushed() {
        let pairs = row_pairs("ABCCC");
        assert_eq!(pairs.len(), 1);
        assert_eq!(xs(&pairs[0]), vec![2, 3, 4]);
        assert_eq!(pairs[0].kind, Ordinary(2));
    }

    #[test]
    fn wild_joins_and_resolves_run() {
        let pairs = row_pairs("*AA");
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].kind, Ordinary(0));

        let pairs = row_pairs("A*A");
        assert_eq!(pairs.len(), 1);
        assert_eq!(xs(&pairs[0]), vec![0, 1, 2]);
    }

    #[test]
    fn shared_wilds_belong_to_both_runs() {
        let pairs = row_pairs("AA*BB");
        assert_eq!(pairs.len(), 2);
        assert_eq!(xs(&pairs[0]), vec![0, 1, 2]);
        assert_eq!(pairs[0].kind, Ordinary(0));
        assert_eq!(xs(&pairs[1]), vec![2, 3, 4]);
        assert_eq!(pairs[1].kind, Ordinary(1));
    }

    #[test]
    fn all_wild_run_uses_canonical_kind() {
        let pairs = row_pairs("***");
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].kind, GemKind::CANONICAL);
    }

    #[test]
    fn empty_cells_never_match() {
        assert!(row_pairs("...").is_empty());
        assert!(row_pairs("*.**").is_empty());
        assert!(row_pairs("AA.A").is_empty());
    }

    #[test]
    fn wild_after_empty_starts_new_run() {
        let pairs = row_pairs(".**B");
        assert_eq!(pairs.len(), 1);
        assert_eq!(xs(&pairs[0]), vec![1, 2, 3]);
        assert_eq!(pairs[0].kind, Ordinary(1));
    }

    #[test]
    fn vertical_scan_walks_columns() {
        let grid = Grid::from_rows(&["AB", "AC", "AB"]).unwrap();
        let pairs = VerticalDetector.detect(&grid);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].coords.as_slice(), &[(0, 0), (0, 1), (0, 2)]);
        assert!(HorizontalDetector.detect(&grid).is_empty());
    }
}
