use super::*;
use crate::types::apply_delta;

/// Looks for one swap that completes a run of three along `orientation`.
///
/// Every window of three consecutive cells that is not already a run is probed with each of
/// its cells as the swap target: the two other cells have to match each other, and the cell
/// swapped in comes from either side of the target across the axis, or from beyond the window
/// along the axis when the target is at one of its ends. Swapping within a window never helps
/// since whether three cells form a run does not depend on their order.
pub(crate) fn find_swap(grid: &Grid, orientation: Orientation) -> Option<MatchSwap> {
    let (xs, ys) = grid.bounds();
    let size = grid.size();
    let (along_x, along_y) = orientation.along();
    let (across_x, across_y) = orientation.across();

    for line in orientation.lines(xs, ys) {
        for window in line.windows(3) {
            let cells = [grid[window[0]], grid[window[1]], grid[window[2]]];
            if GemKind::resolve_run(&cells).is_some() {
                continue;
            }

            for target in 0..3 {
                let fixed = match target {
                    0 => [cells[1], cells[2]],
                    1 => [cells[0], cells[2]],
                    _ => [cells[0], cells[1]],
                };
                if !fixed[0].matches(fixed[1]) {
                    continue;
                }

                let coords = window[target];
                let beyond = match target {
                    0 => apply_delta(coords, (-along_x, -along_y), size),
                    2 => apply_delta(coords, (along_x, along_y), size),
                    _ => None,
                };
                let sources = [
                    apply_delta(coords, (-across_x, -across_y), size),
                    apply_delta(coords, (across_x, across_y), size),
                    beyond,
                ];

                for source in sources.into_iter().flatten() {
                    if let Some(kind) = GemKind::resolve_run(&[fixed[0], fixed[1], grid[source]]) {
                        log::trace!(
                            "{:?} swap {:?} <-> {:?} completes {}",
                            orientation,
                            source,
                            coords,
                            kind
                        );
                        return Some(MatchSwap {
                            a: source,
                            b: coords,
                            kind,
                        });
                    }
                }
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&str]) -> Grid {
        Grid::from_rows(rows).unwrap()
    }

    /// Swaps every adjacent pair and reports whether any produces a pair anywhere.
    fn brute_force_has_swap(grid: &Grid) -> bool {
        let mut scratch = grid.clone();
        let (w, h) = grid.size();
        for (x, y) in grid.coords() {
            for other in [(x + 1, y), (x, y + 1)] {
                if other.0 >= w || other.1 >= h {
                    continue;
                }
                scratch.swap((x, y), other);
                let found = has_pairs(&scratch);
                scratch.swap((x, y), other);
                if found {
                    return true;
                }
            }
        }
        false
    }

    fn assert_swap_creates_pair(grid: &Grid, swap: MatchSwap) {
        assert!(are_adjacent(swap.a, swap.b), "{swap:?}");
        let mut scratch = grid.clone();
        scratch.swap(swap.a, swap.b);
        let pairs = detect(&scratch);
        assert!(
            pairs.iter().any(|pair| pair.kind == swap.kind
                && (pair.contains(swap.a) || pair.contains(swap.b))),
            "{swap:?} on\n{grid}"
        );
    }

    #[test]
    fn gap_filled_from_the_side() {
        let grid = grid(&[
            "ABA", //
            "CAD", //
            "DCB", //
        ]);

        let swap = HorizontalDetector.detect_swap(&grid).unwrap();

        assert_eq!(swap.b, (1, 0));
        assert_eq!(swap.a, (1, 1));
        assert_eq!(swap.kind, GemKind::Ordinary(0));
        assert_swap_creates_pair(&grid, swap);
    }

    #[test]
    fn pair_extended_from_beyond() {
        let grid = grid(&["AACA"]);

        let swap = HorizontalDetector.detect_swap(&grid).unwrap();

        assert_eq!((swap.a, swap.b), ((3, 0), (2, 0)));
        assert_swap_creates_pair(&grid, swap);
    }

    #[test]
    fn vertical_pair_extended_from_the_side() {
        let grid = grid(&[
            "AB", //
            "AC", //
            "CA", //
        ]);

        assert_eq!(HorizontalDetector.detect_swap(&grid), None);
        let swap = VerticalDetector.detect_swap(&grid).unwrap();

        assert_eq!((swap.a, swap.b), ((1, 2), (0, 2)));
        assert_swap_creates_pair(&grid, swap);
    }

    #[test]
    fn wild_completes_any_pair() {
        let grid = grid(&[
            "BBC", //
            "CA*", //
        ]);

        let swap = detect_swap(&grid).unwrap();

        assert_eq!(swap.kind, GemKind::Ordinary(1));
        assert_swap_creates_pair(&grid, swap);
    }

    #[test]
    fn dead_board_has_no_swap() {
        let grid = grid(&[
            "ABCD", //
            "CDAB", //
            "ABCD", //
            "CDAB", //
        ]);

        assert!(!has_pairs(&grid));
        assert_eq!(detect_swap(&grid), None);
        assert!(!brute_force_has_swap(&grid));
    }

    #[test]
    fn agrees_with_brute_force_on_random_boards() {
        let mut source = RandomGemSource::new(7);
        let kinds: Vec<_> = GemKind::ordinary_kinds(6).collect();
        let mut checked = 0;

        for _ in 0..1000 {
            let mut grid = Grid::default();
            for coords in grid.coords() {
                grid[coords] = source.pick(&kinds);
            }
            if has_pairs(&grid) {
                continue;
            }
            checked += 1;

            let swap = detect_swap(&grid);
            assert_eq!(swap.is_some(), brute_force_has_swap(&grid), "\n{grid}");
            if let Some(swap) = swap {
                assert_swap_creates_pair(&grid, swap);
            }
        }

        assert!(checked > 0);
    }

    #[test]
    fn agrees_with_brute_force_with_wilds() {
        let mut source = RandomGemSource::new(11);
        let kinds: Vec<_> = GemKind::ordinary_kinds(6).collect();
        let mut checked = 0;

        for _ in 0..1000 {
            let mut grid = Grid::default();
            for coords in grid.coords() {
                grid[coords] = source.pick(&kinds);
            }
            if has_pairs(&grid) {
                continue;
            }
            for coords in grid.coords().step_by(5) {
                let kind = grid[coords];
                grid[coords] = GemKind::Wild;
                if has_pairs(&grid) {
                    grid[coords] = kind;
                }
            }
            checked += 1;

            let swap = detect_swap(&grid);
            assert_eq!(swap.is_some(), brute_force_has_swap(&grid), "\n{grid}");
            if let Some(swap) = swap {
                let mut scratch = grid.clone();
                scratch.swap(swap.a, swap.b);
                assert!(
                    detect(&scratch)
                        .iter()
                        .any(|pair| pair.contains(swap.a) || pair.contains(swap.b)),
                    "{swap:?} on\n{grid}"
                );
            }
        }

        assert!(checked > 0);
    }
}
