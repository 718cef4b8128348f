use serde::{Deserialize, Serialize};

use crate::{Coord, Direction, GridState, MergeRule};

/// Two equal tiles combined into one during a move.
///
/// `coord` is where the doubled tile ended up and `value` is its new value,
/// which is also the number of points the merge is worth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeEvent {
    coord: Coord,
    value: u32,
}

impl MergeEvent {
    #[must_use]
    pub const fn new(coord: Coord, value: u32) -> Self {
        Self { coord, value }
    }

    #[must_use]
    pub const fn coord(&self) -> Coord {
        self.coord
    }

    #[must_use]
    pub const fn value(&self) -> u32 {
        self.value
    }
}

/// Slides and merges tiles for one directional command.
///
/// Every line parallel to the move is processed on its own. Positions along a
/// line are counted from the edge the tiles move toward, so the same scan
/// serves all four directions:
///
/// 1. For each starting position `i` in `1..N`, a cursor begins at `i`.
/// 2. While the cursor is past the edge, look at the cell one step toward it:
///    - empty: the tile slides into it and the cursor follows;
///    - equal value: the two merge into the forward cell (value doubled, a
///      [`MergeEvent`] is emitted) and the cursor follows;
///    - anything else: the tile stops.
///
/// Because later cursors walk back over cells earlier ones already touched,
/// a freshly merged tile can merge again under [`MergeRule::Cascade`].
/// [`MergeRule::OncePerTile`] forbids that and yields the canonical rule.
///
/// # Example
///
/// ```
/// use tilemerge_engine::{Direction, GridState, MergeRule, MoveResolver};
///
/// let mut grid = GridState::from_rows(&[[2, 2], [0, 4]]).unwrap();
/// let events = MoveResolver::new(MergeRule::Cascade).resolve(&mut grid, Direction::Left);
///
/// assert_eq!(grid.to_rows(), vec![vec![4, 0], vec![4, 0]]);
/// assert_eq!(events.len(), 1);
/// assert_eq!(events[0].value(), 4);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveResolver {
    rule: MergeRule,
}

impl MoveResolver {
    #[must_use]
    pub const fn new(rule: MergeRule) -> Self {
        Self { rule }
    }

    #[must_use]
    pub const fn rule(&self) -> MergeRule {
        self.rule
    }

    /// Applies `direction` to `grid` in place and returns the merges in the
    /// order they happened. An empty list means no tile merged; tiles may
    /// still have slid.
    pub fn resolve(&self, grid: &mut GridState, direction: Direction) -> Vec<MergeEvent> {
        let n = grid.size().get();
        let mut events = vec![];
        // Tiles created by a merge during this move, indexed by line position.
        let mut merged = vec![false; n];

        for line in 0..n {
            merged.fill(false);
            let at = |pos: usize| line_coord(direction, line, pos, n);

            for start in 1..n {
                let mut cursor = start;
                while cursor >= 1 {
                    let here = at(cursor);
                    let ahead = at(cursor - 1);
                    let value = grid.value_unchecked(here);
                    let target = grid.value_unchecked(ahead);

                    if target == 0 {
                        grid.set_unchecked(ahead, value);
                        grid.set_unchecked(here, 0);
                        merged[cursor - 1] = merged[cursor];
                        merged[cursor] = false;
                    } else if let Some(doubled) = self.merged_value(
                        value,
                        target,
                        merged[cursor - 1],
                        merged[cursor],
                    ) {
                        grid.set_unchecked(ahead, doubled);
                        grid.set_unchecked(here, 0);
                        merged[cursor - 1] = true;
                        merged[cursor] = false;
                        events.push(MergeEvent::new(ahead, doubled));
                    } else {
                        break;
                    }
                    cursor -= 1;
                }
            }
        }

        events
    }

    /// Value of the tile produced by merging `value` into `target`, if the two
    /// may merge.
    fn merged_value(
        &self,
        value: u32,
        target: u32,
        ahead_merged: bool,
        here_merged: bool,
    ) -> Option<u32> {
        let allowed = match self.rule {
            MergeRule::Cascade => true,
            MergeRule::OncePerTile => !ahead_merged && !here_merged,
        };
        if target != value || !allowed {
            return None;
        }
        value.checked_mul(2)
    }
}

/// Maps a position along a line (0 = the edge tiles move toward) to a grid
/// coordinate.
fn line_coord(direction: Direction, line: usize, pos: usize, n: usize) -> Coord {
    match direction {
        Direction::Left => Coord::new(line, pos),
        Direction::Right => Coord::new(line, n - 1 - pos),
        Direction::Up => Coord::new(pos, line),
        Direction::Down => Coord::new(n - 1 - pos, line),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MAX_TILE_VALUE;

    fn resolve_rows<const N: usize>(
        rule: MergeRule,
        rows: [[u32; N]; N],
        direction: Direction,
    ) -> (Vec<Vec<u32>>, Vec<MergeEvent>) {
        let mut grid = GridState::from_rows(&rows).unwrap();
        let events = MoveResolver::new(rule).resolve(&mut grid, direction);
        (grid.to_rows(), events)
    }

    /// Resolves a single top row of a 4x4 grid to the left.
    fn left_row(rule: MergeRule, row: [u32; 4]) -> (Vec<u32>, Vec<u32>) {
        let mut rows = [[0; 4]; 4];
        rows[0] = row;
        let (rows, events) = resolve_rows(rule, rows, Direction::Left);
        let values = events.iter().map(MergeEvent::value).collect();
        (rows[0].clone(), values)
    }

    #[test]
    fn test_pair_merges_toward_edge() {
        let (row, events) = left_row(MergeRule::Cascade, [2, 2, 0, 0]);
        assert_eq!(row, vec![4, 0, 0, 0]);
        assert_eq!(events, vec![4]);
    }

    #[test]
    fn test_gap_between_equal_tiles() {
        let (row, events) = left_row(MergeRule::Cascade, [2, 0, 2, 0]);
        assert_eq!(row, vec![4, 0, 0, 0]);
        assert_eq!(events, vec![4]);
    }

    #[test]
    fn test_three_equal_tiles() {
        let (row, events) = left_row(MergeRule::Cascade, [2, 2, 2, 0]);
        assert_eq!(row, vec![4, 2, 0, 0]);
        assert_eq!(events, vec![4]);
    }

    #[test]
    fn test_four_equal_tiles_cascade() {
        // 2+2 at the edge, the third tile slides up against the 4, then the
        // fourth slides, merges with the third and the result merges again.
        let (row, events) = left_row(MergeRule::Cascade, [2, 2, 2, 2]);
        assert_eq!(row, vec![8, 0, 0, 0]);
        assert_eq!(events, vec![4, 4, 8]);
    }

    #[test]
    fn test_largest_tiles_do_not_merge() {
        let half = MAX_TILE_VALUE / 2;
        let (rows, events) = resolve_rows(
            MergeRule::Cascade,
            [[half, half], [MAX_TILE_VALUE, MAX_TILE_VALUE]],
            Direction::Left,
        );
        assert_eq!(
            rows,
            vec![vec![MAX_TILE_VALUE, 0], vec![MAX_TILE_VALUE, MAX_TILE_VALUE]]
        );
        let values: Vec<_> = events.iter().map(MergeEvent::value).collect();
        assert_eq!(values, vec![MAX_TILE_VALUE]);
        assert!(rows.iter().flatten().all(|&v| crate::is_valid_tile_value(v)));
    }

    #[test]
    fn test_four_equal_tiles_once_per_tile() {
        let (row, events) = left_row(MergeRule::OncePerTile, [2, 2, 2, 2]);
        assert_eq!(row, vec![4, 4, 0, 0]);
        assert_eq!(events, vec![4, 4]);
    }

    #[test]
    fn test_merged_tile_merges_again_only_in_cascade() {
        let (row, events) = left_row(MergeRule::Cascade, [4, 4, 8, 0]);
        assert_eq!(row, vec![16, 0, 0, 0]);
        assert_eq!(events, vec![8, 16]);

        let (row, events) = left_row(MergeRule::OncePerTile, [4, 4, 8, 0]);
        assert_eq!(row, vec![8, 8, 0, 0]);
        assert_eq!(events, vec![8]);
    }

    #[test]
    fn test_packed_distinct_row_is_noop() {
        let (row, events) = left_row(MergeRule::Cascade, [4, 2, 8, 16]);
        assert_eq!(row, vec![4, 2, 8, 16]);
        assert!(events.is_empty());
    }

    #[test]
    fn test_slide_without_merge() {
        let (row, events) = left_row(MergeRule::Cascade, [0, 0, 4, 2]);
        assert_eq!(row, vec![4, 2, 0, 0]);
        assert!(events.is_empty());
    }

    #[test]
    fn test_right_mirrors_left() {
        let (rows, events) = resolve_rows(
            MergeRule::Cascade,
            [[0, 0, 2, 2], [2, 2, 2, 2], [0; 4], [0; 4]],
            Direction::Right,
        );
        assert_eq!(rows[0], vec![0, 0, 0, 4]);
        assert_eq!(rows[1], vec![0, 0, 0, 8]);
        assert_eq!(events[0], MergeEvent::new(Coord::new(0, 3), 4));
        assert_eq!(events.last(), Some(&MergeEvent::new(Coord::new(1, 3), 8)));
    }

    #[test]
    fn test_up_and_down_use_columns() {
        let grid = [[2, 0, 0], [2, 0, 4], [0, 0, 4]];

        let (rows, events) = resolve_rows(MergeRule::Cascade, grid, Direction::Up);
        assert_eq!(rows, vec![vec![4, 0, 8], vec![0, 0, 0], vec![0, 0, 0]]);
        assert_eq!(
            events,
            vec![
                MergeEvent::new(Coord::new(0, 0), 4),
                MergeEvent::new(Coord::new(0, 2), 8),
            ]
        );

        let (rows, events) = resolve_rows(MergeRule::Cascade, grid, Direction::Down);
        assert_eq!(rows, vec![vec![0, 0, 0], vec![0, 0, 0], vec![4, 0, 8]]);
        assert_eq!(events[0].coord(), Coord::new(2, 0));
    }

    #[test]
    fn test_events_carry_grid_coordinates_per_line() {
        let (_, events) = resolve_rows(
            MergeRule::Cascade,
            [[0, 0], [8, 8]],
            Direction::Left,
        );
        assert_eq!(events, vec![MergeEvent::new(Coord::new(1, 0), 16)]);
    }

    #[test]
    fn test_resolve_preserves_sum_and_validity() {
        let start = [[2, 2, 4, 8], [0, 4, 4, 4], [16, 0, 16, 2], [2, 0, 0, 2]];
        for rule in [MergeRule::Cascade, MergeRule::OncePerTile] {
            for direction in Direction::ALL {
                let mut grid = GridState::from_rows(&start).unwrap();
                let before = grid.sum();
                let events = MoveResolver::new(rule).resolve(&mut grid, direction);
                assert_eq!(grid.sum(), before, "{rule:?} {direction}");
                assert!(grid.cells().all(|c| crate::is_valid_tile_value(c.value())));
                assert_eq!(grid.cells().count(), 16);
                // each merge removes exactly one tile
                let before_tiles = GridState::from_rows(&start).unwrap().occupied_count();
                assert_eq!(grid.occupied_count(), before_tiles - events.len());
            }
        }
    }

    #[test]
    fn test_resolved_grid_is_stable_without_merges() {
        let mut grid = GridState::from_rows(&[[2, 4, 0], [8, 0, 0], [0, 0, 0]]).unwrap();
        let before = grid.clone();
        let events = MoveResolver::default().resolve(&mut grid, Direction::Left);
        assert!(events.is_empty());
        assert_eq!(grid, before);
    }
}
