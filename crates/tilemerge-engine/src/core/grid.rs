use serde::{Deserialize, Serialize};

/// Value of a freshly spawned tile.
pub const SPAWN_VALUE: u32 = 2;

/// Largest tile a cell can hold. Two tiles of this value never merge.
pub const MAX_TILE_VALUE: u32 = 1 << 31;

/// Side length of a square grid.
///
/// Valid sizes are `2..=8`. Two cells per line is the minimum for a merge to
/// happen. Boards from six up can in principle grow a tile past
/// [`MAX_TILE_VALUE`]; such tiles stay put instead of merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct GridSize(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display(
    "grid size must be between {} and {}, got {size}",
    GridSize::MIN,
    GridSize::MAX
)]
pub struct GridSizeError {
    size: usize,
}

impl GridSize {
    pub const MIN: usize = 2;
    pub const MAX: usize = 8;
    pub const DEFAULT: Self = Self(4);

    pub const fn new(size: usize) -> Result<Self, GridSizeError> {
        if size < Self::MIN || size > Self::MAX {
            return Err(GridSizeError { size });
        }
        Ok(Self(size))
    }

    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }

    /// Total number of cells (`N * N`).
    #[must_use]
    pub const fn cell_count(self) -> usize {
        self.0 * self.0
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<usize> for GridSize {
    type Error = GridSizeError;

    fn try_from(size: usize) -> Result<Self, Self::Error> {
        Self::new(size)
    }
}

impl From<GridSize> for usize {
    fn from(size: GridSize) -> Self {
        size.0
    }
}

/// Fixed grid coordinate. Row 0 is the top edge, column 0 the left edge.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, derive_more::Display,
)]
#[display("({row}, {col})")]
pub struct Coord {
    row: usize,
    col: usize,
}

impl Coord {
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    #[must_use]
    pub const fn row(self) -> usize {
        self.row
    }

    #[must_use]
    pub const fn col(self) -> usize {
        self.col
    }
}

/// A grid position and the tile value it currently holds (0 when empty).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    coord: Coord,
    value: u32,
}

impl Cell {
    #[must_use]
    pub const fn coord(&self) -> Coord {
        self.coord
    }

    #[must_use]
    pub const fn value(&self) -> u32 {
        self.value
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.value == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("{coord} is outside of a {size}x{size} grid")]
pub struct OutOfGridError {
    coord: Coord,
    size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum InvalidGridError {
    #[display("{_0}")]
    Size(GridSizeError),
    #[display("row {row} has {len} cells, expected {expected}")]
    NotSquare {
        row: usize,
        len: usize,
        expected: usize,
    },
    #[display("cell {coord} holds {value}, expected 0 or a power of two >= 2")]
    InvalidValue { coord: Coord, value: u32 },
}

/// Returns `true` for the values a cell may hold: 0 or a power of two >= 2.
#[must_use]
pub const fn is_valid_tile_value(value: u32) -> bool {
    value == 0 || (value >= 2 && value.is_power_of_two())
}

/// N×N matrix of cells.
///
/// Coordinates are assigned once at construction and never change; only the
/// values move. The grid performs range checks only: callers that write values
/// ([`MoveResolver`](crate::MoveResolver), [`spawn_tiles`](crate::spawn_tiles))
/// keep every value at 0 or a power of two.
///
/// # Example
///
/// ```
/// use tilemerge_engine::{Coord, GridSize, GridState};
///
/// let mut grid = GridState::new(GridSize::DEFAULT);
/// assert_eq!(grid.empty_count(), 16);
///
/// grid.set(Coord::new(1, 2), 8).unwrap();
/// assert_eq!(grid.get(Coord::new(1, 2)), Some(8));
/// assert!(!grid.is_empty(Coord::new(1, 2)));
/// assert_eq!(grid.get(Coord::new(4, 0)), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridState {
    size: GridSize,
    cells: Vec<Cell>,
}

impl GridState {
    /// Creates a grid with every cell empty.
    #[must_use]
    pub fn new(size: GridSize) -> Self {
        let n = size.get();
        let cells = (0..size.cell_count())
            .map(|i| Cell {
                coord: Coord::new(i / n, i % n),
                value: 0,
            })
            .collect();
        Self { size, cells }
    }

    /// Builds a grid from row-major values.
    ///
    /// ```
    /// use tilemerge_engine::{Coord, GridState};
    ///
    /// let grid = GridState::from_rows(&[[2, 0], [0, 4]]).unwrap();
    /// assert_eq!(grid.get(Coord::new(1, 1)), Some(4));
    /// assert!(GridState::from_rows(&[[3, 0], [0, 0]]).is_err());
    /// ```
    pub fn from_rows<R>(rows: &[R]) -> Result<Self, InvalidGridError>
    where
        R: AsRef<[u32]>,
    {
        let size = GridSize::new(rows.len()).map_err(InvalidGridError::Size)?;
        let mut grid = Self::new(size);
        for (row, values) in rows.iter().enumerate() {
            let values = values.as_ref();
            if values.len() != size.get() {
                return Err(InvalidGridError::NotSquare {
                    row,
                    len: values.len(),
                    expected: size.get(),
                });
            }
            for (col, &value) in values.iter().enumerate() {
                let coord = Coord::new(row, col);
                if !is_valid_tile_value(value) {
                    return Err(InvalidGridError::InvalidValue { coord, value });
                }
                grid.cells[row * size.get() + col].value = value;
            }
        }
        Ok(grid)
    }

    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.size
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        let n = self.size.get();
        (coord.row < n && coord.col < n).then(|| coord.row * n + coord.col)
    }

    /// Returns the value at `coord`, or `None` if it is outside the grid.
    #[must_use]
    pub fn get(&self, coord: Coord) -> Option<u32> {
        self.index(coord).map(|i| self.cells[i].value)
    }

    pub fn set(&mut self, coord: Coord, value: u32) -> Result<(), OutOfGridError> {
        let index = self.index(coord).ok_or(OutOfGridError {
            coord,
            size: self.size.get(),
        })?;
        self.cells[index].value = value;
        Ok(())
    }

    /// Reads a value the caller knows to be in range.
    pub(crate) fn value_unchecked(&self, coord: Coord) -> u32 {
        self.cells[coord.row * self.size.get() + coord.col].value
    }

    /// Writes a value the caller knows to be in range and valid.
    pub(crate) fn set_unchecked(&mut self, coord: Coord, value: u32) {
        let n = self.size.get();
        self.cells[coord.row * n + coord.col].value = value;
    }

    /// Returns `true` if `coord` is inside the grid and holds no tile.
    #[must_use]
    pub fn is_empty(&self, coord: Coord) -> bool {
        self.get(coord) == Some(0)
    }

    /// Iterates over every coordinate in row-major order.
    pub fn all_coordinates(&self) -> impl Iterator<Item = Coord> + '_ {
        self.cells.iter().map(Cell::coord)
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Iterates over the rows from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.size.get())
    }

    /// Copies the values out as nested rows.
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<u32>> {
        self.rows()
            .map(|row| row.iter().map(Cell::value).collect())
            .collect()
    }

    pub fn empty_coordinates(&self) -> impl Iterator<Item = Coord> + '_ {
        self.cells.iter().filter(|c| c.is_empty()).map(Cell::coord)
    }

    #[must_use]
    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_empty()).count()
    }

    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.cells.len() - self.empty_count()
    }

    /// Sum of all tile values.
    #[must_use]
    pub fn sum(&self) -> u64 {
        self.cells.iter().map(|c| u64::from(c.value)).sum()
    }

    #[must_use]
    pub fn highest_tile(&self) -> u32 {
        self.cells.iter().map(Cell::value).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_size_bounds() {
        assert!(GridSize::new(1).is_err());
        assert!(GridSize::new(9).is_err());
        assert_eq!(GridSize::new(2).unwrap().cell_count(), 4);
        assert_eq!(GridSize::default().get(), 4);
    }

    #[test]
    fn test_new_grid_is_empty_and_square() {
        let grid = GridState::new(GridSize::new(5).unwrap());
        assert_eq!(grid.cells().count(), 25);
        assert_eq!(grid.empty_count(), 25);
        assert_eq!(grid.occupied_count(), 0);
        assert_eq!(grid.sum(), 0);
        assert_eq!(grid.highest_tile(), 0);
    }

    #[test]
    fn test_coordinates_are_row_major_and_fixed() {
        let mut grid = GridState::new(GridSize::new(3).unwrap());
        let before: Vec<_> = grid.all_coordinates().collect();
        assert_eq!(before[0], Coord::new(0, 0));
        assert_eq!(before[1], Coord::new(0, 1));
        assert_eq!(before[3], Coord::new(1, 0));
        assert_eq!(before[8], Coord::new(2, 2));

        grid.set(Coord::new(2, 1), 16).unwrap();
        let after: Vec<_> = grid.all_coordinates().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_get_set_range_checked() {
        let mut grid = GridState::new(GridSize::DEFAULT);
        assert_eq!(grid.get(Coord::new(0, 4)), None);
        assert!(grid.set(Coord::new(4, 0), 2).is_err());
        assert!(!grid.is_empty(Coord::new(7, 7)));

        grid.set(Coord::new(3, 3), 2).unwrap();
        assert_eq!(grid.get(Coord::new(3, 3)), Some(2));
        assert!(grid.is_empty(Coord::new(3, 2)));
        assert!(!grid.is_empty(Coord::new(3, 3)));
    }

    #[test]
    fn test_from_rows_validation() {
        let grid = GridState::from_rows(&[vec![2, 4, 0], vec![0, 0, 8], vec![0, 0, 0]]).unwrap();
        assert_eq!(grid.to_rows()[1], vec![0, 0, 8]);
        assert_eq!(grid.sum(), 14);
        assert_eq!(grid.highest_tile(), 8);

        let err = GridState::from_rows(&[vec![2, 4], vec![0]]).unwrap_err();
        assert_eq!(
            err,
            InvalidGridError::NotSquare {
                row: 1,
                len: 1,
                expected: 2
            }
        );

        let err = GridState::from_rows(&[[1, 0], [0, 0]]).unwrap_err();
        assert!(matches!(err, InvalidGridError::InvalidValue { value: 1, .. }));

        let err = GridState::from_rows(&[[2]]).unwrap_err();
        assert!(matches!(err, InvalidGridError::Size(_)));
    }

    #[test]
    fn test_valid_tile_values() {
        assert!(is_valid_tile_value(0));
        assert!(is_valid_tile_value(2));
        assert!(is_valid_tile_value(2048));
        assert!(!is_valid_tile_value(1));
        assert!(!is_valid_tile_value(6));
    }

    #[test]
    fn test_grid_size_serde() {
        let size: GridSize = serde_json::from_str("5").unwrap();
        assert_eq!(size.get(), 5);
        assert!(serde_json::from_str::<GridSize>("12").is_err());
        assert_eq!(serde_json::to_string(&size).unwrap(), "5");
    }
}
