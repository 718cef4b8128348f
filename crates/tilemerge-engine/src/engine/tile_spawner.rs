use std::{fmt, str::FromStr};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{BoardFullError, Coord, GridState, SPAWN_VALUE};

/// Places `count` new tiles of value 2 into empty cells of `grid`.
///
/// Positions are drawn uniformly from the whole grid and redrawn when they hit
/// an occupied cell. Once the number of tiles still to place equals the number
/// of empty cells, those cells are filled directly without drawing, so a grid
/// with a single free cell always gets its tile there.
///
/// Fails with [`BoardFullError`], leaving the grid untouched, when fewer than
/// `count` cells are empty.
///
/// Returns the coordinates that received a tile, in placement order.
pub fn spawn_tiles<R>(
    grid: &mut GridState,
    count: usize,
    rng: &mut R,
) -> Result<Vec<Coord>, BoardFullError>
where
    R: Rng + ?Sized,
{
    let available = grid.empty_count();
    if available < count {
        return Err(BoardFullError::new(count, available));
    }

    let n = grid.size().get();
    let mut placed = Vec::with_capacity(count);
    let mut remaining = count;
    let mut empty = available;
    while remaining > 0 {
        if remaining == empty {
            let rest: Vec<_> = grid.empty_coordinates().collect();
            for coord in rest {
                grid.set_unchecked(coord, SPAWN_VALUE);
                placed.push(coord);
            }
            break;
        }

        let coord = Coord::new(rng.random_range(0..n), rng.random_range(0..n));
        if grid.value_unchecked(coord) != 0 {
            continue;
        }
        grid.set_unchecked(coord, SPAWN_VALUE);
        placed.push(coord);
        remaining -= 1;
        empty -= 1;
    }

    Ok(placed)
}

/// Seeded source of tile positions.
///
/// Owns a PCG generator so that a session started from the same
/// [`SpawnSeed`] and fed the same moves produces the same tiles.
///
/// # Example
///
/// ```
/// use tilemerge_engine::{GridSize, GridState, SpawnSeed, TileSpawner};
///
/// let seed: SpawnSeed = "000102030405060708090a0b0c0d0e0f".parse().unwrap();
///
/// let mut a = GridState::new(GridSize::DEFAULT);
/// let mut b = GridState::new(GridSize::DEFAULT);
/// TileSpawner::with_seed(seed).spawn(&mut a, 4).unwrap();
/// TileSpawner::with_seed(seed).spawn(&mut b, 4).unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.occupied_count(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct TileSpawner {
    seed: SpawnSeed,
    rng: Pcg32,
}

impl Default for TileSpawner {
    fn default() -> Self {
        Self::new()
    }
}

impl TileSpawner {
    /// Creates a spawner with a random seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    #[must_use]
    pub fn with_seed(seed: SpawnSeed) -> Self {
        Self {
            seed,
            rng: Pcg32::from_seed(seed.0),
        }
    }

    /// Seed this spawner was created from.
    #[must_use]
    pub fn seed(&self) -> SpawnSeed {
        self.seed
    }

    /// Like [`spawn_tiles`], drawing from this spawner's generator.
    pub fn spawn(
        &mut self,
        grid: &mut GridState,
        count: usize,
    ) -> Result<Vec<Coord>, BoardFullError> {
        spawn_tiles(grid, count, &mut self.rng)
    }
}

/// 128-bit seed for tile placement.
///
/// Written as 32 hexadecimal digits both in JSON and on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnSeed([u8; 16]);

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid seed {input:?}: expected 32 hexadecimal digits")]
pub struct ParseSeedError {
    input: String,
}

impl SpawnSeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for SpawnSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

impl FromStr for SpawnSeed {
    type Err = ParseSeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseSeedError {
            input: s.to_owned(),
        };
        if s.len() != 32 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(err());
        }
        let num = u128::from_str_radix(s, 16).map_err(|_| err())?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Serialize for SpawnSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SpawnSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

/// Allows drawing a fresh seed with `rng.random()`.
impl Distribution<SpawnSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> SpawnSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        SpawnSeed(seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GridSize;

    fn fixed_seed() -> SpawnSeed {
        SpawnSeed::from_bytes([7; 16])
    }

    #[test]
    fn test_spawn_places_twos_in_empty_cells() {
        let mut grid = GridState::from_rows(&[[4, 0, 0], [0, 8, 0], [0, 0, 0]]).unwrap();
        let placed = TileSpawner::with_seed(fixed_seed())
            .spawn(&mut grid, 3)
            .unwrap();

        assert_eq!(placed.len(), 3);
        for coord in &placed {
            assert_eq!(grid.get(*coord), Some(2));
        }
        assert_eq!(grid.get(Coord::new(0, 0)), Some(4));
        assert_eq!(grid.get(Coord::new(1, 1)), Some(8));
        assert_eq!(grid.occupied_count(), 5);
        assert_eq!(grid.sum(), 12 + 6);
    }

    #[test]
    fn test_spawn_never_reuses_a_cell() {
        let mut grid = GridState::new(GridSize::DEFAULT);
        let mut placed = TileSpawner::with_seed(fixed_seed())
            .spawn(&mut grid, 16)
            .unwrap();
        placed.sort();
        placed.dedup();
        assert_eq!(placed.len(), 16);
        assert_eq!(grid.empty_count(), 0);
    }

    #[test]
    fn test_single_empty_cell_is_filled_without_drawing() {
        struct PanickingRng;
        impl rand::RngCore for PanickingRng {
            fn next_u32(&mut self) -> u32 {
                panic!("rng must not be consulted")
            }
            fn next_u64(&mut self) -> u64 {
                panic!("rng must not be consulted")
            }
            fn fill_bytes(&mut self, _dst: &mut [u8]) {
                panic!("rng must not be consulted")
            }
        }

        let mut grid = GridState::from_rows(&[
            [2, 4, 8, 16],
            [4, 8, 16, 32],
            [8, 16, 0, 64],
            [16, 32, 64, 128],
        ])
        .unwrap();
        let placed = spawn_tiles(&mut grid, 1, &mut PanickingRng).unwrap();
        assert_eq!(placed, vec![Coord::new(2, 2)]);
        assert_eq!(grid.get(Coord::new(2, 2)), Some(2));
    }

    #[test]
    fn test_full_grid_reports_board_full() {
        let mut grid = GridState::from_rows(&[[2, 4], [8, 16]]).unwrap();
        let before = grid.clone();
        let err = TileSpawner::with_seed(fixed_seed())
            .spawn(&mut grid, 1)
            .unwrap_err();
        assert_eq!(err, BoardFullError::new(1, 0));
        assert_eq!(grid, before);
    }

    #[test]
    fn test_insufficient_cells_leave_grid_untouched() {
        let mut grid = GridState::from_rows(&[[2, 0], [0, 16]]).unwrap();
        let before = grid.clone();
        let err = TileSpawner::with_seed(fixed_seed())
            .spawn(&mut grid, 3)
            .unwrap_err();
        assert_eq!(err.requested(), 3);
        assert_eq!(err.available(), 2);
        assert_eq!(grid, before);
    }

    #[test]
    fn test_same_seed_same_positions() {
        let mut a = GridState::new(GridSize::new(6).unwrap());
        let mut b = GridState::new(GridSize::new(6).unwrap());
        let mut spawner_a = TileSpawner::with_seed(fixed_seed());
        let mut spawner_b = TileSpawner::with_seed(fixed_seed());
        for _ in 0..10 {
            assert_eq!(
                spawner_a.spawn(&mut a, 2).unwrap(),
                spawner_b.spawn(&mut b, 2).unwrap()
            );
        }
        assert_eq!(a, b);
    }

    #[test]
    fn test_spawn_zero_is_noop() {
        let mut grid = GridState::new(GridSize::DEFAULT);
        let placed = TileSpawner::new().spawn(&mut grid, 0).unwrap();
        assert!(placed.is_empty());
        assert_eq!(grid.empty_count(), 16);
    }

    mod spawn_seed_serialization {
        use super::*;

        #[test]
        fn test_roundtrip_random_seed() {
            let seed: SpawnSeed = rand::rng().random();
            let serialized = serde_json::to_string(&seed).unwrap();
            let deserialized: SpawnSeed = serde_json::from_str(&serialized).unwrap();
            assert_eq!(seed, deserialized);
        }

        #[test]
        fn test_known_value_sequential_bytes() {
            let seed = SpawnSeed::from_bytes([
                0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF, 0xFE, 0xDC, 0xBA, 0x98, 0x76, 0x54,
                0x32, 0x10,
            ]);
            assert_eq!(seed.to_string(), "0123456789abcdeffedcba9876543210");
            assert_eq!(
                serde_json::to_string(&seed).unwrap(),
                "\"0123456789abcdeffedcba9876543210\""
            );
        }

        #[test]
        fn test_parse_accepts_uppercase() {
            let seed: SpawnSeed = "0123456789ABCDEFFEDCBA9876543210".parse().unwrap();
            assert_eq!(seed.to_string(), "0123456789abcdeffedcba9876543210");
        }

        #[test]
        fn test_parse_rejects_bad_input() {
            assert!("0123".parse::<SpawnSeed>().is_err());
            assert!("0123456789abcdefg123456789abcdef".parse::<SpawnSeed>().is_err());
            assert!("+123456789abcdef0123456789abcdef".parse::<SpawnSeed>().is_err());
            assert!(serde_json::from_str::<SpawnSeed>("\"xyz\"").is_err());
        }
    }
}
