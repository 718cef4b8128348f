use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Edge of the grid that tiles slide toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[display("up")]
    Up,
    #[display("down")]
    Down,
    #[display("left")]
    Left,
    #[display("right")]
    Right,
}

impl Direction {
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid direction {input:?}, expected one of up, down, left, right")]
pub struct InvalidDirectionError {
    input: String,
}

impl InvalidDirectionError {
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }
}

/// Accepts the full names, their initials and the WASD / vi-key letters,
/// ignoring case and surrounding whitespace.
///
/// ```
/// use tilemerge_engine::Direction;
///
/// assert_eq!("Left".parse(), Ok(Direction::Left));
/// assert_eq!(" k ".parse(), Ok(Direction::Up));
/// assert!("north".parse::<Direction>().is_err());
/// ```
impl FromStr for Direction {
    type Err = InvalidDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let direction = match s.trim().to_ascii_lowercase().as_str() {
            "up" | "u" | "w" | "k" => Self::Up,
            "down" | "d" | "s" | "j" => Self::Down,
            "left" | "l" | "a" | "h" => Self::Left,
            "right" | "r" => Self::Right,
            _ => {
                return Err(InvalidDirectionError {
                    input: s.to_owned(),
                });
            }
        };
        Ok(direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        for (input, expected) in [
            ("up", Direction::Up),
            ("W", Direction::Up),
            ("down", Direction::Down),
            ("j", Direction::Down),
            ("LEFT", Direction::Left),
            ("h", Direction::Left),
            ("right", Direction::Right),
            ("r", Direction::Right),
        ] {
            assert_eq!(input.parse::<Direction>(), Ok(expected), "input {input:?}");
        }
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "diagonal".parse::<Direction>().unwrap_err();
        assert_eq!(err.input(), "diagonal");
        assert!("".parse::<Direction>().is_err());
    }

    #[test]
    fn test_display_roundtrips_through_parse() {
        for direction in Direction::ALL {
            assert_eq!(direction.to_string().parse::<Direction>(), Ok(direction));
        }
    }
}
