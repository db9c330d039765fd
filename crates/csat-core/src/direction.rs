#![forbid(unsafe_code)]

//! Resize direction codes.
//!
//! The host speaks in short codes: `""` for a move and any combination of
//! `u`, `d`, `l`, `r` for a resize (`ul`, `ur`, `ld`, `rd` for corners).
//! Only one vertical and one horizontal edge ever take effect; `u` wins over
//! `d` and `l` wins over `r` when both are present.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;

bitflags! {
    /// Edges grabbed by a gesture. Empty means "move the whole panel".
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Direction: u8 {
        const UP = 0b0001;
        const DOWN = 0b0010;
        const LEFT = 0b0100;
        const RIGHT = 0b1000;
    }
}

/// Which vertical edge a direction moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalEdge {
    Top,
    Bottom,
}

/// Which horizontal edge a direction moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalEdge {
    Left,
    Right,
}

impl Direction {
    pub const UP_LEFT: Self = Self::UP.union(Self::LEFT);
    pub const UP_RIGHT: Self = Self::UP.union(Self::RIGHT);
    pub const DOWN_LEFT: Self = Self::DOWN.union(Self::LEFT);
    pub const DOWN_RIGHT: Self = Self::DOWN.union(Self::RIGHT);

    /// Parse a host direction code.
    pub fn from_code(code: &str) -> Result<Self, ParseDirectionError> {
        code.chars().try_fold(Self::empty(), |acc, c| {
            let edge = match c {
                'u' => Self::UP,
                'd' => Self::DOWN,
                'l' => Self::LEFT,
                'r' => Self::RIGHT,
                other => {
                    return Err(ParseDirectionError {
                        code: code.to_string(),
                        offending: other,
                    });
                }
            };
            Ok(acc | edge)
        })
    }

    /// Whether this is a pure move.
    #[inline]
    pub const fn is_move(self) -> bool {
        self.is_empty()
    }

    /// The vertical edge that takes effect, if any.
    pub const fn vertical(self) -> Option<VerticalEdge> {
        if self.contains(Self::UP) {
            Some(VerticalEdge::Top)
        } else if self.contains(Self::DOWN) {
            Some(VerticalEdge::Bottom)
        } else {
            None
        }
    }

    /// The horizontal edge that takes effect, if any.
    pub const fn horizontal(self) -> Option<HorizontalEdge> {
        if self.contains(Self::LEFT) {
            Some(HorizontalEdge::Left)
        } else if self.contains(Self::RIGHT) {
            Some(HorizontalEdge::Right)
        } else {
            None
        }
    }

    /// Canonical code (`u`/`d` first, then `l`/`r`; corners `ld`, `rd` keep
    /// the host's spelling).
    #[must_use]
    pub fn code(self) -> String {
        let vertical = match self.vertical() {
            Some(VerticalEdge::Top) => "u",
            Some(VerticalEdge::Bottom) => "d",
            None => "",
        };
        let horizontal = match self.horizontal() {
            Some(HorizontalEdge::Left) => "l",
            Some(HorizontalEdge::Right) => "r",
            None => "",
        };
        match (vertical, horizontal) {
            ("d", h) if !h.is_empty() => format!("{h}d"),
            (v, h) => format!("{v}{h}"),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code())
    }
}

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s)
    }
}

/// A direction code contained a character outside `{u, d, l, r}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDirectionError {
    pub code: String,
    pub offending: char,
}

impl fmt::Display for ParseDirectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid direction code {:?}: unexpected {:?}",
            self.code, self.offending
        )
    }
}

impl std::error::Error for ParseDirectionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_code_is_move() {
        let direction = Direction::from_code("").unwrap();
        assert!(direction.is_move());
        assert_eq!(direction.vertical(), None);
        assert_eq!(direction.horizontal(), None);
    }

    #[test]
    fn host_codes_round_trip() {
        for code in ["u", "d", "l", "r", "ul", "ur", "ld", "rd"] {
            let direction: Direction = code.parse().unwrap();
            assert_eq!(direction.code(), code, "code {code}");
        }
        assert_eq!(Direction::from_code("dr").unwrap(), Direction::DOWN_RIGHT);
        assert_eq!(Direction::from_code("lu").unwrap(), Direction::UP_LEFT);
    }

    #[test]
    fn opposing_edges_resolve_to_one_per_axis() {
        let direction = Direction::from_code("udlr").unwrap();
        assert_eq!(direction.vertical(), Some(VerticalEdge::Top));
        assert_eq!(direction.horizontal(), Some(HorizontalEdge::Left));
        assert_eq!(direction.code(), "ul");
    }

    #[test]
    fn unknown_character_is_rejected() {
        let err = Direction::from_code("ux").unwrap_err();
        assert_eq!(err.offending, 'x');
        assert!(err.to_string().contains("ux"));
    }
}
