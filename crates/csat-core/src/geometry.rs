#![forbid(unsafe_code)]

//! Grid geometry: placements, CSS-style grid areas and cell snapping.
//!
//! Coordinates are 1-based grid lines. A span of [`SPAN_TO_END`] means "extend
//! to the far edge of the grid"; it is carried through unchanged and never
//! resolved here.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::pointer::PointerPosition;

/// Span sentinel meaning "extend to the last grid line".
pub const SPAN_TO_END: i32 = -1;

/// Rectangle on the 1-indexed editor grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Placement {
    /// First column (1-based).
    pub x: i32,
    /// First row (1-based).
    pub y: i32,
    /// Column span, or [`SPAN_TO_END`].
    pub w: i32,
    /// Row span, or [`SPAN_TO_END`].
    pub h: i32,
}

impl Placement {
    /// Create a new placement.
    #[inline]
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Grid area this placement occupies.
    #[inline]
    pub const fn grid_area(&self) -> GridArea {
        placement_from_rect(self.x, self.y, self.w, self.h)
    }

    /// Whether the origin lies inside the grid (both coordinates >= 1).
    #[inline]
    pub const fn has_valid_origin(&self) -> bool {
        self.x >= 1 && self.y >= 1
    }

    /// Whether the width extends to the far edge.
    #[inline]
    pub const fn spans_to_end_horizontally(&self) -> bool {
        self.w == SPAN_TO_END
    }

    /// Whether the height extends to the far edge.
    #[inline]
    pub const fn spans_to_end_vertically(&self) -> bool {
        self.h == SPAN_TO_END
    }

    /// Row just below this placement (`y + h`), ignoring the end sentinel.
    #[inline]
    pub const fn row_below(&self) -> i32 {
        self.y.saturating_add(self.h)
    }
}

/// One end of a grid track, either a concrete line or the far edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridLine {
    Line(i32),
    End,
}

impl fmt::Display for GridLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Line(line) => write!(f, "{line}"),
            Self::End => f.write_str("-1"),
        }
    }
}

/// Grid-area descriptor consumed by the rendering layer.
///
/// Textual form is `row-start / column-start / row-end / column-end`, the
/// same order CSS `grid-area` uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridArea {
    pub row_start: i32,
    pub column_start: i32,
    pub row_end: GridLine,
    pub column_end: GridLine,
}

impl GridArea {
    /// Rebuild the placement this area was derived from.
    ///
    /// Exact inverse of [`placement_from_rect`] for every span other than the
    /// end sentinel, which maps back to [`SPAN_TO_END`].
    #[must_use]
    pub const fn to_placement(&self) -> Placement {
        let w = match self.column_end {
            GridLine::Line(end) => end.wrapping_sub(self.column_start),
            GridLine::End => SPAN_TO_END,
        };
        let h = match self.row_end {
            GridLine::Line(end) => end.wrapping_sub(self.row_start),
            GridLine::End => SPAN_TO_END,
        };
        Placement::new(self.column_start, self.row_start, w, h)
    }
}

impl fmt::Display for GridArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {} / {} / {}",
            self.row_start, self.column_start, self.row_end, self.column_end
        )
    }
}

impl FromStr for GridArea {
    type Err = ParseGridAreaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(ParseGridAreaError::WrongPartCount { found: parts.len() });
        }
        let number = |part: &str| {
            part.parse::<i32>()
                .map_err(|_| ParseGridAreaError::InvalidNumber {
                    part: part.to_string(),
                })
        };
        let end = |part: &str| {
            number(part).map(|line| {
                if line == SPAN_TO_END {
                    GridLine::End
                } else {
                    GridLine::Line(line)
                }
            })
        };
        Ok(Self {
            row_start: number(parts[0])?,
            column_start: number(parts[1])?,
            row_end: end(parts[2])?,
            column_end: end(parts[3])?,
        })
    }
}

/// Error returned when a grid-area string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseGridAreaError {
    WrongPartCount { found: usize },
    InvalidNumber { part: String },
}

impl fmt::Display for ParseGridAreaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongPartCount { found } => {
                write!(f, "grid area needs 4 '/'-separated lines (got {found})")
            }
            Self::InvalidNumber { part } => write!(f, "invalid grid line: {part:?}"),
        }
    }
}

impl std::error::Error for ParseGridAreaError {}

/// Convert a rectangle into the grid area it covers.
///
/// Total and pure: malformed spans (zero, negative other than the sentinel)
/// pass straight through into the end lines.
#[must_use]
pub const fn placement_from_rect(x: i32, y: i32, w: i32, h: i32) -> GridArea {
    let column_end = if w == SPAN_TO_END {
        GridLine::End
    } else {
        GridLine::Line(x.wrapping_add(w))
    };
    let row_end = if h == SPAN_TO_END {
        GridLine::End
    } else {
        GridLine::Line(y.wrapping_add(h))
    };
    GridArea {
        row_start: y,
        column_start: x,
        row_end,
        column_end,
    }
}

/// Whole-cell pointer displacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellDelta {
    pub dx: i32,
    pub dy: i32,
}

/// Fixed pixel pitch of the editor grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridMetrics {
    pub column_gap: f64,
    pub column_width: f64,
    pub row_gap: f64,
    pub row_height: f64,
}

impl Default for GridMetrics {
    fn default() -> Self {
        Self {
            column_gap: 10.0,
            column_width: 100.0,
            row_gap: 10.0,
            row_height: 30.0,
        }
    }
}

impl GridMetrics {
    /// Horizontal distance between two column starts.
    #[inline]
    pub fn column_pitch(&self) -> f64 {
        self.column_gap + self.column_width
    }

    /// Vertical distance between two row starts.
    #[inline]
    pub fn row_pitch(&self) -> f64 {
        self.row_gap + self.row_height
    }

    /// Snap the pixel displacement from `origin` to `pointer` to whole cells.
    #[must_use]
    pub fn snap(&self, origin: PointerPosition, pointer: PointerPosition) -> CellDelta {
        CellDelta {
            dx: round_half_up((pointer.x - origin.x) / self.column_pitch()),
            dy: round_half_up((pointer.y - origin.y) / self.row_pitch()),
        }
    }
}

// Halves round toward +infinity, matching the host's `Math.round`.
fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}
