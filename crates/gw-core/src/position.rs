use std::fmt;

use serde::{Deserialize, Serialize};

/// A grid cell: `x` is the column, `y` is the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    /// Column index.
    pub x: i32,
    /// Row index.
    pub y: i32,
}

impl Position {
    /// Create a position from a column and a row.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Return the position shifted by `dx` columns and `dy` rows.
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Squared Euclidean distance, used for nearest-entity queries.
    pub fn distance_squared(self, other: Position) -> i64 {
        let dx = i64::from(self.x) - i64::from(other.x);
        let dy = i64::from(self.y) - i64::from(other.y);
        dx * dx + dy * dy
    }

    /// True when `other` is exactly one step away along a single axis.
    /// Diagonal neighbours are not adjacent.
    pub fn adjacent(self, other: Position) -> bool {
        (self.x == other.x && (self.y - other.y).abs() == 1)
            || (self.y == other.y && (self.x - other.x).abs() == 1)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
