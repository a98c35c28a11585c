//! Continuous positions and their discretized Q-table keys

use std::fmt;

use serde::{Deserialize, Serialize};

/// Continuous (x, y) coordinates in arena space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Position {
    /// Create a new position
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another position
    #[must_use]
    pub fn distance_to(&self, other: &Position) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<(f64, f64)> for Position {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x={:.3}, y={:.3}", self.x, self.y)
    }
}

/// A grid cell: a position rounded to a fixed number of decimals.
///
/// Coordinates are kept as integer multiples of `10^-decimals`, so two
/// positions that round to the same cell always compare and hash equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct State {
    x: i64,
    y: i64,
    decimals: u8,
}

impl State {
    /// Grid index along x
    #[must_use]
    pub fn x_index(&self) -> i64 {
        self.x
    }

    /// Grid index along y
    #[must_use]
    pub fn y_index(&self) -> i64 {
        self.y
    }

    /// Center of the cell in arena coordinates
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn center(&self) -> Position {
        let scale = 10f64.powi(i32::from(self.decimals));
        Position::new(self.x as f64 / scale, self.y as f64 / scale)
    }

    /// Stringified key used in the persisted table, e.g. `"-0.50,0.30"`
    #[must_use]
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let center = self.center();
        let decimals = usize::from(self.decimals);
        write!(f, "{:.*},{:.*}", decimals, center.x, decimals, center.y)
    }
}

/// Most decimals a discretizer can keep before grid indices overflow `i64`
pub const MAX_DECIMALS: u8 = 9;

/// Maps continuous positions onto grid cells.
///
/// Exact halfway values round to the even neighbor, so `0.125` lands in
/// the `0.12` cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discretizer {
    /// Number of decimals kept per coordinate
    pub decimals: u8,
}

impl Default for Discretizer {
    fn default() -> Self {
        Self { decimals: 2 }
    }
}

impl Discretizer {
    /// Create a discretizer keeping `decimals` decimals
    #[must_use]
    pub fn new(decimals: u8) -> Self {
        Self { decimals }
    }

    /// Round a position to its grid cell
    #[must_use]
    pub fn discretize(&self, position: Position) -> State {
        State {
            x: self.quantize(position.x),
            y: self.quantize(position.y),
            decimals: self.decimals,
        }
    }

    /// Parse a stringified key (`"x,y"`) back into a state
    pub fn parse_key(&self, key: &str) -> crate::Result<State> {
        let invalid = || crate::RLError::InvalidState(key.to_string());
        let (x, y) = key.split_once(',').ok_or_else(invalid)?;
        let x: f64 = x.trim().parse().map_err(|_| invalid())?;
        let y: f64 = y.trim().parse().map_err(|_| invalid())?;
        if !x.is_finite() || !y.is_finite() {
            return Err(invalid());
        }
        Ok(self.discretize(Position::new(x, y)))
    }

    #[allow(clippy::cast_possible_truncation)]
    fn quantize(&self, value: f64) -> i64 {
        let scale = 10f64.powi(i32::from(self.decimals));
        (value * scale).round_ties_even() as i64
    }
}
