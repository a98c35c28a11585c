//! The closed set of motion primitives and their wheel commands

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Left/right wheel velocity command
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WheelSpeeds {
    /// Left wheel velocity
    pub left: f64,
    /// Right wheel velocity
    pub right: f64,
}

impl WheelSpeeds {
    /// Both wheels stopped
    pub const STOP: Self = Self { left: 0.0, right: 0.0 };

    /// Create a new wheel command
    #[must_use]
    pub fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }
}

impl std::ops::Neg for WheelSpeeds {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self {
            left: -self.left,
            right: -self.right,
        }
    }
}

/// One of the four motion primitives available to the agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    /// Both wheels forward
    Forward,
    /// Spin counter-clockwise in place
    Left,
    /// Spin clockwise in place
    Right,
    /// Both wheels backward
    Backward,
}

impl Action {
    /// Every action, in the enumeration order used for probing and tie-breaks
    pub const ALL: [Action; 4] = [Action::Forward, Action::Left, Action::Right, Action::Backward];

    /// Number of actions
    pub const COUNT: usize = Self::ALL.len();

    /// Short name used in persisted tables and paths
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Action::Forward => "F",
            Action::Left => "L",
            Action::Right => "R",
            Action::Backward => "B",
        }
    }

    /// Position of this action in [`Action::ALL`]
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Action::Forward => 0,
            Action::Left => 1,
            Action::Right => 2,
            Action::Backward => 3,
        }
    }

    /// Wheel command for this action at the given speed
    #[must_use]
    pub fn wheel_speeds(self, speed: f64) -> WheelSpeeds {
        match self {
            Action::Forward => WheelSpeeds::new(speed, speed),
            Action::Left => WheelSpeeds::new(-speed, speed),
            Action::Right => WheelSpeeds::new(speed, -speed),
            Action::Backward => WheelSpeeds::new(-speed, -speed),
        }
    }

    /// Sample an action uniformly at random
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::COUNT)]
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Action {
    type Err = crate::RLError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.name() == s)
            .ok_or_else(|| crate::RLError::InvalidAction(s.to_string()))
    }
}

impl Serialize for Action {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Action {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}
