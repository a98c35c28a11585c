//! A synthetic square arena with an e-puck-like differential-drive robot

use std::f64::consts::PI;
use std::path::Path;

use async_trait::async_trait;
use homing_rl_core::{EnvironmentAdapter, Pose, Position, RLError, Result, WheelSpeeds};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Normal;
use serde::{Deserialize, Serialize};

/// Sensor bearings relative to the heading, ps0 through ps7
pub const SENSOR_BEARINGS: [f64; 8] = [-0.30, -0.80, -PI / 2.0, -2.64, 2.64, PI / 2.0, 0.80, 0.30];

/// Distance (m) to raw reading lookup for a single proximity sensor
const PROXIMITY_LOOKUP: [(f64, f64); 10] = [
    (0.000, 4095.0),
    (0.005, 2133.33),
    (0.010, 1465.73),
    (0.015, 601.46),
    (0.020, 383.84),
    (0.030, 234.93),
    (0.040, 158.03),
    (0.050, 120.0),
    (0.060, 104.09),
    (0.070, 67.19),
];

/// A round obstacle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Center of the obstacle
    pub center: Position,
    /// Radius in meters
    pub radius: f64,
}

impl Obstacle {
    /// Create a new obstacle
    #[must_use]
    pub fn new(x: f64, y: f64, radius: f64) -> Self {
        Self {
            center: Position::new(x, y),
            radius,
        }
    }
}

/// Arena geometry, robot dimensions, and noise levels
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Half the side of the square arena; walls sit at ±`half_size`
    pub half_size: f64,
    /// Wheel radius (m)
    pub wheel_radius: f64,
    /// Distance between the wheels (m)
    pub axle_length: f64,
    /// Body radius used for collisions and sensor placement (m)
    pub robot_radius: f64,
    /// Simulated seconds per tick
    pub time_step: f64,
    /// Wheel speeds are clamped to ±this (rad/s)
    pub max_wheel_speed: f64,
    /// Pose the robot is placed at on creation
    pub start: Pose,
    /// Round obstacles
    pub obstacles: Vec<Obstacle>,
    /// Standard deviation of GPS noise (m); 0 disables
    pub position_noise: f64,
    /// Standard deviation of proximity noise (raw units); 0 disables
    pub sensor_noise: f64,
    /// Noise seed
    pub seed: Option<u64>,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            half_size: 1.0,
            wheel_radius: 0.0205,
            axle_length: 0.052,
            robot_radius: 0.037,
            time_step: 0.032,
            max_wheel_speed: 6.28,
            start: Pose::default(),
            obstacles: Vec::new(),
            position_noise: 0.0,
            sensor_noise: 0.0,
            seed: None,
        }
    }
}

impl ArenaConfig {
    /// Read an arena description from JSON
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    fn validate(&self) -> Result<()> {
        let positive = [
            ("half_size", self.half_size),
            ("wheel_radius", self.wheel_radius),
            ("axle_length", self.axle_length),
            ("robot_radius", self.robot_radius),
            ("time_step", self.time_step),
            ("max_wheel_speed", self.max_wheel_speed),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(RLError::InvalidConfig(format!(
                    "arena {name} must be positive, got {value}"
                )));
            }
        }
        if self.position_noise < 0.0 || self.sensor_noise < 0.0 {
            return Err(RLError::InvalidConfig(
                "arena noise levels must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Ticked simulation of one robot in an [`ArenaConfig`]
#[derive(Debug, Clone)]
pub struct SimulatedArena {
    config: ArenaConfig,
    pose: Pose,
    wheels: WheelSpeeds,
    ticks: u64,
    rng: StdRng,
    gps_noise: Option<Normal<f64>>,
    proximity_noise: Option<Normal<f64>>,
}

impl SimulatedArena {
    /// Build the arena and place the robot at the configured start pose
    pub fn new(config: ArenaConfig) -> Result<Self> {
        config.validate()?;
        if collides(&config, config.start.position) {
            return Err(RLError::InvalidConfig(format!(
                "start pose {} overlaps an obstacle or wall",
                config.start.position
            )));
        }
        let rng = config
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);

        Ok(Self {
            pose: config.start,
            wheels: WheelSpeeds::STOP,
            ticks: 0,
            rng,
            gps_noise: noise(config.position_noise)?,
            proximity_noise: noise(config.sensor_noise)?,
            config,
        })
    }

    /// The arena description
    #[must_use]
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Exact pose, without GPS noise
    #[must_use]
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Wheel command currently in force
    #[must_use]
    pub fn wheels(&self) -> WheelSpeeds {
        self.wheels
    }

    /// Ticks simulated so far
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Noise-free proximity readings for the current pose
    #[must_use]
    pub fn exact_proximity(&self) -> Vec<f64> {
        SENSOR_BEARINGS
            .iter()
            .map(|bearing| {
                let angle = self.pose.heading + bearing;
                let dir = (angle.cos(), angle.sin());
                let origin = Position::new(
                    self.pose.position.x + self.config.robot_radius * dir.0,
                    self.pose.position.y + self.config.robot_radius * dir.1,
                );
                proximity_reading(self.nearest_hit(origin, dir))
            })
            .collect()
    }

    fn nearest_hit(&self, origin: Position, dir: (f64, f64)) -> f64 {
        self.config
            .obstacles
            .iter()
            .filter_map(|obstacle| ray_circle(origin, dir, obstacle))
            .fold(ray_walls(origin, dir, self.config.half_size), f64::min)
    }

    /// Integrate one tick of differential-drive motion
    fn step(&mut self) {
        let max = self.config.max_wheel_speed;
        let left = self.wheels.left.clamp(-max, max) * self.config.wheel_radius;
        let right = self.wheels.right.clamp(-max, max) * self.config.wheel_radius;
        let dt = self.config.time_step;

        let linear = (left + right) / 2.0 * dt;
        let rotation = (right - left) / self.config.axle_length * dt;
        let mid_heading = self.pose.heading + rotation / 2.0;

        let next = Position::new(
            self.pose.position.x + linear * mid_heading.cos(),
            self.pose.position.y + linear * mid_heading.sin(),
        );
        if !collides(&self.config, next) {
            self.pose.position = next;
        }
        self.pose.heading = normalize_angle(self.pose.heading + rotation);
        self.ticks += 1;
    }
}

#[async_trait]
impl EnvironmentAdapter for SimulatedArena {
    async fn sample_position(&mut self) -> Result<Position> {
        let mut position = self.pose.position;
        if let Some(normal) = self.gps_noise {
            position.x += self.rng.sample(normal);
            position.y += self.rng.sample(normal);
        }
        Ok(position)
    }

    async fn sample_proximity(&mut self) -> Result<Vec<f64>> {
        let mut readings = self.exact_proximity();
        if let Some(normal) = self.proximity_noise {
            for reading in &mut readings {
                *reading = (*reading + self.rng.sample(normal)).clamp(0.0, 4095.0);
            }
        }
        Ok(readings)
    }

    async fn actuate(&mut self, speeds: WheelSpeeds) -> Result<()> {
        if !speeds.left.is_finite() || !speeds.right.is_finite() {
            return Err(RLError::InvalidAction(format!(
                "non-finite wheel command ({}, {})",
                speeds.left, speeds.right
            )));
        }
        self.wheels = speeds;
        Ok(())
    }

    async fn advance_tick(&mut self) -> Result<bool> {
        self.step();
        Ok(true)
    }

    async fn get_pose(&mut self) -> Result<Pose> {
        Ok(self.pose)
    }

    async fn set_pose(&mut self, pose: Pose) -> Result<()> {
        if collides(&self.config, pose.position) {
            return Err(RLError::InvalidState(format!(
                "pose {} overlaps an obstacle or wall",
                pose.position
            )));
        }
        self.pose = Pose::new(pose.position, normalize_angle(pose.heading));
        Ok(())
    }
}

fn noise(std_dev: f64) -> Result<Option<Normal<f64>>> {
    if std_dev == 0.0 {
        return Ok(None);
    }
    Normal::new(0.0, std_dev)
        .map(Some)
        .map_err(|e| RLError::InvalidConfig(format!("noise level {std_dev}: {e}")))
}

/// Whether a robot centered at `position` would overlap a wall or obstacle
fn collides(config: &ArenaConfig, position: Position) -> bool {
    let limit = config.half_size - config.robot_radius;
    if position.x.abs() > limit || position.y.abs() > limit {
        return true;
    }
    config
        .obstacles
        .iter()
        .any(|obstacle| position.distance_to(&obstacle.center) < obstacle.radius + config.robot_radius)
}

/// Distance along a unit ray to the first intersection with `obstacle`
fn ray_circle(origin: Position, dir: (f64, f64), obstacle: &Obstacle) -> Option<f64> {
    let ox = origin.x - obstacle.center.x;
    let oy = origin.y - obstacle.center.y;
    let b = ox * dir.0 + oy * dir.1;
    let c = ox * ox + oy * oy - obstacle.radius * obstacle.radius;
    if c <= 0.0 {
        return Some(0.0);
    }
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let t = -b - discriminant.sqrt();
    (t >= 0.0).then_some(t)
}

/// Distance along a unit ray to the arena walls
fn ray_walls(origin: Position, dir: (f64, f64), half_size: f64) -> f64 {
    let axis = |o: f64, d: f64| {
        if d > 0.0 {
            (half_size - o) / d
        } else if d < 0.0 {
            (-half_size - o) / d
        } else {
            f64::INFINITY
        }
    };
    axis(origin.x, dir.0).min(axis(origin.y, dir.1)).max(0.0)
}

/// Raw sensor value for an object `distance` meters away
fn proximity_reading(distance: f64) -> f64 {
    let distance = distance.max(0.0);
    for pair in PROXIMITY_LOOKUP.windows(2) {
        let ((d0, v0), (d1, v1)) = (pair[0], pair[1]);
        if distance <= d1 {
            return v0 + (v1 - v0) * (distance - d0) / (d1 - d0);
        }
    }
    0.0
}

fn normalize_angle(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(2.0 * PI) - PI;
    if wrapped <= -PI {
        wrapped + 2.0 * PI
    } else {
        wrapped
    }
}
