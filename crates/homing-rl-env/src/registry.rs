//! Named arena layouts

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use homing_rl_core::{RLError, Result};

use crate::arena::{ArenaConfig, Obstacle, SimulatedArena};

type LayoutConstructor = Box<dyn Fn() -> ArenaConfig + Send + Sync>;

lazy_static::lazy_static! {
    static ref REGISTRY: Arc<Mutex<ArenaRegistry>> = Arc::new(Mutex::new(ArenaRegistry::new()));
}

/// Global arena layout registry
pub struct ArenaRegistry {
    layouts: HashMap<String, LayoutConstructor>,
}

impl ArenaRegistry {
    /// Create a registry holding the built-in layouts
    fn new() -> Self {
        let mut registry = Self {
            layouts: HashMap::new(),
        };
        registry.register("open", ArenaConfig::default);
        registry.register("pillar", || ArenaConfig {
            obstacles: vec![Obstacle::new(-0.25, 0.15, 0.05)],
            ..ArenaConfig::default()
        });
        registry.register("cluttered", || ArenaConfig {
            obstacles: vec![
                Obstacle::new(-0.25, 0.15, 0.04),
                Obstacle::new(-0.15, -0.2, 0.05),
                Obstacle::new(0.25, 0.2, 0.06),
                Obstacle::new(-0.6, -0.1, 0.05),
                Obstacle::new(-0.35, 0.5, 0.04),
            ],
            ..ArenaConfig::default()
        });
        registry
    }

    /// Register a layout
    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F)
    where
        F: Fn() -> ArenaConfig + Send + Sync + 'static,
    {
        self.layouts.insert(name.into(), Box::new(constructor));
    }

    /// Arena description for a layout
    pub fn config(&self, name: &str) -> Result<ArenaConfig> {
        self.layouts
            .get(name)
            .map(|constructor| constructor())
            .ok_or_else(|| RLError::Environment(format!("Unknown arena layout: {name}")))
    }

    /// List registered layouts
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.layouts.keys().cloned().collect();
        names.sort();
        names
    }
}

fn with_registry<T>(f: impl FnOnce(&mut ArenaRegistry) -> T) -> Result<T> {
    let mut registry = REGISTRY
        .lock()
        .map_err(|_| RLError::Environment("arena registry poisoned".to_string()))?;
    Ok(f(&mut registry))
}

/// Register a layout globally
pub fn register_layout<F>(name: impl Into<String>, constructor: F) -> Result<()>
where
    F: Fn() -> ArenaConfig + Send + Sync + 'static,
{
    with_registry(|registry| registry.register(name, constructor))
}

/// Arena description for a registered layout
pub fn layout_config(name: &str) -> Result<ArenaConfig> {
    with_registry(|registry| registry.config(name))?
}

/// Build an arena from a registered layout, overriding its noise seed
pub fn make_arena(name: &str, seed: Option<u64>) -> Result<SimulatedArena> {
    let mut config = layout_config(name)?;
    if seed.is_some() {
        config.seed = seed;
    }
    SimulatedArena::new(config)
}

/// List all registered layouts
pub fn list_layouts() -> Result<Vec<String>> {
    with_registry(|registry| registry.list())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_layouts() {
        let names = list_layouts().unwrap();
        for name in ["cluttered", "open", "pillar"] {
            assert!(names.contains(&name.to_string()));
            make_arena(name, Some(1)).unwrap();
        }
        assert_eq!(layout_config("pillar").unwrap().obstacles.len(), 1);
    }

    #[test]
    fn test_unknown_layout() {
        assert!(matches!(make_arena("maze", None), Err(RLError::Environment(_))));
    }

    #[test]
    fn test_register_custom_layout() {
        register_layout("corridor", || ArenaConfig {
            half_size: 0.4,
            ..ArenaConfig::default()
        })
        .unwrap();
        assert_eq!(layout_config("corridor").unwrap().half_size, 0.4);
    }
}
