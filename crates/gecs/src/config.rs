//! World configuration.
//!
//! The entity table has a fixed capacity chosen when the [`World`] is built.
//! There is no growth path: every per-entity array (signatures, component
//! index maps) is sized once, so the capacity is a hard limit.
//!
//! [`World`]: crate::ecs::World

use serde::{Deserialize, Serialize};

use crate::error::{EcsError, Result};

/// Default number of entity slots.
pub const DEFAULT_ENTITY_CAPACITY: u32 = 10_000;

/// Construction-time settings for a [`World`](crate::ecs::World).
///
/// Derives serde so hosts can embed it in their own settings files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Maximum number of simultaneously alive entities.
    pub entity_capacity: u32,
}

impl WorldConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the entity capacity.
    pub fn entity_capacity(mut self, capacity: u32) -> Self {
        self.entity_capacity = capacity;
        self
    }

    /// Reject settings the world cannot be built with.
    pub fn validate(&self) -> Result<()> {
        if self.entity_capacity == 0 {
            return Err(EcsError::InvalidConfig(
                "entity_capacity must be at least 1".to_string(),
            ));
        }
        // `u32::MAX` is reserved for `Entity::INVALID`.
        if self.entity_capacity == u32::MAX {
            return Err(EcsError::InvalidConfig(format!(
                "entity_capacity must be below {}",
                u32::MAX
            )));
        }
        Ok(())
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            entity_capacity: DEFAULT_ENTITY_CAPACITY,
        }
    }
}
