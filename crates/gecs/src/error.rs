//! # Errors
//!
//! Every precondition the core checks is reported through [`EcsError`] instead
//! of an assertion. The variants fall into two families:
//!
//! - **Programmer errors**: the caller broke a contract (inserting a
//!   component twice, reading one that isn't there, releasing a stale handle).
//! - **Resource exhaustion**: a fixed limit was hit (entity pool full, too
//!   many component types).
//!
//! Nothing in the core retries; the error goes straight back to the call that
//! detected it.

use thiserror::Error;

use crate::ecs::entity::Entity;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EcsError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EcsError {
    /// The entity already owns a component of this type.
    #[error("entity {entity} already has a `{component}` component")]
    ComponentAlreadyPresent {
        entity: Entity,
        component: &'static str,
    },

    /// The entity does not own a component of this type.
    #[error("entity {entity} has no `{component}` component")]
    MissingComponent {
        entity: Entity,
        component: &'static str,
    },

    /// The handle refers to a destroyed (or never created) entity.
    #[error("entity {0} is not alive")]
    DeadEntity(Entity),

    /// A handle was released twice, or never belonged to this pool.
    #[error("handle {index}v{generation} is stale")]
    StaleHandle { index: u32, generation: u32 },

    #[error("system `{0}` is already registered")]
    SystemAlreadyRegistered(&'static str),

    #[error("system `{0}` is not registered")]
    SystemNotRegistered(&'static str),

    /// Every slot of the fixed-capacity entity pool is in use.
    #[error("entity pool exhausted (capacity {capacity})")]
    EntityPoolExhausted { capacity: u32 },

    /// Registering `component` would exceed the component type limit.
    #[error("cannot register `{component}`: limit of {max} component types reached")]
    TooManyComponentTypes { component: &'static str, max: usize },

    #[error("invalid world configuration: {0}")]
    InvalidConfig(String),
}

impl EcsError {
    /// Returns `true` for errors caused by hitting a fixed limit rather than a
    /// violated precondition.
    pub fn is_resource_exhaustion(&self) -> bool {
        matches!(
            self,
            EcsError::EntityPoolExhausted { .. } | EcsError::TooManyComponentTypes { .. }
        )
    }
}
