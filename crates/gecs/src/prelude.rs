//! Convenience re-exports: `use gecs::prelude::*`.

pub use crate::config::WorldConfig;
pub use crate::ecs::{ComponentSet, Entity, Query, Signature, System, SystemId, TypeRegistry, World};
pub use crate::error::{EcsError, Result};

#[cfg(feature = "diagnostics")]
pub use crate::diag::WorldStats;
