//! # Sparse-Set ECS Core
//!
//! Each component type lives in its own packed store; entities are
//! generational handles; systems keep an incrementally maintained set of the
//! entities they care about.
//!
//! ## Module Overview
//!
//! - [`pool`] — Fixed-capacity generational handle pool
//! - [`entity`] — Entity handles and the entity table
//! - [`registry`] — Dense component type ids
//! - [`component`] — Packed per-type storage with swap-remove
//! - [`signature`] — Component-set bitsets
//! - [`system`] — System trait and membership bookkeeping
//! - [`query`] — Lazy ad-hoc iteration
//! - [`world`] — The facade that ties it together

pub(crate) mod component;
pub mod entity;
pub mod pool;
pub(crate) mod query;
pub mod registry;
pub mod signature;
pub mod system;
pub mod world;

pub use component::ComponentStore;
pub use entity::Entity;
pub use pool::{GenerationalPool, Handle};
pub use query::{ComponentSet, Query};
pub use registry::{ComponentTypeId, MAX_COMPONENTS, TypeRegistry};
pub use signature::Signature;
pub use system::{System, SystemId};
pub use world::World;
