//! # gecs — Entity/Component Storage Core
//!
//! The bookkeeping heart of a data-oriented game runtime: generational entity
//! handles, packed per-type component storage, and systems whose member sets
//! stay in sync with every structural change.
//!
//! Start with `use gecs::prelude::*` and create a [`World`](ecs::World).

pub mod config;
pub mod ecs;
pub mod error;
pub mod prelude;

#[cfg(feature = "diagnostics")]
pub mod diag;
