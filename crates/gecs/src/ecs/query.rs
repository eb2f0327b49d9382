//! # Query — Ad-Hoc Scans by Component Type
//!
//! A query asks "which entities have all of these components?" without
//! materializing anything:
//!
//! ```text
//! for e in world.query::<(Transform, Velocity)>() { ... }
//!
//! 1. Resolve each requested type to its store.
//! 2. Pick the smallest store as the driver.
//! 3. Walk the driver's dense entity list; keep entities every other
//!    requested store also contains (O(1) each).
//! ```
//!
//! Driving off the smallest store visits the fewest candidates; the result
//! set is the same whichever store drives.
//!
//! The iterator is single-pass and borrows the world immutably, so the world
//! cannot be structurally modified while a query is alive. Collect the
//! entities first if you need to mutate:
//!
//! ```ignore
//! let movers: Vec<Entity> = world.query::<(Transform, Velocity)>().collect();
//! for e in movers { ... }
//! ```
//!
//! Contrast with systems, whose member sets are maintained incrementally and
//! never rescanned.

use std::iter::FusedIterator;
use std::marker::PhantomData;

use super::component::ErasedStore;
use super::entity::Entity;
use super::registry::{ComponentTypeId, TypeRegistry};
use crate::error::Result;

/// A set of component types, written as a tuple: `(A,)`, `(A, B)`, ...
///
/// Implemented for tuples of up to 8 component types.
pub trait ComponentSet {
    /// Ids of every listed type, or `None` if any of them was never
    /// registered (and so cannot be stored by any entity).
    fn type_ids(registry: &TypeRegistry) -> Option<Vec<ComponentTypeId>>;

    /// Ids of every listed type, registering any that are new.
    fn register(registry: &mut TypeRegistry) -> Result<Vec<ComponentTypeId>>;
}

macro_rules! impl_component_set {
    ($($T:ident),+) => {
        impl<$($T: 'static + Send + Sync),+> ComponentSet for ($($T,)+) {
            fn type_ids(registry: &TypeRegistry) -> Option<Vec<ComponentTypeId>> {
                Some(vec![$(registry.id_of::<$T>()?),+])
            }

            fn register(registry: &mut TypeRegistry) -> Result<Vec<ComponentTypeId>> {
                Ok(vec![$(registry.register::<$T>()?),+])
            }
        }
    };
}

impl_component_set!(A);
impl_component_set!(A, B);
impl_component_set!(A, B, C);
impl_component_set!(A, B, C, D);
impl_component_set!(A, B, C, D, E);
impl_component_set!(A, B, C, D, E, F);
impl_component_set!(A, B, C, D, E, F, G);
impl_component_set!(A, B, C, D, E, F, G, H);

/// Lazy iterator over entities owning every component in `C`.
///
/// Created by [`World::query`](super::world::World::query).
pub struct Query<'w, C> {
    driver: &'w [Entity],
    others: Vec<&'w dyn ErasedStore>,
    cursor: usize,
    _marker: PhantomData<fn() -> C>,
}

impl<'w, C: ComponentSet> Query<'w, C> {
    /// Build a query over the requested stores. An empty list means some
    /// requested type has no store, so nothing can match.
    pub(crate) fn new(mut stores: Vec<&'w dyn ErasedStore>) -> Self {
        let smallest = stores
            .iter()
            .enumerate()
            .min_by_key(|(_, store)| store.component_count())
            .map(|(i, _)| i);
        let driver = match smallest {
            Some(i) => stores.swap_remove(i).owners(),
            None => &[],
        };
        Self {
            driver,
            others: stores,
            cursor: 0,
            _marker: PhantomData,
        }
    }

    /// Number of candidates the driver store still has to visit. An upper
    /// bound on the remaining matches.
    pub fn candidates(&self) -> usize {
        self.driver.len() - self.cursor
    }
}

impl<C: ComponentSet> Iterator for Query<'_, C> {
    type Item = Entity;

    fn next(&mut self) -> Option<Entity> {
        while let Some(&entity) = self.driver.get(self.cursor) {
            self.cursor += 1;
            if self.others.iter().all(|store| store.contains_entity(entity)) {
                return Some(entity);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.candidates()))
    }
}

impl<C: ComponentSet> FusedIterator for Query<'_, C> {}
