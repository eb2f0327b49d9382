//! # Signature — Component Sets as Bitsets
//!
//! A [`Signature`] has one bit per [`ComponentTypeId`]. It is used two ways:
//!
//! - per entity: bit `i` is set iff the entity owns a component of type `i`;
//! - per system: bit `i` is set iff the system requires type `i`.
//!
//! A system is interested in an entity iff
//! `(entity & required) == required`, see [`Signature::contains_all`].

use std::fmt;

use super::registry::{ComponentTypeId, MAX_COMPONENTS};

const WORDS: usize = MAX_COMPONENTS.div_ceil(64);

/// Fixed-width bitset over component type ids.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Signature {
    bits: [u64; WORDS],
}

impl Signature {
    /// The empty signature.
    pub const EMPTY: Signature = Signature { bits: [0; WORDS] };

    pub fn new() -> Self {
        Self::EMPTY
    }

    pub fn set(&mut self, id: ComponentTypeId) {
        let i = id.index();
        self.bits[i / 64] |= 1u64 << (i % 64);
    }

    pub fn clear(&mut self, id: ComponentTypeId) {
        let i = id.index();
        self.bits[i / 64] &= !(1u64 << (i % 64));
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, id: ComponentTypeId) -> Self {
        self.set(id);
        self
    }

    pub fn contains(&self, id: ComponentTypeId) -> bool {
        let i = id.index();
        self.bits[i / 64] & (1u64 << (i % 64)) != 0
    }

    /// `true` iff every bit set in `required` is also set in `self`.
    pub fn contains_all(&self, required: &Signature) -> bool {
        self.bits
            .iter()
            .zip(&required.bits)
            .all(|(have, need)| have & need == *need)
    }

    pub fn reset(&mut self) {
        self.bits = [0; WORDS];
    }

    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|w| *w == 0)
    }

    /// Number of set bits.
    pub fn count(&self) -> u32 {
        self.bits.iter().map(|w| w.count_ones()).sum()
    }

    /// Iterate the ids of set bits in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = ComponentTypeId> + '_ {
        (0..MAX_COMPONENTS as u32)
            .map(ComponentTypeId)
            .filter(|id| self.contains(*id))
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(|id| id.0)).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(i: u32) -> ComponentTypeId {
        ComponentTypeId(i)
    }

    #[test]
    fn set_and_clear() {
        let mut sig = Signature::new();
        sig.set(id(3));
        sig.set(id(127));
        assert!(sig.contains(id(3)));
        assert!(sig.contains(id(127)));
        assert!(!sig.contains(id(64)));
        assert_eq!(sig.count(), 2);

        sig.clear(id(3));
        assert!(!sig.contains(id(3)));
        sig.reset();
        assert!(sig.is_empty());
    }

    #[test]
    fn superset_test() {
        let entity = Signature::new().with(id(0)).with(id(1)).with(id(70));
        let system = Signature::new().with(id(0)).with(id(70));
        assert!(entity.contains_all(&system));
        assert!(!system.contains_all(&entity));
        assert!(entity.contains_all(&Signature::EMPTY));
    }

    #[test]
    fn iter_ascending() {
        let sig = Signature::new().with(id(65)).with(id(2));
        let ids: Vec<_> = sig.iter().map(|i| i.index()).collect();
        assert_eq!(ids, vec![2, 65]);
        assert_eq!(format!("{sig:?}"), "{2, 65}");
    }
}
