//! Generational slot map keyed by [`AdapterId`].
//!
//! Removing an entry bumps its slot's generation, so a stale id stops
//! resolving instead of silently pointing at the next adapter stored in the
//! same slot. Iteration is in slot order, which keeps fan-out deterministic.

use splitrisk_types::{AdapterId, Result, SplitRiskError};

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Arena of `T` addressed by generational [`AdapterId`]s.
#[derive(Debug)]
pub struct SlotMap<T> {
    slots: Vec<Slot<T>>,
    /// Vacant slot indices, reused LIFO.
    free: Vec<u32>,
    len: usize,
}

impl<T> SlotMap<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Store `value` and return its handle.
    ///
    /// # Errors
    /// Returns [`SplitRiskError::ArithmeticOverflow`] once every `u32` slot
    /// index is in use. The map is left unchanged.
    pub fn insert(&mut self, value: T) -> Result<AdapterId> {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            self.len += 1;
            return Ok(AdapterId::new(index, slot.generation));
        }
        let index = Self::next_index(self.slots.len())?;
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        self.len += 1;
        Ok(AdapterId::new(index, 0))
    }

    fn next_index(allocated: usize) -> Result<u32> {
        u32::try_from(allocated).map_err(|_| SplitRiskError::ArithmeticOverflow {
            context: "adapter slot index",
        })
    }

    /// Remove and return the value behind `id`, if `id` is still live.
    pub fn remove(&mut self, id: AdapterId) -> Option<T> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;
        Some(value)
    }

    #[must_use]
    pub fn get(&self, id: AdapterId) -> Option<&T> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.value.as_ref())
    }

    #[must_use]
    pub fn contains(&self, id: AdapterId) -> bool {
        self.get(id).is_some()
    }

    /// Live entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (AdapterId, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            let value = slot.value.as_ref()?;
            let index = u32::try_from(index).ok()?;
            Some((AdapterId::new(index, slot.generation), value))
        })
    }

    /// Live entries in slot order, mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (AdapterId, &mut T)> {
        self.slots.iter_mut().enumerate().filter_map(|(index, slot)| {
            let generation = slot.generation;
            let value = slot.value.as_mut()?;
            let index = u32::try_from(index).ok()?;
            Some((AdapterId::new(index, generation), value))
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<T> Default for SlotMap<T> {
    fn default() -> Self {
        Self::new()
    }
}
