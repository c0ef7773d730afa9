/// A slot that can be handed out again once it goes inactive.
pub trait Poolable {
    fn is_free(&self) -> bool;
}

/// Fixed-capacity arena of reusable slots.
///
/// Slots are allocated once. Acquisition is a first-fit scan from index 0, so the
/// lowest free index always wins; callers reset the slot they get back. A full
/// pool hands out nothing and the request is simply dropped.
#[derive(Debug, Clone)]
pub struct Pool<T> {
    slots: Vec<T>,
}

impl<T: Poolable> Pool<T> {
    pub fn new(capacity: usize, mut make: impl FnMut(usize) -> T) -> Self {
        Self {
            slots: (0..capacity).map(&mut make).collect(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// First free slot, with its index.
    pub fn acquire(&mut self) -> Option<(usize, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .find(|(_, slot)| slot.is_free())
    }

    /// First adjacent pair `(2k, 2k + 1)` where both slots are free.
    pub fn acquire_pair(&mut self) -> Option<(usize, &mut T, &mut T)> {
        self.slots
            .chunks_exact_mut(2)
            .enumerate()
            .find_map(|(k, pair)| match pair {
                [a, b] if a.is_free() && b.is_free() => Some((k * 2, a, b)),
                _ => None,
            })
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|slot| !slot.is_free()).count()
    }

    pub fn active_indices(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| !slot.is_free())
            .map(|(index, _)| index)
            .collect()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.slots.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.slots.iter_mut()
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.slots
    }
}
