use std::{
    num::NonZeroUsize,
    ops::{Index, IndexMut},
};

pub type Idx = NonZeroUsize;

#[derive(Debug, Clone)]
enum Slot<T> {
    Occupied(T),
    Free { next_free: Option<Idx> },
}

/// Slot storage handing out stable, non-zero indices. Removed slots are reused
/// by later insertions, most recently freed first.
#[derive(Debug, Clone)]
pub struct FreeList<T> {
    // entry zero is never handed out so indices can be NonZeroUsize
    entries: Vec<Slot<T>>,
    next_free: Option<Idx>,
    len: usize,
}

impl<T> Default for FreeList<T> {
    fn default() -> Self { Self::new() }
}

impl<T> FreeList<T> {
    pub fn new() -> Self {
        Self { entries: vec![Slot::Free { next_free: None }], next_free: None, len: 0 }
    }

    pub fn add(&mut self, data: T) -> Idx {
        self.len += 1;
        match self.next_free {
            None => {
                self.entries.push(Slot::Occupied(data));
                Idx::new(self.entries.len() - 1).expect("slot zero is reserved")
            }
            Some(idx) => {
                let slot = std::mem::replace(&mut self.entries[idx.get()], Slot::Occupied(data));
                self.next_free = match slot {
                    Slot::Free { next_free } => next_free,
                    Slot::Occupied(_) => unreachable!("free chain pointed at an occupied slot"),
                };
                idx
            }
        }
    }

    /// Frees the slot and hands the stored value back to the caller, so it can
    /// be dropped outside of whatever lock guards the list.
    pub fn remove(&mut self, idx: Idx) -> Option<T> {
        let slot = self.entries.get_mut(idx.get())?;
        if let Slot::Free { .. } = slot {
            return None;
        }
        let old = std::mem::replace(slot, Slot::Free { next_free: self.next_free });
        self.next_free = Some(idx);
        self.len -= 1;
        match old {
            Slot::Occupied(data) => Some(data),
            Slot::Free { .. } => None,
        }
    }

    pub fn contains(&self, idx: Idx) -> bool {
        matches!(self.entries.get(idx.get()), Some(Slot::Occupied(_)))
    }

    pub fn get(&self, idx: Idx) -> Option<&T> {
        match self.entries.get(idx.get()) {
            Some(Slot::Occupied(data)) => Some(data),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, idx: Idx) -> Option<&mut T> {
        match self.entries.get_mut(idx.get()) {
            Some(Slot::Occupied(data)) => Some(data),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Idx, &T)> {
        self.entries.iter().enumerate().filter_map(|(i, slot)| match slot {
            Slot::Occupied(data) => Some((Idx::new(i)?, data)),
            Slot::Free { .. } => None,
        })
    }

    pub fn len(&self) -> usize { self.len }

    pub fn is_empty(&self) -> bool { self.len == 0 }

    pub fn used_space(&self) -> usize { self.entries.len() }
}

impl<T> Index<Idx> for FreeList<T> {
    type Output = T;

    fn index(&self, index: Idx) -> &Self::Output {
        self.get(index).expect("tried to access a removed freelist slot")
    }
}

impl<T> IndexMut<Idx> for FreeList<T> {
    fn index_mut(&mut self, index: Idx) -> &mut Self::Output {
        self.get_mut(index).expect("tried to access a removed freelist slot")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reuses_freed_slots() {
        let mut list = FreeList::new();
        let a = list.add("a");
        let b = list.add("b");
        assert_eq!(list.len(), 2);

        assert_eq!(list.remove(a), Some("a"));
        assert!(!list.contains(a));
        let c = list.add("c");
        assert_eq!(c, a);
        assert_eq!(list[c], "c");
        assert_eq!(list[b], "b");
        assert_eq!(list.used_space(), 3);
    }

    #[test]
    fn double_remove_is_a_noop() {
        let mut list = FreeList::new();
        let a = list.add(1);
        assert_eq!(list.remove(a), Some(1));
        assert_eq!(list.remove(a), None);
        assert!(list.is_empty());
        assert_eq!(list.get(a), None);
    }

    #[test]
    fn iter_skips_free_slots() {
        let mut list = FreeList::new();
        let a = list.add(1);
        let _b = list.add(2);
        let _c = list.add(3);
        list.remove(a);
        let values: Vec<_> = list.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![2, 3]);
    }
}
