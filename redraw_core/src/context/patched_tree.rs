use super::key::Key;
use crate::Fragment;
use dashmap::DashMap;
use derivative::Derivative;
use freelist::{FreeList, Idx};
use hashbrown::{HashMap, HashSet};
use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard};
use std::{
    any::Any,
    fmt::{Debug, Formatter},
    hash::{Hash, Hasher},
    marker::PhantomData,
    ops::Deref,
};

type Dependents = HashSet<Fragment, ahash::RandomState>;
pub type TreeItem = Box<dyn Any + Send + Sync>;

type FxDashMap<K, V> = DashMap<K, V, ahash::RandomState>;

// hook counter within the widget
pub type HookKey = (Key, u16);

#[derive(Debug)]
struct TreeSlot {
    dependents: Dependents,
    value: TreeItem,
}

impl TreeSlot {
    fn new(value: TreeItem) -> Self { Self { dependents: Default::default(), value } }
}

/// Typed handle to one tracked slot of the [`ObservationTree`].
pub struct Field<T> {
    pub(crate) idx: Idx,
    phantom: PhantomData<fn() -> T>,
}
impl<T> Field<T> {
    pub(crate) fn new(idx: Idx) -> Self { Self { idx, phantom: PhantomData } }
}
impl<T> Clone for Field<T> {
    fn clone(&self) -> Self { *self }
}
impl<T> Copy for Field<T> {}
impl<T> PartialEq for Field<T> {
    fn eq(&self, other: &Self) -> bool { self.idx == other.idx }
}
impl<T> Eq for Field<T> {}
impl<T> Hash for Field<T> {
    fn hash<H: Hasher>(&self, state: &mut H) { self.idx.hash(state) }
}
impl<T> Debug for Field<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { write!(f, "Field({})", self.idx) }
}

/// Storage of every observable field. Writes land in a patch and only become
/// visible to renders once [`ObservationTree::update_tree`] applied them at the
/// start of the next frame. Every slot remembers the fragments that read it
/// during their most recent render.
#[derive(Derivative, Default)]
#[derivative(Debug)]
pub struct ObservationTree {
    data: RwLock<FreeList<TreeSlot>>,
    key_to_idx: RwLock<HashMap<Key, HashMap<u16, Idx>>>,
    #[derivative(Debug = "ignore")]
    patch: FxDashMap<Idx, TreeItem>,
}

type DataRef<'a> = MappedRwLockReadGuard<'a, TreeItem>;
type HashPatchRef<'a> = dashmap::mapref::one::Ref<'a, Idx, TreeItem, ahash::RandomState>;

pub struct PatchTreeEntry<'a> {
    patched_entry: Option<HashPatchRef<'a>>,
    unpatched_entry: Option<DataRef<'a>>,
}

impl<'a> PatchTreeEntry<'a> {
    fn new(patched_entry: Option<HashPatchRef<'a>>, unpatched_entry: Option<DataRef<'a>>) -> Self {
        Self { patched_entry, unpatched_entry }
    }
}

impl<'a> Deref for PatchTreeEntry<'a> {
    type Target = TreeItem;

    fn deref(&self) -> &Self::Target {
        match &self.patched_entry {
            Some(p) => p.value(),
            None => match &self.unpatched_entry {
                Some(v) => &**v,
                None => unreachable!(),
            },
        }
    }
}

fn downcast<T: 'static>(item: &TreeItem) -> &T {
    item.downcast_ref()
        .expect("tree value has unexpected type; this is likely an internal redraw bug :(")
}

impl ObservationTree {
    // the guards returned here must not be held across other tree operations
    pub fn get_patched(&self, idx: Idx) -> PatchTreeEntry {
        match self.patch.get(&idx) {
            None => self.get_unpatched(idx),
            Some(patch) => PatchTreeEntry::new(Some(patch), None),
        }
    }

    pub fn get_unpatched(&self, idx: Idx) -> PatchTreeEntry {
        PatchTreeEntry::new(
            None,
            Some(RwLockReadGuard::map(self.data.read(), |v| {
                &v.get(idx)
                    .expect("tried to read a released field; this is likely an internal redraw bug :(")
                    .value
            })),
        )
    }

    /// committed value, as seen by the renders of the current frame
    pub fn get<T: Clone + 'static>(&self, field: Field<T>) -> T {
        downcast::<T>(&self.get_unpatched(field.idx)).clone()
    }

    /// newest value including writes that were not applied yet
    pub fn get_latest<T: Clone + 'static>(&self, field: Field<T>) -> T {
        downcast::<T>(&self.get_patched(field.idx)).clone()
    }

    /// `f` runs while the tree is locked and must not touch the tree itself
    pub fn with<T: 'static, R>(&self, field: Field<T>, f: impl FnOnce(&T) -> R) -> R {
        f(downcast::<T>(&self.get_unpatched(field.idx)))
    }

    pub fn field<T: Send + Sync + 'static>(&self, initial: T) -> Field<T> {
        let idx = self.data.write().add(TreeSlot::new(Box::new(initial)));
        log::trace!("allocated field {:?}", idx);
        Field::new(idx)
    }

    pub fn initialize_with<T: Send + Sync + 'static>(
        &self,
        key: HookKey,
        gen: impl FnOnce() -> T,
    ) -> Field<T> {
        let existing = self.key_to_idx.read().get(&key.0).and_then(|hooks| hooks.get(&key.1)).copied();
        if let Some(idx) = existing {
            return Field::new(idx);
        }
        // gen may allocate fields itself, so it runs without any lock held
        let field = self.field(gen());
        self.key_to_idx.write().entry(key.0).or_default().insert(key.1, field.idx);
        field
    }

    pub fn contains(&self, idx: Idx) -> bool { self.data.read().contains(idx) }

    pub fn contains_field<T>(&self, field: Field<T>) -> bool { self.contains(field.idx) }

    pub fn set<T: Send + Sync + 'static>(&self, field: Field<T>, value: T) {
        let old = self.patch.insert(field.idx, Box::new(value));
        drop(old);
    }

    pub fn set_unconditional(&self, idx: Idx, value: TreeItem) {
        let old = std::mem::replace(&mut self.data.write()[idx].value, value);
        // dropped outside of the lock, the old value might release fields itself
        drop(old);
    }

    pub fn release<T>(&self, field: Field<T>) {
        let pending = self.patch.remove(&field.idx);
        let removed = self.data.write().remove(field.idx);
        log::trace!("released field {:?}", field.idx);
        drop((pending, removed));
    }

    pub fn remove_widget(&self, key: &Key) {
        let indices = self.key_to_idx.write().remove(key);
        if let Some(indices) = indices {
            let mut removed = Vec::with_capacity(indices.len());
            let mut pending = Vec::new();
            {
                let mut data = self.data.write();
                for idx in indices.values() {
                    pending.extend(self.patch.remove(idx));
                    removed.extend(data.remove(*idx));
                }
            }
            drop((pending, removed));
        }
    }

    pub fn has_pending(&self) -> bool { !self.patch.is_empty() }

    // apply the patch to the tree starting a new frame
    pub fn update_tree(&self) -> Vec<Idx> {
        let keys: Vec<Idx> = self.patch.iter().map(|kv| *kv.key()).collect();

        let mut touched = Vec::with_capacity(keys.len());
        for idx in keys {
            if let Some((idx, value)) = self.patch.remove(&idx) {
                if self.contains(idx) {
                    self.set_unconditional(idx, value);
                    touched.push(idx);
                } else {
                    log::trace!("dropping patch for released field {:?}", idx);
                }
            }
        }
        touched.sort();
        touched
    }

    pub fn add_dependent(&self, idx: Idx, frag: Fragment) {
        if let Some(slot) = self.data.write().get_mut(idx) {
            slot.dependents.insert(frag);
        }
    }

    pub fn remove_dependent(&self, idx: Idx, frag: Fragment) {
        if let Some(slot) = self.data.write().get_mut(idx) {
            slot.dependents.remove(&frag);
        }
    }

    pub fn dependents(&self, idx: Idx) -> Vec<Fragment> {
        self.data
            .read()
            .get(idx)
            .map(|slot| slot.dependents.iter().copied().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frag(n: usize) -> Fragment { Fragment(Idx::new(n).unwrap()) }

    #[test]
    fn writes_are_patched_until_update() {
        let tree = ObservationTree::default();
        let field = tree.field(1i64);

        tree.set(field, 2);
        assert_eq!(tree.get(field), 1);
        assert_eq!(tree.get_latest(field), 2);

        assert_eq!(tree.update_tree(), vec![field.idx]);
        assert_eq!(tree.get(field), 2);
        assert!(!tree.has_pending());
        assert!(tree.update_tree().is_empty());
    }

    #[test]
    fn last_write_wins_within_a_frame() {
        let tree = ObservationTree::default();
        let field = tree.field(0i64);
        tree.set(field, 1);
        tree.set(field, 5);
        assert_eq!(tree.update_tree().len(), 1);
        assert_eq!(tree.get(field), 5);
    }

    #[test]
    fn dependents_are_per_field() {
        let tree = ObservationTree::default();
        let a = tree.field(0i64);
        let b = tree.field(0i64);

        tree.add_dependent(a.idx, frag(1));
        tree.add_dependent(b.idx, frag(2));
        tree.add_dependent(b.idx, frag(3));
        tree.remove_dependent(b.idx, frag(3));

        assert_eq!(tree.dependents(a.idx), vec![frag(1)]);
        assert_eq!(tree.dependents(b.idx), vec![frag(2)]);
        // reading dependents does not consume them
        assert_eq!(tree.dependents(a.idx), vec![frag(1)]);
    }

    #[test]
    fn hook_fields_are_initialized_once_and_removed_with_the_widget() {
        let tree = ObservationTree::default();
        let key = (Key::ROOT, 0);
        let first = tree.initialize_with(key, || 3u8);
        let second = tree.initialize_with(key, || 9u8);
        assert_eq!(first, second);
        assert_eq!(tree.get(second), 3);

        tree.set(first, 4);
        tree.remove_widget(&Key::ROOT);
        assert!(!tree.contains(first.idx));
        assert!(tree.update_tree().is_empty());
    }

    #[test]
    fn patches_for_released_fields_are_dropped() {
        let tree = ObservationTree::default();
        let field = tree.field(String::from("a"));
        let other = tree.field(String::from("b"));
        tree.set(other, String::from("c"));
        tree.release(field);
        tree.set(field, String::from("ignored"));
        assert_eq!(tree.update_tree(), vec![other.idx]);
    }
}
