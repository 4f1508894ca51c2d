use super::{
    key::{Key, KeyMap, KeyPart},
    patched_tree::{HookKey, ObservationTree},
};
use crate::{
    eval::{fragment::EvaluatedFragment, widget::AnyWidget},
    DynEq,
    Fragment,
    TimerQueue,
    Widget,
};
use derivative::Derivative;
use freelist::{FreeList, Idx};
use hashbrown::HashMap;
use smallvec::SmallVec;
use std::sync::Arc;

// Context types
// thread access (timers, entity constructors)
//   - get value (not listen because we don't have the rebuild if changed thing)
//   - shout
//   - allocate fields, schedule timers
// widget access
//   - create listenable
//   - listen
//   - mount children
// callback access (buttons, timer ticks)
//   - shout
//   - get value

#[derive(Derivative)]
#[derivative(Debug)]
pub struct FragmentInfo {
    pub key: Key,
    pub depth: u16,
    #[derivative(Debug = "ignore")]
    pub(crate) widget: Option<Box<dyn AnyWidget>>,
    pub evaluated: Option<EvaluatedFragment>,
    // set when the props changed or the fragment was just mounted
    pub needs_render: bool,
    pub reads: SmallVec<[Idx; 4]>,
    #[derivative(Debug = "ignore")]
    pub(crate) equality_snapshot: Option<Box<dyn DynEq>>,
}

impl FragmentInfo {
    fn new(key: Key, depth: u16, widget: Box<dyn AnyWidget>) -> Self {
        Self {
            key,
            depth,
            widget: Some(widget),
            evaluated: None,
            needs_render: true,
            reads: SmallVec::new(),
            equality_snapshot: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct FragmentStore {
    pub(crate) data: FreeList<FragmentInfo>,
    by_key: HashMap<Key, Fragment, ahash::RandomState>,
    dirty: Vec<Fragment>,
}

impl FragmentStore {
    pub(crate) fn add_root(&mut self, key: Key, widget: Box<dyn AnyWidget>) -> Fragment {
        let idx = Fragment(self.data.add(FragmentInfo::new(key, 0, widget)));
        self.by_key.insert(key, idx);
        self.dirty.push(idx);
        idx
    }

    /// Mounts `widget` under `key` or, if a fragment with that key already
    /// exists, compares the new props against the old ones and marks the
    /// fragment for re-rendering when they differ.
    pub(crate) fn upsert<W: Widget>(&mut self, key: Key, depth: u16, widget: W) -> Fragment {
        match self.by_key.get(&key).copied() {
            Some(idx) => {
                let info = self.get_mut(idx);
                let same = info.widget.as_ref().map_or(false, |old| old.same_as(&widget));
                if same {
                    log::trace!("props of {} unchanged, keeping fragment {:?}", W::NAME, idx);
                } else {
                    log::trace!("props of {} changed, marking fragment {:?}", W::NAME, idx);
                    info.widget = Some(Box::new(widget));
                    info.needs_render = true;
                    self.dirty.push(idx);
                }
                idx
            }
            None => {
                let idx = Fragment(self.data.add(FragmentInfo::new(key, depth, Box::new(widget))));
                log::trace!("initialized a new fragment {} with idx {:?}", W::NAME, idx);
                self.by_key.insert(key, idx);
                self.dirty.push(idx);
                idx
            }
        }
    }

    pub fn contains(&self, idx: Fragment) -> bool { self.data.contains(idx.0) }

    pub fn get(&self, idx: Fragment) -> &FragmentInfo {
        self.data.get(idx.0).expect("tried to access a removed fragment")
    }

    pub fn get_mut(&mut self, idx: Fragment) -> &mut FragmentInfo {
        self.data.get_mut(idx.0).expect("tried to access a removed fragment")
    }

    pub fn remove(&mut self, idx: Fragment) -> Option<FragmentInfo> {
        let info = self.data.remove(idx.0)?;
        self.by_key.remove(&info.key);
        Some(info)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Fragment, &FragmentInfo)> {
        self.data.iter().map(|(idx, info)| (Fragment(idx), info))
    }

    pub fn dirty(&mut self) -> impl Iterator<Item = Fragment> + '_ { self.dirty.drain(..) }
}

#[derive(Derivative)]
#[derivative(Debug)]
pub struct WidgetContext<'a> {
    pub widget_local: WidgetLocalContext,
    #[derivative(Debug = "ignore")]
    pub(crate) thread: ThreadContext,
    pub(crate) fragment_store: &'a mut FragmentStore,
    pub(crate) key_map: &'a mut KeyMap,
}

impl<'a> WidgetContext<'a> {
    pub(crate) fn for_fragment(
        thread: ThreadContext,
        fragment_store: &'a mut FragmentStore,
        key_map: &'a mut KeyMap,
        key: Key,
        idx: Fragment,
        depth: u16,
    ) -> Self {
        WidgetContext {
            thread,
            fragment_store,
            key_map,
            widget_local: WidgetLocalContext::for_key(key, idx, depth),
        }
    }

    pub fn key_for_hook(&mut self) -> HookKey {
        let counter = self.widget_local.hook_counter;
        self.widget_local.hook_counter += 1;
        log::trace!("creating hook: {:?}:{}", self.key_map.key_debug(self.widget_local.key), counter);
        (self.widget_local.key, counter)
    }

    pub fn thread_context(&self) -> ThreadContext { self.thread.clone() }

    pub(crate) fn tree(&self) -> &Arc<ObservationTree> { &self.thread.tree }

    /// Renders `widget` as a child of the current widget. Children are told
    /// apart by their kind and the order they are created in.
    pub fn child<W: Widget>(&mut self, widget: W) -> Fragment {
        let slot = self.widget_local.next_slot(KeyPart::widget::<W>(0));
        let key = self.key_map.key_with(self.widget_local.key, KeyPart::widget::<W>(slot));
        self.fragment_store.upsert(key, self.widget_local.depth + 1, widget)
    }

    pub fn child_keyed<W: Widget>(&mut self, key: u16, widget: W) -> Fragment {
        let key = self.key_map.key_with(self.widget_local.key, KeyPart::keyed::<W>(key));
        self.fragment_store.upsert(key, self.widget_local.depth + 1, widget)
    }

    // registers the current fragment as a dependent of the field
    pub(crate) fn mark_read(&mut self, idx: Idx) {
        if !self.widget_local.reads.contains(&idx) {
            self.widget_local.reads.push(idx);
            self.thread.tree.add_dependent(idx, self.widget_local.idx);
        }
    }
}

/// Everything that is not bound to a render: timers, entity constructors and
/// app code holding on to the tree.
#[derive(Clone, Derivative, Default)]
#[derivative(Debug)]
pub struct ThreadContext {
    #[derivative(Debug = "ignore")]
    pub(crate) tree: Arc<ObservationTree>,
    pub(crate) timers: TimerQueue,
}

impl ThreadContext {
    pub fn tree(&self) -> &Arc<ObservationTree> { &self.tree }
    pub fn timers(&self) -> &TimerQueue { &self.timers }
}

pub struct CallbackContext {
    pub(crate) thread: ThreadContext,
}

impl CallbackContext {
    pub fn thread_context(&self) -> ThreadContext { self.thread.clone() }
}

#[derive(Clone, Debug)]
pub struct WidgetLocalContext {
    pub key: Key,
    pub idx: Fragment,
    pub depth: u16,
    pub hook_counter: u16,
    pub reads: SmallVec<[Idx; 4]>,
    // (kind, next slot) for every kind of child created so far
    slots: SmallVec<[(KeyPart, u16); 8]>,
}

impl WidgetLocalContext {
    pub fn for_key(key: Key, idx: Fragment, depth: u16) -> Self {
        Self {
            key,
            idx,
            depth,
            hook_counter: 0,
            reads: SmallVec::new(),
            slots: SmallVec::new(),
        }
    }

    fn next_slot(&mut self, kind: KeyPart) -> u16 {
        match self.slots.iter_mut().find(|(k, _)| *k == kind) {
            Some((_, next)) => {
                let slot = *next;
                *next += 1;
                slot
            }
            None => {
                self.slots.push((kind, 1));
                0
            }
        }
    }
}
