use crate::Widget;
use hashbrown::HashMap;
use std::fmt::{Debug, Display, Formatter};

type KeyInner = u32;

/// Identity of a mounted widget instance. Keys are derived from the parent key
/// plus the position of the widget inside the parent and are never reused, so
/// a remounted widget starts with fresh hook state.
#[derive(Clone, Copy, PartialEq, Hash, Eq, Debug, PartialOrd, Ord)]
pub struct Key(pub(crate) KeyInner);

impl Default for Key {
    fn default() -> Self { Key::ROOT }
}

impl Key {
    pub const ROOT: Key = Key(1);
}

#[derive(Debug, Clone)]
struct KeyMapEntry {
    deleted: bool,
    tail: KeyPart,
    parent: KeyInner,
}

impl KeyMapEntry {
    fn deleted() -> Self { Self { deleted: true, tail: KeyPart::Root, parent: Key::ROOT.0 } }
}

#[derive(Debug)]
pub struct KeyMap {
    keys: Vec<KeyMapEntry>,
    lookup: HashMap<(KeyInner, KeyPart), KeyInner, ahash::RandomState>,
}

impl KeyMap {
    pub fn key_with(&mut self, parent: Key, tail: KeyPart) -> Key {
        if let Some(key) = self.lookup.get(&(parent.0, tail)) {
            return Key(*key);
        }

        let new_id = self.keys.len() as KeyInner;
        self.keys.push(KeyMapEntry { deleted: false, tail, parent: parent.0 });
        self.lookup.insert((parent.0, tail), new_id);
        Key(new_id)
    }

    pub fn key_parent(&self, key: Key) -> Key { Key(self.keys[key.0 as usize].parent) }
    pub fn key_tail(&self, key: Key) -> KeyPart { self.keys[key.0 as usize].tail }
    pub fn key_debug(&self, key: Key) -> DebuggableKey { DebuggableKey { key, key_map: self } }
    pub fn is_deleted(&self, key: Key) -> bool { self.keys[key.0 as usize].deleted }

    pub fn get_parts(&self, key: Key) -> Vec<KeyPart> {
        let mut parts = Vec::new();
        let mut current = key;
        while current != Key::ROOT {
            parts.push(self.key_tail(current));
            current = self.key_parent(current);
        }
        parts
    }

    pub fn remove(&mut self, key: &Key) {
        let entry = &mut self.keys[key.0 as usize];
        if entry.deleted {
            return;
        }
        entry.deleted = true;
        let (parent, tail) = (entry.parent, entry.tail);
        self.lookup.remove(&(parent, tail));
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        let mut keys = vec![KeyMapEntry::deleted(), KeyMapEntry::deleted()];
        keys[Key::ROOT.0 as usize].deleted = false;

        Self { keys, lookup: Default::default() }
    }
}

pub struct DebuggableKey<'a> {
    key: Key,
    key_map: &'a KeyMap,
}
impl<'a> Display for DebuggableKey<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (i, part) in self.key_map.get_parts(self.key).iter().rev().enumerate() {
            if i != 0 {
                write!(f, ".")?;
            }
            write!(f, "{:?}", part)?;
        }
        Ok(())
    }
}
impl<'a> Debug for DebuggableKey<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { Display::fmt(self, f) }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyPart {
    Root,

    /// `slot` counts the widgets of the same kind rendered before this one by
    /// the same parent
    Widget { widget_id: u16, slot: u16 },
    Keyed { widget_id: u16, key: u16 },
}

impl KeyPart {
    pub fn widget<W: Widget>(slot: u16) -> Self {
        KeyPart::Widget { widget_id: internal::widget_id(W::NAME), slot }
    }

    pub fn keyed<W: Widget>(key: u16) -> Self {
        KeyPart::Keyed { widget_id: internal::widget_id(W::NAME), key }
    }
}

impl Debug for KeyPart {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyPart::Root => write!(f, "Root"),
            KeyPart::Widget { widget_id, slot: 0 } => {
                write!(f, "{}", internal::name_for_widget(*widget_id))
            }
            KeyPart::Widget { widget_id, slot } => {
                write!(f, "{}#{}", internal::name_for_widget(*widget_id), slot)
            }
            KeyPart::Keyed { widget_id, key } => {
                write!(f, "{}<{}>", internal::name_for_widget(*widget_id), key)
            }
        }
    }
}

pub(crate) mod internal {
    use parking_lot::RwLock;

    pub struct WidgetDebugInfo {
        pub name: &'static str,
    }

    lazy_static::lazy_static! {
        pub static ref WIDGET_INFO: RwLock<Vec<WidgetDebugInfo>> = RwLock::new(vec![
            WidgetDebugInfo { name: "toplevel" }
        ]);
    }

    pub fn name_for_widget(widget_id: u16) -> &'static str {
        WIDGET_INFO.read().get(widget_id as usize).map_or("unknown", |info| info.name)
    }

    pub fn widget_id(name: &'static str) -> u16 {
        if let Some(id) = WIDGET_INFO.read().iter().position(|info| info.name == name) {
            return id as u16;
        }
        let mut info = WIDGET_INFO.write();
        // someone else might have registered it between the two locks
        if let Some(id) = info.iter().position(|info| info.name == name) {
            return id as u16;
        }
        info.push(WidgetDebugInfo { name });
        (info.len() - 1) as u16
    }
}
