//! Attachment record - extension data carried by an event
//!
//! Entries are addressed by typed [`Key`]s. Values are stored shared and
//! immutable, so a snapshot can share them while owning its own key map:
//! inserting into or removing from one record never shows up in the other.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

/// Typed attachment key
///
/// Keys are identified by name; two keys with the same name address the
/// same slot regardless of their value type.
pub struct Key<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Key<T> {
    pub const fn new(name: &'static str) -> Self {
        Key {
            name,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for Key<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Key<T> {}

impl<T> fmt::Debug for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({})", self.name)
    }
}

/// Keyed store of extension data
#[derive(Clone, Default)]
pub struct Attachments {
    entries: HashMap<&'static str, Rc<dyn Any>>,
}

impl Attachments {
    pub fn new() -> Self {
        Attachments::default()
    }

    /// Store `value` under `key`, replacing any previous entry
    pub fn set<T: Any>(&mut self, key: &Key<T>, value: T) {
        self.set_shared(key, Rc::new(value));
    }

    /// Store an already shared value
    pub fn set_shared<T: Any>(&mut self, key: &Key<T>, value: Rc<T>) {
        self.entries.insert(key.name, value);
    }

    /// Fetch the value under `key`
    ///
    /// Returns `None` when the slot is empty or holds a value of another type.
    pub fn get<T: Any>(&self, key: &Key<T>) -> Option<Rc<T>> {
        let value = self.entries.get(key.name)?;
        Rc::clone(value).downcast::<T>().ok()
    }

    /// Remove the entry under `key`, returning whether one existed
    pub fn remove<T>(&mut self, key: &Key<T>) -> bool {
        self.entries.remove(key.name).is_some()
    }

    pub fn contains<T>(&self, key: &Key<T>) -> bool {
        self.entries.contains_key(key.name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Independent copy of the key map
    pub fn snapshot(&self) -> Attachments {
        self.clone()
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }
}

impl fmt::Debug for Attachments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.keys().collect();
        keys.sort_unstable();
        f.debug_set().entries(keys).finish()
    }
}
