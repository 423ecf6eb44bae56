use std::collections::HashMap;
use std::rc::Rc;

use crate::cache::Cache;
use crate::track::ValueRef;

/// The name-keyed value store embedded in a cache.
#[derive(Default)]
pub(crate) struct Registry {
    map: HashMap<Rc<str>, ValueRef>,
}

impl Registry {
    pub fn get(&self, name: &str) -> Option<ValueRef> {
        self.map.get(name).cloned()
    }

    pub fn set(&mut self, name: &str, value: ValueRef) {
        match self.map.get_key_value(name) {
            Some((key, _)) => {
                let key = key.clone();
                self.map.insert(key, value);
            }
            None => {
                self.map.insert(Rc::from(name), value);
            }
        }
    }

    /// Stores `value` under `name` unless the slot already exists. Returns
    /// whether the registry changed.
    pub fn seed(&mut self, name: &str, value: ValueRef) -> bool {
        if self.map.contains_key(name) {
            return false;
        }
        self.map.insert(Rc::from(name), value);
        true
    }

    /// The canonical key for a name, if the slot exists.
    pub fn key(&self, name: &str) -> Option<Rc<str>> {
        self.map.get_key_value(name).map(|(key, _)| key.clone())
    }
}

/// A script-facing handle to one named input slot.
///
/// The host wraps this in a value with a `value` attribute; attribute reads
/// map to [`get`](Self::get) and attribute writes to [`set`](Self::set).
pub struct Input {
    cache: Rc<Cache>,
    name: Rc<str>,
}

impl Input {
    pub(crate) fn new(cache: Rc<Cache>, name: Rc<str>) -> Self {
        Self { cache, name }
    }

    /// The input's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reads the current value, or `None` if the slot does not exist. The
    /// read is recorded as a dependency of the active frame.
    pub fn get(&self) -> Option<ValueRef> {
        self.cache.read_input(&self.name)
    }

    /// Replaces the stored value and bumps the cache version. The write is
    /// recorded as a dependency of the active frame.
    pub fn set(&self, value: ValueRef) {
        self.cache.set_input(&self.name, value);
    }
}
