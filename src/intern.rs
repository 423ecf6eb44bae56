use std::fmt::{self, Debug, Formatter};
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::track::ValueRef;

/// An identity token referencing a runtime value.
///
/// Two handles are equal iff they reference the same allocation. Structural
/// equality is never consulted: two separately constructed strings with the
/// same contents compare unequal, while values the runtime canonicalizes
/// (small integers, booleans, the singleton none) are handed out as the
/// same allocation and therefore compare equal automatically.
///
/// The empty handle denotes "no value" and is equal only to itself.
#[derive(Clone)]
pub struct Interned(Option<ValueRef>);

impl Interned {
    /// The empty handle.
    pub fn none() -> Self {
        Self(None)
    }

    /// Creates a handle for a value. Performs no deduplication; the handle's
    /// identity is the value's allocation address.
    pub fn new(value: &ValueRef) -> Self {
        Self(Some(value.clone()))
    }

    /// Whether this is the empty handle.
    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// The referenced value. Round-trips: `Interned::new(&v).value()` yields
    /// the same allocation as `v`.
    pub fn value(&self) -> Option<&ValueRef> {
        self.0.as_ref()
    }

    /// The identity word: the referenced allocation's address, or zero for
    /// the empty handle.
    pub(crate) fn address(&self) -> usize {
        self.0.as_ref().map_or(0, thin)
    }
}

impl From<Option<ValueRef>> for Interned {
    fn from(value: Option<ValueRef>) -> Self {
        Self(value)
    }
}

impl PartialEq for Interned {
    fn eq(&self, other: &Self) -> bool {
        self.address() == other.address()
    }
}

impl Eq for Interned {}

impl Hash for Interned {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.address());
    }
}

impl Debug for Interned {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(value) => write!(f, "Interned({value:?})"),
            None => f.write_str("Interned(<empty>)"),
        }
    }
}

/// The data half of a (possibly fat) shared pointer, as a plain word.
pub(crate) fn thin<T: ?Sized>(rc: &Rc<T>) -> usize {
    Rc::as_ptr(rc) as *const () as usize
}
