//! Dependency-validated memoization for an embedded scripting runtime.
//!
//! Across repeated evaluations of the same program against changing inputs,
//! the cache reuses previously computed function-call results whenever the
//! visible program state that produced them has not changed. The interpreter
//! records every observation a function body makes (named inputs, module
//! globals, captured cells, container modification ticks, nested memoized
//! calls) into a per-frame [`Constraint`]. Sealed frames become
//! [`Record`]s in a fixed-capacity, open-addressed table keyed by function
//! identity and interned arguments; on lookup, [`Cache::validate`] walks a
//! record's dependencies to decide whether the cached result may be reused.
//!
//! Values are compared by identity, never by structure: an [`Interned`]
//! handle is equal to another exactly when both reference the same
//! allocation.

mod cache;
mod constraint;
mod hash;
mod input;
mod intern;
mod memoize;
mod table;
mod track;
mod validate;

#[cfg(feature = "testing")]
pub mod testing;

pub use crate::cache::Cache;
pub use crate::constraint::Constraint;
pub use crate::input::Input;
pub use crate::intern::Interned;
pub use crate::memoize::memoize;
pub use crate::table::{InsertError, Record};
pub use crate::track::{Cell, Function, Mutable, Value, ValueRef};
