use std::any::Any;
use std::fmt::Debug;
use std::rc::Rc;

/// A value produced by the runtime.
///
/// The cache never inspects a value's structure; it compares values by
/// allocation identity and keeps them alive through shared ownership. `Any`
/// is a supertrait so that the host can downcast values it receives back
/// from the cache.
pub trait Value: Any + Debug {}

/// A shared reference to a runtime value.
pub type ValueRef = Rc<dyn Value>;

/// A mutable container: a list, dict or set.
///
/// Containers are observed by modification tick, not by content. The tick
/// must increase on every in-place mutation and must never roll back; the
/// transition to the frozen state counts as a mutation.
pub trait Mutable: Value {
    /// The container's current modification tick.
    fn tick(&self) -> u64;
}

/// A heap-allocated single-slot reference shared between closures.
///
/// A cell's identity is stable across mutations of its slot; the host bumps
/// the cache's version counter whenever it stores into a cell.
pub trait Cell: Debug {
    /// The cell's current contents, if any.
    fn load(&self) -> Option<ValueRef>;
}

/// A compiled function object.
///
/// Two closures over the same code but different captured environments must
/// be distinguishable, so a function exposes both its code identity and the
/// ordered values of its free variables. Module-level global slots are
/// resolved through the function because variable identifiers are only
/// meaningful within one function's scope.
pub trait Function: Debug {
    /// A stable identity for the compiled code object, typically its
    /// address.
    fn code(&self) -> usize;

    /// The current values of the function's free variables, in declaration
    /// order.
    fn free_vars(&self) -> &[ValueRef];

    /// The current value of the module-level global slot `id`, or `None` if
    /// the slot is unassigned.
    fn global(&self, id: usize) -> Option<ValueRef>;
}
