//! A miniature host runtime for driving the cache from tests.
//!
//! This plays the role of the interpreter: it owns values, module globals,
//! closure cells and containers, calls the cache's mutation and recording
//! primitives the way instrumented bytecode would, and counts executions so
//! tests can assert what actually ran.

#![allow(dead_code)]

use std::any::Any;
use std::cell::Cell as Counter;
use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;

use memodb::{memoize, Cache, Cell, Function, Interned, Mutable, Value, ValueRef};

/// An immutable integer.
#[derive(Debug)]
pub struct Int(pub i64);

impl Value for Int {}

/// An immutable string.
#[derive(Debug)]
pub struct Str(pub String);

impl Value for Str {}

pub fn int(n: i64) -> ValueRef {
    Rc::new(Int(n))
}

pub fn text(s: &str) -> ValueRef {
    Rc::new(Str(s.into()))
}

pub fn as_int(value: &ValueRef) -> i64 {
    let any: &dyn Any = value.as_ref();
    any.downcast_ref::<Int>().expect("expected an integer").0
}

pub fn as_str(value: &ValueRef) -> String {
    let any: &dyn Any = value.as_ref();
    any.downcast_ref::<Str>().expect("expected a string").0.clone()
}

/// A list with a modification tick.
#[derive(Debug)]
pub struct List {
    items: RefCell<Vec<ValueRef>>,
    tick: Counter<u64>,
}

impl Value for List {}

impl Mutable for List {
    fn tick(&self) -> u64 {
        self.tick.get()
    }
}

impl List {
    pub fn new(items: Vec<ValueRef>) -> Rc<Self> {
        Rc::new(Self { items: RefCell::new(items), tick: Counter::new(0) })
    }

    /// In-place append: bumps the list's tick and the cache version.
    pub fn push(&self, cache: &Cache, value: ValueRef) {
        self.items.borrow_mut().push(value);
        self.tick.set(self.tick.get() + 1);
        cache.bump_version();
    }

    pub fn sum(&self) -> i64 {
        self.items.borrow().iter().map(as_int).sum()
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }
}

/// A dict with a modification tick.
#[derive(Debug)]
pub struct Dict {
    entries: RefCell<Vec<(String, ValueRef)>>,
    tick: Counter<u64>,
}

impl Value for Dict {}

impl Mutable for Dict {
    fn tick(&self) -> u64 {
        self.tick.get()
    }
}

impl Dict {
    pub fn new(entries: Vec<(&str, ValueRef)>) -> Rc<Self> {
        let entries = entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Rc::new(Self { entries: RefCell::new(entries), tick: Counter::new(0) })
    }

    pub fn get(&self, key: &str) -> Option<ValueRef> {
        self.entries
            .borrow()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    /// In-place insert: bumps the dict's tick and the cache version.
    pub fn insert(&self, cache: &Cache, key: &str, value: ValueRef) {
        self.entries.borrow_mut().retain(|(k, _)| k != key);
        self.entries.borrow_mut().push((key.into(), value));
        self.tick.set(self.tick.get() + 1);
        cache.bump_version();
    }
}

/// A set of integers with a modification tick.
#[derive(Debug)]
pub struct IntSet {
    items: RefCell<Vec<i64>>,
    tick: Counter<u64>,
}

impl Value for IntSet {}

impl Mutable for IntSet {
    fn tick(&self) -> u64 {
        self.tick.get()
    }
}

impl IntSet {
    pub fn new(items: Vec<i64>) -> Rc<Self> {
        Rc::new(Self { items: RefCell::new(items), tick: Counter::new(0) })
    }

    pub fn contains(&self, item: i64) -> bool {
        self.items.borrow().contains(&item)
    }

    /// In-place add: bumps the set's tick and the cache version.
    pub fn add(&self, cache: &Cache, item: i64) {
        if !self.contains(item) {
            self.items.borrow_mut().push(item);
            self.tick.set(self.tick.get() + 1);
            cache.bump_version();
        }
    }
}

/// A closure cell: one mutable slot with stable identity.
#[derive(Debug)]
pub struct Slot {
    value: RefCell<Option<ValueRef>>,
}

impl Cell for Slot {
    fn load(&self) -> Option<ValueRef> {
        self.value.borrow().clone()
    }
}

impl Slot {
    pub fn new(value: Option<ValueRef>) -> Rc<Self> {
        Rc::new(Self { value: RefCell::new(value) })
    }

    /// Stores into the slot and bumps the cache version.
    pub fn store(&self, cache: &Cache, value: ValueRef) {
        *self.value.borrow_mut() = Some(value);
        cache.bump_version();
    }
}

/// Module-level global slots.
#[derive(Debug)]
pub struct Module {
    globals: RefCell<Vec<Option<ValueRef>>>,
}

impl Module {
    pub fn new(len: usize) -> Rc<Self> {
        Rc::new(Self { globals: RefCell::new(vec![None; len]) })
    }

    pub fn read(&self, id: usize) -> Option<ValueRef> {
        self.globals.borrow()[id].clone()
    }

    /// Assigns a global slot and bumps the cache version.
    pub fn assign(&self, cache: &Cache, id: usize, value: ValueRef) {
        self.globals.borrow_mut()[id] = Some(value);
        cache.bump_version();
    }
}

/// A code object; functions sharing one are closures over the same code.
#[derive(Debug)]
pub struct Code(pub &'static str);

pub fn code(name: &'static str) -> Rc<Code> {
    Rc::new(Code(name))
}

/// A compiled function: a code object plus captured free-variable values.
#[derive(Debug)]
pub struct HostFn {
    code: Rc<Code>,
    free: Vec<ValueRef>,
    module: Rc<Module>,
    /// Number of global-slot reads made through the `Function` contract.
    /// The interpreter fixture reads globals directly off the module, so
    /// this counts validator activity only.
    pub global_reads: Counter<usize>,
}

impl HostFn {
    pub fn new(name: &'static str, module: &Rc<Module>) -> Rc<Self> {
        Self::with_code(&code(name), module, Vec::new())
    }

    pub fn with_code(code: &Rc<Code>, module: &Rc<Module>, free: Vec<ValueRef>) -> Rc<Self> {
        Rc::new(Self {
            code: code.clone(),
            free,
            module: module.clone(),
            global_reads: Counter::new(0),
        })
    }

    pub fn function(self: &Rc<Self>) -> Rc<dyn Function> {
        self.clone()
    }

    pub fn module(&self) -> &Rc<Module> {
        &self.module
    }
}

impl Function for HostFn {
    fn code(&self) -> usize {
        Rc::as_ptr(&self.code) as usize
    }

    fn free_vars(&self) -> &[ValueRef] {
        &self.free
    }

    fn global(&self, id: usize) -> Option<ValueRef> {
        self.global_reads.set(self.global_reads.get() + 1);
        self.module.read(id)
    }
}

/// Reads a global with the instrumentation the interpreter would emit
/// around a load of a module-level variable.
pub fn read_global(cache: &Cache, func: &HostFn, id: usize) -> ValueRef {
    let value = func.module().read(id).expect("read of unassigned global");
    cache.record_global(id, &cache.intern(&value));
    value
}

/// Reads a captured cell with the instrumentation the interpreter would
/// emit around a load of a free variable.
pub fn read_cell(cache: &Cache, cell: &Rc<Slot>) -> Option<ValueRef> {
    let value = cell.load();
    let observed = Interned::from(value.clone());
    let dynamic: Rc<dyn Cell> = cell.clone();
    cache.record_cell(&dynamic, &observed);
    value
}

/// Runs a memoized call whose body cannot fail.
pub fn call(
    cache: &Cache,
    func: &Rc<dyn Function>,
    args: &[Interned],
    body: impl FnOnce() -> Interned,
) -> Interned {
    memoize(cache, func, args, || Ok::<_, Infallible>(body())).unwrap()
}
