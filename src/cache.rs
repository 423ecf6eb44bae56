use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::constraint::Constraint;
use crate::input::{Input, Registry};
use crate::intern::Interned;
use crate::table::{InsertError, Record, Table};
use crate::track::{self, Function, Mutable, ValueRef};

/// The memoization state owned by one execution thread.
///
/// A cache bundles the version counter, the input registry, the memo table
/// and the stack of dependency records for the frames currently executing.
/// It performs no locking; sharing one cache between threads is not
/// supported.
pub struct Cache {
    /// Bumped on every mutation of observable state. A record verified at
    /// the current version is valid without re-walking its dependencies.
    version: Cell<u64>,
    inputs: RefCell<Registry>,
    table: RefCell<Table>,
    frames: RefCell<Vec<Constraint>>,
}

impl Cache {
    /// Creates an empty cache: version zero, no inputs, no records.
    pub fn new() -> Self {
        Self {
            version: Cell::new(0),
            inputs: RefCell::new(Registry::default()),
            table: RefCell::new(Table::new()),
            frames: RefCell::new(Vec::new()),
        }
    }

    /// The current version.
    pub fn version(&self) -> u64 {
        self.version.get()
    }

    /// Increments the version. Every mutation primitive of the host (input
    /// write, global assignment, cell store, container mutation, freeze)
    /// must call this exactly once.
    pub fn bump_version(&self) {
        self.version.set(self.version.get() + 1);
    }

    /// Creates an identity handle for a value. Performs no deduplication;
    /// canonicalizing small immutable values is the runtime's business.
    pub fn intern(&self, value: &ValueRef) -> Interned {
        Interned::new(value)
    }

    /// Retrieves the record stored for a call, if any. The record may be
    /// stale; [`validate`](Self::validate) decides whether it can be
    /// reused.
    pub fn get(&self, func: &Rc<dyn Function>, args: &[Interned]) -> Option<Rc<Record>> {
        self.table.borrow().get(func, args)
    }

    /// Stores the sealed dependencies and result of a completed frame,
    /// overwriting a previous record for the same call.
    pub fn put(
        &self,
        func: &Rc<dyn Function>,
        args: &[Interned],
        deps: Constraint,
        result: Interned,
        verified_at: u64,
    ) -> Result<Rc<Record>, InsertError> {
        self.table.borrow_mut().put(
            func.clone(),
            args.to_vec().into_boxed_slice(),
            deps,
            result,
            verified_at,
        )
    }

    /// The number of records in the memo table.
    pub fn records(&self) -> usize {
        self.table.borrow().len()
    }

    /// Opens a dependency record for a frame that is about to execute.
    pub fn push_frame(&self) {
        self.frames.borrow_mut().push(Constraint::new());
    }

    /// Seals the innermost frame and returns its dependency record.
    pub fn pop_frame(&self) -> Constraint {
        match self.frames.borrow_mut().pop() {
            Some(deps) => deps,
            None => panic!("memodb: no active frame to seal"),
        }
    }

    /// Discards the innermost frame. Abandoned frames leave no trace in the
    /// memo table.
    pub fn abandon_frame(&self) {
        if self.frames.borrow_mut().pop().is_none() {
            panic!("memodb: no active frame to abandon");
        }
    }

    /// Records a read or write of a named input on the active frame.
    pub fn record_input(&self, name: &str, value: &Interned) {
        if let Some(frame) = self.frames.borrow_mut().last_mut() {
            frame.push_input(name, value);
        }
    }

    /// Records a read of a module-level global slot on the active frame.
    pub fn record_global(&self, id: usize, value: &Interned) {
        if let Some(frame) = self.frames.borrow_mut().last_mut() {
            frame.push_global(id, value);
        }
    }

    /// Records a read of a captured cell on the active frame.
    pub fn record_cell(&self, cell: &Rc<dyn track::Cell>, value: &Interned) {
        if let Some(frame) = self.frames.borrow_mut().last_mut() {
            frame.push_cell(cell, value);
        }
    }

    /// Snapshots a list's modification tick on the active frame.
    pub fn record_list(&self, container: &Rc<dyn Mutable>) {
        if let Some(frame) = self.frames.borrow_mut().last_mut() {
            frame.push_list(container);
        }
    }

    /// Snapshots a dict's modification tick on the active frame.
    pub fn record_dict(&self, container: &Rc<dyn Mutable>) {
        if let Some(frame) = self.frames.borrow_mut().last_mut() {
            frame.push_dict(container);
        }
    }

    /// Snapshots a set's modification tick on the active frame.
    pub fn record_set(&self, container: &Rc<dyn Mutable>) {
        if let Some(frame) = self.frames.borrow_mut().last_mut() {
            frame.push_set(container);
        }
    }

    /// Appends a nested call's record to the active frame.
    pub fn record_call(&self, record: &Rc<Record>) {
        if let Some(frame) = self.frames.borrow_mut().last_mut() {
            frame.push_call(record);
        }
    }

    /// Flags the active frame as having invoked an effectful builtin.
    pub fn record_effect(&self) {
        if let Some(frame) = self.frames.borrow_mut().last_mut() {
            frame.push_effect();
        }
    }

    /// Returns a handle to the named input slot. An unknown name with a
    /// default seeds the registry with that default; seeding is idempotent
    /// across repeated requests.
    pub fn input(self: &Rc<Self>, name: &str, default: Option<ValueRef>) -> Input {
        if let Some(value) = default {
            if self.inputs.borrow_mut().seed(name, value) {
                self.bump_version();
            }
        }
        let key = self
            .inputs
            .borrow()
            .key(name)
            .unwrap_or_else(|| Rc::from(name));
        Input::new(self.clone(), key)
    }

    /// Replaces the named input slot and bumps the version. This is how the
    /// host driver feeds new inputs between evaluations.
    pub fn set_input(&self, name: &str, value: ValueRef) {
        self.inputs.borrow_mut().set(name, value.clone());
        self.bump_version();
        self.record_input(name, &Interned::new(&value));
    }

    /// Reads the named input slot, recording the read on the active frame.
    pub(crate) fn read_input(&self, name: &str) -> Option<ValueRef> {
        let value = self.inputs.borrow().get(name);
        self.record_input(name, &Interned::from(value.clone()));
        value
    }

    /// Reads the named input slot without recording anything.
    pub(crate) fn input_value(&self, name: &str) -> Option<ValueRef> {
        self.inputs.borrow().get(name)
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::new()
    }
}
