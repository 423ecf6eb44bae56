use std::collections::HashSet;
use std::rc::Rc;

use crate::intern::{thin, Interned};
use crate::table::Record;
use crate::track::{Cell, Mutable};

// Domain separators for observation hashes.
const INPUT: u8 = 0;
const GLOBAL: u8 = 1;
const CELL: u8 = 2;
const TICK: u8 = 3;
const CALL: u8 = 4;

/// The dependency record of one execution frame.
///
/// While a function body executes, the interpreter logs every observation of
/// externally-visible state here: named inputs, module globals, captured
/// cells, container tick snapshots and the records of nested memoized calls.
/// Observations are kept in program order; exact duplicates are collapsed
/// through 128-bit observation hashes, which preserves the conjunction the
/// validator later checks. A variable that is read, written and re-read
/// therefore appears once per distinct observed value.
pub struct Constraint {
    inputs: Vec<(Rc<str>, Interned)>,
    globals: Vec<(usize, Interned)>,
    cells: Vec<(Rc<dyn Cell>, Interned)>,
    lists: Vec<(Rc<dyn Mutable>, u64)>,
    dicts: Vec<(Rc<dyn Mutable>, u64)>,
    sets: Vec<(Rc<dyn Mutable>, u64)>,
    calls: Vec<Rc<Record>>,
    effects: bool,
    /// Hashes of observations already recorded.
    seen: HashSet<u128>,
}

impl Constraint {
    /// Creates an empty dependency record.
    pub fn new() -> Self {
        Self {
            inputs: Vec::new(),
            globals: Vec::new(),
            cells: Vec::new(),
            lists: Vec::new(),
            dicts: Vec::new(),
            sets: Vec::new(),
            calls: Vec::new(),
            effects: false,
            seen: HashSet::new(),
        }
    }

    /// Records a read or write of the named input.
    pub(crate) fn push_input(&mut self, name: &str, value: &Interned) {
        if self.seen.insert(crate::hash::hash(&(INPUT, name, value.address()))) {
            self.inputs.push((Rc::from(name), value.clone()));
        }
    }

    /// Records a read of a module-level global slot.
    pub(crate) fn push_global(&mut self, id: usize, value: &Interned) {
        if self.seen.insert(crate::hash::hash(&(GLOBAL, id, value.address()))) {
            self.globals.push((id, value.clone()));
        }
    }

    /// Records a read of a captured cell.
    pub(crate) fn push_cell(&mut self, cell: &Rc<dyn Cell>, value: &Interned) {
        if self.seen.insert(crate::hash::hash(&(CELL, thin(cell), value.address()))) {
            self.cells.push((cell.clone(), value.clone()));
        }
    }

    /// Snapshots a list's modification tick. The first observation wins;
    /// later reads of the same container do not overwrite it.
    pub(crate) fn push_list(&mut self, container: &Rc<dyn Mutable>) {
        if self.observe(container) {
            self.lists.push((container.clone(), container.tick()));
        }
    }

    /// Snapshots a dict's modification tick.
    pub(crate) fn push_dict(&mut self, container: &Rc<dyn Mutable>) {
        if self.observe(container) {
            self.dicts.push((container.clone(), container.tick()));
        }
    }

    /// Snapshots a set's modification tick.
    pub(crate) fn push_set(&mut self, container: &Rc<dyn Mutable>) {
        if self.observe(container) {
            self.sets.push((container.clone(), container.tick()));
        }
    }

    /// Appends the record of a nested memoized call.
    pub(crate) fn push_call(&mut self, record: &Rc<Record>) {
        if self.seen.insert(crate::hash::hash(&(CALL, thin(record)))) {
            self.calls.push(record.clone());
        }
    }

    /// Marks the frame as having invoked an effectful builtin. Frames with
    /// effects are never sealed into the memo table.
    pub(crate) fn push_effect(&mut self) {
        self.effects = true;
    }

    fn observe(&mut self, container: &Rc<dyn Mutable>) -> bool {
        self.seen.insert(crate::hash::hash(&(TICK, thin(container))))
    }

    /// The recorded input observations.
    pub fn inputs(&self) -> &[(Rc<str>, Interned)] {
        &self.inputs
    }

    /// The recorded global observations.
    pub fn globals(&self) -> &[(usize, Interned)] {
        &self.globals
    }

    /// The recorded cell observations.
    pub fn cells(&self) -> &[(Rc<dyn Cell>, Interned)] {
        &self.cells
    }

    /// The recorded list tick snapshots.
    pub fn lists(&self) -> &[(Rc<dyn Mutable>, u64)] {
        &self.lists
    }

    /// The recorded dict tick snapshots.
    pub fn dicts(&self) -> &[(Rc<dyn Mutable>, u64)] {
        &self.dicts
    }

    /// The recorded set tick snapshots.
    pub fn sets(&self) -> &[(Rc<dyn Mutable>, u64)] {
        &self.sets
    }

    /// The records of nested memoized calls this frame depends on.
    pub fn calls(&self) -> &[Rc<Record>] {
        &self.calls
    }

    /// Whether an effectful builtin was invoked during the frame.
    pub fn effects(&self) -> bool {
        self.effects
    }
}

impl Default for Constraint {
    fn default() -> Self {
        Self::new()
    }
}
