use std::cell::Cell;
use std::mem;
use std::rc::Rc;

use crate::constraint::Constraint;
use crate::hash;
use crate::intern::{thin, Interned};
use crate::track::Function;

/// A memoized result together with the dependencies under which it was
/// produced.
pub struct Record {
    func: Rc<dyn Function>,
    args: Box<[Interned]>,
    deps: Constraint,
    result: Interned,
    /// The version at which the record was last verified. Zero marks the
    /// record as known-stale; it stays stale until a fresh insertion
    /// replaces it.
    verified: Cell<u64>,
}

impl Record {
    /// The memoized result.
    pub fn result(&self) -> &Interned {
        &self.result
    }

    /// The dependencies under which the result was produced.
    pub fn deps(&self) -> &Constraint {
        &self.deps
    }

    /// The function whose call this record memoizes.
    pub fn function(&self) -> &Rc<dyn Function> {
        &self.func
    }

    /// The interned arguments of the memoized call.
    pub fn args(&self) -> &[Interned] {
        &self.args
    }

    pub(crate) fn verified(&self) -> u64 {
        self.verified.get()
    }

    pub(crate) fn mark(&self, version: u64) {
        self.verified.set(version);
    }

    /// Whether this record occupies the slot for the given key.
    fn matches(&self, func: &Rc<dyn Function>, args: &[Interned]) -> bool {
        fn_equal(&self.func, func)
            && self.args.len() == args.len()
            && self.args.iter().zip(args).all(|(a, b)| a == b)
    }
}

/// Whether two function objects have the same identity: the same object, or
/// the same code over identity-equal free-variable values. Closures over
/// the same code but different environments compare unequal.
pub(crate) fn fn_equal(a: &Rc<dyn Function>, b: &Rc<dyn Function>) -> bool {
    if thin(a) == thin(b) {
        return true;
    }
    a.code() == b.code() && {
        let (fa, fb) = (a.free_vars(), b.free_vars());
        fa.len() == fb.len() && fa.iter().zip(fb).all(|(x, y)| thin(x) == thin(y))
    }
}

/// An error that can occur when inserting a record into the memo table.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum InsertError {
    /// Every slot reachable from the key's probe start is occupied by a
    /// different key. The table never resizes and never evicts a foreign
    /// key, so hitting this means the configured capacity is too small for
    /// the program.
    TableFull,
}

type Slot = Option<Rc<Record>>;

/// Capacity such that the zero-initialized table occupies about 1 MiB.
const CAPACITY: usize = (1 << 20) / mem::size_of::<Slot>();

/// A fixed-capacity, open-addressed map from call keys to records.
///
/// Addressing is linear probing; an empty slot terminates a probe chain.
/// Records are never deleted, only overwritten in place when the same key
/// is inserted again, so probe chains stay intact for the table's lifetime.
pub(crate) struct Table {
    slots: Box<[Slot]>,
    len: usize,
}

impl Table {
    pub fn new() -> Self {
        Self::with_capacity(CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { slots: vec![None; capacity].into_boxed_slice(), len: 0 }
    }

    /// The number of occupied slots.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Retrieves the record stored for the given key, stale or not.
    pub fn get(&self, func: &Rc<dyn Function>, args: &[Interned]) -> Option<Rc<Record>> {
        let mut i = self.home(hash::key(func, args));
        for _ in 0..self.slots.len() {
            match &self.slots[i] {
                None => return None,
                Some(record) if record.matches(func, args) => return Some(record.clone()),
                Some(_) => i = (i + 1) % self.slots.len(),
            }
        }
        None
    }

    /// Stores a record, overwriting a previous record with the same key.
    pub fn put(
        &mut self,
        func: Rc<dyn Function>,
        args: Box<[Interned]>,
        deps: Constraint,
        result: Interned,
        verified_at: u64,
    ) -> Result<Rc<Record>, InsertError> {
        let mut i = self.home(hash::key(&func, &args));
        for _ in 0..self.slots.len() {
            let taken = match &self.slots[i] {
                None => false,
                Some(existing) => !existing.matches(&func, &args),
            };
            if taken {
                i = (i + 1) % self.slots.len();
                continue;
            }
            if self.slots[i].is_none() {
                self.len += 1;
            }
            let record = Rc::new(Record {
                func,
                args,
                deps,
                result,
                verified: Cell::new(verified_at),
            });
            self.slots[i] = Some(record.clone());
            return Ok(record);
        }
        Err(InsertError::TableFull)
    }

    fn home(&self, hash: u128) -> usize {
        (hash % self.slots.len() as u128) as usize
    }
}
