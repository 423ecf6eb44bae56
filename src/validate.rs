use std::collections::HashSet;
use std::rc::Rc;

use crate::cache::Cache;
use crate::intern::{thin, Interned};
use crate::table::Record;

/// One record on the validation walk.
struct Walk {
    record: Rc<Record>,
    /// Whether the record's own observations still need checking.
    fresh: bool,
    /// Index of the next child call to visit.
    next_call: usize,
}

/// The next move of the walk.
enum Step {
    /// The record and everything below it is valid.
    Valid,
    /// A dependency no longer holds; the walk is over.
    Invalid,
    /// A child call must be validated first.
    Descend(Rc<Record>),
}

impl Cache {
    /// Decides whether a cached record may be reused.
    ///
    /// A record is valid when every observation in its dependency record
    /// still holds against current program state: each input, global and
    /// cell read yields the identical value, no observed container has
    /// ticked past its snapshot, and every nested call's record is itself
    /// valid. Verdicts are memoized per version: a record verified at the
    /// current version is valid without any walking, and a record that has
    /// failed once is marked permanently stale (verified zero) so repeated
    /// lookups of it stay cheap until a fresh insertion replaces it.
    ///
    /// The walk is iterative; call graphs may be deeper than the native
    /// stack.
    pub fn validate(&self, record: &Rc<Record>) -> bool {
        let version = self.version();
        let mut stack = vec![Walk { record: record.clone(), fresh: true, next_call: 0 }];
        let mut active = HashSet::new();
        active.insert(thin(record));

        while let Some(top) = stack.last_mut() {
            match self.step(top, version, &active) {
                Step::Valid => {
                    let frame = stack.pop().unwrap();
                    frame.record.mark(version);
                    active.remove(&thin(&frame.record));
                }
                Step::Descend(child) => {
                    active.insert(thin(&child));
                    stack.push(Walk { record: child, fresh: true, next_call: 0 });
                }
                Step::Invalid => {
                    for frame in &stack {
                        frame.record.mark(0);
                    }
                    return false;
                }
            }
        }
        true
    }

    fn step(&self, frame: &mut Walk, version: u64, active: &HashSet<usize>) -> Step {
        if frame.fresh {
            frame.fresh = false;
            let verified = frame.record.verified();
            if verified == version {
                return Step::Valid;
            }
            if verified == 0 {
                return Step::Invalid;
            }
            if !self.observations_hold(&frame.record) {
                return Step::Invalid;
            }
        }

        let calls = frame.record.deps().calls();
        while let Some(child) = calls.get(frame.next_call) {
            frame.next_call += 1;
            if child.verified() == version {
                continue;
            }
            if active.contains(&thin(child)) {
                // A record reachable from itself cannot be trusted; the
                // interpreter never produces one, so treat it as invalid.
                return Step::Invalid;
            }
            return Step::Descend(child.clone());
        }
        Step::Valid
    }

    /// Checks the record's own observations, ignoring nested calls.
    fn observations_hold(&self, record: &Rc<Record>) -> bool {
        let deps = record.deps();

        for (name, seen) in deps.inputs() {
            let current = Interned::from(self.input_value(name));
            if current != *seen {
                return false;
            }
        }

        for (id, seen) in deps.globals() {
            let current = Interned::from(record.function().global(*id));
            if current != *seen {
                return false;
            }
        }

        for (cell, seen) in deps.cells() {
            let current = Interned::from(cell.load());
            if current != *seen {
                return false;
            }
        }

        let ticks = deps.lists().iter().chain(deps.dicts()).chain(deps.sets());
        for (container, tick) in ticks {
            // Ticks never roll back, so anything newer means a mutation.
            if container.tick() > *tick {
                return false;
            }
        }

        true
    }
}
