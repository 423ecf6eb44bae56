use std::hash::{Hash, Hasher};
use std::rc::Rc;

use siphasher::sip128::{Hasher128, SipHasher13};

use crate::intern::{thin, Interned};
use crate::track::Function;

/// Produce a 128-bit hash of a value.
pub(crate) fn hash<T: Hash>(value: &T) -> u128 {
    let mut state = SipHasher13::new();
    value.hash(&mut state);
    state.finish128().as_u128()
}

/// The memo key for a call: mixes the function's code identity, the
/// identity sequence of its free-variable values and the identity sequence
/// of the arguments. Deterministic within one process.
pub(crate) fn key(func: &Rc<dyn Function>, args: &[Interned]) -> u128 {
    let mut state = SipHasher13::new();
    state.write_usize(func.code());
    let free = func.free_vars();
    state.write_usize(free.len());
    for value in free {
        state.write_usize(thin(value));
    }
    state.write_usize(args.len());
    for arg in args {
        state.write_usize(arg.address());
    }
    state.finish128().as_u128()
}
