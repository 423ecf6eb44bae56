use std::rc::Rc;

use crate::cache::Cache;
use crate::intern::Interned;
use crate::track::Function;

/// Executes a function call through the cache.
///
/// This is the protocol the interpreter follows around every call to a
/// user-defined function: look up a record for the call, reuse its result
/// if it validates, and otherwise execute `body` under a fresh frame and
/// seal the frame into a new record. Either way the call ends up as a child
/// dependency of the enclosing frame, except that a frame which invoked an
/// effectful builtin is not cached at all and instead passes the effects
/// flag on to its caller.
///
/// `body` runs with the new frame already pushed; the instrumented
/// interpreter records reads into it through the `record_*` methods on the
/// cache. An error from `body` abandons the frame and propagates.
///
/// # Panics
///
/// Panics if the memo table is full. The table never resizes; overflowing
/// it is a configuration error, not a runtime condition.
pub fn memoize<E>(
    cache: &Cache,
    func: &Rc<dyn Function>,
    args: &[Interned],
    body: impl FnOnce() -> Result<Interned, E>,
) -> Result<Interned, E> {
    if let Some(record) = cache.get(func, args) {
        if cache.validate(&record) {
            cache.record_call(&record);

            #[cfg(feature = "testing")]
            crate::testing::register_hit();

            return Ok(record.result().clone());
        }
    }

    cache.push_frame();
    let result = match body() {
        Ok(result) => result,
        Err(error) => {
            cache.abandon_frame();
            return Err(error);
        }
    };
    let deps = cache.pop_frame();

    if deps.effects() {
        // The result is not reproducible; the caller inherits the flag
        // instead of a child record.
        cache.record_effect();
    } else {
        match cache.put(func, args, deps, result.clone(), cache.version()) {
            Ok(record) => cache.record_call(&record),
            Err(error) => {
                panic!(
                    "memodb: memo table overflow ({error:?}). \
                     the fixed capacity is too small for this program"
                );
            }
        }
    }

    #[cfg(feature = "testing")]
    crate::testing::register_miss();

    Ok(result)
}
