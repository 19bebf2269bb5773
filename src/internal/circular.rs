//! Circular dependency detection infrastructure.

use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};

use crate::error::{DiError, DiResult};
use crate::key::Key;

pub(crate) const MAX_DEPTH: usize = 1024;

// Thread-local resolution state for circular dependency detection
thread_local! {
    static RESOLUTION_TLS: RefCell<ResolutionTls> = RefCell::new(ResolutionTls::default());
}

#[derive(Default)]
struct ResolutionTls {
    stack: Vec<Key>,
}

/// Panic payload for circular dependency detection.
///
/// When a circular dependency is detected during service resolution,
/// this panic payload carries the complete dependency path for debugging.
/// The outermost resolver boundary turns it into [`DiError::Circular`].
///
/// Example path: `["ServiceA", "ServiceB", "ServiceC", "ServiceA"]`
#[derive(Debug)]
pub struct CircularPanic {
    /// The complete circular dependency path showing the cycle.
    pub path: Box<[String]>,
}

impl CircularPanic {
    pub(crate) fn new(path: Vec<String>) -> Self {
        CircularPanic { path: path.into_boxed_slice() }
    }
}

/// Guard for managing thread-local resolution stack
pub(crate) struct StackGuard {
    _private: (),
}

impl StackGuard {
    pub(crate) fn new(key: &Key) -> Self {
        RESOLUTION_TLS.with(|tls| {
            let mut tls = tls.borrow_mut();

            // Circular detection BEFORE pushing the new key
            if tls.stack.iter().any(|k| k == key) {
                let mut path: Vec<String> = tls.stack.iter().map(Key::display_name).collect();
                path.push(key.display_name());
                drop(tls);
                panic::panic_any(CircularPanic::new(path));
            }

            if tls.stack.len() >= MAX_DEPTH {
                let depth = tls.stack.len();
                drop(tls);
                panic::panic_any(DiError::DepthExceeded(depth));
            }

            tls.stack.push(key.clone());
        });

        Self { _private: () }
    }
}

impl Drop for StackGuard {
    fn drop(&mut self) {
        RESOLUTION_TLS.with(|tls| {
            tls.borrow_mut().stack.pop();
        });
    }
}

fn stack_is_empty() -> bool {
    RESOLUTION_TLS.with(|tls| tls.borrow().stack.is_empty())
}

/// Execute a closure with circular dependency detection
///
/// Nested frames let a `CircularPanic` keep unwinding; only the outermost
/// frame converts it into an error, so the reported path is always complete.
pub(crate) fn with_circular_catch<T, F>(key: &Key, f: F) -> DiResult<T>
where
    F: FnOnce() -> DiResult<T>,
{
    let outcome = {
        let _guard = StackGuard::new(key);
        panic::catch_unwind(AssertUnwindSafe(f))
    };

    match outcome {
        Ok(result) => result,
        Err(payload) => {
            if !stack_is_empty() {
                panic::resume_unwind(payload);
            }
            if let Some(circular) = payload.downcast_ref::<CircularPanic>() {
                Err(DiError::Circular(circular.path.to_vec()))
            } else if let Some(err) = payload.downcast_ref::<DiError>() {
                Err(err.clone())
            } else {
                panic::resume_unwind(payload);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeRef;

    #[test]
    fn stack_unwinds_after_cycle() {
        let a = Key::Service(TypeRef::named("A"));
        let b = Key::Service(TypeRef::named("B"));

        let result: DiResult<()> = with_circular_catch(&a, || {
            with_circular_catch(&b, || with_circular_catch(&a, || Ok(())))
        });

        match result {
            Err(DiError::Circular(path)) => assert_eq!(path, vec!["A", "B", "A"]),
            other => panic!("expected circular error, got {:?}", other),
        }
        assert!(stack_is_empty());
    }

    #[test]
    fn distinct_keys_resolve() {
        let a = Key::Service(TypeRef::named("A"));
        let b = Key::Service(TypeRef::named("B"));
        let value = with_circular_catch(&a, || with_circular_catch(&b, || Ok(7)));
        assert_eq!(value.unwrap(), 7);
    }
}
