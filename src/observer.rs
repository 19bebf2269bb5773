//! Diagnostic observers for dependency injection traceability.
//!
//! This module provides hooks for observing resolution and decoration
//! events, enabling structured tracing and debugging of decorated graphs.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{DiError, DiResult};
use crate::key::Key;
use crate::types::TypeRef;

/// Observer trait for dependency injection events.
///
/// Observers see each resolution (including resolutions of hidden proxy keys
/// made by decorator factories) and each decoration pass applied to the
/// collection after the observer was added.
///
/// # Performance
///
/// Observer calls are made synchronously during resolution. Keep implementations
/// lightweight; when no observer is registered the timing path is skipped.
///
/// # Examples
///
/// ```
/// use ferrous_decorate::{DiObserver, Key, ServiceCollection};
/// use std::sync::{Arc, Mutex};
/// use std::time::Duration;
///
/// #[derive(Default)]
/// struct Recorder {
///     seen: Mutex<Vec<String>>,
/// }
///
/// impl DiObserver for Recorder {
///     fn resolving(&self, key: &Key) {
///         self.seen.lock().unwrap().push(key.display_name());
///     }
///
///     fn resolved(&self, _key: &Key, _duration: Duration) {}
/// }
///
/// let recorder = Arc::new(Recorder::default());
/// let mut services = ServiceCollection::new();
/// services.add_observer(recorder.clone());
/// services.add_singleton(7u8);
///
/// use ferrous_decorate::Resolver;
/// let provider = services.build();
/// provider.get_required::<u8>();
/// assert_eq!(recorder.seen.lock().unwrap().as_slice(), ["u8"]);
/// ```
pub trait DiObserver: Send + Sync {
    /// Called before a registration's factory is invoked.
    fn resolving(&self, key: &Key);

    /// Called after a resolution completes successfully.
    fn resolved(&self, key: &Key, duration: Duration);

    /// Called when a resolution fails.
    fn resolution_failed(&self, _key: &Key, _error: &DiError) {}

    /// Called after a decoration pass rewrote `count` registrations of `service`.
    fn decorated(&self, _service: &TypeRef, _count: usize) {}
}

/// Container for registered observers.
///
/// Designed to have minimal overhead when no observers are registered.
#[derive(Clone, Default)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn DiObserver>>,
}

impl Observers {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&mut self, observer: Arc<dyn DiObserver>) {
        self.observers.push(observer);
    }

    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }

    /// Runs a resolution, reporting it to every observer.
    #[inline]
    pub(crate) fn observe<T, F>(&self, key: &Key, f: F) -> DiResult<T>
    where
        F: FnOnce() -> DiResult<T>,
    {
        if !self.has_observers() {
            return f();
        }

        let start = Instant::now();
        for observer in &self.observers {
            observer.resolving(key);
        }

        let result = f();

        match &result {
            Ok(_) => {
                let duration = start.elapsed();
                for observer in &self.observers {
                    observer.resolved(key, duration);
                }
            }
            Err(e) => {
                for observer in &self.observers {
                    observer.resolution_failed(key, e);
                }
            }
        }
        result
    }

    pub(crate) fn decorated(&self, service: &TypeRef, count: usize) {
        for observer in &self.observers {
            observer.decorated(service, count);
        }
    }
}

/// Built-in observer that emits `tracing` events.
///
/// # Examples
///
/// ```
/// use ferrous_decorate::{LoggingObserver, ServiceCollection};
/// use std::sync::Arc;
///
/// let mut services = ServiceCollection::new();
/// services.add_observer(Arc::new(LoggingObserver::new()));
///
/// // All resolutions will be logged at debug level
/// let provider = services.build();
/// ```
pub struct LoggingObserver {
    prefix: String,
}

impl LoggingObserver {
    /// Creates a new logging observer with default prefix.
    pub fn new() -> Self {
        Self {
            prefix: "ferrous-decorate".to_string(),
        }
    }

    /// Creates a new logging observer with a custom prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl DiObserver for LoggingObserver {
    fn resolving(&self, key: &Key) {
        tracing::debug!(prefix = %self.prefix, %key, proxy = key.is_proxy(), "resolving");
    }

    fn resolved(&self, key: &Key, duration: Duration) {
        tracing::debug!(prefix = %self.prefix, %key, ?duration, "resolved");
    }

    fn resolution_failed(&self, key: &Key, error: &DiError) {
        tracing::warn!(prefix = %self.prefix, %key, %error, "resolution failed");
    }

    fn decorated(&self, service: &TypeRef, count: usize) {
        tracing::debug!(prefix = %self.prefix, %service, count, "decorated");
    }
}
