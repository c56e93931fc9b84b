//! Default Backend Registry
//!
//! Holds the backend used when a caller does not supply one.

use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::info;

use crate::cache::{MemoryCache, SharedBackend};

static GLOBAL_REGISTRY: Lazy<BackendRegistry> = Lazy::new(BackendRegistry::new);

// == Backend Registry ==
/// Lazily initialised holder for one shared default backend.
///
/// Create one per application (or per test) and pass it where it is needed;
/// [`BackendRegistry::global`] is the single process-wide instance, used by
/// the decorator only when it is given neither a backend nor a registry.
#[derive(Default)]
pub struct BackendRegistry {
    slot: RwLock<Option<SharedBackend>>,
}

impl BackendRegistry {
    /// Creates an empty registry; the first `backend()` call fills it.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry pre-populated with `backend`.
    pub fn with_backend(backend: SharedBackend) -> Self {
        Self {
            slot: RwLock::new(Some(backend)),
        }
    }

    /// The process-wide registry.
    pub fn global() -> &'static BackendRegistry {
        &GLOBAL_REGISTRY
    }

    // == Backend ==
    /// Returns the default backend, creating an in-process one on first use.
    pub fn backend(&self) -> SharedBackend {
        if let Some(backend) = self.slot.read().as_ref() {
            return Arc::clone(backend);
        }

        let mut slot = self.slot.write();
        let backend = slot.get_or_insert_with(|| {
            info!("creating default in-process cache backend");
            Arc::new(MemoryCache::new())
        });
        Arc::clone(backend)
    }

    // == Set Backend ==
    /// Replaces the default backend for all future resolutions.
    pub fn set_backend(&self, backend: SharedBackend) {
        info!(backend = backend.backend_name(), "default cache backend replaced");
        *self.slot.write() = Some(backend);
    }

    /// True once a backend has been created or set.
    pub fn is_initialized(&self) -> bool {
        self.slot.read().is_some()
    }
}

impl std::fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendRegistry")
            .field(
                "backend",
                &self.slot.read().as_ref().map(|b| b.backend_name()),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::BackendConfig;

    #[test]
    fn test_lazy_creation() {
        let registry = BackendRegistry::new();
        assert!(!registry.is_initialized());

        let backend = registry.backend();

        assert!(registry.is_initialized());
        assert_eq!(backend.backend_name(), "memory");
    }

    #[test]
    fn test_same_instance_returned() {
        let registry = BackendRegistry::new();

        let first = registry.backend();
        let second = registry.backend();

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_set_backend_replaces_default() {
        let registry = BackendRegistry::new();
        let original = registry.backend();

        let replacement: SharedBackend = Arc::new(MemoryCache::with_config(
            BackendConfig::with_default_expire(9),
        ));
        registry.set_backend(replacement.clone());

        let resolved = registry.backend();
        assert!(Arc::ptr_eq(&resolved, &replacement));
        assert!(!Arc::ptr_eq(&resolved, &original));
    }

    #[test]
    fn test_registries_are_isolated() {
        let a = BackendRegistry::new();
        let b = BackendRegistry::new();

        assert!(!Arc::ptr_eq(&a.backend(), &b.backend()));
    }

    #[test]
    fn test_global_is_shared() {
        let first = BackendRegistry::global();
        let second = BackendRegistry::global();

        assert!(std::ptr::eq(first, second));
        assert!(Arc::ptr_eq(&first.backend(), &second.backend()));
    }
}
