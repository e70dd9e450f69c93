//! In-flight fetch registry.
//!
//! Each coordinator owns one registry, so independent coordinators (and
//! tests) never observe each other's fetches. The check-and-insert happens
//! under a synchronous lock with no suspension point in between.

use crate::fields::FieldGroup;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

type Key = (FieldGroup, String);

/// Set of `(group, resource)` pairs currently being fetched.
#[derive(Debug, Clone, Default)]
pub struct InFlightRegistry {
    inner: Arc<Mutex<HashSet<Key>>>,
}

impl InFlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<Key>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Claim a fetch slot, or `None` if another task already holds it.
    ///
    /// The slot is released when the returned guard is dropped.
    pub fn try_acquire(&self, group: FieldGroup, resource: &str) -> Option<InFlightGuard> {
        let key = (group, resource.to_string());
        if self.lock().insert(key.clone()) {
            Some(InFlightGuard {
                registry: self.clone(),
                key,
            })
        } else {
            None
        }
    }

    pub fn contains(&self, group: FieldGroup, resource: &str) -> bool {
        self.lock().contains(&(group, resource.to_string()))
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Releases its registry slot on drop.
#[derive(Debug)]
pub struct InFlightGuard {
    registry: InFlightRegistry,
    key: Key,
}

impl InFlightGuard {
    pub fn group(&self) -> FieldGroup {
        self.key.0
    }

    pub fn resource(&self) -> &str {
        &self.key.1
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.registry.lock().remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_is_refused_until_release() {
        let registry = InFlightRegistry::new();
        let guard = registry
            .try_acquire(FieldGroup::Preview, "https://a.example")
            .unwrap();
        assert_eq!(guard.resource(), "https://a.example");
        assert!(registry
            .try_acquire(FieldGroup::Preview, "https://a.example")
            .is_none());

        // Other group, same resource
        let other = registry.try_acquire(FieldGroup::Screenshot, "https://a.example");
        assert!(other.is_some());

        drop(guard);
        assert!(!registry.contains(FieldGroup::Preview, "https://a.example"));
        assert!(registry
            .try_acquire(FieldGroup::Preview, "https://a.example")
            .is_some());
    }

    #[test]
    fn test_independent_registries_do_not_share_state() {
        let a = InFlightRegistry::new();
        let b = InFlightRegistry::new();
        let _held = a.try_acquire(FieldGroup::Preview, "x").unwrap();
        assert!(b.try_acquire(FieldGroup::Preview, "x").is_some());
        assert_eq!(a.len(), 1);
        assert!(b.is_empty());
    }
}
