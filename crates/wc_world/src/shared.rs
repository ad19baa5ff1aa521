//! Publication of registry snapshots to concurrent readers.

use bevy::prelude::Resource;
use parking_lot::RwLock;
use std::sync::Arc;

use crate::registry::WorldDataRegistry;

/// Holds the current registry. Readers take an `Arc` snapshot that never
/// changes underneath them; writers replace or copy-on-write the pointer.
#[derive(Resource, Clone, Default)]
pub struct SharedRegistry {
    current: Arc<RwLock<Arc<WorldDataRegistry>>>,
}

impl SharedRegistry {
    pub fn new(registry: WorldDataRegistry) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(registry))),
        }
    }

    pub fn snapshot(&self) -> Arc<WorldDataRegistry> {
        self.current.read().clone()
    }

    /// Swap in a fully built registry, returning the one it replaces.
    pub fn publish(&self, registry: WorldDataRegistry) -> Arc<WorldDataRegistry> {
        std::mem::replace(&mut *self.current.write(), Arc::new(registry))
    }

    /// Apply a single-writer edit. Outstanding snapshots keep the old data;
    /// the registry is cloned only if one exists.
    pub fn modify<T>(&self, edit: impl FnOnce(&mut WorldDataRegistry) -> T) -> T {
        let mut current = self.current.write();
        edit(Arc::make_mut(&mut *current))
    }
}
