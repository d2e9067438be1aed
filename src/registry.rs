//! Migrator registry.
//!
//! Maps (resource kind, from-version, to-version) to a migrator instance.
//! Registration is idempotent and order-independent: the last registration
//! for a key wins. Several kind keys (deprecated aliases) may map to one
//! instance; `can_handle` stays the authoritative claim on dispatch.

use std::collections::HashMap;
use std::sync::Arc;

use crate::migrator::Migrator;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RegistryKey {
    kind: String,
    from_version: u64,
    to_version: u64,
}

/// Explicitly constructed, injected into the pipeline; the only state shared
/// across documents in a batch run, and read-only once built.
#[derive(Default)]
pub struct Registry {
    entries: HashMap<RegistryKey, Arc<dyn Migrator>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a migrator for a kind and version pair. Re-registration
    /// with the same key overwrites.
    pub fn register(
        &mut self,
        kind: impl Into<String>,
        from_version: u64,
        to_version: u64,
        migrator: Arc<dyn Migrator>,
    ) {
        self.entries.insert(
            RegistryKey {
                kind: kind.into(),
                from_version,
                to_version,
            },
            migrator,
        );
    }

    /// Look up the migrator for a kind and version pair. A direct hit is
    /// confirmed with `can_handle`; when the key is absent (a deprecated
    /// alias never registered directly), the version pair's migrators are
    /// scanned for one that claims the kind.
    pub fn lookup(
        &self,
        kind: &str,
        from_version: u64,
        to_version: u64,
    ) -> Option<Arc<dyn Migrator>> {
        let key = RegistryKey {
            kind: kind.to_string(),
            from_version,
            to_version,
        };
        if let Some(m) = self.entries.get(&key) {
            if m.can_handle(kind) {
                return Some(Arc::clone(m));
            }
        }
        self.entries
            .iter()
            .find(|(k, m)| {
                k.from_version == from_version && k.to_version == to_version && m.can_handle(kind)
            })
            .map(|(_, m)| Arc::clone(m))
    }

    /// Distinct migrator instances registered for a version pair, in
    /// registration-key order (sorted by kind for determinism).
    pub fn migrators(&self, from_version: u64, to_version: u64) -> Vec<Arc<dyn Migrator>> {
        let mut keys: Vec<&RegistryKey> = self
            .entries
            .keys()
            .filter(|k| k.from_version == from_version && k.to_version == to_version)
            .collect();
        keys.sort_by(|a, b| a.kind.cmp(&b.kind));
        let mut out: Vec<Arc<dyn Migrator>> = Vec::new();
        for key in keys {
            let m = &self.entries[key];
            if !out.iter().any(|seen| Arc::ptr_eq(seen, m)) {
                out.push(Arc::clone(m));
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
