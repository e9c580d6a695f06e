//! Shared holder for the current catalog snapshot.
//!
//! Readers clone an `Arc` and keep using it for as long as they like; a reload
//! builds the replacement completely before swapping the pointer, so nobody
//! ever sees a half-built catalog and a failed reload changes nothing.

use crate::catalog::Catalog;
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

#[derive(Debug)]
pub struct CatalogStore {
    current: RwLock<Arc<Catalog>>,
    generation: AtomicU64,
}

impl CatalogStore {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            current: RwLock::new(Arc::new(catalog)),
            generation: AtomicU64::new(0),
        }
    }

    /// The catalog in effect right now. The returned snapshot is unaffected
    /// by later reloads.
    pub fn snapshot(&self) -> Arc<Catalog> {
        Arc::clone(&self.current.read())
    }

    /// Number of successful swaps since construction.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Publish `catalog` and return the snapshot it replaced.
    pub fn replace(&self, catalog: Catalog) -> Arc<Catalog> {
        let next = Arc::new(catalog);
        let previous = {
            let mut guard = self.current.write();
            std::mem::replace(&mut *guard, next)
        };
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        debug!(generation, "catalog snapshot replaced");
        previous
    }

    /// Build a new catalog with `build` and publish it on success. On error
    /// the current snapshot stays in place and the error is returned.
    pub fn reload<E, F>(&self, build: F) -> Result<Arc<Catalog>, E>
    where
        F: FnOnce() -> Result<Catalog, E>,
        E: std::fmt::Display,
    {
        match build() {
            Ok(catalog) => {
                let namespaces = catalog.namespaces().count();
                let parameters = catalog.parameter_count();
                self.replace(catalog);
                info!(namespaces, parameters, "catalog reloaded");
                Ok(self.snapshot())
            }
            Err(err) => {
                warn!(error = %err, "catalog reload failed; keeping previous snapshot");
                Err(err)
            }
        }
    }
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new(Catalog::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::{ParamType, ParameterDefinition};
    use crate::registry::{Namespace, ParameterRegistry};

    fn catalog_with(names: &[&str]) -> Catalog {
        let mut registry = ParameterRegistry::new(Namespace::parse("common/parameters").unwrap());
        for name in names {
            registry
                .register(
                    ParameterDefinition::builder(*name, ParamType::Boolean)
                        .build()
                        .unwrap(),
                )
                .unwrap();
        }
        Catalog::compose([registry]).unwrap()
    }

    #[test]
    fn held_snapshot_survives_reload() {
        let store = CatalogStore::new(catalog_with(&["a"]));
        let before = store.snapshot();

        store
            .reload(|| Ok::<_, String>(catalog_with(&["a", "b"])))
            .unwrap();

        assert_eq!(before.parameter_count(), 1);
        assert_eq!(store.snapshot().parameter_count(), 2);
        assert_eq!(store.generation(), 1);
    }

    #[test]
    fn failed_reload_keeps_previous_snapshot() {
        let store = CatalogStore::new(catalog_with(&["a"]));
        let err = store
            .reload(|| Err::<Catalog, _>("broken declaration".to_string()))
            .unwrap_err();

        assert_eq!(err, "broken declaration");
        assert_eq!(store.snapshot().parameter_count(), 1);
        assert_eq!(store.generation(), 0);
    }

    #[test]
    fn concurrent_readers_see_whole_snapshots() {
        let store = Arc::new(CatalogStore::new(catalog_with(&["a"])));
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        let count = store.snapshot().parameter_count();
                        assert!(count == 1 || count == 2);
                    }
                })
            })
            .collect();
        for _ in 0..50 {
            store.replace(catalog_with(&["a", "b"]));
            store.replace(catalog_with(&["a"]));
        }
        for reader in readers {
            reader.join().unwrap();
        }
    }
}
