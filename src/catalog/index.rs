//! Composed view over every loaded parameter registry.
//!
//! Composition is strict about namespaces (two sources may not claim the same
//! one) and lazy about names: a name declared in several namespaces is only an
//! error when someone asks for it without a namespace.

use crate::catalog::{ParamRef, QualifiedName};
use crate::error::CatalogError;
use crate::parameter::ParameterDefinition;
use crate::registry::{Namespace, ParameterRegistry};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Clone, Debug, PartialEq, Eq)]
enum NameIndexEntry {
    Unique(Namespace),
    /// Tombstone for a name declared by more than one namespace.
    Ambiguous(BTreeSet<Namespace>),
}

/// A definition found in the catalog, together with where it lives.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Resolved<'a> {
    pub namespace: &'a Namespace,
    pub definition: &'a ParameterDefinition,
}

impl Resolved<'_> {
    pub fn qualified_name(&self) -> QualifiedName {
        QualifiedName::new(self.namespace.clone(), self.definition.name())
    }
}

/// Immutable catalog snapshot: registries keyed by namespace plus a derived
/// unqualified-name index.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Catalog {
    registries: BTreeMap<Namespace, ParameterRegistry>,
    by_name: BTreeMap<String, NameIndexEntry>,
}

impl Catalog {
    /// Merge registries into a catalog.
    ///
    /// Fails only when two registries declare the same namespace. Input order
    /// does not affect the result.
    pub fn compose<I>(registries: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = ParameterRegistry>,
    {
        let mut by_namespace: BTreeMap<Namespace, ParameterRegistry> = BTreeMap::new();
        for registry in registries {
            if by_namespace.contains_key(registry.namespace()) {
                return Err(CatalogError::NamespaceCollision {
                    namespace: registry.namespace().to_string(),
                });
            }
            by_namespace.insert(registry.namespace().clone(), registry);
        }

        let by_name = build_name_index(&by_namespace);
        Ok(Self {
            registries: by_namespace,
            by_name,
        })
    }

    pub fn lookup_qualified(
        &self,
        namespace: &Namespace,
        name: &str,
    ) -> Result<&ParameterDefinition, CatalogError> {
        self.registries
            .get(namespace)
            .and_then(|registry| registry.get(name))
            .ok_or_else(|| CatalogError::NotFound {
                reference: format!("{namespace}/{name}"),
            })
    }

    /// Look a name up without a namespace; only succeeds when exactly one
    /// registry declares it.
    pub fn lookup_unqualified(&self, name: &str) -> Result<Resolved<'_>, CatalogError> {
        match self.by_name.get(name) {
            None => Err(CatalogError::NotFound {
                reference: name.to_string(),
            }),
            Some(NameIndexEntry::Ambiguous(namespaces)) => Err(CatalogError::AmbiguousName {
                name: name.to_string(),
                namespaces: namespaces.iter().map(ToString::to_string).collect(),
            }),
            Some(NameIndexEntry::Unique(namespace)) => self.resolve(&ParamRef::Qualified(
                QualifiedName::new(namespace.clone(), name),
            )),
        }
    }

    pub fn resolve(&self, reference: &ParamRef) -> Result<Resolved<'_>, CatalogError> {
        match reference {
            ParamRef::Unqualified(name) => self.lookup_unqualified(name),
            ParamRef::Qualified(qualified) => {
                let (namespace, registry) = self
                    .registries
                    .get_key_value(&qualified.namespace)
                    .ok_or_else(|| CatalogError::NotFound {
                        reference: qualified.to_string(),
                    })?;
                let definition =
                    registry
                        .get(&qualified.name)
                        .ok_or_else(|| CatalogError::NotFound {
                            reference: qualified.to_string(),
                        })?;
                Ok(Resolved {
                    namespace,
                    definition,
                })
            }
        }
    }

    /// Parse and resolve a textual reference in one step.
    pub fn resolve_str(&self, reference: &str) -> Result<Resolved<'_>, CatalogError> {
        self.resolve(&ParamRef::parse(reference)?)
    }

    pub fn registry(&self, namespace: &Namespace) -> Option<&ParameterRegistry> {
        self.registries.get(namespace)
    }

    /// Iterates namespaces in stable order.
    pub fn namespaces(&self) -> impl Iterator<Item = &Namespace> {
        self.registries.keys()
    }

    pub fn registries(&self) -> impl Iterator<Item = &ParameterRegistry> {
        self.registries.values()
    }

    /// Every definition, ordered by namespace then name.
    pub fn iter(&self) -> impl Iterator<Item = Resolved<'_>> {
        self.registries.iter().flat_map(|(namespace, registry)| {
            registry.definitions().map(move |definition| Resolved {
                namespace,
                definition,
            })
        })
    }

    /// Names that need a namespace to be looked up.
    pub fn ambiguous_names(&self) -> impl Iterator<Item = &str> {
        self.by_name.iter().filter_map(|(name, entry)| match entry {
            NameIndexEntry::Ambiguous(_) => Some(name.as_str()),
            NameIndexEntry::Unique(_) => None,
        })
    }

    pub fn parameter_count(&self) -> usize {
        self.registries.values().map(ParameterRegistry::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.registries.is_empty()
    }
}

fn build_name_index(
    registries: &BTreeMap<Namespace, ParameterRegistry>,
) -> BTreeMap<String, NameIndexEntry> {
    let mut index: BTreeMap<String, NameIndexEntry> = BTreeMap::new();
    for (namespace, registry) in registries {
        for name in registry.names() {
            match index.entry(name.to_string()) {
                Entry::Vacant(slot) => {
                    slot.insert(NameIndexEntry::Unique(namespace.clone()));
                }
                Entry::Occupied(mut slot) => {
                    let entry = slot.get_mut();
                    match entry {
                        NameIndexEntry::Unique(first) => {
                            let namespaces = BTreeSet::from([first.clone(), namespace.clone()]);
                            *entry = NameIndexEntry::Ambiguous(namespaces);
                        }
                        NameIndexEntry::Ambiguous(namespaces) => {
                            namespaces.insert(namespace.clone());
                        }
                    }
                }
            }
        }
    }
    index
}
