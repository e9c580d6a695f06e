//! Parameter registries: one namespaced package of definitions per declaring
//! source.
//!
//! A registry is filled through [`ParameterRegistry::register`] while its
//! source is loaded and is handed to the composer by value afterwards, so
//! nothing can register into it once it is part of a catalog.

use crate::error::{NamespaceError, RegistryError};
use crate::parameter::{ParameterDefinition, is_identifier};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Slash-delimited path naming a declaring source, e.g. `common/parameters`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Namespace(String);

impl Namespace {
    pub fn parse(raw: &str) -> Result<Self, NamespaceError> {
        if raw.split('/').all(is_identifier) {
            Ok(Self(raw.to_string()))
        } else {
            Err(NamespaceError {
                namespace: raw.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Descriptive fields a package declares about itself.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PackageMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ParameterRegistry {
    namespace: Namespace,
    metadata: PackageMetadata,
    entries: BTreeMap<String, ParameterDefinition>,
}

impl ParameterRegistry {
    pub fn new(namespace: Namespace) -> Self {
        Self {
            namespace,
            metadata: PackageMetadata::default(),
            entries: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: PackageMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Add a definition under its name. Names are unique per registry; a
    /// second definition with the same name is rejected and the registry is
    /// left as it was.
    pub fn register(&mut self, definition: ParameterDefinition) -> Result<(), RegistryError> {
        if self.entries.contains_key(definition.name()) {
            return Err(RegistryError::DuplicateName {
                namespace: self.namespace.to_string(),
                name: definition.name().to_string(),
            });
        }
        self.entries
            .insert(definition.name().to_string(), definition);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Result<&ParameterDefinition, RegistryError> {
        self.entries
            .get(name)
            .ok_or_else(|| RegistryError::NotFound {
                namespace: self.namespace.to_string(),
                name: name.to_string(),
            })
    }

    pub fn get(&self, name: &str) -> Option<&ParameterDefinition> {
        self.entries.get(name)
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn metadata(&self) -> &PackageMetadata {
        &self.metadata
    }

    /// Iterates parameter names in stable order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn definitions(&self) -> impl Iterator<Item = &ParameterDefinition> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
