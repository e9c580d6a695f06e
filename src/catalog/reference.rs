//! Parameter references as templates write them.
//!
//! `common/parameters/param_location` is qualified (namespace, then name after
//! the last `/`); `param_location` alone is unqualified.

use crate::error::CatalogError;
use crate::parameter::is_identifier;
use crate::registry::Namespace;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// The `(namespace, name)` key that identifies a parameter catalog-wide.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct QualifiedName {
    pub namespace: Namespace,
    pub name: String,
}

impl QualifiedName {
    pub fn new(namespace: Namespace, name: impl Into<String>) -> Self {
        Self {
            namespace,
            name: name.into(),
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ParamRef {
    Qualified(QualifiedName),
    Unqualified(String),
}

impl ParamRef {
    pub fn parse(raw: &str) -> Result<Self, CatalogError> {
        let invalid = |reason| CatalogError::InvalidReference {
            reference: raw.to_string(),
            reason,
        };

        match raw.rsplit_once('/') {
            None if is_identifier(raw) => Ok(ParamRef::Unqualified(raw.to_string())),
            None => Err(invalid("name must match ^[A-Za-z0-9_.-]+$")),
            Some((namespace, name)) => {
                if !is_identifier(name) {
                    return Err(invalid("name must match ^[A-Za-z0-9_.-]+$"));
                }
                let namespace =
                    Namespace::parse(namespace).map_err(|_| invalid("malformed namespace"))?;
                Ok(ParamRef::Qualified(QualifiedName::new(namespace, name)))
            }
        }
    }

    /// The bare parameter name, with any namespace stripped.
    pub fn name(&self) -> &str {
        match self {
            ParamRef::Qualified(qualified) => &qualified.name,
            ParamRef::Unqualified(name) => name,
        }
    }
}

impl FromStr for ParamRef {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParamRef::parse(s)
    }
}

impl From<QualifiedName> for ParamRef {
    fn from(value: QualifiedName) -> Self {
        ParamRef::Qualified(value)
    }
}

impl fmt::Display for ParamRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamRef::Qualified(qualified) => qualified.fmt(f),
            ParamRef::Unqualified(name) => f.write_str(name),
        }
    }
}
