//! Shared catalog of typed, constrained deployment parameters.
//!
//! Declaring sources each produce a [`ParameterRegistry`]; [`compose`] merges
//! them into a [`Catalog`]; templates resolve [`ParamRef`]s against it and
//! [`validate`] or [`collect`] the values an operator supplied.

pub mod catalog;
pub mod config;
pub mod error;
pub mod loader;
pub mod logging;
pub mod parameter;
pub mod registry;
mod schema_loader;
pub mod validate;

pub use catalog::{
    Catalog, CatalogStore, DEFAULT_CATALOG_DIR, ParamRef, QualifiedName, Resolved, compose,
};
pub use config::{CatalogConfig, find_catalog_root, split_list};
pub use error::{
    CatalogError, CollectionError, CollectionFailure, CollectionFailureKind, DefinitionError,
    NamespaceError, RegistryError, ValidationError,
};
pub use loader::{PackageDeclaration, PackageLoader, ParameterDeclaration, load_catalog};
pub use parameter::{ParamType, ParamValue, ParameterBuilder, ParameterDefinition};
pub use registry::{Namespace, PackageMetadata, ParameterRegistry};
pub use schema_loader::PACKAGE_SCHEMA_SOURCE;
pub use validate::{CollectRequest, CollectedValues, collect, validate};

use anyhow::{Result, bail};
use serde_json::Value;

/// Parse a literal typed by an operator.
///
/// Surrounding whitespace is dropped, then the text is read as JSON (`42`,
/// `true`, `["a","b"]`, `"AWS"`); anything that is not valid JSON is taken
/// as a string. Whitespace that matters must be quoted: `" AWS "`. Parsing never
/// converts between types: `42` stays a number even for a string parameter,
/// and validation will reject it.
pub fn parse_literal(raw: &str) -> Result<ParamValue> {
    let trimmed = raw.trim();
    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => match ParamValue::from_json(&value) {
            Some(literal) => Ok(literal),
            None => bail!("literal {trimmed} is not a string, number, boolean or list of strings"),
        },
        Err(_) => Ok(ParamValue::String(trimmed.to_string())),
    }
}

/// Split `reference=literal` into its parts.
pub fn parse_assignment(raw: &str) -> Result<(ParamRef, ParamValue)> {
    let Some((reference, literal)) = raw.split_once('=') else {
        bail!("expected REF=VALUE, got '{raw}'");
    };
    let reference = ParamRef::parse(reference.trim())?;
    Ok((reference, parse_literal(literal)?))
}
