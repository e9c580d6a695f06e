//! Error taxonomy for the catalog core.
//!
//! Every variant carries the offending names and values so callers can render
//! a precise message without re-deriving context. The core never logs; these
//! errors are the only channel back to the caller.

use crate::parameter::{ParamType, ParamValue};
use thiserror::Error;

/// A parameter declaration that is internally inconsistent.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum DefinitionError {
    #[error("parameter name '{name}' must match ^[A-Za-z0-9_.-]+$")]
    InvalidName { name: String },

    #[error("parameter {name}: label must not be blank")]
    EmptyLabel { name: String },

    #[error(
        "parameter {name}: unknown type '{found}', expected one of string, number, boolean, list"
    )]
    UnknownType { name: String, found: String },

    #[error(
        "parameter {name}: {field} literal {literal} is not a string, number, boolean or list of strings"
    )]
    UnsupportedLiteral {
        name: String,
        field: &'static str,
        literal: String,
    },

    #[error("parameter {name}: allowed value {value} is a {actual}, expected {expected}")]
    AllowedValueTypeMismatch {
        name: String,
        value: String,
        expected: ParamType,
        actual: ParamType,
    },

    #[error("parameter {name}: allowed value {value} is listed more than once")]
    DuplicateAllowedValue { name: String, value: String },

    #[error("parameter {name}: default {value} is a {actual}, expected {expected}")]
    DefaultTypeMismatch {
        name: String,
        value: String,
        expected: ParamType,
        actual: ParamType,
    },

    #[error(
        "parameter {name}: default {value} is not one of the allowed values {}",
        render_values(.allowed)
    )]
    DefaultNotAllowed {
        name: String,
        value: String,
        allowed: Vec<ParamValue>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("namespace '{namespace}' must be slash-delimited segments matching ^[A-Za-z0-9_.-]+$")]
pub struct NamespaceError {
    pub namespace: String,
}

/// Structural problems inside a single registry.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("parameter {name} is already registered in {namespace}")]
    DuplicateName { namespace: String, name: String },

    #[error("parameter {name} not found in {namespace}")]
    NotFound { namespace: String, name: String },
}

/// Composition and lookup failures against a composed catalog.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("namespace {namespace} is declared by more than one registry")]
    NamespaceCollision { namespace: String },

    #[error("parameter {reference} not found in catalog")]
    NotFound { reference: String },

    #[error(
        "parameter name {name} is declared in several namespaces ({}); use a qualified reference",
        .namespaces.join(", ")
    )]
    AmbiguousName {
        name: String,
        namespaces: Vec<String>,
    },

    #[error("'{reference}' is not a valid parameter reference: {reason}")]
    InvalidReference {
        reference: String,
        reason: &'static str,
    },
}

/// A candidate value rejected by a parameter's constraints.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ValidationError {
    #[error("parameter {name} requires a value and declares no default")]
    MissingRequiredValue { name: String },

    #[error("parameter {name} expects a {expected} value, got a {actual}")]
    TypeMismatch {
        name: String,
        expected: ParamType,
        actual: ParamType,
    },

    #[error(
        "parameter {name}: value {value} is not allowed; permitted values: {}{}",
        render_values(.permitted),
        render_hint(.constraint_description)
    )]
    ValueNotAllowed {
        name: String,
        value: String,
        permitted: Vec<ParamValue>,
        constraint_description: Option<String>,
    },
}

/// Why one reference in a collection request failed.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum CollectionFailureKind {
    #[error(transparent)]
    Lookup(#[from] CatalogError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("parameter {name} was requested more than once")]
    DuplicateRequest { name: String },
}

#[derive(Clone, Debug, PartialEq)]
pub struct CollectionFailure {
    pub reference: String,
    pub kind: CollectionFailureKind,
}

/// Every failure from one collection pass, in request order.
#[derive(Clone, Debug, PartialEq, Error)]
#[error("{} parameter(s) rejected:\n{}", .failures.len(), render_failures(.failures))]
pub struct CollectionError {
    pub failures: Vec<CollectionFailure>,
}

pub(crate) fn render_values(values: &[ParamValue]) -> String {
    let rendered: Vec<String> = values.iter().map(ToString::to_string).collect();
    format!("[{}]", rendered.join(", "))
}

fn render_hint(hint: &Option<String>) -> String {
    match hint {
        Some(text) if !text.trim().is_empty() => format!(" ({})", text.trim()),
        _ => String::new(),
    }
}

fn render_failures(failures: &[CollectionFailure]) -> String {
    failures
        .iter()
        .map(|failure| format!("  {}: {}", failure.reference, failure.kind))
        .collect::<Vec<_>>()
        .join("\n")
}
