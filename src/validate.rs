//! Value validation against a parameter definition.
//!
//! [`validate`] is a pure function of the definition and the candidate: it
//! substitutes defaults, checks the type, then checks membership in the
//! allowed set. No coercion happens; a string `"3"` is never a number.
//! [`collect`] runs that check for every parameter a template references and
//! hands back the name-to-value mapping for the execution environment.

use crate::catalog::{Catalog, ParamRef};
use crate::error::{CollectionError, CollectionFailure, CollectionFailureKind, ValidationError};
use crate::parameter::{MASK, ParamValue, ParameterDefinition};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::collections::btree_map::Entry;

/// Accept, default, or reject a candidate value for `definition`.
///
/// # Errors
/// * [`ValidationError::MissingRequiredValue`] when nothing is supplied and no
///   default is declared.
/// * [`ValidationError::TypeMismatch`] when the candidate is of another type,
///   whatever the allowed set says.
/// * [`ValidationError::ValueNotAllowed`] when an allowed set is declared and
///   the candidate is not in it.
pub fn validate(
    definition: &ParameterDefinition,
    supplied: Option<&ParamValue>,
) -> Result<ParamValue, ValidationError> {
    let Some(value) = supplied else {
        return definition
            .default_value()
            .cloned()
            .ok_or_else(|| ValidationError::MissingRequiredValue {
                name: definition.name().to_string(),
            });
    };

    let actual = value.param_type();
    if actual != definition.param_type() {
        return Err(ValidationError::TypeMismatch {
            name: definition.name().to_string(),
            expected: definition.param_type(),
            actual,
        });
    }

    let allowed = definition.allowed_values();
    if !allowed.is_empty() && !allowed.contains(value) {
        return Err(ValidationError::ValueNotAllowed {
            name: definition.name().to_string(),
            value: definition.render(value),
            permitted: definition.displayed_allowed_values(),
            constraint_description: definition.constraint_description().map(str::to_string),
        });
    }

    Ok(value.clone())
}

/// One referenced parameter and the value supplied for it, if any.
#[derive(Clone, Debug, PartialEq)]
pub struct CollectRequest {
    pub reference: ParamRef,
    pub value: Option<ParamValue>,
}

impl CollectRequest {
    pub fn new(reference: ParamRef, value: Option<ParamValue>) -> Self {
        Self { reference, value }
    }
}

/// Accepted values keyed by parameter name, ready for the execution
/// environment.
///
/// The mapping itself carries real values; [`CollectedValues::to_masked_json`]
/// is the form for anything shown to an operator.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CollectedValues {
    values: BTreeMap<String, ParamValue>,
    no_echo: BTreeSet<String>,
}

impl CollectedValues {
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether `name` was declared `no_echo`.
    pub fn is_masked(&self, name: &str) -> bool {
        self.no_echo.contains(name)
    }

    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .values
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect();
        Value::Object(map)
    }

    /// Like [`CollectedValues::to_json`] with `no_echo` values replaced by the
    /// mask.
    pub fn to_masked_json(&self) -> Value {
        let map: Map<String, Value> = self
            .values
            .iter()
            .map(|(name, value)| {
                let shown = if self.is_masked(name) {
                    Value::String(MASK.to_string())
                } else {
                    value.to_json()
                };
                (name.clone(), shown)
            })
            .collect();
        Value::Object(map)
    }
}

impl Serialize for CollectedValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.values.serialize(serializer)
    }
}

/// Validate every request against `catalog`.
///
/// All requests are checked; failures are reported together, in request
/// order, so an operator can fix every value in one pass. Two requests that
/// resolve to the same parameter name are a failure of the later one.
pub fn collect<I>(catalog: &Catalog, requests: I) -> Result<CollectedValues, CollectionError>
where
    I: IntoIterator<Item = CollectRequest>,
{
    let mut accepted: BTreeMap<String, ParamValue> = BTreeMap::new();
    let mut no_echo = BTreeSet::new();
    let mut failures = Vec::new();

    for request in requests {
        let reference = request.reference.to_string();
        let outcome = catalog
            .resolve(&request.reference)
            .map_err(CollectionFailureKind::from)
            .and_then(|resolved| {
                validate(resolved.definition, request.value.as_ref())
                    .map(|value| (value, resolved.definition.no_echo()))
                    .map_err(CollectionFailureKind::from)
            });

        match outcome {
            Ok((value, masked)) => match accepted.entry(request.reference.name().to_string()) {
                Entry::Vacant(slot) => {
                    if masked {
                        no_echo.insert(slot.key().clone());
                    }
                    slot.insert(value);
                }
                Entry::Occupied(slot) => failures.push(CollectionFailure {
                    reference,
                    kind: CollectionFailureKind::DuplicateRequest {
                        name: slot.key().clone(),
                    },
                }),
            },
            Err(kind) => failures.push(CollectionFailure { reference, kind }),
        }
    }

    if failures.is_empty() {
        Ok(CollectedValues {
            values: accepted,
            no_echo,
        })
    } else {
        Err(CollectionError { failures })
    }
}
