//! Parameter definitions: the immutable leaf records every template shares.
//!
//! A definition is only reachable through [`ParameterBuilder::build`], which
//! checks the declared literals against the declared type before handing out
//! a value. Once built, nothing on a definition can change.

use crate::error::DefinitionError;
use serde::{Serialize, Serializer};
use serde_json::{Number, Value};
use std::fmt;

pub(crate) const MASK: &str = "********";

/// The closed set of parameter types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Number,
    Boolean,
    List,
}

impl ParamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
            ParamType::List => "list",
        }
    }

    /// Parse a declared type name. Unknown names yield `None`; callers wrap
    /// that into [`DefinitionError::UnknownType`] with the parameter name.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "string" => Some(ParamType::String),
            "number" => Some(ParamType::Number),
            "boolean" => Some(ParamType::Boolean),
            "list" => Some(ParamType::List),
            _ => None,
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A literal parameter value.
///
/// Lists are ordered sequences of strings. Numbers compare by numeric value,
/// so `1` and `1.0` are the same literal.
#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Boolean(bool),
    Number(Number),
    String(String),
    List(Vec<String>),
}

impl ParamValue {
    pub fn param_type(&self) -> ParamType {
        match self {
            ParamValue::String(_) => ParamType::String,
            ParamValue::Number(_) => ParamType::Number,
            ParamValue::Boolean(_) => ParamType::Boolean,
            ParamValue::List(_) => ParamType::List,
        }
    }

    /// Convert a JSON literal. `null`, objects, and arrays holding anything
    /// other than strings have no representation and yield `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(ParamValue::Boolean(*b)),
            Value::Number(n) => Some(ParamValue::Number(n.clone())),
            Value::String(s) => Some(ParamValue::String(s.clone())),
            Value::Array(items) => items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .map(ParamValue::List),
            Value::Null | Value::Object(_) => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            ParamValue::Boolean(b) => Value::Bool(*b),
            ParamValue::Number(n) => Value::Number(n.clone()),
            ParamValue::String(s) => Value::String(s.clone()),
            ParamValue::List(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Exact numeric equality. Integers never round-trip through `f64`; a float
/// equals an integer only when it is integral and converts back exactly.
fn numbers_equal(a: &Number, b: &Number) -> bool {
    match (a.is_f64(), b.is_f64()) {
        (true, true) => a.as_f64() == b.as_f64(),
        (false, false) => match (a.as_i64(), b.as_i64()) {
            (Some(x), Some(y)) => x == y,
            (None, None) => a.as_u64() == b.as_u64(),
            _ => false,
        },
        (true, false) => a.as_f64().is_some_and(|x| float_equals_integer(x, b)),
        (false, true) => b.as_f64().is_some_and(|y| float_equals_integer(y, a)),
    }
}

// 2^63 and 2^64 are exact in f64; integral floats below them cast losslessly.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;
const U64_BOUND: f64 = 18_446_744_073_709_551_616.0;

fn float_equals_integer(float: f64, integer: &Number) -> bool {
    if !float.is_finite() || float.fract() != 0.0 {
        return false;
    }
    if let Some(i) = integer.as_i64() {
        return (-I64_BOUND..I64_BOUND).contains(&float) && float as i64 == i;
    }
    match integer.as_u64() {
        Some(u) => (0.0..U64_BOUND).contains(&float) && float as u64 == u,
        None => false,
    }
}

impl PartialEq for ParamValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ParamValue::Boolean(a), ParamValue::Boolean(b)) => a == b,
            (ParamValue::Number(a), ParamValue::Number(b)) => numbers_equal(a, b),
            (ParamValue::String(a), ParamValue::String(b)) => a == b,
            (ParamValue::List(a), ParamValue::List(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = serde_json::to_string(&self.to_json()).map_err(|_| fmt::Error)?;
        f.write_str(&rendered)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::String(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::String(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Boolean(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Number(Number::from(value))
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        ParamValue::List(value)
    }
}

/// Immutable description of one shared parameter.
///
/// Serializes to the declaration shape; literals of a `no_echo` parameter are
/// written as the mask.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterDefinition {
    name: String,
    label: String,
    category: Option<String>,
    param_type: ParamType,
    allowed_values: Vec<ParamValue>,
    default: Option<ParamValue>,
    description: Option<String>,
    constraint_description: Option<String>,
    no_echo: bool,
}

#[derive(Serialize)]
struct DefinitionView<'a> {
    name: &'a str,
    label: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<&'a str>,
    #[serde(rename = "type")]
    param_type: ParamType,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    allowed_values: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    constraint_description: Option<&'a str>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    no_echo: bool,
}

impl Serialize for ParameterDefinition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let shown = |value: &ParamValue| {
            if self.no_echo {
                Value::String(MASK.to_string())
            } else {
                value.to_json()
            }
        };
        DefinitionView {
            name: &self.name,
            label: &self.label,
            category: self.category.as_deref(),
            param_type: self.param_type,
            allowed_values: self.allowed_values.iter().map(shown).collect(),
            default: self.default.as_ref().map(shown),
            description: self.description.as_deref(),
            constraint_description: self.constraint_description.as_deref(),
            no_echo: self.no_echo,
        }
        .serialize(serializer)
    }
}

impl ParameterDefinition {
    pub fn builder(name: impl Into<String>, param_type: ParamType) -> ParameterBuilder {
        ParameterBuilder {
            name: name.into(),
            param_type,
            label: None,
            category: None,
            allowed_values: Vec::new(),
            default: None,
            description: None,
            constraint_description: None,
            no_echo: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn param_type(&self) -> ParamType {
        self.param_type
    }

    /// Permitted literals in declared order; empty means unconstrained.
    pub fn allowed_values(&self) -> &[ParamValue] {
        &self.allowed_values
    }

    pub fn default_value(&self) -> Option<&ParamValue> {
        self.default.as_ref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn constraint_description(&self) -> Option<&str> {
        self.constraint_description.as_deref()
    }

    pub fn no_echo(&self) -> bool {
        self.no_echo
    }

    /// Render a value for diagnostics, masking it when the parameter is
    /// declared `no_echo`.
    pub fn render(&self, value: &ParamValue) -> String {
        render_masked(value, self.no_echo)
    }

    /// The allowed set as it may appear in diagnostics.
    pub(crate) fn displayed_allowed_values(&self) -> Vec<ParamValue> {
        masked_values(&self.allowed_values, self.no_echo)
    }
}

fn render_masked(value: &ParamValue, no_echo: bool) -> String {
    if no_echo {
        MASK.to_string()
    } else {
        value.to_string()
    }
}

fn masked_values(values: &[ParamValue], no_echo: bool) -> Vec<ParamValue> {
    if no_echo {
        vec![ParamValue::from(MASK); values.len()]
    } else {
        values.to_vec()
    }
}

/// Collects declaration attributes; [`ParameterBuilder::build`] performs all
/// consistency checks at once.
#[derive(Clone, Debug)]
pub struct ParameterBuilder {
    name: String,
    param_type: ParamType,
    label: Option<String>,
    category: Option<String>,
    allowed_values: Vec<ParamValue>,
    default: Option<ParamValue>,
    description: Option<String>,
    constraint_description: Option<String>,
    no_echo: bool,
}

impl ParameterBuilder {
    /// Display label; defaults to the parameter name when never set.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn allowed_value(mut self, value: impl Into<ParamValue>) -> Self {
        self.allowed_values.push(value.into());
        self
    }

    pub fn allowed_values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ParamValue>,
    {
        self.allowed_values.extend(values.into_iter().map(Into::into));
        self
    }

    pub fn default_value(mut self, value: impl Into<ParamValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn constraint_description(mut self, text: impl Into<String>) -> Self {
        self.constraint_description = Some(text.into());
        self
    }

    pub fn no_echo(mut self, no_echo: bool) -> Self {
        self.no_echo = no_echo;
        self
    }

    pub fn build(self) -> Result<ParameterDefinition, DefinitionError> {
        validate_name(&self.name)?;

        let label = match self.label {
            Some(label) if label.trim().is_empty() => {
                return Err(DefinitionError::EmptyLabel { name: self.name });
            }
            Some(label) => label,
            None => self.name.clone(),
        };

        for (idx, value) in self.allowed_values.iter().enumerate() {
            let actual = value.param_type();
            if actual != self.param_type {
                return Err(DefinitionError::AllowedValueTypeMismatch {
                    name: self.name,
                    value: render_masked(value, self.no_echo),
                    expected: self.param_type,
                    actual,
                });
            }
            if self.allowed_values[..idx].contains(value) {
                return Err(DefinitionError::DuplicateAllowedValue {
                    name: self.name,
                    value: render_masked(value, self.no_echo),
                });
            }
        }

        if let Some(default) = &self.default {
            let actual = default.param_type();
            if actual != self.param_type {
                return Err(DefinitionError::DefaultTypeMismatch {
                    name: self.name,
                    value: render_masked(default, self.no_echo),
                    expected: self.param_type,
                    actual,
                });
            }
            if !self.allowed_values.is_empty() && !self.allowed_values.contains(default) {
                return Err(DefinitionError::DefaultNotAllowed {
                    value: render_masked(default, self.no_echo),
                    allowed: masked_values(&self.allowed_values, self.no_echo),
                    name: self.name,
                });
            }
        }

        Ok(ParameterDefinition {
            name: self.name,
            label,
            category: self.category,
            param_type: self.param_type,
            allowed_values: self.allowed_values,
            default: self.default,
            description: self.description,
            constraint_description: self.constraint_description,
            no_echo: self.no_echo,
        })
    }
}

/// Names become reference keys, so they share the namespace segment charset
/// and may not contain `/`.
pub(crate) fn is_identifier(raw: &str) -> bool {
    !raw.is_empty()
        && raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

fn validate_name(name: &str) -> Result<(), DefinitionError> {
    if !is_identifier(name) {
        return Err(DefinitionError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}
