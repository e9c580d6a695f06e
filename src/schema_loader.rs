//! JSON Schema gate for package declarations.
//!
//! The bundled schema checks document shape (required keys, literal kinds,
//! name and namespace syntax) before serde sees the document, so malformed
//! files fail with every schema violation listed at once. Semantic checks
//! (types against literals, defaults against allowed values) stay in
//! [`crate::parameter`].

use anyhow::{Result, anyhow, bail};
use jsonschema::JSONSchema;
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::OnceLock;

/// Bundled contract for `parameter_package_v1` documents.
pub const PACKAGE_SCHEMA_SOURCE: &str =
    include_str!("../schema/parameter_package.schema.json");

/// Compiled package contract.
pub(crate) struct PackageSchema {
    compiled: JSONSchema,
}

impl PackageSchema {
    pub(crate) fn bundled() -> Result<Self> {
        Self::compile(bundled_schema_value()?)
    }

    pub(crate) fn compile(schema: &Value) -> Result<Self> {
        let compiled = JSONSchema::compile(schema)
            .map_err(|err| anyhow!("compiling package schema: {err}"))?;
        Ok(Self { compiled })
    }

    /// Check `document` against the contract and its `schema_version`
    /// against `allowed_versions`.
    pub(crate) fn validate(
        &self,
        document: &Value,
        origin: &Path,
        allowed_versions: &BTreeSet<String>,
    ) -> Result<()> {
        if let Err(errors) = self.compiled.validate(document) {
            let details = errors
                .map(|err| format!("  {}: {}", pointer_or_root(&err.instance_path.to_string()), err))
                .collect::<Vec<_>>()
                .join("\n");
            bail!(
                "package declaration {} failed schema validation:\n{}",
                origin.display(),
                details
            );
        }

        let version = document
            .get("schema_version")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if !allowed_versions.contains(version) {
            bail!(
                "package declaration {} has schema_version '{}', not in allowed set {:?}",
                origin.display(),
                version,
                allowed_versions
            );
        }
        Ok(())
    }
}

fn bundled_schema_value() -> Result<&'static Value> {
    static SCHEMA: OnceLock<Option<Value>> = OnceLock::new();
    SCHEMA
        .get_or_init(|| serde_json::from_str(PACKAGE_SCHEMA_SOURCE).ok())
        .as_ref()
        .ok_or_else(|| anyhow!("bundled package schema is not valid JSON"))
}

fn pointer_or_root(pointer: &str) -> &str {
    if pointer.is_empty() { "/" } else { pointer }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn allowed() -> BTreeSet<String> {
        BTreeSet::from(["parameter_package_v1".to_string()])
    }

    #[test]
    fn bundled_schema_accepts_common_parameters() {
        let schema = PackageSchema::bundled().unwrap();
        let document: Value =
            serde_json::from_str(include_str!("../catalogs/common_parameters.json")).unwrap();
        schema
            .validate(&document, Path::new("common_parameters.json"), &allowed())
            .unwrap();
    }

    #[test]
    fn rejects_unknown_keys_and_bad_literals() {
        let schema = PackageSchema::bundled().unwrap();
        let document = json!({
            "schema_version": "parameter_package_v1",
            "package": "common/parameters",
            "parameters": [
                {"name": "p", "type": "string", "allowed_values": [{"nested": true}], "colour": "red"}
            ]
        });
        let err = schema
            .validate(&document, Path::new("bad.json"), &allowed())
            .unwrap_err()
            .to_string();
        assert!(err.contains("bad.json failed schema validation"), "{err}");
        assert!(err.contains("/parameters/0"), "{err}");
    }

    #[test]
    fn rejects_unlisted_schema_version() {
        let schema = PackageSchema::bundled().unwrap();
        let document = json!({
            "schema_version": "parameter_package_v9",
            "package": "common/parameters",
            "parameters": []
        });
        let err = schema
            .validate(&document, Path::new("v9.json"), &allowed())
            .unwrap_err();
        assert!(err.to_string().contains("parameter_package_v9"));
    }
}
