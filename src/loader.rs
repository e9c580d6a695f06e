//! Package declarations on disk.
//!
//! Each JSON document declares one package: a namespace plus its parameters.
//! Loading checks the document against the bundled schema, builds every
//! definition, registers it, and returns the finished registry. Directories
//! are loaded file by file in sorted order so composition is deterministic.

use crate::catalog::Catalog;
use crate::config::CatalogConfig;
use crate::error::DefinitionError;
use crate::parameter::{ParamType, ParamValue, ParameterDefinition};
use crate::registry::{Namespace, PackageMetadata, ParameterRegistry};
use crate::schema_loader::PackageSchema;
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const DECLARATION_EXTENSION: &str = "json";

#[derive(Clone, Debug, Deserialize)]
/// One package declaration document.
pub struct PackageDeclaration {
    pub schema_version: String,
    pub package: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub parameters: Vec<ParameterDeclaration>,
}

#[derive(Clone, Debug, Deserialize)]
/// Raw attributes of one declared parameter, before any checks.
pub struct ParameterDeclaration {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub param_type: String,
    #[serde(default)]
    pub allowed_values: Vec<Value>,
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub constraint_description: Option<String>,
    #[serde(default)]
    pub no_echo: bool,
}

impl ParameterDeclaration {
    /// Build the immutable definition, applying every definition-time check.
    pub fn into_definition(self) -> Result<ParameterDefinition, DefinitionError> {
        let param_type =
            ParamType::parse(&self.param_type).ok_or_else(|| DefinitionError::UnknownType {
                name: self.name.clone(),
                found: self.param_type.clone(),
            })?;

        let allowed_values = self
            .allowed_values
            .iter()
            .map(|raw| literal(&self.name, "allowed_values", raw))
            .collect::<Result<Vec<_>, _>>()?;
        let default = self
            .default
            .as_ref()
            .map(|raw| literal(&self.name, "default", raw))
            .transpose()?;

        let mut builder = ParameterDefinition::builder(self.name, param_type)
            .allowed_values(allowed_values)
            .no_echo(self.no_echo);
        if let Some(label) = self.label {
            builder = builder.label(label);
        }
        if let Some(category) = self.category {
            builder = builder.category(category);
        }
        if let Some(default) = default {
            builder = builder.default_value(default);
        }
        if let Some(description) = self.description {
            builder = builder.description(description);
        }
        if let Some(text) = self.constraint_description {
            builder = builder.constraint_description(text);
        }
        builder.build()
    }
}

fn literal(name: &str, field: &'static str, raw: &Value) -> Result<ParamValue, DefinitionError> {
    ParamValue::from_json(raw).ok_or_else(|| DefinitionError::UnsupportedLiteral {
        name: name.to_string(),
        field,
        literal: raw.to_string(),
    })
}

impl PackageDeclaration {
    /// Turn the declaration into a registry. Stops at the first bad
    /// definition; the error names the package and the parameter.
    pub fn into_registry(self) -> Result<ParameterRegistry> {
        let namespace = Namespace::parse(&self.package)?;
        let mut registry = ParameterRegistry::new(namespace).with_metadata(PackageMetadata {
            title: self.name,
            short_description: self.short_description,
        });

        for declaration in self.parameters {
            let definition = declaration
                .into_definition()
                .with_context(|| format!("declaring parameter in package {}", self.package))?;
            registry
                .register(definition)
                .with_context(|| format!("registering parameter in package {}", self.package))?;
        }
        Ok(registry)
    }
}

/// Reads declaration files and turns them into registries.
pub struct PackageLoader {
    schema: PackageSchema,
    allowed_versions: BTreeSet<String>,
}

impl PackageLoader {
    pub fn new(allowed_versions: BTreeSet<String>) -> Result<Self> {
        Ok(Self {
            schema: PackageSchema::bundled()?,
            allowed_versions,
        })
    }

    pub fn from_config(config: &CatalogConfig) -> Result<Self> {
        Self::new(config.allowed_schema_versions.clone())
    }

    /// Parse an already-read document. `origin` only labels diagnostics.
    pub fn parse_package(&self, document: &Value, origin: &Path) -> Result<ParameterRegistry> {
        self.schema
            .validate(document, origin, &self.allowed_versions)?;
        let declaration: PackageDeclaration = serde_json::from_value(document.clone())
            .with_context(|| format!("parsing package declaration {}", origin.display()))?;
        declaration
            .into_registry()
            .with_context(|| format!("loading package declaration {}", origin.display()))
    }

    pub fn load_package(&self, path: &Path) -> Result<ParameterRegistry> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading package declaration {}", path.display()))?;
        let document: Value = serde_json::from_str(&data)
            .with_context(|| format!("parsing package declaration {}", path.display()))?;
        let registry = self.parse_package(&document, path)?;
        debug!(
            path = %path.display(),
            namespace = %registry.namespace(),
            parameters = registry.len(),
            "loaded package"
        );
        Ok(registry)
    }

    /// Load every `*.json` file directly inside `dir`, sorted by file name.
    pub fn load_packages(&self, dir: &Path) -> Result<Vec<ParameterRegistry>> {
        declaration_files(dir)?
            .iter()
            .map(|path| self.load_package(path))
            .collect()
    }

    /// Load each source (file or directory) in order.
    pub fn load_sources(&self, sources: &[PathBuf]) -> Result<Vec<ParameterRegistry>> {
        let mut registries = Vec::new();
        for source in sources {
            if source.is_dir() {
                registries.extend(self.load_packages(source)?);
            } else {
                registries.push(self.load_package(source)?);
            }
        }
        Ok(registries)
    }

    /// Load and compose everything `sources` names.
    pub fn load_catalog(&self, sources: &[PathBuf]) -> Result<Catalog> {
        let registries = self.load_sources(sources)?;
        let catalog = Catalog::compose(registries).context("composing parameter catalog")?;
        info!(
            namespaces = catalog.namespaces().count(),
            parameters = catalog.parameter_count(),
            "parameter catalog composed"
        );
        Ok(catalog)
    }
}

/// Load the catalog described by `config`.
pub fn load_catalog(config: &CatalogConfig) -> Result<Catalog> {
    PackageLoader::from_config(config)?.load_catalog(&config.sources)
}

fn declaration_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in
        fs::read_dir(dir).with_context(|| format!("reading catalog directory {}", dir.display()))?
    {
        let path = entry
            .with_context(|| format!("reading catalog directory {}", dir.display()))?
            .path();
        if path.is_file()
            && path.extension().and_then(|ext| ext.to_str()) == Some(DECLARATION_EXTENSION)
        {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
