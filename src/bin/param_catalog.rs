//! Inspect the parameter catalog and validate operator-supplied values.
//!
//! Usage:
//!   param-catalog check
//!   param-catalog list --namespace common/parameters
//!   param-catalog show common/parameters/param_location
//!   param-catalog validate param_location --value AWS
//!   param-catalog collect --ref param_location --set param_costcenter=QA
//!
//! Declarations are read from `--catalog` paths, `PARAM_CATALOG_PATH`, or the
//! `catalogs/` directory under the catalog root.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use paramcatalog::{
    Catalog, CatalogConfig, CollectRequest, Namespace, ParamRef, Resolved, collect,
    load_catalog, logging, parse_assignment, parse_literal, validate,
};
use serde_json::{Value, json};
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "param-catalog")]
#[command(about = "Inspect shared deployment parameters and validate values against them")]
struct Cli {
    /// Declaration file or directory; repeatable. Overrides PARAM_CATALOG_PATH.
    #[arg(long = "catalog", global = true)]
    catalogs: Vec<PathBuf>,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load and compose the catalog, then report what it contains.
    Check,
    /// List parameters, optionally for a single namespace.
    List {
        #[arg(long)]
        namespace: Option<String>,
        /// Emit JSON instead of one line per parameter.
        #[arg(long)]
        json: bool,
    },
    /// Print one parameter definition as JSON.
    Show { reference: String },
    /// Validate one value (or the default, when --value is omitted).
    Validate {
        reference: String,
        #[arg(long)]
        value: Option<String>,
    },
    /// Validate values for a set of parameters and print the accepted mapping.
    /// Values of no_echo parameters are printed masked.
    Collect {
        /// Parameter to collect using its default.
        #[arg(long = "ref")]
        refs: Vec<String>,
        /// Parameter with a supplied value, as REF=VALUE.
        #[arg(long = "set")]
        sets: Vec<String>,
    },
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    let config = CatalogConfig::resolve(cli.catalogs)?;
    debug!(sources = ?config.sources, "resolved catalog sources");
    let catalog = load_catalog(&config)?;

    match cli.command {
        Command::Check => check(&catalog),
        Command::List { namespace, json } => list(&catalog, namespace.as_deref(), json),
        Command::Show { reference } => show(&catalog, &reference),
        Command::Validate { reference, value } => validate_one(&catalog, &reference, value),
        Command::Collect { refs, sets } => collect_values(&catalog, &refs, &sets),
    }
}

fn check(catalog: &Catalog) -> Result<()> {
    for registry in catalog.registries() {
        println!("{}\t{} parameter(s)", registry.namespace(), registry.len());
    }
    for name in catalog.ambiguous_names() {
        println!("note: '{name}' is declared in several namespaces; reference it qualified");
    }
    Ok(())
}

fn list(catalog: &Catalog, namespace: Option<&str>, as_json: bool) -> Result<()> {
    let filter = namespace.map(Namespace::parse).transpose()?;
    let entries: Vec<Resolved<'_>> = catalog
        .iter()
        .filter(|resolved| filter.as_ref().is_none_or(|ns| resolved.namespace == ns))
        .collect();

    if as_json {
        let rendered: Vec<Value> = entries.iter().map(definition_json).collect();
        println!("{}", serde_json::to_string_pretty(&rendered)?);
        return Ok(());
    }

    for resolved in entries {
        let definition = resolved.definition;
        println!(
            "{}\t{}\t{}\t{}",
            resolved.qualified_name(),
            definition.param_type(),
            definition.category().unwrap_or("-"),
            definition.label()
        );
    }
    Ok(())
}

fn show(catalog: &Catalog, reference: &str) -> Result<()> {
    let resolved = catalog.resolve_str(reference)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&definition_json(&resolved))?
    );
    Ok(())
}

fn validate_one(catalog: &Catalog, reference: &str, raw: Option<String>) -> Result<()> {
    let resolved = catalog.resolve_str(reference)?;
    let supplied = raw.as_deref().map(parse_literal).transpose()?;
    let accepted = validate(resolved.definition, supplied.as_ref())?;
    println!("{}", resolved.definition.render(&accepted));
    Ok(())
}

fn collect_values(catalog: &Catalog, refs: &[String], sets: &[String]) -> Result<()> {
    let mut requests = Vec::with_capacity(refs.len() + sets.len());
    for raw in refs {
        requests.push(CollectRequest::new(ParamRef::parse(raw)?, None));
    }
    for raw in sets {
        let (reference, value) =
            parse_assignment(raw).with_context(|| format!("parsing --set {raw}"))?;
        requests.push(CollectRequest::new(reference, Some(value)));
    }

    let values = collect(catalog, requests)?;
    println!("{}", serde_json::to_string_pretty(&values.to_masked_json())?);
    Ok(())
}

fn definition_json(resolved: &Resolved<'_>) -> Value {
    json!({
        "namespace": resolved.namespace,
        "reference": resolved.qualified_name().to_string(),
        "definition": resolved.definition,
    })
}
