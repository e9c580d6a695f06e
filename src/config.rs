//! Where declarations come from and which declaration versions are accepted.
//!
//! Precedence: explicit sources (CLI flags) win, then `PARAM_CATALOG_PATH`,
//! then the `catalogs/` directory under the catalog root. The root is
//! `PARAM_CATALOG_ROOT` when it points at a directory with a `catalogs/`
//! child, otherwise the nearest ancestor of the working directory that has
//! one.

use crate::catalog::DEFAULT_CATALOG_DIR;
use anyhow::{Result, bail};
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Declaration version understood by this build.
pub const DEFAULT_SCHEMA_VERSION: &str = "parameter_package_v1";

pub const ENV_CATALOG_PATH: &str = "PARAM_CATALOG_PATH";
pub const ENV_CATALOG_ROOT: &str = "PARAM_CATALOG_ROOT";
pub const ENV_ALLOWED_SCHEMA_VERSIONS: &str = "PARAM_CATALOG_ALLOWED_SCHEMAS";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Files or directories holding package declarations, in load order.
    pub sources: Vec<PathBuf>,
    pub allowed_schema_versions: BTreeSet<String>,
}

impl CatalogConfig {
    /// Config with the given sources and only the built-in schema version.
    pub fn with_sources(sources: Vec<PathBuf>) -> Self {
        Self {
            sources,
            allowed_schema_versions: BTreeSet::from([DEFAULT_SCHEMA_VERSION.to_string()]),
        }
    }

    /// Resolve sources and accepted versions from the environment.
    ///
    /// `explicit` sources (usually CLI arguments) take precedence over
    /// `PARAM_CATALOG_PATH`; with neither, the default catalog directory is
    /// located on disk.
    pub fn resolve(explicit: Vec<PathBuf>) -> Result<Self> {
        let sources = if !explicit.is_empty() {
            explicit
        } else if let Some(listed) = env::var(ENV_CATALOG_PATH)
            .ok()
            .map(|raw| split_list(&raw))
            .filter(|items| !items.is_empty())
        {
            listed.into_iter().map(PathBuf::from).collect()
        } else {
            vec![find_catalog_root()?.join(DEFAULT_CATALOG_DIR)]
        };

        Ok(Self {
            sources,
            allowed_schema_versions: allowed_schema_versions(),
        })
    }
}

/// Built-in version plus any listed in `PARAM_CATALOG_ALLOWED_SCHEMAS`.
pub fn allowed_schema_versions() -> BTreeSet<String> {
    let mut versions: BTreeSet<String> = BTreeSet::new();
    versions.insert(DEFAULT_SCHEMA_VERSION.to_string());
    if let Ok(raw) = env::var(ENV_ALLOWED_SCHEMA_VERSIONS) {
        versions.extend(split_list(&raw));
    }
    versions
}

fn is_catalog_root(candidate: &Path) -> bool {
    candidate.join(DEFAULT_CATALOG_DIR).is_dir()
}

fn catalog_root_from_hint(hint: &str) -> Option<PathBuf> {
    if hint.is_empty() {
        return None;
    }
    let hint_path = PathBuf::from(hint);
    if !hint_path.exists() || !is_catalog_root(&hint_path) {
        return None;
    }
    fs::canonicalize(hint_path).ok()
}

fn search_upwards(start: &Path) -> Option<PathBuf> {
    let mut dir = fs::canonicalize(start).ok()?;
    loop {
        if is_catalog_root(&dir) {
            return Some(dir);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

pub fn find_catalog_root() -> Result<PathBuf> {
    if let Ok(env_root) = env::var(ENV_CATALOG_ROOT) {
        if let Some(root) = catalog_root_from_hint(&env_root) {
            return Ok(root);
        }
    }

    if let Ok(cwd) = env::current_dir() {
        if let Some(root) = search_upwards(&cwd) {
            return Ok(root);
        }
    }

    bail!(
        "Unable to locate a '{DEFAULT_CATALOG_DIR}' directory. Set {ENV_CATALOG_ROOT} or {ENV_CATALOG_PATH}, or pass --catalog."
    );
}

/// Split a comma- or whitespace-separated list, dropping empty items.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .replace(',', " ")
        .split_whitespace()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn split_list_accepts_commas_and_spaces() {
        assert_eq!(
            split_list("a.json, b ,,c\td"),
            ["a.json", "b", "c", "d"].map(str::to_string)
        );
        assert!(split_list(" , ").is_empty());
    }

    #[test]
    fn explicit_sources_win() {
        let config = CatalogConfig::resolve(vec![PathBuf::from("x.json")]).unwrap();
        assert_eq!(config.sources, [PathBuf::from("x.json")]);
        assert!(config.allowed_schema_versions.contains(DEFAULT_SCHEMA_VERSION));
    }

    #[test]
    fn search_upwards_finds_nearest_catalog_dir() {
        let temp = TempRoot::new();
        fs::create_dir_all(temp.root.join("catalogs")).unwrap();
        let nested = temp.root.join("templates/web");
        fs::create_dir_all(&nested).unwrap();

        let found = search_upwards(&nested).unwrap();
        assert_eq!(found, fs::canonicalize(&temp.root).unwrap());
    }

    #[test]
    fn hint_without_catalog_dir_is_ignored() {
        let temp = TempRoot::new();
        assert!(catalog_root_from_hint(temp.root.to_str().unwrap()).is_none());
        assert!(catalog_root_from_hint("").is_none());
    }

    struct TempRoot {
        root: PathBuf,
    }

    impl TempRoot {
        fn new() -> Self {
            static COUNTER: AtomicUsize = AtomicUsize::new(0);
            let mut dir = env::temp_dir();
            dir.push(format!(
                "paramcatalog-config-test-{}-{}",
                std::process::id(),
                COUNTER.fetch_add(1, Ordering::SeqCst)
            ));
            fs::create_dir_all(&dir).unwrap();
            Self { root: dir }
        }
    }

    impl Drop for TempRoot {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.root);
        }
    }
}
