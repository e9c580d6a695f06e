//! Parameter catalog wiring.
//!
//! Registries produced by each declaring source are merged here into a single
//! [`Catalog`]. Templates resolve [`ParamRef`]s against a catalog snapshot;
//! long-running callers keep the current snapshot in a [`CatalogStore`] and
//! swap it wholesale on reload.

pub mod index;
pub mod reference;
pub mod store;

pub use index::{Catalog, Resolved};
pub use reference::{ParamRef, QualifiedName};
pub use store::CatalogStore;

use crate::error::CatalogError;
use crate::registry::ParameterRegistry;

/// Default directory, relative to the catalog root, holding package
/// declarations.
pub const DEFAULT_CATALOG_DIR: &str = "catalogs";

/// Compose registries from several declaring sources into one catalog.
pub fn compose<I>(registries: I) -> Result<Catalog, CatalogError>
where
    I: IntoIterator<Item = ParameterRegistry>,
{
    Catalog::compose(registries)
}
