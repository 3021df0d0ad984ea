//! Bundle resolution over a [`BundleCatalog`]
//!
//! This module handles:
//! - Transitive closure of a set of bundle names ([`BundleResolver::full_bundle_set`])
//! - Cycle detection and package fill for builds ([`sort`])
//! - The persisted selected bundle list ([`mix_list`])
//! - Add / remove / create / validate operations ([`operations`])
//! - List and tree views ([`list`])

pub mod list;
pub mod mix_list;
pub mod operations;
pub mod sort;

use crate::catalog::{BundleCatalog, BundleSet};
use crate::error::{MixError, Result};

pub use list::ListMode;
pub use mix_list::MixBundleList;
pub use operations::{AddOptions, RemoveOptions, ValidationLevel};

/// The bundle every mix is built on
pub const ROOT_BUNDLE: &str = "os-core";

/// Resolves bundle names through a catalog
#[derive(Debug, Clone, Copy)]
pub struct BundleResolver<'a> {
    catalog: &'a BundleCatalog,
}

impl<'a> BundleResolver<'a> {
    pub fn new(catalog: &'a BundleCatalog) -> Self {
        Self { catalog }
    }

    /// Resolve `seeds` and everything they include
    ///
    /// A name already in the result is neither loaded nor descended again, so
    /// shared includes are resolved once and include cycles end quietly.
    pub fn full_bundle_set<I, S>(&self, seeds: I) -> Result<BundleSet>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BundleSet::new();
        for name in seeds {
            self.visit(name.as_ref(), &mut set)?;
        }
        Ok(set)
    }

    fn visit(&self, name: &str, set: &mut BundleSet) -> Result<()> {
        if set.contains_key(name) {
            return Ok(());
        }

        let bundle = self.catalog.load(name)?;
        let includes: Vec<String> = bundle.includes().cloned().collect();
        set.insert(name.to_string(), bundle);

        for include in &includes {
            self.visit(include, set)?;
        }
        Ok(())
    }

    /// Resolve the selected list into a build-ready set
    ///
    /// Unlike [`Self::full_bundle_set`] this rejects include cycles, requires
    /// the root bundle and fills `all_packages`.
    pub fn resolve_for_build<I, S>(&self, seeds: I) -> Result<BundleSet>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = self.full_bundle_set(seeds)?;
        require_root(&set)?;
        validate_and_fill(&mut set)?;
        Ok(set)
    }
}

/// Reject include cycles and fill every bundle's `all_packages`
///
/// Returns the bundle names with includes ordered first.
pub fn validate_and_fill(set: &mut BundleSet) -> Result<Vec<String>> {
    sort::fill_packages(set)
}

/// Fail unless the set contains the root bundle
pub fn require_root(set: &BundleSet) -> Result<()> {
    if set.contains_key(ROOT_BUNDLE) {
        Ok(())
    } else {
        Err(MixError::RootBundleMissing)
    }
}
