//! Topological ordering of a bundle set and package fill
//!
//! ## Algorithm
//!
//! Uses DFS with three-color marking over `include(...)` edges:
//!
//! 1. **WHITE** (unvisited): bundle hasn't been processed
//! 2. **GRAY** (on the current path): reaching one again is a cycle
//! 3. **BLACK** (done): all of its includes are ordered before it
//!
//! `also-add(...)` edges do not contribute packages and are not ordered.

use std::collections::{BTreeSet, HashSet};

use crate::catalog::BundleSet;
use crate::error::{Result, bundle as bundle_error};

/// Context for one ordering pass
struct TopoSortContext<'a> {
    set: &'a BundleSet,
    /// BLACK bundles
    visited: HashSet<String>,
    /// GRAY bundles, in path order so a cycle can be reported
    path: Vec<String>,
    order: Vec<String>,
}

/// Order a bundle set so every bundle comes after all of its includes
///
/// Roots are visited in name order, which keeps the result deterministic.
///
/// # Errors
///
/// Returns an error if the includes form a cycle or point outside the set.
pub fn topological_order(set: &BundleSet) -> Result<Vec<String>> {
    let mut ctx = TopoSortContext {
        set,
        visited: HashSet::new(),
        path: Vec::new(),
        order: Vec::with_capacity(set.len()),
    };

    for name in set.keys() {
        topo_dfs(&mut ctx, name)?;
    }

    Ok(ctx.order)
}

fn topo_dfs(ctx: &mut TopoSortContext, name: &str) -> Result<()> {
    if ctx.visited.contains(name) {
        return Ok(());
    }

    if let Some(start) = ctx.path.iter().position(|n| n == name) {
        let mut chain = ctx.path[start..].to_vec();
        chain.push(name.to_string());
        return Err(bundle_error::cycle(&chain));
    }

    let set = ctx.set;
    let Some(bundle) = set.get(name) else {
        return Err(bundle_error::not_found(name));
    };

    ctx.path.push(name.to_string());
    for include in &bundle.direct_includes {
        topo_dfs(ctx, include)?;
    }
    ctx.path.pop();

    ctx.visited.insert(name.to_string());
    ctx.order.push(name.to_string());
    Ok(())
}

/// Check the set for cycles and fill every bundle's `all_packages`
///
/// Returns the order the set was filled in (includes first).
pub fn fill_packages(set: &mut BundleSet) -> Result<Vec<String>> {
    let order = topological_order(set)?;

    for name in &order {
        let Some(bundle) = set.get(name) else {
            continue;
        };
        let mut all: BTreeSet<String> = bundle.direct_packages.clone();
        for include in &bundle.direct_includes {
            if let Some(included) = set.get(include) {
                all.extend(included.all_packages.iter().cloned());
            }
        }
        if let Some(bundle) = set.get_mut(name) {
            bundle.all_packages = all;
        }
    }

    Ok(order)
}
