//! List and tree views of the mix and the catalogs

use std::collections::BTreeSet;
use std::fmt::Write as _;

use crate::catalog::{BundleCatalog, BundleSet, DefinitionKind, Origin};
use crate::error::Result;
use crate::resolver::{BundleResolver, MixBundleList};

const TREE_NIL: &str = "    ";
const TREE_BAR: &str = "│   ";
const TREE_MID: &str = "├── ";
const TREE_END: &str = "└── ";

/// Which bundles `bundle list` shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListMode {
    /// Selected bundles and everything they include
    #[default]
    Mix,
    Local,
    Upstream,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub name: String,
    pub notes: Vec<String>,
}

/// Collect the entries of one list mode, sorted by name
pub fn list_entries(
    catalog: &BundleCatalog,
    list: &MixBundleList,
    mode: ListMode,
) -> Result<Vec<ListEntry>> {
    let selected = list.read_set()?;

    match mode {
        ListMode::Mix => {
            let set = BundleResolver::new(catalog).full_bundle_set(&selected)?;
            Ok(set
                .values()
                .map(|bundle| {
                    let mut notes = vec![format!("({})", bundle.location())];
                    if !selected.contains(&bundle.name) {
                        notes.push("(included)".to_string());
                    }
                    ListEntry {
                        name: bundle.name.clone(),
                        notes,
                    }
                })
                .collect())
        }
        ListMode::Local => catalog_entries(catalog, &selected, Origin::Local),
        ListMode::Upstream => catalog_entries(catalog, &selected, Origin::Upstream),
    }
}

fn catalog_entries(
    catalog: &BundleCatalog,
    selected: &BTreeSet<String>,
    origin: Origin,
) -> Result<Vec<ListEntry>> {
    let (other, shadow_note) = match origin {
        Origin::Local => (Origin::Upstream, "(masking upstream)"),
        Origin::Upstream => (Origin::Local, "(masked by local)"),
    };
    let other_names = catalog.names(other)?;

    Ok(catalog
        .entries(origin)?
        .into_values()
        .map(|bundle| {
            let mut notes = Vec::new();
            if bundle.kind == DefinitionKind::Package {
                notes.push("(package)".to_string());
            }
            if selected.contains(&bundle.name) {
                notes.push("(in mix)".to_string());
            }
            if other_names.contains(&bundle.name) {
                notes.push(shadow_note.to_string());
            }
            ListEntry {
                name: bundle.name,
                notes,
            }
        })
        .collect())
}

/// One line per entry, names padded to a common width
pub fn render_list(entries: &[ListEntry]) -> String {
    let width = entries.iter().map(|e| e.name.len()).max().unwrap_or(0);
    let mut out = String::new();
    for entry in entries {
        let line = format!("{:<width$} {}", entry.name, entry.notes.join(" "));
        let _ = writeln!(out, "{}", line.trim_end());
    }
    out
}

/// Render the include tree below each of `roots`
///
/// A bundle that includes one of its own ancestors is printed once more,
/// marked `(cycle)`, and not descended.
pub fn render_tree<S: AsRef<str>>(set: &BundleSet, roots: &[S]) -> String {
    let mut out = String::new();
    let mut ancestors = Vec::new();
    for root in roots {
        tree_node(set, root.as_ref(), &mut Vec::new(), &mut ancestors, &mut out);
    }
    out
}

fn tree_node(
    set: &BundleSet,
    name: &str,
    last_flags: &mut Vec<bool>,
    ancestors: &mut Vec<String>,
    out: &mut String,
) {
    let mut prefix = String::new();
    if let Some((last, parents)) = last_flags.split_last() {
        for parent_last in parents {
            prefix.push_str(if *parent_last { TREE_NIL } else { TREE_BAR });
        }
        prefix.push_str(if *last { TREE_END } else { TREE_MID });
    }

    let Some(bundle) = set.get(name) else {
        let _ = writeln!(out, "{prefix}{name} (not found)");
        return;
    };

    if ancestors.iter().any(|a| a == name) {
        let _ = writeln!(out, "{prefix}{name} (cycle)");
        return;
    }
    let _ = writeln!(out, "{prefix}{name} ({})", bundle.location());

    ancestors.push(name.to_string());
    let count = bundle.direct_includes.len();
    for (idx, include) in bundle.direct_includes.iter().enumerate() {
        last_flags.push(idx + 1 == count);
        tree_node(set, include, last_flags, ancestors, out);
        last_flags.pop();
    }
    ancestors.pop();
}
