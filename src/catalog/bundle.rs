//! Bundle data structures

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// Which catalog a definition came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Local,
    Upstream,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Local => write!(f, "local"),
            Origin::Upstream => write!(f, "upstream"),
        }
    }
}

/// Whether an entry is a definition file or a flat package list entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DefinitionKind {
    Bundle,
    Package,
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefinitionKind::Bundle => write!(f, "bundle"),
            DefinitionKind::Package => write!(f, "package"),
        }
    }
}

/// Informational `# [KEY]: value` header of a definition file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BundleHeader {
    pub title: String,
    pub description: String,
    pub status: String,
    pub capabilities: String,
    pub maintainer: String,
}

impl BundleHeader {
    /// Store a header value; unknown keys are ignored
    pub fn set(&mut self, key: &str, value: &str) {
        let slot = match key {
            "TITLE" => &mut self.title,
            "DESCRIPTION" => &mut self.description,
            "STATUS" => &mut self.status,
            "CAPABILITIES" => &mut self.capabilities,
            "MAINTAINER" => &mut self.maintainer,
            _ => return,
        };
        *slot = value.to_string();
    }
}

/// A bundle as resolved from a catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bundle {
    pub name: String,
    /// Definition file (or package list) this bundle was read from
    pub filename: PathBuf,
    pub header: BundleHeader,
    /// `include(...)` lines in declaration order
    pub direct_includes: Vec<String>,
    /// `also-add(...)` lines in declaration order
    pub optional_includes: Vec<String>,
    pub direct_packages: BTreeSet<String>,
    /// Direct packages plus those of every include, filled during resolution
    pub all_packages: BTreeSet<String>,
    #[serde(skip)]
    pub content_chroots: BTreeSet<PathBuf>,
    /// Paths shipped by this bundle after content merge
    pub files: BTreeSet<String>,
    pub origin: Origin,
    pub kind: DefinitionKind,
}

impl Bundle {
    /// Virtual bundle for one entry of a flat package list
    pub fn from_package(name: &str, filename: PathBuf, origin: Origin) -> Self {
        Self {
            name: name.to_string(),
            filename,
            header: BundleHeader {
                title: name.to_string(),
                ..BundleHeader::default()
            },
            direct_includes: Vec::new(),
            optional_includes: Vec::new(),
            direct_packages: BTreeSet::from([name.to_string()]),
            all_packages: BTreeSet::new(),
            content_chroots: BTreeSet::new(),
            files: BTreeSet::new(),
            origin,
            kind: DefinitionKind::Package,
        }
    }

    /// Required includes followed by optional ones
    pub fn includes(&self) -> impl Iterator<Item = &String> {
        self.direct_includes
            .iter()
            .chain(self.optional_includes.iter())
    }

    /// Human readable location, e.g. "local bundle"
    pub fn location(&self) -> String {
        format!("{} {}", self.origin, self.kind)
    }
}

/// Bundles keyed (and ordered) by name
pub type BundleSet = BTreeMap<String, Bundle>;
