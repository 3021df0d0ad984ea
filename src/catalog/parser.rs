//! Bundle definition and package list parsing
//!
//! A definition file looks like:
//!
//! ```text
//! # [TITLE]: editors
//! # [DESCRIPTION]: Popular text editors
//! include(os-core)
//! also-add(spell)
//! content(/srv/extra/editors)
//! vim     # terminal editor
//! nano
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::catalog::bundle::BundleHeader;
use crate::error::{Result, bundle as bundle_error};

/// Names reserved for top-level manifests
const RESERVED_NAMES: [&str; 2] = ["MoM", "full"];

/// Contents of one definition file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Definition {
    pub header: BundleHeader,
    pub direct_includes: Vec<String>,
    pub optional_includes: Vec<String>,
    pub direct_packages: BTreeSet<String>,
    pub content_chroots: BTreeSet<PathBuf>,
}

/// Check a bundle name against `[A-Za-z0-9_-]+` and the reserved names
pub fn validate_bundle_name(name: &str) -> Result<()> {
    let valid_chars = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid_chars || RESERVED_NAMES.contains(&name) {
        return Err(bundle_error::invalid_name(name));
    }
    Ok(())
}

/// Package names additionally allow `+` and `.`
pub fn is_valid_package_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '.'))
}

/// Parse a `# [KEY]: value` line
fn parse_header_line(line: &str) -> Option<(&str, &str)> {
    let rest = line.strip_prefix("# [")?;
    let (key, value) = rest.split_once("]:")?;
    if key.is_empty() || !key.chars().all(|c| c.is_ascii_uppercase()) {
        return None;
    }
    Some((key, value.trim()))
}

fn strip_comment(line: &str) -> &str {
    line.split('#').next().unwrap_or_default().trim()
}

/// Parse the text of a definition file
///
/// `path` is only used for error messages.
pub fn parse_definition(path: &Path, content: &str) -> Result<Definition> {
    let mut def = Definition::default();
    let source = path.display().to_string();

    for (idx, raw) in content.lines().enumerate() {
        let line_no = idx + 1;

        if let Some((key, value)) = parse_header_line(raw) {
            def.header.set(key, value);
            continue;
        }

        let line = strip_comment(raw);
        if line.is_empty() {
            continue;
        }

        let Some((keyword, rest)) = line.split_once('(') else {
            if !is_valid_package_name(line) {
                return Err(bundle_error::parse_failed(
                    &source,
                    line_no,
                    format!("Invalid package name '{line}' in line {line_no}"),
                ));
            }
            def.direct_packages.insert(line.to_string());
            continue;
        };

        let Some(arg) = rest.strip_suffix(')') else {
            return Err(bundle_error::parse_failed(
                &source,
                line_no,
                format!("Missing end parenthesis in line {line_no}"),
            ));
        };
        let arg = arg.trim();

        match keyword.trim() {
            "include" | "also-add" => {
                validate_bundle_name(arg).map_err(|_| {
                    bundle_error::parse_failed(
                        &source,
                        line_no,
                        format!("Invalid bundle name '{arg}' in line {line_no}"),
                    )
                })?;
                if keyword.trim() == "include" {
                    def.direct_includes.push(arg.to_string());
                } else {
                    def.optional_includes.push(arg.to_string());
                }
            }
            "content" => {
                let trimmed = arg.trim_end_matches('/');
                if trimmed.is_empty() {
                    return Err(bundle_error::parse_failed(
                        &source,
                        line_no,
                        format!("Empty content path in line {line_no}"),
                    ));
                }
                def.content_chroots.insert(PathBuf::from(trimmed));
            }
            other => {
                return Err(bundle_error::parse_failed(
                    &source,
                    line_no,
                    format!("Unknown directive '{other}' in line {line_no}"),
                ));
            }
        }
    }

    Ok(def)
}

/// Parse a flat package list: one package per line, `#` comments stripped
pub fn parse_package_list(content: &str) -> BTreeSet<String> {
    content
        .lines()
        .map(strip_comment)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Skeleton definition for a new local bundle
pub fn definition_template(name: &str) -> String {
    format!(
        "# [TITLE]: {name}\n\
         # [DESCRIPTION]: \n\
         # [STATUS]: \n\
         # [CAPABILITIES]: \n\
         # [MAINTAINER]: \n\
         # \n\
         # List bundles one per line with include(bundle), packages one per line.\n"
    )
}
