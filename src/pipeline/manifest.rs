//! Update manifest format
//!
//! ```text
//! MANIFEST\t<format>
//! version:\t<version>
//! previous:\t<previous version>
//! filecount:\t<entries>
//! timestamp:\t<unix seconds>
//! contentsize:\t<bytes>
//! includes:\t<bundle>          (zero or more)
//!
//! <flags>\t<hash>\t<version>\t<name>
//! ```
//!
//! Flags are four characters: type (`F` file, `D` directory, `L` link,
//! `M` manifest, `.` unset), status (`d` deleted, `g` ghosted), modifier
//! and rename.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, fs as fs_error, pipeline as pipeline_error};

const REQUIRED_HEADERS: [&str; 6] = [
    "MANIFEST",
    "version:",
    "previous:",
    "filecount:",
    "timestamp:",
    "contentsize:",
];

const HASH_LEN: usize = 64;

/// File name of a pack from `from` for `bundle`
pub fn pack_file_name(bundle: &str, from: u32) -> String {
    format!("pack-{bundle}-from-{from}.tar")
}

/// File name of the manifest of `name` (`MoM`, `full` or a bundle)
pub fn manifest_file_name(name: &str) -> String {
    format!("Manifest.{name}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Unset,
    File,
    Directory,
    Link,
    Manifest,
}

impl EntryType {
    fn from_flag(flag: char) -> Option<Self> {
        match flag {
            '.' => Some(Self::Unset),
            'F' => Some(Self::File),
            'D' => Some(Self::Directory),
            'L' => Some(Self::Link),
            'M' => Some(Self::Manifest),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Raw four-character flag string
    pub flags: String,
    pub kind: EntryType,
    pub hash: String,
    pub version: u32,
    pub name: String,
}

impl ManifestEntry {
    pub fn is_deleted(&self) -> bool {
        self.flags.chars().nth(1) == Some('d')
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ManifestHeader {
    pub format: u32,
    pub version: u32,
    pub previous: u32,
    pub file_count: u32,
    pub timestamp: i64,
    pub content_size: u64,
    pub includes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Manifest {
    pub header: ManifestHeader,
    pub entries: Vec<ManifestEntry>,
}

impl Manifest {
    /// Bundle manifest versions listed by a MoM
    pub fn bundle_versions(&self) -> BTreeMap<String, u32> {
        self.entries
            .iter()
            .filter(|e| e.kind == EntryType::Manifest && !e.is_deleted())
            .map(|e| (e.name.clone(), e.version))
            .collect()
    }
}

impl fmt::Display for Manifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let h = &self.header;
        writeln!(f, "MANIFEST\t{}", h.format)?;
        writeln!(f, "version:\t{}", h.version)?;
        writeln!(f, "previous:\t{}", h.previous)?;
        writeln!(f, "filecount:\t{}", h.file_count)?;
        writeln!(f, "timestamp:\t{}", h.timestamp)?;
        writeln!(f, "contentsize:\t{}", h.content_size)?;
        for include in &h.includes {
            writeln!(f, "includes:\t{include}")?;
        }
        writeln!(f)?;
        for e in &self.entries {
            writeln!(f, "{}\t{}\t{}\t{}", e.flags, e.hash, e.version, e.name)?;
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(field: &str, value: Option<&str>) -> std::result::Result<T, String> {
    let value = value.ok_or_else(|| format!("missing value for {field:?}"))?;
    value
        .parse()
        .map_err(|_| format!("invalid value {value:?} for {field:?}"))
}

fn parse_header_line(line: &str, header: &mut ManifestHeader) -> std::result::Result<(), String> {
    let mut fields = line.split('\t');
    let key = fields.next().unwrap_or_default();
    let value = fields.next();

    match key {
        "MANIFEST" => header.format = parse_number(key, value)?,
        "version:" => header.version = parse_number(key, value)?,
        "previous:" => header.previous = parse_number(key, value)?,
        "filecount:" => header.file_count = parse_number(key, value)?,
        "timestamp:" => header.timestamp = parse_number(key, value)?,
        "contentsize:" => header.content_size = parse_number(key, value)?,
        "includes:" => {
            let name = value.ok_or("missing value for \"includes:\"")?;
            header.includes.push(name.to_string());
        }
        _ => {}
    }
    Ok(())
}

fn check_header(header: &ManifestHeader) -> std::result::Result<(), String> {
    if header.format == 0 {
        return Err("manifest format not set".into());
    }
    if header.version == 0 {
        return Err("manifest has version zero, version must be positive".into());
    }
    if header.version < header.previous {
        return Err("version is smaller than previous".into());
    }
    if header.file_count == 0 {
        return Err("manifest has a zero file count".into());
    }
    if header.timestamp == 0 {
        return Err("manifest timestamp not set".into());
    }
    Ok(())
}

fn parse_entry(line: &str) -> std::result::Result<ManifestEntry, String> {
    let fields: Vec<&str> = line.split('\t').collect();
    let [flags, hash, version, name] = fields.as_slice() else {
        return Err(format!("invalid entry {line:?}: expected 4 fields"));
    };

    if flags.chars().count() != 4 {
        return Err(format!("invalid number of flags: {flags}"));
    }
    if hash.len() != HASH_LEN {
        return Err(format!("invalid hash: {hash}"));
    }
    let version = version
        .parse()
        .map_err(|_| format!("invalid version: {version}"))?;
    let kind = flags
        .chars()
        .next()
        .and_then(EntryType::from_flag)
        .ok_or_else(|| format!("invalid flags: {flags}"))?;

    Ok(ManifestEntry {
        flags: (*flags).to_string(),
        kind,
        hash: (*hash).to_string(),
        version,
        name: (*name).to_string(),
    })
}

fn parse_str(content: &str) -> std::result::Result<Manifest, String> {
    let mut manifest = Manifest::default();
    let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
    let mut lines = content.lines();

    for line in lines.by_ref() {
        if line.is_empty() {
            break;
        }
        let key = line.split('\t').next().unwrap_or_default();
        let count = seen.entry(key).or_default();
        if key != "includes:" && *count > 0 {
            return Err(format!("duplicate entry {key:?} in header"));
        }
        *count += 1;
        parse_header_line(line, &mut manifest.header)?;
    }

    for required in REQUIRED_HEADERS {
        if !seen.contains_key(required) {
            return Err(format!("missing entry {required:?} in header"));
        }
    }
    check_header(&manifest.header)?;

    for line in lines {
        if line.is_empty() {
            return Err("extra blank line".into());
        }
        manifest.entries.push(parse_entry(line)?);
    }

    if manifest.entries.is_empty() {
        return Err("does not have any file entries".into());
    }
    Ok(manifest)
}

/// Parse manifest text; `path` is only used for error messages
pub fn parse_manifest(path: &Path, content: &str) -> Result<Manifest> {
    parse_str(content).map_err(|reason| pipeline_error::manifest_parse_failed(path, reason))
}

pub fn parse_manifest_file(path: &Path) -> Result<Manifest> {
    let content = fs::read_to_string(path).map_err(|e| fs_error::read_failed(path, &e))?;
    parse_manifest(path, &content)
}
