//! Files every build writes into the full tree
//!
//! Each bundle gets an empty tracking file under `/usr/share/clear/bundles`
//! so the update client can tell which bundles are installed. The root
//! bundle also carries the version identity of the build.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::catalog::BundleSet;
use crate::error::{Result, fs as fs_error};
use crate::resolver::ROOT_BUNDLE;

pub const TRACKING_DIR: &str = "usr/share/clear/bundles";
pub const VERSION_FILE: &str = "usr/share/clear/version";
pub const VERSIONSTAMP_FILE: &str = "usr/share/clear/versionstamp";

/// Write the tracking and version files and record them in bundle file lists
pub fn install_special_files(full_dir: &Path, set: &mut BundleSet, version: u32) -> Result<()> {
    let tracking = full_dir.join(TRACKING_DIR);
    fs::create_dir_all(&tracking).map_err(|e| fs_error::write_failed(&tracking, &e))?;

    for bundle in set.values_mut() {
        let file = tracking.join(&bundle.name);
        fs::write(&file, b"").map_err(|e| fs_error::write_failed(&file, &e))?;
        add_with_parents(&mut bundle.files, &format!("{TRACKING_DIR}/{}", bundle.name));
    }

    if let Some(core) = set.get_mut(ROOT_BUNDLE) {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs());
        for (relative, contents) in [
            (VERSION_FILE, version.to_string()),
            (VERSIONSTAMP_FILE, stamp.to_string()),
        ] {
            let file = full_dir.join(relative);
            fs::write(&file, contents).map_err(|e| fs_error::write_failed(&file, &e))?;
            add_with_parents(&mut core.files, relative);
        }
    }

    tracing::debug!("wrote tracking files for {} bundles", set.len());
    Ok(())
}

/// Insert `/a`, `/a/b`, ... up to `/relative`
fn add_with_parents(files: &mut BTreeSet<String>, relative: &str) {
    let mut path = String::new();
    for part in relative.split('/').filter(|p| !p.is_empty()) {
        path.push('/');
        path.push_str(part);
        files.insert(path.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_with_parents() {
        let mut files = BTreeSet::new();
        add_with_parents(&mut files, "usr/share/clear/bundles/editors");
        assert_eq!(
            files.into_iter().collect::<Vec<_>>(),
            vec![
                "/usr",
                "/usr/share",
                "/usr/share/clear",
                "/usr/share/clear/bundles",
                "/usr/share/clear/bundles/editors",
            ]
        );
    }
}
