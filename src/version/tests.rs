#![allow(clippy::expect_used)]

use std::fs;

use super::*;
use crate::error::MixError;
use crate::test_fixtures::{create_temp_dir, create_test_files};

/// Mirror with format 2 covering upstream versions 100..=300
fn mirror(temp: &tempfile::TempDir) -> MirrorUpstream {
    create_test_files(
        temp,
        &[
            ("mirror/update/200/format", "2\n"),
            ("mirror/update/version/format2/first", "100\n"),
            ("mirror/update/version/format2/latest", "300\n"),
            ("mirror/update/150/Manifest.MoM", ""),
            ("mirror/update/300/Manifest.MoM", ""),
        ],
    );
    MirrorUpstream::new(temp.path().join("mirror"))
}

#[test]
fn test_read_current_names() {
    let temp = create_temp_dir();
    create_test_files(
        &temp,
        &[
            ("mixversion", "20\n"),
            ("upstreamversion", " 30000 \n"),
            ("upstreamurl", "https://example.org\n"),
        ],
    );
    let ledger = VersionLedger::new(temp.path());

    assert_eq!(ledger.mix_version().expect("mix"), 20);
    assert_eq!(ledger.upstream_version().expect("upstream"), 30000);
    assert_eq!(
        ledger.upstream_url().expect("url").as_deref(),
        Some("https://example.org")
    );
}

#[test]
fn test_deprecated_name_read_then_migrated() {
    let temp = create_temp_dir();
    create_test_files(&temp, &[(".mixversion", "40")]);
    let ledger = VersionLedger::new(temp.path());

    assert_eq!(ledger.mix_version().expect("mix"), 40);

    let next = ledger.bump_mix_version().expect("bump");
    assert_eq!(next, 50);
    assert_eq!(
        fs::read_to_string(temp.path().join("mixversion")).expect("read"),
        "50\n"
    );
    assert!(!temp.path().join(".mixversion").exists());
    assert_eq!(ledger.mix_version().expect("mix"), 50);
}

#[test]
fn test_missing_and_malformed_versions() {
    let temp = create_temp_dir();
    let ledger = VersionLedger::new(temp.path());

    let err = ledger.mix_version().expect_err("missing");
    assert!(matches!(err, MixError::VersionFileMissing { .. }));
    assert!(ledger.upstream_url().expect("url").is_none());

    create_test_files(&temp, &[("mixversion", "ten")]);
    let err = ledger.mix_version().expect_err("malformed");
    assert!(matches!(err, MixError::VersionParseFailed { .. }));
}

#[test]
fn test_bump_overflow() {
    let temp = create_temp_dir();
    let max = u32::MAX.to_string();
    create_test_files(&temp, &[("mixversion", max.as_str())]);
    let ledger = VersionLedger::new(temp.path());

    let err = ledger.bump_mix_version().expect_err("overflow");
    assert!(matches!(err, MixError::VersionOverflow { .. }));
}

#[test]
fn test_update_versions_defaults() {
    let temp = create_temp_dir();
    create_test_files(&temp, &[("mixversion", "10"), ("upstreamversion", "200")]);
    let upstream = mirror(&temp);
    let ledger = VersionLedger::new(temp.path());

    let update = ledger
        .update_versions(None, UpstreamTarget::Latest, &upstream)
        .expect("update");

    assert_eq!(update.mix, 20);
    assert_eq!(update.upstream, 300);
    assert_eq!(update.range.format, 2);
    assert_eq!(ledger.mix_version().expect("mix"), 20);
    assert_eq!(ledger.upstream_version().expect("upstream"), 300);
}

#[test]
fn test_update_versions_rejects_out_of_range() {
    let temp = create_temp_dir();
    create_test_files(&temp, &[("mixversion", "10"), ("upstreamversion", "200")]);
    let upstream = mirror(&temp);
    let ledger = VersionLedger::new(temp.path());

    let err = ledger
        .update_versions(Some(20), UpstreamTarget::Version(310), &upstream)
        .expect_err("out of range");
    assert_eq!(
        err.to_string(),
        "invalid upstream version to update (310) out of the format 2 range: \
         must be at least 100 and at most 300"
    );
    assert_eq!(ledger.mix_version().expect("mix"), 10);
}

#[test]
fn test_update_versions_rejects_non_increasing_mix() {
    let temp = create_temp_dir();
    create_test_files(&temp, &[("mixversion", "10"), ("upstreamversion", "200")]);
    let upstream = mirror(&temp);
    let ledger = VersionLedger::new(temp.path());

    let err = ledger
        .update_versions(Some(10), UpstreamTarget::Version(150), &upstream)
        .expect_err("not increasing");
    assert!(matches!(err, MixError::VersionNotIncreasing { .. }));
}

#[test]
fn test_update_versions_requires_upstream_manifest() {
    let temp = create_temp_dir();
    create_test_files(&temp, &[("mixversion", "10"), ("upstreamversion", "200")]);
    let upstream = mirror(&temp);
    let ledger = VersionLedger::new(temp.path());

    let err = ledger
        .update_versions(None, UpstreamTarget::Version(120), &upstream)
        .expect_err("no manifest");
    assert!(matches!(err, MixError::UpstreamInfoMissing { .. }));
}

#[test]
fn test_upstream_target_parse() {
    assert_eq!("latest".parse::<UpstreamTarget>(), Ok(UpstreamTarget::Latest));
    assert_eq!(
        "250".parse::<UpstreamTarget>(),
        Ok(UpstreamTarget::Version(250))
    );
    assert!("soon".parse::<UpstreamTarget>().is_err());
}

#[test]
fn test_init_writes_all_files() {
    let temp = create_temp_dir();
    let ledger = VersionLedger::new(temp.path());

    ledger
        .init(&InitVersions {
            mix_version: 10,
            upstream_version: 200,
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
        })
        .expect("init");

    assert_eq!(ledger.mix_version().expect("mix"), 10);
    assert_eq!(ledger.upstream_version().expect("upstream"), 200);
    assert_eq!(
        ledger.upstream_url().expect("url").as_deref(),
        Some(DEFAULT_UPSTREAM_URL)
    );
}

#[test]
fn test_state_defaults_from_last_ver() {
    let temp = create_temp_dir();
    let last_ver = temp.path().join("update/image/LAST_VER");

    let state = MixState::load(temp.path(), &last_ver).expect("load");
    assert_eq!(state.format, state::DEFAULT_FORMAT);
    assert_eq!(state.previous_mix_version, 0);

    create_test_files(&temp, &[("update/image/LAST_VER", "40\n")]);
    let state = MixState::load(temp.path(), &last_ver).expect("load");
    assert_eq!(state.previous_mix_version, 40);
}

#[test]
fn test_state_round_trip() {
    let temp = create_temp_dir();
    let last_ver = temp.path().join("LAST_VER");
    let state = MixState {
        format: 3,
        previous_mix_version: 60,
    };
    state.save(temp.path()).expect("save");

    assert_eq!(MixState::load(temp.path(), &last_ver).expect("load"), state);
}

#[test]
fn test_state_malformed() {
    let temp = create_temp_dir();
    create_test_files(&temp, &[("mixer.state", "format: [oops\n")]);

    let err = MixState::load(temp.path(), &temp.path().join("LAST_VER")).expect_err("bad");
    assert!(matches!(err, MixError::ConfigParseFailed { .. }));
}
