#![allow(clippy::expect_used)]

use std::path::Path;
use std::sync::Mutex;

use super::*;
use crate::error::MixError;
use crate::pipeline::artifact::MemoryArtifactStore;
use crate::pipeline::manifest::{EntryType, ManifestEntry, ManifestHeader};
use crate::pipeline::services::{FullfilesSummary, ManifestRequest, ManifestSummary};
use crate::test_fixtures::create_temp_dir;

/// Records pack requests; fails for one bundle name if asked to
#[derive(Default)]
struct FakeService {
    packs: Mutex<Vec<PackKey>>,
    fail_bundle: Option<String>,
}

impl FakeService {
    fn packs(&self) -> Vec<PackKey> {
        let mut packs = self.packs.lock().expect("lock").clone();
        packs.sort();
        packs
    }
}

impl ManifestService for FakeService {
    fn create_manifests(&self, _request: &ManifestRequest) -> Result<ManifestSummary> {
        Ok(ManifestSummary::default())
    }

    fn create_fullfiles(
        &self,
        _manifest: &Path,
        _chroot_dir: &Path,
        _output_dir: &Path,
        _workers: usize,
    ) -> Result<FullfilesSummary> {
        Ok(FullfilesSummary::default())
    }

    fn create_pack(&self, request: &PackRequest) -> Result<PackSummary> {
        if self.fail_bundle.as_deref() == Some(request.bundle.as_str()) {
            return Err(pipeline_error::service_failed("create pack", "boom"));
        }
        self.packs.lock().expect("lock").push(PackKey::new(
            &request.bundle,
            request.from,
            request.to,
        ));
        Ok(PackSummary {
            fullfiles: 1,
            deltas: 0,
            warnings: Vec::new(),
        })
    }
}

fn mom(version: u32, previous: u32, bundles: &[(&str, u32)]) -> Manifest {
    Manifest {
        header: ManifestHeader {
            format: 1,
            version,
            previous,
            file_count: u32::try_from(bundles.len()).expect("count"),
            timestamp: 1_700_000_000,
            content_size: 0,
            includes: Vec::new(),
        },
        entries: bundles
            .iter()
            .map(|(name, v)| ManifestEntry {
                flags: "M...".to_string(),
                kind: EntryType::Manifest,
                hash: "0".repeat(64),
                version: *v,
                name: (*name).to_string(),
            })
            .collect(),
    }
}

fn write_mom(www: &Path, manifest: &Manifest) {
    let path = mom_path(www, manifest.header.version);
    std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    std::fs::write(path, manifest.to_string()).expect("write");
}

fn context<'a>(
    service: &'a FakeService,
    store: &'a MemoryArtifactStore,
    www: &Path,
) -> PackContext<'a> {
    PackContext {
        service,
        store,
        www_dir: www.to_path_buf(),
        image_dir: www.with_file_name("image"),
        workers: 2,
    }
}

#[test]
fn test_zero_packs_are_idempotent() {
    let temp = create_temp_dir();
    let service = FakeService::default();
    let store = MemoryArtifactStore::new();
    let ctx = context(&service, &store, &temp.path().join("www"));
    let bundles = vec![
        BundleVersion {
            name: "editors".to_string(),
            version: 20,
        },
        BundleVersion {
            name: "os-core".to_string(),
            version: 10,
        },
    ];

    create_zero_packs(&ctx, &bundles).expect("first run");
    create_zero_packs(&ctx, &bundles).expect("second run");

    assert_eq!(
        service.packs(),
        vec![PackKey::new("editors", 0, 20), PackKey::new("os-core", 0, 10)]
    );
    assert_eq!(store.len(), 2);
}

#[test]
fn test_zero_pack_failure_is_fatal() {
    let temp = create_temp_dir();
    let service = FakeService {
        fail_bundle: Some("os-core".to_string()),
        ..FakeService::default()
    };
    let store = MemoryArtifactStore::new();
    let ctx = context(&service, &store, &temp.path().join("www"));

    let err = create_zero_packs(
        &ctx,
        &[BundleVersion {
            name: "os-core".to_string(),
            version: 10,
        }],
    )
    .expect_err("should fail");

    assert!(matches!(err, MixError::ManifestServiceFailed { .. }));
    assert!(store.is_empty());
}

#[test]
fn test_zero_pack_needs_positive_version() {
    let temp = create_temp_dir();
    let service = FakeService::default();
    let store = MemoryArtifactStore::new();
    let ctx = context(&service, &store, &temp.path().join("www"));

    let err = create_zero_packs(
        &ctx,
        &[
            BundleVersion {
                name: "editors".to_string(),
                version: 20,
            },
            BundleVersion {
                name: "os-core".to_string(),
                version: 0,
            },
        ],
    )
    .expect_err("should fail");

    assert!(matches!(
        err,
        MixError::InvalidPackRange { from: 0, to: 0, .. }
    ));
    assert!(service.packs().is_empty());
    assert!(store.is_empty());
}

#[test]
fn test_bundles_to_pack() {
    let from = mom(20, 10, &[("editors", 20), ("os-core", 10), ("gone", 20)]);
    let to = mom(30, 20, &[("editors", 30), ("os-core", 10), ("new", 30)]);

    assert_eq!(
        bundles_to_pack(&from, &to).expect("diff"),
        vec![PackKey::new("editors", 20, 30), PackKey::new("new", 0, 30)]
    );
}

#[test]
fn test_bundles_to_pack_rejects_going_back() {
    let from = mom(20, 10, &[("editors", 20)]);
    let to = mom(30, 20, &[("editors", 10)]);

    let err = bundles_to_pack(&from, &to).expect_err("should fail");
    assert!(matches!(
        err,
        MixError::InvalidPackRange {
            from: 20,
            to: 10,
            ..
        }
    ));
}

#[test]
fn test_previous_versions_walk_the_chain() {
    let temp = create_temp_dir();
    let www = temp.path().join("www");
    write_mom(&www, &mom(10, 0, &[("os-core", 10)]));
    write_mom(&www, &mom(20, 10, &[("os-core", 10), ("editors", 20)]));
    write_mom(&www, &mom(30, 20, &[("os-core", 30), ("editors", 20)]));

    let service = FakeService::default();
    let store = MemoryArtifactStore::new();
    let ctx = context(&service, &store, &www);

    let keys = delta_pack_tasks(&ctx, 30, DeltaSource::PreviousVersions(5)).expect("tasks");
    assert_eq!(
        keys,
        vec![PackKey::new("editors", 0, 20), PackKey::new("os-core", 10, 30)]
    );

    let one_back = delta_pack_tasks(&ctx, 20, DeltaSource::PreviousVersions(1)).expect("tasks");
    assert_eq!(one_back, vec![PackKey::new("editors", 0, 20)]);
}

#[test]
fn test_missing_previous_manifest_ends_walk() {
    let temp = create_temp_dir();
    let www = temp.path().join("www");
    write_mom(&www, &mom(30, 20, &[("os-core", 30)]));

    let service = FakeService::default();
    let store = MemoryArtifactStore::new();
    let ctx = context(&service, &store, &www);

    let failed = create_delta_packs(&ctx, 30, DeltaSource::PreviousVersions(3)).expect("deltas");
    assert_eq!(failed, 0);
    assert!(service.packs().is_empty());
}

#[test]
fn test_explicit_from_newer_than_target() {
    let temp = create_temp_dir();
    let www = temp.path().join("www");
    write_mom(&www, &mom(20, 10, &[("os-core", 20)]));

    let service = FakeService::default();
    let store = MemoryArtifactStore::new();
    let ctx = context(&service, &store, &www);

    let err = delta_pack_tasks(&ctx, 20, DeltaSource::From(30)).expect_err("should fail");
    assert!(matches!(err, MixError::InvalidBuildParameter { .. }));
}

#[test]
fn test_failed_delta_is_counted_not_fatal() {
    let temp = create_temp_dir();
    let www = temp.path().join("www");
    write_mom(&www, &mom(10, 0, &[("editors", 10), ("os-core", 10)]));
    write_mom(&www, &mom(20, 10, &[("editors", 20), ("os-core", 20)]));

    let service = FakeService {
        fail_bundle: Some("editors".to_string()),
        ..FakeService::default()
    };
    let store = MemoryArtifactStore::new();
    let ctx = context(&service, &store, &www);

    let failed = create_delta_packs(&ctx, 20, DeltaSource::From(10)).expect("deltas");

    assert_eq!(failed, 1);
    assert_eq!(service.packs(), vec![PackKey::new("os-core", 10, 20)]);
    assert_eq!(store.len(), 1);
}
