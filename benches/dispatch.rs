//! Benchmark for translation dispatch
//!
//! Measures predicate-scan dispatch (in-tree -> CSI) against keyed lookup
//! dispatch (CSI -> in-tree) over the built-in registry.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use csi_translation::CsiTranslator;
use k8s_openapi::api::core::v1::{
    AWSElasticBlockStoreVolumeSource, CinderPersistentVolumeSource, GCEPersistentDiskVolumeSource,
    PersistentVolume, PersistentVolumeSpec,
};

fn volumes() -> Vec<PersistentVolume> {
    let specs = [
        PersistentVolumeSpec {
            gce_persistent_disk: Some(GCEPersistentDiskVolumeSource {
                pd_name: "disk-1".into(),
                ..Default::default()
            }),
            ..Default::default()
        },
        PersistentVolumeSpec {
            aws_elastic_block_store: Some(AWSElasticBlockStoreVolumeSource {
                volume_id: "aws://us-east-1a/vol-0abc".into(),
                ..Default::default()
            }),
            ..Default::default()
        },
        PersistentVolumeSpec {
            cinder: Some(CinderPersistentVolumeSource {
                volume_id: "b5c1f7a2".into(),
                ..Default::default()
            }),
            ..Default::default()
        },
    ];

    specs
        .into_iter()
        .enumerate()
        .map(|(i, spec)| {
            let mut pv = PersistentVolume::default();
            pv.metadata.name = Some(format!("pv-{}", i));
            pv.spec = Some(spec);
            pv
        })
        .collect()
}

fn bench_to_csi(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");
    group.throughput(Throughput::Elements(3));

    let translator = CsiTranslator::with_default_plugins().unwrap();
    let pvs = volumes();

    group.bench_function("in_tree_to_csi", |b| {
        b.iter(|| {
            for pv in &pvs {
                let _ = translator.translate_in_tree_pv_to_csi(black_box(pv));
            }
        });
    });

    group.finish();
}

fn bench_to_in_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");
    group.throughput(Throughput::Elements(3));

    let translator = CsiTranslator::with_default_plugins().unwrap();
    let csi_pvs: Vec<_> = volumes()
        .iter()
        .filter_map(|pv| translator.translate_in_tree_pv_to_csi(pv).ok())
        .collect();

    group.bench_function("csi_to_in_tree", |b| {
        b.iter(|| {
            for pv in &csi_pvs {
                let _ = translator.translate_csi_pv_to_in_tree(black_box(pv));
            }
        });
    });

    group.finish();
}

fn bench_is_pv_migrated(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");
    group.throughput(Throughput::Elements(3));

    let translator = CsiTranslator::with_default_plugins().unwrap();
    let pvs = volumes();

    group.bench_function("is_pv_migrated", |b| {
        b.iter(|| {
            for pv in &pvs {
                black_box(translator.is_pv_migrated(black_box(pv)));
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_to_csi, bench_to_in_tree, bench_is_pv_migrated);
criterion_main!(benches);
