use dirmanifest_core::{
    Manifest, Node, Percentiles, Rollup, RollupCapabilities, RollupOptions, SizeBuckets,
    SizeStats, SkipReason, SkipRecord, path,
};

#[test]
fn test_node_builders() {
    let file = Node::new_file("src/lib.rs", 2048)
        .with_mtime(1_700_000_000)
        .with_inode(42);

    assert!(file.is_file());
    assert_eq!(file.name(), "lib.rs");
    assert_eq!(file.mtime_unix, Some(1_700_000_000));
    assert_eq!(file.inode, Some(42));

    let dir = Node::new_directory("src").with_file_count(3);
    assert!(dir.is_dir);
    assert_eq!(dir.file_count, Some(3));
    assert_eq!(dir.parent(), Some(path::ROOT));
}

#[test]
fn test_node_serialization_omits_absent_facts() {
    let node = Node::new_directory("docs");
    let json = serde_json::to_string(&node).unwrap();

    assert_eq!(json, r#"{"path":"docs","is_dir":true}"#);

    let file: Node = serde_json::from_str(r#"{"path":"a.txt","size_bytes":12}"#).unwrap();
    assert!(file.is_file());
    assert_eq!(file.size_bytes, Some(12));
    assert!(file.rollup.is_none());
}

#[test]
fn test_manifest_json_shape() {
    let mut root = Node::new_directory(".");
    root.rollup = Some(Rollup {
        total_files: 1,
        size: Some(SizeStats {
            total: 500,
            sampled: 1,
            min: 500,
            max: 500,
            mean: 500,
            median: 500,
            percentiles: Some(Percentiles {
                p50: 500,
                p90: 500,
                p99: 500,
            }),
            buckets: Some(SizeBuckets {
                lt_1kb: 1,
                ..Default::default()
            }),
        }),
        ..Default::default()
    });

    let mut manifest = Manifest::new(
        "/data",
        vec![root, Node::new_file("x.bin", 500)],
        vec![SkipRecord::ignored("node_modules", true)],
    );
    manifest.meta.capabilities.rollup = RollupCapabilities::from_options(&RollupOptions::default());

    let value = serde_json::to_value(&manifest).unwrap();
    assert_eq!(value["manifest"]["capabilities"]["rollup"]["size_buckets"], true);
    assert_eq!(value["nodes"][0]["rollup"]["size"]["percentiles"]["p90"], 500);
    assert_eq!(value["skipped"][0]["reason"], "ignored");

    let restored: Manifest = serde_json::from_value(value).unwrap();
    assert_eq!(restored.nodes, manifest.nodes);
    assert_eq!(restored.skipped[0].reason, SkipReason::Ignored);
    assert_eq!(restored.rollup_capabilities(), manifest.rollup_capabilities());
}

#[test]
fn test_capability_declaration_without_sizes() {
    let options = RollupOptions::builder()
        .size_bytes(false)
        .percentiles(false)
        .size_buckets(false)
        .build()
        .unwrap();

    let caps = RollupCapabilities::from_options(&options);
    assert!(!caps.size_stats);
    assert!(!caps.size_percentiles);
    assert!(!caps.size_buckets);
    assert!(caps.dir_counts);
    assert!(caps.extension_counts);
    assert!(caps.file_types);
}
