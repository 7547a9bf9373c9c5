use dirmanifest_core::{Manifest, Node, Rollup, RollupOptions};
use dirmanifest_rollup::RollupAggregator;

fn rollup_of<'a>(nodes: &'a [Node], path: &str) -> &'a Rollup {
    nodes
        .iter()
        .find(|n| n.path == path)
        .and_then(|n| n.rollup.as_ref())
        .unwrap_or_else(|| panic!("no rollup for {path}"))
}

/// Deterministic pseudo-random tree: a few nested directories with files
/// of varied sizes, extensions and mtimes.
fn generated_tree() -> Vec<Node> {
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state
    };

    let dirs = [".", "src", "src/core", "src/core/deep", "docs", "assets", "assets/img"];
    let exts = ["rs", "md", "png", "", "tar.gz"];
    let mut nodes: Vec<Node> = dirs.iter().map(|d| Node::new_directory(*d)).collect();

    for (i, dir) in dirs.iter().enumerate() {
        let files = (next() % 7) as usize + i % 2;
        for f in 0..files {
            let ext = exts[(next() % exts.len() as u64) as usize];
            let name = if ext.is_empty() {
                format!("file{f}")
            } else {
                format!("file{f}.{ext}")
            };
            let size = match next() % 5 {
                0 => 0,
                1 => next() % 1024,
                2 => next() % (1024 * 1024),
                3 => next() % (20 * 1024 * 1024),
                _ => 1024,
            };
            let path = if *dir == "." { name } else { format!("{dir}/{name}") };
            nodes.push(Node::new_file(path, size).with_mtime(1_600_000_000 + (next() % 1_000_000) as i64));
        }
    }
    nodes
}

#[test]
fn test_two_files_size_stats() {
    let mut nodes = vec![
        Node::new_directory("a"),
        Node::new_file("a/x.txt", 500),
        Node::new_file("a/y.txt", 1500),
    ];
    let options = RollupOptions::builder()
        .percentiles(false)
        .size_buckets(false)
        .build()
        .unwrap();

    RollupAggregator::new(options).aggregate(&mut nodes).unwrap();

    let rollup = rollup_of(&nodes, "a");
    let size = rollup.size.as_ref().unwrap();
    assert_eq!(rollup.total_files, 2);
    assert_eq!(size.total, 2000);
    assert_eq!(size.min, 500);
    assert_eq!(size.max, 1500);
    assert_eq!(size.mean, 1000);
    assert_eq!(size.median, 1000);
}

#[test]
fn test_nearest_rank_percentiles() {
    let mut nodes = vec![Node::new_directory(".")];
    for i in 1..=10u64 {
        nodes.push(Node::new_file(format!("f{i}.bin"), i * 10));
    }

    RollupAggregator::new(RollupOptions::default())
        .aggregate(&mut nodes)
        .unwrap();

    let size = rollup_of(&nodes, ".").size.clone().unwrap();
    let p = size.percentiles.unwrap();
    assert_eq!(p.p50, 50);
    assert_eq!(p.p90, 90);
    assert_eq!(p.p99, 100);
    assert_eq!(size.median, p.p50);
}

#[test]
fn test_totals_are_recursive() {
    let mut nodes = vec![
        Node::new_directory("."),
        Node::new_directory("a"),
        Node::new_directory("a/b"),
        Node::new_directory("a/b/c"),
        Node::new_file("top.txt", 10),
        Node::new_file("a/one.rs", 20),
        Node::new_file("a/b/c/two.rs", 30),
    ];

    RollupAggregator::default().aggregate(&mut nodes).unwrap();

    let root = rollup_of(&nodes, ".");
    assert_eq!(root.total_files, 3);
    assert_eq!(root.total_descendant_dirs, 3);
    assert_eq!(root.size.as_ref().unwrap().total, 60);
    assert_eq!(root.extensions.as_ref().unwrap().get("rs"), Some(&2));

    let a = rollup_of(&nodes, "a");
    assert_eq!(a.total_files, 2);
    assert_eq!(a.total_descendant_dirs, 2);

    let c = rollup_of(&nodes, "a/b/c");
    assert_eq!(c.total_files, 1);
    assert_eq!(c.total_descendant_dirs, 0);

    let root_node = nodes.iter().find(|n| n.path == ".").unwrap();
    assert_eq!(root_node.direct_subdir_count, Some(1));
}

#[test]
fn test_last_modified_is_subtree_wide() {
    let mut nodes = vec![
        Node::new_directory(".").with_mtime(100),
        Node::new_directory("a").with_mtime(200),
        Node::new_file("a/new.txt", 1).with_mtime(900),
        Node::new_file("old.txt", 1).with_mtime(300),
    ];

    RollupAggregator::default().aggregate(&mut nodes).unwrap();

    assert_eq!(rollup_of(&nodes, "a").last_modified, 900);
    assert_eq!(rollup_of(&nodes, ".").last_modified, 900);
}

#[test]
fn test_extension_histogram_counts_every_file() {
    let mut nodes = vec![
        Node::new_directory("."),
        Node::new_file("Makefile", 1),
        Node::new_file("a.tar.gz", 1),
        Node::new_file("b.gz", 1),
        Node::new_file(".env", 1),
    ];

    RollupAggregator::default().aggregate(&mut nodes).unwrap();

    let root = rollup_of(&nodes, ".");
    let exts = root.extensions.as_ref().unwrap();
    assert_eq!(exts.get(""), Some(&1));
    assert_eq!(exts.get("gz"), Some(&2));
    assert_eq!(exts.get("env"), Some(&1));
    assert_eq!(root.extension_total(), Some(root.total_files));
}

#[test]
fn test_depth_stats() {
    let mut nodes = vec![
        Node::new_directory("."),
        Node::new_directory("a"),
        Node::new_directory("a/b"),
        Node::new_directory("empty"),
        Node::new_file("a/b/f.txt", 1),
    ];

    RollupAggregator::default().aggregate(&mut nodes).unwrap();

    let root = rollup_of(&nodes, ".").depth.unwrap();
    assert_eq!(root.max_depth, 3);
    assert_eq!(root.leaf_dirs, 2);

    let empty = rollup_of(&nodes, "empty").depth.unwrap();
    assert_eq!(empty.max_depth, 0);
    assert_eq!(empty.leaf_dirs, 1);
}

#[test]
fn test_dir_counts_disabled() {
    let mut nodes = vec![Node::new_directory("."), Node::new_directory("a")];
    let options = RollupOptions::builder().dir_counts(false).build().unwrap();

    RollupAggregator::new(options).aggregate(&mut nodes).unwrap();

    assert_eq!(rollup_of(&nodes, ".").total_descendant_dirs, 0);
}

#[test]
fn test_every_directory_gets_a_rollup() {
    let mut nodes = generated_tree();
    nodes.push(Node::new_directory("lonely/child"));

    RollupAggregator::default().aggregate(&mut nodes).unwrap();

    for node in &nodes {
        assert_eq!(node.rollup.is_some(), node.is_dir, "{}", node.path);
    }
}

#[test]
fn test_generated_tree_invariants() {
    let mut nodes = generated_tree();
    RollupAggregator::default().aggregate(&mut nodes).unwrap();

    for node in nodes.iter().filter(|n| n.is_dir) {
        let rollup = node.rollup.as_ref().unwrap();
        let size = rollup.size.as_ref().unwrap();

        assert!(rollup.total_descendant_dirs >= node.direct_subdir_count.unwrap());
        assert_eq!(size.buckets.unwrap().total(), rollup.total_files);
        assert_eq!(rollup.extension_total(), Some(rollup.total_files));
        assert!(size.sampled <= rollup.total_files);

        if size.sampled > 0 {
            let p = size.percentiles.unwrap();
            assert!(size.min <= size.median && size.median <= size.max);
            assert!(size.min <= p.p50 && p.p50 <= p.p90 && p.p90 <= p.p99 && p.p99 <= size.max);
            assert_eq!(size.median, p.p50);
        }
    }
}

#[test]
fn test_median_bounds_without_percentiles() {
    let mut nodes = generated_tree();
    let options = RollupOptions::builder().percentiles(false).build().unwrap();
    RollupAggregator::new(options).aggregate(&mut nodes).unwrap();

    for node in nodes.iter().filter(|n| n.is_dir) {
        let size = node.rollup.as_ref().unwrap().size.as_ref().unwrap();
        assert!(size.percentiles.is_none());
        if size.sampled > 0 {
            assert!(size.min <= size.median && size.median <= size.max);
        }
    }
}

#[test]
fn test_aggregation_is_deterministic() {
    let aggregator = RollupAggregator::default();

    let mut first = generated_tree();
    let mut second = generated_tree();
    second.reverse();

    aggregator.aggregate(&mut first).unwrap();
    aggregator.aggregate(&mut second).unwrap();

    second.sort_by(|a, b| a.path.cmp(&b.path));
    first.sort_by(|a, b| a.path.cmp(&b.path));

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );

    let mut again = first.clone();
    aggregator.aggregate(&mut again).unwrap();
    assert_eq!(again, first);
}

#[test]
fn test_apply_declares_capabilities() {
    let mut manifest = Manifest::new(
        "/data",
        vec![
            Node::new_directory("."),
            Node::new_file("a.txt", 3).with_mtime(1_700_000_000),
        ],
        Vec::new(),
    );
    let aggregator = RollupAggregator::default();

    let rolled = aggregator.apply(&mut manifest).unwrap();

    assert_eq!(rolled, 1);
    assert_eq!(*manifest.rollup_capabilities(), aggregator.capabilities());

    let mut empty = Manifest::new("/data", Vec::new(), Vec::new());
    aggregator.apply(&mut empty).unwrap();
    assert!(!empty.rollup_capabilities().any());
}

#[test]
fn test_apply_withdraws_activity_span_without_mtimes() {
    let aggregator = RollupAggregator::default();
    let mut manifest = Manifest::new(
        "/data",
        vec![Node::new_directory("."), Node::new_file("a.txt", 10)],
        Vec::new(),
    );

    aggregator.apply(&mut manifest).unwrap();

    let declared = manifest.rollup_capabilities();
    assert!(!declared.activity_span);
    assert!(declared.size_stats);
    assert_eq!(rollup_of(&manifest.nodes, ".").last_modified, 0);
}

#[test]
fn test_apply_keeps_activity_span_for_pre_epoch_mtimes() {
    let aggregator = RollupAggregator::default();
    let mut manifest = Manifest::new(
        "/data",
        vec![
            Node::new_directory("."),
            Node::new_directory("empty"),
            Node::new_file("a.txt", 10).with_mtime(-5),
        ],
        Vec::new(),
    );

    aggregator.apply(&mut manifest).unwrap();

    assert!(manifest.rollup_capabilities().activity_span);
    assert_eq!(rollup_of(&manifest.nodes, ".").last_modified, -5);
}
