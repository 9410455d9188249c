use memgraph_builder::prelude::*;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn read_line(line: u64, timestamp: u64) -> MemoryAccess {
    MemoryAccess::read(line << 6, 8, timestamp)
}

#[test]
fn built_graph_upholds_edge_invariants() {
    let mut rng = StdRng::seed_from_u64(42);
    let trace: Vec<_> = (0..5_000)
        .map(|i| read_line(rng.gen_range(0..200), i))
        .collect();

    let graph = GraphBuilder::new(GraphConfig {
        granularity: Granularity::CacheLine,
        window: WindowKind::Sliding,
        window_size: 8,
        min_edge_weight: 2,
    })
    .unwrap()
    .accesses(trace)
    .build();

    let nodes: std::collections::HashSet<_> = graph.nodes().collect();
    for (u, v, w) in graph.edge_list() {
        assert_ne!(u, v, "self-loop on {u}");
        assert!(nodes.contains(&u) && nodes.contains(&v));
        assert!(w >= 2, "edge ({u}, {v}) survived the weight filter at {w}");
        assert_eq!(graph.weight(u, v), graph.weight(v, u));
    }
}

#[test]
fn same_trace_builds_identical_graphs() {
    let mut rng = StdRng::seed_from_u64(7);
    let trace: Vec<_> = (0..2_000)
        .map(|i| read_line(rng.gen_range(0..64), i))
        .collect();

    let config = GraphConfig {
        window: WindowKind::Adaptive,
        window_size: 16,
        ..GraphConfig::default()
    };
    let first = GraphBuilder::new(config)
        .unwrap()
        .accesses(trace.clone())
        .build();
    let second = GraphBuilder::new(config).unwrap().accesses(trace).build();

    assert_eq!(first.edge_list(), second.edge_list());
    assert_eq!(
        first.nodes().collect::<Vec<_>>(),
        second.nodes().collect::<Vec<_>>()
    );
}

#[test]
fn page_granularity_merges_lines() {
    // Two cache lines in the same page plus one in the next page.
    let trace = vec![
        MemoryAccess::read(0x1000, 8, 0),
        MemoryAccess::read(0x1040, 8, 1),
        MemoryAccess::read(0x2000, 8, 2),
    ];

    let graph = GraphBuilder::new(GraphConfig {
        granularity: Granularity::Page,
        window: WindowKind::Sliding,
        window_size: 2,
        min_edge_weight: 1,
    })
    .unwrap()
    .accesses(trace)
    .build();

    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.edge_list(), vec![(0x1, 0x2, 1)]);
}

#[test]
fn text_trace_feeds_the_builder() {
    let input = b"# synthetic\nR,0x1000,8,1\nW,0x1040,8,2\nR,0x1080,8,3\n";
    let accesses = TextTraceReader::read(&input[..]).unwrap();

    let mut builder = GraphBuilder::new(GraphConfig {
        window_size: 2,
        ..GraphConfig::default()
    })
    .unwrap();
    for access in accesses {
        builder.push(access);
    }

    let stats = builder.trace_stats();
    assert_eq!(stats.total_accesses, 3);
    assert_eq!(stats.unique_addresses, 3);

    let graph = builder.build();
    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.edge_list(), vec![(0x40, 0x41, 1), (0x41, 0x42, 1)]);
}

#[test]
fn non_monotonic_timestamps_follow_stream_order() {
    // Timestamps run backwards; ordering still follows the stream, so the
    // sliding pairs are exactly the stream-adjacent ones.
    let trace = vec![
        read_line(1, 30),
        read_line(2, 20),
        read_line(3, 10),
    ];

    let builder = GraphBuilder::new(GraphConfig {
        window_size: 2,
        ..GraphConfig::default()
    })
    .unwrap()
    .accesses(trace);

    let stats = builder.trace_stats();
    assert_eq!((stats.min_timestamp, stats.max_timestamp), (10, 30));

    let graph = builder.build();
    assert_eq!(
        graph.edge_list(),
        vec![(1, 2, 1), (2, 3, 1)]
    );
}
