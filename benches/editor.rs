//! Performance benchmarks for editing operations.
//!
//! Run with: `cargo bench --bench editor`
//!
//! ## Performance Targets
//!
//! | Operation | Target | Notes |
//! |-----------|--------|-------|
//! | Commit (200 nodes) | <100µs | Full snapshot clone |
//! | Undo/redo cycle | <200µs | Snapshot restore |
//! | Auto-layout (200 nodes) | <100µs | Single pass |
//! | Template load | <50µs | Fresh ids + history reset |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use process_map_kernel::{
    graph_fingerprint, vertical_stack, EditorConfig, HistoryManager, LayoutConfig, NodeType,
    Position, ProcessGraph, ProcessMapEditor, SequentialIdProvider, TemplateLibrary,
};

/// Create a chain of `n` nodes, each connected to the next.
fn make_chain(n: usize) -> ProcessGraph {
    let mut ids = SequentialIdProvider::with_prefix("bench-");
    let mut graph = ProcessGraph::new();
    let mut previous = None;
    for i in 0..n {
        let node_type = match i {
            0 => NodeType::Start,
            i if i + 1 == n => NodeType::End,
            i if i % 5 == 0 => NodeType::Decision,
            _ => NodeType::Process,
        };
        let Ok(node) = graph.add_node(&mut ids, node_type, format!("Step {i}"), Position::new(i as f64, 0.0)) else {
            continue;
        };
        if let Some(prev) = previous.replace(node.id.clone()) {
            let _ = graph.connect(&mut ids, &prev, &node.id);
        }
    }
    graph
}

/// Benchmark history commits at several graph sizes.
fn bench_commit(c: &mut Criterion) {
    let mut group = c.benchmark_group("history_commit");

    for size in [10usize, 50, 200] {
        let graph = make_chain(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &graph, |b, graph| {
            let mut history = HistoryManager::new(&ProcessGraph::new());
            b.iter(|| history.commit(black_box(graph)));
        });
    }

    group.finish();
}

/// Benchmark a full undo/redo round trip through an editor.
fn bench_undo_redo(c: &mut Criterion) {
    let mut group = c.benchmark_group("undo_redo");

    for size in [10usize, 50, 200] {
        let mut editor = ProcessMapEditor::with_ids(EditorConfig::default(), SequentialIdProvider::new());
        editor.replace_graph(make_chain(size));
        editor.add_node(NodeType::End, "Extra", Position::default());

        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            b.iter(|| {
                black_box(editor.undo());
                black_box(editor.redo());
            });
        });
    }

    group.finish();
}

/// Benchmark the vertical-stack layout.
fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("auto_layout");
    let config = LayoutConfig::default();

    for size in [10usize, 50, 200] {
        let graph = make_chain(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &graph, |b, graph| {
            b.iter(|| vertical_stack(black_box(graph.nodes()), &config));
        });
    }

    group.finish();
}

/// Benchmark template loading and fingerprinting.
fn bench_template(c: &mut Criterion) {
    let library = TemplateLibrary::builtin();
    let mut editor = ProcessMapEditor::with_ids(EditorConfig::default(), SequentialIdProvider::new());

    c.bench_function("load_template", |b| {
        b.iter(|| editor.load_template_named(&library, black_box("incident-review")))
    });

    let graph = make_chain(200);
    c.bench_function("graph_fingerprint_200", |b| {
        b.iter(|| graph_fingerprint(black_box(&graph)))
    });
}

criterion_group!(benches, bench_commit, bench_undo_redo, bench_layout, bench_template);
criterion_main!(benches);
