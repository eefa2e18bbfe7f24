//! Benchmarks for rope operations matching real editor usage patterns
//!
//! - Single keystroke edits (fast path) and bulk edits (rebuild path)
//! - Slicing visible content and line lookup
//! - Chunk iteration and cross-shape equality
//! - Snapshot publishing with concurrent readers

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use std::thread;
use tiny_text::{Direction, Doc, Edit, Text};

/// Generate a realistic document with mixed content
fn generate_document(lines: usize) -> String {
    let mut doc = String::new();
    for i in 0..lines {
        match i % 5 {
            0 => doc.push_str(&format!("fn function_{}() {{\n", i)),
            1 => doc.push_str(&format!(
                "    let variable_{} = \"string literal with some text\";\n",
                i
            )),
            2 => doc.push_str(&format!("    // Comment explaining line {}\n", i)),
            3 => doc.push_str(&format!("    process_data({}, {}, {});\n", i, i * 2, i * 3)),
            _ => doc.push_str("}\n"),
        }
    }
    doc
}

/// Single character insertion (most common edit)
fn bench_single_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_insert");

    for size in [100, 1000, 10000, 100000].iter() {
        let text = Text::of(&generate_document(*size));
        let mid = text.len() / 2;

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| std::hint::black_box(text.replace(mid, mid, "x")));
        });
    }
    group.finish();
}

/// Typing a burst of characters, each edit applied to the previous value
fn bench_typing_burst(c: &mut Criterion) {
    let mut group = c.benchmark_group("typing_burst");

    for size in [1000, 10000, 100000].iter() {
        let text = Text::of(&generate_document(*size));
        let start = text.len() / 2;

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let mut current = text.clone();
                for i in 0..100 {
                    current = current.replace(start + i, start + i, "a");
                }
                std::hint::black_box(current)
            });
        });
    }
    group.finish();
}

/// Large paste and large deletion, both forcing a rebuild
fn bench_bulk_edits(c: &mut Criterion) {
    let mut group = c.benchmark_group("bulk_edits");
    let paste = generate_document(200);

    for size in [1000, 10000, 100000].iter() {
        let text = Text::of(&generate_document(*size));
        let mid = text.len() / 2;

        group.bench_with_input(BenchmarkId::new("paste", size), size, |b, _| {
            b.iter(|| std::hint::black_box(text.replace(mid, mid, &paste)));
        });

        group.bench_with_input(BenchmarkId::new("delete_quarter", size), size, |b, _| {
            let end = mid + text.len() / 4;
            b.iter(|| std::hint::black_box(text.replace(mid, end, "")));
        });
    }
    group.finish();
}

/// Viewport slicing and line lookup
fn bench_navigation(c: &mut Criterion) {
    let mut group = c.benchmark_group("navigation");

    for size in [1000, 10000, 100000].iter() {
        let text = Text::of(&generate_document(*size));
        let positions: Vec<usize> = (0..100).map(|i| (text.len() * i) / 100).collect();

        // Extract visible viewport (typically ~50 lines)
        group.bench_with_input(BenchmarkId::new("viewport_slice", size), size, |b, _| {
            let viewport_size = 2000;
            b.iter(|| {
                for &pos in &positions {
                    let end = (pos + viewport_size).min(text.len());
                    std::hint::black_box(text.slice(pos, end));
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("line_at", size), size, |b, _| {
            b.iter(|| {
                for &pos in &positions {
                    std::hint::black_box(text.line_at(pos));
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("line", size), size, |b, _| {
            let lines: Vec<usize> = (0..100).map(|i| (text.lines() * i) / 100).collect();
            b.iter(|| {
                for &line in &lines {
                    std::hint::black_box(text.line(line));
                }
            });
        });
    }
    group.finish();
}

/// Chunk iteration and equality between differently built trees
fn bench_traversal(c: &mut Criterion) {
    let mut group = c.benchmark_group("traversal");

    for size in [1000, 10000, 100000].iter() {
        let content = generate_document(*size);
        let text = Text::of(&content);
        let mid = text.len() / 2;
        let reshaped = text.replace(mid, mid, "x").replace(mid, mid + 1, "");

        group.bench_with_input(BenchmarkId::new("forward_chunks", size), size, |b, _| {
            b.iter(|| std::hint::black_box(text.chunks().map(str::len).sum::<usize>()));
        });

        group.bench_with_input(BenchmarkId::new("backward_chunks", size), size, |b, _| {
            b.iter(|| {
                std::hint::black_box(text.iter(Direction::Backward).map(str::len).sum::<usize>())
            });
        });

        group.bench_with_input(BenchmarkId::new("eq_reshaped", size), size, |b, _| {
            b.iter(|| std::hint::black_box(text == reshaped));
        });

        group.bench_with_input(BenchmarkId::new("to_string", size), size, |b, _| {
            b.iter(|| std::hint::black_box(text.to_string()));
        });

        group.bench_with_input(BenchmarkId::new("construction", size), size, |b, _| {
            b.iter(|| std::hint::black_box(Text::of(&content)));
        });
    }
    group.finish();
}

/// RCU reader/writer concurrency
fn bench_rcu_concurrency(c: &mut Criterion) {
    let mut group = c.benchmark_group("rcu_concurrency");

    let text = Text::of(&generate_document(10000));

    group.bench_function("concurrent_reads_during_writes", |b| {
        b.iter(|| {
            let doc = Arc::new(Doc::with_text(text.clone()));
            let doc_clone = Arc::clone(&doc);

            let reader = thread::spawn(move || {
                let mut sum = 0usize;
                for _ in 0..1000 {
                    sum += doc_clone.read().len();
                }
                sum
            });

            for i in 0..100 {
                doc.edit(Edit::Insert {
                    pos: i,
                    text: "x".to_string(),
                });
                if i % 10 == 0 {
                    doc.flush();
                }
            }
            doc.flush();

            std::hint::black_box(reader.join().unwrap_or_default());
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_single_insert,
    bench_typing_burst,
    bench_bulk_edits,
    bench_navigation,
    bench_traversal,
    bench_rcu_concurrency
);
criterion_main!(benches);
