use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use lsp_types::{Position, Uri};
use std::hint::black_box;
use std::str::FromStr;
use texenv_language_server::document::{Document, DocumentKind};
use texenv_language_server::providers::rename::{compute_rename, find_pair};

/// `depth` nested environments, each holding a few flat siblings.
fn nested_document(depth: usize) -> String {
    let mut text = String::new();
    for level in 0..depth {
        text.push_str(&format!("\\begin{{level{level}}}\n"));
        for sibling in 0..4 {
            text.push_str(&format!(
                "  \\begin{{item{sibling}}} text % \\end{{ignored}}\n  \\end{{item{sibling}}}\n"
            ));
        }
    }
    for level in (0..depth).rev() {
        text.push_str(&format!("\\end{{level{level}}}\n"));
    }
    text
}

fn benchmark_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan_markers");
    for depth in [10, 100, 1000] {
        let text = nested_document(depth);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &text, |b, text| {
            b.iter(|| Document::new(black_box(text), 0, DocumentKind::Latex))
        });
    }
    group.finish();
}

fn benchmark_outermost_pair(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_pair_outermost");
    for depth in [10, 100, 1000] {
        let document = Document::new(&nested_document(depth), 0, DocumentKind::Latex);
        let last = document.markers.len() - 1;

        group.bench_with_input(BenchmarkId::new("forward", depth), &document, |b, doc| {
            b.iter(|| find_pair(black_box(&doc.markers), 0))
        });
        group.bench_with_input(BenchmarkId::new("backward", depth), &document, |b, doc| {
            b.iter(|| find_pair(black_box(&doc.markers), last))
        });
    }
    group.finish();
}

fn benchmark_compute_rename(c: &mut Criterion) {
    let uri = Uri::from_str("file:///bench.tex").expect("valid uri");
    let document = Document::new(&nested_document(500), 0, DocumentKind::Latex);

    c.bench_function("compute_rename_outermost", |b| {
        b.iter(|| {
            compute_rename(
                black_box(&uri),
                black_box(&document),
                Position::new(0, 8),
                "renamed",
            )
        })
    });
}

criterion_group!(
    benches,
    benchmark_scan,
    benchmark_outermost_pair,
    benchmark_compute_rename
);
criterion_main!(benches);
