use criterion::{criterion_group, criterion_main, Criterion};
use simexport::archive::{bundle_blocking, ArchiveEntry};
use simexport::rendering::paginate::{paginate, plan_pages};
use simexport::{PageLayout, PdfRenderer, RasterSnapshot, Trajectory, TrajectoryPoint};
use simexport::{TrajectorySerializer, TsvTrajectorySerializer};

// Run with:
//    cargo bench --bench export_bench

fn trajectory(days: usize) -> Trajectory {
    Trajectory {
        columns: (0..12).map(|i| format!("compartment_{}", i)).collect(),
        points: (0..days)
            .map(|d| TrajectoryPoint {
                time: d as f64,
                values: (0..12).map(|i| (d * 31 + i) as f64 * 0.5).collect(),
            })
            .collect(),
    }
}

fn bench_plan_pages(c: &mut Criterion) {
    let layout = PageLayout::default();
    c.bench_function("plan_pages_tall", |b| {
        b.iter(|| plan_pages(1280, 40_000, &layout).unwrap())
    });
}

fn bench_render_pdf(c: &mut Criterion) {
    let snapshot = RasterSnapshot::filled(640, 2400, [250, 250, 250]);
    let document = paginate(&snapshot, &PageLayout::default()).unwrap();
    let renderer = PdfRenderer::default();
    c.bench_function("render_pdf_640x2400", |b| {
        b.iter(|| renderer.render(&document).unwrap())
    });
}

fn bench_bundle(c: &mut Criterion) {
    let tsv = TsvTrajectorySerializer.serialize(&trajectory(365)).unwrap();
    let entries = vec![
        ArchiveEntry::new("covid.params.json", "{\n  \"r0\": 2.7\n}"),
        ArchiveEntry::new("covid.results.deterministic.tsv", tsv),
    ];
    c.bench_function("bundle_one_year", |b| {
        b.iter(|| bundle_blocking(&entries).unwrap())
    });
}

criterion_group!(benches, bench_plan_pages, bench_render_pdf, bench_bundle);
criterion_main!(benches);
