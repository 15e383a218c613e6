use bom::calc::row::MaterialRow;
use bom::calc::{aggregate_materials, sort_materials, SortConfig};
use bom::Unit;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// 產生 `materials` 個物料，每個 3 個名稱 × 4 個產品
fn join_rows(materials: i64) -> Vec<MaterialRow> {
    let units = [Unit::new(1, "kg"), Unit::new(2, "pcs"), Unit::new(3, "m")];
    let mut rows = Vec::new();
    for id in 0..materials {
        let unit = &units[(id % 3) as usize];
        for name in 0..3 {
            for product in 0..4 {
                let mut row = MaterialRow::new(id, unit)
                    .with_name(format!("Material {}-{}", id, name), name == 0)
                    .with_product(product, format!("Product {}", product));
                row = if id % 5 == 0 {
                    row.with_quantity_text("as needed")
                } else {
                    row.with_quantity((id % 97) as f64 * 0.25)
                };
                rows.push(row);
            }
        }
    }
    rows
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate_materials");
    for size in [100_i64, 1_000, 5_000] {
        let rows = join_rows(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &rows, |b, rows| {
            b.iter(|| aggregate_materials(black_box(rows)))
        });
    }
    group.finish();
}

fn bench_sort(c: &mut Criterion) {
    let materials = aggregate_materials(&join_rows(5_000)).unwrap_or_default();
    for raw in ["name", "-quantity"] {
        let config = SortConfig::parse(raw);
        c.bench_function(&format!("sort_materials {}", raw), |b| {
            b.iter_batched(
                || materials.clone(),
                |mut items| sort_materials(black_box(&mut items), config),
                criterion::BatchSize::LargeInput,
            )
        });
    }
}

criterion_group!(benches, bench_aggregate, bench_sort);
criterion_main!(benches);
