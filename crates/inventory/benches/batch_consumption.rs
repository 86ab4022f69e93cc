use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chrono::{Duration, NaiveDate, NaiveDateTime, Utc};
use almox_inventory::stock_state::{expiring, low_stock};
use almox_inventory::{Batch, Item, NewItem, consume_batches};

fn batches(count: usize) -> Vec<Batch> {
    let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    (0..count)
        .map(|i| {
            // Every fifth lot has no expiry; the rest are shuffled across the year.
            let validade = (i % 5 != 0).then(|| base + Duration::days(((i * 37) % 365) as i64));
            Batch::new(10.0, validade)
        })
        .collect()
}

fn catalog(count: usize) -> Vec<Item> {
    (0..count)
        .map(|i| {
            let mut item = Item::create(
                NewItem {
                    nome: format!("Item {i}"),
                    ..NewItem::default()
                },
                Utc::now(),
            )
            .unwrap();
            for lot in batches(4 + i % 4) {
                item.receive(lot.quantidade + i as f64, lot.validade, Utc::now()).unwrap();
            }
            item
        })
        .collect()
}

fn bench_consume_batches(c: &mut Criterion) {
    let mut group = c.benchmark_group("consume_batches");

    for &count in &[4usize, 32, 256] {
        let lots = batches(count);
        // Drain roughly half of the stock so the walk crosses many lots.
        let requested = (count as f64) * 5.0;
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &lots, |b, lots| {
            b.iter(|| consume_batches(black_box(lots), black_box(requested)).unwrap());
        });
    }

    group.finish();
}

fn bench_derived_state(c: &mut Criterion) {
    let mut group = c.benchmark_group("derived_state");
    let now: NaiveDateTime = NaiveDate::from_ymd_opt(2024, 6, 1)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap();

    for &count in &[100usize, 1_000, 5_000] {
        let items = catalog(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("low_stock", count), &items, |b, items| {
            b.iter(|| low_stock(black_box(items), 20.0).len());
        });
        group.bench_with_input(BenchmarkId::new("expiring", count), &items, |b, items| {
            b.iter(|| expiring(black_box(items), now, 30).len());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_consume_batches, bench_derived_state);
criterion_main!(benches);
