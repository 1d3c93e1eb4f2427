use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use rust_decimal::Decimal;
use storefront_events::InMemoryEventBus;
use storefront_infra::OrderPlacementService;
use storefront_infra::inventory::StaticInventory;
use storefront_infra::repository::InMemoryOrderRepository;
use storefront_orders::{InventoryResponse, OrderPlacedEvent, PlaceOrder, PlaceOrderLine, StockVerdict};

fn sku(i: usize) -> String {
    format!("SKU-{i:05}")
}

fn bench_stock_verdict(c: &mut Criterion) {
    let mut group = c.benchmark_group("stock_verdict");

    for size in [1usize, 10, 100] {
        let requested: Vec<String> = (0..size).map(sku).collect();
        let responses: Vec<InventoryResponse> =
            requested.iter().map(|s| InventoryResponse::new(s.clone(), true)).collect();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("all_in_stock", size), &size, |b, _| {
            b.iter(|| StockVerdict::evaluate(black_box(&requested), black_box(&responses)))
        });
    }

    group.finish();
}

fn bench_place_order_in_memory(c: &mut Criterion) {
    let rt = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => panic!("failed to build tokio runtime: {e}"),
    };

    let mut group = c.benchmark_group("place_order_in_memory");

    for lines in [1usize, 10, 50] {
        let mut inventory = StaticInventory::new();
        for i in 0..lines {
            inventory = inventory.with_stock(sku(i), true);
        }
        let service = OrderPlacementService::new(
            InMemoryOrderRepository::new(),
            inventory,
            InMemoryEventBus::<OrderPlacedEvent>::new(),
        );
        let request = PlaceOrder::new(
            (0..lines)
                .map(|i| PlaceOrderLine {
                    sku_code: sku(i),
                    price: Decimal::new(999, 2),
                    quantity: 1,
                })
                .collect(),
        );

        group.throughput(Throughput::Elements(lines as u64));
        group.bench_with_input(BenchmarkId::new("lines", lines), &lines, |b, _| {
            b.iter(|| rt.block_on(service.place_order(black_box(request.clone()))))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_stock_verdict, bench_place_order_in_memory);
criterion_main!(benches);
