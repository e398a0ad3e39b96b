use std::sync::Arc;

use criterion::{
    criterion_group, criterion_main, AxisScale, BenchmarkId, Criterion, PlotConfiguration,
    Throughput,
};
use slabio::{
    array::{ElementType, FlatArray, ReadOptions, ReadStrategy},
    region::Region,
    storage::{store::MemoryStore, Bytes, StoreKey, WritableStorageTraits},
};

fn read_region(c: &mut Criterion) {
    let plot_config = PlotConfiguration::default().summary_scale(AxisScale::Logarithmic);
    let mut group = c.benchmark_group("read_region");
    group.plot_config(plot_config);

    for size in [32u64, 64, 128] {
        let store = Arc::new(MemoryStore::new());
        let key = StoreKey::new("volume.bin").unwrap();
        let num_elements = usize::try_from(size * size * size).unwrap();
        store.set(&key, Bytes::from(vec![0u8; num_elements * 2])).unwrap();
        let array = FlatArray::new(store, key, vec![size; 3], ElementType::UInt16);

        // an interior cube of half the edge length
        let region = Region::new_with_ranges(&vec![size / 4..size * 3 / 4; 3]);
        let options = ReadOptions::default();
        group.throughput(Throughput::Bytes(region.num_elements() * 2));
        for strategy in [
            ReadStrategy::Serial,
            ReadStrategy::Parallel,
            ReadStrategy::BoundingBox,
        ] {
            group.bench_function(BenchmarkId::new(strategy.to_string(), size), |b| {
                b.iter(|| {
                    array
                        .read_region_with_strategy(&region, strategy, &options)
                        .unwrap()
                });
            });
        }
    }
    group.finish();
}

criterion_group!(benches, read_region);
criterion_main!(benches);
