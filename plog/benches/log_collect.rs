use criterion::{Criterion, criterion_group, criterion_main};
use plog::layout::{CHANNEL_RECORD_OFFSET, LOG_BUFFER_LEN};
use plog::{ChannelRecord, MappedRegion, MemoryRegion};
use std::hint::black_box;
use std::sync::Arc;

fn seeded_engine() -> plog::capture::CaptureEngine {
    let region: Arc<dyn MemoryRegion> =
        Arc::new(MappedRegion::anon(CHANNEL_RECORD_OFFSET + 8 + LOG_BUFFER_LEN).unwrap());
    ChannelRecord {
        buffer_offset: (CHANNEL_RECORD_OFFSET + 8) as u32,
        buffer_length: LOG_BUFFER_LEN as u32,
    }
    .store(&*region)
    .unwrap();
    plog::capture::CaptureEngine::new(region)
}

fn bench_collect(c: &mut Criterion) {
    let mut group = c.benchmark_group("collect");

    let mut local = seeded_engine();
    group.bench_function("local_ring", |b| {
        b.iter(|| local.collect(black_box("benchmark message of typical length\r\n")))
    });

    let mut shared = seeded_engine();
    shared.switch_to_shared().unwrap();
    group.bench_function("shared_ring", |b| {
        b.iter(|| shared.collect(black_box("benchmark message of typical length\r\n")))
    });

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let long = "z".repeat(400);
    c.bench_function("entry_new_long", |b| {
        b.iter(|| plog::LogEntry::new(black_box(&long)))
    });
}

criterion_group!(benches, bench_collect, bench_render);
criterion_main!(benches);
