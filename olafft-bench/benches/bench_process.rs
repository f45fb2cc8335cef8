use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use olafft::{OverlappingFft, Passthrough};

const SAMPLES: usize = 48_000;

fn signal(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 48_000.0).sin())
        .collect()
}

/// One second of stereo audio through an identity framer, per block size.
fn bench_block_sizes(c: &mut Criterion) {
    let input = [signal(SAMPLES), signal(SAMPLES)];
    let mut g = c.benchmark_group("process_block_size");
    g.throughput(Throughput::Elements(SAMPLES as u64));
    for &block in &[32usize, 128, 512, 2048] {
        let mut framer = OverlappingFft::new(11, 2, Passthrough).unwrap();
        framer.prepare(48_000.0, block, 2, 2).unwrap();
        let mut out = [vec![0.0f32; block], vec![0.0f32; block]];
        g.bench_with_input(BenchmarkId::from_parameter(block), &block, |b, &block| {
            b.iter(|| {
                for start in (0..SAMPLES).step_by(block) {
                    let len = block.min(SAMPLES - start);
                    let ins = [&input[0][start..start + len], &input[1][start..start + len]];
                    let (l, r) = out.split_at_mut(1);
                    framer.process(&ins, &mut [&mut l[0][..len], &mut r[0][..len]]);
                }
            });
        });
    }
    g.finish();
}

/// Cost of overlap: same block size, hop dividers 1 to 4.
fn bench_overlap(c: &mut Criterion) {
    let input = signal(SAMPLES);
    let mut g = c.benchmark_group("process_overlap");
    g.throughput(Throughput::Elements(SAMPLES as u64));
    for &hop_divider in &[1u32, 2, 3, 4] {
        let mut framer = OverlappingFft::new(10, hop_divider, Passthrough).unwrap();
        framer.prepare(48_000.0, 512, 1, 1).unwrap();
        let mut out = vec![0.0f32; 512];
        g.bench_with_input(
            BenchmarkId::from_parameter(hop_divider),
            &hop_divider,
            |b, _| {
                b.iter(|| {
                    for block in input.chunks(512) {
                        framer.process(&[block], &mut [&mut out[..block.len()]]);
                    }
                });
            },
        );
    }
    g.finish();
}

criterion_group!(benches, bench_block_sizes, bench_overlap);
criterion_main!(benches);
