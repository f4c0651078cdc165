//! Performance benchmarks for FastDistLaw
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fast_distlaw::core::{
    log_bins, log_bins_for_segments, ContactAccumulator, DistanceLawOptions, FragmentTable,
    PairClassifier, ReadPair, Segments, Strand,
};
use fast_distlaw::{slope_distance_law, DistanceLawCurve, DistanceLawDriver};

const FRAGMENT_SIZE: u64 = 4_000;
const FRAGMENTS_PER_CHROM: u64 = 5_000;

/// Synthetic genome of 4 chromosomes of 20 Mb
fn genome() -> FragmentTable {
    let rows: Vec<(String, u64, u64)> = (0..4)
        .flat_map(|c| {
            (0..FRAGMENTS_PER_CHROM).map(move |i| {
                (format!("chr{}", c + 1), i * FRAGMENT_SIZE, (i + 1) * FRAGMENT_SIZE)
            })
        })
        .collect();
    FragmentTable::from_rows(rows)
}

/// Deterministic pairs text, mostly intra-chromosomal
fn pairs_text(n: usize) -> String {
    let total = 4 * FRAGMENTS_PER_CHROM as usize;
    let mut text = String::from("## pairs format v1.0\n");
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    for i in 0..n {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let frag1 = (state % total as u64) as usize;
        let offset = ((state >> 20) % 2_000) as usize;
        let frag2 = (frag1 + offset).min(total - 1);
        let strand = if state & 1 == 0 { '+' } else { '-' };
        text.push_str(&format!(
            "r{}\tchr1\t0\tchr1\t0\t{}\t{}\t{}\t{}\n",
            i, strand, strand, frag1, frag2
        ));
    }
    text
}

/// Benchmark log bin construction
fn bench_log_bins(c: &mut Criterion) {
    let mut group = c.benchmark_group("log_bins");
    for length in [1_000_000u64, 50_000_000, 250_000_000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(length), length, |b, &length| {
            b.iter(|| black_box(log_bins(black_box(length), 1.1, false)))
        });
    }
    group.finish();
}

/// Benchmark classification of parsed pairs
fn bench_classify(c: &mut Criterion) {
    let table = genome();
    let segments = Segments::build(&table, None, false).unwrap();
    let bins = log_bins_for_segments(segments.lengths(), 1.1, false);
    let classifier = PairClassifier::new(&table, &segments, &bins, false);

    let pairs: Vec<ReadPair<'static>> = (0..10_000usize)
        .map(|i| ReadPair {
            read_id: "r",
            chrom1: "chr1",
            pos1: 0,
            chrom2: "chr1",
            pos2: 0,
            strand1: Strand::Plus,
            strand2: Strand::Plus,
            frag1: i % 20_000,
            frag2: (i * 7) % 20_000,
        })
        .collect();

    let mut group = c.benchmark_group("classify");
    group.throughput(Throughput::Elements(pairs.len() as u64));
    group.bench_function("classify_10k", |b| {
        b.iter(|| {
            let mut acc = ContactAccumulator::zeroed(&bins);
            for (i, pair) in pairs.iter().enumerate() {
                let _ = black_box(classifier.classify(pair, i + 1, &mut acc));
            }
            black_box(acc)
        })
    });
    group.finish();
}

/// Benchmark parsing and counting a pairs stream, sequential vs parallel
fn bench_count_pairs(c: &mut Criterion) {
    let text = pairs_text(200_000);
    let mut group = c.benchmark_group("count_pairs");
    group.throughput(Throughput::Elements(200_000));
    group.sample_size(10);

    for threads in [1usize, 4].iter() {
        let driver = DistanceLawDriver::new(
            genome(),
            None,
            DistanceLawOptions {
                threads: *threads,
                ..Default::default()
            },
        )
        .unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(threads), threads, |b, _| {
            b.iter(|| black_box(driver.count_pairs(text.as_bytes()).unwrap()))
        });
    }
    group.finish();
}

/// Benchmark slope smoothing of a genome-scale curve
fn bench_slope(c: &mut Criterion) {
    let bins = log_bins(250_000_000, 1.1, false);
    let probabilities = bins.iter().map(|&x| (x as f64).powf(-1.1)).collect();
    let curve = DistanceLawCurve::new("chr1", bins, probabilities);

    c.bench_function("slope_sigma_2", |b| {
        b.iter(|| black_box(slope_distance_law(black_box(&curve), 2.0).unwrap()))
    });
}

criterion_group!(
    benches,
    bench_log_bins,
    bench_classify,
    bench_count_pairs,
    bench_slope,
);
criterion_main!(benches);
