use jfif_rs::constants::{BLOCK_DIM, INVERSE_ZIGZAG};
use jfif_rs::jfif::{IdctVariant, InverseTransform};
use std::time::{Duration, Instant};

// Quantised amplitudes in zig-zag order, as they leave the entropy decoder.
const AMPLITUDES: [(usize, i32); 8] = [
    (0, -26),
    (1, -3),
    (2, -6),
    (3, 2),
    (4, -4),
    (5, 1),
    (9, 1),
    (14, -1),
];

// Annex K luminance table.
const LUMA_QUANT: [u16; BLOCK_DIM] = [
    16, 11, 12, 14, 12, 10, 16, 14, 13, 14, 18, 17, 16, 19, 24, 40, 26, 24, 22, 22, 24, 49, 35,
    37, 29, 40, 58, 51, 61, 60, 57, 51, 56, 55, 64, 72, 92, 78, 64, 68, 87, 69, 55, 56, 80, 109,
    81, 87, 95, 98, 103, 104, 103, 62, 77, 113, 121, 112, 100, 120, 92, 101, 103, 99,
];

fn dequantised_block(transform: &dyn InverseTransform) -> [i32; BLOCK_DIM] {
    let quant = transform.quant_table(&LUMA_QUANT);
    let mut block = [0; BLOCK_DIM];
    for &(k, amplitude) in &AMPLITUDES {
        block[INVERSE_ZIGZAG[k]] = quant.dequantize(amplitude, k);
    }
    block
}

fn bench(variant: IdctVariant, iterations: usize) -> (Duration, [i32; BLOCK_DIM]) {
    let transform = variant.transform();
    let input = dequantised_block(transform.as_ref());
    let mut output = input;

    let start = Instant::now();
    for _ in 0..iterations {
        output.copy_from_slice(std::hint::black_box(&input));
        transform.transform(&mut output);
        std::hint::black_box(&output);
    }
    let duration = start.elapsed();
    println!(
        "{} IDCT: {:?} for {} iterations",
        transform.name(),
        duration,
        iterations
    );
    (duration, output)
}

fn main() {
    println!("Benchmarking IDCT implementations...");

    let iterations = 1_000_000;
    let (reference_time, reference) = bench(IdctVariant::Reference, iterations);
    let (fast_time, fast) = bench(IdctVariant::Fast, iterations);

    let speedup = reference_time.as_secs_f64() / fast_time.as_secs_f64();
    println!("Speedup: {:.2}x", speedup);

    let max_diff = reference
        .iter()
        .zip(fast.iter())
        .map(|(r, f)| (r - f).abs())
        .max()
        .unwrap_or(0);
    println!(
        "Max sample difference between reference and fast on this block: {}",
        max_diff
    );
    // The fast path truncates its prescaled quantisers, so the gap grows with
    // the table values; decoded photographs at quality 90 differ by up to ~10.
    println!("Note: fast IDCT error is not bounded by this figure on real images");
}
