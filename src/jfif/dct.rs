//! Inverse Discrete Cosine Transform for 8x8 blocks.
//!
//! Two interchangeable strategies:
//! - `FastIdct`: AAN integer butterfly, quant tables carry the AAN prescale.
//! - `ReferenceIdct`: separable product with the cosine basis matrix in `f64`.
//!
//! Both take dequantised coefficients in natural order and leave level-shifted,
//! clipped samples (0..=255) in the same block.

use crate::constants::{
    BLOCK_DIM, BLOCK_SIZE, CONST_BITS, COS_BASIS, FINAL_SCALE_BITS, FIX_1_082392200,
    FIX_1_414213562, FIX_1_847759065, FIX_NEG_2_613125930,
};
use crate::jfif::color::{ColorMath, clip};
use crate::jfif::quantization::QuantTable;

/// Capability the decoder needs from an inverse transform.
pub trait InverseTransform {
    fn name(&self) -> &'static str;

    /// Builds the dequantisation table this transform expects from raw DQT entries.
    fn quant_table(&self, raw: &[u16; BLOCK_DIM]) -> QuantTable;

    fn transform(&self, block: &mut [i32; BLOCK_DIM]);

    /// Colour arithmetic paired with this transform.
    fn color_math(&self) -> ColorMath;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdctVariant {
    #[cfg_attr(not(feature = "reference-idct"), default)]
    Fast,
    #[cfg_attr(feature = "reference-idct", default)]
    Reference,
}

impl IdctVariant {
    pub fn transform(self) -> Box<dyn InverseTransform> {
        match self {
            IdctVariant::Fast => Box::new(FastIdct),
            IdctVariant::Reference => Box::new(ReferenceIdct::new()),
        }
    }
}

#[inline(always)]
fn multiply(a: i32, b: i32) -> i32 {
    ((a as i64 * b as i64) >> CONST_BITS) as i32
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FastIdct;

impl FastIdct {
    // One 1-D pass over eight values `stride` apart.
    #[inline(always)]
    fn pass(block: &mut [i32; BLOCK_DIM], start: usize, stride: usize) {
        let d = |i: usize| block[start + i * stride];

        // Even and odd part inputs.
        let p0 = d(0) + d(4);
        let p1 = d(0) - d(4);
        let p2 = d(2) + d(6);
        let p3 = d(2) - d(6);
        let p4 = d(5) + d(3);
        let p5 = d(5) - d(3);
        let p6 = d(1) + d(7);
        let p7 = d(1) - d(7);

        let q3 = multiply(p3, FIX_1_414213562);
        let q4 = p6 + p4;
        let q5 = p6 - p4;
        let q6 = p5 + p7;
        let t11m13 = p1 - p2;
        let t11p13 = p1 + p2;

        let r0 = p0 + p2;
        let r1 = t11m13 + q3;
        let r2 = t11p13 - q3;
        let r3 = p0 - p2;
        let r4 = multiply(q5, FIX_1_414213562);
        let r5 = multiply(q6, FIX_1_847759065);
        let r6 = multiply(p7, FIX_1_082392200);
        let r7 = multiply(p5, FIX_NEG_2_613125930);

        let s6 = r6 - r5;
        let s7 = r7 + r5;
        let t11p7 = r4 + q4;

        let u6 = s7 - q4;
        let u5 = t11p7 - s7;
        let u4 = s6 + u5;

        let out = [
            r0 + q4,
            r1 + u6,
            r2 + u5,
            r3 - u4,
            r3 + u4,
            r2 - u5,
            r1 - u6,
            r0 - q4,
        ];
        for (i, v) in out.into_iter().enumerate() {
            block[start + i * stride] = v;
        }
    }
}

impl InverseTransform for FastIdct {
    fn name(&self) -> &'static str {
        "fast"
    }

    fn quant_table(&self, raw: &[u16; BLOCK_DIM]) -> QuantTable {
        QuantTable::aan_prescaled(raw)
    }

    fn transform(&self, block: &mut [i32; BLOCK_DIM]) {
        for row in 0..BLOCK_SIZE {
            Self::pass(block, row * BLOCK_SIZE, 1);
        }
        for col in 0..BLOCK_SIZE {
            Self::pass(block, col, BLOCK_SIZE);
        }
        for v in block.iter_mut() {
            *v = clip(128 + (*v >> FINAL_SCALE_BITS)) as i32;
        }
    }

    fn color_math(&self) -> ColorMath {
        ColorMath::FixedPoint
    }
}

// Index into COS_BASIS for each (frequency, position) entry; negative means negated.
const BASIS_INDEX: [[i8; BLOCK_SIZE]; BLOCK_SIZE] = [
    [0, 0, 0, 0, 0, 0, 0, 0],
    [1, 3, 5, 7, -7, -5, -3, -1],
    [2, 6, -6, -2, -2, -6, 6, 2],
    [3, -7, -1, -5, 5, 1, 7, -3],
    [4, -4, -4, 4, 4, -4, -4, 4],
    [5, -1, 7, 3, -3, -7, 1, -5],
    [6, -2, 2, -6, -6, 2, -2, 6],
    [7, -5, 3, -1, 1, -3, 5, -7],
];

#[derive(Debug, Clone)]
pub struct ReferenceIdct {
    basis: [[f64; BLOCK_SIZE]; BLOCK_SIZE],
}

impl ReferenceIdct {
    pub fn new() -> Self {
        let mut basis = [[0.0; BLOCK_SIZE]; BLOCK_SIZE];
        for (k, row) in BASIS_INDEX.iter().enumerate() {
            for (j, &index) in row.iter().enumerate() {
                let value = COS_BASIS[index.unsigned_abs() as usize];
                basis[k][j] = if index < 0 { -value } else { value };
            }
        }
        Self { basis }
    }
}

impl Default for ReferenceIdct {
    fn default() -> Self {
        Self::new()
    }
}

impl InverseTransform for ReferenceIdct {
    fn name(&self) -> &'static str {
        "reference"
    }

    fn quant_table(&self, raw: &[u16; BLOCK_DIM]) -> QuantTable {
        QuantTable::direct(raw)
    }

    fn transform(&self, block: &mut [i32; BLOCK_DIM]) {
        let c = &self.basis;
        let mut temp = [[0.0f64; BLOCK_SIZE]; BLOCK_SIZE];
        for i in 0..BLOCK_SIZE {
            for j in 0..BLOCK_SIZE {
                temp[i][j] = (0..BLOCK_SIZE)
                    .map(|k| block[i * BLOCK_SIZE + k] as f64 * c[k][j])
                    .sum();
            }
        }
        for i in 0..BLOCK_SIZE {
            for j in 0..BLOCK_SIZE {
                let v: f64 = (0..BLOCK_SIZE).map(|k| c[k][i] * temp[k][j]).sum();
                block[i * BLOCK_SIZE + j] = (v + 128.0).round().clamp(0.0, 255.0) as i32;
            }
        }
    }

    fn color_math(&self) -> ColorMath {
        ColorMath::FloatingPoint
    }
}
