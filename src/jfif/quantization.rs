//! Quantisation tables for baseline decoding.
//! Entries stay in zigzag order, as stored in the DQT segment.

use crate::constants::{AAN_PRESCALE, BLOCK_DIM, CONST_BITS, PRE_DESCALE_BITS};

// Clamp for dequantised coefficients. Legitimate 8-bit data stays well below
// this, and it keeps the integer butterflies of hostile streams inside i32.
const COEFFICIENT_LIMIT: i64 = 1 << 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantTable {
    entries: [i32; BLOCK_DIM],
    shift: u32,
}

impl QuantTable {
    /// Plain table: a coefficient dequantises to `amplitude * q`.
    pub fn direct(raw: &[u16; BLOCK_DIM]) -> Self {
        let mut entries = [0i32; BLOCK_DIM];
        for (entry, &q) in entries.iter_mut().zip(raw.iter()) {
            *entry = q as i32;
        }
        Self { entries, shift: 0 }
    }

    /// Table with the AAN row/column scale folded in, for the fast integer IDCT.
    pub fn aan_prescaled(raw: &[u16; BLOCK_DIM]) -> Self {
        let mut entries = [0i32; BLOCK_DIM];
        for (k, entry) in entries.iter_mut().enumerate() {
            *entry = ((raw[k] as i64 * AAN_PRESCALE[k] as i64) >> PRE_DESCALE_BITS) as i32;
        }
        Self {
            entries,
            shift: CONST_BITS,
        }
    }

    pub fn entry(&self, zigzag_index: usize) -> i32 {
        self.entries[zigzag_index]
    }

    pub fn dequantize(&self, amplitude: i32, zigzag_index: usize) -> i32 {
        let value = (amplitude as i64 * self.entries[zigzag_index] as i64) >> self.shift;
        value.clamp(-COEFFICIENT_LIMIT, COEFFICIENT_LIMIT) as i32
    }
}
