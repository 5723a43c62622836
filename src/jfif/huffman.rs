//! Huffman decoding for baseline JPEG.
//!
//! Tables are kept in canonical form: per code length a symbol count, the
//! offset of that length's first symbol and the exclusive upper bound of its
//! codes (the "row break"). Codewords are never materialised.

use crate::constants::{
    MAGNITUDE_NEGATIVE_BASE, MAGNITUDE_POSITIVE_BASE, MAX_HUFFMAN_CODE_LENGTH,
};
use crate::error::JfifError;
use crate::jfif::bit_reader::{BitReader, Bits};

/// A decoded Huffman symbol, or the marker that interrupted the lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Value(u8),
    Marker(u16),
}

#[derive(Debug, Clone)]
pub struct HuffmanTable {
    counts: [u8; MAX_HUFFMAN_CODE_LENGTH],
    values: Vec<u8>,
    row_break: [u32; MAX_HUFFMAN_CODE_LENGTH],
    value_offset: [usize; MAX_HUFFMAN_CODE_LENGTH],
}

impl HuffmanTable {
    /// Builds a table from the 16 DHT length counts and the symbol list that follows them.
    pub fn build_from_dht(counts: &[u8; 16], symbols: &[u8]) -> Result<Self, JfifError> {
        let total: usize = counts.iter().map(|&c| c as usize).sum();
        if total > 256 || symbols.len() != total {
            return Err(JfifError::InvalidHuffmanTable);
        }

        let mut values = Vec::new();
        values.try_reserve_exact(total)?;
        values.extend_from_slice(symbols);

        let mut row_break = [0u32; MAX_HUFFMAN_CODE_LENGTH];
        let mut value_offset = [0usize; MAX_HUFFMAN_CODE_LENGTH];
        let mut prefix = 0u32;
        let mut offset = 0usize;

        for (i, &count) in counts.iter().enumerate() {
            value_offset[i] = offset;
            offset += count as usize;
            prefix += count as u32;
            // More codes than the length can hold.
            if prefix > 1u32 << (i + 1) {
                return Err(JfifError::InvalidHuffmanTable);
            }
            row_break[i] = prefix;
            prefix <<= 1;
        }

        Ok(Self {
            counts: *counts,
            values,
            row_break,
            value_offset,
        })
    }

    pub fn counts(&self) -> &[u8; MAX_HUFFMAN_CODE_LENGTH] {
        &self.counts
    }

    pub fn row_breaks(&self) -> &[u32; MAX_HUFFMAN_CODE_LENGTH] {
        &self.row_break
    }

    pub fn symbol_count(&self) -> usize {
        self.values.len()
    }

    /// Looks up `code` taken as a `width`-bit codeword (1..=16).
    pub fn lookup_code(&self, code: u32, width: usize) -> Option<u8> {
        if width == 0 || width > MAX_HUFFMAN_CODE_LENGTH {
            return None;
        }
        let i = width - 1;
        if self.counts[i] == 0 || code >= self.row_break[i] {
            return None;
        }
        let first_code = if i == 0 { 0 } else { self.row_break[i - 1] << 1 };
        if code < first_code {
            return None;
        }
        self.values
            .get(self.value_offset[i] + (code - first_code) as usize)
            .copied()
    }

    /// Decodes the next symbol by probing widths 1..=16.
    pub fn decode(&self, reader: &mut BitReader) -> Result<Symbol, JfifError> {
        for width in 1..=MAX_HUFFMAN_CODE_LENGTH {
            match reader.peek_or_take(width as u32, false)? {
                Bits::Marker(marker) => return Ok(Symbol::Marker(marker)),
                Bits::Value(code) => {
                    if let Some(value) = self.lookup_code(code, width) {
                        reader.skip_bits(width as u32);
                        return Ok(Symbol::Value(value));
                    }
                }
            }
        }
        Err(JfifError::HuffmanLookupFailed)
    }
}

/// Converts `category` raw magnitude bits into a signed coefficient (T.81 F.2.2.1).
///
/// `category` must not exceed 11.
pub fn amp_adjust(raw: u32, category: u8) -> i32 {
    if category == 0 {
        return 0;
    }
    let s = category as usize;
    let half = 1u32 << (s - 1);
    let base = if raw & half != 0 {
        MAGNITUDE_POSITIVE_BASE[s]
    } else {
        MAGNITUDE_NEGATIVE_BASE[s]
    };
    base + (raw & (half - 1)) as i32
}
