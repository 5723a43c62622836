//! Bit-level cursor over the entropy coded segment.
//!
//! Handles JPEG byte stuffing (FF00) and stops on any other 0xFF-prefixed
//! byte pair, which is always a marker.

use crate::constants::JPEG_MARKER_START_BYTE;
use crate::error::JfifError;

/// Result of a bit request: the requested bits, or the marker that interrupted them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bits {
    Value(u32),
    Marker(u16),
}

pub struct BitReader<'a> {
    source: &'a [u8],
    position: usize,
    barrel: u32,
    bit_count: u32,
}

impl<'a> BitReader<'a> {
    pub fn new(source: &'a [u8]) -> Self {
        Self {
            source,
            position: 0,
            barrel: 0,
            bit_count: 0,
        }
    }

    /// Byte offset of the next unread byte, relative to the start of `source`.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn buffered_bits(&self) -> u32 {
        self.bit_count
    }

    /// Returns the next `count` bits (1..=16), consuming them only when `remove` is set.
    ///
    /// A marker met while filling the barrel flushes all buffered bits and
    /// moves the cursor past the two marker bytes.
    pub fn peek_or_take(&mut self, count: u32, remove: bool) -> Result<Bits, JfifError> {
        debug_assert!((1..=16).contains(&count));

        while self.bit_count < count {
            let byte = *self
                .source
                .get(self.position)
                .ok_or(JfifError::UnexpectedEndOfData)?;

            if byte == JPEG_MARKER_START_BYTE {
                let next = *self
                    .source
                    .get(self.position + 1)
                    .ok_or(JfifError::UnexpectedEndOfData)?;
                self.position += 2;
                if next != 0x00 {
                    self.barrel = 0;
                    self.bit_count = 0;
                    return Ok(Bits::Marker(u16::from_be_bytes([byte, next])));
                }
            } else {
                self.position += 1;
            }

            self.barrel = (self.barrel << 8) | byte as u32;
            self.bit_count += 8;
        }

        let value = (self.barrel >> (self.bit_count - count)) & ((1u32 << count) - 1);
        if remove {
            self.bit_count -= count;
        }
        Ok(Bits::Value(value))
    }

    pub fn take(&mut self, count: u32) -> Result<Bits, JfifError> {
        self.peek_or_take(count, true)
    }

    /// Drops bits previously returned by a non-removing peek.
    pub fn skip_bits(&mut self, count: u32) {
        self.bit_count = self.bit_count.saturating_sub(count);
    }
}
