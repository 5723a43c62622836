//! Entropy decoding of one MCU at a time.
//!
//! Each block goes through DC difference decoding against the component's
//! predictor, then run-length/size AC decoding until EOB. Coefficients are
//! dequantised on the fly and stored in natural order.

use tracing::trace;

use crate::constants::{
    BLOCK_DIM, DEBUG_AMPLITUDE, DEBUG_HUFFMAN, DEBUG_QUANT, EOB_SYMBOL, INVERSE_ZIGZAG,
    MAX_BLOCKS_PER_MCU, MAX_MAGNITUDE_CATEGORY, ZRL_SYMBOL,
};
use crate::error::JfifError;
use crate::jfif::bit_reader::{BitReader, Bits};
use crate::jfif::dct::InverseTransform;
use crate::jfif::huffman::{HuffmanTable, Symbol, amp_adjust};
use crate::jfif::quantization::QuantTable;
use crate::jpeg_marker_code::{JpegMarkerCode, is_restart_marker};
use crate::jpeg_stream_reader::JpegHeader;

pub type Block = [i32; BLOCK_DIM];

/// What a call to `decode_mcu` produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum McuOutcome {
    Decoded,
    /// A marker was met; the MCU buffer content is not meaningful.
    Marker(u16),
}

struct ComponentTables {
    dc: HuffmanTable,
    ac: HuffmanTable,
    quant: QuantTable,
}

pub struct EntropyDecoder<'a> {
    reader: BitReader<'a>,
    components: Vec<ComponentTables>,
    // Scan component feeding each block of the MCU.
    block_component: Vec<usize>,
    predictors: Vec<i32>,
    blocks: [Block; MAX_BLOCKS_PER_MCU],
    debug_flags: u32,
}

fn is_end_of_image(marker: u16) -> bool {
    marker == JpegMarkerCode::EndOfImage.to_u16()
}

// EOI inside a block ends the image, anything else there is corrupt data.
fn interrupted(marker: u16) -> Result<McuOutcome, JfifError> {
    if is_end_of_image(marker) {
        Ok(McuOutcome::Marker(marker))
    } else {
        Err(JfifError::MarkerInBlockData(marker))
    }
}

impl<'a> EntropyDecoder<'a> {
    /// `data` starts at the first byte of the entropy coded segment.
    pub fn new(
        data: &'a [u8],
        header: &JpegHeader,
        transform: &dyn InverseTransform,
        debug_flags: u32,
    ) -> Result<Self, JfifError> {
        let mut components = Vec::with_capacity(header.scan.components.len());
        for scan_component in &header.scan.components {
            let missing_dc = JfifError::MissingHuffmanTable {
                class: 0,
                id: scan_component.dc_table_dest,
            };
            let missing_ac = JfifError::MissingHuffmanTable {
                class: 1,
                id: scan_component.ac_table_dest,
            };
            let dc = header
                .huffman_tables_dc
                .get(scan_component.dc_table_dest as usize)
                .and_then(Option::as_ref)
                .ok_or(missing_dc)?;
            let ac = header
                .huffman_tables_ac
                .get(scan_component.ac_table_dest as usize)
                .and_then(Option::as_ref)
                .ok_or(missing_ac)?;

            let quant_dest = header
                .frame
                .components
                .get(scan_component.frame_index)
                .ok_or(JfifError::UnknownComponentId(scan_component.selector))?
                .quant_table_dest;
            let raw = header
                .quantization_tables
                .get(quant_dest as usize)
                .copied()
                .flatten()
                .ok_or(JfifError::MissingQuantizationTable(quant_dest))?;

            let quant = transform.quant_table(&raw);
            if debug_flags & DEBUG_QUANT != 0 {
                trace!(
                    component = scan_component.selector,
                    table = quant_dest,
                    idct = transform.name(),
                    entries = ?quant,
                    "prepared quantiser"
                );
            }
            components.push(ComponentTables {
                dc: dc.clone(),
                ac: ac.clone(),
                quant,
            });
        }

        // Luma blocks first, then one block for each remaining scan component.
        let (h, v) = header.frame.mcu_factors();
        let luma_blocks = h * v;
        let block_count = components.len() + luma_blocks - 1;
        let block_component = (0..block_count)
            .map(|b| if b >= luma_blocks { b - luma_blocks + 1 } else { 0 })
            .collect();

        Ok(Self {
            reader: BitReader::new(data),
            predictors: vec![0; components.len()],
            components,
            block_component,
            blocks: [[0; BLOCK_DIM]; MAX_BLOCKS_PER_MCU],
            debug_flags,
        })
    }

    pub fn block_count(&self) -> usize {
        self.block_component.len()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks[..self.block_component.len()]
    }

    pub fn blocks_mut(&mut self) -> &mut [Block] {
        let count = self.block_component.len();
        &mut self.blocks[..count]
    }

    pub fn dc_predictors(&self) -> &[i32] {
        &self.predictors
    }

    pub fn reset_predictors(&mut self) {
        self.predictors.fill(0);
    }

    /// Bytes of entropy coded data consumed so far.
    pub fn position(&self) -> usize {
        self.reader.position()
    }

    fn traced(&self, category: u32) -> bool {
        self.debug_flags & category != 0
    }

    fn read_amplitude(&mut self, category: u8) -> Result<Result<i32, u16>, JfifError> {
        if category == 0 {
            return Ok(Ok(0));
        }
        match self.reader.take(category as u32)? {
            Bits::Value(raw) => {
                let amplitude = amp_adjust(raw, category);
                if self.traced(DEBUG_AMPLITUDE) {
                    trace!(category, raw, amplitude, "amplitude");
                }
                Ok(Ok(amplitude))
            }
            Bits::Marker(marker) => Ok(Err(marker)),
        }
    }

    /// Decodes the next MCU into the block buffer.
    ///
    /// A marker met while looking up a DC symbol is returned to the caller;
    /// restart markers also reset every DC predictor.
    pub fn decode_mcu(&mut self) -> Result<McuOutcome, JfifError> {
        for block in self.blocks.iter_mut() {
            block.fill(0);
        }

        for b in 0..self.block_component.len() {
            let c = self.block_component[b];

            let dc_symbol = match self.components[c].dc.decode(&mut self.reader)? {
                Symbol::Value(symbol) => symbol,
                Symbol::Marker(marker) => {
                    if is_restart_marker(marker) {
                        self.reset_predictors();
                    }
                    return Ok(McuOutcome::Marker(marker));
                }
            };
            if self.traced(DEBUG_HUFFMAN) {
                trace!(block = b, symbol = dc_symbol, "DC symbol");
            }
            if dc_symbol > MAX_MAGNITUDE_CATEGORY {
                return Err(JfifError::InvalidCoefficientCategory(dc_symbol));
            }
            let diff = match self.read_amplitude(dc_symbol)? {
                Ok(diff) => diff,
                Err(marker) => return interrupted(marker),
            };
            self.predictors[c] = self.predictors[c].wrapping_add(diff);
            self.blocks[b][0] = self.components[c].quant.dequantize(self.predictors[c], 0);

            let mut k = 1;
            while k < BLOCK_DIM {
                let symbol = match self.components[c].ac.decode(&mut self.reader)? {
                    Symbol::Value(symbol) => symbol,
                    Symbol::Marker(marker) => return interrupted(marker),
                };
                if self.traced(DEBUG_HUFFMAN) {
                    trace!(block = b, k, symbol, "AC symbol");
                }

                match symbol {
                    EOB_SYMBOL => break,
                    ZRL_SYMBOL => {
                        k += 16;
                        if k > BLOCK_DIM {
                            return Err(JfifError::CoefficientIndexOutOfRange);
                        }
                    }
                    _ => {
                        let run = (symbol >> 4) as usize;
                        let size = symbol & 0x0F;
                        k += run;
                        if k >= BLOCK_DIM {
                            return Err(JfifError::CoefficientIndexOutOfRange);
                        }
                        if size > MAX_MAGNITUDE_CATEGORY {
                            return Err(JfifError::InvalidCoefficientCategory(size));
                        }
                        let amplitude = match self.read_amplitude(size)? {
                            Ok(amplitude) => amplitude,
                            Err(marker) => return interrupted(marker),
                        };
                        self.blocks[b][INVERSE_ZIGZAG[k]] =
                            self.components[c].quant.dequantize(amplitude, k);
                        k += 1;
                    }
                }
            }
        }
        Ok(McuOutcome::Decoded)
    }
}
