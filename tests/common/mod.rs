// Builders for synthetic baseline JPEG streams.
//
// Streams are assembled segment by segment and the entropy coded data is
// produced with the canonical Huffman codes derived from the same DHT counts
// the decoder reads, so every scenario is self-consistent without fixtures.

#![allow(dead_code)]

/// Annex K.3 luminance DC table.
pub const DC_COUNTS: [u8; 16] = [0, 1, 5, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0];
pub const DC_VALUES: [u8; 12] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11];

/// Small AC table: EOB, ZRL, sizes 1..=5 at run 0, size 1 up to run 8 and
/// size 2 at run 1. The all-ones code is left unused.
pub const AC_COUNTS: [u8; 16] = [0, 2, 2, 2, 2, 2, 0, 6, 0, 0, 0, 0, 0, 0, 0, 0];
pub const AC_VALUES: [u8; 16] = [
    0x00, 0x01, 0x02, 0x11, 0x03, 0x21, 0x04, 0x31, 0x12, 0xF0, 0x05, 0x41, 0x51, 0x61, 0x71,
    0x81,
];

/// Annex K.3 chrominance DC table.
pub const CHROMA_DC_COUNTS: [u8; 16] = [0, 3, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0];
pub const CHROMA_DC_VALUES: [u8; 12] = DC_VALUES;

/// Same AC symbols as above with different code lengths, so EOB is `010`
/// here and `00` in the luma table.
pub const CHROMA_AC_COUNTS: [u8; 16] = [0, 1, 3, 2, 2, 1, 0, 7, 0, 0, 0, 0, 0, 0, 0, 0];
pub const CHROMA_AC_VALUES: [u8; 16] = [
    0x01, 0x00, 0x02, 0x11, 0x03, 0xF0, 0x21, 0x04, 0x31, 0x12, 0x05, 0x41, 0x51, 0x61, 0x71,
    0x81,
];

pub const EOB: u8 = 0x00;
pub const ZRL: u8 = 0xF0;

pub const EOI: u8 = 0xD9;
pub const SOF0: u8 = 0xC0;
pub const SOF2: u8 = 0xC2;

/// MSB-first bit packer with 0xFF byte stuffing; pads with 1 bits.
pub struct BitWriter {
    out: Vec<u8>,
    bit_buffer: u32,
    bits_in_buffer: u32,
}

impl BitWriter {
    pub fn new() -> Self {
        Self {
            out: Vec::new(),
            bit_buffer: 0,
            bits_in_buffer: 0,
        }
    }

    pub fn write_bits(&mut self, value: u32, length: u32) {
        if length == 0 {
            return;
        }
        let mask = (1u32 << length) - 1;
        self.bit_buffer = (self.bit_buffer << length) | (value & mask);
        self.bits_in_buffer += length;

        while self.bits_in_buffer >= 8 {
            let shift = self.bits_in_buffer - 8;
            self.emit_byte(((self.bit_buffer >> shift) & 0xFF) as u8);
            self.bits_in_buffer = shift;
            self.bit_buffer &= (1u32 << shift) - 1;
        }
    }

    fn emit_byte(&mut self, byte: u8) {
        self.out.push(byte);
        if byte == 0xFF {
            self.out.push(0x00);
        }
    }

    pub fn flush(&mut self) {
        if self.bits_in_buffer > 0 {
            let pad = 8 - self.bits_in_buffer;
            self.write_bits((1 << pad) - 1, pad);
        }
    }

    /// Byte-aligns the stream and appends a raw marker.
    pub fn marker(&mut self, code: u8) {
        self.flush();
        self.out.extend_from_slice(&[0xFF, code]);
    }

    pub fn into_bytes(mut self) -> Vec<u8> {
        self.flush();
        self.out
    }
}

/// Canonical code assignment from DHT counts (T.81 Annex C).
pub struct HuffmanEncoder {
    codes: Vec<Option<(u32, u32)>>,
}

impl HuffmanEncoder {
    pub fn new(counts: &[u8; 16], values: &[u8]) -> Self {
        let mut codes = vec![None; 256];
        let mut code = 0u32;
        let mut k = 0;
        for (i, &count) in counts.iter().enumerate() {
            for _ in 0..count {
                codes[values[k] as usize] = Some((code, i as u32 + 1));
                code += 1;
                k += 1;
            }
            code <<= 1;
        }
        Self { codes }
    }

    pub fn encode(&self, writer: &mut BitWriter, symbol: u8) {
        let (code, length) = self.codes[symbol as usize]
            .unwrap_or_else(|| panic!("symbol {symbol:#04x} has no code"));
        writer.write_bits(code, length);
    }
}

/// Number of magnitude bits needed for `value`.
pub fn category(value: i32) -> u32 {
    32 - value.unsigned_abs().leading_zeros()
}

fn magnitude_bits(value: i32, category: u32) -> u32 {
    if value >= 0 {
        value as u32
    } else {
        (value + (1 << category) - 1) as u32
    }
}

/// Entropy codes blocks with the DC/AC tables above, tracking DC predictors.
pub struct ScanEncoder {
    writer: BitWriter,
    dc: HuffmanEncoder,
    ac: HuffmanEncoder,
    chroma: Option<(HuffmanEncoder, HuffmanEncoder)>,
    predictors: Vec<i32>,
}

impl ScanEncoder {
    pub fn new(component_count: usize) -> Self {
        Self {
            writer: BitWriter::new(),
            dc: HuffmanEncoder::new(&DC_COUNTS, &DC_VALUES),
            ac: HuffmanEncoder::new(&AC_COUNTS, &AC_VALUES),
            chroma: None,
            predictors: vec![0; component_count],
        }
    }

    /// Components after the first use the chroma tables (destination 1).
    pub fn with_chroma_tables(component_count: usize) -> Self {
        Self {
            chroma: Some((
                HuffmanEncoder::new(&CHROMA_DC_COUNTS, &CHROMA_DC_VALUES),
                HuffmanEncoder::new(&CHROMA_AC_COUNTS, &CHROMA_AC_VALUES),
            )),
            ..Self::new(component_count)
        }
    }

    /// Encodes one block. `dc` is the absolute quantised DC level and `ac`
    /// lists (zigzag index, amplitude) pairs in increasing index order.
    pub fn block(&mut self, component: usize, dc: i32, ac: &[(usize, i32)]) {
        let (dc_table, ac_table) = match &self.chroma {
            Some((dc_table, ac_table)) if component > 0 => (dc_table, ac_table),
            _ => (&self.dc, &self.ac),
        };
        let diff = dc - self.predictors[component];
        self.predictors[component] = dc;
        let size = category(diff);
        dc_table.encode(&mut self.writer, size as u8);
        self.writer.write_bits(magnitude_bits(diff, size), size);

        let mut last = 0;
        for &(k, amplitude) in ac {
            let mut run = k - last - 1;
            while run > 15 {
                ac_table.encode(&mut self.writer, ZRL);
                run -= 16;
            }
            let size = category(amplitude);
            ac_table.encode(&mut self.writer, ((run as u32) << 4 | size) as u8);
            self.writer
                .write_bits(magnitude_bits(amplitude, size), size);
            last = k;
        }
        if last < 63 {
            ac_table.encode(&mut self.writer, EOB);
        }
    }

    /// Emits RSTn (n taken modulo 8) and resets the predictors.
    pub fn restart(&mut self, n: u8) {
        self.writer.marker(0xD0 + n % 8);
        self.predictors.fill(0);
    }

    /// Emits a raw marker without touching the predictors.
    pub fn marker(&mut self, code: u8) {
        self.writer.marker(code);
    }

    pub fn finish(self) -> Vec<u8> {
        self.writer.into_bytes()
    }
}

/// Marker-segment level stream assembly.
pub struct JpegBuilder {
    data: Vec<u8>,
}

impl JpegBuilder {
    pub fn new() -> Self {
        Self {
            data: vec![0xFF, 0xD8],
        }
    }

    pub fn segment(mut self, marker: u8, payload: &[u8]) -> Self {
        self.data.extend_from_slice(&[0xFF, marker]);
        self.data
            .extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
        self.data.extend_from_slice(payload);
        self
    }

    pub fn jfif(self) -> Self {
        self.segment(0xE0, b"JFIF\0\x01\x01\0\0\x01\0\x01\0\0")
    }

    /// APP14 Adobe segment with the given transform flag.
    pub fn adobe(self, transform: u8) -> Self {
        self.segment(0xEE, &[b'A', b'd', b'o', b'b', b'e', 0, 100, 0, 0, 0, 0, transform])
    }

    pub fn comment(self, text: &str) -> Self {
        self.segment(0xFE, text.as_bytes())
    }

    pub fn dqt(self, id: u8, table: &[u8; 64]) -> Self {
        let mut payload = vec![id];
        payload.extend_from_slice(table);
        self.segment(0xDB, &payload)
    }

    pub fn dqt_flat(self, id: u8, q: u8) -> Self {
        self.dqt(id, &[q; 64])
    }

    /// One DQT segment holding a flat table per (id, q) pair.
    pub fn dqt_flat_tables(self, tables: &[(u8, u8)]) -> Self {
        let mut payload = Vec::new();
        for &(id, q) in tables {
            payload.push(id);
            payload.extend_from_slice(&[q; 64]);
        }
        self.segment(0xDB, &payload)
    }

    /// Start of frame; components are (id, H << 4 | V, Tq).
    pub fn frame(self, marker: u8, width: u16, height: u16, components: &[(u8, u8, u8)]) -> Self {
        let mut payload = vec![8];
        payload.extend_from_slice(&height.to_be_bytes());
        payload.extend_from_slice(&width.to_be_bytes());
        payload.push(components.len() as u8);
        for &(id, sampling, tq) in components {
            payload.extend_from_slice(&[id, sampling, tq]);
        }
        self.segment(marker, &payload)
    }

    pub fn dht(self, class_id: u8, counts: &[u8; 16], values: &[u8]) -> Self {
        let mut payload = vec![class_id];
        payload.extend_from_slice(counts);
        payload.extend_from_slice(values);
        self.segment(0xC4, &payload)
    }

    /// One DHT segment holding every (Tc << 4 | Th, counts, values) table.
    pub fn dht_tables(self, tables: &[(u8, &[u8; 16], &[u8])]) -> Self {
        let mut payload = Vec::new();
        for &(class_id, counts, values) in tables {
            payload.push(class_id);
            payload.extend_from_slice(counts);
            payload.extend_from_slice(values);
        }
        self.segment(0xC4, &payload)
    }

    /// DC and AC table 0 matching `ScanEncoder`.
    pub fn tables(self) -> Self {
        self.dht(0x00, &DC_COUNTS, &DC_VALUES)
            .dht(0x10, &AC_COUNTS, &AC_VALUES)
    }

    /// Luma and chroma tables matching `ScanEncoder::with_chroma_tables`,
    /// all in a single DHT segment.
    pub fn all_tables(self) -> Self {
        self.dht_tables(&[
            (0x00, &DC_COUNTS, &DC_VALUES[..]),
            (0x10, &AC_COUNTS, &AC_VALUES[..]),
            (0x01, &CHROMA_DC_COUNTS, &CHROMA_DC_VALUES[..]),
            (0x11, &CHROMA_AC_COUNTS, &CHROMA_AC_VALUES[..]),
        ])
    }

    pub fn dri(self, interval: u16) -> Self {
        self.segment(0xDD, &interval.to_be_bytes())
    }

    /// Baseline scan over the given component ids, all using tables 0/0.
    pub fn scan(self, ids: &[u8]) -> Self {
        let components: Vec<(u8, u8)> = ids.iter().map(|&id| (id, 0x00)).collect();
        self.scan_with_tables(&components)
    }

    /// Baseline scan over (id, Td << 4 | Ta) pairs.
    pub fn scan_with_tables(self, components: &[(u8, u8)]) -> Self {
        let mut payload = vec![components.len() as u8];
        for &(id, tables) in components {
            payload.extend_from_slice(&[id, tables]);
        }
        payload.extend_from_slice(&[0, 63, 0]);
        self.segment(0xDA, &payload)
    }

    pub fn entropy(mut self, bytes: &[u8]) -> Self {
        self.data.extend_from_slice(bytes);
        self
    }

    pub fn eoi(mut self) -> Self {
        self.data.extend_from_slice(&[0xFF, EOI]);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.data
    }
}

/// JFIF grayscale header up to and including SOS, flat quantiser `q`.
pub fn grayscale_header(width: u16, height: u16, q: u8) -> JpegBuilder {
    JpegBuilder::new()
        .jfif()
        .dqt_flat(0, q)
        .frame(SOF0, width, height, &[(1, 0x11, 0)])
        .tables()
        .scan(&[1])
}

/// Grayscale image whose MCUs carry only the given DC levels, terminated by EOI.
pub fn grayscale_dc_image(width: u16, height: u16, q: u8, levels: &[i32]) -> Vec<u8> {
    let mut encoder = ScanEncoder::new(1);
    for &level in levels {
        encoder.block(0, level, &[]);
    }
    grayscale_header(width, height, q)
        .entropy(&encoder.finish())
        .eoi()
        .build()
}
