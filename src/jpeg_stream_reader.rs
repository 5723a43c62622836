use tracing::debug;

use crate::constants::{
    ADOBE_TAG, ADOBE_TRANSFORM_OFFSET, BASELINE_AH_AL, BASELINE_SE, BASELINE_SS, BLOCK_DIM,
    BLOCK_SIZE, DEBUG_DHT, DEBUG_DQT, DEBUG_FRAME, DEBUG_MARKER, DEBUG_SCAN, JFIF_TAG, JFXX_TAG,
    JPEG_MARKER_START_BYTE, MAX_HUFFMAN_TABLES, MAX_QUANT_TABLES,
};
use crate::error::JfifError;
use crate::jfif::huffman::HuffmanTable;
use crate::jpeg_marker_code::JpegMarkerCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameComponent {
    pub id: u8,
    pub h_samp_factor: u8,
    pub v_samp_factor: u8,
    pub quant_table_dest: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FrameHeader {
    pub precision: u8,
    pub height: u16,
    pub width: u16,
    pub components: Vec<FrameComponent>,
}

impl FrameHeader {
    /// Sub-sampling factors that drive MCU geometry; a single component frame is never sub-sampled.
    pub fn mcu_factors(&self) -> (usize, usize) {
        match self.components.as_slice() {
            [first, _, ..] => (first.h_samp_factor as usize, first.v_samp_factor as usize),
            _ => (1, 1),
        }
    }

    pub fn mcus_per_line(&self) -> usize {
        let (h, _) = self.mcu_factors();
        (self.width as usize).div_ceil(BLOCK_SIZE * h)
    }

    pub fn mcu_rows(&self) -> usize {
        let (_, v) = self.mcu_factors();
        (self.height as usize).div_ceil(BLOCK_SIZE * v)
    }

    pub fn total_mcus(&self) -> usize {
        self.mcus_per_line() * self.mcu_rows()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanComponent {
    pub selector: u8,
    /// Position of the matching component in the frame header.
    pub frame_index: usize,
    pub dc_table_dest: u8,
    pub ac_table_dest: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScanHeader {
    pub components: Vec<ScanComponent>,
    pub spectral_start: u8,
    pub spectral_end: u8,
    pub approximation: u8,
    /// Offset of the entropy coded segment in the input.
    pub data_offset: usize,
}

/// Everything parsed up to and including SOS.
#[derive(Debug, Clone)]
pub struct JpegHeader {
    pub frame: FrameHeader,
    pub scan: ScanHeader,
    pub quantization_tables: [Option<[u16; BLOCK_DIM]>; MAX_QUANT_TABLES],
    pub huffman_tables_dc: [Option<HuffmanTable>; MAX_HUFFMAN_TABLES],
    pub huffman_tables_ac: [Option<HuffmanTable>; MAX_HUFFMAN_TABLES],
    pub restart_interval: u16,
    pub is_jfif: bool,
    pub is_rgb: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JpegStreamReaderState {
    BeforeStartOfImage,
    HeaderSection,
    ScanSection,
}

pub struct JpegStreamReader<'a> {
    source: &'a [u8],
    position: usize,
    state: JpegStreamReaderState,
    ignore_sos_tail_errors: bool,
    debug_flags: u32,
    frame: Option<FrameHeader>,
    quantization_tables: [Option<[u16; BLOCK_DIM]>; MAX_QUANT_TABLES],
    huffman_tables_dc: [Option<HuffmanTable>; MAX_HUFFMAN_TABLES],
    huffman_tables_ac: [Option<HuffmanTable>; MAX_HUFFMAN_TABLES],
    restart_interval: u16,
    app0_count: usize,
    is_jfif: bool,
    is_rgb: bool,
}

impl<'a> JpegStreamReader<'a> {
    pub fn new(source: &'a [u8]) -> Self {
        Self {
            source,
            position: 0,
            state: JpegStreamReaderState::BeforeStartOfImage,
            ignore_sos_tail_errors: false,
            debug_flags: 0,
            frame: None,
            quantization_tables: [None; MAX_QUANT_TABLES],
            huffman_tables_dc: [const { None }; MAX_HUFFMAN_TABLES],
            huffman_tables_ac: [const { None }; MAX_HUFFMAN_TABLES],
            restart_interval: 0,
            app0_count: 0,
            is_jfif: false,
            is_rgb: false,
        }
    }

    pub fn with_ignore_sos_tail_errors(mut self, ignore: bool) -> Self {
        self.ignore_sos_tail_errors = ignore;
        self
    }

    pub fn with_debug_flags(mut self, debug_flags: u32) -> Self {
        self.debug_flags = debug_flags;
        self
    }

    pub fn state(&self) -> JpegStreamReaderState {
        self.state
    }

    pub fn position(&self) -> usize {
        self.position
    }

    fn traced(&self, category: u32) -> bool {
        self.debug_flags & category != 0
    }

    /// Parses marker segments from SOI up to and including SOS.
    pub fn read_header(&mut self) -> Result<JpegHeader, JfifError> {
        self.read_start_of_image()?;

        loop {
            let offset = self.position;
            let marker = self.read_marker()?;
            if self.traced(DEBUG_MARKER) {
                debug!("marker 0x{marker:04x} at offset {offset}");
            }

            let code = JpegMarkerCode::try_from((marker & 0xFF) as u8)
                .map_err(|_| JfifError::UnknownJpegMarkerFound { marker, offset })?;
            match code {
                JpegMarkerCode::StartOfImage => return Err(JfifError::DuplicateStartOfImageMarker),
                JpegMarkerCode::ApplicationData0 => self.read_app0_segment()?,
                JpegMarkerCode::ApplicationData14 => self.read_app14_segment()?,
                JpegMarkerCode::DefineQuantizationTable => self.read_dqt_segment()?,
                JpegMarkerCode::StartOfFrameBaseline => self.read_sof0_segment()?,
                JpegMarkerCode::DefineHuffmanTable => self.read_dht_segment()?,
                JpegMarkerCode::DefineRestartInterval => self.read_dri_segment()?,
                JpegMarkerCode::StartOfScan => {
                    let scan = self.read_sos_segment()?;
                    return self.finish(scan);
                }
                JpegMarkerCode::EndOfImage => {
                    return Err(JfifError::UnexpectedHeaderMarker { marker, offset });
                }
                code if code.is_restart() => {
                    return Err(JfifError::UnexpectedHeaderMarker { marker, offset });
                }
                code if code.is_unsupported_frame() => {
                    return Err(JfifError::UnsupportedFrameType(marker));
                }
                code if code.is_application_data() || code == JpegMarkerCode::Comment => {
                    self.skip_segment()?;
                }
                _ => return Err(JfifError::UnknownJpegMarkerFound { marker, offset }),
            }
        }
    }

    fn finish(&mut self, scan: ScanHeader) -> Result<JpegHeader, JfifError> {
        let frame = self.frame.take().ok_or(JfifError::MissingFrameHeader)?;
        self.state = JpegStreamReaderState::ScanSection;
        Ok(JpegHeader {
            frame,
            scan,
            quantization_tables: self.quantization_tables,
            huffman_tables_dc: std::mem::take(&mut self.huffman_tables_dc),
            huffman_tables_ac: std::mem::take(&mut self.huffman_tables_ac),
            restart_interval: self.restart_interval,
            is_jfif: self.is_jfif,
            is_rgb: self.is_rgb,
        })
    }

    pub fn read_u8(&mut self) -> Result<u8, JfifError> {
        let val = *self
            .source
            .get(self.position)
            .ok_or(JfifError::UnexpectedEndOfData)?;
        self.position += 1;
        Ok(val)
    }

    pub fn read_u16(&mut self) -> Result<u16, JfifError> {
        let b1 = self.read_u8()? as u16;
        let b2 = self.read_u8()? as u16;
        Ok((b1 << 8) | b2)
    }

    fn read_bytes(&mut self, count: usize) -> Result<&'a [u8], JfifError> {
        let source = self.source;
        let bytes = source
            .get(self.position..self.position + count)
            .ok_or(JfifError::UnexpectedEndOfData)?;
        self.position += count;
        Ok(bytes)
    }

    /// Reads a raw two-byte marker.
    pub fn read_marker(&mut self) -> Result<u16, JfifError> {
        let offset = self.position;
        let marker = self.read_u16()?;
        if (marker >> 8) as u8 != JPEG_MARKER_START_BYTE {
            return Err(JfifError::UnknownJpegMarkerFound { marker, offset });
        }
        Ok(marker)
    }

    fn read_start_of_image(&mut self) -> Result<(), JfifError> {
        let marker = self
            .read_marker()
            .map_err(|_| JfifError::StartOfImageMarkerNotFound)?;
        if marker != JpegMarkerCode::StartOfImage.to_u16() {
            return Err(JfifError::StartOfImageMarkerNotFound);
        }
        self.state = JpegStreamReaderState::HeaderSection;
        Ok(())
    }

    /// Reads the segment length and returns the offset just past the segment.
    fn read_segment_length(&mut self) -> Result<usize, JfifError> {
        let offset = self.position;
        let length = self.read_u16()? as usize;
        let end = offset + length;
        if length < 2 || end > self.source.len() {
            return Err(JfifError::InvalidMarkerSegmentSize(offset));
        }
        Ok(end)
    }

    fn check_segment_end(&self, end: usize) -> Result<(), JfifError> {
        if self.position != end {
            return Err(JfifError::InvalidMarkerSegmentSize(self.position));
        }
        Ok(())
    }

    pub fn skip_segment(&mut self) -> Result<(), JfifError> {
        let end = self.read_segment_length()?;
        self.position = end;
        Ok(())
    }

    fn read_app0_segment(&mut self) -> Result<(), JfifError> {
        let end = self.read_segment_length()?;
        let source = self.source;
        let payload = &source[self.position..end];
        let expected = if self.app0_count == 0 { JFIF_TAG } else { JFXX_TAG };
        if !payload.starts_with(expected) {
            return Err(JfifError::InvalidApp0Segment);
        }
        self.app0_count += 1;
        self.is_jfif = true;
        self.is_rgb = false;
        self.position = end;
        Ok(())
    }

    fn read_app14_segment(&mut self) -> Result<(), JfifError> {
        let end = self.read_segment_length()?;
        let source = self.source;
        let payload = &source[self.position..end];
        if !payload.starts_with(ADOBE_TAG) || payload.len() <= ADOBE_TRANSFORM_OFFSET {
            return Err(JfifError::InvalidApp14Segment);
        }
        if !self.is_jfif {
            match payload[ADOBE_TRANSFORM_OFFSET] {
                0 => self.is_rgb = true,
                1 => self.is_rgb = false,
                other => return Err(JfifError::UnsupportedAdobeColorSpace(other)),
            }
        }
        self.position = end;
        Ok(())
    }

    pub fn read_dqt_segment(&mut self) -> Result<(), JfifError> {
        let end = self.read_segment_length()?;
        while self.position < end {
            let pq_tq = self.read_u8()?;
            let precision = pq_tq >> 4;
            let id = pq_tq & 0x0F;
            if id as usize >= MAX_QUANT_TABLES {
                return Err(JfifError::InvalidQuantizationTableId(id));
            }

            let mut table = [0u16; BLOCK_DIM];
            for entry in table.iter_mut() {
                *entry = match precision {
                    0 => self.read_u8()? as u16,
                    1 => self.read_u16()?,
                    _ => return Err(JfifError::InvalidQuantizationTablePrecision(precision)),
                };
            }
            if self.position > end {
                return Err(JfifError::InvalidMarkerSegmentSize(end));
            }
            if self.traced(DEBUG_DQT) {
                debug!(id, precision, ?table, "DQT");
            }
            self.quantization_tables[id as usize] = Some(table);
        }
        self.check_segment_end(end)
    }

    fn read_sof0_segment(&mut self) -> Result<(), JfifError> {
        if self.frame.is_some() {
            return Err(JfifError::DuplicateStartOfFrameMarker);
        }
        let end = self.read_segment_length()?;
        let precision = self.read_u8()?;
        let height = self.read_u16()?;
        let width = self.read_u16()?;
        let component_count = self.read_u8()?;

        if precision != 8 {
            return Err(JfifError::UnsupportedPrecision(precision));
        }
        if width == 0 || height == 0 {
            return Err(JfifError::InvalidFrameDimensions { width, height });
        }
        if !(1..=4).contains(&component_count) {
            return Err(JfifError::InvalidComponentCount(component_count));
        }

        let mut components = Vec::with_capacity(component_count as usize);
        for index in 0..component_count {
            let id = self.read_u8()?;
            let sampling = self.read_u8()?;
            let tq = self.read_u8()?;
            if tq as usize >= MAX_QUANT_TABLES {
                return Err(JfifError::InvalidQuantizationTableId(tq));
            }
            let component = FrameComponent {
                id,
                h_samp_factor: sampling >> 4,
                v_samp_factor: sampling & 0x0F,
                quant_table_dest: tq,
            };
            // Only the first component may be sub-sampled, by at most 2 in each direction.
            let allowed = if index == 0 { 1..=2 } else { 1..=1 };
            if !allowed.contains(&component.h_samp_factor)
                || !allowed.contains(&component.v_samp_factor)
            {
                return Err(JfifError::UnsupportedSubsampling);
            }
            components.push(component);
        }
        self.check_segment_end(end)?;

        let frame = FrameHeader {
            precision,
            height,
            width,
            components,
        };
        if self.traced(DEBUG_FRAME) {
            debug!(
                width,
                height,
                components = ?frame.components,
                total_mcus = frame.total_mcus(),
                "SOF0"
            );
        }
        self.frame = Some(frame);
        Ok(())
    }

    pub fn read_dht_segment(&mut self) -> Result<(), JfifError> {
        let end = self.read_segment_length()?;
        while self.position < end {
            let tc_th = self.read_u8()?;
            let class = tc_th >> 4;
            let id = tc_th & 0x0F;
            if class > 1 {
                return Err(JfifError::InvalidHuffmanTableClass(class));
            }
            if id as usize >= MAX_HUFFMAN_TABLES {
                return Err(JfifError::UnsupportedHuffmanTableId(id));
            }

            let mut counts = [0u8; 16];
            counts.copy_from_slice(self.read_bytes(16)?);
            let total: usize = counts.iter().map(|&c| c as usize).sum();
            if self.position + total > end {
                return Err(JfifError::InvalidHuffmanTable);
            }
            let symbols = self.read_bytes(total)?;
            let table = HuffmanTable::build_from_dht(&counts, symbols)?;
            if self.traced(DEBUG_DHT) {
                let counts = table.counts();
                debug!(class, id, ?counts, row_breaks = ?table.row_breaks(), "DHT");
            }

            if class == 0 {
                self.huffman_tables_dc[id as usize] = Some(table);
            } else {
                self.huffman_tables_ac[id as usize] = Some(table);
            }
        }
        self.check_segment_end(end)
    }

    pub fn read_dri_segment(&mut self) -> Result<(), JfifError> {
        let offset = self.position;
        let length = self.read_u16()?;
        if length != 4 {
            return Err(JfifError::InvalidMarkerSegmentSize(offset));
        }
        self.restart_interval = self.read_u16()?;
        if self.traced(DEBUG_MARKER) {
            debug!(restart_interval = self.restart_interval, "DRI");
        }
        Ok(())
    }

    fn read_sos_segment(&mut self) -> Result<ScanHeader, JfifError> {
        let end = self.read_segment_length()?;
        let frame_components = self
            .frame
            .as_ref()
            .ok_or(JfifError::MissingFrameHeader)?
            .components
            .len();

        let component_count = self.read_u8()?;
        if component_count as usize != frame_components || !matches!(component_count, 1 | 3) {
            return Err(JfifError::UnsupportedScanComponentCount(component_count));
        }

        let mut components = Vec::with_capacity(component_count as usize);
        for _ in 0..component_count {
            let selector = self.read_u8()?;
            let td_ta = self.read_u8()?;
            let frame = self.frame.as_ref().ok_or(JfifError::MissingFrameHeader)?;
            let frame_index = frame
                .components
                .iter()
                .position(|c| c.id == selector)
                .ok_or(JfifError::UnknownComponentId(selector))?;
            let quant_dest = frame.components[frame_index].quant_table_dest;

            let component = ScanComponent {
                selector,
                frame_index,
                dc_table_dest: td_ta >> 4,
                ac_table_dest: td_ta & 0x0F,
            };
            self.check_tables(&component, quant_dest)?;
            components.push(component);
        }

        let spectral_start = self.read_u8()?;
        let spectral_end = self.read_u8()?;
        let approximation = self.read_u8()?;
        self.check_segment_end(end)?;

        let baseline_tail = spectral_start == BASELINE_SS
            && spectral_end == BASELINE_SE
            && approximation == BASELINE_AH_AL;
        if !baseline_tail && !self.ignore_sos_tail_errors {
            return Err(JfifError::InvalidScanTail {
                ss: spectral_start,
                se: spectral_end,
                ah_al: approximation,
            });
        }

        let scan = ScanHeader {
            components,
            spectral_start,
            spectral_end,
            approximation,
            data_offset: self.position,
        };
        if self.traced(DEBUG_SCAN) {
            debug!(components = ?scan.components, data_offset = scan.data_offset, "SOS");
        }
        Ok(scan)
    }

    fn check_tables(&self, component: &ScanComponent, quant_dest: u8) -> Result<(), JfifError> {
        let defined = |tables: &[Option<HuffmanTable>; MAX_HUFFMAN_TABLES], id: u8| {
            tables.get(id as usize).is_some_and(Option::is_some)
        };
        if !defined(&self.huffman_tables_dc, component.dc_table_dest) {
            return Err(JfifError::MissingHuffmanTable {
                class: 0,
                id: component.dc_table_dest,
            });
        }
        if !defined(&self.huffman_tables_ac, component.ac_table_dest) {
            return Err(JfifError::MissingHuffmanTable {
                class: 1,
                id: component.ac_table_dest,
            });
        }
        if self.quantization_tables[quant_dest as usize].is_none() {
            return Err(JfifError::MissingQuantizationTable(quant_dest));
        }
        Ok(())
    }
}
