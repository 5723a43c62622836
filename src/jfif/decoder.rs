use tracing::{debug, trace, warn};

use crate::DecodeOptions;
use crate::constants::{BLOCK_SIZE, DEBUG_IDCT, DEBUG_MAIN, DEBUG_MCU, DEBUG_MARKER};
use crate::error::JfifError;
use crate::jfif::bitmap::Bitmap;
use crate::jfif::color::{ColorConverter, RgbMcu};
use crate::jfif::dct::InverseTransform;
use crate::jfif::scan_decoder::{EntropyDecoder, McuOutcome};
use crate::jpeg_marker_code::{JpegMarkerCode, is_restart_marker, restart_marker};
use crate::jpeg_stream_reader::{JpegHeader, JpegStreamReader};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    ExpectHeader,
    ExpectMcu,
    /// A restart interval just completed; the next item must be the expected RSTn.
    ExpectRstN,
    Done,
}

/// Drives header parsing, the MCU loop and raster assembly for one image.
pub struct JfifDecoder<'a> {
    source: &'a [u8],
    options: DecodeOptions,
    transform: Box<dyn InverseTransform>,
    state: DecoderState,
    header: Option<JpegHeader>,
}

impl<'a> JfifDecoder<'a> {
    pub fn new(source: &'a [u8], options: DecodeOptions) -> Self {
        Self {
            source,
            options,
            transform: options.idct.transform(),
            state: DecoderState::ExpectHeader,
            header: None,
        }
    }

    /// Replaces the inverse transform chosen by `options.idct`.
    pub fn with_transform(mut self, transform: Box<dyn InverseTransform>) -> Self {
        self.transform = transform;
        self
    }

    pub fn state(&self) -> DecoderState {
        self.state
    }

    fn traced(&self, category: u32) -> bool {
        self.options.debug_flags & category != 0
    }

    pub fn read_header(&mut self) -> Result<&JpegHeader, JfifError> {
        if self.header.is_none() {
            let header = JpegStreamReader::new(self.source)
                .with_ignore_sos_tail_errors(self.options.ignore_sos_tail_errors)
                .with_debug_flags(self.options.debug_flags)
                .read_header()?;
            self.header = Some(header);
        }
        self.header.as_ref().ok_or(JfifError::MissingFrameHeader)
    }

    /// Decodes the image. The header is consumed, so a decoder decodes once.
    pub fn decode(&mut self) -> Result<Bitmap, JfifError> {
        self.read_header()?;
        let header = self.header.take().ok_or(JfifError::MissingFrameHeader)?;
        let frame = &header.frame;

        let mut bitmap = Bitmap::new(frame.width, frame.height)?;
        let data = self
            .source
            .get(header.scan.data_offset..)
            .ok_or(JfifError::UnexpectedEndOfData)?;
        let mut entropy = EntropyDecoder::new(
            data,
            &header,
            self.transform.as_ref(),
            self.options.debug_flags,
        )?;
        let converter = ColorConverter::new(self.transform.color_math(), header.is_rgb);

        let (h, v) = frame.mcu_factors();
        let mut rgb = RgbMcu::new(h, v);
        let total_mcus = frame.total_mcus();
        let mcus_per_line = frame.mcus_per_line();
        let restart_interval = header.restart_interval as usize;
        let color = header.scan.components.len() != 1;

        if self.traced(DEBUG_MAIN) {
            debug!(
                width = frame.width,
                height = frame.height,
                total_mcus,
                restart_interval,
                idct = self.transform.name(),
                "decoding scan"
            );
        }

        let mut mcu_count = 0usize;
        let mut next_restart = 0u8;
        self.state = DecoderState::ExpectMcu;

        loop {
            let outcome = match entropy.decode_mcu() {
                Ok(outcome) => outcome,
                Err(JfifError::UnexpectedEndOfData) if mcu_count >= total_mcus => {
                    warn!(mcu_count, "entropy coded data ended without EOI");
                    break;
                }
                Err(e) => return Err(e),
            };

            match outcome {
                McuOutcome::Marker(marker) if marker == JpegMarkerCode::EndOfImage.to_u16() => {
                    if mcu_count < total_mcus {
                        warn!(mcu_count, total_mcus, "EOI before the last MCU");
                    }
                    break;
                }
                McuOutcome::Marker(marker) if is_restart_marker(marker) => {
                    if self.state != DecoderState::ExpectRstN {
                        return Err(JfifError::UnexpectedRestartMarker(marker));
                    }
                    let expected = restart_marker(next_restart);
                    if marker != expected {
                        return Err(JfifError::RestartMarkerSequence {
                            expected,
                            found: marker,
                        });
                    }
                    if self.traced(DEBUG_MARKER) {
                        debug!("restart marker 0x{marker:04x} after MCU {mcu_count}");
                    }
                    next_restart = (next_restart + 1) % 8;
                    self.state = DecoderState::ExpectMcu;
                }
                McuOutcome::Marker(marker) => {
                    return Err(JfifError::UnexpectedMarkerInScan(marker));
                }
                McuOutcome::Decoded => {
                    if self.state == DecoderState::ExpectRstN {
                        return Err(JfifError::RestartMarkerNotFound);
                    }
                    if mcu_count >= total_mcus {
                        warn!(mcu_count, total_mcus, "more MCUs than the frame holds, stopping");
                        break;
                    }

                    for block in entropy.blocks_mut() {
                        self.transform.transform(block);
                    }
                    if self.traced(DEBUG_IDCT) {
                        trace!(mcu = mcu_count, blocks = ?entropy.blocks(), "IDCT output");
                    }

                    if color {
                        converter.convert(entropy.blocks(), h, v, &mut rgb)?;
                    } else {
                        converter.from_luma(&entropy.blocks()[0], &mut rgb);
                    }

                    let x0 = (mcu_count % mcus_per_line) * BLOCK_SIZE * h;
                    let y0 = (mcu_count / mcus_per_line) * BLOCK_SIZE * v;
                    bitmap.put_mcu(&rgb, x0, y0);
                    if self.traced(DEBUG_MCU) {
                        let predictors = entropy.dc_predictors();
                        trace!(mcu = mcu_count, x0, y0, ?predictors, "MCU");
                    }

                    mcu_count += 1;
                    if restart_interval > 0
                        && mcu_count % restart_interval == 0
                        && mcu_count < total_mcus
                    {
                        self.state = DecoderState::ExpectRstN;
                    }
                }
            }
        }

        self.state = DecoderState::Done;
        if self.traced(DEBUG_MAIN) {
            debug!(mcu_count, consumed = entropy.position(), "scan finished");
        }
        Ok(bitmap)
    }
}
