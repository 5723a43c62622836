pub mod constants;
pub mod error;
pub mod jfif;
pub mod jpeg_marker_code;
pub mod jpeg_stream_reader;

pub use error::{ErrorCode, JfifError};
pub use jfif::{Bitmap, IdctVariant, JfifDecoder};

/// Runtime decoder configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeOptions {
    /// Inverse transform, which also selects the matching colour arithmetic.
    pub idct: IdctVariant,
    /// Accept scans whose Ss/Se/Ah/Al fields are not the baseline values.
    pub ignore_sos_tail_errors: bool,
    /// Bitmask of `constants::DEBUG_*` trace categories.
    pub debug_flags: u32,
}

impl DecodeOptions {
    pub fn with_idct(mut self, idct: IdctVariant) -> Self {
        self.idct = idct;
        self
    }

    pub fn with_debug_flags(mut self, debug_flags: u32) -> Self {
        self.debug_flags = debug_flags;
        self
    }
}

/// Decodes a complete JFIF/JPEG stream into the bytes of a 24-bit BMP file.
pub fn decode(input: &[u8], debug_flags: u32) -> Result<Vec<u8>, JfifError> {
    let options = DecodeOptions::default().with_debug_flags(debug_flags);
    decode_with_options(input, options).map(Bitmap::into_bytes)
}

pub fn decode_with_options(input: &[u8], options: DecodeOptions) -> Result<Bitmap, JfifError> {
    JfifDecoder::new(input, options).decode()
}
