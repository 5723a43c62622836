//! Baseline DCT JFIF/JPEG decoding (ISO/IEC 10918-1 / ITU-T T.81)
//!
//! Decodes a single-scan, Huffman coded, 8-bit baseline image into a 24-bit
//! bitmap.
//!
//! Features:
//! - Grayscale and three component YCbCr or Adobe RGB images.
//! - 1x1, 2x1, 1x2 and 2x2 luma sub-sampling.
//! - Restart intervals with strict RSTn sequence checking.
//! - Fast integer (AAN) and reference floating point inverse DCT.

pub mod bit_reader;
pub mod bitmap;
pub mod color;
pub mod dct;
pub mod decoder;
pub mod huffman;
pub mod quantization;
pub mod scan_decoder;

pub use bitmap::Bitmap;
pub use dct::{FastIdct, IdctVariant, InverseTransform, ReferenceIdct};
pub use decoder::{DecoderState, JfifDecoder};
