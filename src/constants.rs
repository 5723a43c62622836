pub const JPEG_MARKER_START_BYTE: u8 = 0xFF;
pub const JPEG_RESTART_MARKER_BASE: u8 = 0xD0;
pub const JPEG_RESTART_MARKER_RANGE: u8 = 8;

pub const BLOCK_SIZE: usize = 8;
pub const BLOCK_DIM: usize = BLOCK_SIZE * BLOCK_SIZE;

// Four luma blocks of a 2x2 sub-sampled MCU plus one block each for Cb and Cr.
pub const MAX_BLOCKS_PER_MCU: usize = 6;
pub const MCU_DIM: usize = 2 * BLOCK_SIZE;

pub const MAX_QUANT_TABLES: usize = 4;
pub const MAX_HUFFMAN_TABLES: usize = 2;
pub const MAX_HUFFMAN_CODE_LENGTH: usize = 16;
pub const MAX_MAGNITUDE_CATEGORY: u8 = 11;

pub const EOB_SYMBOL: u8 = 0x00;
pub const ZRL_SYMBOL: u8 = 0xF0;

// Baseline SOS tail: spectral selection start/end, successive approximation.
pub const BASELINE_SS: u8 = 0;
pub const BASELINE_SE: u8 = 63;
pub const BASELINE_AH_AL: u8 = 0;

pub const JFIF_TAG: &[u8; 4] = b"JFIF";
pub const JFXX_TAG: &[u8; 4] = b"JFXX";
pub const ADOBE_TAG: &[u8; 5] = b"Adobe";
// Offset of the transform byte inside the APP14 payload (after the length field).
pub const ADOBE_TRANSFORM_OFFSET: usize = 11;

/// Natural (row-major) block position to zigzag sequence index.
pub const ZIGZAG: [usize; BLOCK_DIM] = [
    0, 1, 5, 6, 14, 15, 27, 28,
    2, 4, 7, 13, 16, 26, 29, 42,
    3, 8, 12, 17, 25, 30, 41, 43,
    9, 11, 18, 24, 31, 40, 44, 53,
    10, 19, 23, 32, 39, 45, 52, 54,
    20, 22, 33, 38, 46, 51, 55, 60,
    21, 34, 37, 47, 50, 56, 59, 61,
    35, 36, 48, 49, 57, 58, 62, 63,
];

/// Zigzag sequence index to natural (row-major) block position.
pub const INVERSE_ZIGZAG: [usize; BLOCK_DIM] = [
    0, 1, 8, 16, 9, 2, 3, 10,
    17, 24, 32, 25, 18, 11, 4, 5,
    12, 19, 26, 33, 40, 48, 41, 34,
    27, 20, 13, 6, 7, 14, 21, 28,
    35, 42, 49, 56, 57, 50, 43, 36,
    29, 22, 15, 23, 30, 37, 44, 51,
    58, 59, 52, 45, 38, 31, 39, 46,
    53, 60, 61, 54, 47, 55, 62, 63,
];

// Magnitude category bases (ITU-T T.81 tables F.1/F.2). Index is the category.
pub const MAGNITUDE_POSITIVE_BASE: [i32; 12] = [0, 1, 2, 4, 8, 16, 32, 64, 128, 256, 512, 1024];
pub const MAGNITUDE_NEGATIVE_BASE: [i32; 12] =
    [0, -1, -3, -7, -15, -31, -63, -127, -255, -511, -1023, -2047];

// Fixed-point IDCT stages.
pub const SCALE_BITS: u32 = 14;
pub const PRE_DESCALE_BITS: u32 = 6;
pub const FINAL_SCALE_BITS: u32 = 3;
// Multiplier precision; also the shift applied after multiplying by a prescaled quant entry.
pub const CONST_BITS: u32 = 8;

pub const FIX_1_082392200: i32 = 277;
pub const FIX_1_414213562: i32 = 362;
pub const FIX_1_847759065: i32 = 473;
pub const FIX_NEG_2_613125930: i32 = -669;

/// AAN prescale factors in 2.14 fixed point, indexed by zigzag position.
pub const AAN_PRESCALE: [i32; BLOCK_DIM] = [
    16384, 22725, 22725, 21407, 31521, 21407, 19266, 29692,
    29692, 19266, 16384, 26722, 27969, 26722, 16384, 12873,
    22725, 25172, 25172, 22725, 12873, 8867, 17855, 21407,
    22654, 21407, 17855, 8867, 4520, 12299, 16819, 19266,
    19266, 16819, 12299, 4520, 6270, 11585, 15137, 16384,
    15137, 11585, 6270, 5906, 10426, 12873, 12873, 10426,
    5906, 5315, 8867, 10114, 8867, 5315, 4520, 6967,
    6967, 4520, 3552, 4799, 3552, 2446, 2446, 1247,
];

// Orthonormal DCT basis values: COS_BASIS[k] = c(k) * cos(k * pi / 16).
pub const COS_BASIS: [f64; BLOCK_SIZE] = [
    0.3535533905932737,
    0.4903926402016152,
    0.4619397662556434,
    0.4157348061512726,
    0.3535533905932738,
    0.2777851165098011,
    0.1913417161825449,
    0.0975451610080642,
];

// YCbCr to RGB, 10-bit fixed point.
pub const COLOR_SCALE_BITS: u32 = 10;
pub const FIX_CR_TO_R: i32 = 1436;
pub const FIX_CB_TO_G: i32 = 352;
pub const FIX_CR_TO_G: i32 = 731;
pub const FIX_CB_TO_B: i32 = 1815;

pub const CR_TO_R: f64 = 1.402;
pub const CB_TO_G: f64 = 0.34414;
pub const CR_TO_G: f64 = 0.71414;
pub const CB_TO_B: f64 = 1.772;

// BMP container.
pub const BMP_SIGNATURE: &[u8; 2] = b"BM";
pub const BMP_FILE_HEADER_SIZE: usize = 14;
pub const BMP_INFO_HEADER_SIZE: usize = 40;
pub const BMP_HEADER_SIZE: usize = BMP_FILE_HEADER_SIZE + BMP_INFO_HEADER_SIZE;
pub const BMP_BITS_PER_PIXEL: u16 = 24;
pub const BYTES_PER_PIXEL: usize = 3;

// Debug categories accepted through `debug_flags`.
pub const DEBUG_SCAN: u32 = 1 << 0;
pub const DEBUG_FRAME: u32 = 1 << 1;
pub const DEBUG_DQT: u32 = 1 << 2;
pub const DEBUG_DHT: u32 = 1 << 3;
pub const DEBUG_MCU: u32 = 1 << 4;
pub const DEBUG_MARKER: u32 = 1 << 5;
pub const DEBUG_AMPLITUDE: u32 = 1 << 6;
pub const DEBUG_QUANT: u32 = 1 << 7;
pub const DEBUG_IDCT: u32 = 1 << 8;
pub const DEBUG_HUFFMAN: u32 = 1 << 23;
pub const DEBUG_MAIN: u32 = 1 << 24;
pub const DEBUG_ALL: u32 = 0xFFFF_FFFF;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zigzag_tables_are_inverse() {
        for natural in 0..BLOCK_DIM {
            assert_eq!(INVERSE_ZIGZAG[ZIGZAG[natural]], natural);
        }
        for sequence in 0..BLOCK_DIM {
            assert_eq!(ZIGZAG[INVERSE_ZIGZAG[sequence]], sequence);
        }
    }

    #[test]
    fn test_aan_dc_factor_is_unity() {
        assert_eq!(AAN_PRESCALE[0], 1 << SCALE_BITS);
    }
}
