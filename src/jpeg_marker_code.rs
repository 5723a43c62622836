use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::constants::{
    JPEG_MARKER_START_BYTE, JPEG_RESTART_MARKER_BASE, JPEG_RESTART_MARKER_RANGE,
};

/// Second byte of the two-byte markers defined by ITU-T T.81.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum JpegMarkerCode {
    /// SOF0: Baseline DCT frame, the only frame type decoded.
    StartOfFrameBaseline = 0xC0,
    StartOfFrameExtendedSequential = 0xC1,
    StartOfFrameProgressive = 0xC2,
    StartOfFrameLossless = 0xC3,
    /// DHT: Defines one or more Huffman tables.
    DefineHuffmanTable = 0xC4,
    StartOfFrameDifferentialSequential = 0xC5,
    StartOfFrameDifferentialProgressive = 0xC6,
    StartOfFrameDifferentialLossless = 0xC7,
    /// JPG: Reserved for JPEG extensions.
    JpegExtension = 0xC8,
    StartOfFrameExtendedSequentialArithmetic = 0xC9,
    StartOfFrameProgressiveArithmetic = 0xCA,
    StartOfFrameLosslessArithmetic = 0xCB,
    /// DAC: Defines arithmetic coding conditioning.
    DefineArithmeticCoding = 0xCC,
    StartOfFrameDifferentialSequentialArithmetic = 0xCD,
    StartOfFrameDifferentialProgressiveArithmetic = 0xCE,
    StartOfFrameDifferentialLosslessArithmetic = 0xCF,

    /// RSTm: Restart markers, cycling 0..7 inside the entropy coded data.
    Restart0 = 0xD0,
    Restart1 = 0xD1,
    Restart2 = 0xD2,
    Restart3 = 0xD3,
    Restart4 = 0xD4,
    Restart5 = 0xD5,
    Restart6 = 0xD6,
    Restart7 = 0xD7,

    /// SOI: Marks the start of an image.
    StartOfImage = 0xD8,
    /// EOI: Marks the end of an image.
    EndOfImage = 0xD9,
    /// SOS: Marks the start of scan.
    StartOfScan = 0xDA,
    /// DQT: Defines one or more quantisation tables.
    DefineQuantizationTable = 0xDB,
    /// DNL: Defines the number of lines in a scan.
    DefineNumberOfLines = 0xDC,
    /// DRI: Defines the restart interval used in succeeding scans.
    DefineRestartInterval = 0xDD,
    /// DHP: Defines hierarchical progression.
    DefineHierarchicalProgression = 0xDE,
    /// EXP: Expands reference components.
    ExpandReferenceComponents = 0xDF,

    /// APP0: used for the JFIF header.
    ApplicationData0 = 0xE0,
    ApplicationData1 = 0xE1,
    ApplicationData2 = 0xE2,
    ApplicationData3 = 0xE3,
    ApplicationData4 = 0xE4,
    ApplicationData5 = 0xE5,
    ApplicationData6 = 0xE6,
    ApplicationData7 = 0xE7,
    ApplicationData8 = 0xE8,
    ApplicationData9 = 0xE9,
    ApplicationData10 = 0xEA,
    ApplicationData11 = 0xEB,
    ApplicationData12 = 0xEC,
    ApplicationData13 = 0xED,
    /// APP14: used by Adobe to flag the colour transform.
    ApplicationData14 = 0xEE,
    ApplicationData15 = 0xEF,

    /// COM: Comment block.
    Comment = 0xFE,
}

impl JpegMarkerCode {
    pub fn is_restart(self) -> bool {
        let code = u8::from(self);
        (JPEG_RESTART_MARKER_BASE..JPEG_RESTART_MARKER_BASE + JPEG_RESTART_MARKER_RANGE)
            .contains(&code)
    }

    pub fn is_application_data(self) -> bool {
        (0xE0..=0xEF).contains(&u8::from(self))
    }

    /// Every SOFn except baseline; these frames are valid JPEG but not decoded.
    pub fn is_unsupported_frame(self) -> bool {
        matches!(
            self,
            Self::StartOfFrameExtendedSequential
                | Self::StartOfFrameProgressive
                | Self::StartOfFrameLossless
                | Self::StartOfFrameDifferentialSequential
                | Self::StartOfFrameDifferentialProgressive
                | Self::StartOfFrameDifferentialLossless
                | Self::StartOfFrameExtendedSequentialArithmetic
                | Self::StartOfFrameProgressiveArithmetic
                | Self::StartOfFrameLosslessArithmetic
                | Self::StartOfFrameDifferentialSequentialArithmetic
                | Self::StartOfFrameDifferentialProgressiveArithmetic
                | Self::StartOfFrameDifferentialLosslessArithmetic
        )
    }

    /// Full 16-bit marker value as it appears in the stream.
    pub fn to_u16(self) -> u16 {
        0xFF00 | u8::from(self) as u16
    }
}

/// Full 16-bit value of restart marker `n` (taken modulo 8).
pub fn restart_marker(n: u8) -> u16 {
    0xFF00 | (JPEG_RESTART_MARKER_BASE + (n % JPEG_RESTART_MARKER_RANGE)) as u16
}

/// True for a full 16-bit RSTn marker value.
pub fn is_restart_marker(marker: u16) -> bool {
    (marker >> 8) as u8 == JPEG_MARKER_START_BYTE
        && JpegMarkerCode::try_from((marker & 0xFF) as u8).is_ok_and(JpegMarkerCode::is_restart)
}
