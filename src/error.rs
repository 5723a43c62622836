use thiserror::Error;

/// Coarse failure class reported across the crate boundary.
///
/// The discriminants double as the process exit codes of the `jfif` binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCode {
    FileError = 1,
    UserInputError = 2,
    FormatError = 3,
    MemoryError = 4,
    UnsupportedError = 5,
}

impl ErrorCode {
    pub fn exit_code(self) -> u8 {
        self as u8
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JfifError {
    // Caller side (file handling and command line)
    #[error("File error: {0}")]
    File(String),
    #[error("Invalid user input: {0}")]
    UserInput(String),

    // Allocation
    #[error("Not enough memory")]
    NotEnoughMemory,
    #[error("Image {width}x{height} does not fit in a BMP file")]
    BitmapTooLarge { width: u16, height: u16 },

    // Header section
    #[error("Expected SOI marker not found, input is not a JFIF/JPEG file")]
    StartOfImageMarkerNotFound,
    #[error("Duplicate start of image marker")]
    DuplicateStartOfImageMarker,
    #[error("Duplicate start of frame marker")]
    DuplicateStartOfFrameMarker,
    #[error("Unrecognised or unsupported marker 0x{marker:04x} at offset 0x{offset:08x}")]
    UnknownJpegMarkerFound { marker: u16, offset: usize },
    #[error("Unexpected marker 0x{marker:04x} while parsing header at offset 0x{offset:08x}")]
    UnexpectedHeaderMarker { marker: u16, offset: usize },
    #[error("Invalid marker segment size at offset 0x{0:08x}")]
    InvalidMarkerSegmentSize(usize),
    #[error("Unexpected end of data")]
    UnexpectedEndOfData,
    #[error("Unrecognised APP0 segment")]
    InvalidApp0Segment,
    #[error("Unrecognised APP14 segment")]
    InvalidApp14Segment,
    #[error("Unsupported APP14 colour space {0}")]
    UnsupportedAdobeColorSpace(u8),
    #[error("Invalid quantisation table destination {0}")]
    InvalidQuantizationTableId(u8),
    #[error("Invalid quantisation table precision {0}")]
    InvalidQuantizationTablePrecision(u8),
    #[error("Invalid Huffman table class {0}")]
    InvalidHuffmanTableClass(u8),
    #[error("Unsupported Huffman table destination {0}")]
    UnsupportedHuffmanTableId(u8),
    #[error("Invalid Huffman table definition")]
    InvalidHuffmanTable,
    #[error("Invalid frame dimensions {width}x{height}")]
    InvalidFrameDimensions { width: u16, height: u16 },
    #[error("Invalid component count {0}")]
    InvalidComponentCount(u8),
    #[error("Unsupported sample precision {0}")]
    UnsupportedPrecision(u8),
    #[error("Unsupported sub-sampling detected")]
    UnsupportedSubsampling,
    #[error("Unsupported SOF marker 0x{0:04x}, only baseline (SOF0) allowed")]
    UnsupportedFrameType(u16),
    #[error("Start of scan before start of frame")]
    MissingFrameHeader,
    #[error("Unsupported number of components in scan {0}")]
    UnsupportedScanComponentCount(u8),
    #[error("Unknown component ID {0} in scan")]
    UnknownComponentId(u8),
    #[error("Huffman table (class {class}, destination {id}) referenced but not defined")]
    MissingHuffmanTable { class: u8, id: u8 },
    #[error("Quantisation table {0} referenced but not defined")]
    MissingQuantizationTable(u8),
    #[error("Unexpected values at end of SOS header (Ss={ss}, Se={se}, Ah/Al=0x{ah_al:02x})")]
    InvalidScanTail { ss: u8, se: u8, ah_al: u8 },

    // Scan section
    #[error("Huffman lookup failure")]
    HuffmanLookupFailed,
    #[error("Invalid coefficient magnitude category {0}")]
    InvalidCoefficientCategory(u8),
    #[error("Run length moves past the last coefficient")]
    CoefficientIndexOutOfRange,
    #[error("Got marker 0x{0:04x} in the middle of block data")]
    MarkerInBlockData(u16),
    #[error("Unexpected marker 0x{0:04x} in scan data")]
    UnexpectedMarkerInScan(u16),
    #[error("Unexpected RSTn marker sequence (got 0x{found:04x}, expected 0x{expected:04x})")]
    RestartMarkerSequence { expected: u16, found: u16 },
    #[error("Unexpected restart marker 0x{0:04x}")]
    UnexpectedRestartMarker(u16),
    #[error("Restart marker not found")]
    RestartMarkerNotFound,
    #[error("Colour conversion called on a scan with {0} components")]
    ColorConversionComponents(usize),
}

impl JfifError {
    pub fn code(&self) -> ErrorCode {
        match self {
            JfifError::File(_) => ErrorCode::FileError,
            JfifError::UserInput(_) => ErrorCode::UserInputError,
            JfifError::NotEnoughMemory => ErrorCode::MemoryError,
            JfifError::BitmapTooLarge { .. }
            | JfifError::UnsupportedAdobeColorSpace(_)
            | JfifError::UnsupportedHuffmanTableId(_)
            | JfifError::UnsupportedPrecision(_)
            | JfifError::UnsupportedSubsampling
            | JfifError::UnsupportedFrameType(_)
            | JfifError::UnsupportedScanComponentCount(_) => ErrorCode::UnsupportedError,
            _ => ErrorCode::FormatError,
        }
    }
}

impl From<std::collections::TryReserveError> for JfifError {
    fn from(_: std::collections::TryReserveError) -> Self {
        JfifError::NotEnoughMemory
    }
}
