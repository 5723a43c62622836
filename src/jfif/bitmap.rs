//! Output raster: a complete 24-bit BMP file image.
//!
//! Pixel rows are stored bottom-up, BGR interleaved and padded to four bytes.

use byteorder::{ByteOrder, LittleEndian};

use crate::constants::{
    BMP_BITS_PER_PIXEL, BMP_FILE_HEADER_SIZE, BMP_HEADER_SIZE, BMP_INFO_HEADER_SIZE,
    BMP_SIGNATURE, BYTES_PER_PIXEL,
};
use crate::error::JfifError;
use crate::jfif::color::RgbMcu;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: usize,
    height: usize,
    row_stride: usize,
    data: Vec<u8>,
}

impl Bitmap {
    /// Allocates a zeroed raster with its file header already written.
    pub fn new(width: u16, height: u16) -> Result<Self, JfifError> {
        let file_size = Self::file_size(width, height)?;
        let (width, height) = (width as usize, height as usize);
        let row_stride = Self::padded_row_bytes(width);
        let total = file_size as usize;

        let mut data = Vec::new();
        data.try_reserve_exact(total)?;
        data.resize(total, 0);

        let mut bitmap = Self {
            width,
            height,
            row_stride,
            data,
        };
        bitmap.write_header(file_size);
        Ok(bitmap)
    }

    /// Size of the whole BMP file; fails when the 32-bit size field cannot hold it.
    pub fn file_size(width: u16, height: u16) -> Result<u32, JfifError> {
        Self::padded_row_bytes(width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_add(BMP_HEADER_SIZE))
            .and_then(|total| u32::try_from(total).ok())
            .ok_or(JfifError::BitmapTooLarge { width, height })
    }

    /// Row size in bytes rounded up to a multiple of four.
    pub fn padded_row_bytes(width: usize) -> usize {
        (width * BYTES_PER_PIXEL).div_ceil(4) * 4
    }

    fn write_header(&mut self, file_size: u32) {
        let header = &mut self.data[..BMP_HEADER_SIZE];

        header[0..2].copy_from_slice(BMP_SIGNATURE);
        LittleEndian::write_u32(&mut header[2..6], file_size);
        // 6..10 reserved
        LittleEndian::write_u32(&mut header[10..14], BMP_HEADER_SIZE as u32);

        let info = &mut header[BMP_FILE_HEADER_SIZE..];
        LittleEndian::write_u32(&mut info[0..4], BMP_INFO_HEADER_SIZE as u32);
        LittleEndian::write_i32(&mut info[4..8], self.width as i32);
        LittleEndian::write_i32(&mut info[8..12], self.height as i32);
        LittleEndian::write_u16(&mut info[12..14], 1);
        LittleEndian::write_u16(&mut info[14..16], BMP_BITS_PER_PIXEL);
        // compression, image size, resolution and palette fields stay zero
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn row_stride(&self) -> usize {
        self.row_stride
    }

    fn offset(&self, x: usize, y: usize) -> usize {
        let flipped = self.height - y - 1;
        BMP_HEADER_SIZE + flipped * self.row_stride + x * BYTES_PER_PIXEL
    }

    /// Writes the pixel at (x, y), y counted from the top of the image.
    pub fn set_pixel(&mut self, x: usize, y: usize, [r, g, b]: [u8; 3]) {
        let offset = self.offset(x, y);
        self.data[offset..offset + BYTES_PER_PIXEL].copy_from_slice(&[b, g, r]);
    }

    /// RGB value at (x, y), y counted from the top of the image.
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let offset = self.offset(x, y);
        let bgr = &self.data[offset..offset + BYTES_PER_PIXEL];
        [bgr[2], bgr[1], bgr[0]]
    }

    /// Copies an MCU whose top-left pixel lands at (x0, y0), dropping the part outside the image.
    pub fn put_mcu(&mut self, mcu: &RgbMcu, x0: usize, y0: usize) {
        let rows = mcu.height().min(self.height.saturating_sub(y0));
        let cols = mcu.width().min(self.width.saturating_sub(x0));
        for y in 0..rows {
            for x in 0..cols {
                self.set_pixel(x0 + x, y0 + y, mcu.pixel(x, y));
            }
        }
    }

    pub fn pixel_data(&self) -> &[u8] {
        &self.data[BMP_HEADER_SIZE..]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}
