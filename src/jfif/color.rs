//! YCbCr to RGB conversion with chroma upsampling for one MCU.

use crate::constants::{
    BLOCK_DIM, BLOCK_SIZE, CB_TO_B, CB_TO_G, COLOR_SCALE_BITS, CR_TO_G, CR_TO_R, FIX_CB_TO_B,
    FIX_CB_TO_G, FIX_CR_TO_G, FIX_CR_TO_R, MCU_DIM,
};
use crate::error::JfifError;

/// Arithmetic used for the colour transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMath {
    FixedPoint,
    FloatingPoint,
}

impl ColorMath {
    pub fn ycc_to_rgb(self, y: i32, cb: i32, cr: i32) -> [u8; 3] {
        let cb = cb - 128;
        let cr = cr - 128;
        match self {
            ColorMath::FixedPoint => {
                let y = y << COLOR_SCALE_BITS;
                [
                    descale(y + FIX_CR_TO_R * cr),
                    descale(y - FIX_CB_TO_G * cb - FIX_CR_TO_G * cr),
                    descale(y + FIX_CB_TO_B * cb),
                ]
            }
            ColorMath::FloatingPoint => {
                let (y, cb, cr) = (y as f64, cb as f64, cr as f64);
                [
                    clip_f64(y + CR_TO_R * cr),
                    clip_f64(y - CB_TO_G * cb - CR_TO_G * cr),
                    clip_f64(y + CB_TO_B * cb),
                ]
            }
        }
    }
}

// Drop the fraction, rounding up when its top bit is set.
fn descale(v: i32) -> u8 {
    let half = 1 << (COLOR_SCALE_BITS - 1);
    clip((v >> COLOR_SCALE_BITS) + ((v & half) != 0) as i32)
}

fn clip_f64(v: f64) -> u8 {
    (v + 0.5).floor().clamp(0.0, 255.0) as u8
}

pub fn clip(v: i32) -> u8 {
    v.clamp(0, 255) as u8
}

/// RGB pixels of one MCU, row-major over a 16x16 area.
///
/// Only the top-left `8H x 8V` region is meaningful.
#[derive(Debug, Clone)]
pub struct RgbMcu {
    pixels: [[u8; 3]; MCU_DIM * MCU_DIM],
    width: usize,
    height: usize,
}

impl RgbMcu {
    pub fn new(h: usize, v: usize) -> Self {
        Self {
            pixels: [[0; 3]; MCU_DIM * MCU_DIM],
            width: BLOCK_SIZE * h,
            height: BLOCK_SIZE * v,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        self.pixels[y * MCU_DIM + x]
    }

    fn set(&mut self, x: usize, y: usize, rgb: [u8; 3]) {
        self.pixels[y * MCU_DIM + x] = rgb;
    }
}

/// Offset (row, column) of luma block `index` inside the MCU.
pub fn luma_block_origin(index: usize, h: usize, v: usize) -> (usize, usize) {
    let div = index >> 1;
    let rem = index & 1;
    if h == 1 && v == 2 {
        (BLOCK_SIZE * rem, 0)
    } else {
        (BLOCK_SIZE * div, BLOCK_SIZE * rem)
    }
}

pub struct ColorConverter {
    math: ColorMath,
    is_rgb: bool,
}

impl ColorConverter {
    pub fn new(math: ColorMath, is_rgb: bool) -> Self {
        Self { math, is_rgb }
    }

    /// Converts the spatial-domain blocks of a three component MCU.
    ///
    /// `blocks` holds `h * v` luma blocks followed by Cb and Cr.
    pub fn convert(
        &self,
        blocks: &[[i32; BLOCK_DIM]],
        h: usize,
        v: usize,
        out: &mut RgbMcu,
    ) -> Result<(), JfifError> {
        let luma_count = h * v;
        if blocks.len() != luma_count + 2 {
            return Err(JfifError::ColorConversionComponents(
                blocks.len().saturating_sub(luma_count) + 1,
            ));
        }
        let cb_block = &blocks[luma_count];
        let cr_block = &blocks[luma_count + 1];

        for (index, luma) in blocks[..luma_count].iter().enumerate() {
            let (row0, col0) = luma_block_origin(index, h, v);
            for r in 0..BLOCK_SIZE {
                for c in 0..BLOCK_SIZE {
                    let row = row0 + r;
                    let col = col0 + c;
                    let chroma = (row / v) * BLOCK_SIZE + col / h;
                    let y = luma[r * BLOCK_SIZE + c];
                    let cb = cb_block[chroma];
                    let cr = cr_block[chroma];
                    let rgb = if self.is_rgb {
                        [clip(y), clip(cb), clip(cr)]
                    } else {
                        self.math.ycc_to_rgb(y, cb, cr)
                    };
                    out.set(col, row, rgb);
                }
            }
        }
        Ok(())
    }

    /// Grayscale MCU: a single luma block replicated into all three channels.
    pub fn from_luma(&self, block: &[i32; BLOCK_DIM], out: &mut RgbMcu) {
        for r in 0..BLOCK_SIZE {
            for c in 0..BLOCK_SIZE {
                let y = clip(block[r * BLOCK_SIZE + c]);
                out.set(c, r, [y, y, y]);
            }
        }
    }
}
