//! Indexed-color frames and the animation they form.
//!
//! Frames are plain rasters of palette indices; turning them into a file
//! (GIF or otherwise) is left to whoever consumes the [`Animation`].

use crate::error::{Error, Result};

/// Up to 256 RGB colors addressed by pixel index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<[u8; 3]>,
}

impl Palette {
    /// Builds a palette from 1..=256 colors.
    pub fn new(colors: Vec<[u8; 3]>) -> Result<Self> {
        if colors.is_empty() || colors.len() > 256 {
            return Err(Error::InvalidPalette(colors.len()));
        }
        Ok(Self { colors })
    }

    /// Dark-to-cyan ramp: index `i` maps to `(0, i / 2, i)`.
    pub fn ocean() -> Self {
        Self {
            colors: (0..=255u8).map(|i| [0, i / 2, i]).collect(),
        }
    }

    /// Index `i` maps to `(i, i, i)`.
    pub fn grayscale() -> Self {
        Self {
            colors: (0..=255u8).map(|i| [i, i, i]).collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Color of a pixel index; indices past the end clamp to the last entry.
    #[inline]
    pub fn color(&self, index: u8) -> [u8; 3] {
        let last = self.colors.len() - 1;
        self.colors[(index as usize).min(last)]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::ocean()
    }
}

/// One sampled snapshot of the field. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    width: usize,
    height: usize,
    step: usize,
    delay: u16,
    pixels: Vec<u8>,
}

impl Frame {
    /// Wraps a `width`×`height` raster sampled at `step`, rows contiguous.
    pub fn new(width: usize, height: usize, step: usize, delay: u16, pixels: Vec<u8>) -> Result<Self> {
        if pixels.len() != width * height {
            return Err(Error::LengthMismatch {
                expected: width * height,
                got: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            step,
            delay,
            pixels,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Simulation step this frame was sampled after.
    #[inline]
    pub fn step(&self) -> usize {
        self.step
    }

    /// Display delay in hundredths of a second.
    #[inline]
    pub fn delay(&self) -> u16 {
        self.delay
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Pixel index at (x, y), `None` outside the raster.
    pub fn pixel(&self, x: usize, y: usize) -> Option<u8> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    /// Count of each pixel index.
    pub fn histogram(&self) -> [usize; 256] {
        let mut counts = [0usize; 256];
        for &p in &self.pixels {
            counts[p as usize] += 1;
        }
        counts
    }
}

/// Ordered frames plus the palette they index into.
#[derive(Clone, Debug, Default)]
pub struct Animation {
    palette: Palette,
    frames: Vec<Frame>,
}

impl Animation {
    pub fn new(palette: Palette, frames: Vec<Frame>) -> Self {
        Self { palette, frames }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Per-frame display delays, in frame order.
    pub fn delays(&self) -> Vec<u16> {
        self.frames.iter().map(Frame::delay).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Frame> {
        self.frames.iter()
    }

    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }
}

impl<'a> IntoIterator for &'a Animation {
    type Item = &'a Frame;
    type IntoIter = std::slice::Iter<'a, Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}
