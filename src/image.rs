//! In-memory RGB image container.

use alloc::vec::Vec;

use crate::error::BmpError;

/// One pixel: 8-bit red, green and blue, no alpha.
pub type Color = rgb::RGB8;

/// Default fill for freshly allocated images.
pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };

/// Dense row-major RGB image. Row 0 is the top row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    pixels: Vec<Color>,
    width: u32,
    height: u32,
}

impl Image {
    /// Allocate a `width × height` image with every pixel set to `fill`.
    ///
    /// Fails with [`BmpError::DimensionsTooLarge`] when the buffer can't be
    /// allocated.
    pub fn new(width: u32, height: u32, fill: Color) -> Result<Self, BmpError> {
        let count = pixel_count(width, height)?;
        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(count)
            .map_err(|_| BmpError::DimensionsTooLarge { width, height })?;
        pixels.resize(count, fill);
        Ok(Self {
            pixels,
            width,
            height,
        })
    }

    /// Wrap an existing row-major pixel buffer.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Color>) -> Result<Self, BmpError> {
        let count = pixel_count(width, height)?;
        if pixels.len() != count {
            return Err(BmpError::BufferTooSmall {
                needed: count,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            pixels,
            width,
            height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// True when the image has no pixels (either dimension is zero).
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Row `y`, counted from the top.
    ///
    /// # Panics
    ///
    /// If `y >= height`.
    pub fn row(&self, y: u32) -> &[Color] {
        let (start, end) = self.row_bounds(y);
        &self.pixels[start..end]
    }

    /// Mutable row `y`, counted from the top.
    ///
    /// # Panics
    ///
    /// If `y >= height`.
    pub fn row_mut(&mut self, y: u32) -> &mut [Color] {
        let (start, end) = self.row_bounds(y);
        &mut self.pixels[start..end]
    }

    /// Iterate rows top to bottom.
    pub fn rows(&self) -> impl DoubleEndedIterator<Item = &[Color]> + ExactSizeIterator {
        let w = self.width as usize;
        let h = self.height as usize;
        (0..h).map(move |y| &self.pixels[y * w..(y + 1) * w])
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y as usize * self.width as usize + x as usize])
    }

    /// Set one pixel. Returns `false` (and changes nothing) when out of bounds.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.pixels[y as usize * self.width as usize + x as usize] = color;
        true
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<Color> {
        self.pixels
    }

    /// Borrow as an [`imgref::ImgRef`]. `None` for empty images.
    #[cfg(feature = "imgref")]
    pub fn as_imgref(&self) -> Option<imgref::ImgRef<'_, Color>> {
        if self.is_empty() {
            return None;
        }
        Some(imgref::ImgRef::new(
            &self.pixels,
            self.width as usize,
            self.height as usize,
        ))
    }

    fn row_bounds(&self, y: u32) -> (usize, usize) {
        assert!(
            y < self.height,
            "row {y} out of range for height {}",
            self.height
        );
        let w = self.width as usize;
        let start = y as usize * w;
        (start, start + w)
    }
}

/// Fails with [`BmpError::DimensionsTooLarge`] when a dimension exceeds `u32`.
#[cfg(feature = "imgref")]
impl TryFrom<imgref::ImgVec<Color>> for Image {
    type Error = BmpError;

    fn try_from(img: imgref::ImgVec<Color>) -> Result<Self, BmpError> {
        let saturate = |n: usize| u32::try_from(n).unwrap_or(u32::MAX);
        let (Ok(width), Ok(height)) = (u32::try_from(img.width()), u32::try_from(img.height()))
        else {
            return Err(BmpError::DimensionsTooLarge {
                width: saturate(img.width()),
                height: saturate(img.height()),
            });
        };
        let pixels = if img.stride() == img.width() {
            img.into_buf()
        } else {
            img.rows().flat_map(|row| row.iter().copied()).collect()
        };
        Ok(Self {
            pixels,
            width,
            height,
        })
    }
}

fn pixel_count(width: u32, height: u32) -> Result<usize, BmpError> {
    (width as usize)
        .checked_mul(height as usize)
        .ok_or(BmpError::DimensionsTooLarge { width, height })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn new_fills_every_pixel() {
        let red = Color::new(255, 0, 0);
        let img = Image::new(3, 2, red).unwrap();
        assert_eq!(img.pixels().len(), 6);
        assert!(img.pixels().iter().all(|&p| p == red));
    }

    #[test]
    fn rows_are_top_down() {
        let mut img = Image::new(2, 3, BLACK).unwrap();
        img.row_mut(0).fill(Color::new(1, 1, 1));
        img.row_mut(2).fill(Color::new(3, 3, 3));
        let rows: Vec<&[Color]> = img.rows().collect();
        assert_eq!(rows[0], &[Color::new(1, 1, 1); 2]);
        assert_eq!(rows[1], &[BLACK; 2]);
        assert_eq!(rows[2], &[Color::new(3, 3, 3); 2]);
    }

    #[test]
    fn pixel_access_is_bounds_checked() {
        let mut img = Image::new(2, 2, BLACK).unwrap();
        assert!(img.set_pixel(1, 1, Color::new(9, 8, 7)));
        assert!(!img.set_pixel(2, 0, Color::new(9, 8, 7)));
        assert_eq!(img.pixel(1, 1), Some(Color::new(9, 8, 7)));
        assert_eq!(img.pixel(0, 2), None);
    }

    #[test]
    fn from_pixels_rejects_wrong_length() {
        let err = Image::from_pixels(2, 2, vec![BLACK; 3]).unwrap_err();
        assert!(matches!(
            err,
            BmpError::BufferTooSmall {
                needed: 4,
                actual: 3
            }
        ));
    }

    #[test]
    fn zero_sized_images_are_empty() {
        let img = Image::new(0, 5, BLACK).unwrap();
        assert!(img.is_empty());
        assert_eq!(img.row(4), &[] as &[Color]);
        assert_eq!(img.rows().count(), 5);
    }

    #[test]
    fn unallocatable_image_is_an_error() {
        // ~2^62 pixels of 3 bytes overflows isize, so the reservation always fails.
        let err = Image::new(i32::MAX as u32, i32::MAX as u32, BLACK).unwrap_err();
        assert!(matches!(err, BmpError::DimensionsTooLarge { .. }));
    }

    #[test]
    #[should_panic]
    fn row_out_of_range_panics() {
        let img = Image::new(1, 1, BLACK).unwrap();
        let _ = img.row(1);
    }

    #[cfg(feature = "imgref")]
    #[test]
    fn imgref_interop() {
        let pixels: Vec<Color> = (0..6u8).map(|i| Color::new(i, i, i)).collect();
        let vec = imgref::ImgVec::new(pixels.clone(), 3, 2);
        let img = Image::try_from(vec).unwrap();
        assert_eq!(img.pixels(), &pixels[..]);
        let view = img.as_imgref().unwrap();
        assert_eq!(view.width(), 3);
        assert_eq!(view.height(), 2);
        assert!(Image::new(0, 0, BLACK).unwrap().as_imgref().is_none());
    }
}
