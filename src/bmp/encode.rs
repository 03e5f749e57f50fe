//! BMP encoder: uncompressed 24-bit, bottom-up rows.

use alloc::vec::Vec;
use enough::Stop;

use super::header::{BmpInfo, BmpProfile, row_stride};
use super::try_zeroed;
use crate::error::BmpError;
use crate::image::{Color, Image};

/// Write one logical row into `out` as BGR triples followed by zero padding.
///
/// `out` must be exactly `row_stride(row.len())` bytes.
pub(crate) fn encode_row(row: &[Color], out: &mut [u8]) {
    let (color_bytes, padding) = out.split_at_mut(row.len() * 3);
    for (px, dst) in row.iter().zip(color_bytes.chunks_exact_mut(3)) {
        dst[0] = px.b;
        dst[1] = px.g;
        dst[2] = px.r;
    }
    padding.fill(0);
}

/// Headers plus a zeroed one-row scratch buffer for `image`.
///
/// The buffer is empty when the image has no rows.
pub(crate) fn prepare(
    image: &Image,
    profile: &BmpProfile,
) -> Result<(BmpInfo, Vec<u8>), BmpError> {
    let (width, height) = (image.width(), image.height());
    let info = BmpInfo::for_dimensions(width, height, profile)?;
    if height == 0 {
        return Ok((info, Vec::new()));
    }
    // With at least one row, image_size (a u32) bounds the stride.
    let stride = usize::try_from(row_stride(width))
        .map_err(|_| BmpError::DimensionsTooLarge { width, height })?;
    let row_buf = try_zeroed(stride, width, height)?;
    Ok((info, row_buf))
}

/// Encode `image` into a complete BMP file in memory.
pub(crate) fn encode_bmp(
    image: &Image,
    profile: &BmpProfile,
    stop: &dyn Stop,
) -> Result<Vec<u8>, BmpError> {
    let (info, mut row_buf) = prepare(image, profile)?;
    stop.check()?;

    let file_size = info.file.file_size as usize;
    let mut out = Vec::new();
    out.try_reserve_exact(file_size)
        .map_err(|_| BmpError::DimensionsTooLarge {
            width: image.width(),
            height: image.height(),
        })?;
    out.extend_from_slice(&info.to_bytes());

    for (i, row) in image.rows().rev().enumerate() {
        if i % 16 == 0 {
            stop.check()?;
        }
        encode_row(row, &mut row_buf);
        out.extend_from_slice(&row_buf);
    }

    debug_assert_eq!(out.len(), file_size);
    log::debug!(
        "encoded {}x{} BMP ({} bytes)",
        image.width(),
        image.height(),
        out.len()
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::BLACK;
    use enough::Unstoppable;

    #[test]
    fn row_is_bgr_and_padded() {
        let row = [Color::new(1, 2, 3), Color::new(4, 5, 6)];
        let mut out = [0xAAu8; 8];
        encode_row(&row, &mut out);
        assert_eq!(out, [3, 2, 1, 6, 5, 4, 0, 0]);
    }

    #[test]
    fn aligned_row_has_no_padding() {
        let row = [Color::new(10, 20, 30); 4];
        let mut out = [0u8; 12];
        encode_row(&row, &mut out);
        assert_eq!(&out[..3], &[30, 20, 10]);
        assert_eq!(&out[9..], &[30, 20, 10]);
    }

    #[test]
    fn two_by_two_black_is_70_bytes() {
        let img = Image::new(2, 2, BLACK).unwrap();
        let out = encode_bmp(&img, &BmpProfile::LEGACY, &Unstoppable).unwrap();
        assert_eq!(out.len(), 70);
        assert_eq!(&out[0..2], b"BM");
        assert_eq!(&out[50..54], &0x0100_0000u32.to_le_bytes());
        assert!(out[54..].iter().all(|&b| b == 0));
    }

    #[test]
    fn empty_image_is_header_only() {
        let img = Image::new(0, 3, BLACK).unwrap();
        let out = encode_bmp(&img, &BmpProfile::LEGACY, &Unstoppable).unwrap();
        assert_eq!(out.len(), 54);
        assert_eq!(u32::from_le_bytes(out[34..38].try_into().unwrap()), 0);
    }

    #[test]
    fn zero_height_skips_row_buffer() {
        let img = Image::new(u32::MAX, 0, BLACK).unwrap();
        let (info, row_buf) = prepare(&img, &BmpProfile::LEGACY).unwrap();
        assert!(row_buf.is_empty());
        assert_eq!(info.info.image_size, 0);

        let out = encode_bmp(&img, &BmpProfile::LEGACY, &Unstoppable).unwrap();
        assert_eq!(out.len(), 54);
        assert_eq!(u32::from_le_bytes(out[18..22].try_into().unwrap()), u32::MAX);
        assert_eq!(u32::from_le_bytes(out[2..6].try_into().unwrap()), 54);
    }

    #[test]
    fn last_logical_row_written_first() {
        let mut img = Image::new(1, 2, BLACK).unwrap();
        img.row_mut(0)[0] = Color::new(255, 0, 0);
        img.row_mut(1)[0] = Color::new(0, 0, 255);
        let out = encode_bmp(&img, &BmpProfile::LEGACY, &Unstoppable).unwrap();
        assert_eq!(&out[54..58], &[255, 0, 0, 0]); // blue, BGR
        assert_eq!(&out[58..62], &[0, 0, 255, 0]); // red, BGR
    }
}
