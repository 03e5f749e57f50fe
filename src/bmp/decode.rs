//! BMP decoder for uncompressed 24-bit bottom-up files.

use enough::Stop;

use super::header::{BmpInfo, BmpProfile, row_stride};
use super::try_zeroed;
use crate::error::BmpError;
use crate::image::{BLACK, Color, Image};

// ── Permissiveness ──────────────────────────────────────────────────

/// Controls how strictly the decoder validates input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Permissiveness {
    /// Every header field must hold the value this codec writes, the size
    /// fields must agree with the dimensions and the input length must
    /// equal the declared file size.
    Strict,

    /// Default. Structural fields (magic, planes, depth, compression,
    /// info header size, pixel offset) are checked. Size fields are
    /// trusted but not used: the pixel area is recomputed from the
    /// dimensions. Truncated pixel data is an error.
    #[default]
    Standard,

    /// Accept as much as possible. Missing pixel bytes decode as black
    /// and are reported through [`crate::DecodeOutput::is_truncated`].
    /// Planes, info header size and a too-small pixel offset are ignored.
    Permissive,
}

// ── Cursor for reading from &[u8] ───────────────────────────────────

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
    /// When true, reads beyond EOF return zeros instead of errors.
    permissive: bool,
    /// Bytes that were zero-filled because the input ended early.
    missing: u64,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8], permissive: bool) -> Self {
        Self {
            data,
            pos: 0,
            permissive,
            missing: 0,
        }
    }

    fn set_position(&mut self, pos: usize) -> Result<(), BmpError> {
        if pos > self.data.len() {
            if self.permissive {
                self.pos = self.data.len();
                return Ok(());
            }
            return Err(BmpError::UnexpectedEof);
        }
        self.pos = pos;
        Ok(())
    }

    fn read_exact_bytes(&mut self, buf: &mut [u8]) -> Result<(), BmpError> {
        let n = buf.len();
        let available = self.data.len().saturating_sub(self.pos);
        if n > available {
            if self.permissive {
                buf[..available].copy_from_slice(&self.data[self.pos..]);
                buf[available..].fill(0);
                self.missing += (n - available) as u64;
                self.pos = self.data.len();
                return Ok(());
            }
            return Err(BmpError::UnexpectedEof);
        }
        buf.copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(())
    }
}

// ── Header validation ───────────────────────────────────────────────

/// Location of the pixel rows within the file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PixelArea {
    pub offset: usize,
    pub stride: usize,
    pub len: usize,
}

impl PixelArea {
    /// Offset one past the last pixel byte.
    pub fn end(&self) -> usize {
        self.offset + self.len
    }
}

/// Validate parsed headers and locate the pixel area.
///
/// Input length checks happen in [`decode_pixels`].
pub(crate) fn validate(
    header: &BmpInfo,
    permissiveness: Permissiveness,
) -> Result<PixelArea, BmpError> {
    let is_strict = permissiveness == Permissiveness::Strict;
    let is_permissive = permissiveness == Permissiveness::Permissive;
    let file = &header.file;
    let info = &header.info;
    let (width, height) = (info.width, info.height);

    if file.magic != BmpProfile::MAGIC {
        return Err(BmpError::UnrecognizedFormat);
    }

    if is_strict && file.reserved != 0 {
        return Err(BmpError::InvalidHeader(alloc::format!(
            "reserved field is {:#x}, expected 0",
            file.reserved
        )));
    }

    match info.header_size {
        BmpProfile::INFO_HEADER_SIZE => {}
        n if is_permissive => {
            log::warn!("ignoring BMP info header size {n}");
        }
        n if !is_strict && n > BmpProfile::INFO_HEADER_SIZE => {
            // Later header versions extend BITMAPINFOHEADER; the extra fields are skipped.
        }
        n => {
            return Err(BmpError::UnsupportedVariant(alloc::format!(
                "info header size {n} (only BITMAPINFOHEADER is supported)"
            )));
        }
    }

    if !is_permissive && info.planes != BmpProfile::PLANES {
        return Err(BmpError::InvalidHeader(alloc::format!(
            "planes field is {}, expected 1",
            info.planes
        )));
    }

    if info.bits_per_pixel != BmpProfile::BITS_PER_PIXEL {
        return Err(BmpError::UnsupportedVariant(alloc::format!(
            "{} bits per pixel (only 24 is supported)",
            info.bits_per_pixel
        )));
    }

    if info.compression != BmpProfile::COMPRESSION_NONE {
        return Err(BmpError::UnsupportedVariant(alloc::format!(
            "compression method {} (only uncompressed is supported)",
            info.compression
        )));
    }

    // Negative heights (as i32) mean top-down row order.
    if height > i32::MAX as u32 {
        return Err(BmpError::UnsupportedVariant(alloc::format!(
            "top-down row order (height {})",
            height as i32
        )));
    }
    if width > i32::MAX as u32 {
        return Err(BmpError::DimensionsTooLarge { width, height });
    }

    let stride = row_stride(width);
    let len = stride
        .checked_mul(u64::from(height))
        .ok_or(BmpError::DimensionsTooLarge { width, height })?;

    let expected_image_size = len;
    let expected_file_size = len + u64::from(BmpProfile::PIXEL_DATA_OFFSET);
    if u64::from(info.image_size) != expected_image_size
        || u64::from(file.file_size) != expected_file_size
    {
        if is_strict {
            return Err(BmpError::InvalidHeader(alloc::format!(
                "size fields (file {}, image {}) don't match {width}x{height} \
                 (expected file {expected_file_size}, image {expected_image_size})",
                file.file_size,
                info.image_size
            )));
        }
        log::warn!(
            "BMP size fields (file {}, image {}) disagree with {width}x{height}; using dimensions",
            file.file_size,
            info.image_size
        );
    }

    let min_offset = BmpProfile::FILE_HEADER_SIZE.saturating_add(info.header_size.max(40));
    let offset = if is_strict {
        if file.pixel_data_offset != BmpProfile::PIXEL_DATA_OFFSET {
            return Err(BmpError::InvalidHeader(alloc::format!(
                "pixel data offset {}, expected 54",
                file.pixel_data_offset
            )));
        }
        file.pixel_data_offset
    } else if file.pixel_data_offset < BmpProfile::PIXEL_DATA_OFFSET
        || (!is_permissive && file.pixel_data_offset < min_offset)
    {
        if !is_permissive {
            return Err(BmpError::InvalidHeader(alloc::format!(
                "pixel data offset {} overlaps the headers",
                file.pixel_data_offset
            )));
        }
        log::warn!(
            "BMP pixel data offset {} overlaps the headers; reading at 54",
            file.pixel_data_offset
        );
        BmpProfile::PIXEL_DATA_OFFSET
    } else {
        file.pixel_data_offset
    };

    let too_large = || BmpError::DimensionsTooLarge { width, height };
    // Without rows the stride is never used and may not fit usize.
    let stride = if height == 0 {
        0
    } else {
        usize::try_from(stride).map_err(|_| too_large())?
    };
    let len = usize::try_from(len).map_err(|_| too_large())?;
    let offset = offset as usize;
    offset.checked_add(len).ok_or_else(too_large)?;

    Ok(PixelArea {
        offset,
        stride,
        len,
    })
}

// ── Pixel decode ────────────────────────────────────────────────────

/// Decode the pixel rows of `data` into a new image.
///
/// Returns the image and the number of pixel bytes that were missing from
/// the input (always 0 unless `permissiveness` is `Permissive`).
pub(crate) fn decode_pixels(
    data: &[u8],
    header: &BmpInfo,
    area: &PixelArea,
    permissiveness: Permissiveness,
    stop: &dyn Stop,
) -> Result<(Image, u64), BmpError> {
    let is_permissive = permissiveness == Permissiveness::Permissive;

    if permissiveness == Permissiveness::Strict && data.len() != header.file.file_size as usize {
        return Err(BmpError::InvalidHeader(alloc::format!(
            "file size field ({}) doesn't match actual size ({})",
            header.file.file_size,
            data.len()
        )));
    }
    if !is_permissive && data.len() < area.end() {
        return Err(BmpError::UnexpectedEof);
    }

    let width = header.width();
    let height = header.height();
    let mut image = Image::new(width, height, BLACK)?;
    if height == 0 {
        return Ok((image, 0));
    }

    let mut bytes = Cursor::new(data, is_permissive);
    bytes.set_position(area.offset)?;

    let mut row_buf = try_zeroed(area.stride, width, height)?;
    // Disk rows run bottom to top: disk row 0 is logical row height-1.
    for (disk_row, y) in (0..height).rev().enumerate() {
        if disk_row % 16 == 0 {
            stop.check()?;
        }
        bytes.read_exact_bytes(&mut row_buf)?;
        decode_row(&row_buf, image.row_mut(y));
    }

    if bytes.missing > 0 {
        log::warn!(
            "BMP pixel data truncated: {} of {} bytes missing, filled with black",
            bytes.missing,
            area.len
        );
    }

    Ok((image, bytes.missing))
}

/// Read BGR triples from one disk row into `out`, ignoring padding.
pub(crate) fn decode_row(row: &[u8], out: &mut [Color]) {
    for (px, src) in out.iter_mut().zip(row.chunks_exact(3)) {
        *px = Color {
            r: src[2],
            g: src[1],
            b: src[0],
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use enough::Unstoppable;

    fn header(width: u32, height: u32) -> BmpInfo {
        BmpInfo::for_dimensions(width, height, &BmpProfile::LEGACY).unwrap()
    }

    #[test]
    fn decode_row_swaps_channels() {
        let mut out = [BLACK; 2];
        decode_row(&[3, 2, 1, 6, 5, 4, 0xFF, 0xFF], &mut out);
        assert_eq!(out, [Color::new(1, 2, 3), Color::new(4, 5, 6)]);
    }

    #[test]
    fn cursor_zero_fills_when_permissive() {
        let data = [1u8, 2, 3];
        let mut c = Cursor::new(&data, true);
        let mut buf = [0xEEu8; 5];
        c.read_exact_bytes(&mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3, 0, 0]);
        assert_eq!(c.missing, 2);

        let mut strict = Cursor::new(&data, false);
        assert!(matches!(
            strict.read_exact_bytes(&mut buf),
            Err(BmpError::UnexpectedEof)
        ));
    }

    #[test]
    fn validate_locates_pixel_area() {
        let area = validate(&header(5, 3), Permissiveness::Standard).unwrap();
        assert_eq!(
            area,
            PixelArea {
                offset: 54,
                stride: 16,
                len: 48
            }
        );
    }

    #[test]
    fn bad_magic_rejected_in_every_mode() {
        let mut h = header(1, 1);
        h.file.magic = *b"BA";
        for p in [
            Permissiveness::Strict,
            Permissiveness::Standard,
            Permissiveness::Permissive,
        ] {
            assert!(matches!(validate(&h, p), Err(BmpError::UnrecognizedFormat)));
        }
    }

    #[test]
    fn unsupported_variants_rejected() {
        let mut h = header(1, 1);
        h.info.bits_per_pixel = 32;
        assert!(matches!(
            validate(&h, Permissiveness::Permissive),
            Err(BmpError::UnsupportedVariant(_))
        ));

        let mut h = header(1, 1);
        h.info.compression = 1;
        assert!(matches!(
            validate(&h, Permissiveness::Permissive),
            Err(BmpError::UnsupportedVariant(_))
        ));

        let mut h = header(1, 1);
        h.info.height = (-1i32) as u32;
        assert!(matches!(
            validate(&h, Permissiveness::Standard),
            Err(BmpError::UnsupportedVariant(_))
        ));
    }

    #[test]
    fn planes_checked_unless_permissive() {
        let mut h = header(2, 2);
        h.info.planes = 3;
        assert!(matches!(
            validate(&h, Permissiveness::Standard),
            Err(BmpError::InvalidHeader(_))
        ));
        assert!(validate(&h, Permissiveness::Permissive).is_ok());
    }

    #[test]
    fn size_fields_only_checked_in_strict() {
        let mut h = header(2, 2);
        h.info.image_size = 0;
        h.file.file_size = 0;
        assert!(validate(&h, Permissiveness::Standard).is_ok());
        assert!(matches!(
            validate(&h, Permissiveness::Strict),
            Err(BmpError::InvalidHeader(_))
        ));
    }

    #[test]
    fn pixel_offset_handling() {
        let mut h = header(1, 1);
        h.file.pixel_data_offset = 60;
        assert_eq!(validate(&h, Permissiveness::Standard).unwrap().offset, 60);
        assert!(validate(&h, Permissiveness::Strict).is_err());

        h.file.pixel_data_offset = 20;
        assert!(validate(&h, Permissiveness::Standard).is_err());
        assert_eq!(validate(&h, Permissiveness::Permissive).unwrap().offset, 54);
    }

    #[test]
    fn larger_info_header_needs_matching_offset() {
        let mut h = header(1, 1);
        h.info.header_size = 108;
        assert!(validate(&h, Permissiveness::Strict).is_err());
        assert!(validate(&h, Permissiveness::Standard).is_err());
        h.file.pixel_data_offset = 122;
        assert_eq!(validate(&h, Permissiveness::Standard).unwrap().offset, 122);
    }

    #[test]
    fn first_disk_row_lands_on_bottom_row() {
        let h = header(1, 2);
        let mut data = h.to_bytes().to_vec();
        data.extend_from_slice(&[255, 0, 0, 0]); // disk row 0: blue
        data.extend_from_slice(&[0, 0, 255, 0]); // disk row 1: red
        let area = validate(&h, Permissiveness::Standard).unwrap();
        let (img, missing) =
            decode_pixels(&data, &h, &area, Permissiveness::Standard, &Unstoppable).unwrap();
        assert_eq!(missing, 0);
        assert_eq!(img.row(0), &[Color::new(255, 0, 0)]);
        assert_eq!(img.row(1), &[Color::new(0, 0, 255)]);
    }

    #[test]
    fn zero_height_with_huge_width_decodes_empty() {
        let h = header(i32::MAX as u32, 0);
        let data = h.to_bytes();
        let area = validate(&h, Permissiveness::Standard).unwrap();
        assert_eq!(area.len, 0);
        assert_eq!(area.stride, 0);
        let (img, missing) =
            decode_pixels(&data, &h, &area, Permissiveness::Standard, &Unstoppable).unwrap();
        assert_eq!(missing, 0);
        assert_eq!(img.width(), i32::MAX as u32);
        assert_eq!(img.height(), 0);
        assert!(img.is_empty());
    }

    #[test]
    fn permissive_counts_missing_bytes() {
        let h = header(2, 2);
        let mut data = h.to_bytes().to_vec();
        data.extend_from_slice(&[10, 20, 30, 40, 50, 60, 0, 0]); // bottom row only
        let area = validate(&h, Permissiveness::Permissive).unwrap();
        let (img, missing) =
            decode_pixels(&data, &h, &area, Permissiveness::Permissive, &Unstoppable).unwrap();
        assert_eq!(missing, 8);
        assert_eq!(img.row(1), &[Color::new(30, 20, 10), Color::new(60, 50, 40)]);
        assert_eq!(img.row(0), &[BLACK, BLACK]);

        assert!(matches!(
            decode_pixels(&data, &h, &area, Permissiveness::Standard, &Unstoppable),
            Err(BmpError::UnexpectedEof)
        ));
    }
}
