//! On-disk BMP header layout: file header (14 bytes) and
//! `BITMAPINFOHEADER` (40 bytes), written and read field by field.

use crate::error::BmpError;

/// Bytes per on-disk row for a 24-bit image, rounded up to a multiple of 4.
///
/// `4 * ((3 * width + 3) / 4)`, computed in `u64` so every `u32` width works.
pub const fn row_stride(width: u32) -> u64 {
    4 * ((3 * width as u64 + 3) / 4)
}

/// The fixed BMP profile this codec reads and writes.
///
/// The structural fields (magic, header sizes, planes, depth, compression)
/// are associated constants. The informational fields that other encoders
/// fill in differently are configurable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BmpProfile {
    /// Horizontal resolution in pixels per meter.
    pub x_pixels_per_meter: i32,
    /// Vertical resolution in pixels per meter.
    pub y_pixels_per_meter: i32,
    pub colors_used: u32,
    pub important_colors: u32,
}

impl BmpProfile {
    pub const MAGIC: [u8; 2] = *b"BM";
    pub const FILE_HEADER_SIZE: u32 = 14;
    pub const INFO_HEADER_SIZE: u32 = 40;
    pub const PIXEL_DATA_OFFSET: u32 = Self::FILE_HEADER_SIZE + Self::INFO_HEADER_SIZE;
    pub const PLANES: u16 = 1;
    pub const BITS_PER_PIXEL: u16 = 24;
    pub const COMPRESSION_NONE: u32 = 0;

    /// 11811 px/m, roughly 300 DPI.
    pub const DEFAULT_PIXELS_PER_METER: i32 = 11811;
    /// Important-colors value written by the legacy profile.
    pub const LEGACY_IMPORTANT_COLORS: u32 = 0x0100_0000;

    /// Byte-compatible with files written by earlier releases:
    /// ~300 DPI and `important_colors = 0x1000000`.
    pub const LEGACY: Self = Self {
        x_pixels_per_meter: Self::DEFAULT_PIXELS_PER_METER,
        y_pixels_per_meter: Self::DEFAULT_PIXELS_PER_METER,
        colors_used: 0,
        important_colors: Self::LEGACY_IMPORTANT_COLORS,
    };

    /// Same resolution as [`LEGACY`](Self::LEGACY) but `important_colors = 0`
    /// ("all colors are important"), as the BMP documentation describes.
    pub const fn standard() -> Self {
        Self {
            important_colors: 0,
            ..Self::LEGACY
        }
    }
}

impl Default for BmpProfile {
    fn default() -> Self {
        Self::LEGACY
    }
}

/// 14-byte file header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FileHeader {
    pub magic: [u8; 2],
    pub file_size: u32,
    pub reserved: u32,
    pub pixel_data_offset: u32,
}

/// 40-byte `BITMAPINFOHEADER`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InfoHeader {
    pub header_size: u32,
    pub width: u32,
    pub height: u32,
    pub planes: u16,
    pub bits_per_pixel: u16,
    pub compression: u32,
    pub image_size: u32,
    pub x_pixels_per_meter: i32,
    pub y_pixels_per_meter: i32,
    pub colors_used: u32,
    pub important_colors: u32,
}

/// Both headers of a parsed file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BmpInfo {
    pub file: FileHeader,
    pub info: InfoHeader,
}

impl BmpInfo {
    pub fn width(&self) -> u32 {
        self.info.width
    }

    pub fn height(&self) -> u32 {
        self.info.height
    }

    /// Headers for a freshly encoded `width × height` image.
    pub fn for_dimensions(width: u32, height: u32, profile: &BmpProfile) -> Result<Self, BmpError> {
        let too_large = BmpError::DimensionsTooLarge { width, height };
        let image_size = row_stride(width)
            .checked_mul(u64::from(height))
            .and_then(|n| u32::try_from(n).ok())
            .ok_or(too_large)?;
        let file_size = image_size
            .checked_add(BmpProfile::PIXEL_DATA_OFFSET)
            .ok_or(BmpError::DimensionsTooLarge { width, height })?;

        Ok(Self {
            file: FileHeader {
                magic: BmpProfile::MAGIC,
                file_size,
                reserved: 0,
                pixel_data_offset: BmpProfile::PIXEL_DATA_OFFSET,
            },
            info: InfoHeader {
                header_size: BmpProfile::INFO_HEADER_SIZE,
                width,
                height,
                planes: BmpProfile::PLANES,
                bits_per_pixel: BmpProfile::BITS_PER_PIXEL,
                compression: BmpProfile::COMPRESSION_NONE,
                image_size,
                x_pixels_per_meter: profile.x_pixels_per_meter,
                y_pixels_per_meter: profile.y_pixels_per_meter,
                colors_used: profile.colors_used,
                important_colors: profile.important_colors,
            },
        })
    }

    /// Serialize both headers, little-endian, in disk field order.
    ///
    /// The vertical resolution is written before the horizontal one; readers
    /// of files from earlier releases depend on that order.
    pub fn to_bytes(&self) -> [u8; 54] {
        let mut out = [0u8; 54];
        let mut w = FieldWriter {
            buf: &mut out,
            pos: 0,
        };

        // File header (14 bytes)
        w.put(&self.file.magic);
        w.put(&self.file.file_size.to_le_bytes());
        w.put(&self.file.reserved.to_le_bytes());
        w.put(&self.file.pixel_data_offset.to_le_bytes());

        // Info header (40 bytes)
        w.put(&self.info.header_size.to_le_bytes());
        w.put(&self.info.width.to_le_bytes());
        w.put(&self.info.height.to_le_bytes());
        w.put(&self.info.planes.to_le_bytes());
        w.put(&self.info.bits_per_pixel.to_le_bytes());
        w.put(&self.info.compression.to_le_bytes());
        w.put(&self.info.image_size.to_le_bytes());
        w.put(&self.info.y_pixels_per_meter.to_le_bytes());
        w.put(&self.info.x_pixels_per_meter.to_le_bytes());
        w.put(&self.info.colors_used.to_le_bytes());
        w.put(&self.info.important_colors.to_le_bytes());
        debug_assert_eq!(w.pos, 54);

        out
    }

    /// Parse both headers from the first 54 bytes. Values are not validated.
    pub fn from_bytes(data: &[u8]) -> Result<Self, BmpError> {
        let header: &[u8; 54] = data
            .get(..54)
            .and_then(|h| h.try_into().ok())
            .ok_or(BmpError::UnexpectedEof)?;
        let mut r = FieldReader {
            buf: header,
            pos: 0,
        };

        let magic = [r.u8(), r.u8()];
        let file = FileHeader {
            magic,
            file_size: r.u32(),
            reserved: r.u32(),
            pixel_data_offset: r.u32(),
        };

        let header_size = r.u32();
        let width = r.u32();
        let height = r.u32();
        let planes = r.u16();
        let bits_per_pixel = r.u16();
        let compression = r.u32();
        let image_size = r.u32();
        let y_pixels_per_meter = r.i32();
        let x_pixels_per_meter = r.i32();
        let colors_used = r.u32();
        let important_colors = r.u32();

        Ok(Self {
            file,
            info: InfoHeader {
                header_size,
                width,
                height,
                planes,
                bits_per_pixel,
                compression,
                image_size,
                x_pixels_per_meter,
                y_pixels_per_meter,
                colors_used,
                important_colors,
            },
        })
    }
}

struct FieldWriter<'a> {
    buf: &'a mut [u8; 54],
    pos: usize,
}

impl FieldWriter<'_> {
    fn put(&mut self, bytes: &[u8]) {
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
    }
}

struct FieldReader<'a> {
    buf: &'a [u8; 54],
    pos: usize,
}

impl FieldReader<'_> {
    fn take<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buf[self.pos..self.pos + N]);
        self.pos += N;
        out
    }

    fn u8(&mut self) -> u8 {
        self.take::<1>()[0]
    }

    fn u16(&mut self) -> u16 {
        u16::from_le_bytes(self.take())
    }

    fn u32(&mut self) -> u32 {
        u32::from_le_bytes(self.take())
    }

    fn i32(&mut self) -> i32 {
        i32::from_le_bytes(self.take())
    }
}
