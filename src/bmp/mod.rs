//! 24-bit BMP header layout, encoder and decoder (internal).
//!
//! Use top-level [`crate::decode_bmp`], [`crate::encode_bmp`], etc.

pub(crate) mod decode;
pub(crate) mod encode;
mod header;

pub use decode::Permissiveness;
pub use header::{BmpInfo, BmpProfile, FileHeader, InfoHeader, row_stride};

use crate::decode::DecodeOutput;
use crate::error::BmpError;
use crate::image::Image;
use crate::limits::Limits;
use alloc::vec::Vec;
use decode::PixelArea;
use enough::Stop;

/// Parse and validate headers, then check them against `limits`.
pub(crate) fn read_header(
    data: &[u8],
    limits: Option<&Limits>,
    permissiveness: Permissiveness,
) -> Result<(BmpInfo, PixelArea), BmpError> {
    let header = BmpInfo::from_bytes(data)?;
    let area = decode::validate(&header, permissiveness)?;
    check_limits(limits, header.width(), header.height())?;
    log::debug!(
        "BMP header: {}x{}, pixel data at {} ({} bytes)",
        header.width(),
        header.height(),
        area.offset,
        area.len
    );
    Ok((header, area))
}

/// Decode a complete BMP file held in memory.
pub(crate) fn decode(
    data: &[u8],
    limits: Option<&Limits>,
    permissiveness: Permissiveness,
    stop: &dyn Stop,
) -> Result<DecodeOutput, BmpError> {
    let (header, area) = read_header(data, limits, permissiveness)?;
    stop.check()?;
    let (image, missing) = decode::decode_pixels(data, &header, &area, permissiveness, stop)?;
    Ok(DecodeOutput::new(image, header, missing))
}

/// Zeroed byte buffer of `len` bytes. Allocation failure is reported as
/// `DimensionsTooLarge` instead of aborting.
pub(crate) fn try_zeroed(len: usize, width: u32, height: u32) -> Result<Vec<u8>, BmpError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| BmpError::DimensionsTooLarge { width, height })?;
    buf.resize(len, 0);
    Ok(buf)
}

fn check_limits(limits: Option<&Limits>, width: u32, height: u32) -> Result<(), BmpError> {
    if let Some(limits) = limits {
        limits.check(width, height)?;
        // Decoded pixels are 3 bytes each
        let out_bytes = u64::from(width) * u64::from(height) * 3;
        limits.check_memory(out_bytes)?;
    }
    Ok(())
}

/// Encode to BMP.
pub(crate) fn encode(
    image: &Image,
    profile: &BmpProfile,
    stop: &dyn Stop,
) -> Result<Vec<u8>, BmpError> {
    encode::encode_bmp(image, profile, stop)
}
