//! # zenbmp24
//!
//! Uncompressed 24-bit BMP encoder and decoder.
//!
//! Images are held in memory as [`Image`]: row-major [`Color`] (RGB8)
//! pixels with row 0 at the top. On disk, rows are stored bottom to top
//! in BGR byte order, each padded to a multiple of 4 bytes
//! (see [`row_stride`]).
//!
//! ## Format profile
//!
//! The encoder writes a 14-byte file header and a 40-byte
//! `BITMAPINFOHEADER` with fixed values described by [`BmpProfile`].
//! [`BmpProfile::LEGACY`] (the default) is byte-compatible with files
//! written by earlier releases, including the vertical-before-horizontal
//! resolution field order and `important_colors = 0x1000000`.
//!
//! ## Non-Goals
//!
//! - Compressed BMP (RLE, bitfields, embedded JPEG/PNG)
//! - Palettes and bit depths other than 24
//! - Top-down (negative height) row order
//!
//! ## Usage
//!
//! ```no_run
//! use zenbmp24::{BLACK, Color, DecodeRequest, EncodeRequest, Image, Unstoppable};
//!
//! let mut image = Image::new(4, 3, BLACK)?;
//! image.row_mut(0).fill(Color::new(255, 0, 0));
//!
//! let encoded = EncodeRequest::new().encode(&image, Unstoppable)?;
//! let decoded = DecodeRequest::new(&encoded).decode(Unstoppable)?;
//! assert_eq!(decoded.image(), &image);
//! # Ok::<(), zenbmp24::BmpError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

mod bmp;
mod error;
mod image;
mod limits;

mod decode;
mod encode;

#[cfg(feature = "std")]
pub mod io;

// Re-exports
pub use bmp::{BmpInfo, BmpProfile, FileHeader, InfoHeader, Permissiveness, row_stride};
pub use decode::{DecodeOutput, DecodeRequest};
pub use encode::EncodeRequest;
pub use enough::{Stop, Unstoppable};
pub use error::BmpError;
pub use image::{BLACK, Color, Image};
pub use limits::Limits;

#[cfg(feature = "std")]
pub use io::{load_bmp, read_bmp, save_bmp, write_bmp};

use alloc::vec::Vec;

/// Encode `image` with the default profile.
pub fn encode_bmp(image: &Image, stop: impl Stop) -> Result<Vec<u8>, BmpError> {
    EncodeRequest::new().encode(image, stop)
}

/// Decode a BMP file held in memory with default settings.
pub fn decode_bmp(data: &[u8], stop: impl Stop) -> Result<DecodeOutput, BmpError> {
    DecodeRequest::new(data).decode(stop)
}

/// Parse and validate the headers without decoding pixels.
///
/// Validation uses [`Permissiveness::Standard`], the level [`decode_bmp`]
/// uses. Only the first 54 bytes are needed.
pub fn probe(data: &[u8]) -> Result<BmpInfo, BmpError> {
    bmp::read_header(data, None, Permissiveness::default()).map(|(header, _)| header)
}
