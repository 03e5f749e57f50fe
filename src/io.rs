//! File and stream adapters (feature `std`).

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use enough::{Stop, Unstoppable};

use crate::bmp::decode::{Permissiveness, decode_pixels};
use crate::bmp::encode::{encode_row, prepare};
use crate::bmp::{BmpProfile, read_header};
use crate::decode::DecodeOutput;
use crate::error::BmpError;
use crate::image::Image;
use crate::limits::Limits;

/// Stream `image` into `sink` with the default profile and flush it.
pub fn write_bmp<W: Write>(image: &Image, sink: &mut W) -> Result<(), BmpError> {
    write_with(image, sink, &BmpProfile::default(), &Unstoppable)
}

pub(crate) fn write_with<W: Write>(
    image: &Image,
    sink: &mut W,
    profile: &BmpProfile,
    stop: &dyn Stop,
) -> Result<(), BmpError> {
    let (info, mut row_buf) = prepare(image, profile)?;
    stop.check()?;
    sink.write_all(&info.to_bytes())?;

    for (i, row) in image.rows().rev().enumerate() {
        if i % 16 == 0 {
            stop.check()?;
        }
        encode_row(row, &mut row_buf);
        sink.write_all(&row_buf)?;
    }
    sink.flush()?;
    Ok(())
}

/// Write `image` to a new file at `path`, replacing any existing file.
pub fn save_bmp(path: impl AsRef<Path>, image: &Image) -> Result<(), BmpError> {
    let path = path.as_ref();
    log::trace!("writing BMP to {}", path.display());
    let mut out = BufWriter::new(File::create(path)?);
    write_bmp(image, &mut out)?;
    out.into_inner().map_err(|e| e.into_error())?.sync_all()?;
    Ok(())
}

/// Decode a BMP from `source` with default settings.
pub fn read_bmp<R: Read>(source: &mut R) -> Result<DecodeOutput, BmpError> {
    read_with(source, None, Permissiveness::default(), Unstoppable)
}

/// Decode a BMP from `source`, reading no further than the pixel area.
///
/// With [`Permissiveness::Strict`] one extra byte is read; if the stream
/// has data after the pixel area the file is rejected, as in the
/// in-memory decoder.
///
/// The headers are read and checked against `limits` before any pixel
/// buffer is allocated.
pub fn read_with<R: Read>(
    source: &mut R,
    limits: Option<&Limits>,
    permissiveness: Permissiveness,
    stop: impl Stop,
) -> Result<DecodeOutput, BmpError> {
    let mut data = vec![0u8; BmpProfile::PIXEL_DATA_OFFSET as usize];
    let got = read_full(source, &mut data)?;
    if got < data.len() {
        return Err(BmpError::UnexpectedEof);
    }

    let (header, area) = read_header(&data, limits, permissiveness)?;
    stop.check()?;

    // Strict reads one byte past the pixel area so trailing data is rejected.
    let lookahead = u64::from(permissiveness == Permissiveness::Strict);
    let remaining = (area.end() - data.len()) as u64 + lookahead;
    source.by_ref().take(remaining).read_to_end(&mut data)?;

    let (image, missing) = decode_pixels(&data, &header, &area, permissiveness, &stop)?;
    Ok(DecodeOutput::new(image, header, missing))
}

/// Read and decode the BMP file at `path`.
pub fn load_bmp(path: impl AsRef<Path>) -> Result<DecodeOutput, BmpError> {
    let path = path.as_ref();
    log::trace!("reading BMP from {}", path.display());
    let mut input = BufReader::new(File::open(path)?);
    read_bmp(&mut input)
}

/// Like `read_exact`, but reports how many bytes were read instead of
/// failing at end of input.
fn read_full<R: Read>(source: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
