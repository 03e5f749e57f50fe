use enough::Stop;

use crate::bmp::{self, BmpInfo, Permissiveness};
use crate::error::BmpError;
use crate::image::Image;
use crate::limits::Limits;

/// Decoded image plus the headers it was read from.
#[derive(Clone, Debug)]
pub struct DecodeOutput {
    image: Image,
    header: BmpInfo,
    missing_bytes: u64,
}

impl DecodeOutput {
    pub(crate) fn new(image: Image, header: BmpInfo, missing_bytes: u64) -> Self {
        Self {
            image,
            header,
            missing_bytes,
        }
    }

    pub fn image(&self) -> &Image {
        &self.image
    }

    pub fn into_image(self) -> Image {
        self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Headers as stored in the file.
    pub fn header(&self) -> &BmpInfo {
        &self.header
    }

    /// Whether the input ended before the pixel area did.
    ///
    /// Only possible with [`Permissiveness::Permissive`]; the missing
    /// pixels are black.
    pub fn is_truncated(&self) -> bool {
        self.missing_bytes > 0
    }

    /// Number of pixel bytes that were absent from the input.
    pub fn missing_bytes(&self) -> u64 {
        self.missing_bytes
    }
}

/// Builder for decode operations.
///
/// ```no_run
/// use zenbmp24::{DecodeRequest, Limits, Permissiveness, Unstoppable};
///
/// let data: &[u8] = &[]; // your BMP bytes
/// let limits = Limits { max_pixels: Some(1 << 24), ..Default::default() };
/// let decoded = DecodeRequest::new(data)
///     .with_limits(&limits)
///     .with_permissiveness(Permissiveness::Strict)
///     .decode(Unstoppable)?;
/// println!("{}x{}", decoded.width(), decoded.height());
/// # Ok::<(), zenbmp24::BmpError>(())
/// ```
#[derive(Clone, Debug)]
pub struct DecodeRequest<'a> {
    data: &'a [u8],
    limits: Option<&'a Limits>,
    permissiveness: Permissiveness,
}

impl<'a> DecodeRequest<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            limits: None,
            permissiveness: Permissiveness::default(),
        }
    }

    pub fn with_limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    pub fn with_permissiveness(mut self, permissiveness: Permissiveness) -> Self {
        self.permissiveness = permissiveness;
        self
    }

    pub fn decode(self, stop: impl Stop) -> Result<DecodeOutput, BmpError> {
        bmp::decode(self.data, self.limits, self.permissiveness, &stop)
    }
}
