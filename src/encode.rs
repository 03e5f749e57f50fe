use alloc::vec::Vec;
use enough::Stop;

use crate::bmp::{self, BmpProfile};
use crate::error::BmpError;
use crate::image::Image;

/// Builder for encode operations.
///
/// Defaults to [`BmpProfile::LEGACY`].
#[derive(Clone, Debug, Default)]
pub struct EncodeRequest {
    profile: BmpProfile,
}

impl EncodeRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(mut self, profile: BmpProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn profile(&self) -> &BmpProfile {
        &self.profile
    }

    /// Encode into a new buffer.
    pub fn encode(&self, image: &Image, stop: impl Stop) -> Result<Vec<u8>, BmpError> {
        bmp::encode(image, &self.profile, &stop)
    }

    /// Stream into `sink`, one row at a time.
    ///
    /// A failed write aborts the encode; bytes already written are left in place.
    #[cfg(feature = "std")]
    pub fn encode_to<W: std::io::Write>(
        &self,
        image: &Image,
        sink: &mut W,
        stop: impl Stop,
    ) -> Result<(), BmpError> {
        crate::io::write_with(image, sink, &self.profile, &stop)
    }
}
