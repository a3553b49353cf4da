//! Error types for the rollcall-token encoder.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid payload: {0}")]
  Payload(#[from] rollcall_core::Error),

  /// The canonical payload does not fit in the largest QR version at the
  /// configured error-correction level.
  #[error("payload of {len} bytes exceeds QR code capacity")]
  TooLong { len: usize },

  #[error("QR encoding failed: {0}")]
  Qr(String),

  #[error("PNG encoding failed: {0}")]
  Png(#[from] image::ImageError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
