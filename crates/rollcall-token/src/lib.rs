//! QR token encoder for Rollcall.
//!
//! Turns a [`TokenPayload`] into a PNG image of a QR code carrying the
//! payload's canonical JSON. Pure synchronous; no HTTP or storage
//! dependencies.
//!
//! # Quick start
//!
//! ```no_run
//! use rollcall_core::token::TokenPayload;
//! use rollcall_token::TokenEncoder;
//!
//! let payload = TokenPayload::new("Ada Lovelace", "S100").unwrap();
//! let token = TokenEncoder::default().encode(&payload).unwrap();
//! println!("{} -> {} PNG bytes", token.canonical, token.png.len());
//! ```

pub mod error;
mod render;

pub use error::{Error, Result};
pub use qrcode::EcLevel;
use qrcode::{QrCode, types::QrError};
use rollcall_core::token::TokenPayload;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Fixed visual parameters for rendered tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderConfig {
  /// Side length of the square output image, in pixels.
  pub width:    u32,
  /// Quiet zone around the code, in modules.
  pub margin:   u32,
  /// Foreground (dark module) colour as RGB.
  pub dark:     [u8; 3],
  /// Background (light module) colour as RGB.
  pub light:    [u8; 3],
  pub ec_level: EcLevel,
}

impl RenderConfig {
  /// 300×300 px, two-module margin, black on white, medium error correction.
  pub const STANDARD: Self = Self {
    width:    300,
    margin:   2,
    dark:     [0x00, 0x00, 0x00],
    light:    [0xFF, 0xFF, 0xFF],
    ec_level: EcLevel::M,
  };
}

impl Default for RenderConfig {
  fn default() -> Self { Self::STANDARD }
}

// ─── Encoder ─────────────────────────────────────────────────────────────────

/// A rendered token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedToken {
  /// The exact string carried by the code.
  pub canonical: String,
  /// PNG image bytes.
  pub png:       Vec<u8>,
}

/// Renders payloads with a fixed [`RenderConfig`].
///
/// Deterministic: the same payload and config always produce byte-identical
/// PNG output.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenEncoder {
  config: RenderConfig,
}

impl TokenEncoder {
  pub fn new(config: RenderConfig) -> Self { Self { config } }

  pub fn config(&self) -> &RenderConfig { &self.config }

  /// Encode `payload` into a QR code PNG.
  ///
  /// Fails with [`Error::TooLong`] rather than truncating when the payload
  /// exceeds the code's capacity.
  pub fn encode(&self, payload: &TokenPayload) -> Result<EncodedToken> {
    let canonical = payload.canonical()?;
    let code = QrCode::with_error_correction_level(
      canonical.as_bytes(),
      self.config.ec_level,
    )
    .map_err(|e| match e {
      QrError::DataTooLong => Error::TooLong { len: canonical.len() },
      other => Error::Qr(other.to_string()),
    })?;

    let png = render::png(&code, &self.config)?;
    Ok(EncodedToken { canonical, png })
  }
}
