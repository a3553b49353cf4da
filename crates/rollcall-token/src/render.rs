//! Rasterise a QR module matrix into a two-tone PNG.
//!
//! Modules are drawn as square blocks of a whole number of pixels so that
//! decoders see uniform module sizes. The code plus its margin is centred on
//! a background canvas of exactly `width`×`width` pixels.

use std::io::Cursor;

use image::{ImageFormat, Rgb, RgbImage};
use qrcode::{Color, QrCode};

use crate::{RenderConfig, Result};

pub fn png(code: &QrCode, config: &RenderConfig) -> Result<Vec<u8>> {
  let image = rasterise(code, config);
  let mut bytes = Vec::new();
  image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
  Ok(bytes)
}

fn rasterise(code: &QrCode, config: &RenderConfig) -> RgbImage {
  let modules = code.width() as u32;
  let total = modules + 2 * config.margin;
  let scale = (config.width / total).max(1);
  // Only grows past `width` if the code cannot fit at one pixel per module.
  let side = config.width.max(total * scale);
  let origin = (side - total * scale) / 2 + config.margin * scale;

  let mut image = RgbImage::from_pixel(side, side, Rgb(config.light));
  let dark = Rgb(config.dark);

  for (i, color) in code.to_colors().into_iter().enumerate() {
    if color != Color::Dark {
      continue;
    }
    let mx = i as u32 % modules;
    let my = i as u32 / modules;
    let x0 = origin + mx * scale;
    let y0 = origin + my * scale;
    for y in y0..y0 + scale {
      for x in x0..x0 + scale {
        image.put_pixel(x, y, dark);
      }
    }
  }

  image
}
