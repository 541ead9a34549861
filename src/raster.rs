//! Turns iteration counts into a 24-bit uncompressed bitmap.  Each
//! colour channel is an independent band over the count: red cycles
//! every 8 iterations, green every 16 and blue every 32.

use crate::aggregate::GlobalResult;
use crate::error::Error;
use image::bmp::BMPEncoder;
use image::ColorType;
use log::info;
use std::convert::TryFrom;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Bytes before the pixel data: a 14-byte file header and a 40-byte
/// info header.
pub const HEADER_SIZE: usize = 54;

/// Maps an iteration count to an RGB triple.
#[inline]
pub fn colorize(count: u32) -> [u8; 3] {
    [
        ((count % 8) * 32) as u8,
        ((count % 16) * 16) as u8,
        ((count % 32) * 8) as u8,
    ]
}

/// The whole result as row-major RGB triples.
pub fn to_rgb(result: &GlobalResult) -> Vec<u8> {
    result.counts().iter().flat_map(|&n| colorize(n).to_vec()).collect()
}

/// The raster size as the bitmap header stores it.
pub fn raster_dimensions(width: usize, height: usize) -> Result<(u32, u32), Error> {
    match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(Error::RasterTooLarge { width, height }),
    }
}

/// Writes `result` as a bitmap to any writer.  The encoder stores rows
/// bottom-up and pads each to a multiple of four bytes.
pub fn encode_bmp<W: Write>(writer: &mut W, result: &GlobalResult) -> Result<(), Error> {
    let (width, height) = raster_dimensions(result.width(), result.height())?;
    let pixels = to_rgb(result);
    let mut encoder = BMPEncoder::new(writer);
    encoder.encode(&pixels, width, height, ColorType::RGB(8))?;
    Ok(())
}

/// Writes `result` as a bitmap file at `path`.
pub fn write_bmp<P: AsRef<Path>>(path: P, result: &GlobalResult) -> Result<(), Error> {
    let path = path.as_ref();
    let mut output = BufWriter::new(File::create(path)?);
    encode_bmp(&mut output, result)?;
    output.flush()?;
    info!("wrote {}", path.display());
    Ok(())
}
