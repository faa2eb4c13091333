//! Image loading: the collaborator that turns a photo path into pixels.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, anyhow};
use fast_image_resize as fir;
use tracing::debug;

use crate::error::Error;

/// A decoded photo as tightly packed RGBA8 rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    pub fn native_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Scale to exactly `target_w` x `target_h`.
    ///
    /// # Errors
    /// Fails on zero target dimensions or a pixel buffer that does not match
    /// the stated size.
    pub fn resized(&self, target_w: u32, target_h: u32) -> anyhow::Result<DecodedImage> {
        if target_w == 0 || target_h == 0 {
            anyhow::bail!("resize dimensions must be positive");
        }
        if self.width == target_w && self.height == target_h {
            return Ok(self.clone());
        }

        let src_view =
            fir::images::ImageRef::new(self.width, self.height, &self.pixels, fir::PixelType::U8x4)
                .context("failed to create source view for photo resize")?;
        let mut dst_image = fir::images::Image::new(target_w, target_h, fir::PixelType::U8x4);
        let options = fir::ResizeOptions::new()
            .resize_alg(fir::ResizeAlg::Convolution(fir::FilterType::CatmullRom));
        let mut resizer = fir::Resizer::new();
        resizer
            .resize(&src_view, &mut dst_image, Some(&options))
            .context("photo resize failed")?;
        Ok(DecodedImage {
            width: target_w,
            height: target_h,
            pixels: dst_image.into_vec(),
        })
    }
}

/// Opens photos by path.
pub trait ImageSource {
    /// # Errors
    /// Returns [`Error::ImageDecode`] when the file cannot be read or decoded.
    fn open(&self, path: &Path) -> Result<DecodedImage, Error>;
}

/// Decodes photos from disk with the `image` crate, honoring EXIF orientation.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsImageSource;

impl ImageSource for FsImageSource {
    fn open(&self, path: &Path) -> Result<DecodedImage, Error> {
        let rgba = decode_rgba8_apply_exif(path).map_err(|source| Error::ImageDecode {
            path: path.to_path_buf(),
            source,
        })?;
        let (width, height) = rgba.dimensions();
        Ok(DecodedImage {
            width,
            height,
            pixels: rgba.into_raw(),
        })
    }
}

// Orientation handling is best-effort; without metadata the pixels are kept as stored.
fn decode_rgba8_apply_exif(path: &Path) -> anyhow::Result<image::RgbaImage> {
    let img = image::ImageReader::open(path)?
        .with_guessed_format()?
        .decode()?;
    let mut img = img.to_rgba8();
    if img.width() == 0 || img.height() == 0 {
        return Err(anyhow!("image has no pixels"));
    }

    let orientation: u16 = read_orientation(path).unwrap_or(1);
    match orientation {
        2 => img = image::imageops::flip_horizontal(&img),
        3 => img = image::imageops::rotate180(&img),
        4 => img = image::imageops::flip_vertical(&img),
        5 => {
            img = image::imageops::rotate90(&img);
            img = image::imageops::flip_horizontal(&img);
        }
        6 => img = image::imageops::rotate90(&img),
        7 => {
            img = image::imageops::rotate270(&img);
            img = image::imageops::flip_horizontal(&img);
        }
        8 => img = image::imageops::rotate270(&img),
        _ => {}
    }

    Ok(img)
}

fn read_orientation(path: &Path) -> Option<u16> {
    let file = File::open(path).ok()?;
    let mut buf = BufReader::new(file);
    let exif = exif::Reader::new().read_from_container(&mut buf).ok()?;
    let field = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?;
    let o = u16::try_from(field.value.get_uint(0)?).ok()?;
    debug!(orientation = o, path = %path.display(), "exif orientation");
    Some(o)
}
