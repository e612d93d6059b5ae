use std::io::Cursor;
use std::path::Path;

use image::{ExtendedColorType, ImageDecoder};

use crate::error::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

/// Colour model of the encoded samples, as stored in the file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorModel {
    Gray,
    Rgb,
    Cmyk,
}

impl ColorModel {
    fn of(color: ExtendedColorType) -> Self {
        match color {
            ExtendedColorType::L8
            | ExtendedColorType::La8
            | ExtendedColorType::L16
            | ExtendedColorType::La16 => ColorModel::Gray,
            ExtendedColorType::Cmyk8 => ColorModel::Cmyk,
            _ => ColorModel::Rgb,
        }
    }
}

/// An encoded raster image plus its pixel dimensions.
#[derive(Clone, Debug)]
pub struct ImageAsset {
    pub data: Vec<u8>,
    pub format: ImageFormat,
    pub color: ColorModel,
    pub pixel_width: u32,
    pub pixel_height: u32,
}

impl ImageAsset {
    /// Sniff the format from the bytes and read the dimensions.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, Error> {
        let reader = image::ImageReader::new(Cursor::new(&data))
            .with_guessed_format()
            .map_err(Error::Io)?;
        let format = match reader.format() {
            Some(image::ImageFormat::Jpeg) => ImageFormat::Jpeg,
            Some(image::ImageFormat::Png) => ImageFormat::Png,
            Some(other) => return Err(Error::UnsupportedImage(format!("{other:?}"))),
            None => return Err(Error::UnsupportedImage("unrecognized data".to_string())),
        };
        let decoder = reader.into_decoder()?;
        let (pixel_width, pixel_height) = decoder.dimensions();
        let color = ColorModel::of(decoder.original_color_type());
        drop(decoder);
        Ok(Self {
            data,
            format,
            color,
            pixel_width,
            pixel_height,
        })
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        let data = std::fs::read(path).map_err(Error::Io)?;
        Self::from_bytes(data)
    }

    /// Display height for a given display width, keeping the aspect ratio.
    pub fn height_for_width(&self, width: f32) -> f32 {
        if self.pixel_width == 0 {
            return 0.0;
        }
        width * self.pixel_height as f32 / self.pixel_width as f32
    }
}

/// Logo for the document header. Failures are logged and yield `None`; the
/// header then draws a text mark instead.
pub fn load_logo(path: Option<&Path>) -> Option<ImageAsset> {
    let path = path?;
    match ImageAsset::load(path) {
        Ok(img) => {
            log::debug!(
                "Logo {}: {:?} {:?} {}x{}",
                path.display(),
                img.format,
                img.color,
                img.pixel_width,
                img.pixel_height
            );
            Some(img)
        }
        Err(e) => {
            log::warn!("Logo {} unavailable: {e}; using text mark", path.display());
            None
        }
    }
}
