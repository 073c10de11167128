// Raster images and their lossless inline encoding
// (`data:image/png;base64,<payload>`).

use std::io::Cursor;

use base64::{engine::general_purpose, Engine as _};
use image::{ImageFormat, Rgba, RgbaImage};
use serde::Serialize;

pub const PNG_MIME: &str = "image/png";

/// Pixel layout of a [`RasterImage`] buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PixelFormat {
    /// 8-bit red, green, blue, alpha; row-major, top row first.
    Rgba8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Rgba8 => 4,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error("failed to encode PNG: {0}")]
    Encode(#[source] image::ImageError),

    #[error("failed to decode PNG: {0}")]
    Decode(#[source] image::ImageError),

    #[error("malformed data URI: {0}")]
    MalformedDataUri(String),

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// An RGBA8 pixel buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pixels: RgbaImage,
}

impl RasterImage {
    /// A `width` x `height` image filled with `fill`.
    pub fn new(width: u32, height: u32, fill: Rgba<u8>) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(width, height, fill),
        }
    }

    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn format(&self) -> PixelFormat {
        PixelFormat::Rgba8
    }

    pub fn mime_type(&self) -> &'static str {
        PNG_MIME
    }

    /// Raw pixel bytes in [`PixelFormat::Rgba8`] layout.
    pub fn as_bytes(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    pub fn as_rgba(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_rgba(self) -> RgbaImage {
        self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.pixels.get_pixel(x, y)
    }

    // -- Encoding --

    pub fn to_png(&self) -> Result<Vec<u8>, RasterError> {
        let mut buf = Cursor::new(Vec::new());
        self.pixels
            .write_to(&mut buf, ImageFormat::Png)
            .map_err(RasterError::Encode)?;
        Ok(buf.into_inner())
    }

    pub fn from_png(bytes: &[u8]) -> Result<Self, RasterError> {
        let decoded = image::load_from_memory_with_format(bytes, ImageFormat::Png)
            .map_err(RasterError::Decode)?;
        Ok(Self {
            pixels: decoded.to_rgba8(),
        })
    }

    /// Self-describing inline string: `data:image/png;base64,<payload>`.
    pub fn to_data_uri(&self) -> Result<String, RasterError> {
        let png = self.to_png()?;
        Ok(format!(
            "data:{};base64,{}",
            PNG_MIME,
            general_purpose::STANDARD.encode(png)
        ))
    }

    pub fn from_data_uri(uri: &str) -> Result<Self, RasterError> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| RasterError::MalformedDataUri("missing `data:` scheme".into()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| RasterError::MalformedDataUri("missing `,` separator".into()))?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or_else(|| RasterError::MalformedDataUri("payload is not base64".into()))?;
        if mime != PNG_MIME {
            return Err(RasterError::MalformedDataUri(format!(
                "unsupported MIME type `{mime}`"
            )));
        }
        let bytes = general_purpose::STANDARD.decode(payload)?;
        Self::from_png(&bytes)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
