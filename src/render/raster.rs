use std::io::Cursor;
use std::path::Path;

use crate::{
    assets::decode::{decode_image, unpremultiply_rgba8_in_place},
    foundation::error::{IcebergError, IcebergResult},
    render::composite::blit_over,
};

/// Premultiplied RGBA8 pixel buffer, row-major, 4 bytes per pixel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8 data; length is `width * height * 4`.
    pub data: Vec<u8>,
}

impl RasterImage {
    /// Fully transparent image.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, [0, 0, 0, 0])
    }

    /// Image where every pixel is `premul_rgba`.
    pub fn filled(width: u32, height: u32, premul_rgba: [u8; 4]) -> Self {
        let n = width as usize * height as usize;
        let mut data = Vec::with_capacity(n * 4);
        for _ in 0..n {
            data.extend_from_slice(&premul_rgba);
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Wrap an existing premultiplied buffer, checking its length.
    pub fn from_premul(width: u32, height: u32, data: Vec<u8>) -> IcebergResult<Self> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(IcebergError::image(format!(
                "buffer of {} bytes does not match {width}x{height} rgba8",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Premultiplied pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Copy of the pixels in straight (non-premultiplied) RGBA8.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        unpremultiply_rgba8_in_place(&mut out);
        out
    }

    /// Encode as PNG bytes.
    pub fn encode_png(&self) -> IcebergResult<Vec<u8>> {
        let straight = self.to_straight_rgba8();
        let mut buf = Vec::new();
        image::write_buffer_with_format(
            &mut Cursor::new(&mut buf),
            &straight,
            self.width,
            self.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .map_err(|e| IcebergError::image(format!("encode png: {e}")))?;
        Ok(buf)
    }

    /// Write a PNG file to `path`.
    pub fn save_png(&self, path: &Path) -> IcebergResult<()> {
        let straight = self.to_straight_rgba8();
        image::save_buffer_with_format(
            path,
            &straight,
            self.width,
            self.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .map_err(|e| IcebergError::image(format!("write png '{}': {e}", path.display())))
    }
}

/// Raster operations the renderer needs from an image backend.
pub trait RasterBackend {
    /// Decode encoded bytes into a premultiplied image.
    fn load_image(&self, bytes: &[u8]) -> IcebergResult<RasterImage>;

    /// Resample `image` to exactly `width` x `height`.
    fn resize(&self, image: &RasterImage, width: u32, height: u32) -> IcebergResult<RasterImage>;

    /// Blend `image` onto `canvas` with its top-left at `(x, y)`, clipping at the edges.
    fn composite_at(&self, canvas: &mut RasterImage, image: &RasterImage, x: i64, y: i64);

    /// Load the fixed background canvas.
    ///
    /// Fails with [`IcebergError::AssetMissing`] if the file is absent or unreadable.
    fn load_base_canvas(&self, path: &Path) -> IcebergResult<RasterImage>;
}

/// CPU backend built on the `image` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct CpuRaster;

impl RasterBackend for CpuRaster {
    fn load_image(&self, bytes: &[u8]) -> IcebergResult<RasterImage> {
        decode_image(bytes)
    }

    fn resize(&self, image: &RasterImage, width: u32, height: u32) -> IcebergResult<RasterImage> {
        if width == 0 || height == 0 {
            return Err(IcebergError::image(format!(
                "cannot resize to {width}x{height}"
            )));
        }
        if image.width == width && image.height == height {
            return Ok(image.clone());
        }
        let buf = image::RgbaImage::from_raw(image.width, image.height, image.data.clone())
            .ok_or_else(|| IcebergError::image("raster buffer does not match its dimensions"))?;
        let resized =
            image::imageops::resize(&buf, width, height, image::imageops::FilterType::Triangle);
        RasterImage::from_premul(width, height, resized.into_raw())
    }

    fn composite_at(&self, canvas: &mut RasterImage, image: &RasterImage, x: i64, y: i64) {
        let (w, h) = (canvas.width, canvas.height);
        blit_over(
            &mut canvas.data,
            w,
            h,
            &image.data,
            image.width,
            image.height,
            x,
            y,
        );
    }

    fn load_base_canvas(&self, path: &Path) -> IcebergResult<RasterImage> {
        let bytes = std::fs::read(path).map_err(|e| {
            IcebergError::asset_missing(format!("base canvas '{}': {e}", path.display()))
        })?;
        decode_image(&bytes).map_err(|e| {
            IcebergError::asset_missing(format!("base canvas '{}': {e}", path.display()))
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
