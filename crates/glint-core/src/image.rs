//! Decoded source image.
//!
//! Pixels are stored as display-encoded RGBA8, exactly as they will be
//! uploaded to the source texture.

use std::path::Path;

use crate::error::ImageError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    pub width: u32,
    pub height: u32,
    /// Row-major, top row first.
    pub pixels: Vec<[u8; 4]>,
}

impl SourceImage {
    /// Wrap a tightly packed RGBA8 buffer.
    pub fn from_rgba8(width: u32, height: u32, bytes: &[u8]) -> Result<Self, ImageError> {
        if width == 0 || height == 0 {
            return Err(ImageError::Empty);
        }
        let expected = width as usize * height as usize * 4;
        if bytes.len() != expected {
            return Err(ImageError::BufferSize {
                width,
                height,
                expected,
                actual: bytes.len(),
            });
        }
        let pixels = bytes
            .chunks_exact(4)
            .map(|px| [px[0], px[1], px[2], px[3]])
            .collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn from_dynamic(img: &image::DynamicImage) -> Result<Self, ImageError> {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::from_rgba8(width, height, rgba.as_raw())
    }

    /// Decode any format the `image` crate supports.
    pub fn open(path: &Path) -> Result<Self, ImageError> {
        let img = image::open(path)?;
        Self::from_dynamic(&img)
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    pub fn to_rgba_image(&self) -> Option<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.as_bytes().to_vec())
    }

    /// Number of stored pixels; equals `width * height` for a well-formed image.
    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgba8_packs_pixels() {
        let bytes = [1, 2, 3, 4, 5, 6, 7, 8];
        let img = SourceImage::from_rgba8(2, 1, &bytes).unwrap();
        assert_eq!(img.pixels, vec![[1, 2, 3, 4], [5, 6, 7, 8]]);
        assert_eq!(img.pixel_count(), 2);
        assert_eq!(img.as_bytes(), &bytes);
    }

    #[test]
    fn test_from_rgba8_rejects_wrong_length() {
        let err = SourceImage::from_rgba8(2, 2, &[0; 12]).unwrap_err();
        assert!(matches!(
            err,
            ImageError::BufferSize {
                expected: 16,
                actual: 12,
                ..
            }
        ));
        assert!(matches!(
            SourceImage::from_rgba8(0, 4, &[]),
            Err(ImageError::Empty)
        ));
    }

    #[test]
    fn test_dynamic_image_roundtrip() {
        let mut rgba = image::RgbaImage::new(3, 2);
        rgba.put_pixel(2, 1, image::Rgba([10, 20, 30, 40]));
        let img = SourceImage::from_dynamic(&image::DynamicImage::ImageRgba8(rgba.clone())).unwrap();
        assert_eq!(img.pixels[5], [10, 20, 30, 40]);
        assert_eq!(img.to_rgba_image(), Some(rgba));
    }
}
