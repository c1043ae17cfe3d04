//! Tiled-cube 3-D LUT.
//!
//! A cube with `L = n²` levels per axis is stored as an `n × n` grid of
//! `L × L` slices in a square `n³ × n³` image. Slice `s` (blue level) sits at
//! tile `(s mod n, s div n)`; within a tile red runs along x and green along y.

use glam::{UVec2, Vec3};

use crate::error::CubeLutError;
use crate::image::SourceImage;

#[derive(Debug, Clone, PartialEq)]
pub struct TiledCubeLut {
    /// Tiles per row and column (`n`).
    tiles: u32,
    /// Levels per axis (`n²`).
    levels: u32,
    /// Image side (`n³`).
    width: u32,
    texels: Vec<[u8; 4]>,
}

impl TiledCubeLut {
    /// Build from a square RGBA8 image whose side is a perfect cube `n³` with `n ≥ 2`.
    pub fn from_rgba8(width: u32, height: u32, texels: Vec<[u8; 4]>) -> Result<Self, CubeLutError> {
        if width != height {
            return Err(CubeLutError::NotSquare { width, height });
        }
        let tiles = (f64::from(width)).cbrt().round() as u32;
        if tiles < 2 || tiles.pow(3) != width {
            return Err(CubeLutError::BadSize { width });
        }
        let expected = (width as usize) * (height as usize);
        if texels.len() != expected {
            return Err(CubeLutError::BufferSize {
                expected,
                actual: texels.len(),
            });
        }
        Ok(Self {
            tiles,
            levels: tiles * tiles,
            width,
            texels,
        })
    }

    pub fn from_image(image: &SourceImage) -> Result<Self, CubeLutError> {
        Self::from_rgba8(image.width, image.height, image.pixels.clone())
    }

    /// Identity cube with `tiles × tiles` tiles.
    pub fn identity(tiles: u32) -> Self {
        let tiles = tiles.max(2);
        let levels = tiles * tiles;
        let width = levels * tiles;
        let max = (levels - 1) as f32;
        let mut texels = vec![[0u8, 0, 0, 255]; (width * width) as usize];
        for b in 0..levels {
            let origin = UVec2::new(b % tiles, b / tiles) * levels;
            for g in 0..levels {
                for r in 0..levels {
                    let x = origin.x + r;
                    let y = origin.y + g;
                    texels[(y * width + x) as usize] = [
                        quantize(r as f32 / max),
                        quantize(g as f32 / max),
                        quantize(b as f32 / max),
                        255,
                    ];
                }
            }
        }
        Self {
            tiles,
            levels,
            width,
            texels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn levels(&self) -> u32 {
        self.levels
    }

    pub fn tiles(&self) -> u32 {
        self.tiles
    }

    pub fn texels(&self) -> &[[u8; 4]] {
        &self.texels
    }

    /// Sample at `rgb` (0..1): one bilinear tap in each of the two nearest
    /// blue slices, blended by the fractional blue coordinate.
    pub fn sample(&self, rgb: Vec3) -> Vec3 {
        let rgb = rgb.clamp(Vec3::ZERO, Vec3::ONE);
        let max = (self.levels - 1) as f32;
        let blue = rgb.z * max;
        let slice0 = blue.floor() as u32;
        let slice1 = (slice0 + 1).min(self.levels - 1);
        let frac = blue - slice0 as f32;

        let a = self.tap(slice0, rgb.x * max, rgb.y * max);
        let b = self.tap(slice1, rgb.x * max, rgb.y * max);
        a.lerp(b, frac)
    }

    /// Bilinear tap at level coordinates `(r, g)` inside one slice.
    fn tap(&self, slice: u32, r: f32, g: f32) -> Vec3 {
        let origin = UVec2::new(slice % self.tiles, slice / self.tiles) * self.levels;
        let last = self.levels - 1;
        let r0 = (r.floor() as u32).min(last);
        let g0 = (g.floor() as u32).min(last);
        let r1 = (r0 + 1).min(last);
        let g1 = (g0 + 1).min(last);
        let fr = r - r0 as f32;
        let fg = g - g0 as f32;

        let top = self.texel(origin, r0, g0).lerp(self.texel(origin, r1, g0), fr);
        let bottom = self.texel(origin, r0, g1).lerp(self.texel(origin, r1, g1), fr);
        top.lerp(bottom, fg)
    }

    fn texel(&self, origin: UVec2, r: u32, g: u32) -> Vec3 {
        let index = ((origin.y + g) * self.width + origin.x + r) as usize;
        let [tr, tg, tb, _] = self.texels[index];
        Vec3::new(tr as f32, tg as f32, tb as f32) / 255.0
    }
}

fn quantize(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
