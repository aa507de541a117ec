//! Pixel buffer images.
//!
//! Images are flat RGBA-interleaved `f32` buffers, the layout the bake
//! engine writes and the compositing step slices. The procedural color grid
//! is the diagnostic pattern applied while an object is being unwrapped:
//! hue varies per cell so stretching and seams are easy to spot, with a
//! checker shading and cell border lines on top.

use std::path::Path;

use crate::error::{BakerError, Result};

/// Number of grid cells along each axis of the procedural color grid.
const GRID_CELLS: u32 = 8;

/// A named RGBA pixel buffer.
#[derive(Debug, Clone)]
pub struct Image {
    pub name: String,
    width: u32,
    height: u32,
    pixels: Vec<f32>,
}

impl Image {
    /// Create a transparent-black image of the given size.
    pub fn new(name: &str, width: u32, height: u32) -> Self {
        Self {
            name: name.to_string(),
            width,
            height,
            pixels: vec![0.0; (width * height * 4) as usize],
        }
    }

    /// Create an image from an existing RGBA pixel buffer.
    pub fn from_pixels(name: &str, width: u32, height: u32, pixels: Vec<f32>) -> Result<Self> {
        let expected = (width * height * 4) as usize;
        if pixels.len() != expected {
            return Err(BakerError::PixelBufferSize {
                expected,
                found: pixels.len(),
            });
        }
        Ok(Self {
            name: name.to_string(),
            width,
            height,
            pixels,
        })
    }

    /// Generate the diagnostic color grid pattern.
    pub fn color_grid(name: &str, width: u32, height: u32) -> Self {
        let mut image = Self::new(name, width, height);
        let cell_w = (width / GRID_CELLS).max(1);
        let cell_h = (height / GRID_CELLS).max(1);

        for y in 0..height {
            for x in 0..width {
                let cx = x / cell_w;
                let cy = y / cell_h;

                let hue = ((cx * 5 + cy * 3) % 12) as f32 / 12.0;
                let value = if (cx + cy) % 2 == 0 { 0.65 } else { 0.45 };
                let mut rgba = hsv_to_rgb(hue, 0.85, value);

                // Cell border lines.
                if x % cell_w == 0 || y % cell_h == 0 {
                    rgba = [0.9, 0.9, 0.9];
                }

                image.put_pixel(x, y, [rgba[0], rgba[1], rgba[2], 1.0]);
            }
        }

        image
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The flat RGBA pixel buffer.
    pub fn pixels(&self) -> &[f32] {
        &self.pixels
    }

    /// Replace the whole pixel buffer, validating its length.
    pub fn set_pixels(&mut self, pixels: Vec<f32>) -> Result<()> {
        let expected = (self.width * self.height * 4) as usize;
        if pixels.len() != expected {
            return Err(BakerError::PixelBufferSize {
                expected,
                found: pixels.len(),
            });
        }
        self.pixels = pixels;
        Ok(())
    }

    /// The pixel buffer as raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// RGBA value at (x, y).
    pub fn pixel(&self, x: u32, y: u32) -> [f32; 4] {
        let i = ((y * self.width + x) * 4) as usize;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    /// Write the RGBA value at (x, y).
    pub fn put_pixel(&mut self, x: u32, y: u32, rgba: [f32; 4]) {
        let i = ((y * self.width + x) * 4) as usize;
        self.pixels[i..i + 4].copy_from_slice(&rgba);
    }

    /// Merge an RGB bake with an alpha bake.
    ///
    /// The result takes its RGB channels from `rgb` and its alpha channel
    /// from `alpha`, pixel by pixel, and is named `{rgb.name}_cutout`. The
    /// two inputs must share dimensions.
    pub fn combine_alpha(rgb: &Image, alpha: &Image) -> Result<Image> {
        if rgb.width != alpha.width || rgb.height != alpha.height {
            return Err(BakerError::ImageSizeMismatch {
                a_width: rgb.width,
                a_height: rgb.height,
                b_width: alpha.width,
                b_height: alpha.height,
            });
        }

        let mut combined = Image::new(&format!("{}_cutout", rgb.name), rgb.width, rgb.height);
        for (i, out) in combined.pixels.chunks_exact_mut(4).enumerate() {
            let base = i * 4;
            out[0] = rgb.pixels[base];
            out[1] = rgb.pixels[base + 1];
            out[2] = rgb.pixels[base + 2];
            out[3] = alpha.pixels[base + 3];
        }
        Ok(combined)
    }

    /// Save the image as an 8-bit PNG.
    ///
    /// Channel values are clamped to [0, 1] before quantization.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes: Vec<u8> = self
            .pixels
            .iter()
            .map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
            .collect();
        let buffer = image::RgbaImage::from_raw(self.width, self.height, bytes)
            .expect("byte buffer sized to image dimensions");
        buffer.save(path)?;
        Ok(())
    }
}

/// Convert an HSV color (all components in [0, 1]) to RGB.
fn hsv_to_rgb(h: f32, s: f32, v: f32) -> [f32; 3] {
    let h = (h.fract() + 1.0).fract() * 6.0;
    let i = h.floor();
    let f = h - i;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    match i as u32 % 6 {
        0 => [v, t, p],
        1 => [q, v, p],
        2 => [p, v, t],
        3 => [p, q, v],
        4 => [t, p, v],
        _ => [v, p, q],
    }
}
