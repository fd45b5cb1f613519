use std::path::Path;

use nalgebra::Vector3;

use crate::error::Result;

pub trait Rgba32 {
    fn to_rgba32(&self) -> (u8, u8, u8, u8);
}

impl Rgba32 for (u8, u8, u8, u8) {
    fn to_rgba32(&self) -> (u8, u8, u8, u8) {
        *self
    }
}

/// Linear radiance, square-root tone mapped and clamped to the byte range.
impl Rgba32 for Vector3<f64> {
    fn to_rgba32(&self) -> (u8, u8, u8, u8) {
        let channel = |c: f64| (c.max(0.0).sqrt() * 255.99).clamp(0.0, 255.0) as u8;
        (channel(self.x), channel(self.y), channel(self.z), 255)
    }
}

/// Index of image row `row` (counted from the bottom, as the camera does) in a
/// top-row-first buffer.
pub fn display_index(width: usize, height: usize, row: usize, col: usize) -> usize {
    (height - 1 - row) * width + col
}

/// RGBA8, row-major, top row first.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    pixel_data: Box<[u8]>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        let mut pixel_data = vec![0; width * height * 4].into_boxed_slice();
        for pixel in pixel_data.chunks_exact_mut(4) {
            pixel[3] = 255;
        }
        Self {
            width,
            height,
            pixel_data,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel_data(&self) -> &[u8] {
        &self.pixel_data
    }

    /// `y` counts from the top.
    pub fn set_pixel<T: Rgba32>(&mut self, x: usize, y: usize, color: T) {
        let start = (x + y * self.width) * 4;
        let (r, g, b, a) = color.to_rgba32();
        self.pixel_data[start..start + 4].copy_from_slice(&[r, g, b, a]);
    }

    pub fn get_pixel(&self, x: usize, y: usize) -> (u8, u8, u8, u8) {
        let start = (x + y * self.width) * 4;
        let p = &self.pixel_data[start..start + 4];
        (p[0], p[1], p[2], p[3])
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        image::save_buffer(
            path,
            &self.pixel_data,
            self.width as u32,
            self.height as u32,
            image::ColorType::Rgba8,
        )?;
        Ok(())
    }

    pub fn set_row<T: Rgba32>(&mut self, y: usize, colors: impl IntoIterator<Item = T>) {
        for (x, color) in colors.into_iter().take(self.width).enumerate() {
            self.set_pixel(x, y, color);
        }
    }
}
