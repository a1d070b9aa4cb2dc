use image::{DynamicImage, ImageBuffer, Luma, Rgb};
use ndarray::Array2;

use super::real::RealGrid;

type Gray16Image = ImageBuffer<Luma<u16>, Vec<u16>>;
type Rgb16Image = ImageBuffer<Rgb<u16>, Vec<u16>>;

fn to_u16(v: f64) -> u16 {
    (v.clamp(0.0, 1.0) * 65535.0).round() as u16
}

impl RealGrid {
    /// Decode an image plane into a grid, luminance scaled to `[0, 1]`.
    pub fn from_image(img: &DynamicImage) -> Self {
        let gray = img.to_luma16();
        let (w, h) = gray.dimensions();
        let mut data = Array2::<f64>::zeros((h as usize, w as usize));

        for (col, row, pixel) in gray.enumerate_pixels() {
            data[[row as usize, col as usize]] = pixel.0[0] as f64 / 65535.0;
        }

        RealGrid::from_array(data)
    }

    /// Extract one channel (0 = red, 1 = green, 2 = blue), scaled to `[0, 1]`.
    pub fn from_image_channel(img: &DynamicImage, channel: usize) -> Self {
        assert!(channel < 3, "RGB channel index {channel} out of range");
        let rgb = img.to_rgb16();
        let (w, h) = rgb.dimensions();
        let mut data = Array2::<f64>::zeros((h as usize, w as usize));

        for (col, row, pixel) in rgb.enumerate_pixels() {
            data[[row as usize, col as usize]] = pixel.0[channel] as f64 / 65535.0;
        }

        RealGrid::from_array(data)
    }
}

/// Convert a grid into a 16-bit grayscale image. Values are clamped to `[0, 1]`.
pub fn grid_to_gray_image(grid: &RealGrid) -> Gray16Image {
    let (h, w) = grid.shape();
    let mut pixels: Vec<u16> = Vec::with_capacity(h * w);
    pixels.extend(grid.iter().map(to_u16));

    ImageBuffer::from_raw(w as u32, h as u32, pixels)
        .expect("buffer size matches dimensions")
}

/// Combine three same-shaped grids into one 16-bit RGB image, one grid per plane.
pub fn grids_to_rgb_image(red: &RealGrid, green: &RealGrid, blue: &RealGrid) -> Rgb16Image {
    red.assert_same_shape(green, "grids_to_rgb_image");
    red.assert_same_shape(blue, "grids_to_rgb_image");
    let (h, w) = red.shape();

    let mut pixels: Vec<u16> = Vec::with_capacity(h * w * 3);
    for ((r, g), b) in red.iter().zip(green.iter()).zip(blue.iter()) {
        pixels.push(to_u16(r));
        pixels.push(to_u16(g));
        pixels.push(to_u16(b));
    }

    ImageBuffer::from_raw(w as u32, h as u32, pixels)
        .expect("buffer size matches dimensions")
}
