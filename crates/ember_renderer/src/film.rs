//! Accumulation buffer and image resolve.

use ember_math::Vec3;
use image::RgbImage;

/// A linear-light accumulation buffer.
///
/// Each render pass adds one radiance sample per pixel; [`Film::resolve`]
/// averages the accumulated sums and applies gamma to produce a
/// displayable image.
#[derive(Clone, Debug)]
pub struct Film {
    width: u32,
    height: u32,
    samples: Vec<Vec3>,
}

impl Film {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            samples: vec![Vec3::ZERO; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Accumulated radiance sums in row-major order.
    pub fn samples(&self) -> &[Vec3] {
        &self.samples
    }

    pub fn samples_mut(&mut self) -> &mut [Vec3] {
        &mut self.samples
    }

    /// Average over `passes` samples, gamma-encode, and quantize to 8-bit.
    pub fn resolve(&self, passes: u32, gamma: f32) -> RgbImage {
        let scale = 1.0 / passes.max(1) as f32;
        let mut image = RgbImage::new(self.width, self.height);
        for (pixel, sum) in image.pixels_mut().zip(&self.samples) {
            let linear = *sum * scale;
            pixel.0 = [
                quantize(linear.x, gamma),
                quantize(linear.y, gamma),
                quantize(linear.z, gamma),
            ];
        }
        image
    }
}

fn quantize(linear: f32, gamma: f32) -> u8 {
    let encoded = linear.max(0.0).powf(1.0 / gamma);
    (encoded.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_averages_passes() {
        let mut film = Film::new(2, 1);
        film.samples_mut()[0] = Vec3::splat(4.0);
        film.samples_mut()[1] = Vec3::ZERO;

        // 4 passes averaging to 1.0 saturates the first pixel
        let image = film.resolve(4, 2.2);
        assert_eq!(image.get_pixel(0, 0).0, [255, 255, 255]);
        assert_eq!(image.get_pixel(1, 0).0, [0, 0, 0]);
    }

    #[test]
    fn test_resolve_applies_gamma() {
        let mut film = Film::new(1, 1);
        film.samples_mut()[0] = Vec3::splat(0.5);

        let image = film.resolve(1, 2.2);
        let expected = (0.5f32.powf(1.0 / 2.2) * 255.0 + 0.5) as u8;
        assert_eq!(image.get_pixel(0, 0).0, [expected; 3]);
    }

    #[test]
    fn test_quantize_clamps_overbright() {
        assert_eq!(quantize(10.0, 2.2), 255);
        assert_eq!(quantize(-1.0, 2.2), 0);
    }
}
