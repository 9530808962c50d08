//! Pinhole camera and stratified ray generation.

use ember_math::{Ray, Vec3};
use rand::Rng;

/// A pinhole camera with a precomputed image-plane basis.
///
/// Everything is fixed at construction: the eye, the per-pixel step
/// vectors `du` (up) and `dl` (left), and the top-left corner of the
/// image plane at unit distance.
#[derive(Clone, Debug)]
pub struct Camera {
    eye: Vec3,
    du: Vec3,
    dl: Vec3,
    top_left: Vec3,
    width: u32,
    height: u32,
}

impl Camera {
    /// Build a camera from its resolved parameters.
    ///
    /// `fovy` is the vertical field of view in degrees; the image-plane
    /// basis is scaled by `2 tan(fovy/2) / height` so pixel steps are
    /// uniform.
    pub fn new(eye: Vec3, lookat: Vec3, up: Vec3, fovy: f32, width: u32, height: u32) -> Self {
        let forward = (lookat - eye).normalize();
        let u = up.normalize();
        let l = u.cross(forward);

        let scale = 2.0 * (fovy.to_radians() / 2.0).tan() / height as f32;
        let du = u * scale;
        let dl = l * scale;

        let top_left = eye + forward + (du * height as f32 + dl * width as f32) * 0.5;

        Self {
            eye,
            du,
            dl,
            top_left,
            width,
            height,
        }
    }

    /// Image width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The camera position.
    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    /// Generate a ray through pixel (x, y) with stratified jitter.
    ///
    /// The pixel is subdivided into `stratify_size` x `stratify_size`
    /// cells; a random cell is picked, then a random offset inside it.
    /// This trades the clumping of pure uniform jitter for lower
    /// aliasing variance.
    pub fn cast_ray(&self, x: u32, y: u32, stratify_size: u32, rng: &mut impl Rng) -> Ray {
        let (jx, jy) = stratified_jitter(stratify_size, rng);

        let direction = (self.top_left
            - self.dl * (x as f32 + jx)
            - self.du * (y as f32 + jy)
            - self.eye)
            .normalize();

        Ray::new(self.eye, direction)
    }
}

/// Pick a random cell of an n-by-n grid, then a random point inside it.
/// Returns offsets in [0, 1).
fn stratified_jitter(n: u32, rng: &mut impl Rng) -> (f32, f32) {
    let n = n.max(1);
    let cell_x = rng.gen_range(0..n) as f32;
    let cell_y = rng.gen_range(0..n) as f32;
    let x = (cell_x + rng.gen::<f32>()) / n as f32;
    let y = (cell_y + rng.gen::<f32>()) / n as f32;
    (x, y)
}
