//! Scene assembly and the path-tracing integrator.

use std::time::Instant;

use ember_core::{Environment, Point, SceneData, SceneError};
use ember_math::{Ray, Vec3};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::camera::Camera;
use crate::film::Film;
use crate::material::Material;
use crate::mesh::Mesh;
use crate::settings::RenderSettings;

/// The nearest surface a ray struck.
#[derive(Clone, Copy, Debug)]
pub struct SceneHit {
    /// Ray parameter at the hit.
    pub t: f32,
    /// Interpolated surface point.
    pub point: Point,
    /// Index of the mesh that was struck.
    pub mesh: usize,
}

/// A renderable scene: meshes with built BVHs, the light list, and the
/// environment map.
pub struct Scene {
    meshes: Vec<Mesh>,
    lights: Vec<usize>,
    environment: Environment,
    settings: RenderSettings,
}

impl Scene {
    /// Build a scene from raw mesh data.
    ///
    /// Emissive overrides are applied by material name before materials
    /// are resolved, so a plain material can be promoted to an area
    /// light without touching the mesh source. Every emissive mesh must
    /// have positive surface area, otherwise it could never be sampled.
    pub fn new(data: SceneData, settings: RenderSettings) -> Result<Self, SceneError> {
        if data.meshes.is_empty() {
            return Err(SceneError::EmptyScene);
        }

        let start = Instant::now();
        let mut meshes = Vec::with_capacity(data.meshes.len());
        let mut lights = Vec::new();
        let mut light_area = 0.0f32;

        for (index, mut mesh_data) in data.meshes.into_iter().enumerate() {
            if let Some(radiance) = data.emissive_overrides.get(&mesh_data.material.name) {
                mesh_data.material.emissive = *radiance;
            }

            let material = Material::new(&mesh_data.material, settings.threshold_method);
            let name = mesh_data.material.name.clone();
            let mesh = Mesh::new(mesh_data, material, &settings);

            if mesh.is_emissive() {
                if mesh.area() <= 0.0 {
                    return Err(SceneError::DegenerateMesh(name));
                }
                lights.push(index);
                light_area += mesh.area();
            }
            meshes.push(mesh);
        }

        log::info!(
            "built scene: {} meshes, {} lights (area {:.4}) in {:.3}s",
            meshes.len(),
            lights.len(),
            light_area,
            start.elapsed().as_secs_f32()
        );

        Ok(Self {
            meshes,
            lights,
            environment: data.environment,
            settings,
        })
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    /// Indices of the emissive meshes.
    pub fn lights(&self) -> &[usize] {
        &self.lights
    }

    /// Find the nearest intersection of `ray` with any mesh.
    pub fn trace(&self, ray: &Ray) -> Option<SceneHit> {
        let mut nearest: Option<SceneHit> = None;
        for (index, mesh) in self.meshes.iter().enumerate() {
            if let Some((t, point)) = mesh.intersect(ray, self.settings.epsilon) {
                if nearest.as_ref().map_or(true, |hit| t < hit.t) {
                    nearest = Some(SceneHit {
                        t,
                        point,
                        mesh: index,
                    });
                }
            }
        }
        nearest
    }

    /// Evaluate outgoing radiance at a hit point.
    ///
    /// Emission is added first. Dielectric surfaces spawn a single
    /// reflected or transmitted ray and return. Everything else takes
    /// direct lighting from every area light, then one BRDF-sampled
    /// indirect bounce; indirect hits on lights are discarded since
    /// their contribution is already counted by the direct term.
    /// Russian roulette kicks in past `rr_threshold` bounces, and
    /// `max_depth` is a hard cap on recursion either way.
    fn shade(&self, ray: &Ray, point: &Point, index: usize, bounce: u32, rng: &mut SmallRng) -> Vec3 {
        let mesh = &self.meshes[index];
        let material = mesh.material();

        let mut radiance = material.emissive();
        if bounce >= self.settings.max_depth {
            return radiance;
        }

        let position = point.position;
        let normal = point.normal;
        let reflection = ray.reflect(normal);

        let past_threshold = bounce >= self.settings.rr_threshold;
        let rr = if past_threshold {
            self.settings.rr_probability
        } else {
            1.0
        };

        if material.is_dielectric() {
            if !past_threshold || rng.gen::<f32>() < self.settings.rr_probability {
                let (direction, albedo) = material.refract(normal, ray, rng);
                let next = Ray::new(position, direction);
                match self.trace(&next) {
                    Some(hit) => {
                        radiance +=
                            self.shade(&next, &hit.point, hit.mesh, bounce + 1, rng) * albedo / rr;
                    }
                    None => radiance += self.environment.color(direction) * albedo / rr,
                }
            }
            return radiance;
        }

        let texture_color = mesh.color(point.uv);

        // Direct lighting: sample every light, not one light at random.
        // The per-light pdf is then 1/area and convergence is faster for
        // scenes with a handful of lights.
        for &light_index in &self.lights {
            let light = &self.meshes[light_index];
            let mut sum = Vec3::ZERO;
            for _ in 0..self.settings.samples_per_light {
                let Some(sample) = light.sample(rng) else {
                    break;
                };
                let to_light = sample.position - position;
                let squared_distance = to_light.length_squared();
                if squared_distance <= self.settings.epsilon {
                    continue;
                }
                let direction = to_light / squared_distance.sqrt();

                // Visible only if the nearest hit is the sampled point itself
                let shadow = Ray::new(position, direction);
                let Some(hit) = self.trace(&shadow) else {
                    continue;
                };
                if (hit.point.position - sample.position).length_squared()
                    >= self.settings.epsilon
                {
                    continue;
                }

                let cosine0 = normal.dot(direction).max(0.0);
                let cosine1 = sample.normal.dot(-direction).max(0.0);
                let brdf = if rng.gen::<f32>() <= material.threshold() {
                    material.diffuse_brdf() * texture_color
                } else {
                    material.specular_brdf(reflection, direction)
                };
                sum += light.material().emissive() * brdf * cosine0 * cosine1 * light.area()
                    / squared_distance;
            }
            radiance += sum / self.settings.samples_per_light.max(1) as f32;
        }

        // Indirect bounce
        if !past_threshold || rng.gen::<f32>() < self.settings.rr_probability {
            let (direction, albedo) = material.sample(normal, reflection, texture_color, rng);
            let next = Ray::new(position, direction);
            match self.trace(&next) {
                Some(hit) => {
                    if !self.meshes[hit.mesh].is_emissive() {
                        radiance +=
                            self.shade(&next, &hit.point, hit.mesh, bounce + 1, rng) * albedo / rr;
                    }
                }
                None => radiance += self.environment.color(direction) * albedo / rr,
            }
        }

        radiance
    }

    /// Accumulate one radiance sample per pixel into `film`.
    ///
    /// Pixels are independent, so the pass is a flat parallel loop with
    /// a per-pixel RNG seeded from the pass and pixel index. The same
    /// (pass, pixel) pair always produces the same sample.
    pub fn sample(&self, camera: &Camera, film: &mut Film, pass: u32) {
        let width = camera.width();
        let start = Instant::now();

        film.samples_mut()
            .par_iter_mut()
            .enumerate()
            .for_each(|(index, pixel)| {
                let x = index as u32 % width;
                let y = index as u32 / width;
                let mut rng = SmallRng::seed_from_u64(
                    (pass as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ index as u64,
                );

                let ray = camera.cast_ray(x, y, self.settings.stratify_size, &mut rng);
                match self.trace(&ray) {
                    None => *pixel += self.environment.color(ray.direction()),
                    Some(hit) => {
                        let material = self.meshes[hit.mesh].material();
                        if material.is_emissive() {
                            // Lights seen directly show their radiance
                            *pixel += material.emissive();
                        } else {
                            *pixel += self.shade(&ray, &hit.point, hit.mesh, 0, &mut rng);
                        }
                    }
                }
            });

        log::debug!(
            "pass {} finished in {:.3}s",
            pass,
            start.elapsed().as_secs_f32()
        );
    }

    /// Run `samples_per_pixel` passes and return the accumulated film.
    pub fn render(&self, camera: &Camera) -> Film {
        let mut film = Film::new(camera.width(), camera.height());
        let passes = self.settings.samples_per_pixel;
        let start = Instant::now();

        for pass in 0..passes {
            self.sample(camera, &mut film, pass);
            if (pass + 1) % 16 == 0 || pass + 1 == passes {
                log::info!("{}/{} passes", pass + 1, passes);
            }
        }

        log::info!(
            "rendered {} passes in {:.3}s",
            passes,
            start.elapsed().as_secs_f32()
        );
        film
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_core::{MaterialParams, MeshData, Texture};
    use ember_math::Vec2;

    // A quad in the y = `height` plane spanning [-half, half]^2 with the
    // normal pointing along `normal`.
    fn quad(half: f32, height: f32, normal: Vec3, material: MaterialParams) -> MeshData {
        let corner = |x: f32, z: f32| {
            Point::new(
                Vec3::new(x, height, z),
                normal,
                Vec2::new((x / half + 1.0) * 0.5, (z / half + 1.0) * 0.5),
            )
        };
        let p00 = corner(-half, -half);
        let p10 = corner(half, -half);
        let p01 = corner(-half, half);
        let p11 = corner(half, half);
        MeshData::new(vec![[p00, p10, p11], [p00, p11, p01]], material)
    }

    fn light_params(radiance: Vec3) -> MaterialParams {
        MaterialParams {
            emissive: radiance,
            ..MaterialParams::diffuse("light", Vec3::ZERO)
        }
    }

    #[test]
    fn test_empty_scene_is_rejected() {
        let result = Scene::new(SceneData::new(), RenderSettings::default());
        assert!(matches!(result, Err(SceneError::EmptyScene)));
    }

    #[test]
    fn test_zero_area_light_is_rejected() {
        let p = Point::new(Vec3::ZERO, Vec3::Y, Vec2::ZERO);
        let mut data = SceneData::new();
        data.push(MeshData::new(vec![[p, p, p]], light_params(Vec3::ONE)));

        let result = Scene::new(data, RenderSettings::default());
        assert!(matches!(result, Err(SceneError::DegenerateMesh(_))));
    }

    #[test]
    fn test_emissive_override_promotes_mesh_to_light() {
        let mut data = SceneData::new();
        data.push(quad(
            1.0,
            0.0,
            Vec3::Y,
            MaterialParams::diffuse("ceiling", Vec3::ONE),
        ));
        data.override_emissive("ceiling", Vec3::splat(10.0));

        let scene = Scene::new(data, RenderSettings::default()).unwrap();
        assert_eq!(scene.lights(), &[0]);
        assert_eq!(scene.meshes()[0].material().emissive(), Vec3::splat(10.0));
    }

    #[test]
    fn test_trace_picks_nearest_mesh() {
        let mut data = SceneData::new();
        data.push(quad(
            1.0,
            -2.0,
            Vec3::Y,
            MaterialParams::diffuse("far", Vec3::ONE),
        ));
        data.push(quad(
            1.0,
            -1.0,
            Vec3::Y,
            MaterialParams::diffuse("near", Vec3::ONE),
        ));
        let scene = Scene::new(data, RenderSettings::default()).unwrap();

        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Y);
        let hit = scene.trace(&ray).unwrap();
        assert_eq!(hit.mesh, 1);
        assert!((hit.t - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_escaped_rays_see_the_environment() {
        let sky = Vec3::new(0.2, 0.4, 0.8);
        let mut data = SceneData::new();
        data.push(quad(
            1.0,
            -5.0,
            Vec3::Y,
            MaterialParams::diffuse("floor", Vec3::ONE),
        ));
        data.environment = Environment::new(Texture::from_pixels(
            1,
            1,
            vec![[sky.x, sky.y, sky.z]],
        ));
        let scene = Scene::new(data, RenderSettings::default()).unwrap();

        // Camera looks up, away from the floor
        let camera = Camera::new(Vec3::ZERO, Vec3::Y, Vec3::Z, 40.0, 2, 2);
        let mut film = Film::new(2, 2);
        scene.sample(&camera, &mut film, 0);
        for pixel in film.samples() {
            assert!((*pixel - sky).length() < 1e-4);
        }
    }

    #[test]
    fn test_primary_hit_on_light_returns_its_radiance() {
        let radiance = Vec3::new(5.0, 4.0, 3.0);
        let mut data = SceneData::new();
        data.push(quad(2.0, 1.0, Vec3::NEG_Y, light_params(radiance)));
        let scene = Scene::new(data, RenderSettings::default()).unwrap();

        let camera = Camera::new(Vec3::ZERO, Vec3::Y, Vec3::Z, 40.0, 2, 2);
        let mut film = Film::new(2, 2);
        scene.sample(&camera, &mut film, 0);
        for pixel in film.samples() {
            assert!((*pixel - radiance).length() < 1e-4);
        }
    }

    // A small light directly above a diffuse floor. The direct term at
    // the point under the light is L * (rho/pi) * cos0 * cos1 * A / d^2
    // with both cosines ~1, and the single indirect bounce can only
    // escape to an empty environment, so the mean over many shade calls
    // must match the closed form.
    #[test]
    fn test_direct_lighting_matches_closed_form() {
        let radiance = Vec3::splat(20.0);
        let rho = Vec3::new(0.6, 0.5, 0.4);
        let half = 0.01;
        let area = (2.0 * half) * (2.0 * half);

        let mut data = SceneData::new();
        data.push(quad(1.0, 0.0, Vec3::Y, MaterialParams::diffuse("floor", rho)));
        data.push(quad(half, 1.0, Vec3::NEG_Y, light_params(radiance)));
        let scene = Scene::new(data, RenderSettings::default()).unwrap();

        // Offset so the primary ray misses the light and lands on the
        // floor just beside the point directly beneath it
        let ray = Ray::new(Vec3::new(0.05, 2.0, 0.05), Vec3::NEG_Y);
        let hit = scene.trace(&ray).unwrap();
        assert_eq!(hit.mesh, 0);

        let mut rng = SmallRng::seed_from_u64(7);
        let mut mean = Vec3::ZERO;
        let runs = 2000;
        for _ in 0..runs {
            mean += scene.shade(&ray, &hit.point, hit.mesh, 0, &mut rng);
        }
        mean /= runs as f32;

        let expected = radiance * (rho / std::f32::consts::PI) * area;
        assert!(
            (mean - expected).length() < expected.length() * 0.05,
            "mean {mean:?} expected {expected:?}"
        );
    }

    #[test]
    fn test_occluded_light_contributes_nothing() {
        let mut data = SceneData::new();
        data.push(quad(
            1.0,
            0.0,
            Vec3::Y,
            MaterialParams::diffuse("floor", Vec3::splat(0.5)),
        ));
        // Blocker halfway between the floor and the light
        data.push(quad(
            0.5,
            0.5,
            Vec3::Y,
            MaterialParams::diffuse("blocker", Vec3::ZERO),
        ));
        data.push(quad(0.05, 1.0, Vec3::NEG_Y, light_params(Vec3::splat(20.0))));
        let scene = Scene::new(data, RenderSettings::default()).unwrap();

        let ray = Ray::new(Vec3::new(0.0, -1.0, 0.0), Vec3::Y);
        let hit = scene.trace(&ray).unwrap();
        assert_eq!(hit.mesh, 0);

        // zero-albedo blocker kills indirect light too
        let mut rng = SmallRng::seed_from_u64(11);
        for _ in 0..100 {
            let shaded = scene.shade(&ray, &hit.point, hit.mesh, 0, &mut rng);
            assert_eq!(shaded, Vec3::ZERO);
        }
    }

    #[test]
    fn test_depth_cap_terminates_recursion() {
        let mut data = SceneData::new();
        data.push(quad(
            1.0,
            0.0,
            Vec3::Y,
            MaterialParams::diffuse("floor", Vec3::splat(0.5)),
        ));
        data.push(quad(0.05, 1.0, Vec3::NEG_Y, light_params(Vec3::splat(20.0))));
        let settings = RenderSettings {
            max_depth: 0,
            ..RenderSettings::default()
        };
        let scene = Scene::new(data, settings).unwrap();

        let ray = Ray::new(Vec3::new(0.0, 2.0, 0.0), Vec3::NEG_Y);
        let hit = scene.trace(&ray).unwrap();
        let mut rng = SmallRng::seed_from_u64(3);
        // At the cap only emission survives, and the floor has none
        assert_eq!(
            scene.shade(&ray, &hit.point, hit.mesh, 0, &mut rng),
            Vec3::ZERO
        );
    }

    // Russian roulette reweights surviving paths by 1/p, so the
    // expectation of shade must not depend on where the roulette kicks
    // in or how aggressive it is. A wall bounces direct light back onto
    // the floor so the indirect term actually carries energy here.
    #[test]
    fn test_roulette_settings_do_not_shift_the_mean() {
        let mut data = SceneData::new();
        data.push(quad(
            1.0,
            0.0,
            Vec3::Y,
            MaterialParams::diffuse("floor", Vec3::splat(0.6)),
        ));
        let wall_corner = |y: f32, z: f32| {
            Point::new(Vec3::new(1.0, y, z), Vec3::NEG_X, Vec2::new(y * 0.5, (z + 1.0) * 0.5))
        };
        let w00 = wall_corner(0.0, -1.0);
        let w10 = wall_corner(2.0, -1.0);
        let w01 = wall_corner(0.0, 1.0);
        let w11 = wall_corner(2.0, 1.0);
        data.push(MeshData::new(
            vec![[w00, w10, w11], [w00, w11, w01]],
            MaterialParams::diffuse("wall", Vec3::splat(0.6)),
        ));
        data.push(quad(0.1, 1.95, Vec3::NEG_Y, light_params(Vec3::splat(20.0))));

        let mean = |rr_threshold: u32, rr_probability: f32| {
            let settings = RenderSettings {
                rr_threshold,
                rr_probability,
                ..RenderSettings::default()
            };
            let scene = Scene::new(data.clone(), settings).unwrap();
            let ray = Ray::new(Vec3::new(0.3, 3.0, 0.0), Vec3::NEG_Y);
            let hit = scene.trace(&ray).unwrap();
            assert_eq!(hit.mesh, 0);

            let mut rng = SmallRng::seed_from_u64(23);
            let runs = 8000;
            let mut sum = Vec3::ZERO;
            for _ in 0..runs {
                sum += scene.shade(&ray, &hit.point, hit.mesh, 0, &mut rng);
            }
            sum / runs as f32
        };

        let eager = mean(0, 0.5);
        let lazy = mean(3, 0.9);
        assert!(
            (eager - lazy).length() < lazy.length() * 0.15,
            "eager {eager:?} lazy {lazy:?}"
        );
    }

    #[test]
    fn test_passes_are_deterministic() {
        let mut data = SceneData::new();
        data.push(quad(
            1.0,
            -1.0,
            Vec3::Y,
            MaterialParams::diffuse("floor", Vec3::splat(0.5)),
        ));
        data.push(quad(0.2, 1.0, Vec3::NEG_Y, light_params(Vec3::splat(10.0))));
        let scene = Scene::new(data, RenderSettings::default()).unwrap();

        let camera = Camera::new(Vec3::new(0.0, 0.0, 3.0), Vec3::ZERO, Vec3::Y, 40.0, 4, 4);
        let mut a = Film::new(4, 4);
        let mut b = Film::new(4, 4);
        scene.sample(&camera, &mut a, 0);
        scene.sample(&camera, &mut b, 0);
        assert_eq!(a.samples(), b.samples());
    }
}
