//! Surface reflectance models and their importance sampling.
//!
//! Two families share the data model: a Phong opaque surface (Lambertian
//! diffuse plus a normalized Phong glossy lobe) and a dielectric (glass)
//! surface with Fresnel-weighted reflection/transmission. A single tagged
//! enum keeps the integrator's control flow a flat match.

use std::f32::consts::PI;

use ember_core::MaterialParams;
use ember_math::{Ray, Vec3};
use rand::Rng;

use crate::settings::ThresholdMethod;

/// A surface reflectance model, fixed at scene build.
#[derive(Clone, Debug)]
pub enum Material {
    /// Opaque surface: `diffuse/pi` plus a `cos^n` specular lobe.
    Phong {
        diffuse: Vec3,
        specular: Vec3,
        emissive: Vec3,
        shininess: f32,
        /// Probability of sampling the diffuse lobe rather than the
        /// specular lobe, in [0, 1].
        threshold: f32,
    },
    /// Transparent refractive surface.
    Dielectric {
        emissive: Vec3,
        transmittance: Vec3,
        ior: f32,
    },
}

impl Material {
    /// Build a material from imported parameters.
    ///
    /// `ior > 1` selects the dielectric model; everything else is Phong.
    pub fn new(params: &MaterialParams, method: ThresholdMethod) -> Self {
        if params.ior > 1.0 {
            return Material::Dielectric {
                emissive: params.emissive,
                transmittance: params.transmittance,
                ior: params.ior,
            };
        }

        Material::Phong {
            diffuse: params.diffuse,
            specular: params.specular,
            emissive: params.emissive,
            shininess: params.shininess,
            threshold: sampling_threshold(params, method),
        }
    }

    /// The material's own emission.
    pub fn emissive(&self) -> Vec3 {
        match self {
            Material::Phong { emissive, .. } | Material::Dielectric { emissive, .. } => *emissive,
        }
    }

    /// True for light sources.
    pub fn is_emissive(&self) -> bool {
        self.emissive().length_squared() > 0.0
    }

    /// True for the glass model.
    pub fn is_dielectric(&self) -> bool {
        matches!(self, Material::Dielectric { .. })
    }

    /// Diffuse-vs-specular sampling threshold. Dielectrics never reach
    /// the lobe choice, so they report 1.
    pub fn threshold(&self) -> f32 {
        match self {
            Material::Phong { threshold, .. } => *threshold,
            Material::Dielectric { .. } => 1.0,
        }
    }

    /// View-independent Lambertian term: `diffuse / pi`.
    pub fn diffuse_brdf(&self) -> Vec3 {
        match self {
            Material::Phong { diffuse, .. } => *diffuse / PI,
            Material::Dielectric { .. } => Vec3::ZERO,
        }
    }

    /// Normalized Phong lobe evaluated between the perfect mirror
    /// direction and an outgoing direction:
    /// `specular * cos^n * (n+2)/(2 pi)`.
    pub fn specular_brdf(&self, reflection: Vec3, direction: Vec3) -> Vec3 {
        match self {
            Material::Phong {
                specular,
                shininess,
                ..
            } => {
                let cosine = reflection.dot(direction).max(0.0);
                *specular * cosine.powf(*shininess) * (*shininess + 2.0) / (2.0 * PI)
            }
            Material::Dielectric { .. } => Vec3::ZERO,
        }
    }

    /// Importance-sample an outgoing direction for a Phong surface.
    ///
    /// Returns the direction and the albedo weight
    /// `brdf(direction) * cos(direction, normal) / pdf(direction)`,
    /// algebraically simplified per branch so no near-zero pdf is ever
    /// divided by:
    /// - diffuse branch (cosine-weighted about the normal):
    ///   `diffuse * texture_color`;
    /// - specular branch (`cos^n`-weighted about the mirror direction):
    ///   `specular * (n+2)/(n+1) * max(dot(direction, normal), 0)`.
    ///
    /// `reflection` is the mirror reflection of the incoming ray.
    pub fn sample(
        &self,
        normal: Vec3,
        reflection: Vec3,
        texture_color: Vec3,
        rng: &mut impl Rng,
    ) -> (Vec3, Vec3) {
        let Material::Phong {
            diffuse,
            specular,
            shininess,
            threshold,
            ..
        } = self
        else {
            // Glass surfaces go through `refract` instead
            return (reflection, Vec3::ZERO);
        };

        if rng.gen::<f32>() <= *threshold {
            // Cosine-weighted hemisphere about the normal
            let direction = sample_lobe(normal, 1.0, rng);
            (direction, *diffuse * texture_color)
        } else {
            // cos^n lobe about the mirror-reflection direction
            let direction = sample_lobe(reflection, *shininess, rng);
            let cosine = direction.dot(normal).max(0.0);
            let albedo = *specular * (*shininess + 2.0) / (*shininess + 1.0) * cosine;
            (direction, albedo)
        }
    }

    /// Sample a reflection/transmission direction for a dielectric.
    ///
    /// The entering/exiting side is decided by the sign of
    /// `dot(normal, incident)`; Snell refraction is attempted and total
    /// internal reflection falls back to the mirror path. A single coin
    /// flip against the Schlick reflectance picks reflection (white
    /// albedo) or transmission (transmittance albedo) - an unbiased one-
    /// sample estimate of the Fresnel mixture.
    pub fn refract(&self, normal: Vec3, ray: &Ray, rng: &mut impl Rng) -> (Vec3, Vec3) {
        let Material::Dielectric {
            transmittance, ior, ..
        } = self
        else {
            return (ray.reflect(normal), Vec3::ONE);
        };

        let incident = ray.direction().normalize();
        let entering = incident.dot(normal) < 0.0;
        let (n, eta) = if entering {
            (normal, 1.0 / ior)
        } else {
            (-normal, *ior)
        };

        let cos_theta = (-incident).dot(n).min(1.0);
        let discriminant = 1.0 - eta * eta * (1.0 - cos_theta * cos_theta);

        let reflect_prob = if discriminant <= 0.0 {
            // Total internal reflection
            1.0
        } else {
            schlick(cos_theta, eta)
        };

        if rng.gen::<f32>() < reflect_prob {
            (ray.reflect(n), Vec3::ONE)
        } else {
            let refracted = eta * incident + (eta * cos_theta - discriminant.sqrt()) * n;
            (refracted.normalize(), *transmittance)
        }
    }
}

/// Derive the diffuse-vs-specular sampling threshold.
///
/// A zero specular color forces 1 (always diffuse); otherwise the chosen
/// method balances the two lobes.
fn sampling_threshold(params: &MaterialParams, method: ThresholdMethod) -> f32 {
    if params.specular.length_squared() == 0.0 {
        return 1.0;
    }
    match method {
        ThresholdMethod::Balanced => {
            let n = params.shininess;
            let t = (n + 1.0) * (1.0 - 0.5f32.powf(1.0 / (n + 1.0)));
            t / (t + 1.0)
        }
        ThresholdMethod::PeakRatio => {
            let d = params.diffuse.max_element();
            let s = params.specular.max_element();
            d / (d + s)
        }
    }
}

/// Schlick's approximation of Fresnel reflectance.
fn schlick(cosine: f32, eta: f32) -> f32 {
    let r0 = ((1.0 - eta) / (1.0 + eta)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}

/// Draw a direction from a `cos^exponent` lobe around an axis.
///
/// Inverse-CDF warping: `theta = acos(r1^(1/(exponent+1)))`, `phi`
/// uniform. Exponent 1 is the cosine-weighted hemisphere.
fn sample_lobe(axis: Vec3, exponent: f32, rng: &mut impl Rng) -> Vec3 {
    let r1: f32 = rng.gen();
    let r2: f32 = rng.gen();

    let cos_theta = r1.powf(1.0 / (exponent + 1.0));
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    let phi = r2 * 2.0 * PI;

    let (tangent, bitangent) = tangent_space(axis);
    cos_theta * axis + sin_theta * (phi.cos() * tangent + phi.sin() * bitangent)
}

/// Build an orthonormal tangent frame around a unit axis.
fn tangent_space(axis: Vec3) -> (Vec3, Vec3) {
    let tangent = if axis.x.abs() < 1e-6 && axis.y.abs() < 1e-6 {
        Vec3::X
    } else {
        Vec3::new(axis.y, -axis.x, 0.0).normalize()
    };
    (tangent, tangent.cross(axis))
}
