use nalgebra::Vector3;
use rand::Rng;

use crate::{hit::Hit, scene::Scene, Ray};

/// Bounce limit. Paths still scattering at this depth contribute black.
pub const MAX_DEPTH: u32 = 50;

/// Lower bound of every intersection query, keeps bounces off their own surface.
pub const T_MIN: f64 = 0.001;

pub fn radiance<R: Rng + ?Sized>(ray: &Ray, scene: &Scene, depth: u32, rng: &mut R) -> Vector3<f64> {
    let Some(record) = scene.hit(ray, T_MIN..f64::INFINITY) else {
        return sky(ray);
    };
    if depth >= MAX_DEPTH {
        return Vector3::zeros();
    }
    match record.material.scatter(ray, &record, rng) {
        Some(scatter) => scatter
            .attenuation
            .component_mul(&radiance(&scatter.ray, scene, depth + 1, rng)),
        None => Vector3::zeros(),
    }
}

/// White at the horizon blending to sky blue overhead.
pub fn sky(ray: &Ray) -> Vector3<f64> {
    let white = Vector3::new(1.0, 1.0, 1.0);
    let blue = Vector3::new(0.5, 0.7, 1.0);
    let t = 0.5 * (ray.direction().y + 1.0);
    (1.0 - t) * white + t * blue
}
