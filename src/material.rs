use nalgebra::Vector3;
use rand::Rng;

use crate::{hit::Record, Ray};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Material {
    Lambertian { albedo: Vector3<f64> },
    Metal { albedo: Vector3<f64>, fuzz: f64 },
    Dielectric { refractive_index: f64 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scatter {
    pub attenuation: Vector3<f64>,
    pub ray: Ray,
}

impl Material {
    pub fn lambertian(albedo: Vector3<f64>) -> Self {
        Self::Lambertian { albedo }
    }

    /// Fuzz is clamped to `[0, 1]`.
    pub fn metal(albedo: Vector3<f64>, fuzz: f64) -> Self {
        Self::Metal {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }

    pub fn dielectric(refractive_index: f64) -> Self {
        Self::Dielectric { refractive_index }
    }

    /// `None` means the ray was absorbed.
    pub fn scatter<R: Rng + ?Sized>(
        &self,
        ray: &Ray,
        record: &Record,
        rng: &mut R,
    ) -> Option<Scatter> {
        match *self {
            Self::Lambertian { albedo } => {
                let direction = record.normal + random_in_unit_sphere(rng);
                Some(Scatter {
                    attenuation: albedo,
                    ray: Ray::new(record.point, direction),
                })
            }
            Self::Metal { albedo, fuzz } => {
                let mut direction = reflect(ray.direction(), record.normal);
                if fuzz > 0.0 {
                    direction += fuzz * random_in_unit_sphere(rng);
                }
                let scattered = Ray::new(record.point, direction);
                (scattered.direction().dot(&record.normal) > 0.0).then_some(Scatter {
                    attenuation: albedo,
                    ray: scattered,
                })
            }
            Self::Dielectric { refractive_index } => {
                let direction = ray.direction();
                let cosine = direction.dot(&record.normal);
                let (outward_normal, eta, cosine) = if cosine > 0.0 {
                    (-record.normal, refractive_index, refractive_index * cosine)
                } else {
                    (record.normal, 1.0 / refractive_index, -cosine)
                };
                let reflected = reflect(direction, record.normal);
                let scattered = match refract(direction, outward_normal, eta) {
                    Some(refracted) if rng.gen::<f64>() >= schlick(cosine, refractive_index) => {
                        refracted
                    }
                    _ => reflected,
                };
                Some(Scatter {
                    attenuation: Vector3::new(1.0, 1.0, 1.0),
                    ray: Ray::new(record.point, scattered),
                })
            }
        }
    }
}

pub fn reflect(v: Vector3<f64>, n: Vector3<f64>) -> Vector3<f64> {
    v - 2.0 * v.dot(&n) * n
}

/// `None` on total internal reflection.
pub fn refract(v: Vector3<f64>, n: Vector3<f64>, eta: f64) -> Option<Vector3<f64>> {
    let uv = v.normalize();
    let dt = uv.dot(&n);
    let discriminant = 1.0 - eta * eta * (1.0 - dt * dt);
    (discriminant > 0.0).then(|| eta * (uv - n * dt) - n * discriminant.sqrt())
}

pub fn schlick(cosine: f64, refractive_index: f64) -> f64 {
    let r0 = ((1.0 - refractive_index) / (1.0 + refractive_index)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}

/// Rejection sampled point strictly inside the unit sphere.
pub fn random_in_unit_sphere<R: Rng + ?Sized>(rng: &mut R) -> Vector3<f64> {
    loop {
        let p = 2.0 * Vector3::new(rng.gen::<f64>(), rng.gen::<f64>(), rng.gen::<f64>())
            - Vector3::new(1.0, 1.0, 1.0);
        if p.norm_squared() < 1.0 {
            return p;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn record(material: &Material, normal: Vector3<f64>) -> Record<'_> {
        Record {
            t: 1.0,
            point: Vector3::zeros(),
            normal,
            material,
        }
    }

    #[test]
    fn unit_sphere_samples_stay_inside() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            assert!(random_in_unit_sphere(&mut rng).norm_squared() < 1.0);
        }
    }

    #[test]
    fn lambertian_always_scatters_with_albedo() {
        let albedo = Vector3::new(0.8, 0.3, 0.3);
        let material = Material::lambertian(albedo);
        let rec = record(&material, Vector3::new(0.0, 1.0, 0.0));
        let ray = Ray::new(Vector3::new(0.0, 1.0, 0.0), Vector3::new(0.0, -1.0, 0.0));
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..200 {
            let scatter = material.scatter(&ray, &rec, &mut rng).unwrap();
            assert_eq!(scatter.attenuation, albedo);
            assert!((scatter.ray.direction().norm() - 1.0).abs() < 1e-9);
            assert!(scatter.ray.direction().y > 0.0);
        }
    }

    #[test]
    fn polished_metal_is_an_exact_mirror() {
        let material = Material::metal(Vector3::new(0.8, 0.6, 0.2), 0.0);
        let normal = Vector3::new(0.0, 1.0, 0.0);
        let rec = record(&material, normal);
        let ray = Ray::new(Vector3::new(-1.0, 1.0, 0.0), Vector3::new(1.0, -1.0, 0.0));
        let mut rng = StdRng::seed_from_u64(3);
        let scatter = material.scatter(&ray, &rec, &mut rng).unwrap();
        let expected = reflect(ray.direction(), normal);
        assert!((scatter.ray.direction() - expected).norm() < 1e-12);
        assert!((scatter.ray.direction() - Vector3::new(1.0, 1.0, 0.0).normalize()).norm() < 1e-12);
    }

    #[test]
    fn metal_absorbs_rays_below_the_surface() {
        let material = Material::metal(Vector3::new(0.8, 0.8, 0.8), 0.0);
        // Normal facing away from the incoming side: reflection goes under.
        let rec = record(&material, Vector3::new(0.0, -1.0, 0.0));
        let ray = Ray::new(Vector3::new(-1.0, 1.0, 0.0), Vector3::new(1.0, -1.0, 0.0));
        let mut rng = StdRng::seed_from_u64(3);
        assert!(material.scatter(&ray, &rec, &mut rng).is_none());
    }

    #[test]
    fn metal_fuzz_is_clamped() {
        assert_eq!(
            Material::metal(Vector3::zeros(), 4.0),
            Material::Metal {
                albedo: Vector3::zeros(),
                fuzz: 1.0
            }
        );
    }

    #[test]
    fn dielectric_never_absorbs() {
        let material = Material::dielectric(1.5);
        let mut rng = StdRng::seed_from_u64(11);
        for normal in [Vector3::new(0.0, 1.0, 0.0), Vector3::new(0.0, -1.0, 0.0)] {
            let rec = record(&material, normal);
            for i in 0..100 {
                let angle = i as f64 / 100.0 * std::f64::consts::FRAC_PI_2;
                let ray = Ray::new(Vector3::zeros(), Vector3::new(angle.sin(), -angle.cos(), 0.0));
                let scatter = material.scatter(&ray, &rec, &mut rng).unwrap();
                assert_eq!(scatter.attenuation, Vector3::new(1.0, 1.0, 1.0));
                assert!((scatter.ray.direction().norm() - 1.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn total_internal_reflection_forces_mirror() {
        let material = Material::dielectric(1.5);
        // Exiting glass at a grazing angle: sin > 1/1.5.
        let normal = Vector3::new(0.0, 1.0, 0.0);
        let rec = record(&material, normal);
        let ray = Ray::new(Vector3::zeros(), Vector3::new(1.0, 0.2, 0.0));
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..50 {
            let scatter = material.scatter(&ray, &rec, &mut rng).unwrap();
            let expected = reflect(ray.direction(), normal);
            assert!((scatter.ray.direction() - expected).norm() < 1e-12);
        }
    }

    #[test]
    fn head_on_glass_mostly_refracts() {
        let material = Material::dielectric(1.5);
        let rec = record(&material, Vector3::new(0.0, 1.0, 0.0));
        let ray = Ray::new(Vector3::new(0.0, 1.0, 0.0), Vector3::new(0.0, -1.0, 0.0));
        let mut rng = StdRng::seed_from_u64(9);
        let through = (0..1000)
            .filter(|_| material.scatter(&ray, &rec, &mut rng).unwrap().ray.direction().y < 0.0)
            .count();
        // Normal incidence reflectance is 0.04.
        assert!(through > 900, "{through}");
    }

    #[test]
    fn refract_fails_past_critical_angle() {
        let n = Vector3::new(0.0, -1.0, 0.0);
        assert!(refract(Vector3::new(1.0, 0.2, 0.0), n, 1.5).is_none());
        let straight = refract(Vector3::new(0.0, 1.0, 0.0), n, 1.5).unwrap();
        assert!((straight - Vector3::new(0.0, 1.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn schlick_matches_reference_values() {
        assert!((schlick(1.0, 1.5) - 0.04).abs() < 1e-12);
        assert!((schlick(0.0, 1.5) - 1.0).abs() < 1e-12);
    }
}
