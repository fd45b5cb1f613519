use core::ops::Range;

use crate::{
    cube::Cube,
    hit::{Hit, Record},
    material::Material,
    sphere::Sphere,
    Ray,
};
use nalgebra::Vector3;

#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    Sphere(Sphere),
    Cube(Cube),
}

impl Hit for Primitive {
    fn hit(&self, ray: &Ray, interval: Range<f64>) -> Option<Record<'_>> {
        match self {
            Self::Sphere(sphere) => sphere.hit(ray, interval),
            Self::Cube(cube) => cube.hit(ray, interval),
        }
    }
}

impl From<Sphere> for Primitive {
    fn from(sphere: Sphere) -> Self {
        Self::Sphere(sphere)
    }
}

impl From<Cube> for Primitive {
    fn from(cube: Cube) -> Self {
        Self::Cube(cube)
    }
}

/// Owns every primitive (and through them every material) for the render.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    primitives: Vec<Primitive>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, primitive: impl Into<Primitive>) {
        self.primitives.push(primitive.into());
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Red ball on a yellow ground between a brass cube and a glass cube.
    pub fn demo() -> Self {
        let mut scene = Self::single_sphere();
        scene.push(Sphere::new(
            Vector3::new(0.0, -100.5, -1.0),
            100.0,
            Material::lambertian(Vector3::new(0.8, 0.8, 0.0)),
        ));
        scene.push(Cube::new(
            Vector3::new(-0.7, 0.0, -1.0),
            0.5,
            Material::metal(Vector3::new(0.8, 0.6, 0.2), 0.01),
        ));
        scene.push(Cube::new(
            Vector3::new(0.7, 0.0, -1.0),
            0.5,
            Material::dielectric(1.5),
        ));
        scene
    }

    pub fn single_sphere() -> Self {
        let mut scene = Self::new();
        scene.push(Sphere::new(
            Vector3::new(0.0, 0.0, -1.0),
            0.25,
            Material::lambertian(Vector3::new(0.8, 0.3, 0.3)),
        ));
        scene
    }
}

impl FromIterator<Primitive> for Scene {
    fn from_iter<I: IntoIterator<Item = Primitive>>(iter: I) -> Self {
        Self {
            primitives: iter.into_iter().collect(),
        }
    }
}

impl Hit for Scene {
    fn hit(&self, ray: &Ray, interval: Range<f64>) -> Option<Record<'_>> {
        let mut best: Option<Record<'_>> = None;
        for primitive in &self.primitives {
            let end = best.map_or(interval.end, |record| record.t);
            if let Some(record) = primitive.hit(ray, interval.start..end) {
                best = Some(record);
            }
        }
        best
    }
}
