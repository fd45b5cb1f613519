use core::ops::Range;

use crate::{
    hit::{surrounds, Hit, Record},
    material::Material,
    Ray,
};
use nalgebra::Vector3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sphere {
    pub center: Vector3<f64>,
    pub radius: f64,
    pub material: Material,
}

impl Sphere {
    pub fn new(center: Vector3<f64>, radius: f64, material: Material) -> Self {
        Self {
            center,
            radius,
            material,
        }
    }
}

impl Hit for Sphere {
    fn hit(&self, ray: &Ray, interval: Range<f64>) -> Option<Record<'_>> {
        let oc = self.center - ray.origin();
        let a = ray.direction().dot(&ray.direction());
        let h = ray.direction().dot(&oc);
        let c = oc.dot(&oc) - self.radius * self.radius;
        let d = (h * h) - (a * c);

        if d <= 0.0 {
            return None;
        }

        let mut root = (h - d.sqrt()) / a;

        if !surrounds(&interval, root) {
            root = (h + d.sqrt()) / a;
            if !surrounds(&interval, root) {
                return None;
            }
        }

        let point = ray.at(root);
        Some(Record {
            t: root,
            point,
            normal: (point - self.center) / self.radius,
            material: &self.material,
        })
    }
}
