use core::ops::Range;

use crate::{material::Material, Ray};
use nalgebra::Vector3;

pub trait Hit {
    /// Closest intersection with `start < t < end`, if any.
    fn hit(&self, ray: &Ray, interval: Range<f64>) -> Option<Record<'_>>;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Record<'a> {
    pub t: f64,
    pub point: Vector3<f64>,
    /// Unit length. Not flipped toward the ray; materials check the side.
    pub normal: Vector3<f64>,
    pub material: &'a Material,
}

pub(crate) fn surrounds(interval: &Range<f64>, t: f64) -> bool {
    interval.start < t && t < interval.end
}
