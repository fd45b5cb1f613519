use core::ops::Range;

use crate::{
    hit::{surrounds, Hit, Record},
    material::Material,
    Ray,
};
use nalgebra::Vector3;

const PARALLEL_EPSILON: f64 = 1e-8;

const UNIT_VERTICES: [[f64; 3]; 8] = [
    [-0.5, -0.5, -0.5],
    [0.5, -0.5, -0.5],
    [0.5, 0.5, -0.5],
    [-0.5, 0.5, -0.5],
    [-0.5, -0.5, 0.5],
    [0.5, -0.5, 0.5],
    [0.5, 0.5, 0.5],
    [-0.5, 0.5, 0.5],
];

// Vertex indices into UNIT_VERTICES plus the face normal, two per face.
const UNIT_TRIANGLES: [([usize; 3], [f64; 3]); 12] = [
    ([0, 1, 2], [0.0, 0.0, -1.0]),
    ([0, 2, 3], [0.0, 0.0, -1.0]),
    ([4, 5, 6], [0.0, 0.0, 1.0]),
    ([4, 6, 7], [0.0, 0.0, 1.0]),
    ([0, 3, 7], [-1.0, 0.0, 0.0]),
    ([0, 7, 4], [-1.0, 0.0, 0.0]),
    ([1, 2, 6], [1.0, 0.0, 0.0]),
    ([1, 6, 5], [1.0, 0.0, 0.0]),
    ([0, 1, 5], [0.0, -1.0, 0.0]),
    ([0, 5, 4], [0.0, -1.0, 0.0]),
    ([3, 2, 6], [0.0, 1.0, 0.0]),
    ([3, 6, 7], [0.0, 1.0, 0.0]),
];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    pub v0: Vector3<f64>,
    pub v1: Vector3<f64>,
    pub v2: Vector3<f64>,
    pub normal: Vector3<f64>,
}

/// Möller–Trumbore. Returns the ray parameter of the hit.
pub fn intersect_triangle(ray: &Ray, triangle: &Triangle, interval: &Range<f64>) -> Option<f64> {
    let edge1 = triangle.v1 - triangle.v0;
    let edge2 = triangle.v2 - triangle.v0;

    let pvec = ray.direction().cross(&edge2);
    let det = edge1.dot(&pvec);

    if det.abs() < PARALLEL_EPSILON {
        return None;
    }

    let inv_det = 1.0 / det;
    let tvec = ray.origin() - triangle.v0;
    let u = inv_det * tvec.dot(&pvec);

    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let qvec = tvec.cross(&edge1);
    let v = inv_det * ray.direction().dot(&qvec);

    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = inv_det * edge2.dot(&qvec);
    surrounds(interval, t).then_some(t)
}

/// Axis-aligned box made of 12 flat-shaded triangles.
#[derive(Clone, Debug, PartialEq)]
pub struct Cube {
    vertices: [Vector3<f64>; 8],
    triangles: [Triangle; 12],
    pub material: Material,
}

impl Cube {
    pub fn new(position: Vector3<f64>, size: f64, material: Material) -> Self {
        let vertices = UNIT_VERTICES.map(|v| Vector3::from(v) * size + position);
        let triangles = UNIT_TRIANGLES.map(|([a, b, c], normal)| Triangle {
            v0: vertices[a],
            v1: vertices[b],
            v2: vertices[c],
            normal: Vector3::from(normal),
        });
        Self {
            vertices,
            triangles,
            material,
        }
    }

    pub fn vertices(&self) -> &[Vector3<f64>; 8] {
        &self.vertices
    }

    pub fn triangles(&self) -> &[Triangle; 12] {
        &self.triangles
    }
}

impl Hit for Cube {
    fn hit(&self, ray: &Ray, interval: Range<f64>) -> Option<Record<'_>> {
        let mut closest = interval;
        let mut normal = None;

        for triangle in &self.triangles {
            if let Some(t) = intersect_triangle(ray, triangle, &closest) {
                closest.end = t;
                normal = Some(triangle.normal);
            }
        }

        normal.map(|normal| Record {
            t: closest.end,
            point: ray.at(closest.end),
            normal,
            material: &self.material,
        })
    }
}
