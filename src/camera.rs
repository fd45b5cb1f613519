use nalgebra::Vector3;

use crate::Ray;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    origin: Vector3<f64>,
    lower_left_corner: Vector3<f64>,
    horizontal: Vector3<f64>,
    vertical: Vector3<f64>,
}

impl Default for Camera {
    /// Eye at the origin looking down -z through a 4x2 viewport at z = -1.
    fn default() -> Self {
        Self {
            origin: Vector3::zeros(),
            lower_left_corner: Vector3::new(-2.0, -1.0, -1.0),
            horizontal: Vector3::new(4.0, 0.0, 0.0),
            vertical: Vector3::new(0.0, 2.0, 0.0),
        }
    }
}

const DEGENERATE_EPSILON: f64 = 1e-12;

impl Camera {
    /// `None` when `eye` and `target` coincide or the view direction is
    /// parallel to `up`.
    pub fn look_at(
        eye: Vector3<f64>,
        target: Vector3<f64>,
        up: Vector3<f64>,
        vfov_degrees: f64,
        aspect_ratio: f64,
    ) -> Option<Self> {
        let half_height = (vfov_degrees.to_radians() / 2.0).tan();
        let half_width = aspect_ratio * half_height;
        let w = (eye - target).try_normalize(DEGENERATE_EPSILON)?;
        let u = up.cross(&w).try_normalize(DEGENERATE_EPSILON)?;
        let v = w.cross(&u);
        Some(Self {
            origin: eye,
            lower_left_corner: eye - half_width * u - half_height * v - w,
            horizontal: 2.0 * half_width * u,
            vertical: 2.0 * half_height * v,
        })
    }

    /// `(0, 0)` is the bottom-left corner of the viewport, `(1, 1)` the top-right.
    pub fn ray(&self, u: f64, v: f64) -> Ray {
        Ray::new(
            self.origin,
            self.lower_left_corner + u * self.horizontal + v * self.vertical - self.origin,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_center_looks_down_negative_z() {
        let ray = Camera::default().ray(0.5, 0.5);
        assert_eq!(ray.origin(), Vector3::zeros());
        assert!((ray.direction() - Vector3::new(0.0, 0.0, -1.0)).norm() < 1e-12);
    }

    #[test]
    fn default_top_left_corner() {
        let ray = Camera::default().ray(0.0, 1.0);
        let expected = Vector3::new(-2.0, 1.0, -1.0).normalize();
        assert!((ray.direction() - expected).norm() < 1e-12);
    }

    #[test]
    fn look_at_matches_default_when_axis_aligned() {
        // A 90 degree fov with 2:1 aspect spans the same 4x2 viewport.
        let camera = Camera::look_at(
            Vector3::zeros(),
            Vector3::new(0.0, 0.0, -1.0),
            Vector3::new(0.0, 1.0, 0.0),
            90.0,
            2.0,
        )
        .unwrap();
        for (u, v) in [(0.0, 0.0), (0.5, 0.5), (1.0, 0.25), (0.3, 1.0)] {
            let a = camera.ray(u, v).direction();
            let b = Camera::default().ray(u, v).direction();
            assert!((a - b).norm() < 1e-12, "{u} {v}");
        }
    }

    #[test]
    fn look_at_points_at_target() {
        let eye = Vector3::new(3.0, 3.0, 2.0);
        let target = Vector3::new(0.0, 0.0, -1.0);
        let camera = Camera::look_at(eye, target, Vector3::new(0.0, 1.0, 0.0), 20.0, 1.5)
            .unwrap();
        let ray = camera.ray(0.5, 0.5);
        assert_eq!(ray.origin(), eye);
        assert!((ray.direction() - (target - eye).normalize()).norm() < 1e-12);
    }

    #[test]
    fn degenerate_look_at_is_rejected() {
        let up = Vector3::new(0.0, 1.0, 0.0);
        let eye = Vector3::new(1.0, 2.0, 3.0);
        assert!(Camera::look_at(eye, eye, up, 90.0, 2.0).is_none());
        assert!(Camera::look_at(eye, eye + up * 4.0, up, 90.0, 2.0).is_none());
        assert!(Camera::look_at(eye, eye - up, up, 90.0, 2.0).is_none());
    }
}
