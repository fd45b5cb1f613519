//! Progressive stochastic ray tracer.
//!
//! Spheres and cubes lit by a sky gradient, three materials (diffuse, metal,
//! glass), rendered either by an adaptive row-splitting queue or by
//! progressive per-pass accumulation across a pool of worker threads.

pub mod camera;
pub mod cube;
pub mod display;
pub mod error;
pub mod frame;
pub mod hit;
pub mod integrator;
pub mod material;
pub mod progressive;
pub mod queue;
pub mod ray;
pub mod scene;
pub mod session;
pub mod sphere;
#[cfg(feature = "window")]
pub mod window;

pub use camera::Camera;
pub use cube::Cube;
pub use error::{RenderError, Result};
pub use frame::FrameBuffer;
pub use hit::Hit;
pub use material::Material;
pub use ray::Ray;
pub use scene::{Primitive, Scene};
pub use session::{Schedule, Session, Settings};
pub use sphere::Sphere;
