mod aabb;
mod color;
mod sphere;

pub use aabb::AABB;
pub use color::{hex_to_rgb, linear_to_srgb, srgb_to_linear};
pub use sphere::BoundingSphere;
