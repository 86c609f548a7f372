//! CPU-side triangle meshes and the procedural placeholder bean

mod bean;
mod mesh;
mod sphere;

pub use bean::{generate_bean, BeanShape};
pub use mesh::{fit_transform, Mesh};
pub use sphere::uv_sphere;
