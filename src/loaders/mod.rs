pub mod gltf;

pub use gltf::{is_remote, load_model, load_model_from_slice};
