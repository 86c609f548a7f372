pub mod asset;
pub mod camera;
pub mod cli;
pub mod config;
pub mod controller;
pub mod core;
pub mod error;
pub mod geometry;
pub mod hud;
pub mod loaders;
pub mod math;
pub mod provision;
pub mod render_loop;
pub mod renderer;
pub mod scene;
pub mod scroll;
pub mod types;

pub use config::VisualizationConfig;
pub use controller::VisualizationController;
pub use error::{AssetError, ViewerError};
