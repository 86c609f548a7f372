// cli.rs - Command-line interface configuration
use std::path::PathBuf;

use clap::Parser;

use crate::config::VisualizationConfig;

#[derive(Parser, Debug, Clone)]
#[command(name = "bean-viewer")]
#[command(about = "Scroll-reactive 3D coffee bean viewer", long_about = None)]
pub struct Cli {
    /// glTF/GLB model to show, as a file path or http(s) URL
    #[arg(long, env = "BEAN_MODEL")]
    pub model: Option<String>,

    /// Give up on the model after this many milliseconds
    #[arg(long = "timeout-ms")]
    pub timeout_ms: Option<u64>,

    /// Longitude and latitude segments of the generated bean
    #[arg(long)]
    pub segments: Option<u32>,

    /// JSON file with viewer settings
    #[arg(long, env = "BEAN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Disable UI elements
    #[arg(long = "no-ui", default_value = "false")]
    pub no_ui: bool,
}

impl Cli {
    /// Flags win over whatever the config file said
    pub fn apply(&self, config: &mut VisualizationConfig) {
        if let Some(model) = &self.model {
            config.provision.source = Some(model.clone());
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.provision.timeout_ms = timeout_ms;
        }
        if let Some(segments) = self.segments {
            config.placeholder.shape = config.placeholder.shape.with_segments(segments);
        }
    }
}
