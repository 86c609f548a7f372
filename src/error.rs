use thiserror::Error;

/// Why the external asset was replaced by the placeholder
///
/// Never fatal: the provisioner recovers from both by synthesizing the
/// placeholder bean and still settles.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetError {
    #[error("failed to load asset {source_id:?}: {reason}")]
    Load { source_id: String, reason: String },

    #[error("asset {source_id:?} did not load within {waited_ms} ms")]
    Timeout { source_id: String, waited_ms: u64 },
}

impl AssetError {
    pub fn load(source_id: impl Into<String>, err: &anyhow::Error) -> Self {
        AssetError::Load {
            source_id: source_id.into(),
            // alternate formatting keeps the whole context chain on one line
            reason: format!("{err:#}"),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, AssetError::Timeout { .. })
    }
}

/// Conditions that abandon the visualization entirely
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("no drawing surface: {0}")]
    MissingSurface(String),

    #[error("GPU initialization failed: {0}")]
    Gpu(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ViewerError>;
