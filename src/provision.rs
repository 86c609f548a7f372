//! Model provisioning: one asset and one terminal outcome per boot
//!
//! A configured source is loaded on a worker thread while a countdown runs
//! on the UI thread. Whichever finishes first settles the provisioner; the
//! loser is ignored. Every failure path goes through the same fallback that
//! synthesizes the placeholder bean.

use std::thread;
use std::time::Duration;

use futures::channel::oneshot;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::asset::{LoadedModel, Material, PlaceholderBean, VisualAsset};
use crate::core::timer::Countdown;
use crate::error::AssetError;
use crate::geometry::BeanShape;
use crate::loaders;

type LoadResult = Result<LoadedModel, AssetError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvisionSettings {
    /// Path or http(s) URL of a glTF/GLB model; unset means placeholder only
    pub source: Option<String>,
    pub timeout_ms: u64,
    /// Largest bounding-box edge after normalization
    pub target_size: f32,
    pub roughness_range: [f32; 2],
    pub metalness_range: [f32; 2],
}

impl Default for ProvisionSettings {
    fn default() -> Self {
        Self {
            source: None,
            timeout_ms: 6000,
            target_size: 2.1,
            roughness_range: [0.38, 0.52],
            metalness_range: [0.04, 0.12],
        }
    }
}

impl ProvisionSettings {
    /// The source, unless it is missing or blank
    pub fn effective_source(&self) -> Option<&str> {
        self.source.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceholderSettings {
    pub shape: BeanShape,
    pub material: Material,
}

impl Default for PlaceholderSettings {
    fn default() -> Self {
        Self {
            shape: BeanShape::default(),
            material: Material::roasted_bean(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Pending,
    Succeeded,
    FellBack(AssetError),
}

/// The asset the provisioner settled on
#[derive(Debug)]
pub struct Settlement {
    pub asset: VisualAsset,
    pub outcome: LoadOutcome,
}

enum State {
    /// Settled synchronously, waiting to be collected on the next poll
    Ready(Settlement),
    Loading {
        source_id: String,
        receiver: oneshot::Receiver<LoadResult>,
        deadline: Countdown,
    },
    Settled,
}

pub struct ModelProvisioner {
    state: State,
    outcome: LoadOutcome,
    placeholder: PlaceholderSettings,
    target_size: f32,
    timeout_ms: u64,
}

impl ModelProvisioner {
    /// Start provisioning from the configured source
    pub fn start(settings: &ProvisionSettings, placeholder: PlaceholderSettings) -> Self {
        let Some(source) = settings.effective_source() else {
            return Self::placeholder_only(settings, placeholder);
        };

        let source_id = source.to_string();
        let worker_settings = settings.clone();
        Self::start_with(settings, placeholder, source_id.clone(), move || {
            let timeout = Duration::from_millis(worker_settings.timeout_ms);
            let mut model = loaders::load_model(&source_id, Some(timeout))
                .map_err(|err| AssetError::load(source_id.as_str(), &err))?;
            model.normalize(
                worker_settings.target_size,
                worker_settings.roughness_range,
                worker_settings.metalness_range,
            );
            Ok(model)
        })
    }

    /// Start provisioning with a caller-supplied blocking loader
    ///
    /// The loader runs on its own thread; its result is only looked at from
    /// `poll`, and not at all once the deadline has passed.
    pub fn start_with<F>(
        settings: &ProvisionSettings,
        placeholder: PlaceholderSettings,
        source_id: String,
        loader: F,
    ) -> Self
    where
        F: FnOnce() -> LoadResult + Send + 'static,
    {
        let (sender, receiver) = oneshot::channel();

        info!("Loading model from {source_id}");
        let spawned = thread::Builder::new()
            .name("model-loader".into())
            .spawn(move || {
                // Err means the deadline already won; the model is dropped
                if sender.send(loader()).is_err() {
                    debug!("Model arrived after provisioning settled, discarded");
                }
            });

        let mut provisioner = Self {
            state: State::Settled,
            outcome: LoadOutcome::Pending,
            placeholder,
            target_size: settings.target_size,
            timeout_ms: settings.timeout_ms,
        };

        provisioner.state = match spawned {
            Ok(_) => State::Loading {
                source_id,
                receiver,
                deadline: Countdown::started(settings.timeout_ms as f32 / 1000.0),
            },
            Err(err) => {
                let reason = AssetError::Load {
                    source_id,
                    reason: format!("could not spawn loader thread: {err}"),
                };
                State::Ready(provisioner.fall_back(reason))
            }
        };

        provisioner
    }

    fn placeholder_only(settings: &ProvisionSettings, placeholder: PlaceholderSettings) -> Self {
        debug!("No model source configured, using the generated bean");
        let mut provisioner = Self {
            state: State::Settled,
            outcome: LoadOutcome::Pending,
            placeholder,
            target_size: settings.target_size,
            timeout_ms: settings.timeout_ms,
        };

        let settlement = Settlement {
            asset: provisioner.synthesize(),
            outcome: LoadOutcome::Succeeded,
        };
        provisioner.outcome = LoadOutcome::Succeeded;
        provisioner.state = State::Ready(settlement);
        provisioner
    }

    pub fn outcome(&self) -> &LoadOutcome {
        &self.outcome
    }

    pub fn is_settled(&self) -> bool {
        matches!(self.state, State::Settled)
    }

    /// Advance the deadline by `delta` seconds and collect the settlement
    ///
    /// Returns `Some` exactly once over the provisioner's lifetime.
    pub fn poll(&mut self, delta: f32) -> Option<Settlement> {
        match std::mem::replace(&mut self.state, State::Settled) {
            State::Settled => None,
            State::Ready(settlement) => Some(settlement),
            State::Loading {
                source_id,
                mut receiver,
                mut deadline,
            } => match receiver.try_recv() {
                Ok(Some(Ok(model))) => {
                    deadline.cancel();
                    info!(
                        "Model {} ready: {} triangles in {} parts",
                        source_id,
                        model.triangle_count(),
                        model.parts.len()
                    );
                    self.outcome = LoadOutcome::Succeeded;
                    Some(Settlement {
                        asset: VisualAsset::loaded(model),
                        outcome: LoadOutcome::Succeeded,
                    })
                }
                Ok(Some(Err(err))) => Some(self.fall_back(err)),
                Err(oneshot::Canceled) => Some(self.fall_back(AssetError::Load {
                    source_id,
                    reason: "loader stopped without a result".into(),
                })),
                Ok(None) => {
                    if deadline.tick(delta) {
                        // dropping the receiver here discards any late result
                        Some(self.fall_back(AssetError::Timeout {
                            source_id,
                            waited_ms: self.timeout_ms,
                        }))
                    } else {
                        self.state = State::Loading {
                            source_id,
                            receiver,
                            deadline,
                        };
                        None
                    }
                }
            },
        }
    }

    /// Single give-up path for load errors and timeouts
    fn fall_back(&mut self, reason: AssetError) -> Settlement {
        warn!("{reason}; falling back to the generated bean");
        let outcome = LoadOutcome::FellBack(reason);
        self.outcome = outcome.clone();
        Settlement {
            asset: self.synthesize(),
            outcome,
        }
    }

    fn synthesize(&self) -> VisualAsset {
        VisualAsset::placeholder(PlaceholderBean::generate(
            &self.placeholder.shape,
            self.placeholder.material,
            self.target_size,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::AssetKind;

    fn small_placeholder() -> PlaceholderSettings {
        PlaceholderSettings {
            shape: BeanShape::default().with_segments(12),
            ..PlaceholderSettings::default()
        }
    }

    #[test]
    fn test_blank_source_is_no_source() {
        let settings = ProvisionSettings {
            source: Some("   ".into()),
            ..ProvisionSettings::default()
        };
        assert_eq!(settings.effective_source(), None);

        let mut provisioner = ModelProvisioner::start(&settings, small_placeholder());
        assert_eq!(provisioner.outcome(), &LoadOutcome::Succeeded);

        let settlement = provisioner.poll(0.0).unwrap();
        assert_eq!(settlement.asset.kind(), AssetKind::Placeholder);
        assert!(provisioner.poll(0.0).is_none());
    }

    #[test]
    fn test_loader_error_falls_back_immediately() {
        let settings = ProvisionSettings::default();
        let mut provisioner = ModelProvisioner::start_with(
            &settings,
            small_placeholder(),
            "broken.glb".into(),
            || {
                Err(AssetError::Load {
                    source_id: "broken.glb".into(),
                    reason: "bad magic".into(),
                })
            },
        );

        let settlement = loop {
            if let Some(s) = provisioner.poll(0.0) {
                break s;
            }
            thread::yield_now();
        };

        assert_eq!(settlement.asset.kind(), AssetKind::Placeholder);
        assert!(matches!(settlement.outcome, LoadOutcome::FellBack(AssetError::Load { .. })));
        assert!(provisioner.is_settled());
    }

    #[test]
    fn test_panicking_loader_counts_as_load_error() {
        let settings = ProvisionSettings::default();
        let mut provisioner = ModelProvisioner::start_with(
            &settings,
            small_placeholder(),
            "panics.glb".into(),
            || panic!("decoder bug"),
        );

        let settlement = loop {
            if let Some(s) = provisioner.poll(0.0) {
                break s;
            }
            thread::yield_now();
        };
        assert!(matches!(settlement.outcome, LoadOutcome::FellBack(AssetError::Load { .. })));
    }
}
