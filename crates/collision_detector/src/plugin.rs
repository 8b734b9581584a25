use std::path::PathBuf;

use bevy::prelude::*;

use crate::{CollisionDetector, CollisionDetectorConfig, JointState};

/// Plugin that detects approaching link pairs once per frame.
///
/// The detector is configured from the [`CollisionDetectorConfig`] in `config_dir` when the
/// plugin is built. If that fails the error is logged and no detector is added. Otherwise the app
/// gets a running [`CollisionDetector`], its [`DiagnosticsReporter`](crate::DiagnosticsReporter)
/// and the [`JointState`] input, which is consumed by every cycle.
pub struct CollisionDetectorPlugin<const N: usize, const NPAIRS: usize> {
    pub config_dir: PathBuf,
}

impl<const N: usize, const NPAIRS: usize> CollisionDetectorPlugin<N, NPAIRS> {
    #[must_use]
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }
}

impl<const N: usize, const NPAIRS: usize> Plugin for CollisionDetectorPlugin<N, NPAIRS> {
    fn build(&self, app: &mut App) {
        let detector = CollisionDetectorConfig::load(&self.config_dir)
            .and_then(|config| CollisionDetector::<N, NPAIRS>::from_config(&config));

        let mut detector = match detector {
            Ok(detector) => detector,
            Err(error) => {
                tracing::error!(
                    config_dir = %self.config_dir.display(),
                    "failed to configure collision detector: {error}"
                );
                return;
            }
        };
        detector.start();

        app.insert_resource(detector.diagnostics_reporter())
            .insert_resource(detector)
            .init_resource::<JointState<N>>()
            .add_systems(Update, detect_collisions::<N, NPAIRS>);
    }
}

/// System that runs one collision detection cycle on the latest [`JointState`].
pub fn detect_collisions<const N: usize, const NPAIRS: usize>(
    mut detector: ResMut<CollisionDetector<N, NPAIRS>>,
    mut joint_state: ResMut<JointState<N>>,
) {
    let input = std::mem::take(&mut *joint_state);

    if let Err(error) = detector.update(&input) {
        tracing::error!("collision detection cycle failed: {error}");
    }
}
