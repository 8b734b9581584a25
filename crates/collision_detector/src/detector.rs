use std::sync::{Arc, PoisonError, RwLock};

use bevy::prelude::Resource;
use kinematics::{JointVector, KinematicModel, KinematicTree, LinkId};
use nalgebra::Isometry3;
use self_collision::{CollisionInfo, CollisionModel, CollisionPairs, SelfCollisionModel};

use crate::approach::{CLOSING_RATE_THRESHOLD, closing_rate};
use crate::diagnostics::DiagnosticsReporter;
use crate::{CollisionDetectorConfig, Error, Result};

/// Joint positions and velocities for the next cycle.
///
/// A [`None`] field means no new data arrived on that input since the last cycle.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq)]
pub struct JointState<const N: usize> {
    pub position: Option<JointVector<N>>,
    pub velocity: Option<JointVector<N>>,
}

impl<const N: usize> JointState<N> {
    #[must_use]
    pub fn new(position: JointVector<N>, velocity: JointVector<N>) -> Self {
        Self {
            position: Some(position),
            velocity: Some(velocity),
        }
    }
}

/// Lifecycle state of a [`CollisionDetector`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DetectorState {
    #[default]
    Stopped,
    Running,
    /// The last cycle failed, the output is that of the last successful cycle.
    Fault,
}

/// The output of a cycle, as published to concurrent readers.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct CollisionSnapshot<const NPAIRS: usize> {
    pub collisions: CollisionPairs<NPAIRS>,
    pub collision_count: usize,
    pub in_collision: bool,
}

/// Handle to the latest published [`CollisionSnapshot`].
pub type SharedCollisions<const NPAIRS: usize> = Arc<RwLock<CollisionSnapshot<NPAIRS>>>;

/// Reports the link pairs of a robot with `N` joints that are close and approaching each other.
///
/// Every cycle computes the pose of each link, asks the collision model for the pairs within the
/// activation distance, and keeps those closing faster than [`CLOSING_RATE_THRESHOLD`]. At most
/// `NPAIRS` pairs are tracked.
///
/// A cycle that fails leaves the output, the counters and the published snapshot of the last
/// successful cycle in place, and moves the detector to [`DetectorState::Fault`].
#[derive(Resource)]
pub struct CollisionDetector<const N: usize, const NPAIRS: usize> {
    kinematics: Box<dyn KinematicModel<N>>,
    collision_model: Arc<dyn CollisionModel>,
    activation_dist: f64,
    /// Kinematic link of every collision model link.
    link_map: Vec<LinkId>,
    link_poses: Vec<Isometry3<f64>>,
    candidates: CollisionPairs<NPAIRS>,
    output: CollisionPairs<NPAIRS>,
    collision_count: usize,
    in_collision: bool,
    state: DetectorState,
    shared: SharedCollisions<NPAIRS>,
}

impl<const N: usize, const NPAIRS: usize> CollisionDetector<N, NPAIRS> {
    /// Configure a detector, it starts out [stopped](DetectorState::Stopped).
    ///
    /// Fails if the collision model has more eligible pairs than `NPAIRS`, or references a link
    /// the kinematic model does not know.
    pub fn new(
        kinematics: Box<dyn KinematicModel<N>>,
        collision_model: Arc<dyn CollisionModel>,
        activation_dist: f64,
    ) -> Result<Self> {
        if !activation_dist.is_finite() || activation_dist <= 0.0 {
            return Err(Error::ActivationDistance(activation_dist));
        }

        if collision_model.pair_count() > NPAIRS {
            return Err(Error::PairCapacity {
                pairs: collision_model.pair_count(),
                capacity: NPAIRS,
            });
        }

        let link_map = (0..collision_model.link_count())
            .map(|index| {
                let name = collision_model.link_name(index).unwrap_or_default();
                kinematics
                    .link_id(name)
                    .ok_or_else(|| Error::UnknownLink(name.to_owned()))
            })
            .collect::<Result<Vec<_>>>()?;
        let link_poses = vec![Isometry3::identity(); link_map.len()];

        tracing::debug!(
            links = link_map.len(),
            pairs = collision_model.pair_count(),
            activation_dist,
            "configured collision detector"
        );

        Ok(Self {
            kinematics,
            collision_model,
            activation_dist,
            link_map,
            link_poses,
            candidates: CollisionPairs::default(),
            output: CollisionPairs::default(),
            collision_count: 0,
            in_collision: false,
            state: DetectorState::Stopped,
            shared: Arc::default(),
        })
    }

    /// Configure a detector from a validated configuration, using a [`KinematicTree`] and a
    /// [`SelfCollisionModel`] built from the configured descriptions.
    pub fn from_config(config: &CollisionDetectorConfig) -> Result<Self> {
        config.validate::<N>()?;

        let (description, semantic) = config.descriptions()?;
        let kinematics = KinematicTree::<N>::new(&description, &config.joint_names)?;
        let collision_model = SelfCollisionModel::new(&description, &semantic);

        Self::new(
            Box::new(kinematics),
            Arc::new(collision_model),
            config.activation_dist,
        )
    }

    pub fn start(&mut self) {
        self.reset();
        self.state = DetectorState::Running;
        tracing::info!("started collision detector");
    }

    pub fn stop(&mut self) {
        self.reset();
        self.state = DetectorState::Stopped;
        tracing::info!("stopped collision detector");
    }

    fn reset(&mut self) {
        self.output.clear();
        self.collision_count = 0;
        self.in_collision = false;
        self.publish();
    }

    /// Run a single cycle with the joint state `input`.
    pub fn update(&mut self, input: &JointState<N>) -> Result<()> {
        if self.state == DetectorState::Stopped {
            return Err(Error::NotRunning);
        }

        match self.cycle(input) {
            Ok(()) => {
                self.state = DetectorState::Running;
                Ok(())
            }
            Err(error) => {
                self.state = DetectorState::Fault;
                Err(error)
            }
        }
    }

    fn cycle(&mut self, input: &JointState<N>) -> Result<()> {
        let q = input.position.as_ref().ok_or(Error::MissingInput("q"))?;
        let dq = input.velocity.as_ref().ok_or(Error::MissingInput("dq"))?;

        self.kinematics.update(q);
        for (pose, &link) in self.link_poses.iter_mut().zip(&self.link_map) {
            *pose = self.kinematics.pose(link);
        }

        self.collision_model.collision_pairs(
            &self.link_poses,
            self.activation_dist,
            self.candidates.as_mut_slice(),
        )?;

        // compact the approaching candidates to the front, keeping their order
        let mut retained = 0;
        for index in 0..NPAIRS {
            let candidate = self.candidates[index];
            if candidate.is_absent() {
                break;
            }

            let links = (
                self.kinematic_link(candidate.link1_idx)?,
                self.kinematic_link(candidate.link2_idx)?,
            );
            let rate = closing_rate(self.kinematics.as_ref(), links, &candidate, dq);
            if rate > CLOSING_RATE_THRESHOLD {
                self.candidates[retained] = candidate;
                retained += 1;
            }
        }
        self.candidates.as_mut_slice()[retained..].fill(CollisionInfo::absent());

        self.output = self.candidates;
        self.collision_count = retained;
        self.in_collision = retained > 0;
        self.publish();

        Ok(())
    }

    fn kinematic_link(&self, index: i32) -> Result<LinkId> {
        usize::try_from(index)
            .ok()
            .and_then(|index| self.link_map.get(index))
            .copied()
            .ok_or(Error::LinkIndex(index))
    }

    fn publish(&self) {
        let mut snapshot = self.shared.write().unwrap_or_else(PoisonError::into_inner);
        *snapshot = CollisionSnapshot {
            collisions: self.output,
            collision_count: self.collision_count,
            in_collision: self.in_collision,
        };
    }

    /// Link pairs that were approaching each other in the last successful cycle.
    #[must_use]
    pub fn output(&self) -> &CollisionPairs<NPAIRS> {
        &self.output
    }

    #[must_use]
    pub fn collision_count(&self) -> usize {
        self.collision_count
    }

    #[must_use]
    pub fn in_collision(&self) -> bool {
        self.in_collision
    }

    #[must_use]
    pub fn state(&self) -> DetectorState {
        self.state
    }

    #[must_use]
    pub fn activation_dist(&self) -> f64 {
        self.activation_dist
    }

    #[must_use]
    pub fn collision_model(&self) -> &Arc<dyn CollisionModel> {
        &self.collision_model
    }

    /// Handle to the snapshot published after every successful cycle.
    #[must_use]
    pub fn shared(&self) -> SharedCollisions<NPAIRS> {
        Arc::clone(&self.shared)
    }

    /// A reporter that renders the published snapshot and the collision geometry.
    #[must_use]
    pub fn diagnostics_reporter(&self) -> DiagnosticsReporter<NPAIRS> {
        DiagnosticsReporter::new(self.shared(), Arc::clone(&self.collision_model))
    }
}
