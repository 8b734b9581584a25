use std::fs;
use std::path::{Path, PathBuf};

use robot_description::{RobotDescription, SemanticDescription, parse_srdf, parse_urdf};
use serde::Deserialize;

use crate::{Error, Result};

/// Configuration of the [`CollisionDetector`](crate::CollisionDetector).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollisionDetectorConfig {
    /// Link pairs further apart than this are never reported, in meters.
    pub activation_dist: f64,
    /// Path to the URDF robot description.
    pub robot_description: PathBuf,
    /// Path to the SRDF semantic description.
    pub robot_semantic_description: PathBuf,
    /// Names of the actuated joints, in the order of the joint vectors.
    pub joint_names: Vec<String>,
}

impl CollisionDetectorConfig {
    /// Name of the configuration file inside a configuration directory.
    pub const PATH: &'static str = "collision_detector.toml";

    /// Load the configuration from `dir`.
    ///
    /// Relative description paths are resolved against `dir`.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let mut config: Self = toml::from_str(&read(&dir.join(Self::PATH))?)?;

        config.robot_description = dir.join(&config.robot_description);
        config.robot_semantic_description = dir.join(&config.robot_semantic_description);

        Ok(config)
    }

    /// Check the configuration for a detector with `N` joints.
    pub fn validate<const N: usize>(&self) -> Result<()> {
        if !self.activation_dist.is_finite() || self.activation_dist <= 0.0 {
            return Err(Error::ActivationDistance(self.activation_dist));
        }

        if self.joint_names.len() != N {
            return Err(Error::JointNames {
                expected: N,
                actual: self.joint_names.len(),
            });
        }

        Ok(())
    }

    /// Read and parse both model descriptions.
    pub fn descriptions(&self) -> Result<(RobotDescription, SemanticDescription)> {
        let description = parse_urdf(&read(&self.robot_description)?)?;
        let semantic = parse_srdf(&read(&self.robot_semantic_description)?)?;

        Ok((description, semantic))
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &Path, contents: &str) {
        fs::write(dir.join(CollisionDetectorConfig::PATH), contents).unwrap();
    }

    #[test]
    fn loads_and_resolves_paths() {
        let dir = tempfile::tempdir().unwrap();
        write_config(
            dir.path(),
            r#"
            activation_dist = 0.1
            robot_description = "arm.urdf"
            robot_semantic_description = "/opt/arm/arm.srdf"
            joint_names = ["shoulder", "elbow"]
            "#,
        );

        let config = CollisionDetectorConfig::load(dir.path()).unwrap();
        assert_eq!(config.activation_dist, 0.1);
        assert_eq!(config.robot_description, dir.path().join("arm.urdf"));
        assert_eq!(
            config.robot_semantic_description,
            PathBuf::from("/opt/arm/arm.srdf")
        );
        assert_eq!(config.joint_names, ["shoulder", "elbow"]);
        assert!(config.validate::<2>().is_ok());
    }

    #[test]
    fn missing_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let result = CollisionDetectorConfig::load(dir.path());
        assert!(
            matches!(result, Err(Error::Io { ref path, .. }) if path.ends_with(CollisionDetectorConfig::PATH))
        );
    }

    #[test]
    fn missing_parameter_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write_config(
            dir.path(),
            r#"
            robot_description = "arm.urdf"
            robot_semantic_description = "arm.srdf"
            joint_names = []
            "#,
        );

        let result = CollisionDetectorConfig::load(dir.path());
        assert!(matches!(result, Err(Error::Deserialize(_))));
    }

    #[test]
    fn unknown_parameter_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write_config(
            dir.path(),
            r#"
            activation_dist = 0.1
            activation_distance = 0.1
            robot_description = "arm.urdf"
            robot_semantic_description = "arm.srdf"
            joint_names = []
            "#,
        );

        assert!(CollisionDetectorConfig::load(dir.path()).is_err());
    }

    #[test]
    fn validation() {
        let mut config = CollisionDetectorConfig {
            activation_dist: 0.0,
            robot_description: PathBuf::from("arm.urdf"),
            robot_semantic_description: PathBuf::from("arm.srdf"),
            joint_names: vec!["shoulder".to_owned()],
        };
        assert!(matches!(
            config.validate::<1>(),
            Err(Error::ActivationDistance(_))
        ));

        config.activation_dist = f64::NAN;
        assert!(config.validate::<1>().is_err());

        config.activation_dist = 0.05;
        assert!(config.validate::<1>().is_ok());
        assert!(matches!(
            config.validate::<7>(),
            Err(Error::JointNames {
                expected: 7,
                actual: 1
            })
        ));
    }
}
