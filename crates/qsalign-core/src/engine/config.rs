use std::f64::consts::PI;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Invalid value {value} for parameter '{name}': {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
}

/// Thresholds controlling how chains become subunits and how subunits are grouped.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterParams {
    pub min_sequence_length: usize,       // Chains with fewer representative atoms are ignored
    pub sequence_identity_threshold: f64, // Fraction in (0, 1] for two subunits to share a cluster
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            min_sequence_length: 20,
            sequence_identity_threshold: 0.95,
        }
    }
}

/// Strictness of the quaternary alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignParams {
    pub distance_cutoff: f64,       // Max centroid distance (Å) for two subunits to be paired
    pub max_rmsd: f64,              // Max global RMSD (Å) for an alignment to be accepted
    pub max_orientation_angle: f64, // Max residual orientation (radians) for a pair to be accepted
}

impl Default for AlignParams {
    fn default() -> Self {
        Self {
            distance_cutoff: 10.0,
            max_rmsd: 10.0,
            max_orientation_angle: PI / 8.0,
        }
    }
}

/// Immutable options passed across the aligner boundary.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QsAlignConfig {
    pub cluster: ClusterParams,
    pub align: AlignParams,
}

impl QsAlignConfig {
    pub fn new(cluster: ClusterParams, align: AlignParams) -> Result<Self, ConfigError> {
        let config = Self { cluster, align };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let identity = self.cluster.sequence_identity_threshold;
        if !(identity > 0.0 && identity <= 1.0) {
            return Err(ConfigError::InvalidParameter {
                name: "sequence_identity_threshold",
                value: identity,
                reason: "must lie in (0, 1]",
            });
        }
        if self.cluster.min_sequence_length == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "min_sequence_length",
                value: 0.0,
                reason: "must be at least 1",
            });
        }
        for (name, value) in [
            ("distance_cutoff", self.align.distance_cutoff),
            ("max_rmsd", self.align.max_rmsd),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidParameter {
                    name,
                    value,
                    reason: "must be a positive finite number",
                });
            }
        }
        let angle = self.align.max_orientation_angle;
        if !(angle > 0.0 && angle <= PI) {
            return Err(ConfigError::InvalidParameter {
                name: "max_orientation_angle",
                value: angle,
                reason: "must lie in (0, π]",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = QsAlignConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cluster.min_sequence_length, 20);
        assert_eq!(config.align.max_orientation_angle, PI / 8.0);
    }

    #[test]
    fn identity_threshold_outside_unit_interval_is_rejected() {
        let cluster = ClusterParams {
            sequence_identity_threshold: 1.5,
            ..ClusterParams::default()
        };
        let err = QsAlignConfig::new(cluster, AlignParams::default()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidParameter {
                name: "sequence_identity_threshold",
                ..
            }
        ));
    }

    #[test]
    fn non_positive_distance_cutoff_is_rejected() {
        let align = AlignParams {
            distance_cutoff: 0.0,
            ..AlignParams::default()
        };
        let err = QsAlignConfig::new(ClusterParams::default(), align).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidParameter {
                name: "distance_cutoff",
                ..
            }
        ));
    }

    #[test]
    fn orientation_angle_above_pi_is_rejected() {
        let align = AlignParams {
            max_orientation_angle: 4.0,
            ..AlignParams::default()
        };
        assert!(QsAlignConfig::new(ClusterParams::default(), align).is_err());
    }
}
