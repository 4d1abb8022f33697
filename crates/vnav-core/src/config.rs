//! Path calculator tuning.

use serde::{Deserialize, Serialize};

use crate::error::{Result, VnavError};

/// Configuration for the vertical path calculator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VnavConfig {
    /// Default descent angle in degrees (descent positive)
    pub default_fpa_deg: f64,
    /// Steepest angle the solver may assign when going direct
    pub max_fpa_deg: f64,
    /// Steepest angle a restriction may imply during plan construction
    pub build_max_fpa_deg: f64,
    /// Window around the default angle inside which a direct angle is preferred
    pub direct_fpa_tolerance_deg: f64,
    /// Lower clamp for direct-type constraints that are not the vertical direct target
    pub min_direct_fpa_deg: f64,
    /// Altitude margin above the target used when solving a direct-type constraint (meters)
    pub vertical_direct_buffer_m: f64,
    /// Indicated altitude changes smaller than this are ignored (feet)
    pub altitude_change_threshold_ft: f64,
    /// Lateral plan the pilot angle override channel acts on
    pub primary_plan_index: usize,
}

impl Default for VnavConfig {
    fn default() -> Self {
        Self {
            default_fpa_deg: 3.0,
            max_fpa_deg: 6.0,
            build_max_fpa_deg: 6.0,
            direct_fpa_tolerance_deg: 0.5,
            min_direct_fpa_deg: 3.0,
            vertical_direct_buffer_m: 50.0,
            altitude_change_threshold_ft: 1.0,
            primary_plan_index: 0,
        }
    }
}

impl VnavConfig {
    /// Reject configurations the solver cannot work with.
    pub fn validate(&self) -> Result<()> {
        let angles = [
            ("default_fpa_deg", self.default_fpa_deg),
            ("max_fpa_deg", self.max_fpa_deg),
            ("build_max_fpa_deg", self.build_max_fpa_deg),
            ("direct_fpa_tolerance_deg", self.direct_fpa_tolerance_deg),
            ("min_direct_fpa_deg", self.min_direct_fpa_deg),
        ];
        for (name, value) in angles {
            if !value.is_finite() || value < 0.0 {
                return Err(VnavError::InvalidConfig {
                    reason: format!("{} must be a finite, non-negative angle (got {})", name, value),
                });
            }
        }

        if self.max_fpa_deg >= 90.0 {
            return Err(VnavError::InvalidConfig {
                reason: format!("max_fpa_deg must be below 90 (got {})", self.max_fpa_deg),
            });
        }

        if self.default_fpa_deg > self.max_fpa_deg {
            return Err(VnavError::InvalidConfig {
                reason: format!(
                    "default_fpa_deg ({}) exceeds max_fpa_deg ({})",
                    self.default_fpa_deg, self.max_fpa_deg
                ),
            });
        }

        if !self.vertical_direct_buffer_m.is_finite() || !self.altitude_change_threshold_ft.is_finite() {
            return Err(VnavError::InvalidConfig {
                reason: "altitude margins must be finite".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(VnavConfig::default().validate().is_ok());
    }

    #[test]
    fn default_steeper_than_max_is_rejected() {
        let config = VnavConfig {
            default_fpa_deg: 7.0,
            ..VnavConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(VnavError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: VnavConfig = serde_json::from_str(r#"{"max_fpa_deg": 4.5}"#).unwrap();
        assert_eq!(config.max_fpa_deg, 4.5);
        assert_eq!(config.default_fpa_deg, 3.0);
        assert_eq!(config.primary_plan_index, 0);
    }
}
