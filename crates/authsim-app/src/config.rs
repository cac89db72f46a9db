//! Runtime configuration.

use std::time::Duration;

use crate::error::ConfigError;

/// Playback configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    /// Playback speed multiplier. Wall-clock wait is nominal duration / speed.
    pub speed: f64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self { speed: 1.0 }
    }
}

impl RuntimeConfig {
    /// Config with the given speed, validated.
    pub fn with_speed(speed: f64) -> Result<Self, ConfigError> {
        let config = Self { speed };
        config.validate()?;
        Ok(config)
    }

    /// Check that the speed is finite and positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.speed.is_finite() && self.speed > 0.0 {
            Ok(())
        } else {
            Err(ConfigError::InvalidSpeed { speed: self.speed })
        }
    }

    /// Wall-clock wait for a step of the given nominal duration.
    pub fn scaled(&self, nominal: Duration) -> Duration {
        if (self.speed - 1.0).abs() < f64::EPSILON {
            return nominal;
        }
        nominal.div_f64(self.speed)
    }
}
