//! Simulator configuration, validation, and error types.
//!
//! [`SimConfig`] is the input for constructing a [`Simulator`](crate::Simulator).
//! [`validate()`](SimConfig::validate) checks structural invariants once at
//! startup so that nothing has to be re-checked per tick.

use std::error::Error;
use std::fmt;

use skirmish_rule::{validate_pipeline, Battlefield, PipelineError, Rule};

use crate::factory::{TemplateFactory, UnitFactory};

// ── QueueConfig ────────────────────────────────────────────────────

/// Limits for the command fixpoint loop.
#[derive(Clone, Debug)]
pub struct QueueConfig {
    /// Maximum dispatch passes per command-processing call. Default: 10.
    ///
    /// Commands still ready when the cap is hit roll over to the next tick.
    pub max_passes: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self { max_passes: 10 }
    }
}

// ── WeatherConfig ──────────────────────────────────────────────────

/// Shape of the per-tick weather sample.
///
/// Every tick draws a fresh [`WeatherSnapshot`](skirmish_rule::WeatherSnapshot)
/// from a generator seeded with `seed ^ tick`, so the same seed always
/// produces the same weather.
#[derive(Clone, Debug)]
pub struct WeatherConfig {
    /// Mean temperature at the field origin, °C. Default: 18.
    pub base_temperature: f32,
    /// Maximum deviation from the mean per tick, °C. Default: 4.
    pub temperature_jitter: f32,
    /// Largest temperature change per tile along either axis. Default: 0.05.
    pub max_gradient: f32,
    /// Largest wind component, tiles per tick. Default: 0.2.
    pub max_wind: f32,
    /// Probability of precipitation on any tick, `0..=1`. Default: 0.1.
    pub precipitation_chance: f32,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_temperature: 18.0,
            temperature_jitter: 4.0,
            max_gradient: 0.05,
            max_wind: 0.2,
            precipitation_chance: 0.1,
        }
    }
}

// ── CombatTuning ───────────────────────────────────────────────────

/// Constants the standard executors need.
#[derive(Clone, Debug)]
pub struct CombatTuning {
    /// Ticks a unit stays `Attacking` after a strike. Default: 3.
    pub attack_ticks: u64,
    /// Flight time of a jump that does not name one, in ticks. Default: 10.
    pub jump_duration: u64,
    /// Peak height of a jump that does not name one. Default: 2.
    pub jump_height: f32,
    /// Distance between units placed by one multi-unit spawn. Default: 1.
    pub spawn_spacing: f32,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            attack_ticks: 3,
            jump_duration: 10,
            jump_height: 2.0,
            spawn_spacing: 1.0,
        }
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`SimConfig::validate()`].
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// Rule pipeline validation failed.
    Pipeline(PipelineError),
    /// Unit capacity is zero.
    UnitCapacityZero,
    /// Projectile capacity is zero.
    ProjectileCapacityZero,
    /// Field dimensions or cell size are not finite and positive.
    InvalidField {
        /// Description of the validation failure.
        reason: String,
    },
    /// `max_passes` is zero.
    PassCapZero,
    /// WeatherConfig invariant violated.
    InvalidWeather {
        /// Description of which invariant was violated.
        reason: String,
    },
    /// CombatTuning invariant violated.
    InvalidTuning {
        /// Description of which invariant was violated.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pipeline(e) => write!(f, "pipeline: {e}"),
            Self::UnitCapacityZero => write!(f, "unit_capacity must be at least 1"),
            Self::ProjectileCapacityZero => {
                write!(f, "projectile_capacity must be at least 1")
            }
            Self::InvalidField { reason } => write!(f, "invalid field: {reason}"),
            Self::PassCapZero => write!(f, "max_passes must be at least 1"),
            Self::InvalidWeather { reason } => write!(f, "invalid weather config: {reason}"),
            Self::InvalidTuning { reason } => write!(f, "invalid combat tuning: {reason}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Pipeline(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PipelineError> for ConfigError {
    fn from(e: PipelineError) -> Self {
        Self::Pipeline(e)
    }
}

// ── SimConfig ──────────────────────────────────────────────────────

/// Complete configuration for constructing a simulator.
pub struct SimConfig {
    /// Playing field.
    pub field: Battlefield,
    /// Fixed unit store capacity. Default: 256.
    pub unit_capacity: usize,
    /// Fixed projectile store capacity. Default: 256.
    pub projectile_capacity: usize,
    /// Rules executed in order every tick.
    pub rules: Vec<Box<dyn Rule>>,
    /// Templates for `spawn` commands.
    pub factory: Box<dyn UnitFactory>,
    /// Seed for the weather generator.
    pub seed: u64,
    /// Command loop limits.
    pub queue: QueueConfig,
    /// Weather generation.
    pub weather: WeatherConfig,
    /// Executor constants.
    pub combat: CombatTuning,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            field: Battlefield::default(),
            unit_capacity: 256,
            projectile_capacity: 256,
            rules: Vec::new(),
            factory: Box::new(TemplateFactory::new()),
            seed: 0,
            queue: QueueConfig::default(),
            weather: WeatherConfig::default(),
            combat: CombatTuning::default(),
        }
    }
}

impl SimConfig {
    /// Validate all structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. Stores must hold something.
        if self.unit_capacity == 0 {
            return Err(ConfigError::UnitCapacityZero);
        }
        if self.projectile_capacity == 0 {
            return Err(ConfigError::ProjectileCapacityZero);
        }
        // 2. Field extents and grid cell must be finite and positive.
        let f = &self.field;
        for (name, value) in [
            ("width", f.width),
            ("height", f.height),
            ("cell_size", f.cell_size),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidField {
                    reason: format!("{name} must be finite and positive, got {value}"),
                });
            }
        }
        // 3. At least one dispatch pass.
        if self.queue.max_passes == 0 {
            return Err(ConfigError::PassCapZero);
        }
        // 4. Weather ranges.
        let w = &self.weather;
        if !w.base_temperature.is_finite() {
            return Err(ConfigError::InvalidWeather {
                reason: format!("base_temperature must be finite, got {}", w.base_temperature),
            });
        }
        for (name, value) in [
            ("temperature_jitter", w.temperature_jitter),
            ("max_gradient", w.max_gradient),
            ("max_wind", w.max_wind),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeather {
                    reason: format!("{name} must be finite and >= 0, got {value}"),
                });
            }
        }
        if !(0.0..=1.0).contains(&w.precipitation_chance) {
            return Err(ConfigError::InvalidWeather {
                reason: format!(
                    "precipitation_chance must be in [0.0, 1.0], got {}",
                    w.precipitation_chance
                ),
            });
        }
        // 5. Tuning.
        let c = &self.combat;
        if c.jump_duration == 0 {
            return Err(ConfigError::InvalidTuning {
                reason: "jump_duration must be at least 1".to_string(),
            });
        }
        if !c.jump_height.is_finite() || c.jump_height < 0.0 {
            return Err(ConfigError::InvalidTuning {
                reason: format!("jump_height must be finite and >= 0, got {}", c.jump_height),
            });
        }
        if !c.spawn_spacing.is_finite() || c.spawn_spacing < 0.0 {
            return Err(ConfigError::InvalidTuning {
                reason: format!(
                    "spawn_spacing must be finite and >= 0, got {}",
                    c.spawn_spacing
                ),
            });
        }
        // 6. Rule ordering.
        validate_pipeline(&self.rules)?;
        Ok(())
    }
}

impl fmt::Debug for SimConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rules: Vec<&str> = self.rules.iter().map(|r| r.name()).collect();
        f.debug_struct("SimConfig")
            .field("field", &self.field)
            .field("unit_capacity", &self.unit_capacity)
            .field("projectile_capacity", &self.projectile_capacity)
            .field("rules", &rules)
            .field("seed", &self.seed)
            .field("queue", &self.queue)
            .field("weather", &self.weather)
            .field("combat", &self.combat)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::{QueuedCommand, RuleError};
    use skirmish_rule::{RulePhase, TickContext};

    struct Named(&'static str, RulePhase);

    impl Rule for Named {
        fn name(&self) -> &str {
            self.0
        }
        fn phase(&self) -> RulePhase {
            self.1
        }
        fn execute(&mut self, _: &mut TickContext<'_>) -> Result<Vec<QueuedCommand>, RuleError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn default_config_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_capacities_rejected() {
        let cfg = SimConfig {
            unit_capacity: 0,
            ..SimConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::UnitCapacityZero));

        let cfg = SimConfig {
            projectile_capacity: 0,
            ..SimConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ProjectileCapacityZero));
    }

    #[test]
    fn degenerate_field_rejected() {
        let cfg = SimConfig {
            field: Battlefield::new(0.0, 10.0),
            ..SimConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidField { .. })
        ));

        let mut field = Battlefield::default();
        field.cell_size = f32::NAN;
        let cfg = SimConfig {
            field,
            ..SimConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidField { .. })
        ));
    }

    #[test]
    fn zero_pass_cap_rejected() {
        let cfg = SimConfig {
            queue: QueueConfig { max_passes: 0 },
            ..SimConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::PassCapZero));
    }

    #[test]
    fn weather_ranges_checked() {
        let cfg = SimConfig {
            weather: WeatherConfig {
                precipitation_chance: 1.5,
                ..WeatherConfig::default()
            },
            ..SimConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidWeather { .. })
        ));

        let cfg = SimConfig {
            weather: WeatherConfig {
                max_wind: -1.0,
                ..WeatherConfig::default()
            },
            ..SimConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidWeather { .. })
        ));
    }

    #[test]
    fn zero_jump_duration_rejected() {
        let cfg = SimConfig {
            combat: CombatTuning {
                jump_duration: 0,
                ..CombatTuning::default()
            },
            ..SimConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidTuning { .. })
        ));
    }

    #[test]
    fn pipeline_errors_convert() {
        let cfg = SimConfig {
            rules: vec![
                Box::new(Named("late", RulePhase::Cleanup)),
                Box::new(Named("early", RulePhase::Ai)),
            ],
            ..SimConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Pipeline(_)));
        assert!(err.source().is_some());
    }

    #[test]
    fn debug_lists_rule_names() {
        let cfg = SimConfig {
            rules: vec![Box::new(Named("scout", RulePhase::Ai))],
            ..SimConfig::default()
        };
        assert!(format!("{cfg:?}").contains("scout"));
    }
}
