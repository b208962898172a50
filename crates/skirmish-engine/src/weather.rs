//! Deterministic weather sampling.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use skirmish_core::{TickId, Vec2};
use skirmish_rule::WeatherSnapshot;

use crate::config::WeatherConfig;

/// Draws one [`WeatherSnapshot`] per tick.
///
/// Each tick gets its own generator seeded with `seed ^ tick`, so a
/// sample depends only on the seed and the tick, never on how many ticks
/// were sampled before it.
#[derive(Clone, Debug)]
pub struct Weather {
    config: WeatherConfig,
    seed: u64,
}

impl Weather {
    /// A generator for `config` and `seed`.
    pub fn new(config: WeatherConfig, seed: u64) -> Self {
        Self { config, seed }
    }

    /// The seed in use.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Weather at `tick`.
    pub fn sample(&self, tick: TickId) -> WeatherSnapshot {
        let c = &self.config;
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed ^ tick.0);
        let temperature =
            c.base_temperature + rng.gen_range(-c.temperature_jitter..=c.temperature_jitter);
        let gradient = Vec2::new(
            rng.gen_range(-c.max_gradient..=c.max_gradient),
            rng.gen_range(-c.max_gradient..=c.max_gradient),
        );
        let wind = Vec2::new(
            rng.gen_range(-c.max_wind..=c.max_wind),
            rng.gen_range(-c.max_wind..=c.max_wind),
        );
        let precipitation = if rng.gen::<f32>() < c.precipitation_chance {
            rng.gen_range(0.0..=1.0)
        } else {
            0.0
        };
        WeatherSnapshot {
            temperature,
            gradient,
            wind,
            precipitation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_weather() {
        let a = Weather::new(WeatherConfig::default(), 42);
        let b = Weather::new(WeatherConfig::default(), 42);
        for t in [0, 1, 17, 1000] {
            assert_eq!(a.sample(TickId(t)), b.sample(TickId(t)));
        }
    }

    #[test]
    fn sampling_order_does_not_matter() {
        let w = Weather::new(WeatherConfig::default(), 7);
        let late_first = w.sample(TickId(9));
        let _ = w.sample(TickId(3));
        assert_eq!(w.sample(TickId(9)), late_first);
    }

    #[test]
    fn samples_stay_in_range() {
        let cfg = WeatherConfig::default();
        let w = Weather::new(cfg.clone(), 3);
        for t in 0..200 {
            let s = w.sample(TickId(t));
            assert!((s.temperature - cfg.base_temperature).abs() <= cfg.temperature_jitter);
            assert!(s.wind.x.abs() <= cfg.max_wind && s.wind.y.abs() <= cfg.max_wind);
            assert!((0.0..=1.0).contains(&s.precipitation));
        }
    }

    #[test]
    fn calm_config_is_constant() {
        let cfg = WeatherConfig {
            base_temperature: -5.0,
            temperature_jitter: 0.0,
            max_gradient: 0.0,
            max_wind: 0.0,
            precipitation_chance: 0.0,
        };
        let s = Weather::new(cfg, 1).sample(TickId(12));
        assert_eq!(s.temperature, -5.0);
        assert_eq!(s.wind, Vec2::ZERO);
        assert_eq!(s.precipitation, 0.0);
    }
}
