//! Tuning of the concrete behaviors, loaded from TOML.

use serde::Deserialize;

use crate::error::ConfigError;
use crate::weighted::TickRange;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AiConfig {
    #[serde(default)]
    pub long_jump: LongJumpConfig,
    #[serde(default)]
    pub harvest: HarvestConfig,
    #[serde(default)]
    pub movement: MovementConfig,
    #[serde(default)]
    pub brain: BrainConfig,
}

impl AiConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.long_jump.cooldown.validate("long_jump.cooldown")?;
        self.harvest.cooldown.validate("harvest.cooldown")?;
        positive("long_jump.max_velocity", self.long_jump.max_velocity)?;
        positive("harvest.speed", self.harvest.speed)?;
        positive("movement.walk_speed", self.movement.walk_speed)?;
        positive("movement.panic_speed", self.movement.panic_speed)?;
        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LongJumpConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Vertical half-extent of the candidate box.
    #[serde(default = "default_max_height")]
    pub max_height: i32,
    /// Horizontal half-extent of the candidate box.
    #[serde(default = "default_max_width")]
    pub max_width: i32,
    /// Launch speed cap in blocks per tick.
    #[serde(default = "default_max_velocity")]
    pub max_velocity: f64,
    #[serde(default = "default_long_jump_cooldown")]
    pub cooldown: TickRange,
    #[serde(default = "default_find_tries")]
    pub find_tries: u32,
    /// Wind-up between choosing a jump and launching.
    #[serde(default = "default_prepare_ticks")]
    pub prepare_ticks: u64,
    #[serde(default = "default_long_jump_timeout")]
    pub timeout: u64,
    #[serde(default = "default_landing_timeout")]
    pub landing_timeout: u64,
}

fn default_true() -> bool {
    true
}

fn default_max_height() -> i32 {
    2
}

fn default_max_width() -> i32 {
    4
}

fn default_max_velocity() -> f64 {
    1.5
}

fn default_long_jump_cooldown() -> TickRange {
    TickRange::new(600, 1200)
}

fn default_find_tries() -> u32 {
    20
}

fn default_prepare_ticks() -> u64 {
    40
}

fn default_long_jump_timeout() -> u64 {
    200
}

fn default_landing_timeout() -> u64 {
    100
}

impl Default for LongJumpConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            max_height: default_max_height(),
            max_width: default_max_width(),
            max_velocity: default_max_velocity(),
            cooldown: default_long_jump_cooldown(),
            find_tries: default_find_tries(),
            prepare_ticks: default_prepare_ticks(),
            timeout: default_long_jump_timeout(),
            landing_timeout: default_landing_timeout(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HarvestConfig {
    /// Ticks of work before the farmer takes a break.
    #[serde(default = "default_work_ticks")]
    pub work_ticks: u64,
    #[serde(default = "default_harvest_cooldown")]
    pub cooldown: TickRange,
    #[serde(default = "default_harvest_speed")]
    pub speed: f64,
}

fn default_work_ticks() -> u64 {
    200
}

fn default_harvest_cooldown() -> TickRange {
    TickRange::new(20, 40)
}

fn default_harvest_speed() -> f64 {
    0.5
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            work_ticks: default_work_ticks(),
            cooldown: default_harvest_cooldown(),
            speed: default_harvest_speed(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MovementConfig {
    #[serde(default = "default_walk_speed")]
    pub walk_speed: f64,
    #[serde(default = "default_panic_speed")]
    pub panic_speed: f64,
    /// Farthest a path search expands from the agent.
    #[serde(default = "default_path_range")]
    pub path_range: i32,
}

fn default_walk_speed() -> f64 {
    0.5
}

fn default_panic_speed() -> f64 {
    0.75
}

fn default_path_range() -> i32 {
    48
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            walk_speed: default_walk_speed(),
            panic_speed: default_panic_speed(),
            path_range: default_path_range(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BrainConfig {
    #[serde(default = "default_scan_rate")]
    pub sensor_scan_rate: u64,
    #[serde(default = "default_scan_rate")]
    pub schedule_update_interval: u64,
}

fn default_scan_rate() -> u64 {
    20
}

impl Default for BrainConfig {
    fn default() -> Self {
        Self {
            sensor_scan_rate: default_scan_rate(),
            schedule_update_interval: default_scan_rate(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_table_uses_defaults() {
        let config = AiConfig::from_toml_str("").unwrap();
        assert_eq!(config, AiConfig::default());
        assert_eq!(config.long_jump.cooldown, TickRange::new(600, 1200));
        assert_eq!(config.harvest.work_ticks, 200);
        assert_eq!(config.movement.path_range, 48);
    }

    #[test]
    fn partial_sections_override() {
        let config = AiConfig::from_toml_str(
            r#"
            [long_jump]
            enabled = false
            max_velocity = 2.0
            cooldown = { min = 10, max = 20 }

            [harvest]
            work_ticks = 50
            "#,
        )
        .unwrap();
        assert!(!config.long_jump.enabled);
        assert_eq!(config.long_jump.max_velocity, 2.0);
        assert_eq!(config.long_jump.cooldown, TickRange::new(10, 20));
        assert_eq!(config.long_jump.find_tries, 20);
        assert_eq!(config.harvest.work_ticks, 50);
        assert_eq!(config.harvest.cooldown, TickRange::new(20, 40));
    }

    #[test]
    fn rejects_inverted_range() {
        let err = AiConfig::from_toml_str("[harvest]\ncooldown = { min = 40, max = 20 }").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidRange {
                field: "harvest.cooldown",
                min: 40,
                max: 20
            }
        ));
    }

    #[test]
    fn rejects_non_positive_speed() {
        let err = AiConfig::from_toml_str("[movement]\npanic_speed = 0.0").unwrap_err();
        assert!(matches!(err, ConfigError::NonPositive { field: "movement.panic_speed", .. }));
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(matches!(
            AiConfig::from_toml_str("[long_jump\n"),
            Err(ConfigError::Parse(_))
        ));
    }
}
