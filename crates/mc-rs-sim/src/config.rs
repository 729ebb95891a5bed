use serde::Deserialize;
use std::path::Path;

use mc_rs_ai::config::AiConfig;

#[derive(Debug, Deserialize)]
pub struct SimConfig {
    pub world: WorldSection,
    #[serde(default)]
    pub simulation: SimulationSection,
    pub logging: LoggingSection,
    #[serde(default)]
    pub report: ReportSection,
    #[serde(default)]
    pub ai: AiConfig,
}

#[derive(Debug, Deserialize)]
pub struct WorldSection {
    pub seed: u64,
    /// Generated chunks around the origin, in chunks.
    #[serde(default = "default_radius")]
    pub radius: i32,
    /// Side length of each farm plot.
    #[serde(default = "default_farm_size")]
    pub farm_size: i32,
}

fn default_radius() -> i32 {
    3
}

fn default_farm_size() -> i32 {
    5
}

#[derive(Debug, Deserialize)]
pub struct SimulationSection {
    #[serde(default = "default_villagers")]
    pub villagers: usize,
    /// How many of the villagers are farmers. Each gets a plot.
    #[serde(default = "default_farmers")]
    pub farmers: usize,
    /// Ticks to run. 0 = until Ctrl+C.
    #[serde(default = "default_ticks")]
    pub ticks: u64,
    #[serde(default = "default_tick_rate")]
    pub tick_rate: u32,
    /// Pace ticks at `tick_rate` instead of running flat out.
    #[serde(default)]
    pub realtime: bool,
}

fn default_villagers() -> usize {
    6
}

fn default_farmers() -> usize {
    2
}

fn default_ticks() -> u64 {
    24000
}

fn default_tick_rate() -> u32 {
    20
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            villagers: default_villagers(),
            farmers: default_farmers(),
            ticks: default_ticks(),
            tick_rate: default_tick_rate(),
            realtime: false,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoggingSection {
    pub level: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportSection {
    /// Where to write the JSON report. Printed to stdout when absent.
    #[serde(default)]
    pub path: Option<String>,
}

impl SimConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: Self = toml::from_str(contents)?;
        config.ai.validate()?;
        if config.simulation.farmers > config.simulation.villagers {
            return Err(format!(
                "simulation.farmers ({}) exceeds simulation.villagers ({})",
                config.simulation.farmers, config.simulation.villagers
            )
            .into());
        }
        if config.simulation.tick_rate == 0 {
            return Err("simulation.tick_rate must be positive".into());
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_config() {
        let toml_str = r#"
            [world]
            seed = 7
            radius = 2

            [simulation]
            villagers = 4
            farmers = 1
            ticks = 0
            realtime = true

            [logging]
            level = "debug"

            [report]
            path = "out.json"

            [ai.long_jump]
            enabled = false
        "#;
        let config = SimConfig::parse(toml_str).unwrap();
        assert_eq!(config.world.seed, 7);
        assert_eq!(config.world.radius, 2);
        assert_eq!(config.world.farm_size, 5); // default
        assert_eq!(config.simulation.villagers, 4);
        assert_eq!(config.simulation.ticks, 0);
        assert_eq!(config.simulation.tick_rate, 20); // default
        assert!(config.simulation.realtime);
        assert_eq!(config.report.path.as_deref(), Some("out.json"));
        assert!(!config.ai.long_jump.enabled);
        assert_eq!(config.ai.harvest, AiConfig::default().harvest);
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let toml_str = r#"
            [world]
            seed = 1

            [logging]
            level = "info"
        "#;
        let config = SimConfig::parse(toml_str).unwrap();
        assert_eq!(config.simulation.villagers, 6);
        assert_eq!(config.simulation.farmers, 2);
        assert!(config.report.path.is_none());
        assert_eq!(config.ai, AiConfig::default());
    }

    #[test]
    fn rejects_more_farmers_than_villagers() {
        let toml_str = r#"
            [world]
            seed = 1

            [simulation]
            villagers = 1
            farmers = 2

            [logging]
            level = "info"
        "#;
        assert!(SimConfig::parse(toml_str).is_err());
    }

    #[test]
    fn rejects_inverted_ai_ranges() {
        let toml_str = r#"
            [world]
            seed = 1

            [logging]
            level = "info"

            [ai.harvest]
            cooldown = { min = 50, max = 10 }
        "#;
        assert!(SimConfig::parse(toml_str).is_err());
    }
}
