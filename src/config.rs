//! Settings file loading
//!
//! Every section is optional; a missing file is not an error as long as no path was
//! asked for, and an empty `[[body]]` list means the built-in solar system.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::model::registry::{parse_color, BodyConfig, Registry, RegistryError, SunConfig};
use crate::model::scene::DEFAULT_STAR_COUNT;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid body list: {0}")]
    Registry(#[from] RegistryError),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub window: WindowSettings,
    #[serde(default)]
    pub scene: SceneSettings,
    #[serde(default)]
    pub sun: Option<SunEntry>,
    #[serde(default, rename = "body")]
    pub bodies: Vec<BodyEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WindowSettings {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: default_title(),
            width: default_width(),
            height: default_height(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneSettings {
    #[serde(default = "default_star_count")]
    pub star_count: usize,
    /// Fixes the starting angles and the starfield
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub start_paused: bool,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            star_count: default_star_count(),
            seed: None,
            start_paused: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SunEntry {
    #[serde(default = "default_sun_name")]
    pub name: String,
    pub color: String,
    pub radius: f32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BodyEntry {
    pub name: String,
    /// `RRGGBB`
    pub color: String,
    pub radius: f32,
    pub orbit_radius: f64,
    pub speed: f64,
    #[serde(default)]
    pub has_ring: bool,
}

fn default_title() -> String {
    "Solar System".to_string()
}

fn default_width() -> u32 {
    1280
}

fn default_height() -> u32 {
    720
}

fn default_star_count() -> usize {
    DEFAULT_STAR_COUNT
}

fn default_sun_name() -> String {
    "Sun".to_string()
}

impl Settings {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let settings = Self::from_toml_str(&content)?;
        info!(path = %path.display(), bodies = settings.bodies.len(), "Settings loaded");
        Ok(settings)
    }

    /// The bodies to simulate. Falls back to the built-in solar system when the file
    /// lists none.
    pub fn registry(&self) -> Result<Registry, ConfigError> {
        if self.bodies.is_empty() {
            let mut registry = Registry::solar_system();
            if let Some(sun) = &self.sun {
                let bodies = registry.bodies().map(|(_, b)| b.clone()).collect();
                registry = Registry::new(sun.to_config()?, bodies)?;
            }
            return Ok(registry);
        }

        let sun = match &self.sun {
            Some(sun) => sun.to_config()?,
            None => SunConfig::default(),
        };
        let bodies = self
            .bodies
            .iter()
            .map(BodyEntry::to_config)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Registry::new(sun, bodies)?)
    }
}

impl SunEntry {
    fn to_config(&self) -> Result<SunConfig, RegistryError> {
        Ok(SunConfig {
            name: self.name.clone(),
            color: parse_color(&self.color)?,
            radius: self.radius,
        })
    }
}

impl BodyEntry {
    fn to_config(&self) -> Result<BodyConfig, RegistryError> {
        Ok(BodyConfig {
            name: self.name.clone(),
            color: parse_color(&self.color)?,
            radius: self.radius,
            orbit_radius: self.orbit_radius,
            base_speed: self.speed,
            has_ring: self.has_ring,
        })
    }
}
