use std::collections::HashSet;

use nalgebra::Point3;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct BodyId(pub usize);

// All the immutable info about a planet
#[derive(Debug, Clone)]
pub struct BodyConfig {
    pub name: String,
    pub color: Point3<f32>,
    pub radius: f32,
    pub orbit_radius: f64,
    pub base_speed: f64,
    pub has_ring: bool,
}

#[derive(Debug, Clone)]
pub struct SunConfig {
    pub name: String,
    pub color: Point3<f32>,
    pub radius: f32,
}

impl Default for SunConfig {
    fn default() -> Self {
        SunConfig {
            name: String::from("Sun"),
            color: Point3::new(1.0, 1.0, 0.0),
            radius: 2.0,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("Registry has no bodies")]
    Empty,
    #[error("Body name {0:?} appears more than once")]
    DuplicateName(String),
    #[error("Body {name:?} has non-positive radius {radius}")]
    BadRadius { name: String, radius: f32 },
    #[error("Body {name:?} has negative orbit radius {orbit_radius}")]
    BadOrbitRadius { name: String, orbit_radius: f64 },
    #[error("Body {name:?} has non-finite speed {speed}")]
    BadSpeed { name: String, speed: f64 },
    #[error("Invalid color {0:?}, expected RRGGBB")]
    BadColor(String),
}

/// The ordered list of bodies making up the system. Iteration order is the order
/// bodies are built and listed in the control panel, and determines their ids.
#[derive(Debug, Clone)]
pub struct Registry {
    sun: SunConfig,
    bodies: Vec<BodyConfig>,
}

impl Registry {
    /// Builds a registry from untrusted data, checking every config.
    pub fn new(sun: SunConfig, bodies: Vec<BodyConfig>) -> Result<Self, RegistryError> {
        if bodies.is_empty() {
            return Err(RegistryError::Empty);
        }

        let sun_body = Self::sun_as_body(&sun);
        let mut seen = HashSet::new();
        for body in bodies.iter().chain(std::iter::once(&sun_body)) {
            if !seen.insert(body.name.clone()) {
                return Err(RegistryError::DuplicateName(body.name.clone()));
            }
            // Written this way so NaN fails too
            if !(body.radius > 0.0) {
                return Err(RegistryError::BadRadius {
                    name: body.name.clone(),
                    radius: body.radius,
                });
            }
            if !(body.orbit_radius >= 0.0) || !body.orbit_radius.is_finite() {
                return Err(RegistryError::BadOrbitRadius {
                    name: body.name.clone(),
                    orbit_radius: body.orbit_radius,
                });
            }
            if !body.base_speed.is_finite() {
                return Err(RegistryError::BadSpeed {
                    name: body.name.clone(),
                    speed: body.base_speed,
                });
            }
        }

        Ok(Registry { sun, bodies })
    }

    /// The eight planets, roughly to scale with each other (but not with the sun, or
    /// with their orbits).
    pub fn solar_system() -> Self {
        // name, color, radius, orbit radius, speed, ring
        let planets: [(&str, u32, f32, f64, f64, bool); 8] = [
            ("Mercury", 0xA9A9A9, 0.4, 5.0, 0.04, false),
            ("Venus", 0xFFA500, 0.6, 7.0, 0.015, false),
            ("Earth", 0x1E90FF, 0.6, 9.0, 0.01, false),
            ("Mars", 0xFF4500, 0.5, 11.0, 0.008, false),
            ("Jupiter", 0xDAA520, 1.2, 14.0, 0.002, false),
            ("Saturn", 0xF4A460, 1.0, 17.0, 0.0009, true),
            ("Uranus", 0xADD8E6, 0.8, 20.0, 0.0004, false),
            ("Neptune", 0x0000FF, 0.8, 23.0, 0.0001, false),
        ];

        let bodies = planets
            .iter()
            .map(
                |&(name, hex, radius, orbit_radius, base_speed, has_ring)| BodyConfig {
                    name: name.to_owned(),
                    color: color_from_hex(hex),
                    radius,
                    orbit_radius,
                    base_speed,
                    has_ring,
                },
            )
            .collect();

        Registry {
            sun: SunConfig::default(),
            bodies,
        }
    }

    pub fn sun(&self) -> &SunConfig {
        &self.sun
    }

    pub fn bodies(&self) -> impl Iterator<Item = (BodyId, &BodyConfig)> {
        self.bodies.iter().enumerate().map(|(i, b)| (BodyId(i), b))
    }

    pub fn get(&self, id: BodyId) -> &BodyConfig {
        &self.bodies[id.0]
    }

    pub fn id_of(&self, name: &str) -> Option<BodyId> {
        self.bodies
            .iter()
            .position(|b| b.name == name)
            .map(BodyId)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    fn sun_as_body(sun: &SunConfig) -> BodyConfig {
        BodyConfig {
            name: sun.name.clone(),
            color: sun.color,
            radius: sun.radius,
            orbit_radius: 0.0,
            base_speed: 0.0,
            has_ring: false,
        }
    }
}

pub fn color_from_hex(hex: u32) -> Point3<f32> {
    let r = (hex >> 16) & 0xFF;
    let g = (hex >> 8) & 0xFF;
    let b = hex & 0xFF;
    Point3::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
}

/// Parses `RRGGBB`, with or without a leading `#`.
pub fn parse_color(s: &str) -> Result<Point3<f32>, RegistryError> {
    let digits = s.strip_prefix('#').unwrap_or(s);
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(RegistryError::BadColor(s.to_owned()));
    }
    let hex = u32::from_str_radix(digits, 16).map_err(|_| RegistryError::BadColor(s.to_owned()))?;
    Ok(color_from_hex(hex))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planet(name: &str) -> BodyConfig {
        BodyConfig {
            name: name.to_owned(),
            color: Point3::new(1.0, 1.0, 1.0),
            radius: 1.0,
            orbit_radius: 10.0,
            base_speed: 0.01,
            has_ring: false,
        }
    }

    #[test]
    fn test_solar_system() {
        let registry = Registry::solar_system();
        assert_eq!(registry.len(), 8);

        let names: Vec<_> = registry.bodies().map(|(_, b)| b.name.as_str()).collect();
        assert_eq!(
            names,
            ["Mercury", "Venus", "Earth", "Mars", "Jupiter", "Saturn", "Uranus", "Neptune"]
        );

        let ringed: Vec<_> = registry
            .bodies()
            .filter(|(_, b)| b.has_ring)
            .map(|(id, _)| id)
            .collect();
        assert_eq!(ringed, vec![BodyId(5)]);
        assert_eq!(registry.id_of("Saturn"), Some(BodyId(5)));
        assert_eq!(registry.id_of("Pluto"), None);

        // The built-in data passes the same checks as loaded data
        let sun = registry.sun().clone();
        let bodies = registry.bodies().map(|(_, b)| b.clone()).collect();
        assert!(Registry::new(sun, bodies).is_ok());
    }

    #[test]
    fn test_validation() {
        let sun = SunConfig::default;

        assert_eq!(Registry::new(sun(), vec![]).unwrap_err(), RegistryError::Empty);

        assert_eq!(
            Registry::new(sun(), vec![planet("A"), planet("A")]).unwrap_err(),
            RegistryError::DuplicateName("A".to_owned())
        );
        assert_eq!(
            Registry::new(sun(), vec![planet("Sun")]).unwrap_err(),
            RegistryError::DuplicateName("Sun".to_owned())
        );

        let mut flat = planet("Flat");
        flat.radius = 0.0;
        assert!(matches!(
            Registry::new(sun(), vec![flat]),
            Err(RegistryError::BadRadius { .. })
        ));

        let mut inside_out = planet("InsideOut");
        inside_out.orbit_radius = -1.0;
        assert!(matches!(
            Registry::new(sun(), vec![inside_out]),
            Err(RegistryError::BadOrbitRadius { .. })
        ));

        let mut runaway = planet("Runaway");
        runaway.base_speed = f64::NAN;
        assert!(matches!(
            Registry::new(sun(), vec![runaway]),
            Err(RegistryError::BadSpeed { .. })
        ));

        // Zero orbit radius and negative speed are both fine
        let mut odd = planet("Odd");
        odd.orbit_radius = 0.0;
        odd.base_speed = -0.5;
        assert!(Registry::new(sun(), vec![odd]).is_ok());
    }

    #[test]
    fn test_parse_color() {
        approx::assert_relative_eq!(parse_color("FF8000").unwrap(), Point3::new(1.0, 128.0 / 255.0, 0.0));
        approx::assert_relative_eq!(parse_color("#0000ff").unwrap(), Point3::new(0.0, 0.0, 1.0));
        assert!(parse_color("FFF").is_err());
        assert!(parse_color("GGGGGG").is_err());
        assert!(parse_color("+12345").is_err());
    }
}
