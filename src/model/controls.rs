use nalgebra::Point3;
use thiserror::Error;

use super::registry::{BodyId, Registry};

pub const SLIDER_MIN: f64 = 0.0;
pub const SLIDER_MAX: f64 = 0.1;
pub const SLIDER_STEP: f64 = 0.001;

/// Everything the control panel can ask of the simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Same as dragging the body's slider to `speed`.
    SetSpeed { body: BodyId, speed: f64 },
    /// Moves the body's slider by whole steps.
    NudgeSpeed { body: BodyId, steps: i32 },
    TogglePause,
    ResetSpeeds,
    ToggleTheme,
}

#[derive(Debug, Error, PartialEq)]
pub enum ControlError {
    #[error("Speed must be a finite number, got {0}")]
    NonFiniteSpeed(f64),
    #[error("Could not parse {0:?} as a speed")]
    Parse(String),
    #[error("No body with id {0:?}")]
    UnknownBody(BodyId),
    #[error("No body named {0:?}")]
    UnknownName(String),
}

pub fn parse_speed(text: &str) -> Result<f64, ControlError> {
    let speed: f64 = text
        .trim()
        .parse()
        .map_err(|_| ControlError::Parse(text.to_owned()))?;
    if speed.is_finite() {
        Ok(speed)
    } else {
        Err(ControlError::NonFiniteSpeed(speed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// The button offers whichever theme isn't active.
    pub fn button_label(self) -> &'static str {
        match self {
            Theme::Light => "Dark Mode",
            Theme::Dark => "Light Mode",
        }
    }

    pub fn background(self) -> Point3<f32> {
        match self {
            Theme::Light => Point3::new(0.82, 0.85, 0.9),
            Theme::Dark => Point3::new(0.0, 0.0, 0.0),
        }
    }

    pub fn foreground(self) -> Point3<f32> {
        match self {
            Theme::Light => Point3::new(0.05, 0.05, 0.1),
            Theme::Dark => Point3::new(1.0, 1.0, 1.0),
        }
    }
}

/// A range input: the value is always a multiple of the step inside the range,
/// except right after a reset, when it holds the body's base speed verbatim.
#[derive(Debug, Clone)]
pub struct Slider {
    value: f64,
    readout: String,
}

impl Slider {
    pub fn new(initial: f64) -> Self {
        Slider {
            value: initial,
            readout: initial.to_string(),
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn readout(&self) -> &str {
        &self.readout
    }

    /// Moves the handle as close as it can get to `value`, and returns where it
    /// ended up.
    pub fn set_input(&mut self, value: f64) -> f64 {
        let steps = (value.clamp(SLIDER_MIN, SLIDER_MAX) - SLIDER_MIN) / SLIDER_STEP;
        self.set_steps(steps.round() as i64)
    }

    pub fn nudge(&mut self, steps: i32) -> f64 {
        let current = ((self.value - SLIDER_MIN) / SLIDER_STEP).round() as i64;
        self.set_steps(current + steps as i64)
    }

    pub fn reset(&mut self, value: f64) {
        self.value = value;
        self.readout = value.to_string();
    }

    fn set_steps(&mut self, steps: i64) -> f64 {
        let max_steps = ((SLIDER_MAX - SLIDER_MIN) / SLIDER_STEP).round() as i64;
        let steps = steps.clamp(0, max_steps);
        self.value = SLIDER_MIN + steps as f64 * SLIDER_STEP;
        self.readout = format!("{:.3}", self.value);
        self.value
    }
}

#[derive(Debug, Clone)]
pub struct SliderRow {
    pub id: BodyId,
    pub name: String,
    pub color: Point3<f32>,
    pub slider: Slider,
}

/// One slider per body, in registry order.
#[derive(Debug, Clone)]
pub struct ControlPanel {
    rows: Vec<SliderRow>,
}

impl ControlPanel {
    pub fn bind(registry: &Registry) -> Self {
        let rows = registry
            .bodies()
            .map(|(id, config)| SliderRow {
                id,
                name: config.name.clone(),
                color: config.color,
                slider: Slider::new(config.base_speed),
            })
            .collect();
        ControlPanel { rows }
    }

    pub fn rows(&self) -> &[SliderRow] {
        &self.rows
    }

    pub fn slider(&self, id: BodyId) -> Option<&Slider> {
        self.rows.get(id.0).map(|row| &row.slider)
    }

    pub fn slider_mut(&mut self, id: BodyId) -> Option<&mut Slider> {
        self.rows.get_mut(id.0).map(|row| &mut row.slider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn test_slider_input() {
        let mut slider = Slider::new(0.04);
        assert_eq!(slider.readout(), "0.04");

        assert_relative_eq!(slider.set_input(0.0123), 0.012, epsilon = 1e-12);
        assert_eq!(slider.readout(), "0.012");

        // Out of range input pins to the ends
        assert_relative_eq!(slider.set_input(5.0), 0.1, epsilon = 1e-12);
        assert_eq!(slider.readout(), "0.100");
        assert_eq!(slider.set_input(-1.0), 0.0);
        assert_eq!(slider.readout(), "0.000");
    }

    #[test]
    fn test_slider_nudge() {
        // Base speeds can sit between steps; a nudge starts from the nearest step
        let mut slider = Slider::new(0.0009);
        assert_relative_eq!(slider.nudge(1), 0.002, epsilon = 1e-12);
        assert_relative_eq!(slider.nudge(-1), 0.001, epsilon = 1e-12);
        assert_eq!(slider.nudge(-10), 0.0);
        assert_relative_eq!(slider.nudge(1000), 0.1, epsilon = 1e-12);

        slider.reset(0.0009);
        assert_eq!(slider.value(), 0.0009);
        assert_eq!(slider.readout(), "0.0009");
    }

    #[test]
    fn test_parse_speed() {
        assert_eq!(parse_speed(" 0.025 "), Ok(0.025));
        assert_eq!(parse_speed("fast"), Err(ControlError::Parse("fast".to_owned())));
        assert!(matches!(parse_speed("NaN"), Err(ControlError::NonFiniteSpeed(_))));
        assert!(matches!(parse_speed("inf"), Err(ControlError::NonFiniteSpeed(_))));
    }

    #[test]
    fn test_theme() {
        let theme = Theme::Dark;
        assert_eq!(theme.button_label(), "Light Mode");
        assert_eq!(theme.toggled().button_label(), "Dark Mode");
        assert_eq!(theme.toggled().toggled(), theme);
    }

    #[test]
    fn test_bind() {
        let registry = Registry::solar_system();
        let panel = ControlPanel::bind(&registry);
        assert_eq!(panel.rows().len(), 8);
        for (id, config) in registry.bodies() {
            let slider = panel.slider(id).unwrap();
            assert_eq!(slider.value(), config.base_speed);
            assert_eq!(slider.readout(), config.base_speed.to_string());
        }
    }
}
