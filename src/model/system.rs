use std::collections::BTreeMap;

use nalgebra::Point3;
use tracing::{debug, warn};

use super::body::{BodyState, SunState};
use super::controls::{parse_speed, Command, ControlError, ControlPanel, Slider, Theme};
use super::registry::{BodyId, Registry};

/// Orbital speeds are in radians per tenth of a second.
pub const TIME_SCALE: f64 = 10.0;
/// Self rotation per simulated frame, in radians.
pub const SPIN_PER_FRAME: f64 = 0.01;

/// All the mutable state of the orrery. The view and the controls only ever touch
/// it through `apply`, `tick`, and `billboard_labels`.
#[derive(Debug, Clone)]
pub struct SolarSystem {
    registry: Registry,
    sun: SunState,
    bodies: BTreeMap<BodyId, BodyState>,
    panel: ControlPanel,
    paused: bool,
    theme: Theme,
}

impl SolarSystem {
    /// `angles` gives each body's starting angle, in registry order.
    pub fn new(registry: Registry, angles: &[f64]) -> Self {
        assert_eq!(
            angles.len(),
            registry.len(),
            "Need one starting angle per body"
        );

        let bodies = registry
            .bodies()
            .zip(angles)
            .map(|((id, config), &angle)| (id, BodyState::new(id, config, angle)))
            .collect();

        SolarSystem {
            sun: SunState::new(registry.sun()),
            panel: ControlPanel::bind(&registry),
            registry,
            bodies,
            paused: false,
            theme: Theme::Dark,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn sun(&self) -> &SunState {
        &self.sun
    }

    pub fn bodies(&self) -> impl Iterator<Item = &BodyState> {
        self.bodies.values()
    }

    pub fn get_body(&self, id: BodyId) -> &BodyState {
        &self.bodies[&id]
    }

    pub fn body_id(&self, name: &str) -> Option<BodyId> {
        self.registry.id_of(name)
    }

    pub fn panel(&self) -> &ControlPanel {
        &self.panel
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn pause_button_label(&self) -> &'static str {
        if self.paused {
            "Resume"
        } else {
            "Pause"
        }
    }

    /// Reads a typed-in speed of the form `NAME=SPEED`, e.g. `Earth=0.02`.
    pub fn speed_command(&self, text: &str) -> Result<Command, ControlError> {
        let (name, speed) = text
            .split_once('=')
            .ok_or_else(|| ControlError::Parse(text.to_owned()))?;
        let name = name.trim();
        let body = self
            .body_id(name)
            .ok_or_else(|| ControlError::UnknownName(name.to_owned()))?;
        let speed = parse_speed(speed)?;
        Ok(Command::SetSpeed { body, speed })
    }

    pub fn apply(&mut self, command: Command) -> Result<(), ControlError> {
        debug!(?command, "Applying command");
        match command {
            Command::SetSpeed { body, speed } => {
                if !speed.is_finite() {
                    warn!(?body, speed, "Rejected speed");
                    return Err(ControlError::NonFiniteSpeed(speed));
                }
                let slider = self.slider_mut(body)?;
                let speed = slider.set_input(speed);
                self.set_speed(body, speed);
            }
            Command::NudgeSpeed { body, steps } => {
                let slider = self.slider_mut(body)?;
                let speed = slider.nudge(steps);
                self.set_speed(body, speed);
            }
            Command::TogglePause => {
                self.paused = !self.paused;
            }
            Command::ResetSpeeds => {
                for (id, config) in self.registry.bodies() {
                    if let Some(slider) = self.panel.slider_mut(id) {
                        slider.reset(config.base_speed);
                    }
                    if let Some(body) = self.bodies.get_mut(&id) {
                        body.speed = config.base_speed;
                    }
                }
            }
            Command::ToggleTheme => {
                self.theme = self.theme.toggled();
            }
        }
        Ok(())
    }

    /// Advances the simulation by `dt` seconds. While paused, nothing moves.
    pub fn tick(&mut self, dt: f64) {
        if self.paused {
            return;
        }
        for body in self.bodies.values_mut() {
            body.advance(dt * TIME_SCALE, SPIN_PER_FRAME);
        }
    }

    /// Turns every label towards `eye`. This is cosmetic, so it happens whether or
    /// not the simulation is paused.
    pub fn billboard_labels(&mut self, eye: &Point3<f64>) {
        for body in self.bodies.values_mut() {
            let anchor = body.position;
            body.label.face(&anchor, eye);
        }
    }

    fn slider_mut(&mut self, id: BodyId) -> Result<&mut Slider, ControlError> {
        self.panel
            .slider_mut(id)
            .ok_or(ControlError::UnknownBody(id))
    }

    fn set_speed(&mut self, id: BodyId, speed: f64) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.speed = speed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use nalgebra::Vector3;
    use std::f64::consts::PI;

    fn system() -> SolarSystem {
        let registry = Registry::solar_system();
        let angles: Vec<f64> = (0..registry.len()).map(|i| i as f64 * 0.7).collect();
        SolarSystem::new(registry, &angles)
    }

    #[test]
    fn test_tick_running() {
        let mut system = system();
        let before: Vec<_> = system.bodies().cloned().collect();

        let dt = 0.016;
        system.tick(dt);

        for (old, new) in before.iter().zip(system.bodies()) {
            let expected = old.angle + old.speed * dt * TIME_SCALE;
            assert_relative_eq!(new.angle, expected, epsilon = 1e-12);
            assert_relative_eq!(
                new.position,
                Point3::new(
                    new.orbit_radius * expected.cos(),
                    0.0,
                    new.orbit_radius * expected.sin()
                ),
                epsilon = 1e-12
            );
            assert_relative_eq!(new.spin, old.spin + SPIN_PER_FRAME);
        }
    }

    #[test]
    fn test_tick_paused() {
        let mut system = system();
        system.apply(Command::TogglePause).unwrap();
        let before: Vec<_> = system.bodies().cloned().collect();

        system.tick(3.0);
        let eye = Point3::new(0.0, 20.0, 30.0);
        system.billboard_labels(&eye);

        for (old, new) in before.iter().zip(system.bodies()) {
            assert_eq!(new.angle, old.angle);
            assert_eq!(new.position, old.position);
            assert_eq!(new.spin, old.spin);

            // ...but labels still turn to the camera
            let to_eye = (eye - new.label_position()).normalize();
            assert_relative_eq!(new.label.orientation * Vector3::z(), to_eye, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_toggle_pause_twice() {
        let mut system = system();
        assert!(!system.is_paused());
        assert_eq!(system.pause_button_label(), "Pause");

        system.apply(Command::TogglePause).unwrap();
        assert!(system.is_paused());
        assert_eq!(system.pause_button_label(), "Resume");

        system.apply(Command::TogglePause).unwrap();
        assert!(!system.is_paused());
        assert_eq!(system.pause_button_label(), "Pause");
    }

    #[test]
    fn test_set_speed_and_reset() {
        let mut system = system();
        let earth = system.body_id("Earth").unwrap();
        let saturn = system.body_id("Saturn").unwrap();

        system
            .apply(Command::SetSpeed {
                body: earth,
                speed: 0.075,
            })
            .unwrap();
        system
            .apply(Command::NudgeSpeed {
                body: saturn,
                steps: 3,
            })
            .unwrap();
        assert_relative_eq!(system.get_body(earth).speed, 0.075, epsilon = 1e-12);
        assert_eq!(system.panel().slider(earth).unwrap().readout(), "0.075");
        assert_relative_eq!(system.get_body(saturn).speed, 0.004, epsilon = 1e-12);

        system.apply(Command::ResetSpeeds).unwrap();
        for (id, config) in system.registry().bodies() {
            assert_eq!(system.get_body(id).speed, config.base_speed);
            assert_eq!(system.panel().slider(id).unwrap().value(), config.base_speed);
        }
    }

    #[test]
    fn test_rejects_bad_speed() {
        let mut system = system();
        let mars = system.body_id("Mars").unwrap();

        let result = system.apply(Command::SetSpeed {
            body: mars,
            speed: f64::NAN,
        });
        assert!(matches!(result, Err(ControlError::NonFiniteSpeed(_))));
        assert_eq!(system.get_body(mars).speed, 0.008);

        let result = system.apply(Command::SetSpeed {
            body: BodyId(42),
            speed: 0.01,
        });
        assert_eq!(result, Err(ControlError::UnknownBody(BodyId(42))));
    }

    #[test]
    fn test_typed_speeds() {
        let mut system = system();
        let venus = system.body_id("Venus").unwrap();

        let command = system.speed_command(" Venus = 0.05").unwrap();
        assert_eq!(command, Command::SetSpeed { body: venus, speed: 0.05 });
        system.apply(command).unwrap();
        assert_relative_eq!(system.get_body(venus).speed, 0.05, epsilon = 1e-12);
        assert_eq!(system.panel().slider(venus).unwrap().readout(), "0.050");

        assert_eq!(
            system.speed_command("Venus"),
            Err(ControlError::Parse("Venus".to_owned()))
        );
        assert_eq!(
            system.speed_command("Vulcan=0.01"),
            Err(ControlError::UnknownName("Vulcan".to_owned()))
        );
        assert_eq!(
            system.speed_command("Venus=fast"),
            Err(ControlError::Parse("fast".to_owned()))
        );
        assert!(matches!(
            system.speed_command("Venus=NaN"),
            Err(ControlError::NonFiniteSpeed(_))
        ));
    }

    #[test]
    fn test_theme_leaves_simulation_alone() {
        let mut system = system();
        let before: Vec<_> = system.bodies().map(|b| (b.angle, b.speed)).collect();

        system.apply(Command::ToggleTheme).unwrap();
        assert_eq!(system.theme(), Theme::Light);

        let after: Vec<_> = system.bodies().map(|b| (b.angle, b.speed)).collect();
        assert_eq!(before, after);
        assert!(!system.is_paused());
    }

    #[test]
    fn test_quarter_turn() {
        let mut system = system();
        let mercury = system.body_id("Mercury").unwrap();
        let start = system.get_body(mercury).angle;

        // 0.04 rad per tenth of a second
        let dt = PI / 2.0 / (0.04 * TIME_SCALE);
        system.tick(dt);
        assert_relative_eq!(system.get_body(mercury).angle, start + PI / 2.0, epsilon = 1e-12);
    }
}
