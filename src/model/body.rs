use nalgebra::{Point3, UnitQuaternion, Vector3};

use super::registry::{BodyConfig, BodyId, SunConfig};
use crate::math::geometry::{billboard_rotation, orbit_position};

/// How far above the surface a label floats.
pub const LABEL_CLEARANCE: f64 = 0.5;

/// A flat label hovering at a fixed offset from its body, turned to face the viewer.
#[derive(Debug, Clone)]
pub struct Billboard {
    pub offset: Vector3<f64>,
    pub orientation: UnitQuaternion<f64>,
}

impl Billboard {
    pub fn above(radius: f64) -> Self {
        Billboard {
            offset: Vector3::y() * (radius + LABEL_CLEARANCE),
            orientation: UnitQuaternion::identity(),
        }
    }

    pub fn face(&mut self, anchor: &Point3<f64>, eye: &Point3<f64>) {
        let to_eye = eye - (anchor + self.offset);
        self.orientation = billboard_rotation(&to_eye, &Vector3::y(), 1e-9);
    }
}

/// Per-planet state that changes while the simulation runs.
#[derive(Debug, Clone)]
pub struct BodyState {
    pub id: BodyId,
    pub angle: f64,
    pub speed: f64,
    pub orbit_radius: f64,
    pub spin: f64,
    pub position: Point3<f64>,
    pub label: Billboard,
}

impl BodyState {
    pub fn new(id: BodyId, config: &BodyConfig, angle: f64) -> Self {
        BodyState {
            id,
            angle,
            speed: config.base_speed,
            orbit_radius: config.orbit_radius,
            spin: 0.0,
            position: orbit_position(config.orbit_radius, angle),
            label: Billboard::above(config.radius as f64),
        }
    }

    /// Moves the body along its orbit; `scaled_dt` already includes any time scaling.
    pub fn advance(&mut self, scaled_dt: f64, spin: f64) {
        self.angle += self.speed * scaled_dt;
        self.spin += spin;
        self.update_position();
    }

    pub fn update_position(&mut self) {
        self.position = orbit_position(self.orbit_radius, self.angle);
    }

    pub fn label_position(&self) -> Point3<f64> {
        self.position + self.label.offset
    }
}

/// The sun sits still at the origin.
#[derive(Debug, Clone)]
pub struct SunState {
    pub name: String,
    pub radius: f32,
}

impl SunState {
    pub fn new(config: &SunConfig) -> Self {
        SunState {
            name: config.name.clone(),
            radius: config.radius,
        }
    }

    pub fn position(&self) -> Point3<f64> {
        Point3::origin()
    }
}
