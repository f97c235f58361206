use std::f64::consts::TAU;

use nalgebra::{Point3, Vector3};
use rand::Rng;
use tracing::info;

use super::body::LABEL_CLEARANCE;
use super::registry::{color_from_hex, BodyId, Registry};
use super::system::SolarSystem;

pub const DEFAULT_STAR_COUNT: usize = 5000;
/// Stars are scattered through a cube with this side length.
pub const STARFIELD_EXTENT: f32 = 2000.0;

const ORBIT_PATH_HALF_WIDTH: f32 = 0.1;
const ORBIT_PATH_SEGMENTS: usize = 64;
const PLANET_RING_INNER: f32 = 1.5;
const PLANET_RING_OUTER: f32 = 2.5;
const PLANET_RING_SEGMENTS: usize = 32;

#[derive(Debug, Clone, PartialEq)]
pub struct SpherePrimitive {
    pub radius: f32,
    pub color: Point3<f32>,
}

/// A flat annulus lying in its parent's xz-plane.
#[derive(Debug, Clone, PartialEq)]
pub struct RingPrimitive {
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub segments: usize,
    pub color: Point3<f32>,
    pub opacity: f32,
}

impl RingPrimitive {
    /// The color after blending with `background` according to opacity.
    pub fn blended_color(&self, background: &Point3<f32>) -> Point3<f32> {
        Point3::from(self.color.coords * self.opacity + background.coords * (1.0 - self.opacity))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelPrimitive {
    pub text: String,
    pub offset: Vector3<f32>,
    pub width: f32,
    pub height: f32,
}

/// Everything drawn for one planet. The orbit path hangs off the scene root; the
/// rings and label travel with the planet.
#[derive(Debug, Clone)]
pub struct BodyPrimitives {
    pub id: BodyId,
    pub sphere: SpherePrimitive,
    pub orbit_path: RingPrimitive,
    pub rings: Vec<RingPrimitive>,
    pub label: LabelPrimitive,
}

#[derive(Debug, Clone)]
pub struct Starfield {
    pub points: Vec<Point3<f32>>,
    pub color: Point3<f32>,
    pub point_size: f32,
}

impl Starfield {
    pub fn scatter<R: Rng>(count: usize, extent: f32, rng: &mut R) -> Self {
        let half = extent / 2.0;
        let points = (0..count)
            .map(|_| {
                Point3::new(
                    rng.gen_range(-half..half),
                    rng.gen_range(-half..half),
                    rng.gen_range(-half..half),
                )
            })
            .collect();
        Starfield {
            points,
            color: Point3::new(1.0, 1.0, 1.0),
            point_size: 1.0,
        }
    }
}

/// A description of everything in the scene, independent of any graphics context.
#[derive(Debug, Clone)]
pub struct SceneLayout {
    pub sun: SpherePrimitive,
    pub bodies: Vec<BodyPrimitives>,
    pub starfield: Starfield,
}

impl SceneLayout {
    /// Lays out the scene for `registry` and creates the matching simulation state.
    /// Each body starts at a random point on its orbit.
    pub fn build<R: Rng>(
        registry: &Registry,
        star_count: usize,
        rng: &mut R,
    ) -> (SceneLayout, SolarSystem) {
        let sun = registry.sun();
        let sun = SpherePrimitive {
            radius: sun.radius,
            color: sun.color,
        };

        let bodies: Vec<_> = registry
            .bodies()
            .map(|(id, config)| {
                let orbit_r = config.orbit_radius as f32;
                let orbit_path = RingPrimitive {
                    inner_radius: (orbit_r - ORBIT_PATH_HALF_WIDTH).max(0.0),
                    outer_radius: orbit_r + ORBIT_PATH_HALF_WIDTH,
                    segments: ORBIT_PATH_SEGMENTS,
                    color: color_from_hex(0x888888),
                    opacity: 0.3,
                };

                let mut rings = vec![];
                if config.has_ring {
                    rings.push(RingPrimitive {
                        inner_radius: config.radius * PLANET_RING_INNER,
                        outer_radius: config.radius * PLANET_RING_OUTER,
                        segments: PLANET_RING_SEGMENTS,
                        color: color_from_hex(0xD2B48C),
                        opacity: 0.8,
                    });
                }

                BodyPrimitives {
                    id,
                    sphere: SpherePrimitive {
                        radius: config.radius,
                        color: config.color,
                    },
                    orbit_path,
                    rings,
                    label: LabelPrimitive {
                        text: config.name.clone(),
                        offset: Vector3::y() * (config.radius + LABEL_CLEARANCE as f32),
                        width: 2.0,
                        height: 1.0,
                    },
                }
            })
            .collect();

        let angles: Vec<f64> = (0..registry.len())
            .map(|_| rng.gen_range(0.0..TAU))
            .collect();
        let starfield = Starfield::scatter(star_count, STARFIELD_EXTENT, rng);

        info!(
            bodies = bodies.len(),
            stars = starfield.points.len(),
            "Scene laid out"
        );

        let layout = SceneLayout {
            sun,
            bodies,
            starfield,
        };
        (layout, SolarSystem::new(registry.clone(), &angles))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_build_is_deterministic() {
        let registry = Registry::solar_system();
        let (layout_a, system_a) = SceneLayout::build(&registry, 100, &mut StdRng::seed_from_u64(7));
        let (layout_b, system_b) = SceneLayout::build(&registry, 100, &mut StdRng::seed_from_u64(7));

        assert_eq!(layout_a.starfield.points, layout_b.starfield.points);
        for (a, b) in system_a.bodies().zip(system_b.bodies()) {
            assert_eq!(a.angle, b.angle);
        }
    }

    #[test]
    fn test_starfield_bounds() {
        let mut rng = StdRng::seed_from_u64(1);
        let stars = Starfield::scatter(DEFAULT_STAR_COUNT, STARFIELD_EXTENT, &mut rng);
        assert_eq!(stars.points.len(), DEFAULT_STAR_COUNT);
        let half = STARFIELD_EXTENT / 2.0;
        for p in stars.points.iter() {
            assert!(p.iter().all(|c| (-half..half).contains(c)));
        }
    }

    #[test]
    fn test_primitive_sizes() {
        let registry = Registry::solar_system();
        let (layout, _) = SceneLayout::build(&registry, 0, &mut StdRng::seed_from_u64(0));

        assert_eq!(layout.sun.radius, 2.0);

        let saturn = &layout.bodies[5];
        assert_eq!(saturn.label.text, "Saturn");
        approx::assert_relative_eq!(saturn.orbit_path.inner_radius, 16.9);
        approx::assert_relative_eq!(saturn.orbit_path.outer_radius, 17.1);
        approx::assert_relative_eq!(saturn.rings[0].inner_radius, 1.5);
        approx::assert_relative_eq!(saturn.rings[0].outer_radius, 2.5);
        approx::assert_relative_eq!(saturn.label.offset, Vector3::new(0.0, 1.5, 0.0));
    }

    #[test]
    fn test_blended_color() {
        let ring = RingPrimitive {
            inner_radius: 1.0,
            outer_radius: 2.0,
            segments: 8,
            color: Point3::new(1.0, 1.0, 1.0),
            opacity: 0.25,
        };
        approx::assert_relative_eq!(
            ring.blended_color(&Point3::origin()),
            Point3::new(0.25, 0.25, 0.25)
        );
    }
}
