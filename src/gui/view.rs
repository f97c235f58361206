use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use kiss3d::camera::Camera;
use kiss3d::planar_camera::PlanarCamera;
use kiss3d::post_processing::PostProcessingEffect;
use kiss3d::renderer::Renderer;
use kiss3d::resource::Mesh;
use kiss3d::scene::SceneNode;
use kiss3d::text::Font;
use kiss3d::window::Window;
use nalgebra::{Point2, Point3, Translation3, UnitQuaternion, Vector3};
use tracing::info;

use super::camera::{OrbitCamera, Viewport};
use super::controller::Controller;
use super::renderers::StarfieldRenderer;
use crate::math::geometry::annulus;
use crate::model::scene::{LabelPrimitive, RingPrimitive, SceneLayout};
use crate::model::{BodyId, Command, ControlError, SolarSystem, Theme};

const LABEL_TEXT_SIZE: f32 = 36.0;
const HUD_TEXT_SIZE: f32 = 40.0;
const LABEL_PLATE_OPACITY: f32 = 0.7;

struct BodyNodes {
    // Moves around the orbit, but never turns
    group: SceneNode,
    // Spins in place inside the group
    sphere: SceneNode,
    label_plate: SceneNode,
    label: LabelPrimitive,
}

/// Labels sit on a plate darkened from the background, so the text is picked to
/// stand out against the plate rather than the background.
fn label_text_color(theme: Theme) -> Point3<f32> {
    let plate = label_plate_color(theme);
    let luminance = 0.2126 * plate.x + 0.7152 * plate.y + 0.0722 * plate.z;
    if luminance > 0.5 {
        Point3::new(0.0, 0.0, 0.0)
    } else {
        Point3::new(1.0, 1.0, 1.0)
    }
}

fn label_plate_color(theme: Theme) -> Point3<f32> {
    theme.background() * (1.0 - LABEL_PLATE_OPACITY)
}

pub struct View {
    // Object state
    system: SolarSystem,
    sun: SceneNode,
    bodies: BTreeMap<BodyId, BodyNodes>,
    orbit_paths: Vec<(SceneNode, RingPrimitive)>,
    planet_rings: Vec<(SceneNode, RingPrimitive)>,
    attached: bool,
    // Camera
    camera: OrbitCamera,
    // Misc
    renderer: StarfieldRenderer,
    applied_theme: Option<Theme>,
}

impl View {
    pub fn new(layout: SceneLayout, system: SolarSystem, window: &mut Window) -> Self {
        let viewport = Viewport {
            width: window.width(),
            height: window.height(),
        };
        let camera = OrbitCamera::new(Point3::new(0.0, 20.0, 30.0), Point3::origin(), viewport);

        let mut sun = window.add_sphere(layout.sun.radius);
        let color = &layout.sun.color;
        sun.set_color(color.x, color.y, color.z);
        let position: Point3<f32> = nalgebra::convert(system.sun().position());
        sun.set_local_translation(Translation3::from(position.coords));

        let mut bodies = BTreeMap::new();
        let mut orbit_paths = vec![];
        let mut planet_rings = vec![];
        for body in layout.bodies.iter() {
            let orbit_path = Self::create_ring_object(window.scene_mut(), &body.orbit_path);
            orbit_paths.push((orbit_path, body.orbit_path.clone()));

            let mut group = window.add_group();
            let mut sphere = group.add_sphere(body.sphere.radius);
            let color = &body.sphere.color;
            sphere.set_color(color.x, color.y, color.z);

            for ring in body.rings.iter() {
                let node = Self::create_ring_object(&mut sphere, ring);
                planet_rings.push((node, ring.clone()));
            }

            let mut label_plate = group.add_quad(body.label.width, body.label.height, 1, 1);
            label_plate.set_local_translation(Translation3::from(body.label.offset));

            bodies.insert(
                body.id,
                BodyNodes {
                    group,
                    sphere,
                    label_plate,
                    label: body.label.clone(),
                },
            );
        }

        let mut view = Self {
            system,
            sun,
            bodies,
            orbit_paths,
            planet_rings,
            attached: true,
            camera,
            renderer: StarfieldRenderer::new(&layout.starfield),
            applied_theme: None,
        };
        view.update_scene_objects(window);

        info!(
            bodies = view.bodies.len(),
            rings = view.planet_rings.len(),
            "Scene attached to window"
        );
        view
    }

    fn create_ring_object(parent: &mut SceneNode, ring: &RingPrimitive) -> SceneNode {
        let (vertices, faces) = annulus(ring.inner_radius, ring.outer_radius, ring.segments);
        let mesh = Mesh::new(vertices, faces, None, None, false);
        let mut node = parent.add_mesh(Rc::new(RefCell::new(mesh)), Vector3::from_element(1.0));
        // Rings are seen from both sides
        node.enable_backface_culling(false);
        node
    }

    pub fn apply(&mut self, command: Command) -> Result<(), ControlError> {
        self.system.apply(command)
    }

    /// One frame of simulation: motion first, then labels follow the camera.
    pub fn update_state_by(&mut self, dt: f64) {
        self.system.tick(dt);
        let eye: Point3<f64> = nalgebra::convert(self.camera.eye());
        self.system.billboard_labels(&eye);
    }

    fn update_scene_objects(&mut self, window: &mut Window) {
        if !self.attached {
            return;
        }

        if self.applied_theme != Some(self.system.theme()) {
            self.apply_theme(window, self.system.theme());
        }

        for body in self.system.bodies() {
            let nodes = match self.bodies.get_mut(&body.id) {
                Some(nodes) => nodes,
                None => continue,
            };

            let position: Point3<f32> = nalgebra::convert(body.position);
            nodes
                .group
                .set_local_translation(Translation3::from(position.coords));
            nodes.sphere.set_local_rotation(UnitQuaternion::from_axis_angle(
                &Vector3::y_axis(),
                body.spin as f32,
            ));
            let orientation: UnitQuaternion<f32> = nalgebra::convert(body.label.orientation);
            nodes.label_plate.set_local_rotation(orientation);
        }
    }

    fn apply_theme(&mut self, window: &mut Window, theme: Theme) {
        let background = theme.background();
        window.set_background_color(background.x, background.y, background.z);

        for (node, ring) in self.orbit_paths.iter_mut().chain(self.planet_rings.iter_mut()) {
            let color = ring.blended_color(&background);
            node.set_color(color.x, color.y, color.z);
        }

        let plate = label_plate_color(theme);
        for nodes in self.bodies.values_mut() {
            nodes.label_plate.set_color(plate.x, plate.y, plate.z);
        }

        let stars = theme.foreground();
        self.renderer.set_color(stars);
        self.applied_theme = Some(theme);
    }

    pub fn prerender_scene(&mut self, window: &mut Window, controller: &Controller) {
        self.update_scene_objects(window);
        if !self.attached {
            return;
        }

        let font = Font::default();
        let text_color = label_text_color(self.system.theme());
        // Text is laid out in physical pixels, the camera works in framebuffer pixels
        let scale = window.scale_factor() as f32;

        for body in self.system.bodies() {
            let nodes = &self.bodies[&body.id];
            let anchor: Point3<f32> = nalgebra::convert(body.label_position());
            let screen = match self.camera.to_screen(&anchor) {
                Some(pt) => pt,
                None => continue,
            };
            let half_width = nodes.label.text.len() as f32 * LABEL_TEXT_SIZE * 0.25;
            window.draw_text(
                &nodes.label.text,
                &Point2::new(
                    screen.x * scale - half_width,
                    screen.y * scale - LABEL_TEXT_SIZE / 2.0,
                ),
                LABEL_TEXT_SIZE,
                &font,
                &text_color,
            );
        }

        self.draw_control_panel(window, controller, &font);
    }

    fn draw_control_panel(&self, window: &mut Window, controller: &Controller, font: &Rc<Font>) {
        let theme = self.system.theme();
        let mut y = 0.0;

        for row in self.system.panel().rows() {
            let marker = if row.id == controller.selected_body() {
                ">"
            } else {
                " "
            };
            let line = format!("{} {:<8} {}", marker, row.name, row.slider.readout());
            window.draw_text(&line, &Point2::new(0.0, y), HUD_TEXT_SIZE, font, &row.color);
            y += HUD_TEXT_SIZE;
        }

        let buttons = format!(
            "[Space] {}   [R] Reset Speeds   [T] {}\nFPS: {:.0}",
            self.system.pause_button_label(),
            theme.button_label(),
            controller.fps(),
        );
        window.draw_text(
            &buttons,
            &Point2::new(0.0, y + HUD_TEXT_SIZE / 2.0),
            HUD_TEXT_SIZE,
            font,
            &theme.foreground(),
        );
    }

    /// Takes every node out of the window. Only the first call does anything.
    pub fn teardown(&mut self, window: &mut Window) -> bool {
        if !self.attached {
            return false;
        }

        window.remove_node(&mut self.sun);
        for nodes in self.bodies.values_mut() {
            window.remove_node(&mut nodes.group);
        }
        for (node, _) in self.orbit_paths.iter_mut() {
            window.remove_node(node);
        }
        self.attached = false;

        info!("Scene detached from window");
        true
    }

    pub fn cameras_and_effect_and_renderer(
        &mut self,
    ) -> (
        Option<&mut dyn Camera>,
        Option<&mut dyn PlanarCamera>,
        Option<&mut dyn Renderer>,
        Option<&mut dyn PostProcessingEffect>,
    ) {
        let renderer: Option<&mut dyn Renderer> = if self.attached {
            Some(&mut self.renderer)
        } else {
            None
        };
        (Some(&mut self.camera), None, renderer, None)
    }
}
