use std::f32::consts::PI;

use kiss3d::camera::Camera;
use kiss3d::event::{Action, Key, MouseButton, WindowEvent};
use kiss3d::resource::ShaderUniform;
use kiss3d::window::Canvas;
use nalgebra::{Isometry3, Matrix4, Perspective3, Point2, Point3, Vector2, Vector3};

const KEY_CAMERA_MOVE_UP: Key = Key::W;
const KEY_CAMERA_MOVE_DOWN: Key = Key::S;
const KEY_CAMERA_MOVE_LEFT: Key = Key::A;
const KEY_CAMERA_MOVE_RIGHT: Key = Key::D;
const KEY_CAMERA_ZOOM_IN: Key = Key::Equals;
const KEY_CAMERA_ZOOM_OUT: Key = Key::Minus;

const KEY_ANGLE_STEP: f32 = 0.1;
const KEY_ZOOM_STEP: f32 = 1.2;

/// Size of the drawing surface, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

// An orbit camera with damping: dragging, scrolling, and the keyboard all add to
// a velocity, and each frame the camera moves by that velocity and the velocity
// decays. This gives the same "coasting" feel as a damped orbit control.
//
// The camera always looks at `target`, with the y-axis as up. Right-dragging slides
// the target around in the camera's own plane.
pub struct OrbitCamera {
    // -- position --
    target: Point3<f32>,
    theta: f32,  // azimuthal angle, measured from +z towards +x
    phi: f32,    // polar angle, measured from +y
    radius: f32, // distance from target
    // -- velocity --
    theta_velocity: f32,
    phi_velocity: f32,
    log_zoom_velocity: f32,
    // -- perspective --
    viewport: Viewport,
    fovy: f32,
    znear: f32,
    zfar: f32,
    // -- other --
    last_cursor_pos: Vector2<f32>,
    // -- knobs to fiddle with --
    damping: f32,
    rotate_step: f32,
    pan_step: f32,
    scroll_ratio: f32,
    phi_limit: f32,
    radius_limits: (f32, f32),
}

impl OrbitCamera {
    pub fn new(eye: Point3<f32>, target: Point3<f32>, viewport: Viewport) -> Self {
        let offset = eye - target;
        let radius = offset.norm();
        let phi = (offset.y / radius).acos();
        let theta = offset.x.atan2(offset.z);

        OrbitCamera {
            target,
            theta,
            phi,
            radius,
            theta_velocity: 0.0,
            phi_velocity: 0.0,
            log_zoom_velocity: 0.0,
            viewport,
            fovy: 75f32.to_radians(),
            znear: 0.1,
            zfar: 1000.0,
            last_cursor_pos: Vector2::zeros(),
            damping: 0.05,
            rotate_step: 0.005,
            pan_step: 0.002,
            scroll_ratio: 1.1,
            phi_limit: 0.001,
            radius_limits: (1.0, 500.0),
        }
    }

    fn projection(&self) -> Perspective3<f32> {
        Perspective3::new(self.aspect(), self.fovy, self.znear, self.zfar)
    }

    fn projection_matrix(&self) -> Matrix4<f32> {
        self.projection().into_inner()
    }

    fn view_matrix(&self) -> Matrix4<f32> {
        self.view_transform().to_homogeneous()
    }

    pub fn aspect(&self) -> f32 {
        self.viewport.aspect()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// A minimized window reports a zero-sized framebuffer. That has no aspect
    /// ratio, so the last real viewport is kept.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.viewport = Viewport { width, height };
    }

    pub fn distance(&self) -> f32 {
        self.radius
    }

    pub fn target(&self) -> Point3<f32> {
        self.target
    }

    /// Where `point` lands on screen, in pixels from the top-left corner. Points
    /// behind the camera have no screen position.
    pub fn to_screen(&self, point: &Point3<f32>) -> Option<Point2<f32>> {
        let clip = self.transformation() * point.to_homogeneous();
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.xyz() / clip.w;
        Some(Point2::new(
            (1.0 + ndc.x) * self.viewport.width as f32 / 2.0,
            (1.0 - ndc.y) * self.viewport.height as f32 / 2.0,
        ))
    }

    /// Adds to the rotational velocity; the camera coasts to a stop over the next
    /// few frames.
    pub fn rotate(&mut self, dtheta: f32, dphi: f32) {
        self.theta_velocity += dtheta;
        self.phi_velocity += dphi;
    }

    pub fn zoom(&mut self, factor: f32) {
        self.log_zoom_velocity += factor.ln();
    }

    pub fn pan(&mut self, dx: f32, dy: f32) {
        // Scale by distance so panning feels the same at every zoom level
        let rotation = self.view_transform().rotation.inverse();
        let right = rotation * Vector3::x();
        let up = rotation * Vector3::y();
        self.target += (right * dx + up * dy) * self.radius;
    }

    /// Moves by the current velocity, then lets the velocity decay.
    pub fn apply_damping(&mut self) {
        self.theta = (self.theta + self.theta_velocity * self.damping) % (2.0 * PI);
        self.phi = nalgebra::clamp(
            self.phi + self.phi_velocity * self.damping,
            self.phi_limit,
            PI - self.phi_limit,
        );
        self.radius = nalgebra::clamp(
            self.radius * (self.log_zoom_velocity * self.damping).exp(),
            self.radius_limits.0,
            self.radius_limits.1,
        );

        let decay = 1.0 - self.damping;
        self.theta_velocity *= decay;
        self.phi_velocity *= decay;
        self.log_zoom_velocity *= decay;
    }
}

impl Camera for OrbitCamera {
    fn handle_event(&mut self, canvas: &Canvas, event: &WindowEvent) {
        match *event {
            WindowEvent::CursorPos(x, y, _) => {
                let curr_pos = Vector2::new(x as f32, y as f32);
                let dpos = curr_pos - self.last_cursor_pos;

                if canvas.get_mouse_button(MouseButton::Button1) == Action::Press {
                    // Rotate the opposite direction as the mouse moves (drag right == camera glides
                    // left)
                    self.rotate(-dpos.x * self.rotate_step, -dpos.y * self.rotate_step);
                } else if canvas.get_mouse_button(MouseButton::Button2) == Action::Press {
                    // Drag the scene along with the mouse
                    self.pan(-dpos.x * self.pan_step, dpos.y * self.pan_step);
                }

                self.last_cursor_pos = curr_pos;
            }
            WindowEvent::Scroll(_, off, _) => {
                // scroll up == zoom in
                if off < 0.0 {
                    self.zoom(self.scroll_ratio);
                } else if off > 0.0 {
                    self.zoom(self.scroll_ratio.recip())
                }
            }
            WindowEvent::FramebufferSize(w, h) => self.resize(w, h),
            WindowEvent::Key(KEY_CAMERA_MOVE_UP, Action::Press, _) => {
                self.rotate(0.0, -KEY_ANGLE_STEP)
            }
            WindowEvent::Key(KEY_CAMERA_MOVE_DOWN, Action::Press, _) => {
                self.rotate(0.0, KEY_ANGLE_STEP)
            }
            WindowEvent::Key(KEY_CAMERA_MOVE_LEFT, Action::Press, _) => {
                self.rotate(-KEY_ANGLE_STEP, 0.0)
            }
            WindowEvent::Key(KEY_CAMERA_MOVE_RIGHT, Action::Press, _) => {
                self.rotate(KEY_ANGLE_STEP, 0.0)
            }
            WindowEvent::Key(KEY_CAMERA_ZOOM_IN, Action::Press, _) => {
                self.zoom(KEY_ZOOM_STEP.recip())
            }
            WindowEvent::Key(KEY_CAMERA_ZOOM_OUT, Action::Press, _) => self.zoom(KEY_ZOOM_STEP),
            _ => {}
        }
    }

    fn eye(&self) -> Point3<f32> {
        self.target
            + Vector3::new(
                self.radius * self.phi.sin() * self.theta.sin(),
                self.radius * self.phi.cos(),
                self.radius * self.phi.sin() * self.theta.cos(),
            )
    }

    fn view_transform(&self) -> Isometry3<f32> {
        Isometry3::look_at_rh(&self.eye(), &self.target, &Vector3::y())
    }

    fn transformation(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }

    fn inverse_transformation(&self) -> Matrix4<f32> {
        self.transformation()
            .try_inverse()
            .unwrap_or_else(Matrix4::identity)
    }

    fn clip_planes(&self) -> (f32, f32) {
        (self.znear, self.zfar)
    }

    fn update(&mut self, _canvas: &Canvas) {
        self.apply_damping();
    }

    fn upload(
        &self,
        _: usize,
        proj: &mut ShaderUniform<Matrix4<f32>>,
        view: &mut ShaderUniform<Matrix4<f32>>,
    ) {
        proj.upload(&self.projection_matrix());
        view.upload(&self.view_matrix());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    fn camera() -> OrbitCamera {
        OrbitCamera::new(
            Point3::new(0.0, 20.0, 30.0),
            Point3::origin(),
            Viewport {
                width: 800,
                height: 600,
            },
        )
    }

    #[test]
    fn test_initial_eye() {
        let camera = camera();
        assert_relative_eq!(camera.eye(), Point3::new(0.0, 20.0, 30.0), epsilon = 1e-4);
        assert_relative_eq!(camera.aspect(), 800.0 / 600.0);
        assert_eq!(camera.clip_planes(), (0.1, 1000.0));
    }

    #[test]
    fn test_resize() {
        let mut camera = camera();
        camera.resize(1920, 1080);
        assert_relative_eq!(camera.aspect(), 1920.0 / 1080.0);
        assert_eq!(
            camera.viewport(),
            Viewport {
                width: 1920,
                height: 1080
            }
        );
        assert_relative_eq!(camera.projection().aspect(), 1920.0 / 1080.0, epsilon = 1e-6);

        // Minimizing leaves the last size in place, and the projection usable
        camera.resize(0, 0);
        camera.resize(0, 720);
        assert_eq!(
            camera.viewport(),
            Viewport {
                width: 1920,
                height: 1080
            }
        );
        assert!(camera.transformation().iter().all(|x| x.is_finite()));
    }

    #[test]
    fn test_to_screen() {
        let camera = camera();
        let center = camera.to_screen(&Point3::origin()).unwrap();
        assert_relative_eq!(center, Point2::new(400.0, 300.0), epsilon = 1e-3);

        // Something above the target shows up above the middle of the screen
        let above = camera.to_screen(&Point3::new(0.0, 1.0, 0.0)).unwrap();
        assert!(above.y < 300.0);

        // Behind the eye
        assert_eq!(camera.to_screen(&Point3::new(0.0, 40.0, 60.0)), None);
    }

    #[test]
    fn test_damping_coasts_to_a_stop() {
        let mut camera = camera();
        let start = camera.eye();

        camera.rotate(0.5, 0.0);
        camera.apply_damping();
        let after_one = camera.eye();
        assert!((after_one - start).norm() > 0.0);

        for _ in 0..2000 {
            camera.apply_damping();
        }
        let settled = camera.eye();
        camera.apply_damping();
        assert_relative_eq!(camera.eye(), settled, epsilon = 1e-4);

        // Orbiting never changes the distance to the target
        assert_relative_eq!((settled - camera.target()).norm(), camera.distance(), epsilon = 1e-3);
    }

    #[test]
    fn test_zoom_limits() {
        let mut camera = camera();
        for _ in 0..100 {
            camera.zoom(10.0);
            camera.apply_damping();
        }
        assert_relative_eq!(camera.distance(), 500.0);
    }
}
