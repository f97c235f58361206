use kiss3d::camera::Camera;
use kiss3d::event::EventManager;
use kiss3d::planar_camera::PlanarCamera;
use kiss3d::post_processing::PostProcessingEffect;
use kiss3d::renderer::Renderer;
use kiss3d::window::{State, Window};
use tracing::info;

use self::clock::FrameClock;
use self::controller::Controller;
use self::view::View;
use crate::model::{SceneLayout, SolarSystem};

pub mod camera;
pub mod clock;
mod controller;
mod renderers;
mod view;

/// Drives the orrery from kiss3d's render loop: each frame handles input, advances
/// the simulation by however long the frame took, and redraws.
pub struct Simulation {
    view: View,
    controller: Controller,
    clock: FrameClock,
}

impl Simulation {
    pub fn new(layout: SceneLayout, system: SolarSystem, window: &mut Window) -> Self {
        let controller = Controller::new(system.registry().len());
        Self {
            view: View::new(layout, system, window),
            controller,
            clock: FrameClock::start(),
        }
    }

    fn process_user_input(&mut self, mut events: EventManager) {
        // Process events
        for event in events.iter() {
            self.controller.process_event(&event.value, &mut self.view);
        }
    }

    fn shut_down(&mut self, window: &mut Window) {
        let detached = self.view.teardown(window);
        let cancelled = self.clock.cancel();
        if detached || cancelled {
            info!("Simulation stopped");
        }
        window.close();
    }
}

impl State for Simulation {
    fn cameras_and_effect_and_renderer(
        &mut self,
    ) -> (
        Option<&mut dyn Camera>,
        Option<&mut dyn PlanarCamera>,
        Option<&mut dyn Renderer>,
        Option<&mut dyn PostProcessingEffect>,
    ) {
        self.view.cameras_and_effect_and_renderer()
    }

    fn step(&mut self, window: &mut Window) {
        self.process_user_input(window.events());
        if self.controller.quit_requested() {
            self.shut_down(window);
            return;
        }

        let dt = self.clock.delta();
        self.view.update_state_by(dt);
        self.view.prerender_scene(window, &self.controller);
        self.controller.increment_frame_counter();
    }
}
