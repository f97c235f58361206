use kiss3d::event::{Action, Key, WindowEvent};
use tracing::warn;

use super::clock::FpsCounter;
use super::view::View;
use crate::model::{BodyId, Command};

// Key config, all in one place
const KEY_PREV_BODY: Key = Key::Up;
const KEY_NEXT_BODY: Key = Key::Down;
const KEY_SPEED_UP: Key = Key::Right;
const KEY_SLOW_DOWN: Key = Key::Left;
const KEY_SPEED_UP_FAST: Key = Key::PageUp;
const KEY_SLOW_DOWN_FAST: Key = Key::PageDown;
const KEY_TOGGLE_PAUSE: Key = Key::Space;
const KEY_RESET_SPEEDS: Key = Key::R;
const KEY_TOGGLE_THEME: Key = Key::T;
const KEY_QUIT: Key = Key::Escape;

const FAST_NUDGE_STEPS: i32 = 10;

pub struct Controller {
    selected: usize,
    num_bodies: usize,
    quit_requested: bool,
    fps_counter: FpsCounter,
}

impl Controller {
    pub fn new(num_bodies: usize) -> Self {
        Controller {
            selected: 0,
            num_bodies,
            quit_requested: false,
            fps_counter: FpsCounter::new(1000),
        }
    }

    /// Maps a key press to whatever it asks of the simulation, if anything.
    pub fn command_for(&mut self, event: &WindowEvent) -> Option<Command> {
        let body = self.selected_body();
        match *event {
            WindowEvent::Key(KEY_NEXT_BODY, Action::Press, _) => {
                self.selected = (self.selected + 1) % self.num_bodies;
                None
            }
            WindowEvent::Key(KEY_PREV_BODY, Action::Press, _) => {
                self.selected = (self.selected + self.num_bodies - 1) % self.num_bodies;
                None
            }
            WindowEvent::Key(KEY_SPEED_UP, Action::Press, _) => {
                Some(Command::NudgeSpeed { body, steps: 1 })
            }
            WindowEvent::Key(KEY_SLOW_DOWN, Action::Press, _) => {
                Some(Command::NudgeSpeed { body, steps: -1 })
            }
            WindowEvent::Key(KEY_SPEED_UP_FAST, Action::Press, _) => Some(Command::NudgeSpeed {
                body,
                steps: FAST_NUDGE_STEPS,
            }),
            WindowEvent::Key(KEY_SLOW_DOWN_FAST, Action::Press, _) => Some(Command::NudgeSpeed {
                body,
                steps: -FAST_NUDGE_STEPS,
            }),
            WindowEvent::Key(KEY_TOGGLE_PAUSE, Action::Press, _) => Some(Command::TogglePause),
            WindowEvent::Key(KEY_RESET_SPEEDS, Action::Press, _) => Some(Command::ResetSpeeds),
            WindowEvent::Key(KEY_TOGGLE_THEME, Action::Press, _) => Some(Command::ToggleTheme),
            WindowEvent::Key(KEY_QUIT, Action::Press, _) | WindowEvent::Close => {
                self.quit_requested = true;
                None
            }
            _ => None,
        }
    }

    pub fn process_event(&mut self, event: &WindowEvent, view: &mut View) {
        if let Some(command) = self.command_for(event) {
            if let Err(err) = view.apply(command) {
                warn!(%err, "Ignoring command");
            }
        }
    }

    pub fn selected_body(&self) -> BodyId {
        BodyId(self.selected)
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn fps(&self) -> f64 {
        self.fps_counter.value()
    }

    pub fn increment_frame_counter(&mut self) {
        self.fps_counter.increment()
    }
}
