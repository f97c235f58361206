pub mod body;
pub mod controls;
pub mod registry;
pub mod scene;
pub mod system;

pub use body::{Billboard, BodyState, SunState};
pub use controls::{Command, ControlError, ControlPanel, Slider, Theme};
pub use registry::{BodyConfig, BodyId, Registry, RegistryError, SunConfig};
pub use scene::SceneLayout;
pub use system::SolarSystem;
