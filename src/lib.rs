pub mod config;
pub mod gui;
pub mod math;
pub mod model;
