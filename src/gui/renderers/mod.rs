mod starfield_renderer;

pub use starfield_renderer::StarfieldRenderer;
