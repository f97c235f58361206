use kiss3d::camera::Camera;
use kiss3d::context::Context;
use kiss3d::renderer::Renderer;
use kiss3d::resource::{
    AllocationType, BufferType, Effect, GPUVec, ShaderAttribute, ShaderUniform,
};
use nalgebra::{Matrix4, Point3};

use crate::model::scene::Starfield;

// Unlike the scene nodes, the starfield never moves, so its points are uploaded
// once and drawn from the same buffer every frame.
pub struct StarfieldRenderer {
    // OpenGL stuff
    shader: Effect,
    pos: ShaderAttribute<Point3<f32>>,
    color: ShaderUniform<Point3<f32>>,
    view: ShaderUniform<Matrix4<f32>>,
    proj: ShaderUniform<Matrix4<f32>>,
    // Data storage
    points: GPUVec<Point3<f32>>,
    star_color: Point3<f32>,
    point_size: f32,
}

impl StarfieldRenderer {
    pub fn new(starfield: &Starfield) -> Self {
        let mut shader = Effect::new_from_str(VERTEX_SRC, FRAGMENT_SRC);

        shader.use_program();

        StarfieldRenderer {
            pos: shader
                .get_attrib::<Point3<f32>>("position")
                .expect("Failed to get shader attribute."),
            color: shader
                .get_uniform::<Point3<f32>>("color")
                .expect("Failed to get shader uniform."),
            view: shader
                .get_uniform::<Matrix4<f32>>("view")
                .expect("Failed to get shader uniform."),
            proj: shader
                .get_uniform::<Matrix4<f32>>("proj")
                .expect("Failed to get shader uniform."),
            shader,
            points: GPUVec::new(
                starfield.points.clone(),
                BufferType::Array,
                AllocationType::StaticDraw,
            ),
            star_color: starfield.color,
            point_size: starfield.point_size,
        }
    }

    pub fn set_color(&mut self, color: Point3<f32>) {
        self.star_color = color;
    }
}

impl Renderer for StarfieldRenderer {
    fn render(&mut self, pass: usize, camera: &mut dyn Camera) {
        if self.points.len() == 0 {
            return;
        }

        self.shader.use_program();
        self.pos.enable();

        camera.upload(pass, &mut self.proj, &mut self.view);
        self.color.upload(&self.star_color);
        self.pos.bind_sub_buffer(&mut self.points, 0, 0);

        let ctxt = Context::get();
        ctxt.point_size(self.point_size);
        ctxt.draw_arrays(Context::POINTS, 0, self.points.len() as i32);

        self.pos.disable();
    }
}

/// Vertex shader used to display the stars.
static VERTEX_SRC: &str = "#version 100
    attribute vec3 position;
    uniform   mat4 proj;
    uniform   mat4 view;
    void main() {
        gl_Position = proj * view * vec4(position, 1.0);
    }";

/// Fragment shader used to display the stars.
static FRAGMENT_SRC: &str = "#version 100
#ifdef GL_FRAGMENT_PRECISION_HIGH
   precision highp float;
#else
   precision mediump float;
#endif

    uniform vec3 color;
    void main() {
        gl_FragColor = vec4(color, 0.8);
    }";
