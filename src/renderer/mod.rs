//! WebGPU rendering: flat-colored quads built fresh each frame from a
//! read-only run snapshot.

pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;
pub use shapes::{build_scene, push_circle, push_rect};
pub use vertex::{Palette, Vertex, palette};
