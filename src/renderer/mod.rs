//! Rendering
//!
//! Entities and menus draw into a [`Canvas`]; [`RenderState`] uploads the
//! resulting triangle list to the GPU each frame.

pub mod canvas;
pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use canvas::{Canvas, DebugContext};
pub use pipeline::RenderState;
pub use vertex::Vertex;
