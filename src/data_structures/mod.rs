//! GPU-side data structures.
//!
//! - `texture` contains render target textures (depth, multisampled colour, readback)

pub mod texture;
