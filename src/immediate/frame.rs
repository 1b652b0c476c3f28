//! Recorded output of one frame.
//!
//! A [`Frame`] is what the recorder hands to the GPU side on present: the clear
//! request, viewport, projection, a snapshot of the lighting state and the list
//! of [`Batch`]es in submission order. Quads stay quads here so the geometry can
//! be inspected as it was issued; triangulation happens in
//! [`Frame::triangle_vertices`].

use cgmath::{Matrix4, SquareMatrix};

use crate::immediate::light::{LightParams, MAX_LIGHTS, Material, Rgba};

/// Vertex as uploaded to the GPU.
///
/// Position and normal are in eye space. `lit` is `1.0` when lighting was
/// enabled at `begin`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ImmediateVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
    pub lit: f32,
}

impl ImmediateVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 4] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x4, 3 => Float32];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ImmediateVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Quads,
    Lines,
}

/// Vertices issued between one `begin`/`end` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub primitive: Primitive,
    pub lit: bool,
    pub vertices: Vec<ImmediateVertex>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Lighting state captured when the frame is presented.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightingSnapshot {
    pub lights: [LightParams; MAX_LIGHTS],
    pub light_enabled: [bool; MAX_LIGHTS],
    pub material: Material,
    pub global_ambient: Rgba,
    pub normalize: bool,
    pub color_material: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// `Some` when the colour buffer was cleared this frame.
    pub clear_colour: Option<wgpu::Color>,
    pub clear_depth: bool,
    pub depth_test: bool,
    pub viewport: Viewport,
    pub projection: Matrix4<f32>,
    pub lighting: LightingSnapshot,
    pub batches: Vec<Batch>,
}

impl Frame {
    pub(crate) fn new(viewport: Viewport, lighting: LightingSnapshot) -> Self {
        Self {
            clear_colour: None,
            clear_depth: false,
            depth_test: false,
            viewport,
            projection: Matrix4::identity(),
            lighting,
            batches: Vec::new(),
        }
    }

    /// All quad batches as a triangle list, two triangles per quad.
    ///
    /// Trailing vertices that do not complete a quad are dropped.
    pub fn triangle_vertices(&self) -> Vec<ImmediateVertex> {
        self.batches
            .iter()
            .filter(|batch| batch.primitive == Primitive::Quads)
            .flat_map(|batch| batch.vertices.chunks_exact(4))
            .flat_map(|q| [q[0], q[1], q[2], q[0], q[2], q[3]])
            .collect()
    }

    /// All line batches as a line list. A dangling last vertex is dropped.
    pub fn line_vertices(&self) -> Vec<ImmediateVertex> {
        self.batches
            .iter()
            .filter(|batch| batch.primitive == Primitive::Lines)
            .flat_map(|batch| batch.vertices.chunks_exact(2))
            .flat_map(|l| [l[0], l[1]])
            .collect()
    }
}
