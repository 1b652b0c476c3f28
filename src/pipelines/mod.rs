//! Render pipelines for recorded immediate-mode frames.
//!
//! [`Renderer`] owns one pipeline per (primitive, depth test) combination and
//! the lighting uniform. It turns a [`Frame`] into a single render pass:
//! triangles first, then lines, both with the same fixed-function shader.

pub mod basic;
pub mod light;

use wgpu::util::DeviceExt;

use crate::immediate::frame::{Frame, Primitive, Viewport};
use light::{LightingResources, LightingUniform};

/// Where a frame is drawn to.
///
/// With multisampling `colour` is the MSAA texture and `resolve` the final
/// single-sampled view; without it `colour` is the final view.
pub struct RenderTarget<'a> {
    pub colour: &'a wgpu::TextureView,
    pub resolve: Option<&'a wgpu::TextureView>,
    pub depth: &'a wgpu::TextureView,
    pub size: [u32; 2],
}

pub struct Renderer {
    // indexed by `pipeline_index`
    pipelines: Vec<wgpu::RenderPipeline>,
    lighting: LightingResources,
    sample_count: u32,
}

fn pipeline_index(primitive: Primitive, depth_test: bool) -> usize {
    let primitive = match primitive {
        Primitive::Quads => 0,
        Primitive::Lines => 2,
    };
    primitive + depth_test as usize
}

impl Renderer {
    pub fn new(device: &wgpu::Device, color_format: wgpu::TextureFormat, sample_count: u32) -> Self {
        let lighting = LightingResources::new(device);
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Fixed Function Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("fixed_function.wgsl").into()),
        });

        let mut pipelines = Vec::with_capacity(4);
        for topology in [
            wgpu::PrimitiveTopology::TriangleList,
            wgpu::PrimitiveTopology::LineList,
        ] {
            for depth_test in [false, true] {
                pipelines.push(basic::mk_fixed_function_pipeline(
                    device,
                    &shader,
                    &lighting.bind_group_layout,
                    color_format,
                    topology,
                    depth_test,
                    sample_count,
                ));
            }
        }

        Self {
            pipelines,
            lighting,
            sample_count,
        }
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// Records one render pass drawing `frame` into `target`.
    pub fn encode(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        target: RenderTarget<'_>,
        frame: &Frame,
    ) {
        self.lighting
            .write(queue, &LightingUniform::from_frame(frame));

        let triangles = frame.triangle_vertices();
        let lines = frame.line_vertices();
        let triangle_buffer = vertex_buffer(device, "Triangle Vertex Buffer", &triangles);
        let line_buffer = vertex_buffer(device, "Line Vertex Buffer", &lines);

        let colour_load = match frame.clear_colour {
            Some(colour) => wgpu::LoadOp::Clear(colour),
            None => wgpu::LoadOp::Load,
        };
        let depth_load = if frame.clear_depth {
            wgpu::LoadOp::Clear(1.0)
        } else {
            wgpu::LoadOp::Load
        };

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.colour,
                resolve_target: target.resolve,
                ops: wgpu::Operations {
                    load: colour_load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: target.depth,
                depth_ops: Some(wgpu::Operations {
                    load: depth_load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        let Some([x, y, width, height]) = wgpu_viewport(frame.viewport, target.size) else {
            return;
        };
        render_pass.set_viewport(x, y, width, height, 0.0, 1.0);
        render_pass.set_bind_group(0, &self.lighting.bind_group, &[]);

        for (primitive, buffer, count) in [
            (Primitive::Quads, &triangle_buffer, triangles.len()),
            (Primitive::Lines, &line_buffer, lines.len()),
        ] {
            let Some(buffer) = buffer else { continue };
            render_pass.set_pipeline(&self.pipelines[pipeline_index(primitive, frame.depth_test)]);
            render_pass.set_vertex_buffer(0, buffer.slice(..));
            render_pass.draw(0..count as u32, 0..1);
        }
    }
}

fn vertex_buffer<T: bytemuck::Pod>(
    device: &wgpu::Device,
    label: &str,
    vertices: &[T],
) -> Option<wgpu::Buffer> {
    if vertices.is_empty() {
        return None;
    }
    Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(vertices),
        usage: wgpu::BufferUsages::VERTEX,
    }))
}

/// Converts a bottom-left origin viewport to wgpu's top-left origin, clipped to
/// the target. `None` when nothing of it is visible.
pub fn wgpu_viewport(viewport: Viewport, target_size: [u32; 2]) -> Option<[f32; 4]> {
    let [target_width, target_height] = target_size.map(|v| v as i64);
    let left = (viewport.x as i64).clamp(0, target_width);
    let right = (viewport.x as i64 + viewport.width as i64).clamp(0, target_width);
    let bottom = (viewport.y as i64).clamp(0, target_height);
    let top = (viewport.y as i64 + viewport.height as i64).clamp(0, target_height);
    if right <= left || top <= bottom {
        return None;
    }
    Some([
        left as f32,
        (target_height - top) as f32,
        (right - left) as f32,
        (top - bottom) as f32,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(x: i32, y: i32, width: u32, height: u32) -> Viewport {
        Viewport {
            x,
            y,
            width,
            height,
        }
    }

    #[test]
    fn full_window_viewport_is_unchanged() {
        assert_eq!(
            wgpu_viewport(viewport(0, 0, 800, 600), [800, 600]),
            Some([0.0, 0.0, 800.0, 600.0])
        );
    }

    #[test]
    fn viewport_origin_flips_to_top_left() {
        assert_eq!(
            wgpu_viewport(viewport(10, 20, 100, 50), [800, 600]),
            Some([10.0, 530.0, 100.0, 50.0])
        );
    }

    #[test]
    fn viewport_is_clipped_to_the_target() {
        assert_eq!(
            wgpu_viewport(viewport(-10, 0, 900, 600), [800, 600]),
            Some([0.0, 0.0, 800.0, 600.0])
        );
        assert_eq!(wgpu_viewport(viewport(0, 0, 800, 0), [800, 600]), None);
    }

    #[test]
    fn every_combination_has_its_own_pipeline() {
        let mut indices: Vec<_> = [Primitive::Quads, Primitive::Lines]
            .into_iter()
            .flat_map(|p| [pipeline_index(p, false), pipeline_index(p, true)])
            .collect();
        indices.sort();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }
}
