use bytemuck::Zeroable;
use wgpu::util::DeviceExt;

use crate::immediate::{
    frame::{Frame, LightingSnapshot},
    light::{LightParams, MAX_LIGHTS},
};

/// Converts cgmath's OpenGL clip space (z in -1..1) to wgpu's (z in 0..1).
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// One light as laid out in the shader.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    position: [f32; 4],
    ambient: [f32; 4],
    diffuse: [f32; 4],
    specular: [f32; 4],
    // constant, linear, quadratic, enabled
    attenuation: [f32; 4],
}

impl LightUniform {
    fn new(light: &LightParams, enabled: bool) -> Self {
        Self {
            position: light.eye_position,
            ambient: light.ambient,
            diffuse: light.diffuse,
            specular: light.specular,
            attenuation: [
                light.attenuation.constant,
                light.attenuation.linear,
                light.attenuation.quadratic,
                if enabled { 1.0 } else { 0.0 },
            ],
        }
    }
}

/// Everything the fixed-function shader needs for one frame.
///
/// Every member is a multiple of 16 bytes so the struct matches the WGSL
/// uniform layout without explicit padding.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightingUniform {
    projection: [[f32; 4]; 4],
    lights: [LightUniform; MAX_LIGHTS],
    global_ambient: [f32; 4],
    material_ambient: [f32; 4],
    material_diffuse: [f32; 4],
    material_specular: [f32; 4],
    material_emission: [f32; 4],
    // shininess, normalize, color material, unused
    params: [f32; 4],
}

impl LightingUniform {
    pub fn from_frame(frame: &Frame) -> Self {
        let projection = OPENGL_TO_WGPU_MATRIX * frame.projection;
        Self::new(projection.into(), &frame.lighting)
    }

    fn new(projection: [[f32; 4]; 4], lighting: &LightingSnapshot) -> Self {
        let flag = |on: bool| if on { 1.0 } else { 0.0 };
        let material = &lighting.material;
        Self {
            projection,
            lights: std::array::from_fn(|slot| {
                LightUniform::new(&lighting.lights[slot], lighting.light_enabled[slot])
            }),
            global_ambient: lighting.global_ambient,
            material_ambient: material.ambient,
            material_diffuse: material.diffuse,
            material_specular: material.specular,
            material_emission: material.emission,
            params: [
                material.shininess,
                flag(lighting.normalize),
                flag(lighting.color_material),
                0.0,
            ],
        }
    }
}

pub struct LightingResources {
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl LightingResources {
    pub fn new(device: &wgpu::Device) -> Self {
        let buffer = mk_buffer(device, LightingUniform::zeroed());
        let bind_group_layout = mk_bind_group_layout(device);
        let bind_group = mk_bind_group(device, &bind_group_layout, &buffer);
        Self {
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    pub fn write(&self, queue: &wgpu::Queue, uniform: &LightingUniform) {
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[*uniform]));
    }
}

pub fn mk_buffer(device: &wgpu::Device, uniform: LightingUniform) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Lighting Uniform Buffer"),
        contents: bytemuck::cast_slice(&[uniform]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("lighting_bind_group_layout"),
    })
}

pub fn mk_bind_group(
    device: &wgpu::Device,
    bind_group_layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: bind_group_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
        label: Some("lighting_bind_group"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::immediate::{Capability, FixedFunction, light::LightParameter};

    #[test]
    fn uniform_size_matches_the_shader_layout() {
        assert_eq!(std::mem::size_of::<LightUniform>(), 80);
        assert_eq!(std::mem::size_of::<LightingUniform>(), 64 + 2 * 80 + 6 * 16);
    }

    #[test]
    fn disabled_lights_are_flagged_off() {
        let mut ff = FixedFunction::new();
        ff.enable(Capability::Light(0));
        ff.light(1, LightParameter::LinearAttenuation(0.5));
        ff.swap_buffers();
        let frame = ff.take_presented().unwrap();

        let uniform = LightingUniform::from_frame(&frame);
        assert_eq!(uniform.lights[0].attenuation[3], 1.0);
        assert_eq!(uniform.lights[1].attenuation, [1.0, 0.5, 0.0, 0.0]);
    }
}
