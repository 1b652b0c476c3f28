//! Immediate-mode, fixed-function style drawing on top of a modern GPU API.
//!
//! [`FixedFunction`] keeps the global state a classic GL context would keep
//! (enabled capabilities, light and material parameters, the model-view stack,
//! the current colour and normal) and records `begin`/`end` batches into a
//! [`Frame`]. Nothing here touches the GPU: `swap_buffers` moves the finished
//! frame into an outbox and the [`crate::context::Context`] uploads it.
//!
//! Vertices are transformed into eye space when they are issued, so push/pop,
//! translate and scale behave exactly like the legacy matrix stack. Light
//! positions are transformed by the model-view matrix current at assignment.
//!
//! Misuse (popping the last matrix, `end` without `begin`, an unknown light
//! slot) is ignored with a warning, the same way GL records an error flag and
//! carries on.

pub mod frame;
pub mod light;

use std::collections::HashSet;

use cgmath::{Matrix, Matrix3, Matrix4, SquareMatrix, Vector3, Vector4};

use crate::immediate::{
    frame::{Batch, Frame, ImmediateVertex, LightingSnapshot, Primitive, Viewport},
    light::{LightParameter, LightParams, MAX_LIGHTS, Material, MaterialParameter, Rgba},
};

/// Global switches, mirroring `glEnable`/`glDisable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    DepthTest,
    Lighting,
    /// One light slot, `0..MAX_LIGHTS`.
    Light(usize),
    Normalize,
    ColorMaterial,
}

/// Which buffers a `clear` touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearBuffers {
    pub color: bool,
    pub depth: bool,
}

impl ClearBuffers {
    pub const ALL: ClearBuffers = ClearBuffers {
        color: true,
        depth: true,
    };
}

#[derive(Debug)]
pub struct FixedFunction {
    clear_colour: wgpu::Color,
    enabled: HashSet<Capability>,
    lights: [LightParams; MAX_LIGHTS],
    material: Material,
    global_ambient: Rgba,
    projection: Matrix4<f32>,
    modelview: Vec<Matrix4<f32>>,
    viewport: Viewport,
    colour: Rgba,
    normal: [f32; 3],
    pending: Option<Batch>,
    frame: Frame,
    presented: Option<Frame>,
}

impl Default for FixedFunction {
    fn default() -> Self {
        Self::new()
    }
}

impl FixedFunction {
    pub fn new() -> Self {
        let lights = std::array::from_fn(LightParams::for_slot);
        let viewport = Viewport {
            x: 0,
            y: 0,
            width: 1,
            height: 1,
        };
        let mut ff = Self {
            clear_colour: wgpu::Color::BLACK,
            enabled: HashSet::new(),
            lights,
            material: Material::default(),
            global_ambient: [0.2, 0.2, 0.2, 1.0],
            projection: Matrix4::identity(),
            modelview: vec![Matrix4::identity()],
            viewport,
            colour: [1.0; 4],
            normal: [0.0, 0.0, 1.0],
            pending: None,
            frame: Frame::new(viewport, LightingSnapshot::empty()),
            presented: None,
        };
        ff.frame = Frame::new(viewport, ff.lighting_snapshot());
        ff
    }

    pub fn enable(&mut self, capability: Capability) {
        if self.valid_capability(capability) {
            self.enabled.insert(capability);
        }
    }

    pub fn disable(&mut self, capability: Capability) {
        self.enabled.remove(&capability);
    }

    pub fn is_enabled(&self, capability: Capability) -> bool {
        self.enabled.contains(&capability)
    }

    fn valid_capability(&self, capability: Capability) -> bool {
        match capability {
            Capability::Light(slot) if slot >= MAX_LIGHTS => {
                log::warn!("light slot {} is out of range (max {})", slot, MAX_LIGHTS);
                false
            }
            _ => true,
        }
    }

    pub fn set_clear_colour(&mut self, colour: wgpu::Color) {
        self.clear_colour = colour;
    }

    pub fn clear_colour(&self) -> wgpu::Color {
        self.clear_colour
    }

    /// Starts the frame over: recorded batches are discarded and the requested
    /// buffers are marked for clearing.
    pub fn clear(&mut self, buffers: ClearBuffers) {
        if buffers.color {
            self.frame.clear_colour = Some(self.clear_colour);
            self.frame.batches.clear();
        }
        if buffers.depth {
            self.frame.clear_depth = true;
        }
    }

    pub fn viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
        self.viewport = Viewport {
            x,
            y,
            width,
            height,
        };
    }

    pub fn current_viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn load_projection(&mut self, projection: Matrix4<f32>) {
        self.projection = projection;
    }

    pub fn projection(&self) -> Matrix4<f32> {
        self.projection
    }

    /// Replaces the top of the model-view stack.
    pub fn load_modelview(&mut self, matrix: Matrix4<f32>) {
        if let Some(top) = self.modelview.last_mut() {
            *top = matrix;
        }
    }

    pub fn modelview(&self) -> Matrix4<f32> {
        self.modelview
            .last()
            .copied()
            .unwrap_or_else(Matrix4::identity)
    }

    pub fn matrix_depth(&self) -> usize {
        self.modelview.len()
    }

    pub fn push_matrix(&mut self) {
        let top = self.modelview();
        self.modelview.push(top);
    }

    pub fn pop_matrix(&mut self) {
        if self.modelview.len() > 1 {
            self.modelview.pop();
        } else {
            log::warn!("pop_matrix on an empty model-view stack ignored");
        }
    }

    pub fn translate(&mut self, x: f32, y: f32, z: f32) {
        self.mult_modelview(Matrix4::from_translation(Vector3::new(x, y, z)));
    }

    pub fn scale(&mut self, x: f32, y: f32, z: f32) {
        self.mult_modelview(Matrix4::from_nonuniform_scale(x, y, z));
    }

    fn mult_modelview(&mut self, matrix: Matrix4<f32>) {
        if let Some(top) = self.modelview.last_mut() {
            *top = *top * matrix;
        }
    }

    pub fn light(&mut self, slot: usize, parameter: LightParameter) {
        let modelview = self.modelview();
        let Some(light) = self.lights.get_mut(slot) else {
            log::warn!("light slot {} is out of range (max {})", slot, MAX_LIGHTS);
            return;
        };
        match parameter {
            LightParameter::Ambient(c) => light.ambient = c,
            LightParameter::Diffuse(c) => light.diffuse = c,
            LightParameter::Specular(c) => light.specular = c,
            LightParameter::Position(p) => {
                light.eye_position = (modelview * Vector4::from(p)).into();
            }
            LightParameter::ConstantAttenuation(v) => light.attenuation.constant = v,
            LightParameter::LinearAttenuation(v) => light.attenuation.linear = v,
            LightParameter::QuadraticAttenuation(v) => light.attenuation.quadratic = v,
        }
    }

    pub fn light_params(&self, slot: usize) -> Option<&LightParams> {
        self.lights.get(slot)
    }

    pub fn material(&mut self, parameter: MaterialParameter) {
        match parameter {
            MaterialParameter::Ambient(c) => self.material.ambient = c,
            MaterialParameter::Diffuse(c) => self.material.diffuse = c,
            MaterialParameter::Specular(c) => self.material.specular = c,
            MaterialParameter::Emission(c) => self.material.emission = c,
            MaterialParameter::Shininess(s) => self.material.shininess = s.clamp(0.0, 128.0),
        }
    }

    pub fn material_params(&self) -> &Material {
        &self.material
    }

    pub fn color(&mut self, colour: Rgba) {
        self.colour = colour;
    }

    pub fn normal(&mut self, x: f32, y: f32, z: f32) {
        self.normal = [x, y, z];
    }

    pub fn begin(&mut self, primitive: Primitive) {
        if self.pending.is_some() {
            log::warn!("begin({:?}) inside an open batch ignored", primitive);
            return;
        }
        self.pending = Some(Batch {
            primitive,
            lit: self.is_enabled(Capability::Lighting),
            vertices: Vec::new(),
        });
    }

    /// Issues a vertex with the current colour and normal.
    pub fn vertex(&mut self, x: f32, y: f32, z: f32) {
        let modelview = self.modelview();
        let Some(batch) = self.pending.as_mut() else {
            log::warn!("vertex outside of begin/end ignored");
            return;
        };
        let position = (modelview * Vector4::new(x, y, z, 1.0)).truncate();
        let normal = normal_matrix(&modelview) * Vector3::from(self.normal);
        batch.vertices.push(ImmediateVertex {
            position: position.into(),
            normal: normal.into(),
            color: self.colour,
            lit: if batch.lit { 1.0 } else { 0.0 },
        });
    }

    pub fn end(&mut self) {
        match self.pending.take() {
            Some(batch) if !batch.vertices.is_empty() => self.frame.batches.push(batch),
            Some(_) => (),
            None => log::warn!("end without begin ignored"),
        }
    }

    /// Batches recorded since the last clear or swap.
    pub fn batches(&self) -> &[Batch] {
        &self.frame.batches
    }

    /// Finishes the frame and queues it for presentation.
    pub fn swap_buffers(&mut self) {
        if self.pending.is_some() {
            log::warn!("swap_buffers with an open batch, dropping it");
            self.pending = None;
        }
        let mut frame = std::mem::replace(
            &mut self.frame,
            Frame::new(self.viewport, LightingSnapshot::empty()),
        );
        frame.viewport = self.viewport;
        frame.projection = self.projection;
        frame.depth_test = self.is_enabled(Capability::DepthTest);
        frame.lighting = self.lighting_snapshot();
        self.presented = Some(frame);
    }

    /// Takes the last presented frame, if any.
    pub fn take_presented(&mut self) -> Option<Frame> {
        self.presented.take()
    }

    fn lighting_snapshot(&self) -> LightingSnapshot {
        LightingSnapshot {
            lights: self.lights,
            light_enabled: std::array::from_fn(|slot| self.is_enabled(Capability::Light(slot))),
            material: self.material,
            global_ambient: self.global_ambient,
            normalize: self.is_enabled(Capability::Normalize),
            color_material: self.is_enabled(Capability::ColorMaterial),
        }
    }
}

impl LightingSnapshot {
    fn empty() -> Self {
        Self {
            lights: std::array::from_fn(LightParams::for_slot),
            light_enabled: [false; MAX_LIGHTS],
            material: Material::default(),
            global_ambient: [0.2, 0.2, 0.2, 1.0],
            normalize: false,
            color_material: false,
        }
    }
}

/// Inverse transpose of the upper 3x3, the matrix that keeps normals
/// perpendicular under non-uniform scale.
fn normal_matrix(modelview: &Matrix4<f32>) -> Matrix3<f32> {
    let upper = Matrix3::from_cols(
        modelview.x.truncate(),
        modelview.y.truncate(),
        modelview.z.truncate(),
    );
    upper
        .invert()
        .map(|inverse| inverse.transpose())
        .unwrap_or(upper)
}

#[cfg(test)]
mod tests {
    use cgmath::InnerSpace;

    use super::*;

    fn normalized(v: [f32; 3]) -> [f32; 3] {
        Vector3::from(v).normalize().into()
    }

    fn quad(ff: &mut FixedFunction) {
        ff.begin(Primitive::Quads);
        ff.vertex(0.0, 0.0, 0.0);
        ff.vertex(1.0, 0.0, 0.0);
        ff.vertex(1.0, 1.0, 0.0);
        ff.vertex(0.0, 1.0, 0.0);
        ff.end();
    }

    #[test]
    fn push_pop_restores_the_previous_matrix() {
        let mut ff = FixedFunction::new();
        ff.translate(1.0, 2.0, 3.0);
        let before = ff.modelview();
        ff.push_matrix();
        ff.scale(0.5, 0.5, 0.5);
        assert_eq!(ff.matrix_depth(), 2);
        ff.pop_matrix();
        assert_eq!(ff.matrix_depth(), 1);
        assert_eq!(ff.modelview(), before);
    }

    #[test]
    fn popping_the_last_matrix_is_ignored() {
        let mut ff = FixedFunction::new();
        ff.pop_matrix();
        assert_eq!(ff.matrix_depth(), 1);
    }

    #[test]
    fn vertices_are_transformed_by_translate_then_scale() {
        let mut ff = FixedFunction::new();
        ff.translate(10.0, 0.0, 0.0);
        ff.scale(0.5, 0.5, 0.5);
        ff.begin(Primitive::Lines);
        ff.vertex(2.0, 2.0, 2.0);
        ff.vertex(0.0, 0.0, 0.0);
        ff.end();
        let v = ff.batches()[0].vertices[0];
        assert_eq!(v.position, [11.0, 1.0, 1.0]);
    }

    #[test]
    fn batches_capture_lighting_at_begin() {
        let mut ff = FixedFunction::new();
        ff.enable(Capability::Lighting);
        quad(&mut ff);
        ff.disable(Capability::Lighting);
        quad(&mut ff);
        let lit: Vec<_> = ff.batches().iter().map(|b| b.lit).collect();
        assert_eq!(lit, vec![true, false]);
        assert_eq!(ff.batches()[0].vertices[0].lit, 1.0);
    }

    #[test]
    fn light_position_is_stored_in_eye_space() {
        let mut ff = FixedFunction::new();
        ff.load_modelview(Matrix4::from_translation(Vector3::new(0.0, 0.0, -5.0)));
        ff.light(0, LightParameter::Position([1.0, 2.0, 3.0, 1.0]));
        assert_eq!(ff.light_params(0).unwrap().eye_position, [1.0, 2.0, -2.0, 1.0]);
    }

    #[test]
    fn out_of_range_light_slots_are_ignored() {
        let mut ff = FixedFunction::new();
        ff.enable(Capability::Light(MAX_LIGHTS));
        ff.light(MAX_LIGHTS, LightParameter::Diffuse([1.0; 4]));
        assert!(!ff.is_enabled(Capability::Light(MAX_LIGHTS)));
    }

    #[test]
    fn end_without_begin_and_nested_begin_do_not_record() {
        let mut ff = FixedFunction::new();
        ff.end();
        ff.begin(Primitive::Quads);
        ff.begin(Primitive::Lines);
        ff.vertex(0.0, 0.0, 0.0);
        ff.end();
        assert_eq!(ff.batches().len(), 1);
        assert_eq!(ff.batches()[0].primitive, Primitive::Quads);
    }

    #[test]
    fn swap_buffers_hands_over_the_frame() {
        let mut ff = FixedFunction::new();
        ff.enable(Capability::DepthTest);
        ff.set_clear_colour(wgpu::Color::WHITE);
        ff.clear(ClearBuffers::ALL);
        quad(&mut ff);
        ff.swap_buffers();

        let frame = ff.take_presented().expect("a frame was presented");
        assert_eq!(frame.clear_colour, Some(wgpu::Color::WHITE));
        assert!(frame.clear_depth && frame.depth_test);
        assert_eq!(frame.triangle_vertices().len(), 6);
        assert!(ff.batches().is_empty());
        assert!(ff.take_presented().is_none());
    }

    #[test]
    fn normals_survive_non_uniform_scale() {
        let mut ff = FixedFunction::new();
        ff.scale(2.0, 1.0, 1.0);
        ff.normal(0.0, 1.0, 0.0);
        ff.begin(Primitive::Lines);
        ff.vertex(0.0, 0.0, 0.0);
        ff.end();
        assert_eq!(normalized(ff.batches()[0].vertices[0].normal), [0.0, 1.0, 0.0]);
    }
}
