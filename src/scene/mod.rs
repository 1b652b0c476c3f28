//! The demo scene: one lit cube, two lights and their markers.
//!
//! [`SceneController`] implements the four lifecycle hooks of
//! [`GraphicsFlow`]. All of its state lives in a single [`SceneState`]; the
//! global graphics state lives in the [`FixedFunction`] recorder it is handed.
//!
//! Key map:
//!
//! | key | effect |
//! |---|---|
//! | `Esc` | quit |
//! | `P` | toggle the marker cube |
//! | `R` | toggle lighting |
//! | `O` | toggle the orbiting light |
//! | `+` / `-` | orbit faster / slower |
//! | `A` / `D` | primary light along X |
//! | `W` / `S` | primary light along Z |
//! | `Up` / `Down` | primary light along Y |

pub mod draw;
pub mod state;

use std::f32::consts::TAU;

use cgmath::{Deg, Matrix4, Point3, Vector3};
use instant::Duration;

use crate::{
    flow::{GraphicsFlow, Out},
    immediate::{
        Capability, ClearBuffers, FixedFunction,
        light::{LightParameter, MaterialParameter, Rgba, rgb8},
    },
    input::{InputSnapshot, Key},
};

pub use draw::{draw_axes, draw_lit_centered_cube, draw_unlit_centered_cube};
pub use state::SceneState;

pub const PRIMARY_LIGHT: usize = 0;
pub const ORBIT_LIGHT: usize = 1;

pub const MIDNIGHT_BLUE: wgpu::Color = wgpu::Color {
    r: 25.0 / 255.0,
    g: 25.0 / 255.0,
    b: 112.0 / 255.0,
    a: 1.0,
};
pub const SKY_BLUE: Rgba = rgb8(135, 206, 235);
pub const YELLOW: Rgba = rgb8(255, 255, 0);
pub const ORANGE: Rgba = rgb8(255, 165, 0);
pub const RED: Rgba = rgb8(255, 0, 0);
pub const GREEN: Rgba = rgb8(0, 128, 0);

pub const FOV_Y: Deg<f32> = Deg(45.0);
pub const Z_NEAR: f32 = 1.0;
pub const Z_FAR: f32 = 64.0;
pub const EYE: [f32; 3] = [30.0, 30.0, 30.0];

const MAIN_CUBE_SIZE: f32 = 6.0;
const MARKER_SCALE: f32 = 0.5;
const ORBIT_MARKER_SCALE: f32 = 0.4;
const ORBIT_SPEED_STEP: f32 = 0.2;

/// Look-at from [`EYE`] to the origin, +Y up.
pub fn view_matrix() -> Matrix4<f32> {
    Matrix4::look_at_rh(
        Point3::from(EYE),
        Point3::new(0.0, 0.0, 0.0),
        Vector3::unit_y(),
    )
}

/// Perspective projection for a window, with the height clamped to one pixel.
pub fn projection_matrix(width: u32, height: u32) -> Matrix4<f32> {
    let aspect = width as f32 / height.max(1) as f32;
    cgmath::perspective(FOV_Y, aspect, Z_NEAR, Z_FAR)
}

#[derive(Debug, Default)]
pub struct SceneController {
    pub state: SceneState,
}

impl SceneController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: SceneState) -> Self {
        Self { state }
    }

    fn set_light_position(&self, gl: &mut FixedFunction) {
        let p = self.state.marker_position();
        gl.light(PRIMARY_LIGHT, LightParameter::Position([p.x, p.y, p.z, 1.0]));
    }

    fn set_orbit_light_position(&self, gl: &mut FixedFunction) {
        let p = self.state.orbit_position();
        gl.light(ORBIT_LIGHT, LightParameter::Position([p.x, p.y, p.z, 1.0]));
    }

    /// Re-enables lighting when lit mode is active.
    fn restore_lighting(&self, gl: &mut FixedFunction) {
        if self.state.lighting_enabled {
            gl.enable(Capability::Lighting);
        }
    }

    fn apply_toggles(&mut self, gl: &mut FixedFunction, input: &InputSnapshot) {
        let keyboard = &input.keyboard;
        let previous = self.state.last_keyboard_state;

        if keyboard.just_pressed(&previous, Key::P) {
            self.state.show_marker_cube = !self.state.show_marker_cube;
            log::debug!("marker cube visible: {}", self.state.show_marker_cube);
        }

        if keyboard.just_pressed(&previous, Key::R) {
            self.state.lighting_enabled = !self.state.lighting_enabled;
            if self.state.lighting_enabled {
                gl.enable(Capability::Lighting);
            } else {
                gl.disable(Capability::Lighting);
            }
            log::debug!("lighting: {}", self.state.lighting_enabled);
        }

        if keyboard.just_pressed(&previous, Key::O) {
            self.state.orbit_light_enabled = !self.state.orbit_light_enabled;
            if self.state.orbit_light_enabled {
                gl.enable(Capability::Light(ORBIT_LIGHT));
            } else {
                gl.disable(Capability::Light(ORBIT_LIGHT));
            }
            log::debug!("orbit light: {}", self.state.orbit_light_enabled);
        }
    }

    fn apply_held_keys(&mut self, input: &InputSnapshot) {
        let keyboard = &input.keyboard;
        let state = &mut self.state;

        if keyboard.is_pressed(Key::Plus) || keyboard.is_pressed(Key::KeypadPlus) {
            state.orbit_speed += ORBIT_SPEED_STEP;
        }
        if keyboard.is_pressed(Key::Minus) || keyboard.is_pressed(Key::KeypadMinus) {
            state.orbit_speed = (state.orbit_speed - ORBIT_SPEED_STEP).max(0.0);
        }
        if keyboard.is_pressed(Key::A) {
            state.trans_step -= 1;
        }
        if keyboard.is_pressed(Key::D) {
            state.trans_step += 1;
        }
        if keyboard.is_pressed(Key::W) {
            state.rad_step -= 1;
        }
        if keyboard.is_pressed(Key::S) {
            state.rad_step += 1;
        }
        if keyboard.is_pressed(Key::Up) {
            state.att_step += 1;
        }
        if keyboard.is_pressed(Key::Down) {
            state.att_step -= 1;
        }
    }
}

impl GraphicsFlow for SceneController {
    fn on_load(&mut self, gl: &mut FixedFunction) {
        gl.set_clear_colour(MIDNIGHT_BLUE);
        gl.enable(Capability::DepthTest);

        gl.enable(Capability::Lighting);
        gl.enable(Capability::Light(PRIMARY_LIGHT));
        gl.enable(Capability::Light(ORBIT_LIGHT));
        gl.enable(Capability::ColorMaterial);
        gl.enable(Capability::Normalize);

        gl.light(PRIMARY_LIGHT, LightParameter::Ambient([0.15, 0.15, 0.15, 1.0]));
        gl.light(PRIMARY_LIGHT, LightParameter::Diffuse([1.0, 1.0, 1.0, 1.0]));
        gl.light(PRIMARY_LIGHT, LightParameter::Specular([1.0, 1.0, 1.0, 1.0]));

        gl.light(ORBIT_LIGHT, LightParameter::Ambient([0.06, 0.04, 0.0, 1.0]));
        gl.light(ORBIT_LIGHT, LightParameter::Diffuse([1.0, 0.85, 0.35, 1.0]));
        gl.light(ORBIT_LIGHT, LightParameter::Specular([1.0, 0.9, 0.6, 1.0]));

        for slot in [PRIMARY_LIGHT, ORBIT_LIGHT] {
            gl.light(slot, LightParameter::ConstantAttenuation(1.0));
            gl.light(slot, LightParameter::LinearAttenuation(0.09));
            gl.light(slot, LightParameter::QuadraticAttenuation(0.032));
        }

        gl.material(MaterialParameter::Specular([0.9, 0.9, 0.9, 1.0]));
        gl.material(MaterialParameter::Shininess(32.0));

        // Lit mode and the orbit light may start switched off.
        if !self.state.lighting_enabled {
            gl.disable(Capability::Lighting);
        }
        if !self.state.orbit_light_enabled {
            gl.disable(Capability::Light(ORBIT_LIGHT));
        }
        log::info!("scene loaded");
    }

    fn on_resize(&mut self, gl: &mut FixedFunction, width: u32, height: u32) {
        if height == 0 {
            log::warn!("zero window height, clamping aspect ratio to height 1");
        }
        gl.viewport(0, 0, width, height);
        gl.load_projection(projection_matrix(width, height));
        gl.load_modelview(view_matrix());

        self.state.show_marker_cube = true;
        log::info!("resized to {}x{}", width, height);
    }

    fn on_update(&mut self, gl: &mut FixedFunction, input: &InputSnapshot, dt: Duration) -> Out {
        // Only sin/cos of the angle are used; wrapping keeps small steps representable.
        self.state.orbit_angle =
            (self.state.orbit_angle + dt.as_secs_f32() * self.state.orbit_speed).rem_euclid(TAU);

        if input.mouse.left_pressed {
            log::info!(
                "click raw ({},{}); window ({},{})",
                input.mouse.raw_x,
                input.mouse.raw_y,
                input.mouse.x,
                input.mouse.y
            );
        }

        if input.keyboard.is_pressed(Key::Escape) {
            return Out::Exit;
        }

        self.apply_toggles(gl, input);
        self.apply_held_keys(input);

        self.state.last_keyboard_state = input.keyboard;
        Out::Continue
    }

    fn on_render(&mut self, gl: &mut FixedFunction) {
        gl.clear(ClearBuffers::ALL);
        gl.load_modelview(view_matrix());

        self.set_light_position(gl);
        if self.state.orbit_light_enabled {
            self.set_orbit_light_position(gl);
        }

        if self.state.lighting_enabled {
            draw_lit_centered_cube(gl, MAIN_CUBE_SIZE, SKY_BLUE);
        } else {
            draw_unlit_centered_cube(gl, MAIN_CUBE_SIZE, SKY_BLUE);
        }

        let lighting_was_enabled = gl.is_enabled(Capability::Lighting);
        if lighting_was_enabled {
            gl.disable(Capability::Lighting);
        }
        if self.state.axes_visible {
            draw_axes(gl, [RED, YELLOW, GREEN]);
        }
        if lighting_was_enabled && self.state.lighting_enabled {
            gl.enable(Capability::Lighting);
        }

        if self.state.show_marker_cube {
            if gl.is_enabled(Capability::Lighting) {
                gl.disable(Capability::Lighting);
            }
            let p = self.state.marker_position();
            gl.push_matrix();
            gl.translate(p.x, p.y, p.z);
            gl.scale(MARKER_SCALE, MARKER_SCALE, MARKER_SCALE);
            draw_unlit_centered_cube(gl, 1.0, YELLOW);
            gl.pop_matrix();
            self.restore_lighting(gl);
        }

        if gl.is_enabled(Capability::Lighting) {
            gl.disable(Capability::Lighting);
        }
        if self.state.orbit_light_enabled {
            let p = self.state.orbit_position();
            gl.push_matrix();
            gl.translate(p.x, p.y, p.z);
            gl.scale(ORBIT_MARKER_SCALE, ORBIT_MARKER_SCALE, ORBIT_MARKER_SCALE);
            draw_unlit_centered_cube(gl, 1.0, ORANGE);
            gl.pop_matrix();
        }
        self.restore_lighting(gl);

        gl.swap_buffers();
    }
}

#[cfg(test)]
mod tests {
    use cgmath::SquareMatrix;

    use super::*;
    use crate::{immediate::frame::Primitive, input::KeyboardState};

    fn loaded() -> (SceneController, FixedFunction) {
        let mut scene = SceneController::new();
        let mut gl = FixedFunction::new();
        scene.on_load(&mut gl);
        scene.on_resize(&mut gl, 800, 600);
        (scene, gl)
    }

    fn keys(keys: &[Key]) -> InputSnapshot {
        InputSnapshot {
            keyboard: KeyboardState::with_pressed(keys),
            ..Default::default()
        }
    }

    #[test]
    fn load_enables_both_lights_and_material_state() {
        let (_, gl) = loaded();
        for cap in [
            Capability::DepthTest,
            Capability::Lighting,
            Capability::Light(PRIMARY_LIGHT),
            Capability::Light(ORBIT_LIGHT),
            Capability::ColorMaterial,
            Capability::Normalize,
        ] {
            assert!(gl.is_enabled(cap), "{:?}", cap);
        }
        assert_eq!(gl.material_params().shininess, 32.0);
        assert_eq!(gl.light_params(ORBIT_LIGHT).unwrap().attenuation.quadratic, 0.032);
        assert_eq!(gl.clear_colour(), MIDNIGHT_BLUE);
    }

    #[test]
    fn resize_sets_viewport_and_shows_marker() {
        let (mut scene, mut gl) = loaded();
        scene.state.show_marker_cube = false;
        scene.on_resize(&mut gl, 1024, 768);
        assert!(scene.state.show_marker_cube);
        assert_eq!(gl.current_viewport().width, 1024);
        assert_eq!(gl.projection(), projection_matrix(1024, 768));
    }

    #[test]
    fn zero_height_resize_yields_a_finite_projection() {
        let (mut scene, mut gl) = loaded();
        scene.on_resize(&mut gl, 800, 0);
        let projection: [[f32; 4]; 4] = gl.projection().into();
        assert!(projection.iter().flatten().all(|v| v.is_finite()));
    }

    #[test]
    fn escape_skips_the_rest_of_the_tick() {
        let (mut scene, mut gl) = loaded();
        let out = scene.on_update(&mut gl, &keys(&[Key::Escape, Key::P]), Duration::from_millis(16));
        assert_eq!(out, Out::Exit);
        assert!(scene.state.show_marker_cube);
        assert_eq!(scene.state.last_keyboard_state, KeyboardState::new());
        assert!(scene.state.orbit_angle > 0.0);
    }

    #[test]
    fn lighting_toggle_drives_the_capability() {
        let (mut scene, mut gl) = loaded();
        let dt = Duration::from_millis(16);
        scene.on_update(&mut gl, &keys(&[Key::R]), dt);
        assert!(!scene.state.lighting_enabled);
        assert!(!gl.is_enabled(Capability::Lighting));

        scene.on_update(&mut gl, &keys(&[]), dt);
        scene.on_update(&mut gl, &keys(&[Key::R]), dt);
        assert!(gl.is_enabled(Capability::Lighting));
    }

    #[test]
    fn orbit_toggle_drives_the_second_light() {
        let (mut scene, mut gl) = loaded();
        scene.on_update(&mut gl, &keys(&[Key::O]), Duration::ZERO);
        assert!(!scene.state.orbit_light_enabled);
        assert!(!gl.is_enabled(Capability::Light(ORBIT_LIGHT)));
        assert!(gl.is_enabled(Capability::Light(PRIMARY_LIGHT)));
    }

    #[test]
    fn render_leaves_the_matrix_stack_balanced() {
        let (mut scene, mut gl) = loaded();
        scene.on_render(&mut gl);
        assert_eq!(gl.matrix_depth(), 1);
        assert_eq!(gl.modelview(), view_matrix());
        assert!(gl.take_presented().is_some());
    }

    #[test]
    fn render_draws_cube_axes_and_both_markers() {
        let (mut scene, mut gl) = loaded();
        scene.on_render(&mut gl);
        let frame = gl.take_presented().unwrap();

        let shapes: Vec<_> = frame
            .batches
            .iter()
            .map(|b| (b.primitive, b.lit, b.vertices.len()))
            .collect();
        assert_eq!(
            shapes,
            vec![
                (Primitive::Quads, true, 24),
                (Primitive::Lines, false, 6),
                (Primitive::Quads, false, 24),
                (Primitive::Quads, false, 24),
            ]
        );
        assert!(frame.clear_colour.is_some() && frame.clear_depth);
    }

    #[test]
    fn unlit_mode_keeps_lighting_off_through_render() {
        let (mut scene, mut gl) = loaded();
        scene.on_update(&mut gl, &keys(&[Key::R]), Duration::ZERO);
        scene.on_render(&mut gl);
        assert!(!gl.is_enabled(Capability::Lighting));

        let frame = gl.take_presented().unwrap();
        assert!(frame.batches.iter().all(|b| !b.lit));
    }

    #[test]
    fn hidden_markers_are_not_drawn() {
        let (mut scene, mut gl) = loaded();
        scene.state.show_marker_cube = false;
        scene.state.orbit_light_enabled = false;
        scene.state.axes_visible = false;
        scene.on_render(&mut gl);
        let frame = gl.take_presented().unwrap();
        assert_eq!(frame.batches.len(), 1);
        assert!(gl.is_enabled(Capability::Lighting));
    }

    #[test]
    fn orbit_angle_wraps_past_a_full_turn() {
        let (mut scene, mut gl) = loaded();
        scene.state.orbit_angle = std::f32::consts::TAU - 0.01;
        scene.on_update(&mut gl, &keys(&[]), Duration::from_millis(20));
        assert!((scene.state.orbit_angle - 0.01).abs() < 1e-4);
    }

    #[test]
    fn orbit_keeps_moving_over_long_runs() {
        let (mut scene, mut gl) = loaded();
        let dt = Duration::from_millis(16);
        for _ in 0..100_000 {
            let before = scene.state.orbit_angle;
            scene.on_update(&mut gl, &keys(&[]), dt);
            assert!((0.0..std::f32::consts::TAU).contains(&scene.state.orbit_angle));
            assert_ne!(scene.state.orbit_angle, before);
        }
    }

    #[test]
    fn primary_light_follows_the_steps_in_eye_space() {
        let (mut scene, mut gl) = loaded();
        scene.state.trans_step = 2;
        scene.state.att_step = -1;
        scene.state.rad_step = 5;
        scene.on_render(&mut gl);

        let eye = gl.light_params(PRIMARY_LIGHT).unwrap().eye_position;
        let world = view_matrix().invert().unwrap() * cgmath::Vector4::from(eye);
        assert!((world.x - 2.0).abs() < 1e-4);
        assert!((world.y + 1.0).abs() < 1e-4);
        assert!((world.z - 5.0).abs() < 1e-4);
    }
}
