use cgmath::Vector3;

use crate::input::KeyboardState;

/// Everything the demo mutates between frames.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneState {
    /// Small yellow cube drawn at the primary light.
    pub show_marker_cube: bool,
    /// Fixed-function lighting for the main cube.
    pub lighting_enabled: bool,
    /// Secondary, orbiting light and its orange marker.
    pub orbit_light_enabled: bool,
    pub axes_visible: bool,
    pub orbit_angle: f32,
    pub orbit_radius: f32,
    pub orbit_speed: f32,
    pub orbit_height: f32,
    pub trans_step: i32,
    pub rad_step: i32,
    pub att_step: i32,
    pub last_keyboard_state: KeyboardState,
}

impl Default for SceneState {
    fn default() -> Self {
        Self {
            show_marker_cube: true,
            lighting_enabled: true,
            orbit_light_enabled: true,
            axes_visible: true,
            orbit_angle: 0.0,
            orbit_radius: 8.0,
            orbit_speed: 1.0,
            orbit_height: 4.0,
            trans_step: 0,
            rad_step: 8,
            att_step: 6,
            last_keyboard_state: KeyboardState::new(),
        }
    }
}

impl SceneState {
    /// Point on the orbit circle in the XZ plane at `orbit_height`.
    pub fn orbit_position(&self) -> Vector3<f32> {
        let (sin, cos) = self.orbit_angle.sin_cos();
        Vector3::new(
            self.orbit_radius * cos,
            self.orbit_height,
            self.orbit_radius * sin,
        )
    }

    /// Shared by the primary light and the marker cube.
    pub fn marker_position(&self) -> Vector3<f32> {
        Vector3::new(
            self.trans_step as f32,
            self.att_step as f32,
            self.rad_step as f32,
        )
    }
}
