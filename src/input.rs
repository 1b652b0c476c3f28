//! Polled keyboard and mouse state.
//!
//! winit delivers input as a stream of events; the scene wants to *poll* it once
//! per update tick instead. [`InputTracker`] folds window and device events into
//! an [`InputSnapshot`] that flows can query and compare against the snapshot of
//! the previous tick.
//!
//! # Key types
//!
//! - [`Key`] names every key the scene reacts to
//! - [`KeyboardState`] is a copyable set of pressed keys with value equality
//! - [`MouseState`] holds the left button and both cursor coordinate systems

use winit::{
    event::{DeviceEvent, ElementState, MouseButton, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

/// Keys the scene can poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Key {
    Escape,
    P,
    R,
    O,
    Plus,
    Minus,
    KeypadPlus,
    KeypadMinus,
    A,
    D,
    W,
    S,
    Up,
    Down,
}

impl Key {
    pub const ALL: [Key; 14] = [
        Key::Escape,
        Key::P,
        Key::R,
        Key::O,
        Key::Plus,
        Key::Minus,
        Key::KeypadPlus,
        Key::KeypadMinus,
        Key::A,
        Key::D,
        Key::W,
        Key::S,
        Key::Up,
        Key::Down,
    ];

    fn mask(self) -> u32 {
        1 << self as u8
    }
}

/// Maps a physical key to one of the named keys, `None` for everything else.
///
/// `Plus` sits on the `=`/`+` key of a US layout, which is what most keyboards
/// report for an unshifted plus.
pub fn translate_key(physical_key: PhysicalKey) -> Option<Key> {
    let PhysicalKey::Code(code) = physical_key else {
        return None;
    };
    let key = match code {
        KeyCode::Escape => Key::Escape,
        KeyCode::KeyP => Key::P,
        KeyCode::KeyR => Key::R,
        KeyCode::KeyO => Key::O,
        KeyCode::Equal => Key::Plus,
        KeyCode::Minus => Key::Minus,
        KeyCode::NumpadAdd => Key::KeypadPlus,
        KeyCode::NumpadSubtract => Key::KeypadMinus,
        KeyCode::KeyA => Key::A,
        KeyCode::KeyD => Key::D,
        KeyCode::KeyW => Key::W,
        KeyCode::KeyS => Key::S,
        KeyCode::ArrowUp => Key::Up,
        KeyCode::ArrowDown => Key::Down,
        _ => return None,
    };
    Some(key)
}

/// Snapshot of which named keys are held down.
///
/// Two snapshots compare equal when exactly the same keys are pressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyboardState {
    pressed: u32,
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a snapshot with the given keys held.
    pub fn with_pressed(keys: &[Key]) -> Self {
        keys.iter().fold(Self::new(), |mut state, key| {
            state.press(*key);
            state
        })
    }

    pub fn is_pressed(&self, key: Key) -> bool {
        self.pressed & key.mask() != 0
    }

    pub fn press(&mut self, key: Key) {
        self.pressed |= key.mask();
    }

    pub fn release(&mut self, key: Key) {
        self.pressed &= !key.mask();
    }

    /// `true` only on the tick where `key` goes from released (in `previous`)
    /// to pressed (in `self`).
    pub fn just_pressed(&self, previous: &KeyboardState, key: Key) -> bool {
        self.is_pressed(key) && !previous.is_pressed(key)
    }
}

/// Snapshot of the mouse.
///
/// `x`/`y` are window-relative logical pixels. `raw_x`/`raw_y` accumulate the
/// unscaled device motion and are unrelated to the window origin.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MouseState {
    pub left_pressed: bool,
    pub x: i32,
    pub y: i32,
    pub raw_x: i32,
    pub raw_y: i32,
}

/// Everything a flow may poll during one update tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputSnapshot {
    pub keyboard: KeyboardState,
    pub mouse: MouseState,
}

/// Accumulates winit events into the current [`InputSnapshot`].
#[derive(Debug)]
pub struct InputTracker {
    current: InputSnapshot,
    scale_factor: f64,
    raw_motion: (f64, f64),
}

impl Default for InputTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl InputTracker {
    pub fn new() -> Self {
        Self {
            current: InputSnapshot::default(),
            scale_factor: 1.0,
            raw_motion: (0.0, 0.0),
        }
    }

    pub fn snapshot(&self) -> InputSnapshot {
        self.current
    }

    pub fn set_scale_factor(&mut self, scale_factor: f64) {
        if scale_factor > 0.0 {
            self.scale_factor = scale_factor;
        }
    }

    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let Some(key) = translate_key(event.physical_key) {
                    match event.state {
                        ElementState::Pressed => self.current.keyboard.press(key),
                        ElementState::Released => self.current.keyboard.release(key),
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let logical = position.to_logical::<f64>(self.scale_factor);
                self.current.mouse.x = logical.x.round() as i32;
                self.current.mouse.y = logical.y.round() as i32;
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.current.mouse.left_pressed = state.is_pressed();
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.set_scale_factor(*scale_factor);
            }
            // Keys held while the window loses focus never report a release.
            WindowEvent::Focused(false) => {
                self.current.keyboard = KeyboardState::new();
                self.current.mouse.left_pressed = false;
            }
            _ => (),
        }
    }

    pub fn handle_device_event(&mut self, event: &DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            self.raw_motion.0 += dx;
            self.raw_motion.1 += dy;
            self.current.mouse.raw_x = self.raw_motion.0.round() as i32;
            self.current.mouse.raw_y = self.raw_motion.1.round() as i32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshots_with_same_keys_are_equal() {
        let a = KeyboardState::with_pressed(&[Key::P, Key::W]);
        let b = KeyboardState::with_pressed(&[Key::W, Key::P]);
        assert_eq!(a, b);
        assert_ne!(a, KeyboardState::with_pressed(&[Key::P]));
    }

    #[test]
    fn just_pressed_fires_only_on_the_transition() {
        let released = KeyboardState::new();
        let held = KeyboardState::with_pressed(&[Key::P]);

        assert!(held.just_pressed(&released, Key::P));
        assert!(!held.just_pressed(&held, Key::P));
        assert!(!released.just_pressed(&held, Key::P));
    }

    #[test]
    fn release_clears_only_that_key() {
        let mut state = KeyboardState::with_pressed(&[Key::A, Key::D]);
        state.release(Key::A);
        assert!(!state.is_pressed(Key::A));
        assert!(state.is_pressed(Key::D));
        assert_ne!(state, KeyboardState::new());
    }

    #[test]
    fn every_named_key_has_its_own_bit() {
        let all = KeyboardState::with_pressed(&Key::ALL);
        for key in Key::ALL {
            let mut without = all;
            without.release(key);
            assert_ne!(without, all, "{:?} shares a bit", key);
        }
    }

    #[test]
    fn translates_plus_and_minus_on_both_rows() {
        assert_eq!(translate_key(PhysicalKey::Code(KeyCode::Equal)), Some(Key::Plus));
        assert_eq!(
            translate_key(PhysicalKey::Code(KeyCode::NumpadAdd)),
            Some(Key::KeypadPlus)
        );
        assert_eq!(translate_key(PhysicalKey::Code(KeyCode::Minus)), Some(Key::Minus));
        assert_eq!(translate_key(PhysicalKey::Code(KeyCode::KeyZ)), None);
    }

    #[test]
    fn raw_motion_accumulates() {
        let mut tracker = InputTracker::new();
        tracker.handle_device_event(&DeviceEvent::MouseMotion { delta: (3.0, -1.0) });
        tracker.handle_device_event(&DeviceEvent::MouseMotion { delta: (2.0, -1.0) });
        let mouse = tracker.snapshot().mouse;
        assert_eq!((mouse.raw_x, mouse.raw_y), (5, -2));
    }
}
