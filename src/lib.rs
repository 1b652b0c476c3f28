//! orbit-lights
//!
//! A small interactive lighting demo: a cube lit by a user-movable primary
//! light and a second light orbiting it, with markers for both lights and a
//! set of world axes. Drawing follows the old fixed-function model (global
//! enable flags, a model-view matrix stack, light slots and immediate-mode
//! primitives), recorded on the CPU and rendered with wgpu.
//!
//! High-level modules
//! - `clock`: fixed-rate update ticks
//! - `config`: window and run-loop settings
//! - `context`: GPU and window context that owns device/queue/renderer
//! - `data_structures`: GPU textures used as render targets
//! - `flow`: lifecycle trait and the winit event loop
//! - `immediate`: fixed-function state and immediate-mode recording
//! - `input`: polled keyboard and mouse state
//! - `pipelines`: the fixed-function render pipelines and lighting uniform
//! - `scene`: the demo scene itself
//!

pub mod clock;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod immediate;
pub mod input;
pub mod pipelines;
pub mod scene;

// Re-exports commonly used types for convenience in downstream code.
pub use config::Config;
pub use flow::{GraphicsFlow, Out, run};
pub use immediate::FixedFunction;
pub use input::{InputSnapshot, Key, KeyboardState};
pub use scene::{SceneController, SceneState};
