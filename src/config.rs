//! Window and run-loop settings.

/// Settings for [`crate::flow::run`]. `Default` is the demo's configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub title: String,
    /// Initial inner size in logical pixels.
    pub width: u32,
    pub height: u32,
    /// Rate of `on_update` calls.
    pub updates_per_second: f64,
    /// Upper bound on updates replayed within one redraw.
    pub max_ticks_per_frame: u32,
    /// Requested MSAA sample count; lowered to what the adapter supports.
    pub sample_count: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "orbit-lights".to_string(),
            width: 800,
            height: 600,
            updates_per_second: 60.0,
            max_ticks_per_frame: 5,
            sample_count: 8,
        }
    }
}
