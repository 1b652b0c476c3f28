use orbit_lights::{Config, SceneController};

fn main() -> anyhow::Result<()> {
    orbit_lights::run(Config::default(), SceneController::new())
}
