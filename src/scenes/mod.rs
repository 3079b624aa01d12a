//! Concrete scenes
//!
//! - `DefaultScene`: drifting triangles behind the page
//! - `LinesScene`: the older line-triangle background
//! - `AsteroidsScene`: the hidden minigame

pub mod asteroids;
pub mod default;
pub mod lines;

pub use asteroids::AsteroidsScene;
pub use default::DefaultScene;
pub use lines::LinesScene;

use crate::Context;
use crate::renderer::Surface;
use crate::settings::AmbientStyle;
use crate::sim::{Entity, EntityScene, Scene};

/// The background scene selected in settings
pub fn ambient(ctx: &Context) -> Box<dyn Scene> {
    match ctx.settings.ambient {
        AmbientStyle::Triangles => Box::new(DefaultScene::new()),
        AmbientStyle::Lines => Box::new(LinesScene::new()),
    }
}

/// Spawn entities until the scene holds at least `target` of them
fn fill_to(entities: &mut EntityScene, target: f32, mut make: impl FnMut() -> Entity) -> usize {
    let mut spawned = 0;
    while (entities.len() as f32) < target {
        entities.spawn(make());
        spawned += 1;
    }
    spawned
}

/// Force fill and stroke to white, keeping their alpha
fn paint_white(surface: &mut Surface) {
    surface.update_fill(|c| c.with_rgb(255, 255, 255));
    surface.update_stroke(|c| c.with_rgb(255, 255, 255));
}
