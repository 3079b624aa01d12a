//! Legacy background: line triangles that fade in, drift and fade out

use super::{fill_to, paint_white};
use crate::Context;
use crate::renderer::{Surface, SurfaceError};
use crate::sim::entity::ambient;
use crate::sim::{Dimensions, EntityScene, Scene, SceneId, SceneSwitch};

#[derive(Debug, Default)]
pub struct LinesScene {
    entities: EntityScene,
}

impl LinesScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entities(&self) -> &EntityScene {
        &self.entities
    }
}

impl Scene for LinesScene {
    fn id(&self) -> SceneId {
        SceneId::Lines
    }

    fn think(&mut self, ctx: &mut Context, bounds: Dimensions, delta: f32) -> Option<SceneSwitch> {
        self.entities.think(bounds, &mut ctx.rng, delta);

        let target = bounds.pixels() * ctx.settings.line_density;
        let rng = &mut ctx.rng;
        fill_to(&mut self.entities, target, || ambient::line(bounds, &mut *rng));
        None
    }

    fn draw(&self, surface: &mut Surface, ctx: &Context, _delta: f32) -> Result<(), SurfaceError> {
        paint_white(surface);
        self.entities.draw(surface, ctx.settings.debug_collisions)
    }
}
