//! Default background: white triangles drifting across the page

use super::{fill_to, paint_white};
use crate::Context;
use crate::renderer::{Surface, SurfaceError};
use crate::sim::entity::ambient;
use crate::sim::{Dimensions, EntityScene, Scene, SceneId, SceneSwitch, Vector2};

#[derive(Debug, Default)]
pub struct DefaultScene {
    entities: EntityScene,
}

impl DefaultScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entities(&self) -> &EntityScene {
        &self.entities
    }
}

impl Scene for DefaultScene {
    fn id(&self) -> SceneId {
        SceneId::Default
    }

    fn think(&mut self, ctx: &mut Context, bounds: Dimensions, delta: f32) -> Option<SceneSwitch> {
        self.entities.think(bounds, &mut ctx.rng, delta);

        let target = bounds.pixels() * ctx.settings.triangle_density;
        let rng = &mut ctx.rng;
        fill_to(&mut self.entities, target, || {
            let position = Vector2::random(&mut *rng).multiply_by(bounds.end()).to_point();
            ambient::triangle(position, &mut *rng)
        });
        None
    }

    fn draw(&self, surface: &mut Surface, ctx: &Context, _delta: f32) -> Result<(), SurfaceError> {
        paint_white(surface);
        self.entities.draw(surface, ctx.settings.debug_collisions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::RecordingBackend;
    use crate::sim::EntityTag;

    #[test]
    fn test_spawns_density_target_in_one_tick() {
        let mut ctx = Context::headless(1);
        let mut scene = DefaultScene::new();
        let bounds = Dimensions::new(800.0, 600.0);
        scene.think(&mut ctx, bounds, 0.0);
        // 800 * 600 * 0.00004 = 19.2
        assert_eq!(scene.entities().len(), 20);
        assert_eq!(scene.entities().count(EntityTag::Triangle), 20);
    }

    #[test]
    fn test_target_follows_area() {
        let mut ctx = Context::headless(1);
        let mut scene = DefaultScene::new();
        scene.think(&mut ctx, Dimensions::new(800.0, 600.0), 0.0);
        scene.think(&mut ctx, Dimensions::new(1600.0, 1200.0), 0.0);
        assert!(scene.entities().len() >= 77);
    }

    #[test]
    fn test_count_holds_over_time() {
        let mut ctx = Context::headless(3);
        let mut scene = DefaultScene::new();
        let bounds = Dimensions::new(400.0, 300.0);
        for _ in 0..2_000 {
            scene.think(&mut ctx, bounds, 0.25);
            assert_eq!(scene.entities().len(), 5);
        }
    }

    #[test]
    fn test_draws_white_and_restores() {
        let mut ctx = Context::headless(1);
        let mut scene = DefaultScene::new();
        scene.think(&mut ctx, Dimensions::new(800.0, 600.0), 1.0);

        let (backend, recording) = RecordingBackend::new();
        let mut surface = Surface::new(Box::new(backend), Dimensions::new(800.0, 600.0));
        surface.isolate(|s| scene.draw(s, &ctx, 0.0)).unwrap();
        assert_eq!(recording.stroked_paths().len(), 20);
        assert!(surface.is_root_scope());
        assert_eq!(surface.stroke_color(), crate::sim::Color::BLACK);
    }
}
