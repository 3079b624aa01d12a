//! Scenes and the entity pipeline
//!
//! A scene is driven once per tick by the runner: `think` advances it and may
//! request a switch to another scene, `draw` renders it. [`EntityScene`] holds
//! the entity list shared by every concrete scene and runs the
//! think → collide → sweep → append pipeline.

use rand_pcg::Pcg32;

use super::collision::circles_overlap;
use super::dimensions::Dimensions;
use super::entity::{Entity, EntityEvent, EntityId, EntityTag, ThinkContext};
use super::transition::{FadeTransition, Transition};
use crate::Context;
use crate::renderer::{Surface, SurfaceError};

/// Scene usage errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    #[error("no such entity: {0:?}")]
    NoSuchEntity(EntityId),
}

/// Identifies concrete scenes (for switch bookkeeping and input routing)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneId {
    Default,
    Lines,
    Asteroids,
}

/// Something the runner can advance and render
pub trait Scene {
    fn id(&self) -> SceneId;

    /// Advance by `delta` seconds. Returning a switch hands control to
    /// another scene.
    fn think(&mut self, ctx: &mut Context, bounds: Dimensions, delta: f32) -> Option<SceneSwitch>;

    /// Render the current state. Called inside an isolated scope.
    fn draw(&self, surface: &mut Surface, ctx: &Context, delta: f32) -> Result<(), SurfaceError>;
}

/// A requested scene change
pub struct SceneSwitch {
    pub scene: Box<dyn Scene>,
    pub transition: Option<Box<dyn Transition>>,
}

impl SceneSwitch {
    pub fn immediate(scene: Box<dyn Scene>) -> Self {
        Self {
            scene,
            transition: None,
        }
    }

    pub fn fade(scene: Box<dyn Scene>, seconds: f32) -> Self {
        Self {
            scene,
            transition: Some(Box::new(FadeTransition::new(seconds))),
        }
    }
}

impl std::fmt::Debug for SceneSwitch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneSwitch")
            .field("scene", &self.scene.id())
            .field("transition", &self.transition.is_some())
            .finish()
    }
}

/// Ordered entity collection; insertion order is update and draw order
#[derive(Debug, Default)]
pub struct EntityScene {
    entities: Vec<Entity>,
    next_id: u32,
}

impl EntityScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entity, assigning it a fresh id
    pub fn spawn(&mut self, mut entity: Entity) -> EntityId {
        self.next_id += 1;
        let id = EntityId(self.next_id);
        entity.set_id(id);
        self.entities.push(entity);
        id
    }

    pub fn remove(&mut self, id: EntityId) -> Result<Entity, SceneError> {
        let index = self
            .entities
            .iter()
            .position(|e| e.id() == id)
            .ok_or(SceneError::NoSuchEntity(id))?;
        Ok(self.entities.remove(index))
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id() == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id() == id)
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Live entities of the given kind
    pub fn count(&self, tag: EntityTag) -> usize {
        self.entities.iter().filter(|e| e.tag() == tag).count()
    }

    pub fn clear(&mut self) {
        self.entities.clear();
    }

    /// Run one tick of the pipeline and return the events entities emitted.
    ///
    /// 1. `think` on every entity in spawn order
    /// 2. pairwise collision dispatch between entities holding a collision
    /// 3. sweep dead entities
    /// 4. append entities spawned during steps 1 and 2
    pub fn think(&mut self, bounds: Dimensions, rng: &mut Pcg32, delta: f32) -> Vec<EntityEvent> {
        let mut cx = ThinkContext::new(bounds, rng);

        for entity in &mut self.entities {
            entity.think(&mut cx, delta);
        }

        self.collide(&mut cx);

        self.entities.retain(|e| !e.is_dead());

        for entity in cx.take_spawned() {
            self.spawn(entity);
        }
        cx.take_events()
    }

    /// O(n²) scan over entities with a collision. An entity that died earlier
    /// in the pass no longer collides.
    fn collide(&mut self, cx: &mut ThinkContext) {
        let colliders: Vec<usize> = self
            .entities
            .iter()
            .enumerate()
            .filter(|(_, e)| e.collision.is_some())
            .map(|(i, _)| i)
            .collect();

        for (n, &i) in colliders.iter().enumerate() {
            for &j in &colliders[n + 1..] {
                let (head, tail) = self.entities.split_at_mut(j);
                let (a, b) = (&mut head[i], &mut tail[0]);
                if a.is_dead() || b.is_dead() {
                    continue;
                }
                let (Some(ca), Some(cb)) = (&a.collision, &b.collision) else {
                    continue;
                };
                if !circles_overlap(ca, a.position, cb, b.position) {
                    continue;
                }
                let (contact_a, contact_b) = (a.contact(), b.contact());
                a.on_collide(&contact_b, cx);
                b.on_collide(&contact_a, cx);
            }
        }
    }

    /// Draw every entity in its own scope
    pub fn draw(&self, surface: &mut Surface, debug: bool) -> Result<(), SurfaceError> {
        for entity in &self.entities {
            surface.isolate(|surface| entity.draw(surface, debug))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::RecordingBackend;
    use crate::renderer::{Sprite, SpriteImage};
    use crate::sim::entity::{asteroid, bullet};
    use crate::sim::{EntityKind, Point, Vector2};
    use rand::SeedableRng;

    const BOUNDS: Dimensions = Dimensions::new(800.0, 600.0);

    fn rock_sprite() -> Sprite {
        Sprite::new(SpriteImage::placeholder("asteroid.svg", Dimensions::new(200.0, 200.0)))
    }

    #[test]
    fn test_spawn_assigns_unique_ids() {
        let mut scene = EntityScene::new();
        let a = scene.spawn(Entity::new(EntityKind::Bullet));
        let b = scene.spawn(Entity::new(EntityKind::Bullet));
        assert_ne!(a, b);
        assert_eq!(scene.get(b).map(|e| e.id()), Some(b));
    }

    #[test]
    fn test_remove_missing_entity_fails() {
        let mut scene = EntityScene::new();
        let id = scene.spawn(Entity::new(EntityKind::Bullet));
        assert!(scene.remove(id).is_ok());
        assert_eq!(scene.remove(id).unwrap_err(), SceneError::NoSuchEntity(id));
    }

    #[test]
    fn test_dead_entity_is_not_drawn() {
        let mut rng = Pcg32::seed_from_u64(0);
        let mut scene = EntityScene::new();
        scene.spawn(bullet::bullet(Point::new(100.0, 100.0), 0.0).with_velocity(Vector2::ZERO));
        scene.spawn(
            bullet::bullet(Point::new(100.0, -15.0), 0.0).with_velocity(Vector2::new(0.0, -100.0)),
        );
        scene.think(BOUNDS, &mut rng, 0.1);
        assert_eq!(scene.len(), 1);

        let (backend, recording) = RecordingBackend::new();
        let mut surface = Surface::new(Box::new(backend), BOUNDS);
        scene.draw(&mut surface, false).unwrap();
        assert_eq!(recording.stroked_paths().len(), 1);
        assert!(surface.is_root_scope());
    }

    #[test]
    fn test_bullet_splits_asteroid_end_to_end() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut scene = EntityScene::new();
        let rock = asteroid::asteroid(rock_sprite(), 0.75, &mut rng).at(Point::new(400.0, 300.0));
        scene.spawn(rock);
        scene.spawn(bullet::bullet(Point::new(400.0, 300.0), 0.0));

        let events = scene.think(BOUNDS, &mut rng, 0.0);
        assert_eq!(events, vec![EntityEvent::Scored(375)]);
        assert_eq!(scene.count(EntityTag::Bullet), 0);
        assert_eq!(scene.count(EntityTag::Asteroid), 3);
        for e in scene.entities() {
            let EntityKind::Asteroid(a) = e.kind else {
                panic!("unexpected entity");
            };
            assert!((a.scale - 0.375).abs() < 1e-6);
        }
    }

    #[test]
    fn test_one_bullet_hits_one_asteroid() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut scene = EntityScene::new();
        scene.spawn(asteroid::asteroid(rock_sprite(), 0.3, &mut rng).at(Point::new(400.0, 300.0)));
        scene.spawn(asteroid::asteroid(rock_sprite(), 0.3, &mut rng).at(Point::new(405.0, 300.0)));
        scene.spawn(bullet::bullet(Point::new(402.0, 300.0), 0.0));

        let events = scene.think(BOUNDS, &mut rng, 0.0);
        assert_eq!(events.len(), 1);
        assert_eq!(scene.count(EntityTag::Asteroid), 1);
    }

    #[test]
    fn test_touching_circles_do_not_collide() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut scene = EntityScene::new();
        // Radius 50 + 10, centers exactly 60 apart
        scene.spawn(asteroid::asteroid(rock_sprite(), 0.5, &mut rng).at(Point::new(400.0, 300.0)));
        scene.spawn(bullet::bullet(Point::new(460.0, 300.0), 0.0));
        assert!(scene.think(BOUNDS, &mut rng, 0.0).is_empty());
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn test_spawned_entities_join_after_pass() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut scene = EntityScene::new();
        scene.spawn(asteroid::asteroid(rock_sprite(), 1.0, &mut rng).at(Point::new(400.0, 300.0)));
        scene.spawn(bullet::bullet(Point::new(400.0, 300.0), 0.0));
        scene.think(BOUNDS, &mut rng, 0.0);

        // Fragments overlap each other but only react to bullets
        assert_eq!(scene.count(EntityTag::Asteroid), 4);
        let ids: Vec<_> = scene.entities().iter().map(|e| e.id().0).collect();
        assert_eq!(ids, vec![3, 4, 5, 6]);
    }
}
