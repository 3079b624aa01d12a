//! Entities
//!
//! One `Entity` struct for every simulated object. Behavior is selected by the
//! [`EntityKind`] variant; capabilities (velocity, collision, sprite) are
//! optional fields rather than base classes. Per-kind behavior lives in the
//! submodules and is dispatched from `think`, `draw` and `on_collide` here.

pub mod ambient;
pub mod asteroid;
pub mod bullet;
pub mod player;

use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

pub use ambient::{Controls, Line, Triangle};
pub use asteroid::Asteroid;
pub use player::Player;

use super::collision::Collision;
use super::color::Color;
use super::dimensions::Dimensions;
use super::vector::{Point, Vector2};
use crate::renderer::{Sprite, Surface, SurfaceError};

/// Scene-assigned entity identifier (unique per scene, never reused)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Variant tag without per-kind data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityTag {
    Player,
    Asteroid,
    Bullet,
    Triangle,
    Line,
    Controls,
}

/// Per-kind state
#[derive(Debug, Clone)]
pub enum EntityKind {
    Player(Player),
    Asteroid(Asteroid),
    Bullet,
    Triangle(Triangle),
    Line(Line),
    Controls(Controls),
}

impl EntityKind {
    pub fn tag(&self) -> EntityTag {
        match self {
            EntityKind::Player(_) => EntityTag::Player,
            EntityKind::Asteroid(_) => EntityTag::Asteroid,
            EntityKind::Bullet => EntityTag::Bullet,
            EntityKind::Triangle(_) => EntityTag::Triangle,
            EntityKind::Line(_) => EntityTag::Line,
            EntityKind::Controls(_) => EntityTag::Controls,
        }
    }
}

/// Something an entity reports to its scene during think or collision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityEvent {
    /// Points awarded to the player
    Scored(u64),
}

/// What an entity sees of the entity it collided with
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub id: EntityId,
    pub tag: EntityTag,
    pub position: Point,
}

/// Per-tick environment handed to entities
pub struct ThinkContext<'a> {
    pub bounds: Dimensions,
    pub rng: &'a mut Pcg32,
    spawned: Vec<Entity>,
    events: Vec<EntityEvent>,
}

impl<'a> ThinkContext<'a> {
    pub fn new(bounds: Dimensions, rng: &'a mut Pcg32) -> Self {
        Self {
            bounds,
            rng,
            spawned: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Queue a new sibling; it joins the scene after the current pass
    pub fn spawn(&mut self, entity: Entity) {
        self.spawned.push(entity);
    }

    pub fn emit(&mut self, event: EntityEvent) {
        self.events.push(event);
    }

    pub fn take_spawned(&mut self) -> Vec<Entity> {
        std::mem::take(&mut self.spawned)
    }

    pub fn take_events(&mut self) -> Vec<EntityEvent> {
        std::mem::take(&mut self.events)
    }
}

/// A single simulated object
#[derive(Debug, Clone)]
pub struct Entity {
    id: EntityId,
    pub position: Point,
    /// Rotation in degrees
    pub rotation: f32,
    /// Movement per second; entities without one stay put
    pub velocity: Option<Vector2>,
    pub collision: Option<Collision>,
    pub sprite: Option<Sprite>,
    pub kind: EntityKind,
    dead: bool,
}

impl Entity {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            id: EntityId::default(),
            position: Point::ORIGIN,
            rotation: 0.0,
            velocity: None,
            collision: None,
            sprite: None,
            kind,
            dead: false,
        }
    }

    pub fn at(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    pub fn with_velocity(mut self, velocity: Vector2) -> Self {
        self.velocity = Some(velocity);
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_collision(mut self, collision: Collision) -> Self {
        self.collision = Some(collision);
        self
    }

    pub fn with_sprite(mut self, sprite: Sprite) -> Self {
        self.sprite = Some(sprite);
        self
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    pub fn tag(&self) -> EntityTag {
        self.kind.tag()
    }

    pub fn contact(&self) -> Contact {
        Contact {
            id: self.id,
            tag: self.tag(),
            position: self.position,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.dead
            || match &self.kind {
                EntityKind::Controls(controls) => controls.expired(),
                EntityKind::Line(line) => line.exhausted(),
                _ => false,
            }
    }

    pub fn kill(&mut self) {
        self.dead = true;
    }

    pub fn as_player(&self) -> Option<&Player> {
        match &self.kind {
            EntityKind::Player(player) => Some(player),
            _ => None,
        }
    }

    pub fn as_player_mut(&mut self) -> Option<&mut Player> {
        match &mut self.kind {
            EntityKind::Player(player) => Some(player),
            _ => None,
        }
    }

    /// Offset position by velocity over `delta` seconds
    pub fn integrate(&mut self, delta: f32) {
        if let Some(velocity) = self.velocity {
            self.position += velocity * delta;
        }
    }

    /// Advance per-entity state by `delta` seconds
    pub fn think(&mut self, cx: &mut ThinkContext, delta: f32) {
        match self.tag() {
            EntityTag::Player => player::think(self, cx.bounds, delta),
            EntityTag::Asteroid => asteroid::think(self, cx.bounds, delta),
            EntityTag::Bullet => bullet::think(self, cx.bounds, delta),
            EntityTag::Triangle => ambient::think_triangle(self, cx.bounds, delta),
            EntityTag::Line => ambient::think_line(self, cx.bounds, delta),
            EntityTag::Controls => ambient::think_controls(self, delta),
        }
    }

    /// Draw through the surface. Callers isolate each entity.
    pub fn draw(&self, surface: &mut Surface, debug: bool) -> Result<(), SurfaceError> {
        if debug {
            if let Some(collision) = &self.collision {
                let center = collision.center(self.position);
                surface.isolate(|surface| {
                    surface.set_stroke_color(Color::RED);
                    surface.translate(center.to_vector());
                    surface.draw_circle(collision.radius, 1.0);
                    Ok(())
                })?;
            }
        }

        surface.translate(self.position.to_vector());
        surface.rotate(self.rotation);

        match &self.kind {
            EntityKind::Player(player) => player::draw(player, self.sprite.as_ref(), surface),
            EntityKind::Asteroid(asteroid) => {
                asteroid::draw(asteroid, self.sprite.as_ref(), surface)
            }
            EntityKind::Bullet => bullet::draw(surface),
            EntityKind::Triangle(triangle) => ambient::draw_triangle(triangle, surface),
            EntityKind::Line(line) => ambient::draw_line(line, surface),
            EntityKind::Controls(controls) => {
                ambient::draw_controls(controls, self.sprite.as_ref(), surface)
            }
        }
    }

    /// React to overlapping another entity's collision
    pub fn on_collide(&mut self, other: &Contact, cx: &mut ThinkContext) {
        match self.kind {
            EntityKind::Player(_) => player::on_collide(self, other),
            EntityKind::Asteroid(asteroid) => asteroid::on_collide(self, asteroid, other, cx),
            EntityKind::Bullet => bullet::on_collide(self, other),
            _ => {}
        }
    }

    /// Fire a bullet if this is a player whose cooldown has elapsed
    pub fn shoot(&mut self) -> Option<Entity> {
        player::shoot(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{DrawOp, RecordingBackend};
    use rand::SeedableRng;

    #[test]
    fn test_velocity_integration() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut cx = ThinkContext::new(Dimensions::new(800.0, 600.0), &mut rng);
        let mut bullet = bullet::bullet(Point::new(100.0, 100.0), 0.0);
        bullet.velocity = Some(Vector2::new(10.0, -20.0));
        bullet.think(&mut cx, 0.5);
        assert_eq!(bullet.position, Point::new(105.0, 90.0));
        assert!(!bullet.is_dead());
    }

    #[test]
    fn test_entity_without_velocity_stays_put() {
        let mut e = Entity::new(EntityKind::Bullet).at(Point::new(5.0, 5.0));
        e.integrate(10.0);
        assert_eq!(e.position, Point::new(5.0, 5.0));
    }

    #[test]
    fn test_draw_applies_translate_then_rotate() {
        let (backend, recording) = RecordingBackend::new();
        let mut surface = Surface::new(Box::new(backend), Dimensions::new(800.0, 600.0));
        let bullet = bullet::bullet(Point::new(30.0, 40.0), 90.0);
        surface.isolate(|s| bullet.draw(s, false)).unwrap();

        let ops = recording.ops();
        let translate = ops
            .iter()
            .position(|op| *op == DrawOp::Translate(Vector2::new(30.0, 40.0)));
        let rotate = ops.iter().position(|op| matches!(op, DrawOp::Rotate(_)));
        assert!(translate.is_some() && rotate.is_some());
        assert!(translate < rotate);
        assert!(surface.is_root_scope());
        assert_eq!(surface.origin(), Point::ORIGIN);
    }

    #[test]
    fn test_debug_draws_collision_circle() {
        let (backend, recording) = RecordingBackend::new();
        let mut surface = Surface::new(Box::new(backend), Dimensions::new(800.0, 600.0));
        let bullet = bullet::bullet(Point::new(30.0, 40.0), 0.0);
        surface.isolate(|s| bullet.draw(s, true)).unwrap();
        let ops = recording.ops();
        assert!(ops.contains(&DrawOp::Stroke(Color::RED)));
        assert!(ops.contains(&DrawOp::Circle {
            radius: bullet::BULLET_RADIUS,
            thickness: 1.0
        }));
    }
}
