//! Asteroids: split into smaller rocks when shot

use rand::Rng;

use super::{Contact, Entity, EntityEvent, EntityKind, EntityTag, ThinkContext};
use crate::renderer::{Sprite, Surface, SurfaceError};
use crate::sim::{Collision, Dimensions, Vector2};

/// Smallest scale a freshly spawned asteroid gets
pub const MIN_SCALE: f32 = 0.25;
/// Asteroids at or above this scale split when destroyed
pub const SPLIT_SCALE: f32 = 0.5;
/// Collision radius per unit of scale
pub const RADIUS_PER_SCALE: f32 = 100.0;
/// Score awarded per unit of scale
pub const SCORE_PER_SCALE: f32 = 500.0;
/// Fragments per unit of scale
pub const FRAGMENTS_PER_SCALE: f32 = 4.0;
pub const FRAGMENT_SPEED: f32 = 50.0;
/// Distance past the screen edge at which an asteroid is discarded
pub const DESPAWN_MARGIN: f32 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Asteroid {
    pub scale: f32,
}

impl Asteroid {
    pub fn score(&self) -> u64 {
        (self.scale * SCORE_PER_SCALE).floor() as u64
    }

    pub fn fragments(&self) -> u32 {
        if self.scale >= SPLIT_SCALE {
            (self.scale * FRAGMENTS_PER_SCALE).floor() as u32
        } else {
            0
        }
    }
}

/// Random scale in `[MIN_SCALE, 1)`
pub fn random_scale(rng: &mut impl Rng) -> f32 {
    rng.random::<f32>().max(MIN_SCALE)
}

/// Create an asteroid with a random heading; the caller places it
pub fn asteroid(sprite: Sprite, scale: f32, rng: &mut impl Rng) -> Entity {
    rock(scale, rng).with_sprite(sprite)
}

fn rock(scale: f32, rng: &mut impl Rng) -> Entity {
    Entity::new(EntityKind::Asteroid(Asteroid { scale }))
        .with_rotation(rng.random::<f32>() * 360.0)
        .with_velocity(Vector2::ZERO)
        .with_collision(Collision::centered(scale * RADIUS_PER_SCALE))
}

pub(super) fn think(entity: &mut Entity, bounds: Dimensions, delta: f32) {
    entity.integrate(delta);
    if !bounds.contains_with_margin(entity.position, DESPAWN_MARGIN) {
        entity.kill();
    }
}

pub(super) fn on_collide(
    entity: &mut Entity,
    asteroid: Asteroid,
    other: &Contact,
    cx: &mut ThinkContext,
) {
    if other.tag != EntityTag::Bullet {
        return;
    }
    log::debug!("Asteroid {:?} hit by bullet {:?}", entity.id(), other.id);
    entity.kill();
    cx.emit(EntityEvent::Scored(asteroid.score()));

    // Fragments share the parent's image
    for _ in 0..asteroid.fragments() {
        let velocity = Vector2::random(&mut *cx.rng) * FRAGMENT_SPEED
            + Vector2::new(-FRAGMENT_SPEED / 2.0, -FRAGMENT_SPEED / 2.0);
        let mut fragment = rock(asteroid.scale / 2.0, &mut *cx.rng)
            .at(entity.position)
            .with_velocity(velocity);
        fragment.sprite = entity.sprite.clone();
        cx.spawn(fragment);
    }
}

pub(super) fn draw(
    asteroid: &Asteroid,
    sprite: Option<&Sprite>,
    surface: &mut Surface,
) -> Result<(), SurfaceError> {
    match sprite {
        Some(sprite) => sprite.draw(surface, asteroid.scale),
        None => Ok(()),
    }
}
