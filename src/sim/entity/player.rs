//! Player ship
//!
//! Steering inputs are whole steps in -1..=1. Accelerations apply once per
//! tick; drag and movement scale with elapsed time.

use super::bullet;
use super::{Contact, Entity, EntityKind, EntityTag};
use crate::renderer::{Sprite, Surface, SurfaceError};
use crate::sim::{Collision, Dimensions, Point, Vector2};

pub const ROTATION_ACCELERATION: f32 = 40.0;
pub const ROTATION_DRAG: f32 = 20.0;
pub const ROTATION_MAX: f32 = 80.0;
pub const MOVEMENT_ACCELERATION: Vector2 = Vector2::new(0.0, 20.0);
pub const MOVEMENT_DRAG: f32 = 20.0;
pub const MOVEMENT_MAX: f32 = 200.0;

pub const BULLET_VELOCITY: Vector2 = Vector2::UP.scale(256.0);
/// Muzzle position relative to the ship, before rotation
pub const BULLET_OFFSET: Vector2 = Vector2::UP.scale(40.0);
/// Seconds between shots
pub const SHOOT_DELAY: f32 = 0.125;

/// Seconds of invulnerability after (re)spawning
pub const GRACE_PERIOD: f32 = 5.0;
pub const COLLISION_RADIUS: f32 = 25.0;
pub const SPRITE_SCALE: f32 = 0.35;
/// How far off-screen the ship travels before wrapping around
pub const WRAP_MARGIN: f32 = 40.0;

#[derive(Debug, Clone)]
pub struct Player {
    /// -1 accelerates forward, 1 backward
    acceleration: i8,
    /// -1 turns left, 1 turns right
    rotation_acceleration: i8,
    rotation_velocity: f32,
    shoot_timer: f32,
    lifetime: f32,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            acceleration: 0,
            rotation_acceleration: 0,
            rotation_velocity: 0.0,
            // First shot is available immediately
            shoot_timer: SHOOT_DELAY,
            lifetime: 0.0,
        }
    }
}

fn step(input: f32) -> i8 {
    if input.is_nan() {
        return 0;
    }
    input.floor().clamp(-1.0, 1.0) as i8
}

impl Player {
    pub fn acceleration(&self) -> i8 {
        self.acceleration
    }

    pub fn set_acceleration(&mut self, input: f32) {
        self.acceleration = step(input);
    }

    pub fn rotation_acceleration(&self) -> i8 {
        self.rotation_acceleration
    }

    pub fn set_rotation_acceleration(&mut self, input: f32) {
        self.rotation_acceleration = step(input);
    }

    pub fn rotation_velocity(&self) -> f32 {
        self.rotation_velocity
    }

    /// Seconds since spawn or last death
    pub fn lifetime(&self) -> f32 {
        self.lifetime
    }

    pub fn is_invulnerable(&self) -> bool {
        self.lifetime <= GRACE_PERIOD
    }
}

/// Create the ship at `position`, facing up
pub fn player(sprite: Sprite, position: Point) -> Entity {
    Entity::new(EntityKind::Player(Player::default()))
        .at(position)
        .with_velocity(Vector2::ZERO)
        .with_collision(Collision::centered(COLLISION_RADIUS))
        .with_sprite(sprite)
}

/// Move `value` toward zero by `amount` without crossing it
fn drag(value: f32, amount: f32) -> f32 {
    if value > 0.0 {
        (value - amount).max(0.0)
    } else if value < 0.0 {
        (value + amount).min(0.0)
    } else {
        0.0
    }
}

fn wrap(value: f32, extent: f32) -> f32 {
    if value < -WRAP_MARGIN {
        extent + WRAP_MARGIN
    } else if value > extent + WRAP_MARGIN {
        -WRAP_MARGIN
    } else {
        value
    }
}

pub(super) fn think(entity: &mut Entity, bounds: Dimensions, delta: f32) {
    let rotation = entity.rotation;
    let velocity = entity.velocity.get_or_insert(Vector2::ZERO);
    let EntityKind::Player(player) = &mut entity.kind else {
        return;
    };

    player.shoot_timer += delta;
    player.lifetime += delta;

    if player.rotation_velocity.abs() < ROTATION_MAX {
        player.rotation_velocity += ROTATION_ACCELERATION * f32::from(player.rotation_acceleration);
    }
    if velocity.length() < MOVEMENT_MAX {
        *velocity += MOVEMENT_ACCELERATION.rotate(rotation) * f32::from(player.acceleration);
    }

    // Drag only acts on axes without input
    if player.rotation_acceleration == 0 {
        player.rotation_velocity = drag(player.rotation_velocity, ROTATION_DRAG * delta);
    }
    if player.acceleration == 0 {
        velocity.x = drag(velocity.x, MOVEMENT_DRAG * delta);
        velocity.y = drag(velocity.y, MOVEMENT_DRAG * delta);
    }

    entity.rotation += player.rotation_velocity * delta;
    entity.integrate(delta);

    entity.position.x = wrap(entity.position.x, bounds.width);
    entity.position.y = wrap(entity.position.y, bounds.height);
}

pub(super) fn on_collide(entity: &mut Entity, other: &Contact) {
    if other.tag != EntityTag::Asteroid {
        return;
    }
    let Some(player) = entity.as_player_mut() else {
        return;
    };
    if player.is_invulnerable() {
        return;
    }
    player.lifetime = 0.0;
    entity.kill();
}

pub(super) fn shoot(entity: &mut Entity) -> Option<Entity> {
    if entity.is_dead() {
        return None;
    }
    let rotation = entity.rotation;
    let position = entity.position;
    let player = entity.as_player_mut()?;
    if player.shoot_timer < SHOOT_DELAY {
        return None;
    }
    player.shoot_timer = 0.0;

    Some(
        bullet::bullet(position + BULLET_OFFSET.rotate(rotation), rotation)
            .with_velocity(BULLET_VELOCITY.rotate(rotation)),
    )
}

pub(super) fn draw(
    player: &Player,
    sprite: Option<&Sprite>,
    surface: &mut Surface,
) -> Result<(), SurfaceError> {
    if player.is_invulnerable() {
        // Blink while the grace period lasts
        let blink = (0.5 - player.lifetime % 1.0).abs();
        surface.update_fill(|c| c.scale_alpha(blink));
    }
    match sprite {
        Some(sprite) => sprite.draw(surface, SPRITE_SCALE),
        None => Ok(()),
    }
}
