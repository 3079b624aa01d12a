//! Bullets fired by the player

use super::{Contact, Entity, EntityKind, EntityTag};
use crate::renderer::{Surface, SurfaceError};
use crate::sim::{Collision, Dimensions, Point};

pub const BULLET_RADIUS: f32 = 10.0;
/// Length of the drawn tracer
pub const TRACER_LENGTH: f32 = 10.0;
/// Distance past the screen edge at which a bullet is discarded
pub const DESPAWN_MARGIN: f32 = 20.0;

/// Create a bullet at `position` heading along `rotation` (degrees)
pub fn bullet(position: Point, rotation: f32) -> Entity {
    Entity::new(EntityKind::Bullet)
        .at(position)
        .with_rotation(rotation)
        .with_collision(Collision::centered(BULLET_RADIUS))
}

pub(super) fn think(entity: &mut Entity, bounds: Dimensions, delta: f32) {
    entity.integrate(delta);
    if !bounds.contains_with_margin(entity.position, DESPAWN_MARGIN) {
        entity.kill();
    }
}

pub(super) fn on_collide(entity: &mut Entity, other: &Contact) {
    if other.tag == EntityTag::Asteroid {
        entity.kill();
    }
}

pub(super) fn draw(surface: &mut Surface) -> Result<(), SurfaceError> {
    surface.start_path()?;
    surface.add_point(Point::ORIGIN)?;
    surface.add_point(Point::new(0.0, TRACER_LENGTH))?;
    surface.stroke_path()
}
