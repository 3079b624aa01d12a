//! Decorative entities: drifting triangles, legacy lines and the controls hint

use rand::Rng;

use super::{Entity, EntityKind};
use crate::renderer::{Sprite, Surface, SurfaceError};
use crate::sim::{Dimensions, Point, Vector2};

/// Seconds a triangle takes to fade in
pub const TRIANGLE_FADE_IN: f32 = 5.0;
/// Peak triangle stroke alpha (0-255)
pub const TRIANGLE_ALPHA: f32 = 160.0;
pub const TRIANGLE_SPEED: f32 = 8.0;

/// Seconds a line takes to fade in and out
pub const LINE_FADE: f32 = 5.0;
pub const LINE_SPEED: f32 = 10.0;
pub const LINE_MARGIN: f32 = 100.0;
/// Line health range in seconds
pub const LINE_HEALTH_MIN: f32 = 20.0;
pub const LINE_HEALTH_MAX: f32 = 60.0;

pub const CONTROLS_SCALE: f32 = 0.1;
/// Seconds before the controls hint starts fading
pub const CONTROLS_FADE_START: f32 = 5.0;
pub const CONTROLS_LIFETIME: f32 = 10.0;

// === Triangle ===

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub scale: f32,
    lifetime: f32,
}

impl Triangle {
    pub fn lifetime(&self) -> f32 {
        self.lifetime
    }

    /// Stroke alpha multiplier in [0, 1]
    pub fn visibility(&self) -> f32 {
        (self.lifetime / TRIANGLE_FADE_IN).min(1.0) * (TRIANGLE_ALPHA / 255.0)
    }
}

/// Random triangle at `position` drifting slowly in any direction
pub fn triangle(position: Point, rng: &mut impl Rng) -> Entity {
    let scale = rng.random::<f32>().max(0.25) * 2.0;
    let velocity = Vector2::random(rng) * TRIANGLE_SPEED
        + Vector2::new(-TRIANGLE_SPEED / 2.0, -TRIANGLE_SPEED / 2.0);
    Entity::new(EntityKind::Triangle(Triangle {
        scale,
        lifetime: 0.0,
    }))
    .at(position)
    .with_rotation(rng.random::<f32>() * 360.0)
    .with_velocity(velocity)
}

pub(super) fn think_triangle(entity: &mut Entity, bounds: Dimensions, delta: f32) {
    let EntityKind::Triangle(triangle) = &mut entity.kind else {
        return;
    };
    triangle.lifetime += delta;
    let margin = triangle.scale * 100.0;
    entity.integrate(delta);
    if !bounds.contains_with_margin(entity.position, margin) {
        entity.kill();
    }
}

pub(super) fn draw_triangle(triangle: &Triangle, surface: &mut Surface) -> Result<(), SurfaceError> {
    let s = triangle.scale;
    let visibility = triangle.visibility();
    surface.update_stroke(|c| c.scale_alpha(visibility));
    surface.start_path()?;
    surface.add_point(Point::ORIGIN)?;
    surface.add_point(Point::new(-100.0 * s, -80.0 * s))?;
    surface.add_point(Point::new(100.0 * s, -80.0 * s))?;
    surface.add_point(Point::ORIGIN)?;
    surface.stroke_path()
}

// === Line ===

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub size: f32,
    lifetime: f32,
    /// Remaining seconds
    health: f32,
}

impl Line {
    pub fn exhausted(&self) -> bool {
        self.health <= 0.0
    }

    /// Fades in over the first seconds and out over the last ones
    pub fn visibility(&self) -> f32 {
        if self.lifetime < LINE_FADE {
            return self.lifetime / LINE_FADE;
        }
        (self.health / LINE_FADE).clamp(0.0, 1.0)
    }
}

/// Random line somewhere within `bounds`
pub fn line(bounds: Dimensions, rng: &mut impl Rng) -> Entity {
    let position = Vector2::random(rng).multiply_by(bounds.end()).to_point();
    let rotation = rng.random::<f32>() * 720.0;
    let velocity = Vector2::random(rng) * LINE_SPEED;
    let health = rng.random_range(LINE_HEALTH_MIN..LINE_HEALTH_MAX);
    let size = rng.random::<f32>().max(0.25);
    Entity::new(EntityKind::Line(Line {
        size,
        lifetime: 0.0,
        health,
    }))
    .at(position)
    .with_rotation(rotation)
    .with_velocity(velocity)
}

pub(super) fn think_line(entity: &mut Entity, bounds: Dimensions, delta: f32) {
    entity.integrate(delta);
    let outside = !bounds.contains_with_margin(entity.position, LINE_MARGIN);
    let EntityKind::Line(line) = &mut entity.kind else {
        return;
    };
    line.lifetime += delta;
    line.health -= delta;
    if outside {
        line.health = 0.0;
    }
}

pub(super) fn draw_line(line: &Line, surface: &mut Surface) -> Result<(), SurfaceError> {
    let s = line.size;
    let visibility = line.visibility();
    surface.update_stroke(|c| c.scale_alpha(visibility));
    let top = Point::new(0.0, 80.0 * s);
    surface.start_path()?;
    surface.add_point(top)?;
    surface.add_point(Point::new(-100.0 * s, 0.0))?;
    surface.add_point(Point::new(80.0 * s, 0.0))?;
    surface.add_point(top)?;
    surface.stroke_path()
}

// === Controls hint ===

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Controls {
    lifetime: f32,
}

impl Controls {
    pub fn expired(&self) -> bool {
        self.lifetime >= CONTROLS_LIFETIME
    }

    pub fn opacity(&self) -> f32 {
        if self.lifetime < CONTROLS_FADE_START {
            return 1.0;
        }
        let fade = CONTROLS_LIFETIME - CONTROLS_FADE_START;
        1.0 - ((self.lifetime - CONTROLS_FADE_START) / fade).min(1.0)
    }
}

/// Controls hint anchored to the bottom center of `bounds`
pub fn controls(sprite: Sprite, bounds: Dimensions) -> Entity {
    let sprite = sprite.with_pivot(Point::new(0.5, 1.0));
    let y = bounds.height - sprite.bounds().height * CONTROLS_SCALE;
    Entity::new(EntityKind::Controls(Controls::default()))
        .at(Point::new(bounds.width / 2.0, y))
        .with_sprite(sprite)
}

pub(super) fn think_controls(entity: &mut Entity, delta: f32) {
    if let EntityKind::Controls(controls) = &mut entity.kind {
        controls.lifetime += delta;
    }
}

pub(super) fn draw_controls(
    controls: &Controls,
    sprite: Option<&Sprite>,
    surface: &mut Surface,
) -> Result<(), SurfaceError> {
    let opacity = controls.opacity();
    surface.update_fill(|c| c.scale_alpha(opacity));
    match sprite {
        Some(sprite) => sprite.draw(surface, CONTROLS_SCALE),
        None => Ok(()),
    }
}
