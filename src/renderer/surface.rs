//! Drawing surface with a scoped state stack
//!
//! The surface wraps a [`Backend`] (the actual render target) and keeps its
//! own stack of revert operations instead of relying on the target's native
//! save/restore. Every transform or color change made inside a pushed scope
//! records its inverse; `pop` replays those inverses in reverse order. Changes
//! made at root scope are permanent for the session.

use glam::{Affine2, Vec2};

use super::sprite::SpriteImage;
use crate::sim::{Color, Dimensions, Guarded, Point, Vector2};
use crate::to_radians;

/// Surface usage errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    #[error("cannot pop: scope stack is empty")]
    EmptyScopeStack,

    #[error("a path is already active")]
    PathAlreadyOpen,

    #[error("no active path")]
    NoOpenPath,

    #[error("isolated drawing popped a scope it did not push")]
    ScopeUnderflow,
}

/// Horizontal text alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

impl TextAlign {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
    }
}

/// Primitive operations of an actual render target.
///
/// Coordinates are relative to the target's current transform, which the
/// surface drives through `translate`/`rotate`.
pub trait Backend {
    fn resize(&mut self, bounds: Dimensions);
    fn clear(&mut self, bounds: Dimensions);
    fn translate(&mut self, offset: Vector2);
    fn rotate(&mut self, radians: f32);
    fn set_fill(&mut self, color: Color);
    fn set_stroke(&mut self, color: Color);
    /// Stroke a closed path through `points` in the given order
    fn stroke_path(&mut self, points: &[Point]);
    /// Fill a closed path through `points` in the given order
    fn fill_path(&mut self, points: &[Point]);
    /// Stroke a circle centered on the current origin
    fn circle(&mut self, radius: f32, thickness: f32);
    /// Stroke a line from the current origin to `to`
    fn line(&mut self, to: Point, thickness: f32);
    fn text(&mut self, text: &str, font: &str, align: TextAlign);
    /// Draw an image with its top-left corner on the current origin
    fn image(&mut self, image: &SpriteImage, size: Dimensions, opacity: f32);
}

/// Inverse of a change made inside a scope
#[derive(Debug, Clone, Copy)]
enum Revert {
    Translate(Vector2),
    Rotate(f32),
    Fill(Color),
    Stroke(Color),
}

/// The drawing abstraction entities and scenes render through
pub struct Surface {
    backend: Box<dyn Backend>,
    bounds: Guarded<Dimensions>,
    fill: Color,
    stroke: Color,
    scopes: Vec<Vec<Revert>>,
    path: Option<Vec<Point>>,
    /// Mirror of the backend's accumulated transform
    transform: Affine2,
}

impl Surface {
    pub fn new(mut backend: Box<dyn Backend>, bounds: Dimensions) -> Self {
        backend.resize(bounds);
        backend.set_fill(Color::BLACK);
        backend.set_stroke(Color::BLACK);
        Self {
            backend,
            bounds: Guarded::with_validator(bounds, |d: &Dimensions| {
                d.width.is_finite() && d.height.is_finite() && d.width > 0.0 && d.height > 0.0
            }),
            fill: Color::BLACK,
            stroke: Color::BLACK,
            scopes: Vec::new(),
            path: None,
            transform: Affine2::IDENTITY,
        }
    }

    // === Bounds ===

    pub fn bounds(&self) -> Dimensions {
        self.bounds.get()
    }

    pub fn center(&self) -> Point {
        self.bounds.get().center()
    }

    /// Resize the render target. Non-positive or non-finite sizes are rejected.
    pub fn set_bounds(&mut self, bounds: Dimensions) -> bool {
        let previous = self.bounds.get();
        if !self.bounds.update(bounds) {
            log::warn!("Rejected surface resize to {}", bounds);
            return false;
        }
        if previous != bounds {
            self.backend.resize(bounds);
            self.restore_target_state();
            log::info!("Synchronized surface size with the new window dimensions ({})", bounds);
        }
        true
    }

    pub fn clear(&mut self) {
        self.backend.clear(self.bounds.get());
    }

    /// Replay colors and transform onto a target whose resize reset them
    fn restore_target_state(&mut self) {
        self.backend.set_fill(self.fill);
        self.backend.set_stroke(self.stroke);
        if self.transform != Affine2::IDENTITY {
            // Translations and rotations compose into translate-then-rotate
            let axis = self.transform.matrix2.x_axis;
            self.backend.translate(Vector2::from(self.transform.translation));
            self.backend.rotate(axis.y.atan2(axis.x));
        }
    }

    // === Scope stack ===

    pub fn push(&mut self) {
        self.scopes.push(Vec::new());
    }

    /// Revert every change recorded since the matching `push`
    pub fn pop(&mut self) -> Result<(), SurfaceError> {
        let reverts = self.scopes.pop().ok_or(SurfaceError::EmptyScopeStack)?;
        for revert in reverts.into_iter().rev() {
            self.apply(revert);
        }
        Ok(())
    }

    /// Run `func` inside its own scope.
    ///
    /// State is restored even if `func` fails or leaves nested scopes open.
    pub fn isolate<R>(
        &mut self,
        func: impl FnOnce(&mut Self) -> Result<R, SurfaceError>,
    ) -> Result<R, SurfaceError> {
        self.push();
        let depth = self.scopes.len();
        let result = func(self);

        if self.scopes.len() < depth {
            return result.and(Err(SurfaceError::ScopeUnderflow));
        }
        if self.scopes.len() > depth {
            log::warn!(
                "Isolated drawing left {} scope(s) open",
                self.scopes.len() - depth
            );
        }
        while self.scopes.len() >= depth {
            self.pop()?;
        }
        result
    }

    pub fn is_root_scope(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Pop every open scope. Returns how many were left over.
    pub fn unwind(&mut self) -> usize {
        let open = self.scopes.len();
        while self.pop().is_ok() {}
        open
    }

    // === Transform ===

    pub fn translate(&mut self, offset: Vector2) {
        self.apply(Revert::Translate(offset));
        self.record(Revert::Translate(-offset));
    }

    /// Rotate by `degrees` about the current origin
    pub fn rotate(&mut self, degrees: f32) {
        self.apply(Revert::Rotate(degrees));
        self.record(Revert::Rotate(-degrees));
    }

    /// Accumulated transform (surface space to target space)
    pub fn transform(&self) -> Affine2 {
        self.transform
    }

    /// Where the current origin lands on the target
    pub fn origin(&self) -> Point {
        let p = self.transform.transform_point2(Vec2::ZERO);
        Point::new(p.x, p.y)
    }

    // === Colors ===

    pub fn fill_color(&self) -> Color {
        self.fill
    }

    pub fn stroke_color(&self) -> Color {
        self.stroke
    }

    /// Set fill and stroke together
    pub fn color(&mut self, color: Color) {
        self.set_fill_color(color);
        self.set_stroke_color(color);
    }

    pub fn set_fill_color(&mut self, color: Color) {
        if color != self.fill {
            self.record(Revert::Fill(self.fill));
            self.apply(Revert::Fill(color));
        }
    }

    pub fn set_stroke_color(&mut self, color: Color) {
        if color != self.stroke {
            self.record(Revert::Stroke(self.stroke));
            self.apply(Revert::Stroke(color));
        }
    }

    /// Derive a new fill color from the current one
    pub fn update_fill(&mut self, update: impl FnOnce(Color) -> Color) {
        let color = update(self.fill);
        self.set_fill_color(color);
    }

    /// Derive a new stroke color from the current one
    pub fn update_stroke(&mut self, update: impl FnOnce(Color) -> Color) {
        let color = update(self.stroke);
        self.set_stroke_color(color);
    }

    // === Paths ===

    /// Begin accumulating points. Only one path may be open at a time.
    pub fn start_path(&mut self) -> Result<(), SurfaceError> {
        if self.path.is_some() {
            return Err(SurfaceError::PathAlreadyOpen);
        }
        self.path = Some(Vec::new());
        Ok(())
    }

    pub fn add_point(&mut self, point: Point) -> Result<(), SurfaceError> {
        self.path
            .as_mut()
            .ok_or(SurfaceError::NoOpenPath)?
            .push(point);
        Ok(())
    }

    /// Discard the open path, if any
    pub fn clear_path(&mut self) {
        self.path = None;
    }

    pub fn stroke_path(&mut self) -> Result<(), SurfaceError> {
        let points = self.take_path()?;
        self.backend.stroke_path(&points);
        Ok(())
    }

    pub fn fill_path(&mut self) -> Result<(), SurfaceError> {
        let points = self.take_path()?;
        self.backend.fill_path(&points);
        Ok(())
    }

    /// Close the open path; points come out last-added first
    fn take_path(&mut self) -> Result<Vec<Point>, SurfaceError> {
        let mut points = self.path.take().ok_or(SurfaceError::NoOpenPath)?;
        points.reverse();
        Ok(points)
    }

    // === Primitives ===

    pub fn draw_circle(&mut self, radius: f32, thickness: f32) {
        self.backend.circle(radius, thickness);
    }

    pub fn draw_line(&mut self, to: Point, thickness: f32) {
        self.backend.line(to, thickness);
    }

    pub fn draw_text(&mut self, text: &str, font: &str, align: TextAlign) {
        self.backend.text(text, font, align);
    }

    /// Draw an image at the current origin, using the fill alpha as opacity
    pub fn draw_image(&mut self, image: &SpriteImage, size: Dimensions) {
        let opacity = self.fill.opacity();
        self.backend.image(image, size, opacity);
    }

    // === Internals ===

    /// Register an inverse operation with the innermost scope
    fn record(&mut self, revert: Revert) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.push(revert);
        }
    }

    /// Perform an operation without recording it
    fn apply(&mut self, op: Revert) {
        match op {
            Revert::Translate(offset) => {
                self.backend.translate(offset);
                self.transform = self.transform * Affine2::from_translation(offset.into());
            }
            Revert::Rotate(degrees) => {
                let radians = to_radians(degrees);
                self.backend.rotate(radians);
                self.transform = self.transform * Affine2::from_angle(radians);
            }
            Revert::Fill(color) => {
                self.fill = color;
                self.backend.set_fill(color);
            }
            Revert::Stroke(color) => {
                self.stroke = color;
                self.backend.set_stroke(color);
            }
        }
    }
}
