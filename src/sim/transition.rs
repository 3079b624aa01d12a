//! Scene transitions
//!
//! A transition owns the frame while a scene switch is in flight: it is given
//! both scenes and decides how to draw them.

use super::scene::Scene;
use crate::Context;
use crate::renderer::{Surface, SurfaceError};

/// Time-bounded blend between two scenes
pub trait Transition {
    /// Draw one frame of the blend. Returns `true` once the transition is
    /// complete and `to` should become the active scene.
    fn draw(
        &mut self,
        surface: &mut Surface,
        ctx: &Context,
        delta: f32,
        from: &dyn Scene,
        to: &dyn Scene,
    ) -> Result<bool, SurfaceError>;
}

/// Linear cross-fade: `from` fades out while `to` fades in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeTransition {
    duration: f32,
    elapsed: f32,
}

impl FadeTransition {
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            elapsed: 0.0,
        }
    }

    /// Fraction of the fade completed, in [0, 1]
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }
}

fn draw_faded(
    surface: &mut Surface,
    ctx: &Context,
    delta: f32,
    scene: &dyn Scene,
    factor: f32,
) -> Result<(), SurfaceError> {
    surface.isolate(|surface| {
        surface.update_fill(|c| c.scale_alpha(factor));
        surface.update_stroke(|c| c.scale_alpha(factor));
        surface.isolate(|surface| scene.draw(surface, ctx, delta))
    })
}

impl Transition for FadeTransition {
    fn draw(
        &mut self,
        surface: &mut Surface,
        ctx: &Context,
        delta: f32,
        from: &dyn Scene,
        to: &dyn Scene,
    ) -> Result<bool, SurfaceError> {
        self.elapsed += delta;
        let progress = self.progress();

        draw_faded(surface, ctx, delta, from, 1.0 - progress)?;
        draw_faded(surface, ctx, delta, to, progress)?;

        if self.elapsed >= self.duration {
            self.elapsed = 0.0;
            return Ok(true);
        }
        Ok(false)
    }
}
