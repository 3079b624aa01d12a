//! Rendering module
//!
//! Entities and scenes draw through a [`Surface`], which owns the scoped
//! transform/color stack and forwards primitives to a [`Backend`]: the HTML
//! canvas on the web, a recorder everywhere else.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod recording;
pub mod sprite;
pub mod surface;

#[cfg(target_arch = "wasm32")]
pub use canvas::{CanvasBackend, ImageLoader, create_sprite};
pub use recording::{DrawOp, ImageRecord, Recording, RecordingBackend};
pub use sprite::{AssetError, PlaceholderLoader, Sprite, SpriteCallback, SpriteImage, SpriteLoader};
pub use surface::{Backend, Surface, SurfaceError, TextAlign};
