//! Simulation module
//!
//! Value types, entities, scenes and the fixed-tick runner. Nothing here
//! touches the browser; rendering goes through [`crate::renderer::Surface`].
//! - Entities are updated and drawn in spawn order
//! - Seeded RNG only (via [`crate::Context`])
//! - Entities are removed only during a scene's think sweep

pub mod collision;
pub mod color;
pub mod dimensions;
pub mod entity;
pub mod runner;
pub mod scene;
pub mod transition;
pub mod vector;

pub use collision::{Collision, circles_overlap};
pub use color::{Color, ColorError};
pub use dimensions::{Dimensions, Guarded};
pub use entity::{Entity, EntityEvent, EntityId, EntityKind, EntityTag, ThinkContext};
pub use runner::{RunState, Runner, RunnerError};
pub use scene::{EntityScene, Scene, SceneError, SceneId, SceneSwitch};
pub use transition::{FadeTransition, Transition};
pub use vector::{Point, Vector2};
