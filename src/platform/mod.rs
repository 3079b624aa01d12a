//! Platform abstraction layer
//!
//! Handles browser/native differences for input and window size. Key events
//! arrive as platform key codes from the host (DOM `keydown`/`keyup` on the
//! web, scripted in tests and the native demo).

pub mod input;
pub mod viewport;

pub use input::{CHEAT_CODE, CheatCode, Keyboard, keys};
pub use viewport::viewport;
