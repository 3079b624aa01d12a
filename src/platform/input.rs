//! Keyboard state and key sequence matching

use std::collections::HashSet;

/// DOM key codes used by the scenes
pub mod keys {
    pub const BACKSPACE: u32 = 8;
    pub const ENTER: u32 = 13;
    pub const SPACE: u32 = 32;
    pub const LEFT: u32 = 37;
    pub const UP: u32 = 38;
    pub const RIGHT: u32 = 39;
    pub const DOWN: u32 = 40;
    pub const A: u32 = 65;
    pub const B: u32 = 66;
    pub const Z: u32 = 90;
}

/// Up up down down left right left right B A Enter
pub const CHEAT_CODE: [u32; 11] = [
    keys::UP,
    keys::UP,
    keys::DOWN,
    keys::DOWN,
    keys::LEFT,
    keys::RIGHT,
    keys::LEFT,
    keys::RIGHT,
    keys::B,
    keys::A,
    keys::ENTER,
];

/// Which keys are currently held
#[derive(Debug, Clone, Default)]
pub struct Keyboard {
    pressed: HashSet<u32>,
}

impl Keyboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, code: u32) {
        self.pressed.insert(code);
    }

    pub fn key_up(&mut self, code: u32) {
        self.pressed.remove(&code);
    }

    pub fn is_pressed(&self, code: u32) -> bool {
        self.pressed.contains(&code)
    }

    /// Release everything (focus loss)
    pub fn release_all(&mut self) {
        self.pressed.clear();
    }
}

/// Matches a fixed key sequence typed one key at a time
#[derive(Debug, Clone)]
pub struct CheatCode {
    sequence: Vec<u32>,
    progress: usize,
}

impl Default for CheatCode {
    fn default() -> Self {
        Self::new(&CHEAT_CODE)
    }
}

impl CheatCode {
    pub fn new(sequence: &[u32]) -> Self {
        Self {
            sequence: sequence.to_vec(),
            progress: 0,
        }
    }

    /// Keys matched so far
    pub fn progress(&self) -> usize {
        self.progress
    }

    /// Feed one key press. Returns `true` when the sequence completes; any
    /// wrong key resets progress to zero.
    pub fn feed(&mut self, code: u32) -> bool {
        if self.sequence.get(self.progress) != Some(&code) {
            if self.progress > 0 {
                log::info!("What was that? I did not quite understand you ...");
            }
            self.progress = 0;
            return false;
        }

        self.progress += 1;
        if self.progress >= self.sequence.len() {
            self.progress = 0;
            return true;
        }
        false
    }

    pub fn reset(&mut self) {
        self.progress = 0;
    }
}
