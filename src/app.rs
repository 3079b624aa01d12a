//! Application shell
//!
//! [`Context`] is the state scenes share: input, persisted data, settings,
//! randomness and the asset loader. [`App`] ties it to a runner and a surface
//! and routes host events (ticks, resizes, key presses) into them.

use std::rc::Rc;

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::highscores::Leaderboard;
use crate::persistence::{MemoryStorage, Storage};
use crate::platform::{CheatCode, Keyboard};
use crate::renderer::{PlaceholderLoader, SpriteLoader, Surface};
use crate::scenes::{self, AsteroidsScene};
use crate::settings::Settings;
use crate::sim::{Dimensions, FadeTransition, RunState, Runner, RunnerError, SceneId};

/// Shared state handed to every scene
pub struct Context {
    pub keyboard: Keyboard,
    pub leaderboard: Leaderboard,
    pub settings: Settings,
    pub rng: Pcg32,
    pub storage: Box<dyn Storage>,
    pub loader: Rc<dyn SpriteLoader>,
}

impl Context {
    /// Load settings and scores from `storage`
    pub fn new(storage: Box<dyn Storage>, loader: Rc<dyn SpriteLoader>, seed: u64) -> Self {
        let settings = Settings::load(storage.as_ref());
        let leaderboard = Leaderboard::load(storage.as_ref());
        Self {
            keyboard: Keyboard::new(),
            leaderboard,
            settings,
            rng: Pcg32::seed_from_u64(seed),
            storage,
            loader,
        }
    }

    /// In-memory storage and placeholder sprites
    pub fn headless(seed: u64) -> Self {
        Self::new(
            Box::new(MemoryStorage::new()),
            Rc::new(PlaceholderLoader::default()),
            seed,
        )
    }
}

pub struct App {
    runner: Runner,
    surface: Surface,
    ctx: Context,
    cheat: CheatCode,
}

impl App {
    /// Set up the runner with the configured background scene
    pub fn new(ctx: Context, surface: Surface) -> Self {
        let mut runner = Runner::new();
        if let Err(e) = runner.set_tick_rate(ctx.settings.tick_rate) {
            log::warn!("Keeping default tick rate: {}", e);
        }
        runner.switch_scene(scenes::ambient(&ctx), None);
        Self {
            runner,
            surface,
            ctx,
            cheat: CheatCode::default(),
        }
    }

    pub fn start(&mut self) -> Result<(), RunnerError> {
        self.runner.start()
    }

    pub fn stop(&mut self) -> Result<(), RunnerError> {
        self.runner.stop()
    }

    /// Pause a running app, resume a paused one
    pub fn toggle_pause(&mut self) -> Result<(), RunnerError> {
        match self.runner.state() {
            RunState::Paused => self.runner.resume(),
            _ => self.runner.pause(),
        }
    }

    /// Advance to wall time `now` (seconds). Returns the delay before the
    /// next call, or `None` once stopped.
    pub fn tick(&mut self, now: f64) -> Option<f64> {
        match self.runner.tick(&mut self.ctx, &mut self.surface, now) {
            Ok(next) => next,
            Err(e) => {
                log::error!("Tick failed: {}", e);
                self.runner.is_running().then(|| self.runner.interval())
            }
        }
    }

    /// Apply a new viewport size; degenerate sizes are ignored
    pub fn resize(&mut self, bounds: Dimensions) -> bool {
        self.surface.set_bounds(bounds)
    }

    pub fn key_down(&mut self, code: u32) {
        self.ctx.keyboard.key_down(code);

        if self.minigame_active() {
            return;
        }
        if self.cheat.feed(code) {
            log::info!("Well, you found me. Congratulations.");
            let scene = AsteroidsScene::new(self.ctx.loader.as_ref());
            let fade = FadeTransition::new(self.ctx.settings.transition_seconds);
            self.runner.switch_scene(Box::new(scene), Some(Box::new(fade)));
        }
    }

    pub fn key_up(&mut self, code: u32) {
        self.ctx.keyboard.key_up(code);
    }

    /// Release every key, e.g. when the page loses focus
    pub fn release_keys(&mut self) {
        self.ctx.keyboard.release_all();
    }

    /// Whether the minigame is showing or fading in
    pub fn minigame_active(&self) -> bool {
        self.runner.scene_id() == Some(SceneId::Asteroids)
            || self.runner.target_id() == Some(SceneId::Asteroids)
    }

    pub fn runner(&self) -> &Runner {
        &self.runner
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.ctx
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }
}
