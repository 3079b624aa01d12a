//! Fixed-tick runner
//!
//! Owns the active scene, an in-flight scene switch and the tick schedule.
//! The host calls [`Runner::tick`] with a wall-clock timestamp and schedules
//! the next call after the returned delay.

use super::scene::{Scene, SceneId, SceneSwitch};
use super::transition::Transition;
use crate::Context;
use crate::consts::{BOOTSTRAP_DELTA, CATCH_UP_THRESHOLD, DEFAULT_TICK_RATE, MAX_CATCH_UP_TICKS};
use crate::renderer::{Surface, SurfaceError};

/// Invalid runner state transitions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RunnerError {
    #[error("already in running state")]
    AlreadyRunning,

    #[error("already stopped")]
    AlreadyStopped,

    #[error("not running")]
    NotRunning,

    #[error("already paused")]
    AlreadyPaused,

    #[error("not paused")]
    NotPaused,

    #[error("cannot change tick rate while running")]
    TickRateWhileRunning,

    #[error("tick rate must be positive")]
    InvalidTickRate,

    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Stopped,
    Running,
    /// Running, drawing, but not thinking
    Paused,
}

struct PendingSwitch {
    scene: Box<dyn Scene>,
    transition: Box<dyn Transition>,
}

pub struct Runner {
    tick_rate: u32,
    state: RunState,
    /// Timestamp (seconds) of the previous tick
    last_update: Option<f64>,
    scene: Option<Box<dyn Scene>>,
    pending: Option<PendingSwitch>,
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

impl Runner {
    pub fn new() -> Self {
        Self {
            tick_rate: DEFAULT_TICK_RATE,
            state: RunState::Stopped,
            last_update: None,
            scene: None,
            pending: None,
        }
    }

    // === State ===

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state != RunState::Stopped
    }

    pub fn is_paused(&self) -> bool {
        self.state == RunState::Paused
    }

    pub fn start(&mut self) -> Result<(), RunnerError> {
        if self.is_running() {
            return Err(RunnerError::AlreadyRunning);
        }
        self.state = RunState::Running;
        self.last_update = None;
        log::info!("Runner started at {} ticks/s", self.tick_rate);
        Ok(())
    }

    pub fn stop(&mut self) -> Result<(), RunnerError> {
        if !self.is_running() {
            return Err(RunnerError::AlreadyStopped);
        }
        self.state = RunState::Stopped;
        log::info!("Runner stopped");
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), RunnerError> {
        match self.state {
            RunState::Stopped => Err(RunnerError::NotRunning),
            RunState::Paused => Err(RunnerError::AlreadyPaused),
            RunState::Running => {
                self.state = RunState::Paused;
                Ok(())
            }
        }
    }

    pub fn resume(&mut self) -> Result<(), RunnerError> {
        match self.state {
            RunState::Stopped => Err(RunnerError::NotRunning),
            RunState::Running => Err(RunnerError::NotPaused),
            RunState::Paused => {
                self.state = RunState::Running;
                Ok(())
            }
        }
    }

    pub fn tick_rate(&self) -> u32 {
        self.tick_rate
    }

    pub fn set_tick_rate(&mut self, rate: u32) -> Result<(), RunnerError> {
        if self.is_running() {
            return Err(RunnerError::TickRateWhileRunning);
        }
        if rate == 0 {
            return Err(RunnerError::InvalidTickRate);
        }
        self.tick_rate = rate;
        Ok(())
    }

    /// Seconds between ticks
    pub fn interval(&self) -> f64 {
        1.0 / f64::from(self.tick_rate)
    }

    // === Scenes ===

    pub fn scene(&self) -> Option<&dyn Scene> {
        self.scene.as_deref()
    }

    pub fn scene_id(&self) -> Option<SceneId> {
        self.scene.as_ref().map(|s| s.id())
    }

    /// Scene a running transition is heading to
    pub fn target_id(&self) -> Option<SceneId> {
        self.pending.as_ref().map(|p| p.scene.id())
    }

    pub fn in_transition(&self) -> bool {
        self.pending.is_some()
    }

    /// Replace the active scene, immediately or through a transition.
    ///
    /// A new switch supersedes one still in flight. Without an active scene
    /// there is nothing to blend from, so the switch is immediate.
    pub fn switch_scene(&mut self, scene: Box<dyn Scene>, transition: Option<Box<dyn Transition>>) {
        match transition {
            Some(transition) if self.scene.is_some() => {
                log::info!("Switching to {:?} with transition", scene.id());
                self.pending = Some(PendingSwitch { scene, transition });
            }
            _ => {
                log::info!("Switching to {:?}", scene.id());
                self.pending = None;
                self.scene = Some(scene);
            }
        }
    }

    pub fn apply(&mut self, switch: SceneSwitch) {
        self.switch_scene(switch.scene, switch.transition);
    }

    // === Loop ===

    /// Run one scheduled tick at wall time `now` (seconds).
    ///
    /// Returns the delay in seconds until the next tick, or `None` when the
    /// runner is stopped. Falling behind by more than one interval triggers
    /// immediate catch-up ticks, at most `MAX_CATCH_UP_TICKS` per call.
    pub fn tick(
        &mut self,
        ctx: &mut Context,
        surface: &mut Surface,
        now: f64,
    ) -> Result<Option<f64>, RunnerError> {
        if !self.is_running() {
            return Ok(None);
        }
        let expected = self.interval();

        for _ in 0..MAX_CATCH_UP_TICKS {
            let bootstrap = self.last_update.is_none();
            let delta = match self.last_update {
                Some(last) => (now - last).max(0.0),
                None => f64::from(BOOTSTRAP_DELTA),
            };

            // The scene has already thought even if drawing fails
            let result = self.update(ctx, surface, delta as f32);
            self.last_update = Some(now);
            result?;

            if !self.is_running() {
                return Ok(None);
            }

            let loss = delta - expected;
            if bootstrap || loss <= 0.0 || loss - expected < CATCH_UP_THRESHOLD {
                return Ok(Some((expected - loss).max(0.0)));
            }

            log::warn!(
                "Cannot keep up! Lost {:.4}s which exceeds expected distance of {:.4}s between ticks",
                loss,
                expected
            );
            self.last_update = Some(now - (loss - expected));
        }

        log::warn!("Dropping lag after {} catch-up ticks", MAX_CATCH_UP_TICKS);
        self.last_update = Some(now);
        Ok(Some(0.0))
    }

    /// Think (unless paused) and render once
    pub fn update(
        &mut self,
        ctx: &mut Context,
        surface: &mut Surface,
        delta: f32,
    ) -> Result<(), RunnerError> {
        if !self.is_paused() {
            let bounds = surface.bounds();
            if let Some(switch) = self.scene.as_mut().and_then(|s| s.think(ctx, bounds, delta)) {
                self.apply(switch);
            }
        }
        self.render(ctx, surface, delta)
    }

    fn render(&mut self, ctx: &Context, surface: &mut Surface, delta: f32) -> Result<(), RunnerError> {
        surface.clear();

        let result = match (&self.scene, &mut self.pending) {
            (Some(scene), Some(pending)) => pending
                .transition
                .draw(surface, ctx, delta, scene.as_ref(), pending.scene.as_ref()),
            (Some(scene), None) => surface.isolate(|s| scene.draw(s, ctx, delta)).map(|_| false),
            (None, _) => Ok(false),
        };

        if !surface.is_root_scope() {
            log::error!("Left over scopes detected. Did you call Surface::pop()?");
            surface.unwind();
        }
        surface.clear_path();

        if result? {
            if let Some(pending) = self.pending.take() {
                log::info!("Transition to {:?} complete", pending.scene.id());
                self.scene = Some(pending.scene);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{DrawOp, Recording, RecordingBackend};
    use crate::sim::{Dimensions, FadeTransition};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    /// Scene counting thinks and drawing a circle per frame
    struct Counter {
        id: SceneId,
        thinks: Rc<Cell<u32>>,
        leak_scope: bool,
    }

    impl Counter {
        fn new(id: SceneId) -> (Self, Rc<Cell<u32>>) {
            let thinks = Rc::new(Cell::new(0));
            (
                Self {
                    id,
                    thinks: thinks.clone(),
                    leak_scope: false,
                },
                thinks,
            )
        }
    }

    impl Scene for Counter {
        fn id(&self) -> SceneId {
            self.id
        }

        fn think(&mut self, _ctx: &mut Context, _bounds: Dimensions, _delta: f32) -> Option<SceneSwitch> {
            self.thinks.set(self.thinks.get() + 1);
            None
        }

        fn draw(&self, surface: &mut Surface, _ctx: &Context, _delta: f32) -> Result<(), SurfaceError> {
            surface.draw_circle(1.0, 1.0);
            if self.leak_scope {
                surface.push();
                surface.push();
            }
            Ok(())
        }
    }

    /// Scene recording think deltas whose draw always fails
    struct BrokenDraw {
        deltas: Rc<RefCell<Vec<f32>>>,
    }

    impl Scene for BrokenDraw {
        fn id(&self) -> SceneId {
            SceneId::Default
        }

        fn think(&mut self, _ctx: &mut Context, _bounds: Dimensions, delta: f32) -> Option<SceneSwitch> {
            self.deltas.borrow_mut().push(delta);
            None
        }

        fn draw(&self, _surface: &mut Surface, _ctx: &Context, _delta: f32) -> Result<(), SurfaceError> {
            Err(SurfaceError::NoOpenPath)
        }
    }

    fn setup() -> (Runner, Context, Surface, Recording) {
        let (backend, recording) = RecordingBackend::new();
        let surface = Surface::new(Box::new(backend), Dimensions::new(640.0, 480.0));
        (Runner::new(), Context::headless(7), surface, recording)
    }

    fn circles(recording: &Recording) -> usize {
        recording
            .ops()
            .iter()
            .filter(|op| matches!(op, DrawOp::Circle { .. }))
            .count()
    }

    #[test]
    fn test_state_transitions_fail_loudly() {
        let mut runner = Runner::new();
        assert_eq!(runner.stop(), Err(RunnerError::AlreadyStopped));
        assert_eq!(runner.pause(), Err(RunnerError::NotRunning));
        runner.start().unwrap();
        assert_eq!(runner.start(), Err(RunnerError::AlreadyRunning));
        assert_eq!(runner.resume(), Err(RunnerError::NotPaused));
        runner.pause().unwrap();
        assert_eq!(runner.pause(), Err(RunnerError::AlreadyPaused));
        runner.resume().unwrap();
        assert_eq!(runner.set_tick_rate(80), Err(RunnerError::TickRateWhileRunning));
        runner.stop().unwrap();
        assert_eq!(runner.set_tick_rate(0), Err(RunnerError::InvalidTickRate));
        runner.set_tick_rate(80).unwrap();
        assert_eq!(runner.tick_rate(), 80);
    }

    #[test]
    fn test_stopped_runner_does_not_tick() {
        let (mut runner, mut ctx, mut surface, recording) = setup();
        runner.switch_scene(Box::new(Counter::new(SceneId::Default).0), None);
        assert_eq!(runner.tick(&mut ctx, &mut surface, 0.0), Ok(None));
        assert!(recording.ops().iter().all(|op| !matches!(op, DrawOp::Clear)));
    }

    #[test]
    fn test_early_tick_waits_longer() {
        let (mut runner, mut ctx, mut surface, _) = setup();
        let (counter, thinks) = Counter::new(SceneId::Default);
        runner.switch_scene(Box::new(counter), None);
        runner.start().unwrap();

        // Bootstrap tick never catches up
        assert_eq!(runner.tick(&mut ctx, &mut surface, 10.0), Ok(Some(0.0)));
        // 5ms early: the next tick is pushed back by the same amount
        let next = runner.tick(&mut ctx, &mut surface, 10.02).unwrap().unwrap();
        assert!((next - 0.03).abs() < 1e-9);
        assert_eq!(thinks.get(), 2);
    }

    #[test]
    fn test_catch_up_is_bounded() {
        let (mut runner, mut ctx, mut surface, _) = setup();
        let (counter, thinks) = Counter::new(SceneId::Default);
        runner.switch_scene(Box::new(counter), None);
        runner.start().unwrap();
        runner.tick(&mut ctx, &mut surface, 0.0).unwrap();

        // Ten seconds of lag at 40 ticks/s
        let next = runner.tick(&mut ctx, &mut surface, 10.0).unwrap();
        assert_eq!(next, Some(0.0));
        assert_eq!(thinks.get(), 1 + MAX_CATCH_UP_TICKS);
    }

    #[test]
    fn test_small_lag_catches_up_once() {
        let (mut runner, mut ctx, mut surface, _) = setup();
        let (counter, thinks) = Counter::new(SceneId::Default);
        runner.switch_scene(Box::new(counter), None);
        runner.start().unwrap();
        runner.tick(&mut ctx, &mut surface, 0.0).unwrap();

        // 0.08s elapsed: loss 0.055 exceeds one interval; the re-run sees 0.03
        let next = runner.tick(&mut ctx, &mut surface, 0.08).unwrap().unwrap();
        assert_eq!(thinks.get(), 3);
        assert!((next - 0.02).abs() < 1e-9);
    }

    #[test]
    fn test_failed_draw_still_advances_clock() {
        let (mut runner, mut ctx, mut surface, _) = setup();
        let deltas = Rc::new(RefCell::new(Vec::new()));
        runner.switch_scene(Box::new(BrokenDraw { deltas: deltas.clone() }), None);
        runner.start().unwrap();

        for now in [0.0, 0.025, 0.05, 0.075] {
            assert_eq!(
                runner.tick(&mut ctx, &mut surface, now),
                Err(RunnerError::Surface(SurfaceError::NoOpenPath))
            );
        }
        let deltas = deltas.borrow();
        assert_eq!(deltas.len(), 4);
        assert_eq!(deltas[0], BOOTSTRAP_DELTA);
        for delta in &deltas[1..] {
            assert!((delta - 0.025).abs() < 1e-6, "delta {}", delta);
        }
        assert!(surface.is_root_scope());
    }

    #[test]
    fn test_pause_freezes_think_but_draws() {
        let (mut runner, mut ctx, mut surface, recording) = setup();
        let (counter, thinks) = Counter::new(SceneId::Default);
        runner.switch_scene(Box::new(counter), None);
        runner.start().unwrap();
        runner.pause().unwrap();
        runner.tick(&mut ctx, &mut surface, 0.0).unwrap();
        assert_eq!(thinks.get(), 0);
        assert_eq!(circles(&recording), 1);
    }

    #[test]
    fn test_leftover_scopes_are_unwound() {
        let (mut runner, mut ctx, mut surface, _) = setup();
        let (mut counter, _) = Counter::new(SceneId::Default);
        counter.leak_scope = true;
        runner.switch_scene(Box::new(counter), None);
        runner.start().unwrap();
        runner.update(&mut ctx, &mut surface, 0.1).unwrap();
        assert!(surface.is_root_scope());
    }

    #[test]
    fn test_transition_switches_on_completion() {
        let (mut runner, mut ctx, mut surface, recording) = setup();
        let (from, from_thinks) = Counter::new(SceneId::Default);
        let (to, to_thinks) = Counter::new(SceneId::Asteroids);
        runner.switch_scene(Box::new(from), None);
        runner.start().unwrap();
        runner.switch_scene(Box::new(to), Some(Box::new(FadeTransition::new(1.0))));
        assert_eq!(runner.target_id(), Some(SceneId::Asteroids));

        runner.update(&mut ctx, &mut surface, 0.5).unwrap();
        assert_eq!(runner.scene_id(), Some(SceneId::Default));
        assert_eq!(circles(&recording), 2);

        runner.update(&mut ctx, &mut surface, 0.5).unwrap();
        assert_eq!(runner.scene_id(), Some(SceneId::Asteroids));
        assert!(!runner.in_transition());

        runner.update(&mut ctx, &mut surface, 0.5).unwrap();
        assert_eq!(from_thinks.get(), 2);
        assert_eq!(to_thinks.get(), 1);
    }

    #[test]
    fn test_transition_without_scene_is_immediate() {
        let mut runner = Runner::new();
        let (counter, _) = Counter::new(SceneId::Lines);
        runner.switch_scene(Box::new(counter), Some(Box::new(FadeTransition::new(5.0))));
        assert_eq!(runner.scene_id(), Some(SceneId::Lines));
        assert!(!runner.in_transition());
    }
}
