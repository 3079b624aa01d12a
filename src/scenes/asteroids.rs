//! Asteroids minigame
//!
//! Flow: play until the last life is lost, enter a name (once per session),
//! push the score, then choose between retrying and returning to the
//! background scene.

use std::cell::RefCell;
use std::rc::Rc;

use rand::Rng;
use rand_pcg::Pcg32;

use super::paint_white;
use crate::Context;
use crate::highscores::HighScore;
use crate::platform::{Keyboard, keys};
use crate::renderer::{Sprite, SpriteLoader, Surface, SurfaceError, TextAlign};
use crate::sim::entity::{ambient, asteroid, player};
use crate::sim::{
    Dimensions, EntityEvent, EntityId, EntityScene, EntityTag, Point, Scene, SceneId,
    SceneSwitch, Vector2,
};

pub const STARTING_LIVES: u32 = 4;
/// Seconds between repeated menu inputs
pub const INPUT_PAUSE: f32 = 0.25;
pub const MAX_NAME_LENGTH: usize = 10;
/// Asteroids enter this far outside the screen
pub const SPAWN_MARGIN: f32 = 50.0;
pub const SPAWN_SPEED: f32 = 80.0;
/// Score per step of the asteroid density exponent
pub const SCORE_PER_LEVEL: u64 = 1000;

const ASTEROID_SPRITES: [&str; 4] = [
    "assets/image/asteroid1.svg",
    "assets/image/asteroid2.svg",
    "assets/image/asteroid3.svg",
    "assets/image/asteroid4.svg",
];
const PLAYER_SPRITE: &str = "assets/image/player.svg";
const CONTROLS_SPRITE: &str = "assets/image/controls.svg";

const HUD_FONT: &str = "18px Helvetica";
const MENU_FONT: &str = "18px Monospace";
const MENU_TITLE_FONT: &str = "28px Monospace";
const LIFE_SCALE: f32 = 0.4;
const LIFE_SPACING: f32 = 40.0;

/// Sprites filled in as loads complete
#[derive(Debug, Default)]
struct Assets {
    asteroids: Vec<Sprite>,
    ship: Option<Sprite>,
    controls: Option<Sprite>,
}

/// Letter-by-letter name input
#[derive(Debug, Clone, PartialEq)]
struct NameEntry {
    buffer: String,
    index: usize,
    letter: u8,
    pause: f32,
}

impl Default for NameEntry {
    fn default() -> Self {
        Self {
            buffer: String::new(),
            index: 0,
            letter: b'A',
            pause: 0.0,
        }
    }
}

impl NameEntry {
    /// Returns the finished name once committed
    fn update(&mut self, keyboard: &Keyboard, delta: f32) -> Option<String> {
        self.pause += delta;
        if self.pause >= INPUT_PAUSE {
            if keyboard.is_pressed(keys::UP) {
                self.letter = self.letter.wrapping_add(1);
                self.pause = 0.0;
            } else if keyboard.is_pressed(keys::DOWN) {
                self.letter = self.letter.wrapping_sub(1);
                self.pause = 0.0;
            } else if keyboard.is_pressed(keys::SPACE) {
                self.index += 1;
                self.pause = 0.0;
            } else if keyboard.is_pressed(keys::BACKSPACE) {
                self.index = self.index.saturating_sub(1);
                self.pause = 0.0;
            }
        }

        if keyboard.is_pressed(keys::ENTER) || self.index >= MAX_NAME_LENGTH {
            return Some(std::mem::take(&mut self.buffer));
        }

        if self.letter > b'Z' {
            self.letter = b'A';
        } else if self.letter < b'A' {
            self.letter = b'Z';
        }
        self.buffer = self.buffer.chars().take(self.index).collect();
        self.buffer.push(char::from(self.letter));
        None
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Phase {
    Playing,
    EnteringName(NameEntry),
    Retry { yes: bool, pause: f32 },
    /// Switch requested; waiting for the transition to take over
    Leaving,
}

pub struct AsteroidsScene {
    entities: EntityScene,
    assets: Rc<RefCell<Assets>>,
    player: Option<EntityId>,
    controls_shown: bool,
    lives: u32,
    score: u64,
    /// Remembered across retries
    name: Option<String>,
    phase: Phase,
}

impl AsteroidsScene {
    /// Create the scene and start loading its sprites
    pub fn new(loader: &dyn SpriteLoader) -> Self {
        let assets = Rc::new(RefCell::new(Assets::default()));

        for uri in ASTEROID_SPRITES {
            let assets = assets.clone();
            loader.load(uri, Box::new(move |sprite| assets.borrow_mut().asteroids.push(sprite)));
        }
        {
            let assets = assets.clone();
            loader.load(PLAYER_SPRITE, Box::new(move |sprite| assets.borrow_mut().ship = Some(sprite)));
        }
        {
            let assets = assets.clone();
            loader.load(
                CONTROLS_SPRITE,
                Box::new(move |sprite| assets.borrow_mut().controls = Some(sprite)),
            );
        }

        Self {
            entities: EntityScene::new(),
            assets,
            player: None,
            controls_shown: false,
            lives: STARTING_LIVES,
            score: 0,
            name: None,
            phase: Phase::Playing,
        }
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn entities(&self) -> &EntityScene {
        &self.entities
    }

    pub fn player(&self) -> Option<EntityId> {
        self.player
    }

    pub fn is_game_over(&self) -> bool {
        self.phase != Phase::Playing
    }

    /// Asteroids to keep on screen: grows with area and, past each
    /// `SCORE_PER_LEVEL`, with score (the exponent caps at 2)
    pub fn asteroid_target(&self, bounds: Dimensions, density: f32) -> f32 {
        let exponent = (self.score / SCORE_PER_LEVEL + 1).min(2) as i32;
        (density * bounds.pixels()).powi(exponent)
    }

    fn reset(&mut self) {
        log::info!("Restarting the game");
        self.entities.clear();
        self.player = None;
        self.lives = STARTING_LIVES;
        self.score = 0;
        self.phase = Phase::Playing;
    }

    /// Apply held keys to the ship
    fn steer(&mut self, keyboard: &Keyboard) {
        let Some(id) = self.player else {
            return;
        };
        let Some(ship) = self.entities.get_mut(id) else {
            return;
        };

        let bullet = {
            let Some(player) = ship.as_player_mut() else {
                return;
            };
            player.set_rotation_acceleration(if keyboard.is_pressed(keys::LEFT) {
                -1.0
            } else if keyboard.is_pressed(keys::RIGHT) {
                1.0
            } else {
                0.0
            });
            player.set_acceleration(if keyboard.is_pressed(keys::UP) {
                -1.0
            } else if keyboard.is_pressed(keys::DOWN) {
                1.0
            } else {
                0.0
            });
            if keyboard.is_pressed(keys::SPACE) {
                ship.shoot()
            } else {
                None
            }
        };

        if let Some(bullet) = bullet {
            self.entities.spawn(bullet);
        }
    }

    /// Name entry and retry menu. May request leaving the scene.
    fn game_over_input(&mut self, ctx: &mut Context, delta: f32) -> Option<SceneSwitch> {
        match &mut self.phase {
            Phase::Playing | Phase::Leaving => None,
            Phase::EnteringName(entry) => {
                if let Some(name) = entry.update(&ctx.keyboard, delta) {
                    self.name = Some(name);
                    self.submit_score(ctx);
                }
                None
            }
            Phase::Retry { yes, pause } => {
                *pause += delta;
                if *pause < INPUT_PAUSE {
                    return None;
                }
                if ctx.keyboard.is_pressed(keys::UP) || ctx.keyboard.is_pressed(keys::DOWN) {
                    *pause = 0.0;
                    *yes = !*yes;
                }
                if !ctx.keyboard.is_pressed(keys::ENTER) {
                    return None;
                }
                if *yes {
                    self.reset();
                    None
                } else {
                    self.phase = Phase::Leaving;
                    Some(SceneSwitch::fade(
                        super::ambient(ctx),
                        ctx.settings.transition_seconds,
                    ))
                }
            }
        }
    }

    fn submit_score(&mut self, ctx: &mut Context) {
        let name = self.name.clone().unwrap_or_default();
        ctx.leaderboard
            .push_score(HighScore::new(name, self.score), ctx.storage.as_ref());
        self.phase = Phase::Retry {
            yes: true,
            pause: 0.0,
        };
    }

    /// Keep the asteroid count at its target; needs at least one sprite
    fn spawn_asteroids(&mut self, bounds: Dimensions, density: f32, rng: &mut Pcg32) {
        let sprites = self.assets.borrow().asteroids.clone();
        if sprites.is_empty() {
            return;
        }
        let target = self.asteroid_target(bounds, density);
        while (self.entities.count(EntityTag::Asteroid) as f32) < target {
            let sprite = sprites[rng.random_range(0..sprites.len())].clone();
            let (position, velocity) = edge_entry(bounds, rng);
            let scale = asteroid::random_scale(rng);
            let rock = asteroid::asteroid(sprite, scale, rng)
                .at(position)
                .with_velocity(velocity);
            let id = self.entities.spawn(rock);
            log::debug!("Spawning asteroid {:?} at {:?}", id, position);
        }
    }

    /// Handle player death, respawn and the loaded-late entities
    fn update_player(&mut self, ctx: &mut Context, bounds: Dimensions) {
        if let Some(id) = self.player {
            if self.entities.get(id).is_none() {
                self.player = None;
                self.lives = self.lives.saturating_sub(1);
                log::info!("Player died, {} lives left", self.lives);
                if self.lives == 0 {
                    self.game_over(ctx);
                }
            }
        }

        let (ship, controls) = {
            let assets = self.assets.borrow();
            (assets.ship.clone(), assets.controls.clone())
        };

        if self.player.is_none() && self.lives > 0 {
            if let Some(sprite) = ship {
                self.player = Some(self.entities.spawn(player::player(sprite, bounds.center())));
            }
        }

        if !self.controls_shown {
            if let Some(sprite) = controls {
                self.entities.spawn(ambient::controls(sprite, bounds));
                self.controls_shown = true;
            }
        }
    }

    fn game_over(&mut self, ctx: &mut Context) {
        log::info!("Game over with {} points", self.score);
        if self.name.is_some() {
            self.submit_score(ctx);
        } else {
            self.phase = Phase::EnteringName(NameEntry::default());
        }
    }

    fn draw_hud(&self, surface: &mut Surface) -> Result<(), SurfaceError> {
        let bounds = surface.bounds();

        if let Some(ship) = self.assets.borrow().ship.as_ref() {
            surface.isolate(|surface| {
                let start = bounds.end() * 0.05;
                surface.translate(Vector2::new(start.x * 0.4, start.y));
                for _ in 1..self.lives {
                    ship.draw(surface, LIFE_SCALE)?;
                    surface.translate(Vector2::new(LIFE_SPACING, 0.0));
                }
                Ok(())
            })?;
        }

        surface.isolate(|surface| {
            surface.translate(Vector2::new(bounds.width * 0.99, bounds.height * 0.05));
            surface.draw_text(&format!("SCORE: {}", self.score), HUD_FONT, TextAlign::Right);
            Ok(())
        })
    }

    fn draw_game_over(&self, surface: &mut Surface, ctx: &Context) -> Result<(), SurfaceError> {
        let center = surface.center().to_vector();
        match &self.phase {
            Phase::EnteringName(entry) => surface.isolate(|surface| {
                surface.translate(center + Vector2::new(0.0, -40.0));
                let text = format!("> {:>width$}", entry.buffer, width = MAX_NAME_LENGTH);
                surface.draw_text(&text, MENU_FONT, TextAlign::Center);
                Ok(())
            })?,
            Phase::Retry { yes, .. } => surface.isolate(|surface| {
                surface.translate(center + Vector2::new(0.0, -140.0));
                surface.draw_text("Retry?", MENU_TITLE_FONT, TextAlign::Center);
                surface.translate(Vector2::new(0.0, 40.0));
                let (yes_marker, no_marker) = if *yes { ("> ", "  ") } else { ("  ", "> ") };
                surface.draw_text(&format!("{}Yes", yes_marker), MENU_FONT, TextAlign::Center);
                surface.translate(Vector2::new(0.0, 20.0));
                surface.draw_text(&format!("{}No", no_marker), MENU_FONT, TextAlign::Center);
                Ok(())
            })?,
            Phase::Playing | Phase::Leaving => {}
        }

        surface.isolate(|surface| {
            surface.translate(center);
            ctx.leaderboard.draw(surface)
        })
    }
}

/// Random point just outside one screen edge with a velocity pointing in
fn edge_entry(bounds: Dimensions, rng: &mut Pcg32) -> (Point, Vector2) {
    let mut position = Vector2::random(&mut *rng).multiply_by(bounds.end());
    let mut velocity = Vector2::random(&mut *rng) * SPAWN_SPEED;
    match rng.random_range(0..4) {
        0 => position.y = -SPAWN_MARGIN,
        1 => {
            position.x = bounds.width + SPAWN_MARGIN;
            velocity.x = -velocity.x;
        }
        2 => {
            position.y = bounds.height + SPAWN_MARGIN;
            velocity.y = -velocity.y;
        }
        _ => position.x = -SPAWN_MARGIN,
    }
    (position.to_point(), velocity)
}

impl Scene for AsteroidsScene {
    fn id(&self) -> SceneId {
        SceneId::Asteroids
    }

    fn think(&mut self, ctx: &mut Context, bounds: Dimensions, delta: f32) -> Option<SceneSwitch> {
        self.steer(&ctx.keyboard);
        let switch = self.game_over_input(ctx, delta);

        for event in self.entities.think(bounds, &mut ctx.rng, delta) {
            match event {
                EntityEvent::Scored(points) => self.score += points,
            }
        }

        let density = ctx.settings.asteroid_density;
        self.spawn_asteroids(bounds, density, &mut ctx.rng);
        self.update_player(ctx, bounds);
        switch
    }

    fn draw(&self, surface: &mut Surface, ctx: &Context, _delta: f32) -> Result<(), SurfaceError> {
        paint_white(surface);
        self.entities.draw(surface, ctx.settings.debug_collisions)?;
        self.draw_hud(surface)?;
        if self.is_game_over() {
            self.draw_game_over(surface, ctx)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{PlaceholderLoader, RecordingBackend};
    use crate::sim::{Entity, EntityKind};

    const BOUNDS: Dimensions = Dimensions::new(800.0, 600.0);

    fn scene() -> (AsteroidsScene, Context) {
        let ctx = Context::headless(42);
        (AsteroidsScene::new(&PlaceholderLoader::default()), ctx)
    }

    fn kill_player(scene: &mut AsteroidsScene) {
        let id = scene.player().expect("player spawned");
        scene.entities.remove(id).unwrap();
    }

    /// Press `key` for one paced input step
    fn press(scene: &mut AsteroidsScene, ctx: &mut Context, key: u32) {
        ctx.keyboard.key_down(key);
        scene.think(ctx, BOUNDS, INPUT_PAUSE);
        ctx.keyboard.key_up(key);
    }

    #[test]
    fn test_first_tick_spawns_player_controls_and_asteroids() {
        let (mut scene, mut ctx) = scene();
        scene.think(&mut ctx, BOUNDS, 0.0);
        assert_eq!(scene.entities().count(EntityTag::Player), 1);
        assert_eq!(scene.entities().count(EntityTag::Controls), 1);
        // (0.000004 * 480000)^1 = 1.92
        assert_eq!(scene.entities().count(EntityTag::Asteroid), 2);
        let ship = scene.entities().get(scene.player().unwrap()).unwrap();
        assert_eq!(ship.position, Point::new(400.0, 300.0));
    }

    #[test]
    fn test_no_asteroids_without_sprites() {
        struct NeverLoads;
        impl SpriteLoader for NeverLoads {
            fn load(&self, _uri: &str, _on_ready: crate::renderer::SpriteCallback) {}
        }
        let mut ctx = Context::headless(1);
        let mut scene = AsteroidsScene::new(&NeverLoads);
        scene.think(&mut ctx, BOUNDS, 0.1);
        assert!(scene.entities().is_empty());
        assert!(scene.player().is_none());
    }

    #[test]
    fn test_asteroid_target_grows_with_score() {
        let (mut scene, _) = scene();
        let k = 0.000_004;
        assert!((scene.asteroid_target(BOUNDS, k) - 1.92).abs() < 1e-4);
        scene.score = 999;
        assert!((scene.asteroid_target(BOUNDS, k) - 1.92).abs() < 1e-4);
        scene.score = 1000;
        assert!((scene.asteroid_target(BOUNDS, k) - 3.6864).abs() < 1e-3);
        scene.score = 50_000;
        assert!((scene.asteroid_target(BOUNDS, k) - 3.6864).abs() < 1e-3);
    }

    #[test]
    fn test_spawned_asteroids_enter_from_edges() {
        let mut rng = Pcg32::new(0xcafe, 0xf00d);
        for _ in 0..200 {
            let (p, v) = edge_entry(BOUNDS, &mut rng);
            let outside = p.x == -SPAWN_MARGIN
                || p.y == -SPAWN_MARGIN
                || p.x == BOUNDS.width + SPAWN_MARGIN
                || p.y == BOUNDS.height + SPAWN_MARGIN;
            assert!(outside);
            if p.x < 0.0 || p.y < 0.0 {
                assert!(v.x >= 0.0 && v.y >= 0.0);
            }
            if p.x > BOUNDS.width {
                assert!(v.x <= 0.0);
            }
            if p.y > BOUNDS.height {
                assert!(v.y <= 0.0);
            }
        }
    }

    #[test]
    fn test_shooting_an_asteroid_scores() {
        let (mut scene, mut ctx) = scene();
        scene.think(&mut ctx, BOUNDS, 0.0);
        let sprite = scene.assets.borrow().asteroids[0].clone();
        // Directly above the ship, in the bullet's path
        let rock = asteroid::asteroid(sprite, 0.3, &mut ctx.rng).at(Point::new(400.0, 200.0));
        scene.entities.spawn(rock);

        ctx.keyboard.key_down(keys::SPACE);
        for _ in 0..40 {
            scene.think(&mut ctx, BOUNDS, 0.0125);
        }
        assert!(scene.score() >= 150);
    }

    #[test]
    fn test_death_respawns_until_out_of_lives() {
        let (mut scene, mut ctx) = scene();
        scene.think(&mut ctx, BOUNDS, 0.0);
        for remaining in (1..STARTING_LIVES).rev() {
            kill_player(&mut scene);
            scene.think(&mut ctx, BOUNDS, 0.0);
            assert_eq!(scene.lives(), remaining);
            assert!(scene.player().is_some());
            assert!(!scene.is_game_over());
        }
        kill_player(&mut scene);
        scene.think(&mut ctx, BOUNDS, 0.0);
        assert_eq!(scene.lives(), 0);
        assert!(scene.player().is_none());
        assert!(matches!(scene.phase, Phase::EnteringName(_)));
    }

    #[test]
    fn test_name_entry_push_and_retry() {
        let (mut scene, mut ctx) = scene();
        scene.think(&mut ctx, BOUNDS, 0.0);
        scene.score = 123_456;
        scene.lives = 1;
        kill_player(&mut scene);
        scene.think(&mut ctx, BOUNDS, 0.0);

        // "A" -> "B", next letter starts from "B", down twice wraps to "Z"
        press(&mut scene, &mut ctx, keys::UP);
        press(&mut scene, &mut ctx, keys::SPACE);
        press(&mut scene, &mut ctx, keys::DOWN);
        press(&mut scene, &mut ctx, keys::DOWN);
        ctx.keyboard.key_down(keys::ENTER);
        scene.think(&mut ctx, BOUNDS, 0.0);
        ctx.keyboard.key_up(keys::ENTER);

        assert_eq!(scene.name.as_deref(), Some("BZ"));
        assert_eq!(ctx.leaderboard.entries()[0], HighScore::new("BZ", 123_456));
        assert!(matches!(scene.phase, Phase::Retry { yes: true, .. }));

        press(&mut scene, &mut ctx, keys::ENTER);
        assert!(!scene.is_game_over());
        assert_eq!(scene.lives(), STARTING_LIVES);
        assert_eq!(scene.score(), 0);
        assert!(scene.player().is_some());
    }

    #[test]
    fn test_name_commits_at_ten_letters() {
        let mut entry = NameEntry::default();
        let mut kb = Keyboard::new();
        kb.key_down(keys::SPACE);
        let mut name = None;
        for _ in 0..20 {
            name = entry.update(&kb, INPUT_PAUSE);
            if name.is_some() {
                break;
            }
        }
        assert_eq!(name.as_deref(), Some("AAAAAAAAAA"));
    }

    #[test]
    fn test_backspace_stops_at_first_letter() {
        let mut entry = NameEntry::default();
        let mut kb = Keyboard::new();
        kb.key_down(keys::BACKSPACE);
        entry.update(&kb, INPUT_PAUSE);
        kb.key_up(keys::BACKSPACE);
        assert_eq!(entry.index, 0);
        assert_eq!(entry.buffer, "A");
    }

    #[test]
    fn test_choosing_no_fades_back_once() {
        let (mut scene, mut ctx) = scene();
        scene.name = Some("ME".into());
        scene.think(&mut ctx, BOUNDS, 0.0);
        scene.lives = 1;
        kill_player(&mut scene);
        scene.think(&mut ctx, BOUNDS, 0.0);
        assert!(matches!(scene.phase, Phase::Retry { .. }));

        press(&mut scene, &mut ctx, keys::DOWN);
        ctx.keyboard.key_down(keys::ENTER);
        let switch = scene.think(&mut ctx, BOUNDS, INPUT_PAUSE).expect("leaves the game");
        assert_eq!(switch.scene.id(), SceneId::Default);
        assert!(switch.transition.is_some());
        assert!(scene.think(&mut ctx, BOUNDS, INPUT_PAUSE).is_none());
    }

    #[test]
    fn test_hud_and_menu_text() {
        let (mut scene, mut ctx) = scene();
        scene.think(&mut ctx, BOUNDS, 0.0);
        scene.score = 750;

        let (backend, recording) = RecordingBackend::new();
        let mut surface = Surface::new(Box::new(backend), BOUNDS);
        surface.isolate(|s| scene.draw(s, &ctx, 0.0)).unwrap();
        assert!(recording.texts().contains(&"SCORE: 750".to_string()));
        // Three spare ships
        let lives = recording
            .images()
            .iter()
            .filter(|i| i.uri == PLAYER_SPRITE && i.size == Dimensions::new(40.0, 40.0))
            .count();
        assert_eq!(lives, 3);

        scene.phase = Phase::Retry {
            yes: false,
            pause: 0.0,
        };
        recording.reset();
        surface.isolate(|s| scene.draw(s, &ctx, 0.0)).unwrap();
        let texts = recording.texts();
        assert!(texts.contains(&"  Yes".to_string()));
        assert!(texts.contains(&"> No".to_string()));
        assert!(texts.contains(&"Highscores".to_string()));
        assert!(surface.is_root_scope());
    }

    #[test]
    fn test_player_steering_from_keys() {
        let (mut scene, mut ctx) = scene();
        scene.think(&mut ctx, BOUNDS, 0.0);
        ctx.keyboard.key_down(keys::LEFT);
        ctx.keyboard.key_down(keys::UP);
        scene.think(&mut ctx, BOUNDS, 0.0125);
        let ship: &Entity = scene.entities().get(scene.player().unwrap()).unwrap();
        let EntityKind::Player(p) = &ship.kind else {
            panic!("not a player");
        };
        assert_eq!(p.rotation_acceleration(), -1);
        assert_eq!(p.acceleration(), -1);
    }
}
