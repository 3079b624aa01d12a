//! High score leaderboard
//!
//! Persisted under a flat storage key, tracks the top 10 scores. Missing or
//! corrupt data is replaced by a default list; write failures are logged and
//! dropped.

use serde::{Deserialize, Serialize};

use crate::persistence::{self, Storage};
use crate::renderer::{Surface, SurfaceError, TextAlign};
use crate::sim::Vector2;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// Width of the dot-padded score column
const SCORE_WIDTH: usize = 15;

const TITLE_FONT: &str = "30px Monospace";
const ROW_FONT: &str = "20px Monospace";

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScore {
    pub name: String,
    pub score: u64,
}

impl HighScore {
    pub fn new(name: impl Into<String>, score: u64) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}

/// High score leaderboard, sorted descending by score
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Leaderboard {
    entries: Vec<HighScore>,
}

impl Leaderboard {
    /// Storage key
    const STORAGE_KEY: &'static str = "scores";

    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// The list shipped with a fresh install
    pub fn populated() -> Self {
        let mut board = Self::new();
        for (name, score) in [
            ("Thorin", 100_000),
            ("Fili", 90_000),
            ("Kili", 80_000),
            ("Balin", 50_000),
            ("Dwalin", 40_000),
            ("Oin", 20_000),
            ("Gloin", 10_000),
            ("Dori", 5_000),
            ("Nori", 2_500),
            ("Ori", 1_000),
        ] {
            board.insert(HighScore::new(name, score));
        }
        board
    }

    pub fn entries(&self) -> &[HighScore] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&HighScore> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Check if a score would make it onto the board
    pub fn qualifies(&self, score: u64) -> bool {
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Insert keeping descending order (ties go after existing entries).
    /// Returns the 1-indexed rank, or None if the entry fell off the board.
    fn insert(&mut self, entry: HighScore) -> Option<usize> {
        let pos = self
            .entries
            .iter()
            .position(|e| entry.score > e.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, entry);
        self.entries.truncate(MAX_HIGH_SCORES);
        (pos < MAX_HIGH_SCORES).then_some(pos + 1)
    }

    /// Record a score and persist the board
    pub fn push_score(&mut self, entry: HighScore, storage: &dyn Storage) -> Option<usize> {
        log::info!("New score {} for {}", entry.score, entry.name);
        let rank = self.insert(entry);
        self.save(storage);
        rank
    }

    /// Load from storage. Missing or corrupt data regenerates the default
    /// list and writes it back.
    pub fn load(storage: &dyn Storage) -> Self {
        match persistence::load_json::<Vec<HighScore>>(storage, Self::STORAGE_KEY) {
            Ok(Some(mut entries)) => {
                entries.sort_by(|a, b| b.score.cmp(&a.score));
                entries.truncate(MAX_HIGH_SCORES);
                log::info!("Loaded {} high scores", entries.len());
                return Self { entries };
            }
            Ok(None) => log::info!("No high scores found, generating defaults"),
            Err(e) => {
                log::error!("Could not load scores: {}", e);
                log::error!("Local storage might not be available.");
            }
        }

        let board = Self::populated();
        board.save(storage);
        board
    }

    /// Save to storage; failures are logged and dropped
    pub fn save(&self, storage: &dyn Storage) {
        match persistence::save_json(storage, Self::STORAGE_KEY, &self.entries) {
            Ok(()) => log::debug!("High scores saved ({} entries)", self.entries.len()),
            Err(e) => log::error!("Could not save scores: {}", e),
        }
    }

    /// Length of the longest name
    pub fn name_width(&self) -> usize {
        self.entries
            .iter()
            .map(|e| e.name.chars().count())
            .max()
            .unwrap_or(0)
    }

    /// Name right-aligned to the widest name on the board
    pub fn pad_name(&self, name: &str) -> String {
        let width = self.name_width();
        let padded = format!("{:>width$}", name, width = width);
        // Longer names keep their tail
        let skip = padded.chars().count().saturating_sub(width);
        padded.chars().skip(skip).collect()
    }

    /// `name.....score` row text
    pub fn format_row(&self, entry: &HighScore) -> String {
        let score = format!("{:.>width$}", entry.score, width = SCORE_WIDTH);
        let skip = score.len().saturating_sub(SCORE_WIDTH);
        format!("{}{}", self.pad_name(&entry.name), &score[skip..])
    }

    /// Draw the title and rows downward from the current origin
    pub fn draw(&self, surface: &mut Surface) -> Result<(), SurfaceError> {
        surface.draw_text("Highscores", TITLE_FONT, TextAlign::Center);
        surface.translate(Vector2::new(0.0, 40.0));
        for entry in &self.entries {
            let row = self.format_row(entry);
            surface.isolate(|surface| {
                surface.draw_text(&row, ROW_FONT, TextAlign::Center);
                Ok(())
            })?;
            surface.translate(Vector2::new(0.0, 20.0));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;
    use crate::renderer::RecordingBackend;
    use crate::sim::Dimensions;

    #[test]
    fn test_missing_data_populates_and_saves() {
        let storage = MemoryStorage::new();
        let board = Leaderboard::load(&storage);
        assert_eq!(board.len(), MAX_HIGH_SCORES);
        assert_eq!(board.get(0), Some(&HighScore::new("Thorin", 100_000)));
        assert_eq!(board.get(9), Some(&HighScore::new("Ori", 1_000)));
        assert!(storage.get("scores").unwrap().is_some());
    }

    #[test]
    fn test_corrupt_data_regenerates() {
        let storage = MemoryStorage::new().with_item("scores", "[{\"name\": 3}]");
        let board = Leaderboard::load(&storage);
        assert_eq!(board, Leaderboard::populated());
        let reloaded = Leaderboard::load(&storage);
        assert_eq!(reloaded, board);
    }

    #[test]
    fn test_stored_scores_load_sorted() {
        let storage = MemoryStorage::new().with_item(
            "scores",
            r#"[{"name":"b","score":5},{"name":"a","score":50}]"#,
        );
        let board = Leaderboard::load(&storage);
        assert_eq!(board.entries()[0].name, "a");
        assert_eq!(board.len(), 2);
    }

    #[test]
    fn test_push_keeps_top_ten() {
        let storage = MemoryStorage::new();
        let mut board = Leaderboard::populated();
        assert_eq!(board.push_score(HighScore::new("BILBO", 60_000), &storage), Some(4));
        assert_eq!(board.len(), MAX_HIGH_SCORES);
        assert_eq!(board.get(9).map(|e| e.name.as_str()), Some("Nori"));
        assert_eq!(board.push_score(HighScore::new("X", 1), &storage), None);
        assert!(!board.qualifies(1));

        let stored = Leaderboard::load(&storage);
        assert_eq!(stored, board);
    }

    #[test]
    fn test_write_failure_is_swallowed() {
        let storage = MemoryStorage::read_only();
        let mut board = Leaderboard::load(&storage);
        assert_eq!(board.len(), MAX_HIGH_SCORES);
        board.push_score(HighScore::new("A", 200_000), &storage);
        assert_eq!(board.top_score(), Some(200_000));
    }

    #[test]
    fn test_row_format() {
        let board = Leaderboard::populated();
        assert_eq!(board.name_width(), 6);
        assert_eq!(
            board.format_row(&HighScore::new("Oin", 20_000)),
            "   Oin..........20000"
        );
    }

    #[test]
    fn test_draw_lists_title_and_rows() {
        let (backend, recording) = RecordingBackend::new();
        let mut surface = Surface::new(Box::new(backend), Dimensions::new(800.0, 600.0));
        let board = Leaderboard::populated();
        surface.isolate(|s| board.draw(s)).unwrap();
        let texts = recording.texts();
        assert_eq!(texts.len(), 11);
        assert_eq!(texts[0], "Highscores");
        assert_eq!(texts[1], "Thorin.........100000");
    }
}
