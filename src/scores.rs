//! Top-N high score table persisted as JSON.
//!
//! Storage failures never reach the game: an unreadable file loads as an
//! empty table and a failed save leaves the in-memory table as the only copy.

use std::fs;
use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::GameResult;

pub const NAME_MAX_CHARS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub score: u32,
}

pub struct HighScores {
    path: PathBuf,
    capacity: usize,
    entries: Vec<ScoreEntry>,
}

impl HighScores {
    pub fn open(path: impl Into<PathBuf>, capacity: usize) -> Self {
        let path = path.into();
        let mut entries = match read_entries(&path) {
            Ok(entries) => entries,
            Err(err) => {
                warn!("ignoring high scores at {}: {}", path.display(), err);
                Vec::new()
            }
        };
        sort_and_truncate(&mut entries, capacity);
        Self {
            path,
            capacity,
            entries,
        }
    }

    pub fn load_scores(&self) -> &[ScoreEntry] {
        &self.entries
    }

    /// True if `score` would earn a place in the table.
    pub fn is_high_score(&self, score: u32) -> bool {
        if self.entries.len() < self.capacity {
            return true;
        }
        self.entries.last().map_or(true, |last| score > last.score)
    }

    pub fn add_score(&mut self, name: &str, score: u32) {
        self.entries.push(ScoreEntry {
            name: name.to_string(),
            score,
        });
        sort_and_truncate(&mut self.entries, self.capacity);
        if let Err(err) = write_entries(&self.path, &self.entries) {
            warn!("could not save high scores to {}: {}", self.path.display(), err);
        }
    }
}

// Stable sort keeps earlier entries ahead of later equal scores.
fn sort_and_truncate(entries: &mut Vec<ScoreEntry>, capacity: usize) {
    entries.sort_by(|a, b| b.score.cmp(&a.score));
    entries.truncate(capacity);
}

fn read_entries(path: &Path) -> GameResult<Vec<ScoreEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn write_entries(path: &Path, entries: &[ScoreEntry]) -> GameResult<()> {
    let text = serde_json::to_string_pretty(entries)?;
    fs::write(path, text)?;
    Ok(())
}

/// Name being typed on the high score screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameEntry {
    name: String,
}

impl NameEntry {
    /// Accepts letters, digits and spaces up to the length limit.
    pub fn push(&mut self, ch: char) -> bool {
        if self.name.chars().count() >= NAME_MAX_CHARS || !(ch.is_alphanumeric() || ch == ' ') {
            return false;
        }
        self.name.push(ch);
        true
    }

    pub fn pop(&mut self) {
        self.name.pop();
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("highscores.json");
        (dir, path)
    }

    #[test]
    fn missing_file_is_an_empty_table() {
        let (_dir, path) = scratch();
        let scores = HighScores::open(&path, 10);
        assert!(scores.load_scores().is_empty());
        assert!(scores.is_high_score(0));
    }

    #[test]
    fn corrupt_file_degrades_to_empty() {
        let (_dir, path) = scratch();
        fs::write(&path, "{ not json").unwrap();
        let scores = HighScores::open(&path, 10);
        assert!(scores.load_scores().is_empty());
    }

    #[test]
    fn keeps_top_ten_sorted_and_persists() {
        let (_dir, path) = scratch();
        let mut scores = HighScores::open(&path, 10);
        for i in 0..12u32 {
            scores.add_score(&format!("p{i}"), i * 100);
        }
        let top: Vec<u32> = scores.load_scores().iter().map(|e| e.score).collect();
        assert_eq!(top, vec![1100, 1000, 900, 800, 700, 600, 500, 400, 300, 200]);

        let reloaded = HighScores::open(&path, 10);
        assert_eq!(reloaded.load_scores(), scores.load_scores());
    }

    #[test]
    fn high_score_threshold_is_strictly_above_tenth() {
        let (_dir, path) = scratch();
        let mut scores = HighScores::open(&path, 10);
        for _ in 0..10 {
            assert!(scores.is_high_score(500));
            scores.add_score("ann", 500);
        }
        assert!(!scores.is_high_score(500));
        assert!(scores.is_high_score(501));
    }

    #[test]
    fn equal_scores_keep_arrival_order() {
        let (_dir, path) = scratch();
        let mut scores = HighScores::open(&path, 3);
        scores.add_score("first", 100);
        scores.add_score("second", 100);
        let names: Vec<&str> = scores.load_scores().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["first", "second"]);
    }

    #[test]
    fn unwritable_location_keeps_scores_in_memory() {
        let (dir, _) = scratch();
        // A directory cannot be written as a file.
        let mut scores = HighScores::open(dir.path(), 10);
        scores.add_score("bob", 42);
        assert_eq!(scores.load_scores().len(), 1);
    }

    #[test]
    fn file_format_is_a_plain_list() {
        let (_dir, path) = scratch();
        let mut scores = HighScores::open(&path, 10);
        scores.add_score("eve", 70);
        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value, serde_json::json!([{ "name": "eve", "score": 70 }]));
    }

    #[test]
    fn name_entry_limits() {
        let mut name = NameEntry::default();
        assert!(!name.push('!'));
        for ch in "abc def 12".chars() {
            assert!(name.push(ch));
        }
        assert!(!name.push('z'));
        assert_eq!(name.as_str(), "abc def 12");
        name.pop();
        assert_eq!(name.as_str(), "abc def 1");
    }
}
