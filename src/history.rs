use crate::corpus::Difficulty;
use crate::scoring::TypingStats;
use crate::settings::Mode;
use chrono::{DateTime, Local};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Most-recent results retained on disk.
pub const HISTORY_CAPACITY: usize = 100;

/// One completed test, flattened for the CSV log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub date: DateTime<Local>,
    pub text_id: String,
    pub difficulty: Difficulty,
    pub mode: Mode,
    pub wpm: u32,
    pub gross_wpm: u32,
    pub accuracy: f64,
    pub errors: usize,
    pub time_elapsed: u64,
    pub characters_typed: usize,
    pub correct_characters: usize,
}

impl TestResult {
    pub fn new(text_id: &str, difficulty: Difficulty, mode: Mode, stats: &TypingStats) -> Self {
        Self {
            date: Local::now(),
            text_id: text_id.to_string(),
            difficulty,
            mode,
            wpm: stats.wpm,
            gross_wpm: stats.gross_wpm,
            accuracy: stats.accuracy,
            errors: stats.errors,
            time_elapsed: stats.time_elapsed,
            characters_typed: stats.characters_typed,
            correct_characters: stats.correct_characters,
        }
    }

    pub fn stats(&self) -> TypingStats {
        TypingStats {
            wpm: self.wpm,
            gross_wpm: self.gross_wpm,
            accuracy: self.accuracy,
            errors: self.errors,
            time_elapsed: self.time_elapsed,
            characters_typed: self.characters_typed,
            correct_characters: self.correct_characters,
        }
    }
}

/// Bounded CSV-backed result log, newest first. The core only appends final
/// stats here at completion; everything else about the record is display
/// material for the results screen.
#[derive(Debug, Clone)]
pub struct History {
    path: PathBuf,
}

impl History {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("swifttype")
                .join("history.csv")
        } else if let Some(pd) = ProjectDirs::from("", "", "swifttype") {
            pd.data_local_dir().join("history.csv")
        } else {
            PathBuf::from("swifttype_history.csv")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    /// Prepend a result and rewrite the log, trimmed to
    /// [`HISTORY_CAPACITY`]. Rewriting keeps the bound exact without a
    /// separate compaction step.
    pub fn append(&self, result: &TestResult) -> csv::Result<()> {
        let mut records = self.recent();
        records.insert(0, result.clone());
        records.truncate(HISTORY_CAPACITY);

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = csv::Writer::from_path(&self.path)?;
        for record in &records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Retained results, newest first. A missing file is an empty history;
    /// unreadable rows are skipped rather than failing the whole load.
    pub fn recent(&self) -> Vec<TestResult> {
        let Ok(mut reader) = csv::Reader::from_path(&self.path) else {
            return Vec::new();
        };
        reader
            .deserialize::<TestResult>()
            .filter_map(|row| row.ok())
            .take(HISTORY_CAPACITY)
            .collect()
    }

    /// Best net WPM among retained results.
    pub fn best_wpm(&self) -> Option<u32> {
        self.recent().iter().map(|r| r.wpm).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn result(wpm: u32) -> TestResult {
        TestResult::new(
            "beginner-1",
            Difficulty::Beginner,
            Mode::Time,
            &TypingStats {
                wpm,
                gross_wpm: wpm + 2,
                accuracy: 97.5,
                errors: 2,
                time_elapsed: 60,
                characters_typed: 80,
                correct_characters: 78,
            },
        )
    }

    #[test]
    fn test_append_and_read_back() {
        let dir = tempdir().unwrap();
        let history = History::with_path(dir.path().join("history.csv"));

        history.append(&result(42)).unwrap();
        let recent = history.recent();

        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].wpm, 42);
        assert_eq!(recent[0].text_id, "beginner-1");
        assert_eq!(recent[0].stats().accuracy, 97.5);
    }

    #[test]
    fn test_newest_result_comes_first() {
        let dir = tempdir().unwrap();
        let history = History::with_path(dir.path().join("history.csv"));

        history.append(&result(30)).unwrap();
        history.append(&result(50)).unwrap();

        let recent = history.recent();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].wpm, 50);
        assert_eq!(recent[1].wpm, 30);
    }

    #[test]
    fn test_history_is_bounded() {
        let dir = tempdir().unwrap();
        let history = History::with_path(dir.path().join("history.csv"));

        for wpm in 0..(HISTORY_CAPACITY as u32 + 10) {
            history.append(&result(wpm)).unwrap();
        }

        let recent = history.recent();
        assert_eq!(recent.len(), HISTORY_CAPACITY);
        // The ten oldest entries fell off.
        assert_eq!(recent.last().unwrap().wpm, 10);
    }

    #[test]
    fn test_best_wpm_over_retained_window() {
        let dir = tempdir().unwrap();
        let history = History::with_path(dir.path().join("history.csv"));

        assert_eq!(history.best_wpm(), None);

        history.append(&result(40)).unwrap();
        history.append(&result(75)).unwrap();
        history.append(&result(60)).unwrap();

        assert_eq!(history.best_wpm(), Some(75));
    }

    #[test]
    fn test_missing_file_is_empty_history() {
        let dir = tempdir().unwrap();
        let history = History::with_path(dir.path().join("nope.csv"));
        assert!(history.recent().is_empty());
        assert_eq!(history.best_wpm(), None);
    }

    #[test]
    fn test_unreadable_rows_are_skipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.csv");
        let history = History::with_path(&path);
        history.append(&result(33)).unwrap();

        // Corrupt the file by appending a garbage line.
        let mut contents = std::fs::read_to_string(&path).unwrap();
        contents.push_str("this,is,not,a,valid,row\n");
        std::fs::write(&path, contents).unwrap();

        let recent = history.recent();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].wpm, 33);
    }
}
