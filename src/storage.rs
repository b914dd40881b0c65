//! High-Score Storage
//!
//! Keeps the best runs, ordered by score (desc), then level (desc), then
//! duration (asc), capped at [`MAX_HIGH_SCORES`]. The simulation talks to
//! storage only through [`ScoreStore`]; the JSON file backend is one
//! implementation, the in-memory table another.

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::{debug, info};

/// Records kept in the table.
pub const MAX_HIGH_SCORES: usize = 10;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// File could not be read or written.
    #[error("high-score file {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File exists but is not a valid record list.
    #[error("high-score file {path} is corrupt: {source}")]
    Parse {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// Records could not be encoded.
    #[error("failed to encode high scores: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One persisted run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScore {
    /// Player name
    pub name: String,
    /// Final score
    pub score: u32,
    /// Level reached
    pub level: u32,
    /// When the run ended
    pub date: DateTime<Utc>,
    /// Run length
    #[serde(rename = "durationSeconds")]
    pub duration_secs: u64,
}

impl HighScore {
    /// Table order: better runs compare as `Less`.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .cmp(&self.score)
            .then(other.level.cmp(&self.level))
            .then(self.duration_secs.cmp(&other.duration_secs))
    }
}

/// What the game hands to the store at game over.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    /// Player name
    pub name: String,
    /// Final score
    pub score: u32,
    /// Level reached
    pub level: u32,
    /// Run length in seconds
    pub duration_secs: u64,
}

impl ScoreSubmission {
    /// Stamp the submission into a record.
    pub fn into_record(self, date: DateTime<Utc>) -> HighScore {
        HighScore {
            name: self.name,
            score: self.score,
            level: self.level,
            date,
            duration_secs: self.duration_secs,
        }
    }
}

/// Persistence collaborator of the game.
pub trait ScoreStore {
    /// Add a finished run. Returns whether it made the table.
    fn submit(&mut self, submission: ScoreSubmission) -> Result<bool, StorageError>;

    /// Check if `score` would currently make the table.
    fn is_high_score(&self, score: u32) -> bool;

    /// Table contents, best first.
    fn top(&self) -> &[HighScore];
}

// =============================================================================
// SCORE TABLE
// =============================================================================

/// Ordered, capped list of records.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreTable {
    entries: Vec<HighScore>,
}

impl ScoreTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from loaded records, re-sorting and truncating.
    pub fn from_entries(mut entries: Vec<HighScore>) -> Self {
        entries.sort_by(HighScore::rank_cmp);
        entries.truncate(MAX_HIGH_SCORES);
        Self { entries }
    }

    /// Insert a record. Returns whether it survived truncation.
    pub fn insert(&mut self, record: HighScore) -> bool {
        // Ties go after existing records.
        let at = self
            .entries
            .partition_point(|e| e.rank_cmp(&record) != Ordering::Greater);
        if at >= MAX_HIGH_SCORES {
            return false;
        }
        self.entries.insert(at, record);
        self.entries.truncate(MAX_HIGH_SCORES);
        true
    }

    /// Check if `score` beats the weakest entry or the table has room.
    pub fn qualifies(&self, score: u32) -> bool {
        match self.entries.last() {
            Some(last) if self.entries.len() >= MAX_HIGH_SCORES => score > last.score,
            _ => true,
        }
    }

    /// Records, best first.
    pub fn entries(&self) -> &[HighScore] {
        &self.entries
    }

    /// Record count.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// BACKENDS
// =============================================================================

/// Table held in memory only.
#[derive(Clone, Debug, Default)]
pub struct MemoryScoreStore {
    table: ScoreTable,
}

impl MemoryScoreStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreStore for MemoryScoreStore {
    fn submit(&mut self, submission: ScoreSubmission) -> Result<bool, StorageError> {
        Ok(self.table.insert(submission.into_record(Utc::now())))
    }

    fn is_high_score(&self, score: u32) -> bool {
        self.table.qualifies(score)
    }

    fn top(&self) -> &[HighScore] {
        self.table.entries()
    }
}

/// Table persisted as a pretty-printed JSON array.
#[derive(Debug)]
pub struct JsonScoreStore {
    path: PathBuf,
    table: ScoreTable,
}

impl JsonScoreStore {
    /// Load `path`; a missing file is an empty table.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let table = match fs::read_to_string(&path) {
            Ok(text) => {
                let entries: Vec<HighScore> =
                    serde_json::from_str(&text).map_err(|source| StorageError::Parse {
                        path: path.clone(),
                        source,
                    })?;
                ScoreTable::from_entries(entries)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no high-score file at {}, starting empty", path.display());
                ScoreTable::new()
            }
            Err(source) => return Err(StorageError::Io { path, source }),
        };

        Ok(Self { path, table })
    }

    /// File backing this store.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the table, creating parent directories as needed.
    pub fn save(&self) -> Result<(), StorageError> {
        self.write(&self.table)
    }

    fn write(&self, table: &ScoreTable) -> Result<(), StorageError> {
        let io_err = |source| StorageError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(io_err)?;
        }
        let text = serde_json::to_string_pretty(table)?;
        fs::write(&self.path, text).map_err(io_err)?;
        Ok(())
    }
}

impl ScoreStore for JsonScoreStore {
    /// The in-memory table only changes once the file write succeeds.
    fn submit(&mut self, submission: ScoreSubmission) -> Result<bool, StorageError> {
        let mut next = self.table.clone();
        let made_it = next.insert(submission.into_record(Utc::now()));
        if made_it {
            self.write(&next)?;
            self.table = next;
            info!("high score saved to {}", self.path.display());
        }
        Ok(made_it)
    }

    fn is_high_score(&self, score: u32) -> bool {
        self.table.qualifies(score)
    }

    fn top(&self) -> &[HighScore] {
        self.table.entries()
    }
}

// =============================================================================
// FORMATTING
// =============================================================================

/// `mm:ss` for a run length.
pub fn format_duration(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// One display line per record, ranked from 1.
pub fn format_table(entries: &[HighScore]) -> Vec<String> {
    entries
        .iter()
        .enumerate()
        .map(|(i, e)| {
            format!(
                "{}. {} - {} pts (Level {}, {})",
                i + 1,
                e.name,
                e.score,
                e.level,
                format_duration(e.duration_secs)
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(name: &str, score: u32, level: u32, duration_secs: u64) -> ScoreSubmission {
        ScoreSubmission {
            name: name.to_string(),
            score,
            level,
            duration_secs,
        }
    }

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("snake-arena-{}-{}", tag, std::process::id()))
            .join("highscores.json")
    }

    #[test]
    fn test_ordering() {
        let mut store = MemoryScoreStore::new();
        store.submit(submission("slow", 100, 2, 90)).unwrap();
        store.submit(submission("fast", 100, 2, 60)).unwrap();
        store.submit(submission("deep", 100, 3, 200)).unwrap();
        store.submit(submission("best", 150, 1, 500)).unwrap();

        let names: Vec<_> = store.top().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["best", "deep", "fast", "slow"]);
    }

    #[test]
    fn test_cap_and_qualification() {
        let mut store = MemoryScoreStore::new();
        for i in 1..=MAX_HIGH_SCORES as u32 {
            assert!(store.submit(submission("p", i * 10, 1, 0)).unwrap());
        }
        assert_eq!(store.top().len(), MAX_HIGH_SCORES);

        assert!(!store.is_high_score(10));
        assert!(store.is_high_score(11));
        assert!(!store.submit(submission("low", 5, 1, 0)).unwrap());
        assert!(store.submit(submission("mid", 55, 1, 0)).unwrap());

        assert_eq!(store.top().len(), MAX_HIGH_SCORES);
        assert_eq!(store.top().last().map(|e| e.score), Some(20));
    }

    #[test]
    fn test_tie_goes_after_existing() {
        let mut table = ScoreTable::new();
        let date = Utc::now();
        table.insert(submission("first", 50, 1, 10).into_record(date));
        table.insert(submission("second", 50, 1, 10).into_record(date));
        assert_eq!(table.entries()[0].name, "first");
        assert_eq!(table.entries()[1].name, "second");
    }

    #[test]
    fn test_json_file_round_trip() {
        let path = temp_path("roundtrip");
        let _ = fs::remove_file(&path);

        let mut store = JsonScoreStore::open(&path).unwrap();
        assert!(store.top().is_empty());
        store.submit(submission("ana", 120, 2, 75)).unwrap();
        store.submit(submission("bo", 300, 4, 200)).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"durationSeconds\": 75"));

        let reloaded = JsonScoreStore::open(&path).unwrap();
        assert_eq!(reloaded.top(), store.top());
        assert_eq!(reloaded.top()[0].name, "bo");

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_failed_write_leaves_table_unchanged() {
        let path = temp_path("blocked");
        let root = path.parent().unwrap().to_path_buf();
        let path = root.join("sub").join("highscores.json");
        let _ = fs::remove_dir_all(&root);

        let mut store = JsonScoreStore::open(&path).unwrap();
        assert!(store.submit(submission("ana", 120, 2, 75)).unwrap());

        // Replace the parent directory with a plain file.
        fs::remove_dir_all(root.join("sub")).unwrap();
        fs::write(root.join("sub"), "in the way").unwrap();

        let err = store.submit(submission("bo", 300, 4, 200)).unwrap_err();
        assert!(matches!(err, StorageError::Io { .. }));
        assert_eq!(store.top().len(), 1);
        assert_eq!(store.top()[0].name, "ana");
        assert!(store.is_high_score(1));

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let path = temp_path("corrupt");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "not json").unwrap();

        let err = JsonScoreStore::open(&path).unwrap_err();
        assert!(matches!(err, StorageError::Parse { .. }));

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_format_table() {
        let mut table = ScoreTable::new();
        table.insert(submission("ana", 120, 2, 75).into_record(Utc::now()));
        assert_eq!(format_table(table.entries()), vec!["1. ana - 120 pts (Level 2, 01:15)"]);
        assert_eq!(format_duration(3599), "59:59");
    }
}
