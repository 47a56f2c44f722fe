// File: src/persistence.rs
//! Backing store for the corrections table, feedback log and learning log,
//! plus the bincode cache of a compiled subject index.
//!
//! Every write replaces the whole file: serialize into a temp file in the
//! same directory, then atomically persist it over the target. There is no
//! finer-grained locking, so callers must serialize writers.

use crate::core::index::SubjectIndex;
use crate::error::Result;
use crate::learning::types::{CorrectionEntry, FeedbackRecord, LearningLog};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const CORRECTIONS_FILE: &str = "ocr_corrections.json";
pub const FEEDBACK_FILE: &str = "user_feedback.json";
pub const LEARNING_LOG_FILE: &str = "learning_log.json";
pub const INDEX_CACHE_FILE: &str = "subject_index.bin";

/// Whole-table reads and writes. Implementations must be all-or-nothing per
/// call; they are not expected to merge concurrent writers.
pub trait CorrectionStore {
    fn load_corrections(&self) -> Result<Vec<CorrectionEntry>>;
    fn save_corrections(&mut self, entries: &[CorrectionEntry]) -> Result<()>;
    fn load_feedback(&self) -> Result<Vec<FeedbackRecord>>;
    fn save_feedback(&mut self, records: &[FeedbackRecord]) -> Result<()>;
    fn load_learning_log(&self) -> Result<LearningLog>;
    fn save_learning_log(&mut self, log: &LearningLog) -> Result<()>;

    /// Appends to the feedback log (read, extend, write back).
    fn append_feedback(&mut self, records: &[FeedbackRecord]) -> Result<()> {
        let mut all = self.load_feedback()?;
        all.extend_from_slice(records);
        self.save_feedback(&all)
    }
}

/// JSON files in one data directory. Missing files read as empty tables.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }
}

impl CorrectionStore for JsonFileStore {
    fn load_corrections(&self) -> Result<Vec<CorrectionEntry>> {
        read_json_or_default(&self.path(CORRECTIONS_FILE))
    }

    fn save_corrections(&mut self, entries: &[CorrectionEntry]) -> Result<()> {
        write_json_atomic(&self.path(CORRECTIONS_FILE), &entries)
    }

    fn load_feedback(&self) -> Result<Vec<FeedbackRecord>> {
        read_json_or_default(&self.path(FEEDBACK_FILE))
    }

    fn save_feedback(&mut self, records: &[FeedbackRecord]) -> Result<()> {
        write_json_atomic(&self.path(FEEDBACK_FILE), &records)
    }

    fn load_learning_log(&self) -> Result<LearningLog> {
        read_json_or_default(&self.path(LEARNING_LOG_FILE))
    }

    fn save_learning_log(&mut self, log: &LearningLog) -> Result<()> {
        write_json_atomic(&self.path(LEARNING_LOG_FILE), log)
    }
}

/// In-process store; handy for tests and for callers that persist elsewhere.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub corrections: Vec<CorrectionEntry>,
    pub feedback: Vec<FeedbackRecord>,
    pub learning_log: LearningLog,
}

impl CorrectionStore for MemoryStore {
    fn load_corrections(&self) -> Result<Vec<CorrectionEntry>> {
        Ok(self.corrections.clone())
    }

    fn save_corrections(&mut self, entries: &[CorrectionEntry]) -> Result<()> {
        self.corrections = entries.to_vec();
        Ok(())
    }

    fn load_feedback(&self) -> Result<Vec<FeedbackRecord>> {
        Ok(self.feedback.clone())
    }

    fn save_feedback(&mut self, records: &[FeedbackRecord]) -> Result<()> {
        self.feedback = records.to_vec();
        Ok(())
    }

    fn load_learning_log(&self) -> Result<LearningLog> {
        Ok(self.learning_log.clone())
    }

    fn save_learning_log(&mut self, log: &LearningLog) -> Result<()> {
        self.learning_log = log.clone();
        Ok(())
    }
}

fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Ok(T::default());
    }
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let parent_dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent_dir)?;

    let temp_file = NamedTempFile::new_in(parent_dir)?;
    {
        let mut writer = BufWriter::new(&temp_file);
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.flush()?;
    }
    temp_file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

pub fn save_index(index: &SubjectIndex, path: &Path) -> Result<()> {
    let parent_dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent_dir)?;

    let temp_file = NamedTempFile::new_in(parent_dir)?;
    {
        let mut writer = BufWriter::new(&temp_file);
        bincode::serialize_into(&mut writer, index)?;
        writer.flush()?;
    }
    temp_file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

pub fn load_index(path: &Path) -> Result<SubjectIndex> {
    let reader = BufReader::new(File::open(path)?);
    Ok(bincode::deserialize_from(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::CourseRecord;
    use crate::learning::types::ErrorType;
    use chrono::Utc;

    #[test]
    fn missing_files_read_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("data"));
        assert!(store.load_corrections().unwrap().is_empty());
        assert!(store.load_feedback().unwrap().is_empty());
        assert!(store.load_learning_log().unwrap().performance_history.is_empty());
    }

    #[test]
    fn corrections_survive_a_reload() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path());
        let entry = CorrectionEntry {
            ocr_result: "운영체계".into(),
            correct_result: "운영체제".into(),
            frequency: 2,
            confidence: 0.75,
            error_type: ErrorType::GeneralText,
            last_updated: Utc::now(),
            auto_approved: false,
        };
        store.save_corrections(&[entry.clone()]).unwrap();
        let reopened = JsonFileStore::new(dir.path());
        assert_eq!(reopened.load_corrections().unwrap(), vec![entry]);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(FEEDBACK_FILE), "{not json").unwrap();
        assert!(JsonFileStore::new(dir.path()).load_feedback().is_err());
    }

    #[test]
    fn index_cache_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(INDEX_CACHE_FILE);
        let index = SubjectIndex::build(vec![CourseRecord::new("5118020", "컴퓨터구조", "김교수").with_alias("컴구")]);
        save_index(&index, &path).unwrap();
        let loaded = load_index(&path).unwrap();
        assert_eq!(loaded.stats(), index.stats());
        assert_eq!(loaded.name_for_alias("컴구"), Some("컴퓨터구조"));
    }
}
