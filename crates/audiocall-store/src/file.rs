//! JSON file backed word store.
//!
//! The whole snapshot is rewritten after every change through a temp file
//! in the same directory, so a crash mid-write leaves the previous file
//! intact.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::instrument;

use audiocall_core::error::StoreError;
use audiocall_core::model::{DifficultyTag, StoreIntent, WordProgress};
use audiocall_core::traits::WordStore;

use crate::memory::StoreSnapshot;

/// Word store persisted to a single JSON file.
pub struct JsonFileStore {
    path: PathBuf,
    // Held across the write so snapshots reach disk in apply order.
    state: Mutex<StoreSnapshot>,
}

impl JsonFileStore {
    /// Open the store at `path`, starting empty if the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let snapshot = if path.exists() {
            read_snapshot(&path)?
        } else {
            tracing::debug!("no store at {}, starting empty", path.display());
            StoreSnapshot::default()
        };
        Ok(Self {
            path,
            state: Mutex::new(snapshot),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn snapshot(&self) -> StoreSnapshot {
        self.state.lock().await.clone()
    }

    /// Mark a word as hard or learned by hand and persist the change.
    #[instrument(skip(self))]
    pub async fn mark(
        &self,
        word_id: &str,
        difficulty: DifficultyTag,
    ) -> Result<WordProgress, StoreError> {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        let progress = next.mark(word_id, difficulty);
        self.persist(&next).await?;
        *state = next;
        Ok(progress)
    }

    async fn persist(&self, snapshot: &StoreSnapshot) -> Result<(), StoreError> {
        let path = self.path.clone();
        let snapshot = snapshot.clone();
        tokio::task::spawn_blocking(move || write_snapshot(&path, &snapshot))
            .await
            .map_err(|e| StoreError::Unavailable(format!("store writer failed: {e}")))?
    }
}

#[async_trait]
impl WordStore for JsonFileStore {
    fn is_authenticated(&self) -> bool {
        true
    }

    async fn load(&self, word_id: &str) -> Result<Option<WordProgress>, StoreError> {
        Ok(self.state.lock().await.words.get(word_id).copied())
    }

    /// Applies the batch to a copy and persists it once; on failure the
    /// store keeps its previous state both in memory and on disk.
    #[instrument(skip_all, fields(intents = intents.len()))]
    async fn apply_all(&self, intents: &[StoreIntent]) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        for intent in intents {
            next.apply(intent);
        }
        self.persist(&next).await?;
        *state = next;
        Ok(())
    }
}

fn read_snapshot(path: &Path) -> Result<StoreSnapshot, StoreError> {
    let reader = BufReader::new(File::open(path)?);
    serde_json::from_reader(reader)
        .map_err(|e| StoreError::Corrupt(format!("{}: {e}", path.display())))
}

fn write_snapshot(path: &Path, snapshot: &StoreSnapshot) -> Result<(), StoreError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let temp = tempfile::NamedTempFile::new_in(parent)?;
    {
        let mut writer = BufWriter::new(temp.as_file());
        serde_json::to_writer_pretty(&mut writer, snapshot)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        writer.flush()?;
    }
    temp.persist(path).map_err(|e| StoreError::Io(e.error))?;
    Ok(())
}
