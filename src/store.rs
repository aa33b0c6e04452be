//! Per-user question/answer history.
//!
//! The [`UserStore`] trait hides where history lives. Three backends ship:
//!
//! | Backend | `[storage].backend` | Layout |
//! |---------|---------------------|--------|
//! | [`JsonFileStore`] | `json_file` | one JSON array of `{userId, qas}` records |
//! | [`PerUserFileStore`] | `per_user` | one JSON file per user, named by SHA-256 of the id |
//! | [`InMemoryStore`] | `memory` | process-local map, for tests and demos |
//!
//! File backends serialize their read-modify-write cycles through a mutex
//! and replace files via write-to-temp + rename.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::StorageConfig;

/// One saved exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEntry {
    pub question: String,
    pub answer: String,
    /// RFC 3339; empty for records written before timestamps existed.
    #[serde(default)]
    pub timestamp: String,
}

impl ChatEntry {
    pub fn now(question: &str, answer: &str) -> Self {
        Self {
            question: question.to_string(),
            answer: answer.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoadStatus {
    Found,
    NotFound,
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadStatus::Found => f.write_str("FOUND"),
            LoadStatus::NotFound => f.write_str("NOT_FOUND"),
        }
    }
}

/// Result of [`UserStore::load`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserLoadResult {
    pub status: LoadStatus,
    /// `Q: <question> - A: <answer>` items joined by ` | `.
    pub history: String,
}

/// Render saved entries as the single-line history handed to the generator.
pub fn format_history(entries: &[ChatEntry]) -> String {
    entries
        .iter()
        .map(|e| format!("Q: {} - A: {}", e.question, e.answer))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Storage backend for user history.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Short backend name for status output.
    fn name(&self) -> &str;

    /// All saved entries for `user_id`, oldest first.
    async fn entries(&self, user_id: &str) -> Result<Vec<ChatEntry>>;

    /// Append one exchange to `user_id`'s history.
    async fn save(&self, user_id: &str, question: &str, answer: &str) -> Result<()>;

    /// Load `user_id`'s history as a formatted string.
    async fn load(&self, user_id: &str) -> Result<UserLoadResult> {
        let entries = self.entries(user_id).await?;
        if entries.is_empty() {
            return Ok(UserLoadResult {
                status: LoadStatus::NotFound,
                history: String::new(),
            });
        }
        Ok(UserLoadResult {
            status: LoadStatus::Found,
            history: format_history(&entries),
        })
    }
}

/// Build the backend named in `[storage]`.
pub fn create_store(config: &StorageConfig) -> Result<Arc<dyn UserStore>> {
    match config.backend.as_str() {
        "json_file" => Ok(Arc::new(JsonFileStore::new(&config.path))),
        "per_user" => Ok(Arc::new(PerUserFileStore::new(&config.path))),
        "memory" => Ok(Arc::new(InMemoryStore::new())),
        other => anyhow::bail!(
            "Unknown storage backend: '{}'. Must be json_file, per_user, or memory.",
            other
        ),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserRecord {
    #[serde(rename = "userId")]
    user_id: String,
    #[serde(default)]
    qas: Vec<ChatEntry>,
}

async fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Option<T>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", path.display()));
        }
    };
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let value = serde_json::from_slice(&bytes)
        .with_context(|| format!("Corrupt history file: {}", path.display()))?;
    Ok(Some(value))
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    let body = serde_json::to_vec_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, body)
        .await
        .with_context(|| format!("Failed to write {}", tmp.display()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════
// Single JSON file
// ═══════════════════════════════════════════════════════════════════════

/// All users in one JSON array file.
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn read_all(&self) -> Result<Vec<UserRecord>> {
        Ok(read_json(&self.path).await?.unwrap_or_default())
    }
}

#[async_trait]
impl UserStore for JsonFileStore {
    fn name(&self) -> &str {
        "json_file"
    }

    async fn entries(&self, user_id: &str) -> Result<Vec<ChatEntry>> {
        let _guard = self.lock.lock().await;
        let records = self.read_all().await?;
        Ok(records
            .into_iter()
            .find(|r| r.user_id == user_id)
            .map(|r| r.qas)
            .unwrap_or_default())
    }

    async fn save(&self, user_id: &str, question: &str, answer: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut records = self.read_all().await?;
        let entry = ChatEntry::now(question, answer);
        match records.iter_mut().find(|r| r.user_id == user_id) {
            Some(r) => r.qas.push(entry),
            None => records.push(UserRecord {
                user_id: user_id.to_string(),
                qas: vec![entry],
            }),
        }
        write_json(&self.path, &records).await?;
        debug!(user = user_id, path = %self.path.display(), "saved chat entry");
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════
// One file per user
// ═══════════════════════════════════════════════════════════════════════

/// One JSON file per user inside a directory.
///
/// File names are the hex SHA-256 of the user id, so arbitrary ids never
/// escape the directory.
pub struct PerUserFileStore {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl PerUserFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path_for(&self, user_id: &str) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(user_id.as_bytes());
        self.dir
            .join(format!("{}.json", hex::encode(hasher.finalize())))
    }
}

#[async_trait]
impl UserStore for PerUserFileStore {
    fn name(&self) -> &str {
        "per_user"
    }

    async fn entries(&self, user_id: &str) -> Result<Vec<ChatEntry>> {
        let _guard = self.lock.lock().await;
        let record: Option<UserRecord> = read_json(&self.path_for(user_id)).await?;
        Ok(record.map(|r| r.qas).unwrap_or_default())
    }

    async fn save(&self, user_id: &str, question: &str, answer: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let path = self.path_for(user_id);
        let mut record: UserRecord = read_json(&path).await?.unwrap_or_else(|| UserRecord {
            user_id: user_id.to_string(),
            qas: Vec::new(),
        });
        record.qas.push(ChatEntry::now(question, answer));
        write_json(&path, &record).await?;
        debug!(user = user_id, path = %path.display(), "saved chat entry");
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════
// In memory
// ═══════════════════════════════════════════════════════════════════════

/// Process-local history.
#[derive(Default)]
pub struct InMemoryStore {
    users: RwLock<HashMap<String, Vec<ChatEntry>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn entries(&self, user_id: &str) -> Result<Vec<ChatEntry>> {
        let users = self
            .users
            .read()
            .map_err(|_| anyhow!("history lock poisoned"))?;
        Ok(users.get(user_id).cloned().unwrap_or_default())
    }

    async fn save(&self, user_id: &str, question: &str, answer: &str) -> Result<()> {
        let mut users = self
            .users
            .write()
            .map_err(|_| anyhow!("history lock poisoned"))?;
        users
            .entry(user_id.to_string())
            .or_default()
            .push(ChatEntry::now(question, answer));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn exercise(store: &dyn UserStore) {
        let empty = store.load("alice").await.unwrap();
        assert_eq!(empty.status, LoadStatus::NotFound);
        assert!(empty.history.is_empty());

        store.save("alice", "q1", "a1").await.unwrap();
        store.save("bob", "other", "x").await.unwrap();
        store.save("alice", "q2", "a2").await.unwrap();

        let loaded = store.load("alice").await.unwrap();
        assert_eq!(loaded.status, LoadStatus::Found);
        assert_eq!(loaded.history, "Q: q1 - A: a1 | Q: q2 - A: a2");

        let entries = store.entries("bob").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert!(!entries[0].timestamp.is_empty());
    }

    #[tokio::test]
    async fn test_memory_store() {
        exercise(&InMemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_json_file_store() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("user_data.json");
        exercise(&JsonFileStore::new(&path)).await;

        let raw = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed[0]["userId"], "alice");
        assert_eq!(parsed[0]["qas"][1]["question"], "q2");
    }

    #[tokio::test]
    async fn test_json_file_store_reads_legacy_records() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("user_data.json");
        std::fs::write(
            &path,
            r#"[{"userId": "u1", "qas": [{"question": "hi", "answer": "hello"}]}]"#,
        )
        .unwrap();
        let store = JsonFileStore::new(&path);
        let loaded = store.load("u1").await.unwrap();
        assert_eq!(loaded.history, "Q: hi - A: hello");
    }

    #[tokio::test]
    async fn test_json_file_store_corrupt_file_errors() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("user_data.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = JsonFileStore::new(&path).load("u1").await.unwrap_err();
        assert!(format!("{:#}", err).contains("Corrupt history file"));
    }

    #[tokio::test]
    async fn test_per_user_store() {
        let tmp = TempDir::new().unwrap();
        let store = PerUserFileStore::new(tmp.path().join("users"));
        exercise(&store).await;
        assert!(store.path_for("alice").exists());
        assert!(store.path_for("carol").to_string_lossy().ends_with(".json"));
    }

    #[test]
    fn test_per_user_path_cannot_escape_dir() {
        let store = PerUserFileStore::new("/tmp/users");
        let p = store.path_for("../../etc/passwd");
        assert_eq!(p.parent().unwrap(), Path::new("/tmp/users"));
    }

    #[test]
    fn test_create_store_by_name() {
        let mut cfg = StorageConfig::default();
        assert_eq!(create_store(&cfg).unwrap().name(), "json_file");
        cfg.backend = "memory".to_string();
        assert_eq!(create_store(&cfg).unwrap().name(), "memory");
        cfg.backend = "s3".to_string();
        assert!(create_store(&cfg).is_err());
    }
}
