//! Durable nullifier set kept in a JSON-lines file.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use ark_bn254::Fr;
use async_trait::async_trait;
use passport_disclose_lib::crypto::field_serde;
use passport_disclose_lib::{CapabilityError, NullifierStore};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct SpentNullifier {
    #[serde(with = "field_serde")]
    scope: Fr,
    #[serde(with = "field_serde")]
    nullifier: Fr,
}

/// Nullifier set persisted as one JSON object per line.
///
/// The whole file is read at open; each new pair is appended and flushed
/// before it counts as spent.
pub struct FileNullifierStore {
    path: PathBuf,
    seen: Mutex<HashSet<(Fr, Fr)>>,
}

impl FileNullifierStore {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, CapabilityError> {
        let path = path.as_ref().to_path_buf();
        let mut seen = HashSet::new();

        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => {
                for (number, line) in contents.lines().enumerate() {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let entry: SpentNullifier = serde_json::from_str(line).map_err(|e| {
                        CapabilityError::Malformed(format!(
                            "{} line {}: {e}",
                            path.display(),
                            number + 1
                        ))
                    })?;
                    seen.insert((entry.scope, entry.nullifier));
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(CapabilityError::Backend(format!(
                    "reading {}: {e}",
                    path.display()
                )))
            }
        }

        info!(path = %path.display(), entries = seen.len(), "Opened nullifier store");
        Ok(Self {
            path,
            seen: Mutex::new(seen),
        })
    }

    pub async fn len(&self) -> usize {
        self.seen.lock().await.len()
    }

    async fn append(&self, entry: SpentNullifier) -> Result<(), CapabilityError> {
        let backend = |e: std::io::Error| {
            CapabilityError::Backend(format!("writing {}: {e}", self.path.display()))
        };
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(backend)?;
        }
        let mut line =
            serde_json::to_vec(&entry).map_err(|e| CapabilityError::Malformed(e.to_string()))?;
        line.push(b'\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(backend)?;
        file.write_all(&line).await.map_err(backend)?;
        file.sync_data().await.map_err(backend)?;
        Ok(())
    }
}

#[async_trait]
impl NullifierStore for FileNullifierStore {
    async fn check_and_insert(&self, scope: Fr, nullifier: Fr) -> Result<bool, CapabilityError> {
        let mut seen = self.seen.lock().await;
        if seen.contains(&(scope, nullifier)) {
            return Ok(false);
        }
        self.append(SpentNullifier { scope, nullifier }).await?;
        seen.insert((scope, nullifier));
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_file(name: &str) -> PathBuf {
        let tag: u64 = rand::random();
        std::env::temp_dir()
            .join(format!("disclose-nullifiers-{tag:016x}"))
            .join(name)
    }

    #[tokio::test]
    async fn test_spent_nullifiers_survive_reopen() {
        let path = scratch_file("spent.jsonl");
        {
            let store = FileNullifierStore::open(&path).await.unwrap();
            assert!(store.check_and_insert(Fr::from(1u64), Fr::from(9u64)).await.unwrap());
            assert!(!store.check_and_insert(Fr::from(1u64), Fr::from(9u64)).await.unwrap());
            assert!(store.check_and_insert(Fr::from(2u64), Fr::from(9u64)).await.unwrap());
        }

        let reopened = FileNullifierStore::open(&path).await.unwrap();
        assert_eq!(reopened.len().await, 2);
        assert!(!reopened.check_and_insert(Fr::from(1u64), Fr::from(9u64)).await.unwrap());

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().next(), Some(r#"{"scope":"1","nullifier":"9"}"#));
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_rejected() {
        let path = scratch_file("corrupt.jsonl");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{\"scope\":\"1\"}\n").unwrap();
        assert!(matches!(
            FileNullifierStore::open(&path).await,
            Err(CapabilityError::Malformed(_))
        ));
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
