//! `vault_sync` (spec §4.8): reconcile a file-backed corpus into the vector store by content
//! hash.
//!
//! The vector store itself is out of scope (spec.md's Non-goals carry "vector search" forward
//! unchanged — see SPEC_FULL.md §3); this job does the half that's in scope: walking the
//! corpus directory, hashing each file, and recording which files have changed since the last
//! sync. A real vector-store write would replace the `info!` in `sync_changed_file`.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::scheduler::job::{Job, JobError};
use crate::store::Datastore;

fn hash_contents(bytes: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    bytes.hash(&mut hasher);
    format!("{:x}", hasher.finish())
}

pub struct VaultSyncJob {
    store: Arc<Datastore>,
    corpus_dir: PathBuf,
}

impl VaultSyncJob {
    pub fn new(store: Arc<Datastore>, corpus_dir: PathBuf) -> Self {
        Self { store, corpus_dir }
    }

    async fn sync_changed_file(&self, path: &std::path::Path, hash: &str) -> Result<(), JobError> {
        info!(path = %path.display(), "vault file changed, would reindex into vector store");
        self.store
            .vault_record_sync(&path.to_string_lossy(), hash)
            .await
            .map_err(|e| JobError::new(e.to_string()))
    }
}

#[async_trait]
impl Job for VaultSyncJob {
    fn name(&self) -> &'static str {
        "vault_sync"
    }

    async fn run(&self) -> Result<(), JobError> {
        if !self.corpus_dir.is_dir() {
            return Err(JobError::new(format!(
                "corpus directory {} does not exist",
                self.corpus_dir.display()
            )));
        }

        let entries = std::fs::read_dir(&self.corpus_dir).map_err(|e| JobError::new(e.to_string()))?;
        for entry in entries {
            let entry = entry.map_err(|e| JobError::new(e.to_string()))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let bytes = std::fs::read(&path).map_err(|e| JobError::new(e.to_string()))?;
            let hash = hash_contents(&bytes);
            let known = self
                .store
                .vault_known_hash(&path.to_string_lossy())
                .await
                .map_err(|e| JobError::new(e.to_string()))?;
            if known.as_deref() != Some(hash.as_str()) {
                self.sync_changed_file(&path, &hash).await?;
            }
        }

        self.store
            .record_job_run(self.name(), "ok")
            .await
            .map_err(|e| JobError::new(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: an unchanged file is not re-synced on a second run.
    #[tokio::test]
    async fn unchanged_file_is_synced_only_once() {
        let db_dir = tempfile::tempdir().unwrap();
        let store = Arc::new(Datastore::new(db_dir.path().join("s.db")).unwrap());
        let corpus_dir = tempfile::tempdir().unwrap();
        std::fs::write(corpus_dir.path().join("note.md"), b"hello vault").unwrap();

        let job = VaultSyncJob::new(Arc::clone(&store), corpus_dir.path().to_path_buf());
        job.run().await.unwrap();

        let path = corpus_dir.path().join("note.md").to_string_lossy().to_string();
        let hash_after_first_run = store.vault_known_hash(&path).await.unwrap();
        assert!(hash_after_first_run.is_some());

        job.run().await.unwrap();
        let hash_after_second_run = store.vault_known_hash(&path).await.unwrap();
        assert_eq!(hash_after_first_run, hash_after_second_run);
    }

    /// **Scenario**: editing a file's contents changes its recorded hash on the next run.
    #[tokio::test]
    async fn edited_file_gets_a_new_recorded_hash() {
        let db_dir = tempfile::tempdir().unwrap();
        let store = Arc::new(Datastore::new(db_dir.path().join("s.db")).unwrap());
        let corpus_dir = tempfile::tempdir().unwrap();
        let file_path = corpus_dir.path().join("note.md");
        std::fs::write(&file_path, b"version one").unwrap();

        let job = VaultSyncJob::new(Arc::clone(&store), corpus_dir.path().to_path_buf());
        job.run().await.unwrap();
        let path = file_path.to_string_lossy().to_string();
        let first_hash = store.vault_known_hash(&path).await.unwrap();

        std::fs::write(&file_path, b"version two").unwrap();
        job.run().await.unwrap();
        let second_hash = store.vault_known_hash(&path).await.unwrap();

        assert_ne!(first_hash, second_hash);
    }
}
