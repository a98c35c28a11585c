//! Shortest successful path tracking

use std::path::PathBuf;

use homing_rl_core::Path;
use tracing::info;

/// Keeps the shortest goal-reaching path and writes it out on every improvement
#[derive(Debug, Clone)]
pub struct BestPathTracker {
    best: Option<Path>,
    file: PathBuf,
}

impl BestPathTracker {
    /// Track paths, persisting improvements to `file`
    #[must_use]
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            best: None,
            file: file.into(),
        }
    }

    /// Best path so far
    #[must_use]
    pub fn best(&self) -> Option<&Path> {
        self.best.as_ref()
    }

    /// Length of the best path so far
    #[must_use]
    pub fn best_len(&self) -> Option<usize> {
        self.best.as_ref().map(Path::len)
    }

    /// Whether `path` is strictly shorter than the best so far
    #[must_use]
    pub fn improves(&self, path: &Path) -> bool {
        self.best_len().map_or(true, |len| path.len() < len)
    }

    /// Adopt and persist `path` if it strictly improves on the best; returns whether it did
    pub async fn consider(&mut self, path: &Path) -> homing_rl_core::Result<bool> {
        if !self.improves(path) {
            return Ok(false);
        }
        path.save(&self.file).await?;
        self.best = Some(path.clone());
        info!("✅ New best path saved with length {}!", path.len());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use homing_rl_core::{Action, PathEntry};

    fn path_of(len: usize) -> Path {
        (0..len).map(|_| PathEntry::Action(Action::Forward)).collect()
    }

    #[tokio::test]
    async fn test_only_strict_improvements_replace() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("learned_path.json");
        let mut tracker = BestPathTracker::new(&file);
        assert_eq!(tracker.best_len(), None);

        let mut lengths = Vec::new();
        for len in [12, 9, 15, 9] {
            tracker.consider(&path_of(len)).await.unwrap();
            lengths.push(tracker.best_len().unwrap());
        }
        assert_eq!(lengths, vec![12, 9, 9, 9]);

        let persisted = Path::load(&file).await.unwrap().unwrap();
        assert_eq!(persisted.len(), 9);
    }

    #[tokio::test]
    async fn test_first_path_always_qualifies() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("learned_path.json");
        let mut tracker = BestPathTracker::new(&file);

        assert!(tracker.consider(&path_of(4_999)).await.unwrap());
        assert!(file.exists());
        assert!(!tracker.consider(&path_of(4_999)).await.unwrap());
    }

    #[tokio::test]
    async fn test_persist_failure_is_surfaced() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let mut tracker = BestPathTracker::new(blocker.join("learned_path.json"));

        assert!(tracker.consider(&path_of(3)).await.is_err());
        assert_eq!(tracker.best_len(), None);
    }
}
