//! Request-scoped tracking of intermediate files.

use std::path::{Path, PathBuf};

/// Records every intermediate file created while processing one request
/// so they can all be reclaimed at the end, whatever the outcome.
///
/// One tracker per request; trackers are never shared across requests.
#[derive(Debug, Default)]
pub struct ArtifactTracker {
    paths: Vec<PathBuf>,
}

impl ArtifactTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a path for end-of-request deletion.
    pub fn register(&mut self, path: impl Into<PathBuf>) {
        self.paths.push(path.into());
    }

    /// Number of registered paths.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Delete every registered path except `keep`.
    ///
    /// Best-effort: paths that are already gone are skipped silently and
    /// deletion failures are logged at warn, so cleanup never masks the
    /// primary result or error.
    pub fn cleanup(&mut self, keep: Option<&Path>) {
        for path in self.paths.drain(..) {
            if keep.is_some_and(|kept| kept == path) {
                continue;
            }
            match std::fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to delete intermediate file");
                }
            }
        }
    }
}

/// Scope guard owning one request's tracker.
///
/// Cleanup runs when the guard drops, so artifacts are reclaimed on
/// success, on error, and on unwind alike. Call [`preserve`] with the
/// final output before the guard goes out of scope.
///
/// [`preserve`]: CleanupGuard::preserve
#[derive(Debug, Default)]
pub struct CleanupGuard {
    tracker: ArtifactTracker,
    keep: Option<PathBuf>,
}

impl CleanupGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tracker(&mut self) -> &mut ArtifactTracker {
        &mut self.tracker
    }

    /// Mark the final artifact to survive cleanup.
    pub fn preserve(&mut self, path: impl Into<PathBuf>) {
        self.keep = Some(path.into());
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        self.tracker.cleanup(self.keep.as_deref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_spares_the_final_output() {
        let dir = tempfile::tempdir().unwrap();
        let kept = dir.path().join("final.mp4");
        let doomed = dir.path().join("trimmed_0.mp4");
        std::fs::write(&kept, b"final").unwrap();
        std::fs::write(&doomed, b"scratch").unwrap();

        let mut tracker = ArtifactTracker::new();
        tracker.register(&kept);
        tracker.register(&doomed);
        tracker.cleanup(Some(&kept));

        assert!(kept.exists());
        assert!(!doomed.exists());
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_cleanup_without_keep_deletes_everything_registered() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.mp4");
        let b = dir.path().join("b.mp3");
        let unregistered = dir.path().join("untouched.txt");
        std::fs::write(&a, b"a").unwrap();
        std::fs::write(&b, b"b").unwrap();
        std::fs::write(&unregistered, b"keep me").unwrap();

        let mut tracker = ArtifactTracker::new();
        tracker.register(&a);
        tracker.register(&b);
        tracker.cleanup(None);

        assert!(!a.exists());
        assert!(!b.exists());
        assert!(unregistered.exists());
    }

    #[test]
    fn test_cleanup_tolerates_already_deleted_paths() {
        let dir = tempfile::tempdir().unwrap();
        let ghost = dir.path().join("already_gone.mp4");

        let mut tracker = ArtifactTracker::new();
        tracker.register(&ghost);
        tracker.cleanup(None);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_guard_reclaims_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = dir.path().join("scratch.mp4");
        let kept = dir.path().join("kept.mp4");
        std::fs::write(&scratch, b"scratch").unwrap();
        std::fs::write(&kept, b"kept").unwrap();

        {
            let mut guard = CleanupGuard::new();
            guard.tracker().register(&scratch);
            guard.tracker().register(&kept);
            guard.preserve(&kept);
        }

        assert!(!scratch.exists());
        assert!(kept.exists());
    }

    #[test]
    fn test_guard_without_preserve_reclaims_everything() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = dir.path().join("scratch.mp4");
        std::fs::write(&scratch, b"scratch").unwrap();

        {
            let mut guard = CleanupGuard::new();
            guard.tracker().register(&scratch);
        }

        assert!(!scratch.exists());
    }
}
