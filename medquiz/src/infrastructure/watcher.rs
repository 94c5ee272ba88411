// src/infrastructure/watcher.rs
//
// Keeps the structure index in sync with the content tree. The tree is
// fingerprinted on a fixed interval; a change arms the debouncer and the index
// is regenerated once the tree has been quiet for the debounce delay.
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use crate::application::{ContentRepository, StructureGenerator};
use crate::infrastructure::fingerprint::tree_fingerprint;

/// Collapses a burst of changes into one action after a quiet period.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    last_change: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_change: None,
        }
    }

    /// Note a change; restarts the quiet period.
    pub fn record_change(&mut self, now: Instant) {
        self.last_change = Some(now);
    }

    pub fn is_pending(&self) -> bool {
        self.last_change.is_some()
    }

    /// True exactly once per burst, when the quiet period has elapsed.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.last_change {
            Some(last) if now.duration_since(last) >= self.delay => {
                self.last_change = None;
                true
            }
            _ => false,
        }
    }
}

pub struct StructureWatcher<R: ContentRepository> {
    generator: Arc<StructureGenerator<R>>,
    root: PathBuf,
    poll: Duration,
    debounce: Duration,
}

/// Running watcher. Dropping the handle without [`WatcherHandle::stop`] leaves
/// the task running until the runtime shuts down.
pub struct WatcherHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl WatcherHandle {
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            warn!(error = %e, "Structure watcher task ended abnormally");
        }
    }
}

impl<R> StructureWatcher<R>
where
    R: ContentRepository + Send + Sync + 'static,
{
    pub fn new(
        generator: Arc<StructureGenerator<R>>,
        root: impl Into<PathBuf>,
        poll: Duration,
        debounce: Duration,
    ) -> Self {
        Self {
            generator,
            root: root.into(),
            poll,
            debounce,
        }
    }

    /// Generate once, then keep watching on the current tokio runtime.
    pub fn spawn(self) -> WatcherHandle {
        let (shutdown, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(shutdown_rx));
        WatcherHandle { shutdown, task }
    }

    #[instrument(level = "debug", skip_all, fields(root = %self.root.display()))]
    async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            poll_ms = self.poll.as_millis() as u64,
            debounce_ms = self.debounce.as_millis() as u64,
            "Watching content directory"
        );
        self.regenerate().await;

        let mut last_seen = self.fingerprint().await;
        let mut debouncer = Debouncer::new(self.debounce);
        let mut ticker = tokio::time::interval(self.poll);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let current = self.fingerprint().await;
                    if current != last_seen {
                        debug!("Content change detected");
                        last_seen = current;
                        debouncer.record_change(Instant::now());
                    }
                    if debouncer.fire(Instant::now()) {
                        self.regenerate().await;
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Structure watcher stopped");
    }

    async fn fingerprint(&self) -> String {
        let root = self.root.clone();
        match tokio::task::spawn_blocking(move || tree_fingerprint(root)).await {
            Ok(hash) => hash,
            Err(e) => {
                warn!(error = %e, "Fingerprint task failed");
                String::new()
            }
        }
    }

    /// Failures are logged; the watcher keeps running.
    async fn regenerate(&self) {
        let generator = Arc::clone(&self.generator);
        match tokio::task::spawn_blocking(move || generator.generate()).await {
            Ok(Ok(report)) => info!(
                modules = report.structure.len(),
                output = %report.output_path,
                "Regenerated structure index"
            ),
            Ok(Err(e)) => error!(error = %e, "Failed to regenerate structure index"),
            Err(e) => error!(error = %e, "Structure generation task panicked"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::FsContentRepository;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn given_no_change_when_checking_debouncer_then_does_not_fire() {
        let mut debouncer = Debouncer::new(Duration::from_millis(1000));

        assert!(!debouncer.fire(Instant::now()));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn given_burst_of_changes_when_checking_debouncer_then_fires_once_after_quiet_period() {
        // Arrange
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(1000));

        // Act
        debouncer.record_change(start);
        debouncer.record_change(start + Duration::from_millis(600));

        // Assert
        assert!(!debouncer.fire(start + Duration::from_millis(1200)));
        assert!(debouncer.fire(start + Duration::from_millis(1600)));
        assert!(!debouncer.fire(start + Duration::from_millis(5000)));
    }

    #[tokio::test]
    async fn given_running_watcher_when_module_added_then_regenerates_index() {
        let temp_dir = TempDir::new().unwrap();
        let modules = temp_dir.path().join("Modules");
        fs::create_dir_all(modules.join("HEM/Pathology/anemia")).unwrap();
        let output = temp_dir.path().join("mst.json");
        let generator = Arc::new(StructureGenerator::new(
            FsContentRepository::new(&modules),
            &output,
        ));

        let handle = StructureWatcher::new(
            Arc::clone(&generator),
            &modules,
            Duration::from_millis(10),
            Duration::from_millis(50),
        )
        .spawn();
        tokio::time::sleep(Duration::from_millis(200)).await;
        let initial = generator.read_index().unwrap().unwrap();
        fs::create_dir_all(modules.join("CARDIO/Anatomy")).unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;
        handle.stop().await;

        let updated = generator.read_index().unwrap().unwrap();
        assert_eq!(initial.len(), 1);
        assert_eq!(updated.len(), 2);
        assert!(updated["CARDIO"]["Anatomy"].is_empty());
    }

    #[tokio::test]
    async fn given_missing_root_when_it_appears_then_watcher_keeps_running_and_generates() {
        // Arrange
        let temp_dir = TempDir::new().unwrap();
        let modules = temp_dir.path().join("Modules");
        let output = temp_dir.path().join("mst.json");
        let generator = Arc::new(StructureGenerator::new(
            FsContentRepository::new(&modules),
            &output,
        ));
        let handle = StructureWatcher::new(
            Arc::clone(&generator),
            &modules,
            Duration::from_millis(10),
            Duration::from_millis(50),
        )
        .spawn();
        tokio::time::sleep(Duration::from_millis(200)).await;
        let before = generator.read_index().unwrap();

        // Act
        fs::create_dir_all(modules.join("NEURO/Anatomy")).unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;
        handle.stop().await;

        // Assert
        assert!(before.is_none());
        let index = generator.read_index().unwrap().unwrap();
        assert_eq!(index.len(), 1);
        assert!(index["NEURO"]["Anatomy"].is_empty());
    }
}
