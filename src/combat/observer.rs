//! Death notification sinks
//!
//! Observers are called synchronously from the combat worker, outside the
//! population lock. Each observer owns whatever lock its sink needs.

use std::fs::{File, OpenOptions};
use std::io::{self, LineWriter, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Local;

use crate::core::error::{panic_message, ArenaError, Result};

/// Receives `(killer, victim)` labels for every kill
pub trait DeathObserver: Send + Sync {
    fn on_death(&self, killer: &str, victim: &str) -> Result<()>;

    /// Short name used when reporting failures
    fn name(&self) -> &str;
}

/// Insertion-ordered fan-out over registered observers
#[derive(Clone, Default)]
pub struct ObserverSet {
    observers: Vec<Arc<dyn DeathObserver>>,
}

impl ObserverSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, observer: Arc<dyn DeathObserver>) {
        self.observers.push(observer);
    }

    pub fn with(mut self, observer: Arc<dyn DeathObserver>) -> Self {
        self.push(observer);
        self
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Notify every observer; returns how many accepted the event
    ///
    /// A failing or panicking observer is logged and skipped.
    pub fn notify(&self, killer: &str, victim: &str) -> usize {
        let mut delivered = 0;
        for observer in &self.observers {
            match panic::catch_unwind(AssertUnwindSafe(|| observer.on_death(killer, victim))) {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(e)) => tracing::warn!(
                    observer = observer.name(),
                    error = %e,
                    "Death observer failed"
                ),
                Err(payload) => tracing::error!(
                    observer = observer.name(),
                    panic = %panic_message(&*payload),
                    "Death observer panicked"
                ),
            }
        }
        delivered
    }
}

impl std::fmt::Debug for ObserverSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.observers.iter().map(|o| o.name()))
            .finish()
    }
}

/// Prints `[BATTLE] HH:MM:SS - killer killed victim` to stdout
#[derive(Debug, Default)]
pub struct ConsoleObserver;

impl ConsoleObserver {
    pub fn new() -> Self {
        Self
    }
}

impl DeathObserver for ConsoleObserver {
    fn on_death(&self, killer: &str, victim: &str) -> Result<()> {
        let line = format!(
            "[BATTLE] {} - {} killed {}",
            Local::now().format("%H:%M:%S"),
            killer,
            victim
        );
        let mut out = io::stdout().lock();
        writeln!(out, "{}", line)?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}

/// Append-only death log bracketed by session markers
pub struct FileObserver {
    path: PathBuf,
    file: Mutex<LineWriter<File>>,
}

impl FileObserver {
    /// Open (or create) the log and write the session-start marker
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut writer = LineWriter::new(file);
        writeln!(writer, "\n=== LOG SESSION START ===")?;
        writeln!(writer, "Time: {}", Local::now().format("%Y-%m-%d %H:%M:%S"))?;

        tracing::info!(path = %path.display(), "Opened death log");
        Ok(Self {
            path,
            file: Mutex::new(writer),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DeathObserver for FileObserver {
    fn on_death(&self, killer: &str, victim: &str) -> Result<()> {
        let mut file = self
            .file
            .lock()
            .map_err(|_| ArenaError::Observer(format!("{} lock poisoned", self.path.display())))?;
        writeln!(
            file,
            "{} - {} killed {}",
            Local::now().format("%H:%M:%S"),
            killer,
            victim
        )?;
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

impl Drop for FileObserver {
    fn drop(&mut self) {
        let file = self.file.get_mut().unwrap_or_else(PoisonError::into_inner);
        let closed = writeln!(file, "=== LOG SESSION END ===")
            .and_then(|_| writeln!(file, "Time: {}", Local::now().format("%Y-%m-%d %H:%M:%S")))
            .and_then(|_| file.flush());
        if let Err(e) = closed {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to close death log");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<(String, String)>>,
    }

    impl DeathObserver for Recorder {
        fn on_death(&self, killer: &str, victim: &str) -> Result<()> {
            self.events
                .lock()
                .unwrap()
                .push((killer.to_string(), victim.to_string()));
            Ok(())
        }

        fn name(&self) -> &str {
            "recorder"
        }
    }

    struct Broken {
        calls: AtomicUsize,
    }

    impl DeathObserver for Broken {
        fn on_death(&self, _killer: &str, _victim: &str) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ArenaError::Observer("sink unavailable".into()))
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    struct Panicking {
        calls: AtomicUsize,
    }

    impl DeathObserver for Panicking {
        fn on_death(&self, _killer: &str, _victim: &str) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            panic!("sink exploded");
        }

        fn name(&self) -> &str {
            "panicking"
        }
    }

    fn temp_log(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("npc_arena_{}_{}.txt", tag, std::process::id()))
    }

    #[test]
    fn test_empty_set_is_fine() {
        let set = ObserverSet::new();
        assert!(set.is_empty());
        assert_eq!(set.notify("Killer", "Victim"), 0);
    }

    #[test]
    fn test_failing_observer_does_not_block_others() {
        let broken = Arc::new(Broken { calls: AtomicUsize::new(0) });
        let recorder = Arc::new(Recorder::default());
        let set = ObserverSet::new()
            .with(broken.clone())
            .with(recorder.clone());

        assert_eq!(set.notify("Arthur (Knight)", "Grom (Orc)"), 1);
        assert_eq!(broken.calls.load(Ordering::SeqCst), 1);
        let events = recorder.events.lock().unwrap();
        assert_eq!(events.as_slice(), &[("Arthur (Knight)".to_string(), "Grom (Orc)".to_string())]);
    }

    #[test]
    fn test_panicking_observer_does_not_block_others() {
        let panicking = Arc::new(Panicking { calls: AtomicUsize::new(0) });
        let recorder = Arc::new(Recorder::default());
        let set = ObserverSet::new()
            .with(panicking.clone())
            .with(recorder.clone());

        assert_eq!(set.notify("Arthur (Knight)", "Grom (Orc)"), 1);
        assert_eq!(set.notify("Grom (Orc)", "Bruin (Bear)"), 1);
        assert_eq!(panicking.calls.load(Ordering::SeqCst), 2);
        assert_eq!(recorder.events.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_console_observer_writes() {
        assert!(ConsoleObserver::new().on_death("Killer", "Victim").is_ok());
    }

    #[test]
    fn test_file_observer_session_markers() {
        let path = temp_log("markers");
        let _ = std::fs::remove_file(&path);
        {
            let observer = FileObserver::open(&path).expect("log should open");
            observer.on_death("Arthur (Knight)", "Grom (Orc)").unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("=== LOG SESSION START ==="));
        assert!(contents.contains("Arthur (Knight) killed Grom (Orc)"));
        assert!(contents.trim_end().lines().rev().nth(1).unwrap().contains("LOG SESSION END"));
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_file_observer_concurrent_writers() {
        let path = temp_log("threads");
        let _ = std::fs::remove_file(&path);
        let observer = Arc::new(FileObserver::open(&path).unwrap());

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let observer = Arc::clone(&observer);
                std::thread::spawn(move || {
                    for j in 0..10 {
                        observer
                            .on_death(&format!("Killer_{}", i), &format!("Victim_{}", j))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        drop(observer);

        let contents = std::fs::read_to_string(&path).unwrap();
        let kills = contents.lines().filter(|l| l.contains(" killed ")).count();
        assert_eq!(kills, 100);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_file_observer_open_failure() {
        let path = std::env::temp_dir()
            .join("npc_arena_missing_dir")
            .join("nested")
            .join("log.txt");
        assert!(matches!(FileObserver::open(&path), Err(ArenaError::IoError(_))));
    }
}
