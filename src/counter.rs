//! Best-effort count of matches played.
//!
//! Backends are tried in order; the first one that answers wins and the
//! reading is tagged with where it came from. When every backend fails the
//! count is kept in memory and tagged [`CounterSource::Offline`]. Reading or
//! bumping the counter never fails.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::CounterError;

/// Where a count came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterSource {
    /// A shared, cross-installation counter.
    Global,
    /// Storage on this machine.
    Local,
    /// No backend answered; in-memory only.
    Offline,
}

/// A count tagged with its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterReading {
    /// Matches played.
    pub count: u64,
    /// Backend that produced the count.
    pub source: CounterSource,
}

/// Reads and bumps the number of matches played.
pub trait MatchCounter: Send {
    /// The count as it stands.
    fn current(&mut self) -> CounterReading;
    /// Add one and return the new count.
    fn increment(&mut self) -> CounterReading;
}

/// One storage strategy for [`FallbackCounter`].
pub trait CounterBackend: Send {
    /// Tag for readings from this backend.
    fn source(&self) -> CounterSource;

    /// Read the stored count.
    ///
    /// # Errors
    ///
    /// Returns [`CounterError`] if the backend cannot answer.
    fn read(&mut self) -> Result<u64, CounterError>;

    /// Add one and return the new count.
    ///
    /// # Errors
    ///
    /// Returns [`CounterError`] if the backend cannot answer.
    fn increment(&mut self) -> Result<u64, CounterError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredCount {
    count: u64,
}

/// Count kept in a small JSON file.
#[derive(Debug, Clone)]
pub struct LocalFileCounter {
    path: PathBuf,
}

impl LocalFileCounter {
    /// Counter stored at `path`. The file is created on first increment.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CounterBackend for LocalFileCounter {
    fn source(&self) -> CounterSource {
        CounterSource::Local
    }

    fn read(&mut self) -> Result<u64, CounterError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(serde_json::from_str::<StoredCount>(&text)?.count),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    fn increment(&mut self) -> Result<u64, CounterError> {
        let count = self.read()?.saturating_add(1);
        let text = serde_json::to_string(&StoredCount { count })?;
        std::fs::write(&self.path, text)?;
        Ok(count)
    }
}

/// Tries each backend in order, then falls back to an in-memory count.
#[derive(Default)]
pub struct FallbackCounter {
    backends: Vec<Box<dyn CounterBackend>>,
    offline: u64,
}

impl std::fmt::Debug for FallbackCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackCounter")
            .field("backends", &self.backends.len())
            .field("offline", &self.offline)
            .finish()
    }
}

impl FallbackCounter {
    /// Counter with no backends; always offline.
    #[must_use]
    pub fn offline() -> Self {
        Self::default()
    }

    /// Append a backend to the cascade.
    #[must_use]
    pub fn with_backend(mut self, backend: impl CounterBackend + 'static) -> Self {
        self.backends.push(Box::new(backend));
        self
    }

    fn cascade(
        &mut self,
        mut op: impl FnMut(&mut dyn CounterBackend) -> Result<u64, CounterError>,
    ) -> Option<CounterReading> {
        for backend in &mut self.backends {
            let source = backend.source();
            match op(backend.as_mut()) {
                Ok(count) => {
                    debug!(?source, count, "match counter answered");
                    return Some(CounterReading { count, source });
                }
                Err(e) => warn!(?source, error = %e, "match counter backend failed"),
            }
        }
        None
    }
}

impl MatchCounter for FallbackCounter {
    fn current(&mut self) -> CounterReading {
        self.cascade(|b| b.read()).unwrap_or(CounterReading {
            count: self.offline,
            source: CounterSource::Offline,
        })
    }

    fn increment(&mut self) -> CounterReading {
        if let Some(reading) = self.cascade(|b| b.increment()) {
            return reading;
        }
        self.offline = self.offline.saturating_add(1);
        CounterReading {
            count: self.offline,
            source: CounterSource::Offline,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    impl CounterBackend for Broken {
        fn source(&self) -> CounterSource {
            CounterSource::Global
        }
        fn read(&mut self) -> Result<u64, CounterError> {
            Err(CounterError::Unavailable("no network".into()))
        }
        fn increment(&mut self) -> Result<u64, CounterError> {
            Err(CounterError::Unavailable("no network".into()))
        }
    }

    #[test]
    fn test_local_file_counts_up() {
        let dir = tempfile::tempdir().unwrap();
        let mut counter = LocalFileCounter::new(dir.path().join("count.json"));
        assert_eq!(counter.read().unwrap(), 0);
        assert_eq!(counter.increment().unwrap(), 1);
        assert_eq!(counter.increment().unwrap(), 2);
        assert_eq!(LocalFileCounter::new(counter.path()).read().unwrap(), 2);
    }

    #[test]
    fn test_local_file_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("count.json");
        std::fs::write(&path, "not json").unwrap();
        let mut counter = LocalFileCounter::new(path);
        assert!(matches!(counter.read(), Err(CounterError::Corrupt(_))));
    }

    #[test]
    fn test_falls_through_to_local() {
        let dir = tempfile::tempdir().unwrap();
        let mut counter = FallbackCounter::offline()
            .with_backend(Broken)
            .with_backend(LocalFileCounter::new(dir.path().join("count.json")));

        let reading = counter.increment();
        assert_eq!(reading, CounterReading { count: 1, source: CounterSource::Local });
        assert_eq!(counter.current().source, CounterSource::Local);
    }

    #[test]
    fn test_offline_when_everything_fails() {
        let mut counter = FallbackCounter::offline().with_backend(Broken);
        assert_eq!(counter.current(), CounterReading { count: 0, source: CounterSource::Offline });
        counter.increment();
        assert_eq!(counter.increment(), CounterReading { count: 2, source: CounterSource::Offline });
    }

    #[test]
    fn test_unwritable_path_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let mut counter = FallbackCounter::offline()
            .with_backend(LocalFileCounter::new(dir.path().join("missing/dir/count.json")));
        assert_eq!(counter.increment().source, CounterSource::Offline);
    }
}
