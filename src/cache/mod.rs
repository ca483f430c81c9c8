//! Load-once cache of the parsed dataset.
//!
//! A [`DatasetHandle`] is created by its owner (the CLI command or the MCP
//! server) and passed by reference to whatever needs records. The dataset is
//! read and parsed on the first call to [`DatasetHandle::records`]; every
//! later call shares the same immutable record slice.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use log::{info, warn};

use crate::dataset::{DatasetError, VehicleRecord, parse_dataset};
use crate::storage::DatasetStorage;
use crate::storage::local::LocalStorage;

/// Lazily loaded, shareable record set.
///
/// At most one load runs at a time. Callers that were waiting on a load that
/// failed receive that failure; the next call after it tries again.
pub struct DatasetHandle {
    storage: Box<dyn DatasetStorage>,
    records: OnceLock<Arc<[VehicleRecord]>>,
    last_failure: Mutex<Option<DatasetError>>,
    failures: AtomicU64,
}

impl DatasetHandle {
    /// Create a handle that loads from `storage` on first use.
    #[must_use]
    pub fn new(storage: impl DatasetStorage + 'static) -> Self {
        Self {
            storage: Box::new(storage),
            records: OnceLock::new(),
            last_failure: Mutex::new(None),
            failures: AtomicU64::new(0),
        }
    }

    /// Create a handle for a dataset file on the local filesystem.
    #[must_use]
    pub fn open(path: PathBuf) -> Self {
        Self::new(LocalStorage::new(path))
    }

    /// The loaded records, loading them first if needed.
    ///
    /// # Errors
    ///
    /// Returns the `DatasetError` of the load attempt if reading or parsing fails.
    /// Nothing is cached on failure.
    pub fn records(&self) -> Result<Arc<[VehicleRecord]>, DatasetError> {
        if let Some(records) = self.records.get() {
            return Ok(Arc::clone(records));
        }

        let failures_seen = self.failures.load(Ordering::Acquire);
        let mut last_failure = self
            .last_failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        // Another caller finished a load while we waited for the lock.
        if let Some(records) = self.records.get() {
            return Ok(Arc::clone(records));
        }
        if self.failures.load(Ordering::Acquire) != failures_seen
            && let Some(error) = last_failure.as_ref()
        {
            return Err(error.clone());
        }

        match self.load() {
            Ok(records) => {
                let records: Arc<[VehicleRecord]> = records.into();
                let records = Arc::clone(self.records.get_or_init(|| records));
                *last_failure = None;
                Ok(records)
            }
            Err(e) => {
                warn!("Dataset load from {} failed: {e}", self.storage.location());
                *last_failure = Some(e.clone());
                self.failures.fetch_add(1, Ordering::Release);
                Err(e)
            }
        }
    }

    /// Whether a record set has been published.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.records.get().is_some()
    }

    /// Human-readable location of the backing dataset.
    #[must_use]
    pub fn location(&self) -> String {
        self.storage.location()
    }

    fn load(&self) -> Result<Vec<VehicleRecord>, DatasetError> {
        info!("Loading vehicle dataset from {}", self.storage.location());

        let text = self
            .storage
            .read_dataset()
            .map_err(|e| DatasetError::Storage(e.to_string()))?;
        let records = parse_dataset(&text)?;

        info!("Loaded {} vehicle records", records.len());
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::thread;
    use std::time::Duration;

    use crate::storage::StorageError;

    const DATASET: &str = "make,model,year,fuelType,comb08U,combE,cylinders,displ,drive,trany\n\
                           Chevrolet,Bolt,2018,Electricity,119.0,28.0,,,Front-Wheel Drive,Automatic (A1)\n\
                           Toyota,Camry,2018,Regular Gasoline,32.1,0,4,2.5,Front-Wheel Drive,Automatic (S8)\n";

    /// Serves fixed text and counts reads.
    struct CountingStorage {
        text: String,
        reads: Arc<AtomicUsize>,
        delay: Duration,
    }

    impl DatasetStorage for CountingStorage {
        fn read_dataset(&self) -> Result<String, StorageError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            thread::sleep(self.delay);
            Ok(self.text.clone())
        }

        fn location(&self) -> String {
            "memory".to_string()
        }
    }

    /// Fails the first `failures` reads, then serves the dataset.
    struct FlakyStorage {
        failures: usize,
        reads: Arc<AtomicUsize>,
    }

    impl DatasetStorage for FlakyStorage {
        fn read_dataset(&self) -> Result<String, StorageError> {
            let attempt = self.reads.fetch_add(1, Ordering::SeqCst);
            if attempt < self.failures {
                return Err(StorageError::ReadError("disk on fire".to_string()));
            }
            Ok(DATASET.to_string())
        }

        fn location(&self) -> String {
            "flaky".to_string()
        }
    }

    /// Always fails after a delay, counting reads.
    struct SlowFailingStorage {
        reads: Arc<AtomicUsize>,
        delay: Duration,
    }

    impl DatasetStorage for SlowFailingStorage {
        fn read_dataset(&self) -> Result<String, StorageError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            thread::sleep(self.delay);
            Err(StorageError::ReadError("volume unmounted".to_string()))
        }

        fn location(&self) -> String {
            "slow".to_string()
        }
    }

    fn counting(text: &str, delay: Duration) -> (DatasetHandle, Arc<AtomicUsize>) {
        let reads = Arc::new(AtomicUsize::new(0));
        let handle = DatasetHandle::new(CountingStorage {
            text: text.to_string(),
            reads: Arc::clone(&reads),
            delay,
        });
        (handle, reads)
    }

    #[test]
    fn loads_lazily_and_once() {
        let (handle, reads) = counting(DATASET, Duration::ZERO);
        assert!(!handle.is_loaded());
        assert_eq!(reads.load(Ordering::SeqCst), 0);

        let first = handle.records().unwrap();
        let second = handle.records().unwrap();

        assert!(handle.is_loaded());
        assert_eq!(reads.load(Ordering::SeqCst), 1);
        assert_eq!(first.len(), 2);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn concurrent_callers_share_one_load() {
        let (handle, reads) = counting(DATASET, Duration::from_millis(50));

        let loaded: Vec<_> = thread::scope(|scope| {
            let workers: Vec<_> = (0..8).map(|_| scope.spawn(|| handle.records())).collect();
            workers
                .into_iter()
                .map(|worker| worker.join().unwrap().unwrap())
                .collect()
        });

        assert_eq!(reads.load(Ordering::SeqCst), 1);
        for records in &loaded {
            assert!(Arc::ptr_eq(records, &loaded[0]));
        }
    }

    #[test]
    fn parse_failure_is_not_cached() {
        let bad = "make,model,year,fuelType,comb08U,combE,cylinders,displ,drive,trany\n\
                   Chevrolet,Bolt,later,Electricity,119.0,28.0,,,Front-Wheel Drive,Automatic (A1)\n";
        let (handle, reads) = counting(bad, Duration::ZERO);

        let err = handle.records().unwrap_err();
        assert!(matches!(err, DatasetError::InvalidNumber { line: 2, .. }));
        assert!(!handle.is_loaded());

        // Retried, and fails the same way again.
        assert_eq!(handle.records().unwrap_err(), err);
        assert_eq!(reads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn recovers_after_failed_load() {
        let reads = Arc::new(AtomicUsize::new(0));
        let handle = DatasetHandle::new(FlakyStorage {
            failures: 1,
            reads: Arc::clone(&reads),
        });

        let err = handle.records().unwrap_err();
        assert!(matches!(err, DatasetError::Storage(ref message) if message.contains("disk on fire")));

        let records = handle.records().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(reads.load(Ordering::SeqCst), 2);

        handle.records().unwrap();
        assert_eq!(reads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn concurrent_callers_share_one_failure() {
        let reads = Arc::new(AtomicUsize::new(0));
        let handle = DatasetHandle::new(SlowFailingStorage {
            reads: Arc::clone(&reads),
            delay: Duration::from_millis(100),
        });

        let outcomes: Vec<_> = thread::scope(|scope| {
            let workers: Vec<_> = (0..8).map(|_| scope.spawn(|| handle.records())).collect();
            workers
                .into_iter()
                .map(|worker| worker.join().unwrap())
                .collect()
        });

        assert_eq!(reads.load(Ordering::SeqCst), 1);
        for outcome in &outcomes {
            let err = outcome.as_ref().unwrap_err();
            assert!(matches!(err, DatasetError::Storage(message) if message.contains("volume unmounted")));
        }
        assert!(!handle.is_loaded());

        // A later caller retries rather than reusing the stale failure.
        assert!(handle.records().is_err());
        assert_eq!(reads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn missing_file_reports_location() {
        let handle = DatasetHandle::open(PathBuf::from("/nonexistent/vehicles.csv"));
        let err = handle.records().unwrap_err();

        assert!(err.to_string().contains("/nonexistent/vehicles.csv"));
        assert_eq!(handle.location(), "/nonexistent/vehicles.csv");
    }
}
