//! Write-behind adapter backed by a single writer thread.

use crate::repo::kv_repo::KvRepository;
use crossbeam_channel::{bounded, unbounded, Sender};
use log::{debug, error, warn};
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

const WRITER_THREAD_NAME: &str = "memoryshare-writer";

enum WriteCommand {
    Set { key: String, value: String },
    Flush(Sender<()>),
}

/// Clonable handle to the key-value persistence boundary.
///
/// Every clone shares one repository and one writer thread. The writer is
/// drained and joined when the last handle is dropped.
#[derive(Clone)]
pub struct PersistenceAdapter {
    inner: Arc<AdapterInner>,
}

struct AdapterInner {
    repo: Arc<dyn KvRepository>,
    tx: Option<Sender<WriteCommand>>,
    worker: Option<JoinHandle<()>>,
    write_failures: Arc<AtomicU64>,
}

impl PersistenceAdapter {
    /// Starts the writer thread over `repo`.
    ///
    /// # Errors
    /// - Returns the OS error when the writer thread cannot be spawned.
    pub fn new(repo: Arc<dyn KvRepository>) -> io::Result<Self> {
        let (tx, rx) = unbounded::<WriteCommand>();
        let write_failures = Arc::new(AtomicU64::new(0));

        let worker_repo = Arc::clone(&repo);
        let worker_failures = Arc::clone(&write_failures);
        let worker = thread::Builder::new()
            .name(WRITER_THREAD_NAME.to_string())
            .spawn(move || {
                for command in rx.iter() {
                    match command {
                        WriteCommand::Set { key, value } => {
                            apply_write(worker_repo.as_ref(), &worker_failures, &key, &value);
                        }
                        WriteCommand::Flush(ack) => {
                            let _ = ack.send(());
                        }
                    }
                }
                debug!("event=kv_writer_stop module=persistence status=ok");
            })?;

        Ok(Self {
            inner: Arc::new(AdapterInner {
                repo,
                tx: Some(tx),
                worker: Some(worker),
                write_failures,
            }),
        })
    }

    /// Returns the stored value for `key`, or `None` when absent or unreadable.
    ///
    /// Writes queued before this call are applied first, so a reader always
    /// observes its own earlier `set`.
    pub fn get(&self, key: &str) -> Option<String> {
        self.flush();
        match self.inner.repo.get(key) {
            Ok(value) => value,
            Err(err) => {
                warn!(
                    "event=kv_read module=persistence status=error key={} error={}",
                    key, err
                );
                None
            }
        }
    }

    /// Queues `value` to be stored under `key` and returns immediately.
    pub fn set(&self, key: &str, value: String) {
        let Some(tx) = self.inner.tx.as_ref() else {
            return;
        };
        let command = WriteCommand::Set {
            key: key.to_string(),
            value,
        };
        if tx.send(command).is_err() {
            self.inner.write_failures.fetch_add(1, Ordering::Relaxed);
            error!(
                "event=kv_write module=persistence status=error key={} error_code=writer_stopped",
                key
            );
        }
    }

    /// Blocks until every write queued before this call has been applied.
    pub fn flush(&self) {
        let Some(tx) = self.inner.tx.as_ref() else {
            return;
        };
        let (ack_tx, ack_rx) = bounded(1);
        if tx.send(WriteCommand::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.recv();
        }
    }

    /// Number of writes that failed since the adapter started.
    ///
    /// A non-zero value means the on-disk state lags the in-memory state.
    pub fn write_failure_count(&self) -> u64 {
        self.inner.write_failures.load(Ordering::Relaxed)
    }
}

impl Drop for AdapterInner {
    fn drop(&mut self) {
        // Closing the channel ends the writer loop after queued writes drain.
        drop(self.tx.take());
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("event=kv_writer_stop module=persistence status=error error_code=writer_panicked");
            }
        }
    }
}

fn apply_write(repo: &dyn KvRepository, failures: &AtomicU64, key: &str, value: &str) {
    let started_at = Instant::now();
    match repo.set(key, value) {
        Ok(()) => debug!(
            "event=kv_write module=persistence status=ok key={} bytes={} duration_ms={}",
            key,
            value.len(),
            started_at.elapsed().as_millis()
        ),
        Err(err) => {
            failures.fetch_add(1, Ordering::Relaxed);
            error!(
                "event=kv_write module=persistence status=error key={} duration_ms={} error={}",
                key,
                started_at.elapsed().as_millis(),
                err
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PersistenceAdapter;
    use crate::db::open_db_in_memory;
    use crate::repo::kv_repo::{KvRepository, RepoError, RepoResult, SqliteKvRepository};
    use std::sync::Arc;

    struct BrokenRepository;

    impl KvRepository for BrokenRepository {
        fn get(&self, key: &str) -> RepoResult<Option<String>> {
            Err(RepoError::InvalidKey(key.to_string()))
        }
        fn set(&self, key: &str, _value: &str) -> RepoResult<()> {
            Err(RepoError::InvalidKey(key.to_string()))
        }
    }

    fn sqlite_repo() -> Arc<SqliteKvRepository> {
        Arc::new(SqliteKvRepository::new(open_db_in_memory().unwrap()))
    }

    #[test]
    fn later_write_to_same_key_wins() {
        let repo = sqlite_repo();
        let adapter = PersistenceAdapter::new(repo.clone()).unwrap();
        for idx in 0..200 {
            adapter.set("counter", idx.to_string());
        }
        adapter.flush();
        assert_eq!(repo.get("counter").unwrap().as_deref(), Some("199"));
    }

    #[test]
    fn get_observes_queued_writes() {
        let adapter = PersistenceAdapter::new(sqlite_repo()).unwrap();
        adapter.set("k", "v".to_string());
        assert_eq!(adapter.get("k").as_deref(), Some("v"));
    }

    #[test]
    fn dropping_last_handle_drains_pending_writes() {
        let repo = sqlite_repo();
        {
            let adapter = PersistenceAdapter::new(repo.clone()).unwrap();
            let clone = adapter.clone();
            clone.set("a", "1".to_string());
            adapter.set("b", "2".to_string());
        }
        assert_eq!(repo.get("a").unwrap().as_deref(), Some("1"));
        assert_eq!(repo.get("b").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn failures_are_swallowed_and_counted() {
        let adapter = PersistenceAdapter::new(Arc::new(BrokenRepository)).unwrap();
        assert_eq!(adapter.get("k"), None);

        adapter.set("k", "v".to_string());
        adapter.flush();
        assert_eq!(adapter.write_failure_count(), 1);
    }
}
