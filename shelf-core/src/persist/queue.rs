//! Ordered background writer
//!
//! Every save captures a full collection payload at call time and is pushed
//! onto one FIFO channel. A single task applies them in order, so a slow
//! earlier write can never land after a later one.

use super::{encode, favorites_key, library_key, load_collection};
use crate::storage::KeyValueStore;
use crate::store::mutation::{Collections, Mutation, Touched};
use crate::types::{Book, UserScope};
use std::fmt;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

/// Commands handled by the writer task
enum WriteCommand {
    /// Store a payload under a key
    Write { key: String, payload: String },

    /// Replay mutations over the stored collections of a scope
    Merge {
        scope: UserScope,
        mutations: Vec<Mutation>,
    },

    /// Signal once every earlier command has been handled
    Flush(oneshot::Sender<()>),

    /// Stop accepting writes, then signal
    Shutdown(oneshot::Sender<()>),
}

/// Handle to the writer task. Cloning shares the same queue.
#[derive(Clone)]
pub struct PersistQueue {
    tx: mpsc::UnboundedSender<WriteCommand>,
}

impl fmt::Debug for PersistQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistQueue")
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

impl PersistQueue {
    /// Spawn the writer task on `runtime`
    pub fn spawn(runtime: &Handle, backend: Arc<dyn KeyValueStore>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        runtime.spawn(run_writer(backend, rx));
        Self { tx }
    }

    /// Enqueue a full-collection save under `key`
    pub fn save(&self, key: String, books: &[Book]) {
        match encode(books) {
            Ok(payload) => self.enqueue(key, payload),
            Err(e) => warn!("Failed to encode {}, skipping save: {}", key, e),
        }
    }

    /// Enqueue a raw payload write
    pub fn enqueue(&self, key: String, payload: String) {
        if let Err(mpsc::error::SendError(WriteCommand::Write { key, .. })) =
            self.tx.send(WriteCommand::Write { key, payload })
        {
            warn!("Persist queue is shut down, dropping write for {}", key);
        }
    }

    /// Apply `mutations` to whatever is stored for `scope` and save the
    /// result, in queue order with every other write
    pub(crate) fn merge(&self, scope: UserScope, mutations: Vec<Mutation>) {
        if self
            .tx
            .send(WriteCommand::Merge { scope, mutations })
            .is_err()
        {
            warn!("Persist queue is shut down, dropping merged mutations");
        }
    }

    /// Wait until every write enqueued before this call has been attempted
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(WriteCommand::Flush(done_tx)).is_ok() {
            // Dropped sender means the writer already stopped
            let _ = done_rx.await;
        }
    }

    /// Drain pending writes and stop the writer. Later saves are dropped.
    pub async fn shutdown(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(WriteCommand::Shutdown(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.tx.is_closed()
    }
}

async fn run_writer(
    backend: Arc<dyn KeyValueStore>,
    mut rx: mpsc::UnboundedReceiver<WriteCommand>,
) {
    let mut stopped = None;
    while let Some(command) = rx.recv().await {
        match command {
            WriteCommand::Write { key, payload } => write(backend.as_ref(), key, payload).await,
            WriteCommand::Merge { scope, mutations } => {
                merge(backend.as_ref(), &scope, &mutations).await
            }
            WriteCommand::Flush(done) => {
                let _ = done.send(());
            }
            // Commands already queued behind the shutdown still run
            WriteCommand::Shutdown(done) => {
                rx.close();
                match stopped {
                    None => stopped = Some(done),
                    Some(_) => {
                        let _ = done.send(());
                    }
                }
            }
        }
    }

    if let Some(done) = stopped {
        let _ = done.send(());
    }
    debug!("Persist queue stopped");
}

async fn write(backend: &dyn KeyValueStore, key: String, payload: String) {
    match backend.set(&key, payload).await {
        Ok(()) => debug!("Persisted {}", key),
        // The next mutation rewrites the whole collection
        Err(e) => warn!("Failed to persist {}: {}", key, e),
    }
}

async fn merge(backend: &dyn KeyValueStore, scope: &UserScope, mutations: &[Mutation]) {
    let library_key = library_key(scope);
    let favorites_key = favorites_key(scope);
    let mut collections = Collections {
        library: load_collection(backend, &library_key).await,
        favorites: load_collection(backend, &favorites_key).await,
    };

    let mut touched = Touched::default();
    for mutation in mutations {
        touched |= collections.apply(mutation);
    }

    if touched.library {
        match encode(&collections.library) {
            Ok(payload) => write(backend, library_key, payload).await,
            Err(e) => warn!("Failed to encode {}, skipping save: {}", library_key, e),
        }
    }
    if touched.favorites {
        match encode(&collections.favorites) {
            Ok(payload) => write(backend, favorites_key, payload).await,
            Err(e) => warn!("Failed to encode {}, skipping save: {}", favorites_key, e),
        }
    }
    debug!("Merged {} mutations into {}", mutations.len(), scope);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[tokio::test]
    async fn test_last_enqueued_write_wins() {
        let backend = Arc::new(MemoryStore::new());
        let queue = PersistQueue::spawn(&Handle::current(), backend.clone());

        queue.enqueue("library:u".to_string(), "[1]".to_string());
        queue.enqueue("library:u".to_string(), "[1,2]".to_string());
        queue.enqueue("library:u".to_string(), "[1,2,3]".to_string());
        queue.flush().await;

        assert_eq!(
            backend.get("library:u").await.unwrap().as_deref(),
            Some("[1,2,3]")
        );
    }

    #[tokio::test]
    async fn test_writes_after_shutdown_are_dropped() {
        let backend = Arc::new(MemoryStore::new());
        let queue = PersistQueue::spawn(&Handle::current(), backend.clone());

        queue.save("library:u".to_string(), &[Book::new("1", "T")]);
        queue.shutdown().await;
        assert!(queue.is_shut_down());

        queue.enqueue("library:u".to_string(), "[]".to_string());
        queue.flush().await;

        let stored = backend.get("library:u").await.unwrap().unwrap();
        assert!(stored.contains("\"id\":\"1\""));
    }

    #[tokio::test]
    async fn test_merge_replays_over_stored_collections() {
        let backend = Arc::new(MemoryStore::new());
        let queue = PersistQueue::spawn(&Handle::current(), backend.clone());
        let scope = UserScope::new("u").unwrap();

        queue.save(library_key(&scope), &[Book::new("1", "Old")]);
        queue.merge(
            scope.clone(),
            vec![
                Mutation::Add(Book::new("2", "New")),
                Mutation::Toggle(Book::new("1", "Old")),
            ],
        );
        queue.flush().await;

        let library = crate::persist::decode(&backend.get("library:u").await.unwrap().unwrap());
        let favorites =
            crate::persist::decode(&backend.get("favorites:u").await.unwrap().unwrap());
        let ids: Vec<&str> = library.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1"]);
        assert_eq!(favorites, vec![Book::new("1", "Old")]);
    }
}
