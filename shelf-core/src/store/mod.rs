//! User-scoped collection store
//!
//! [`CollectionStore`] owns the library and favorites of the active user.
//! Identity changes re-scope both collections at once: the previous user's
//! data is cleared synchronously and the new user's data is loaded in the
//! background. Every mutation updates memory first, then enqueues a
//! full-collection save on an ordered [`PersistQueue`].
//!
//! Consumers read immutable [`Snapshot`]s, either on demand or by
//! subscribing to a `watch` channel that publishes each change.

pub(crate) mod mutation;

use crate::persist::{self, PersistQueue};
use crate::storage::KeyValueStore;
use crate::types::{Book, ScopePhase, Snapshot, UserScope};
use mutation::{Collections, Mutation, Touched};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, info};

/// Mutable state, guarded by one lock so phase and both collections always
/// change together
#[derive(Debug, Default)]
struct Inner {
    phase: ScopePhase,

    /// Bumped on every scope transition; loads carrying an older epoch are
    /// stale
    epoch: u64,

    collections: Collections,

    /// Mutations made while `Loading`, replayed over the loaded data
    pending: Vec<Mutation>,
}

impl Inner {
    fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase.clone(),
            library: Arc::from(self.collections.library.as_slice()),
            favorites: Arc::from(self.collections.favorites.as_slice()),
        }
    }

    fn reset(&mut self, phase: ScopePhase, queue: &PersistQueue) {
        // Mutations made during an abandoned load still belong to that scope
        if let ScopePhase::Loading(scope) = &self.phase {
            if !self.pending.is_empty() {
                queue.merge(scope.clone(), std::mem::take(&mut self.pending));
            }
        }
        self.epoch += 1;
        self.phase = phase;
        self.collections = Collections::default();
        self.pending.clear();
    }
}

struct Shared {
    runtime: Handle,
    backend: Arc<dyn KeyValueStore>,
    queue: PersistQueue,
    inner: Mutex<Inner>,
    published: watch::Sender<Snapshot>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Mutations never panic halfway through, so poisoned state is usable
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, inner: &Inner) {
        self.published.send_replace(inner.snapshot());
    }

    fn persist(&self, scope: &UserScope, collections: &Collections, touched: Touched) {
        if touched.library {
            self.queue
                .save(persist::library_key(scope), &collections.library);
        }
        if touched.favorites {
            self.queue
                .save(persist::favorites_key(scope), &collections.favorites);
        }
    }

    fn mutate(&self, mutation: Mutation) -> Touched {
        let mut inner = self.lock();
        let touched = inner.collections.apply(&mutation);

        match inner.phase.clone() {
            ScopePhase::Ready(scope) => self.persist(&scope, &inner.collections, touched),
            ScopePhase::Loading(_) => inner.pending.push(mutation),
            ScopePhase::Unscoped => debug!("Mutation without an active user is not persisted"),
        }

        self.publish(&inner);
        touched
    }
}

/// Library and favorites of the active user, kept durable in a
/// [`KeyValueStore`].
///
/// Must be created inside a Tokio runtime; its background work stays on that
/// runtime, so every method may then be called from any thread. Cloning
/// yields another handle to the same store.
#[derive(Clone)]
pub struct CollectionStore {
    shared: Arc<Shared>,
}

impl fmt::Debug for CollectionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.shared.lock();
        f.debug_struct("CollectionStore")
            .field("phase", &inner.phase)
            .field("library", &inner.collections.library.len())
            .field("favorites", &inner.collections.favorites.len())
            .finish()
    }
}

impl CollectionStore {
    /// Create an unscoped store backed by `backend`
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        let runtime = Handle::current();
        let queue = PersistQueue::spawn(&runtime, backend.clone());
        let (published, _) = watch::channel(Snapshot::unscoped());

        Self {
            shared: Arc::new(Shared {
                runtime,
                backend,
                queue,
                inner: Mutex::new(Inner::default()),
                published,
            }),
        }
    }

    /// React to a login, logout or account switch.
    ///
    /// `None` clears both collections immediately. A different scope clears
    /// them immediately and loads the new scope in the background; use
    /// [`ready`](Self::ready) to wait for it. Re-selecting the active scope
    /// does nothing. Mutations made while a scope was still loading are
    /// saved to that scope even if it is abandoned before the load ends.
    pub fn set_active_user(&self, scope: Option<UserScope>) {
        let mut inner = self.shared.lock();

        let Some(scope) = scope else {
            inner.reset(ScopePhase::Unscoped, &self.shared.queue);
            self.shared.publish(&inner);
            info!("Active user cleared");
            return;
        };

        if inner.phase.scope() == Some(&scope) {
            debug!("User {} is already active", scope);
            return;
        }

        inner.reset(ScopePhase::Loading(scope.clone()), &self.shared.queue);
        let epoch = inner.epoch;
        self.shared.publish(&inner);
        drop(inner);

        info!("Switching active user to {}", scope);
        self.shared
            .runtime
            .spawn(load_scope(self.shared.clone(), scope, epoch));
    }

    /// Wait until no scope load is in flight
    pub async fn ready(&self) {
        let mut rx = self.shared.published.subscribe();
        // Err only if the sender is gone, which cannot outlive self
        let _ = rx.wait_for(|snapshot| !snapshot.phase.is_loading()).await;
    }

    /// Prepend `book` to the library
    pub fn add_book(&self, book: Book) {
        debug!("Adding book {}", book.id);
        self.shared.mutate(Mutation::Add(book));
    }

    /// Remove `book` from favorites if a favorite with its id exists,
    /// otherwise append it.
    ///
    /// While a scope is loading the toggle shows against the cleared
    /// collections, then replays against the loaded ones, so a book that
    /// looked favorited can end up un-favorited once the load resolves.
    pub fn toggle_favorite(&self, book: Book) {
        debug!("Toggling favorite {}", book.id);
        self.shared.mutate(Mutation::Toggle(book));
    }

    /// Remove every library entry with `id`, and its favorite.
    ///
    /// Returns whether anything visible was removed. While a scope is still
    /// loading the removal is also applied to the loaded data.
    pub fn remove_book(&self, id: &str) -> bool {
        debug!("Removing book {}", id);
        self.shared.mutate(Mutation::Remove(id.to_string())).any()
    }

    /// Current library, newest first
    pub fn library(&self) -> Arc<[Book]> {
        self.shared.published.borrow().library.clone()
    }

    /// Current favorites, in favoriting order
    pub fn favorites(&self) -> Arc<[Book]> {
        self.shared.published.borrow().favorites.clone()
    }

    /// Whether a book with this id is currently a favorite
    pub fn is_favorite(&self, id: &str) -> bool {
        self.shared.published.borrow().is_favorite(id)
    }

    /// Both collections and the phase as one consistent value
    pub fn snapshot(&self) -> Snapshot {
        self.shared.published.borrow().clone()
    }

    /// Receive every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.shared.published.subscribe()
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> ScopePhase {
        self.shared.published.borrow().phase.clone()
    }

    /// The scope being loaded or ready, `None` when logged out
    pub fn active_scope(&self) -> Option<UserScope> {
        self.phase().scope().cloned()
    }

    /// Wait until every save enqueued so far has been attempted
    pub async fn flush(&self) {
        self.shared.queue.flush().await;
    }

    /// Write out pending saves and stop persisting. The in-memory
    /// collections stay readable.
    pub async fn dispose(&self) {
        self.shared.queue.shutdown().await;
        debug!("Collection store disposed");
    }
}

async fn load_scope(shared: Arc<Shared>, scope: UserScope, epoch: u64) {
    // Saves for this scope from an earlier session may still be queued
    shared.queue.flush().await;

    let backend = shared.backend.as_ref();
    let library = persist::load_collection(backend, &persist::library_key(&scope)).await;
    let favorites = persist::load_collection(backend, &persist::favorites_key(&scope)).await;

    let mut inner = shared.lock();
    if inner.epoch != epoch {
        debug!("Discarding stale load for {}", scope);
        return;
    }

    inner.collections = Collections { library, favorites };
    let pending = std::mem::take(&mut inner.pending);
    let mut touched = Touched::default();
    for mutation in &pending {
        touched |= inner.collections.apply(mutation);
    }
    inner.phase = ScopePhase::Ready(scope.clone());

    shared.persist(&scope, &inner.collections, touched);
    shared.publish(&inner);

    info!(
        "Loaded {} books and {} favorites for {}",
        inner.collections.library.len(),
        inner.collections.favorites.len(),
        scope
    );
}
