//! Async state for remote collections.
//!
//! A [`FetchBinding`] owns one [`RemoteCollectionState`] and the tasks that
//! feed it. Views call [`FetchBinding::poll`] once per frame to commit
//! whatever settled since the last frame. Every fetch carries the generation
//! it was started under; only the latest generation is ever committed, so a
//! slow response for an old filter set can never overwrite a newer one.

use std::{any::Any, future::Future, panic::AssertUnwindSafe, sync::Arc};

use futures::future::{BoxFuture, FutureExt};
use tokio::{
    runtime::Handle,
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
};
use tracing::{debug, error};

use crate::error::ApiError;

/// Re-invocable fetch operation.
pub type Fetcher<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<T, ApiError>> + Send + Sync>;

pub fn fetcher<T, F, Fut>(f: F) -> Fetcher<T>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
{
    Arc::new(move || f().boxed())
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteCollectionState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<ApiError>,
}

impl<T> Default for RemoteCollectionState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

/// What a list screen should draw for its current state.
#[derive(Debug, Clone, PartialEq)]
pub enum ListView<R> {
    Loading,
    Failed(String),
    Empty(String),
    Rows(Vec<R>),
}

impl<T> RemoteCollectionState<Vec<T>> {
    /// Loading wins over error, error over empty.
    pub fn list_view<R>(
        &self,
        map: impl FnMut(&T) -> R,
        failure_prefix: &str,
        empty_notice: &str,
    ) -> ListView<R> {
        if self.loading {
            return ListView::Loading;
        }
        if let Some(err) = &self.error {
            return ListView::Failed(format!("{failure_prefix}{err}"));
        }
        match &self.data {
            Some(items) if !items.is_empty() => ListView::Rows(items.iter().map(map).collect()),
            _ => ListView::Empty(empty_notice.to_string()),
        }
    }
}

/// Await `future`, reporting a panic inside it as an error so the waiting
/// view still gets an outcome.
async fn guarded<T>(
    label: &'static str,
    future: impl Future<Output = Result<T, ApiError>>,
) -> Result<T, ApiError> {
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            error!(task = label, %message, "background task panicked");
            Err(ApiError::Interrupted(message))
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "panic".to_string())
}

struct Settled<T> {
    generation: u64,
    result: Result<T, ApiError>,
}

pub struct FetchBinding<K, T> {
    label: &'static str,
    runtime: Handle,
    key: Option<K>,
    fetcher: Option<Fetcher<T>>,
    trigger: u64,
    generation: u64,
    state: RemoteCollectionState<T>,
    settled_tx: UnboundedSender<Settled<T>>,
    settled_rx: UnboundedReceiver<Settled<T>>,
    in_flight: Vec<JoinHandle<()>>,
}

impl<K, T> FetchBinding<K, T>
where
    K: PartialEq + std::fmt::Debug,
    T: Send + 'static,
{
    pub fn new(label: &'static str, runtime: Handle) -> Self {
        let (settled_tx, settled_rx) = mpsc::unbounded_channel();
        Self {
            label,
            runtime,
            key: None,
            fetcher: None,
            trigger: 0,
            generation: 0,
            state: RemoteCollectionState::default(),
            settled_tx,
            settled_rx,
            in_flight: Vec::new(),
        }
    }

    /// Bind `fetcher` under `key`. Starts a fetch only when the key differs
    /// from the bound one; returns whether it did.
    pub fn bind(&mut self, key: K, fetcher: Fetcher<T>) -> bool {
        if self.key.as_ref() == Some(&key) {
            return false;
        }
        debug!(binding = self.label, ?key, "identity changed");
        self.key = Some(key);
        self.fetcher = Some(fetcher);
        self.start();
        true
    }

    /// Fetch again with the bound operation, even if nothing changed.
    pub fn refetch(&mut self) {
        self.trigger += 1;
        self.start();
    }

    fn start(&mut self) {
        let Some(fetcher) = self.fetcher.clone() else {
            return;
        };

        self.generation += 1;
        self.state.loading = true;
        self.state.error = None;
        self.in_flight.retain(|task| !task.is_finished());

        let generation = self.generation;
        let label = self.label;
        let future = fetcher();
        let settled_tx = self.settled_tx.clone();
        debug!(
            binding = self.label,
            generation,
            trigger = self.trigger,
            "fetch started"
        );
        self.in_flight.push(self.runtime.spawn(async move {
            let result = guarded(label, future).await;
            let _ = settled_tx.send(Settled { generation, result });
        }));
    }

    /// Commit everything that settled since the last call. Returns true if
    /// the state changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Ok(settled) = self.settled_rx.try_recv() {
            changed |= self.commit(settled);
        }
        changed
    }

    /// Wait until the latest fetch has been committed.
    pub async fn settled(&mut self) {
        self.poll();
        while self.state.loading {
            match self.settled_rx.recv().await {
                Some(settled) => {
                    self.commit(settled);
                }
                None => break,
            }
        }
    }

    fn commit(&mut self, settled: Settled<T>) -> bool {
        if settled.generation != self.generation {
            debug!(
                binding = self.label,
                generation = settled.generation,
                latest = self.generation,
                "discarding superseded result"
            );
            return false;
        }

        self.state.loading = false;
        match settled.result {
            Ok(data) => {
                debug!(binding = self.label, generation = settled.generation, "fetch committed");
                self.state.data = Some(data);
                self.state.error = None;
            }
            Err(err) => {
                debug!(binding = self.label, generation = settled.generation, error = %err, "fetch failed");
                self.state.error = Some(err);
            }
        }
        true
    }

    pub fn state(&self) -> &RemoteCollectionState<T> {
        &self.state
    }

    pub fn data(&self) -> Option<&T> {
        self.state.data.as_ref()
    }

    pub fn loading(&self) -> bool {
        self.state.loading
    }

    pub fn error(&self) -> Option<&ApiError> {
        self.state.error.as_ref()
    }

    pub fn key(&self) -> Option<&K> {
        self.key.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl<K, T> Drop for FetchBinding<K, T> {
    fn drop(&mut self) {
        for task in self.in_flight.drain(..) {
            task.abort();
        }
    }
}

/// Fire-and-collect queue for remote mutations. Results come back tagged with
/// the `K` they were spawned under so the owning view can react.
///
/// Unlike fetches, a mutation that was already sent runs to completion when
/// the queue is dropped; only its outcome is discarded.
pub struct Mutations<K> {
    runtime: Handle,
    done_tx: UnboundedSender<(K, Result<(), ApiError>)>,
    done_rx: UnboundedReceiver<(K, Result<(), ApiError>)>,
    pending: usize,
}

impl<K: Send + 'static> Mutations<K> {
    pub fn new(runtime: Handle) -> Self {
        let (done_tx, done_rx) = mpsc::unbounded_channel();
        Self {
            runtime,
            done_tx,
            done_rx,
            pending: 0,
        }
    }

    pub fn spawn<F>(&mut self, kind: K, mutation: F)
    where
        F: Future<Output = Result<(), ApiError>> + Send + 'static,
    {
        self.pending += 1;
        let done_tx = self.done_tx.clone();
        self.runtime.spawn(async move {
            let result = guarded("mutation", mutation).await;
            let _ = done_tx.send((kind, result));
        });
    }

    pub fn poll(&mut self) -> Vec<(K, Result<(), ApiError>)> {
        let mut finished = Vec::new();
        while let Ok(outcome) = self.done_rx.try_recv() {
            self.pending = self.pending.saturating_sub(1);
            finished.push(outcome);
        }
        finished
    }

    /// Next finished mutation, or `None` when nothing is in flight.
    pub async fn next(&mut self) -> Option<(K, Result<(), ApiError>)> {
        if self.pending == 0 {
            return None;
        }
        let outcome = self.done_rx.recv().await?;
        self.pending -= 1;
        Some(outcome)
    }

    pub fn pending(&self) -> usize {
        self.pending
    }
}

#[cfg(test)]
#[path = "tests/fetch_tests.rs"]
mod tests;
