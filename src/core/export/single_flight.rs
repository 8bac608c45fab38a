//! Single-flight coalescing of export jobs
//!
//! Concurrent callers asking for the same key share one running job and all
//! receive its result. Jobs run on spawned tasks, so a caller that goes away
//! does not cancel work other callers are waiting on.
//!
//! A caller asking for a forced (refreshing) run only joins a job that was
//! itself forced. Otherwise it waits for the current job to finish and then
//! starts its own, so a refresh always observes state newer than the call.

use crate::domain::ExportError;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

type FlightFuture<V> = Shared<BoxFuture<'static, Result<V, ExportError>>>;

struct Flight<V> {
    id: u64,
    forced: bool,
    future: FlightFuture<V>,
}

enum Claim<V> {
    /// Share the result of a running job
    Join(FlightFuture<V>),
    /// Let the running job finish, then claim again
    Wait(FlightFuture<V>),
    /// This caller started the job
    Lead(FlightFuture<V>),
}

/// Registry of in-flight jobs keyed by string
pub struct SingleFlight<V> {
    flights: Arc<Mutex<HashMap<String, Flight<V>>>>,
    next_id: AtomicU64,
}

impl<V> SingleFlight<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            flights: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(1),
        }
    }

    /// Run `start` for `key` unless a compatible job is already running
    ///
    /// `forced` marks a run that must not reuse a job started before it.
    pub async fn run<F, Fut>(&self, key: &str, forced: bool, start: F) -> Result<V, ExportError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<V, ExportError>> + Send + 'static,
    {
        loop {
            match self.claim(key, forced, &start) {
                Claim::Join(future) => {
                    tracing::debug!(key, "Joining in-flight export");
                    return future.await;
                }
                Claim::Wait(future) => {
                    tracing::debug!(key, "Waiting for in-flight export before refreshing");
                    // Whatever it produced is stale for this caller
                    let _ = future.await;
                }
                Claim::Lead(future) => return future.await,
            }
        }
    }

    /// Number of jobs currently registered
    pub fn in_flight(&self) -> usize {
        self.lock().len()
    }

    fn claim<F, Fut>(&self, key: &str, forced: bool, start: &F) -> Claim<V>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<V, ExportError>> + Send + 'static,
    {
        let mut flights = self.lock();

        if let Some(flight) = flights.get(key) {
            if !forced || flight.forced {
                return Claim::Join(flight.future.clone());
            }
            return Claim::Wait(flight.future.clone());
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let registry = Arc::clone(&self.flights);
        let owned_key = key.to_string();
        let job = start();

        // The task retires its own entry, so the entry goes away even when
        // every caller has been dropped
        let handle = tokio::spawn(async move {
            let result = job.await;
            retire_in(&registry, &owned_key, id);
            result
        });

        let future = async move {
            match handle.await {
                Ok(result) => result,
                Err(e) => Err(ExportError::Internal(format!("export task failed: {e}"))),
            }
        }
        .boxed()
        .shared();

        flights.insert(
            key.to_string(),
            Flight {
                id,
                forced,
                future: future.clone(),
            },
        );
        Claim::Lead(future)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Flight<V>>> {
        lock_flights(&self.flights)
    }
}

impl<V> Default for SingleFlight<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

fn lock_flights<V>(
    flights: &Mutex<HashMap<String, Flight<V>>>,
) -> MutexGuard<'_, HashMap<String, Flight<V>>> {
    // The map stays consistent even if a holder panicked
    flights.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn retire_in<V>(flights: &Mutex<HashMap<String, Flight<V>>>, key: &str, id: u64) {
    let mut flights = lock_flights(flights);
    if flights.get(key).is_some_and(|flight| flight.id == id) {
        flights.remove(key);
    }
}
