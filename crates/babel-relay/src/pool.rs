//! Fixed-size relay worker pool.
//!
//! `pool_size` workers drain one shared queue. A caller first takes one of
//! `pool_size` slots, so a job is only enqueued once a worker is free to run
//! it and callers beyond that wait in `submit`. Every job carries its own
//! reply channel: a caller only ever sees the response to its own request,
//! and responses across callers are not ordered.
//!
//! Shutdown cancels a shared token. Callers still waiting for a slot get
//! [`RelayError::Closed`]. Jobs already accepted are run, and a worker that
//! is mid-call finishes that call and delivers the result before it exits.

use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::transport::{RelayRequest, RelayResponse, Transport};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

type Reply = oneshot::Sender<Result<RelayResponse, RelayError>>;

struct Job {
    request: RelayRequest,
    reply: Reply,
    /// Held until the reply is sent.
    slot: OwnedSemaphorePermit,
}

/// Handle for submitting requests. Cheap to clone.
#[derive(Clone)]
pub struct RelayClient {
    queue: mpsc::Sender<Job>,
    slots: Arc<Semaphore>,
    cancel: CancellationToken,
}

impl RelayClient {
    /// Relay one request and wait for its response.
    pub async fn submit(&self, request: RelayRequest) -> Result<RelayResponse, RelayError> {
        if self.cancel.is_cancelled() {
            return Err(RelayError::Closed);
        }
        let slot = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(RelayError::Closed),
            slot = Arc::clone(&self.slots).acquire_owned() => slot.map_err(|_| RelayError::Closed)?,
        };
        let (reply, response) = oneshot::channel();
        let job = Job {
            request,
            reply,
            slot,
        };
        // One queue entry per slot, so this never waits.
        self.queue.send(job).await.map_err(|_| RelayError::Closed)?;
        response.await.map_err(|_| RelayError::Closed)?
    }

    /// Workers not currently running or holding a job.
    pub fn idle_workers(&self) -> usize {
        self.slots.available_permits()
    }
}

pub struct RelayPool {
    client: RelayClient,
    workers: Vec<JoinHandle<()>>,
}

impl RelayPool {
    /// Spawn `config.pool_size` workers on the current tokio runtime.
    pub fn start(config: &RelayConfig, transport: Arc<dyn Transport>) -> Result<Self, RelayError> {
        config.validate()?;
        let (queue, jobs) = mpsc::channel(config.pool_size);
        let jobs = Arc::new(Mutex::new(jobs));
        let slots = Arc::new(Semaphore::new(config.pool_size));
        let cancel = CancellationToken::new();

        let workers = (0..config.pool_size)
            .map(|id| {
                tokio::spawn(run_worker(
                    id,
                    Arc::clone(&jobs),
                    Arc::clone(&transport),
                    cancel.clone(),
                ))
            })
            .collect();
        info!(workers = config.pool_size, "relay pool started");

        Ok(Self {
            client: RelayClient {
                queue,
                slots,
                cancel,
            },
            workers,
        })
    }

    pub fn client(&self) -> RelayClient {
        self.client.clone()
    }

    pub async fn submit(&self, request: RelayRequest) -> Result<RelayResponse, RelayError> {
        self.client.submit(request).await
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Stop accepting work and wait for every worker to exit.
    pub async fn shutdown(self) {
        self.client.cancel.cancel();
        for worker in self.workers {
            if let Err(err) = worker.await {
                error!("relay worker ended abnormally: {err}");
            }
        }
        info!("relay pool stopped");
    }
}

async fn run_worker(
    id: usize,
    jobs: Arc<Mutex<mpsc::Receiver<Job>>>,
    transport: Arc<dyn Transport>,
    cancel: CancellationToken,
) {
    info!(worker = id, "relay worker started");
    loop {
        // Queued jobs take priority so accepted work drains before exit.
        let next = tokio::select! {
            biased;
            job = async { jobs.lock().await.recv().await } => job,
            _ = cancel.cancelled() => None,
        };
        let Some(Job {
            request,
            reply,
            slot,
        }) = next
        else {
            break;
        };

        let url = request.url.clone();
        let result = transport.send(request).await;
        if let Err(err) = &result {
            warn!(worker = id, %url, "relay call failed: {err}");
        }
        if reply.send(result).is_err() {
            warn!(worker = id, %url, "caller went away before the reply");
        }
        drop(slot);
    }
    info!(worker = id, "relay worker stopped");
}
