//! Background store worker and completion signals.
//!
//! # Responsibility
//! - Own the SQLite connection on a dedicated thread.
//! - Run queued store jobs strictly one at a time, in submission order.
//! - Hand each caller a `Completion` carrying the job's result.
//!
//! # Invariants
//! - Only the worker thread touches the connection.
//! - A dispatched job always runs to completion; waiting can time out,
//!   the job itself cannot be aborted.
//! - The worker exits once every `StoreHandle` is dropped.

use crate::repo::item_repo::{ItemRepository, RepoError, RepoResult, SqliteItemRepository};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError, TrySendError};
use log::{debug, error, info};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::thread;
use std::time::{Duration, Instant};

const JOB_QUEUE_CAPACITY: usize = 64;
const WORKER_THREAD_NAME: &str = "shoplist-store";

type Job = Box<dyn FnOnce(&dyn ItemRepository) + Send>;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failures observed through the store worker.
#[derive(Debug)]
pub enum StoreError {
    /// The job ran and the repository reported an error.
    Repo(RepoError),
    /// The job queue is full; nothing was dispatched.
    QueueFull,
    /// The worker thread is gone (startup failure or panic).
    WorkerUnavailable,
    /// The caller stopped waiting; the job may still complete.
    Timeout(Duration),
    /// The worker thread could not be started.
    Spawn(std::io::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::QueueFull => write!(f, "store job queue is full; retry later"),
            Self::WorkerUnavailable => write!(f, "store worker is not running"),
            Self::Timeout(after) => {
                write!(f, "store job did not complete within {}ms", after.as_millis())
            }
            Self::Spawn(err) => write!(f, "failed to start store worker: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Spawn(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Cloneable handle used to queue jobs on the store worker.
#[derive(Clone)]
pub struct StoreHandle {
    jobs: Sender<Job>,
}

/// Moves `conn` onto a new worker thread and returns a handle to it.
///
/// The connection must come from `db::open_db`/`db::open_db_in_memory`;
/// schema readiness is checked before the thread starts.
pub fn spawn_store_worker(conn: Connection) -> StoreResult<StoreHandle> {
    SqliteItemRepository::try_new(&conn)?;

    let (jobs_tx, jobs_rx) = bounded::<Job>(JOB_QUEUE_CAPACITY);
    thread::Builder::new()
        .name(WORKER_THREAD_NAME.to_string())
        .spawn(move || run_worker(conn, jobs_rx))
        .map_err(StoreError::Spawn)?;

    info!("event=store_worker_start module=worker status=ok");
    Ok(StoreHandle { jobs: jobs_tx })
}

fn run_worker(conn: Connection, jobs: Receiver<Job>) {
    let sqlite_repo = SqliteItemRepository::from_ready(&conn);
    let repo: &dyn ItemRepository = &sqlite_repo;
    for job in jobs.iter() {
        job(repo);
    }
    info!("event=store_worker_stop module=worker status=ok");
}

impl StoreHandle {
    /// Queues `job` behind every previously submitted job.
    ///
    /// Never blocks: a full queue or a dead worker resolves the returned
    /// completion immediately with an error.
    pub fn submit<T, F>(&self, label: &'static str, job: F) -> Completion<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn ItemRepository) -> RepoResult<T> + Send + 'static,
    {
        let (reply_tx, reply_rx) = bounded(1);
        let task: Job = Box::new(move |repo: &dyn ItemRepository| {
            let started_at = Instant::now();
            let result = job(repo);
            match &result {
                Ok(_) => debug!(
                    "event=store_job module=worker status=ok job={label} duration_ms={}",
                    started_at.elapsed().as_millis()
                ),
                Err(err) => error!(
                    "event=store_job module=worker status=error job={label} duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                ),
            }
            // Receiver may already be gone; the job still counts as done.
            let _ = reply_tx.send(result.map_err(StoreError::Repo));
        });

        match self.jobs.try_send(task) {
            Ok(()) => Completion {
                label,
                reply: reply_rx,
            },
            Err(TrySendError::Full(_)) => {
                error!("event=store_job module=worker status=error job={label} error_code=queue_full");
                Completion::ready(label, Err(StoreError::QueueFull))
            }
            Err(TrySendError::Disconnected(_)) => {
                error!(
                    "event=store_job module=worker status=error job={label} error_code=worker_unavailable"
                );
                Completion::ready(label, Err(StoreError::WorkerUnavailable))
            }
        }
    }
}

/// Completion signal for one queued store job.
///
/// Resolves exactly once with the job's result.
#[must_use = "a completion reports whether the store job failed"]
pub struct Completion<T> {
    label: &'static str,
    reply: Receiver<StoreResult<T>>,
}

impl<T> Completion<T> {
    /// Builds an already-resolved completion.
    pub fn ready(label: &'static str, result: StoreResult<T>) -> Self {
        let (reply_tx, reply_rx) = bounded(1);
        // Capacity 1 and a live receiver: this send cannot fail.
        let _ = reply_tx.send(result);
        Self {
            label,
            reply: reply_rx,
        }
    }

    /// Name of the operation this completion belongs to.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Blocks until the job finishes.
    pub fn wait(self) -> StoreResult<T> {
        self.reply
            .recv()
            .unwrap_or(Err(StoreError::WorkerUnavailable))
    }

    /// Blocks for at most `timeout`.
    ///
    /// On `StoreError::Timeout` the completion can be waited on again.
    pub fn wait_timeout(&self, timeout: Duration) -> StoreResult<T> {
        match self.reply.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(StoreError::Timeout(timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(StoreError::WorkerUnavailable),
        }
    }

    /// Non-blocking poll; `None` while the job is still queued or running.
    pub fn try_take(&self) -> Option<StoreResult<T>> {
        match self.reply.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(StoreError::WorkerUnavailable)),
        }
    }
}
