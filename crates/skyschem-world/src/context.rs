//! The split between the single main context, which owns live world state, and
//! the blocking worker pool used for file and encoding work.

use skyschem_common::{Result, SchematicError};
use skyschem_logger::{log, LogSeverity::Error};
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle, ThreadId};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

type Task = Box<dyn FnOnce() + Send + 'static>;

/// Handle to the main context. Cloning is cheap; the context thread exits once
/// every handle has been dropped and the queue is drained.
#[derive(Clone)]
pub struct MainContext {
    sender: mpsc::UnboundedSender<Task>,
    thread: ThreadId,
}

impl MainContext {
    /// Spawns the thread that runs queued tasks one at a time, in order.
    pub fn start(name: &str) -> std::io::Result<(MainContext, JoinHandle<()>)> {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Task>();
        let handle = thread::Builder::new()
            .name(name.to_owned())
            .spawn(move || {
                while let Some(task) = receiver.blocking_recv() {
                    if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
                        log("Main context task panicked".to_owned(), Error);
                    }
                }
            })?;
        let thread = handle.thread().id();
        Ok((MainContext { sender, thread }, handle))
    }

    pub fn is_current(&self) -> bool {
        thread::current().id() == self.thread
    }

    /// Queues `task` without waiting for it.
    pub fn execute<F>(&self, task: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.sender
            .send(Box::new(task))
            .map_err(|_| SchematicError::Scheduling("main context has stopped".to_owned()))
    }

    /// Runs `f` on the main context and waits for its result. Runs inline when
    /// already on the main context.
    pub async fn call<T, F>(&self, f: F, timeout: Option<Duration>) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        if self.is_current() {
            return Ok(f());
        }

        let (reply, response) = oneshot::channel();
        self.execute(move || {
            // The caller may have timed out and gone away.
            let _ = reply.send(f());
        })?;

        let outcome = match timeout {
            Some(limit) => tokio::time::timeout(limit, response).await.map_err(|_| {
                SchematicError::Scheduling(format!(
                    "main context did not respond within {:?}",
                    limit
                ))
            })?,
            None => response.await,
        };
        outcome.map_err(|_| {
            SchematicError::Scheduling("main context dropped the task".to_owned())
        })
    }
}

/// Runs blocking work (encoding, file IO) on the worker pool.
pub async fn run_on_worker<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| SchematicError::Scheduling(format!("worker task failed: {}", e)))
}
