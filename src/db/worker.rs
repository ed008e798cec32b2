//! Request/response channel to the database thread.
//!
//! The connection lives on one dedicated thread. Callers hand it closures over
//! a channel and await the reply on a oneshot, so statements against the
//! handle never overlap and the async side never blocks on SQLite.

use super::db::Db;
use crate::libs::error::{StoreError, StoreResult};
use std::thread::{self, JoinHandle};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

type Job = Box<dyn FnOnce(&mut Db) + Send>;

pub struct DbWorker {
    sender: Option<mpsc::UnboundedSender<Job>>,
    handle: Option<JoinHandle<()>>,
}

impl DbWorker {
    /// Moves the gateway onto a new worker thread.
    pub fn spawn(db: Db) -> StoreResult<DbWorker> {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Job>();
        let handle = thread::Builder::new()
            .name("todo004-db".to_string())
            .spawn(move || {
                let mut db = db;
                while let Some(job) = receiver.blocking_recv() {
                    job(&mut db);
                }
                db.close();
                debug!("database worker stopped");
            })
            .map_err(|e| StoreError::connection(format!("failed to start database worker: {}", e)))?;

        Ok(DbWorker {
            sender: Some(sender),
            handle: Some(handle),
        })
    }

    /// Runs `f` against the gateway on the worker thread and waits for its result.
    pub async fn call<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Db) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let sender = self.sender.as_ref().ok_or_else(|| StoreError::connection("database worker has stopped"))?;
        let (reply_tx, reply_rx) = oneshot::channel();
        let job: Job = Box::new(move |db| {
            // The caller may have gone away; nothing to report to.
            let _ = reply_tx.send(f(db));
        });

        sender.send(job).map_err(|_| StoreError::connection("database worker has stopped"))?;
        reply_rx.await.map_err(|_| StoreError::connection("database worker dropped the request"))?
    }
}

impl Drop for DbWorker {
    fn drop(&mut self) {
        // Closing the channel lets the thread drain queued jobs and exit.
        self.sender.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("database worker panicked");
            }
        }
    }
}
