use std::{
    path::{Path, PathBuf},
    sync::{mpsc, Arc, Mutex},
    thread::{self, JoinHandle},
};

use anyhow::{anyhow, Context, Result};
use log::{error, info};
use rusqlite::Connection;
use tokio::sync::oneshot;

use super::migrations::run_migrations;

type StoreTask = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

enum StoreCommand {
    Run(StoreTask),
    Shutdown,
}

/// Handle to the journal database.
///
/// A dedicated thread owns the SQLite connection; callers submit closures
/// over an mpsc channel and await the result on a oneshot. Every storage
/// operation is therefore async from the caller's side and serialized on the
/// worker, and the connection never crosses threads.
#[derive(Clone)]
pub struct Database {
    inner: Arc<Inner>,
}

struct Inner {
    sender: mpsc::Sender<StoreCommand>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        let mut guard = match self.worker.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(handle) = guard.take() {
            if let Err(err) = self.sender.send(StoreCommand::Shutdown) {
                error!("Failed to send shutdown to journal DB thread: {err}");
            }
            if let Err(join_err) = handle.join() {
                error!("Failed to join journal DB thread: {join_err:?}");
            }
        }
    }
}

impl Database {
    /// Opens the journal at `db_path`, creating parent directories and
    /// applying pending migrations before returning.
    pub fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create journal directory {}", parent.display())
            })?;
        }

        let (command_tx, command_rx) = mpsc::channel::<StoreCommand>();
        let (ready_tx, ready_rx) = mpsc::channel();
        let path_for_thread = db_path.clone();

        let worker = thread::Builder::new()
            .name("honest-hours-db".into())
            .spawn(move || worker_loop(path_for_thread, command_rx, ready_tx))
            .context("failed to spawn journal DB thread")?;

        ready_rx
            .recv()
            .context("journal DB thread exited before signaling readiness")??;

        info!("Journal database ready at {}", db_path.display());

        Ok(Self {
            inner: Arc::new(Inner {
                sender: command_tx,
                worker: Mutex::new(Some(worker)),
            }),
        })
    }

    /// Runs `task` on the DB thread and awaits its result.
    pub async fn execute<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();

        let command = StoreCommand::Run(Box::new(move |conn| {
            if reply_tx.send(task(conn)).is_err() {
                error!("DB caller dropped before receiving result");
            }
        }));

        self.inner
            .sender
            .send(command)
            .map_err(|err| anyhow!("failed to send command to journal DB thread: {err}"))?;

        reply_rx
            .await
            .map_err(|_| anyhow!("journal DB thread terminated unexpectedly"))?
    }
}

fn worker_loop(
    path: PathBuf,
    command_rx: mpsc::Receiver<StoreCommand>,
    ready_tx: mpsc::Sender<Result<()>>,
) {
    let mut conn = match open_connection(&path) {
        Ok(conn) => conn,
        Err(err) => {
            let _ = ready_tx.send(Err(err));
            return;
        }
    };

    let init_result = run_migrations(&mut conn).context("failed to run journal migrations");
    if ready_tx.send(init_result).is_err() {
        error!("DB initialization receiver dropped before ready signal");
        return;
    }

    while let Ok(command) = command_rx.recv() {
        match command {
            StoreCommand::Run(task) => task(&mut conn),
            StoreCommand::Shutdown => break,
        }
    }

    info!("Journal database thread shutting down");
}

fn open_connection(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path).context("failed to open SQLite database")?;

    if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
        error!("Failed to enable WAL mode: {err}");
    }
    if let Err(err) = conn.pragma_update(None, "foreign_keys", "ON") {
        error!("Failed to enable foreign keys: {err}");
    }

    Ok(conn)
}
