//! Background worker that runs git and parses diffs off the UI thread.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread::{self, JoinHandle};

use tracing::debug;

use crate::core::{compute_diff, list_commits, CommitEntry, FileDiff};

/// Requests that can sit in the channel before `try_send` reports `Full`.
const REQUEST_QUEUE: usize = 4;

#[derive(Debug, Clone)]
pub(crate) struct LoadRequest {
    pub id: u64,
    pub worktree: PathBuf,
    pub base: String,
    /// Selection to diff; `None` lists the worktree's commits first.
    pub commits: Option<Vec<CommitEntry>>,
    pub context_lines: u32,
}

#[derive(Debug)]
pub(crate) enum LoadResponse {
    Loaded {
        id: u64,
        /// Present when the request asked for a fresh commit list.
        commits: Option<Vec<CommitEntry>>,
        diffs: Vec<FileDiff>,
    },
    Error {
        id: u64,
        commits: Option<Vec<CommitEntry>>,
        message: String,
    },
}

pub(crate) struct LoadWorker {
    pub request_tx: Option<SyncSender<LoadRequest>>,
    pub response_rx: Receiver<LoadResponse>,
    handle: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for LoadWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadWorker")
            .field("request_tx", &self.request_tx)
            .field("response_rx", &self.response_rx)
            .field("handle", &self.handle.as_ref().map(|_| "..."))
            .finish()
    }
}

pub(crate) fn spawn_load_worker() -> LoadWorker {
    let (request_tx, request_rx) = mpsc::sync_channel::<LoadRequest>(REQUEST_QUEUE);
    let (response_tx, response_rx) = mpsc::channel::<LoadResponse>();

    let handle = thread::spawn(move || worker_loop(request_rx, response_tx));

    LoadWorker {
        request_tx: Some(request_tx),
        response_rx,
        handle: Some(handle),
    }
}

impl Drop for LoadWorker {
    fn drop(&mut self) {
        // Closing the channel ends worker_loop; join after that.
        self.request_tx.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn worker_loop(request_rx: Receiver<LoadRequest>, response_tx: mpsc::Sender<LoadResponse>) {
    while let Ok(mut req) = request_rx.recv() {
        // Drain queued requests so we always work on the latest selection.
        while let Ok(next) = request_rx.try_recv() {
            debug!(skipped = req.id, newer = next.id, "dropping superseded load");
            req = next;
        }

        let response = load(req);
        if response_tx.send(response).is_err() {
            break;
        }
    }
}

fn load(req: LoadRequest) -> LoadResponse {
    let LoadRequest {
        id,
        worktree,
        base,
        commits,
        context_lines,
    } = req;

    let _timer = crate::metrics::Timer::start("fetch");
    debug!(id, worktree = %worktree.display(), base = %base, context_lines, "loading diff");

    let (entries, fresh) = match commits {
        Some(entries) => (entries, false),
        None => (list_commits(&worktree, &base), true),
    };

    match compute_diff(&worktree, &base, &entries, context_lines) {
        Ok(diffs) => LoadResponse::Loaded {
            id,
            commits: fresh.then_some(entries),
            diffs,
        },
        Err(err) => LoadResponse::Error {
            id,
            commits: fresh.then_some(entries),
            message: err.to_string(),
        },
    }
}
