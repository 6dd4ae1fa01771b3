use std::sync::mpsc::TrySendError;

use tracing::{debug, warn};

use super::super::worker::{LoadRequest, LoadResponse};
use super::App;
use crate::core::{CommitEntry, FileDiff};

impl App {
    /// Fetch the diff for the current worktree and selection.
    ///
    /// With `refresh_commits` the worker lists commits first and the new
    /// list replaces the current one. Work happens on a background thread;
    /// call `poll_worker()` to apply results.
    pub fn request_load(&mut self, refresh_commits: bool) {
        let Some(worktree) = self.worktree().map(|wt| wt.path.clone()) else {
            self.worker.pending_request_id = None;
            self.worker.queued_request = None;
            self.worker.loading = false;
            return;
        };

        let id = self.worker.next_request_id;
        self.worker.next_request_id = self.worker.next_request_id.wrapping_add(1);
        self.worker.pending_request_id = Some(id);
        self.worker.loading = true;
        self.ui.dirty = true;

        debug!(id, refresh_commits, "requesting load");
        let req = LoadRequest {
            id,
            worktree,
            base: self.base.clone(),
            commits: (!refresh_commits).then(|| self.commits.clone()),
            context_lines: self.view.context_lines,
        };
        self.enqueue_request(req);
    }

    fn enqueue_request(&mut self, req: LoadRequest) -> bool {
        let Some(tx) = self.worker.load.request_tx.as_ref() else {
            self.worker_stopped();
            return false;
        };

        match tx.try_send(req) {
            Ok(()) => {
                self.worker.queued_request = None;
                true
            }
            Err(TrySendError::Full(req)) => {
                self.worker.queued_request = Some(req);
                true
            }
            Err(TrySendError::Disconnected(_)) => {
                self.worker_stopped();
                false
            }
        }
    }

    fn worker_stopped(&mut self) {
        warn!("load worker stopped");
        self.ui.error = Some("Diff worker stopped".to_string());
        self.worker.loading = false;
        self.worker.pending_request_id = None;
        self.worker.queued_request = None;
        self.ui.dirty = true;
    }

    fn flush_queued_request(&mut self) {
        let Some(req) = self.worker.queued_request.take() else {
            return;
        };

        self.enqueue_request(req);
    }

    /// Apply any completed loads from the background worker.
    pub fn poll_worker(&mut self) {
        self.flush_queued_request();
        while let Ok(msg) = self.worker.load.response_rx.try_recv() {
            self.handle_response(msg);
        }
    }

    fn handle_response(&mut self, msg: LoadResponse) {
        let id = match &msg {
            LoadResponse::Loaded { id, .. } | LoadResponse::Error { id, .. } => *id,
        };
        if self.worker.pending_request_id != Some(id) {
            debug!(id, pending = ?self.worker.pending_request_id, "discarding stale load");
            return;
        }

        self.worker.pending_request_id = None;
        self.worker.loading = false;
        self.ui.dirty = true;

        match msg {
            LoadResponse::Loaded { commits, diffs, .. } => {
                debug!(id, files = diffs.len(), "installing diff");
                self.install(commits, diffs);
            }
            LoadResponse::Error {
                commits, message, ..
            } => {
                debug!(id, error = %message, "load failed");
                if let Some(commits) = commits {
                    // The old diff belongs to the old commit list.
                    self.commits = commits;
                    self.diffs.clear();
                    self.highlights.clear();
                    self.clamp_view();
                }
                self.ui.error = Some(message);
            }
        }
    }

    fn install(&mut self, commits: Option<Vec<CommitEntry>>, diffs: Vec<FileDiff>) {
        if let Some(commits) = commits {
            self.commits = commits;
        }
        self.diffs = diffs;
        self.ui.error = None;
        self.highlights.clear();
        self.clamp_view();
    }
}
