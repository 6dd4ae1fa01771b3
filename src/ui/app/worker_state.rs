use super::super::worker::{spawn_load_worker, LoadRequest, LoadWorker};

pub(super) struct WorkerState {
    pub(super) load: LoadWorker,
    pub(super) next_request_id: u64,
    pub(super) pending_request_id: Option<u64>,
    pub(super) queued_request: Option<LoadRequest>,
    pub(super) loading: bool,
}

impl WorkerState {
    pub(super) fn new() -> Self {
        Self {
            load: spawn_load_worker(),
            next_request_id: 1,
            pending_request_id: None,
            queued_request: None,
            loading: false,
        }
    }
}
