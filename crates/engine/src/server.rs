use crate::ops::{self, OpError, OpRequest, OpResponse};
use crate::support::SessionLog;
use sb_storage::SqliteStore;
use serde_json::Value;

/// Request-scoped dispatch over one open store. No per-request mutable state
/// lives here; caller identity arrives inside each request line.
pub struct Server {
    pub(crate) store: SqliteStore,
    log: SessionLog,
}

impl Server {
    pub fn new(store: SqliteStore) -> Self {
        let log = SessionLog::new(store.storage_dir());
        Self { store, log }
    }

    pub fn store(&self) -> &SqliteStore {
        &self.store
    }

    pub fn note_exit(&mut self, reason: &str) {
        self.log.note_exit(reason);
    }

    pub fn handle_line(&mut self, line: &str) -> String {
        self.handle_line_value(line).to_string()
    }

    pub fn handle_line_value(&mut self, line: &str) -> Value {
        let request: OpRequest = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(err) => {
                self.log.note_error(&err.to_string());
                return OpResponse::failure(
                    "",
                    OpError::new(
                        "INVALID_REQUEST",
                        "request must be a JSON object with an op field",
                    ),
                )
                .into_value();
            }
        };

        self.log.note_op(&request.op);
        let mut response = ops::dispatch(self, &request);

        // Transient contention gets one retry before the failure surfaces.
        let busy = response
            .error
            .as_ref()
            .is_some_and(|error| error.code == "STORE_UNAVAILABLE");
        if busy {
            response = ops::dispatch(self, &request);
        }

        if let Some(error) = &response.error {
            self.log
                .note_error(&format!("{}: {}", error.code, error.message));
        }
        response.into_value()
    }
}
