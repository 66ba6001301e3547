use std::path::{Path, PathBuf};

/// Best-effort last-session record under the storage dir. Never allowed to
/// fail a request; every write is fire-and-forget.
#[derive(Clone, Debug)]
pub struct SessionLog {
    path: PathBuf,
    start_rfc3339: String,
    pid: u32,
    last_op: Option<String>,
    last_error: Option<String>,
    exit: Option<String>,
}

impl SessionLog {
    pub fn new(storage_dir: &Path) -> Self {
        let this = Self {
            path: storage_dir.join("scopeboard_last_session.txt"),
            start_rfc3339: crate::support::now_rfc3339(),
            pid: std::process::id(),
            last_op: None,
            last_error: None,
            exit: None,
        };
        this.flush();
        this
    }

    pub fn note_op(&mut self, op: &str) {
        let op = op.trim();
        if op.is_empty() {
            return;
        }
        self.last_op = Some(truncate(op, 96));
        self.flush();
    }

    pub fn note_error(&mut self, error: &str) {
        let error = error.trim();
        if error.is_empty() {
            return;
        }
        self.last_error = Some(truncate(error, 300));
        self.flush();
    }

    pub fn note_exit(&mut self, reason: &str) {
        self.exit = Some(truncate(reason.trim(), 120));
        self.flush();
    }

    fn flush(&self) {
        use std::fmt::Write as _;

        let mut out = String::new();
        let _ = writeln!(out, "start={}", self.start_rfc3339);
        let _ = writeln!(out, "pid={}", self.pid);
        if let Some(op) = &self.last_op {
            let _ = writeln!(out, "last_op={op}");
        }
        if let Some(error) = &self.last_error {
            let _ = writeln!(out, "last_error={error}");
        }
        if let Some(exit) = &self.exit {
            let _ = writeln!(out, "exit={exit}");
        }
        let _ = std::fs::write(&self.path, out);
    }
}

fn truncate(value: &str, max: usize) -> String {
    if value.len() <= max {
        return value.to_string();
    }
    let mut end = max;
    while end > 0 && !value.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &value[..end])
}
