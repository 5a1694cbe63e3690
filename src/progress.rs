// src/progress.rs
/// Lightweight progress reporting for a batch run.
/// Frontends implement this to surface status to users.
pub trait Progress {
    /// Called at the start with the number of resolved identifiers.
    fn begin(&mut self, _total: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// Called when one identifier has been processed.
    fn item_done(&mut self, _netid: &str) {}

    /// Called at the end, successful or not.
    fn finish(&mut self) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}

/// `[n/total] netid` lines on stderr.
#[derive(Default)]
pub struct StderrProgress {
    total: usize,
    done: usize,
}

impl Progress for StderrProgress {
    fn begin(&mut self, total: usize) {
        self.total = total;
        self.done = 0;
    }

    fn log(&mut self, msg: &str) {
        eprintln!("{msg}");
    }

    fn item_done(&mut self, netid: &str) {
        self.done += 1;
        eprintln!("[{}/{}] {netid}", self.done, self.total);
    }
}
