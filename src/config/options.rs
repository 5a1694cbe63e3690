// src/config/options.rs
use std::path::PathBuf;

use super::consts::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Add,
    Remove,
}

/// Everything one batch run needs to know, as parsed from the command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunOptions {
    pub group: String,
    /// File of targets, or a single target.
    pub input: String,
    pub mode: Mode,
    /// Without this the run is a dry run: reads happen, mutations are only logged.
    pub do_it: bool,
    /// Delete the previous log file before starting.
    pub zap: bool,
    pub log_file: PathBuf,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            group: s!(DEFAULT_GROUP),
            input: s!(),
            mode: Mode::Add,
            do_it: false,
            zap: false,
            log_file: PathBuf::from(LOG_FILE),
        }
    }
}

impl RunOptions {
    pub fn dry_run(&self) -> bool {
        !self.do_it
    }
}
