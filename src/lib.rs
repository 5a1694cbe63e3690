// src/lib.rs
#[macro_use]
pub mod macros;
#[macro_use]
pub mod log;

pub mod config;
pub mod core;
pub mod error;
pub mod specs;

pub mod credentials;
pub mod directory;
pub mod input;
pub mod progress;
pub mod reconcile;
pub mod session;

#[cfg(feature = "cli")]
pub mod cli;

pub use directory::{AddOutcome, Affiliation, DirectoryClient, RemoveOutcome};
pub use error::{CatsError, Result};
pub use reconcile::{BatchReport, Outcome, Reconciler, Target};
pub use session::{Response, Session, Transport};
