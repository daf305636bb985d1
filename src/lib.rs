//! `reportpub`: publish end-to-end test reports to a git-hosted index.
//!
//! The pipeline is: generate a run key, run the test command, extract a
//! results summary, publish the run into the index branch, notify a webhook.

pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod logging;
pub mod model;
pub mod notify;
pub mod publish;
pub mod render;
pub mod runner;
pub mod store;
pub mod util;

pub use error::{ErrorCode, PublishError, Result, StructuredError};
