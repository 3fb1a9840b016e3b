#![doc(test(attr(deny(warnings))))]

//! Tally keeps a personal income/expense ledger: a write-through cache over a
//! pluggable storage backend, filtered queries, and summary statistics.
//!
//! The root crate wires the workspace crates together for the `tally` binary.

pub mod bootstrap;
pub mod errors;
pub mod export;
pub mod utils;

pub use bootstrap::{open_backend, open_ledger, Workspace};
pub use errors::TallyError;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Directive used when neither `RUST_LOG` nor the config names one.
pub const DEFAULT_LOG_FILTER: &str = "tally=info";

/// Initializes global tracing with the default directive.
pub fn init() {
    init_with_filter(DEFAULT_LOG_FILTER);
}

/// Initializes global tracing once; later calls are ignored.
pub fn init_with_filter(directive: &str) {
    INIT_TRACING.call_once(|| {
        utils::init_tracing(directive);
        tracing::debug!(directive, "tracing initialized");
    });
}
