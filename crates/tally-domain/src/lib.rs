//! tally-domain
//!
//! Pure domain models (Transaction, Category, Statistics, TransactionFilter).
//! No I/O, no storage, no logging. Only data types and the rules that live on them.

pub mod category;
pub mod common;
pub mod filter;
pub mod statistics;
pub mod transaction;

pub use category::*;
pub use common::*;
pub use filter::*;
pub use statistics::*;
pub use transaction::*;
