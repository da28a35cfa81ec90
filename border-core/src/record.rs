//! Key-value records of evaluation results.
//!
//! ```rust
//! use border_core::record::{Record, RecordValue};
//!
//! let mut record = Record::from_scalar("Episode return", 21.0);
//! record.insert("Episode returns", RecordValue::Array1(vec![20.0, 22.0]));
//! assert_eq!(record.get_scalar("Episode return").unwrap(), 21.0);
//! ```
mod base;

pub use base::{Record, RecordValue};
