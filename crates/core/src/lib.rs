//! quicksql_core - pure types and rules for the quicksql key-value store.
//!
//! Nothing in this crate performs I/O. Storage backends implement
//! [`storage::RecordStore`]; the coordinator in the `quicksql` crate composes them
//! with [`codec`] and [`numeric`].

pub mod codec;
pub mod numeric;
pub mod storage;

pub use codec::CodecError;
pub use numeric::{NumericError, NumericOp};
pub use storage::{Record, RecordStore, StoreError};
