//! Types shared by every crate in the workspace.

mod error_kind;
mod types;

pub use error_kind::ErrorKind;
pub use types::AggregateId;
