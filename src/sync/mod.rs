//! Reconciliation between the content tree and the live document.
//!
//! [`normalize`] is the only place positional identifiers are recomputed, and
//! [`apply`] is the only place they are written to the document.

mod dom;
mod memory;
mod reindex;

pub use dom::{apply, reconcile, DocumentHost};
pub use memory::MemoryHost;
pub use reindex::{normalize, FieldRewrite, NormalizeReport};
