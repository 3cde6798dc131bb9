//! Profile storage for Spindle.
//!
//! This module persists profile snapshots, supporting file-based and
//! in-memory backends. Loading a snapshot never re-runs engine logic.

pub mod file;
pub mod memory;
pub mod traits;

pub use file::FileProfileStore;
pub use memory::MemoryProfileStore;
pub use traits::ProfileStore;
