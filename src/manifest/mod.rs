//! Manifest construction and persistence broken into focused submodules for
//! easier testing.

mod classify;
mod persist;

pub use classify::{classify_artifact, source_reference};
pub use persist::{persist_manifest, write_json_file};
