#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod builder;
pub mod config;
pub mod hooks;
pub mod manifest;
pub mod models;
pub mod rewrite;

pub use builder::{FingerprintRewriter, RevisionSummary};
pub use config::{ProjectConfig, RewriteOptions};
pub use hooks::{DefaultHooks, RevisionHooks};

/// Namespace prefix used in diagnostic lines and configuration error messages.
pub const TOOL_NAME: &str = "fingerprint-rewriter";
