//! Data structures shared by artifact classification and the rewrite passes.

use std::collections::BTreeMap;
use std::path::PathBuf;

/// Source → target reference map accumulated for one build.
///
/// Keys are unfingerprinted public reference paths, values their fingerprinted
/// counterparts. When two artifacts collapse to the same source key the last
/// registered entry wins; collisions are not deduplicated.
pub type ManifestMap = BTreeMap<String, String>;

/// Targets found inside each rewritten file, keyed by the file's own public
/// reference path. Consulted to keep mutually referencing files from rewriting
/// each other into a loop.
pub type ReferenceGraph = BTreeMap<String, Vec<String>>;

/// One file emitted by the build pipeline.
#[derive(Debug, Clone)]
pub struct EmittedArtifact {
    /// Fingerprinted output filename, relative to the pipeline output directory.
    pub name: String,
    /// Content fingerprint assigned by the pipeline; absent for unhashed outputs.
    pub content_hash: Option<String>,
    /// Absolute path of the emitted file on disk.
    pub output_path: PathBuf,
}

/// Public-facing reference strings derived for one fingerprinted artifact.
///
/// Handed to the classification hooks so callers can base veto decisions on
/// the same strings that would land in the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRefs {
    /// Unfingerprinted reference path, public-path-relative.
    pub source: String,
    /// Fingerprinted reference path, public-path-relative.
    pub target: String,
    /// Fingerprint string embedded in the artifact name.
    pub content_hash: String,
}

/// One `source → target` pair destined for the manifest map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Unfingerprinted reference path used as the manifest key.
    pub source: String,
    /// Fingerprinted reference path stored as the manifest value.
    pub target: String,
}

/// Pairs an excluded artifact's restore destination with its fingerprinted
/// file on disk. Consumed once by the rename-back pass after rewriting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionRecord {
    /// Unfingerprinted path the file is renamed back to.
    pub source: PathBuf,
    /// Fingerprinted path currently on disk.
    pub target: PathBuf,
}

/// Outcome of classifying one emitted artifact.
#[derive(Debug, Clone)]
pub enum Classification {
    /// The artifact carries no fingerprint metadata and is not tracked at all.
    Skipped,
    /// The artifact matched an exclusion pattern and keeps its original name.
    Excluded(ExclusionRecord),
    /// The artifact contributes a manifest entry.
    Included(ManifestEntry),
    /// The manifest entry was vetoed by a hook; the file is still rewritten.
    TrackedOnly,
}
