//! Caller-injected extension points consulted during classification and
//! manifest persistence.

use std::path::Path;

use serde_json::Value;

use crate::models::{ArtifactRefs, ManifestMap};

/// Extension slots for one rewrite pipeline run.
///
/// Every slot has an always-allow default, so implementors override only the
/// decisions they care about. The implementing type doubles as the carrier for
/// whatever build context the decisions need.
pub trait RevisionHooks {
    /// Veto a pattern-based exclusion decision.
    ///
    /// Returning `false` keeps the artifact in the normal inclusion flow
    /// instead of queuing it for a rename back to its original name.
    fn exclude(&self, _artifact_name: &str, _refs: &ArtifactRefs) -> bool {
        true
    }

    /// Veto adding a classified artifact to the manifest.
    ///
    /// Returning `false` omits the entry while the file itself is still
    /// tracked for the rewrite pass.
    fn content_hash(&self, _artifact_name: &str, _refs: &ArtifactRefs) -> bool {
        true
    }

    /// Transform or veto manifest persistence.
    ///
    /// Return `Value::Bool(false)` to skip writing the manifest entirely, or
    /// an object to persist in its place. Any other value is rejected as a
    /// configuration error.
    fn done(&self, _manifest_file: &Path, manifest: &ManifestMap) -> Value {
        Value::Object(
            manifest
                .iter()
                .map(|(source, target)| (source.clone(), Value::String(target.clone())))
                .collect(),
        )
    }
}

/// No-op hook set used when the caller has nothing to customize.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultHooks;

impl RevisionHooks for DefaultHooks {}
