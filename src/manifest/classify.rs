//! Artifact classification producing manifest entries and exclusion records.

use std::path::Path;

use regex::Regex;

use crate::hooks::RevisionHooks;
use crate::models::{
    ArtifactRefs, Classification, EmittedArtifact, ExclusionRecord, ManifestEntry,
};

fn separator_artifact_pattern() -> &'static Regex {
    use std::sync::OnceLock;

    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[-_.]\.").expect("invalid separator regex"))
}

/// Derive the unfingerprinted output filename from a fingerprinted one.
///
/// The fingerprint is stripped at its first occurrence, and the leftover
/// separator artifact (`-.`, `_.` or `..`) collapses to a single dot, so
/// `script.a1b2c3.js` becomes `script..js` and then `script.js`.
pub fn source_reference(artifact_name: &str, content_hash: &str) -> String {
    let stripped = artifact_name.replacen(content_hash, "", 1);
    separator_artifact_pattern()
        .replace(&stripped, ".")
        .into_owned()
}

/// Classify one emitted artifact against the exclusion patterns and hooks.
///
/// Artifacts without fingerprint metadata are skipped outright. A pattern
/// match on the source reference turns into an exclusion unless the exclude
/// hook vetoes it, in which case the artifact falls through to the normal
/// inclusion flow; there the content-hash hook may still withhold the
/// manifest entry.
pub fn classify_artifact<H: RevisionHooks>(
    artifact: &EmittedArtifact,
    output_dir: &Path,
    public_path: &str,
    exclude: &[Regex],
    hooks: &H,
) -> Classification {
    let Some(content_hash) = artifact.content_hash.as_deref() else {
        return Classification::Skipped;
    };

    let source_name = source_reference(&artifact.name, content_hash);
    let refs = ArtifactRefs {
        source: format!("{public_path}/{source_name}"),
        target: format!("{public_path}/{}", artifact.name),
        content_hash: content_hash.to_string(),
    };

    let matches_pattern = exclude.iter().any(|pattern| pattern.is_match(&refs.source));
    if matches_pattern && hooks.exclude(&artifact.name, &refs) {
        return Classification::Excluded(ExclusionRecord {
            source: output_dir.join(&source_name),
            target: artifact.output_path.clone(),
        });
    }

    if hooks.content_hash(&artifact.name, &refs) {
        Classification::Included(ManifestEntry {
            source: refs.source,
            target: refs.target,
        })
    } else {
        Classification::TrackedOnly
    }
}
