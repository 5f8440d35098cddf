//! Per-build orchestration of classification, rewriting, renames and
//! manifest persistence.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};

use crate::TOOL_NAME;
use crate::config::RewriteOptions;
use crate::hooks::{DefaultHooks, RevisionHooks};
use crate::manifest::{classify_artifact, persist_manifest, write_json_file};
use crate::models::{Classification, EmittedArtifact, ExclusionRecord, ManifestMap, ReferenceGraph};
use crate::rewrite::rewrite_references;

/// Final manifest and counters describing one completed build.
#[derive(Debug, Default, Clone)]
pub struct RevisionSummary {
    /// Source → target reference map as accumulated before the done hook ran.
    pub manifest: ManifestMap,
    /// Number of files whose content was rewritten.
    pub rewritten: usize,
    /// Number of excluded files renamed back to their original name.
    pub restored: usize,
    /// Whether a manifest file was written to disk.
    pub persisted: bool,
}

/// Two-phase post-build rewriter owning all state for exactly one build.
///
/// Feed it emitted artifacts and rendered pages in any order, then call
/// [`finish`](Self::finish) once to run the rewrite pass, the exclusion
/// renames and manifest persistence. `finish` consumes the rewriter, so state
/// can never leak into a later build; construct a fresh instance per build.
pub struct FingerprintRewriter<H: RevisionHooks = DefaultHooks> {
    options: RewriteOptions,
    hooks: H,
    output_dir: PathBuf,
    public_path: String,
    web_root: String,
    manifest_file: PathBuf,
    manifest: ManifestMap,
    excludes: Vec<ExclusionRecord>,
    page_files: Vec<PathBuf>,
    asset_files: Vec<PathBuf>,
    graph: ReferenceGraph,
}

impl FingerprintRewriter<DefaultHooks> {
    /// Create a rewriter with the default no-op hooks.
    pub fn new(
        options: RewriteOptions,
        output_dir: &Path,
        pipeline_public_path: Option<&str>,
    ) -> Result<Self> {
        Self::with_hooks(options, DefaultHooks, output_dir, pipeline_public_path)
    }
}

impl<H: RevisionHooks> FingerprintRewriter<H> {
    /// Create a rewriter with caller-supplied hooks.
    ///
    /// The public path comes from the options, falling back to the pipeline
    /// default; failing to resolve a usable value is a fatal configuration
    /// error. A disabled rewriter writes an empty manifest immediately and
    /// ignores every later call.
    pub fn with_hooks(
        options: RewriteOptions,
        hooks: H,
        output_dir: &Path,
        pipeline_public_path: Option<&str>,
    ) -> Result<Self> {
        let output_path = output_dir.to_string_lossy().replace('\\', "/");
        let output_path = output_path.trim_end_matches('/').to_string();

        let configured = options
            .public_path
            .as_deref()
            .filter(|value| !value.is_empty());
        let Some(public_path) = configured
            .or(pipeline_public_path)
            .map(|value| value.trim_end_matches('/').to_string())
            .filter(|value| !value.is_empty())
        else {
            return Err(anyhow!(
                "[{TOOL_NAME}] neither the 'public_path' option ({:?}) nor the pipeline public path ({:?}) is a usable public path",
                options.public_path,
                pipeline_public_path
            ));
        };

        // the output directory minus the public path suffix is the web root
        let web_root = output_path
            .strip_suffix(&public_path)
            .unwrap_or(&output_path)
            .to_string();

        let manifest_file = if Path::new(&options.file_name).is_absolute() {
            PathBuf::from(&options.file_name)
        } else {
            output_dir.join(&options.file_name)
        };

        let rewriter = Self {
            options,
            hooks,
            output_dir: output_dir.to_path_buf(),
            public_path,
            web_root,
            manifest_file,
            manifest: ManifestMap::new(),
            excludes: Vec::new(),
            page_files: Vec::new(),
            asset_files: Vec::new(),
            graph: ReferenceGraph::new(),
        };

        if !rewriter.options.enabled {
            write_json_file(&rewriter.manifest_file, "{}")?;
        }

        Ok(rewriter)
    }

    /// Register a rendered HTML output for the rewrite pass.
    ///
    /// Relative paths are resolved against the output directory. Ignored when
    /// HTML rewriting or the rewriter itself is disabled.
    pub fn record_page(&mut self, path: impl Into<PathBuf>) {
        if !self.options.enabled || !self.options.use_replacing_in_html {
            return;
        }

        let path = path.into();
        let path = if path.is_absolute() {
            path
        } else {
            self.output_dir.join(path)
        };
        self.page_files.push(path);
    }

    /// Classify one emitted artifact and fold the outcome into the build state.
    ///
    /// Artifacts without a fingerprint are ignored entirely; every other
    /// artifact joins the rewrite pass regardless of how it was classified.
    pub fn record_artifact(&mut self, artifact: &EmittedArtifact) {
        if !self.options.enabled {
            return;
        }

        match classify_artifact(
            artifact,
            &self.output_dir,
            &self.public_path,
            &self.options.exclude,
            &self.hooks,
        ) {
            Classification::Skipped => return,
            Classification::Excluded(record) => {
                if self.options.verbose {
                    println!("[{TOOL_NAME}] exclude file: {}", record.source.display());
                }
                self.excludes.push(record);
            }
            Classification::Included(entry) => {
                self.manifest.insert(entry.source, entry.target);
            }
            Classification::TrackedOnly => {}
        }

        self.asset_files.push(self.output_dir.join(&artifact.name));
    }

    /// Run the rewrite, rename and persistence passes and consume the rewriter.
    ///
    /// All classification must have been recorded beforehand; the rewrite
    /// passes run against the completed manifest, the exclusion renames run
    /// strictly after rewriting so references to excluded files settle first,
    /// and the manifest is persisted last.
    pub fn finish(mut self) -> Result<RevisionSummary> {
        if !self.options.enabled {
            return Ok(RevisionSummary {
                persisted: true,
                ..RevisionSummary::default()
            });
        }

        let mut rewritten = 0;

        if self.options.use_replacing_in_html {
            for file in &self.page_files {
                let replaced = rewrite_references(
                    file,
                    &self.web_root,
                    &self.manifest,
                    &mut self.graph,
                    self.options.verbose,
                )?;
                if !replaced.is_empty() {
                    rewritten += 1;
                }
            }
        }

        if self.options.use_replacing_in_assets {
            for file in &self.asset_files {
                let replaced = rewrite_references(
                    file,
                    &self.web_root,
                    &self.manifest,
                    &mut self.graph,
                    self.options.verbose,
                )?;
                if !replaced.is_empty() {
                    rewritten += 1;
                }
            }
        }

        let mut restored = 0;
        for record in &self.excludes {
            if !record.target.exists() {
                continue;
            }
            fs::rename(&record.target, &record.source).with_context(|| {
                format!(
                    "failed to rename {} to {}",
                    record.target.display(),
                    record.source.display()
                )
            })?;
            restored += 1;
        }

        let persisted = persist_manifest(
            &self.hooks,
            &self.manifest_file,
            &self.manifest,
            self.options.verbose,
        )?;

        Ok(RevisionSummary {
            manifest: self.manifest,
            rewritten,
            restored,
            persisted,
        })
    }

    /// Absolute path the manifest will be written to.
    pub fn manifest_file(&self) -> &Path {
        &self.manifest_file
    }
}
