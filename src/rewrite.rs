//! Reference rewriting inside emitted output files.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::TOOL_NAME;
use crate::models::{ManifestMap, ReferenceGraph};

const STYLE_EXTENSIONS: &[&str] = &[".css"];
const SCRIPT_EXTENSIONS: &[&str] = &[".js", ".mjs"];

fn ends_with_any(value: &str, suffixes: &[&str]) -> bool {
    suffixes.iter().any(|suffix| value.ends_with(suffix))
}

/// Replace manifest source references with their fingerprinted targets in one
/// file, returning the substituted targets.
///
/// HTML files take every manifest pair unconditionally. Other files skip pairs
/// that point at the file itself, cross the stylesheet/script boundary, or
/// would close a reference loop recorded in `graph`; each substituted target
/// is then added to the graph under the file's own public reference path. The
/// file is written back only when at least one replacement happened, so a
/// second pass over an already rewritten file is a no-op.
///
/// Matching is plain substring search, so a source reference that happens to
/// be contained in a longer unrelated filename is replaced as well; the
/// extension guards above are the only hardening. Files that are not valid
/// UTF-8 are left untouched.
pub fn rewrite_references(
    file: &Path,
    web_root: &str,
    manifest: &ManifestMap,
    graph: &mut ReferenceGraph,
    verbose: bool,
) -> Result<Vec<String>> {
    let bytes = fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
    let Ok(mut content) = String::from_utf8(bytes) else {
        return Ok(Vec::new());
    };

    let file_path = file.to_string_lossy().replace('\\', "/");
    let reference_path = file_path
        .strip_prefix(web_root)
        .unwrap_or(file_path.as_str())
        .to_string();
    let is_html = file_path.ends_with(".html");
    let mut replaced = Vec::new();

    for (source, target) in manifest {
        if !is_html {
            // a file never rewrites a reference to itself
            if file_path.ends_with(target.as_str()) {
                continue;
            }
            // stylesheets and scripts never organically reference each other
            if ends_with_any(&file_path, STYLE_EXTENSIONS)
                && ends_with_any(source, SCRIPT_EXTENSIONS)
            {
                continue;
            }
            if ends_with_any(&file_path, SCRIPT_EXTENSIONS)
                && ends_with_any(source, STYLE_EXTENSIONS)
            {
                continue;
            }
            // if the target already references this file, do not point back at it
            if graph
                .get(target)
                .is_some_and(|entries| entries.iter().any(|entry| entry == &reference_path))
            {
                continue;
            }
        }

        if content.contains(source.as_str()) {
            replaced.push(target.clone());
            if !is_html {
                graph
                    .entry(reference_path.clone())
                    .or_default()
                    .push(target.clone());
            }
            content = content.replace(source.as_str(), target.as_str());
        }
    }

    if !replaced.is_empty() {
        fs::write(file, &content)
            .with_context(|| format!("failed to write {}", file.display()))?;

        if verbose {
            println!(
                "[{TOOL_NAME}] replaced references in '{}': {replaced:?}",
                file.display()
            );
        }
    }

    Ok(replaced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{TempDir, tempdir};

    struct Workspace {
        temp: TempDir,
        web_root: String,
    }

    impl Workspace {
        fn new() -> Self {
            let temp = tempdir().unwrap();
            fs::create_dir_all(temp.path().join("assets")).unwrap();
            let web_root = temp.path().to_string_lossy().replace('\\', "/");
            Self { temp, web_root }
        }

        fn write(&self, name: &str, content: &str) -> std::path::PathBuf {
            let path = self.temp.path().join("assets").join(name);
            fs::write(&path, content).unwrap();
            path
        }
    }

    fn manifest(pairs: &[(&str, &str)]) -> ManifestMap {
        pairs
            .iter()
            .map(|(source, target)| (source.to_string(), target.to_string()))
            .collect()
    }

    #[test]
    fn rewrites_script_references_in_html() {
        let workspace = Workspace::new();
        let page = workspace.write(
            "index.html",
            "<script src=\"/assets/script.js\"></script>\n<link href=\"/assets/style.css\">",
        );
        let manifest = manifest(&[
            ("/assets/script.js", "/assets/script.a1b2c3.js"),
            ("/assets/style.css", "/assets/style.5d6e7f.css"),
        ]);
        let mut graph = ReferenceGraph::new();

        let replaced =
            rewrite_references(&page, &workspace.web_root, &manifest, &mut graph, false).unwrap();

        assert_eq!(replaced.len(), 2);
        let content = fs::read_to_string(&page).unwrap();
        assert!(content.contains("/assets/script.a1b2c3.js"));
        assert!(content.contains("/assets/style.5d6e7f.css"));
        // html files are not tracked in the reference graph
        assert!(graph.is_empty());
    }

    #[test]
    fn replaces_every_occurrence_in_a_file() {
        let workspace = Workspace::new();
        let script = workspace.write(
            "script.1111.js",
            "new Worker('/assets/worker.js');\nnew Worker('/assets/worker.js');",
        );
        let manifest = manifest(&[("/assets/worker.js", "/assets/worker.2222.js")]);
        let mut graph = ReferenceGraph::new();

        rewrite_references(&script, &workspace.web_root, &manifest, &mut graph, false).unwrap();

        let content = fs::read_to_string(&script).unwrap();
        assert_eq!(content.matches("/assets/worker.2222.js").count(), 2);
        assert!(!content.contains("/assets/worker.js'"));
    }

    #[test]
    fn second_pass_is_a_noop() {
        let workspace = Workspace::new();
        let script = workspace.write("script.1111.js", "importScripts('/assets/worker.js');");
        let manifest = manifest(&[("/assets/worker.js", "/assets/worker.2222.js")]);
        let mut graph = ReferenceGraph::new();

        let first =
            rewrite_references(&script, &workspace.web_root, &manifest, &mut graph, false).unwrap();
        assert_eq!(first, vec!["/assets/worker.2222.js".to_string()]);
        let after_first = fs::read_to_string(&script).unwrap();

        let mut fresh_graph = ReferenceGraph::new();
        let second =
            rewrite_references(&script, &workspace.web_root, &manifest, &mut fresh_graph, false)
                .unwrap();
        assert!(second.is_empty());
        assert_eq!(fs::read_to_string(&script).unwrap(), after_first);
    }

    #[test]
    fn never_rewrites_a_reference_to_itself() {
        let workspace = Workspace::new();
        // the fingerprinted file textually contains its own source reference
        let script = workspace.write("script.1111.js", "sourceMappingURL=/assets/script.js");
        let manifest = manifest(&[("/assets/script.js", "/assets/script.1111.js")]);
        let mut graph = ReferenceGraph::new();

        let replaced =
            rewrite_references(&script, &workspace.web_root, &manifest, &mut graph, false).unwrap();

        assert!(replaced.is_empty());
        assert_eq!(
            fs::read_to_string(&script).unwrap(),
            "sourceMappingURL=/assets/script.js"
        );
    }

    #[test]
    fn stylesheets_ignore_script_sources_and_vice_versa() {
        let workspace = Workspace::new();
        let style = workspace.write("style.9999.css", "/* see /assets/script.js */");
        let script = workspace.write("other.8888.js", "load('/assets/style.css')");
        let manifest = manifest(&[
            ("/assets/script.js", "/assets/script.1111.js"),
            ("/assets/style.css", "/assets/style.9999.css"),
        ]);
        let mut graph = ReferenceGraph::new();

        let replaced_in_style =
            rewrite_references(&style, &workspace.web_root, &manifest, &mut graph, false).unwrap();
        let replaced_in_script =
            rewrite_references(&script, &workspace.web_root, &manifest, &mut graph, false).unwrap();

        assert!(replaced_in_style.is_empty());
        assert!(replaced_in_script.is_empty());
        assert_eq!(
            fs::read_to_string(&style).unwrap(),
            "/* see /assets/script.js */"
        );
        assert_eq!(
            fs::read_to_string(&script).unwrap(),
            "load('/assets/style.css')"
        );
    }

    #[test]
    fn circular_references_are_rewritten_only_one_way() {
        let workspace = Workspace::new();
        let first = workspace.write("a.1111.js", "importScripts('/assets/b.js');");
        let second = workspace.write("b.2222.js", "importScripts('/assets/a.js');");
        let manifest = manifest(&[
            ("/assets/a.js", "/assets/a.1111.js"),
            ("/assets/b.js", "/assets/b.2222.js"),
        ]);
        let mut graph = ReferenceGraph::new();

        let replaced_in_first =
            rewrite_references(&first, &workspace.web_root, &manifest, &mut graph, false).unwrap();
        assert_eq!(replaced_in_first, vec!["/assets/b.2222.js".to_string()]);

        let replaced_in_second =
            rewrite_references(&second, &workspace.web_root, &manifest, &mut graph, false).unwrap();

        // `a` already points at `b`, so `b` must not be rewritten to point back
        assert!(replaced_in_second.is_empty());
        assert_eq!(
            fs::read_to_string(&second).unwrap(),
            "importScripts('/assets/a.js');"
        );
    }

    #[test]
    fn untouched_files_are_not_written_back() {
        let workspace = Workspace::new();
        let script = workspace.write("script.1111.js", "console.log('no references here');");
        let manifest = manifest(&[("/assets/worker.js", "/assets/worker.2222.js")]);
        let mut graph = ReferenceGraph::new();

        let replaced =
            rewrite_references(&script, &workspace.web_root, &manifest, &mut graph, false).unwrap();

        assert!(replaced.is_empty());
        assert!(graph.is_empty());
    }

    #[test]
    fn binary_files_are_left_untouched() {
        let workspace = Workspace::new();
        let path = workspace.temp.path().join("assets/logo.3333.png");
        let mut bytes = b"/assets/worker.js".to_vec();
        bytes.extend([0xff, 0xfe]);
        fs::write(&path, &bytes).unwrap();
        let manifest = manifest(&[("/assets/worker.js", "/assets/worker.2222.js")]);
        let mut graph = ReferenceGraph::new();

        let replaced =
            rewrite_references(&path, &workspace.web_root, &manifest, &mut graph, false).unwrap();

        assert!(replaced.is_empty());
        assert_eq!(fs::read(&path).unwrap(), bytes);
    }
}
