//! Source context resolution for stack frames.
//!
//! Given a frame's module path, file name, and line number, this module
//! tries to locate the source file on disk and returns a bounded window
//! of numbered lines around the reported line. Resolution is strictly
//! best-effort diagnostic enrichment: every failure mode (missing file,
//! unreadable file, empty file name) collapses to `None` and is at most
//! logged. Nothing in here returns an error or panics.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::event::SourceLine;

/// Lines of context included before the reported line.
const CONTEXT_BEFORE: u32 = 10;

/// Lines of context included after the reported line.
const CONTEXT_AFTER: u32 = 9;

/// Resolves source snippets for stack frames from local source roots.
#[derive(Debug, Clone)]
pub struct SourceContextResolver {
    roots: Vec<PathBuf>,
}

impl Default for SourceContextResolver {
    /// Probes the conventional Rust source root, then the working
    /// directory.
    fn default() -> Self {
        Self::new(vec![PathBuf::from("src"), PathBuf::from(".")])
    }
}

impl SourceContextResolver {
    /// Creates a resolver probing the given roots, in order.
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// Resolves a source window around `line` of the frame's file.
    ///
    /// Candidate paths are probed in order: the file path exactly as the
    /// frame reports it, then each root joined with the directory form
    /// of `module` plus the file name. The first existing path wins.
    ///
    /// Returns `None` when the file name is empty, no candidate exists,
    /// or the file cannot be read.
    pub fn resolve(&self, module: Option<&str>, file: &str, line: u32) -> Option<Vec<SourceLine>> {
        if file.is_empty() || line == 0 {
            return None;
        }

        let path = self.locate(module, file)?;
        match fs::read_to_string(&path) {
            Ok(content) => Some(window(&content, line)),
            Err(err) => {
                debug!(path = %path.display(), error = %err, "failed to read source file");
                None
            }
        }
    }

    /// Finds the first existing candidate path for a frame's file.
    fn locate(&self, module: Option<&str>, file: &str) -> Option<PathBuf> {
        let reported = Path::new(file);
        if reported.is_file() {
            return Some(reported.to_path_buf());
        }

        let file_name = reported.file_name()?;
        let module_dir = module.map(module_directory).unwrap_or_default();

        for root in &self.roots {
            let candidate = root.join(&module_dir).join(file_name);
            if candidate.is_file() {
                debug!(path = %candidate.display(), "source file found");
                return Some(candidate);
            }
        }

        debug!(file, module, "source file not found under any root");
        None
    }
}

/// Converts a module path to a directory path relative to a source root.
///
/// The crate-name segment is dropped (roots already point inside the
/// crate), and so is a trailing segment matching the file's module,
/// since that segment names the file itself:
/// `my_app::net::client` → `net`.
fn module_directory(module: &str) -> PathBuf {
    let segments: Vec<&str> = module.split("::").collect();
    match segments.len() {
        0 | 1 | 2 => PathBuf::new(),
        n => segments[1..n - 1].iter().collect(),
    }
}

/// Cuts the context window around a 1-based line number.
///
/// The window spans `max(1, line - 10)` through `min(line_count, line + 9)`
/// inclusive; near the file edges it clips rather than erroring.
fn window(content: &str, line: u32) -> Vec<SourceLine> {
    let lines: Vec<&str> = content.lines().collect();
    let start = line.saturating_sub(1 + CONTEXT_BEFORE) as usize;
    let end = (lines.len()).min((line + CONTEXT_AFTER) as usize);

    lines[start.min(end)..end]
        .iter()
        .enumerate()
        .map(|(offset, content)| SourceLine {
            line: (start + offset) as u32 + 1,
            content: (*content).to_string(),
        })
        .collect()
}
